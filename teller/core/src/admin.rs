//! Admin Log Controller
//!
//! Loads the operation log with server-side filters and supports a
//! separate client-side re-filter over the already-loaded set by exact
//! field match.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{ApiError, BankApi};
use crate::models::{AdminLogEntry, LogFilter};

/// Controller for the admin log page
pub struct AdminController {
    api: Arc<dyn BankApi>,
    state: Mutex<Vec<AdminLogEntry>>,
}

impl AdminController {
    /// Wire a controller to its backend
    pub fn new(api: Arc<dyn BankApi>) -> Self {
        Self {
            api,
            state: Mutex::new(Vec::new()),
        }
    }

    /// Server-side filtered fetch; replaces the loaded set wholesale
    pub async fn load(&self, filter: &LogFilter) -> Result<usize, ApiError> {
        let entries = self.api.admin_logs(filter).await?;
        let count = entries.len();
        *self.state.lock() = entries;
        tracing::debug!(count, "admin logs loaded");
        Ok(count)
    }

    /// Snapshot of the loaded set
    pub fn entries(&self) -> Vec<AdminLogEntry> {
        self.state.lock().clone()
    }

    /// Client-side exact-match re-filter over the loaded set; does not
    /// touch the server or the owned collection
    pub fn refilter(&self, filter: &LogFilter) -> Vec<AdminLogEntry> {
        self.state
            .lock()
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }
}

/// Build a [`LogFilter`] from raw filter-form inputs.
///
/// Blank fields mean "no restriction"; a malformed field is an error
/// message for inline display.
pub fn parse_filter(user_id: &str, action_type: &str, status: &str) -> Result<LogFilter, String> {
    let mut filter = LogFilter::default();

    let user_id = user_id.trim();
    if !user_id.is_empty() {
        filter.user_id = Some(
            user_id
                .parse()
                .map_err(|_| "ID пользователя — число".to_string())?,
        );
    }

    let action_type = action_type.trim();
    if !action_type.is_empty() {
        filter.action_type = Some(action_type.to_string());
    }

    let status = status.trim();
    if !status.is_empty() {
        filter.status = Some(status.parse().map_err(|_| {
            "Статус: completed, pending, failed или cancelled".to_string()
        })?);
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::LogStatus;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_load_replaces_entries_wholesale() {
        let controller = AdminController::new(Arc::new(MockApi::new()));
        assert!(controller.entries().is_empty());

        let count = controller.load(&LogFilter::default()).await.unwrap();
        assert_eq!(count, 6);
        assert_eq!(controller.entries().len(), 6);

        // A filtered reload shrinks the owned set
        let filter = LogFilter {
            status: Some(LogStatus::Failed),
            ..LogFilter::default()
        };
        controller.load(&filter).await.unwrap();
        assert!(controller
            .entries()
            .iter()
            .all(|e| e.status == LogStatus::Failed));
    }

    #[tokio::test]
    async fn test_refilter_is_client_side_only() {
        let controller = AdminController::new(Arc::new(MockApi::new()));
        controller.load(&LogFilter::default()).await.unwrap();
        let loaded = controller.entries().len();

        let filter = LogFilter {
            status: Some(LogStatus::Failed),
            ..LogFilter::default()
        };
        let failed = controller.refilter(&filter);

        assert!(!failed.is_empty());
        assert!(failed.iter().all(|e| e.status == LogStatus::Failed));
        // The owned set is untouched
        assert_eq!(controller.entries().len(), loaded);
    }

    #[tokio::test]
    async fn test_refilter_by_user_and_action() {
        let controller = AdminController::new(Arc::new(MockApi::new()));
        controller.load(&LogFilter::default()).await.unwrap();

        let filter = LogFilter {
            user_id: Some(2),
            action_type: Some("transfer".to_string()),
            status: None,
        };
        let matched = controller.refilter(&filter);
        assert_eq!(matched.len(), 2);
        assert!(matched
            .iter()
            .all(|e| e.user_id == 2 && e.action_type == "transfer"));
    }

    #[test]
    fn test_parse_filter_blank_fields_mean_no_restriction() {
        let filter = parse_filter("", "  ", "").unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_filter_reads_all_fields() {
        let filter = parse_filter("7", "login", "failed").unwrap();
        assert_eq!(filter.user_id, Some(7));
        assert_eq!(filter.action_type.as_deref(), Some("login"));
        assert_eq!(filter.status, Some(LogStatus::Failed));
    }

    #[test]
    fn test_parse_filter_rejects_malformed_fields() {
        assert!(parse_filter("abc", "", "").is_err());
        assert!(parse_filter("", "", "done").is_err());
    }
}
