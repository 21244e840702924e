//! Dashboard Controller
//!
//! Loads the signed-in user's goals and transactions, owns both
//! collections (replaced wholesale on every load) and offers pure
//! goal/transaction → view-model transforms so formatting logic tests
//! without a terminal.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, NaiveDate, Utc};
use parking_lot::Mutex;
use thiserror::Error;

use crate::api::{ApiError, BankApi};
use crate::format::{format_date, format_signed_amount, format_tenge};
use crate::models::{Goal, NewGoal, Transaction};
use crate::session::SessionStore;
use crate::validators::{validate_form, Check, FormReport};

/// Why a goal submission was rejected
#[derive(Debug, Error)]
pub enum CreateGoalError {
    /// The form did not validate; fields are annotated in the report
    #[error("goal form validation failed")]
    Invalid(FormReport),
    /// The server rejected or never received the request
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Raw create-goal form values as typed by the user
#[derive(Clone, Debug, Default)]
pub struct GoalForm {
    /// Goal title
    pub title: String,
    /// Target amount, unparsed
    pub target_amount: String,
    /// Deadline as `YYYY-MM-DD`, unparsed
    pub deadline: String,
}

impl GoalForm {
    /// Validate every field, annotating all failures
    pub fn validate(&self) -> FormReport {
        validate_form(&[
            ("title", &self.title, &[Check::Required]),
            (
                "target_amount",
                &self.target_amount,
                &[
                    Check::Required,
                    Check::Numeric {
                        min: Some(1.0),
                        max: None,
                    },
                ],
            ),
            ("deadline", &self.deadline, &[Check::Required, Check::Date]),
        ])
    }

    /// Validate and parse into the request body
    pub fn parse(&self) -> Result<NewGoal, FormReport> {
        let report = self.validate();
        match (
            self.target_amount.trim().parse::<f64>(),
            NaiveDate::parse_from_str(self.deadline.trim(), "%Y-%m-%d"),
        ) {
            (Ok(target_amount), Ok(deadline)) if report.is_ok() => Ok(NewGoal {
                title: self.title.trim().to_string(),
                target_amount,
                deadline,
            }),
            _ => Err(report),
        }
    }
}

/// Collections owned by the dashboard
#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    /// Current goals, newest first
    pub goals: Vec<Goal>,
    /// Recent transactions in server order
    pub transactions: Vec<Transaction>,
}

/// Controller for the goals/transactions page
pub struct DashboardController {
    api: Arc<dyn BankApi>,
    session: SessionStore,
    state: Mutex<DashboardState>,
}

impl DashboardController {
    /// Wire a controller to its backend and session
    pub fn new(api: Arc<dyn BankApi>, session: SessionStore) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(DashboardState::default()),
        }
    }

    /// Snapshot of the owned collections
    pub fn state(&self) -> DashboardState {
        self.state.lock().clone()
    }

    /// Reload both collections, sequentially
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.load_goals().await?;
        self.load_transactions().await?;
        Ok(())
    }

    /// Fetch goals and replace the owned set wholesale
    pub async fn load_goals(&self) -> Result<usize, ApiError> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(0);
        };
        let goals = self.api.goals(user_id).await?;
        let count = goals.len();
        self.state.lock().goals = goals;
        tracing::debug!(user_id, count, "goals loaded");
        Ok(count)
    }

    /// Fetch transactions and replace the owned set wholesale
    pub async fn load_transactions(&self) -> Result<usize, ApiError> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(0);
        };
        let transactions = self.api.transactions(user_id).await?;
        let count = transactions.len();
        self.state.lock().transactions = transactions;
        tracing::debug!(user_id, count, "transactions loaded");
        Ok(count)
    }

    /// Validate and submit a new goal; the created goal is prepended to
    /// the owned set
    pub async fn create_goal(&self, form: &GoalForm) -> Result<Goal, CreateGoalError> {
        let new_goal = form.parse().map_err(CreateGoalError::Invalid)?;
        let Some(user_id) = self.session.user_id() else {
            return Err(CreateGoalError::Invalid(FormReport::default()));
        };

        let goal = self.api.create_goal(user_id, &new_goal).await?;
        self.state.lock().goals.insert(0, goal.clone());
        tracing::info!(user_id, goal_id = goal.id, "goal created");
        Ok(goal)
    }
}

// ============================================
// Pure view-model transforms
// ============================================

/// Goal progress as a whole percentage, clamped to `[0, 100]`
pub fn progress_percent(current: f64, target: f64) -> u8 {
    if target <= 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    let pct = (current / target * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Whole days until the deadline, ceiling; negative when overdue
pub fn days_remaining(deadline: NaiveDate, now: DateTime<Utc>) -> i64 {
    let end = deadline.and_time(NaiveTime::MIN).and_utc();
    let seconds = (end - now).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

/// Render-ready projection of one goal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalCard {
    /// Goal title
    pub title: String,
    /// Progress percentage, clamped
    pub progress: u8,
    /// `current / target` line, formatted
    pub amount_label: String,
    /// Formatted deadline
    pub deadline_label: String,
    /// Whole days left (negative when overdue)
    pub days_remaining: i64,
}

/// Project a goal for rendering
pub fn goal_card(goal: &Goal, now: DateTime<Utc>) -> GoalCard {
    GoalCard {
        title: goal.title.clone(),
        progress: progress_percent(goal.current_amount, goal.target_amount),
        amount_label: format!(
            "{} / {}",
            format_tenge(goal.current_amount),
            format_tenge(goal.target_amount)
        ),
        deadline_label: format_date(goal.deadline),
        days_remaining: days_remaining(goal.deadline, now),
    }
}

/// Render-ready projection of one transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRow {
    /// Formatted booking date
    pub date_label: String,
    /// Human description
    pub description: String,
    /// Signed, formatted amount
    pub amount_label: String,
    /// True for money in
    pub credit: bool,
}

/// Project a transaction for rendering
pub fn transaction_row(tx: &Transaction) -> TransactionRow {
    TransactionRow {
        date_label: format_date(tx.date),
        description: tx.description.clone(),
        amount_label: format_signed_amount(tx),
        credit: matches!(tx.kind, crate::models::TransactionKind::Credit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockApi;
    use crate::models::Session;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn signed_in_session() -> SessionStore {
        let store = SessionStore::in_memory();
        store
            .store(Session {
                token: "tok".to_string(),
                user_id: 1,
                profile: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_progress_is_clamped_and_monotonic() {
        let target = 1000.0;
        assert_eq!(progress_percent(0.0, target), 0);
        assert_eq!(progress_percent(target, target), 100);
        assert_eq!(progress_percent(2.0 * target, target), 100);

        // Monotonic in current_amount
        let mut last = 0;
        for current in [0.0, 100.0, 250.0, 500.0, 999.0, 1000.0, 5000.0] {
            let pct = progress_percent(current, target);
            assert!(pct >= last);
            last = pct;
        }
    }

    #[test]
    fn test_progress_rounds_to_whole_percent() {
        assert_eq!(progress_percent(333.0, 1000.0), 33);
        assert_eq!(progress_percent(335.0, 1000.0), 34);
    }

    #[test]
    fn test_days_remaining_ceiling_and_negative_when_overdue() {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 15, 0, 0).unwrap();

        // Part of a day left still counts as a full day
        let tomorrow = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        assert_eq!(days_remaining(tomorrow, now), 1);

        let next_week = NaiveDate::from_ymd_opt(2026, 8, 14).unwrap();
        assert_eq!(days_remaining(next_week, now), 7);

        // Overdue goals go negative, not clamped
        let last_week = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(days_remaining(last_week, now) < 0);
    }

    #[test]
    fn test_goal_card_projection() {
        let goal = Goal {
            id: 1,
            title: "Отпуск в Алматы".to_string(),
            target_amount: 400_000.0,
            current_amount: 180_000.0,
            deadline: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap(),
        };
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

        let card = goal_card(&goal, now);
        assert_eq!(card.title, "Отпуск в Алматы");
        assert_eq!(card.progress, 45);
        assert_eq!(card.amount_label, "180,000 ₸ / 400,000 ₸");
        assert_eq!(card.deadline_label, "01.10.2026");
        assert_eq!(card.days_remaining, 55);
    }

    #[tokio::test]
    async fn test_refresh_replaces_collections_wholesale() {
        let controller = DashboardController::new(Arc::new(MockApi::new()), signed_in_session());
        assert!(controller.state().goals.is_empty());

        controller.refresh().await.unwrap();
        let state = controller.state();
        assert_eq!(state.goals.len(), 3);
        assert!(!state.transactions.is_empty());
    }

    #[tokio::test]
    async fn test_create_goal_validates_before_submitting() {
        let controller = DashboardController::new(Arc::new(MockApi::new()), signed_in_session());

        let bad_form = GoalForm {
            title: String::new(),
            target_amount: "не число".to_string(),
            deadline: "завтра".to_string(),
        };
        match controller.create_goal(&bad_form).await {
            Err(CreateGoalError::Invalid(report)) => {
                assert_eq!(report.errors.len(), 3);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_goal_prepends_result() {
        let controller = DashboardController::new(Arc::new(MockApi::new()), signed_in_session());
        controller.load_goals().await.unwrap();

        let form = GoalForm {
            title: "Машина".to_string(),
            target_amount: "4000000".to_string(),
            deadline: "2027-01-01".to_string(),
        };
        let created = controller.create_goal(&form).await.unwrap();

        let state = controller.state();
        assert_eq!(state.goals.len(), 4);
        assert_eq!(state.goals[0], created);
    }
}
