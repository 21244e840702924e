//! Data Model
//!
//! Plain records exchanged with the banking API and held by controllers.
//! No referential integrity is enforced client-side; the server owns the
//! data, the client renders snapshots of it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================
// Identity & Session
// ============================================

/// Cached server record of the signed-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-side user id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

/// Client-held proof of authentication plus cached identity
///
/// Created on successful login/register, read on every authenticated
/// action, destroyed on logout. Owned exclusively by the session store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Authenticated user id
    pub user_id: i64,
    /// Cached profile, when the server returned one
    pub profile: Option<UserProfile>,
}

/// Response body of the login/register endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Authenticated user id
    pub user_id: i64,
    /// Opaque bearer token
    pub access_token: String,
    /// Profile record (login only; register omits it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

// ============================================
// Goals & Transactions
// ============================================

/// A savings goal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Server-assigned id
    pub id: i64,
    /// Short human title
    pub title: String,
    /// Amount to reach
    pub target_amount: f64,
    /// Amount saved so far
    pub current_amount: f64,
    /// Date the goal should be reached by
    pub deadline: NaiveDate,
    /// When the goal was created
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a goal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    /// Short human title
    pub title: String,
    /// Amount to reach
    pub target_amount: f64,
    /// Date the goal should be reached by
    pub deadline: NaiveDate,
}

/// Direction of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in
    Credit,
    /// Money out
    Debit,
}

/// A single account movement, server-sourced and read-only
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Server-assigned id
    pub id: i64,
    /// Booking date
    pub date: NaiveDate,
    /// Human description
    pub description: String,
    /// Signed amount (credits positive, debits negative)
    pub amount: f64,
    /// Direction
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

// ============================================
// Chat
// ============================================

/// Unique chat message ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a chat message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The signed-in user
    User,
    /// The banking assistant
    Assistant,
}

/// One entry in the in-memory chat transcript
///
/// `pending` marks the transient typing-indicator placeholder shown while
/// a reply is awaited; it is the only kind of message ever removed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id
    pub id: MessageId,
    /// Author
    pub role: MessageRole,
    /// Message text (empty for the typing indicator)
    pub text: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Whether this is the typing-indicator placeholder
    #[serde(default)]
    pub pending: bool,
}

impl ChatMessage {
    /// Create a regular message
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            pending: false,
        }
    }

    /// Create the typing-indicator placeholder
    pub fn typing_indicator() -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            text: String::new(),
            timestamp: Utc::now(),
            pending: true,
        }
    }
}

/// Operation kinds the assistant may propose
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Create a savings goal
    CreateGoal,
    /// Transfer money to a recipient
    Transfer,
}

/// A structured, user-confirmable operation proposed by the assistant
///
/// Transient: exists only between reply receipt and the user's
/// confirm/decline, then discarded. Executed at most once per reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// What kind of operation this is
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Target goal, for goal-related actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<i64>,
    /// Transfer recipient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Amount involved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Title for the confirmation dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Description for the confirmation dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response body of the assistant reply endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssistantReply {
    /// The reply text
    pub text: String,
    /// Optional proposed operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<SuggestedAction>,
}

/// Response body of the action execution endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the server carried the operation out
    pub success: bool,
    /// Human-readable result text
    #[serde(default)]
    pub result: String,
}

// ============================================
// Admin log
// ============================================

/// Terminal state of a logged operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    /// Finished successfully
    Completed,
    /// Still in flight
    Pending,
    /// Finished with an error
    Failed,
    /// Aborted by the user
    Cancelled,
}

impl LogStatus {
    /// Wire spelling of the status
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown log status: {other}")),
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the admin operation log, server-sourced and read-only
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminLogEntry {
    /// Server-assigned id
    pub id: i64,
    /// User the operation belongs to
    pub user_id: i64,
    /// Operation kind, e.g. `login`, `goal_created`, `ai_action`
    pub action_type: String,
    /// When the operation was logged
    pub timestamp: DateTime<Utc>,
    /// Terminal state
    pub status: LogStatus,
}

/// Exact-match filters for the admin log listing
///
/// Used both for server-side fetches (as query parameters) and for the
/// client-side re-filter over an already-loaded set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogFilter {
    /// Restrict to one user
    pub user_id: Option<i64>,
    /// Restrict to one operation kind
    pub action_type: Option<String>,
    /// Restrict to one terminal state
    pub status: Option<LogStatus>,
}

impl LogFilter {
    /// Whether no restriction is set
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.action_type.is_none() && self.status.is_none()
    }

    /// Exact-match test against one entry
    pub fn matches(&self, entry: &AdminLogEntry) -> bool {
        if let Some(user_id) = self.user_id {
            if entry.user_id != user_id {
                return false;
            }
        }
        if let Some(ref action_type) = self.action_type {
            if &entry.action_type != action_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        true
    }

    /// Render as a URL query string (empty when no restriction is set)
    pub fn to_query(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(user_id) = self.user_id {
            pairs.push(format!("user_id={user_id}"));
        }
        if let Some(ref action_type) = self.action_type {
            pairs.push(format!("action_type={action_type}"));
        }
        if let Some(status) = self.status {
            pairs.push(format!("status={status}"));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(user_id: i64, action_type: &str, status: LogStatus) -> AdminLogEntry {
        AdminLogEntry {
            id: 1,
            user_id,
            action_type: action_type.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            status,
        }
    }

    #[test]
    fn test_message_id_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn test_typing_indicator_is_pending_assistant() {
        let msg = ChatMessage::typing_indicator();
        assert!(msg.pending);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.text.is_empty());
    }

    #[test]
    fn test_log_filter_exact_match() {
        let filter = LogFilter {
            status: Some(LogStatus::Failed),
            ..LogFilter::default()
        };
        assert!(filter.matches(&entry(1, "login", LogStatus::Failed)));
        assert!(!filter.matches(&entry(1, "login", LogStatus::Completed)));
        assert!(!filter.matches(&entry(1, "login", LogStatus::Cancelled)));
    }

    #[test]
    fn test_log_filter_combines_fields() {
        let filter = LogFilter {
            user_id: Some(2),
            action_type: Some("transfer".to_string()),
            status: None,
        };
        assert!(filter.matches(&entry(2, "transfer", LogStatus::Pending)));
        assert!(!filter.matches(&entry(3, "transfer", LogStatus::Pending)));
        assert!(!filter.matches(&entry(2, "login", LogStatus::Pending)));
    }

    #[test]
    fn test_log_filter_query_string() {
        assert_eq!(LogFilter::default().to_query(), "");

        let filter = LogFilter {
            user_id: Some(7),
            action_type: None,
            status: Some(LogStatus::Failed),
        };
        assert_eq!(filter.to_query(), "?user_id=7&status=failed");
    }

    #[test]
    fn test_suggested_action_wire_shape() {
        let json = r#"{"type":"create_goal","amount":500000.0,"title":"Резервный фонд"}"#;
        let action: SuggestedAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind, ActionKind::CreateGoal);
        assert_eq!(action.amount, Some(500000.0));
        assert!(action.goal_id.is_none());
    }

    #[test]
    fn test_transaction_kind_wire_spelling() {
        let json = r#"{"id":1,"date":"2026-01-10","description":"Зарплата","amount":420000.0,"type":"credit"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.kind, TransactionKind::Credit);
    }
}
