//! Simulated Backend
//!
//! In-memory stand-in for the banking server, used for local development
//! when no server is reachable. Every call resolves after a fixed
//! artificial delay with static fixture data or a request-body echo, and
//! always succeeds.
//!
//! Assistant replies are canned: the first substring match over the
//! message text wins, defaulting to the balance response. This matching
//! is fixture-only behavior — the live assistant's intent matching is
//! server-side and no contract here.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use super::traits::{ApiError, BankApi};
use crate::models::{
    ActionKind, AdminLogEntry, AssistantReply, AuthResponse, ExecutionResult, Goal, LogFilter,
    LogStatus, NewGoal, SuggestedAction, Transaction, TransactionKind, UserProfile,
};

/// Fixed artificial delay before every simulated response
pub const SIMULATED_DELAY: Duration = Duration::from_millis(500);

/// Token issued by the simulated auth endpoints
pub const MOCK_ACCESS_TOKEN: &str = "mock_jwt_token_12345";

/// Canned balance reply; also the default when nothing matches
pub const BALANCE_REPLY: &str =
    "Ваш текущий баланс составляет 250,000 ₸. У вас есть 3 активные финансовые цели.";

const GOAL_REPLY: &str =
    "Могу создать для вас цель «Резервный фонд» на 500,000 ₸ к концу года. Создать?";

const TRANSFER_REPLY: &str =
    "Могу перевести 20,000 ₸ на сберегательный счёт. Подтвердить перевод?";

/// Simulated banking backend
pub struct MockApi {
    next_goal_id: AtomicI64,
}

impl MockApi {
    /// Create the backend with its fixture set
    pub fn new() -> Self {
        Self {
            next_goal_id: AtomicI64::new(100),
        }
    }

    async fn delay() {
        tokio::time::sleep(SIMULATED_DELAY).await;
    }

    /// First substring match wins; the balance reply is the fallback.
    fn canned_reply(message: &str) -> AssistantReply {
        let needle = message.to_lowercase();

        if needle.contains("баланс") {
            return AssistantReply {
                text: BALANCE_REPLY.to_string(),
                suggested_action: None,
            };
        }

        if needle.contains("цель") || needle.contains("накопить") {
            return AssistantReply {
                text: GOAL_REPLY.to_string(),
                suggested_action: Some(SuggestedAction {
                    kind: ActionKind::CreateGoal,
                    goal_id: None,
                    recipient: None,
                    amount: Some(500_000.0),
                    title: Some("Создать цель".to_string()),
                    description: Some(
                        "Резервный фонд: 500,000 ₸ до 31.12.2026".to_string(),
                    ),
                }),
            };
        }

        if needle.contains("перевод") || needle.contains("перевести") {
            return AssistantReply {
                text: TRANSFER_REPLY.to_string(),
                suggested_action: Some(SuggestedAction {
                    kind: ActionKind::Transfer,
                    goal_id: None,
                    recipient: Some("Сберегательный счёт".to_string()),
                    amount: Some(20_000.0),
                    title: Some("Подтвердить перевод".to_string()),
                    description: Some("Перевод 20,000 ₸ на сберегательный счёт".to_string()),
                }),
            };
        }

        AssistantReply {
            text: BALANCE_REPLY.to_string(),
            suggested_action: None,
        }
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankApi for MockApi {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        Self::delay().await;
        // Any credentials pass in simulated mode
        Ok(AuthResponse {
            user_id: 1,
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            user: Some(fixtures::profile(email)),
        })
    }

    async fn register(
        &self,
        _name: &str,
        _email: &str,
        _password: &str,
    ) -> Result<AuthResponse, ApiError> {
        Self::delay().await;
        Ok(AuthResponse {
            user_id: 1,
            access_token: MOCK_ACCESS_TOKEN.to_string(),
            user: None,
        })
    }

    async fn goals(&self, _user_id: i64) -> Result<Vec<Goal>, ApiError> {
        Self::delay().await;
        Ok(fixtures::goals())
    }

    async fn create_goal(&self, _user_id: i64, goal: &NewGoal) -> Result<Goal, ApiError> {
        Self::delay().await;
        // Echo of the request body with a fresh id
        Ok(Goal {
            id: self.next_goal_id.fetch_add(1, Ordering::SeqCst),
            title: goal.title.clone(),
            target_amount: goal.target_amount,
            current_amount: 0.0,
            deadline: goal.deadline,
            created_at: Utc::now(),
        })
    }

    async fn transactions(&self, _user_id: i64) -> Result<Vec<Transaction>, ApiError> {
        Self::delay().await;
        Ok(fixtures::transactions())
    }

    async fn assistant_reply(
        &self,
        _user_id: i64,
        message: &str,
    ) -> Result<AssistantReply, ApiError> {
        Self::delay().await;
        Ok(Self::canned_reply(message))
    }

    async fn execute_action(
        &self,
        _user_id: i64,
        action: &SuggestedAction,
    ) -> Result<ExecutionResult, ApiError> {
        Self::delay().await;
        let result = match action.kind {
            ActionKind::CreateGoal => "Цель создана".to_string(),
            ActionKind::Transfer => "Перевод выполнен".to_string(),
        };
        Ok(ExecutionResult {
            success: true,
            result,
        })
    }

    async fn admin_logs(&self, filter: &LogFilter) -> Result<Vec<AdminLogEntry>, ApiError> {
        Self::delay().await;
        // Exact-match filters are honored in simulated mode too
        Ok(fixtures::admin_logs()
            .into_iter()
            .filter(|entry| filter.matches(entry))
            .collect())
    }
}

mod fixtures {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    fn timestamp(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    pub fn profile(email: &str) -> UserProfile {
        UserProfile {
            id: 1,
            name: "Айдар Серіков".to_string(),
            email: email.to_string(),
        }
    }

    /// Exactly 3 active goals, consistent with the canned balance reply
    pub fn goals() -> Vec<Goal> {
        vec![
            Goal {
                id: 1,
                title: "Отпуск в Алматы".to_string(),
                target_amount: 400_000.0,
                current_amount: 180_000.0,
                deadline: date(2026, 10, 1),
                created_at: timestamp(2026, 2, 1, 10, 0),
            },
            Goal {
                id: 2,
                title: "Новый ноутбук".to_string(),
                target_amount: 650_000.0,
                current_amount: 520_000.0,
                deadline: date(2026, 9, 15),
                created_at: timestamp(2026, 3, 12, 18, 30),
            },
            Goal {
                id: 3,
                title: "Подушка безопасности".to_string(),
                target_amount: 1_000_000.0,
                current_amount: 250_000.0,
                deadline: date(2027, 6, 30),
                created_at: timestamp(2026, 1, 5, 9, 15),
            },
        ]
    }

    pub fn transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                date: date(2026, 8, 1),
                description: "Зарплата".to_string(),
                amount: 420_000.0,
                kind: TransactionKind::Credit,
            },
            Transaction {
                id: 2,
                date: date(2026, 8, 2),
                description: "Аренда квартиры".to_string(),
                amount: -180_000.0,
                kind: TransactionKind::Debit,
            },
            Transaction {
                id: 3,
                date: date(2026, 8, 3),
                description: "Продукты".to_string(),
                amount: -32_500.0,
                kind: TransactionKind::Debit,
            },
            Transaction {
                id: 4,
                date: date(2026, 8, 5),
                description: "Возврат долга".to_string(),
                amount: 15_000.0,
                kind: TransactionKind::Credit,
            },
            Transaction {
                id: 5,
                date: date(2026, 8, 6),
                description: "Кофейня".to_string(),
                amount: -2_400.0,
                kind: TransactionKind::Debit,
            },
        ]
    }

    /// Covers all four terminal states
    pub fn admin_logs() -> Vec<AdminLogEntry> {
        vec![
            AdminLogEntry {
                id: 1,
                user_id: 1,
                action_type: "login".to_string(),
                timestamp: timestamp(2026, 8, 6, 8, 12),
                status: LogStatus::Completed,
            },
            AdminLogEntry {
                id: 2,
                user_id: 1,
                action_type: "goal_created".to_string(),
                timestamp: timestamp(2026, 8, 6, 8, 20),
                status: LogStatus::Completed,
            },
            AdminLogEntry {
                id: 3,
                user_id: 2,
                action_type: "transfer".to_string(),
                timestamp: timestamp(2026, 8, 6, 9, 2),
                status: LogStatus::Failed,
            },
            AdminLogEntry {
                id: 4,
                user_id: 3,
                action_type: "ai_action".to_string(),
                timestamp: timestamp(2026, 8, 6, 9, 45),
                status: LogStatus::Pending,
            },
            AdminLogEntry {
                id: 5,
                user_id: 2,
                action_type: "transfer".to_string(),
                timestamp: timestamp(2026, 8, 6, 10, 30),
                status: LogStatus::Cancelled,
            },
            AdminLogEntry {
                id: 6,
                user_id: 1,
                action_type: "ai_action".to_string(),
                timestamp: timestamp(2026, 8, 6, 11, 5),
                status: LogStatus::Failed,
            },
        ]
    }
}
