//! Banking API Trait
//!
//! Trait definition for banking backends. The abstraction lets every
//! controller work against either the live server or the simulated
//! backend without changing logic.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AdminLogEntry, AssistantReply, AuthResponse, ExecutionResult, Goal, LogFilter, NewGoal,
    SuggestedAction, Transaction,
};

/// Network-level failure of an API call
///
/// Surfaced unchanged to the caller; every operation is abandoned on the
/// first failure — there is no automatic retry anywhere in the system.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body, for diagnostics
        body: String,
    },
    /// The request never completed
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the expected shape
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Banking backend seam
///
/// One typed operation per server endpoint. Implementations handle
/// transport details (headers, URLs, fixtures).
#[async_trait]
pub trait BankApi: Send + Sync {
    /// Backend name for diagnostics (e.g. "http", "simulated")
    fn name(&self) -> &str;

    /// `POST /auth/login`
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    /// `POST /auth/register`
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError>;

    /// `GET /users/{id}/goals`
    async fn goals(&self, user_id: i64) -> Result<Vec<Goal>, ApiError>;

    /// `POST /users/{id}/goals`
    async fn create_goal(&self, user_id: i64, goal: &NewGoal) -> Result<Goal, ApiError>;

    /// `GET /users/{id}/transactions`
    async fn transactions(&self, user_id: i64) -> Result<Vec<Transaction>, ApiError>;

    /// `POST /ai/message`
    async fn assistant_reply(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<AssistantReply, ApiError>;

    /// `POST /ai/execute`
    async fn execute_action(
        &self,
        user_id: i64,
        action: &SuggestedAction,
    ) -> Result<ExecutionResult, ApiError>;

    /// `GET /admin/logs?{filters}`
    async fn admin_logs(&self, filter: &LogFilter) -> Result<Vec<AdminLogEntry>, ApiError>;
}
