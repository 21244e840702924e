//! Live HTTP Backend
//!
//! Sends requests to the banking server with JSON bodies and an
//! `Authorization: Bearer` header carrying the current session token
//! (absent when nobody is signed in). Non-success statuses and transport
//! failures surface unchanged as [`ApiError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use super::traits::{ApiError, BankApi};
use crate::models::{
    AdminLogEntry, AssistantReply, AuthResponse, ExecutionResult, Goal, LogFilter, NewGoal,
    SuggestedAction, Transaction,
};
use crate::session::SessionStore;

/// Live banking backend
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    session: SessionStore,
    http_client: reqwest::Client,
}

impl HttpApi {
    /// Create a backend against `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self {
            base_url: base_url.into(),
            session,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Issue one request and decode the JSON response body.
    ///
    /// Every endpoint goes through here: URL joining, the bearer header
    /// and the status check live in one place.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!(%method, %url, "api request");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status, "api request failed");
            return Err(ApiError::Status { status, body });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl BankApi for HttpApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.request(
            Method::POST,
            "/auth/login",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.request(
            Method::POST,
            "/auth/register",
            Some(serde_json::json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    async fn goals(&self, user_id: i64) -> Result<Vec<Goal>, ApiError> {
        self.request(Method::GET, &format!("/users/{user_id}/goals"), None)
            .await
    }

    async fn create_goal(&self, user_id: i64, goal: &NewGoal) -> Result<Goal, ApiError> {
        self.request(
            Method::POST,
            &format!("/users/{user_id}/goals"),
            Some(serde_json::json!({
                "title": goal.title,
                "target_amount": goal.target_amount,
                "deadline": goal.deadline,
            })),
        )
        .await
    }

    async fn transactions(&self, user_id: i64) -> Result<Vec<Transaction>, ApiError> {
        self.request(Method::GET, &format!("/users/{user_id}/transactions"), None)
            .await
    }

    async fn assistant_reply(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<AssistantReply, ApiError> {
        self.request(
            Method::POST,
            "/ai/message",
            Some(serde_json::json!({ "user_id": user_id, "message": message })),
        )
        .await
    }

    async fn execute_action(
        &self,
        user_id: i64,
        action: &SuggestedAction,
    ) -> Result<ExecutionResult, ApiError> {
        self.request(
            Method::POST,
            "/ai/execute",
            Some(serde_json::json!({ "user_id": user_id, "action": action })),
        )
        .await
    }

    async fn admin_logs(&self, filter: &LogFilter) -> Result<Vec<AdminLogEntry>, ApiError> {
        let path = format!("/admin/logs{}", filter.to_query());
        self.request(Method::GET, &path, None).await
    }
}
