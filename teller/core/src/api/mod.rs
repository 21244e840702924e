//! Banking API Client
//!
//! Abstraction over the banking server. The [`BankApi`] trait is the seam;
//! two interchangeable backends implement it:
//!
//! - [`HttpApi`]: real requests over the network with a bearer token
//! - [`MockApi`]: in-memory fixtures behind a fixed artificial delay,
//!   used for local development when no server is reachable
//!
//! Switching backend is a pure configuration toggle ([`crate::config::ApiMode`])
//! with no data migration between modes.

mod http;
mod mock;
mod traits;

use std::sync::Arc;

pub use http::HttpApi;
pub use mock::{MockApi, BALANCE_REPLY, MOCK_ACCESS_TOKEN, SIMULATED_DELAY};
pub use traits::{ApiError, BankApi};

use crate::config::{ApiConfig, ApiMode};
use crate::session::SessionStore;

/// Build the backend selected by configuration
pub fn build_api(config: &ApiConfig, session: SessionStore) -> Arc<dyn BankApi> {
    match config.mode {
        ApiMode::Live => Arc::new(HttpApi::new(config.base_url.clone(), session)),
        ApiMode::Simulated => Arc::new(MockApi::new()),
    }
}
