//! Teller Core - Headless Banking-Assistant Logic
//!
//! This crate provides the application logic for Teller, completely
//! independent of any UI framework. It can drive a TUI, a web surface,
//! or run headless for testing/automation.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        UI Surface                          │
//! │        renders snapshots, forwards input & choices         │
//! └──────────────────────────────┬─────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼─────────────────────────────┐
//! │                        TELLER CORE                         │
//! │  ┌──────────┐  ┌───────────┐  ┌─────────┐  ┌────────────┐  │
//! │  │   Auth   │  │ Dashboard │  │  Admin  │  │    Chat    │  │
//! │  │controller│  │controller │  │controller│ │ controller │  │
//! │  └────┬─────┘  └─────┬─────┘  └────┬────┘  └─────┬──────┘  │
//! │       │              │             │             │         │
//! │  ┌────┴──────────────┴─────────────┴─────────────┴──────┐  │
//! │  │            BankApi (live HTTP / simulated)           │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │  ┌───────────────┐  ┌───────────────┐  ┌────────────────┐  │
//! │  │ Session store │  │ Voice adapter │  │   Event bus    │  │
//! │  └───────────────┘  └───────────────┘  └────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`BankApi`]: backend seam with live ([`HttpApi`]) and simulated
//!   ([`MockApi`]) implementations
//! - [`ChatController`]: the assistant turn state machine
//! - [`VoiceAdapter`]: speech recognition/synthesis state machine
//! - [`SessionStore`]: sole owner of the client session
//! - [`EventBus`]: carries the dashboard-refresh signal
//!
//! # Module Overview
//!
//! - [`admin`]: operation log controller with server/client filtering
//! - [`api`]: banking API trait plus its two backends
//! - [`auth`]: login/register/logout against the session store
//! - [`chat`]: assistant turn state machine and transcript ownership
//! - [`config`]: TOML configuration with env overrides
//! - [`dashboard`]: goals/transactions controller and view-models
//! - [`events`]: cross-controller signals
//! - [`format`]: currency/date rendering helpers
//! - [`models`]: records exchanged with the server
//! - [`session`]: durable session storage
//! - [`validators`]: pure field and form validation
//! - [`voice`]: speech platform seam and adapter
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any
//! other UI framework. It's pure application logic that can be used
//! anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod format;
pub mod models;
pub mod session;
pub mod validators;
pub mod voice;

// Re-exports for convenience
pub use admin::{parse_filter, AdminController};
pub use api::{build_api, ApiError, BankApi, HttpApi, MockApi};
pub use auth::{validate_login, validate_register, AuthController, AuthError};
pub use chat::{ChatController, ConfirmPrompt, TurnOutcome, APOLOGY_REPLY};
pub use config::{ApiMode, ConfigError, TellerConfig};
pub use dashboard::{
    days_remaining, goal_card, progress_percent, transaction_row, CreateGoalError,
    DashboardController, DashboardState, GoalCard, GoalForm, TransactionRow,
};
pub use events::{AppEvent, EventBus};
pub use format::{format_date, format_signed_amount, format_tenge, format_timestamp};
pub use models::{
    ActionKind, AdminLogEntry, AssistantReply, AuthResponse, ChatMessage, ExecutionResult, Goal,
    LogFilter, LogStatus, MessageId, MessageRole, NewGoal, Session, SuggestedAction, Transaction,
    TransactionKind, UserProfile,
};
pub use session::{SessionStore, SessionStoreError};
pub use validators::{validate_form, Check, FieldError, FormReport, ValidationResult};
pub use voice::{
    NullSpeechPlatform, RecognitionEvent, SpeechPlatform, VoiceAdapter, VoiceError,
};
