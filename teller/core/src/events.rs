//! Cross-Controller Signals
//!
//! The one signal controllers exchange: a dashboard refresh request,
//! dispatched with no payload and consumed by re-running the dashboard
//! load sequence. Delivered over a broadcast channel so any number of
//! surfaces can listen.

use tokio::sync::broadcast;

/// Application-wide signal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// The dashboard should reload its collections
    DashboardRefresh,
}

/// Shared broadcast bus for [`AppEvent`]s
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus with a small buffer; listeners that lag simply miss
    /// stale refresh requests
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; a bus with no listeners drops it silently
    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
