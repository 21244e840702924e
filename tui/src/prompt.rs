//! Modal Prompt Bridge
//!
//! Implements the chat controller's confirm seam on top of the TUI's
//! modal widget: a background turn sends a [`ModalRequest`] to the event
//! loop, the loop shows the dialog, and the user's keypress resolves the
//! awaiting controller.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use teller_core::chat::ConfirmPrompt;

use crate::widgets::ModalRequest;

/// Confirm prompt delivered through the app's modal queue
#[derive(Clone)]
pub struct TuiPrompt {
    requests: mpsc::Sender<ModalRequest>,
}

impl TuiPrompt {
    /// Bridge to the given modal queue
    pub fn new(requests: mpsc::Sender<ModalRequest>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl ConfirmPrompt for TuiPrompt {
    async fn confirm(&self, title: &str, description: &str) -> bool {
        let (respond, choice) = oneshot::channel();
        let request = ModalRequest {
            title: title.to_string(),
            description: description.to_string(),
            respond,
        };
        if self.requests.send(request).await.is_err() {
            // The UI is gone; treat as declined
            return false;
        }
        choice.await.unwrap_or(false)
    }
}
