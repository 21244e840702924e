//! Integration Tests for TUI + Core
//!
//! These tests verify the full chat-turn flow between the TUI's modal
//! plumbing and the core controllers, using the simulated backend.
//!
//! # Test Coverage
//!
//! 1. **Confirmed action**: turn → modal request → confirm → execution,
//!    refresh broadcast when the dashboard is the active page
//! 2. **Declined action**: turn → modal request → decline, no side effect
//! 3. **Dismissed dialog**: a dropped modal counts as declined

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use teller_core::models::{MessageRole, Session};
use teller_core::voice::{NullSpeechPlatform, VoiceAdapter};
use teller_core::{AppEvent, ChatController, EventBus, MockApi, SessionStore, TurnOutcome};
use teller_tui::prompt::TuiPrompt;
use teller_tui::widgets::ModalRequest;

const TURN_TIMEOUT: Duration = Duration::from_secs(5);

fn chat_controller() -> Arc<ChatController> {
    let session = SessionStore::in_memory();
    session
        .store(Session {
            token: "tok".to_string(),
            user_id: 1,
            profile: None,
        })
        .unwrap();

    Arc::new(ChatController::new(
        Arc::new(MockApi::new()),
        session,
        Arc::new(VoiceAdapter::new(Arc::new(NullSpeechPlatform), false)),
        EventBus::new(),
    ))
}

/// Run one turn in the background and hand back the modal request the
/// way the app's event loop would receive it.
async fn start_turn(
    chat: &Arc<ChatController>,
    text: &str,
    dashboard_active: bool,
) -> (
    tokio::task::JoinHandle<TurnOutcome>,
    ModalRequest,
) {
    let (modal_tx, mut modal_rx) = mpsc::channel(8);
    let prompt = TuiPrompt::new(modal_tx);

    let turn = {
        let chat = Arc::clone(chat);
        let text = text.to_string();
        tokio::spawn(async move { chat.submit(&text, &prompt, dashboard_active).await })
    };

    let request = timeout(TURN_TIMEOUT, modal_rx.recv())
        .await
        .expect("modal request within the simulated delay")
        .expect("turn raises a confirm dialog");
    (turn, request)
}

#[tokio::test]
async fn test_confirmed_action_executes_and_broadcasts_refresh() {
    let chat = chat_controller();
    let mut events = chat.events().subscribe();

    let (turn, request) = start_turn(&chat, "сделай перевод", true).await;
    assert_eq!(request.title, "Подтвердить перевод");

    request.respond.send(true).unwrap();
    let outcome = timeout(TURN_TIMEOUT, turn).await.unwrap().unwrap();

    assert_eq!(
        outcome,
        TurnOutcome::ActionExecuted {
            success: true,
            detail: "Перевод выполнен".to_string(),
        }
    );
    // The dashboard was the active page, so the refresh signal fired
    assert_eq!(events.try_recv().unwrap(), AppEvent::DashboardRefresh);

    // User message, reply, confirmation
    let messages = chat.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].text, "Перевод выполнен");
}

#[tokio::test]
async fn test_confirmed_action_without_dashboard_stays_silent() {
    let chat = chat_controller();
    let mut events = chat.events().subscribe();

    let (turn, request) = start_turn(&chat, "сделай перевод", false).await;
    request.respond.send(true).unwrap();
    timeout(TURN_TIMEOUT, turn).await.unwrap().unwrap();

    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_declined_action_leaves_reply_and_nothing_else() {
    let chat = chat_controller();
    let mut events = chat.events().subscribe();

    let (turn, request) = start_turn(&chat, "хочу накопить на машину", true).await;
    request.respond.send(false).unwrap();

    let outcome = timeout(TURN_TIMEOUT, turn).await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::ActionDeclined);
    assert!(events.try_recv().is_err());

    // The assistant reply is present exactly once; declining added nothing
    let messages = chat.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_dismissed_dialog_counts_as_declined() {
    let chat = chat_controller();

    let (turn, request) = start_turn(&chat, "сделай перевод", true).await;
    // The event loop dropped the request without answering (e.g. quit)
    drop(request);

    let outcome = timeout(TURN_TIMEOUT, turn).await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::ActionDeclined);
}
