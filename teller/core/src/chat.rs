//! Chat Interaction Controller
//!
//! Drives one assistant turn:
//!
//! ```text
//! AwaitingInput → Sending → AwaitingResponse
//!                               │
//!                 ┌─────────────┴──────────────┐
//!                 │ (reply carries an action)  │
//!                 ▼                            ▼
//!        AwaitingConfirmation → Executing   AwaitingInput
//!                 │
//!                 ▼
//!           AwaitingInput
//! ```
//!
//! The controller owns the transcript. Surfaces render snapshots of it
//! and feed user input back in; the confirm dialog is a trait seam the
//! surface implements. One attempt per user turn — a failed reply
//! appends a fixed apology and ends the turn, no retry.
//!
//! Nothing prevents a second submit while a turn is in flight except the
//! already-cleared input buffer; overlapping turns interleave indicator
//! placeholders. That is accepted behavior — the transcript lock keeps
//! it unordered, never corrupt.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::BankApi;
use crate::events::{AppEvent, EventBus};
use crate::models::{ChatMessage, MessageId, MessageRole, SuggestedAction};
use crate::session::SessionStore;
use crate::voice::{VoiceAdapter, VoiceError};

/// Fixed apology appended when the reply endpoint fails
pub const APOLOGY_REPLY: &str =
    "Извините, сейчас я не могу ответить. Попробуйте ещё раз чуть позже.";

/// Appended when an executed action reports failure
pub const ACTION_FAILED_REPLY: &str = "Не удалось выполнить действие. Попробуйте позже.";

/// Fallback confirmation text for actions without their own result text
pub const ACTION_DONE_REPLY: &str = "Готово! Действие выполнено.";

const DEFAULT_ACTION_TITLE: &str = "Подтвердите действие";
const DEFAULT_ACTION_DESCRIPTION: &str = "Ассистент предлагает выполнить операцию.";

/// Blocking confirm dialog seam, implemented by the surface.
///
/// Resolves exactly once per call; the controller awaits the choice.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    /// Present the dialog and resolve with the user's choice
    async fn confirm(&self, title: &str, description: &str) -> bool;
}

/// How a submitted turn ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input (or no session): nothing happened
    Ignored,
    /// Plain reply appended
    Replied,
    /// Reply endpoint failed; apology appended
    ReplyFailed,
    /// The user declined the suggested action
    ActionDeclined,
    /// The suggested action was submitted for execution
    ActionExecuted {
        /// Whether the server carried it out
        success: bool,
        /// Result text for the surface's toast
        detail: String,
    },
}

/// Controller owning the chat transcript and the per-turn state machine
pub struct ChatController {
    api: Arc<dyn BankApi>,
    session: SessionStore,
    voice: Arc<VoiceAdapter>,
    events: EventBus,
    transcript: Mutex<Transcript>,
}

#[derive(Default)]
struct Transcript {
    messages: Vec<ChatMessage>,
    indicator: Option<MessageId>,
}

impl ChatController {
    /// Wire a controller to its collaborators
    pub fn new(
        api: Arc<dyn BankApi>,
        session: SessionStore,
        voice: Arc<VoiceAdapter>,
        events: EventBus,
    ) -> Self {
        Self {
            api,
            session,
            voice,
            events,
            transcript: Mutex::new(Transcript::default()),
        }
    }

    /// Snapshot of the transcript for rendering
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().messages.clone()
    }

    /// The voice adapter this controller speaks through
    pub fn voice(&self) -> &VoiceAdapter {
        &self.voice
    }

    /// The bus carrying the dashboard-refresh signal
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run one turn for explicit text input.
    ///
    /// `dashboard_active` tells the controller whether the dashboard is
    /// the current page, which gates the refresh broadcast after a
    /// successful action.
    pub async fn submit(
        &self,
        raw: &str,
        prompt: &dyn ConfirmPrompt,
        dashboard_active: bool,
    ) -> TurnOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }
        let Some(user_id) = self.session.user_id() else {
            return TurnOutcome::Ignored;
        };

        self.push_message(MessageRole::User, text);
        self.show_indicator();
        tracing::debug!(user_id, "assistant turn started");

        match self.api.assistant_reply(user_id, text).await {
            Ok(reply) => {
                self.clear_indicator();
                self.push_message(MessageRole::Assistant, &reply.text);
                self.voice.speak(&reply.text);

                match reply.suggested_action {
                    Some(action) => {
                        self.run_action(user_id, action, prompt, dashboard_active)
                            .await
                    }
                    None => TurnOutcome::Replied,
                }
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "assistant reply failed");
                self.clear_indicator();
                self.push_message(MessageRole::Assistant, APOLOGY_REPLY);
                TurnOutcome::ReplyFailed
            }
        }
    }

    /// Listen for one utterance and auto-send the transcript as a turn
    pub async fn submit_voice(
        &self,
        prompt: &dyn ConfirmPrompt,
        dashboard_active: bool,
    ) -> Result<TurnOutcome, VoiceError> {
        let transcript = self.voice.start_listening().await?;
        Ok(self.submit(&transcript, prompt, dashboard_active).await)
    }

    async fn run_action(
        &self,
        user_id: i64,
        action: SuggestedAction,
        prompt: &dyn ConfirmPrompt,
        dashboard_active: bool,
    ) -> TurnOutcome {
        let title = action.title.as_deref().unwrap_or(DEFAULT_ACTION_TITLE);
        let description = action
            .description
            .as_deref()
            .unwrap_or(DEFAULT_ACTION_DESCRIPTION);

        if !prompt.confirm(title, description).await {
            // Declined: no side effect, the reply stays as-is
            return TurnOutcome::ActionDeclined;
        }

        match self.api.execute_action(user_id, &action).await {
            Ok(result) if result.success => {
                let confirmation = if result.result.is_empty() {
                    ACTION_DONE_REPLY.to_string()
                } else {
                    result.result.clone()
                };
                self.push_message(MessageRole::Assistant, &confirmation);
                if dashboard_active {
                    self.events.emit(AppEvent::DashboardRefresh);
                }
                TurnOutcome::ActionExecuted {
                    success: true,
                    detail: result.result,
                }
            }
            Ok(result) => {
                self.push_message(MessageRole::Assistant, ACTION_FAILED_REPLY);
                TurnOutcome::ActionExecuted {
                    success: false,
                    detail: result.result,
                }
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "action execution failed");
                self.push_message(MessageRole::Assistant, ACTION_FAILED_REPLY);
                TurnOutcome::ActionExecuted {
                    success: false,
                    detail: err.to_string(),
                }
            }
        }
    }

    fn push_message(&self, role: MessageRole, text: &str) -> MessageId {
        let msg = ChatMessage::new(role, text);
        let id = msg.id;
        self.transcript.lock().messages.push(msg);
        id
    }

    /// Append the typing indicator, replacing a leftover one so at most
    /// one placeholder exists at a time.
    fn show_indicator(&self) {
        let mut transcript = self.transcript.lock();
        if let Some(stale) = transcript.indicator.take() {
            transcript.messages.retain(|m| m.id != stale);
        }
        let indicator = ChatMessage::typing_indicator();
        transcript.indicator = Some(indicator.id);
        transcript.messages.push(indicator);
    }

    fn clear_indicator(&self) {
        let mut transcript = self.transcript.lock();
        if let Some(id) = transcript.indicator.take() {
            transcript.messages.retain(|m| m.id != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockApi, BALANCE_REPLY};
    use crate::models::{
        AdminLogEntry, AssistantReply, AuthResponse, ExecutionResult, Goal, LogFilter, NewGoal,
        Session, Transaction,
    };
    use crate::voice::{NullSpeechPlatform, RecognitionEvent, SpeechPlatform};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Prompt with a fixed answer, counting how often it was shown
    struct FixedPrompt {
        answer: bool,
        shown: AtomicUsize,
    }

    impl FixedPrompt {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                shown: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ConfirmPrompt for FixedPrompt {
        async fn confirm(&self, _title: &str, _description: &str) -> bool {
            self.shown.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    /// Backend whose reply endpoint always fails, counting calls
    struct FailingApi {
        reply_calls: AtomicUsize,
    }

    #[async_trait]
    impl BankApi for FailingApi {
        fn name(&self) -> &str {
            "failing"
        }

        async fn login(&self, _: &str, _: &str) -> Result<AuthResponse, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn register(&self, _: &str, _: &str, _: &str) -> Result<AuthResponse, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn goals(&self, _: i64) -> Result<Vec<Goal>, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn create_goal(&self, _: i64, _: &NewGoal) -> Result<Goal, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn transactions(&self, _: i64) -> Result<Vec<Transaction>, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn assistant_reply(&self, _: i64, _: &str) -> Result<AssistantReply, ApiError> {
            self.reply_calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }

        async fn execute_action(
            &self,
            _: i64,
            _: &SuggestedAction,
        ) -> Result<ExecutionResult, ApiError> {
            unimplemented!("not used in chat tests")
        }

        async fn admin_logs(&self, _: &LogFilter) -> Result<Vec<AdminLogEntry>, ApiError> {
            unimplemented!("not used in chat tests")
        }
    }

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

    fn controller_over(api: Arc<dyn BankApi>) -> ChatController {
        ChatController::new(
            api,
            signed_in_session(),
            Arc::new(VoiceAdapter::new(Arc::new(NullSpeechPlatform), false)),
            EventBus::new(),
        )
    }

    #[tokio::test]
    async fn test_empty_input_is_a_silent_noop() {
        let api = Arc::new(FailingApi {
            reply_calls: AtomicUsize::new(0),
        });
        let chat = controller_over(Arc::clone(&api) as Arc<dyn BankApi>);
        let prompt = FixedPrompt::new(true);

        assert_eq!(chat.submit("", &prompt, false).await, TurnOutcome::Ignored);
        assert_eq!(
            chat.submit("   \t ", &prompt, false).await,
            TurnOutcome::Ignored
        );

        // Never appends a message, never calls the reply endpoint
        assert!(chat.messages().is_empty());
        assert_eq!(api.reply_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plain_reply_turn() {
        let chat = controller_over(Arc::new(MockApi::new()));
        let prompt = FixedPrompt::new(true);

        let outcome = chat.submit("какой у меня баланс?", &prompt, false).await;
        assert_eq!(outcome, TurnOutcome::Replied);

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "какой у меня баланс?");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].text, BALANCE_REPLY);
        // The indicator is gone
        assert!(messages.iter().all(|m| !m.pending));
        // No dialog for a reply without an action
        assert_eq!(prompt.shown.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_reply_appends_fixed_apology_once() {
        let api = Arc::new(FailingApi {
            reply_calls: AtomicUsize::new(0),
        });
        let chat = controller_over(Arc::clone(&api) as Arc<dyn BankApi>);
        let prompt = FixedPrompt::new(true);

        let outcome = chat.submit("баланс", &prompt, false).await;
        assert_eq!(outcome, TurnOutcome::ReplyFailed);

        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, APOLOGY_REPLY);
        assert!(messages.iter().all(|m| !m.pending));
        // One attempt per turn, no retry
        assert_eq!(api.reply_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_declined_action_leaves_transcript_with_reply_once() {
        let chat = controller_over(Arc::new(MockApi::new()));
        let prompt = FixedPrompt::new(false);

        let outcome = chat.submit("хочу накопить на отпуск", &prompt, false).await;
        assert_eq!(outcome, TurnOutcome::ActionDeclined);
        assert_eq!(prompt.shown.load(Ordering::SeqCst), 1);

        // The assistant reply is present exactly once and nothing else
        // was appended by the declined action
        let messages = chat.messages();
        assert_eq!(messages.len(), 2);
        let reply_count = messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count();
        assert_eq!(reply_count, 1);
    }

    #[tokio::test]
    async fn test_confirmed_action_executes_and_appends_confirmation() {
        let chat = controller_over(Arc::new(MockApi::new()));
        let prompt = FixedPrompt::new(true);

        let outcome = chat.submit("сделай перевод", &prompt, false).await;
        assert_eq!(
            outcome,
            TurnOutcome::ActionExecuted {
                success: true,
                detail: "Перевод выполнен".to_string(),
            }
        );

        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].text, "Перевод выполнен");
    }

    #[tokio::test]
    async fn test_refresh_broadcast_only_when_dashboard_active() {
        let chat = controller_over(Arc::new(MockApi::new()));
        let prompt = FixedPrompt::new(true);
        let mut events = chat.events().subscribe();

        chat.submit("сделай перевод", &prompt, false).await;
        assert!(events.try_recv().is_err());

        chat.submit("сделай перевод", &prompt, true).await;
        assert_eq!(events.try_recv().unwrap(), AppEvent::DashboardRefresh);
    }

    #[tokio::test]
    async fn test_indicator_present_while_reply_pending() {
        let chat = Arc::new(controller_over(Arc::new(MockApi::new())));

        let turn = {
            let chat = Arc::clone(&chat);
            tokio::spawn(async move {
                let prompt = FixedPrompt::new(true);
                chat.submit("баланс", &prompt, false).await
            })
        };

        // While the mock delay runs, the transcript shows the user
        // message plus one pending indicator
        let mut saw_indicator = false;
        for _ in 0..50 {
            let messages = chat.messages();
            if messages.iter().filter(|m| m.pending).count() == 1 {
                saw_indicator = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(saw_indicator);

        turn.await.unwrap();
        assert!(chat.messages().iter().all(|m| !m.pending));
    }

    #[tokio::test]
    async fn test_voice_submit_autosends_transcript() {
        struct OneShotPlatform;

        #[async_trait]
        impl SpeechPlatform for OneShotPlatform {
            fn name(&self) -> &str {
                "oneshot"
            }
            fn available(&self) -> bool {
                true
            }
            async fn start_recognition(
                &self,
            ) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
                let (tx, rx) = mpsc::channel(1);
                let _ = tx
                    .send(RecognitionEvent::Transcript("покажи баланс".to_string()))
                    .await;
                Ok(rx)
            }
            fn cancel_recognition(&self) {}
            fn start_utterance(&self, _: &str) {}
            fn cancel_utterance(&self) {}
        }

        let chat = ChatController::new(
            Arc::new(MockApi::new()),
            signed_in_session(),
            Arc::new(VoiceAdapter::new(Arc::new(OneShotPlatform), false)),
            EventBus::new(),
        );
        let prompt = FixedPrompt::new(true);

        let outcome = chat.submit_voice(&prompt, false).await.unwrap();
        assert_eq!(outcome, TurnOutcome::Replied);
        assert_eq!(chat.messages()[0].text, "покажи баланс");
    }

    #[tokio::test]
    async fn test_reply_is_spoken_when_speech_enabled() {
        struct RecordingPlatform {
            spoken: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl SpeechPlatform for RecordingPlatform {
            fn name(&self) -> &str {
                "recording"
            }
            fn available(&self) -> bool {
                true
            }
            async fn start_recognition(
                &self,
            ) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
                Err(VoiceError::Unavailable)
            }
            fn cancel_recognition(&self) {}
            fn start_utterance(&self, text: &str) {
                self.spoken.lock().push(text.to_string());
            }
            fn cancel_utterance(&self) {}
        }

        let platform = Arc::new(RecordingPlatform {
            spoken: Mutex::new(Vec::new()),
        });
        let chat = ChatController::new(
            Arc::new(MockApi::new()),
            signed_in_session(),
            Arc::new(VoiceAdapter::new(
                Arc::clone(&platform) as Arc<dyn SpeechPlatform>,
                true,
            )),
            EventBus::new(),
        );
        let prompt = FixedPrompt::new(true);

        chat.submit("баланс", &prompt, false).await;
        assert_eq!(*platform.spoken.lock(), vec![BALANCE_REPLY.to_string()]);
    }
}
