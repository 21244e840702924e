//! Voice I/O Adapter
//!
//! Wraps a platform's speech-to-text and text-to-speech behind an
//! explicit state machine. Listening and speaking are independent axes;
//! the calling controller treats them as sequential.
//!
//! # Design Philosophy
//!
//! Platform capability is a trait seam ([`SpeechPlatform`]) probed once at
//! init: a surface without audio wires in [`NullSpeechPlatform`] and the
//! voice feature is disabled there rather than erroring at use time.
//! Recognition results are awaitable — [`VoiceAdapter::start_listening`]
//! resolves with the final transcript instead of firing ad hoc callbacks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Voice failures surfaced to the caller
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The platform has no speech capability
    #[error("speech recognition is not available on this platform")]
    Unavailable,
    /// A recognition session is already running
    #[error("a recognition session is already running")]
    AlreadyListening,
    /// The in-flight session was cancelled via `stop_listening`
    #[error("recognition was cancelled")]
    Cancelled,
    /// The platform reported a recognition failure
    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Terminal event of a recognition session
#[derive(Clone, Debug)]
pub enum RecognitionEvent {
    /// The final transcript
    Transcript(String),
    /// The platform failed
    Error(String),
}

/// Platform seam for speech recognition and synthesis
///
/// A recognition session delivers exactly one [`RecognitionEvent`];
/// dropping the sender without an event means the session was cancelled.
/// Synthesis calls are fire-and-forget.
#[async_trait]
pub trait SpeechPlatform: Send + Sync {
    /// Platform name for diagnostics
    fn name(&self) -> &str;

    /// Whether recognition and synthesis are usable here
    fn available(&self) -> bool;

    /// Open a recognition session
    async fn start_recognition(&self) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError>;

    /// Cancel the in-flight recognition session, if any
    fn cancel_recognition(&self);

    /// Start speaking `text`
    fn start_utterance(&self, text: &str);

    /// Cancel the in-progress utterance, if any
    fn cancel_utterance(&self);
}

/// State machine over a [`SpeechPlatform`]
pub struct VoiceAdapter {
    platform: Arc<dyn SpeechPlatform>,
    listening: AtomicBool,
    speech_enabled: AtomicBool,
}

impl VoiceAdapter {
    /// Wrap a platform; `speech_enabled` comes from persisted config
    pub fn new(platform: Arc<dyn SpeechPlatform>, speech_enabled: bool) -> Self {
        if !platform.available() {
            tracing::info!(platform = platform.name(), "voice input disabled");
        }
        Self {
            platform,
            listening: AtomicBool::new(false),
            speech_enabled: AtomicBool::new(speech_enabled),
        }
    }

    /// Whether the platform can recognize speech at all
    pub fn recognition_available(&self) -> bool {
        self.platform.available()
    }

    /// Whether a recognition session is in flight
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Listen for one utterance and resolve with the final transcript.
    ///
    /// Fails immediately when the capability is absent or a session is
    /// already running; always returns to idle afterwards.
    pub async fn start_listening(&self) -> Result<String, VoiceError> {
        if !self.platform.available() {
            return Err(VoiceError::Unavailable);
        }
        if self.listening.swap(true, Ordering::SeqCst) {
            return Err(VoiceError::AlreadyListening);
        }

        let result = self.listen_inner().await;
        self.listening.store(false, Ordering::SeqCst);
        result
    }

    async fn listen_inner(&self) -> Result<String, VoiceError> {
        let mut rx = self.platform.start_recognition().await?;
        match rx.recv().await {
            Some(RecognitionEvent::Transcript(text)) => Ok(text),
            Some(RecognitionEvent::Error(reason)) => Err(VoiceError::Recognition(reason)),
            None => Err(VoiceError::Cancelled),
        }
    }

    /// Cancel the in-flight recognition session; no-op when idle
    pub fn stop_listening(&self) {
        if self.listening.load(Ordering::SeqCst) {
            self.platform.cancel_recognition();
        }
    }

    /// Speak `text` aloud. No-op while speech output is disabled;
    /// otherwise the previous utterance is cancelled first — at most one
    /// utterance is audible, last call wins.
    pub fn speak(&self, text: &str) {
        if !self.speech_enabled.load(Ordering::SeqCst) {
            return;
        }
        self.platform.cancel_utterance();
        self.platform.start_utterance(text);
    }

    /// Cancel the in-progress utterance; no-op if none
    pub fn stop_speaking(&self) {
        self.platform.cancel_utterance();
    }

    /// Whether assistant replies are spoken aloud
    pub fn speech_enabled(&self) -> bool {
        self.speech_enabled.load(Ordering::SeqCst)
    }

    /// Flip the speech-output toggle. Disabling also cancels any
    /// in-progress utterance. The caller persists the new value.
    pub fn set_speech_enabled(&self, enabled: bool) {
        self.speech_enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.platform.cancel_utterance();
        }
    }
}

/// Platform for surfaces without audio hardware
pub struct NullSpeechPlatform;

#[async_trait]
impl SpeechPlatform for NullSpeechPlatform {
    fn name(&self) -> &str {
        "none"
    }

    fn available(&self) -> bool {
        false
    }

    async fn start_recognition(&self) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
        Err(VoiceError::Unavailable)
    }

    fn cancel_recognition(&self) {}

    fn start_utterance(&self, _text: &str) {}

    fn cancel_utterance(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Scripted platform: hands out queued recognition outcomes and
    /// records every synthesis call.
    struct ScriptedPlatform {
        outcomes: Mutex<Vec<RecognitionEvent>>,
        live_session: Mutex<Option<mpsc::Sender<RecognitionEvent>>>,
        spoken: Mutex<Vec<String>>,
        cancelled_utterances: AtomicUsize,
    }

    impl ScriptedPlatform {
        fn new(outcomes: Vec<RecognitionEvent>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                live_session: Mutex::new(None),
                spoken: Mutex::new(Vec::new()),
                cancelled_utterances: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpeechPlatform for ScriptedPlatform {
        fn name(&self) -> &str {
            "scripted"
        }

        fn available(&self) -> bool {
            true
        }

        async fn start_recognition(&self) -> Result<mpsc::Receiver<RecognitionEvent>, VoiceError> {
            let (tx, rx) = mpsc::channel(1);
            let next = self.outcomes.lock().pop();
            if let Some(event) = next {
                let _ = tx.send(event).await;
            } else {
                // Keep the session open until cancelled
                *self.live_session.lock() = Some(tx);
            }
            Ok(rx)
        }

        fn cancel_recognition(&self) {
            self.live_session.lock().take();
        }

        fn start_utterance(&self, text: &str) {
            self.spoken.lock().push(text.to_string());
        }

        fn cancel_utterance(&self) {
            self.cancelled_utterances.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_listen_resolves_with_transcript_and_returns_to_idle() {
        let platform = Arc::new(ScriptedPlatform::new(vec![RecognitionEvent::Transcript(
            "какой у меня баланс".to_string(),
        )]));
        let adapter = VoiceAdapter::new(platform, true);

        let transcript = adapter.start_listening().await.unwrap();
        assert_eq!(transcript, "какой у меня баланс");
        assert!(!adapter.is_listening());
    }

    #[tokio::test]
    async fn test_listen_fails_when_capability_absent() {
        let adapter = VoiceAdapter::new(Arc::new(NullSpeechPlatform), true);
        assert!(matches!(
            adapter.start_listening().await,
            Err(VoiceError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_second_listen_rejected_while_in_flight() {
        let platform = Arc::new(ScriptedPlatform::new(vec![]));
        let adapter = Arc::new(VoiceAdapter::new(
            Arc::clone(&platform) as Arc<dyn SpeechPlatform>,
            true,
        ));

        let background = {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move { adapter.start_listening().await })
        };
        // Wait until the first session is actually open
        while platform.live_session.lock().is_none() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            adapter.start_listening().await,
            Err(VoiceError::AlreadyListening)
        ));

        adapter.stop_listening();
        let result = background.await.unwrap();
        assert!(matches!(result, Err(VoiceError::Cancelled)));
        assert!(!adapter.is_listening());
    }

    #[tokio::test]
    async fn test_platform_error_resolves_and_returns_to_idle() {
        let platform = Arc::new(ScriptedPlatform::new(vec![RecognitionEvent::Error(
            "microphone busy".to_string(),
        )]));
        let adapter = VoiceAdapter::new(platform, true);

        assert!(matches!(
            adapter.start_listening().await,
            Err(VoiceError::Recognition(_))
        ));
        assert!(!adapter.is_listening());
    }

    #[tokio::test]
    async fn test_stop_listening_when_idle_is_noop() {
        let platform = Arc::new(ScriptedPlatform::new(vec![]));
        let adapter = VoiceAdapter::new(Arc::clone(&platform) as Arc<dyn SpeechPlatform>, true);
        adapter.stop_listening();
        assert!(platform.live_session.lock().is_none());
    }

    #[test]
    fn test_speak_cancels_previous_utterance_last_call_wins() {
        let platform = Arc::new(ScriptedPlatform::new(vec![]));
        let adapter = VoiceAdapter::new(Arc::clone(&platform) as Arc<dyn SpeechPlatform>, true);

        adapter.speak("первый ответ");
        adapter.speak("второй ответ");

        assert_eq!(
            *platform.spoken.lock(),
            vec!["первый ответ".to_string(), "второй ответ".to_string()]
        );
        // Each speak cancels whatever was audible before it
        assert_eq!(platform.cancelled_utterances.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_disable_mid_utterance_stops_audio_and_mutes_later_speaks() {
        let platform = Arc::new(ScriptedPlatform::new(vec![]));
        let adapter = VoiceAdapter::new(Arc::clone(&platform) as Arc<dyn SpeechPlatform>, true);

        adapter.speak("длинный ответ ассистента");
        let cancels_before = platform.cancelled_utterances.load(Ordering::SeqCst);

        adapter.set_speech_enabled(false);
        assert_eq!(
            platform.cancelled_utterances.load(Ordering::SeqCst),
            cancels_before + 1
        );

        adapter.speak("не должно прозвучать");
        assert_eq!(platform.spoken.lock().len(), 1);

        adapter.set_speech_enabled(true);
        adapter.speak("снова слышно");
        assert_eq!(platform.spoken.lock().len(), 2);
    }
}
