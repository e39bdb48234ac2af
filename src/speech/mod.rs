pub mod recognizer;
pub mod synthesis;

use async_trait::async_trait;
use std::sync::Arc;

pub use recognizer::{CommandRecognizer, UnsupportedRecognizer};
pub use synthesis::{CommandSynthesizer, SilentSynthesizer, SpeechSynthesizer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech recognition is not supported")]
    Unsupported,

    #[error("microphone access denied")]
    PermissionDenied,

    #[error("no speech detected")]
    NoSpeech,

    #[error("recognition aborted")]
    Aborted,

    #[error("recognition failed: {0}")]
    Recognition(String),
}

impl SpeechError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            SpeechError::Unsupported => {
                "Speech recognition is not supported on this system.".to_string()
            }
            SpeechError::PermissionDenied => {
                "Please allow microphone access to use voice commands".to_string()
            }
            SpeechError::NoSpeech => "Error: no-speech".to_string(),
            SpeechError::Aborted => "Error: aborted".to_string(),
            SpeechError::Recognition(detail) => format!("Error: {}", detail),
        }
    }
}

/// Turns microphone audio into one finalized utterance.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Resolves once the microphone may be used. May block on a user prompt.
    async fn request_permission(&self) -> Result<(), SpeechError>;

    /// Records a single utterance and returns its transcript.
    async fn listen(&self) -> Result<String, SpeechError>;

    /// Ends an in-flight [`listen`](Self::listen), which then fails with
    /// [`SpeechError::Aborted`].
    fn stop(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    Idle,
    RequestingPermission,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEventKind {
    PermissionGranted,
    /// Lowercased transcript.
    Transcript(String),
    Failed(SpeechError),
}

/// Progress report from a recognition cycle started by [`SpeechInput::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEvent {
    pub cycle: u64,
    pub kind: SpeechEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Started,
    Stopped,
    /// A permission prompt is still open.
    Busy,
}

/// Speech input state machine: `Idle -> RequestingPermission -> Listening -> Idle`.
///
/// Each [`start`](Self::start) opens a new cycle. Events from an older cycle
/// are ignored by [`apply`](Self::apply), so a late abort from a stopped
/// session cannot knock a fresh one back to idle.
pub struct SpeechInput {
    recognizer: Arc<dyn SpeechRecognizer>,
    state: ListenState,
    cycle: u64,
}

impl SpeechInput {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer,
            state: ListenState::Idle,
            cycle: 0,
        }
    }

    pub fn state(&self) -> ListenState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListenState::Listening
    }

    pub fn toggle<F>(&mut self, emit: F) -> Toggle
    where
        F: Fn(SpeechEvent) + Send + Sync + 'static,
    {
        match self.state {
            ListenState::Listening => {
                self.stop();
                Toggle::Stopped
            }
            ListenState::RequestingPermission => Toggle::Busy,
            ListenState::Idle => {
                self.start(emit);
                Toggle::Started
            }
        }
    }

    /// Spawns a recognition cycle. Must be called inside a tokio runtime.
    pub fn start<F>(&mut self, emit: F)
    where
        F: Fn(SpeechEvent) + Send + Sync + 'static,
    {
        if self.state != ListenState::Idle {
            return;
        }

        self.cycle += 1;
        self.state = ListenState::RequestingPermission;
        let cycle = self.cycle;
        let recognizer = self.recognizer.clone();
        tracing::debug!("Starting speech cycle {}", cycle);

        tokio::spawn(async move {
            let send = |kind| emit(SpeechEvent { cycle, kind });

            if let Err(e) = recognizer.request_permission().await {
                send(SpeechEventKind::Failed(e));
                return;
            }
            send(SpeechEventKind::PermissionGranted);

            match recognizer.listen().await {
                Ok(transcript) => send(SpeechEventKind::Transcript(transcript.trim().to_lowercase())),
                Err(e) => send(SpeechEventKind::Failed(e)),
            }
        });
    }

    pub fn stop(&mut self) {
        if self.state == ListenState::Listening {
            self.recognizer.stop();
            self.state = ListenState::Idle;
        }
    }

    /// Advances the state machine. Returns `false` for events of a stale cycle.
    pub fn apply(&mut self, event: &SpeechEvent) -> bool {
        if event.cycle != self.cycle {
            tracing::debug!("Ignoring event from speech cycle {}", event.cycle);
            return false;
        }

        self.state = match event.kind {
            SpeechEventKind::PermissionGranted if self.state == ListenState::RequestingPermission => {
                ListenState::Listening
            }
            // Stopped by the user before the grant arrived.
            SpeechEventKind::PermissionGranted => ListenState::Idle,
            SpeechEventKind::Transcript(_) | SpeechEventKind::Failed(_) => ListenState::Idle,
        };
        true
    }
}
