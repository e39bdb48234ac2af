use super::{SpeechError, SpeechRecognizer};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Exit status a recognizer command uses to report a refused microphone
/// (`EX_NOPERM` from sysexits.h).
pub const EXIT_PERMISSION_DENIED: i32 = 77;

/// Used when no recognizer is configured.
pub struct UnsupportedRecognizer;

#[async_trait]
impl SpeechRecognizer for UnsupportedRecognizer {
    async fn request_permission(&self) -> Result<(), SpeechError> {
        Err(SpeechError::Unsupported)
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unsupported)
    }

    fn stop(&self) {}
}

/// Delegates recognition to an external program that records one utterance
/// and prints its transcript on stdout.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    /// Cancelled by `stop`. A fresh token is issued at the start of every
    /// cycle, so a stop that lands before `listen` runs is not lost.
    cycle: Mutex<CancellationToken>,
}

impl CommandRecognizer {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            cycle: Mutex::new(CancellationToken::new()),
        })
    }

    fn resolve_program(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    fn current_token(&self) -> CancellationToken {
        match self.cycle.lock() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn begin_cycle(&self) {
        let mut token = match self.cycle.lock() {
            Ok(token) => token,
            Err(poisoned) => poisoned.into_inner(),
        };
        *token = CancellationToken::new();
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn request_permission(&self) -> Result<(), SpeechError> {
        self.begin_cycle();
        match self.resolve_program() {
            Some(path) => {
                tracing::debug!("Speech recognizer resolved to {:?}", path);
                Ok(())
            }
            None => {
                tracing::warn!("Speech recognizer {:?} not found", self.program);
                Err(SpeechError::Unsupported)
            }
        }
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        let cancel = self.current_token();
        if cancel.is_cancelled() {
            tracing::info!("Speech recognition stopped before it started");
            return Err(SpeechError::Aborted);
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SpeechError::Unsupported,
                std::io::ErrorKind::PermissionDenied => SpeechError::PermissionDenied,
                _ => SpeechError::Recognition(e.to_string()),
            })?;

        tracing::info!("Speech recognition started");

        // Dropping the output future kills the child.
        let output = tokio::select! {
            output = child.wait_with_output() => {
                output.map_err(|e| SpeechError::Recognition(e.to_string()))?
            }
            _ = cancel.cancelled() => {
                tracing::info!("Speech recognition stopped");
                return Err(SpeechError::Aborted);
            }
        };

        if output.status.code() == Some(EXIT_PERMISSION_DENIED) {
            return Err(SpeechError::PermissionDenied);
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(|line| line.trim().to_string())
                .unwrap_or_else(|| format!("recognizer exited with {}", output.status));
            return Err(SpeechError::Recognition(detail));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(SpeechError::NoSpeech);
        }
        tracing::info!("Recognized command: {}", transcript);
        Ok(transcript)
    }

    fn stop(&self) {
        self.current_token().cancel();
    }
}
