use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

pub trait SpeechSynthesizer: Send + Sync {
    /// Starts speaking `text`, replacing anything still being spoken.
    fn speak(&self, text: &str, rate: f32);
    fn cancel(&self);
}

pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, _text: &str, _rate: f32) {}
    fn cancel(&self) {}
}

/// Speaks through a system TTS program: `say` on macOS, `espeak` elsewhere.
pub struct CommandSynthesizer {
    program: String,
    current: Mutex<Option<Child>>,
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        let program = if cfg!(target_os = "macos") { "say" } else { "espeak" };
        Self::with_program(program)
    }
}

impl CommandSynthesizer {
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
            current: Mutex::new(None),
        }
    }

    /// `program`, or the platform default, if it can be found on `PATH`.
    pub fn locate(program: Option<&str>) -> Option<Self> {
        let synthesizer = match program {
            Some(program) => Self::with_program(program),
            None => Self::default(),
        };
        match which::which(&synthesizer.program) {
            Ok(path) => {
                tracing::debug!("Speech synthesis via {:?}", path);
                Some(synthesizer)
            }
            Err(e) => {
                tracing::info!("No speech synthesizer {:?}: {}", synthesizer.program, e);
                None
            }
        }
    }

    fn rate_flag(&self) -> &'static str {
        if self.program.ends_with("say") { "-r" } else { "-s" }
    }
}

pub fn words_per_minute(rate: f32) -> u32 {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    (BASE_WORDS_PER_MINUTE * rate).round() as u32
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str, rate: f32) {
        self.cancel();

        let spawned = Command::new(&self.program)
            .arg(self.rate_flag())
            .arg(words_per_minute(rate).to_string())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                if let Ok(mut current) = self.current.lock() {
                    *current = Some(child);
                }
            }
            Err(e) => tracing::warn!("Speech synthesis via {:?} failed: {}", self.program, e),
        }
    }

    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(mut child) = current.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}
