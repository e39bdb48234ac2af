pub mod preferences;
pub mod session;
pub mod store;

use crate::api::lookup::{OPENWEATHER_BASE_URL, WIKIPEDIA_BASE_URL};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use preferences::{Preferences, SettingsStore, Theme};
pub use session::SessionStore;
pub use store::{
    FileStore, KeyValueStore, MemoryStore, StoreError, KEY_THEME, KEY_TOKEN, KEY_USERNAME,
    KEY_VOICE_ENABLED, KEY_VOICE_SPEED,
};

pub const APP_DIR_NAME: &str = "assistant-chat";
pub const ENV_VAR: &str = "ASSISTANT_ENV";
pub const API_URL_VAR: &str = "ASSISTANT_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_api_url(self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:5000",
            Environment::Production => "https://ai-assistant-backend.onrender.com",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    /// Overrides the environment's default backend URL.
    #[serde(default)]
    pub api_url: Option<String>,
    pub request_timeout_secs: u64,
    pub notification_secs: u64,
    pub clock_refresh_secs: u64,
    pub tip_refresh_secs: u64,
    #[serde(default)]
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub wikipedia_base_url: String,
    /// Program plus arguments that records one utterance and prints the
    /// transcript on stdout. Unset means speech input is unsupported.
    #[serde(default)]
    pub recognizer_command: Option<Vec<String>>,
    /// TTS program override; by default `espeak` or `say` is used.
    #[serde(default)]
    pub synthesizer_command: Option<String>,
    /// Drop replies older than the newest one already rendered.
    #[serde(default)]
    pub discard_stale_responses: bool,
    pub storage_path: PathBuf,
    pub window_size: (f32, f32),
}

impl Default for AppConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME);

        Self {
            environment: Environment::Development,
            api_url: None,
            request_timeout_secs: 30,
            notification_secs: 5,
            clock_refresh_secs: 1,
            tip_refresh_secs: 10,
            weather_api_key: None,
            weather_base_url: OPENWEATHER_BASE_URL.to_string(),
            wikipedia_base_url: WIKIPEDIA_BASE_URL.to_string(),
            recognizer_command: None,
            synthesizer_command: None,
            discard_stale_responses: false,
            storage_path: config_dir.join("storage.json"),
            window_size: (1200.0, 800.0),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            // Create default config and save it
            let config = Self::default();
            config.save()?;
            config
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        Ok(config_dir.join(APP_DIR_NAME).join("config.json"))
    }

    /// Applies `ASSISTANT_ENV` and `ASSISTANT_API_URL` on top of the file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_VAR) {
            match Environment::parse(&raw) {
                Some(env) => self.environment = env,
                None => tracing::warn!("Ignoring unknown {}={:?}", ENV_VAR, raw),
            }
        }
        if let Some(url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            self.api_url = Some(url);
        }
        self
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| self.environment.default_api_url().to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_url();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!("API URL must be http(s): {}", url));
        }

        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Request timeout must be greater than 0"));
        }

        if self.clock_refresh_secs == 0 || self.tip_refresh_secs == 0 {
            return Err(anyhow::anyhow!("Refresh intervals must be greater than 0"));
        }

        if let Some(cmd) = &self.recognizer_command {
            if cmd.is_empty() {
                return Err(anyhow::anyhow!("Recognizer command must name a program"));
            }
        }

        Ok(())
    }
}
