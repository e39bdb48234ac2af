use super::store::{KeyValueStore, StoreError, KEY_THEME, KEY_VOICE_ENABLED, KEY_VOICE_SPEED};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_THEME: &str = "dark";
pub const DEFAULT_VOICE_SPEED: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
    /// Any other stored name. Kept verbatim so it round-trips through storage.
    Named(String),
}

impl Theme {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            "system" => Theme::System,
            other => Theme::Named(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
            Theme::Named(name) => name,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub theme: Theme,
    pub voice_enabled: bool,
    /// Raw stored speed; see [`Preferences::speech_rate`].
    pub voice_speed: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            voice_enabled: true,
            voice_speed: "1".to_string(),
        }
    }
}

impl Preferences {
    /// Numeric speech rate. Stored speed is not validated on write, so an
    /// unparsable value falls back to the default rate here.
    pub fn speech_rate(&self) -> f32 {
        self.voice_speed
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .unwrap_or(DEFAULT_VOICE_SPEED)
    }
}

/// Reads and writes [`Preferences`] through a [`KeyValueStore`]. Each setter
/// persists before returning.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Preferences {
        let theme = self
            .store
            .get(KEY_THEME)
            .unwrap_or_else(|| DEFAULT_THEME.to_string());
        // Anything but the literal "false" keeps voice on.
        let voice_enabled = self.store.get(KEY_VOICE_ENABLED).as_deref() != Some("false");
        let voice_speed = self
            .store
            .get(KEY_VOICE_SPEED)
            .unwrap_or_else(|| "1".to_string());

        Preferences {
            theme: Theme::parse(&theme),
            voice_enabled,
            voice_speed,
        }
    }

    pub fn set_theme(&self, theme: &Theme) -> Result<(), StoreError> {
        self.store.set(KEY_THEME, theme.as_str())
    }

    pub fn set_voice_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.store
            .set(KEY_VOICE_ENABLED, if enabled { "true" } else { "false" })
    }

    pub fn set_voice_speed(&self, speed: &str) -> Result<(), StoreError> {
        self.store.set(KEY_VOICE_SPEED, speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::MemoryStore;

    fn settings() -> (Arc<MemoryStore>, SettingsStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), SettingsStore::new(store))
    }

    #[test]
    fn empty_store_yields_defaults() {
        let (_, settings) = settings();
        assert_eq!(settings.load(), Preferences::default());
    }

    #[test]
    fn voice_is_only_disabled_by_literal_false() {
        let (store, settings) = settings();
        store.set(KEY_VOICE_ENABLED, "no").unwrap();
        assert!(settings.load().voice_enabled);
        store.set(KEY_VOICE_ENABLED, "false").unwrap();
        assert!(!settings.load().voice_enabled);
    }

    #[test]
    fn theme_change_is_visible_to_a_fresh_reader() {
        let (store, settings) = settings();
        settings.set_theme(&Theme::Light).unwrap();

        let reloaded = SettingsStore::new(store).load();
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[test]
    fn unknown_theme_round_trips() {
        let (_, settings) = settings();
        settings.set_theme(&Theme::parse("solarized")).unwrap();
        assert_eq!(settings.load().theme.as_str(), "solarized");
    }

    #[test]
    fn speed_is_stored_raw_and_coerced_on_use() {
        let (store, settings) = settings();
        settings.set_voice_speed("fast").unwrap();
        assert_eq!(store.get(KEY_VOICE_SPEED).as_deref(), Some("fast"));

        let prefs = settings.load();
        assert_eq!(prefs.voice_speed, "fast");
        assert_eq!(prefs.speech_rate(), DEFAULT_VOICE_SPEED);

        settings.set_voice_speed("1.5").unwrap();
        assert_eq!(settings.load().speech_rate(), 1.5);
    }
}
