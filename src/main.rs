use anyhow::Context;
use assistant_chat::api::lookup::{WeatherClient, WikipediaClient};
use assistant_chat::api::BackendClient;
use assistant_chat::config::{AppConfig, FileStore, KeyValueStore, MemoryStore};
use assistant_chat::speech::{
    CommandRecognizer, CommandSynthesizer, SilentSynthesizer, SpeechRecognizer, SpeechSynthesizer,
    UnsupportedRecognizer,
};
use assistant_chat::ui::{AssistantApp, AssistantController, ControllerOptions, Services};
use eframe::egui;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load configuration, using defaults: {}", e);
            AppConfig::default().with_env_overrides(|key| std::env::var(key).ok())
        }
    };
    config.validate()?;

    let api_url = config.api_url();
    tracing::info!("Using backend at {} ({:?})", api_url, config.environment);

    let timeout = config.request_timeout();
    let backend = BackendClient::new(&api_url, timeout).context("Failed to build backend client")?;
    let weather = WeatherClient::new(&config.weather_base_url, config.weather_api_key.clone(), timeout)
        .context("Failed to build weather client")?;
    let wikipedia = WikipediaClient::new(&config.wikipedia_base_url, timeout)
        .context("Failed to build Wikipedia client")?;

    let store: Arc<dyn KeyValueStore> = match FileStore::open(&config.storage_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Settings will not persist: {}", e);
            Arc::new(MemoryStore::new())
        }
    };

    let recognizer: Arc<dyn SpeechRecognizer> = match config
        .recognizer_command
        .as_deref()
        .and_then(CommandRecognizer::new)
    {
        Some(recognizer) => Arc::new(recognizer),
        None => {
            tracing::info!("No speech recognizer configured");
            Arc::new(UnsupportedRecognizer)
        }
    };

    let synthesizer: Arc<dyn SpeechSynthesizer> =
        match CommandSynthesizer::locate(config.synthesizer_command.as_deref()) {
            Some(synthesizer) => Arc::new(synthesizer),
            None => Arc::new(SilentSynthesizer),
        };

    let controller = AssistantController::new(
        Services {
            backend: Arc::new(backend),
            weather: Arc::new(weather),
            wikipedia: Arc::new(wikipedia),
            recognizer,
            synthesizer,
            store,
        },
        ControllerOptions {
            notification_duration: config.notification_duration(),
            clock_refresh: Duration::from_secs(config.clock_refresh_secs),
            tip_refresh: Duration::from_secs(config.tip_refresh_secs),
            discard_stale_responses: config.discard_stale_responses,
        },
    );

    let (width, height) = config.window_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AI Assistant",
        options,
        Box::new(move |cc| Ok(Box::new(AssistantApp::new(cc, controller)))),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
