#![allow(dead_code)]

use assistant_chat::api::lookup::{WeatherClient, WikipediaClient};
use assistant_chat::api::BackendClient;
use assistant_chat::config::{KeyValueStore, MemoryStore};
use assistant_chat::speech::{SpeechError, SpeechRecognizer, SpeechSynthesizer, UnsupportedRecognizer};
use assistant_chat::ui::{AssistantController, ControllerOptions, Services};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Upper bound for waiting on a single controller event.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Records what would have been spoken.
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<(String, f32)>>,
    cancels: Mutex<usize>,
}

impl RecordingSynthesizer {
    pub fn spoken(&self) -> Vec<(String, f32)> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str, rate: f32) {
        self.spoken.lock().unwrap().push((text.to_string(), rate));
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }
}

/// Grants permission immediately and hears a fixed utterance.
pub struct ScriptedRecognizer {
    pub transcript: Result<String, SpeechError>,
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn request_permission(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        self.transcript.clone()
    }

    fn stop(&self) {}
}

/// Grants permission, then listens until stopped.
#[derive(Default)]
pub struct BlockingRecognizer {
    stopped: CancellationToken,
}

#[async_trait]
impl SpeechRecognizer for BlockingRecognizer {
    async fn request_permission(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        self.stopped.cancelled().await;
        Err(SpeechError::Aborted)
    }

    fn stop(&self) {
        self.stopped.cancel();
    }
}

pub struct TestApp {
    pub controller: AssistantController,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub store: Arc<dyn KeyValueStore>,
}

pub struct TestAppBuilder {
    server_url: String,
    store: Arc<dyn KeyValueStore>,
    recognizer: Arc<dyn SpeechRecognizer>,
    options: ControllerOptions,
}

impl TestAppBuilder {
    /// Backend and lookup services all point at `server_uri`.
    pub fn new(server_uri: &str) -> Self {
        Self {
            server_url: server_uri.to_string(),
            store: Arc::new(MemoryStore::new()),
            recognizer: Arc::new(UnsupportedRecognizer),
            options: ControllerOptions::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn discard_stale_responses(mut self) -> Self {
        self.options.discard_stale_responses = true;
        self
    }

    pub fn build(self) -> TestApp {
        let timeout = Duration::from_secs(2);
        let synthesizer = Arc::new(RecordingSynthesizer::default());

        let services = Services {
            backend: Arc::new(BackendClient::new(&self.server_url, timeout).unwrap()),
            weather: Arc::new(
                WeatherClient::new(&self.server_url, Some("test-key".into()), timeout).unwrap(),
            ),
            wikipedia: Arc::new(WikipediaClient::new(&self.server_url, timeout).unwrap()),
            recognizer: self.recognizer,
            synthesizer: synthesizer.clone(),
            store: self.store.clone(),
        };

        TestApp {
            controller: AssistantController::new(services, self.options),
            synthesizer,
            store: self.store,
        }
    }
}

/// Waits for one spawned task to report back and applies its result.
pub async fn next_event(controller: &mut AssistantController) {
    tokio::time::timeout(EVENT_TIMEOUT, controller.process_next_event())
        .await
        .expect("timed out waiting for a controller event");
}

/// An address nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
