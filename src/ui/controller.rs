use crate::api::lookup::{LookupError, WeatherClient, WikipediaClient};
use crate::api::{ApiError, AssistantBackend, HealthResponse, Session};
use crate::config::{KeyValueStore, Preferences, SessionStore, SettingsStore, Theme};
use crate::dispatch::{self, normalize_command, Reply, ReplyGuard, ReplyOrdering};
use crate::speech::{
    ListenState, SpeechError, SpeechEvent, SpeechEventKind, SpeechInput, SpeechRecognizer,
    SpeechSynthesizer, Toggle,
};
use crate::ui::auth::{AuthAction, AuthForm, AuthMode};
use crate::ui::chat::{MessageLog, Sender};
use crate::ui::history::HistoryList;
use crate::ui::notifications::{NotificationCenter, NotificationKind};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const WELCOME_TEXT: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const HEALTH_WARNING_TEXT: &str =
    "Warning: the assistant backend is not reachable. Some features may not work.";
pub const CONNECTION_ERROR_TEXT: &str = "Connection error. Please try again.";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// External collaborators of the controller.
pub struct Services {
    pub backend: Arc<dyn AssistantBackend>,
    pub weather: Arc<WeatherClient>,
    pub wikipedia: Arc<WikipediaClient>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub store: Arc<dyn KeyValueStore>,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub notification_duration: Duration,
    pub clock_refresh: Duration,
    pub tip_refresh: Duration,
    pub discard_stale_responses: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            notification_duration: Duration::from_secs(5),
            clock_refresh: Duration::from_secs(1),
            tip_refresh: Duration::from_secs(10),
            discard_stale_responses: false,
        }
    }
}

/// Results reported back to the UI thread by spawned work.
#[derive(Debug)]
pub enum UiEvent {
    CommandReply { request_id: u64, reply: Reply },
    Health(Result<HealthResponse, ApiError>),
    Tip(String),
    Clock(String),
    Speech(SpeechEvent),
    Weather(Result<String, LookupError>),
    Wikipedia(Result<String, LookupError>),
    Login(Result<Session, ApiError>),
    Register(Result<(), ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Auth,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Dashboard,
    Voice,
    History,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickAction {
    Weather(String),
    Wikipedia(String),
    Time,
}

impl QuickAction {
    /// The command a quick-action card sends. A blank prompt answer sends nothing.
    pub fn command(&self) -> Option<String> {
        match self {
            QuickAction::Weather(city) => {
                normalize_command(city).map(|city| format!("weather in {}", city))
            }
            QuickAction::Wikipedia(topic) => {
                normalize_command(topic).map(|topic| format!("search wikipedia for {}", topic))
            }
            QuickAction::Time => Some("what time is it".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Redirect {
    ToAssistant,
    ToLogin,
}

/// Owns every piece of mutable UI state. Rendering code reads from it and
/// calls its methods; spawned tasks only talk back through [`UiEvent`]s.
pub struct AssistantController {
    services: Services,
    settings: SettingsStore,
    sessions: SessionStore,
    options: ControllerOptions,
    prefs: Preferences,
    session: Option<Session>,
    speech: SpeechInput,
    ordering: ReplyOrdering,
    messages: MessageLog,
    history: HistoryList,
    notifications: NotificationCenter,
    tip: Option<String>,
    clock: Option<String>,
    view: View,
    section: Section,
    auth: AuthForm,
    redirect: Option<(Instant, Redirect)>,
    next_clock_at: Instant,
    next_tip_at: Instant,
    events_tx: mpsc::UnboundedSender<UiEvent>,
    events_rx: mpsc::UnboundedReceiver<UiEvent>,
}

impl AssistantController {
    pub fn new(services: Services, options: ControllerOptions) -> Self {
        let settings = SettingsStore::new(services.store.clone());
        let sessions = SessionStore::new(services.store.clone());
        let prefs = settings.load();
        let session = sessions.load();
        let view = if session.is_some() {
            View::Assistant
        } else {
            View::Auth
        };
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let now = Instant::now();

        Self {
            speech: SpeechInput::new(services.recognizer.clone()),
            ordering: ReplyOrdering::new(options.discard_stale_responses),
            notifications: NotificationCenter::new(options.notification_duration),
            services,
            settings,
            sessions,
            options,
            prefs,
            session,
            messages: MessageLog::new(),
            history: HistoryList::new(),
            tip: None,
            clock: None,
            view,
            section: Section::default(),
            auth: AuthForm::default(),
            redirect: None,
            next_clock_at: now,
            next_tip_at: now,
            events_tx,
            events_rx,
        }
    }

    /// Greets the user and checks the backend once. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        self.messages.push(WELCOME_TEXT, Sender::Assistant);

        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(UiEvent::Health(backend.health().await));
        });
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut MessageLog {
        &mut self.messages
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn listen_state(&self) -> ListenState {
        self.speech.state()
    }

    pub fn tip(&self) -> Option<&str> {
        self.tip.as_deref()
    }

    pub fn clock(&self) -> Option<&str> {
        self.clock.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn set_section(&mut self, section: Section) {
        self.section = section;
    }

    pub fn auth_form_mut(&mut self) -> &mut AuthForm {
        &mut self.auth
    }

    /// Renders `raw` as a user message and sends it to the backend.
    /// Returns the request id, or `None` for blank input.
    pub fn submit(&mut self, raw: &str) -> Option<u64> {
        let command = normalize_command(raw)?;
        let request_id = self.ordering.next_request();

        self.history.record(&command);
        self.messages.push(command.clone(), Sender::User);
        self.messages.push_placeholder(request_id);

        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let guard = ReplyGuard::new(move |reply| {
                let _ = tx.send(UiEvent::CommandReply { request_id, reply });
            });
            let reply = dispatch::dispatch(backend.as_ref(), &command).await;
            guard.complete(reply);
        });

        Some(request_id)
    }

    pub fn quick_action(&mut self, action: &QuickAction) -> Option<u64> {
        let command = action.command()?;
        self.submit(&command)
    }

    fn apply_reply(&mut self, request_id: u64, reply: Reply) {
        self.messages.remove_placeholder(request_id);

        if !self.ordering.accept(request_id) {
            tracing::info!("Discarding stale reply for request {}", request_id);
            return;
        }

        let text = reply.message_text();
        self.messages.push(text.clone(), Sender::Assistant);

        match reply {
            Reply::Answer { text, history } => {
                self.notifications.show(text.clone(), NotificationKind::Success);
                if self.prefs.voice_enabled {
                    self.services
                        .synthesizer
                        .speak(&text, self.prefs.speech_rate());
                }
                if let Some(history) = history {
                    self.history.replace(history);
                }
            }
            Reply::Rejected(_) | Reply::Failed => {
                self.notifications.show(text, NotificationKind::Error);
            }
        }
    }

    /// Applies every event that has already arrived. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next event and applies it.
    pub async fn process_next_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::CommandReply { request_id, reply } => self.apply_reply(request_id, reply),
            UiEvent::Health(result) => self.apply_health(result),
            UiEvent::Tip(tip) => self.tip = Some(tip),
            UiEvent::Clock(time) => self.clock = Some(time),
            UiEvent::Speech(event) => self.apply_speech(event),
            UiEvent::Weather(result) => self.apply_weather(result),
            UiEvent::Wikipedia(result) => self.apply_wikipedia(result),
            UiEvent::Login(result) => self.apply_login(result),
            UiEvent::Register(result) => self.apply_register(result),
        }
    }

    /// Time-driven work: toast expiry, dashboard refresh and delayed view switches.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);

        if let Some((at, redirect)) = self.redirect {
            if now >= at {
                self.redirect = None;
                match redirect {
                    Redirect::ToAssistant => self.view = View::Assistant,
                    Redirect::ToLogin => self.auth.mode = AuthMode::Login,
                }
            }
        }

        if self.view != View::Assistant {
            return;
        }
        if now >= self.next_clock_at {
            self.next_clock_at = now + self.options.clock_refresh;
            self.refresh_clock();
        }
        if now >= self.next_tip_at {
            self.next_tip_at = now + self.options.tip_refresh;
            self.refresh_tip();
        }
    }

    fn refresh_clock(&self) {
        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match backend.time().await {
                Ok(time) => {
                    let _ = tx.send(UiEvent::Clock(time));
                }
                Err(e) => tracing::error!("Failed to fetch time: {}", e),
            }
        });
    }

    fn refresh_tip(&self) {
        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            match backend.tip().await {
                Ok(tip) => {
                    let _ = tx.send(UiEvent::Tip(tip));
                }
                Err(e) => tracing::error!("Failed to fetch AI tip: {}", e),
            }
        });
    }

    fn apply_health(&mut self, result: Result<HealthResponse, ApiError>) {
        match result {
            Ok(health) if health.is_healthy() => tracing::info!("Backend is healthy"),
            Ok(health) => {
                tracing::warn!("Backend reported status {:?}", health.status);
                self.messages.push(HEALTH_WARNING_TEXT, Sender::Assistant);
            }
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                self.messages.push(HEALTH_WARNING_TEXT, Sender::Assistant);
            }
        }
    }

    pub fn toggle_listening(&mut self) {
        let tx = self.events_tx.clone();
        let toggled = self.speech.toggle(move |event| {
            let _ = tx.send(UiEvent::Speech(event));
        });
        if toggled == Toggle::Busy {
            tracing::debug!("Microphone permission prompt still open");
        }
    }

    fn apply_speech(&mut self, event: SpeechEvent) {
        if !self.speech.apply(&event) {
            return;
        }

        match event.kind {
            SpeechEventKind::PermissionGranted => {
                if self.speech.is_listening() {
                    self.notifications.show("Listening...", NotificationKind::Info);
                }
            }
            SpeechEventKind::Transcript(command) => {
                self.notifications
                    .show(format!("You said: {}", command), NotificationKind::Info);
                self.submit(&command);
            }
            SpeechEventKind::Failed(SpeechError::Aborted) => {
                tracing::info!("Speech recognition ended");
            }
            SpeechEventKind::Failed(e) => {
                tracing::error!("Speech recognition error: {}", e);
                self.notifications.show(e.user_message(), NotificationKind::Error);
            }
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if let Err(e) = self.settings.set_theme(&theme) {
            tracing::error!("Failed to save theme: {}", e);
        }
        self.notifications
            .show(format!("Theme changed to {}", theme), NotificationKind::Info);
        self.prefs.theme = theme;
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.prefs.voice_enabled = enabled;
        if let Err(e) = self.settings.set_voice_enabled(enabled) {
            tracing::error!("Failed to save voice setting: {}", e);
        }

        if enabled {
            self.notifications.show("Voice input enabled", NotificationKind::Info);
        } else {
            self.speech.stop();
            self.notifications.show("Voice input disabled", NotificationKind::Info);
        }
    }

    pub fn set_voice_speed(&mut self, speed: impl Into<String>) {
        self.prefs.voice_speed = speed.into();
        if let Err(e) = self.settings.set_voice_speed(&self.prefs.voice_speed) {
            tracing::error!("Failed to save voice speed: {}", e);
        }

        let synthesizer = &self.services.synthesizer;
        synthesizer.cancel();
        synthesizer.speak("Voice speed updated", self.prefs.speech_rate());
    }

    pub fn lookup_weather(&mut self, city: &str) {
        let Some(city) = normalize_command(city) else {
            return;
        };
        let weather = self.services.weather.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(UiEvent::Weather(weather.current(&city).await));
        });
    }

    pub fn lookup_wikipedia(&mut self, topic: &str) {
        let Some(topic) = normalize_command(topic) else {
            return;
        };
        let wikipedia = self.services.wikipedia.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(UiEvent::Wikipedia(wikipedia.summary(&topic).await));
        });
    }

    pub fn show_time(&mut self) {
        let now = chrono::Local::now().format("%H:%M:%S");
        self.notifications
            .show(format!("Current time: {}", now), NotificationKind::Success);
    }

    fn apply_weather(&mut self, result: Result<String, LookupError>) {
        match result {
            Ok(info) => {
                self.notifications.show(info.clone(), NotificationKind::Success);
                self.messages.push(info, Sender::Assistant);
            }
            Err(LookupError::NotFound(city)) => {
                tracing::warn!("Weather lookup found nothing for {:?}", city);
                self.notifications.show("City not found", NotificationKind::Error);
            }
            Err(e) => {
                tracing::error!("Weather lookup failed: {}", e);
                self.notifications
                    .show("Failed to get weather data", NotificationKind::Error);
            }
        }
    }

    fn apply_wikipedia(&mut self, result: Result<String, LookupError>) {
        match result {
            Ok(extract) => self.notifications.show(extract, NotificationKind::Success),
            Err(LookupError::NotFound(topic)) => {
                tracing::warn!("Wikipedia lookup found nothing for {:?}", topic);
                self.notifications.show("No results found", NotificationKind::Error);
            }
            Err(e) => {
                tracing::error!("Wikipedia lookup failed: {}", e);
                self.notifications
                    .show("Failed to search Wikipedia", NotificationKind::Error);
            }
        }
    }

    pub fn handle_auth_action(&mut self, action: AuthAction) {
        match action {
            AuthAction::Login => self.login(),
            AuthAction::Register => self.register(),
            AuthAction::Skip => self.view = View::Assistant,
        }
    }

    pub fn login(&mut self) {
        if self.auth.busy {
            return;
        }
        self.auth.busy = true;

        let username = self.auth.username.clone();
        let password = self.auth.password.clone();
        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(UiEvent::Login(backend.login(&username, &password).await));
        });
    }

    pub fn register(&mut self) {
        if self.auth.busy {
            return;
        }
        if let Err(problem) = self.auth.validate_registration() {
            self.notifications.show(problem, NotificationKind::Error);
            return;
        }
        self.auth.busy = true;

        let username = self.auth.reg_username.clone();
        let email = self.auth.reg_email.clone();
        let password = self.auth.reg_password.clone();
        let backend = self.services.backend.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.register(&username, &email, &password).await;
            let _ = tx.send(UiEvent::Register(result));
        });
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.sessions.clear() {
            tracing::error!("Failed to clear session: {}", e);
        }
        self.session = None;
        self.auth = AuthForm::default();
        self.view = View::Auth;
    }

    fn apply_login(&mut self, result: Result<Session, ApiError>) {
        self.auth.busy = false;
        match result {
            Ok(session) => {
                if let Err(e) = self.sessions.save(&session) {
                    tracing::error!("Failed to store session: {}", e);
                }
                tracing::info!("Logged in as {}", session.username);
                self.session = Some(session);
                self.auth.password.clear();
                self.notifications
                    .show("Login successful! Redirecting...", NotificationKind::Success);
                self.redirect = Some((Instant::now() + REDIRECT_DELAY, Redirect::ToAssistant));
            }
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                self.notifications
                    .show(auth_failure_text(&e, "Login failed"), NotificationKind::Error);
            }
        }
    }

    fn apply_register(&mut self, result: Result<(), ApiError>) {
        self.auth.busy = false;
        match result {
            Ok(()) => {
                self.notifications.show(
                    "Registration successful! Please login.",
                    NotificationKind::Success,
                );
                self.redirect = Some((Instant::now() + REDIRECT_DELAY, Redirect::ToLogin));
            }
            Err(e) => {
                tracing::error!("Registration failed: {}", e);
                self.notifications.show(
                    auth_failure_text(&e, "Registration failed"),
                    NotificationKind::Error,
                );
            }
        }
    }
}

fn auth_failure_text(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Status { .. } => error.server_message().unwrap_or(fallback).to_string(),
        ApiError::Network(_) | ApiError::Decode(_) => CONNECTION_ERROR_TEXT.to_string(),
    }
}
