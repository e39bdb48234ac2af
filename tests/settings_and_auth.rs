//! Preference persistence and the login/registration flows.

mod common;

use assistant_chat::config::{
    FileStore, KeyValueStore, Theme, KEY_THEME, KEY_TOKEN, KEY_USERNAME, KEY_VOICE_SPEED,
};
use assistant_chat::ui::auth::{AuthAction, AuthMode, TERMS_REQUIRED};
use assistant_chat::ui::controller::{CONNECTION_ERROR_TEXT, REDIRECT_DELAY};
use assistant_chat::ui::notifications::NotificationKind;
use assistant_chat::ui::View;
use common::{next_event, unreachable_url, TestAppBuilder};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn theme_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("storage.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&file).unwrap());
        let mut app = TestAppBuilder::new(&unreachable_url()).store(store).build();
        assert_eq!(app.controller.preferences().theme, Theme::Dark);

        app.controller.set_theme(Theme::Light);
        let toast = app.controller.notifications().active().unwrap();
        assert_eq!(toast.text, "Theme changed to light");
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&file).unwrap());
    assert_eq!(store.get(KEY_THEME).as_deref(), Some("light"));
    let app = TestAppBuilder::new(&unreachable_url()).store(store).build();
    assert_eq!(app.controller.preferences().theme, Theme::Light);
}

#[tokio::test]
async fn unknown_theme_names_are_kept_verbatim() {
    let mut app = TestAppBuilder::new(&unreachable_url()).build();
    app.controller.set_theme(Theme::parse("solarized"));

    assert_eq!(app.store.get(KEY_THEME).as_deref(), Some("solarized"));
    assert_eq!(app.controller.preferences().theme.as_str(), "solarized");
}

#[tokio::test]
async fn voice_speed_change_restarts_speech_at_new_rate() {
    let mut app = TestAppBuilder::new(&unreachable_url()).build();
    app.controller.set_voice_speed("1.5");

    assert_eq!(app.store.get(KEY_VOICE_SPEED).as_deref(), Some("1.5"));
    assert_eq!(app.synthesizer.cancel_count(), 1);
    assert_eq!(
        app.synthesizer.spoken(),
        vec![("Voice speed updated".to_string(), 1.5)]
    );
}

#[tokio::test]
async fn starts_on_login_screen_without_a_session() {
    let app = TestAppBuilder::new(&unreachable_url()).build();
    assert_eq!(app.controller.view(), View::Auth);
    assert!(app.controller.session().is_none());
}

#[tokio::test]
async fn stored_session_skips_login() {
    let app = TestAppBuilder::new(&unreachable_url()).build();
    app.store.set(KEY_TOKEN, "abc").unwrap();
    app.store.set(KEY_USERNAME, "ada").unwrap();

    let app = TestAppBuilder::new(&unreachable_url())
        .store(app.store.clone())
        .build();
    assert_eq!(app.controller.view(), View::Assistant);
    assert_eq!(app.controller.session().unwrap().username, "ada");
}

#[tokio::test]
async fn successful_login_stores_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "ada", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tok-1", "username": "ada" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    {
        let form = app.controller.auth_form_mut();
        form.username = "ada".into();
        form.password = "hunter2".into();
    }
    app.controller.handle_auth_action(AuthAction::Login);
    next_event(&mut app.controller).await;

    assert_eq!(app.store.get(KEY_TOKEN).as_deref(), Some("tok-1"));
    assert_eq!(app.store.get(KEY_USERNAME).as_deref(), Some("ada"));
    assert_eq!(
        app.controller.notifications().active().map(|n| n.kind),
        Some(NotificationKind::Success)
    );

    // The view switches only after the redirect delay.
    assert_eq!(app.controller.view(), View::Auth);
    app.controller.tick(Instant::now() + REDIRECT_DELAY + Duration::from_millis(100));
    assert_eq!(app.controller.view(), View::Assistant);
}

#[tokio::test]
async fn rejected_login_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })))
        .mount(&server)
        .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    app.controller.login();
    next_event(&mut app.controller).await;

    let toast = app.controller.notifications().active().unwrap();
    assert_eq!(toast.text, "Invalid credentials");
    assert_eq!(toast.kind, NotificationKind::Error);
    assert!(app.store.get(KEY_TOKEN).is_none());
    assert_eq!(app.controller.view(), View::Auth);
}

#[tokio::test]
async fn login_without_backend_reports_connection_error() {
    let mut app = TestAppBuilder::new(&unreachable_url()).build();
    app.controller.login();
    next_event(&mut app.controller).await;

    let toast = app.controller.notifications().active().unwrap();
    assert_eq!(toast.text, CONNECTION_ERROR_TEXT);
}

#[tokio::test]
async fn registration_requires_terms_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "ok" })))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    {
        let form = app.controller.auth_form_mut();
        form.reg_username = "ada".into();
        form.reg_password = "pw".into();
        form.reg_confirm_password = "pw".into();
    }
    app.controller.handle_auth_action(AuthAction::Register);

    let toast = app.controller.notifications().active().unwrap();
    assert_eq!(toast.text, TERMS_REQUIRED);
}

#[tokio::test]
async fn registration_returns_to_login_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({ "username": "ada", "email": "ada@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = TestAppBuilder::new(&server.uri()).build();
    {
        let form = app.controller.auth_form_mut();
        form.mode = AuthMode::Register;
        form.reg_username = "ada".into();
        form.reg_email = "ada@example.com".into();
        form.reg_password = "pw".into();
        form.reg_confirm_password = "pw".into();
        form.terms_accepted = true;
    }
    app.controller.register();
    next_event(&mut app.controller).await;

    assert_eq!(
        app.controller.notifications().active().map(|n| n.text.as_str()),
        Some("Registration successful! Please login.")
    );
    app.controller.tick(Instant::now() + REDIRECT_DELAY + Duration::from_millis(100));
    assert_eq!(app.controller.auth_form_mut().mode, AuthMode::Login);
}

#[tokio::test]
async fn logout_clears_the_stored_session() {
    let app = TestAppBuilder::new(&unreachable_url()).build();
    app.store.set(KEY_TOKEN, "abc").unwrap();
    app.store.set(KEY_USERNAME, "ada").unwrap();

    let mut app = TestAppBuilder::new(&unreachable_url())
        .store(app.store.clone())
        .build();
    app.controller.logout();

    assert_eq!(app.controller.view(), View::Auth);
    assert!(app.store.get(KEY_TOKEN).is_none());
    assert!(app.controller.session().is_none());
}
