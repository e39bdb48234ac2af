pub mod app;
pub mod auth;
pub mod chat;
pub mod components;
pub mod controller;
pub mod history;
pub mod notifications;
pub mod settings;

pub use app::AssistantApp;
pub use controller::{AssistantController, ControllerOptions, QuickAction, Section, Services, UiEvent, View};
