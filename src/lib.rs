pub mod api;
pub mod config;
pub mod dispatch;
pub mod speech;
pub mod ui;
