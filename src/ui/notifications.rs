use eframe::egui;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    fn color(self) -> egui::Color32 {
        match self {
            NotificationKind::Info => egui::Color32::from_rgb(70, 130, 220),
            NotificationKind::Success => egui::Color32::from_rgb(0, 200, 81),
            NotificationKind::Warning => egui::Color32::from_rgb(230, 160, 40),
            NotificationKind::Error => egui::Color32::from_rgb(255, 68, 68),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

/// Transient toasts. Showing a new one replaces the active one.
#[derive(Debug)]
pub struct NotificationCenter {
    active: Option<Notification>,
    lifetime: Duration,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            active: None,
            lifetime,
        }
    }

    pub fn show(&mut self, text: impl Into<String>, kind: NotificationKind) {
        self.show_at(text, kind, Instant::now());
    }

    pub fn show_at(&mut self, text: impl Into<String>, kind: NotificationKind, now: Instant) {
        let text = text.into();
        tracing::debug!("Notification ({:?}): {}", kind, text);
        self.active = Some(Notification {
            text,
            kind,
            expires_at: now + self.lifetime,
        });
    }

    /// Drops the active notification once its deadline has passed.
    pub fn prune(&mut self, now: Instant) {
        if self.active.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.active = None;
        }
    }

    pub fn active(&self) -> Option<&Notification> {
        self.active.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.active = None;
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        self.prune(Instant::now());
        let Some(notification) = &self.active else {
            return;
        };

        let mut dismissed = false;
        egui::Area::new(egui::Id::new("notification"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 20.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(notification.kind.color())
                    .rounding(8.0)
                    .inner_margin(egui::Margin::symmetric(24.0, 12.0))
                    .show(ui, |ui| {
                        ui.set_max_width(480.0);
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(&notification.text).color(egui::Color32::WHITE));
                            if ui.small_button("✕").clicked() {
                                dismissed = true;
                            }
                        });
                    });
            });

        if dismissed {
            self.dismiss();
        }
    }
}
