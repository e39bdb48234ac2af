use crate::config::Theme;
use crate::speech::ListenState;
use eframe::egui;

/// egui theme preference for a stored theme. `System` follows the OS
/// setting; names without a built-in look fall back to dark.
pub fn theme_preference(theme: &Theme) -> egui::ThemePreference {
    match theme {
        Theme::Light => egui::ThemePreference::Light,
        Theme::System => egui::ThemePreference::System,
        Theme::Dark | Theme::Named(_) => egui::ThemePreference::Dark,
    }
}

pub fn sidebar_fill(dark_mode: bool) -> egui::Color32 {
    if dark_mode {
        egui::Color32::from_rgb(30, 30, 40)
    } else {
        egui::Color32::from_rgb(230, 232, 240)
    }
}

/// A clickable dashboard card.
pub fn action_card(ui: &mut egui::Ui, icon: &str, title: &str, subtitle: &str) -> egui::Response {
    let frame = egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(95, 105, 130)))
        .rounding(10.0)
        .inner_margin(14.0);

    let inner = frame.show(ui, |ui| {
        ui.set_width(160.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(icon).size(22.0));
            ui.label(egui::RichText::new(title).strong());
            ui.label(egui::RichText::new(subtitle).size(11.0).color(egui::Color32::GRAY));
        });
    });

    inner.response.interact(egui::Sense::click())
}

/// Status line and mic button of the voice section. Returns true when the
/// button was clicked.
pub fn voice_status(ui: &mut egui::Ui, state: ListenState, animation_time: f32) -> bool {
    let (status, color) = match state {
        ListenState::Idle => ("Click the microphone to start", egui::Color32::GRAY),
        ListenState::RequestingPermission => ("Waiting for microphone access...", egui::Color32::YELLOW),
        ListenState::Listening => ("Listening...", egui::Color32::from_rgb(0, 200, 81)),
    };

    let mut clicked = false;
    ui.vertical_centered(|ui| {
        let label = if state == ListenState::Listening { "⏹" } else { "🎤" };
        let button = egui::Button::new(egui::RichText::new(label).size(32.0)).rounding(40.0);
        if ui.add_sized([80.0, 80.0], button).clicked() {
            clicked = true;
        }

        ui.add_space(10.0);
        ui.colored_label(color, status);

        if state == ListenState::Listening {
            // Simple wave made of bars whose height follows the frame clock.
            let (rect, _) = ui.allocate_exact_size([120.0, 24.0].into(), egui::Sense::hover());
            let painter = ui.painter();
            for i in 0..8 {
                let phase = animation_time * 6.0 + i as f32 * 0.7;
                let height = 6.0 + phase.sin().abs() * 16.0;
                let x = rect.left() + 8.0 + i as f32 * 14.0;
                painter.line_segment(
                    [
                        egui::pos2(x, rect.center().y - height / 2.0),
                        egui::pos2(x, rect.center().y + height / 2.0),
                    ],
                    egui::Stroke::new(3.0, color),
                );
            }
        }
    });
    clicked
}
