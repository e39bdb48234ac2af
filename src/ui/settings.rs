use crate::config::Theme;
use crate::ui::controller::AssistantController;
use eframe::egui;

/// Settings section. Holds the voice speed while the slider is being dragged
/// so the stored value is only written once the drag ends.
#[derive(Debug, Default)]
pub struct SettingsPanel {
    speed_draft: Option<f32>,
}

impl SettingsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn displayed_speed(&self, stored: f32) -> f32 {
        self.speed_draft.unwrap_or(stored)
    }

    /// Records the slider position. Returns the speed to persist, if any.
    fn slider_moved(&mut self, speed: f32, dragging: bool, released: bool) -> Option<String> {
        if dragging && !released {
            self.speed_draft = Some(speed);
            return None;
        }
        self.speed_draft = None;
        Some(format!("{:.1}", speed))
    }

    pub fn render(&mut self, ui: &mut egui::Ui, controller: &mut AssistantController) {
        render_settings(ui, controller, self);
    }
}

fn render_settings(ui: &mut egui::Ui, controller: &mut AssistantController, panel: &mut SettingsPanel) {
    ui.heading("Appearance");
    ui.separator();
    ui.add_space(10.0);

    let current = controller.preferences().theme.clone();
    let mut selected = current.clone();
    ui.horizontal(|ui| {
        ui.label("Theme:");
        egui::ComboBox::from_id_salt("theme-select")
            .selected_text(current.as_str())
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, Theme::Dark, "dark");
                ui.selectable_value(&mut selected, Theme::Light, "light");
                ui.selectable_value(&mut selected, Theme::System, "system");
            });
    });
    if selected != current {
        controller.set_theme(selected);
    }

    ui.add_space(20.0);
    ui.heading("Voice");
    ui.separator();
    ui.add_space(10.0);

    let mut voice_enabled = controller.preferences().voice_enabled;
    if ui.checkbox(&mut voice_enabled, "Speak responses aloud").changed() {
        controller.set_voice_enabled(voice_enabled);
    }

    let mut speed = panel.displayed_speed(controller.preferences().speech_rate());
    ui.horizontal(|ui| {
        ui.label("Voice speed:");
        let slider = ui.add(egui::Slider::new(&mut speed, 0.5..=2.0).step_by(0.1));
        if slider.changed() || slider.drag_stopped() {
            if let Some(value) = panel.slider_moved(speed, slider.dragged(), slider.drag_stopped()) {
                controller.set_voice_speed(value);
            }
        }
    });

    ui.add_space(20.0);
    ui.heading("Account");
    ui.separator();
    ui.add_space(10.0);

    let signed_in = controller.session().map(|s| s.username.clone());
    match signed_in {
        Some(username) => {
            ui.label(format!("Signed in as {}", username));
            if ui.button("Log out").clicked() {
                controller.logout();
            }
        }
        None => {
            ui.label("Not signed in");
            if ui.button("Sign in").clicked() {
                controller.logout();
            }
        }
    }
}
