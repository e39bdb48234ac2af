use crate::api::HistoryEntry;
use eframe::egui;

/// Past commands, newest first.
#[derive(Debug, Default)]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `command`, stamped with the local wall-clock time.
    pub fn record(&mut self, command: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.entries.insert(
            0,
            HistoryEntry {
                command: command.to_string(),
                timestamp,
            },
        );
    }

    /// Replaces the whole list with the backend's view, in the backend's order.
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn render(&self, ui: &mut egui::Ui) {
        if self.entries.is_empty() {
            ui.label(egui::RichText::new("No commands yet").color(egui::Color32::GRAY));
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for entry in &self.entries {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(&entry.timestamp)
                                .monospace()
                                .color(egui::Color32::from_rgb(150, 150, 200)),
                        );
                        ui.label(&entry.command);
                    });
                    ui.separator();
                }
            });
    }
}
