use crate::config::Theme;
use crate::ui::chat::ChatComponent;
use crate::ui::components::{action_card, sidebar_fill, theme_preference, voice_status};
use crate::ui::controller::{AssistantController, QuickAction, Section, View};
use crate::ui::settings::SettingsPanel;
use eframe::egui;
use std::time::{Duration, Instant};

/// Which dashboard card opened the prompt dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    WeatherCommand,
    WikipediaCommand,
    WeatherLookup,
    WikipediaLookup,
}

impl PromptKind {
    fn question(self) -> &'static str {
        match self {
            PromptKind::WeatherCommand | PromptKind::WeatherLookup => "Enter city name:",
            PromptKind::WikipediaCommand | PromptKind::WikipediaLookup => "What would you like to search for?",
        }
    }
}

struct Prompt {
    kind: PromptKind,
    answer: String,
}

pub struct AssistantApp {
    controller: AssistantController,
    input_text: String,
    prompt: Option<Prompt>,
    settings: SettingsPanel,
    animation_time: f32,
    applied_theme: Option<Theme>,
}

impl AssistantApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut controller: AssistantController) -> Self {
        controller.start();
        let theme = controller.preferences().theme.clone();
        cc.egui_ctx.set_theme(theme_preference(&theme));

        Self {
            controller,
            input_text: String::new(),
            prompt: None,
            settings: SettingsPanel::new(),
            animation_time: 0.0,
            applied_theme: Some(theme),
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        let theme = &self.controller.preferences().theme;
        if self.applied_theme.as_ref() != Some(theme) {
            ctx.set_theme(theme_preference(theme));
            self.applied_theme = Some(theme.clone());
        }
    }

    fn send_input(&mut self) {
        if self.controller.submit(&self.input_text).is_some() {
            self.input_text.clear();
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(20.0);
        ui.label(
            egui::RichText::new("🤖 AI Assistant")
                .size(22.0)
                .strong()
                .color(egui::Color32::from_rgb(100, 200, 255)),
        );
        if let Some(session) = self.controller.session() {
            ui.label(egui::RichText::new(&session.username).color(egui::Color32::GRAY));
        }
        ui.add_space(20.0);

        let sections = [
            (Section::Dashboard, "🏠 Dashboard"),
            (Section::Voice, "🎤 Voice"),
            (Section::History, "📜 History"),
            (Section::Settings, "⚙️ Settings"),
        ];
        for (section, label) in sections {
            let selected = self.controller.section() == section;
            if ui
                .add_sized([200.0, 32.0], egui::SelectableLabel::new(selected, label))
                .clicked()
            {
                self.controller.set_section(section);
            }
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.add_space(20.0);
            if self.controller.session().is_some()
                && ui.add_sized([200.0, 32.0], egui::Button::new("🚪 Logout")).clicked()
            {
                self.controller.logout();
            }
        });
    }

    fn render_chat_area(&mut self, ui: &mut egui::Ui) {
        let input_height = 60.0;
        let log_height = (ui.available_height() - input_height).max(100.0);

        ui.allocate_ui([ui.available_width(), log_height].into(), |ui| {
            ChatComponent::render(ui, self.controller.messages_mut(), self.animation_time);
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 90.0, 36.0],
                egui::TextEdit::singleline(&mut self.input_text)
                    .hint_text("Type your command here...")
                    .font(egui::TextStyle::Body),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.send_input();
                response.request_focus();
            }
            if ui.add_sized([80.0, 36.0], egui::Button::new("Send")).clicked() {
                self.send_input();
            }
        });
    }

    fn render_dashboard(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("🕒").size(18.0));
            ui.label(egui::RichText::new(self.controller.clock().unwrap_or("--:--:--")).size(18.0));
        });
        if let Some(tip) = self.controller.tip() {
            ui.add_space(6.0);
            ui.label(egui::RichText::new(format!("💡 {}", tip)).italics());
        }
        ui.add_space(16.0);

        ui.horizontal_wrapped(|ui| {
            if action_card(ui, "🌤", "Weather", "Ask about the weather").clicked() {
                self.open_prompt(PromptKind::WeatherCommand);
            }
            if action_card(ui, "📚", "Wikipedia", "Search an article").clicked() {
                self.open_prompt(PromptKind::WikipediaCommand);
            }
            if action_card(ui, "⏰", "Time", "What time is it?").clicked() {
                self.controller.quick_action(&QuickAction::Time);
            }
        });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Check weather directly").clicked() {
                self.open_prompt(PromptKind::WeatherLookup);
            }
            if ui.button("Search Wikipedia directly").clicked() {
                self.open_prompt(PromptKind::WikipediaLookup);
            }
            if ui.button("Show local time").clicked() {
                self.controller.show_time();
            }
        });
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            answer: String::new(),
        });
    }

    fn render_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };

        let mut submitted = false;
        let mut cancelled = false;
        egui::Window::new("Quick action")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(prompt.kind.question());
                let response = ui.text_edit_singleline(&mut prompt.answer);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        submitted = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if cancelled {
            self.prompt = None;
        } else if submitted {
            if let Some(prompt) = self.prompt.take() {
                match prompt.kind {
                    PromptKind::WeatherCommand => {
                        self.controller.quick_action(&QuickAction::Weather(prompt.answer));
                    }
                    PromptKind::WikipediaCommand => {
                        self.controller.quick_action(&QuickAction::Wikipedia(prompt.answer));
                    }
                    PromptKind::WeatherLookup => self.controller.lookup_weather(&prompt.answer),
                    PromptKind::WikipediaLookup => self.controller.lookup_wikipedia(&prompt.answer),
                }
            }
        }
    }

    fn render_section(&mut self, ui: &mut egui::Ui) {
        match self.controller.section() {
            Section::Dashboard => {
                self.render_dashboard(ui);
                ui.separator();
                self.render_chat_area(ui);
            }
            Section::Voice => {
                ui.add_space(20.0);
                let state = self.controller.listen_state();
                if voice_status(ui, state, self.animation_time) {
                    self.controller.toggle_listening();
                }
                ui.add_space(20.0);
                ui.separator();
                self.render_chat_area(ui);
            }
            Section::History => {
                ui.heading("Command history");
                ui.separator();
                self.controller.history().render(ui);
            }
            Section::Settings => {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.settings.render(ui, &mut self.controller);
                });
            }
        }
    }
}

impl eframe::App for AssistantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.animation_time += ctx.input(|i| i.stable_dt);

        self.controller.pump();
        self.controller.tick(Instant::now());
        self.sync_theme(ctx);

        match self.controller.view() {
            View::Auth => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if let Some(action) = self.controller.auth_form_mut().render(ui) {
                        self.controller.handle_auth_action(action);
                    }
                });
            }
            View::Assistant => {
                let fill = sidebar_fill(ctx.style().visuals.dark_mode);
                egui::SidePanel::left("sidebar")
                    .exact_width(240.0)
                    .resizable(false)
                    .frame(egui::Frame::none().fill(fill).inner_margin(16.0))
                    .show(ctx, |ui| self.render_sidebar(ui));

                egui::CentralPanel::default().show(ctx, |ui| self.render_section(ui));
                self.render_prompt(ctx);
            }
        }

        self.controller.notifications_mut().render(ctx);

        // Spawned tasks report through a channel, so poll for their results.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
