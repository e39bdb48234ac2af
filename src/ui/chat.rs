use chrono::{DateTime, Local};
use eframe::egui;

pub const PROCESSING_TEXT: &str = "Processing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    /// Set on the transient placeholder of an in-flight request.
    pub pending_request: Option<u64>,
}

impl ChatMessage {
    fn new(text: String, sender: Sender, pending_request: Option<u64>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            sender,
            timestamp: Local::now(),
            pending_request,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.pending_request.is_some()
    }
}

/// Append-only chat log. Grows without a cap and never deduplicates.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    scroll_to_bottom: bool,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, sender: Sender) {
        self.messages.push(ChatMessage::new(text.into(), sender, None));
        self.scroll_to_bottom = true;
    }

    pub fn push_placeholder(&mut self, request_id: u64) {
        self.messages.push(ChatMessage::new(
            PROCESSING_TEXT.to_string(),
            Sender::Assistant,
            Some(request_id),
        ));
        self.scroll_to_bottom = true;
    }

    /// Removes the placeholder for `request_id`. Safe to call any number of times.
    pub fn remove_placeholder(&mut self, request_id: u64) -> bool {
        let before = self.messages.len();
        self.messages
            .retain(|m| m.pending_request != Some(request_id));
        before != self.messages.len()
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages excluding in-flight placeholders.
    pub fn settled(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_placeholder())
    }

    pub fn from_sender(&self, sender: Sender) -> Vec<&ChatMessage> {
        self.settled().filter(|m| m.sender == sender).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_placeholder()).count()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns whether a scroll to the newest entry is due, clearing the request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }
}

pub struct ChatComponent;

impl ChatComponent {
    pub fn render(ui: &mut egui::Ui, log: &mut MessageLog, animation_time: f32) {
        let scroll = log.take_scroll_request();

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.add_space(20.0);

                for message in log.all() {
                    Self::render_message_bubble(ui, message, animation_time);
                    ui.add_space(12.0);
                }

                if scroll {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
    }

    fn render_message_bubble(ui: &mut egui::Ui, message: &ChatMessage, animation_time: f32) {
        let is_user = message.sender == Sender::User;

        ui.horizontal(|ui| {
            if is_user {
                ui.add_space(ui.available_width() * 0.2);
            }

            let max_width = ui.available_width() * 0.8;
            let bg_color = if is_user {
                egui::Color32::from_rgb(65, 105, 170)
            } else {
                egui::Color32::from_rgb(60, 60, 80)
            };

            egui::Frame::none()
                .fill(bg_color)
                .rounding(egui::Rounding {
                    nw: if is_user { 12.0 } else { 4.0 },
                    ne: if is_user { 4.0 } else { 12.0 },
                    sw: 12.0,
                    se: 12.0,
                })
                .inner_margin(egui::Margin::symmetric(15.0, 12.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width - 30.0);

                    ui.horizontal(|ui| {
                        ui.label(if is_user { "👤" } else { "🤖" });
                        if message.is_placeholder() {
                            let dots = ((animation_time * 3.0) as usize % 3) + 1;
                            ui.label(
                                egui::RichText::new(format!("Processing{}", ".".repeat(dots)))
                                    .italics()
                                    .color(egui::Color32::LIGHT_GRAY),
                            );
                        } else {
                            ui.label(
                                egui::RichText::new(&message.text)
                                    .size(14.0)
                                    .color(egui::Color32::WHITE),
                            );
                        }
                    });

                    ui.add_space(5.0);
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(message.timestamp.format("%H:%M").to_string())
                                .size(10.0)
                                .color(egui::Color32::from_rgb(200, 200, 200)),
                        );

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if !message.is_placeholder()
                                && ui.small_button("📋").on_hover_text("Copy message").clicked()
                            {
                                ui.output_mut(|o| o.copied_text = message.text.clone());
                            }
                        });
                    });
                });

            if !is_user {
                ui.add_space(ui.available_width() * 0.2);
            }
        });
    }
}
