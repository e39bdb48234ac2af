use eframe::egui;

pub const TERMS_REQUIRED: &str = "Please agree to the Terms & Conditions";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Register,
    /// Go to the assistant without signing in.
    Skip,
}

/// State of the login and registration forms.
#[derive(Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    pub show_password: bool,
    pub reg_username: String,
    pub reg_email: String,
    pub reg_password: String,
    pub reg_confirm_password: String,
    pub show_reg_password: bool,
    pub terms_accepted: bool,
    /// A login or registration request is in flight.
    pub busy: bool,
}

impl AuthForm {
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    /// Checks done before anything is sent: terms first, then passwords.
    pub fn validate_registration(&self) -> Result<(), &'static str> {
        if !self.terms_accepted {
            return Err(TERMS_REQUIRED);
        }
        if self.reg_password != self.reg_confirm_password {
            return Err(PASSWORD_MISMATCH);
        }
        Ok(())
    }

    pub fn render(&mut self, ui: &mut egui::Ui) -> Option<AuthAction> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(
                egui::RichText::new("🤖 AI Assistant")
                    .size(28.0)
                    .strong()
                    .color(egui::Color32::from_rgb(100, 200, 255)),
            );
            ui.add_space(20.0);

            egui::Frame::group(ui.style())
                .inner_margin(20.0)
                .show(ui, |ui| {
                    ui.set_max_width(360.0);
                    match self.mode {
                        AuthMode::Login => action = self.render_login(ui),
                        AuthMode::Register => action = self.render_register(ui),
                    }
                });

            ui.add_space(10.0);
            if ui.link("Continue without signing in").clicked() {
                action = Some(AuthAction::Skip);
            }
        });

        action
    }

    fn render_login(&mut self, ui: &mut egui::Ui) -> Option<AuthAction> {
        let mut action = None;
        ui.heading("Login");
        ui.add_space(10.0);

        ui.label("Username");
        ui.text_edit_singleline(&mut self.username);
        ui.label("Password");
        let submitted = password_field(ui, &mut self.password, &mut self.show_password);

        ui.add_space(10.0);
        let clicked = ui
            .add_enabled(!self.busy, egui::Button::new("Sign in"))
            .clicked();
        if (clicked || submitted) && !self.busy {
            action = Some(AuthAction::Login);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label("No account?");
            if ui.link("Register").clicked() {
                self.toggle_mode();
            }
        });
        action
    }

    fn render_register(&mut self, ui: &mut egui::Ui) -> Option<AuthAction> {
        let mut action = None;
        ui.heading("Register");
        ui.add_space(10.0);

        ui.label("Username");
        ui.text_edit_singleline(&mut self.reg_username);
        ui.label("Email");
        ui.text_edit_singleline(&mut self.reg_email);
        ui.label("Password");
        password_field(ui, &mut self.reg_password, &mut self.show_reg_password);
        ui.label("Confirm password");
        password_field(ui, &mut self.reg_confirm_password, &mut self.show_reg_password);
        ui.checkbox(&mut self.terms_accepted, "I agree to the Terms & Conditions");

        ui.add_space(10.0);
        if ui
            .add_enabled(!self.busy, egui::Button::new("Create account"))
            .clicked()
        {
            action = Some(AuthAction::Register);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            ui.label("Already registered?");
            if ui.link("Login").clicked() {
                self.toggle_mode();
            }
        });
        action
    }
}

/// Password input with a visibility toggle. Returns true when Enter was pressed.
fn password_field(ui: &mut egui::Ui, value: &mut String, visible: &mut bool) -> bool {
    let mut submitted = false;
    ui.horizontal(|ui| {
        let response = ui.add(egui::TextEdit::singleline(value).password(!*visible));
        submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let icon = if *visible { "🙈" } else { "👁" };
        if ui.small_button(icon).on_hover_text("Show/hide password").clicked() {
            *visible = !*visible;
        }
    });
    submitted
}
