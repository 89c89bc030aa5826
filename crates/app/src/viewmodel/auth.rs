//! Authentication view model

use std::sync::Arc;
use std::time::Duration;

use smartlpd_core::validation::RegistrationForm;
use smartlpd_core::{MockDirectory, Session};
use smartlpd_net::Error as NetError;

use crate::busy::BusyFlag;
use crate::state::AppState;
use crate::ui::{NavBar, Page, Panel, StatusLevel};

const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1000);
const REGISTER_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct AuthController {
    state: Arc<AppState>,
    login_busy: BusyFlag,
    register_busy: BusyFlag,
}

impl AuthController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            login_busy: BusyFlag::new(),
            register_busy: BusyFlag::new(),
        }
    }

    /// Render the navigation chrome for the stored session
    pub fn navigation(&self) -> NavBar {
        let nav = NavBar::for_session(self.state.session().as_ref());
        self.state.ui.render(Panel::Navigation(nav.clone()));
        nav
    }

    pub async fn login(&self, username: &str, password: &str) {
        let Some(_busy) = self.login_busy.try_acquire() else {
            tracing::debug!("Login already in progress");
            return;
        };
        let ui = &self.state.ui;

        if username.is_empty() || password.is_empty() {
            ui.status(StatusLevel::Error, "Please fill in all fields");
            return;
        }

        let session = if self.state.config.mock_login {
            match MockDirectory::authenticate(username, password) {
                Ok(session) => session,
                Err(e) => {
                    tracing::debug!(username, error = %e, "Mock login rejected");
                    ui.status(StatusLevel::Error, INVALID_CREDENTIALS);
                    return;
                }
            }
        } else {
            match self.state.backend.login(username, password).await {
                Ok(session) => session,
                Err(e @ NetError::Rejected(_)) => {
                    ui.status(
                        StatusLevel::Error,
                        e.rejection_message().unwrap_or(INVALID_CREDENTIALS),
                    );
                    return;
                }
                Err(NetError::Unauthorized) | Err(NetError::Status(401)) => {
                    ui.status(StatusLevel::Error, INVALID_CREDENTIALS);
                    return;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Login request failed");
                    ui.status(StatusLevel::Error, &format!("Login failed: {}", e));
                    return;
                }
            }
        };

        if self.start_session(&session, "Login successful! Redirecting...", LOGIN_REDIRECT_DELAY) {
            tracing::info!(username = %session.username, role = %session.role, "Logged in");
        }
    }

    pub async fn register(&self, form: &RegistrationForm) {
        let Some(_busy) = self.register_busy.try_acquire() else {
            tracing::debug!("Registration already in progress");
            return;
        };
        let ui = &self.state.ui;

        let registration = match form.validate() {
            Ok(registration) => registration,
            Err(e) => {
                ui.status(StatusLevel::Error, &e.user_message());
                return;
            }
        };

        match self.state.backend.register(&registration).await {
            Ok(session) => {
                if self.start_session(
                    &session,
                    "Registration successful! Redirecting...",
                    REGISTER_REDIRECT_DELAY,
                ) {
                    tracing::info!(username = %session.username, role = %session.role, "Registered");
                }
            }
            Err(e @ NetError::Rejected(_)) => {
                ui.status(
                    StatusLevel::Error,
                    e.rejection_message().unwrap_or("Registration failed"),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Registration request failed");
                ui.status(StatusLevel::Error, &format!("Registration failed: {}", e));
            }
        }
    }

    /// Forget the session and go home
    pub fn logout(&self) {
        self.state.clear_session();
        tracing::info!("Logged out");
        self.navigation();
        self.state.ui.navigate(Page::Home, Duration::ZERO);
    }

    fn start_session(&self, session: &Session, message: &str, delay: Duration) -> bool {
        let ui = &self.state.ui;
        if let Err(e) = session.save(self.state.store.as_ref()) {
            tracing::error!(error = %e, "Failed to store session");
            ui.status(StatusLevel::Error, &format!("Failed to store session: {}", e));
            return false;
        }

        ui.status(StatusLevel::Success, message);
        self.navigation();
        ui.navigate(Page::landing_for(session.role), delay);
        true
    }
}
