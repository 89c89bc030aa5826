//! Application state management

use std::sync::Arc;

use smartlpd_core::{Action, Config, Error, PermissionMatrix, Session, SessionStore};
use smartlpd_net::Backend;

use crate::camera::Camera;
use crate::ui::Ui;

/// Everything the controllers share
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SessionStore>,
    pub backend: Arc<dyn Backend>,
    pub ui: Arc<dyn Ui>,
    pub camera: Arc<dyn Camera>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn Backend>,
        ui: Arc<dyn Ui>,
        camera: Arc<dyn Camera>,
    ) -> Self {
        Self {
            config,
            store,
            backend,
            ui,
            camera,
        }
    }

    /// Current session, if a token is stored
    pub fn session(&self) -> Option<Session> {
        Session::load(self.store.as_ref())
    }

    /// Current session, provided its role may perform `action`
    pub fn authorize(&self, action: Action) -> smartlpd_core::Result<Session> {
        let session = self
            .session()
            .ok_or_else(|| Error::Authentication("Please login first.".into()))?;
        PermissionMatrix::require(session.role, action).inspect_err(|_| {
            tracing::warn!(username = %session.username, role = %session.role, ?action, "Action refused");
        })?;
        Ok(session)
    }

    /// Drop the stored session, logging rather than failing
    pub fn clear_session(&self) {
        if let Err(e) = Session::clear(self.store.as_ref()) {
            tracing::warn!(error = %e, "Failed to clear session");
        }
    }

    /// Log what the session currently holds
    pub fn log_session(&self, page: &str) {
        match self.session() {
            Some(session) => tracing::debug!(
                page,
                username = %session.username,
                role = %session.role,
                "Session present"
            ),
            None => tracing::debug!(page, "No session"),
        }
    }
}
