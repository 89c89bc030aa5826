//! Page controllers

mod auth;
mod check_fines;
mod detect;
mod manage_fines;

pub use auth::AuthController;
pub use check_fines::CheckFinesController;
pub use detect::DetectController;
pub use manage_fines::ManageFinesController;

use crate::state::AppState;
use std::sync::Arc;

/// One controller per page, sharing the same state
pub struct Controllers {
    pub auth: AuthController,
    pub detect: DetectController,
    pub check_fines: CheckFinesController,
    pub manage_fines: ManageFinesController,
}

impl Controllers {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            auth: AuthController::new(state.clone()),
            detect: DetectController::new(state.clone()),
            check_fines: CheckFinesController::new(state.clone()),
            manage_fines: ManageFinesController::new(state),
        }
    }
}
