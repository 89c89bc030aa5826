//! Role-based access for client pages and actions

use crate::error::{Error, Result};
use crate::models::Role;

/// Actions a signed-in user can attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Detection
    DetectPlate,
    HandOffToFineManagement,

    // Citizen fine lookup
    CheckFines,
    PayFine,

    // Fine management
    ViewFineManagement,
    IssueFine,
    UpdateFineStatus,
    ExportFines,
}

/// Permission matrix for client roles
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if a role may perform an action
    pub fn can_perform(role: Role, action: Action) -> bool {
        match action {
            // Open to every signed-in user
            Action::DetectPlate | Action::CheckFines | Action::PayFine => true,

            // Authority only
            Action::HandOffToFineManagement
            | Action::ViewFineManagement
            | Action::IssueFine
            | Action::UpdateFineStatus
            | Action::ExportFines => role.is_authority(),
        }
    }

    /// Like [`can_perform`](Self::can_perform), with the refusal as an error
    pub fn require(role: Role, action: Action) -> Result<()> {
        if Self::can_perform(role, action) {
            return Ok(());
        }

        let message = match action {
            Action::HandOffToFineManagement | Action::IssueFine => "Only authorities can issue fines.",
            Action::UpdateFineStatus => "Only authorities can change the status of a fine.",
            Action::ExportFines => "Only authorities can export fines.",
            Action::ViewFineManagement => {
                "Access denied. This page is for government authorities only."
            }
            Action::DetectPlate | Action::CheckFines | Action::PayFine => {
                "You are not allowed to do that."
            }
        };
        Err(Error::PermissionDenied(message.into()))
    }
}
