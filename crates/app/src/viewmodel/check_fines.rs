//! Citizen fine lookup view model

use std::sync::Arc;
use std::time::Duration;

use smartlpd_core::validation::validate_plate;
use smartlpd_core::{Action, PermissionMatrix, Session};
use smartlpd_net::Error as NetError;

use crate::busy::BusyFlag;
use crate::state::AppState;
use crate::ui::{FineCard, NavBar, Page, Panel, StatusLevel};

pub struct CheckFinesController {
    state: Arc<AppState>,
    check_busy: BusyFlag,
    pay_busy: BusyFlag,
}

impl CheckFinesController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            check_busy: BusyFlag::new(),
            pay_busy: BusyFlag::new(),
        }
    }

    /// Page guard; sends anonymous users to login
    pub fn on_page_load(&self) -> Option<Session> {
        self.state.log_session("check fines");
        let Some(session) = self.state.session() else {
            self.state.ui.alert("Please login first to check fines.");
            self.state.ui.navigate(Page::Login, Duration::ZERO);
            return None;
        };
        if let Err(e) = PermissionMatrix::require(session.role, Action::CheckFines) {
            self.state.ui.alert(&e.user_message());
            return None;
        }

        self.state
            .ui
            .render(Panel::Navigation(NavBar::for_session(Some(&session))));
        Some(session)
    }

    pub async fn check_fines(&self, input: &str) {
        let Some(_busy) = self.check_busy.try_acquire() else {
            tracing::debug!("Fine check already in progress");
            return;
        };
        let ui = &self.state.ui;

        let plate = match validate_plate(input) {
            Ok(plate) => plate,
            Err(e) => {
                ui.status(StatusLevel::Error, &e.user_message());
                return;
            }
        };

        tracing::debug!(plate = %plate, "Checking fines");
        match self.state.backend.check_fines(&plate).await {
            Ok(fines) => {
                tracing::debug!(plate = %plate, count = fines.len(), "Fines received");
                let cards = fines.iter().map(FineCard::for_citizen).collect();
                ui.render(Panel::FineCheck { plate, cards });
                ui.status(StatusLevel::Success, "Fines retrieved successfully");
            }
            Err(e @ NetError::Rejected(_)) => {
                ui.status(StatusLevel::Error, &format!("Error: {}", e));
            }
            Err(e) => {
                tracing::error!(plate = %plate, error = %e, "Error checking fines");
                ui.status(StatusLevel::Error, &format!("Failed to check fines: {}", e));
            }
        }
    }

    /// Pay a fine after confirmation, then refresh the lookup
    pub async fn pay_fine(&self, fine_id: i64, plate: &str) {
        if let Err(e) = self.state.authorize(Action::PayFine) {
            self.state.ui.status(StatusLevel::Error, &e.user_message());
            return;
        }
        if !self.state.ui.confirm("Are you sure you want to pay this fine?") {
            return;
        }
        let Some(_busy) = self.pay_busy.try_acquire() else {
            tracing::debug!("Payment already in progress");
            return;
        };
        let ui = &self.state.ui;

        match self.state.backend.pay_fine(fine_id, plate).await {
            Ok(message) => {
                tracing::info!(fine_id, plate, message = message.as_deref(), "Fine paid");
                ui.status(StatusLevel::Success, "Fine paid successfully!");
                self.check_fines(plate).await;
            }
            Err(e @ NetError::Rejected(_)) => {
                ui.status(StatusLevel::Error, &format!("Error: {}", e));
            }
            Err(e) => {
                tracing::error!(fine_id, error = %e, "Error paying fine");
                ui.status(StatusLevel::Error, "Failed to pay fine. Please try again.");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_fine, Call, FakeBackend, Harness, Reply, UiEvent};
    use crate::ui::FineAction;
    use smartlpd_core::{FineStatus, Role};

    #[test]
    fn test_guard_requires_login() {
        let h = Harness::new();
        assert!(CheckFinesController::new(h.state.clone()).on_page_load().is_none());
        assert_eq!(h.ui.alerts(), vec!["Please login first to check fines."]);
        assert_eq!(h.ui.navigations(), vec![(Page::Login, Duration::ZERO)]);
    }

    #[test]
    fn test_guard_shows_authority_link() {
        let h = Harness::signed_in(Role::Authority);
        assert!(CheckFinesController::new(h.state.clone()).on_page_load().is_some());
        assert!(h.ui.panels().iter().any(|p| matches!(
            p,
            Panel::Navigation(NavBar {
                show_authority_link: true,
                ..
            })
        )));
    }

    #[tokio::test]
    async fn test_invalid_plates_never_reach_backend() {
        let h = Harness::signed_in(Role::Citizen);
        let check = CheckFinesController::new(h.state.clone());

        for input in ["", "   ", "ab", "A234567890123456"] {
            check.check_fines(input).await;
        }

        assert!(h.backend.calls().is_empty());
        assert!(h.ui.has_status(StatusLevel::Error, "Please enter a license plate number"));
        assert!(h.ui.has_status(
            StatusLevel::Error,
            "Please enter a valid license plate number (3-15 characters)"
        ));
    }

    #[tokio::test]
    async fn test_check_renders_cards() {
        let h = Harness::signed_in(Role::Citizen);
        FakeBackend::set(
            &h.backend.check_fines,
            Reply::Ok(vec![
                sample_fine(1, "ABC123", FineStatus::Unpaid),
                sample_fine(2, "ABC123", FineStatus::Paid),
            ]),
        );

        CheckFinesController::new(h.state.clone())
            .check_fines(" abc123 ")
            .await;

        assert_eq!(h.backend.calls(), vec![Call::CheckFines("ABC123".into())]);
        let Some(Panel::FineCheck { plate, cards }) = h.ui.panels().pop() else {
            panic!("expected fine check panel");
        };
        assert_eq!(plate, "ABC123");
        assert_eq!(cards[0].actions, vec![FineAction::Pay]);
        assert!(cards[1].actions.is_empty());
        assert!(h.ui.has_status(StatusLevel::Success, "Fines retrieved successfully"));
    }

    #[tokio::test]
    async fn test_check_errors() {
        let h = Harness::signed_in(Role::Citizen);
        let check = CheckFinesController::new(h.state.clone());

        FakeBackend::set(&h.backend.check_fines, Reply::Status(404));
        check.check_fines("ABC123").await;
        assert!(h.ui.has_status(
            StatusLevel::Error,
            "Failed to check fines: HTTP error! status: 404"
        ));

        FakeBackend::set(&h.backend.check_fines, Reply::Rejected(Some("Plate unknown".into())));
        check.check_fines("ABC123").await;
        assert!(h.ui.has_status(StatusLevel::Error, "Error: Plate unknown"));
    }

    #[tokio::test]
    async fn test_pay_fine_refreshes_lookup() {
        let h = Harness::signed_in(Role::Citizen);
        CheckFinesController::new(h.state.clone())
            .pay_fine(4, "ABC123")
            .await;

        assert_eq!(
            h.backend.calls(),
            vec![
                Call::PayFine(4, "ABC123".into()),
                Call::CheckFines("ABC123".into())
            ]
        );
        assert!(h
            .ui
            .events()
            .contains(&UiEvent::Confirm("Are you sure you want to pay this fine?".into())));
        assert!(h.ui.has_status(StatusLevel::Success, "Fine paid successfully!"));
    }

    #[tokio::test]
    async fn test_pay_fine_declined_or_failed() {
        let h = Harness::signed_in(Role::Citizen);
        let check = CheckFinesController::new(h.state.clone());

        h.ui.refuse_confirmations();
        check.pay_fine(4, "ABC123").await;
        assert!(h.backend.calls().is_empty());

        h.ui.confirm_answer.store(true, std::sync::atomic::Ordering::SeqCst);
        FakeBackend::set(&h.backend.pay_fine, Reply::Rejected(Some("Fine already paid".into())));
        check.pay_fine(4, "ABC123").await;
        assert!(h.ui.has_status(StatusLevel::Error, "Error: Fine already paid"));

        FakeBackend::set(&h.backend.pay_fine, Reply::Unreachable);
        check.pay_fine(4, "ABC123").await;
        assert!(h.ui.has_status(StatusLevel::Error, "Failed to pay fine. Please try again."));
        assert_eq!(h.backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_pay_fine_needs_session() {
        let h = Harness::new();
        CheckFinesController::new(h.state.clone())
            .pay_fine(3, "ABC123")
            .await;

        assert!(h.ui.has_status(StatusLevel::Error, "Please login first."));
        assert!(!h.ui.events().iter().any(|e| matches!(e, UiEvent::Confirm(_))));
        assert!(h.backend.calls().is_empty());
    }
}
