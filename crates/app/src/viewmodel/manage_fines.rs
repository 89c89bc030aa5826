//! Fine management view model
//!
//! Authority-only page: statistics, the full fine list with a local
//! search, CSV export, issuing fines and moving them to PAID or
//! CANCELLED.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use smartlpd_core::export::{export_filename, fines_to_csv};
use smartlpd_core::invariants::{check_fine_invariants, check_stats_invariants};
use smartlpd_core::search::filter_fines;
use smartlpd_core::validation::IssueFineForm;
use smartlpd_core::{Action, Fine, FineStats, FineStatus, PermissionMatrix, Session, SessionKey};
use smartlpd_net::Error as NetError;

use crate::busy::BusyFlag;
use crate::state::AppState;
use crate::ui::{FineCard, NavBar, Page, Panel, StatusLevel};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ManageFinesController {
    state: Arc<AppState>,
    all_fines: Mutex<Vec<Fine>>,
    form: Mutex<IssueFineForm>,
    search_term: Mutex<String>,
    stats_busy: BusyFlag,
    list_busy: BusyFlag,
    issue_busy: BusyFlag,
    status_busy: BusyFlag,
}

impl ManageFinesController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            all_fines: Mutex::new(Vec::new()),
            form: Mutex::new(IssueFineForm::default()),
            search_term: Mutex::new(String::new()),
            stats_busy: BusyFlag::new(),
            list_busy: BusyFlag::new(),
            issue_busy: BusyFlag::new(),
            status_busy: BusyFlag::new(),
        }
    }

    /// Page guard: a token and the authority role are both required
    pub fn guard(&self) -> Option<Session> {
        let ui = &self.state.ui;
        let Some(session) = self.state.session() else {
            ui.alert("Please login first to manage fines.");
            ui.navigate(Page::Login, Duration::ZERO);
            return None;
        };

        if let Err(e) = PermissionMatrix::require(session.role, Action::ViewFineManagement) {
            tracing::warn!(username = %session.username, role = %session.role, "Fine management refused");
            ui.alert(&e.user_message());
            ui.navigate(Page::Home, Duration::ZERO);
            return None;
        }

        Some(session)
    }

    /// Guard, load stats and fines, and pick up a plate handed over
    /// from the detection page
    pub async fn on_page_load(&self) -> bool {
        self.state.log_session("manage fines");
        let Some(session) = self.guard() else {
            return false;
        };

        self.state
            .ui
            .render(Panel::Navigation(NavBar::for_session(Some(&session))));
        self.reload().await;

        match self.state.store.take(SessionKey::DetectedPlate) {
            Ok(Some(plate)) => {
                tracing::debug!(plate = %plate, "Prefilling detected plate");
                let form = {
                    let mut form = lock(&self.form);
                    form.license_plate = plate;
                    form.clone()
                };
                self.state.ui.render(Panel::IssueForm(form));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read detected plate"),
        }
        true
    }

    /// Refresh stats and the fine list together
    pub async fn reload(&self) {
        tokio::join!(self.load_fine_stats(), self.load_all_fines());
    }

    #[cfg(test)]
    pub fn fines(&self) -> Vec<Fine> {
        lock(&self.all_fines).clone()
    }

    pub fn form(&self) -> IssueFineForm {
        lock(&self.form).clone()
    }

    pub fn set_form(&self, form: IssueFineForm) {
        *lock(&self.form) = form;
    }

    #[cfg(test)]
    pub fn search_term(&self) -> String {
        lock(&self.search_term).clone()
    }

    /// Counts for the stat boxes; any failure shows zeros
    pub async fn load_fine_stats(&self) {
        let Some(_busy) = self.stats_busy.try_acquire() else {
            tracing::debug!("Stats already loading");
            return;
        };

        let stats = match self.state.backend.fine_stats().await {
            Ok(stats) => {
                check_stats_invariants(&stats);
                stats
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading fine stats");
                FineStats::default()
            }
        };
        self.state.ui.render(Panel::Stats(stats));
    }

    /// Replace the cached fine list and render all of it
    pub async fn load_all_fines(&self) {
        let Some(_busy) = self.list_busy.try_acquire() else {
            tracing::debug!("Fines already loading");
            return;
        };
        let ui = &self.state.ui;

        match self.state.backend.all_fines().await {
            Ok(fines) => {
                tracing::debug!(count = fines.len(), "Loaded all fines");
                fines.iter().for_each(|fine| {
                    check_fine_invariants(fine);
                });
                let cards = fines.iter().map(FineCard::for_authority).collect();
                *lock(&self.all_fines) = fines;
                ui.render(Panel::FineList { cards });
            }
            Err(e @ NetError::Rejected(_)) => ui.alert(&format!("Error: {}", e)),
            Err(e) => {
                tracing::error!(error = %e, "Error loading fines");
                ui.alert("Failed to load fines. Please try again.");
            }
        }
    }

    /// Filter the cached list locally
    pub fn search(&self, term: &str) -> Vec<Fine> {
        *lock(&self.search_term) = term.to_string();

        let matches: Vec<Fine> = {
            let fines = lock(&self.all_fines);
            filter_fines(&fines, term).into_iter().cloned().collect()
        };
        let cards = matches.iter().map(FineCard::for_authority).collect();
        self.state.ui.render(Panel::FineList { cards });
        matches
    }

    /// Save the cached list as `fines_export_<date>.csv`
    pub fn export_csv(&self) {
        let ui = &self.state.ui;
        if let Err(e) = self.state.authorize(Action::ExportFines) {
            ui.alert(&e.user_message());
            return;
        }

        let csv = fines_to_csv(&lock(&self.all_fines));
        let filename = export_filename(Utc::now().date_naive());

        match ui.save_download(&filename, csv.as_bytes()) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Fines exported");
                ui.status(StatusLevel::Success, "Fines exported successfully!");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error exporting fines");
                ui.status(StatusLevel::Error, "Failed to export fines");
            }
        }
    }

    /// Submit the issue form
    pub async fn issue_fine(&self) {
        let Some(_busy) = self.issue_busy.try_acquire() else {
            tracing::debug!("Fine issue already in progress");
            return;
        };
        let ui = &self.state.ui;
        if let Err(e) = self.state.authorize(Action::IssueFine) {
            ui.alert(&e.user_message());
            return;
        }

        let fine = match self.form().validate() {
            Ok(fine) => fine,
            Err(e) => {
                ui.alert(&e.user_message());
                return;
            }
        };

        match self.state.backend.issue_fine(&fine).await {
            Ok(message) => {
                tracing::info!(
                    plate = %fine.license_plate_number,
                    amount = fine.amount,
                    message = message.as_deref(),
                    "Fine issued"
                );
                ui.alert("Fine issued successfully!");
                lock(&self.form).clear();
                lock(&self.search_term).clear();
                ui.render(Panel::IssueForm(IssueFineForm::default()));
                ui.render(Panel::SearchBox(String::new()));
                self.reload().await;
            }
            Err(e @ NetError::Rejected(_)) => ui.alert(&format!("Error: {}", e)),
            Err(e) => {
                tracing::error!(error = %e, "Error issuing fine");
                ui.alert("Failed to issue fine. Please try again.");
            }
        }
    }

    /// Move a fine to PAID or CANCELLED after confirmation
    pub async fn update_fine_status(&self, fine_id: i64, status: FineStatus) {
        let ui = &self.state.ui;
        if let Err(e) = self.state.authorize(Action::UpdateFineStatus) {
            ui.alert(&e.user_message());
            return;
        }
        if !ui.confirm(&format!(
            "Are you sure you want to mark this fine as {}?",
            status
        )) {
            return;
        }
        let Some(_busy) = self.status_busy.try_acquire() else {
            tracing::debug!("Status update already in progress");
            return;
        };

        let current = lock(&self.all_fines)
            .iter()
            .find(|f| f.id == fine_id)
            .map(|f| f.status);
        if let Some(current) = current.filter(|c| !c.can_transition_to(status)) {
            tracing::warn!(fine_id, from = %current, to = %status, "Changing the status of a settled fine");
        }

        match self.state.backend.update_fine_status(fine_id, status).await {
            Ok(message) => {
                tracing::info!(fine_id, status = %status, message = message.as_deref(), "Fine status updated");
                ui.alert("Fine status updated successfully!");
                self.reload().await;
            }
            Err(e @ NetError::Rejected(_)) => ui.alert(&format!("Error: {}", e)),
            Err(e) => {
                tracing::error!(fine_id, error = %e, "Error updating fine status");
                ui.alert("Failed to update fine status. Please try again.");
            }
        }
    }
}
