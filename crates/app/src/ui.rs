//! View seam between controllers and whatever presents them
//!
//! Controllers never print or prompt directly. They push status banners,
//! alerts and panels through [`Ui`], which the terminal front end renders
//! and tests record.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use smartlpd_core::validation::IssueFineForm;
use smartlpd_core::{Action, Fine, FineStats, FineStatus, ImageData, PermissionMatrix, Role, Session};

/// Severity of a transient status banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Success,
    Error,
    Info,
}

impl StatusLevel {
    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Success => "ok",
            StatusLevel::Error => "error",
            StatusLevel::Info => "info",
        }
    }
}

/// Pages a controller can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    CheckFines,
    ManageFines,
}

impl Page {
    /// Where a freshly signed-in user lands
    pub fn landing_for(role: Role) -> Self {
        if role.is_authority() {
            Page::ManageFines
        } else {
            Page::CheckFines
        }
    }

    /// Terminal command that opens this page
    pub fn command_hint(&self) -> &'static str {
        match self {
            Page::Home => "smartlpd whoami",
            Page::Login => "smartlpd login <username>",
            Page::CheckFines => "smartlpd check <plate>",
            Page::ManageFines => "smartlpd fines list",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Home => "home",
            Page::Login => "login",
            Page::CheckFines => "check fines",
            Page::ManageFines => "manage fines",
        };
        f.write_str(name)
    }
}

/// Navigation chrome
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavBar {
    /// "Welcome, {user} ({role})" when signed in
    pub greeting: Option<String>,
    pub show_logout: bool,
    pub show_authority_link: bool,
}

impl NavBar {
    pub fn for_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => Self {
                greeting: Some(format!("Welcome, {} ({})", session.username, session.role)),
                show_logout: true,
                show_authority_link: PermissionMatrix::can_perform(
                    session.role,
                    Action::ViewFineManagement,
                ),
            },
            None => Self::default(),
        }
    }
}

/// Action buttons on a fine card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineAction {
    Pay,
    MarkPaid { enabled: bool },
    Cancel { enabled: bool },
}

/// A fine as displayed
#[derive(Debug, Clone, PartialEq)]
pub struct FineCard {
    pub id: i64,
    pub plate: String,
    pub violation_type: String,
    pub amount: String,
    pub description: String,
    pub violation_date: String,
    pub due_date: String,
    pub status: FineStatus,
    pub issued_by: String,
    pub actions: Vec<FineAction>,
}

impl FineCard {
    fn from_fine(fine: &Fine, actions: Vec<FineAction>) -> Self {
        Self {
            id: fine.id,
            plate: fine.license_plate_number.clone(),
            violation_type: fine.violation_type.clone(),
            amount: fine.amount_display(),
            description: fine.description_display().to_string(),
            violation_date: fine.violation_date_display(),
            due_date: fine.due_date_display(),
            status: fine.status,
            issued_by: fine.issuer_display().to_string(),
            actions,
        }
    }

    /// Card on the citizen lookup page: only unpaid fines can be paid
    pub fn for_citizen(fine: &Fine) -> Self {
        let actions = if !fine.status.is_terminal() {
            vec![FineAction::Pay]
        } else {
            Vec::new()
        };
        Self::from_fine(fine, actions)
    }

    /// Card on the management page. Mark Paid stays available for
    /// cancelled fines; Cancel only for unpaid ones.
    pub fn for_authority(fine: &Fine) -> Self {
        let actions = vec![
            FineAction::MarkPaid {
                enabled: fine.status != FineStatus::Paid,
            },
            FineAction::Cancel {
                enabled: fine.status.can_transition_to(FineStatus::Cancelled),
            },
        ];
        Self::from_fine(fine, actions)
    }
}

/// Detection result area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionView {
    pub plate_label: String,
    pub extracted_text: String,
    pub show_issue_fine: bool,
}

impl Default for DetectionView {
    fn default() -> Self {
        Self {
            plate_label: "LICENSE PLATE".to_string(),
            extracted_text: "No results yet. Upload an image and click \"Detect Plate\".".to_string(),
            show_issue_fine: false,
        }
    }
}

/// Something a controller wants displayed
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Navigation(NavBar),
    /// Lookup results; an empty list renders the empty state
    FineCheck { plate: String, cards: Vec<FineCard> },
    FineList { cards: Vec<FineCard> },
    Stats(FineStats),
    /// `None` renders the "No preview available" placeholder
    Preview(Option<ImageData>),
    Detection(DetectionView),
    IssueForm(IssueFineForm),
    SearchBox(String),
}

/// Presentation surface driven by the controllers
pub trait Ui: Send + Sync {
    /// Transient status banner
    fn status(&self, level: StatusLevel, message: &str);

    /// Blocking notice
    fn alert(&self, message: &str);

    /// Interactive yes/no confirmation
    fn confirm(&self, message: &str) -> bool;

    /// Move to another page after `delay`
    fn navigate(&self, page: Page, delay: Duration);

    fn render(&self, panel: Panel);

    /// Returns false if no clipboard could be reached
    fn copy_to_clipboard(&self, text: &str) -> bool;

    /// Offer a file to the user; returns where it was written
    fn save_download(&self, filename: &str, contents: &[u8]) -> io::Result<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fine(status: FineStatus) -> Fine {
        Fine {
            id: 3,
            license_plate_number: "DEF456".into(),
            violation_type: "Red Light".into(),
            amount: 200.0,
            description: None,
            violation_date: NaiveDate::from_ymd_opt(2024, 12, 31)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap(),
            due_date: None,
            status,
            issued_by_username: None,
        }
    }

    #[test]
    fn test_citizen_card_actions() {
        assert_eq!(FineCard::for_citizen(&fine(FineStatus::Unpaid)).actions, vec![FineAction::Pay]);
        assert!(FineCard::for_citizen(&fine(FineStatus::Paid)).actions.is_empty());
        assert!(FineCard::for_citizen(&fine(FineStatus::Cancelled)).actions.is_empty());
    }

    #[test]
    fn test_authority_card_actions() {
        let unpaid = FineCard::for_authority(&fine(FineStatus::Unpaid));
        assert_eq!(
            unpaid.actions,
            vec![
                FineAction::MarkPaid { enabled: true },
                FineAction::Cancel { enabled: true }
            ]
        );

        let cancelled = FineCard::for_authority(&fine(FineStatus::Cancelled));
        assert_eq!(
            cancelled.actions,
            vec![
                FineAction::MarkPaid { enabled: true },
                FineAction::Cancel { enabled: false }
            ]
        );

        let paid = FineCard::for_authority(&fine(FineStatus::Paid));
        assert_eq!(
            paid.actions,
            vec![
                FineAction::MarkPaid { enabled: false },
                FineAction::Cancel { enabled: false }
            ]
        );
    }

    #[test]
    fn test_card_display_fields() {
        let card = FineCard::for_citizen(&fine(FineStatus::Unpaid));
        assert_eq!(card.amount, "$200");
        assert_eq!(card.description, "No description");
        assert_eq!(card.violation_date, "12/31/2024");
        assert_eq!(card.due_date, "Not set");
        assert_eq!(card.issued_by, "System");
    }

    #[test]
    fn test_nav_bar_for_session() {
        let authority = Session::new("t", "officer", Role::Authority);
        let nav = NavBar::for_session(Some(&authority));
        assert_eq!(nav.greeting.as_deref(), Some("Welcome, officer (AUTHORITY)"));
        assert!(nav.show_logout);
        assert!(nav.show_authority_link);

        let citizen = Session::new("t", "dana", Role::Citizen);
        assert!(!NavBar::for_session(Some(&citizen)).show_authority_link);
        assert_eq!(NavBar::for_session(None), NavBar::default());
    }

    #[test]
    fn test_landing_pages() {
        assert_eq!(Page::landing_for(Role::Authority), Page::ManageFines);
        assert_eq!(Page::landing_for(Role::Citizen), Page::CheckFines);
    }
}
