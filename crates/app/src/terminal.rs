//! Terminal front end for the controllers

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::platform;
use crate::ui::{DetectionView, FineAction, FineCard, NavBar, Page, Panel, StatusLevel, Ui};

/// Prints to stdout and reads confirmations from stdin.
///
/// The management list is re-rendered on every reload and search, so
/// only the latest one is kept and printed on [`TerminalUi::flush_list`].
pub struct TerminalUi {
    assume_yes: bool,
    download_dir: PathBuf,
    pending_list: Mutex<Option<Panel>>,
}

impl TerminalUi {
    pub fn new(assume_yes: bool, download_dir: PathBuf) -> Self {
        Self {
            assume_yes,
            download_dir,
            pending_list: Mutex::new(None),
        }
    }

    /// Print the most recent fine list, if any
    pub fn flush_list(&self) {
        let pending = self
            .pending_list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(panel) = pending {
            print!("{}", format_panel(&panel));
        }
    }
}

impl Ui for TerminalUi {
    fn status(&self, level: StatusLevel, message: &str) {
        match level {
            StatusLevel::Error => eprintln!("[{}] {}", level.label(), message),
            _ => println!("[{}] {}", level.label(), message),
        }
    }

    fn alert(&self, message: &str) {
        println!("!! {}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            tracing::debug!(message, "Confirmed by --yes");
            return true;
        }

        print!("{} [y/N] ", message);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read confirmation");
                false
            }
        }
    }

    fn navigate(&self, page: Page, delay: Duration) {
        tracing::debug!(page = %page, delay_ms = delay.as_millis() as u64, "Redirecting");
        println!("Next: {} (`{}`)", page, page.command_hint());
    }

    fn render(&self, panel: Panel) {
        if matches!(panel, Panel::FineList { .. }) {
            *self
                .pending_list
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(panel);
            return;
        }

        let text = format_panel(&panel);
        if !text.is_empty() {
            print!("{}", text);
        }
    }

    fn copy_to_clipboard(&self, text: &str) -> bool {
        platform::copy_to_clipboard(text)
    }

    fn save_download(&self, filename: &str, contents: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(filename);
        std::fs::write(&path, contents)?;
        println!("Saved {}", path.display());
        Ok(path)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Plain-text rendering of a panel
pub fn format_panel(panel: &Panel) -> String {
    let mut out = String::new();
    match panel {
        Panel::Navigation(NavBar { greeting, .. }) => {
            if let Some(greeting) = greeting {
                let _ = writeln!(out, "{}", greeting);
            }
        }
        Panel::FineCheck { plate, cards } if cards.is_empty() => {
            let _ = writeln!(out, "No fines found!");
            let _ = writeln!(out, "No outstanding fines found for license plate: {}", plate);
        }
        Panel::FineCheck { plate, cards } => {
            let _ = writeln!(out, "Fines for: {}", plate);
            cards.iter().for_each(|card| write_card(&mut out, card));
        }
        Panel::FineList { cards } if cards.is_empty() => {
            let _ = writeln!(out, "No fines found.");
        }
        Panel::FineList { cards } => cards.iter().for_each(|card| write_card(&mut out, card)),
        Panel::Stats(stats) => {
            let _ = writeln!(
                out,
                "Total: {}  Unpaid: {}  Paid: {}",
                stats.total_fines, stats.unpaid_fines, stats.paid_fines
            );
        }
        Panel::Preview(Some(image)) => {
            let _ = writeln!(out, "Preview: {} ({} bytes)", image.mime(), image.decoded_len());
        }
        Panel::Preview(None) => {}
        Panel::Detection(view) if *view == DetectionView::default() => {}
        Panel::Detection(DetectionView {
            plate_label,
            extracted_text,
            show_issue_fine,
        }) => {
            let _ = writeln!(out, "Plate: {}", plate_label);
            let _ = writeln!(out, "Text:  {}", extracted_text);
            if *show_issue_fine {
                let _ = writeln!(out, "Issue a fine with `smartlpd detect <image> --issue-fine`");
            }
        }
        Panel::IssueForm(form) => {
            if !form.license_plate.is_empty() {
                let _ = writeln!(out, "Issue form plate: {}", form.license_plate);
            }
        }
        Panel::SearchBox(_) => {}
    }
    out
}

fn write_card(out: &mut String, card: &FineCard) {
    let _ = writeln!(
        out,
        "#{} {} {} {} [{}]",
        card.id, card.plate, card.violation_type, card.amount, card.status
    );
    let _ = writeln!(out, "    Description:    {}", card.description);
    let _ = writeln!(out, "    Violation Date: {}", card.violation_date);
    let _ = writeln!(out, "    Due Date:       {}", card.due_date);
    let _ = writeln!(out, "    Issued By:      {}", card.issued_by);

    let actions: Vec<String> = card
        .actions
        .iter()
        .filter_map(|action| match action {
            FineAction::Pay => Some(format!("smartlpd pay {} {}", card.id, card.plate)),
            FineAction::MarkPaid { enabled: true } => {
                Some(format!("smartlpd fines status {} PAID", card.id))
            }
            FineAction::Cancel { enabled: true } => {
                Some(format!("smartlpd fines status {} CANCELLED", card.id))
            }
            _ => None,
        })
        .collect();
    if !actions.is_empty() {
        let _ = writeln!(out, "    Actions:        {}", actions.join(" | "));
    }
}
