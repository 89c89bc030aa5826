//! Client-side fine search

use crate::models::Fine;

/// Filter fines by a case-insensitive substring.
///
/// The term is trimmed and lower-cased; an empty term keeps every fine.
/// Plate, violation type, description and status are matched. Order is
/// preserved.
pub fn filter_fines<'a>(fines: &'a [Fine], term: &str) -> Vec<&'a Fine> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return fines.iter().collect();
    }

    fines.iter().filter(|fine| matches(fine, &term)).collect()
}

fn matches(fine: &Fine, term: &str) -> bool {
    fine.license_plate_number.to_lowercase().contains(term)
        || fine.violation_type.to_lowercase().contains(term)
        || fine
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(term))
        || fine.status.as_str().to_lowercase().contains(term)
}
