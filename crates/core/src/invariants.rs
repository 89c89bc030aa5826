//! Developer guardrails and invariants
//!
//! Plates we normalized ourselves are checked with debug assertions.
//! Data handed to us by the backend is only checked and logged, never
//! rejected.

use crate::models::{Fine, FineStats};
use crate::validation::{MAX_PLATE_LEN, MIN_PLATE_LEN};

/// Check that a fine returned by the backend is internally consistent
pub fn check_fine_invariants(fine: &Fine) -> bool {
    match fine.due_date {
        Some(due) if due < fine.violation_date => {
            tracing::warn!(fine_id = fine.id, "Fine is due before the violation happened");
            false
        }
        _ => true,
    }
}

/// Check that stats are consistent with each other
pub fn check_stats_invariants(stats: &FineStats) -> bool {
    let ok = stats
        .unpaid_fines
        .checked_add(stats.paid_fines)
        .is_some_and(|counted| counted <= stats.total_fines);
    if !ok {
        tracing::warn!(
            total = stats.total_fines,
            unpaid = stats.unpaid_fines,
            paid = stats.paid_fines,
            "Fine stats do not add up"
        );
    }
    ok
}

/// Validate a plate that has already been normalized
pub fn assert_plate_normalized(plate: &str) {
    debug_assert!(
        plate == plate.trim() && plate == plate.to_uppercase(),
        "Plate '{}' is not normalized",
        plate
    );

    debug_assert!(
        (MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&plate.chars().count()),
        "Plate '{}' has invalid length",
        plate
    );
}
