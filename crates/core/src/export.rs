//! CSV export of fine lists

use chrono::NaiveDate;

use crate::models::Fine;

pub const CSV_HEADER: &str =
    "License Plate,Amount,Violation Type,Description,Violation Date,Due Date,Status,Issued By";

/// File name for an export made on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("fines_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Serialize fines to CSV, one row per fine after the header.
///
/// Text fields are quoted with embedded quotes doubled. A missing
/// description is written as an empty, unquoted field.
pub fn fines_to_csv(fines: &[Fine]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + fines.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for fine in fines {
        let description = match fine.description.as_deref() {
            Some(d) if !d.is_empty() => quote(d),
            _ => String::new(),
        };

        let row = [
            quote(&fine.license_plate_number),
            fine.amount.to_string(),
            quote(&fine.violation_type),
            description,
            quote(&fine.violation_date_display()),
            quote(&fine.due_date_display()),
            quote(fine.status.as_str()),
            quote(fine.issuer_display()),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
