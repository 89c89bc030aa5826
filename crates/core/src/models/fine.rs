//! Fine models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Date format used wherever a fine date is shown to a user
pub const DISPLAY_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Lifecycle status of a fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FineStatus {
    Unpaid,
    Paid,
    Cancelled,
}

impl FineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FineStatus::Unpaid => "UNPAID",
            FineStatus::Paid => "PAID",
            FineStatus::Cancelled => "CANCELLED",
        }
    }

    /// PAID and CANCELLED are settled
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FineStatus::Unpaid)
    }

    /// Only UNPAID fines may move, and only to PAID or CANCELLED
    pub fn can_transition_to(&self, next: FineStatus) -> bool {
        matches!(
            (self, next),
            (FineStatus::Unpaid, FineStatus::Paid) | (FineStatus::Unpaid, FineStatus::Cancelled)
        )
    }
}

impl fmt::Display for FineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FineStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNPAID" => Ok(FineStatus::Unpaid),
            "PAID" => Ok(FineStatus::Paid),
            "CANCELLED" => Ok(FineStatus::Cancelled),
            other => Err(Error::Validation(format!("unknown fine status '{}'", other))),
        }
    }
}

/// A fine as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
    pub id: i64,
    pub license_plate_number: String,
    pub violation_type: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "de_date")]
    pub violation_date: NaiveDateTime,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub due_date: Option<NaiveDateTime>,
    pub status: FineStatus,
    #[serde(default)]
    pub issued_by_username: Option<String>,
}

impl Fine {
    pub fn violation_date_display(&self) -> String {
        self.violation_date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    pub fn due_date_display(&self) -> String {
        self.due_date
            .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| "Not set".to_string())
    }

    pub fn description_display(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No description",
        }
    }

    pub fn issuer_display(&self) -> &str {
        match self.issued_by_username.as_deref() {
            Some(u) if !u.is_empty() => u,
            _ => "System",
        }
    }

    /// Amount as shown on cards, e.g. `$50` or `$12.5`
    pub fn amount_display(&self) -> String {
        format!("${}", self.amount)
    }
}

/// Parse a backend timestamp.
///
/// Local date-times (`2024-03-05T14:30:00[.ffffff]`) are taken as-is,
/// RFC 3339 timestamps with an offset are converted to UTC, and a bare
/// date means midnight.
pub fn parse_backend_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_utc()))
        .or_else(|| {
            s.parse::<NaiveDate>()
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn de_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_backend_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{}'", raw)))
}

fn de_opt_date<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error> {
    match Option::<String>::deserialize(d)? {
        Some(raw) if !raw.trim().is_empty() => parse_backend_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date '{}'", raw))),
        _ => Ok(None),
    }
}

fn zero_if_null<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(d)?.unwrap_or(0))
}

/// Aggregate counts shown on the management page.
///
/// Missing or `null` counters read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FineStats {
    #[serde(deserialize_with = "zero_if_null")]
    pub total_fines: u64,
    #[serde(deserialize_with = "zero_if_null")]
    pub unpaid_fines: u64,
    #[serde(deserialize_with = "zero_if_null")]
    pub paid_fines: u64,
}

/// Request body for issuing a fine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFine {
    pub license_plate_number: String,
    pub violation_type: String,
    pub amount: f64,
    pub description: String,
}
