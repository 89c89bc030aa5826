//! Wire types for the backend's JSON API
//!
//! Every response is an envelope with a `success` flag and an optional
//! `message`, plus endpoint-specific payload fields. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};
use smartlpd_core::{
    Detection, DetectionOutcome, DetectionSource, Fine, FineStats, FineStatus, Role, Session,
};

use crate::error::{Error, Result};

/// Common accessors over response envelopes
pub trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;

    /// Turn a `success: false` envelope into [`Error::Rejected`]
    fn into_checked(self) -> Result<Self>
    where
        Self: Sized,
    {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::Rejected(self.message().map(str::to_string)))
        }
    }
}

macro_rules! envelope {
    ($ty:ty) => {
        impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }

            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        }
    };
}

/// `POST /api/auth/login` body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /api/detect` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest<'a> {
    pub image_data: &'a str,
}

/// `POST /api/fines/pay/{id}` body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest<'a> {
    pub license_plate_number: &'a str,
}

/// `PUT /api/fines/{id}/status` body
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: FineStatus,
}

/// Login and registration response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}
envelope!(AuthResponse);

impl AuthResponse {
    pub fn into_session(self) -> Result<Session> {
        let response = self.into_checked()?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Rejected(Some("Response did not include a token".into())))?;
        let role = response
            .role
            .as_deref()
            .map(Role::from_stored)
            .unwrap_or(Role::Citizen);

        Ok(Session::new(token, response.username.unwrap_or_default(), role))
    }
}

/// Detection response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub license_plate_number: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}
envelope!(DetectResponse);

impl DetectResponse {
    pub fn into_outcome(self) -> DetectionOutcome {
        match self.license_plate_number {
            Some(plate) if self.success => DetectionOutcome::Found(Detection {
                license_plate_number: plate,
                confidence: self.confidence,
                source: DetectionSource::Backend,
            }),
            _ => DetectionOutcome::NotFound {
                message: self
                    .message
                    .unwrap_or_else(|| "No license plate detected".to_string()),
            },
        }
    }
}

/// Fine list response
#[derive(Debug, Clone, Deserialize)]
pub struct FinesResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "skip_malformed_fines")]
    pub fines: Vec<Fine>,
}

/// Decode each row on its own; a row that does not parse is logged and
/// left out instead of failing the whole list
fn skip_malformed_fines<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<Fine>, D::Error> {
    let rows = Option::<Vec<serde_json::Value>>::deserialize(d)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Fine>(row) {
            Ok(fine) => Some(fine),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed fine");
                None
            }
        })
        .collect())
}

fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
envelope!(FinesResponse);

/// Statistics response
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: FineStats,
}
envelope!(StatsResponse);

/// Response carrying only the envelope
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
envelope!(MessageResponse);

/// Body of an HTTP 500 reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
