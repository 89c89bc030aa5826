//! `reqwest` client for the SmartLPD backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use smartlpd_core::validation::Registration;
use smartlpd_core::{DetectionOutcome, Fine, FineStats, FineStatus, NewFine, Session};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::protocol::{
    AuthResponse, DetectRequest, DetectResponse, Envelope, ErrorBody, FinesResponse,
    LoginRequest, MessageResponse, PayRequest, StatsResponse, StatusUpdate,
};
use crate::API_PREFIX;

/// HTTP client for the backend's `/api` endpoints
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend origin.
    ///
    /// `base_url` may be given with or without a trailing slash or `/api`
    /// suffix; both spellings resolve to the same endpoints.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client around an already configured `reqwest::Client`
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = trimmed
            .strip_suffix(API_PREFIX)
            .unwrap_or(trimmed)
            .to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Fail on any non-2xx status, then decode the envelope
    async fn checked<T: DeserializeOwned + Envelope>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        Self::decode(resp).await
    }

    /// Decode the envelope whatever the status, as the backend reports
    /// validation failures as 4xx/5xx with a JSON message
    async fn lenient<T: DeserializeOwned + Envelope>(resp: Response) -> Result<T> {
        let status = resp.status();
        match Self::decode::<T>(resp).await {
            Err(Error::Json(_)) if !status.is_success() => Err(Error::Status(status.as_u16())),
            other => other,
        }
    }

    async fn decode<T: DeserializeOwned + Envelope>(resp: Response) -> Result<T> {
        let body = resp.text().await?;
        let envelope: T = serde_json::from_str(&body)?;
        envelope.into_checked()
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn ping(&self) -> Result<()> {
        let url = self.url("/test");
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if status.is_success() {
            debug!(url = %url, "Backend reachable");
            Ok(())
        } else {
            warn!(url = %url, status = status.as_u16(), "Backend responded with error");
            Err(Error::Status(status.as_u16()))
        }
    }

    async fn register(&self, registration: &Registration) -> Result<Session> {
        let url = self.url("/auth/register");
        info!(url = %url, username = %registration.username, role = %registration.role, "Registering user");

        let resp = self.client.post(&url).json(registration).send().await?;
        let auth: AuthResponse = Self::lenient(resp).await?;
        auth.into_session()
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let url = self.url("/auth/login");
        info!(url = %url, username = %username, "Logging in");

        let resp = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let auth: AuthResponse = Self::lenient(resp).await?;
        auth.into_session()
    }

    async fn detect(&self, token: &str, image_base64: &str) -> Result<DetectionOutcome> {
        let url = self.url("/detect");
        info!(url = %url, payload_len = image_base64.len(), "Submitting image for detection");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&DetectRequest {
                image_data: image_base64,
            })
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Detection rejected: session expired");
            return Err(Error::Unauthorized);
        }

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        // A `success: false` detection is an answer, not an error
        let detection: DetectResponse = serde_json::from_str(&resp.text().await?)?;
        Ok(detection.into_outcome())
    }

    async fn check_fines(&self, plate: &str) -> Result<Vec<Fine>> {
        let url = self.url("/fines/check");
        info!(url = %url, plate = %plate, "Checking fines");

        let resp = self
            .client
            .get(&url)
            .query(&[("licensePlateNumber", plate)])
            .send()
            .await?;

        let status = resp.status();
        debug!(status = status.as_u16(), "Fine check response");
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            let body: ErrorBody = resp.json().await.unwrap_or_default();
            return Err(Error::Server(
                body.message
                    .unwrap_or_else(|| "Internal server error".to_string()),
            ));
        }

        let fines: FinesResponse = Self::checked(resp).await?;
        info!(count = fines.fines.len(), "Fines retrieved");
        Ok(fines.fines)
    }

    async fn pay_fine(&self, fine_id: i64, plate: &str) -> Result<Option<String>> {
        let url = self.url(&format!("/fines/pay/{}", fine_id));
        info!(url = %url, fine_id, plate = %plate, "Paying fine");

        let resp = self
            .client
            .post(&url)
            .json(&PayRequest {
                license_plate_number: plate,
            })
            .send()
            .await?;
        let result: MessageResponse = Self::checked(resp).await?;
        Ok(result.message)
    }

    async fn fine_stats(&self) -> Result<FineStats> {
        let url = self.url("/fines/stats");
        debug!(url = %url, "Loading fine statistics");

        let resp = self.client.get(&url).send().await?;
        let result: StatsResponse = Self::checked(resp).await?;
        Ok(result.stats)
    }

    async fn all_fines(&self) -> Result<Vec<Fine>> {
        let url = self.url("/fines");
        debug!(url = %url, "Loading all fines");

        let resp = self.client.get(&url).send().await?;
        let result: FinesResponse = Self::checked(resp).await?;
        info!(count = result.fines.len(), "Loaded fines");
        Ok(result.fines)
    }

    async fn issue_fine(&self, fine: &NewFine) -> Result<Option<String>> {
        let url = self.url("/fines");
        info!(
            url = %url,
            plate = %fine.license_plate_number,
            violation = %fine.violation_type,
            amount = fine.amount,
            "Issuing fine"
        );

        let resp = self.client.post(&url).json(fine).send().await?;
        let result: MessageResponse = Self::lenient(resp).await?;
        Ok(result.message)
    }

    async fn update_fine_status(&self, fine_id: i64, status: FineStatus) -> Result<Option<String>> {
        let url = self.url(&format!("/fines/{}/status", fine_id));
        info!(url = %url, fine_id, status = %status, "Updating fine status");

        let resp = self
            .client
            .put(&url)
            .json(&StatusUpdate { status })
            .send()
            .await?;
        let result: MessageResponse = Self::lenient(resp).await?;
        Ok(result.message)
    }
}
