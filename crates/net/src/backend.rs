//! Backend interface
//!
//! Every call the client makes goes through this trait so controllers can
//! be driven against an in-process fake.

use async_trait::async_trait;
use smartlpd_core::validation::Registration;
use smartlpd_core::{DetectionOutcome, Fine, FineStats, FineStatus, NewFine, Session};

use crate::error::Result;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Liveness probe (`GET /api/test`)
    async fn ping(&self) -> Result<()>;

    /// Create an account and return its session
    async fn register(&self, registration: &Registration) -> Result<Session>;

    /// Log in against the backend's user store
    async fn login(&self, username: &str, password: &str) -> Result<Session>;

    /// Submit a base64 image for plate recognition.
    ///
    /// A 401 reply maps to [`crate::Error::Unauthorized`].
    async fn detect(&self, token: &str, image_base64: &str) -> Result<DetectionOutcome>;

    /// Fines recorded against a plate
    async fn check_fines(&self, plate: &str) -> Result<Vec<Fine>>;

    /// Pay a fine; returns the server's message, if any
    async fn pay_fine(&self, fine_id: i64, plate: &str) -> Result<Option<String>>;

    /// Aggregate counts
    async fn fine_stats(&self) -> Result<FineStats>;

    /// Every fine on record
    async fn all_fines(&self) -> Result<Vec<Fine>>;

    /// Issue a new fine; returns the server's message, if any
    async fn issue_fine(&self, fine: &NewFine) -> Result<Option<String>>;

    /// Change a fine's status; returns the server's message, if any
    async fn update_fine_status(&self, fine_id: i64, status: FineStatus) -> Result<Option<String>>;
}
