//! SmartLPD Network Library
//!
//! HTTP client for the SmartLPD backend.
//!
//! # Architecture
//!
//! - **Backend**: async trait over every endpoint the client calls
//! - **ApiClient**: `reqwest` implementation of [`Backend`]
//! - **Protocol**: JSON request/response envelopes
//!
//! # Usage
//!
//! ```ignore
//! let client = ApiClient::new("http://localhost:8080", Duration::from_secs(30))?;
//! let fines = client.check_fines("ABC123").await?;
//! ```

pub mod backend;
pub mod client;
pub mod error;
pub mod protocol;

pub use backend::Backend;
pub use client::ApiClient;
pub use error::{Error, Result};

/// Path prefix shared by every backend endpoint
pub const API_PREFIX: &str = "/api";
