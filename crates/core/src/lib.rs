//! SmartLPD Core Library
//!
//! Models, session storage, validation, search, export and configuration
//! shared by the SmartLPD client.

pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod image;
pub mod invariants;
pub mod mock;
pub mod models;
pub mod permissions;
pub mod search;
pub mod storage;
pub mod validation;

pub use auth::{MockDirectory, MockUser, MOCK_PASSWORD};
pub use config::Config;
pub use error::{Error, Result};
pub use image::ImageData;
pub use models::*;
pub use permissions::*;
pub use storage::{FileStore, MemoryStore, SessionKey, SessionStore};
