//! Client configuration
//!
//! Loaded from `config.toml` in the platform config directory. Every
//! field has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! base_url = "http://localhost:8080"
//! request_timeout_secs = 30
//! mock_login = true
//! mock_detection_fallback = true
//! download_dir = "/home/me/Downloads"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin, without the `/api` prefix
    pub base_url: String,
    /// Per-request timeout for the HTTP client
    pub request_timeout_secs: u64,
    /// Check logins against the built-in demo users instead of the backend
    pub mock_login: bool,
    /// Fabricate a detection when the detection service is unusable
    pub mock_detection_fallback: bool,
    /// Where exports and downloaded results are written
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            mock_login: true,
            mock_detection_fallback: true,
            download_dir: None,
        }
    }
}

impl Config {
    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), base_url = %config.base_url, "Loaded config");
        Ok(config)
    }

    /// Load from the platform config directory
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "smartlpd", "smartlpd")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured download directory, else the user's Downloads, else cwd
    pub fn resolved_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }

        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.mock_login);
        assert!(config.mock_detection_fallback);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            base_url = "http://lpd.internal:9000"
            mock_detection_fallback = false
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://lpd.internal:9000");
        assert!(!config.mock_detection_fallback);
        assert!(config.mock_login);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("mock_login = \"yes\"").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file_and_download_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "download_dir = \"/tmp/lpd\"\nrequest_timeout_secs = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/lpd"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
