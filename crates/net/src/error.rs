//! Network error types

/// Network result type
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session expired")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{}", .0.as_deref().unwrap_or("Request was not successful"))]
    Rejected(Option<String>),

    #[error("Invalid response: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        match self {
            Error::Http(e) => e.status().is_none() && !e.is_decode(),
            _ => false,
        }
    }

    /// Server-supplied message for a `success: false` envelope
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Error::Rejected(message) => message.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(Error::Status(404).to_string(), "HTTP error! status: 404");
        assert_eq!(
            Error::Server("db down".into()).to_string(),
            "Server error: db down"
        );
        assert_eq!(
            Error::Rejected(Some("Fine not found".into())).to_string(),
            "Fine not found"
        );
        assert_eq!(
            Error::Rejected(None).to_string(),
            "Request was not successful"
        );
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            Error::Rejected(Some("nope".into())).rejection_message(),
            Some("nope")
        );
        assert_eq!(Error::Status(500).rejection_message(), None);
        assert!(!Error::Unauthorized.is_transport());
    }
}
