//! Error types for imgscrape
//!
//! This module defines all error types used throughout the library.
//! ScrapeError implements Serialize for Tauri compatibility.

use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for a scrape run
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Caller input rejected before any I/O
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP request to the search API failed
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Search API answered with a non-2xx status
    #[error("Search API returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// Search API body did not have the expected shape
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    /// A single image could not be downloaded; the run stops here
    #[error("Failed to download image {ordinal} ({locator}): {source}")]
    Download {
        ordinal: u32,
        locator: String,
        #[source]
        source: DownloadError,
    },

    /// Saved credentials could not be read or written
    #[error("Credential store error: {0}")]
    CredentialStore(String),
}

impl ScrapeError {
    /// Whether this error came from talking to the search API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport(_) | ScrapeError::UpstreamStatus { .. }
        )
    }
}

/// Serialize ScrapeError as a string for Tauri compatibility
impl Serialize for ScrapeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Failure while fetching or persisting one image
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("failed to persist {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for imgscrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_error_display_invalid_request() {
        let error = ScrapeError::InvalidRequest("query cannot be empty".to_string());
        assert_eq!(error.to_string(), "Invalid request: query cannot be empty");
    }

    #[test]
    fn test_scrape_error_display_upstream_status() {
        let error = ScrapeError::UpstreamStatus {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(error.to_string(), "Search API returned 403: API key not valid");
    }

    #[test]
    fn test_scrape_error_display_malformed() {
        let error = ScrapeError::MalformedResponse("expected value".to_string());
        assert_eq!(error.to_string(), "Malformed search response: expected value");
    }

    #[test]
    fn test_scrape_error_display_download() {
        let error = ScrapeError::Download {
            ordinal: 3,
            locator: "https://img.example/c.jpg".to_string(),
            source: DownloadError::Status(404),
        };
        assert_eq!(
            error.to_string(),
            "Failed to download image 3 (https://img.example/c.jpg): unexpected status 404"
        );
    }

    #[test]
    fn test_download_error_display_persist() {
        let error = DownloadError::Persist {
            path: PathBuf::from("out/cat_1.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.to_string(), "failed to persist out/cat_1.jpg: denied");
    }

    #[test]
    fn test_is_transport() {
        let upstream = ScrapeError::UpstreamStatus {
            status: 500,
            message: "backend error".to_string(),
        };
        assert!(upstream.is_transport());
        assert!(!ScrapeError::MalformedResponse("x".to_string()).is_transport());
        assert!(!ScrapeError::InvalidRequest("x".to_string()).is_transport());
    }

    #[test]
    fn test_scrape_error_serialize() {
        let error = ScrapeError::MalformedResponse("test error".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Malformed search response: test error\"");
    }

    #[test]
    fn test_scrape_error_serialize_download() {
        let error = ScrapeError::Download {
            ordinal: 1,
            locator: "https://img.example/a.jpg".to_string(),
            source: DownloadError::InvalidLocator("ftp://x".to_string()),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(
            json,
            "\"Failed to download image 1 (https://img.example/a.jpg): invalid locator: ftp://x\""
        );
    }
}
