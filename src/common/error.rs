//! Error types for the acceptance harness
//!
//! Failures are written to be read in a step report without re-running the
//! suite: timeouts name the awaited condition, assertion errors carry both
//! sides of the comparison, precondition errors name the missing state.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the acceptance harness
#[derive(Error, Debug)]
pub enum Error {
    // === Browser/session errors ===
    #[error("No Chromium executable found. Searched: {searched}")]
    BrowserNotFound { searched: String },

    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    // === Step failures ===
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("Assertion failed on {what}: expected {expected}, got {actual}")]
    Assertion {
        what: String,
        expected: String,
        actual: String,
    },

    // === Captured response errors ===
    #[error("Failed to parse response body from '{url}': {source}")]
    ResponseParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode response body from '{url}': {detail}")]
    ResponseDecode { url: String, detail: String },

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Environment errors ===
    #[error("Preflight failed: {0}")]
    Preflight(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a timeout error naming the awaited condition
    pub fn timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            secs,
        }
    }

    /// Create an assertion error carrying both compared values
    pub fn assertion(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Assertion {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a precondition error naming the missing state
    pub fn precondition(what: impl Into<String>) -> Self {
        Self::Precondition(what.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_names_the_condition() {
        let err = Error::timeout("response matching '**/arc/v1/notices'", 30);
        let msg = err.to_string();
        assert!(msg.contains("30s"));
        assert!(msg.contains("**/arc/v1/notices"));
    }

    #[test]
    fn test_assertion_carries_both_values() {
        let err = Error::assertion("option count", 3, 2);
        let msg = err.to_string();
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("got 2"));
    }
}
