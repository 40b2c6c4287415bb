//! Error handling for the caución monitor
//!
//! Defines the domain error types for each stage of the pipeline and a
//! unified Result type using anyhow for context chaining in application code.

use thiserror::Error;

/// Twilio error codes meaning the WhatsApp sandbox session expired or the
/// recipient never joined it.
pub const SESSION_EXPIRED_CODES: [i64; 2] = [63015, 21610];

/// Failures while obtaining the rendered rate table
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to launch headless browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {secs}s waiting for the rate table")]
    TableTimeout { secs: u64 },

    #[error("failed to read page content: {0}")]
    Content(String),

    #[error("browser worker failed: {0}")]
    Worker(String),
}

/// Failures while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error(
        "WhatsApp sandbox session expired or not joined (code {code}); \
         send \"join <keyword>\" to {from} to resume alerts"
    )]
    SessionExpired { code: i64, from: String },

    #[error("messaging provider rejected the message (code {code}): {message}")]
    Provider { code: i64, message: String },

    #[error("messaging request failed: {0}")]
    Transport(String),

    #[error("messaging credentials not configured: {0}")]
    MissingCredentials(&'static str),
}

impl NotifyError {
    /// Map a provider error code to the matching variant.
    pub fn from_provider(code: i64, message: impl Into<String>, from: &str) -> Self {
        if SESSION_EXPIRED_CODES.contains(&code) {
            NotifyError::SessionExpired {
                code,
                from: from.to_string(),
            }
        } else {
            NotifyError::Provider {
                code,
                message: message.into(),
            }
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, NotifyError::SessionExpired { .. })
    }
}

/// Invalid startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid cron expression {expr:?}: {reason}")]
    InvalidSchedule { expr: String, reason: String },
}

/// Result type alias for application plumbing
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_codes_are_distinguished() {
        for code in SESSION_EXPIRED_CODES {
            let err = NotifyError::from_provider(code, "whatever", "whatsapp:+14155238886");
            assert!(err.is_session_expired());
            assert!(err.to_string().contains("join <keyword>"));
            assert!(err.to_string().contains("whatsapp:+14155238886"));
        }
    }

    #[test]
    fn test_other_provider_codes_are_generic() {
        let err = NotifyError::from_provider(21211, "Invalid 'To' Phone Number", "x");
        assert!(!err.is_session_expired());
        assert_eq!(
            err.to_string(),
            "messaging provider rejected the message (code 21211): Invalid 'To' Phone Number"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(FetchError::TableTimeout { secs: 15 })
            .context("scan cycle failed");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "scan cycle failed");
        assert!(format!("{:?}", err).contains("waiting for the rate table"));
    }
}
