// ── Core error types ──
//
// User-facing errors from dpsync-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<dpsync_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Everything here is a precondition or connection failure -- failures
/// during a sync run itself are captured per item/category in the
/// [`RunReport`](crate::RunReport), never raised through this type.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to site server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Precondition errors ──────────────────────────────────────────
    #[error("No content categories registered")]
    NoCategories,

    #[error("Invalid target node: {reason}")]
    InvalidTarget { reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dpsync_api::Error> for CoreError {
    fn from(err: dpsync_api::Error) -> Self {
        match err {
            dpsync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            dpsync_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "session expired -- re-authentication required".into(),
            },
            dpsync_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "invalid API key".into(),
            },
            other => CoreError::Api {
                message: other.to_string(),
            },
        }
    }
}
