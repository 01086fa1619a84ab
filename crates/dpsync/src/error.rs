//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dpsync_core::CoreError;

/// Process exit codes.
///
/// `GENERAL` doubles as the "sync finished with failures" code: a run
/// exits 0 only when every item in every category succeeded.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to site server at {url}")]
    #[diagnostic(
        code(dpsync::connection_failed),
        help(
            "Check that the management service is running and accessible.\n\
             URL: {url}\n\
             Try: dpsync nodes list --insecure"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(dpsync::auth_failed),
        help(
            "Verify your API key or credentials.\n\
             Run: dpsync config init"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(dpsync::no_credentials),
        help(
            "Configure credentials with: dpsync config init\n\
             Or set the DPSYNC_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Distribution point '{identifier}' not found")]
    #[diagnostic(
        code(dpsync::not_found),
        help("Run: dpsync nodes list to see available distribution points")
    )]
    NodeNotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(dpsync::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dpsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dpsync::profile_not_found),
        help("Create one with: dpsync config init")
    )]
    ProfileNotFound { name: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(dpsync::no_config),
        help(
            "Create one with: dpsync config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dpsync::config))]
    Config(#[from] dpsync_config::ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NodeNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::NoCategories => CliError::Validation {
                field: "categories".into(),
                reason: "no content categories registered".into(),
            },

            CoreError::InvalidTarget { reason } => CliError::Validation {
                field: "target".into(),
                reason,
            },

            CoreError::Api { message } => CliError::ApiError { message },
        }
    }
}
