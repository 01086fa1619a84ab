//! Resolved connection configuration for one site server.
//!
//! Built by the config layer (profiles + flags) and consumed by
//! [`catalog::connect`](crate::catalog::connect).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to verify the site server's TLS certificate.
#[derive(Debug, Clone)]
pub enum TlsVerification {
    SystemDefaults,
    CustomCa(PathBuf),
    DangerAcceptInvalid,
}

/// Credentials for the management API.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    ApiKey(SecretString),
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// Everything needed to open an authenticated session against one site.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Management server base URL.
    pub url: Url,
    /// Site code scoping every request.
    pub site: String,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    pub timeout: Duration,
}
