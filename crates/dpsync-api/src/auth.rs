use secrecy::SecretString;

/// Credentials for authenticating with the site server.
///
/// Each variant carries the secret material needed for its auth flow.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// API key sent as `Authorization: Bearer <key>` on every request.
    ApiKey { key: SecretString },

    /// Username/password session auth. Login stores a session cookie in
    /// the client's cookie jar; subsequent requests ride on it.
    Password {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    /// Whether this credential kind needs an explicit login round-trip
    /// before the client is usable.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Password { .. })
    }
}
