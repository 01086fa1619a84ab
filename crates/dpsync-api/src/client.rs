// Management API HTTP client
//
// Wraps `reqwest::Client` with site-scoped URL construction and envelope
// unwrapping. Endpoint groups (nodes, content) are implemented as inherent
// methods in separate files to keep this module focused on transport
// mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::ServiceResponse;
use crate::transport::TransportConfig;

/// Truncate a response body for error messages, stepping back to a
/// character boundary so multibyte UTF-8 content never splits.
fn body_preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// HTTP client for one site on a management server.
///
/// Handles the `{ status, message, value }` envelope and site-scoped URL
/// construction. All methods return unwrapped `value` payloads -- the
/// envelope is stripped before the caller sees it.
pub struct SiteClient {
    http: reqwest::Client,
    base_url: Url,
    site: String,
}

impl SiteClient {
    /// Create a new client from a `TransportConfig` and credentials.
    ///
    /// API-key credentials are installed as a default `Authorization`
    /// header. Password credentials require a [`login`](Self::login)
    /// round-trip before site endpoints become usable; a cookie jar is
    /// added automatically if the config lacks one.
    pub fn new(
        base_url: Url,
        site: String,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = match credentials {
            Credentials::ApiKey { key } => {
                let mut headers = reqwest::header::HeaderMap::new();
                let value = format!("Bearer {}", key.expose_secret());
                let mut value = reqwest::header::HeaderValue::from_str(&value)
                    .map_err(|_| Error::InvalidApiKey)?;
                value.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, value);
                transport.build_client_with_headers(headers)?
            }
            Credentials::Password { .. } => {
                let config = if transport.cookie_jar.is_some() {
                    transport.clone()
                } else {
                    transport.clone().with_cookie_jar()
                };
                config.build_client()?
            }
        };

        Ok(Self {
            http,
            base_url,
            site,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when you already have a client with a session cookie in
    /// its jar, or in tests.
    pub fn with_client(http: reqwest::Client, base_url: Url, site: String) -> Self {
        Self {
            http,
            base_url,
            site,
        }
    }

    /// The site code this client is scoped to.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// The management server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Perform a session login.
    ///
    /// `POST /api/auth/login` with `{username, password}`. On success the
    /// service sets a session cookie which the jar retains for subsequent
    /// requests.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url("auth/login")?;
        debug!(username, "logging in");

        let resp = self
            .http
            .post(url)
            .json(&json!({
                "username": username,
                "password": password.expose_secret(),
            }))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: if body.is_empty() {
                    format!("login rejected (HTTP {status})")
                } else {
                    body
                },
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Service {
                message: format!("HTTP {status}: {}", body_preview(&body)),
            });
        }
        Ok(())
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a server-level API path: `{base}/api/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Build a site-scoped URL: `{base}/api/sites/{site}/{path}`
    ///
    /// All enumeration and distribution endpoints are site-scoped.
    pub(crate) fn site_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/api/sites/{}/{path}",
            self.site
        ))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the service envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the service envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ status, message, value }` envelope, returning `value`
    /// on success or an `Error::Service` when `status != "ok"`.
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Service {
                message: "insufficient permissions (HTTP 403)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Service {
                message: format!("HTTP {status}: {}", body_preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: ServiceResponse<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = body_preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.status == "ok" {
            Ok(envelope.value)
        } else {
            Err(Error::Service {
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("status={}", envelope.status)),
            })
        }
    }
}
