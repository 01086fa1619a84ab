//! Wiring between the management API and the sync driver.
//!
//! The catalog owns the fixed category table: one [`Category`] per
//! [`ContentKind`], each backed by a provider that forwards to the shared
//! [`SiteClient`]. It also handles connection setup and node discovery,
//! which sit upstream of the driver.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use dpsync_api::{ContentKind, Credentials, SiteClient, TlsMode, TransportConfig};

use crate::category::Category;
use crate::config::{AuthCredentials, ServerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Item, Node, TargetHandle};
use crate::provider::{ActionError, ContentProvider, ProviderError};

/// Open an authenticated client against the configured site server.
///
/// Password credentials perform the session login here, so callers get a
/// client that is immediately usable or a connection/auth error up front.
pub async fn connect(config: &ServerConfig) -> Result<Arc<SiteClient>, CoreError> {
    let transport = TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
        cookie_jar: None,
    };

    let credentials = match &config.auth {
        AuthCredentials::ApiKey(key) => Credentials::ApiKey { key: key.clone() },
        AuthCredentials::Credentials { username, password } => Credentials::Password {
            username: username.clone(),
            password: password.clone(),
        },
    };

    let client = SiteClient::new(
        config.url.clone(),
        config.site.clone(),
        &credentials,
        &transport,
    )
    .map_err(CoreError::from)?;

    if let Credentials::Password { username, password } = &credentials {
        client
            .login(username, password)
            .await
            .map_err(|err| match err {
                e if e.is_transient() => CoreError::ConnectionFailed {
                    url: config.url.to_string(),
                    reason: e.to_string(),
                },
                e => CoreError::from(e),
            })?;
    }

    info!(url = %config.url, site = %config.site, "connected to site server");
    Ok(Arc::new(client))
}

/// List the site's distribution points for operator selection.
pub async fn list_nodes(client: &SiteClient) -> Result<Vec<Node>, CoreError> {
    let nodes = client.list_distribution_points().await?;
    Ok(nodes.into_iter().map(Node::from).collect())
}

/// The seven standard content categories, in reporting order.
///
/// The set is fixed at startup; each category shares the one client.
pub fn standard_categories(client: Arc<SiteClient>) -> Vec<Category> {
    ContentKind::ALL
        .into_iter()
        .map(|kind| {
            Category::new(
                kind.display_name(),
                Box::new(RemoteProvider {
                    client: Arc::clone(&client),
                    kind,
                }),
            )
        })
        .collect()
}

/// Provider backed by the management API, one per content kind.
struct RemoteProvider {
    client: Arc<SiteClient>,
    kind: ContentKind,
}

#[async_trait]
impl ContentProvider for RemoteProvider {
    async fn enumerate(&self) -> Result<Vec<Item>, ProviderError> {
        let items = self.client.list_content(self.kind).await?;
        Ok(items
            .into_iter()
            .map(|item| Item::new(item.id, item.name))
            .collect())
    }

    async fn distribute(&self, item: &Item, target: &TargetHandle) -> Result<(), ActionError> {
        self.client
            .distribute(self.kind, &item.id, target.as_str())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_all_kinds_in_order() {
        let client = Arc::new(SiteClient::with_client(
            reqwest::Client::new(),
            url::Url::parse("https://siteserver.example.com").expect("static URL"),
            "HQ1".into(),
        ));
        let categories = standard_categories(client);
        let names: Vec<&str> = categories.iter().map(Category::name).collect();
        assert_eq!(
            names,
            [
                "Packages",
                "Applications",
                "Driver Packages",
                "Boot Images",
                "OS Images",
                "OS Upgrade Packages",
                "Update Packages",
            ]
        );
    }
}
