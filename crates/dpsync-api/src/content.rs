// Content endpoints
//
// One enumeration and one distribute endpoint per content kind. The kinds
// and their path segments are fixed by the service; item identifiers are
// opaque strings whose shape differs per kind (package id, application
// name, image id, ...) and are never interpreted here.

use serde_json::json;
use tracing::debug;

use crate::client::SiteClient;
use crate::error::Error;
use crate::models::ContentItem;

/// The content kinds the management service can distribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Package,
    Application,
    DriverPackage,
    BootImage,
    OsImage,
    OsUpgradePackage,
    UpdatePackage,
}

impl ContentKind {
    /// Every kind, in the service's canonical order.
    pub const ALL: [Self; 7] = [
        Self::Package,
        Self::Application,
        Self::DriverPackage,
        Self::BootImage,
        Self::OsImage,
        Self::OsUpgradePackage,
        Self::UpdatePackage,
    ];

    /// URL path segment for this kind's endpoints.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Package => "packages",
            Self::Application => "applications",
            Self::DriverPackage => "driver-packages",
            Self::BootImage => "boot-images",
            Self::OsImage => "os-images",
            Self::OsUpgradePackage => "os-upgrade-packages",
            Self::UpdatePackage => "update-packages",
        }
    }

    /// Operator-facing category name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Package => "Packages",
            Self::Application => "Applications",
            Self::DriverPackage => "Driver Packages",
            Self::BootImage => "Boot Images",
            Self::OsImage => "OS Images",
            Self::OsUpgradePackage => "OS Upgrade Packages",
            Self::UpdatePackage => "Update Packages",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl SiteClient {
    /// List all content items of one kind.
    ///
    /// `GET /api/sites/{site}/content/{kind}`
    pub async fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentItem>, Error> {
        let url = self.site_url(&format!("content/{}", kind.path_segment()))?;
        debug!(kind = %kind, "listing content");
        self.get(url).await
    }

    /// Distribute one content item onto a target distribution point.
    ///
    /// `POST /api/sites/{site}/content/{kind}/{id}/distribute` with
    /// `{"target": "..."}`. The service queues the copy job; a non-"ok"
    /// envelope status means the job was rejected.
    pub async fn distribute(
        &self,
        kind: ContentKind,
        item_id: &str,
        target: &str,
    ) -> Result<(), Error> {
        let url = self.site_url(&format!(
            "content/{}/{item_id}/distribute",
            kind.path_segment()
        ))?;
        debug!(kind = %kind, item_id, target, "distributing content");
        let _: Vec<serde_json::Value> = self.post(url, &json!({ "target": target })).await?;
        Ok(())
    }
}
