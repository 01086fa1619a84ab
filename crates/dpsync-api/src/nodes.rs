// Distribution point endpoints
//
// Node discovery is site-scoped: every distribution point belongs to
// exactly one site, and source/target selection happens within it.

use tracing::debug;

use crate::client::SiteClient;
use crate::error::Error;
use crate::models::DistributionPoint;

impl SiteClient {
    /// List the distribution points registered in this site.
    ///
    /// `GET /api/sites/{site}/distribution-points`
    pub async fn list_distribution_points(&self) -> Result<Vec<DistributionPoint>, Error> {
        let url = self.site_url("distribution-points")?;
        debug!("listing distribution points");
        self.get(url).await
    }
}
