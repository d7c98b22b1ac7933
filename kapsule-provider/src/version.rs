use kapsule_api::{DEFAULT_PAGE_SIZE, K8sApi, collect_all_pages};
use kapsule_models::{FullVersion, MinorVersion, Region};
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::provider::KapsuleProvider;

/// Latest full version (`x.y.z`) for a minor version (`x.y`).
///
/// Fails before any API call when `minor` is not `x.y`. The first catalog
/// entry, in catalog order, with the same major and minor wins. A catalog
/// entry that is not `x.y.z` aborts the lookup.
pub async fn resolve_latest_version(
    api: &dyn K8sApi,
    region: &Region,
    minor: &str,
) -> Result<FullVersion, ProviderError> {
    let wanted: MinorVersion = minor.parse()?;

    let catalog = collect_all_pages(DEFAULT_PAGE_SIZE, |page| {
        api.list_versions(region, page)
    })
    .await?;
    debug!(region = %region, versions = catalog.len(), "fetched version catalog");

    for entry in &catalog {
        let candidate: FullVersion = entry.name.parse()?;
        if candidate.matches(&wanted) {
            info!(region = %region, minor = %wanted, version = %candidate, "resolved version");
            return Ok(candidate);
        }
    }
    Err(ProviderError::VersionNotFound(minor.to_string()))
}

impl KapsuleProvider {
    pub async fn resolve_latest_version(
        &self,
        region: &Region,
        minor: &str,
    ) -> Result<FullVersion, ProviderError> {
        resolve_latest_version(self.api(), region, minor).await
    }
}
