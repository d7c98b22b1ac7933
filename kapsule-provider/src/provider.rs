use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;
use kapsule_api::K8sApi;
use kapsule_models::RegionalId;

use crate::config::ProviderConfig;
use crate::error::ProviderError;

/// Entry point used by configuration-engine operations.
///
/// Cheap to clone; every clone talks to the same API client.
#[derive(Clone)]
pub struct KapsuleProvider {
    api: Arc<dyn K8sApi>,
    config: ProviderConfig,
}

impl KapsuleProvider {
    pub fn new(api: Arc<dyn K8sApi>, config: ProviderConfig) -> Self {
        Self { api, config }
    }

    pub fn from_env(api: Arc<dyn K8sApi>) -> Result<Self, envconfig::Error> {
        let config = ProviderConfig::init_from_env()?;
        Ok(Self::new(api, config))
    }

    #[inline]
    pub fn api(&self) -> &dyn K8sApi {
        self.api.as_ref()
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    #[inline]
    pub fn retry_interval(&self) -> Duration {
        self.config.retry_interval()
    }
}

/// Split a `<region>/<id>` resource identifier.
pub fn split_regional_id(id: &str) -> Result<RegionalId, ProviderError> {
    Ok(id.parse::<RegionalId>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_regional_ids() {
        let id = split_regional_id("nl-ams/abc").unwrap();
        assert_eq!(id.region.as_str(), "nl-ams");
        assert_eq!(id.id, "abc");

        let err = split_regional_id("abc").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidId(ref raw) if raw == "abc"));
    }
}
