use std::time::Duration;

use kapsule_api::ApiError;
use kapsule_models::ModelError;

use crate::wait::ResourceKind;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("minor version should be like x.y not {0}")]
    MalformedVersionInput(String),

    #[error("upstream version {0} is not correctly formatted")]
    MalformedUpstreamVersion(String),

    #[error("no available upstream version found for {0}")]
    VersionNotFound(String),

    #[error(
        "timed out after {timeout:?} waiting for {resource} {id}: has state {observed}, wants {desired}"
    )]
    ConvergenceTimeout {
        resource: ResourceKind,
        id: String,
        observed: String,
        desired: String,
        timeout: Duration,
    },

    #[error("waiting for {resource} {id} was cancelled")]
    ConvergenceCancelled { resource: ResourceKind, id: String },

    #[error("{resource} {id} has state {observed}, wants {expected}")]
    UnexpectedTerminalState {
        resource: ResourceKind,
        id: String,
        observed: String,
        expected: String,
    },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("can't parse regional id: {0}")]
    InvalidId(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl From<ModelError> for ProviderError {
    fn from(value: ModelError) -> Self {
        match value {
            ModelError::MalformedMinorVersion(v) => {
                ProviderError::MalformedVersionInput(v)
            }
            ModelError::MalformedFullVersion(v) => {
                ProviderError::MalformedUpstreamVersion(v)
            }
            ModelError::InvalidRegionalId(v) => ProviderError::InvalidId(v),
            ModelError::InvalidKubeconfig(v) => ProviderError::MalformedInput(v),
        }
    }
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Api(e) if e.is_not_found())
    }
}
