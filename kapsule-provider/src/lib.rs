pub mod config;
pub mod error;
pub mod flatten;
pub mod nodes;
pub mod provider;
pub mod version;
pub mod wait;

pub use config::*;
pub use error::ProviderError;
pub use flatten::{AttrMap, NestedBlock};
pub use provider::{KapsuleProvider, split_regional_id};
pub use version::resolve_latest_version;
pub use wait::{Converged, NotFoundMode, Poller, ResourceKind};

pub use tokio_util::sync::CancellationToken;
