mod simulate;

use envconfig::Envconfig;
use kapsule_api::memory::MemoryK8sApi;
use kapsule_models::{Region, Version};
use kapsule_provider::{CancellationToken, KapsuleProvider, ProviderConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use simulate::{SimulateArgs, simulate};

#[derive(Envconfig, Clone, Debug)]
pub struct DevConfig {
    #[envconfig(from = "KAPSULE_DEFAULT_REGION", default = "fr-par")]
    pub default_region: String,
    /// Poll cadence of the simulation; the provider default is far too slow
    /// for scripted resources.
    #[envconfig(from = "KAPSULE_DEV_RETRY_INTERVAL_MS", default = "200")]
    pub retry_interval_ms: u64,
}

#[derive(clap::Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct DevCli {
    #[command(subcommand)]
    pub command: DevCommands,
    /// Region override, defaults to KAPSULE_DEFAULT_REGION
    #[arg(short, long, global = true)]
    pub region: Option<String>,
}

#[derive(clap::Subcommand, Clone, Debug)]
pub enum DevCommands {
    /// Resolve a minor version against an in-memory catalog
    #[clap(aliases = &["r"])]
    Resolve {
        /// Minor version, like 1.29
        minor: String,
        /// Catalog entries in API order. Example `-c 1.30.2 -c 1.29.6`
        #[arg(short, long, required = true)]
        catalog: Vec<String>,
    },
    /// Create, converge and delete a simulated cluster, printing the
    /// attributes that would be stored
    #[clap(aliases = &["s"])]
    Simulate {
        #[clap(flatten)]
        opt: SimulateArgs,
    },
}

pub async fn run(
    cli: DevCli,
    conf: DevConfig,
    cancel: CancellationToken,
) -> anyhow::Result<serde_json::Value> {
    let region = Region::new(cli.region.unwrap_or(conf.default_region));
    let api = MemoryK8sApi::new();
    let provider = KapsuleProvider::new(
        Arc::new(api.clone()),
        ProviderConfig::with_retry_interval(Duration::from_millis(
            conf.retry_interval_ms,
        )),
    );

    match cli.command {
        DevCommands::Resolve { minor, catalog } => {
            let versions = catalog
                .iter()
                .map(|name| Version::new(region.clone(), name.as_str()))
                .collect();
            api.set_versions(region.clone(), versions).await;
            let resolved = provider.resolve_latest_version(&region, &minor).await?;
            info!("resolved {} to {}", minor, resolved);
            Ok(serde_json::json!({
                "minor": minor,
                "version": resolved.to_string(),
            }))
        }
        DevCommands::Simulate { opt } => {
            simulate(&provider, &api, &region, &opt, &cancel).await
        }
    }
}
