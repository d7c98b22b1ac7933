use clap::Parser;
use envconfig::Envconfig;
use kapsule_dev::{DevCli, DevConfig, run};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .init();
    let conf = DevConfig::init_from_env()?;
    let cli = DevCli::parse();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling pending waits");
            on_signal.cancel();
        }
    });

    let out = run(cli, conf, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
