use clap::Parser;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::Args;
use crate::deployment::run_deployment;

pub mod artifacts;
pub mod chain;
pub mod contracts;
pub mod ethers_utils;
pub mod forge_utils;
pub mod maintenance;
pub mod serde_utils;

mod cli;
mod config;
mod report;
mod types;

mod deployment;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();

    match run_deployment(args).await {
        Ok(()) => Ok(()),
        Err(report) => {
            tracing::error!("{:?}", report);
            std::process::exit(1)
        }
    }
}
