use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

pub(crate) mod auth;
pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod models;
pub(crate) mod server;
pub(crate) mod storage;


/// Local companion server for course resources, announcements and the
/// browsing user's saved resources.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = AppConfig::from_yaml_file(args.config)?;
    server::run_all(&config).await?;

    Ok(())
}
