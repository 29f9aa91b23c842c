mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use sweepbox::config::Config;
use sweepbox::retention::{get_stats, trigger_cleanup};
use tracing_subscriber::EnvFilter;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => sweepbox::api::run(args.address).await?,
        Commands::Cleanup(args) => {
            let config = Config::load()?;
            let root = args.root.unwrap_or(config.uploads.root);
            let max_age_days = args.max_age_days.unwrap_or(config.cleanup.max_age_days);

            let report =
                tokio::task::spawn_blocking(move || trigger_cleanup(&root, Some(max_age_days)))
                    .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Stats(args) => {
            let config = Config::load()?;
            let root = args.root.unwrap_or(config.uploads.root);

            let stats = tokio::task::spawn_blocking(move || get_stats(&root)).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
