use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sweepbox")]
#[command(about = "Upload retention service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the admin HTTP server with the background cleanup scheduler
    Server(ServerArgs),
    /// Delete aged uploads once and print the report
    Cleanup(CleanupArgs),
    /// Print storage statistics for the upload directory
    Stats(StatsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (defaults to server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct CleanupArgs {
    /// Upload directory (defaults to uploads.root)
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Retention age in days (defaults to cleanup.max_age_days)
    #[arg(long)]
    pub max_age_days: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Upload directory (defaults to uploads.root)
    #[arg(long)]
    pub root: Option<PathBuf>,
}
