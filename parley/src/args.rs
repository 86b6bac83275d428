use std::path::PathBuf;

use clap::Parser;

/// Parley completion gateway
#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Completion gateway for realtime voice agents with single-hop function calling"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PARLEY_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
