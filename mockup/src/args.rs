use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Mockup generation gateway
#[derive(Debug, Parser)]
#[command(name = "mockup", about = "Turns mockup descriptions into rendered images")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "mockup.toml", env = "MOCKUP_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "MOCKUP_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}
