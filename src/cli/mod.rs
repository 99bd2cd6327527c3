// CLI module for fluxcache
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;
use std::path::PathBuf;

/// fluxcache - offline-first caching front for the fluxlove portfolio
#[derive(Parser, Debug)]
#[command(name = "fluxcache", version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (defaults to ~/.fluxcache/config.toml)
    #[arg(short, long, env = "FLUXCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the origin base URL
    #[arg(long)]
    pub origin: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip pre-caching the critical resources at startup
    #[arg(long)]
    pub skip_install: bool,
}
