//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rate-limited reverse geocoding CLI
#[derive(Parser, Debug)]
#[command(name = "geocode")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reverse geocode one or more coordinate pairs
    Reverse {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Repeat the lookup N times (exercises the throttle)
        #[arg(long, default_value = "1")]
        repeat: usize,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the signed request URL without sending it
    Url {
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// Sign a URL with a signing key
    Sign {
        /// URL to sign (path and query are signed)
        #[arg(long)]
        url: String,

        /// URL-safe base64 signing key (defaults to the configured key)
        #[arg(long)]
        key: Option<String>,
    },
}
