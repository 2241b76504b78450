//! CLI module
//!
//! Command-line interface around the geocoding client.
//!
//! # Commands
//!
//! - `reverse` - Reverse geocode a coordinate pair
//! - `sign` - Sign an arbitrary request URL
//! - `url` - Print the signed request URL without sending it

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
