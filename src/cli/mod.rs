//! CLI command implementations

pub mod discover;
pub mod error;
pub mod sync;

pub use error::CliError;

use clap::{Parser, Subcommand};

/// tap-flexopus CLI
#[derive(Parser, Debug)]
#[command(name = "tap-flexopus")]
#[command(about = "Singer tap for the Flexopus facility-management API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the stream catalog to stdout
    Discover(discover::DiscoverArgs),

    /// Sync selected streams and emit Singer messages to stdout
    Sync(sync::SyncArgs),
}
