//! Discover command: dump the catalog

use clap::Parser;
use std::io::Write;

use crate::catalog::Catalog;
use crate::cli::CliError;
use crate::sink::SinkError;

/// Arguments for the discover command
#[derive(Parser, Debug)]
pub struct DiscoverArgs {}

impl DiscoverArgs {
    /// Build the default catalog from the embedded schemas and print it as
    /// pretty JSON on stdout.
    pub fn execute(&self) -> Result<(), CliError> {
        let catalog = Catalog::discover()?;
        let mut out = std::io::stdout();
        serde_json::to_writer_pretty(&mut out, &catalog)
            .map_err(|e| CliError::Sink(SinkError::Serialize(e)))?;
        out.write_all(b"\n")
            .map_err(|e| CliError::Sink(SinkError::Io(e)))?;
        Ok(())
    }
}
