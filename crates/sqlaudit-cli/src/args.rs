//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sqlaudit_core::config::CliOverrides;

#[derive(Debug, Parser)]
#[command(name = "sqlaudit")]
#[command(about = "Read-only database performance audit", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root holding `sqlaudit.toml`
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit a capture and print the report
    Scan(ScanArgs),

    /// Capture file management
    Capture {
        #[command(subcommand)]
        command: CaptureCommand,
    },

    /// List the schemas in a capture
    Schemas {
        /// Capture file to read
        #[arg(long)]
        capture: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tables in a capture
    Tables {
        /// Capture file to read
        #[arg(long)]
        capture: PathBuf,

        /// Only tables in this schema
        #[arg(long)]
        schema: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the columns and indexes of one table
    Describe {
        /// Capture file to read
        #[arg(long)]
        capture: PathBuf,

        /// Table as `schema.table` (schema defaults to dbo)
        #[arg(long)]
        table: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum CaptureCommand {
    /// Create an empty capture file with the current schema
    Init {
        /// File to create
        path: PathBuf,

        /// Server name recorded in the capture
        #[arg(long)]
        server: Option<String>,

        /// Database name recorded in the capture
        #[arg(long)]
        database: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct ScanArgs {
    /// Capture file to audit (overrides `source.capture_path`)
    #[arg(long)]
    pub capture: Option<PathBuf>,

    /// Phases to run, comma separated
    #[arg(long, value_delimiter = ',')]
    pub phases: Option<Vec<String>>,

    /// Number of query hotspots to report
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Minimum impact percent for missing-index candidates
    #[arg(long)]
    pub min_impact: Option<f64>,

    /// Signal phases that may be skipped on timeout or cancellation
    #[arg(long, value_delimiter = ',')]
    pub degraded: Option<Vec<String>>,

    /// Scan timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Report format: json, console, or markdown
    #[arg(long)]
    pub format: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Prefer query store statistics over the plan cache
    #[arg(long)]
    pub query_store: bool,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}

impl ScanArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            capture_path: self
                .capture
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            phases: self.phases.clone(),
            top_n: self.top_n,
            min_impact: self.min_impact,
            timeout_secs: self.timeout_secs,
            degraded_phases: self.degraded.clone(),
            format: self.format.clone(),
        }
    }
}
