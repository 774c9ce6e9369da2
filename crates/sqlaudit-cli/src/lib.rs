//! sqlaudit-cli: the `sqlaudit` binary's commands.
//!
//! `main` parses arguments and maps [`Outcome`] and [`CliError`] to exit
//! codes; everything else lives here so tests can drive it directly.

pub mod args;
pub mod commands;
pub mod error;

use std::io::Write;

pub use args::{CaptureCommand, Cli, Command, ScanArgs};
pub use error::CliError;

/// Exit code for a report holding Critical findings.
pub const EXIT_CRITICAL: i32 = 2;
/// Exit code for any failure.
pub const EXIT_FAILURE: i32 = 1;

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    CriticalFindings,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::CriticalFindings => EXIT_CRITICAL,
        }
    }
}

/// Run one parsed command, writing its output to `out`.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<Outcome, CliError> {
    match &cli.command {
        Command::Scan(args) => commands::scan::run(&cli.root, args, out),
        Command::Capture {
            command:
                CaptureCommand::Init {
                    path,
                    server,
                    database,
                },
        } => commands::capture::init(path, server.as_deref(), database.as_deref(), out),
        Command::Schemas { capture, json } => commands::schemas::run(capture, *json, out),
        Command::Tables {
            capture,
            schema,
            json,
        } => commands::tables::run(capture, schema.as_deref(), *json, out),
        Command::Describe {
            capture,
            table,
            json,
        } => commands::describe::run(capture, table, *json, out),
    }
}
