use std::io;
use std::process::ExitCode;

use clap::Parser;
use sqlaudit_cli::{Cli, EXIT_FAILURE};
use sqlaudit_core::tracing::init_tracing;
use sqlaudit_core::AuditErrorCode;

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = match sqlaudit_cli::run(&cli, &mut out) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "command failed");
            eprintln!("error: {}", e.coded_string());
            EXIT_FAILURE
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
