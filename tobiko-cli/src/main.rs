//! CLI entry point for the tobiko clustering engines.
//!
//! Parses command-line arguments with clap, executes the selected engine,
//! renders the resulting assignments to stdout, and maps errors to
//! appropriate exit codes. Logging is initialized eagerly so subsequent
//! operations can emit structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use tobiko_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};

/// Parse CLI arguments, execute the command, render the rows, and flush the
/// output stream.
fn try_main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let summary = run_cli(cli)?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).map_err(stdout_error)?;
    writer.flush().map_err(stdout_error)?;
    Ok(())
}

fn stdout_error(source: io::Error) -> CliError {
    CliError::Io {
        path: "<stdout>".into(),
        source,
    }
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = match &err {
            CliError::Core(core) => Some(core.code()),
            _ => None,
        };
        error!(
            error = %err,
            code = ?code.map(|c| c.as_str()),
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Emit a fallback diagnostic to stderr when tracing initialization fails.
#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
