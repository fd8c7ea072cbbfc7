//! CLI module for docshim
//!
//! Provides command-line access to:
//! - compile-filter / compile-update / compile-insert: print SQL, no database
//! - names: field-name override report
//! - count / find: run against the configured database
//!
//! Every command prints exactly one JSON object on stdout.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ConnectionArgs};
pub use commands::{
    compile_filter, compile_insert, compile_update, find, names, preview_find, run_command,
    FindQuery,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, read_request, success_envelope, write_error, write_response};

use crate::config::LogConfig;
use crate::observability::init_logging;

/// Parse arguments, run the command and print its envelope
///
/// A failed command is reported on stdout as an error envelope and then
/// returned, so the caller can exit non-zero.
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    init_logging(&LogConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
    });

    match run_command(cli.command).await {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), &err.message())?;
            Err(err)
        }
    }
}
