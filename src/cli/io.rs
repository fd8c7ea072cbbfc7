//! JSON I/O handling for CLI
//!
//! - Input: JSON arguments, or a single JSON line on stdin
//! - Output: a single JSON object on stdout

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Parses `arg` when given, otherwise reads one line from stdin
pub fn json_arg(arg: Option<&str>) -> CliResult<Value> {
    match arg {
        Some(text) => Ok(serde_json::from_str(text)?),
        None => read_request(),
    }
}

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    Ok(serde_json::from_str(&line)?)
}

pub fn success_envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&success_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&error_envelope(code, message))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
