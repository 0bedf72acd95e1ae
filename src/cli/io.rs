//! JSON output for the CLI
//!
//! - Success: one JSON object on stdout, `{"status":"ok","data":...}`
//! - Failure: reported by main on stderr
//! - UTF-8 only

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let stdout = io::stdout();
    write_response_to(&mut stdout.lock(), data)
}

/// Write a success response to any writer
pub fn write_response_to<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
