//! JSON I/O handling for CLI
//!
//! - Input: one JSON query, read to end of input
//! - Output: one JSON envelope per line
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON request from `input`
pub fn read_request<R: Read>(input: &mut R) -> CliResult<Value> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    if text.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(&text)?;
    Ok(value)
}

/// Write a success response
pub fn write_response<W: Write>(output: &mut W, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });
    write_line(output, &response)
}

/// Write an error response
pub fn write_error<W: Write>(output: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_line(output, &response)
}

fn write_line<W: Write>(output: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
