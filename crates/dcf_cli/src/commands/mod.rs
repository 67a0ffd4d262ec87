//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod analyse;
pub mod check;
pub mod simulate;

use crate::output::OutputFormat;
use crate::Result;
use serde::Serialize;

/// Print `value` as pretty JSON, or the pre-rendered table.
fn emit<T: Serialize>(format: OutputFormat, value: &T, table: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{}", table(value)),
    }
    Ok(())
}
