#![deny(warnings)]

//! Output layer: renders synthesized records for the statistics database
//! fixture, either as a SQL script or as JSON lines.

pub mod jsonl;
pub mod sql;

use seed_core::RecordSink;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

pub use jsonl::JsonLinesWriter;
pub use sql::SqlScriptWriter;

/// Supported serialization targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `INSERT INTO SOLD VALUES (...)` statements.
    #[default]
    Sql,
    /// One JSON object per line.
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "jsonl" | "json-lines" | "ndjson" => Ok(OutputFormat::JsonLines),
            other => Err(format!("unknown output format: {other} (expected sql or jsonl)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Sql => f.write_str("sql"),
            OutputFormat::JsonLines => f.write_str("jsonl"),
        }
    }
}

/// Build a sink of the requested format over `out`.
pub fn sink_for<'w>(
    format: OutputFormat,
    out: Box<dyn Write + 'w>,
    include_deliveries: bool,
) -> Box<dyn RecordSink + 'w> {
    match format {
        OutputFormat::Sql => Box::new(SqlScriptWriter::new(out).with_deliveries(include_deliveries)),
        OutputFormat::JsonLines => {
            Box::new(JsonLinesWriter::new(out).with_deliveries(include_deliveries))
        }
    }
}
