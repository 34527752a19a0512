//! Record output
//!
//! Writes one line per record and flushes after each, so a downstream
//! consumer sees every exchange as soon as it closes.

use std::io::Write;
use std::str::FromStr;

use crate::error::{Result, SnifferError};
use crate::session::Record;

/// Line format for emitted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `timestamp client request_size response_size command`, column aligned
    #[default]
    Text,

    /// One JSON object per line
    Json,
}

impl FromStr for OutputFormat {
    type Err = SnifferError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(SnifferError::Config(format!(
                "unknown output format {:?} (expected \"text\" or \"json\")",
                other
            ))),
        }
    }
}

/// Writes records to a stream in the chosen format
pub struct RecordWriter<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Write one record as a line and flush
    pub fn write(&mut self, record: &Record) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{}", record)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)
                    .map_err(|e| SnifferError::Serialization(e.to_string()))?;
                self.out.write_all(b"\n")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Consume the writer, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.out
    }
}
