//! Singer message emission
//!
//! The tap talks to its downstream pipeline through three operations with an
//! ordering contract: a stream's SCHEMA message must precede its RECORD
//! messages, and STATE messages may appear any number of times with the last
//! one winning for resumption. [`JsonLinesSink`] writes the messages as JSON
//! lines; stdout is reserved for exactly this output.

use serde_json::{json, Value};
use std::io::{self, Write};

/// Sink errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Message could not be serialized
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Message could not be written
    #[error("failed to write message: {0}")]
    Io(#[from] std::io::Error),
}

/// Emission sink for Singer messages.
///
/// Implemented by [`JsonLinesSink`] for production and by recording fakes in
/// tests that assert on message ordering and content.
pub trait Sink {
    /// Emit a SCHEMA message. Must precede any record for `stream`.
    fn write_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
    ) -> Result<(), SinkError>;

    /// Emit a RECORD message.
    fn write_record(&mut self, stream: &str, record: &Value) -> Result<(), SinkError>;

    /// Emit a STATE message carrying `{stream: bookmark}`; last call wins.
    fn write_state(&mut self, stream: &str, bookmark: &Value) -> Result<(), SinkError>;
}

/// Writes Singer messages as JSON lines to any [`Write`] target.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl JsonLinesSink<io::Stdout> {
    /// Sink writing to stdout, the normal data channel of a tap.
    pub fn stdout() -> Self {
        JsonLinesSink { out: io::stdout() }
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing to an arbitrary target.
    pub fn new(out: W) -> Self {
        JsonLinesSink { out }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_message(&mut self, message: &Value) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn write_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
    ) -> Result<(), SinkError> {
        self.write_message(&json!({
            "type": "SCHEMA",
            "stream": stream,
            "schema": schema,
            "key_properties": key_properties,
        }))
    }

    fn write_record(&mut self, stream: &str, record: &Value) -> Result<(), SinkError> {
        self.write_message(&json!({
            "type": "RECORD",
            "stream": stream,
            "record": record,
        }))
    }

    fn write_state(&mut self, stream: &str, bookmark: &Value) -> Result<(), SinkError> {
        self.write_message(&json!({
            "type": "STATE",
            "value": { stream: bookmark },
        }))
    }
}
