//! Event sink that writes delivered events as JSON.

use satchel_core::events::{CoreEvent, EventSink, SinkError};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Writes one JSON document per event to the wrapped writer.
///
/// The writer is locked for the whole event so lines from different workers
/// never interleave.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
    pretty: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            pretty,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn encode(&self, event: &CoreEvent) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = if self.pretty {
            serde_json::to_vec_pretty(event)?
        } else {
            serde_json::to_vec(event)?
        };
        buf.push(b'\n');
        Ok(buf)
    }
}

impl<W: Write + Send + 'static> EventSink for JsonLinesSink<W> {
    fn post(&self, event: CoreEvent) -> Result<(), SinkError> {
        let buf = self
            .encode(&event)
            .map_err(|e| SinkError::Rejected(e.to_string()))?;

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(&buf)
            .and_then(|()| writer.flush())
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::BrokenPipe => SinkError::Closed,
                _ => SinkError::Rejected(e.to_string()),
            })
    }
}
