use std::io::{BufRead, Write};

use anyhow::Result;
use event_api::Event;
use parking_lot::Mutex;

use crate::{error::HandlerError, events::Subscriber};

/// Read a single line-delimited JSON event from the reader.
///
/// Returns `Ok(None)` at end of input.
pub fn read_event<R: BufRead>(reader: &mut R) -> Result<Option<Event>> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    let event = serde_json::from_str(line.trim())?;
    Ok(Some(event))
}

/// Write a single event as line-delimited JSON to the writer.
pub fn write_event<W: Write>(writer: &mut W, event: &Event) -> Result<()> {
    serde_json::to_writer(&mut *writer, event)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Subscriber that appends every event to a writer as one JSON line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Subscriber for JsonLinesSink<W> {
    fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        let mut w = self.writer.lock();
        write_event(&mut *w, event).map_err(HandlerError::from)
    }

    fn name(&self) -> &str {
        "json-lines"
    }
}
