//! Destinations for rendered blocks.

use parking_lot::Mutex;
use std::fmt;
use std::io::Write;

/// Where rendered blocks go.
///
/// A sink is picked once when a transport is built. Writers are shared by
/// every round trip on that transport, so each block is written under a lock
/// in a single `write_all`; blocks from concurrent round trips never tear.
pub enum Sink {
    /// A caller-supplied writer.
    Writer(Mutex<Box<dyn Write + Send>>),
    /// The process-wide `tracing` logger, one `INFO` event per block.
    Log,
}

impl Sink {
    /// Creates a sink writing to `writer`.
    pub fn writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Sink::Writer(Mutex::new(Box::new(writer)))
    }

    /// Emits one rendered block.
    ///
    /// Write failures are logged and otherwise ignored: tracing output must
    /// never fail a round trip.
    pub fn emit(&self, block: &[u8]) {
        match self {
            Sink::Writer(writer) => {
                let mut writer = writer.lock();
                if let Err(e) = writer.write_all(block).and_then(|_| writer.flush()) {
                    tracing::warn!(error = %e, "Failed to write trace output");
                }
            }
            Sink::Log => {
                tracing::info!(target: "wiretap", "{}", String::from_utf8_lossy(block));
            }
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink::Log
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Writer(_) => f.write_str("Sink::Writer"),
            Sink::Log => f.write_str("Sink::Log"),
        }
    }
}
