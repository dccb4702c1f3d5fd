//! Append-only event log.
//!
//! A single open handle guarded by one mutex. The lock scope covers
//! formatting and writing as one unit, so lines from concurrent threads
//! are never interleaved. `File` is unbuffered, so every complete line is
//! one `write` syscall; a crash loses at most the line being written.
//!
//! Failure policy is degraded-but-safe: a destination that cannot
//! be opened, or a write that fails, turns the stream off for the rest of
//! the process. Allocation calls keep being forwarded either way; breaking
//! the host's heap to report a logging problem is never acceptable.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::event::{AllocationEvent, HEADER};

/// Lifecycle of the append destination.
///
/// `Unopened` (phase 2 has not run) and `Disabled` (open or write failed)
/// are distinct from `Ready`; both make [`EventLog::record`] a no-op.
#[derive(Debug)]
enum StreamState {
    Unopened,
    Disabled,
    Ready(File),
}

/// Shared owner of the log stream.
///
/// The process-wide instance is [`EVENT_LOG`]; tests build their own
/// against scratch paths.
#[derive(Debug)]
pub struct EventLog {
    stream: Mutex<StreamState>,
}

/// Process-wide log, populated by [`crate::bootstrap::initialize`].
pub static EVENT_LOG: EventLog = EventLog::new();

/// Phase 1: truncate/create `path` and write the schema header line.
///
/// Runs before the append handle is opened, exactly once per process, so
/// the header is always the first line and appears exactly once no matter
/// how many threads later record events.
pub fn write_header(path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{HEADER}")?;
    Ok(())
}

impl EventLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stream: Mutex::new(StreamState::Unopened),
        }
    }

    /// Phase 2: open `path` for appending and keep the handle for the
    /// remainder of the process lifetime.
    ///
    /// Returns `false` (and leaves the log permanently disabled) when the
    /// destination cannot be opened.
    pub fn open_append(&self, path: &Path) -> bool {
        let opened = OpenOptions::new().append(true).open(path);
        let mut stream = self.stream.lock();
        match opened {
            Ok(file) => {
                *stream = StreamState::Ready(file);
                true
            }
            Err(_) => {
                *stream = StreamState::Disabled;
                false
            }
        }
    }

    /// Turn logging off for the remainder of the process.
    pub fn disable(&self) {
        *self.stream.lock() = StreamState::Disabled;
    }

    /// Whether the append handle is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.stream.lock(), StreamState::Ready(_))
    }

    /// Append one formatted event line.
    ///
    /// No-op unless the stream is `Ready`. Never panics and never blocks
    /// beyond the format-and-write critical section.
    pub fn record(&self, event: &AllocationEvent) {
        let mut stream = self.stream.lock();
        let StreamState::Ready(file) = &mut *stream else {
            return;
        };
        let mut line = String::with_capacity(64);
        event.write_line(&mut line);
        if file.write_all(line.as_bytes()).is_err() {
            // Silent degradation: forward-only from here on.
            *stream = StreamState::Disabled;
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
