//! Allocation event model and CSV line formatting.
//!
//! One event per observed call. The pointer value is an opaque identifier;
//! it is never dereferenced. Downstream tooling correlates addresses
//! across the log (e.g. matching a FREE to an earlier ALLOC); the tracer
//! itself does no correlation.

use std::fmt::Write as _;

/// Column header, always the first line of the log file.
pub const HEADER: &str = "ts_ns,event,ptr,size,tid";

/// Kind of intercepted allocation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `malloc`.
    Alloc,
    /// `free`. The only kind with no size field.
    Free,
    /// `calloc`, logged with the total byte count.
    Calloc,
    /// `realloc`, logged with the new (possibly relocated) address.
    Realloc,
}

impl EventKind {
    /// Wire name used in the `event` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Alloc => "ALLOC",
            EventKind::Free => "FREE",
            EventKind::Calloc => "CALLOC",
            EventKind::Realloc => "REALLOC",
        }
    }
}

/// One observed allocation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationEvent {
    /// `CLOCK_REALTIME` reading in nanoseconds.
    pub ts_ns: i64,
    pub kind: EventKind,
    /// Opaque address; for REALLOC this is the new address.
    pub ptr: usize,
    /// Requested byte count; `None` iff `kind` is [`EventKind::Free`].
    pub size: Option<usize>,
    /// OS thread id (`SYS_gettid`).
    pub tid: i32,
}

impl AllocationEvent {
    /// Build an event stamped with the current clock and calling thread.
    #[must_use]
    pub fn now(kind: EventKind, ptr: usize, size: Option<usize>) -> Self {
        Self {
            ts_ns: timestamp_ns(),
            kind,
            ptr,
            size,
            tid: current_tid(),
        }
    }

    /// Append this event as one CSV line (with trailing newline) to `buf`.
    pub fn write_line(&self, buf: &mut String) {
        // Infallible: String's fmt::Write never errors.
        let _ = write!(buf, "{},{},{:#x},", self.ts_ns, self.kind.as_str(), self.ptr);
        if let Some(size) = self.size {
            let _ = write!(buf, "{size}");
        }
        let _ = writeln!(buf, ",{}", self.tid);
    }
}

/// Wall-clock nanoseconds via `clock_gettime(CLOCK_REALTIME)`.
#[must_use]
pub fn timestamp_ns() -> i64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: ts is a valid out-pointer for the duration of the call.
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts);
    }
    (ts.tv_sec as i64) * 1_000_000_000 + ts.tv_nsec as i64
}

/// OS-level thread id of the calling thread.
#[must_use]
pub fn current_tid() -> i32 {
    // SAFETY: gettid takes no arguments and cannot fail.
    unsafe { libc::syscall(libc::SYS_gettid) as i32 }
}
