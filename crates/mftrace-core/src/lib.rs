//! # mftrace-core
//!
//! Allocation-tracing logic for mftrace, kept separate from the
//! interposing `cdylib` so it can be tested without exporting `malloc`
//! into the test binary.
//!
//! # Architecture
//!
//! ```text
//! host call -> ABI wrapper (mftrace-abi) -> guard -> resolver -> real libc
//!                                        \-> logger (one CSV line per call)
//! ```
//!
//! Everything here has to stay usable while the process heap is in a
//! half-bootstrapped state: the logger mutex is const-constructible, the
//! reentrancy guard's thread-local is const-initialized, and the fatal
//! path writes its diagnostic with raw `write(2)` before aborting.

pub mod bootstrap;
pub mod config;
pub mod event;
pub mod guard;
pub mod logger;
pub mod resolve;

pub use event::{AllocationEvent, EventKind};
pub use guard::HookGuard;
pub use logger::{EVENT_LOG, EventLog};
