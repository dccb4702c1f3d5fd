//! # mftrace-abi
//!
//! `LD_PRELOAD` boundary for mftrace. Produces a `cdylib` exporting
//! `malloc`, `free`, `calloc` and `realloc` wrappers that forward to the
//! host libc while recording one CSV line per call through
//! [`mftrace_core`].
//!
//! ```text
//! host call -> wrapper (this crate) -> real primitive -> event logged -> return
//! ```
//!
//! Wrappers never alter outcomes: whatever the real primitive returns,
//! including null, is handed back verbatim.

// Gated behind cfg(not(test)) because the module exports #[no_mangle]
// allocation symbols that would shadow the system allocator inside the
// test binary itself, causing infinite recursion.
#[cfg(not(test))]
pub mod hooks;

/// Load-time entry running the staged bootstrap.
///
/// The loader runs `.init_array` entries of a preloaded object before
/// `main`, so by the time application code can reach a wrapper the log
/// header exists, the append handle is open, and the real primitives are
/// resolved. Allocations made by even earlier constructors pass through
/// the wrappers unlogged.
#[cfg(not(test))]
#[unsafe(link_section = ".init_array")]
#[used]
static BOOTSTRAP_CTOR: unsafe extern "C" fn() = {
    unsafe extern "C" fn bootstrap_ctor() {
        mftrace_core::bootstrap::initialize();
    }
    bootstrap_ctor
};
