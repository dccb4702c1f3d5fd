//! # mftrace-trim
//!
//! Out-of-band heap-release trigger: on `SIGUSR1`, ask the allocator to
//! return free pages to the operating system via `malloc_trim(0)` and
//! write one diagnostic line to stderr.
//!
//! Independent of the tracer: it takes no tracer lock and its activity is
//! not logged as an allocation event. Preload it alongside (or without)
//! `libmftrace.so`.
//!
//! Accepted risk, carried from the original design: `malloc_trim` is not
//! async-signal-safe. If the interrupted thread holds an allocator lock,
//! the handler can deadlock. This is a best-effort diagnostic trigger,
//! not a correctness-critical path, and is deliberately not hardened
//! beyond using raw `write(2)` for the diagnostic instead of stdio.

use std::ffi::{c_int, c_void};

/// Diagnostic written to stderr on each delivery.
pub const TRIM_DIAGNOSTIC: &[u8] = b"malloc_trim(0) invoked via signal\n";

extern "C" fn handle_trim(_signum: c_int) {
    // SAFETY: malloc_trim takes a pad size and touches no caller state.
    // Not signal-safe; see module docs.
    unsafe {
        libc::malloc_trim(0);
        libc::write(
            libc::STDERR_FILENO,
            TRIM_DIAGNOSTIC.as_ptr().cast::<c_void>(),
            TRIM_DIAGNOSTIC.len(),
        );
    }
}

/// Install the `SIGUSR1` handler.
///
/// `SA_RESTART` keeps interrupted slow syscalls in the host transparent.
/// Returns `false` if `sigaction` fails.
pub fn install() -> bool {
    // SAFETY: a zeroed sigaction is a valid starting state; every field
    // used below is then set explicitly.
    unsafe {
        let mut act = std::mem::zeroed::<libc::sigaction>();
        act.sa_sigaction = handle_trim as usize as libc::sighandler_t;
        libc::sigemptyset(&mut act.sa_mask);
        act.sa_flags = libc::SA_RESTART;
        libc::sigaction(libc::SIGUSR1, &act, std::ptr::null_mut()) == 0
    }
}

// Install at load time so the trigger works with no cooperation from the
// host beyond LD_PRELOAD.
#[cfg(not(test))]
#[unsafe(link_section = ".init_array")]
#[used]
static INSTALL_CTOR: unsafe extern "C" fn() = {
    unsafe extern "C" fn install_ctor() {
        install();
    }
    install_ctor
};
