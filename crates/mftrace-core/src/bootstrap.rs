//! Staged process bootstrap.
//!
//! The original two-constructor scheme (priority-ordered `.init_array`
//! entries) is collapsed into one explicit, idempotent function so the
//! ordering is enforced by control flow instead of loader behavior:
//!
//! 1. Eagerly resolve the four real primitives.
//! 2. Phase 1: truncate the destination and write the schema header.
//! 3. Phase 2: reopen the same destination in append mode, kept open for
//!    the process lifetime.
//!
//! The interposing library calls [`initialize`] from a single `.init_array`
//! constructor, which the loader runs before `main`, so phase 2 completes
//! before any application code can reach a wrapper. Allocation calls that
//! arrive even earlier (from other libraries' constructors) pass through
//! unlogged because the stream is still `Unopened`.

use std::sync::Once;

use crate::guard::HookGuard;
use crate::logger::{self, EVENT_LOG};
use crate::{config, resolve};

static BOOTSTRAP: Once = Once::new();

/// Run the staged bootstrap exactly once.
///
/// Safe to call from multiple threads and multiple times; later calls
/// wait for the first to finish and then return.
pub fn initialize() {
    BOOTSTRAP.call_once(|| {
        // Anything this function allocates (path buffers, stderr
        // formatting) must not be traced as application activity.
        let _quiet = HookGuard::enter();

        resolve::resolve_all();

        let path = config::log_path();
        if let Err(err) = logger::write_header(&path) {
            eprintln!("[mftrace] ERROR: cannot create {}: {err}", path.display());
            EVENT_LOG.disable();
            return;
        }
        eprintln!("[mftrace] header written to {}", path.display());

        if !EVENT_LOG.open_append(&path) {
            eprintln!("[mftrace] ERROR: cannot open {} for append", path.display());
        }
    });
}

/// Whether [`initialize`] has completed.
#[must_use]
pub fn is_initialized() -> bool {
    BOOTSTRAP.is_completed()
}
