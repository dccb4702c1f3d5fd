//! Log destination configuration.
//!
//! The destination is read from the `MFTRACE_LOG` environment variable,
//! falling back to `results/mftrace_log.csv`. It is read exactly once,
//! during the staged bootstrap in [`crate::bootstrap`], never from inside
//! an interception wrapper, so plain `std::env` access is fine here.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the log destination.
pub const LOG_PATH_ENV: &str = "MFTRACE_LOG";

/// Destination used when [`LOG_PATH_ENV`] is unset or empty.
pub const DEFAULT_LOG_PATH: &str = "results/mftrace_log.csv";

/// Resolve the log destination from the environment.
#[must_use]
pub fn log_path() -> PathBuf {
    log_path_from(std::env::var_os(LOG_PATH_ENV))
}

fn log_path_from(raw: Option<OsString>) -> PathBuf {
    match raw {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_LOG_PATH),
    }
}
