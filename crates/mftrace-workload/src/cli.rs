//! Positional CLI: `pattern ops max_size [disk] [trim-at-step]`.
//!
//! The fourth argument is the literal token `disk`; any other token in
//! that position is accepted and ignored, matching the historical
//! behavior, so `trim-at-step` can still be given without disk mode by
//! passing a placeholder.

use clap::Parser;

use crate::{Pattern, WorkloadConfig};

#[derive(Debug, Parser)]
#[command(name = "mftrace-workload")]
#[command(about = "Synthetic allocation traffic generator")]
pub struct Cli {
    /// Allocation size distribution.
    #[arg(value_enum)]
    pub pattern: Pattern,
    /// Number of allocate/free operations.
    pub ops: u64,
    /// Maximum allocation size in bytes.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub max_size: u64,
    /// Pass "disk" to add file-backed mmap reads.
    pub disk: Option<String>,
    /// Call malloc_trim(0) after this many ops.
    pub trim_at_step: Option<u64>,
}

impl Cli {
    #[must_use]
    pub fn into_config(self) -> WorkloadConfig {
        WorkloadConfig {
            pattern: self.pattern,
            ops: self.ops,
            max_size: self.max_size,
            disk: self.disk.as_deref() == Some("disk"),
            trim_at_step: self.trim_at_step,
        }
    }
}
