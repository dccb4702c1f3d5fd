//! # mftrace-workload
//!
//! Synthetic allocation traffic generator. Drives the host allocator with
//! configurable size distributions so the mftrace preload layer has
//! realistic call sequences to observe: each operation picks one of
//! 200 000 slots, frees whatever lived there, and allocates a fresh block
//! whose size follows the chosen pattern.
//!
//! Calls go through `libc::malloc`/`libc::free` directly (not through
//! Rust's allocator layer) so that every operation is exactly one
//! intercepted primitive call.

pub mod cli;
pub mod rng;
pub mod spool;

use std::ffi::c_void;
use std::time::Duration;

use thiserror::Error;

use crate::rng::XorShift64;
use crate::spool::DiskSpool;

/// Slot table size, shared by every run.
pub const SLOT_COUNT: usize = 200_000;

/// Ops between 4 KiB file-backed touches in disk mode.
const DISK_TOUCH_INTERVAL: u64 = 500;

/// Ops between 1 ms pauses.
const PAUSE_INTERVAL: u64 = 10_000;

/// Allocation size distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Pattern {
    /// Sizes uniform in `1..=max_size`.
    Uniform,
    /// 10% of draws span the full range, the rest stay under
    /// `max_size / 10 + 1`.
    Burst,
    /// 0.5% of draws span the full range, the rest stay under
    /// `max_size / 20 + 1`.
    Pareto,
}

impl Pattern {
    /// Draw one allocation size in `1..=max_size`.
    pub fn draw(self, rng: &mut XorShift64, max_size: u64) -> usize {
        let size = match self {
            Pattern::Uniform => 1 + rng.below(max_size),
            Pattern::Burst => {
                if rng.below(100) < 10 {
                    1 + rng.below(max_size)
                } else {
                    1 + rng.below(max_size / 10 + 1)
                }
            }
            Pattern::Pareto => {
                if rng.below(1000) < 5 {
                    1 + rng.below(max_size)
                } else {
                    1 + rng.below(max_size / 20 + 1)
                }
            }
        };
        size as usize
    }
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("allocation of {size} bytes failed at op {op}")]
    AllocationFailed { op: u64, size: usize },
    #[error("cannot prepare disk spool: {0}")]
    DiskSetup(#[from] std::io::Error),
}

/// One workload run.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub pattern: Pattern,
    pub ops: u64,
    /// Upper bound on allocation sizes, at least 1.
    pub max_size: u64,
    /// Enable file-backed paging traffic.
    pub disk: bool,
    /// Call `malloc_trim(0)` after this op.
    pub trim_at_step: Option<u64>,
}

/// Drive the configured allocation pattern to completion.
///
/// Every slot is freed before returning, so a full run pairs each
/// surviving allocation with exactly one free in the trace.
pub fn run(config: &WorkloadConfig) -> Result<(), WorkloadError> {
    let spool = if config.disk {
        Some(DiskSpool::new()?)
    } else {
        None
    };

    let mut rng = XorShift64::default();
    let mut slots: Vec<*mut c_void> = vec![std::ptr::null_mut(); SLOT_COUNT];

    for op in 0..config.ops {
        let idx = rng.below(SLOT_COUNT as u64) as usize;
        if !slots[idx].is_null() {
            // SAFETY: slot holds a live allocation from a prior op.
            unsafe { libc::free(slots[idx]) };
            slots[idx] = std::ptr::null_mut();
        }

        let size = config.pattern.draw(&mut rng, config.max_size);
        // SAFETY: plain malloc; the block is owned by the slot table.
        let ptr = unsafe { libc::malloc(size) };
        if ptr.is_null() {
            free_all(&mut slots);
            return Err(WorkloadError::AllocationFailed { op, size });
        }
        slots[idx] = ptr;

        if let Some(spool) = &spool
            && op % DISK_TOUCH_INTERVAL == 0
        {
            spool.touch(&mut rng);
        }

        if config.trim_at_step == Some(op) {
            // SAFETY: malloc_trim only takes a pad size.
            unsafe { libc::malloc_trim(0) };
        }

        if op % PAUSE_INTERVAL == 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    free_all(&mut slots);
    Ok(())
}

fn free_all(slots: &mut [*mut c_void]) {
    for slot in slots {
        if !slot.is_null() {
            // SAFETY: slot holds a live allocation.
            unsafe { libc::free(*slot) };
            *slot = std::ptr::null_mut();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_range() {
        let mut rng = XorShift64::default();
        for pattern in [Pattern::Uniform, Pattern::Burst, Pattern::Pareto] {
            for _ in 0..10_000 {
                let size = pattern.draw(&mut rng, 4096);
                assert!((1..=4096).contains(&size), "{pattern:?} drew {size}");
            }
        }
    }

    #[test]
    fn burst_is_mostly_small() {
        let mut rng = XorShift64::default();
        let small = (0..10_000)
            .filter(|_| Pattern::Burst.draw(&mut rng, 100_000) <= 100_000 / 10 + 1)
            .count();
        // 90% of draws come from the small band; leave slack for the
        // uniform tail also landing low.
        assert!(small > 8_000, "only {small} small draws");
    }

    #[test]
    fn pareto_rarely_draws_large() {
        let mut rng = XorShift64::default();
        let large = (0..10_000)
            .filter(|_| Pattern::Pareto.draw(&mut rng, 100_000) > 100_000 / 20 + 1)
            .count();
        assert!(large < 200, "{large} large draws");
    }

    #[test]
    fn max_size_one_always_draws_one() {
        let mut rng = XorShift64::default();
        for pattern in [Pattern::Uniform, Pattern::Burst, Pattern::Pareto] {
            for _ in 0..100 {
                assert_eq!(pattern.draw(&mut rng, 1), 1);
            }
        }
    }

    #[test]
    fn uniform_run_completes_and_frees() {
        let config = WorkloadConfig {
            pattern: Pattern::Uniform,
            ops: 2_000,
            max_size: 512,
            disk: false,
            trim_at_step: None,
        };
        run(&config).unwrap();
    }

    #[test]
    fn trim_step_does_not_disturb_the_run() {
        let config = WorkloadConfig {
            pattern: Pattern::Burst,
            ops: 1_000,
            max_size: 4_096,
            disk: false,
            trim_at_step: Some(500),
        };
        run(&config).unwrap();
    }

    #[test]
    fn disk_mode_completes() {
        let config = WorkloadConfig {
            pattern: Pattern::Pareto,
            ops: 1_200,
            max_size: 1_024,
            disk: true,
            trim_at_step: None,
        };
        run(&config).unwrap();
    }
}
