//! File-backed paging traffic for disk mode.
//!
//! An unlinked 64 MiB temp file; every touch maps one 4 KiB window at a
//! random page-aligned offset, reads a byte, and unmaps. This mixes major
//! page faults and page-cache churn into the allocation pattern.

use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;

use crate::rng::XorShift64;

/// Spool file size.
pub const SPOOL_BYTES: u64 = 64 * 1024 * 1024;

const WINDOW: usize = 4096;

/// Unlinked scratch file serving mmap reads.
#[derive(Debug)]
pub struct DiskSpool {
    file: File,
}

impl DiskSpool {
    /// Create the spool and fault in its first page.
    pub fn new() -> io::Result<Self> {
        // tempfile() unlinks immediately; the fd keeps the storage alive.
        let file = tempfile::tempfile()?;
        file.set_len(SPOOL_BYTES)?;
        let spool = Self { file };
        spool.prime()?;
        Ok(spool)
    }

    /// Write one page at the start so the mapping is backed by real data.
    fn prime(&self) -> io::Result<()> {
        // SAFETY: mapping a fresh window over our own fd; unmapped below.
        unsafe {
            let map = libc::mmap(
                std::ptr::null_mut(),
                WINDOW,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                0,
            );
            if map == libc::MAP_FAILED {
                return Err(io::Error::last_os_error());
            }
            std::ptr::write_bytes(map.cast::<u8>(), 0xAA, WINDOW);
            libc::munmap(map, WINDOW);
        }
        Ok(())
    }

    /// Map, read, and unmap one window at a random offset.
    ///
    /// A failed map is ignored; disk traffic is background noise, not a
    /// correctness obligation.
    pub fn touch(&self, rng: &mut XorShift64) {
        // mmap requires a page-aligned offset; align the draw down.
        let offset = rng.below(SPOOL_BYTES - WINDOW as u64) & !(WINDOW as u64 - 1);
        // SAFETY: read-only shared mapping over our own fd, unmapped below.
        unsafe {
            let map = libc::mmap(
                std::ptr::null_mut(),
                WINDOW,
                libc::PROT_READ,
                libc::MAP_SHARED,
                self.file.as_raw_fd(),
                offset as libc::off_t,
            );
            if map != libc::MAP_FAILED {
                std::ptr::read_volatile(map.cast::<u8>());
                libc::munmap(map, WINDOW);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spool_creates_at_full_size() {
        let spool = DiskSpool::new().unwrap();
        assert_eq!(spool.file.metadata().unwrap().len(), SPOOL_BYTES);
    }

    #[test]
    fn touch_never_panics() {
        let spool = DiskSpool::new().unwrap();
        let mut rng = XorShift64::default();
        for _ in 0..50 {
            spool.touch(&mut rng);
        }
    }
}
