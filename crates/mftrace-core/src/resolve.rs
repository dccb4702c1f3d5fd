//! Lazy resolution of the real allocation primitives.
//!
//! Each primitive is looked up once with `dlsym(RTLD_NEXT, name)` and
//! cached in an `AtomicPtr`. Concurrent first calls may race on the
//! population, which is deliberate: every resolution of the same name
//! yields the identical address, so the losers of the race store the same
//! value the winner did. A lock here would add contention for no
//! correctness benefit.
//!
//! An unresolvable primitive is fatal. The host's heap would be
//! nonfunctional, so the failure is surfaced immediately: a fixed
//! diagnostic is written to stderr with raw `write(2)` (the heap may not
//! be usable) and the process aborts.

use std::ffi::{CStr, c_void};
use std::mem;
use std::sync::atomic::{AtomicPtr, Ordering};

pub type MallocFn = unsafe extern "C" fn(libc::size_t) -> *mut c_void;
pub type FreeFn = unsafe extern "C" fn(*mut c_void);
pub type CallocFn = unsafe extern "C" fn(libc::size_t, libc::size_t) -> *mut c_void;
pub type ReallocFn = unsafe extern "C" fn(*mut c_void, libc::size_t) -> *mut c_void;

static REAL_MALLOC: AtomicPtr<c_void> = AtomicPtr::new(std::ptr::null_mut());
static REAL_FREE: AtomicPtr<c_void> = AtomicPtr::new(std::ptr::null_mut());
static REAL_CALLOC: AtomicPtr<c_void> = AtomicPtr::new(std::ptr::null_mut());
static REAL_REALLOC: AtomicPtr<c_void> = AtomicPtr::new(std::ptr::null_mut());

/// Look up `name` in the next object after this one, caching into `slot`.
fn resolve(slot: &AtomicPtr<c_void>, name: &'static CStr) -> *mut c_void {
    let cached = slot.load(Ordering::Relaxed);
    if !cached.is_null() {
        return cached;
    }
    // SAFETY: name is a static NUL-terminated symbol name.
    let found = unsafe { libc::dlsym(libc::RTLD_NEXT, name.as_ptr()) };
    if !found.is_null() {
        // Benign race: any concurrent resolver stored the same address.
        slot.store(found, Ordering::Relaxed);
    }
    found
}

/// Write a fixed diagnostic to stderr and abort.
///
/// Called when a primitive that must be invoked cannot be resolved.
/// Deliberately avoids any allocation or formatting machinery.
fn die_unresolved(name: &'static CStr) -> ! {
    let write_raw = |bytes: &[u8]| {
        // SAFETY: fd 2 is stderr; the buffer is valid for its length.
        unsafe {
            libc::write(2, bytes.as_ptr().cast::<c_void>(), bytes.len());
        }
    };
    write_raw(b"[mftrace] FATAL: cannot resolve real ");
    write_raw(name.to_bytes());
    write_raw(b"\n");
    // SAFETY: abort is always safe to call.
    unsafe { libc::abort() }
}

macro_rules! primitive_accessors {
    ($resolving:ident, $cached:ident, $slot:ident, $fn_ty:ty, $name:literal) => {
        /// Resolved pointer to the real primitive, looking it up on first
        /// use. Aborts the process if the symbol cannot be found.
        #[must_use]
        pub fn $resolving() -> $fn_ty {
            let ptr = resolve(&$slot, $name);
            if ptr.is_null() {
                die_unresolved($name);
            }
            // SAFETY: the symbol was resolved from libc and has this ABI.
            unsafe { mem::transmute::<*mut c_void, $fn_ty>(ptr) }
        }

        /// Already-cached pointer, never triggering a lookup. Used on
        /// reentrant paths, where attempting resolution could recurse.
        #[must_use]
        pub fn $cached() -> Option<$fn_ty> {
            let ptr = $slot.load(Ordering::Relaxed);
            if ptr.is_null() {
                None
            } else {
                // SAFETY: only ever populated from a successful dlsym.
                Some(unsafe { mem::transmute::<*mut c_void, $fn_ty>(ptr) })
            }
        }
    };
}

primitive_accessors!(malloc_fn, cached_malloc, REAL_MALLOC, MallocFn, c"malloc");
primitive_accessors!(free_fn, cached_free, REAL_FREE, FreeFn, c"free");
primitive_accessors!(calloc_fn, cached_calloc, REAL_CALLOC, CallocFn, c"calloc");
primitive_accessors!(
    realloc_fn,
    cached_realloc,
    REAL_REALLOC,
    ReallocFn,
    c"realloc"
);

/// Eagerly resolve all four primitives.
///
/// Run during bootstrap so that by the time application threads start
/// calling, the reentrant fast path always has a cached pointer.
pub fn resolve_all() {
    resolve(&REAL_MALLOC, c"malloc");
    resolve(&REAL_FREE, c"free");
    resolve(&REAL_CALLOC, c"calloc");
    resolve(&REAL_REALLOC, c"realloc");
}
