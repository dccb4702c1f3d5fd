//! Interception wrappers for the four allocation primitives.
//!
//! Shape of every wrapper:
//!
//! 1. Try to claim the per-thread guard. If the thread is already inside
//!    an intercepted call (the logger or resolver allocating), forward to
//!    the cached real primitive with no logging and no resolution.
//! 2. Otherwise invoke the real primitive (resolving it on first use),
//!    record one event, and return the result verbatim.
//!
//! The one place a cached pointer can be absent on a reentrant path is
//! during symbol resolution itself: glibc's `dlsym` may call `calloc`
//! while `calloc` is the symbol being resolved. Returning null there is
//! the established preload-bootstrap idiom; `dlsym` falls back to its own
//! static buffer and resolution completes.

use std::ffi::c_void;
use std::ptr;

use libc::size_t;

use mftrace_core::resolve;
use mftrace_core::{AllocationEvent, EVENT_LOG, EventKind, HookGuard};

#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: size_t) -> *mut c_void {
    let Some(_hook) = HookGuard::enter() else {
        return match resolve::cached_malloc() {
            // SAFETY: forwarding the caller's arguments unchanged.
            Some(real) => unsafe { real(size) },
            None => ptr::null_mut(),
        };
    };
    let real = resolve::malloc_fn();
    // SAFETY: real is the host allocator's malloc.
    let out = unsafe { real(size) };
    EVENT_LOG.record(&AllocationEvent::now(
        EventKind::Alloc,
        out as usize,
        Some(size),
    ));
    out
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    let Some(_hook) = HookGuard::enter() else {
        if let Some(real) = resolve::cached_free() {
            // SAFETY: forwarding the caller's pointer unchanged.
            unsafe { real(ptr) };
        }
        return;
    };
    let real = resolve::free_fn();
    // SAFETY: real is the host allocator's free; null is valid input.
    unsafe { real(ptr) };
    EVENT_LOG.record(&AllocationEvent::now(EventKind::Free, ptr as usize, None));
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(nmemb: size_t, size: size_t) -> *mut c_void {
    let Some(_hook) = HookGuard::enter() else {
        return match resolve::cached_calloc() {
            // SAFETY: forwarding the caller's arguments unchanged.
            Some(real) => unsafe { real(nmemb, size) },
            None => ptr::null_mut(),
        };
    };
    let real = resolve::calloc_fn();
    // SAFETY: real is the host allocator's calloc.
    let out = unsafe { real(nmemb, size) };
    EVENT_LOG.record(&AllocationEvent::now(
        EventKind::Calloc,
        out as usize,
        Some(nmemb.saturating_mul(size)),
    ));
    out
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: size_t) -> *mut c_void {
    let Some(_hook) = HookGuard::enter() else {
        return match resolve::cached_realloc() {
            // SAFETY: forwarding the caller's arguments unchanged.
            Some(real) => unsafe { real(ptr, size) },
            None => ptr::null_mut(),
        };
    };
    let real = resolve::realloc_fn();
    // SAFETY: real is the host allocator's realloc.
    let out = unsafe { real(ptr, size) };
    // The new (possibly relocated) address is logged; correlating it to
    // the prior address is downstream analysis, not the tracer's job.
    EVENT_LOG.record(&AllocationEvent::now(
        EventKind::Realloc,
        out as usize,
        Some(size),
    ));
    out
}
