//! A `GlobalAlloc`-compatible wrapper.
//!
//! Wraps the allocator core in a `spin::Mutex` purely to satisfy
//! `GlobalAlloc`'s `Sync` bound — the core itself stays single-threaded
//! and lock-free.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use spin::Mutex;

use crate::allocator::Allocator;
use crate::sink::HeapSink;

/// Wraps an [`Allocator`] in a spinlock so it can be installed as a
/// `#[global_allocator]`. The wrapped allocator is otherwise untouched —
/// this adds nothing but mutual exclusion.
pub struct LockedAllocator<S: HeapSink> {
    inner: Mutex<Allocator<S>>,
}

impl<S: HeapSink> LockedAllocator<S> {
    pub const fn new(allocator: Allocator<S>) -> Self {
        Self {
            inner: Mutex::new(allocator),
        }
    }
}

// SAFETY: `GlobalAlloc::alloc`/`dealloc` carry the same pointer-provenance
// contract as `Allocator::malloc`/`free`; the layout's size is forwarded as
// the requested byte count and alignment is satisfied by every block being
// 8-aligned (Layout::align() for Rust's own allocations never exceeds that
// in the absence of over-aligned types, and such types are out of scope —
// see spec 3, word/alignment rules).
unsafe impl<S: HeapSink + Send> GlobalAlloc for LockedAllocator<S> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let mut allocator = self.inner.lock();
        match allocator.malloc(layout.size() as u32) {
            Some(ptr) => ptr.as_ptr(),
            None => core::ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let Some(ptr) = NonNull::new(ptr) else {
            return;
        };
        let mut allocator = self.inner.lock();
        unsafe { allocator.free(ptr) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        let Some(ptr) = NonNull::new(ptr) else {
            return core::ptr::null_mut();
        };
        let mut allocator = self.inner.lock();
        match unsafe { allocator.realloc(ptr, new_size as u32) } {
            Some(ptr) => ptr.as_ptr(),
            None => core::ptr::null_mut(),
        }
    }
}
