//! A `std`-backed [`HeapSink`] for tests and local experimentation.
//!
//! A fixed-size reservation that a cursor advances into, failing once the
//! reservation is exhausted, rather than a `Vec` left free to grow on
//! demand. A naively growing `Vec<u8>` would relocate its backing storage
//! on reallocation, invalidating every pointer this allocator has already
//! handed out to a caller — unacceptable once those pointers are live.
//! Reserving the full capacity up front and never exceeding it sidesteps
//! that entirely.

use std::vec::Vec;

use crate::error::SinkExhausted;
use crate::sink::HeapSink;

/// A fixed-capacity, never-reallocating heap sink backed by a single `Vec<u8>`.
pub struct VecHeapSink {
    buf: Vec<u8>,
    committed: usize,
}

impl VecHeapSink {
    /// Reserves `capacity` bytes up front. `extend` calls beyond this
    /// capacity fail with [`SinkExhausted`] rather than reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity],
            committed: 0,
        }
    }

    /// Bytes reserved but not yet committed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.committed
    }
}

// SAFETY: `buf` is allocated once at `capacity` bytes and never resized or
// moved afterwards; `extend` only ever advances `committed` within that
// fixed reservation, so every previously-returned address stays valid.
unsafe impl HeapSink for VecHeapSink {
    fn extend(&mut self, bytes: usize) -> Result<*mut u8, SinkExhausted> {
        if bytes > self.remaining() {
            return Err(SinkExhausted);
        }
        let old_committed = self.committed;
        self.committed += bytes;
        Ok(unsafe { self.buf.as_mut_ptr().add(old_committed) })
    }

    fn heap_lo(&self) -> *mut u8 {
        self.buf.as_ptr() as *mut u8
    }

    fn heap_hi(&self) -> *mut u8 {
        unsafe { self.buf.as_ptr().add(self.committed) as *mut u8 }
    }
}
