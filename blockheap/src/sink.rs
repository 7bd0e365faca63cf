//! The heap sink: the page-granularity memory source this allocator grows
//! into. Deliberately out of scope for the core — the core uses it but
//! does not implement it — so this module only defines the contract.

use crate::error::SinkExhausted;

/// A monotonically-growable, page-granularity memory source.
///
/// # Safety
///
/// Implementations must guarantee that once a byte has been committed by a
/// successful [`extend`](HeapSink::extend), its address never changes and
/// it is never unmapped for the lifetime of the sink. The allocator core
/// stores block references as offsets relative to [`heap_lo`](HeapSink::heap_lo)
/// and assumes that address is stable from the first successful `extend`
/// onward; a sink that moves its backing storage (for example, a naively
/// reallocating growable buffer) would silently invalidate every pointer
/// this allocator has already handed out.
pub unsafe trait HeapSink {
    /// Grows the committed region by `bytes` (already rounded to whatever
    /// granularity the sink requires) and returns a pointer to the start of
    /// the newly committed region — the former tail of the heap.
    ///
    /// On failure, the sink's committed region must be left exactly as it
    /// was; no error path may leave a partially-grown heap.
    fn extend(&mut self, bytes: usize) -> Result<*mut u8, SinkExhausted>;

    /// Address of the first committed byte, or a dangling-but-non-null
    /// value before the first successful `extend`. Used only by
    /// consistency checks.
    fn heap_lo(&self) -> *mut u8;

    /// Address one past the last committed byte.
    fn heap_hi(&self) -> *mut u8;
}
