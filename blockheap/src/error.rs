//! Error types.
//!
//! Kept as plain `#[derive(Debug)]` types with one doc comment each — no
//! `std::error::Error` impl, no `thiserror`, since this crate is `no_std`
//! and has no use for either.

/// Returned when a [`HeapSink`](crate::sink::HeapSink) cannot grow the heap
/// any further. Surfaced to callers as `Err` from [`Allocator::init`] and as
/// `None` from `malloc`/`realloc`; sink exhaustion never leaves a partial
/// mutation behind.
///
/// [`Allocator::init`]: crate::allocator::Allocator::init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkExhausted;
