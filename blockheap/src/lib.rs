//! A boundary-tagged, size-ordered free-list allocator over a growable byte
//! arena supplied by an external [`HeapSink`].
//!
//! The core — block layout, coalescing, the size-keyed free-block index,
//! and the placement/split policy — is the crate's whole purpose; the sink
//! it grows into is deliberately a trait, not an implementation: a
//! collaborator this crate calls but does not define.

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

mod allocator;
mod block;
mod coalesce;
mod config;
mod error;
mod index;
mod locked;
mod place;
mod sink;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

#[cfg(test)]
mod tests;

pub use allocator::{Allocator, CheckReport};
pub use config::AllocatorConfig;
pub use error::SinkExhausted;
pub use locked::LockedAllocator;
pub use sink::HeapSink;
