//! Tunable constants, as a small config struct rather than bare `const`s.
//!
//! This allocator is meant to be reused across differently-shaped
//! workloads, so the knobs that would otherwise be fixed constants live on
//! a value instead, with sensible defaults.

/// Machine word size in bytes. Every header/footer is one word wide.
pub const WSIZE: u32 = 4;

/// Double-word size in bytes. Boundary-tag overhead (header + footer) is
/// exactly one double word.
pub const DSIZE: u32 = 8;

/// Header + footer overhead of a block, in bytes.
pub const OVERHEAD: u32 = DSIZE;

/// Smallest legal block size: header + two free-list links + footer.
pub const MIN_BLOCK: u32 = DSIZE + OVERHEAD;

/// Tunables for an [`Allocator`](crate::allocator::Allocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Bytes requested from the sink on a fit miss, when larger than the
    /// adjusted request size itself.
    pub chunk_size: u32,

    /// Minimum remainder, in bytes, for `place` to bother splitting a block
    /// rather than handing the whole thing over. Below this, the leftover
    /// sliver would cost more in boundary-tag overhead than it could ever
    /// usefully hold.
    pub split_threshold: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            split_threshold: 6 * OVERHEAD,
        }
    }
}

/// Rounds `value` up to the next multiple of `align` (`align` a power of two).
#[inline]
pub(crate) const fn round_up(value: u32, align: u32) -> u32 {
    (value + align - 1) & !(align - 1)
}

/// The adjusted block size for a user-requested payload of `size` bytes,
/// per spec: at least `DSIZE + OVERHEAD`, otherwise `size + OVERHEAD`
/// rounded up to a double word.
#[inline]
pub(crate) fn adjusted_size(size: u32) -> u32 {
    if size <= DSIZE {
        DSIZE + OVERHEAD
    } else {
        round_up(size + OVERHEAD, DSIZE)
    }
}
