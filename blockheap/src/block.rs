// =============================================================================
// Block layout & boundary tags
// =============================================================================
//
// The only module allowed to interpret raw heap bytes as structured data.
// Everything above this layer goes through these accessors.
//
// BLOCK LAYOUT:
//   [ header | payload ... | footer ]
//   header/footer each one word, encoding size | alloc-bit (see `pack`).
//   A free block additionally overlays two more words at the start of its
//   payload: a left-child link and a right-child link, used by the
//   size-ordered free-block index (see `crate::index`). An allocated
//   block's payload is not touched by this module at all.
//
// BLOCK POINTERS:
//   A block reference (`BlockPtr`) is a `u32` byte offset relative to the
//   heap's fixed base address, not a native pointer: a real 8-byte pointer
//   on a 64-bit host would force the minimum block size from 16 bytes up to
//   24. Offset 0 falls inside the alignment pad word and is never a valid
//   block pointer, so it doubles as the encoded-null sentinel for
//   free-block links.
//
// =============================================================================

use core::slice;

use crate::config::{DSIZE, WSIZE};

/// A block pointer: the offset, in bytes from the heap base, of a block's
/// first payload byte (immediately after its header). By convention this is
/// also used for the zero-payload sentinel blocks, whose "payload" is empty.
pub type BlockPtr = u32;

const ALLOC_BIT: u32 = 0b001;
const SIZE_MASK: u32 = !0b111;

#[inline]
pub(crate) const fn pack(size: u32, alloc: bool) -> u32 {
    size | (alloc as u32)
}

/// Encodes an `Option<BlockPtr>` free-list link as a raw word: `0` for
/// `None` (never a valid block pointer — see module docs).
#[inline]
fn encode_link(link: Option<BlockPtr>) -> u32 {
    link.unwrap_or(0)
}

#[inline]
fn decode_link(word: u32) -> Option<BlockPtr> {
    if word == 0 { None } else { Some(word) }
}

/// A live, bounds-checked view over the committed heap region.
///
/// Constructing one is the crate's sole unsafe boundary: everywhere else,
/// block navigation is plain safe slice indexing.
pub(crate) struct HeapView<'a> {
    bytes: &'a mut [u8],
}

impl<'a> HeapView<'a> {
    /// # Safety
    ///
    /// `base` must point to `len` valid, writable, initialized bytes, and
    /// must remain valid for the lifetime `'a`. Callers (exclusively
    /// `Allocator`) uphold this via the [`HeapSink`](crate::sink::HeapSink)
    /// contract: `base` is the sink's `heap_lo()` and `len` is the
    /// allocator's own tracked committed length, which never exceeds what
    /// the sink has committed.
    pub(crate) unsafe fn new(base: *mut u8, len: usize) -> Self {
        // SAFETY: forwarded to the caller's obligation, documented above.
        let bytes = unsafe { slice::from_raw_parts_mut(base, len) };
        Self { bytes }
    }

    // =========================================================================
    // Raw word access
    // =========================================================================

    #[inline]
    fn get_word(&self, off: u32) -> u32 {
        let off = off as usize;
        u32::from_ne_bytes(self.bytes[off..off + 4].try_into().unwrap())
    }

    #[inline]
    fn put_word(&mut self, off: u32, val: u32) {
        let off = off as usize;
        self.bytes[off..off + 4].copy_from_slice(&val.to_ne_bytes());
    }

    /// Writes a raw word directly at a byte offset, bypassing the `bp`
    /// convention. Used only during sentinel setup (`Allocator::init`),
    /// where the prologue/epilogue words don't have a meaningful `bp`.
    pub(crate) fn put_raw(&mut self, off: u32, val: u32) {
        self.put_word(off, val);
    }

    // =========================================================================
    // Header/footer: size and allocation state
    // =========================================================================

    /// Offset of `bp`'s header.
    #[inline]
    pub(crate) fn hdrp(bp: BlockPtr) -> u32 {
        bp - WSIZE
    }

    /// Offset of `bp`'s footer.
    ///
    /// # Panics / undefined results
    ///
    /// Calling this on the epilogue (or past it) reads garbage: the
    /// epilogue has no footer. The core never does this — see spec 4.1.
    #[inline]
    pub(crate) fn ftrp(&self, bp: BlockPtr) -> u32 {
        bp + self.size(bp) - DSIZE
    }

    /// Total size of the block at `bp`, including header and footer.
    #[inline]
    pub(crate) fn size(&self, bp: BlockPtr) -> u32 {
        self.get_word(Self::hdrp(bp)) & SIZE_MASK
    }

    /// Whether the block at `bp` is currently allocated.
    #[inline]
    pub(crate) fn is_alloc(&self, bp: BlockPtr) -> bool {
        self.get_word(Self::hdrp(bp)) & ALLOC_BIT != 0
    }

    /// Raw footer word of `bp`, unmasked. Used only by consistency checks
    /// that need to compare it directly against the header word rather
    /// than going through `size`/`is_alloc` (which only ever read the
    /// header).
    #[inline]
    pub(crate) fn footer_word(&self, bp: BlockPtr) -> u32 {
        self.get_word(self.ftrp(bp))
    }

    /// Writes matching header and footer for `bp`, encoding `size`/`alloc`.
    pub(crate) fn set_header_footer(&mut self, bp: BlockPtr, size: u32, alloc: bool) {
        let word = pack(size, alloc);
        self.put_word(Self::hdrp(bp), word);
        let ftrp = bp + size - DSIZE;
        self.put_word(ftrp, word);
    }

    // =========================================================================
    // Physical navigation (by address, regardless of alloc state)
    // =========================================================================

    /// Block pointer of the block physically following `bp`.
    #[inline]
    pub(crate) fn next_blkp(&self, bp: BlockPtr) -> BlockPtr {
        bp + self.size(bp)
    }

    /// Block pointer of the block physically preceding `bp`, found by
    /// reading the preceding block's footer (the word immediately before
    /// `bp`'s own header).
    #[inline]
    pub(crate) fn prev_blkp(&self, bp: BlockPtr) -> BlockPtr {
        let prev_footer = bp - DSIZE;
        let prev_size = self.get_word(prev_footer) & SIZE_MASK;
        bp - prev_size
    }

    // =========================================================================
    // Free-tree links (valid only while `bp` is free and indexed)
    // =========================================================================

    /// Left free-tree child of the free block at `bp`.
    #[inline]
    pub(crate) fn left(&self, bp: BlockPtr) -> Option<BlockPtr> {
        decode_link(self.get_word(bp))
    }

    /// Right free-tree child of the free block at `bp`.
    #[inline]
    pub(crate) fn right(&self, bp: BlockPtr) -> Option<BlockPtr> {
        decode_link(self.get_word(bp + WSIZE))
    }

    pub(crate) fn set_left(&mut self, bp: BlockPtr, link: Option<BlockPtr>) {
        self.put_word(bp, encode_link(link));
    }

    pub(crate) fn set_right(&mut self, bp: BlockPtr, link: Option<BlockPtr>) {
        self.put_word(bp + WSIZE, encode_link(link));
    }
}
