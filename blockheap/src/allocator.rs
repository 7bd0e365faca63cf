// =============================================================================
// Allocator core
// =============================================================================
//
// Public entry points: `init`, `malloc`, `free`, `realloc`, `checkheap`,
// composing the lower layers (`block`, `coalesce`, `index`, `place`) under
// the size-adjustment and alignment rules.
//
// HEAP LAYOUT:
//   [ pad word | prologue header | prologue footer | epilogue header ]
//   [ ... ordinary blocks grown on demand via extend_heap ... ]
//   [ epilogue header ]
//
//   The prologue is a permanent zero-payload allocated block; the epilogue
//   is a permanent zero-size allocated "header" that always sits at the
//   current end of the committed heap, so boundary checks never walk off
//   the end of valid memory.
//
// =============================================================================

use core::ptr::NonNull;

use crate::block::{pack, BlockPtr, HeapView};
use crate::coalesce;
use crate::config::{adjusted_size, round_up, AllocatorConfig, DSIZE, OVERHEAD, WSIZE};
use crate::error::SinkExhausted;
use crate::index;
use crate::place;
use crate::sink::HeapSink;

/// The allocator core: a single contiguous heap grown through `S`, a
/// boundary-tagged block layout, and a size-ordered free-block index.
///
/// Single-threaded by contract — `&mut self` on every mutating operation
/// is the whole synchronization story. See
/// [`crate::locked::LockedAllocator`] for a `GlobalAlloc`-compatible wrapper.
pub struct Allocator<S: HeapSink> {
    sink: S,
    /// Bytes committed so far — always equal to what `sink` has committed,
    /// since this allocator is the sink's only caller.
    len: u32,
    root: Option<BlockPtr>,
    config: AllocatorConfig,
}

/// Counts of invariant violations discovered by [`Allocator::checkheap`].
/// All-zero fields mean a clean heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Blocks whose header word does not equal their footer word.
    pub header_footer_mismatches: u32,
    /// Blocks whose size is not 8-aligned, or smaller than the minimum.
    pub misaligned_blocks: u32,
    /// Adjacent pairs of free blocks found during the walk (should be
    /// impossible given maximal coalescing; a nonzero count is a bug).
    pub adjacent_free_pairs: u32,
    /// The prologue is missing or not marked allocated.
    pub bad_prologue: u32,
    /// The epilogue is missing, nonzero-size, or not marked allocated.
    pub bad_epilogue: u32,
}

impl CheckReport {
    /// Whether the walk found zero violations of any kind.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl<S: HeapSink> Allocator<S> {
    /// Builds the sentinel prologue/epilogue and performs the first chunk
    /// extension, per spec 4.6. Fails only if `sink` cannot supply the
    /// initial four words or the first `config.chunk_size` extension.
    pub fn init(sink: S) -> Result<Self, SinkExhausted> {
        Self::init_with_config(sink, AllocatorConfig::default())
    }

    /// As [`Allocator::init`], with an explicit [`AllocatorConfig`].
    pub fn init_with_config(mut sink: S, config: AllocatorConfig) -> Result<Self, SinkExhausted> {
        let prelude = 4 * WSIZE;
        sink.extend(prelude as usize)?;

        let mut alloc = Self {
            sink,
            len: prelude,
            root: None,
            config,
        };

        // =====================================================================
        // Write the pad word and permanent prologue/epilogue sentinels
        // =====================================================================
        {
            let mut view = unsafe { HeapView::new(alloc.sink.heap_lo(), alloc.len as usize) };
            view.put_raw(0, 0);
            // Prologue: a zero-payload, always-allocated minimum block
            // whose bp and footer coincide (no payload to separate them).
            view.set_header_footer(2 * WSIZE, DSIZE, true);
            view.put_raw(3 * WSIZE, pack(0, true));
        }

        // =====================================================================
        // First chunk extension, indexed as the heap's initial free block
        // =====================================================================
        let chunk_words = alloc.config.chunk_size / WSIZE;
        let bp = alloc.extend_heap(chunk_words)?;

        {
            let mut view = unsafe { HeapView::new(alloc.sink.heap_lo(), alloc.len as usize) };
            alloc.root = index::insert(&mut view, alloc.root, bp);
        }

        Ok(alloc)
    }

    /// Requests `words` (rounded to even) from the sink, installs a fresh
    /// free block and epilogue at the new tail, and coalesces it with
    /// whatever preceded it. The result is **not** inserted into the index.
    fn extend_heap(&mut self, words: u32) -> Result<BlockPtr, SinkExhausted> {
        let words = if words % 2 != 0 { words + 1 } else { words };
        let size = words * WSIZE;

        let old_len = self.len;
        self.sink.extend(size as usize)?;
        self.len = old_len + size;
        let bp = old_len;

        {
            let mut view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
            view.set_header_footer(bp, size, false);
            view.put_raw(self.len - WSIZE, pack(0, true));
        }

        let mut view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        let (root, merged_bp) = coalesce::coalesce(&mut view, self.root, bp);
        self.root = root;
        Ok(merged_bp)
    }

    /// Returns an 8-aligned pointer to at least `size` writable bytes, or
    /// `None` on `size == 0` or sink exhaustion.
    pub fn malloc(&mut self, size: u32) -> Option<NonNull<u8>> {
        if size == 0 {
            return None;
        }
        let asize = adjusted_size(size);

        let fit = {
            let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
            index::fit(&view, self.root, asize)
        };

        let bp = match fit {
            Some(found) => {
                let mut view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
                self.root = index::remove(&mut view, self.root, found);
                found
            }
            None => {
                let extend_words = round_up(asize.max(self.config.chunk_size), DSIZE) / WSIZE;
                self.extend_heap(extend_words).ok()?
            }
        };

        let alloc_bp = {
            let mut view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
            let (root, alloc_bp) = place::place(&mut view, self.root, bp, asize, &self.config);
            self.root = root;
            alloc_bp
        };

        let ptr = unsafe { self.sink.heap_lo().add(alloc_bp as usize) };
        NonNull::new(ptr)
    }

    /// # Safety
    ///
    /// `ptr` must have been returned by a prior `malloc`/`realloc` of this
    /// same allocator and must not have been freed since.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let bp = self.bp_from_ptr(ptr);

        let mut view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        let size = view.size(bp);
        view.set_header_footer(bp, size, false);

        let (root, merged) = coalesce::coalesce(&mut view, self.root, bp);
        self.root = index::insert(&mut view, root, merged);
    }

    /// Allocates a new block of `size` bytes, copies
    /// `min(size, old_payload)` bytes from `ptr`, and frees `ptr`.
    ///
    /// Copies only the old block's *payload* size, not its total size
    /// including boundary tags — copying that many bytes from a payload
    /// pointer would read past the block into its footer and beyond, which
    /// this crate's safety boundary does not allow.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by a prior `malloc`/`realloc` of this
    /// same allocator and must not have been freed since.
    pub unsafe fn realloc(&mut self, ptr: NonNull<u8>, size: u32) -> Option<NonNull<u8>> {
        let bp = self.bp_from_ptr(ptr);
        let old_payload = {
            let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
            view.size(bp) - OVERHEAD
        };

        let new_ptr = self.malloc(size)?;
        let copy_len = old_payload.min(size) as usize;
        unsafe {
            core::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
            self.free(ptr);
        }
        Some(new_ptr)
    }

    /// Walks every block between the sentinels, reporting boundary-tag and
    /// adjacency violations. Logs per-block detail at `trace` level, and
    /// each discovered violation at `warn`, when `verbose` is set — never
    /// called from the allocate/free hot path.
    pub fn checkheap(&self, verbose: bool) -> CheckReport {
        let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        let mut report = CheckReport::default();

        let prologue_bp = 2 * WSIZE;
        if view.size(prologue_bp) != DSIZE || !view.is_alloc(prologue_bp) {
            report.bad_prologue += 1;
            log::warn!("blockheap: malformed prologue at {prologue_bp}");
        }

        let mut bp = view.next_blkp(prologue_bp);
        let mut prev_was_free = false;

        while view.size(bp) > 0 {
            let size = view.size(bp);
            let alloc = view.is_alloc(bp);

            if verbose {
                log::trace!("blockheap: block {bp} size={size} alloc={alloc}");
            }

            if view.footer_word(bp) != pack(size, alloc) {
                report.header_footer_mismatches += 1;
                log::warn!("blockheap: header/footer mismatch at block {bp}");
            }

            if size < crate::config::MIN_BLOCK || size % DSIZE != 0 {
                report.misaligned_blocks += 1;
                log::warn!("blockheap: misaligned block {bp} (size {size})");
            }

            if !alloc && prev_was_free {
                report.adjacent_free_pairs += 1;
                log::warn!("blockheap: adjacent free blocks ending at {bp}");
            }
            prev_was_free = !alloc;

            bp = view.next_blkp(bp);
        }

        if view.size(bp) != 0 || !view.is_alloc(bp) {
            report.bad_epilogue += 1;
            log::warn!("blockheap: malformed epilogue at {bp}");
        }

        report
    }

    /// Offset of `ptr` relative to the heap base, as a [`BlockPtr`].
    fn bp_from_ptr(&self, ptr: NonNull<u8>) -> BlockPtr {
        let base = self.sink.heap_lo() as usize;
        let addr = ptr.as_ptr() as usize;
        (addr - base) as u32
    }
}

#[cfg(test)]
impl<S: HeapSink> Allocator<S> {
    /// Sizes of every block currently in the free-block index, via an
    /// in-order walk. Test-only introspection: production code only ever
    /// searches the index, never lists it.
    pub(crate) fn index_sizes(&self) -> std::vec::Vec<u32> {
        let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        let mut out = std::vec::Vec::new();
        fn walk(view: &HeapView<'_>, bp: Option<BlockPtr>, out: &mut std::vec::Vec<u32>) {
            let Some(bp) = bp else { return };
            walk(view, view.left(bp), out);
            out.push(view.size(bp));
            walk(view, view.right(bp), out);
        }
        walk(&view, self.root, &mut out);
        out
    }

    /// Sizes of every free block found by a physical walk between the
    /// sentinels, independent of the index — used to cross-check that the
    /// index and the heap agree on which blocks are free.
    pub(crate) fn physical_free_sizes(&self) -> std::vec::Vec<u32> {
        let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        let mut out = std::vec::Vec::new();
        let mut bp = view.next_blkp(2 * WSIZE);
        while view.size(bp) > 0 {
            if !view.is_alloc(bp) {
                out.push(view.size(bp));
            }
            bp = view.next_blkp(bp);
        }
        out
    }

    /// The half-open address range `[lo, hi)` any live payload pointer must
    /// fall within: `lo` is the first byte past the prologue, `hi` is the
    /// first byte of the epilogue header. Used to check that malloc never
    /// hands out a pointer into the sentinels or past the committed heap.
    pub(crate) fn heap_bounds(&self) -> (usize, usize) {
        let base = self.sink.heap_lo() as usize;
        let lo = base + (4 * WSIZE) as usize;
        let hi = base + self.len as usize - WSIZE as usize;
        (lo, hi)
    }

    /// Whether the free-block index currently satisfies its size-ordering
    /// invariant: every node's left subtree sizes are `<=` its own, every
    /// right subtree's are strictly greater. Genuine recursion is fine
    /// here — index trees in tests are small, and this code never ships
    /// to a caller.
    pub(crate) fn check_tree_shape(&self) -> bool {
        let view = unsafe { HeapView::new(self.sink.heap_lo(), self.len as usize) };
        fn rec(view: &HeapView<'_>, bp: Option<BlockPtr>, lo: u32, hi: u32) -> bool {
            let Some(bp) = bp else { return true };
            let size = view.size(bp);
            if size < lo || size >= hi {
                return false;
            }
            rec(view, view.left(bp), lo, size + 1) && rec(view, view.right(bp), size + 1, hi)
        }
        rec(&view, self.root, 0, u32::MAX)
    }
}
