// =============================================================================
// Placement and split policy
// =============================================================================
//
// Decides whether and where to split a chosen free block for a given
// allocation request.
//
// SPLIT DECISION:
//   No split if the leftover (`csize - asize`) is smaller than
//   `config.split_threshold` — too small to ever hold a future allocation,
//   so the whole block is handed out instead of fragmenting the heap.
//
// ORIENTATION HEURISTIC (when splitting):
//   Favors leaving the free remainder next to whichever physical neighbor
//   is larger, on the theory that a future free event on that side is more
//   likely to coalesce with it.
//
// =============================================================================

use crate::block::{BlockPtr, HeapView};
use crate::config::AllocatorConfig;
use crate::index;

/// Consumes a free block `bp` (already removed from the index) and places
/// an allocation of adjusted size `asize <= view.size(bp)`.
///
/// Returns `(root, alloc_bp)`: the tree root after inserting any split
/// remainder, and the block pointer to hand back to the caller as the
/// allocated block.
pub(crate) fn place(
    view: &mut HeapView<'_>,
    root: Option<BlockPtr>,
    bp: BlockPtr,
    asize: u32,
    config: &AllocatorConfig,
) -> (Option<BlockPtr>, BlockPtr) {
    let csize = view.size(bp);
    let remainder = csize - asize;

    // =========================================================================
    // No split: remainder too small to be useful on its own
    // =========================================================================
    if remainder < config.split_threshold {
        view.set_header_footer(bp, csize, true);
        return (root, bp);
    }

    // =========================================================================
    // Split: orient the free remainder toward the larger neighbor
    // =========================================================================
    let prev = view.prev_blkp(bp);
    let next = view.next_blkp(bp);
    let prev_size = view.size(prev);
    let next_size = view.size(next);

    if next_size > prev_size {
        // Allocation at the front, free remainder at the tail.
        view.set_header_footer(bp, asize, true);
        let remainder_bp = view.next_blkp(bp);
        view.set_header_footer(remainder_bp, remainder, false);
        let root = index::insert(view, root, remainder_bp);
        (root, bp)
    } else {
        // Free remainder at the front, allocation at the tail.
        view.set_header_footer(bp, remainder, false);
        let alloc_bp = view.next_blkp(bp);
        view.set_header_footer(alloc_bp, asize, true);
        let root = index::insert(view, root, bp);
        (root, alloc_bp)
    }
}
