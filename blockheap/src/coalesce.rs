// =============================================================================
// Coalescing
// =============================================================================
//
// Merges a newly-freed or newly-extended block with its immediately-adjacent
// free neighbors, dispatching on the four `(prev_alloc, next_alloc)` cases.
//
// CONTRACT:
//   `bp`'s header/footer must already be written as free before calling
//   this; `bp` itself must not yet be in the index (callers insert whatever
//   this returns, never `bp` and the returned block both).
//
// =============================================================================

use crate::block::{BlockPtr, HeapView};
use crate::index;

/// Merges `bp` with any free physical neighbor, removing merged neighbors
/// from the tree rooted at `root`. Returns the (possibly new) root and the
/// block pointer of the resulting merged block — free, maximally coalesced,
/// and not present in the returned tree.
pub(crate) fn coalesce(
    view: &mut HeapView<'_>,
    root: Option<BlockPtr>,
    bp: BlockPtr,
) -> (Option<BlockPtr>, BlockPtr) {
    let prev = view.prev_blkp(bp);
    let next = view.next_blkp(bp);
    let prev_alloc = view.is_alloc(prev);
    let next_alloc = view.is_alloc(next);

    match (prev_alloc, next_alloc) {
        // Case 1: both neighbors allocated. Nothing to merge.
        (true, true) => (root, bp),

        // Case 2: next is free. Absorb it into `bp`.
        (true, false) => {
            let root = index::remove(view, root, next);
            let size = view.size(bp) + view.size(next);
            view.set_header_footer(bp, size, false);
            (root, bp)
        }

        // Case 3: prev is free. Absorb `bp` into `prev`.
        (false, true) => {
            let root = index::remove(view, root, prev);
            let size = view.size(prev) + view.size(bp);
            view.set_header_footer(prev, size, false);
            (root, prev)
        }

        // Case 4: both neighbors free. Absorb `bp` and `next` into `prev`.
        (false, false) => {
            let root = index::remove(view, root, prev);
            let root = index::remove(view, root, next);
            let size = view.size(prev) + view.size(bp) + view.size(next);
            view.set_header_footer(prev, size, false);
            (root, prev)
        }
    }
}
