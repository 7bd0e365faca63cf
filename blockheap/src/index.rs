// =============================================================================
// Free-block index
// =============================================================================
//
// A binary search tree over free blocks keyed by size, with nodes stored
// *inside* the free blocks themselves via the left/right link accessors in
// `crate::block`.
//
// ITERATIVE BY CONSTRUCTION:
//   `insert` and `fit` are single-pass descents that structurally never
//   backtrack. `remove`'s two-children case can look like it needs
//   recursion — "remove the in-order predecessor from the left subtree,
//   then graft it into `bp`'s place" — but it doesn't: the in-order
//   predecessor (the rightmost node of the left subtree) has no right child
//   by definition, so detaching it always reduces to a 0-or-1-child splice,
//   found in the same pass that located it. No operation here needs an
//   explicit stack or heap-allocated state, which matters doubly in this
//   crate: it's the allocator's own bookkeeping, so using `alloc` to
//   support it would be circular.
//
// =============================================================================

use crate::block::{BlockPtr, HeapView};

/// Inserts `bp` into the tree rooted at `root`, returning the new root.
///
/// Descent rule: at a node of size `s`, `bp` goes left if `bp`'s size is
/// `<= s`, right otherwise. Duplicate sizes are allowed and sort left.
pub(crate) fn insert(view: &mut HeapView<'_>, root: Option<BlockPtr>, bp: BlockPtr) -> BlockPtr {
    view.set_left(bp, None);
    view.set_right(bp, None);

    let Some(mut cur) = root else {
        return bp;
    };
    let new_root = cur;

    loop {
        if view.size(bp) <= view.size(cur) {
            match view.left(cur) {
                Some(l) => cur = l,
                None => {
                    view.set_left(cur, Some(bp));
                    break;
                }
            }
        } else {
            match view.right(cur) {
                Some(r) => cur = r,
                None => {
                    view.set_right(cur, Some(bp));
                    break;
                }
            }
        }
    }

    new_root
}

/// Finds the first node along a best-fit descent with size `>= size`, or
/// `None` on a miss.
///
/// The descent is a plain loop that falls through to an explicit `None`
/// once it runs off a right edge, rather than an implicit fallthrough.
pub(crate) fn fit(view: &HeapView<'_>, root: Option<BlockPtr>, size: u32) -> Option<BlockPtr> {
    let mut cursor = root;
    while let Some(cur) = cursor {
        if view.size(cur) >= size {
            return Some(cur);
        }
        cursor = view.right(cur);
    }
    None
}

/// Finds the immediate parent of `bp` by descending from `root` using the
/// same size-comparison rule as `insert`, but following whichever child
/// link actually equals `bp` (so duplicate-size ties resolve correctly).
///
/// `bp` must currently be reachable from `root` and must not itself be
/// `root` (callers check that case separately).
fn find_parent(view: &HeapView<'_>, root: BlockPtr, bp: BlockPtr) -> BlockPtr {
    let mut cur = root;
    loop {
        let go_left = view.size(bp) <= view.size(cur);
        let child = if go_left { view.left(cur) } else { view.right(cur) };
        match child {
            Some(c) if c == bp => return cur,
            Some(c) => cur = c,
            None => unreachable!("bp not found in tree during parent search"),
        }
    }
}

/// Removes `bp` from the tree rooted at `root` by identity (not by key),
/// returning the new root. `bp` must currently be in the tree.
pub(crate) fn remove(view: &mut HeapView<'_>, root: Option<BlockPtr>, bp: BlockPtr) -> Option<BlockPtr> {
    let root = root.expect("remove from an empty tree");
    let parent = if bp == root {
        None
    } else {
        Some(find_parent(view, root, bp))
    };

    let left = view.left(bp);
    let right = view.right(bp);

    let replacement = match (left, right) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(l), Some(r)) => {
            // In-order predecessor: rightmost node of the left subtree.
            // It has no right child, so detaching it is always a
            // 0-or-1-child splice, found in the same walk.
            let mut pred_parent: Option<BlockPtr> = None;
            let mut pred = l;
            while let Some(rc) = view.right(pred) {
                pred_parent = Some(pred);
                pred = rc;
            }
            let pred_left = view.left(pred);

            let new_left_subtree = match pred_parent {
                // `l` itself had no right child: it *is* the predecessor,
                // and the left subtree's new root is whatever was to its
                // own left (its only possible remaining child).
                None => pred_left,
                // Predecessor was found deeper in; splice its left child
                // up into its parent's right slot, and the left subtree's
                // root (`l`) is otherwise untouched.
                Some(pp) => {
                    view.set_right(pp, pred_left);
                    Some(l)
                }
            };

            view.set_left(pred, new_left_subtree);
            view.set_right(pred, Some(r));
            Some(pred)
        }
    };

    match parent {
        None => replacement,
        Some(p) => {
            if view.left(p) == Some(bp) {
                view.set_left(p, replacement);
            } else {
                view.set_right(p, replacement);
            }
            Some(root)
        }
    }
}
