//! Errors surfaced by [`Tree`][crate::Tree] operations.

use thiserror::Error;

use crate::avl::Direction;

/// A structural precondition was broken while restructuring the tree.
///
/// None of these are reachable through the public mutating operations while the tree's
/// invariants hold. They exist so a broken invariant is reported instead of dereferencing a
/// missing child.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A rotation was requested on an empty subtree.
    #[error("cannot rotate {direction}: subtree is empty")]
    EmptySubtree {
        /// Which way the rotation would have turned.
        direction: Direction,
    },

    /// A rotation was requested on a node without the child it would promote.
    #[error("cannot rotate {direction}: node has no {} child to promote", .direction.opposite())]
    MissingChild {
        /// Which way the rotation would have turned.
        direction: Direction,
    },
}
