//! This crate provides a self-balancing Binary Search Tree (an AVL tree) over orderable keys.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored keys. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores a key and
//! will sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key no greater than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key no less than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for keys takes `O(height)` (where `height` is the longest path from
//! the root `Node` to a leaf `Node`) and sorted iteration falls out of visiting the
//! left subtree, then the subtree root, then the right subtree.
//!
//! ## AVL Trees
//!
//! An AVL tree additionally keeps the heights of every `Node`'s two subtrees within
//! one of each other. Inserts and deletes restore this by rotating nodes on the way
//! back up from the change, which bounds the height at roughly `1.44 * lg N`.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod error;

pub use crate::avl::{Direction, Iter, Tree};
pub use crate::error::TreeError;

#[cfg(test)]
mod test {
    pub(crate) mod quick;
}
