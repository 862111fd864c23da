//! A self-balancing BST (an AVL tree) of owned, boxed nodes. Every node is exclusively owned by
//! its parent's child slot and nothing points back up the tree, so mutation works by recursing
//! down to a slot, changing it, and rebalancing each slot on the way back up.
//!
//! # Examples
//!
//! ```
//! use avl::Tree;
//!
//! let mut tree = Tree::new();
//! assert!(tree.is_empty());
//!
//! // Ascending inserts still produce a balanced tree.
//! for key in [10, 20, 30] {
//!     tree.insert(key).unwrap();
//! }
//! assert_eq!(tree.height(), 2);
//!
//! // Duplicates are kept.
//! tree.insert(20).unwrap();
//! assert_eq!(tree.inorder(), [&10, &20, &20, &30]);
//!
//! // Deleting removes a single occurrence. Missing keys are ignored.
//! assert_eq!(tree.delete(&20), Ok(true));
//! assert_eq!(tree.delete(&42), Ok(false));
//! assert_eq!(tree.inorder(), [&10, &20, &30]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::error::TreeError;

/// An owned child slot. `None` is an empty subtree.
type Link<K> = Option<Box<Node<K>>>;

/// A side of a node. Used both for where a key is routed and which way a rotation turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards smaller keys.
    Left,
    /// Towards larger or equal keys.
    Right,
}

impl Direction {
    /// Which side of `node_key` the given `key` belongs on. Keys equal to the node's key go right.
    pub fn route<K: Ord>(key: &K, node_key: &K) -> Self {
        if key < node_key {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// A self-balancing Binary Search Tree (specifically, an AVL tree) of keys. Keys may repeat;
/// each insert adds an occurrence and each delete removes one.
#[derive(Clone, Debug)]
pub struct Tree<K> {
    root: Link<K>,
    len: usize,
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Tree<K> {
    /// Generate a new, empty `Tree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Builds a tree holding every value in `values`. See [`Tree::build_balanced`].
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let tree = Tree::from_unsorted(vec![5, 3, 8, 1, 4, 7, 9]).unwrap();
    /// assert_eq!(tree.inorder(), [&1, &3, &4, &5, &7, &8, &9]);
    /// ```
    pub fn from_unsorted<I>(values: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = K>,
        K: Ord,
    {
        let mut tree = Self::new();
        tree.build_balanced(values)?;
        Ok(tree)
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// How many keys (counting duplicates) are in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The number of levels in the tree. An empty tree has a height of 0 and a single key has a
    /// height of 1.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Inserts `key` into the tree. Equal keys are placed to the right of existing ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(2).unwrap();
    /// tree.insert(1).unwrap();
    ///
    /// assert!(tree.contains(&1));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) -> Result<(), TreeError>
    where
        K: Ord,
    {
        insert(&mut self.root, key)?;
        self.len += 1;
        Ok(())
    }

    /// Removes one occurrence of `key` from the tree. Returns whether anything was removed;
    /// deleting a key that isn't present leaves the tree untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1).unwrap();
    ///
    /// assert_eq!(tree.delete(&1), Ok(true));
    /// assert_eq!(tree.delete(&1), Ok(false));
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: &K) -> Result<bool, TreeError>
    where
        K: Ord,
    {
        let deleted = delete(&mut self.root, key)?;
        if deleted {
            self.len -= 1;
        } else {
            debug!("delete found no matching key");
        }
        Ok(deleted)
    }

    /// Sorts `values` and inserts each of them. Existing keys stay in the tree.
    ///
    /// The sort doesn't change the outcome beyond the final shape: the tree rebalances itself
    /// whatever the insertion order.
    pub fn build_balanced<I>(&mut self, values: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = K>,
        K: Ord,
    {
        let mut values: Vec<K> = values.into_iter().collect();
        values.sort();
        debug!(count = values.len(), "building tree from sorted values");

        for value in values {
            self.insert(value)?;
        }
        debug!(len = self.len, height = self.height(), "built tree");
        Ok(())
    }

    /// Whether some occurrence of `key` is in the tree.
    pub fn contains(&self, key: &K) -> bool
    where
        K: Ord,
    {
        let mut link = &self.root;
        while let Some(node) = link {
            match key.cmp(&node.key) {
                Ordering::Less => link = &node.left,
                Ordering::Equal => return true,
                Ordering::Greater => link = &node.right,
            }
        }
        false
    }

    /// The smallest key in the tree.
    pub fn min(&self) -> Option<&K> {
        self.root.as_deref().map(|root| &root.minimum_node().key)
    }

    /// Every key in ascending order.
    pub fn inorder(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        collect_inorder(&self.root, &mut keys);
        keys
    }

    /// A lazy ascending iterator over the keys. It borrows the tree and can be restarted by
    /// calling this again.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.root, self.len)
    }

    /// Walks the whole tree checking the ordering and AVL invariants along with the cached
    /// heights. This is `O(n)`; the tree never needs it to function.
    pub fn is_balanced(&self) -> bool
    where
        K: Ord,
    {
        check_subtree(&self.root, None, None).is_some()
    }
}

impl<'a, K> IntoIterator for &'a Tree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the tree sideways: the right subtree above its parent, the left below, each level
/// indented by four spaces.
///
/// ```
/// use avl::Tree;
///
/// let tree = Tree::from_unsorted([30, 10, 20]).unwrap();
/// assert_eq!(tree.to_string(), "    -> 30\n-> 20\n    -> 10\n");
/// ```
impl<K> fmt::Display for Tree<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sideways(f, &self.root, 0)
    }
}

fn write_sideways<K>(f: &mut fmt::Formatter<'_>, link: &Link<K>, level: usize) -> fmt::Result
where
    K: fmt::Display,
{
    if let Some(node) = link {
        write_sideways(f, &node.right, level + 1)?;
        writeln!(f, "{:indent$}-> {}", "", node.key, indent = 4 * level)?;
        write_sideways(f, &node.left, level + 1)?;
    }
    Ok(())
}

/// Ascending iterator over the keys of a [`Tree`].
///
/// Holds the path of nodes whose key hasn't been yielded yet, so it needs `O(height)` space.
pub struct Iter<'a, K> {
    stack: Vec<&'a Node<K>>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(root: &'a Link<K>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[derive(Clone, Debug)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,

    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    height: usize,
}

impl<K> Node<K> {
    fn new_boxed(key: K) -> Box<Self> {
        Box::new(Node {
            key,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn child_mut(&mut self, direction: Direction) -> &mut Link<K> {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Recomputes this node's height from its children's cached heights.
    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// Height of the left subtree minus height of the right subtree.
    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    /// The leftmost node of this subtree.
    fn minimum_node(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        node
    }
}

fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance_factor<K>(link: &Link<K>) -> isize {
    link.as_ref().map_or(0, |n| n.balance_factor())
}

/// Rotate the subtree in `slot` to the right. This moves the left child up and the old root down
/// to become its right child. On error the slot is left as it was.
///
/// # Diagram
///
/// ```text
///      old_root                new_root
///       /     \                 /     \
///   new_root   z   rotate ->   x    old_root
///    /   \                           /   \
///   x     y                         y     z
/// ```
fn rotate_right<K>(slot: &mut Link<K>) -> Result<(), TreeError> {
    let Some(mut old_root) = slot.take() else {
        return Err(TreeError::EmptySubtree {
            direction: Direction::Right,
        });
    };
    let Some(mut new_root) = old_root.left.take() else {
        *slot = Some(old_root);
        return Err(TreeError::MissingChild {
            direction: Direction::Right,
        });
    };

    old_root.left = new_root.right.take();
    old_root.fix_height();

    new_root.right = Some(old_root);
    new_root.fix_height();
    trace!(height = new_root.height, "rotated right");

    *slot = Some(new_root);
    Ok(())
}

/// Mirror of [`rotate_right`]: the right child moves up and the old root becomes its left child.
fn rotate_left<K>(slot: &mut Link<K>) -> Result<(), TreeError> {
    let Some(mut old_root) = slot.take() else {
        return Err(TreeError::EmptySubtree {
            direction: Direction::Left,
        });
    };
    let Some(mut new_root) = old_root.right.take() else {
        *slot = Some(old_root);
        return Err(TreeError::MissingChild {
            direction: Direction::Left,
        });
    };

    old_root.right = new_root.left.take();
    old_root.fix_height();

    new_root.left = Some(old_root);
    new_root.fix_height();
    trace!(height = new_root.height, "rotated left");

    *slot = Some(new_root);
    Ok(())
}

fn insert<K: Ord>(slot: &mut Link<K>, key: K) -> Result<(), TreeError> {
    let node = match slot {
        Some(node) => node,
        None => {
            *slot = Some(Node::new_boxed(key));
            return Ok(());
        }
    };

    let direction = Direction::route(&key, &node.key);
    let child = node.child_mut(direction);
    // Where the key lands below the child. If the child gets rotated on the way back up its
    // height is restored, so this node can only be out of balance when the child is unchanged.
    let below_child = child
        .as_ref()
        .map(|child| Direction::route(&key, &child.key));
    insert(child, key)?;
    node.fix_height();

    // See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
    let balance = node.balance_factor();
    match below_child {
        // Left Left
        Some(Direction::Left) if balance > 1 => rotate_right(slot)?,
        // Right Right
        Some(Direction::Right) if balance < -1 => rotate_left(slot)?,
        // Left Right
        Some(Direction::Right) if balance > 1 => {
            rotate_left(&mut node.left)?;
            rotate_right(slot)?;
        }
        // Right Left
        Some(Direction::Left) if balance < -1 => {
            rotate_right(&mut node.right)?;
            rotate_left(slot)?;
        }
        _ => {}
    }

    debug_assert_balanced(slot);
    Ok(())
}

fn delete<K: Ord>(slot: &mut Link<K>, key: &K) -> Result<bool, TreeError> {
    let Some(node) = slot.as_mut() else {
        return Ok(false);
    };

    let deleted = match key.cmp(&node.key) {
        Ordering::Less => delete(&mut node.left, key)?,
        Ordering::Greater => delete(&mut node.right, key)?,
        Ordering::Equal => {
            if node.left.is_none() {
                *slot = node.right.take();
                return Ok(true);
            }
            if node.right.is_none() {
                *slot = node.left.take();
                return Ok(true);
            }
            // Two children: the in-order successor's key moves up here and its node, which has
            // at most a right child, is the one removed.
            if let Some(successor) = take_min(&mut node.right)? {
                node.key = successor;
            }
            true
        }
    };

    if deleted {
        rebalance_after_delete(slot)?;
    }
    Ok(deleted)
}

/// Detaches the leftmost node of the subtree in `slot` and returns its key, rebalancing every
/// node on the path.
fn take_min<K>(slot: &mut Link<K>) -> Result<Option<K>, TreeError> {
    let Some(node) = slot.as_mut() else {
        return Ok(None);
    };

    if node.left.is_some() {
        let min = take_min(&mut node.left)?;
        rebalance_after_delete(slot)?;
        return Ok(min);
    }

    let right = node.right.take();
    let removed = std::mem::replace(slot, right);
    Ok(removed.map(|n| n.key))
}

/// Restores the AVL invariant at `slot` after its subtree lost a node. Unlike insertion, the
/// shape of the heavy child decides the case since there's no inserted key to compare against.
fn rebalance_after_delete<K>(slot: &mut Link<K>) -> Result<(), TreeError> {
    let Some(node) = slot.as_mut() else {
        return Ok(());
    };
    node.fix_height();

    let balance = node.balance_factor();
    if balance > 1 {
        if balance_factor(&node.left) >= 0 {
            // Left Left
            rotate_right(slot)?;
        } else {
            // Left Right
            rotate_left(&mut node.left)?;
            rotate_right(slot)?;
        }
    } else if balance < -1 {
        if balance_factor(&node.right) <= 0 {
            // Right Right
            rotate_left(slot)?;
        } else {
            // Right Left
            rotate_right(&mut node.right)?;
            rotate_left(slot)?;
        }
    }

    debug_assert_balanced(slot);
    Ok(())
}

/// In debug builds, after balancing, assert that we've restored/maintained the AVL invariant.
fn debug_assert_balanced<K>(slot: &Link<K>) {
    if cfg!(debug_assertions) {
        let Some(node) = slot else {
            return;
        };
        let left_height = height(&node.left);
        let right_height = height(&node.right);
        assert_eq!(node.height, left_height.max(right_height) + 1);
        assert!(left_height.abs_diff(right_height) <= 1);
    }
}

fn collect_inorder<'a, K>(link: &'a Link<K>, keys: &mut Vec<&'a K>) {
    if let Some(node) = link {
        collect_inorder(&node.left, keys);
        keys.push(&node.key);
        collect_inorder(&node.right, keys);
    }
}

/// Returns the subtree's height when every key lies within `[lower, upper]` and every node is
/// balanced with a correct cached height.
fn check_subtree<K: Ord>(link: &Link<K>, lower: Option<&K>, upper: Option<&K>) -> Option<usize> {
    let Some(node) = link else {
        return Some(0);
    };
    let below_lower = lower.map_or(false, |lower| node.key < *lower);
    let above_upper = upper.map_or(false, |upper| node.key > *upper);
    if below_lower || above_upper {
        return None;
    }

    let left_height = check_subtree(&node.left, lower, Some(&node.key))?;
    let right_height = check_subtree(&node.right, Some(&node.key), upper)?;
    let height = left_height.max(right_height) + 1;

    (left_height.abs_diff(right_height) <= 1 && node.height == height).then_some(height)
}
