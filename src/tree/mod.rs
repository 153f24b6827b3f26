//! The tree module.
//! A binary search tree that is either self-balancing (AVL) or plain, behind a
//! single coarse lock. The same machinery, without the lock, is the
//! index of [`List`](crate::List) and [`SortedList`](crate::SortedList).

pub(crate) mod node;
pub(crate) mod raw;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use node::Placement;
use raw::RawTree;

use crate::InvariantError;

/// Per-instance configuration of a tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Options {
    /// Keep the tree balanced with AVL rotations. When `false`, the tree is
    /// a plain binary search tree and its shape follows insertion order.
    pub rebalance: bool,
    /// Accept items that compare equal to an item already in the tree.
    /// Equal items are kept in insertion order.
    pub allow_duplicates: bool,
}

impl Options {
    /// An AVL tree that rejects duplicates.
    pub const fn avl() -> Self {
        Options {
            rebalance: true,
            allow_duplicates: false,
        }
    }

    /// A plain, never rebalanced, binary search tree that rejects duplicates.
    pub const fn bst() -> Self {
        Options {
            rebalance: false,
            allow_duplicates: false,
        }
    }

    /// Returns the same options with the duplicate policy replaced.
    pub const fn allow_duplicates(self, allow_duplicates: bool) -> Self {
        Options {
            allow_duplicates,
            ..self
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::avl()
    }
}

/// A binary search tree safe to share between threads.
///
/// Every method takes the tree's lock once and holds it for the whole call.
/// "Not found" and "duplicate" are ordinary results, never panics.
///
///```
/// use avl_list::Tree;
///
/// let tree = Tree::avl();
/// for x in [10, 5, 3, 15, 7, 20] {
///     assert!(tree.insert(x));
/// }
/// assert!(!tree.insert(7));
/// assert_eq!(tree.len(), 6);
/// assert_eq!(tree.height(), 2);
/// assert_eq!(tree.delete(&15), Some(15));
/// assert_eq!(tree.search(&15), None);
/// # tree.validate().unwrap();
///```
pub struct Tree<T> {
    inner: Mutex<RawTree<T>>,
}

impl<T> Tree<T> {
    /// Creates an empty tree with the given [`Options`].
    pub fn new(options: Options) -> Self {
        Tree {
            inner: Mutex::new(RawTree::new(options)),
        }
    }

    /// Creates an empty AVL tree that rejects duplicates.
    pub fn avl() -> Self {
        Tree::new(Options::avl())
    }

    /// Creates an empty non-rebalancing tree that rejects duplicates.
    pub fn bst() -> Self {
        Tree::new(Options::bst())
    }

    // the graph is consistent whenever the lock is released, so a poisoned
    // lock carries no broken state
    fn lock(&self) -> MutexGuard<'_, RawTree<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the configuration the tree was created with.
    pub fn options(&self) -> Options {
        self.lock().options()
    }

    /// Returns the number of items in the tree.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the height of the root, `-1` for the empty tree.
    pub fn height(&self) -> i32 {
        self.lock().height()
    }

    /// Removes every item. The configuration is kept.
    pub fn clear(&self) {
        let mut tree = self.lock();
        log::debug!("clearing tree of {} items", tree.len());
        tree.clear();
    }
}

impl<T: Ord> Tree<T> {
    /// Inserts the item. Returns `false`, leaving the tree untouched, if an equal
    /// item is already present and duplicates are not allowed.
    pub fn insert(&self, item: T) -> bool {
        self.lock().insert_by(item, T::cmp)
    }

    /// Inserts the item like [`Tree::insert`], and also reports its in-order
    /// predecessor: the nearest item that is less than or equal to it.
    /// `O(log n)` for an AVL tree.
    ///
    ///```
    /// use avl_list::{Placement, Tree};
    ///
    /// let tree = Tree::avl();
    /// assert_eq!(tree.insert_adjacent(8), Placement::Minimum);
    /// assert_eq!(tree.insert_adjacent(2), Placement::Minimum);
    /// assert_eq!(tree.insert_adjacent(9), Placement::After(8));
    /// assert_eq!(tree.insert_adjacent(3), Placement::After(2));
    /// assert_eq!(tree.insert_adjacent(3), Placement::Rejected);
    ///```
    pub fn insert_adjacent(&self, item: T) -> Placement<T>
    where
        T: Clone,
    {
        self.lock().insert_adjacent_by(item, T::cmp)
    }

    /// Returns a clone of an item equal to `item`, if there is one.
    pub fn search(&self, item: &T) -> Option<T>
    where
        T: Clone,
    {
        self.lock().search_by(|existing| existing.cmp(item)).cloned()
    }

    /// Returns `true` if an item equal to `item` is in the tree.
    pub fn contains(&self, item: &T) -> bool {
        self.lock().search_by(|existing| existing.cmp(item)).is_some()
    }

    /// Removes an item equal to `item` and returns it.
    /// With duplicates, the one closest to the root is removed.
    pub fn delete(&self, item: &T) -> Option<T> {
        self.lock().delete_by(|existing| existing.cmp(item))
    }

    /// Returns the items in order, read under a single lock acquisition.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().iter().cloned().collect()
    }

    /// Checks every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.lock().check_by(T::cmp)
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Tree::avl()
    }
}

impl<T: Ord> std::iter::FromIterator<T> for Tree<T> {
    /// Builds an AVL tree that rejects duplicates. Repeated items are skipped.
    /// This takes `O(n log n)` time.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut raw = RawTree::new(Options::avl());
        for item in iter {
            raw.insert_by(item, T::cmp);
        }
        Tree {
            inner: Mutex::new(raw),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.lock().iter()).finish()
    }
}
