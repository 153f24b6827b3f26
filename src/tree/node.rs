//! Boxed tree nodes, rotations, and the algorithms shared by
//! [`Tree`](super::Tree) and the index inside [`List`](crate::List).
//!
//! Every structural operation here consumes the subtree it works on and returns
//! the (possibly different) root of the rebuilt subtree. The caller stores the
//! result back into the slot it took the subtree from, so there is never more
//! than one owner of a node.

use std::cmp::Ordering;

use super::Options;

/// Heights are signed so that the empty tree can have height `-1`.
pub(crate) type Height = i32;

/// A binary tree. might be empty.
pub(crate) enum Subtree<K> {
    Empty,
    Root(Box<Node<K>>),
}
use Subtree::*;

/// A single node. Owns both of its subtrees; there is no parent pointer.
pub(crate) struct Node<K> {
    pub(crate) left: Subtree<K>,
    pub(crate) right: Subtree<K>,
    height: Height,
    pub(crate) item: K,
}

/// Where a newly inserted item landed, relative to the items already in the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Placement<K> {
    /// The item compared equal to an existing one and duplicates are not allowed.
    /// Nothing was inserted.
    Rejected,
    /// The item was inserted and is now the smallest item of the tree.
    Minimum,
    /// The item was inserted right after the given in-order predecessor.
    After(K),
}

impl<K> Placement<K> {
    /// Returns `true` unless the insertion was rejected.
    pub fn is_inserted(&self) -> bool {
        !matches!(self, Placement::Rejected)
    }

    /// Returns the in-order predecessor of the inserted item, if it has one.
    pub fn predecessor(&self) -> Option<&K> {
        match self {
            Placement::After(pred) => Some(pred),
            _ => None,
        }
    }
}

/// For implementing `height`, `height_diff` and `rebuild_height` for
/// subtrees and nodes alike.
pub(crate) trait Balance {
    fn height(&self) -> Height;

    /// Returns `left.height() - right.height()`
    fn height_diff(&self) -> Height;

    /// Returns `true` if the cached height had to be updated,
    /// `false` if it was correct.
    fn rebuild_height(&mut self) -> bool;
}

impl<K> Balance for Subtree<K> {
    fn height(&self) -> Height {
        match self {
            Empty => -1,
            Root(node) => node.height,
        }
    }

    fn height_diff(&self) -> Height {
        match self {
            Empty => 0,
            Root(node) => node.height_diff(),
        }
    }

    fn rebuild_height(&mut self) -> bool {
        match self {
            Empty => false,
            Root(node) => node.rebuild_height(),
        }
    }
}

impl<K> Balance for Node<K> {
    fn height(&self) -> Height {
        self.height
    }

    fn height_diff(&self) -> Height {
        self.left.height() - self.right.height()
    }

    fn rebuild_height(&mut self) -> bool {
        let new_height = std::cmp::max(self.left.height(), self.right.height()) + 1;
        let changed = self.height != new_height;
        self.height = new_height;
        changed
    }
}

impl<K> Default for Subtree<K> {
    fn default() -> Self {
        Empty
    }
}

impl<K> Subtree<K> {
    pub(crate) fn node(&self) -> Option<&Node<K>> {
        match self {
            Empty => None,
            Root(node) => Some(node),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Empty)
    }

    pub(crate) fn into_node_boxed(self) -> Option<Box<Node<K>>> {
        match self {
            Empty => None,
            Root(node) => Some(node),
        }
    }

    /// Iterates over the items in order.
    pub(crate) fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }
}

impl<K> Node<K> {
    pub(crate) fn new(item: K) -> Node<K> {
        Node {
            left: Empty,
            right: Empty,
            height: 0,
            item,
        }
    }
}

/// Promotes the left son. Returns the node unchanged if it has no left son.
pub(crate) fn rotate_right<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    let mut new_root = match std::mem::take(&mut node.left).into_node_boxed() {
        Some(left) => left,
        None => return node,
    };
    node.left = std::mem::take(&mut new_root.right);
    node.rebuild_height();
    new_root.right = Root(node);
    new_root.rebuild_height();
    new_root
}

/// Promotes the right son. Returns the node unchanged if it has no right son.
pub(crate) fn rotate_left<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    let mut new_root = match std::mem::take(&mut node.right).into_node_boxed() {
        Some(right) => right,
        None => return node,
    };
    node.right = std::mem::take(&mut new_root.left);
    node.rebuild_height();
    new_root.left = Root(node);
    new_root.rebuild_height();
    new_root
}

/// Rotates the left son left, then the node right.
pub(crate) fn rotate_left_right<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    if let Some(left) = std::mem::take(&mut node.left).into_node_boxed() {
        node.left = Root(rotate_left(left));
    }
    rotate_right(node)
}

/// Rotates the right son right, then the node left.
pub(crate) fn rotate_right_left<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    if let Some(right) = std::mem::take(&mut node.right).into_node_boxed() {
        node.right = Root(rotate_right(right));
    }
    rotate_left(node)
}

/// Restores the AVL invariant at `node`, assuming both of its subtrees
/// already satisfy it and their heights differ by at most 2.
pub(crate) fn rebalance<K>(mut node: Box<Node<K>>) -> Box<Node<K>> {
    match node.height_diff() {
        2 => {
            // left is deeper
            let inner_heavy = match node.left.node() {
                Some(left) => left.left.height() < left.right.height(),
                None => false,
            };
            if inner_heavy {
                log::trace!("rebalance: left-right rotation");
                node = rotate_left_right(node);
            } else {
                log::trace!("rebalance: right rotation");
                node = rotate_right(node);
            }
        }
        -2 => {
            // right is deeper
            let inner_heavy = match node.right.node() {
                Some(right) => right.right.height() < right.left.height(),
                None => false,
            };
            if inner_heavy {
                log::trace!("rebalance: right-left rotation");
                node = rotate_right_left(node);
            } else {
                log::trace!("rebalance: left rotation");
                node = rotate_left(node);
            }
        }
        _ => (),
    }
    node.rebuild_height();
    node
}

/// Called on every node of the path back up after a structural change.
fn settle<K>(mut node: Box<Node<K>>, options: Options) -> Box<Node<K>> {
    if options.rebalance {
        rebalance(node)
    } else {
        node.rebuild_height();
        node
    }
}

/// Which son of a node a descent went to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

impl<K> Node<K> {
    fn son_mut(&mut self, side: Side) -> &mut Subtree<K> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// The nodes from the root down to the current position, each one detached from
/// its parent together with the side the descent took from it.
///
/// Walking down with an explicit path instead of recursion keeps the call
/// stack flat, so a non-rebalancing tree of linear depth is handled like any
/// other.
struct Path<K> {
    nodes: Vec<(Box<Node<K>>, Side)>,
}

impl<K> Path<K> {
    fn new() -> Self {
        Path { nodes: vec![] }
    }

    /// Detaches the son of `node` on `side` and returns it.
    /// `node` is kept on the path, to be reattached on the way back up.
    fn descend(&mut self, mut node: Box<Node<K>>, side: Side) -> Subtree<K> {
        let son = std::mem::take(node.son_mut(side));
        self.nodes.push((node, side));
        son
    }

    /// Reattaches every node on the path above `tree`, unchanged, and returns
    /// the root.
    fn reattach(mut self, mut tree: Subtree<K>) -> Subtree<K> {
        while let Some((mut node, side)) = self.nodes.pop() {
            *node.son_mut(side) = tree;
            tree = Root(node);
        }
        tree
    }

    /// Reattaches every node on the path above `tree`, which replaced the
    /// subtree the path led to, settling each node on the way up.
    /// Once a subtree comes out with the height it had before, nothing above
    /// it can change, and the remaining nodes are only reattached.
    fn settle_up(mut self, mut tree: Subtree<K>, options: Options) -> Subtree<K> {
        while let Some((mut node, side)) = self.nodes.pop() {
            let before = node.height;
            *node.son_mut(side) = tree;
            let node = settle(node, options);
            let changed = node.height != before;
            tree = Root(node);
            if !changed {
                return self.reattach(tree);
            }
        }
        tree
    }
}

/// Inserts `item` below `tree`. `cmp(new, existing)` decides the direction:
/// smaller items go left, larger ones right, and equal ones right as well
/// when duplicates are allowed (so equal items keep their insertion order).
/// Returns the new root of the subtree and whether the item was inserted.
pub(crate) fn insert<K, F>(tree: Subtree<K>, item: K, cmp: &F, options: Options) -> (Subtree<K>, bool)
where
    F: Fn(&K, &K) -> Ordering,
{
    let mut path = Path::new();
    let mut current = tree;
    while let Root(node) = current {
        let side = match cmp(&item, &node.item) {
            Ordering::Equal if !options.allow_duplicates => {
                return (path.reattach(Root(node)), false);
            }
            Ordering::Less => Side::Left,
            _ => Side::Right,
        };
        current = path.descend(node, side);
    }
    let leaf = Root(Box::new(Node::new(item)));
    (path.settle_up(leaf, options), true)
}

/// Same descent as [`insert`], but also reports the in-order predecessor of the
/// new item: the deepest node on the path from which the descent went right.
pub(crate) fn insert_adjacent<K, F>(
    tree: Subtree<K>,
    item: K,
    cmp: &F,
    options: Options,
) -> (Subtree<K>, Placement<K>)
where
    K: Clone,
    F: Fn(&K, &K) -> Ordering,
{
    let mut path = Path::new();
    // position on the path of the deepest node the descent left to the right
    let mut last_right = None;
    let mut current = tree;
    while let Root(node) = current {
        let side = match cmp(&item, &node.item) {
            Ordering::Equal if !options.allow_duplicates => {
                return (path.reattach(Root(node)), Placement::Rejected);
            }
            Ordering::Less => Side::Left,
            _ => {
                last_right = Some(path.nodes.len());
                Side::Right
            }
        };
        current = path.descend(node, side);
    }
    let placement = match last_right {
        Some(at) => Placement::After(path.nodes[at].0.item.clone()),
        None => Placement::Minimum,
    };
    let leaf = Root(Box::new(Node::new(item)));
    (path.settle_up(leaf, options), placement)
}

/// Finds an item for which `probe` returns [`Ordering::Equal`].
/// `probe(existing)` compares an item of the tree against the target.
pub(crate) fn search<'a, K, F>(mut tree: &'a Subtree<K>, probe: F) -> Option<&'a K>
where
    F: Fn(&K) -> Ordering,
{
    while let Root(node) = tree {
        match probe(&node.item) {
            Ordering::Equal => return Some(&node.item),
            Ordering::Less => tree = &node.right,
            Ordering::Greater => tree = &node.left,
        }
    }
    None
}

/// Removes the first item on the search path for which `probe` returns
/// [`Ordering::Equal`]. A node with two sons is replaced by its in-order
/// successor.
pub(crate) fn delete<K, F>(tree: Subtree<K>, probe: &F, options: Options) -> (Subtree<K>, Option<K>)
where
    F: Fn(&K) -> Ordering,
{
    let mut path = Path::new();
    let mut current = tree;
    let mut node = loop {
        let node = match current {
            Empty => return (path.reattach(Empty), None),
            Root(node) => node,
        };
        let side = match probe(&node.item) {
            Ordering::Equal => break node,
            Ordering::Less => Side::Right,
            Ordering::Greater => Side::Left,
        };
        current = path.descend(node, side);
    };

    let left = std::mem::take(&mut node.left);
    let right = std::mem::take(&mut node.right);
    let Node { item, .. } = *node;
    let replacement = match (left, right) {
        (Empty, right) => right,
        (left, Empty) => left,
        (left, Root(right)) => {
            let (right, mut successor) = remove_min(right, options);
            successor.left = left;
            successor.right = right;
            Root(settle(successor, options))
        }
    };
    (path.settle_up(replacement, options), Some(item))
}

/// Detaches the leftmost node of the subtree. Returns the remaining subtree
/// and the detached node, whose sons are both empty.
fn remove_min<K>(mut node: Box<Node<K>>, options: Options) -> (Subtree<K>, Box<Node<K>>) {
    let mut path = Path::new();
    while let Root(left) = std::mem::take(&mut node.left) {
        path.nodes.push((node, Side::Left));
        node = left;
    }
    let rest = std::mem::take(&mut node.right);
    (path.settle_up(rest, options), node)
}

/// The derived deallocation of [`Subtree`] is recursive, and a non-rebalancing
/// tree can have linear depth. This drops the subtree with an explicit stack instead.
pub(crate) fn deallocate_iteratively<K>(tree: &mut Subtree<K>) {
    let mut stack: Vec<Box<Node<K>>> = vec![];
    if let Some(node) = std::mem::take(tree).into_node_boxed() {
        stack.push(node);
    }
    while let Some(mut node) = stack.pop() {
        if let Some(left) = std::mem::take(&mut node.left).into_node_boxed() {
            stack.push(left);
        }
        if let Some(right) = std::mem::take(&mut node.right).into_node_boxed() {
            stack.push(right);
        }
    }
}

/// In-order iterator over the items of a subtree.
pub(crate) struct Iter<'a, K> {
    // nodes whose left subtree has been pushed but whose item was not yielded yet
    stack: Vec<&'a Node<K>>,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a Subtree<K>) -> Self {
        let mut res = Iter { stack: vec![] };
        res.push_left_spine(tree);
        res
    }

    fn push_left_spine(&mut self, mut tree: &'a Subtree<K>) {
        while let Root(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(&node.item)
    }
}
