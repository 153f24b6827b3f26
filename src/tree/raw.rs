//! The unsynchronized tree: a root, a length and the configuration flags.
//! Ordering is passed in per call, so the same structure can index plain items
//! ([`Tree`](super::Tree)) or handles that are only comparable through the
//! storage they point into (the index of [`List`](crate::List)).

use std::cmp::Ordering;

use super::node::{self, Balance, Height, Node, Placement, Subtree};
use super::Options;
use crate::InvariantError;

pub(crate) struct RawTree<K> {
    root: Subtree<K>,
    length: usize,
    options: Options,
}

impl<K> RawTree<K> {
    pub(crate) fn new(options: Options) -> Self {
        RawTree {
            root: Subtree::Empty,
            length: 0,
            options,
        }
    }

    pub(crate) fn options(&self) -> Options {
        self.options
    }

    pub(crate) fn len(&self) -> usize {
        self.length
    }

    pub(crate) fn height(&self) -> Height {
        self.root.height()
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Subtree<K> {
        &self.root
    }

    pub(crate) fn iter(&self) -> node::Iter<'_, K> {
        self.root.iter()
    }

    pub(crate) fn insert_by<F>(&mut self, item: K, cmp: F) -> bool
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let root = std::mem::take(&mut self.root);
        let (root, inserted) = node::insert(root, item, &cmp, self.options);
        self.root = root;
        if inserted {
            self.length += 1;
        } else {
            log::trace!("insert rejected: equal item present and duplicates are off");
        }
        inserted
    }

    pub(crate) fn insert_adjacent_by<F>(&mut self, item: K, cmp: F) -> Placement<K>
    where
        K: Clone,
        F: Fn(&K, &K) -> Ordering,
    {
        let root = std::mem::take(&mut self.root);
        let (root, placement) = node::insert_adjacent(root, item, &cmp, self.options);
        self.root = root;
        if placement.is_inserted() {
            self.length += 1;
        } else {
            log::trace!("insert rejected: equal item present and duplicates are off");
        }
        placement
    }

    pub(crate) fn search_by<F>(&self, probe: F) -> Option<&K>
    where
        F: Fn(&K) -> Ordering,
    {
        node::search(&self.root, probe)
    }

    pub(crate) fn delete_by<F>(&mut self, probe: F) -> Option<K>
    where
        F: Fn(&K) -> Ordering,
    {
        let root = std::mem::take(&mut self.root);
        let (root, deleted) = node::delete(root, &probe, self.options);
        self.root = root;
        if deleted.is_some() {
            self.length -= 1;
        }
        deleted
    }

    /// Drops every node. The configuration is kept.
    pub(crate) fn clear(&mut self) {
        node::deallocate_iteratively(&mut self.root);
        self.length = 0;
    }

    /// Checks order, cached heights, balance (if rebalancing) and the length.
    pub(crate) fn check_by<F>(&self, cmp: F) -> Result<(), InvariantError>
    where
        F: Fn(&K, &K) -> Ordering,
    {
        let mut prev: Option<&K> = None;
        let mut counted = 0;
        for (position, item) in self.iter().enumerate() {
            if let Some(prev) = prev {
                match cmp(prev, item) {
                    Ordering::Greater => return Err(InvariantError::OutOfOrder { position }),
                    Ordering::Equal if !self.options.allow_duplicates => {
                        return Err(InvariantError::UnexpectedDuplicate { position })
                    }
                    _ => (),
                }
            }
            prev = Some(item);
            counted += 1;
        }
        if counted != self.length {
            return Err(InvariantError::LengthMismatch {
                recorded: self.length,
                counted,
            });
        }
        check_heights(&self.root, self.options.rebalance)?;
        Ok(())
    }
}

/// A step of the post-order walk in [`check_heights`].
enum Visit<'a, K> {
    /// Look at a subtree for the first time.
    Enter(&'a Subtree<K>, usize),
    /// Both sons of the node are done and their heights are on the stack.
    Leave(&'a Node<K>, usize),
}

/// Walks the tree in post-order with an explicit stack, computing each actual
/// height from the sons' and comparing it to the cached one.
fn check_heights<K>(tree: &Subtree<K>, balanced: bool) -> Result<(), InvariantError> {
    let mut visits = vec![Visit::Enter(tree, 0)];
    // actual heights of the finished subtrees, left above right
    let mut heights: Vec<Height> = vec![];
    while let Some(visit) = visits.pop() {
        match visit {
            Visit::Enter(subtree, depth) => match subtree.node() {
                None => heights.push(-1),
                Some(node) => {
                    visits.push(Visit::Leave(node, depth));
                    visits.push(Visit::Enter(&node.right, depth + 1));
                    visits.push(Visit::Enter(&node.left, depth + 1));
                }
            },
            Visit::Leave(node, depth) => {
                let right = heights.pop().unwrap_or(-1);
                let left = heights.pop().unwrap_or(-1);
                let actual = std::cmp::max(left, right) + 1;
                if node.height() != actual {
                    return Err(InvariantError::StaleHeight {
                        depth,
                        cached: node.height(),
                        actual,
                    });
                }
                if balanced && (left - right).abs() > 1 {
                    return Err(InvariantError::Unbalanced { depth, left, right });
                }
                heights.push(actual);
            }
        }
    }
    Ok(())
}

impl<K> Drop for RawTree<K> {
    fn drop(&mut self) {
        node::deallocate_iteratively(&mut self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPTH: usize = 1_000_000;

    /// A right-leaning chain of `0..len`, built bottom up in linear time.
    fn chain(len: usize) -> RawTree<usize> {
        let mut root = Subtree::Empty;
        for x in (0..len).rev() {
            let mut node = Box::new(Node::new(x));
            node.right = root;
            node.rebuild_height();
            root = Subtree::Root(node);
        }
        RawTree {
            root,
            length: len,
            options: Options::bst(),
        }
    }

    #[test]
    fn deep_chain_keeps_stack_flat() {
        let mut tree = chain(DEPTH);
        assert_eq!(tree.height(), (DEPTH - 1) as Height);
        tree.check_by(usize::cmp).unwrap();

        assert!(tree.insert_by(DEPTH, usize::cmp));
        assert!(!tree.insert_by(DEPTH, usize::cmp));
        assert_eq!(tree.height(), DEPTH as Height);
        assert_eq!(
            tree.insert_adjacent_by(DEPTH + 1, usize::cmp),
            Placement::After(DEPTH)
        );
        assert_eq!(tree.search_by(|x| x.cmp(&(DEPTH - 1))), Some(&(DEPTH - 1)));

        // the bottom, then the root, which has a single son
        assert_eq!(tree.delete_by(|x| x.cmp(&(DEPTH + 1))), Some(DEPTH + 1));
        assert_eq!(tree.delete_by(|x| x.cmp(&0)), Some(0));
        assert_eq!(tree.delete_by(|x| x.cmp(&(2 * DEPTH))), None);
        assert_eq!(tree.len(), DEPTH);
        assert_eq!(tree.height(), (DEPTH - 1) as Height);
        tree.check_by(usize::cmp).unwrap();
    }

    #[test]
    fn deep_successor_is_detached() {
        // root 1 with a left leaf 0, and a left-leaning spine 2..DEPTH on the
        // right, so the successor of the root is at the bottom of the spine
        let mut spine = Subtree::Empty;
        for x in 2..DEPTH {
            let mut node = Box::new(Node::new(x));
            node.left = spine;
            node.rebuild_height();
            spine = Subtree::Root(node);
        }
        let mut root = Box::new(Node::new(1));
        root.left = Subtree::Root(Box::new(Node::new(0)));
        root.right = spine;
        root.rebuild_height();
        let mut tree = RawTree {
            root: Subtree::Root(root),
            length: DEPTH,
            options: Options::bst(),
        };
        tree.check_by(usize::cmp).unwrap();

        assert_eq!(tree.delete_by(|x| x.cmp(&1)), Some(1));
        assert_eq!(tree.root().node().map(|node| node.item), Some(2));
        assert_eq!(tree.len(), DEPTH - 1);
        assert_eq!(tree.height(), (DEPTH - 3) as Height);
        tree.check_by(usize::cmp).unwrap();
    }

    #[test]
    fn stale_height_is_reported() {
        let mut tree = chain(3);
        // hang 3 below 2 without updating any cached height
        if let Subtree::Root(zero) = &mut tree.root {
            if let Subtree::Root(one) = &mut zero.right {
                if let Subtree::Root(two) = &mut one.right {
                    two.right = Subtree::Root(Box::new(Node::new(3)));
                }
            }
        }
        tree.length = 4;
        assert_eq!(
            tree.check_by(usize::cmp),
            Err(InvariantError::StaleHeight {
                depth: 2,
                cached: 0,
                actual: 1
            })
        );
    }
}
