//! The unsynchronized state of a list: an arena of doubly linked nodes, the
//! endpoints, the cursor, and a tree that indexes the same nodes by item.
//!
//! The index stores arena slots, not items, so a node has a single owner (the
//! arena) and the tree only refers to it. Slots are ordered through the arena:
//! by item, and among equal items by a sequence number that grows with every
//! node created. New nodes always carry the largest sequence number, so an equal
//! item still lands to the right of the existing ones, and the exact node under
//! the cursor can be found again even when its item has duplicates.

use std::cmp::Ordering;

use crate::tree::raw::RawTree;
use crate::tree::{Options, Placement};
use crate::InvariantError;

const VACANT_SLOT: &str = "invariant violated: a linked or indexed slot is vacant";

pub(crate) struct Link<T> {
    prev: Option<usize>,
    next: Option<usize>,
    seq: u64,
    item: T,
}

/// Identifies a node across lock releases: a slot may be reused, the sequence
/// number is never reused.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Position {
    index: usize,
    seq: u64,
}

pub(crate) struct Links<T> {
    slots: Vec<Option<Link<T>>>,
    free_list: Vec<usize>,
    first: Option<usize>,
    last: Option<usize>,
    // `None` exactly when the list is empty
    cursor: Option<usize>,
    length: usize,
    // `None` for a plain list that is never searched by item
    index: Option<RawTree<usize>>,
    next_seq: u64,
}

fn link<T>(slots: &[Option<Link<T>>], index: usize) -> &Link<T> {
    slots[index].as_ref().expect(VACANT_SLOT)
}

/// The order the index is built with. Without duplicates items are unique, and
/// comparing items alone lets the tree detect a rejected duplicate.
fn key_order<T: Ord>(
    slots: &[Option<Link<T>>],
    allow_duplicates: bool,
) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a, b| {
        let (a, b) = (link(slots, *a), link(slots, *b));
        let order = a.item.cmp(&b.item);
        if allow_duplicates {
            order.then(a.seq.cmp(&b.seq))
        } else {
            order
        }
    }
}

impl<T> Links<T> {
    pub(crate) fn new(allow_duplicates: bool) -> Self {
        Links {
            slots: vec![],
            free_list: vec![],
            first: None,
            last: None,
            cursor: None,
            length: 0,
            index: Some(RawTree::new(
                Options::avl().allow_duplicates(allow_duplicates),
            )),
            next_seq: 0,
        }
    }

    /// A list without an index. Items need no ordering, every item is
    /// accepted, and searching walks the links.
    pub(crate) fn unindexed() -> Self {
        Links {
            index: None,
            ..Links::new(true)
        }
    }

    pub(crate) fn allows_duplicates(&self) -> bool {
        self.index
            .as_ref()
            .map_or(true, |index| index.options().allow_duplicates)
    }

    pub(crate) fn len(&self) -> usize {
        self.length
    }

    fn link(&self, index: usize) -> &Link<T> {
        link(&self.slots, index)
    }

    fn link_mut(&mut self, index: usize) -> &mut Link<T> {
        self.slots[index].as_mut().expect(VACANT_SLOT)
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn alloc(&mut self, item: T) -> usize {
        let link = Link {
            prev: None,
            next: None,
            seq: self.take_seq(),
            item,
        };
        if let Some(index) = self.free_list.pop() {
            self.slots[index] = Some(link);
            index
        } else {
            self.slots.push(Some(link));
            self.slots.len() - 1
        }
    }

    fn release(&mut self, index: usize) -> T {
        let link = self.slots[index].take().expect(VACANT_SLOT);
        self.free_list.push(index);
        link.item
    }

    /// Links the unlinked node `index` right after `pred`.
    fn splice_after(&mut self, pred: usize, index: usize) {
        let next = self.link(pred).next;
        let link = self.link_mut(index);
        link.prev = Some(pred);
        link.next = next;
        self.link_mut(pred).next = Some(index);
        match next {
            Some(next) => self.link_mut(next).prev = Some(index),
            None => self.last = Some(index),
        }
    }

    /// Links the unlinked node `index` right before `succ`.
    fn splice_before(&mut self, succ: usize, index: usize) {
        let prev = self.link(succ).prev;
        let link = self.link_mut(index);
        link.prev = prev;
        link.next = Some(succ);
        self.link_mut(succ).prev = Some(index);
        match prev {
            Some(prev) => self.link_mut(prev).next = Some(index),
            None => self.first = Some(index),
        }
    }

    /// Makes `index` the only node of the list.
    fn link_alone(&mut self, index: usize) {
        self.first = Some(index);
        self.last = Some(index);
    }

    /// Links the new node `index` after the cursor and moves the cursor onto it.
    fn attach_after(&mut self, index: usize) {
        match self.cursor {
            None => self.link_alone(index),
            Some(cursor) => self.splice_after(cursor, index),
        }
        self.cursor = Some(index);
        self.length += 1;
    }

    /// Links the new node `index` before the cursor and moves the cursor onto it.
    fn attach_before(&mut self, index: usize) {
        match self.cursor {
            None => self.link_alone(index),
            Some(cursor) => self.splice_before(cursor, index),
        }
        self.cursor = Some(index);
        self.length += 1;
    }

    /// Unlinks and frees the node `index`, moving the cursor to the first node.
    /// The node must already be out of the index.
    fn detach(&mut self, index: usize) -> T {
        self.unlink(index);
        self.cursor = self.first;
        self.length -= 1;
        self.release(index)
    }

    /// Slot numbers of the linked nodes, from first to last.
    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first, move |&at| self.link(at).next)
    }

    /// Adds the item after the cursor, in a list without an index.
    pub(crate) fn push_after(&mut self, item: T) {
        debug_assert!(self.index.is_none(), "indexed lists add through `add_after`");
        let index = self.alloc(item);
        self.attach_after(index);
    }

    /// Removes the item under the cursor, in a list without an index.
    pub(crate) fn take_current(&mut self) -> Option<T> {
        debug_assert!(self.index.is_none(), "indexed lists remove through `delete`");
        let cursor = self.cursor?;
        Some(self.detach(cursor))
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = {
            let link = self.link(index);
            (link.prev, link.next)
        };
        match prev {
            Some(prev) => self.link_mut(prev).next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.link_mut(next).prev = prev,
            None => self.last = prev,
        }
    }

    pub(crate) fn first(&mut self) {
        self.cursor = self.first;
    }

    pub(crate) fn last(&mut self) {
        self.cursor = self.last;
    }

    pub(crate) fn next(&mut self) -> bool {
        match self.cursor.and_then(|cursor| self.link(cursor).next) {
            Some(next) => {
                self.cursor = Some(next);
                true
            }
            None => false,
        }
    }

    pub(crate) fn prev(&mut self) -> bool {
        match self.cursor.and_then(|cursor| self.link(cursor).prev) {
            Some(prev) => {
                self.cursor = Some(prev);
                true
            }
            None => false,
        }
    }

    pub(crate) fn get(&self) -> Option<&T> {
        self.cursor.map(|cursor| &self.link(cursor).item)
    }

    pub(crate) fn advance(&mut self) -> Option<&T> {
        if self.next() {
            self.get()
        } else {
            None
        }
    }

    pub(crate) fn rewind(&mut self) -> Option<&T> {
        if self.prev() {
            self.get()
        } else {
            None
        }
    }

    /// Drops every node. The duplicate policy is kept.
    pub(crate) fn clear(&mut self) {
        log::debug!("clearing list of {} items", self.len());
        if let Some(index) = &mut self.index {
            index.clear();
        }
        self.length = 0;
        self.slots.clear();
        self.free_list.clear();
        self.first = None;
        self.last = None;
        self.cursor = None;
    }

    /// Iterates over the items from first to last.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            links: self,
            next: self.first,
        }
    }

    pub(crate) fn position(&self, index: Option<usize>) -> Option<Position> {
        index.map(|index| Position {
            index,
            seq: self.link(index).seq,
        })
    }

    pub(crate) fn first_position(&self) -> Option<Position> {
        self.position(self.first)
    }

    pub(crate) fn cursor_position(&self) -> Option<Position> {
        self.position(self.cursor)
    }

    /// Returns the node at `at` if it is still linked.
    pub(crate) fn live(&self, at: Position) -> Option<&T> {
        match self.slots.get(at.index) {
            Some(Some(link)) if link.seq == at.seq => Some(&link.item),
            _ => None,
        }
    }

    /// Returns the position of the successor of a live node.
    pub(crate) fn next_position(&self, at: Position) -> Option<Position> {
        self.live(at)?;
        self.position(self.link(at.index).next)
    }

    /// Moves the cursor back to a node, if it is still linked.
    pub(crate) fn restore_cursor(&mut self, at: Position) {
        if self.live(at).is_some() {
            self.cursor = Some(at.index);
        }
    }

    /// Checks the links, the endpoints, the cursor and the length.
    /// Returns which slots are linked.
    pub(crate) fn check_chain(&self) -> Result<Vec<bool>, InvariantError> {
        let mut linked = vec![false; self.slots.len()];
        let mut count = 0;
        let mut prev = None;
        let mut at = self.first;
        while let Some(index) = at {
            let link = match self.slots.get(index) {
                Some(Some(link)) if !linked[index] => link,
                _ => return Err(InvariantError::BrokenLink { index }),
            };
            if link.prev != prev {
                return Err(InvariantError::BrokenLink { index });
            }
            linked[index] = true;
            count += 1;
            prev = at;
            at = link.next;
        }
        if prev != self.last {
            return Err(InvariantError::BadEndpoints);
        }
        match self.cursor {
            Some(cursor) if !linked.get(cursor).copied().unwrap_or(false) => {
                return Err(InvariantError::DanglingCursor)
            }
            None if count > 0 => return Err(InvariantError::DanglingCursor),
            _ => (),
        }

        if self.length != count {
            return Err(InvariantError::LengthMismatch {
                recorded: self.length,
                counted: count,
            });
        }
        Ok(linked)
    }
}

impl<T: Ord> Links<T> {
    fn index_insert(&mut self, index: usize) -> bool {
        let allow_duplicates = self.allows_duplicates();
        match &mut self.index {
            Some(tree) => tree.insert_by(index, key_order(&self.slots, allow_duplicates)),
            None => true,
        }
    }

    /// Removes exactly the node `index` from the index.
    fn index_remove(&mut self, index: usize) {
        let slots = &self.slots;
        let tree = match &mut self.index {
            Some(tree) => tree,
            None => return,
        };
        let target = link(slots, index);
        let removed = tree.delete_by(|existing| {
            let existing = link(slots, *existing);
            existing
                .item
                .cmp(&target.item)
                .then(existing.seq.cmp(&target.seq))
        });
        debug_assert_eq!(removed, Some(index));
    }

    pub(crate) fn add_after(&mut self, item: T) -> bool {
        let index = self.alloc(item);
        if !self.index_insert(index) {
            self.release(index);
            return false;
        }
        self.attach_after(index);
        true
    }

    pub(crate) fn add_before(&mut self, item: T) -> bool {
        let index = self.alloc(item);
        if !self.index_insert(index) {
            self.release(index);
            return false;
        }
        self.attach_before(index);
        true
    }

    /// Inserts in sorted position, found by the index in `O(log n)`.
    pub(crate) fn add_sorted(&mut self, item: T) -> bool {
        let index = self.alloc(item);
        let allow_duplicates = self.allows_duplicates();
        let slots = &self.slots;
        let indexed = self
            .index
            .as_mut()
            .map(|tree| tree.insert_adjacent_by(index, key_order(slots, allow_duplicates)));
        let placement = match indexed {
            Some(placement) => placement,
            None => self.scan_placement(index),
        };
        match placement {
            Placement::Rejected => {
                self.release(index);
                return false;
            }
            Placement::Minimum => {
                self.cursor = self.first;
                self.attach_before(index);
            }
            Placement::After(pred) => {
                self.cursor = Some(pred);
                self.attach_after(index);
            }
        }
        true
    }

    /// Where the unlinked node `index` goes in a sorted list without an index:
    /// after the last node whose item is not greater. Every item is accepted.
    fn scan_placement(&self, index: usize) -> Placement<usize> {
        let item = &self.link(index).item;
        self.indices()
            .take_while(|&at| self.link(at).item <= *item)
            .last()
            .map_or(Placement::Minimum, Placement::After)
    }

    /// Gives the node under the cursor a new item, and a fresh sequence number,
    /// as if a new node took its place. The index is updated by removing and
    /// reinserting the node, since its position depends on the item.
    pub(crate) fn replace(&mut self, item: T) -> bool {
        let cursor = match self.cursor {
            None => return false,
            Some(cursor) => cursor,
        };
        self.index_remove(cursor);
        let seq = self.take_seq();
        let link = self.link_mut(cursor);
        let old_item = std::mem::replace(&mut link.item, item);
        let old_seq = std::mem::replace(&mut link.seq, seq);
        if self.index_insert(cursor) {
            return true;
        }

        // rejected as a duplicate: put the old item back
        let link = self.link_mut(cursor);
        link.item = old_item;
        link.seq = old_seq;
        let reinserted = self.index_insert(cursor);
        debug_assert!(reinserted);
        false
    }

    /// Removes the node under the cursor and moves the cursor to the first node.
    pub(crate) fn delete(&mut self) -> Option<T> {
        let cursor = self.cursor?;
        self.index_remove(cursor);
        Some(self.detach(cursor))
    }

    /// Moves the cursor to a node whose item equals `item`.
    pub(crate) fn search(&mut self, item: &T) -> Option<&T> {
        let slots = &self.slots;
        let found = match &self.index {
            Some(tree) => *tree.search_by(|existing| link(slots, *existing).item.cmp(item))?,
            None => self.indices().find(|&at| self.link(at).item == *item)?,
        };
        self.cursor = Some(found);
        Some(&self.link(found).item)
    }

    /// Checks the chain, and that the index holds exactly the linked nodes,
    /// in order and balanced.
    pub(crate) fn check(&self) -> Result<(), InvariantError> {
        let linked = self.check_chain()?;
        let tree = match &self.index {
            Some(tree) => tree,
            None => return Ok(()),
        };
        let mut indexed = vec![0; self.slots.len()];
        for &index in tree.iter() {
            match indexed.get_mut(index) {
                Some(times) => *times += 1,
                None => return Err(InvariantError::IndexMismatch { index, count: 1 }),
            }
        }
        for (index, (&times, &linked)) in indexed.iter().zip(linked.iter()).enumerate() {
            if times != usize::from(linked) {
                return Err(InvariantError::IndexMismatch { index, count: times });
            }
        }
        tree.check_by(key_order(&self.slots, self.allows_duplicates()))
    }
}

/// Iterator over the items of a list, from first to last.
pub(crate) struct Iter<'a, T> {
    links: &'a Links<T>,
    next: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.links.link(self.next?);
        self.next = link.next;
        Some(&link.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unindexed_list_walks_the_links() {
        let mut links = Links::unindexed();
        assert!(links.allows_duplicates());
        for x in [5, 1, 5, 3] {
            assert!(links.add_sorted(x));
            assert_eq!(links.get(), Some(&x));
        }
        assert_eq!(links.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 5]);
        assert_eq!(links.search(&3), Some(&3));
        assert_eq!(links.search(&4), None);
        assert_eq!(links.get(), Some(&3));
        assert_eq!(links.delete(), Some(3));
        assert_eq!(links.len(), 3);
        links.check().unwrap();

        links.last();
        links.push_after(0);
        links.first();
        assert_eq!(links.take_current(), Some(1));
        assert_eq!(links.iter().copied().collect::<Vec<_>>(), vec![5, 5, 0]);
        links.check().unwrap();
    }

    #[test]
    fn length_is_checked_against_the_links() {
        let mut links = Links::new(false);
        links.add_after(1);
        links.add_after(2);
        links.length = 3;
        assert_eq!(
            links.check(),
            Err(InvariantError::LengthMismatch {
                recorded: 3,
                counted: 2
            })
        );
    }
}
