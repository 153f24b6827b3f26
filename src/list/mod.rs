//! The list module.
//! A doubly linked list with a movable cursor, indexed by an AVL tree over the
//! same nodes, so that search is `O(log n)` while the list keeps its own order.

mod links;
pub mod sorted;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) use links::Links;

use crate::InvariantError;

/// A doubly linked list with an internal cursor, safe to share between threads.
///
/// New items are linked next to the cursor, and the cursor moves onto them.
/// Every node is also kept in an AVL index ordered by item, which makes
/// [`List::search`] logarithmic. If the list rejects duplicates, adding an item
/// equal to one already present fails and leaves the list untouched.
///
/// Each method holds the list's lock for the whole call, except
/// [`List::for_each`] (and [`List::map`], [`List::filter`], which use it),
/// which releases the lock while the callback runs.
///
///```
/// use avl_list::List;
///
/// let list = List::new(true);
/// for x in 1..=5 {
///     list.add_after(x);
/// }
///
/// list.first();
/// let mut items = vec![];
/// let mut current = list.get();
/// while let Some(x) = current {
///     items.push(x);
///     current = list.advance();
/// }
/// assert_eq!(items, vec![1, 2, 3, 4, 5]);
///
/// assert_eq!(list.search(&4), Some(4));
/// assert_eq!(list.delete(), Some(4));
/// assert_eq!(list.get(), Some(1));
/// # list.validate().unwrap();
///```
pub struct List<T> {
    links: Mutex<Links<T>>,
}

impl<T> List<T> {
    /// Creates an empty list. `allow_duplicates` decides whether items that
    /// compare equal to an existing item are accepted.
    pub fn new(allow_duplicates: bool) -> Self {
        List {
            links: Mutex::new(Links::new(allow_duplicates)),
        }
    }

    /// Creates an empty list without the item index. It accepts any item type
    /// and every item, for the adapters that only work at the ends.
    pub(crate) fn unindexed() -> Self {
        List {
            links: Mutex::new(Links::unindexed()),
        }
    }

    // every operation leaves the links consistent before user code can run,
    // so a poisoned lock carries no broken state
    pub(crate) fn lock(&self) -> MutexGuard<'_, Links<T>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if items equal to an existing item are accepted.
    pub fn allows_duplicates(&self) -> bool {
        self.lock().allows_duplicates()
    }

    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the cursor to the first item.
    pub fn first(&self) {
        self.lock().first();
    }

    /// Moves the cursor to the last item.
    pub fn last(&self) {
        self.lock().last();
    }

    /// Moves the cursor one item forward. Returns `false` without moving
    /// if the cursor is on the last item or the list is empty.
    pub fn next(&self) -> bool {
        self.lock().next()
    }

    /// Moves the cursor one item back. Returns `false` without moving
    /// if the cursor is on the first item or the list is empty.
    pub fn prev(&self) -> bool {
        self.lock().prev()
    }

    /// Removes every item. The duplicate policy is kept.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Clone> List<T> {
    /// Returns the item under the cursor.
    pub fn get(&self) -> Option<T> {
        self.lock().get().cloned()
    }

    /// Moves the cursor one item forward and returns the item there.
    /// Returns [`None`] without moving if there is no next item.
    pub fn advance(&self) -> Option<T> {
        self.lock().advance().cloned()
    }

    /// Moves the cursor one item back and returns the item there.
    /// Returns [`None`] without moving if there is no previous item.
    pub fn rewind(&self) -> Option<T> {
        self.lock().rewind().cloned()
    }

    /// Returns the items from first to last, read under a single lock acquisition.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }

    /// Calls `visit` on every item from first to last. The cursor is left where
    /// it was.
    ///
    /// The lock is released while `visit` runs, so `visit` may call back into
    /// this list. The price is that there is no snapshot: if another caller
    /// changes the list meanwhile, the traversal follows the links as they are
    /// when it steps from one node to the next. If the node being visited is
    /// removed, the traversal continues from the node that followed it when it
    /// was visited, or stops if that one is gone too.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(T),
    {
        let (saved, mut step) = {
            let links = self.lock();
            (links.cursor_position(), links.first_position())
        };

        while let Some(at) = step {
            let (item, ahead) = {
                let links = self.lock();
                match links.live(at) {
                    Some(item) => (item.clone(), links.next_position(at)),
                    None => break,
                }
            };

            visit(item);

            let links = self.lock();
            step = if links.live(at).is_some() {
                links.next_position(at)
            } else {
                log::debug!("for_each: visited node was removed, continuing from its old successor");
                ahead
            };
        }

        if let Some(saved) = saved {
            self.lock().restore_cursor(saved);
        }
    }
}

impl<T: Ord> List<T> {
    /// Adds the item after the cursor and moves the cursor onto it.
    /// Returns `false` if it is a rejected duplicate.
    pub fn add_after(&self, item: T) -> bool {
        self.lock().add_after(item)
    }

    /// Adds the item before the cursor and moves the cursor onto it.
    /// Returns `false` if it is a rejected duplicate.
    pub fn add_before(&self, item: T) -> bool {
        self.lock().add_before(item)
    }

    /// Replaces the item under the cursor, keeping its place in the list.
    /// Returns `false` if the list is empty, or if duplicates are not allowed
    /// and another node holds an equal item; the list is unchanged then.
    pub fn replace(&self, item: T) -> bool {
        self.lock().replace(item)
    }

    /// Removes the item under the cursor and returns it.
    /// The cursor moves to the first item.
    pub fn delete(&self) -> Option<T> {
        self.lock().delete()
    }

    /// Checks the links, the cursor and the index.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.lock().check()
    }
}

impl<T: Ord + Clone> List<T> {
    /// Finds an item equal to `item` in `O(log n)` and moves the cursor onto it.
    pub fn search(&self, item: &T) -> Option<T> {
        self.lock().search(item).cloned()
    }

    /// Builds a new list, with the same duplicate policy, from the results of
    /// `transform` on every item. Results rejected as duplicates are skipped.
    pub fn map<U, F>(&self, mut transform: F) -> List<U>
    where
        U: Ord,
        F: FnMut(T) -> U,
    {
        let mapped = List::new(self.allows_duplicates());
        self.for_each(|item| {
            mapped.add_after(transform(item));
        });
        mapped
    }

    /// Builds a new list, with the same duplicate policy, from the items for
    /// which `predicate` holds, in the same order.
    pub fn filter<P>(&self, mut predicate: P) -> List<T>
    where
        P: FnMut(&T) -> bool,
    {
        let filtered = List::new(self.allows_duplicates());
        self.for_each(|item| {
            if predicate(&item) {
                filtered.add_after(item);
            }
        });
        filtered
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for List<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.lock().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(allow_duplicates: bool, items: &[i32]) -> List<i32> {
        let list = List::new(allow_duplicates);
        for &x in items {
            assert!(list.add_after(x));
        }
        list
    }

    #[test]
    fn empty_list_navigation() {
        let list: List<i32> = List::new(false);
        assert!(!list.next());
        assert!(!list.prev());
        list.first();
        list.last();
        assert_eq!(list.get(), None);
        assert_eq!(list.advance(), None);
        assert_eq!(list.rewind(), None);
        assert_eq!(list.delete(), None);
        assert!(!list.replace(1));
        assert_eq!(list.search(&1), None);
        list.validate().unwrap();
    }

    #[test]
    fn add_after_and_before_follow_cursor() {
        let list = List::new(false);
        assert!(list.add_after(2));
        assert!(list.add_after(4));
        assert!(list.add_before(3));
        list.first();
        assert!(list.add_before(1));
        list.last();
        assert!(list.add_after(5));
        assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(list.get(), Some(5));
        assert!(!list.add_before(3));
        assert_eq!(list.get(), Some(5));
        assert_eq!(list.len(), 5);
        list.validate().unwrap();
    }

    #[test]
    fn navigation_stops_at_ends() {
        let list = filled(false, &[1, 2, 3]);
        list.first();
        assert!(!list.prev());
        assert_eq!(list.rewind(), None);
        assert_eq!(list.get(), Some(1));
        assert_eq!(list.advance(), Some(2));
        assert_eq!(list.advance(), Some(3));
        assert_eq!(list.advance(), None);
        assert!(!list.next());
        assert_eq!(list.get(), Some(3));
        assert_eq!(list.rewind(), Some(2));
    }

    #[test]
    fn delete_moves_cursor_to_first() {
        let list = filled(true, &[1, 2, 3, 4, 5]);
        list.first();
        let mut current = list.get();
        while let Some(x) = current {
            if x % 2 == 0 {
                list.delete();
            }
            current = list.advance();
        }
        assert_eq!(list.to_vec(), vec![1, 3, 5]);
        list.last();
        assert_eq!(list.delete(), Some(5));
        assert_eq!(list.get(), Some(1));
        list.validate().unwrap();
        assert_eq!(list.delete(), Some(1));
        assert_eq!(list.delete(), Some(3));
        assert_eq!(list.delete(), None);
        assert!(list.is_empty());
        list.validate().unwrap();
    }

    #[test]
    fn replace_keeps_position() {
        let list = filled(true, &[1, 2, 3, 4, 5]);
        list.first();
        let mut current = list.get();
        while let Some(x) = current {
            assert!(list.replace(x + 10));
            current = list.advance();
        }
        assert_eq!(list.to_vec(), vec![11, 12, 13, 14, 15]);
        assert_eq!(list.search(&3), None);
        assert_eq!(list.search(&13), Some(13));
        list.validate().unwrap();
    }

    #[test]
    fn replace_rejected_duplicate_is_a_no_op() {
        let list = filled(false, &[1, 2, 3]);
        list.search(&2);
        assert!(!list.replace(3));
        assert_eq!(list.get(), Some(2));
        assert_eq!(list.to_vec(), vec![1, 2, 3]);
        // replacing with an equal item is not a conflict with itself
        assert!(list.replace(2));
        list.validate().unwrap();
    }

    #[test]
    fn delete_removes_the_node_under_the_cursor_among_duplicates() {
        let list = filled(true, &[7, 7, 7]);
        list.first();
        list.next();
        assert!(list.replace(8));
        list.first();
        assert_eq!(list.delete(), Some(7));
        assert_eq!(list.to_vec(), vec![8, 7]);
        list.validate().unwrap();
        list.last();
        assert_eq!(list.delete(), Some(7));
        assert_eq!(list.to_vec(), vec![8]);
        list.validate().unwrap();
    }

    #[test]
    fn for_each_keeps_cursor() {
        let list = filled(true, &[1, 2, 3, 4, 5]);
        list.search(&3);
        let mut seen = vec![];
        list.for_each(|x| seen.push(x));
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(list.get(), Some(3));
    }

    #[test]
    fn for_each_allows_reentrant_calls() {
        let list = filled(true, &[1, 2, 3]);
        let mut seen = vec![];
        list.for_each(|x| {
            // the lock is not held here
            seen.push((x, list.len()));
            if x == 1 {
                list.last();
                list.add_after(4);
            }
        });
        assert_eq!(seen, vec![(1, 3), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn for_each_survives_removal_of_the_visited_node() {
        let list = filled(true, &[1, 2, 3, 4]);
        let mut seen = vec![];
        list.for_each(|x| {
            seen.push(x);
            if x == 2 {
                list.search(&2);
                list.delete();
            }
        });
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(list.to_vec(), vec![1, 3, 4]);
    }

    #[test]
    fn map_and_filter() {
        let list = filled(true, &[1, 2, 3, 4, 5]);
        let squares = list.map(|x| x * x);
        assert_eq!(squares.to_vec(), vec![1, 4, 9, 16, 25]);
        assert!(squares.allows_duplicates());
        let odd = list.filter(|x| x % 2 == 1);
        assert_eq!(odd.to_vec(), vec![1, 3, 5]);
        odd.validate().unwrap();

        let unique = filled(false, &[-2, 1, 2]);
        let squares = unique.map(|x| x * x);
        assert_eq!(squares.to_vec(), vec![4, 1]);
    }

    #[test]
    fn clear_keeps_policy() {
        let list = filled(false, &[1, 2, 3]);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.get(), None);
        assert!(list.add_after(1));
        assert!(!list.add_after(1));
        list.validate().unwrap();
    }
}
