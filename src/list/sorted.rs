//! A list kept in sorted order by inserting every node right after its
//! in-order predecessor, which the index finds during the same descent that
//! inserts the node. No linear scan is needed.

use super::List;
use crate::InvariantError;

/// A doubly linked list whose items are always in non-decreasing order.
///
/// Equal items, if allowed, are kept in the order they were added.
///
///```
/// use avl_list::SortedList;
///
/// let list = SortedList::new(false);
/// for x in [8, 2, 9, 3] {
///     assert!(list.add(x));
/// }
/// assert!(!list.add(3));
/// assert_eq!(list.to_vec(), vec![2, 3, 8, 9]);
/// assert_eq!(list.get(), Some(3));
///```
pub struct SortedList<T> {
    list: List<T>,
}

impl<T> SortedList<T> {
    /// Creates an empty sorted list. `allow_duplicates` decides whether items
    /// that compare equal to an existing item are accepted.
    pub fn new(allow_duplicates: bool) -> Self {
        SortedList {
            list: List::new(allow_duplicates),
        }
    }

    /// Returns `true` if items equal to an existing item are accepted.
    pub fn allows_duplicates(&self) -> bool {
        self.list.allows_duplicates()
    }

    /// Returns the number of items in the list.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Moves the cursor to the smallest item.
    pub fn first(&self) {
        self.list.first()
    }

    /// Moves the cursor to the largest item.
    pub fn last(&self) {
        self.list.last()
    }

    /// Moves the cursor one item forward. See [`List::next`].
    pub fn next(&self) -> bool {
        self.list.next()
    }

    /// Moves the cursor one item back. See [`List::prev`].
    pub fn prev(&self) -> bool {
        self.list.prev()
    }

    /// Removes every item. The duplicate policy is kept.
    pub fn clear(&self) {
        self.list.clear()
    }
}

impl<T: Ord> SortedList<T> {
    /// Adds the item at its sorted position in `O(log n)` and moves the cursor
    /// onto it. Returns `false` if it is a rejected duplicate.
    pub fn add(&self, item: T) -> bool {
        self.list.lock().add_sorted(item)
    }

    /// Removes the item under the cursor and returns it.
    /// The cursor moves to the first item.
    pub fn delete(&self) -> Option<T> {
        self.list.delete()
    }

    /// Checks the list invariants, and that the items are in order.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let links = self.list.lock();
        links.check()?;
        let mut prev: Option<&T> = None;
        for (position, item) in links.iter().enumerate() {
            if prev.map_or(false, |prev| prev > item) {
                return Err(InvariantError::Unsorted { position });
            }
            prev = Some(item);
        }
        Ok(())
    }
}

impl<T: Clone> SortedList<T> {
    /// Returns the item under the cursor.
    pub fn get(&self) -> Option<T> {
        self.list.get()
    }

    /// Moves the cursor forward and returns the item there. See [`List::advance`].
    pub fn advance(&self) -> Option<T> {
        self.list.advance()
    }

    /// Moves the cursor back and returns the item there. See [`List::rewind`].
    pub fn rewind(&self) -> Option<T> {
        self.list.rewind()
    }

    /// Returns the items in order, read under a single lock acquisition.
    pub fn to_vec(&self) -> Vec<T> {
        self.list.to_vec()
    }

    /// See [`List::for_each`]; the same relaxation applies.
    pub fn for_each<F>(&self, visit: F)
    where
        F: FnMut(T),
    {
        self.list.for_each(visit)
    }
}

impl<T: Ord + Clone> SortedList<T> {
    /// Finds an item equal to `item` in `O(log n)` and moves the cursor onto it.
    pub fn search(&self, item: &T) -> Option<T> {
        self.list.search(item)
    }

    /// Builds a new sorted list, with the same duplicate policy, from the results
    /// of `transform` on every item. The results are added in sorted position,
    /// so `transform` need not preserve the order.
    pub fn map<U, F>(&self, mut transform: F) -> SortedList<U>
    where
        U: Ord,
        F: FnMut(T) -> U,
    {
        let mapped = SortedList::new(self.allows_duplicates());
        self.for_each(|item| {
            mapped.add(transform(item));
        });
        mapped
    }

    /// Builds a new sorted list, with the same duplicate policy, from the items
    /// for which `predicate` holds.
    pub fn filter<P>(&self, mut predicate: P) -> SortedList<T>
    where
        P: FnMut(&T) -> bool,
    {
        let filtered = SortedList::new(self.allows_duplicates());
        self.for_each(|item| {
            if predicate(&item) {
                filtered.add(item);
            }
        });
        filtered
    }
}

impl<T: Ord> std::iter::FromIterator<T> for SortedList<T> {
    /// Builds a sorted list that allows duplicates.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let list = SortedList::new(true);
        {
            let mut links = list.list.lock();
            for item in iter {
                links.add_sorted(item);
            }
        }
        list
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SortedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.list, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_order() {
        let list = SortedList::new(false);
        let mut min = i32::MAX;
        let mut max = i32::MIN;
        for x in [8, 2, 9, 10, 3, 5, 6, 7, 1, 4] {
            assert!(list.add(x));
            min = min.min(x);
            max = max.max(x);
            // the cursor is on the new item
            assert_eq!(list.get(), Some(x));
            list.first();
            assert_eq!(list.get(), Some(min));
            list.last();
            assert_eq!(list.get(), Some(max));
        }
        assert_eq!(list.to_vec(), (1..=10).collect::<Vec<_>>());
        list.last();
        let mut backwards = vec![];
        let mut current = list.get();
        while let Some(x) = current {
            backwards.push(x);
            current = list.rewind();
        }
        assert_eq!(backwards, (1..=10).rev().collect::<Vec<_>>());
        list.validate().unwrap();
    }

    #[test]
    fn duplicates_are_stable() {
        let list = SortedList::new(true);
        for (key, tag) in [(2, 'a'), (1, 'b'), (2, 'c'), (0, 'd'), (2, 'e')] {
            assert!(list.add(Tagged(key, tag)));
        }
        let tags: String = list.to_vec().into_iter().map(|Tagged(_, tag)| tag).collect();
        assert_eq!(tags, "dbace");
        list.validate().unwrap();
    }

    #[test]
    fn rejected_duplicate_leaves_list_untouched() {
        let list = SortedList::new(false);
        list.add(5);
        list.add(1);
        assert!(!list.add(5));
        assert_eq!(list.get(), Some(1));
        assert_eq!(list.len(), 2);
        list.validate().unwrap();
    }

    #[test]
    fn map_resorts() {
        let list: SortedList<i32> = [3, -1, 2, -4].into_iter().collect();
        let squares = list.map(|x| x * x);
        assert_eq!(squares.to_vec(), vec![1, 4, 9, 16]);
        let negative = list.filter(|x| *x < 0);
        assert_eq!(negative.to_vec(), vec![-4, -1]);
        squares.validate().unwrap();
    }

    /// Ordered by the key only, so the tag shows which of the equal items is which.
    #[derive(Clone, Debug)]
    struct Tagged(i32, char);

    impl PartialEq for Tagged {
        fn eq(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    impl Eq for Tagged {}

    impl PartialOrd for Tagged {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Tagged {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.cmp(&other.0)
        }
    }
}
