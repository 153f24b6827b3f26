//! A first-in first-out queue, built on the [`List`] primitives.

use crate::List;

/// A FIFO queue, safe to share between threads.
///
/// Items are added after the last item and taken from the front. Each operation
/// moves the cursor and mutates under one lock acquisition, so concurrent
/// callers never see each other's cursor moves.
///
///```
/// use avl_list::Queue;
///
/// let queue = Queue::new();
/// for x in 1..=3 {
///     queue.enqueue(x);
/// }
/// assert_eq!(queue.front(), Some(1));
/// assert_eq!(queue.dequeue(), Some(1));
/// assert_eq!(queue.dequeue(), Some(2));
/// assert_eq!(queue.len(), 1);
///```
pub struct Queue<T> {
    list: List<T>,
}

impl<T> Queue<T> {
    /// Creates an empty FIFO queue. Items need no ordering.
    pub fn new() -> Self {
        Queue {
            list: List::unindexed(),
        }
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.list.clear()
    }

    /// Adds the item at the back.
    pub fn enqueue(&self, item: T) {
        let mut links = self.list.lock();
        links.last();
        links.push_after(item);
    }

    /// Removes and returns the item at the front, if any.
    pub fn dequeue(&self) -> Option<T> {
        let mut links = self.list.lock();
        links.first();
        links.take_current()
    }
}

impl<T: Clone> Queue<T> {
    /// Returns the item at the front without removing it.
    pub fn front(&self) -> Option<T> {
        let mut links = self.list.lock();
        links.first();
        links.get().cloned()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Queue::new()
    }
}
