//! A last-in first-out stack, built on the [`List`] primitives.

use crate::List;

/// A LIFO stack, safe to share between threads.
///
///```
/// use avl_list::Stack;
///
/// let stack = Stack::new();
/// for x in 1..=3 {
///     stack.push(x);
/// }
/// assert_eq!(stack.top(), Some(3));
/// assert_eq!(stack.pop(), Some(3));
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.len(), 1);
///```
pub struct Stack<T> {
    list: List<T>,
}

impl<T> Stack<T> {
    /// Creates an empty LIFO stack. Items need no ordering.
    pub fn new() -> Self {
        Stack {
            list: List::unindexed(),
        }
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the stack holds no items.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Removes every item.
    pub fn clear(&self) {
        self.list.clear()
    }

    /// Adds the item on top.
    pub fn push(&self, item: T) {
        let mut links = self.list.lock();
        links.last();
        links.push_after(item);
    }

    /// Removes and returns the top item, if any.
    pub fn pop(&self) -> Option<T> {
        let mut links = self.list.lock();
        links.last();
        links.take_current()
    }
}

impl<T: Clone> Stack<T> {
    /// Returns the top item without removing it.
    pub fn top(&self) -> Option<T> {
        let mut links = self.list.lock();
        links.last();
        links.get().cloned()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Stack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_order() {
        let stack = Stack::new();
        assert_eq!(stack.pop(), None::<i32>);
        for x in [2, 2, 1, 5] {
            stack.push(x);
        }
        let mut out = vec![];
        while let Some(x) = stack.top() {
            assert_eq!(stack.pop(), Some(x));
            out.push(x);
        }
        assert_eq!(out, vec![5, 1, 2, 2]);
        stack.push(9);
        stack.clear();
        assert!(stack.is_empty());
    }

    #[test]
    fn holds_unordered_items() {
        let stack = Stack::new();
        for weight in [0.5, 2.25, 0.5] {
            stack.push(vec![weight]);
        }
        stack.push(vec![]);
        assert_eq!(stack.pop(), Some(vec![]));
        assert_eq!(stack.top(), Some(vec![0.5]));
        assert_eq!(stack.len(), 3);
        stack.clear();
        assert_eq!(stack.pop(), None);
        stack.list.lock().check_chain().unwrap();
    }
}
