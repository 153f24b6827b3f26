//! Binary search trees, AVL or plain, that double as the search index of
//! cursor-navigable doubly linked lists.
//!
//! * [`Tree`]: a locked binary search tree, self-balancing or not, with or
//!   without duplicates.
//! * [`List`]: a doubly linked list with a cursor, whose nodes are also indexed
//!   by item for `O(log n)` search.
//! * [`SortedList`]: a [`List`] that inserts each item right after its in-order
//!   predecessor, found by the index in `O(log n)`.
//! * [`Queue`] and [`Stack`]: thin adapters over the list.
//!
//! Every structure takes `&self` and guards its state with its own lock, so it can
//! be shared between threads directly (for example behind an `Arc`).

mod error;
pub mod list;
pub mod queue;
pub mod stack;
pub mod tree;

pub use error::InvariantError;
pub use list::sorted::SortedList;
pub use list::List;
pub use queue::Queue;
pub use stack::Stack;
pub use tree::{Options, Placement, Tree};
