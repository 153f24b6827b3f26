use thiserror::Error;

/// A structural invariant that [`Tree::validate`](crate::Tree::validate) or
/// [`List::validate`](crate::List::validate) found broken.
///
/// None of these can be produced by the structures themselves as long as the
/// stored items honour the [`Ord`] contract. They exist to report what a
/// broken comparator left behind.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum InvariantError {
    #[error("item at in-order position {position} is smaller than the item before it")]
    OutOfOrder { position: usize },

    #[error("item at in-order position {position} equals the item before it but duplicates are not allowed")]
    UnexpectedDuplicate { position: usize },

    #[error("node at depth {depth} caches height {cached} but its height is {actual}")]
    StaleHeight {
        depth: usize,
        cached: i32,
        actual: i32,
    },

    #[error("node at depth {depth} is unbalanced: left height {left}, right height {right}")]
    Unbalanced { depth: usize, left: i32, right: i32 },

    #[error("length is recorded as {recorded} but {counted} items are reachable")]
    LengthMismatch { recorded: usize, counted: usize },

    #[error("list links around node {index} are not symmetric")]
    BrokenLink { index: usize },

    #[error("list endpoints do not match the ends of the chain")]
    BadEndpoints,

    #[error("cursor points at a node that is not linked")]
    DanglingCursor,

    #[error("node {index} appears {count} times in the index")]
    IndexMismatch { index: usize, count: usize },

    #[error("sorted list is out of order at position {position}")]
    Unsorted { position: usize },
}
