use thiserror::Error;

/// Errors returned by fallible [`Deque`](crate::Deque) operations.
///
/// A failed operation never modifies the deque.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DequeError {
    /// `pop` or `pop_left` on a deque with no elements.
    #[error("pop from an empty deque")]
    Empty,

    /// Positional access outside `0..len`.
    #[error("index {index} out of range for deque of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A constructor argument outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
