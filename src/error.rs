use std::result;
use thiserror::Error;

/// Convenience `Error` enum for `skiplist_set`.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// The named operation is not supported by the set.
    #[error("operation `{0}` is not supported")]
    Unsupported(&'static str),
    /// The configured height cap cannot produce any levels.
    #[error("maximum height must be at least 1, got {0}")]
    InvalidMaxHeight(usize),
}

/// Convenience `Result` type for `skiplist_set`.
pub type Result<T> = result::Result<T, Error>;
