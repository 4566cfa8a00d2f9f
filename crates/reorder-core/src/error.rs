use thiserror::Error;

pub type Result<T, E = ReorderError> = std::result::Result<T, E>;

/// Wiring mistakes made by the code embedding the list.
///
/// These are never produced by user input; they indicate that the integrator
/// handed the list inconsistent data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("duplicate item key `{key}` at indices {first} and {second}")]
    DuplicateKey {
        key: String,
        first: usize,
        second: usize,
    },

    #[error("index {index} is out of range for a list of {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no item with key `{0}`")]
    NoSuchKey(String),
}
