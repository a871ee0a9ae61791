use thiserror::Error;

/// Result type for mod definition operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building mod definition types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A virtual path is longer than the consuming system accepts.
    #[error("virtual path is {length} bytes, longer than the allowed {max}")]
    PathTooLong { length: usize, max: usize },
}
