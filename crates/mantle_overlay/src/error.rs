//! Error types for overlay resolution.
//!
//! Almost every operation in this crate is an in-memory state transition
//! over already-validated inputs and cannot fail; unresolvable paths are
//! `None`, not errors. The one exception is the changed-items rebuild,
//! which calls out to an external [`ItemIdentifier`](crate::ItemIdentifier).

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving overlay state.
#[derive(Error, Debug)]
pub enum Error {
    /// An item identifier collaborator failed while naming a changed asset.
    #[error("could not identify '{subject}': {reason}")]
    Identify { subject: String, reason: String },
}

impl Error {
    /// Creates an [`Error::Identify`] for the given subject.
    pub fn identify(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Identify {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}
