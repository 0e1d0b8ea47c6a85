//! Typed failure returned by the fetch capability.

use thiserror::Error;

use crate::retry::{Classified, FailureKind};

/// A playlist-level fetch failure, classified once where it is produced.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimited, message)
    }

    pub fn access_restricted(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AccessRestricted, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Other, message)
    }
}

impl Classified for FetchError {
    fn kind(&self) -> FailureKind {
        self.kind
    }
}
