use thiserror::Error;

/// Failure reported by a platform adapter.
///
/// `code` is the platform's own error number when it sends one, the HTTP
/// status otherwise, and `0` for transport or decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("platform returned error #{code}: {message}")]
pub struct PlatformError {
    pub code: i64,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::HashtagAggregator::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// Caller input was rejected before any request was sent.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// The user metadata lookup failed; no page was fetched.
    #[error("error retrieving the user: platform returned error #{code}: {message}")]
    UserLookup { code: i64, message: String },

    /// A timeline page failed; counts gathered so far are discarded.
    #[error("error retrieving the user's posts: platform returned error #{code}: {message}")]
    TimelineFetch { code: i64, message: String },
}

impl AggregateError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn user_lookup(err: PlatformError) -> Self {
        Self::UserLookup {
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn timeline_fetch(err: PlatformError) -> Self {
        Self::TimelineFetch {
            code: err.code,
            message: err.message,
        }
    }

    /// Platform error code, if this error came from the platform.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::InvalidInput { .. } => None,
            Self::UserLookup { code, .. } | Self::TimelineFetch { code, .. } => Some(*code),
        }
    }
}
