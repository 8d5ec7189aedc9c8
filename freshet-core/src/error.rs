// Copyright 2026 The Freshet Authors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the Freshet streaming library.
//!
//! This module provides the error handling system shared by the stream state
//! machine and the materializer family. It defines a root [`FreshetError`]
//! type with specific variants for the distinct failure modes observers can
//! be told apart by: cancellation, timeout, upstream failure and observer
//! (user callback) failure.
//!
//! # Examples
//!
//! ```
//! use freshet_core::{FreshetError, Result};
//!
//! fn deliver() -> Result<()> {
//!     Err(FreshetError::upstream("producer went away"))
//! }
//! ```

/// Root error type for all Freshet operations.
///
/// Cancellation is a first-class variant rather than a wrapped cause, so
/// that blocking joins, iterators and materializer callers can distinguish
/// "I asked you to stop" from "something broke".
#[derive(Debug, thiserror::Error)]
pub enum FreshetError {
    /// The stream or materializer was cancelled.
    ///
    /// A terminal transition caused by `cancel()` (or `fail` with this
    /// cause) reports this variant to every observer, exactly once.
    #[error("Cancelled")]
    Cancelled,

    /// A blocking `get` or iterator poll outlived its deadline.
    #[error("Timeout: {context}")]
    Timeout {
        /// Context about the deadline (e.g. the configured duration).
        context: String,
    },

    /// A producer-side failure, wrapped once and cached as the terminal
    /// result of the stream or materializer it terminated.
    #[error("Upstream failure: {context}")]
    Upstream {
        /// Description of what went wrong upstream.
        context: String,
    },

    /// No element is available.
    ///
    /// Returned by `current()` on a never-set stream and by `next()` on an
    /// exhausted iterator.
    #[error("No element available")]
    NoElement,

    /// An out-of-contract element index (negative) was requested.
    ///
    /// Reported as an error through the consumer protocol, never a panic.
    #[error("Invalid index: {index}")]
    InvalidIndex {
        /// The offending index.
        index: isize,
    },

    /// A failure raised by user code (a receiver or consumer callback).
    ///
    /// Observer failures are captured at the call site and routed back to
    /// that observer's own error channel; they never reach the producer.
    #[error("User error: {0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FreshetError {
    /// Create an upstream failure with the given context.
    pub fn upstream(context: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
        }
    }

    /// Create a timeout error with the given context.
    pub fn timeout(context: impl Into<String>) -> Self {
        Self::Timeout {
            context: context.into(),
        }
    }

    /// Wrap a user error.
    pub fn user(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(Box::new(error))
    }

    /// Returns `true` if this error means a requested stop rather than a
    /// genuine failure.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this error is a deadline expiry.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Specialized `Result` type for Freshet operations.
pub type Result<T> = std::result::Result<T, FreshetError>;

/// Extension trait for converting arbitrary errors into [`FreshetError`].
///
/// Automatically implemented for all `std::error::Error + Send + Sync`
/// types.
pub trait IntoFreshetError {
    /// Convert this error into a [`FreshetError::User`].
    fn into_freshet(self) -> FreshetError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoFreshetError for E {
    fn into_freshet(self) -> FreshetError {
        FreshetError::user(self)
    }
}

/// Helper trait for adding context to `Result`s in a fluent style.
pub trait ResultExt<T> {
    /// Add context to an error, converting it into an upstream failure.
    ///
    /// # Errors
    /// Returns `Err(FreshetError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FreshetError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context = context.into();
            match e.into() {
                FreshetError::User(inner) => FreshetError::Upstream {
                    context: format!("{context}: {inner}"),
                },
                other => other,
            }
        })
    }
}

impl Clone for FreshetError {
    fn clone(&self) -> Self {
        match self {
            Self::Cancelled => Self::Cancelled,
            Self::Timeout { context } => Self::Timeout {
                context: context.clone(),
            },
            Self::Upstream { context } => Self::Upstream {
                context: context.clone(),
            },
            Self::NoElement => Self::NoElement,
            Self::InvalidIndex { index } => Self::InvalidIndex { index: *index },
            // The boxed source is not clonable; degrade to its rendered form
            Self::User(e) => Self::Upstream {
                context: format!("User error: {e}"),
            },
        }
    }
}
