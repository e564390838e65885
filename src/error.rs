// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for pageseo

use thiserror::Error;

/// Result type alias using the crate-level [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop a validation run for one document.
///
/// Rule violations are never returned through this type; they are collected
/// into a [`crate::report::Report`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTML parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Why a single value failed a [`crate::validator::Validator`].
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{subject} is not normalized")]
    NotNormalized { subject: &'static str },

    #[error("{subject} is empty")]
    Empty { subject: &'static str },

    #[error("{subject} is too short: {length} vs {minimum} minimum")]
    TooShort {
        subject: &'static str,
        length: usize,
        minimum: usize,
    },

    #[error("{subject} is too long: {length} vs {maximum} maximum")]
    TooLong {
        subject: &'static str,
        length: usize,
        maximum: usize,
    },

    #[error("duplicate value")]
    DuplicateValue,

    #[error("expected {expected:?}, got {actual:?}")]
    Mismatch { expected: String, actual: String },

    #[error("{0}")]
    Pattern(String),

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("unexpected response status code: {code} - {reason}")]
    UnexpectedStatus { code: u16, reason: String },

    #[error("unable to fetch {url:?}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("file {path:?} is not accessible: {source}")]
    MissingFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation cancelled before fetching {0:?}")]
    Cancelled(String),

    #[error("{0}")]
    Custom(String),
}

impl ValidationError {
    /// Build a free-form failure for custom validators and normalizers.
    pub fn custom(message: impl Into<String>) -> Self {
        ValidationError::Custom(message.into())
    }

    /// Whether the failure came from the deduplication middleware.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ValidationError::DuplicateValue)
    }

    /// Whether the failure came from resolving an external resource.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidUrl { .. }
                | ValidationError::UnsupportedScheme(_)
                | ValidationError::UnexpectedStatus { .. }
                | ValidationError::Fetch { .. }
                | ValidationError::MissingFile { .. }
                | ValidationError::Cancelled(_)
        )
    }
}
