use hyper::http;
use std::{io, sync};

/// Coarse classification of a failure, used when summarising runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FailureKind {
    /// The response did not match an expected status or JSON value.
    Assertion,
    /// A step referenced a binding that no earlier step extracted.
    UnresolvedBinding,
    /// The request never produced a response.
    Transport,
    /// Anything else: malformed requests, configuration, stub server errors.
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{check}: expected {expected} but found {actual}")]
    AssertionFailed {
        check: String,
        expected: String,
        actual: String,
    },

    #[error("No binding named '{0}' is defined")]
    UnresolvedBinding(String),

    #[error("Could not save {path} as '{name}': {reason}")]
    ExtractionFailed {
        path: String,
        name: String,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header name")]
    InvalidHeaderName,

    #[error("Invalid header value")]
    InvalidHeaderValue,

    #[error("Invalid body")]
    InvalidBody,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("Http error: {0}")]
    HttpError(#[from] http::Error),

    #[error("IoError: {0}")]
    IoError(#[from] io::Error),

    #[error("The lock was poisoned")]
    PoisonedLock,
}

impl Error {
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::AssertionFailed { .. } | Error::ExtractionFailed { .. } => {
                FailureKind::Assertion
            }
            Error::UnresolvedBinding(_) => FailureKind::UnresolvedBinding,
            Error::Transport(_) | Error::HyperError(_) | Error::IoError(_) => {
                FailureKind::Transport
            }
            _ => FailureKind::Internal,
        }
    }

    pub(crate) fn assertion<C, E, A>(check: C, expected: E, actual: A) -> Self
    where
        C: Into<String>,
        E: ToString,
        A: ToString,
    {
        Error::AssertionFailed {
            check: check.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
