//! Error types for the conversion pipeline
//!
//! Each stage has its own error enum; [`HtmltabError`] composes them and
//! maps every failure onto one user-facing [`ErrorKind`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to acquire the raw input document
#[derive(Debug, Error)]
pub enum InputError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Connection error ({0})")]
    Connection(String),

    #[error("Time out ({0})")]
    Timeout(String),

    #[error("Too many redirects ({0})")]
    TooManyRedirects(String),

    #[error("HTTP {status} {reason} ({url})")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },

    #[error("Request error ({url}): {message}")]
    Request { url: String, message: String },
}

/// Failure to turn raw bytes into a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no HTML provided")]
    NoMarkup,

    #[error("could not detect character encoding")]
    Encoding,
}

/// Top-level error for one conversion
#[derive(Debug, Error)]
pub enum HtmltabError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("'{0}' not an index, CSS selector, or XPath expression")]
    BadSelector(String),

    #[error("value matched no elements")]
    NoMatch,

    #[error("select value matched {0} element")]
    UnexpectedElement(String),

    #[error("select value must match one 'table' element or one or more 'tr' elements")]
    MixedOrInvalidMatch,

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// User-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputUnavailable,
    ParseError,
    BadSelector,
    NoMatch,
    UnexpectedElement,
    MixedOrInvalidMatch,
    Output,
}

impl HtmltabError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HtmltabError::Input(_) => ErrorKind::InputUnavailable,
            HtmltabError::Parse(_) => ErrorKind::ParseError,
            HtmltabError::BadSelector(_) => ErrorKind::BadSelector,
            HtmltabError::NoMatch => ErrorKind::NoMatch,
            HtmltabError::UnexpectedElement(_) => ErrorKind::UnexpectedElement,
            HtmltabError::MixedOrInvalidMatch => ErrorKind::MixedOrInvalidMatch,
            HtmltabError::Csv(_) | HtmltabError::Io(_) => ErrorKind::Output,
        }
    }

    /// Process exit code for this failure
    ///
    /// Problems with the input or the selection are usage errors (2);
    /// failing to write the result is a plain failure (1).
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Output => 1,
            _ => 2,
        }
    }
}

pub type Result<T, E = HtmltabError> = std::result::Result<T, E>;
