//! Error types used by this crate.

use std::io;

use thiserror::Error;

/// Custom error type returned when something goes wrong with parsing part of
/// a library.
///
/// Nothing in the import pipeline treats these as fatal: the orchestrator
/// logs them and moves on to the next entry or platform.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Error originating from [`io::Error`]
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Error originating from [`quick_xml::Error`]
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// A structurally invalid document, e.g. a wrong root element or a
    /// truncated file
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl ImportError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
