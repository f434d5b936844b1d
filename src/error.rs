//! Error types for flatbook operations.

use thiserror::Error;

/// Errors that can occur while flattening an EPUB.
///
/// Only conditions that abort a whole run are represented here: the archive
/// cannot be opened, or a document's bytes cannot be parsed into a tree at
/// all. Per-document anomalies (a missing body, an unmatched style class)
/// are carried as warnings in [`Conversion`](crate::Conversion) instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
