//! Error types for daisy-nav operations.

use thiserror::Error;

use crate::smil::ClipError;

/// Errors that can occur while opening or navigating a talking book.
///
/// Reaching either end of the book is not an error: navigation calls return
/// `Ok(None)` in that case.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error in {document}: {source}")]
    Xml {
        document: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Cannot decode {document} with any of: {tried}")]
    Decode { document: String, tried: String },

    #[error("Unsupported book layout: {0}")]
    UnsupportedLayout(String),

    #[error("Package {package} has no manifest item with id {id:?}")]
    MissingManifestEntry { package: String, id: String },

    #[error("Unknown audio fragment: {0}")]
    UnknownFragment(String),

    #[error("Malformed clip in {document}: {source}")]
    MalformedClip {
        document: String,
        #[source]
        source: ClipError,
    },

    #[error("Anchor target {target:?} not found in {document}")]
    MissingAnchorTarget { document: String, target: String },
}

impl Error {
    /// Attach a document name to a clip-level failure.
    ///
    /// Syntax errors become [`Error::Xml`]; everything else is a malformed clip.
    pub(crate) fn clip(document: impl Into<String>, err: ClipError) -> Self {
        match err {
            ClipError::Xml(source) => Error::Xml {
                document: document.into(),
                source,
            },
            source => Error::MalformedClip {
                document: document.into(),
                source,
            },
        }
    }

    pub(crate) fn xml(document: impl Into<String>, source: quick_xml::Error) -> Self {
        Error::Xml {
            document: document.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
