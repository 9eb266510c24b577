//! Fatal errors for the discourse model.
//!
//! Anything here aborts the conversion of the current document. Recoverable
//! data-quality issues are reported through [`crate::Anomaly`] instead.

use thiserror::Error;

use crate::Anomaly;

/// Errors that abort building a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Relation label outside `Explicit, Implicit, AltLex, EntRel, NoRel`.
    #[error("unknown discourse relation type: '{0}'")]
    UnknownRelationType(String),

    /// A slice whose begin lies after its end.
    #[error("invalid slice: {begin} > {end}")]
    InvalidSlice { begin: usize, end: usize },

    /// A `b..e;b..e` span string that could not be decoded.
    #[error("malformed span '{span}': {reason}")]
    MalformedSpan { span: String, reason: String },

    /// A token could not be located in the raw text from the current cursor onward.
    #[error("token {index} '{token}' not found after character offset {offset}")]
    TokenNotFound {
        token: String,
        index: usize,
        offset: usize,
    },

    /// A mask that does not replace the tokens 1:1.
    #[error("mask for '{doc_id}' has {found} tokens, document has {expected}")]
    MaskLength {
        doc_id: String,
        expected: usize,
        found: usize,
    },

    /// A persisted structural layer that does not partition the tokens.
    #[error("{layer} layer is not a partition of {tokens} tokens: {reason}")]
    InvalidPartition {
        layer: &'static str,
        tokens: usize,
        reason: String,
    },

    /// A correction that targets a relation the document does not have.
    #[error("document '{doc_id}' has no relation {index}")]
    NoSuchRelation { doc_id: String, index: usize },

    /// Persisted document could not be decoded.
    #[error("invalid document json: {0}")]
    Json(String),

    /// An anomaly the caller chose to treat as fatal.
    #[error("anomaly escalated: {0}")]
    Escalated(Anomaly),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
