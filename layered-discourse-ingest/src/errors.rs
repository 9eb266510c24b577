//! Error types for the ingestion pipelines.
//!
//! Every variant is fatal for the document being converted; data-quality
//! issues that do not stop a conversion are reported as anomalies instead.

use thiserror::Error;

/// Errors that can occur while ingesting a document.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The core model rejected the document.
    #[error(transparent)]
    Model(#[from] layered_discourse::Error),

    /// The XML is not well-formed.
    #[error("xml syntax error: {0}")]
    XmlSyntax(#[from] roxmltree::Error),

    /// The XML is well-formed but does not follow the RelXML layout.
    #[error("invalid relxml: {message}")]
    Xml { message: String },

    /// A delimited table could not be read.
    #[error("table error: {0}")]
    Table(#[from] csv::Error),

    /// An annotation row rejected by the model (1-based row number).
    #[error("annotation row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: layered_discourse::Error,
    },

    /// No mask entries for a document.
    #[error("mask has no tokens for document '{doc_id}'")]
    MaskMissing { doc_id: String },

    /// Error reading a file.
    #[error("failed to load {path}: {message}")]
    Load { path: String, message: String },

    /// Error writing a file.
    #[error("failed to save {path}: {message}")]
    Save { path: String, message: String },

    /// Error parsing the configuration file.
    #[error("invalid config {path}: {message}")]
    Config { path: String, message: String },
}

impl IngestError {
    pub(crate) fn xml(message: impl Into<String>) -> Self {
        IngestError::Xml {
            message: message.into(),
        }
    }
}

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;
