#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Canonical token-indexed model for PDTB-style discourse annotated dialogs.
//!
//! Corpora arrive in two shapes: character-offset annotation tables over raw
//! text, and RelXML files with per-token roles. This crate holds everything
//! the two share, so that whatever the source, the result is one [`Dialog`]
//! with the same invariants.
//!
//! ## Core Types
//!
//! - [`Slice`] / [`Span`] - half-open ranges and canonical discontinuous spans
//! - [`DiscourseRelation`] - validated relation with five role spans
//! - [`Dialog`] - tokens, structural layers and relations
//! - [`Anomaly`] / [`AnomalySink`] - non-fatal findings, passed explicitly
//!
//! ## Example
//!
//! ```
//! use layered_discourse::{align_span, index_tokens, Anomaly, Slice};
//!
//! let text = "I left because it rained .";
//! let tokens: Vec<&str> = text.split_whitespace().collect();
//! let offsets = index_tokens(text, &tokens).unwrap();
//!
//! let mut anomalies: Vec<Anomaly> = Vec::new();
//! let conn = align_span(&[Slice::new(7, 14)], &offsets, &mut anomalies);
//! assert_eq!(conn.to_string(), "[(2, 3)]");
//! ```

mod anomaly;
mod error;

pub mod align;
pub mod dialog;
pub mod relation;
pub mod sense;
pub mod span;
pub mod tokenize;

pub use anomaly::{Anomaly, AnomalySink, Converted, TracingSink};
pub use error::{Error, Result};

pub use align::{align_span, index_tokens, slice_text, span_text_agrees, CharAlignment};
pub use dialog::{Dialog, DialogInfo, Layer, Token};
pub use relation::{DiscourseRelation, RawRelation, RelationLabel, Role};
pub use sense::{select_sense, SenseCandidate, SenseSelector};
pub use span::{
    expand_span, group_runs, indices_to_span, partition, partition_lengths, slice_sequence,
    Slice, Span,
};
pub use tokenize::{split_clitics, tokenize, Block, Group, Segmentation};
