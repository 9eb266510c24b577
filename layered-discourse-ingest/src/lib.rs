#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Ingestion adapters for PDTB-style discourse annotated dialogs.
//!
//! Two corpus formats are read into one [`layered_discourse::Dialog`]:
//!
//! - [`pipe`] - raw text plus a `|`-delimited table of character-offset spans
//! - [`relxml`] - legacy XML with per-token relation roles
//!
//! Both adapters return a [`Converted`] dialog: the value and every anomaly
//! found on the way. Fatal problems are [`IngestError`]s.
//!
//! ## Modules
//!
//! - [`config`] - sense selection settings loaded from TOML
//! - [`mask`] - token masks replacing dialog tokens 1:1
//! - [`patch`] - explicit corrections for known-defective documents
//! - [`loader`] - file loading, saving and batch conversion
//! - [`errors`] - error types
//!
//! ## Example
//!
//! ```
//! use layered_discourse_ingest::{convert_pipe, IngestConfig};
//!
//! let text = "I left because it rained .";
//! let row = "Explicit|7..14|||||||Contingency.Cause.Reason||||||0..6||||||15..24";
//! let converted = convert_pipe("d1", text, row, &IngestConfig::default()).unwrap();
//!
//! let relation = &converted.value.relations()[0];
//! assert_eq!(relation.conn.to_string(), "[(2, 3)]");
//! assert_eq!(relation.sense.as_deref(), Some("Contingency.Cause"));
//! ```

pub mod config;
pub mod errors;
pub mod loader;
pub mod mask;
pub mod patch;
pub mod pipe;
pub mod relxml;


pub use config::{IngestConfig, RESTATEMENT_OVERRIDES};
pub use errors::{IngestError, IngestResult};
pub use layered_discourse::Converted;
pub use loader::{
    convert_batch, doc_id_from_path, load_dialog, load_mask, load_pipe_dialog,
    load_relxml_dialog, read_text, save_dialog, BatchEntry,
};
pub use mask::Mask;
pub use patch::{apply_known_fixes, KnownFix, Target, KNOWN_FIXES};
pub use pipe::{
    convert_pipe, parse_annotations, parse_char_span, read_pipe_dialog, AnnotationRow,
};
pub use relxml::{convert_relxml, read_relxml_dialog, RelXmlDocument};
