//! File loading and saving.
//!
//! The only place in the workspace that touches the filesystem. Directory
//! traversal is left to callers: every function takes explicit paths.

use std::fs;
use std::path::{Path, PathBuf};

use layered_discourse::{Converted, Dialog, TracingSink};
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::errors::{IngestError, IngestResult};
use crate::mask::Mask;
use crate::pipe::convert_pipe;
use crate::relxml::convert_relxml;

/// Document id of a raw text file: file stem with `_` removed.
///
/// `data/07_04_000020.txt` -> `0704000020`
pub fn doc_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', ""))
        .unwrap_or_default()
}

/// Read a whole file, mapping I/O failures to [`IngestError::Load`].
pub fn read_text(path: &Path) -> IngestResult<String> {
    fs::read_to_string(path).map_err(|e| IngestError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Convert a raw text file and its pipe annotation table.
pub fn load_pipe_dialog(
    raw: &Path,
    annotations: &Path,
    config: &IngestConfig,
) -> IngestResult<Converted<Dialog>> {
    let doc_id = doc_id_from_path(raw);
    convert_pipe(&doc_id, &read_text(raw)?, &read_text(annotations)?, config)
}

/// Convert a RelXML file.
pub fn load_relxml_dialog(path: &Path, config: &IngestConfig) -> IngestResult<Converted<Dialog>> {
    convert_relxml(&read_text(path)?, config)
}

/// Load a persisted canonical document.
pub fn load_dialog(path: &Path) -> IngestResult<Converted<Dialog>> {
    let content = read_text(path)?;
    let mut sink = TracingSink::new(Vec::new()).for_document(path.display().to_string());
    let dialog = Dialog::from_json(&content, &mut sink)?;
    Ok(Converted::new(dialog, sink.into_inner()))
}

/// Write a dialog as `<dir>/<doc_id>.json`, returning the path written.
pub fn save_dialog(dialog: &Dialog, dir: &Path) -> IngestResult<PathBuf> {
    let path = dir.join(format!("{}.json", dialog.doc_id()));
    fs::write(&path, dialog.to_json()?).map_err(|e| IngestError::Save {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(path)
}

/// Load a mask file.
pub fn load_mask(path: &Path) -> IngestResult<Mask> {
    Mask::parse(&read_text(path)?)
}

/// Outcome of one document in a batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub result: IngestResult<Converted<Dialog>>,
}

/// Convert documents one by one. A failure is recorded for its document and
/// does not stop the batch.
pub fn convert_batch<I, P, F>(paths: I, mut convert: F) -> Vec<BatchEntry>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    F: FnMut(&Path) -> IngestResult<Converted<Dialog>>,
{
    paths
        .into_iter()
        .map(|path| {
            let path = path.as_ref().to_path_buf();
            let result = convert(&path);
            match &result {
                Ok(converted) => info!(
                    path = %path.display(),
                    doc_id = converted.value.doc_id(),
                    tokens = converted.value.tokens().len(),
                    relations = converted.value.relations().len(),
                    anomalies = converted.anomalies.len(),
                    "converted document"
                ),
                Err(err) => warn!(path = %path.display(), "failed to convert document: {}", err),
            }
            BatchEntry { path, result }
        })
        .collect()
}
