//! Token masks: tab-delimited files replacing document tokens 1:1.
//!
//! Each row is `doc_id \t ... \t token`; rows of one document are taken in
//! file order.

use std::collections::HashMap;

use layered_discourse::Dialog;

use crate::errors::{IngestError, IngestResult};
use crate::pipe::read_table;

/// Replacement tokens per document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    docs: HashMap<String, Vec<String>>,
}

impl Mask {
    pub fn parse(content: &str) -> IngestResult<Self> {
        let docs = read_table(content, b'\t')?.into_iter().fold(
            HashMap::new(),
            |mut docs: HashMap<String, Vec<String>>, row| {
                if let (Some(doc_id), Some(token)) = (row.first(), row.last()) {
                    docs.entry(doc_id.clone()).or_default().push(token.clone());
                }
                docs
            },
        );
        Ok(Self { docs })
    }

    pub fn tokens(&self, doc_id: &str) -> Option<&[String]> {
        self.docs.get(doc_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Replace the dialog's tokens with its masked ones.
    pub fn apply(&self, dialog: &mut Dialog) -> IngestResult<()> {
        let tokens = self
            .tokens(dialog.doc_id())
            .ok_or_else(|| IngestError::MaskMissing {
                doc_id: dialog.doc_id().to_string(),
            })?;
        dialog.apply_mask(tokens.to_vec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layered_discourse::Error;

    const MASK: &str = "d1\t0\tI\nd2\t0\tX\nd1\t1\tleft\nd1\t2\t<CONN>\n";

    fn dialog(doc_id: &str) -> Dialog {
        Dialog::new(
            doc_id,
            vec!["I".to_string(), "left".to_string(), "because".to_string()],
        )
    }

    #[test]
    fn test_parse_groups_by_document() {
        let mask = Mask::parse(MASK).unwrap();
        assert_eq!(mask.len(), 2);
        assert_eq!(mask.tokens("d1").unwrap(), &["I", "left", "<CONN>"]);
        assert_eq!(mask.tokens("d2").unwrap(), &["X"]);
    }

    #[test]
    fn test_apply() {
        let mask = Mask::parse(MASK).unwrap();
        let mut dialog = dialog("d1");
        mask.apply(&mut dialog).unwrap();
        assert_eq!(dialog.tokens(), &["I", "left", "<CONN>"]);
    }

    #[test]
    fn test_length_mismatch() {
        let mask = Mask::parse(MASK).unwrap();
        let mut dialog = dialog("d2");
        assert!(matches!(
            mask.apply(&mut dialog),
            Err(IngestError::Model(Error::MaskLength {
                expected: 3,
                found: 1,
                ..
            }))
        ));
        assert_eq!(dialog.tokens()[2], "because");
    }

    #[test]
    fn test_missing_document() {
        let mask = Mask::parse(MASK).unwrap();
        assert!(matches!(
            mask.apply(&mut dialog("d3")),
            Err(IngestError::MaskMissing { .. })
        ));
    }
}
