//! Corrections for documents known to be defective in the corpus.
//!
//! Nothing here runs implicitly: callers apply the fixes to the documents
//! they load.

use layered_discourse::{AnomalySink, Dialog, Role, Slice, Span};
use tracing::info;

use crate::errors::IngestResult;

/// Which relation of a document a fix targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Last,
}

/// A span replacement for one relation of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownFix {
    pub doc_id: &'static str,
    pub relation: Target,
    pub role: Role,
    pub slices: &'static [Slice],
    pub reason: &'static str,
}

pub const KNOWN_FIXES: &[KnownFix] = &[KnownFix {
    doc_id: "0704000020",
    relation: Target::Last,
    role: Role::Arg2,
    slices: &[Slice { begin: 411, end: 414 }],
    reason: "token 410 is both conn and arg2 of the last relation",
}];

impl KnownFix {
    pub fn applies_to(&self, dialog: &Dialog) -> bool {
        dialog.doc_id() == self.doc_id
    }

    /// Rewrite the targeted span. Role conflicts that remain are reported to `sink`.
    pub fn apply<S>(&self, dialog: &mut Dialog, sink: &mut S) -> IngestResult<()>
    where
        S: AnomalySink + ?Sized,
    {
        let index = match self.relation {
            Target::Index(index) => index,
            // an empty document reports relation 0 as missing
            Target::Last => dialog.relations().len().saturating_sub(1),
        };
        let span = Span::from_slices(self.slices, sink)?;
        dialog.correct_span(index, self.role, span, sink)?;
        info!(
            doc_id = self.doc_id,
            relation = index,
            role = %self.role,
            "applied known fix: {}",
            self.reason
        );
        Ok(())
    }
}

/// Apply every known fix that targets this dialog; returns how many did.
pub fn apply_known_fixes<S>(dialog: &mut Dialog, sink: &mut S) -> IngestResult<usize>
where
    S: AnomalySink + ?Sized,
{
    let fixes: Vec<&KnownFix> = KNOWN_FIXES
        .iter()
        .filter(|fix| fix.applies_to(dialog))
        .collect();
    for fix in &fixes {
        fix.apply(dialog, sink)?;
    }
    Ok(fixes.len())
}
