//! The canonical document: tokens, structural layers and relations.
//!
//! Both ingestion formats produce a [`Dialog`]. Structural layers are
//! partitions of the token sequence built with [`crate::span::partition`], so
//! they are contiguous and non-overlapping by construction. Layers read back
//! from JSON are checked on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::relation::{DiscourseRelation, RawRelation, Role};
use crate::span::{Slice, Span};
use crate::{AnomalySink, Error, Result};

/// Structural partitions a dialog may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Sentence units from parses (XML) or tab-separated cells (raw text)
    Block,
    /// Line units from raw text
    Group,
    /// Raw-text chunks, kept for documents persisted with that layer
    Chunk,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Block => "block",
            Layer::Group => "group",
            Layer::Chunk => "chunk",
        }
    }
}

/// A discourse-annotated dialog over a flat token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    doc_id: String,
    tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<Vec<Slice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<Slice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunks: Option<Vec<Slice>>,
    relations: Vec<DiscourseRelation>,
}

/// One token with everything the dialog knows about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub index: usize,
    pub block: Option<usize>,
    pub group: Option<usize>,
    pub chunk: Option<usize>,
    /// Relation ordinal -> roles that relation gives this token
    pub roles: BTreeMap<usize, Vec<Role>>,
}

/// Element counts of a dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DialogInfo {
    pub tokens: usize,
    pub blocks: usize,
    pub groups: usize,
    pub chunks: usize,
    pub relations: usize,
}

#[derive(Deserialize)]
struct PersistedDialog {
    #[serde(alias = "DOC_ID")]
    doc_id: String,
    tokens: Vec<String>,
    #[serde(default)]
    blocks: Option<Vec<Slice>>,
    #[serde(default)]
    groups: Option<Vec<Slice>>,
    #[serde(default)]
    chunks: Option<Vec<Slice>>,
    #[serde(default)]
    relations: Vec<RawRelation>,
}

impl Dialog {
    pub fn new(doc_id: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            tokens,
            blocks: None,
            groups: None,
            chunks: None,
            relations: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: Layer, slices: Vec<Slice>) -> Self {
        match layer {
            Layer::Block => self.blocks = Some(slices),
            Layer::Group => self.groups = Some(slices),
            Layer::Chunk => self.chunks = Some(slices),
        }
        self
    }

    pub fn with_relations(mut self, relations: Vec<DiscourseRelation>) -> Self {
        self.relations = relations;
        self
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn relations(&self) -> &[DiscourseRelation] {
        &self.relations
    }

    pub fn layer(&self, layer: Layer) -> Option<&[Slice]> {
        match layer {
            Layer::Block => self.blocks.as_deref(),
            Layer::Group => self.groups.as_deref(),
            Layer::Chunk => self.chunks.as_deref(),
        }
    }

    pub fn info(&self) -> DialogInfo {
        let count = |layer| self.layer(layer).map_or(0, <[Slice]>::len);
        DialogInfo {
            tokens: self.tokens.len(),
            blocks: count(Layer::Block),
            groups: count(Layer::Group),
            chunks: count(Layer::Chunk),
            relations: self.relations.len(),
        }
    }

    /// Token-level view of the dialog.
    ///
    /// Layer membership is found by containment in the matching partition;
    /// tokens outside every slice of a layer keep `None`. Roles are gathered
    /// across all relations, keyed by relation ordinal.
    pub fn astokens(&self) -> Vec<Token> {
        let roles = self
            .relations
            .iter()
            .enumerate()
            .flat_map(|(ordinal, relation)| {
                relation
                    .role_map()
                    .into_iter()
                    .map(move |(index, roles)| (index, ordinal, roles))
            })
            .fold(
                BTreeMap::<usize, BTreeMap<usize, Vec<Role>>>::new(),
                |mut acc, (index, ordinal, roles)| {
                    acc.entry(index).or_default().insert(ordinal, roles);
                    acc
                },
            );

        self.tokens
            .iter()
            .enumerate()
            .map(|(index, text)| Token {
                text: text.clone(),
                index,
                block: owner(self.layer(Layer::Block), index),
                group: owner(self.layer(Layer::Group), index),
                chunk: owner(self.layer(Layer::Chunk), index),
                roles: roles.get(&index).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Replace every token 1:1; the replacement must have the same length.
    pub fn apply_mask(&mut self, tokens: Vec<String>) -> Result<()> {
        if tokens.len() != self.tokens.len() {
            return Err(Error::MaskLength {
                doc_id: self.doc_id.clone(),
                expected: self.tokens.len(),
                found: tokens.len(),
            });
        }
        self.tokens = tokens;
        Ok(())
    }

    /// Manual fixup of a single relation span in a known-defective document.
    pub fn correct_span<S>(
        &mut self,
        relation: usize,
        role: Role,
        span: Span,
        sink: &mut S,
    ) -> Result<()>
    where
        S: AnomalySink + ?Sized,
    {
        let current = self
            .relations
            .get(relation)
            .cloned()
            .ok_or_else(|| Error::NoSuchRelation {
                doc_id: self.doc_id.clone(),
                index: relation,
            })?;
        self.relations[relation] = current.with_span(role, span, sink);
        Ok(())
    }

    /// Decode a persisted document, validating every relation again.
    ///
    /// Stored layers must still partition the tokens: slices in order, each
    /// starting where the previous one ended, from 0 to the token count.
    pub fn from_json<S>(json: &str, sink: &mut S) -> Result<Self>
    where
        S: AnomalySink + ?Sized,
    {
        let persisted: PersistedDialog = serde_json::from_str(json)?;
        let count = persisted.tokens.len();
        check_partition(Layer::Block, persisted.blocks.as_deref(), count)?;
        check_partition(Layer::Group, persisted.groups.as_deref(), count)?;
        check_partition(Layer::Chunk, persisted.chunks.as_deref(), count)?;

        let relations = persisted
            .relations
            .into_iter()
            .map(|raw| DiscourseRelation::build(raw, sink))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            doc_id: persisted.doc_id,
            tokens: persisted.tokens,
            blocks: persisted.blocks,
            groups: persisted.groups,
            chunks: persisted.chunks,
            relations,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_partition(layer: Layer, slices: Option<&[Slice]>, tokens: usize) -> Result<()> {
    let slices = match slices {
        Some(slices) => slices,
        None => return Ok(()),
    };
    let invalid = |reason: String| Error::InvalidPartition {
        layer: layer.as_str(),
        tokens,
        reason,
    };

    let mut cursor = 0;
    for slice in slices {
        if slice.begin > slice.end {
            return Err(Error::InvalidSlice {
                begin: slice.begin,
                end: slice.end,
            });
        }
        if slice.begin != cursor {
            return Err(invalid(format!("{} should start at {}", slice, cursor)));
        }
        cursor = slice.end;
    }
    if cursor != tokens {
        return Err(invalid(format!("slices end at {}", cursor)));
    }
    Ok(())
}

fn owner(slices: Option<&[Slice]>, index: usize) -> Option<usize> {
    slices?.iter().position(|s| s.contains(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RawRelation;
    use crate::span::partition;
    use crate::Anomaly;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn sample() -> Dialog {
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let first = DiscourseRelation::build(
            RawRelation::new("Implicit")
                .with_sense(Some("Contingency.Cause".into()), Some("because".into()))
                .with_span(Role::Arg1, vec![Slice::new(0, 2)])
                .with_span(Role::Arg2, vec![Slice::new(3, 5)]),
            &mut anomalies,
        )
        .unwrap();
        let second = DiscourseRelation::build(
            RawRelation::new("EntRel")
                .with_span(Role::Arg1, vec![Slice::new(3, 5)])
                .with_span(Role::Arg2, vec![Slice::new(5, 6)]),
            &mut anomalies,
        )
        .unwrap();
        assert!(anomalies.is_empty());

        Dialog::new("d1", words("I left because it rained ."))
            .with_layer(Layer::Block, partition(&[vec![0; 3], vec![0; 3]]))
            .with_layer(Layer::Group, vec![Slice::new(0, 6)])
            .with_relations(vec![first, second])
    }

    #[test]
    fn test_info() {
        let info = sample().info();
        assert_eq!(
            info,
            DialogInfo {
                tokens: 6,
                blocks: 2,
                groups: 1,
                chunks: 0,
                relations: 2
            }
        );
    }

    #[test]
    fn test_astokens_layers() {
        let tokens = sample().astokens();
        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens[4].block, Some(1));
        // group membership follows the group layer, not the blocks
        assert_eq!(tokens[4].group, Some(0));
        assert_eq!(tokens[4].chunk, None);
    }

    #[test]
    fn test_astokens_roles_across_relations() {
        let tokens = sample().astokens();
        assert!(tokens[2].roles.is_empty());
        assert_eq!(tokens[3].roles.get(&0), Some(&vec![Role::Arg2]));
        assert_eq!(tokens[3].roles.get(&1), Some(&vec![Role::Arg1]));
        assert_eq!(tokens[5].roles.len(), 1);
    }

    #[test]
    fn test_astokens_uncovered_tokens() {
        let dialog =
            Dialog::new("d2", words("a b c")).with_layer(Layer::Block, vec![Slice::new(0, 2)]);
        let tokens = dialog.astokens();
        assert_eq!(tokens[1].block, Some(0));
        assert_eq!(tokens[2].block, None);
    }

    #[test]
    fn test_apply_mask() {
        let mut dialog = sample();
        assert_eq!(
            dialog.apply_mask(words("X X")),
            Err(Error::MaskLength {
                doc_id: "d1".into(),
                expected: 6,
                found: 2
            })
        );
        dialog.apply_mask(words("A B C D E F")).unwrap();
        assert_eq!(dialog.tokens()[5], "F");
    }

    #[test]
    fn test_correct_span() {
        let mut dialog = sample();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        dialog
            .correct_span(1, Role::Arg2, Span::from_indices(vec![4, 5]), &mut anomalies)
            .unwrap();
        assert_eq!(
            anomalies,
            vec![Anomaly::RoleConflict {
                token: 4,
                roles: vec![Role::Arg1, Role::Arg2]
            }]
        );
        assert!(dialog
            .correct_span(9, Role::Arg2, Span::empty(), &mut anomalies)
            .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let dialog = sample();
        let json = dialog.to_json().unwrap();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let loaded = Dialog::from_json(&json, &mut anomalies).unwrap();
        assert_eq!(loaded, dialog);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_from_json_legacy_key() {
        let json = r#"{
            "DOC_ID": "0704000020",
            "tokens": ["ok", "then"],
            "blocks": [[0, 2]],
            "relations": [{"label": "NoRel", "arg1": [[0, 1]], "arg2": [[1, 1]]}]
        }"#;
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let dialog = Dialog::from_json(json, &mut anomalies).unwrap();
        assert_eq!(dialog.doc_id(), "0704000020");
        assert_eq!(dialog.layer(Layer::Group), None);
        assert_eq!(anomalies, vec![Anomaly::EmptySlice { at: 1 }]);
    }

    #[test]
    fn test_from_json_rejects_broken_partitions() {
        let load = |layer: &str| {
            let json = format!(r#"{{"doc_id": "x", "tokens": ["a", "b", "c"], {}}}"#, layer);
            Dialog::from_json(&json, &mut Vec::<Anomaly>::new())
        };

        assert!(matches!(
            load(r#""blocks": [[0, 3], [1, 2], [5, 1]]"#),
            Err(Error::InvalidPartition { layer: "block", .. })
        ));
        assert!(matches!(
            load(r#""groups": [[0, 1], [2, 3]]"#),
            Err(Error::InvalidPartition { layer: "group", .. })
        ));
        assert!(matches!(
            load(r#""chunks": [[0, 2]]"#),
            Err(Error::InvalidPartition { layer: "chunk", .. })
        ));
        assert_eq!(
            load(r#""blocks": [[0, 2], [2, 1]]"#),
            Err(Error::InvalidSlice { begin: 2, end: 1 })
        );
        assert!(load(r#""blocks": [[0, 1], [1, 3]], "groups": [[0, 3]]"#).is_ok());
    }

    #[test]
    fn test_from_json_unknown_label() {
        let json = r#"{"doc_id": "x", "tokens": [], "relations": [{"label": "Bogus"}]}"#;
        let mut anomalies: Vec<Anomaly> = Vec::new();
        assert_eq!(
            Dialog::from_json(json, &mut anomalies),
            Err(Error::UnknownRelationType("Bogus".into()))
        );
    }
}
