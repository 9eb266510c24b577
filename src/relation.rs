//! Discourse relations and the roles their spans play.
//!
//! A relation links up to five token spans (connective, two arguments and
//! two supplements) under a PDTB relation type and an optional sense.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sense::SenseCandidate;
use crate::span::{Slice, Span};
use crate::{Anomaly, AnomalySink, Error, Result};

/// Role of a span with respect to its relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Explicit or inferred connective
    Conn,
    /// First argument
    Arg1,
    /// Second argument
    Arg2,
    /// Supplementary material for Arg1
    Sup1,
    /// Supplementary material for Arg2
    Sup2,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Conn, Role::Arg1, Role::Arg2, Role::Sup1, Role::Sup2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Conn => "conn",
            Role::Arg1 => "arg1",
            Role::Arg2 => "arg2",
            Role::Sup1 => "sup1",
            Role::Sup2 => "sup2",
        }
    }

    /// Canonical role from a source attribute such as `Arg1` or `Connective`:
    /// the first four characters, lowercased.
    pub fn from_key(key: &str) -> Option<Role> {
        let key: String = key.chars().take(4).collect::<String>().to_lowercase();
        Role::ALL.iter().copied().find(|role| role.as_str() == key)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PDTB relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationLabel {
    Explicit,
    Implicit,
    AltLex,
    EntRel,
    NoRel,
}

impl RelationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationLabel::Explicit => "Explicit",
            RelationLabel::Implicit => "Implicit",
            RelationLabel::AltLex => "AltLex",
            RelationLabel::EntRel => "EntRel",
            RelationLabel::NoRel => "NoRel",
        }
    }

    /// Types that are expected to carry a sense.
    pub fn is_sense_bearing(&self) -> bool {
        matches!(
            self,
            RelationLabel::Explicit | RelationLabel::Implicit | RelationLabel::AltLex
        )
    }
}

impl FromStr for RelationLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Explicit" => Ok(RelationLabel::Explicit),
            "Implicit" => Ok(RelationLabel::Implicit),
            "AltLex" => Ok(RelationLabel::AltLex),
            "EntRel" => Ok(RelationLabel::EntRel),
            "NoRel" => Ok(RelationLabel::NoRel),
            other => Err(Error::UnknownRelationType(other.to_string())),
        }
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated relation as read from a source.
///
/// This is also the shape of a relation in the persisted JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRelation {
    pub label: String,
    #[serde(default)]
    pub sense: Option<String>,
    #[serde(default)]
    pub connective: Option<String>,
    #[serde(default)]
    pub conn: Vec<Slice>,
    #[serde(default)]
    pub arg1: Vec<Slice>,
    #[serde(default)]
    pub arg2: Vec<Slice>,
    #[serde(default)]
    pub sup1: Vec<Slice>,
    #[serde(default)]
    pub sup2: Vec<Slice>,
}

impl RawRelation {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_sense(mut self, sense: Option<String>, connective: Option<String>) -> Self {
        self.sense = sense;
        self.connective = connective;
        self
    }

    pub fn with_span(mut self, role: Role, slices: Vec<Slice>) -> Self {
        *self.span_mut(role) = slices;
        self
    }

    pub fn span_mut(&mut self, role: Role) -> &mut Vec<Slice> {
        match role {
            Role::Conn => &mut self.conn,
            Role::Arg1 => &mut self.arg1,
            Role::Arg2 => &mut self.arg2,
            Role::Sup1 => &mut self.sup1,
            Role::Sup2 => &mut self.sup2,
        }
    }
}

/// A validated discourse relation over token indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscourseRelation {
    pub label: RelationLabel,
    pub sense: Option<String>,
    pub connective: Option<String>,
    pub conn: Span,
    pub arg1: Span,
    pub arg2: Span,
    pub sup1: Span,
    pub sup2: Span,
}

impl DiscourseRelation {
    /// Validate a raw relation.
    ///
    /// Spans are sanitized first (empty slices dropped, inverted slices
    /// fatal), then the label is checked. A missing sense on a sense-bearing
    /// type and tokens holding several roles are reported to `sink`.
    pub fn build<S>(raw: RawRelation, sink: &mut S) -> Result<Self>
    where
        S: AnomalySink + ?Sized,
    {
        Self::validate(raw, true, sink)
    }

    /// Validate a relation whose sense came from [`crate::select_sense`] over
    /// `candidates`.
    ///
    /// `select_sense` already reports a relation without any candidate, so a
    /// missing sense is only reported here when there were candidates to pick
    /// from.
    pub fn build_selected<S>(
        raw: RawRelation,
        candidates: &[SenseCandidate],
        sink: &mut S,
    ) -> Result<Self>
    where
        S: AnomalySink + ?Sized,
    {
        Self::validate(raw, !candidates.is_empty(), sink)
    }

    fn validate<S>(raw: RawRelation, report_missing_sense: bool, sink: &mut S) -> Result<Self>
    where
        S: AnomalySink + ?Sized,
    {
        let conn = Span::from_slices(&raw.conn, sink)?;
        let arg1 = Span::from_slices(&raw.arg1, sink)?;
        let arg2 = Span::from_slices(&raw.arg2, sink)?;
        let sup1 = Span::from_slices(&raw.sup1, sink)?;
        let sup2 = Span::from_slices(&raw.sup2, sink)?;

        let label: RelationLabel = raw.label.parse()?;

        if report_missing_sense && label.is_sense_bearing() && raw.sense.is_none() {
            sink.record(Anomaly::MissingSense {
                label: Some(label.to_string()),
            });
        }

        let relation = Self {
            label,
            sense: raw.sense,
            connective: raw.connective,
            conn,
            arg1,
            arg2,
            sup1,
            sup2,
        };
        relation.check_roles(sink);
        Ok(relation)
    }

    pub fn span(&self, role: Role) -> &Span {
        match role {
            Role::Conn => &self.conn,
            Role::Arg1 => &self.arg1,
            Role::Arg2 => &self.arg2,
            Role::Sup1 => &self.sup1,
            Role::Sup2 => &self.sup2,
        }
    }

    pub fn spans(&self) -> impl Iterator<Item = (Role, &Span)> + '_ {
        Role::ALL.iter().map(move |&role| (role, self.span(role)))
    }

    /// Token index -> roles this relation assigns to it.
    pub fn role_map(&self) -> BTreeMap<usize, Vec<Role>> {
        self.spans()
            .flat_map(|(role, span)| span.indices().into_iter().map(move |i| (i, role)))
            .fold(BTreeMap::new(), |mut map, (index, role)| {
                map.entry(index).or_insert_with(Vec::new).push(role);
                map
            })
    }

    /// Replace one span, re-running the role conflict check.
    pub fn with_span<S>(mut self, role: Role, span: Span, sink: &mut S) -> Self
    where
        S: AnomalySink + ?Sized,
    {
        match role {
            Role::Conn => self.conn = span,
            Role::Arg1 => self.arg1 = span,
            Role::Arg2 => self.arg2 = span,
            Role::Sup1 => self.sup1 = span,
            Role::Sup2 => self.sup2 = span,
        }
        self.check_roles(sink);
        self
    }

    fn check_roles<S>(&self, sink: &mut S)
    where
        S: AnomalySink + ?Sized,
    {
        for (token, roles) in self.role_map() {
            if roles.len() > 1 {
                sink.record(Anomaly::RoleConflict { token, roles });
            }
        }
    }
}
