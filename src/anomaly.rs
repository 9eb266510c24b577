//! Non-fatal data-quality observations.
//!
//! Builders never log-and-forget: every anomaly goes through an [`AnomalySink`]
//! handed in by the caller, and conversions return their anomalies next to the
//! value in [`Converted`]. Whether an anomaly should stop a document is up to
//! the caller (see [`Converted::escalate`]).

use serde::Serialize;

use crate::relation::Role;
use crate::span::Slice;
use crate::Error;

/// A recorded, non-fatal issue found while building a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// A degenerate `begin == end` slice was dropped from a span.
    EmptySlice { at: usize },
    /// A sense-bearing relation (or a sense lookup) without any sense.
    MissingSense { label: Option<String> },
    /// More than one connective candidate; `chosen` was used.
    MultipleConnectives { count: usize, chosen: usize },
    /// The chosen candidate lists several senses; `chosen` was used.
    MultiSense { senses: Vec<String>, chosen: usize },
    /// One token carries several roles within a single relation.
    RoleConflict { token: usize, roles: Vec<Role> },
    /// A character span that covers no whole token.
    EmptyCharacterSpan { span: Vec<Slice> },
    /// A relation declared in the source that no token refers to.
    UnreferencedRelation { rid: String },
}

impl Anomaly {
    /// Stable short name, handy for grouping in audits.
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::EmptySlice { .. } => "empty slice",
            Anomaly::MissingSense { .. } => "missing sense",
            Anomaly::MultipleConnectives { .. } => "multiple connective candidates",
            Anomaly::MultiSense { .. } => "multi-sense",
            Anomaly::RoleConflict { .. } => "role conflict",
            Anomaly::EmptyCharacterSpan { .. } => "empty character span",
            Anomaly::UnreferencedRelation { .. } => "unreferenced relation",
        }
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::EmptySlice { at } => write!(f, "empty slice: {} == {}", at, at),
            Anomaly::MissingSense { label: Some(label) } => {
                write!(f, "{} relation has no sense label", label)
            }
            Anomaly::MissingSense { label: None } => write!(f, "relation has no sense label"),
            Anomaly::MultipleConnectives { count, chosen } => {
                write!(f, "{} connective candidates, using #{}", count, chosen)
            }
            Anomaly::MultiSense { senses, chosen } => {
                write!(f, "{} senses {:?}, using #{}", senses.len(), senses, chosen)
            }
            Anomaly::RoleConflict { token, roles } => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(f, "token {} has roles [{}]", token, names.join(", "))
            }
            Anomaly::EmptyCharacterSpan { span } => {
                write!(f, "character span {:?} covers no token", span)
            }
            Anomaly::UnreferencedRelation { rid } => {
                write!(f, "relation '{}' is not referenced by any token", rid)
            }
        }
    }
}

/// Destination for anomalies, passed explicitly into every builder.
pub trait AnomalySink {
    fn record(&mut self, anomaly: Anomaly);
}

impl AnomalySink for Vec<Anomaly> {
    fn record(&mut self, anomaly: Anomaly) {
        self.push(anomaly);
    }
}

impl<S: AnomalySink + ?Sized> AnomalySink for &mut S {
    fn record(&mut self, anomaly: Anomaly) {
        (**self).record(anomaly);
    }
}

/// Sink adapter that emits a `tracing` event before forwarding.
#[derive(Debug)]
pub struct TracingSink<S> {
    inner: S,
    doc_id: Option<String>,
}

impl<S: AnomalySink> TracingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            doc_id: None,
        }
    }

    /// Tag events with the document they belong to.
    pub fn for_document(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AnomalySink> AnomalySink for TracingSink<S> {
    fn record(&mut self, anomaly: Anomaly) {
        tracing::debug!(
            doc_id = self.doc_id.as_deref().unwrap_or("-"),
            kind = anomaly.kind(),
            "{}",
            anomaly
        );
        self.inner.record(anomaly);
    }
}

/// A built value together with the anomalies found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted<T> {
    pub value: T,
    pub anomalies: Vec<Anomaly>,
}

impl<T> Converted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            anomalies: Vec::new(),
        }
    }

    pub fn new(value: T, anomalies: Vec<Anomaly>) -> Self {
        Self { value, anomalies }
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }

    /// Anomalies of one kind (see [`Anomaly::kind`]).
    pub fn anomalies_of(&self, kind: &str) -> impl Iterator<Item = &Anomaly> + '_ {
        let kind = kind.to_string();
        self.anomalies.iter().filter(move |a| a.kind() == kind)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Converted<U> {
        Converted {
            value: f(self.value),
            anomalies: self.anomalies,
        }
    }

    /// Turn the first anomaly matching `is_fatal` into an error.
    pub fn escalate(self, is_fatal: impl Fn(&Anomaly) -> bool) -> Result<T, Error> {
        match self.anomalies.into_iter().find(|a| is_fatal(a)) {
            Some(anomaly) => Err(Error::Escalated(anomaly)),
            None => Ok(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Anomaly> = Vec::new();
        sink.record(Anomaly::EmptySlice { at: 3 });
        sink.record(Anomaly::MissingSense { label: None });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind(), "empty slice");
    }

    #[test]
    fn test_tracing_sink_forwards() {
        let mut sink = TracingSink::new(Vec::new()).for_document("d1");
        sink.record(Anomaly::UnreferencedRelation { rid: "4".into() });
        assert_eq!(sink.into_inner().len(), 1);
    }

    #[test]
    fn test_escalate() {
        let converted = Converted::new(1, vec![Anomaly::EmptySlice { at: 0 }]);
        assert!(converted.has_anomalies());
        assert_eq!(converted.clone().escalate(|_| false), Ok(1));
        assert_eq!(
            converted.escalate(|a| matches!(a, Anomaly::EmptySlice { .. })),
            Err(Error::Escalated(Anomaly::EmptySlice { at: 0 }))
        );
    }

    #[test]
    fn test_display() {
        let anomaly = Anomaly::RoleConflict {
            token: 410,
            roles: vec![Role::Conn, Role::Arg2],
        };
        insta::assert_snapshot!(anomaly.to_string(), @"token 410 has roles [conn, arg2]");
    }
}
