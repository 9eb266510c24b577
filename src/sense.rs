//! Canonical sense and connective selection.
//!
//! Annotations may carry several connective candidates, each with several
//! senses. [`select_sense`] picks one deterministically, reduces the sense to
//! the requested depth of the dot-separated hierarchy and reports every
//! ambiguity it had to resolve.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Anomaly, AnomalySink};

/// One connective candidate and the senses annotated for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseCandidate {
    pub connective: Option<String>,
    pub senses: Vec<String>,
}

impl SenseCandidate {
    pub fn new<C, I, S>(connective: Option<C>, senses: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connective: connective.map(Into::into),
            senses: senses.into_iter().map(Into::into).collect(),
        }
    }

    /// Neither a connective nor any sense.
    pub fn is_blank(&self) -> bool {
        self.connective.is_none() && self.senses.is_empty()
    }
}

/// How to choose among candidates and how deep to keep the sense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenseSelector {
    /// Preferred candidate, clamped to the last one.
    pub conn_index: usize,
    /// Preferred sense of the chosen candidate, clamped to the last one.
    pub sense_index: usize,
    /// Number of hierarchy levels to keep; 0 keeps the full sense.
    pub level: usize,
    /// Senses kept verbatim regardless of `level`.
    pub overrides: BTreeSet<String>,
}

impl Default for SenseSelector {
    fn default() -> Self {
        Self {
            conn_index: 0,
            sense_index: 0,
            level: 2,
            overrides: BTreeSet::new(),
        }
    }
}

impl SenseSelector {
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides = overrides.into_iter().map(Into::into).collect();
        self
    }

    /// Reduce a sense to `level` components unless it is an override.
    pub fn truncate(&self, sense: &str) -> String {
        if self.level == 0 || self.overrides.contains(sense) {
            return sense.to_string();
        }
        sense
            .split('.')
            .take(self.level)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Pick `(sense, connective)` from the candidates.
///
/// `label` only labels the [`Anomaly::MissingSense`] reported when there is
/// no candidate at all.
pub fn select_sense<S>(
    candidates: &[SenseCandidate],
    selector: &SenseSelector,
    label: Option<&str>,
    sink: &mut S,
) -> (Option<String>, Option<String>)
where
    S: AnomalySink + ?Sized,
{
    let last = match candidates.len().checked_sub(1) {
        Some(last) => last,
        None => {
            sink.record(Anomaly::MissingSense {
                label: label.map(str::to_string),
            });
            return (None, None);
        }
    };

    let chosen = selector.conn_index.min(last);
    if candidates.len() > 1 {
        sink.record(Anomaly::MultipleConnectives {
            count: candidates.len(),
            chosen,
        });
    }
    let candidate = &candidates[chosen];

    let sense = match candidate.senses.len() {
        0 => None,
        n => {
            let index = selector.sense_index.min(n - 1);
            if n > 1 {
                sink.record(Anomaly::MultiSense {
                    senses: candidate.senses.clone(),
                    chosen: index,
                });
            }
            Some(candidate.senses[index].as_str())
        }
    };

    let sense = sense
        .filter(|s| !s.is_empty())
        .map(|s| selector.truncate(s));

    (sense, candidate.connective.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(
        candidates: &[SenseCandidate],
        selector: &SenseSelector,
    ) -> ((Option<String>, Option<String>), Vec<Anomaly>) {
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let result = select_sense(candidates, selector, Some("Implicit"), &mut anomalies);
        (result, anomalies)
    }

    #[test]
    fn test_no_candidates() {
        let (result, anomalies) = select(&[], &SenseSelector::default());
        assert_eq!(result, (None, None));
        assert_eq!(
            anomalies,
            vec![Anomaly::MissingSense {
                label: Some("Implicit".into())
            }]
        );
    }

    #[test]
    fn test_single_candidate() {
        let candidates = [SenseCandidate::new(Some("and"), ["Expansion.Conjunction"])];
        let (result, anomalies) = select(&candidates, &SenseSelector::default());
        assert_eq!(
            result,
            (Some("Expansion.Conjunction".into()), Some("and".into()))
        );
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_truncates_to_level() {
        let candidates = [SenseCandidate::new(
            None::<String>,
            ["Expansion.Restatement.Equivalence"],
        )];
        let (result, _) = select(&candidates, &SenseSelector::default());
        assert_eq!(result.0.as_deref(), Some("Expansion.Restatement"));

        let (result, _) = select(&candidates, &SenseSelector::default().with_level(1));
        assert_eq!(result.0.as_deref(), Some("Expansion"));

        let (result, _) = select(&candidates, &SenseSelector::default().with_level(0));
        assert_eq!(result.0.as_deref(), Some("Expansion.Restatement.Equivalence"));
    }

    #[test]
    fn test_override_kept_verbatim() {
        let candidates = [SenseCandidate::new(
            None::<String>,
            ["Expansion.Restatement.Equivalence"],
        )];
        let selector =
            SenseSelector::default().with_overrides(["Expansion.Restatement.Equivalence"]);
        let (result, _) = select(&candidates, &selector);
        assert_eq!(
            result,
            (Some("Expansion.Restatement.Equivalence".into()), None)
        );
    }

    #[test]
    fn test_multiple_candidates_clamped() {
        let candidates = [
            SenseCandidate::new(Some("ma"), ["Comparison.Contrast.Semantic contrast"]),
            SenseCandidate::new(Some("e"), ["Expansion.Conjunction"]),
        ];
        let selector = SenseSelector {
            conn_index: 5,
            ..SenseSelector::default()
        };
        let (result, anomalies) = select(&candidates, &selector);
        assert_eq!(
            result,
            (Some("Expansion.Conjunction".into()), Some("e".into()))
        );
        assert_eq!(
            anomalies,
            vec![Anomaly::MultipleConnectives {
                count: 2,
                chosen: 1
            }]
        );
    }

    #[test]
    fn test_multi_sense() {
        let candidates = [SenseCandidate::new(
            Some("because"),
            ["Contingency.Cause.Reason", "Temporal.Asynchronous"],
        )];
        let selector = SenseSelector {
            sense_index: 1,
            ..SenseSelector::default()
        };
        let (result, anomalies) = select(&candidates, &selector);
        assert_eq!(result.0.as_deref(), Some("Temporal.Asynchronous"));
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind(), "multi-sense");
    }

    #[test]
    fn test_candidate_without_senses() {
        let candidates = [SenseCandidate::new(Some("so"), Vec::<String>::new())];
        let (result, anomalies) = select(&candidates, &SenseSelector::default());
        assert_eq!(result, (None, Some("so".into())));
        assert!(anomalies.is_empty());
    }
}
