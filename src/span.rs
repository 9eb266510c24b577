//! Slice and span algebra over token (or character) sequences.
//!
//! A [`Slice`] is a half-open `(begin, end)` range; a [`Span`] is an ordered
//! list of slices describing one possibly discontinuous argument. Spans only
//! come out of this module in canonical form: sorted, no empty slices, and no
//! two slices touching or overlapping.

use serde::{Deserialize, Serialize};

use crate::{Anomaly, AnomalySink, Error, Result};

/// Half-open range `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Slice {
    pub begin: usize,
    pub end: usize,
}

impl Slice {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }

    /// Containment test used for structural layers: `begin <= index < end`.
    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index < self.end
    }

    /// True when `other` lies entirely inside `self`.
    pub fn covers(&self, other: &Slice) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.begin..self.end
    }
}

impl From<(usize, usize)> for Slice {
    fn from((begin, end): (usize, usize)) -> Self {
        Self { begin, end }
    }
}

impl From<Slice> for (usize, usize) {
    fn from(slice: Slice) -> Self {
        (slice.begin, slice.end)
    }
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.begin, self.end)
    }
}

/// Canonical, possibly discontinuous argument span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Span(Vec<Slice>);

impl Span {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build the span covering exactly the given indices.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        indices_to_span(indices)
    }

    /// Sanitize raw slices into a span.
    ///
    /// Degenerate `begin == end` slices are dropped and reported as
    /// [`Anomaly::EmptySlice`]; `begin > end` is fatal. Unsorted or touching
    /// slices are merged into canonical form.
    pub fn from_slices<S>(slices: &[Slice], sink: &mut S) -> Result<Self>
    where
        S: AnomalySink + ?Sized,
    {
        let mut kept = Vec::with_capacity(slices.len());
        for slice in slices {
            if slice.begin > slice.end {
                return Err(Error::InvalidSlice {
                    begin: slice.begin,
                    end: slice.end,
                });
            }
            if slice.begin == slice.end {
                sink.record(Anomaly::EmptySlice { at: slice.begin });
                continue;
            }
            kept.push(*slice);
        }

        if is_canonical(&kept) {
            Ok(Self(kept))
        } else {
            Ok(indices_to_span(kept.iter().flat_map(|s| s.range())))
        }
    }

    pub fn slices(&self) -> &[Slice] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slice> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of covered indices (not slices).
    pub fn width(&self) -> usize {
        self.0.iter().map(Slice::len).sum()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.iter().any(|s| s.contains(index))
    }

    /// Covered indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        expand_span(&self.0)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, slice) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", slice)?;
        }
        write!(f, "]")
    }
}

impl<'a> IntoIterator for &'a Span {
    type Item = &'a Slice;
    type IntoIter = std::slice::Iter<'a, Slice>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn is_canonical(slices: &[Slice]) -> bool {
    slices.windows(2).all(|w| w[0].end < w[1].begin)
}

/// Offsets of each sub-list inside the flattened concatenation.
///
/// Sub-list order must equal flattening order. The result starts at 0, is
/// contiguous (`out[i].end == out[i + 1].begin`) and ends at the total length.
pub fn partition<T>(nested: &[Vec<T>]) -> Vec<Slice> {
    partition_lengths(nested.iter().map(Vec::len))
}

/// [`partition`] over bare lengths.
pub fn partition_lengths(lengths: impl IntoIterator<Item = usize>) -> Vec<Slice> {
    let mut offset = 0;
    lengths
        .into_iter()
        .map(|len| {
            let slice = Slice::new(offset, offset + len);
            offset += len;
            slice
        })
        .collect()
}

/// Split a set of integers into maximal sorted runs of `step`-spaced values.
pub fn group_runs(indices: impl IntoIterator<Item = usize>, step: usize) -> Vec<Vec<usize>> {
    let mut values: Vec<usize> = indices.into_iter().collect();
    values.sort_unstable();
    values.dedup();

    let (first, last) = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Vec::new(),
    };

    // already a single run
    if step == 1 && last - first + 1 == values.len() {
        return vec![values];
    }

    let mut runs: Vec<Vec<usize>> = Vec::new();
    for value in values {
        match runs.last_mut() {
            Some(run) if run.last().map_or(false, |&prev| prev + step == value) => {
                run.push(value);
                continue;
            }
            _ => {}
        }
        runs.push(vec![value]);
    }
    runs
}

/// Canonical span covering exactly `indices`.
pub fn indices_to_span(indices: impl IntoIterator<Item = usize>) -> Span {
    Span(
        group_runs(indices, 1)
            .into_iter()
            .filter_map(|run| match (run.first(), run.last()) {
                (Some(&min), Some(&max)) => Some(Slice::new(min, max + 1)),
                _ => None,
            })
            .collect(),
    )
}

/// Sorted indices covered by a list of slices.
pub fn expand_span(slices: &[Slice]) -> Vec<usize> {
    let mut indices: Vec<usize> = slices.iter().flat_map(|s| s.range()).collect();
    indices.sort_unstable();
    indices
}

/// Elements of `seq` covered by each slice of `span`, one group per slice.
///
/// Slices running past the end of `seq` are clipped.
pub fn slice_sequence<'a, T>(seq: &'a [T], span: &Span) -> Vec<&'a [T]> {
    span.iter()
        .map(|s| {
            let end = s.end.min(seq.len());
            let begin = s.begin.min(end);
            &seq[begin..end]
        })
        .collect()
}
