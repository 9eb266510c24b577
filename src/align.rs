//! Projection of character-offset annotations onto token indices.
//!
//! All offsets here are character (Unicode scalar) offsets, which is what the
//! annotation tables use; byte offsets never leave this module.

use crate::span::{indices_to_span, slice_sequence, Slice, Span};
use crate::{Anomaly, AnomalySink, Error, Result};

/// Character slice of every token, found greedily left to right.
///
/// Each search starts where the previous token ended, so repeated words map
/// to successive occurrences. Fails if a token cannot be found from the
/// cursor onward.
pub fn index_tokens<S: AsRef<str>>(text: &str, tokens: &[S]) -> Result<Vec<Slice>> {
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    let mut offsets = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        let found = text[byte_cursor..]
            .find(token)
            .ok_or_else(|| Error::TokenNotFound {
                token: token.to_string(),
                index,
                offset: char_cursor,
            })?;

        let begin_byte = byte_cursor + found;
        let begin = char_cursor + text[byte_cursor..begin_byte].chars().count();
        let end = begin + token.chars().count();

        offsets.push(Slice::new(begin, end));
        byte_cursor = begin_byte + token.len();
        char_cursor = end;
    }

    Ok(offsets)
}

/// Token span for a character span.
///
/// A token is selected when its character slice lies fully inside one of the
/// ranges. A non-empty character span that selects nothing is reported as
/// [`Anomaly::EmptyCharacterSpan`] and yields the empty span; an absent
/// (empty) character span is simply empty.
pub fn align_span<S>(char_span: &[Slice], token_slices: &[Slice], sink: &mut S) -> Span
where
    S: AnomalySink + ?Sized,
{
    if char_span.is_empty() {
        return Span::empty();
    }

    let span = indices_to_span(
        token_slices
            .iter()
            .enumerate()
            .filter(|(_, token)| char_span.iter().any(|range| range.covers(token)))
            .map(|(index, _)| index),
    );

    if span.is_empty() {
        sink.record(Anomaly::EmptyCharacterSpan {
            span: char_span.to_vec(),
        });
    }
    span
}

/// A raw text together with the character slice of each of its tokens.
#[derive(Debug, Clone)]
pub struct CharAlignment {
    offsets: Vec<Slice>,
}

impl CharAlignment {
    pub fn new<S: AsRef<str>>(text: &str, tokens: &[S]) -> Result<Self> {
        Ok(Self {
            offsets: index_tokens(text, tokens)?,
        })
    }

    pub fn offsets(&self) -> &[Slice] {
        &self.offsets
    }

    pub fn project<S>(&self, char_span: &[Slice], sink: &mut S) -> Span
    where
        S: AnomalySink + ?Sized,
    {
        align_span(char_span, &self.offsets, sink)
    }
}

/// Text covered by a character span, pieces joined by a single space.
pub fn slice_text(text: &str, char_span: &[Slice]) -> String {
    char_span
        .iter()
        .map(|s| text.chars().skip(s.begin).take(s.len()).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check that a token span reproduces the text of the character span it was
/// projected from, ignoring whitespace and double quotes.
pub fn span_text_agrees<T: AsRef<str>>(
    text: &str,
    char_span: &[Slice],
    tokens: &[T],
    token_span: &Span,
) -> bool {
    let annotated: String = slice_text(text, char_span)
        .chars()
        .filter(|c| *c != '"' && !c.is_whitespace())
        .collect();
    let projected: String = slice_sequence(tokens, token_span)
        .into_iter()
        .flatten()
        .map(|t| t.as_ref())
        .collect();
    annotated == projected
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "I left because it rained .";

    fn tokens() -> Vec<&'static str> {
        TEXT.split_whitespace().collect()
    }

    #[test]
    fn test_index_tokens() {
        let offsets = index_tokens(TEXT, &tokens()).unwrap();
        assert_eq!(offsets[0], Slice::new(0, 1));
        assert_eq!(offsets[2], Slice::new(7, 14));
        assert_eq!(offsets[5], Slice::new(25, 26));
    }

    #[test]
    fn test_index_tokens_repeated_words() {
        let offsets = index_tokens("no no no", &["no", "no", "no"]).unwrap();
        assert_eq!(
            offsets,
            vec![Slice::new(0, 2), Slice::new(3, 5), Slice::new(6, 8)]
        );
    }

    #[test]
    fn test_index_tokens_counts_characters() {
        let offsets = index_tokens("perché sì", &["perché", "sì"]).unwrap();
        assert_eq!(offsets, vec![Slice::new(0, 6), Slice::new(7, 9)]);
    }

    #[test]
    fn test_index_tokens_missing() {
        let err = index_tokens("a b", &["a", "c"]).unwrap_err();
        assert_eq!(
            err,
            Error::TokenNotFound {
                token: "c".into(),
                index: 1,
                offset: 1
            }
        );
    }

    #[test]
    fn test_align_single_token() {
        let offsets = index_tokens(TEXT, &tokens()).unwrap();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let span = align_span(&[offsets[3]], &offsets, &mut anomalies);
        assert_eq!(span, Span::from_indices(vec![3]));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_align_discontinuous() {
        let offsets = index_tokens(TEXT, &tokens()).unwrap();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        // "I left" + "it rained"
        let span = align_span(
            &[Slice::new(0, 6), Slice::new(15, 24)],
            &offsets,
            &mut anomalies,
        );
        assert_eq!(span.to_string(), "[(0, 2), (3, 5)]");
        assert!(span_text_agrees(
            TEXT,
            &[Slice::new(0, 6), Slice::new(15, 24)],
            &tokens(),
            &span
        ));
    }

    #[test]
    fn test_align_partial_token_is_empty() {
        let offsets = index_tokens(TEXT, &tokens()).unwrap();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let span = align_span(&[Slice::new(8, 10)], &offsets, &mut anomalies);
        assert!(span.is_empty());
        assert_eq!(
            anomalies,
            vec![Anomaly::EmptyCharacterSpan {
                span: vec![Slice::new(8, 10)]
            }]
        );
    }

    #[test]
    fn test_absent_span_is_silent() {
        let offsets = index_tokens(TEXT, &tokens()).unwrap();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        assert!(align_span(&[], &offsets, &mut anomalies).is_empty());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_slice_text() {
        assert_eq!(
            slice_text(TEXT, &[Slice::new(0, 6), Slice::new(7, 14)]),
            "I left because"
        );
    }
}
