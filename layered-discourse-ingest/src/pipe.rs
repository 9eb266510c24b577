//! Reader for pipe-delimited PDTB annotation tables over raw text.
//!
//! The raw text is tokenized and every token located by character offset;
//! each annotation row then carries character spans that are projected onto
//! token indices.
//!
//! Columns used (0-based):
//!
//! | col | content |
//! |-----|---------|
//! | 0 | relation type |
//! | 1 | connective span |
//! | 7, 8, 9 | connective 1, semantic class 1.1, 1.2 |
//! | 10, 11, 12 | connective 2, semantic class 2.1, 2.2 |
//! | 13 | sup1 span |
//! | 14 | arg1 span |
//! | 20 | arg2 span |
//! | 26 | sup2 span |

use layered_discourse::{
    select_sense, AnomalySink, CharAlignment, Converted, Dialog, DiscourseRelation, Error, Layer,
    RawRelation, Role, Segmentation, SenseCandidate, SenseSelector, Slice, TracingSink,
};

use crate::config::IngestConfig;
use crate::errors::{IngestError, IngestResult};

const LABEL: usize = 0;
const CONN_SPAN: usize = 1;
const CANDIDATE_1: [usize; 3] = [7, 8, 9];
const CANDIDATE_2: [usize; 3] = [10, 11, 12];
const SUP1_SPAN: usize = 13;
const ARG1_SPAN: usize = 14;
const ARG2_SPAN: usize = 20;
const SUP2_SPAN: usize = 26;

/// Cell values meaning "no value".
const ABSENT: [&str; 2] = ["", "Null"];

/// Tokenized raw text with token character offsets.
#[derive(Debug, Clone)]
pub struct RawText {
    pub text: String,
    pub segmentation: Segmentation,
    pub alignment: CharAlignment,
}

/// Tokenize a raw text and locate every token in it.
pub fn parse_raw(text: &str) -> IngestResult<RawText> {
    let segmentation = Segmentation::from_text(text);
    let alignment = CharAlignment::new(text, &segmentation.tokens)?;
    Ok(RawText {
        text: text.to_string(),
        segmentation,
        alignment,
    })
}

/// One annotation row, decoded but still in character space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRow {
    pub label: Option<String>,
    /// Non-blank connective candidates in column order
    pub candidates: Vec<SenseCandidate>,
    pub conn: Vec<Slice>,
    pub arg1: Vec<Slice>,
    pub arg2: Vec<Slice>,
    pub sup1: Vec<Slice>,
    pub sup2: Vec<Slice>,
}

impl AnnotationRow {
    /// Decode a row of trimmed cells. Missing trailing cells count as absent.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Result<Self, Error> {
        let cell = |index: usize| {
            cells
                .get(index)
                .map(|c| c.as_ref())
                .filter(|c| !ABSENT.contains(c))
        };
        let candidate = |[conn, first, second]: [usize; 3]| SenseCandidate {
            connective: cell(conn).map(str::to_string),
            senses: [cell(first), cell(second)]
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect(),
        };

        Ok(Self {
            label: cell(LABEL).map(str::to_string),
            candidates: [candidate(CANDIDATE_1), candidate(CANDIDATE_2)]
                .into_iter()
                .filter(|c| !c.is_blank())
                .collect(),
            conn: parse_char_span(cell(CONN_SPAN))?,
            arg1: parse_char_span(cell(ARG1_SPAN))?,
            arg2: parse_char_span(cell(ARG2_SPAN))?,
            sup1: parse_char_span(cell(SUP1_SPAN))?,
            sup2: parse_char_span(cell(SUP2_SPAN))?,
        })
    }

    pub fn char_span(&self, role: Role) -> &[Slice] {
        match role {
            Role::Conn => &self.conn,
            Role::Arg1 => &self.arg1,
            Role::Arg2 => &self.arg2,
            Role::Sup1 => &self.sup1,
            Role::Sup2 => &self.sup2,
        }
    }

    /// Resolve the sense and project every span onto tokens.
    pub fn to_raw_relation<S>(
        &self,
        alignment: &CharAlignment,
        selector: &SenseSelector,
        sink: &mut S,
    ) -> RawRelation
    where
        S: AnomalySink + ?Sized,
    {
        let (sense, connective) =
            select_sense(&self.candidates, selector, self.label.as_deref(), sink);

        Role::ALL.iter().fold(
            RawRelation::new(self.label.clone().unwrap_or_default())
                .with_sense(sense, connective),
            |raw, &role| {
                let span = alignment.project(self.char_span(role), sink);
                raw.with_span(role, span.slices().to_vec())
            },
        )
    }
}

/// Decode `b..e;b..e` character spans. `None` is the empty span.
pub fn parse_char_span(value: Option<&str>) -> Result<Vec<Slice>, Error> {
    let value = match value {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };

    value
        .split(';')
        .map(|pair| -> Result<Slice, Error> {
            let bounds: Vec<&str> = pair.trim().split("..").collect();
            let malformed = |reason: String| Error::MalformedSpan {
                span: value.to_string(),
                reason,
            };
            match bounds.as_slice() {
                [begin, end] => {
                    let begin = begin
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| malformed(format!("bad offset '{}'", begin)))?;
                    let end = end
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| malformed(format!("bad offset '{}'", end)))?;
                    Ok(Slice::new(begin, end))
                }
                _ => Err(malformed(format!(
                    "'{}' has {} parts, expected begin..end",
                    pair,
                    bounds.len()
                ))),
            }
        })
        .collect()
}

/// Read a delimited table into trimmed cells, honouring `"` quoting.
pub(crate) fn read_table(content: &str, delimiter: u8) -> IngestResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|record| -> IngestResult<Vec<String>> {
            Ok(record?.iter().map(str::to_string).collect())
        })
        .collect()
}

/// Decode every row of an annotation table.
pub fn parse_annotations(content: &str) -> IngestResult<Vec<AnnotationRow>> {
    read_table(content, b'|')?
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            AnnotationRow::from_cells(cells).map_err(|source| IngestError::Row {
                row: index + 1,
                source,
            })
        })
        .collect()
}

/// Build a dialog from raw text and its annotation table, reporting
/// anomalies to `sink`.
pub fn read_pipe_dialog<S>(
    doc_id: &str,
    text: &str,
    annotations: &str,
    config: &IngestConfig,
    sink: &mut S,
) -> IngestResult<Dialog>
where
    S: AnomalySink + ?Sized,
{
    let raw = parse_raw(text)?;
    let rows = parse_annotations(annotations)?;

    let relations = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let relation = row.to_raw_relation(&raw.alignment, &config.sense, sink);
            DiscourseRelation::build_selected(relation, &row.candidates, sink).map_err(
                |source| IngestError::Row {
                    row: index + 1,
                    source,
                },
            )
        })
        .collect::<IngestResult<Vec<_>>>()?;

    let Segmentation {
        tokens,
        blocks,
        groups,
    } = raw.segmentation;

    Ok(Dialog::new(doc_id, tokens)
        .with_layer(Layer::Block, blocks)
        .with_layer(Layer::Group, groups)
        .with_relations(relations))
}

/// [`read_pipe_dialog`] collecting anomalies (and logging them at debug).
pub fn convert_pipe(
    doc_id: &str,
    text: &str,
    annotations: &str,
    config: &IngestConfig,
) -> IngestResult<Converted<Dialog>> {
    let mut sink = TracingSink::new(Vec::new()).for_document(doc_id);
    let dialog = read_pipe_dialog(doc_id, text, annotations, config, &mut sink)?;
    Ok(Converted::new(dialog, sink.into_inner()))
}
