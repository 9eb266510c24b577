//! Reader for the legacy RelXML format.
//!
//! ```xml
//! <section>
//!   <doc id="dialog01">
//!     <sentences>
//!       <sent sid="0">
//!         <tokens>
//!           <token tid="0" surf="I"><rel rid="1" role="Arg1"/></token>
//!         </tokens>
//!       </sent>
//!     </sentences>
//!     <relations>
//!       <relation rid="1" class="Explicit">
//!         <conn type="VOID"><sense>Contingency.Cause.Reason</sense></conn>
//!       </relation>
//!     </relations>
//!   </doc>
//! </section>
//! ```
//!
//! Roles live on the tokens, so spans are rebuilt by collecting, per relation
//! id and role, the indices of the tokens that carry them.

use std::collections::{BTreeMap, HashMap, HashSet};

use layered_discourse::{
    indices_to_span, partition_lengths, select_sense, split_clitics, Anomaly, AnomalySink,
    Converted, Dialog, DiscourseRelation, Layer, RawRelation, Role, SenseCandidate, TracingSink,
};
use roxmltree::Node;

use crate::config::IngestConfig;
use crate::errors::{IngestError, IngestResult};

/// Connective type meaning "no explicit connective".
const VOID: &str = "VOID";

/// A `<token>` with its `(rid, role)` references in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlToken {
    pub surface: String,
    pub rels: Vec<(String, Role)>,
}

/// A declared `<relation>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlRelation {
    pub rid: String,
    pub label: Option<String>,
    pub candidates: Vec<SenseCandidate>,
}

/// A parsed RelXML document, before any span is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelXmlDocument {
    pub doc_id: String,
    pub sentences: Vec<Vec<XmlToken>>,
    pub relations: Vec<XmlRelation>,
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn expect_tag(node: Node, tag: &str) -> IngestResult<()> {
    let found = node.tag_name().name();
    if found == tag {
        Ok(())
    } else {
        Err(IngestError::xml(format!("expected <{}>, found <{}>", tag, found)))
    }
}

fn required<'a>(node: Node<'a, '_>, attribute: &str) -> IngestResult<&'a str> {
    node.attribute(attribute).ok_or_else(|| {
        IngestError::xml(format!(
            "<{}> without '{}' attribute",
            node.tag_name().name(),
            attribute
        ))
    })
}

impl RelXmlDocument {
    /// Parse and check the document layout.
    pub fn parse(xml: &str) -> IngestResult<Self> {
        let document = roxmltree::Document::parse(xml)?;
        let root = document.root_element();
        expect_tag(root, "section")?;

        let docs: Vec<Node> = elements(root).collect();
        let doc = match docs.as_slice() {
            [doc] => *doc,
            _ => {
                return Err(IngestError::xml(format!(
                    "<section> must hold exactly one <doc>, found {} elements",
                    docs.len()
                )))
            }
        };
        expect_tag(doc, "doc")?;
        let doc_id = required(doc, "id")?.to_string();

        let parts: Vec<Node> = elements(doc).collect();
        let (sentences, relations) = match parts.as_slice() {
            [sentences, relations]
                if sentences.has_tag_name("sentences") && relations.has_tag_name("relations") =>
            {
                (*sentences, *relations)
            }
            _ => {
                let found: Vec<&str> = parts.iter().map(|p| p.tag_name().name()).collect();
                return Err(IngestError::xml(format!(
                    "<doc> children must be [sentences, relations], found {:?}",
                    found
                )));
            }
        };

        Ok(Self {
            doc_id,
            sentences: elements(sentences)
                .map(parse_sentence)
                .collect::<IngestResult<_>>()?,
            relations: elements(relations)
                .map(parse_relation)
                .collect::<IngestResult<_>>()?,
        })
    }

    /// Rebuild spans and relations, reporting anomalies to `sink`.
    pub fn into_dialog<S>(self, config: &IngestConfig, sink: &mut S) -> IngestResult<Dialog>
    where
        S: AnomalySink + ?Sized,
    {
        let sentences: Vec<Vec<(String, &[(String, Role)])>> = self
            .sentences
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .flat_map(|token| {
                        split_clitics(&token.surface)
                            .into_iter()
                            .map(move |piece| (piece, token.rels.as_slice()))
                    })
                    .collect()
            })
            .collect();

        let blocks = partition_lengths(sentences.iter().map(Vec::len));

        // rid -> role -> token indices, with rids in order of first reference
        let mut order: Vec<&str> = Vec::new();
        let mut roles: HashMap<&str, BTreeMap<Role, Vec<usize>>> = HashMap::new();
        let mut tokens = Vec::new();
        for (index, (piece, rels)) in sentences.iter().flatten().enumerate() {
            tokens.push(piece.clone());
            for (rid, role) in rels.iter() {
                let by_role = roles.entry(rid.as_str()).or_insert_with(|| {
                    order.push(rid.as_str());
                    BTreeMap::new()
                });
                by_role.entry(*role).or_insert_with(Vec::new).push(index);
            }
        }

        let mut declared: HashMap<&str, &XmlRelation> = HashMap::new();
        for relation in &self.relations {
            if declared.insert(relation.rid.as_str(), relation).is_some() {
                return Err(IngestError::xml(format!("relation '{}' declared twice", relation.rid)));
            }
        }

        let mut relations = Vec::with_capacity(order.len());
        for rid in &order {
            let relation = declared.get(rid).ok_or_else(|| {
                IngestError::xml(format!("token refers to undeclared relation '{}'", rid))
            })?;
            let (sense, connective) = select_sense(
                &relation.candidates,
                &config.sense,
                relation.label.as_deref(),
                sink,
            );

            let raw = roles.get(rid).into_iter().flatten().fold(
                RawRelation::new(relation.label.clone().unwrap_or_default())
                    .with_sense(sense, connective),
                |raw, (role, indices)| {
                    let span = indices_to_span(indices.iter().copied());
                    raw.with_span(*role, span.slices().to_vec())
                },
            );
            relations.push(DiscourseRelation::build_selected(
                raw,
                &relation.candidates,
                sink,
            )?);
        }

        let referenced: HashSet<&str> = order.iter().copied().collect();
        for relation in &self.relations {
            if !referenced.contains(relation.rid.as_str()) {
                sink.record(Anomaly::UnreferencedRelation {
                    rid: relation.rid.clone(),
                });
            }
        }

        Ok(Dialog::new(self.doc_id, tokens)
            .with_layer(Layer::Block, blocks)
            .with_relations(relations))
    }
}

/// `<sent>`: tokens come from `<tokens>`; anything else (`<parse>`) is skipped.
fn parse_sentence(node: Node) -> IngestResult<Vec<XmlToken>> {
    expect_tag(node, "sent")?;
    let mut tokens = Vec::new();
    for part in elements(node).filter(|part| part.has_tag_name("tokens")) {
        for token in elements(part) {
            tokens.push(parse_token(token)?);
        }
    }
    Ok(tokens)
}

fn parse_token(node: Node) -> IngestResult<XmlToken> {
    expect_tag(node, "token")?;
    let surface = required(node, "surf")?.to_string();

    let rels = elements(node)
        .map(|rel| -> IngestResult<(String, Role)> {
            expect_tag(rel, "rel")?;
            let rid = required(rel, "rid")?;
            let key = required(rel, "role")?;
            let role = Role::from_key(key)
                .ok_or_else(|| IngestError::xml(format!("unknown role '{}'", key)))?;
            Ok((rid.to_string(), role))
        })
        .collect::<IngestResult<_>>()?;

    Ok(XmlToken { surface, rels })
}

fn parse_relation(node: Node) -> IngestResult<XmlRelation> {
    expect_tag(node, "relation")?;
    let rid = required(node, "rid")?.to_string();

    let candidates = elements(node)
        .map(|conn| -> IngestResult<SenseCandidate> {
            expect_tag(conn, "conn")?;
            let connective = conn.attribute("type").filter(|kind| *kind != VOID);
            let senses = elements(conn)
                .map(|sense| -> IngestResult<String> {
                    expect_tag(sense, "sense")?;
                    Ok(sense.text().unwrap_or_default().trim().to_string())
                })
                .collect::<IngestResult<Vec<_>>>()?;
            Ok(SenseCandidate::new(connective, senses))
        })
        .collect::<IngestResult<_>>()?;

    Ok(XmlRelation {
        rid,
        label: node.attribute("class").map(str::to_string),
        candidates,
    })
}

/// Parse a RelXML document and build its dialog.
pub fn read_relxml_dialog<S>(
    xml: &str,
    config: &IngestConfig,
    sink: &mut S,
) -> IngestResult<Dialog>
where
    S: AnomalySink + ?Sized,
{
    RelXmlDocument::parse(xml)?.into_dialog(config, sink)
}

/// [`read_relxml_dialog`] collecting anomalies (and logging them at debug).
pub fn convert_relxml(xml: &str, config: &IngestConfig) -> IngestResult<Converted<Dialog>> {
    let document = RelXmlDocument::parse(xml)?;
    let mut sink = TracingSink::new(Vec::new()).for_document(document.doc_id.clone());
    let dialog = document.into_dialog(config, &mut sink)?;
    Ok(Converted::new(dialog, sink.into_inner()))
}
