//! Loads OWL ontologies serialized as RDF into an [`InMemoryOntologyStore`].
//!
//! Only the subset of the OWL 2 RDF mapping the flattener consumes is
//! translated: class declarations, subclass / equivalence / disjointness
//! axioms, restrictions and boolean combinators, annotation assertions and
//! the reified `owl:Axiom` annotations on them.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use oxrdf::{NamedNode, Term as RdfTerm, Triple};
use oxrdfxml::RdfXmlParser;
use oxttl::{NTriplesParser, TurtleParser};
use tracing::{debug, info};

use super::{
    entities::{Annotation, AnnotationAssertion, AnnotationValue, Axiom, ClassExpression},
    service::InMemoryOntologyStore,
    value_objects::{Iri, TermId},
    vocab,
};
use crate::{Error, Result};

/// Nesting limit for anonymous class expressions; deeper (or cyclic blank
/// node) structures become [`ClassExpression::Opaque`].
const MAX_EXPRESSION_DEPTH: usize = 64;

/// RDF serialization of the ontology document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RdfFormat {
    RdfXml,
    Turtle,
    NTriples,
}

impl RdfFormat {
    /// Guesses the serialization from the file extension; RDF/XML otherwise.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("ttl") => Self::Turtle,
            Some("nt") => Self::NTriples,
            _ => Self::RdfXml,
        }
    }
}

/// Failure to read the document as RDF.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(String);

/// Loads the ontology at `path`. The file must exist and be readable before
/// anything is parsed.
pub fn load(path: &Path, format: Option<RdfFormat>) -> Result<InMemoryOntologyStore> {
    if !path.is_file() {
        let source = std::fs::metadata(path).err().unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file")
        });
        return Err(Error::InputFile {
            path: path.to_path_buf(),
            source,
        });
    }
    let file = File::open(path).map_err(|source| Error::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let format = format.unwrap_or_else(|| RdfFormat::from_path(path));
    info!(path = %path.display(), ?format, "reading ontology");
    read_ontology(BufReader::new(file), format).map_err(|err| Error::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Parses an ontology document from any reader.
pub fn read_ontology<R: Read>(
    reader: R,
    format: RdfFormat,
) -> std::result::Result<InMemoryOntologyStore, ParseError> {
    let mut graph = TripleIndex::default();
    match format {
        RdfFormat::RdfXml => graph.extend(RdfXmlParser::new().for_reader(reader))?,
        RdfFormat::Turtle => graph.extend(TurtleParser::new().for_reader(reader))?,
        RdfFormat::NTriples => graph.extend(NTriplesParser::new().for_reader(reader))?,
    }
    debug!(triples = graph.len, "parsed RDF graph");
    Ok(Translator::new(&graph).translate())
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Node {
    Named(NamedNode),
    Blank(String),
    Literal(String),
}

impl Node {
    fn from_term(term: RdfTerm) -> Option<Self> {
        match term {
            RdfTerm::NamedNode(node) => Some(Self::Named(node)),
            RdfTerm::BlankNode(node) => Some(Self::Blank(node.into_string())),
            RdfTerm::Literal(literal) => Some(Self::Literal(literal.value().to_owned())),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    fn is(&self, iri: &str) -> bool {
        matches!(self, Self::Named(node) if node.as_str() == iri)
    }
}

/// Triples grouped by subject, subjects kept in document order.
#[derive(Default)]
struct TripleIndex {
    subjects: Vec<Node>,
    edges: HashMap<Node, Vec<(NamedNode, Node)>>,
    len: usize,
}

impl TripleIndex {
    fn extend<E: Display>(
        &mut self,
        triples: impl Iterator<Item = std::result::Result<Triple, E>>,
    ) -> std::result::Result<(), ParseError> {
        for triple in triples {
            let triple = triple.map_err(|err| ParseError(err.to_string()))?;
            let Some(subject) = Node::from_term(RdfTerm::from(triple.subject)) else {
                continue;
            };
            let Some(object) = Node::from_term(triple.object) else {
                continue;
            };
            self.insert(subject, triple.predicate, object);
        }
        Ok(())
    }

    fn insert(&mut self, subject: Node, predicate: NamedNode, object: Node) {
        let edges = self.edges.entry(subject.clone()).or_insert_with(|| {
            self.subjects.push(subject);
            Vec::new()
        });
        edges.push((predicate, object));
        self.len += 1;
    }

    fn edges(&self, subject: &Node) -> &[(NamedNode, Node)] {
        self.edges.get(subject).map_or(&[], Vec::as_slice)
    }

    fn object(&self, subject: &Node, predicate: &str) -> Option<&Node> {
        self.edges(subject)
            .iter()
            .find(|(p, _)| p.as_str() == predicate)
            .map(|(_, object)| object)
    }

    fn has_type(&self, subject: &Node, class: &str) -> bool {
        self.edges(subject)
            .iter()
            .any(|(p, object)| p.as_str() == vocab::RDF_TYPE && object.is(class))
    }
}

type AnnotationKey = (Node, String, Node);

struct Translator<'g> {
    graph: &'g TripleIndex,
    axiom_annotations: HashMap<AnnotationKey, Vec<Annotation>>,
}

impl<'g> Translator<'g> {
    fn new(graph: &'g TripleIndex) -> Self {
        let mut translator = Self {
            graph,
            axiom_annotations: HashMap::new(),
        };
        translator.collect_axiom_annotations();
        translator
    }

    fn collect_axiom_annotations(&mut self) {
        let graph = self.graph;
        for subject in &graph.subjects {
            if !matches!(subject, Node::Blank(_)) || !graph.has_type(subject, vocab::OWL_AXIOM) {
                continue;
            }
            let source = graph.object(subject, vocab::OWL_ANNOTATED_SOURCE);
            let property = graph.object(subject, vocab::OWL_ANNOTATED_PROPERTY);
            let target = graph.object(subject, vocab::OWL_ANNOTATED_TARGET);
            let (Some(source), Some(Node::Named(property)), Some(target)) = (source, property, target)
            else {
                continue;
            };

            let annotations: Vec<Annotation> = graph
                .edges(subject)
                .iter()
                .filter(|(predicate, _)| {
                    !matches!(
                        predicate.as_str(),
                        vocab::RDF_TYPE
                            | vocab::OWL_ANNOTATED_SOURCE
                            | vocab::OWL_ANNOTATED_PROPERTY
                            | vocab::OWL_ANNOTATED_TARGET
                    )
                })
                .filter_map(|(predicate, object)| {
                    annotation_value(object)
                        .map(|value| Annotation::new(Iri::from(predicate.clone()), value))
                })
                .collect();

            self.axiom_annotations
                .entry((source.clone(), property.as_str().to_owned(), target.clone()))
                .or_default()
                .extend(annotations);
        }
    }

    fn translate(&self) -> InMemoryOntologyStore {
        let mut builder = InMemoryOntologyStore::builder();

        for subject in &self.graph.subjects {
            for (predicate, object) in self.graph.edges(subject) {
                match predicate.as_str() {
                    vocab::RDF_TYPE => {
                        if let Node::Named(node) = subject {
                            if object.is(vocab::OWL_CLASS) {
                                builder.declare_class(term_id(node));
                            } else if object.is(vocab::OWL_ANNOTATION_PROPERTY) {
                                builder.declare_annotation_property(Iri::from(node.clone()));
                            }
                        }
                    }
                    vocab::RDFS_SUBCLASS_OF => {
                        builder.axiom(Axiom::subclass_of(
                            self.expression(subject, 0),
                            self.expression(object, 0),
                        ));
                    }
                    vocab::OWL_EQUIVALENT_CLASS if matches!(subject, Node::Named(_)) => {
                        builder.axiom(Axiom::EquivalentClasses(vec![
                            self.expression(subject, 0),
                            self.expression(object, 0),
                        ]));
                    }
                    vocab::OWL_DISJOINT_WITH if matches!(subject, Node::Named(_)) => {
                        builder.axiom(Axiom::DisjointClasses(vec![
                            self.expression(subject, 0),
                            self.expression(object, 0),
                        ]));
                    }
                    other if is_annotation_predicate(other) => {
                        if let Some(assertion) = self.annotation_assertion(subject, predicate, object)
                        {
                            builder.annotate(assertion);
                        }
                    }
                    _ => {}
                }
            }
        }

        builder.build()
    }

    fn annotation_assertion(
        &self,
        subject: &Node,
        predicate: &NamedNode,
        object: &Node,
    ) -> Option<AnnotationAssertion> {
        let Node::Named(subject_node) = subject else {
            return None;
        };
        let value = annotation_value(object)?;
        let mut assertion =
            AnnotationAssertion::new(term_id(subject_node), Iri::from(predicate.clone()), value);
        let key = (
            subject.clone(),
            predicate.as_str().to_owned(),
            object.clone(),
        );
        if let Some(annotations) = self.axiom_annotations.get(&key) {
            assertion.annotations.extend(annotations.iter().cloned());
        }
        Some(assertion)
    }

    fn expression(&self, node: &Node, depth: usize) -> ClassExpression {
        if depth > MAX_EXPRESSION_DEPTH {
            return ClassExpression::Opaque(self.describe(node));
        }
        match node {
            Node::Named(node) => ClassExpression::Class(term_id(node)),
            Node::Literal(value) => ClassExpression::Opaque(format!("{value:?}")),
            Node::Blank(_) => self.anonymous_expression(node, depth),
        }
    }

    fn anonymous_expression(&self, node: &Node, depth: usize) -> ClassExpression {
        let graph = self.graph;
        let next = depth + 1;

        if let Some(list) = graph.object(node, vocab::OWL_INTERSECTION_OF) {
            return ClassExpression::IntersectionOf(self.operands(list, next));
        }
        if let Some(list) = graph.object(node, vocab::OWL_UNION_OF) {
            return ClassExpression::UnionOf(self.operands(list, next));
        }
        if let Some(operand) = graph.object(node, vocab::OWL_COMPLEMENT_OF) {
            return ClassExpression::ComplementOf(Box::new(self.expression(operand, next)));
        }

        let Some(Node::Named(property)) = graph.object(node, vocab::OWL_ON_PROPERTY) else {
            return ClassExpression::Opaque(self.describe(node));
        };
        let property = Iri::from(property.clone());

        if let Some(filler) = graph.object(node, vocab::OWL_SOME_VALUES_FROM) {
            return ClassExpression::SomeValuesFrom {
                property,
                filler: Box::new(self.expression(filler, next)),
            };
        }
        if let Some(filler) = graph.object(node, vocab::OWL_ALL_VALUES_FROM) {
            return ClassExpression::AllValuesFrom {
                property,
                filler: Box::new(self.expression(filler, next)),
            };
        }

        let filler = || {
            Box::new(match graph.object(node, vocab::OWL_ON_CLASS) {
                Some(class) => self.expression(class, next),
                None => ClassExpression::Class(TermId::from_iri(&iri_constant(vocab::OWL_THING))),
            })
        };
        if let Some(cardinality) = self.cardinality(
            node,
            vocab::OWL_MIN_QUALIFIED_CARDINALITY,
            vocab::OWL_MIN_CARDINALITY,
        ) {
            return ClassExpression::MinCardinality {
                property,
                cardinality,
                filler: filler(),
            };
        }
        if let Some(cardinality) =
            self.cardinality(node, vocab::OWL_QUALIFIED_CARDINALITY, vocab::OWL_CARDINALITY)
        {
            return ClassExpression::ExactCardinality {
                property,
                cardinality,
                filler: filler(),
            };
        }
        if let Some(cardinality) = self.cardinality(
            node,
            vocab::OWL_MAX_QUALIFIED_CARDINALITY,
            vocab::OWL_MAX_CARDINALITY,
        ) {
            return ClassExpression::MaxCardinality {
                property,
                cardinality,
                filler: filler(),
            };
        }

        ClassExpression::Opaque(self.describe(node))
    }

    fn cardinality(&self, node: &Node, qualified: &str, unqualified: &str) -> Option<u32> {
        let value = self
            .graph
            .object(node, qualified)
            .or_else(|| self.graph.object(node, unqualified))?;
        match value {
            Node::Literal(text) => Some(text.trim().parse().unwrap_or(0)),
            _ => Some(0),
        }
    }

    fn operands(&self, head: &Node, depth: usize) -> Vec<ClassExpression> {
        let mut operands = Vec::new();
        let mut seen = HashSet::new();
        let mut current = head;
        while !current.is(vocab::RDF_NIL) && seen.insert(current) {
            let Some(first) = self.graph.object(current, vocab::RDF_FIRST) else {
                break;
            };
            operands.push(self.expression(first, depth));
            let Some(rest) = self.graph.object(current, vocab::RDF_REST) else {
                break;
            };
            current = rest;
        }
        operands
    }

    fn describe(&self, node: &Node) -> String {
        match node {
            Node::Named(node) => node.as_str().to_owned(),
            Node::Literal(value) => format!("{value:?}"),
            Node::Blank(label) => {
                let predicates: Vec<&str> = self
                    .graph
                    .edges(node)
                    .iter()
                    .map(|(predicate, _)| predicate.as_str())
                    .collect();
                format!("AnonymousExpression(_:{label} [{}])", predicates.join(" "))
            }
        }
    }
}

fn term_id(node: &NamedNode) -> TermId {
    TermId::from_iri(&Iri::from(node.clone()))
}

fn iri_constant(value: &str) -> Iri {
    Iri::from(NamedNode::new_unchecked(value))
}

fn annotation_value(node: &Node) -> Option<AnnotationValue> {
    match node {
        Node::Literal(value) => Some(AnnotationValue::Literal(value.clone())),
        Node::Named(node) => Some(AnnotationValue::Iri(Iri::from(node.clone()))),
        Node::Blank(_) => None,
    }
}

fn is_annotation_predicate(predicate: &str) -> bool {
    if predicate == vocab::OWL_DEPRECATED {
        return true;
    }
    !(predicate.starts_with(vocab::OWL_NS)
        || predicate.starts_with(vocab::RDF_NS)
        || matches!(
            predicate,
            vocab::RDFS_DOMAIN | vocab::RDFS_RANGE | vocab::RDFS_SUBPROPERTY_OF
        ))
}
