use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    entities::{Annotation, AnnotationAssertion, AnnotationValue, Axiom, Term},
    repositories::{OntologyStore, OntologySummary},
    value_objects::{Iri, TermId},
    vocab,
};

/// In-memory [`OntologyStore`] with a bidirectional axiom index.
#[derive(Clone, Debug, Default)]
pub struct InMemoryOntologyStore {
    terms: BTreeMap<TermId, Term>,
    axioms: Vec<Axiom>,
    referencing: HashMap<TermId, Vec<usize>>,
    assertions: Vec<AnnotationAssertion>,
    assertions_by_subject: HashMap<TermId, Vec<usize>>,
    annotation_properties: BTreeSet<Iri>,
    definition_property: Option<Iri>,
}

impl InMemoryOntologyStore {
    /// Starts building a store.
    #[must_use]
    pub fn builder() -> OntologyStoreBuilder {
        OntologyStoreBuilder::default()
    }
}

impl OntologyStore for InMemoryOntologyStore {
    fn terms(&self) -> Vec<TermId> {
        self.terms
            .values()
            .filter(|term| term.is_declared())
            .map(|term| term.id().clone())
            .collect()
    }

    fn term(&self, id: &TermId) -> Option<&Term> {
        self.terms.get(id)
    }

    fn referencing_axioms(&self, id: &TermId) -> Vec<&Axiom> {
        self.referencing
            .get(id)
            .map(|indexes| indexes.iter().map(|&index| &self.axioms[index]).collect())
            .unwrap_or_default()
    }

    fn annotation_assertions(&self, id: &TermId) -> Vec<&AnnotationAssertion> {
        self.assertions_by_subject
            .get(id)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|&index| &self.assertions[index])
                    .collect()
            })
            .unwrap_or_default()
    }

    fn definition_property(&self) -> Option<&Iri> {
        self.definition_property.as_ref()
    }

    fn summary(&self) -> OntologySummary {
        OntologySummary {
            class_count: self.terms.values().filter(|term| term.is_declared()).count(),
            axiom_count: self.axioms.len(),
            annotation_count: self.assertions.len(),
            annotation_property_count: self.annotation_properties.len(),
        }
    }
}

/// Accumulates axioms and derives the term table and indexes on
/// [`OntologyStoreBuilder::build`].
#[derive(Default)]
pub struct OntologyStoreBuilder {
    declared: BTreeSet<TermId>,
    axioms: Vec<Axiom>,
    assertions: Vec<AnnotationAssertion>,
    annotation_properties: BTreeSet<Iri>,
}

impl OntologyStoreBuilder {
    /// Declares a class and records the declaration axiom.
    pub fn declare_class(&mut self, id: TermId) -> &mut Self {
        if self.declared.insert(id.clone()) {
            self.axioms.push(Axiom::Declaration(id));
        }
        self
    }

    pub fn declare_annotation_property(&mut self, property: Iri) -> &mut Self {
        self.annotation_properties.insert(property);
        self
    }

    /// Adds an axiom. Declarations and annotation assertions are routed to
    /// their dedicated tables.
    pub fn axiom(&mut self, axiom: Axiom) -> &mut Self {
        match axiom {
            Axiom::Declaration(id) => {
                self.declare_class(id);
            }
            Axiom::AnnotationAssertion(assertion) => {
                self.assertions.push(assertion);
            }
            other => self.axioms.push(other),
        }
        self
    }

    /// Convenience for `axiom(Axiom::AnnotationAssertion(..))`.
    pub fn annotate(&mut self, assertion: AnnotationAssertion) -> &mut Self {
        self.assertions.push(assertion);
        self
    }

    /// Finalizes the store: builds terms from declarations and annotation
    /// assertions, indexes axioms under every class they mention, and
    /// resolves the definition property.
    #[must_use]
    pub fn build(self) -> InMemoryOntologyStore {
        let label = iri_constant(vocab::RDFS_LABEL);
        let deprecated = iri_constant(vocab::OWL_DEPRECATED);

        let mut terms: BTreeMap<TermId, Term> = BTreeMap::new();
        for id in &self.declared {
            terms
                .entry(id.clone())
                .or_insert_with(|| Term::new(id.clone()))
                .mark_declared();
        }

        let mut assertions_by_subject: HashMap<TermId, Vec<usize>> = HashMap::new();
        for (index, assertion) in self.assertions.iter().enumerate() {
            assertions_by_subject
                .entry(assertion.subject.clone())
                .or_default()
                .push(index);

            let term = terms
                .entry(assertion.subject.clone())
                .or_insert_with(|| Term::new(assertion.subject.clone()));
            if assertion.property == label {
                if let Some(text) = assertion.value.as_literal() {
                    term.add_label(text);
                }
            } else if assertion.property == deprecated {
                if assertion.value.as_literal() != Some("false") {
                    term.mark_deprecated();
                }
            } else {
                term.add_annotation(Annotation::new(
                    assertion.property.clone(),
                    assertion.value.clone(),
                ));
            }
        }

        let mut referencing: HashMap<TermId, Vec<usize>> = HashMap::new();
        for (index, axiom) in self.axioms.iter().enumerate() {
            for id in axiom.signature() {
                referencing.entry(id).or_default().push(index);
            }
        }

        let definition_property =
            resolve_definition_property(&self.annotation_properties, &self.assertions);

        InMemoryOntologyStore {
            terms,
            axioms: self.axioms,
            referencing,
            assertions: self.assertions,
            assertions_by_subject,
            annotation_properties: self.annotation_properties,
            definition_property,
        }
    }
}

fn resolve_definition_property(
    properties: &BTreeSet<Iri>,
    assertions: &[AnnotationAssertion],
) -> Option<Iri> {
    properties
        .iter()
        .find(|property| {
            let subject = TermId::from_iri(property);
            assertions.iter().any(|assertion| {
                assertion.subject == subject
                    && matches!(
                        &assertion.value,
                        AnnotationValue::Literal(text)
                            if vocab::DEFINITION_PROPERTY_NAMES.contains(&text.as_str())
                    )
            })
        })
        .cloned()
}

// The vocabulary constants are valid IRIs; this only builds the value object.
fn iri_constant(value: &str) -> Iri {
    Iri::from(oxrdf::NamedNode::new_unchecked(value))
}
