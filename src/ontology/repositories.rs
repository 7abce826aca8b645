use super::entities::{AnnotationAssertion, Axiom, Term};
use super::value_objects::{Iri, TermId};

/// Summary of a loaded ontology, logged once loading completes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OntologySummary {
    /// Number of declared classes.
    pub class_count: usize,
    /// Number of logical and declaration axioms.
    pub axiom_count: usize,
    /// Number of annotation assertions.
    pub annotation_count: usize,
    /// Number of declared annotation properties.
    pub annotation_property_count: usize,
}

/// Read-only query contract over a fully loaded ontology.
///
/// Every lookup is against memory; implementors must be completely loaded
/// before the first call.
pub trait OntologyStore {
    /// Returns the identifiers of all declared classes in identifier order.
    fn terms(&self) -> Vec<TermId>;

    /// Looks up a term, declared or merely annotated.
    fn term(&self, id: &TermId) -> Option<&Term>;

    /// Returns every non-annotation axiom mentioning `id`, in either
    /// direction. Consumers must check which side `id` is on.
    fn referencing_axioms(&self, id: &TermId) -> Vec<&Axiom>;

    /// Returns the annotation assertions whose subject is `id`.
    fn annotation_assertions(&self, id: &TermId) -> Vec<&AnnotationAssertion>;

    /// Returns the annotation property carrying textual definitions, if the
    /// ontology labels one as "definition" or "textual definition".
    fn definition_property(&self) -> Option<&Iri>;

    /// Returns the first label of `id`.
    fn label(&self, id: &TermId) -> Option<&str> {
        self.term(id).and_then(Term::label)
    }

    /// Counts describing the loaded ontology.
    fn summary(&self) -> OntologySummary;
}
