use std::collections::BTreeSet;

use tracing::warn;

use super::diagnostics::Diagnostics;
use crate::ontology::{Axiom, ClassExpression, OntologyStore, TermId};

/// Direct children of the root. They are too generic to be useful facets,
/// so the filter removes them from every closure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExcludeSet(BTreeSet<TermId>);

impl ExcludeSet {
    /// Collects the atomic subclass side of every `SubClassOf(sub, root)`.
    ///
    /// Anonymous subclasses of the root cannot be excluded by id; they are
    /// reported and otherwise ignored.
    pub fn children_of<S: OntologyStore + ?Sized>(
        store: &S,
        root: &TermId,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        if store.term(root).is_none() {
            warn!(%root, "root term is not part of the ontology");
        }

        let mut children = BTreeSet::new();
        for axiom in store.referencing_axioms(root) {
            let Axiom::SubClassOf { sub, sup } = axiom else {
                continue;
            };
            if !sup.denotes(root) {
                continue;
            }
            match sub {
                ClassExpression::Class(child) => {
                    children.insert(child.clone());
                }
                other => {
                    warn!(%root, expression = %other, "non-atomic subclass of root");
                    diagnostics.unhandled(other);
                }
            }
        }
        Self(children)
    }

    #[must_use]
    pub fn contains(&self, id: &TermId) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TermId> for ExcludeSet {
    fn from_iter<I: IntoIterator<Item = TermId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Drops candidate ancestors that must never reach a closure.
#[derive(Clone, Debug)]
pub struct ExclusionFilter {
    native_namespace: String,
    root: TermId,
    exclude: ExcludeSet,
}

impl ExclusionFilter {
    #[must_use]
    pub fn new(native_namespace: impl Into<String>, root: TermId, exclude: ExcludeSet) -> Self {
        Self {
            native_namespace: native_namespace.into(),
            root,
            exclude,
        }
    }

    #[must_use]
    pub fn is_native(&self, id: &TermId) -> bool {
        id.in_namespace(&self.native_namespace)
    }

    /// Whether `candidate` may join the closure of `term`.
    ///
    /// Foreign terms never pull native ids, and neither the root nor its
    /// direct children are ever kept.
    #[must_use]
    pub fn admits(&self, term: &TermId, candidate: &TermId) -> bool {
        if !self.is_native(term) && self.is_native(candidate) {
            return false;
        }
        candidate != &self.root && !self.exclude.contains(candidate)
    }

    pub fn apply(&self, term: &TermId, candidates: &mut BTreeSet<TermId>) {
        candidates.retain(|candidate| self.admits(term, candidate));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::rstest;

    use super::{ExcludeSet, ExclusionFilter};
    use crate::{
        flatten::diagnostics::Diagnostics,
        ontology::{Axiom, ClassExpression, InMemoryOntologyStore, Iri, OntologyStore, TermId},
    };

    fn id(text: &str) -> TermId {
        TermId::parse(text).expect("valid id")
    }

    fn filter() -> ExclusionFilter {
        ExclusionFilter::new(
            "DOID",
            id("DOID:4"),
            [id("DOID:7"), id("DOID:14566")].into_iter().collect(),
        )
    }

    #[rstest]
    #[case::native_parent("DOID:0001", "DOID:0002", true)]
    #[case::foreign_parent("DOID:0001", "UBERON:1", true)]
    #[case::foreign_to_foreign("UBERON:1", "UBERON:2", true)]
    #[case::foreign_to_native("UBERON:1", "DOID:0002", false)]
    #[case::root("DOID:0001", "DOID:4", false)]
    #[case::root_child("DOID:0001", "DOID:14566", false)]
    fn admits(#[case] term: &str, #[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(filter().admits(&id(term), &id(candidate)), expected);
    }

    #[test]
    fn apply_retains_admitted_candidates() {
        let mut candidates = BTreeSet::from([id("DOID:4"), id("DOID:7"), id("UBERON:1")]);
        filter().apply(&id("DOID:0001"), &mut candidates);
        assert_eq!(candidates, BTreeSet::from([id("UBERON:1")]));
    }

    #[test]
    fn children_of_root_are_collected() {
        let property = Iri::new("http://purl.obolibrary.org/obo/RO_0001025").expect("iri");
        let mut builder = InMemoryOntologyStore::builder();
        builder
            .declare_class(id("DOID:4"))
            .declare_class(id("DOID:7"))
            .declare_class(id("DOID:0001"))
            .axiom(Axiom::subclass_of(
                ClassExpression::class(id("DOID:7")),
                ClassExpression::class(id("DOID:4")),
            ))
            .axiom(Axiom::subclass_of(
                ClassExpression::class(id("DOID:0001")),
                ClassExpression::class(id("DOID:7")),
            ))
            .axiom(Axiom::subclass_of(
                ClassExpression::some(property, ClassExpression::class(id("UBERON:1"))),
                ClassExpression::class(id("DOID:4")),
            ));
        let store = builder.build();

        let mut diagnostics = Diagnostics::default();
        let exclude = ExcludeSet::children_of(&store, &id("DOID:4"), &mut diagnostics);

        assert!(exclude.contains(&id("DOID:7")));
        assert!(!exclude.contains(&id("DOID:0001")));
        assert_eq!(exclude.len(), 1);
        assert_eq!(diagnostics.unhandled.len(), 1);
    }

    #[test]
    fn children_are_collected_through_a_trait_object() {
        let mut builder = InMemoryOntologyStore::builder();
        builder.declare_class(id("DOID:4")).axiom(Axiom::subclass_of(
            ClassExpression::class(id("DOID:14566")),
            ClassExpression::class(id("DOID:4")),
        ));
        let store = builder.build();
        let store: &dyn OntologyStore = &store;

        let mut diagnostics = Diagnostics::default();
        let exclude = ExcludeSet::children_of(store, &id("DOID:4"), &mut diagnostics);

        assert_eq!(exclude, [id("DOID:14566")].into_iter().collect::<ExcludeSet>());
    }
}
