use std::collections::BTreeSet;

use tracing::debug;

use super::{diagnostics::Diagnostics, exclusion::ExclusionFilter, expression::referenced_ids};
use crate::ontology::{Axiom, ClassExpression, TermId};

/// Turns the axioms referencing a term into candidate ancestor ids.
pub struct AxiomClassifier<'a> {
    filter: &'a ExclusionFilter,
}

impl<'a> AxiomClassifier<'a> {
    #[must_use]
    pub fn new(filter: &'a ExclusionFilter) -> Self {
        Self { filter }
    }

    /// Filtered ancestor ids `axiom` contributes to `term`.
    ///
    /// `verbose` enables per-axiom debug output for traced terms.
    pub fn referenced_ancestor_ids(
        &self,
        term: &TermId,
        axiom: &Axiom,
        diagnostics: &mut Diagnostics,
        verbose: bool,
    ) -> BTreeSet<TermId> {
        let mut ids = match axiom {
            Axiom::Declaration(_) | Axiom::AnnotationAssertion(_) => return BTreeSet::new(),
            Axiom::SubClassOf { sub, sup } => self.subclass(term, sub, sup, diagnostics, verbose),
            Axiom::EquivalentClasses(_) => self.equivalence(term, axiom, diagnostics, verbose),
            Axiom::DisjointClasses(_) => {
                diagnostics.unhandled(axiom);
                BTreeSet::new()
            }
        };

        if ids.is_empty() || (ids.len() == 1 && ids.contains(term)) {
            return BTreeSet::new();
        }
        self.filter.apply(term, &mut ids);
        if verbose && !ids.is_empty() {
            debug!(%term, %axiom, ancestors = ?ids, "axiom contributes");
        }
        ids
    }

    fn subclass(
        &self,
        term: &TermId,
        sub: &ClassExpression,
        sup: &ClassExpression,
        diagnostics: &mut Diagnostics,
        verbose: bool,
    ) -> BTreeSet<TermId> {
        if !sub.denotes(term) {
            diagnostics.direction_mismatches += 1;
            if verbose {
                debug!(%term, %sub, %sup, "term is not the subclass side");
            }
            return BTreeSet::new();
        }

        match sup {
            ClassExpression::Class(id) => BTreeSet::from([id.clone()]),
            ClassExpression::SomeValuesFrom { .. } if !self.filter.is_native(term) => {
                diagnostics.skipped_restrictions += 1;
                if verbose {
                    debug!(%term, %sup, "restriction on foreign term skipped");
                }
                BTreeSet::new()
            }
            ClassExpression::SomeValuesFrom { .. }
            | ClassExpression::MinCardinality { .. }
            | ClassExpression::ExactCardinality { .. }
            | ClassExpression::IntersectionOf(_)
            | ClassExpression::UnionOf(_) => referenced_ids(sup, diagnostics),
            ClassExpression::AllValuesFrom { .. }
            | ClassExpression::MaxCardinality { .. }
            | ClassExpression::ComplementOf(_)
            | ClassExpression::Opaque(_) => {
                diagnostics.unhandled(sup);
                BTreeSet::new()
            }
        }
    }

    fn equivalence(
        &self,
        term: &TermId,
        axiom: &Axiom,
        diagnostics: &mut Diagnostics,
        verbose: bool,
    ) -> BTreeSet<TermId> {
        let mut ids = BTreeSet::new();
        for (sub, sup) in axiom.as_subclass_statements() {
            if !sub.denotes(term) {
                continue;
            }
            let ClassExpression::IntersectionOf(operands) = sup else {
                diagnostics.missing_intersections += 1;
                if verbose {
                    debug!(%term, %sup, "equivalence without intersection");
                }
                continue;
            };
            for operand in operands {
                let ClassExpression::SomeValuesFrom { filler, .. } = operand else {
                    continue;
                };
                match filler.as_class() {
                    Some(id) => {
                        ids.insert(id.clone());
                    }
                    None => diagnostics.unhandled(filler),
                }
            }
        }
        ids
    }
}
