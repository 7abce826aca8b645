use std::collections::BTreeSet;

use super::diagnostics::Diagnostics;
use crate::ontology::{ClassExpression, TermId};

/// Collects the atomic classes an expression points at.
///
/// Existential and lower-bounded restrictions lead to their filler,
/// intersections and unions to each operand. Universal, upper-bounded and
/// negated expressions say nothing about ancestry and are recorded as
/// unhandled.
#[must_use]
pub fn referenced_ids(
    expression: &ClassExpression,
    diagnostics: &mut Diagnostics,
) -> BTreeSet<TermId> {
    let mut ids = BTreeSet::new();
    collect(expression, &mut ids, diagnostics);
    ids
}

fn collect(expression: &ClassExpression, ids: &mut BTreeSet<TermId>, diagnostics: &mut Diagnostics) {
    match expression {
        ClassExpression::Class(id) => {
            ids.insert(id.clone());
        }
        ClassExpression::SomeValuesFrom { filler, .. }
        | ClassExpression::MinCardinality { filler, .. }
        | ClassExpression::ExactCardinality { filler, .. } => collect(filler, ids, diagnostics),
        ClassExpression::IntersectionOf(operands) | ClassExpression::UnionOf(operands) => {
            for operand in operands {
                collect(operand, ids, diagnostics);
            }
        }
        ClassExpression::AllValuesFrom { .. }
        | ClassExpression::MaxCardinality { .. }
        | ClassExpression::ComplementOf(_)
        | ClassExpression::Opaque(_) => diagnostics.unhandled(expression),
    }
}
