//! Ancestor closure engine.
//!
//! `closure_of` walks the axioms of a term and of everything they lead to,
//! depth first, with an explicit frame stack instead of recursion. Cycles are
//! collapsed as strongly connected components: a term whose walk was cut by a
//! cycle is cached only when the first-entered member of its component
//! finishes, and then every member receives the component's full set minus
//! its own id. Cached closures are never recomputed or changed.

use std::{
    collections::{btree_set, BTreeSet, HashMap},
    sync::Arc,
};

use tracing::debug;

use super::{axioms::AxiomClassifier, diagnostics::Diagnostics, exclusion::ExclusionFilter};
use crate::{
    config::Verbosity,
    ontology::{Iri, OntologyStore, TermId},
};

/// Shared, immutable closure of one term.
pub type Ancestors = Arc<BTreeSet<TermId>>;

pub struct ClosureEngine<'s, S: OntologyStore + ?Sized> {
    store: &'s S,
    filter: ExclusionFilter,
    evidence_property: Iri,
    verbosity: Verbosity,
    /// Only complete closures are inserted.
    cache: HashMap<TermId, Ancestors>,
    diagnostics: Diagnostics,
}

/// One term being expanded.
struct Frame {
    id: TermId,
    index: usize,
    low: usize,
    pending: btree_set::IntoIter<TermId>,
    acc: BTreeSet<TermId>,
}

/// State of one top-level request. `visiting` is the active expansion path;
/// `open` and `stack` hold the terms entered but not yet cached. `verbose`
/// is decided once for the requested term and covers its whole walk.
#[derive(Default)]
struct Traversal {
    verbose: bool,
    visiting: Vec<Frame>,
    open: HashMap<TermId, usize>,
    stack: Vec<TermId>,
    next_index: usize,
}

impl Traversal {
    fn enter(&mut self, id: &TermId) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        self.open.insert(id.clone(), index);
        self.stack.push(id.clone());
        index
    }

    /// Pops the component rooted at `root` off the stack.
    fn close_component(&mut self, root: &TermId) -> Vec<TermId> {
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.open.remove(&member);
            let is_root = &member == root;
            members.push(member);
            if is_root {
                break;
            }
        }
        members
    }

    fn is_empty(&self) -> bool {
        self.visiting.is_empty() && self.open.is_empty() && self.stack.is_empty()
    }
}

impl<'s, S: OntologyStore + ?Sized> ClosureEngine<'s, S> {
    #[must_use]
    pub fn new(
        store: &'s S,
        filter: ExclusionFilter,
        evidence_property: Iri,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            store,
            filter,
            evidence_property,
            verbosity,
            cache: HashMap::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Returns every ancestor of `term`, empty when it has none.
    ///
    /// Cached closures are returned without touching the store.
    pub fn closure_of(&mut self, term: &TermId) -> Ancestors {
        if let Some(hit) = self.cache.get(term) {
            return Arc::clone(hit);
        }

        let mut traversal = Traversal {
            verbose: self.verbosity.is_verbose_for(term),
            ..Traversal::default()
        };
        let frame = self.open(&mut traversal, term.clone());
        traversal.visiting.push(frame);

        while let Some(frame) = traversal.visiting.last_mut() {
            match frame.pending.next() {
                Some(candidate) => self.visit(&mut traversal, candidate),
                None => self.finish(&mut traversal),
            }
        }
        debug_assert!(traversal.is_empty());

        self.cache.get(term).cloned().unwrap_or_default()
    }

    /// The closure of `term` if it was already computed.
    #[must_use]
    pub fn cached(&self, term: &TermId) -> Option<&Ancestors> {
        self.cache.get(term)
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Enters `id`: pulls in its evidence codes and classifies its axioms
    /// into the candidates still to expand.
    fn open(&mut self, traversal: &mut Traversal, id: TermId) -> Frame {
        let verbose = traversal.verbose;
        let index = traversal.enter(&id);

        let mut acc = BTreeSet::new();
        for assertion in self.store.annotation_assertions(&id) {
            for value in assertion.annotation_values(&self.evidence_property) {
                let Some(iri) = value.as_iri() else {
                    continue;
                };
                let evidence = TermId::from_iri(iri);
                if verbose {
                    debug!(term = %id, %evidence, "pulling in evidence code");
                }
                acc.insert(evidence);
            }
        }

        let classifier = AxiomClassifier::new(&self.filter);
        let mut candidates = BTreeSet::new();
        for axiom in self.store.referencing_axioms(&id) {
            candidates.extend(classifier.referenced_ancestor_ids(
                &id,
                axiom,
                &mut self.diagnostics,
                verbose,
            ));
        }
        if verbose {
            debug!(term = %id, candidates = candidates.len(), "expanding");
        }

        Frame {
            id,
            index,
            low: index,
            pending: candidates.into_iter(),
            acc,
        }
    }

    fn visit(&mut self, traversal: &mut Traversal, candidate: TermId) {
        let Some(frame) = traversal.visiting.last_mut() else {
            return;
        };
        frame.acc.insert(candidate.clone());

        if let Some(done) = self.cache.get(&candidate) {
            frame.acc.extend(done.iter().cloned());
            return;
        }
        if let Some(&index) = traversal.open.get(&candidate) {
            frame.low = frame.low.min(index);
            if traversal.verbose {
                debug!(term = %frame.id, %candidate, "cycle detected, not expanding again");
            }
            return;
        }

        let child = self.open(traversal, candidate);
        traversal.visiting.push(child);
    }

    fn finish(&mut self, traversal: &mut Traversal) {
        let Some(frame) = traversal.visiting.pop() else {
            return;
        };

        if frame.low < frame.index {
            // inside a cycle whose first term is still being expanded
            if let Some(parent) = traversal.visiting.last_mut() {
                parent.low = parent.low.min(frame.low);
                parent.acc.extend(frame.acc);
            }
            return;
        }

        let members = traversal.close_component(&frame.id);
        let mut shared = frame.acc;
        shared.insert(frame.id.clone());
        for member in &members {
            let mut ancestors = shared.clone();
            ancestors.remove(member);
            self.cache.insert(member.clone(), Arc::new(ancestors));
        }
        if members.len() > 1 && traversal.verbose {
            debug!(term = %frame.id, members = ?members, "closed cycle");
        }

        if let (Some(parent), Some(done)) =
            (traversal.visiting.last_mut(), self.cache.get(&frame.id))
        {
            parent.acc.extend(done.iter().cloned());
        }
    }
}
