use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use super::facets::{classify, FacetCategory};
use crate::{
    config::RunConfig,
    ontology::{OntologyStore, Term, TermId},
};

/// One search-index document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FacetRecord {
    pub id: TermId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Ancestor labels per facet, in ancestor identifier order.
    #[serde(flatten)]
    pub facets: BTreeMap<FacetCategory, Vec<String>>,
}

/// Tallies of the record building pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Native terms looked at.
    pub considered: usize,
    pub written: usize,
    pub obsolete: usize,
    pub unlabeled: usize,
    pub no_ancestors: usize,
    /// Terms whose ancestors are all in the native namespace; they only
    /// show up in searches without facet filters.
    pub only_native_ancestors: usize,
    pub unresolved_labels: usize,
    pub unclassified: usize,
    pub unlabeled_ids: Vec<TermId>,
    pub no_ancestor_ids: Vec<TermId>,
    pub only_native_ids: Vec<TermId>,
}

impl RecordStats {
    pub fn summarize(&self) {
        info!(
            considered = self.considered,
            written = self.written,
            obsolete = self.obsolete,
            unlabeled = self.unlabeled,
            "records"
        );
        info!(
            no_ancestors = self.no_ancestors,
            only_native_ancestors = self.only_native_ancestors,
            unresolved_labels = self.unresolved_labels,
            unclassified = self.unclassified,
            "ancestor coverage"
        );
        if self.only_native_ancestors > 0 {
            info!("terms with only native ancestors appear in searches only when no facet is selected");
        }
        for id in &self.unlabeled_ids {
            debug!(%id, "no label, skipped");
        }
        for id in &self.no_ancestor_ids {
            debug!(%id, "no ancestors");
        }
        for id in &self.only_native_ids {
            debug!(%id, "only native ancestors");
        }
    }
}

/// Builds records from terms and their closures, counting what it skips.
pub struct RecordBuilder<'a, S: OntologyStore + ?Sized> {
    store: &'a S,
    config: &'a RunConfig,
    stats: RecordStats,
}

impl<'a, S: OntologyStore + ?Sized> RecordBuilder<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, config: &'a RunConfig) -> Self {
        Self {
            store,
            config,
            stats: RecordStats::default(),
        }
    }

    /// Returns the name a record would carry, or `None` when the term is
    /// foreign, obsolete or unlabeled. Obsolete and unlabeled native terms
    /// are counted.
    pub fn eligible<'t>(&mut self, term: &'t Term) -> Option<&'t str> {
        if !term.id().in_namespace(&self.config.native_namespace) {
            return None;
        }
        self.stats.considered += 1;

        let prefix = &self.config.obsolete_label_prefix;
        if term.is_obsolete(prefix) {
            self.stats.obsolete += 1;
            return None;
        }
        let Some(name) = term.current_label(prefix) else {
            debug!(id = %term.id(), "term without label");
            self.stats.unlabeled += 1;
            self.stats.unlabeled_ids.push(term.id().clone());
            return None;
        };
        Some(name)
    }

    /// Builds the record of an eligible term from its closure.
    pub fn build(&mut self, term: &Term, name: &str, ancestors: &BTreeSet<TermId>) -> FacetRecord {
        let verbose = self.config.verbosity.is_verbose_for(term.id());
        let mut facets: BTreeMap<FacetCategory, Vec<String>> = BTreeMap::new();
        let mut foreign_found = false;

        for ancestor in ancestors {
            if ancestor.in_namespace(&self.config.native_namespace) {
                continue;
            }
            foreign_found = true;

            let Some(label) = self.store.label(ancestor) else {
                if verbose {
                    debug!(term = %term.id(), %ancestor, "ancestor without label");
                }
                self.stats.unresolved_labels += 1;
                continue;
            };
            let category = classify(ancestor, Some(label));
            if category == FacetCategory::Unclassified {
                if verbose {
                    debug!(term = %term.id(), %ancestor, label, "ancestor matches no facet");
                }
                self.stats.unclassified += 1;
                continue;
            }
            facets.entry(category).or_default().push(label.to_string());
        }

        if ancestors.is_empty() {
            self.stats.no_ancestors += 1;
            self.stats.no_ancestor_ids.push(term.id().clone());
        } else if !foreign_found {
            self.stats.only_native_ancestors += 1;
            self.stats.only_native_ids.push(term.id().clone());
        }
        self.stats.written += 1;

        FacetRecord {
            id: term.id().clone(),
            name: name.to_string(),
            definition: self.definition(term),
            facets,
        }
    }

    fn definition(&self, term: &Term) -> Option<String> {
        let property = self.store.definition_property()?;
        let text = term.literal(property)?.replace('\n', "");
        Some(if self.config.quote_definitions {
            format!("\"{text}\"")
        } else {
            text
        })
    }

    #[must_use]
    pub fn stats(&self) -> &RecordStats {
        &self.stats
    }

    #[must_use]
    pub fn into_stats(self) -> RecordStats {
        self.stats
    }
}
