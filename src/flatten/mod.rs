//! Ancestor flattening.
//!
//! A [`Flattener`] walks every declared term of an [`OntologyStore`],
//! computes its ancestor closure and writes one faceted record per native,
//! current, labelled term.

pub mod axioms;
pub mod closure;
pub mod diagnostics;
pub mod exclusion;
pub mod expression;
pub mod facets;
pub mod record;

use std::io::Write;

use tracing::{debug, info};

pub use self::{
    closure::{Ancestors, ClosureEngine},
    diagnostics::Diagnostics,
    exclusion::{ExcludeSet, ExclusionFilter},
    facets::{classify, FacetCategory},
    record::{FacetRecord, RecordBuilder, RecordStats},
};
use crate::{config::RunConfig, ontology::OntologyStore, output::BulkWriter, Result};

/// Outcome of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub stats: RecordStats,
    pub diagnostics: Diagnostics,
    /// Size of the set of root children excluded from every closure.
    pub excluded_children: usize,
}

impl FlattenReport {
    pub fn summarize(&self) {
        self.stats.summarize();
        self.diagnostics.summarize();
    }
}

pub struct Flattener<'a, S: OntologyStore + ?Sized> {
    store: &'a S,
    config: &'a RunConfig,
}

impl<'a, S: OntologyStore + ?Sized> Flattener<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, config: &'a RunConfig) -> Self {
        Self { store, config }
    }

    /// Writes the records of every eligible term in identifier order.
    ///
    /// # Errors
    ///
    /// Only output failures abort the run; per-term and per-axiom problems
    /// end up in the report.
    pub fn run<W: Write>(&self, writer: &mut BulkWriter<W>) -> Result<FlattenReport> {
        let config = self.config;
        let mut diagnostics = Diagnostics::default();
        let exclude = ExcludeSet::children_of(self.store, &config.root, &mut diagnostics);
        let excluded_children = exclude.len();
        info!(root = %config.root, children = excluded_children, "excluding root children");

        let filter = ExclusionFilter::new(
            config.native_namespace.clone(),
            config.root.clone(),
            exclude,
        );
        let mut engine = ClosureEngine::new(
            self.store,
            filter,
            config.evidence_property.clone(),
            config.verbosity.clone(),
        );
        let mut records = RecordBuilder::new(self.store, config);

        for id in self.store.terms() {
            let Some(term) = self.store.term(&id) else {
                continue;
            };
            let Some(name) = records.eligible(term) else {
                continue;
            };

            let ancestors = engine.closure_of(&id);
            if config.verbosity.is_verbose_for(&id) {
                debug!(%id, name, ancestors = ?ancestors, "closure");
            }
            let record = records.build(term, name, &ancestors);
            writer.write_record(&record)?;
        }
        writer.flush()?;

        diagnostics.merge(engine.into_diagnostics());
        Ok(FlattenReport {
            stats: records.into_stats(),
            diagnostics,
            excluded_children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Flattener;
    use crate::{
        config::{FlattenSettings, RunConfig, Verbosity},
        ontology::{
            vocab, AnnotationAssertion, AnnotationValue, Axiom, ClassExpression,
            InMemoryOntologyStore, Iri, OntologyStore, TermId,
        },
        output::BulkWriter,
    };

    fn id(text: &str) -> TermId {
        TermId::parse(text).expect("valid id")
    }

    fn label(subject: &str, text: &str) -> AnnotationAssertion {
        AnnotationAssertion::new(
            id(subject),
            Iri::new(vocab::RDFS_LABEL).expect("iri"),
            AnnotationValue::Literal(text.into()),
        )
    }

    fn subclass(sub: &str, sup: ClassExpression) -> Axiom {
        Axiom::subclass_of(ClassExpression::class(id(sub)), sup)
    }

    fn run(store: &dyn OntologyStore) -> (String, super::FlattenReport) {
        let config = RunConfig::new(
            id("DOID:4"),
            &FlattenSettings::default(),
            Verbosity::default(),
        );
        let mut writer = BulkWriter::new(Vec::new());
        let report = Flattener::new(store, &config)
            .run(&mut writer)
            .expect("run succeeds");
        let output = String::from_utf8(writer.into_inner().expect("flushes")).expect("utf8");
        (output, report)
    }

    #[test]
    fn sample_disease_record() {
        let mut builder = InMemoryOntologyStore::builder();
        builder
            .declare_class(id("DOID:4"))
            .declare_class(id("DOID:0001"))
            .annotate(label("DOID:4", "disease"))
            .annotate(label("DOID:0001", "sample disease"))
            .annotate(label("UBERON:0002107", "liver"))
            .axiom(subclass("DOID:0001", ClassExpression::class(id("UBERON:0002107"))));
        let (output, report) = run(&builder.build());

        insta::assert_snapshot!(output, @r#"
        { "create":{ } }
        {"id":"DOID:0001","name":"sample disease","anatomy":["liver"]}
        { "create":{ } }
        {"id":"DOID:4","name":"disease"}
        "#);
        assert_eq!(report.stats.written, 2);
        assert_eq!(report.stats.no_ancestor_ids, vec![id("DOID:4")]);
    }

    #[test]
    fn equivalence_intersection_pulls_restriction_fillers_only() {
        let has_material_basis =
            Iri::new("http://purl.obolibrary.org/obo/RO_0004024").expect("iri");
        let mut builder = InMemoryOntologyStore::builder();
        builder
            .declare_class(id("DOID:0001"))
            .declare_class(id("DOID:0002"))
            .annotate(label("DOID:0001", "chemical disease"))
            .annotate(label("DOID:0002", "parent disease"))
            .annotate(label("CHEBI:0003", "toxin"))
            .axiom(Axiom::EquivalentClasses(vec![
                ClassExpression::class(id("DOID:0001")),
                ClassExpression::IntersectionOf(vec![
                    ClassExpression::class(id("DOID:0002")),
                    ClassExpression::some(
                        has_material_basis,
                        ClassExpression::class(id("CHEBI:0003")),
                    ),
                ]),
            ]));
        let store = builder.build();
        let (output, _) = run(&store);

        let first_record = output.lines().nth(1).expect("record line");
        assert_eq!(
            first_record,
            r#"{"id":"DOID:0001","name":"chemical disease","chebi":["toxin"]}"#
        );
    }

    #[test]
    fn obsolete_terms_are_counted_not_written() {
        let deprecated = AnnotationAssertion::new(
            id("DOID:0002"),
            Iri::new(vocab::OWL_DEPRECATED).expect("iri"),
            AnnotationValue::Literal("true".into()),
        );
        let mut builder = InMemoryOntologyStore::builder();
        builder
            .declare_class(id("DOID:0001"))
            .declare_class(id("DOID:0002"))
            .declare_class(id("DOID:0003"))
            .declare_class(id("UBERON:0002107"))
            .annotate(label("DOID:0001", "obsolete sample disease"))
            .annotate(label("DOID:0002", "old disease"))
            .annotate(deprecated)
            .annotate(label("DOID:0003", "current disease"))
            .annotate(label("UBERON:0002107", "liver"));
        let (output, report) = run(&builder.build());

        assert_eq!(output.lines().count(), 2);
        assert!(output.contains("DOID:0003"));
        assert_eq!(report.stats.considered, 3);
        assert_eq!(report.stats.obsolete, 2);
        assert_eq!(report.stats.written, 1);
    }
}
