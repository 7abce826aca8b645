//! Ontology domain primitives and the read-only store the flattener queries.
//!
//! The module keeps the OWL model independent from the flattening logic:
//! value objects for identifiers, the class expression and axiom model, the
//! [`OntologyStore`] contract, and an RDF loader producing the in-memory
//! implementation of that contract.

pub mod entities;
pub mod rdf;
pub mod repositories;
pub mod service;
pub mod value_objects;
pub mod vocab;

pub use entities::{
    Annotation, AnnotationAssertion, AnnotationValue, Axiom, ClassExpression, Term,
};
pub use rdf::RdfFormat;
pub use repositories::{OntologyStore, OntologySummary};
pub use service::{InMemoryOntologyStore, OntologyStoreBuilder};
pub use value_objects::{Iri, IriError, TermId, TermIdError};
