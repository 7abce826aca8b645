//! Flattens the ancestor axioms of an OWL ontology into faceted
//! search-index records.
//!
//! The [`ontology`] module loads and indexes the ontology, [`flatten`]
//! computes ancestor closures and builds records, and [`output`] writes them
//! as a bulk-load stream.

pub mod cli;
pub mod config;
pub mod errors;
pub mod flatten;
pub mod logger;
pub mod ontology;
pub mod output;

pub use errors::{Error, Result};
