//! # Application Error Handling

use std::path::PathBuf;

/// Fatal failures of a flattening run.
///
/// Per-term and per-axiom problems are not errors: they are counted in the
/// run report and the run carries on.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The ontology document could not be found or opened.
    #[error("failed to access ontology file `{path}`: {source}")]
    InputFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The ontology document was found but is not valid RDF.
    #[error("failed to parse ontology file `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to read configuration `{path}`: {source}")]
    ConfigFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration `{path}`: {source}")]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to write output `{path}`: {source}")]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
