//! # Configuration
//!
//! Settings are read from an optional YAML file where every key has a
//! default, so an empty (or absent) file yields a working setup:
//!
//! ```yaml
//! flatten:
//!   native_namespace: DOID
//!   evidence_property: http://purl.org/dc/elements/1.1/type
//!   obsolete_label_prefix: "obsolete "
//!   quote_definitions: true
//! output:
//!   path: outputfile.json
//!   action_line: '{ "create":{ } }'
//! logger:
//!   level: info
//!   format: compact
//! ```
//!
//! Command line flags override the file; the merged result is a
//! [`RunConfig`] that is threaded through the run.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    ontology::{vocab, Iri, TermId},
    Error, Result,
};

/// Default output file of a run.
pub const DEFAULT_OUTPUT: &str = "outputfile.json";
/// Bulk-load action line written before every record.
pub const DEFAULT_ACTION_LINE: &str = r#"{ "create":{ } }"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub flatten: FlattenSettings,
    pub output: OutputSettings,
    pub logger: LoggerSettings,
}

impl Config {
    /// Loads the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// When the file cannot be read or is not valid YAML for this shape.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a YAML document. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// When the document does not match the configuration shape.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// How terms are selected and flattened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlattenSettings {
    /// Identifier prefix of the terms records are written for.
    pub native_namespace: String,
    /// Annotation property tagging annotation assertions with evidence codes.
    pub evidence_property: Iri,
    /// Label prefix marking a term as obsolete.
    pub obsolete_label_prefix: String,
    /// Wrap definitions in double quotes, as the search front-end renders
    /// them verbatim.
    pub quote_definitions: bool,
}

impl Default for FlattenSettings {
    fn default() -> Self {
        Self {
            native_namespace: "DOID".to_string(),
            evidence_property: Iri::from(oxrdf::NamedNode::new_unchecked(vocab::DC_TYPE)),
            obsolete_label_prefix: "obsolete ".to_string(),
            quote_definitions: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub action_line: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT),
            action_line: DEFAULT_ACTION_LINE.to_string(),
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerSettings {
    /// Level used when `RUST_LOG` is not set.
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Which terms get verbose walk output.
///
/// With trace ids, only those terms are verbose; otherwise every term is
/// verbose when debugging is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub debug: bool,
    pub trace: BTreeSet<TermId>,
}

impl Verbosity {
    #[must_use]
    pub fn is_verbose_for(&self, id: &TermId) -> bool {
        if self.trace.is_empty() {
            self.debug
        } else {
            self.trace.contains(id)
        }
    }

    /// Whether any verbose output was requested at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.debug || !self.trace.is_empty()
    }
}

/// Everything one flattening run needs, resolved from the configuration
/// file and the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub root: TermId,
    pub native_namespace: String,
    pub evidence_property: Iri,
    pub obsolete_label_prefix: String,
    pub quote_definitions: bool,
    pub verbosity: Verbosity,
}

impl RunConfig {
    #[must_use]
    pub fn new(root: TermId, settings: &FlattenSettings, verbosity: Verbosity) -> Self {
        Self {
            root,
            native_namespace: settings.native_namespace.clone(),
            evidence_property: settings.evidence_property.clone(),
            obsolete_label_prefix: settings.obsolete_label_prefix.clone(),
            quote_definitions: settings.quote_definitions,
            verbosity,
        }
    }
}
