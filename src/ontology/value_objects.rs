use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use oxrdf::NamedNode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value object ensuring that supplied text represents a valid IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Validates and constructs a new [`Iri`] value object.
    pub fn new(value: impl Into<String>) -> Result<Self, IriError> {
        let value = value.into();
        NamedNode::new(value.as_str()).map_err(|_| IriError::Invalid {
            value: value.clone(),
        })?;
        Ok(Self { value })
    }

    /// Returns the underlying textual representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the local part of the IRI: everything after the last `#` or `/`.
    #[must_use]
    pub fn remainder(&self) -> &str {
        local_part(&self.value)
    }
}

impl From<NamedNode> for Iri {
    fn from(node: NamedNode) -> Self {
        Self {
            value: node.into_string(),
        }
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> Self {
        iri.value
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors produced when validating an [`Iri`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IriError {
    /// The provided text could not be parsed as an IRI.
    #[error("invalid IRI: {value}")]
    Invalid { value: String },
}

/// Namespace-prefixed term identifier such as `DOID:4` or `UBERON:0002107`.
///
/// OBO-style IRIs (`http://purl.obolibrary.org/obo/DOID_4`) and underscore
/// forms (`DOID_4`) normalize to the same identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TermId {
    value: String,
}

impl TermId {
    /// Parses an identifier from an IRI, a CURIE or an underscore form.
    pub fn parse(value: &str) -> Result<Self, TermIdError> {
        let local = local_part(value.trim());
        if local.is_empty() {
            return Err(TermIdError::Empty {
                value: value.to_string(),
            });
        }
        Ok(Self::from_local(local))
    }

    /// Builds the identifier of an IRI. Never fails: IRIs without a
    /// recognizable namespace keep their local part as is.
    #[must_use]
    pub fn from_iri(iri: &Iri) -> Self {
        Self::from_local(iri.remainder())
    }

    fn from_local(local: &str) -> Self {
        let value = if local.contains(':') {
            local.to_string()
        } else {
            local.replacen('_', ":", 1)
        };
        Self { value }
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the namespace prefix, e.g. `DOID` for `DOID:4`.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.value
            .split_once(':')
            .map(|(namespace, _)| namespace)
            .filter(|namespace| !namespace.is_empty())
    }

    /// Whether the identifier lives in the supplied namespace.
    #[must_use]
    pub fn in_namespace(&self, namespace: &str) -> bool {
        self.namespace() == Some(namespace)
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for TermId {
    type Err = TermIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&Iri> for TermId {
    fn from(iri: &Iri) -> Self {
        Self::from_iri(iri)
    }
}

/// Errors produced when parsing a [`TermId`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TermIdError {
    #[error("invalid term identifier: `{value}`")]
    Empty { value: String },
}

fn local_part(value: &str) -> &str {
    if value.contains("://") || value.starts_with("urn:") {
        value
            .rsplit(|c| c == '#' || c == '/')
            .next()
            .unwrap_or(value)
    } else {
        value
    }
}
