//! Records as returned by the literature database.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one record in the upstream database (a PMID for PubMed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One author entry of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Display name, "{given} {family}" or just the family name
    pub name: String,

    /// Free-text affiliation, empty when the record has none
    pub affiliation: String,
}

impl AuthorRecord {
    /// Build an author from given and family names
    ///
    /// Returns `None` when the family name is blank; such entries are not
    /// attributable to a person and are dropped.
    pub fn from_names(given: &str, family: &str, affiliation: impl Into<String>) -> Option<Self> {
        let family = family.trim();
        if family.is_empty() {
            return None;
        }

        let given = given.trim();
        let name = if given.is_empty() {
            family.to_string()
        } else {
            format!("{} {}", given, family)
        };

        Some(Self {
            name,
            affiliation: affiliation.into().trim().to_string(),
        })
    }
}

/// Fields extracted from one detail fetch
///
/// Every field degrades to empty when missing from the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    pub title: String,

    /// "YYYY-MM-DD", or empty when any component is missing
    pub publication_date: String,

    pub authors: Vec<AuthorRecord>,

    /// First email found anywhere in the document
    pub email: String,
}
