//! Affiliation keyword classification.
//!
//! An author is counted as non-academic when their affiliation contains one
//! of the configured keywords as a case-insensitive substring. Matching is
//! loose: "pharma" also hits "pharmaceutical". Company suffixes in the
//! default list are spelled so they do not occur inside common place and
//! institution names ("inc." rather than "inc", which hits "Province").
//!
//! When no author of a record matches, every author is returned instead.
//! Callers relying on "only matched authors" semantics must check
//! [`Classification::is_fallback`].

use serde::{Deserialize, Serialize};

use crate::models::AuthorRecord;

/// Keywords used when no configuration overrides them
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "pharma",
    "pharmaceutical",
    "biotech",
    "biotechnology",
    "inc.",
    "incorporated",
    "ltd",
    "corporation",
    "company",
    "gmbh",
    "llc",
];

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Lowercase substrings identifying an organization of interest
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Authors selected for one record, with their affiliations index-aligned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    authors: Vec<String>,
    affiliations: Vec<String>,
    fallback: bool,
}

impl Classification {
    fn push(&mut self, author: &AuthorRecord) {
        self.authors.push(author.name.clone());
        self.affiliations.push(author.affiliation.clone());
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn affiliations(&self) -> &[String] {
        &self.affiliations
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// True when no author matched and all authors were returned instead
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Split into (authors, affiliations)
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.authors, self.affiliations)
    }
}

/// Keyword-based affiliation classifier
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    keywords: Vec<String>,
}

impl AffiliationClassifier {
    /// Create a classifier; keywords are lowercased and blanks dropped
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(&config.keywords)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether an affiliation contains any keyword
    pub fn is_match(&self, affiliation: &str) -> bool {
        let affiliation = affiliation.to_lowercase();
        self.keywords.iter().any(|k| affiliation.contains(k.as_str()))
    }

    /// Select the non-academic authors of one record, in original order
    pub fn classify(&self, authors: &[AuthorRecord]) -> Classification {
        let mut selected = Classification::default();

        for author in authors {
            let matched = self.is_match(&author.affiliation);
            tracing::debug!(
                "Author: {}, Affiliation: {:?}, match: {}",
                author.name,
                author.affiliation,
                matched
            );
            if matched {
                selected.push(author);
            }
        }

        if selected.is_empty() && !authors.is_empty() {
            tracing::debug!(
                "No affiliation matched among {} authors, keeping all",
                authors.len()
            );
            selected.fallback = true;
            for author in authors {
                selected.push(author);
            }
        }

        selected
    }
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}
