//! Report rows and their flat, six-column form.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::models::{ArticleDetail, RecordId};

/// Column names of the report, in output order
pub const REPORT_HEADERS: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Separator used to join multi-valued cells
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

/// One report line: a record with at least one selected author
///
/// Rows are only built through [`ReportRow::new`], which keeps authors and
/// affiliations the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    identifier: RecordId,
    title: String,
    publication_date: String,
    non_academic_authors: Vec<String>,
    organization_affiliations: Vec<String>,
    corresponding_email: String,
}

impl ReportRow {
    /// Assemble a row; `None` when the classification selected nobody
    pub fn new(
        identifier: RecordId,
        detail: &ArticleDetail,
        classification: Classification,
    ) -> Option<Self> {
        if classification.is_empty() {
            return None;
        }

        let (non_academic_authors, organization_affiliations) = classification.into_parts();

        Some(Self {
            identifier,
            title: detail.title.clone(),
            publication_date: detail.publication_date.clone(),
            non_academic_authors,
            organization_affiliations,
            corresponding_email: detail.email.clone(),
        })
    }

    pub fn identifier(&self) -> &RecordId {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn publication_date(&self) -> &str {
        &self.publication_date
    }

    pub fn non_academic_authors(&self) -> &[String] {
        &self.non_academic_authors
    }

    pub fn organization_affiliations(&self) -> &[String] {
        &self.organization_affiliations
    }

    pub fn corresponding_email(&self) -> &str {
        &self.corresponding_email
    }

    /// Flatten into the six report cells
    pub fn to_record(&self) -> ReportRecord {
        ReportRecord {
            pubmed_id: self.identifier.to_string(),
            title: self.title.clone(),
            publication_date: self.publication_date.clone(),
            non_academic_authors: self.non_academic_authors.join(MULTI_VALUE_SEPARATOR),
            company_affiliations: self.organization_affiliations.join(MULTI_VALUE_SEPARATOR),
            corresponding_email: self.corresponding_email.clone(),
        }
    }
}

/// A report row as written to and read from delimited output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Publication Date")]
    pub publication_date: String,

    #[serde(rename = "Non-academic Author(s)")]
    pub non_academic_authors: String,

    #[serde(rename = "Company Affiliation(s)")]
    pub company_affiliations: String,

    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
}

impl ReportRecord {
    /// Cells in [`REPORT_HEADERS`] order
    pub fn cells(&self) -> [&str; 6] {
        [
            self.pubmed_id.as_str(),
            self.title.as_str(),
            self.publication_date.as_str(),
            self.non_academic_authors.as_str(),
            self.company_affiliations.as_str(),
            self.corresponding_email.as_str(),
        ]
    }
}
