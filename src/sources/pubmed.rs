//! PubMed research source implementation using E-utilities API.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::{Config, NcbiConfig};
use crate::models::{ArticleDetail, AuthorRecord, RecordId};
use crate::sources::{LiteratureSource, SourceError};
use crate::utils::{HttpClient, XmlElement};

/// PubMed E-utilities API base URL
pub const DEFAULT_EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// PubMed research source
///
/// Uses `esearch` (JSON) to resolve a query to PMIDs and `efetch` (XML) to
/// retrieve one article at a time.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    ncbi: NcbiConfig,
}

impl PubMedSource {
    /// Create a new PubMed source with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    /// Create a PubMed source from application configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Ok(Self {
            client: Arc::new(HttpClient::from_config(&config.http)?),
            ncbi: config.ncbi.clone(),
        })
    }

    /// Create with a custom HTTP client and NCBI settings (for testing)
    pub fn with_client(client: Arc<HttpClient>, ncbi: NcbiConfig) -> Self {
        Self { client, ncbi }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.ncbi.base_url.trim_end_matches('/'), name)
    }

    /// Parameters NCBI asks clients to identify themselves with
    fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(api_key) = &self.ncbi.api_key {
            params.push(("api_key", api_key.clone()));
        }
        if let Some(tool) = &self.ncbi.tool {
            params.push(("tool", tool.clone()));
        }
        if let Some(email) = &self.ncbi.email {
            params.push(("email", email.clone()));
        }
        params
    }

    fn search_params(&self, query: &str, max_results: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", max_results.to_string()),
        ];
        params.extend(self.identity_params());
        params
    }

    fn fetch_params(&self, id: &RecordId) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", id.to_string()),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.identity_params());
        params
    }

    async fn get_text(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Request to PubMed failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "PubMed API returned status: {}",
                status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// Parse E-utilities search response JSON
    ///
    /// A response without `esearchresult.idlist` (for example an NCBI error
    /// payload) yields no ids.
    pub fn parse_search_response(
        body: &str,
        max_results: usize,
    ) -> Result<Vec<RecordId>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct ESearchResponse {
            #[serde(default)]
            esearchresult: Option<ESearchResult>,
        }

        #[derive(Debug, Deserialize)]
        struct ESearchResult {
            #[serde(default)]
            idlist: Vec<String>,
        }

        let response: ESearchResponse = serde_json::from_str(body)?;

        Ok(response
            .esearchresult
            .map(|result| result.idlist)
            .unwrap_or_default()
            .into_iter()
            .take(max_results)
            .map(RecordId::from)
            .collect())
    }

    /// Parse E-utilities fetch response XML for a single record
    pub fn parse_fetch_response(id: &RecordId, xml: &str) -> Result<ArticleDetail, SourceError> {
        let root = XmlElement::parse(xml)?;

        if root.find("PubmedArticle").is_none() && root.find("PubmedBookArticle").is_none() {
            return Err(SourceError::NotFound(id.to_string()));
        }

        Ok(extract_detail(&root))
    }
}

/// Extract report fields from a parsed efetch document
///
/// Each field is looked up independently; anything missing is left empty.
pub fn extract_detail(root: &XmlElement) -> ArticleDetail {
    ArticleDetail {
        title: extract_title(root),
        publication_date: extract_publication_date(root),
        authors: extract_authors(root),
        email: extract_email(root),
    }
}

fn extract_title(root: &XmlElement) -> String {
    match root.find("ArticleTitle") {
        Some(title) => {
            let text = title.text();
            if text.is_empty() {
                tracing::debug!("ArticleTitle empty or undecodable");
            }
            text
        }
        None => {
            tracing::debug!("ArticleTitle missing, leaving title empty");
            String::new()
        }
    }
}

fn extract_publication_date(root: &XmlElement) -> String {
    let Some(pub_date) = root.find("PubDate") else {
        tracing::debug!("PubDate missing, leaving publication date empty");
        return String::new();
    };

    let date = compose_date(
        &pub_date.child_text("Year"),
        &pub_date.child_text("Month"),
        &pub_date.child_text("Day"),
    );
    if date.is_empty() {
        tracing::debug!("PubDate incomplete: {:?}", pub_date.text());
    }
    date
}

fn extract_authors(root: &XmlElement) -> Vec<AuthorRecord> {
    let Some(list) = root.find("AuthorList") else {
        tracing::debug!("AuthorList missing, record has no authors");
        return Vec::new();
    };

    list.children_named("Author")
        .filter_map(|author| {
            let affiliation = author
                .child("AffiliationInfo")
                .map(|info| info.child_text("Affiliation"))
                .or_else(|| author.child("Affiliation").map(XmlElement::text))
                .unwrap_or_default();

            let record = AuthorRecord::from_names(
                &author.child_text("ForeName"),
                &author.child_text("LastName"),
                affiliation,
            );
            if record.is_none() {
                tracing::debug!("Skipping author entry without LastName: {:?}", author.text());
            }
            record
        })
        .collect()
}

// First <Email> anywhere in the document, not necessarily one of the selected authors'.
fn extract_email(root: &XmlElement) -> String {
    root.find("Email")
        .map(XmlElement::text)
        .unwrap_or_default()
}

/// Compose "YYYY-MM-DD" from PubDate parts
///
/// Returns an empty string unless all three parts are present. Month names
/// ("Jan", "January") become two-digit numbers and numeric parts are
/// zero-padded; anything else is kept as written.
pub fn compose_date(year: &str, month: &str, day: &str) -> String {
    let (year, month, day) = (year.trim(), month.trim(), day.trim());
    if year.is_empty() || month.is_empty() || day.is_empty() {
        return String::new();
    }

    format!("{}-{}-{}", year, normalize_month(month), zero_pad(day))
}

fn normalize_month(month: &str) -> String {
    if month.parse::<u32>().is_ok() {
        return zero_pad(month);
    }
    match month.parse::<chrono::Month>() {
        Ok(m) => format!("{:02}", m.number_from_month()),
        Err(_) => month.to_string(),
    }
}

fn zero_pad(value: &str) -> String {
    value
        .parse::<u32>()
        .map(|n| format!("{:02}", n))
        .unwrap_or_else(|_| value.to_string())
}

#[async_trait]
impl LiteratureSource for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RecordId>, SourceError> {
        let url = self.endpoint("esearch.fcgi");
        let body = self
            .get_text(&url, &self.search_params(query, max_results))
            .await?;

        Self::parse_search_response(&body, max_results)
    }

    async fn fetch_detail(&self, id: &RecordId) -> Result<ArticleDetail, SourceError> {
        let url = self.endpoint("efetch.fcgi");
        let xml = self.get_text(&url, &self.fetch_params(id)).await?;

        Self::parse_fetch_response(id, &xml)
    }
}
