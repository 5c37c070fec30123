//! Configuration management.
//!
//! Configuration is read from an optional TOML file and from environment
//! variables prefixed with `PUBMED_FETCHER_`; nested keys are separated by a
//! double underscore.
//!
//! ```toml
//! [search]
//! max_results = 20
//!
//! [retry]
//! max_attempts = 3
//! delay_ms = 5000
//!
//! [classifier]
//! keywords = ["pharma", "biotech", "inc.", "ltd"]
//!
//! [http]
//! timeout_secs = 60
//!
//! [fetch]
//! concurrency = 1
//!
//! [ncbi]
//! base_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//! tool = "pubmed-fetcher"
//! email = "you@example.org"
//! ```
//!
//! ```bash
//! export PUBMED_FETCHER_SEARCH__MAX_RESULTS=50
//! export PUBMED_FETCHER_CLASSIFIER__KEYWORDS="pharma,biotech"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::ClassifierConfig;
use crate::sources::DEFAULT_EUTILS_BASE_URL;
use crate::utils::RetryConfig;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "pubmed-fetcher.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PUBMED_FETCHER";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Search stage settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Retry policy shared by search and detail fetch
    #[serde(default)]
    pub retry: RetryConfig,

    /// Affiliation keywords
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Detail fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// NCBI E-utilities endpoint and identification
    #[serde(default)]
    pub ncbi: NcbiConfig,
}

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of record ids taken from one search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Detail fetch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Detail fetches kept in flight; output order is unaffected
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    1
}

/// NCBI E-utilities configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NcbiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (optional, raises NCBI's request allowance)
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Tool name reported to NCBI
    #[serde(default)]
    pub tool: Option<String>,

    /// Contact email reported to NCBI
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for NcbiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            tool: None,
            email: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_EUTILS_BASE_URL.to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var("NCBI_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Load configuration from environment variables only
pub fn load_env_config() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder().add_source(env_source()).build()?;

    settings.try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("classifier.keywords")
}

/// Find a configuration file in the default locations
///
/// Looks in the working directory first, then in the user's config directory
/// (`<config_dir>/pubmed-fetcher/config.toml`).
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

/// Render a configuration as TOML
pub fn to_toml(config: &Config) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 5_000);
        assert_eq!(config.http.timeout_secs, 60);
        assert_eq!(config.fetch.concurrency, 1);
        assert_eq!(config.ncbi.base_url, DEFAULT_EUTILS_BASE_URL);
        assert!(config.classifier.keywords.contains(&"pharma".to_string()));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[search]
max_results = 5

[classifier]
keywords = ["genentech", "roche"]

[retry]
delay_ms = 10
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.classifier.keywords, vec!["genentech", "roche"]);
        assert_eq!(config.retry.delay_ms, 10);
        // Untouched sections keep their defaults
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.http.timeout_secs, 60);
    }

    #[test]
    fn test_load_config_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/pubmed-fetcher.toml")).is_err());
    }

    #[test]
    fn test_default_config_renders_as_toml() {
        let rendered = to_toml(&Config::default()).unwrap();
        assert!(rendered.contains("[search]"));
        assert!(rendered.contains("max_results = 20"));
    }
}
