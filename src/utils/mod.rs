//! Utility modules supporting the fetch pipeline.
//!
//! - [`HttpClient`]: shared reqwest client built from [`HttpConfig`](crate::config::HttpConfig)
//! - [`RetryConfig`] / [`with_retry`]: fixed-delay retry for upstream calls
//! - [`XmlElement`]: owned element tree used for record extraction
//!
//! # Retry
//!
//! ```rust,no_run
//! use pubmed_fetcher::sources::SourceError;
//! use pubmed_fetcher::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().with_max_attempts(3);
//! let data = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod xml;

pub use http::HttpClient;
pub use retry::{with_retry, RetryConfig};
pub use xml::{XmlElement, XmlError, XmlNode};
