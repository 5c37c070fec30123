//! # PubMed Fetcher
//!
//! Search PubMed and report papers with at least one author affiliated to a
//! pharmaceutical or biotech company.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`sources`]: Literature database clients behind the [`LiteratureSource`] trait
//! - [`fetcher`]: The search → detail fetch → classification pipeline
//! - [`classify`]: Keyword-based affiliation classification
//! - [`models`]: Records, authors and report rows
//! - [`report`]: CSV and console output
//! - [`utils`]: HTTP client, retry and XML tree utilities
//! - [`config`]: Configuration management

pub mod classify;
pub mod config;
pub mod fetcher;
pub mod models;
pub mod report;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use classify::AffiliationClassifier;
pub use fetcher::LiteratureFetcher;
pub use models::ReportRow;
pub use sources::{LiteratureSource, PubMedSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
