//! Core data models for literature records and report rows.

mod record;
mod report;

pub use record::{ArticleDetail, AuthorRecord, RecordId};
pub use report::{ReportRecord, ReportRow, MULTI_VALUE_SEPARATOR, REPORT_HEADERS};
