//! Report output: CSV files and console rendering.

use comfy_table::{Attribute, Cell, Table};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::models::{ReportRecord, ReportRow, REPORT_HEADERS};

/// Errors raised while writing or reading a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The finished temporary file could not be moved to its destination
    #[error("could not save report to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A report file does not start with the expected header row
    #[error("unexpected report header: {0:?}")]
    Header(Vec<String>),
}

/// What a write produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report was written with this many data rows
    Written { path: PathBuf, rows: usize },
    /// There was nothing to write; no file was created
    NoResults,
}

/// Console rendering style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleFormat {
    /// One line per row
    #[default]
    Plain,
    /// Boxed table
    Table,
    /// Pretty-printed JSON array
    Json,
}

/// Write rows to `path` as CSV
///
/// The file is written to a temporary sibling and renamed into place, so
/// `path` is either the complete report or untouched. With no rows, nothing
/// is written and [`ReportOutcome::NoResults`] is returned.
pub fn write_csv(path: &Path, rows: &[ReportRow]) -> Result<ReportOutcome, ReportError> {
    if rows.is_empty() {
        return Ok(ReportOutcome::NoResults);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        for row in rows {
            writer.serialize(row.to_record())?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| ReportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());

    Ok(ReportOutcome::Written {
        path: path.to_path_buf(),
        rows: rows.len(),
    })
}

/// Read a CSV report back into flat records
pub fn read_csv(path: &Path) -> Result<Vec<ReportRecord>, ReportError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers != REPORT_HEADERS {
        return Err(ReportError::Header(headers));
    }

    reader
        .deserialize::<ReportRecord>()
        .map(|record| record.map_err(ReportError::from))
        .collect()
}

/// Render rows for the console
pub fn render(rows: &[ReportRow], format: ConsoleFormat) -> Result<String, ReportError> {
    match format {
        ConsoleFormat::Plain => Ok(rows
            .iter()
            .map(render_line)
            .map(|line| line + "\n")
            .collect()),
        ConsoleFormat::Table => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(REPORT_HEADERS.to_vec());

            for row in rows {
                let record = row.to_record();
                let mut cells = record.cells().into_iter().map(Cell::new);
                let mut line = Vec::with_capacity(REPORT_HEADERS.len());
                if let Some(id) = cells.next() {
                    line.push(id.add_attribute(Attribute::Bold));
                }
                line.extend(cells);
                table.add_row(line);
            }
            Ok(format!("{table}\n"))
        }
        ConsoleFormat::Json => {
            let mut json = serde_json::to_string_pretty(rows)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Print rows to `out`, or a "No papers found." line when there are none
pub fn print_rows<W: Write>(
    out: &mut W,
    rows: &[ReportRow],
    format: ConsoleFormat,
) -> Result<(), ReportError> {
    if rows.is_empty() {
        writeln!(out, "No papers found.")?;
        return Ok(());
    }

    out.write_all(render(rows, format)?.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn render_line(row: &ReportRow) -> String {
    let record = row.to_record();
    REPORT_HEADERS
        .iter()
        .zip(record.cells())
        .map(|(header, value)| format!("{}: {}", header, value))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AffiliationClassifier;
    use crate::models::{ArticleDetail, AuthorRecord, RecordId};

    fn row(id: &str, title: &str, authors: &[(&str, &str)]) -> ReportRow {
        let detail = ArticleDetail {
            title: title.to_string(),
            publication_date: "2024-01-15".to_string(),
            authors: authors
                .iter()
                .map(|(name, affiliation)| AuthorRecord {
                    name: name.to_string(),
                    affiliation: affiliation.to_string(),
                })
                .collect(),
            email: format!("author{}@example.com", id),
        };
        let classification = AffiliationClassifier::default().classify(&detail.authors);
        ReportRow::new(RecordId::from(id), &detail, classification).unwrap()
    }

    fn sample_rows() -> Vec<ReportRow> {
        vec![
            row(
                "111",
                "Quoted \"title\", with comma",
                &[
                    ("Jane Doe", "XYZ Pharma Inc, Boston, MA"),
                    ("Ann Lee", "ABC Biotech"),
                ],
            ),
            row("222", "Plain title", &[("John Roe", "State University")]),
            row("333", "Multi\nline title", &[("Kim", "")]),
        ]
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        let rows = sample_rows();

        let outcome = write_csv(&path, &rows).unwrap();
        assert_eq!(
            outcome,
            ReportOutcome::Written {
                path: path.clone(),
                rows: 3
            }
        );

        let records = read_csv(&path).unwrap();
        let expected: Vec<ReportRecord> = rows.iter().map(ReportRow::to_record).collect();
        assert_eq!(records, expected);
        assert_eq!(records[0].non_academic_authors, "Jane Doe, Ann Lee");
        assert_eq!(
            records[0].company_affiliations,
            "XYZ Pharma Inc, Boston, MA, ABC Biotech"
        );
    }

    #[test]
    fn test_csv_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.csv");
        write_csv(&path, &sample_rows()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let first_line = contents.lines().next().unwrap();
        assert_eq!(
            first_line,
            "PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding Author Email"
        );
    }

    #[test]
    fn test_empty_rows_create_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.csv");

        let outcome = write_csv(&path, &[]).unwrap();

        assert_eq!(outcome, ReportOutcome::NoResults);
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("papers.csv");

        let result = write_csv(&path, &sample_rows());

        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_persist_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the destination makes the final rename fail.
        let path = dir.path().join("papers.csv");
        std::fs::create_dir(&path).unwrap();

        let result = write_csv(&path, &sample_rows());

        assert!(matches!(result, Err(ReportError::Persist { .. })));
        assert!(path.is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_read_csv_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "id,name\n1,x\n").unwrap();

        assert!(matches!(read_csv(&path), Err(ReportError::Header(_))));
    }

    #[test]
    fn test_plain_render_one_line_per_row() {
        let rows = sample_rows();
        let rendered = render(&rows[1..2], ConsoleFormat::Plain).unwrap();

        assert_eq!(
            rendered,
            "PubmedID: 222 | Title: Plain title | Publication Date: 2024-01-15 | \
             Non-academic Author(s): John Roe | Company Affiliation(s): State University | \
             Corresponding Author Email: author222@example.com\n"
        );
    }

    #[test]
    fn test_table_and_json_render() {
        let rows = sample_rows();

        let table = render(&rows, ConsoleFormat::Table).unwrap();
        assert!(table.contains("Corresponding Author Email"));
        assert!(table.contains("Plain title"));

        let json = render(&rows, ConsoleFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
        assert_eq!(value[0]["identifier"], "111");
    }

    #[test]
    fn test_print_rows_without_results() {
        let mut out = Vec::new();
        print_rows(&mut out, &[], ConsoleFormat::Plain).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "No papers found.\n");
    }
}
