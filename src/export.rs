// 📤 CSV Serializer - selected manufacturers → quoted CSV
//
// Every cell is quoted and inner quotes are doubled, whether or not the
// cell needs it. Rows end with `\n`.

use crate::manufacturer::ManufacturerRecord;
use chrono::NaiveDate;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CSV_HEADER: [&str; 15] = [
    "Name",
    "City",
    "State",
    "Classification",
    "Employees",
    "Annual Revenue",
    "Rating",
    "MOQ",
    "Lead Time (days)",
    "Capacity (%)",
    "Sustainability Score",
    "Year Established",
    "Capabilities",
    "Materials",
    "Certifications",
];

pub const DEFAULT_LIST_DELIMITER: &str = "; ";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("select at least one manufacturer to export")]
    EmptySelection,

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write export file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Joins members of set-valued columns
    pub list_delimiter: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            list_delimiter: DEFAULT_LIST_DELIMITER.to_string(),
        }
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// The 15 cells of one data row, in header order
pub fn record_row(record: &ManufacturerRecord, options: &ExportOptions) -> [String; 15] {
    let join = |values: &[String]| values.join(&options.list_delimiter);
    [
        record.name.clone(),
        record.location.city.clone(),
        record.location.state.clone(),
        join(&record.classification),
        opt(record.employee_count),
        opt(record.annual_revenue),
        opt(record.rating),
        opt(record.moq),
        opt(record.lead_time_days),
        opt(record.current_capacity),
        opt(record.sustainability_score),
        opt(record.year_established),
        join(&record.capabilities),
        join(&record.materials),
        join(&record.certifications),
    ]
}

/// Write header plus one row per record to `writer`
pub fn write_csv<W: Write>(
    writer: W,
    records: &[&ManufacturerRecord],
    options: &ExportOptions,
) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptySelection);
    }

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(record_row(record, options))?;
    }
    wtr.flush().map_err(csv::Error::from)?;

    Ok(())
}

pub fn to_csv_string(records: &[&ManufacturerRecord], options: &ExportOptions) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records, options)?;
    // Every cell came from a `String`, so the buffer is valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `manufacturers_export_2025-03-14.csv`
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("manufacturers_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Serialize `records` into `path`; nothing is created for an empty selection
pub fn export_to_file(path: &Path, records: &[&ManufacturerRecord], options: &ExportOptions) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptySelection);
    }

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, records, options)?;

    tracing::info!(path = %path.display(), rows = records.len(), "exported manufacturers");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_manufacturers;

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = to_csv_string(&[], &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptySelection));
    }

    #[test]
    fn test_header_and_rows() {
        let records = seed_manufacturers();
        let picked = vec![&records[0], &records[1]];
        let csv = to_csv_string(&picked, &ExportOptions::default()).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("\"Name\",\"City\",\"State\""));
        assert!(lines[1].starts_with("\"Precision Parts Co.\",\"San Jose\",\"CA\""));
        assert!(lines[1].contains("\"CNC Machining; Prototyping; Assembly\""));
    }

    #[test]
    fn test_comma_and_quote_escaping() {
        let mut records = seed_manufacturers();
        records[0].name = "Acme, Inc.".to_string();
        records[1].name = "The \"Best\" Shop".to_string();
        let picked = vec![&records[0], &records[1]];

        let csv = to_csv_string(&picked, &ExportOptions::default()).unwrap();
        assert!(csv.contains("\"Acme, Inc.\""));
        assert!(csv.contains("\"The \"\"Best\"\" Shop\""));
    }

    #[test]
    fn test_missing_values_are_empty_quoted_cells() {
        let mut records = seed_manufacturers();
        records[0].moq = None;
        records[0].certifications.clear();

        let row = record_row(&records[0], &ExportOptions::default());
        assert_eq!(row[7], "");
        assert_eq!(row[14], "");

        let csv = to_csv_string(&[&records[0]], &ExportOptions::default()).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with(",\"\""));
    }

    #[test]
    fn test_custom_delimiter() {
        let records = seed_manufacturers();
        let options = ExportOptions {
            list_delimiter: " | ".to_string(),
        };
        let row = record_row(&records[8], &options);
        assert_eq!(row[13], "Hardwood | Plywood");
    }

    #[test]
    fn test_default_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(default_export_filename(date), "manufacturers_export_2025-03-14.csv");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = seed_manufacturers();

        export_to_file(&path, &[&records[2]], &ExportOptions::default()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let empty = dir.path().join("empty.csv");
        assert!(export_to_file(&empty, &[], &ExportOptions::default()).is_err());
        assert!(!empty.exists());
    }
}
