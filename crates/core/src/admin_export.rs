//! Reader for the teacher export produced by the school administration
//! system.
//!
//! The export is a headerless, semicolon-delimited table read by position:
//!
//! | col | content          | col | content          |
//! |-----|------------------|-----|------------------|
//! | 0   | guid             | 7   | birthday         |
//! | 1   | email            | 8   | initial password |
//! | 2   | short name       | 9   | deleted flag     |
//! | 3   | last name        | 10  | new flag         |
//! | 4   | first name       | 11  | role flag        |
//! | 5   | classes          | 12  | groups           |
//! | 6   | courses          |     |                  |
//!
//! Flags are `-1` for true. Credentials are never taken from the export;
//! they are derived from the names.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::credentials::CredentialGenerator;
use crate::errors::ExportParseError;
use crate::models::Teacher;

const COL_GUID: usize = 0;
const COL_LAST_NAME: usize = 3;
const COL_FIRST_NAME: usize = 4;
const COL_DELETED: usize = 9;
const COL_NEW: usize = 10;

/// Rows shorter than this cannot carry both status flags.
const MIN_FIELDS: usize = COL_NEW + 1;

const TRUE_SENTINEL: &str = "-1";
const UTF8_BOM: &str = "\u{feff}";

/// One parsed export row.
#[derive(Debug, Clone)]
pub struct ExternalRecord {
    /// Candidate record with freshly derived credentials.
    pub teacher: Teacher,
    /// The administration system created this person since the last export.
    pub is_new: bool,
    /// The administration system removed this person.
    pub is_deleted: bool,
    /// 1-based line in the export file.
    pub line: u64,
}

/// A row that was not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Everything read from one export file.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub records: Vec<ExternalRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Read and parse an export file.
pub fn parse_file<P: AsRef<Path>>(
    path: P,
    credentials: &CredentialGenerator,
) -> Result<ParsedExport, ExportParseError> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading administration export");

    if !path.exists() {
        return Err(ExportParseError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| ExportParseError::Encoding {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let parsed = parse_str(&text, credentials);
    info!(
        rows = parsed.records.len(),
        skipped = parsed.skipped.len(),
        "administration export parsed"
    );
    Ok(parsed)
}

/// Parse export content that is already decoded.
pub fn parse_str(content: &str, credentials: &CredentialGenerator) -> ParsedExport {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut parsed = ParsedExport::default();
    for (idx, row) in reader.records().enumerate() {
        let fallback_line = idx as u64 + 1;
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                skip(&mut parsed, line, format!("unreadable row: {}", e));
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        if row.len() < MIN_FIELDS {
            skip(
                &mut parsed,
                line,
                format!("expected at least {} fields, found {}", MIN_FIELDS, row.len()),
            );
            continue;
        }

        let guid = row.get(COL_GUID).unwrap_or("");
        let teacher = credentials.new_teacher(
            guid,
            row.get(COL_FIRST_NAME).unwrap_or("").trim(),
            row.get(COL_LAST_NAME).unwrap_or("").trim(),
        );
        if teacher.guid.is_empty() {
            skip(&mut parsed, line, "empty guid".into());
            continue;
        }

        let record = ExternalRecord {
            teacher,
            is_new: is_set(row.get(COL_NEW)),
            is_deleted: is_set(row.get(COL_DELETED)),
            line,
        };
        debug!(
            guid = %record.teacher.guid,
            is_new = record.is_new,
            is_deleted = record.is_deleted,
            "export row"
        );
        parsed.records.push(record);
    }
    parsed
}

fn is_set(cell: Option<&str>) -> bool {
    cell.map(str::trim) == Some(TRUE_SENTINEL)
}

fn skip(parsed: &mut ParsedExport, line: u64, reason: String) {
    warn!(line, reason = %reason, "skipping export row");
    parsed.skipped.push(SkippedRow { line, reason });
}
