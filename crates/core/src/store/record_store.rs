//! CSV reader/writer for a repository's teacher list.
//!
//! The file format (schema version 2):
//!
//! ```text
//! guid,last_name,first_name,email,username,password,added,deleted
//! abc123,Groß,Jürgen,gross@bbs-os-brinkstr.de,KOL.GROSJUER,x7#Kp2mQ,False,False
//! ```
//!
//! Version 1 files lack the two flag columns; they load with both flags
//! false and are rewritten as version 2 on the next save.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::models::{normalize_guid, Teacher};
use crate::store::atomic::write_atomic;

/// Column names of the current schema, in file order.
pub const HEADER: [&str; 8] = [
    "guid",
    "last_name",
    "first_name",
    "email",
    "username",
    "password",
    "added",
    "deleted",
];

/// Column names of the legacy schema without status flags.
pub const V1_HEADER: [&str; 6] = [
    "guid",
    "last_name",
    "first_name",
    "email",
    "username",
    "password",
];

/// Column schema detected from a teacher list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V2,
}

impl SchemaVersion {
    /// Identify the schema from a header row.
    pub fn detect(header: &csv::StringRecord) -> Option<Self> {
        let names: Vec<&str> = header.iter().map(str::trim).collect();
        if names == HEADER {
            Some(Self::V2)
        } else if names == V1_HEADER {
            Some(Self::V1)
        } else {
            None
        }
    }
}

/// Utilities for loading and saving the teacher list.
pub struct RecordStore;

impl RecordStore {
    /// Load all records in file order.
    ///
    /// A missing file yields [`StoreError::NotFound`]; see
    /// [`RecordStore::load_or_empty`] for the usual handling.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Teacher>, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading teacher list");

        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;

        let header = reader.headers()?.clone();
        let version = SchemaVersion::detect(&header).ok_or_else(|| StoreError::UnknownSchema {
            path: path.display().to_string(),
            header: header.iter().collect::<Vec<_>>().join(","),
        })?;

        let mut teachers = Vec::new();
        let mut seen = HashSet::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let teacher = decode_row(&row, version).map_err(|detail| StoreError::InvalidRow {
                path: path.display().to_string(),
                line,
                detail,
            })?;
            if !seen.insert(teacher.guid.clone()) {
                warn!(guid = %teacher.guid, line, "duplicate guid in teacher list");
            }
            teachers.push(teacher);
        }

        debug!(count = teachers.len(), ?version, "loaded teacher list");
        Ok(teachers)
    }

    /// Load, treating a missing file as an empty repository.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Vec<Teacher>, StoreError> {
        match Self::load(&path) {
            Err(StoreError::NotFound(p)) => {
                warn!(path = %p, "teacher list does not exist yet, starting empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Write the header and one row per record, preserving list order.
    pub fn save<P: AsRef<Path>>(teachers: &[Teacher], path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        info!(path = %path.display(), count = teachers.len(), "saving teacher list");

        write_atomic(path, |out| -> Result<(), StoreError> {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(HEADER)?;
            for t in teachers {
                writer.write_record([
                    t.guid.as_str(),
                    t.last_name.as_str(),
                    t.first_name.as_str(),
                    t.email.as_str(),
                    t.username.as_str(),
                    t.password.as_str(),
                    encode_flag(t.added),
                    encode_flag(t.deleted),
                ])?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

fn decode_row(row: &csv::StringRecord, version: SchemaVersion) -> Result<Teacher, String> {
    let field = |i: usize| row.get(i).unwrap_or("").to_string();

    let (added, deleted) = match version {
        SchemaVersion::V1 => (false, false),
        SchemaVersion::V2 => (
            decode_flag(row.get(6).unwrap_or(""), "added")?,
            decode_flag(row.get(7).unwrap_or(""), "deleted")?,
        ),
    };

    Ok(Teacher {
        guid: normalize_guid(&field(0)),
        last_name: field(1),
        first_name: field(2),
        email: field(3),
        username: field(4),
        password: field(5),
        added,
        deleted,
    })
}

fn encode_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn decode_flag(raw: &str, column: &str) -> Result<bool, String> {
    match raw.trim() {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(format!("column '{}' has invalid flag value '{}'", column, other)),
    }
}
