//! Append-only list of guids the operator chose never to import.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::BlacklistError;
use crate::models::normalize_guid;

/// Handle to a repository's blacklist file, one guid per line.
#[derive(Debug, Clone)]
pub struct Blacklist {
    path: PathBuf,
    dry_run: bool,
}

impl Blacklist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dry_run: false,
        }
    }

    /// When set, `add` only logs what it would append.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole-token membership test; a missing file contains nothing.
    pub fn contains(&self, guid: &str) -> Result<bool, BlacklistError> {
        let guid = normalize_guid(guid);
        if guid.is_empty() {
            return Ok(false);
        }
        Ok(self.entries()?.iter().any(|entry| *entry == guid))
    }

    /// Append `guid` without touching existing entries.
    pub fn add(&self, guid: &str) -> Result<(), BlacklistError> {
        let guid = normalize_guid(guid);
        if guid.is_empty() {
            return Err(BlacklistError::EmptyGuid);
        }
        if self.dry_run {
            info!(guid = %guid, "dry run: not writing blacklist entry");
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", guid)?;

        info!(guid = %guid, path = %self.path.display(), "guid blacklisted");
        Ok(())
    }

    /// All recorded guids in file order.
    pub fn entries(&self) -> Result<Vec<String>, BlacklistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no blacklist file");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .split_whitespace()
            .map(normalize_guid)
            .filter(|g| !g.is_empty())
            .collect())
    }
}
