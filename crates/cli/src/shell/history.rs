//! Command history kept in a plain file across sessions.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use dialoguer::History;
use tracing::{debug, warn};

/// File name of the history inside the base directory.
pub const HISTORY_FILENAME: &str = ".bbst-history";

/// Oldest entries beyond this are dropped from memory.
const MAX_ENTRIES: usize = 500;

/// Line history backed by an append-only file, newest entry first.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    entries: VecDeque<String>,
    persist: bool,
}

impl FileHistory {
    /// Load earlier entries from `path`; a missing or unreadable file starts
    /// an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .rev()
                .take(MAX_ENTRIES)
                .map(str::to_string)
                .collect(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no command history");
                VecDeque::new()
            }
        };
        Self {
            path,
            entries,
            persist: true,
        }
    }

    /// When unset, new entries stay in memory only.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    fn append_to_file(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl History<String> for FileHistory {
    fn read(&self, pos: usize) -> Option<String> {
        self.entries.get(pos).cloned()
    }

    fn write(&mut self, val: &String) {
        let line = val.trim();
        if line.is_empty() || self.entries.front().map(String::as_str) == Some(line) {
            return;
        }

        self.entries.push_front(line.to_string());
        self.entries.truncate(MAX_ENTRIES);

        if self.persist {
            if let Err(e) = self.append_to_file(line) {
                warn!(path = %self.path.display(), error = %e, "could not save command history");
            }
        }
    }
}
