//! Error types for the bbst core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Blacklist(#[from] BlacklistError),

    #[error(transparent)]
    ExportParse(#[from] ExportParseError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Record store errors
// ---------------------------------------------------------------------------

/// Errors from reading or writing a repository's teacher list.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The teacher list does not exist yet. Callers normally treat this as
    /// an empty repository.
    #[error("teacher list not found: {0}")]
    NotFound(String),

    /// The header row matches no known column schema.
    #[error("unknown teacher list schema in '{path}': {header}")]
    UnknownSchema {
        path: String,
        header: String,
    },

    /// A row could not be decoded.
    #[error("invalid row at line {line} of '{path}': {detail}")]
    InvalidRow {
        path: String,
        line: u64,
        detail: String,
    },

    /// CSV encoder/decoder failure.
    #[error("teacher list CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic I/O wrapper.
    #[error("teacher list I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Blacklist errors
// ---------------------------------------------------------------------------

/// Errors from the append-only blacklist file.
#[derive(Debug, Error)]
pub enum BlacklistError {
    /// Refused to record an empty identity key.
    #[error("refusing to blacklist an empty guid")]
    EmptyGuid,

    /// Generic I/O wrapper.
    #[error("blacklist I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// External export errors
// ---------------------------------------------------------------------------

/// Errors from parsing the administration system's teacher export.
#[derive(Debug, Error)]
pub enum ExportParseError {
    /// The export file does not exist.
    #[error("export file not found: {0}")]
    FileNotFound(String),

    /// The file is not valid UTF-8.
    #[error("export file '{path}' is not valid UTF-8: {detail}")]
    Encoding {
        path: String,
        detail: String,
    },

    /// Generic I/O wrapper.
    #[error("export I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Reconciliation errors
// ---------------------------------------------------------------------------

/// Errors from merging an external export into the roster.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The operator decision could not be obtained.
    #[error("operator decision failed for guid '{guid}': {detail}")]
    DecisionFailed {
        guid: String,
        detail: String,
    },

    /// Recording a rejected guid failed.
    #[error("reconcile blacklist error: {0}")]
    Blacklist(#[from] BlacklistError),
}

// ---------------------------------------------------------------------------
// Repository errors
// ---------------------------------------------------------------------------

/// Errors from the repository lifecycle and record operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An operation needing a closed session was attempted while open.
    #[error("repository '{0}' is still open, close it first")]
    AlreadyOpen(String),

    /// An operation needing an open repository was attempted while closed.
    #[error("no repository is open")]
    NotOpen,

    /// The target directory of `create` already exists.
    #[error("directory already exists: {0}")]
    AlreadyExists(String),

    /// The name does not refer to a directory carrying the marker token.
    #[error("'{0}' is not a valid repository")]
    InvalidRepository(String),

    /// `import_from` found a teacher list in the destination.
    #[error("repository '{0}' already contains a teacher list")]
    ListAlreadyExists(String),

    /// `import_from` found no teacher list in the source.
    #[error("repository '{0}' contains no teacher list")]
    ListMissing(String),

    /// A guid prefix matched zero or several records.
    #[error("guid prefix '{prefix}' matched {count} records, expected exactly one")]
    NoUniqueMatch {
        prefix: String,
        count: usize,
    },

    /// Record store failure.
    #[error("repository store error: {0}")]
    Store(#[from] StoreError),

    /// Blacklist failure.
    #[error("repository blacklist error: {0}")]
    Blacklist(#[from] BlacklistError),

    /// External export failure.
    #[error("repository export parse error: {0}")]
    ExportParse(#[from] ExportParseError),

    /// Reconciliation failure.
    #[error("repository reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Export writer failure.
    #[error("repository export error: {0}")]
    Export(#[from] ExportError),

    /// Generic I/O wrapper.
    #[error("repository I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Export writer errors
// ---------------------------------------------------------------------------

/// Errors from the downstream export writers.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A configured export format name is unknown.
    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    /// CSV encoder failure.
    #[error("export writer CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic I/O wrapper.
    #[error("export writer I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = RepositoryError::NoUniqueMatch {
            prefix: "ab".into(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "guid prefix 'ab' matched 3 records, expected exactly one"
        );

        let err = StoreError::NotFound("/tmp/repo/teacher_list.csv".into());
        assert!(err.to_string().contains("teacher_list.csv"));

        let err = ConfigError::InvalidValue {
            field: "credentials.password_length".into(),
            detail: "too short".into(),
        };
        assert!(err.to_string().contains("password_length"));
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let store_err = StoreError::NotFound("x".into());
        let core_err: CoreError = store_err.into();
        assert!(matches!(core_err, CoreError::Store(_)));

        let repo_err: RepositoryError = BlacklistError::EmptyGuid.into();
        assert!(matches!(repo_err, RepositoryError::Blacklist(_)));
    }
}
