//! Domain model types used throughout bbst.

// ---------------------------------------------------------------------------
// Teacher
// ---------------------------------------------------------------------------

/// One person tracked in a repository's roster.
///
/// `guid` is the only identity criterion and is always stored in the form
/// produced by [`normalize_guid`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Teacher {
    pub guid: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub username: String,
    /// Assigned once and never regenerated.
    pub password: String,
    /// Entered the roster after the repository's initial import.
    pub added: bool,
    /// Soft-deleted; still present until purged.
    pub deleted: bool,
}

impl Teacher {
    /// "Last, First" for operator-facing messages.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

impl std::fmt::Display for Teacher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.display_name(), self.username, self.guid)
    }
}

/// Canonical form of an identity key: braces removed, surrounding
/// whitespace trimmed, lower-cased.
pub fn normalize_guid(raw: &str) -> String {
    raw.replace(['{', '}'], "").trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Guid prefix lookup
// ---------------------------------------------------------------------------

/// Result of looking up records by guid prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidMatch<T> {
    NotFound,
    Unique(T),
    Ambiguous(Vec<T>),
}

impl<T> GuidMatch<T> {
    /// Number of matching records.
    pub fn count(&self) -> usize {
        match self {
            Self::NotFound => 0,
            Self::Unique(_) => 1,
            Self::Ambiguous(all) => all.len(),
        }
    }

    fn from_vec(mut found: Vec<T>) -> Self {
        match found.len() {
            0 => Self::NotFound,
            1 => Self::Unique(found.remove(0)),
            _ => Self::Ambiguous(found),
        }
    }
}

/// Find the records whose guid starts with `prefix` (normalized first).
pub fn find_by_guid_prefix<'a>(records: &'a [Teacher], prefix: &str) -> GuidMatch<&'a Teacher> {
    let prefix = normalize_guid(prefix);
    GuidMatch::from_vec(
        records
            .iter()
            .filter(|t| t.guid.starts_with(&prefix))
            .collect(),
    )
}

/// Like [`find_by_guid_prefix`] but yields positions, for in-place mutation.
pub fn position_by_guid_prefix(records: &[Teacher], prefix: &str) -> GuidMatch<usize> {
    let prefix = normalize_guid(prefix);
    GuidMatch::from_vec(
        records
            .iter()
            .enumerate()
            .filter(|(_, t)| t.guid.starts_with(&prefix))
            .map(|(i, _)| i)
            .collect(),
    )
}
