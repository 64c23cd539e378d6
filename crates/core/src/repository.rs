//! Repository lifecycle and roster operations.
//!
//! A repository is a subdirectory of the base directory carrying the
//! [`REPO_TOKEN`] marker. At most one repository is open per
//! [`RepositoryManager`]; every roster operation works on the open one and
//! follows load fully, mutate, save fully.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::admin_export::{self, SkippedRow};
use crate::config::AppConfig;
use crate::credentials::CredentialGenerator;
use crate::errors::{ExportError, RepositoryError};
use crate::export::{self, exporter_for};
use crate::models::{find_by_guid_prefix, position_by_guid_prefix, GuidMatch, Teacher};
use crate::reconcile::{self, Decider};
use crate::store::{Blacklist, RecordStore};

/// Zero-byte file marking a directory as a repository.
pub const REPO_TOKEN: &str = ".bbst";
pub const TEACHER_LIST_FILENAME: &str = "teacher_list.csv";
pub const BLACKLIST_FILENAME: &str = "blacklist.txt";

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The repository currently selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRepository {
    pub name: String,
    pub path: PathBuf,
}

impl OpenRepository {
    pub fn teacher_list(&self) -> PathBuf {
        self.path.join(TEACHER_LIST_FILENAME)
    }

    pub fn blacklist_file(&self) -> PathBuf {
        self.path.join(BLACKLIST_FILENAME)
    }
}

/// Whether a repository is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Closed,
    Open(OpenRepository),
}

// ---------------------------------------------------------------------------
// Operation inputs and reports
// ---------------------------------------------------------------------------

/// Operator edits for one record. `None` keeps the current value; the guid
/// can never be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Amendment {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub added: Option<bool>,
    pub deleted: Option<bool>,
}

impl Amendment {
    fn apply(self, teacher: &mut Teacher) {
        if let Some(v) = self.last_name {
            teacher.last_name = v;
        }
        if let Some(v) = self.first_name {
            teacher.first_name = v;
        }
        if let Some(v) = self.email {
            teacher.email = v;
        }
        if let Some(v) = self.username {
            teacher.username = v;
        }
        if let Some(v) = self.password {
            teacher.password = v;
        }
        if let Some(v) = self.added {
            teacher.added = v;
        }
        if let Some(v) = self.deleted {
            teacher.deleted = v;
        }
    }
}

/// Result of merging one administration export.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    /// Usable rows in the export.
    pub rows_read: usize,
    /// Malformed rows that were ignored.
    pub skipped: Vec<SkippedRow>,
    pub added_count: usize,
    pub known_count: usize,
    pub blacklisted_count: usize,
    pub rejected_count: usize,
    /// Records soft-deleted by this update.
    pub newly_deleted: Vec<Teacher>,
    /// Deletion guids with no record in the roster.
    pub unmatched_deletions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns the session state and exposes every roster operation.
pub struct RepositoryManager {
    base_dir: PathBuf,
    session: Session,
    credentials: CredentialGenerator,
    export_formats: Vec<String>,
    dry_run: bool,
}

impl RepositoryManager {
    pub fn new(config: &AppConfig) -> Self {
        info!(base_dir = %config.workspace.base_dir.display(), "initializing repository manager");
        Self {
            base_dir: config.workspace.base_dir.clone(),
            session: Session::Closed,
            credentials: CredentialGenerator::new(&config.credentials),
            export_formats: config.export.formats.clone(),
            dry_run: false,
        }
    }

    /// When set, nothing is written to disk; writes are only logged.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current(&self) -> Option<&OpenRepository> {
        match &self.session {
            Session::Open(repo) => Some(repo),
            Session::Closed => None,
        }
    }

    pub fn credentials(&self) -> &CredentialGenerator {
        &self.credentials
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Names of all repositories under the base directory, sorted.
    pub fn list_repositories(&self) -> Result<Vec<String>, RepositoryError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && path.join(REPO_TOKEN).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Whether `name` is a directory under the base dir carrying the marker.
    pub fn is_repository(&self, name: &str) -> bool {
        is_plain_name(name) && self.base_dir.join(name).join(REPO_TOKEN).is_file()
    }

    /// Create a repository and open it. Without a name, today's date
    /// (`YYYY-MM-DD`) is used.
    pub fn create(&mut self, name: Option<&str>) -> Result<OpenRepository, RepositoryError> {
        if let Session::Open(repo) = &self.session {
            return Err(RepositoryError::AlreadyOpen(repo.name.clone()));
        }

        let name = match name {
            Some(n) => n.to_string(),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };
        if !is_plain_name(&name) {
            return Err(RepositoryError::InvalidRepository(name));
        }

        let path = self.base_dir.join(&name);
        if path.exists() {
            return Err(RepositoryError::AlreadyExists(path.display().to_string()));
        }

        if self.dry_run {
            info!(path = %path.display(), "dry run: not creating repository directory");
        } else {
            fs::create_dir_all(&path)?;
            fs::File::create(path.join(REPO_TOKEN))?;
            info!(name = %name, path = %path.display(), "repository created");
        }

        Ok(self.set_open(name, path))
    }

    /// Create a repository and seed it from `source` (see
    /// [`RepositoryManager::import_from`]).
    pub fn create_from(
        &mut self,
        name: Option<&str>,
        source: &str,
    ) -> Result<usize, RepositoryError> {
        if !self.is_repository(source) {
            return Err(RepositoryError::InvalidRepository(source.to_string()));
        }
        self.create(name)?;
        self.import_from(source)
    }

    /// Open an existing repository.
    pub fn open(&mut self, name: &str) -> Result<OpenRepository, RepositoryError> {
        if let Session::Open(repo) = &self.session {
            return Err(RepositoryError::AlreadyOpen(repo.name.clone()));
        }
        if !self.is_repository(name) {
            return Err(RepositoryError::InvalidRepository(name.to_string()));
        }
        let path = self.base_dir.join(name);
        info!(name, "repository opened");
        Ok(self.set_open(name.to_string(), path))
    }

    /// Close the open repository, if any.
    pub fn close(&mut self) {
        if let Session::Open(repo) = &self.session {
            info!(name = %repo.name, "repository closed");
        }
        self.session = Session::Closed;
    }

    /// Copy another repository's teacher list into the open one.
    ///
    /// Every copied record becomes inherited baseline (`added = false`).
    /// The source blacklist is merged in on a best-effort basis. Returns the
    /// number of records copied.
    pub fn import_from(&self, source: &str) -> Result<usize, RepositoryError> {
        let repo = self.require_open()?;
        if !self.is_repository(source) {
            return Err(RepositoryError::InvalidRepository(source.to_string()));
        }
        let source_repo = OpenRepository {
            name: source.to_string(),
            path: self.base_dir.join(source),
        };

        if repo.teacher_list().exists() {
            return Err(RepositoryError::ListAlreadyExists(repo.name.clone()));
        }
        if !source_repo.teacher_list().exists() {
            return Err(RepositoryError::ListMissing(source.to_string()));
        }

        let mut teachers = RecordStore::load(source_repo.teacher_list())?;
        for t in &mut teachers {
            t.added = false;
        }
        self.save_records(repo, &teachers)?;

        if let Err(e) = self.merge_blacklist(&source_repo, repo) {
            warn!(source, error = %e, "could not copy blacklist");
        }

        info!(source, destination = %repo.name, count = teachers.len(), "teacher list imported");
        Ok(teachers.len())
    }

    fn merge_blacklist(
        &self,
        source: &OpenRepository,
        destination: &OpenRepository,
    ) -> Result<(), RepositoryError> {
        let src = Blacklist::new(source.blacklist_file());
        let entries = src.entries()?;
        if entries.is_empty() {
            debug!(source = %source.name, "no blacklist to copy");
            return Ok(());
        }
        let dst = Blacklist::new(destination.blacklist_file()).with_dry_run(self.dry_run);
        for guid in entries {
            if !dst.contains(&guid)? {
                dst.add(&guid)?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Roster operations
    // -----------------------------------------------------------------------

    /// Records of the open repository; a missing list is an empty roster.
    pub fn load_records(&self) -> Result<Vec<Teacher>, RepositoryError> {
        let repo = self.require_open()?;
        Ok(RecordStore::load_or_empty(repo.teacher_list())?)
    }

    /// The open repository's blacklist.
    pub fn blacklist(&self) -> Result<Blacklist, RepositoryError> {
        let repo = self.require_open()?;
        Ok(Blacklist::new(repo.blacklist_file()).with_dry_run(self.dry_run))
    }

    /// Add a person by hand with a fresh guid and derived credentials.
    pub fn add_teacher(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Teacher, RepositoryError> {
        let repo = self.require_open()?;
        let mut teachers = self.load_records()?;

        let guid = uuid::Uuid::new_v4().to_string();
        let mut teacher = self.credentials.new_teacher(&guid, first_name, last_name);
        teacher.added = true;
        teachers.push(teacher.clone());

        self.save_records(repo, &teachers)?;
        info!(guid = %teacher.guid, username = %teacher.username, "teacher added");
        Ok(teacher)
    }

    /// Merge an administration export into the open repository.
    ///
    /// Unknown candidates are put to `decider`. Rows flagged as deleted are
    /// soft-deleted afterwards. The roster is saved once, at the end.
    pub fn update<D: Decider + ?Sized>(
        &self,
        export_path: &Path,
        decider: &mut D,
    ) -> Result<UpdateReport, RepositoryError> {
        let repo = self.require_open()?;
        let parsed = admin_export::parse_file(export_path, &self.credentials)?;
        let mut teachers = self.load_records()?;
        let blacklist = self.blacklist()?;

        let outcome = reconcile::reconcile(&mut teachers, &parsed.records, &blacklist, decider)?;

        let mut report = UpdateReport {
            rows_read: parsed.records.len(),
            skipped: parsed.skipped,
            added_count: outcome.added_count,
            known_count: outcome.known_count,
            blacklisted_count: outcome.blacklisted_count,
            rejected_count: outcome.rejected_count,
            ..Default::default()
        };

        // deletion rows carry full guids; match them exactly
        for candidate in &outcome.deletion_candidates {
            match teachers.iter().position(|t| t.guid == candidate.guid) {
                Some(i) if teachers[i].deleted => {
                    debug!(guid = %candidate.guid, "already marked deleted");
                }
                Some(i) => {
                    teachers[i].deleted = true;
                    report.newly_deleted.push(teachers[i].clone());
                }
                None => {
                    warn!(guid = %candidate.guid, "deletion candidate not in roster");
                    report.unmatched_deletions.push(candidate.guid.clone());
                }
            }
        }

        self.save_records(repo, &teachers)?;
        Ok(report)
    }

    /// Records whose guid starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Result<GuidMatch<Teacher>, RepositoryError> {
        let teachers = self.load_records()?;
        Ok(match find_by_guid_prefix(&teachers, prefix) {
            GuidMatch::NotFound => GuidMatch::NotFound,
            GuidMatch::Unique(t) => GuidMatch::Unique(t.clone()),
            GuidMatch::Ambiguous(all) => {
                GuidMatch::Ambiguous(all.into_iter().cloned().collect())
            }
        })
    }

    /// Replace the single record matching `prefix` with its amended copy.
    pub fn amend(&self, prefix: &str, amendment: Amendment) -> Result<Teacher, RepositoryError> {
        let repo = self.require_open()?;
        let mut teachers = self.load_records()?;

        let index = unique_position(&teachers, prefix)?;
        let mut amended = teachers[index].clone();
        amendment.apply(&mut amended);
        teachers[index] = amended.clone();

        self.save_records(repo, &teachers)?;
        info!(guid = %amended.guid, "teacher amended");
        Ok(amended)
    }

    /// Delete the single record matching `prefix`: removed from the list
    /// when `purge` is set, otherwise kept with `deleted = true`.
    pub fn delete(&self, prefix: &str, purge: bool) -> Result<Teacher, RepositoryError> {
        let repo = self.require_open()?;
        let mut teachers = self.load_records()?;

        let index = unique_position(&teachers, prefix)?;
        let teacher = if purge {
            teachers.remove(index)
        } else {
            let mut marked = teachers[index].clone();
            marked.deleted = true;
            teachers[index] = marked.clone();
            marked
        };

        self.save_records(repo, &teachers)?;
        info!(guid = %teacher.guid, purge, "teacher deleted");
        Ok(teacher)
    }

    /// Run every configured export writer over the non-deleted records.
    /// Files go to `dir`, or the repository directory when `None`.
    pub fn export(&self, dir: Option<&Path>) -> Result<Vec<PathBuf>, RepositoryError> {
        let repo = self.require_open()?;
        let dir = dir.unwrap_or(&repo.path);
        let teachers = export::exportable(&self.load_records()?);

        let mut written = Vec::new();
        for format in &self.export_formats {
            let exporter = exporter_for(format)
                .ok_or_else(|| ExportError::UnknownFormat(format.clone()))?;
            let path = dir.join(exporter.file_name());
            if self.dry_run {
                info!(path = %path.display(), format = %format, "dry run: not writing export");
            } else {
                exporter.write(&teachers, &path)?;
            }
            written.push(path);
        }
        Ok(written)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_open(&mut self, name: String, path: PathBuf) -> OpenRepository {
        let repo = OpenRepository { name, path };
        self.session = Session::Open(repo.clone());
        repo
    }

    fn require_open(&self) -> Result<&OpenRepository, RepositoryError> {
        self.current().ok_or(RepositoryError::NotOpen)
    }

    fn save_records(
        &self,
        repo: &OpenRepository,
        teachers: &[Teacher],
    ) -> Result<(), RepositoryError> {
        if self.dry_run {
            info!(
                path = %repo.teacher_list().display(),
                count = teachers.len(),
                "dry run: not saving teacher list"
            );
            return Ok(());
        }
        RecordStore::save(teachers, repo.teacher_list())?;
        Ok(())
    }
}

fn unique_position(teachers: &[Teacher], prefix: &str) -> Result<usize, RepositoryError> {
    match position_by_guid_prefix(teachers, prefix) {
        GuidMatch::Unique(i) => Ok(i),
        other => Err(RepositoryError::NoUniqueMatch {
            prefix: prefix.to_string(),
            count: other.count(),
        }),
    }
}

/// A single, non-special path component.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
