//! End-to-end tests for the roster lifecycle.
//!
//! These tests drive the real `RepositoryManager` against a temporary base
//! directory:
//! - repositories created, closed and reopened on disk
//! - administration exports written as real files
//! - decisions supplied by closures or scripted deciders

use std::collections::VecDeque;
use std::path::Path;

use tempfile::TempDir;

use bbst_core::errors::{ReconcileError, RepositoryError};
use bbst_core::models::{GuidMatch, Teacher};
use bbst_core::reconcile::{Decider, Decision};
use bbst_core::repository::{Amendment, RepositoryManager, BLACKLIST_FILENAME, TEACHER_LIST_FILENAME};
use bbst_core::store::RecordStore;
use bbst_core::AppConfig;

// ===========================================================================
// Helpers
// ===========================================================================

fn make_manager(base: &Path) -> RepositoryManager {
    let mut config = AppConfig::default();
    config.workspace.base_dir = base.to_path_buf();
    RepositoryManager::new(&config)
}

fn write_export(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = String::new();
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Export row with the fields the importer reads; everything else blank.
fn export_row(guid: &str, last: &str, first: &str, deleted: bool, new: bool) -> String {
    let flag = |b: bool| if b { "-1" } else { "0" };
    format!(
        "{};;;{};{};;;;;{};{};0;",
        guid,
        last,
        first,
        flag(deleted),
        flag(new)
    )
}

/// Answers from a queue and records who was asked.
struct ScriptedDecider {
    answers: VecDeque<Decision>,
    asked: Vec<String>,
}

impl ScriptedDecider {
    fn new(answers: &[Decision]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Decider for ScriptedDecider {
    fn decide(&mut self, candidate: &Teacher) -> Result<Decision, ReconcileError> {
        self.asked.push(candidate.guid.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| ReconcileError::DecisionFailed {
                guid: candidate.guid.clone(),
                detail: "no scripted answer left".into(),
            })
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

/// A known guid in a different spelling must not create a second record.
#[test]
fn test_guid_normalization_prevents_duplicates() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());
    mgr.create(Some("2024")).unwrap();

    let existing = Teacher {
        guid: "abc123".into(),
        last_name: "Doe".into(),
        first_name: "Jane".into(),
        ..Default::default()
    };
    RecordStore::save(&[existing], mgr.current().unwrap().teacher_list()).unwrap();

    let export = write_export(
        tmp.path(),
        "export.csv",
        &[&export_row("{ABC123}", "Doe", "Jane", false, false)],
    );
    let mut decider = |_: &Teacher| Decision::Accept;
    let report = mgr.update(&export, &mut decider).unwrap();

    assert_eq!(report.added_count, 0);
    assert_eq!(report.known_count, 1);
    assert_eq!(mgr.load_records().unwrap().len(), 1);
}

/// A row flagged new is appended with derived credentials, without asking.
#[test]
fn test_new_flag_appends_with_credentials() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());
    mgr.create(Some("2024")).unwrap();

    let export = write_export(
        tmp.path(),
        "export.csv",
        &[&export_row("{F00D-0001}", "Groß", "Jürgen", false, true)],
    );
    let mut decider = ScriptedDecider::new(&[]);
    let report = mgr.update(&export, &mut decider).unwrap();

    assert!(decider.asked.is_empty());
    assert_eq!(report.added_count, 1);

    let records = mgr.load_records().unwrap();
    assert_eq!(records.len(), 1);
    let t = &records[0];
    assert_eq!(t.guid, "f00d-0001");
    assert_eq!(t.username, "KOL.GROSJUER");
    assert_eq!(t.email, "gross@bbs-os-brinkstr.de");
    assert_eq!(t.password.chars().count(), 8);
    assert!(t.added);
    assert!(!t.deleted);
}

/// Full lifecycle across two school years.
#[test]
fn test_roster_lifecycle() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());

    // First year: everything flagged new.
    mgr.create(Some("2023")).unwrap();
    let first_export = write_export(
        tmp.path(),
        "2023.csv",
        &[
            &export_row("{A1}", "Müller", "Anna", false, true),
            &export_row("{B2}", "Schmidt", "Bernd", false, true),
            &export_row("{C3}", "Weiß", "Clara", false, true),
        ],
    );
    let report = mgr
        .update(&first_export, &mut ScriptedDecider::new(&[]))
        .unwrap();
    assert_eq!(report.added_count, 3);
    let passwords: Vec<String> = mgr
        .load_records()
        .unwrap()
        .into_iter()
        .map(|t| t.password)
        .collect();
    mgr.close();

    // Second year starts from the first.
    let copied = mgr.create_from(Some("2024"), "2023").unwrap();
    assert_eq!(copied, 3);
    assert!(mgr.load_records().unwrap().iter().all(|t| !t.added));

    let second_export = write_export(
        tmp.path(),
        "2024.csv",
        &[
            &export_row("{A1}", "Müller", "Anna", false, false),
            &export_row("{B2}", "Schmidt", "Bernd", true, false),
            &export_row("{C3}", "Weiß", "Clara", false, false),
            &export_row("{D4}", "Öztürk", "Deniz", false, false),
            &export_row("{E5}", "Test", "Account", false, false),
        ],
    );
    let mut decider =
        ScriptedDecider::new(&[Decision::Accept, Decision::RejectAndBlacklist]);
    let report = mgr.update(&second_export, &mut decider).unwrap();

    assert_eq!(decider.asked, vec!["d4", "e5"]);
    assert_eq!(report.added_count, 1);
    assert_eq!(report.rejected_count, 1);
    assert_eq!(report.newly_deleted.len(), 1);
    assert_eq!(report.newly_deleted[0].guid, "b2");

    let records = mgr.load_records().unwrap();
    assert_eq!(records.len(), 4);
    // Passwords of inherited records survive the re-import.
    for (t, pw) in records.iter().zip(&passwords) {
        assert_eq!(&t.password, pw);
    }
    let deniz = records.iter().find(|t| t.guid == "d4").unwrap();
    assert_eq!(deniz.username, "KOL.OEZTDENI");
    assert!(deniz.added);

    // Amend, then purge the soft-deleted record.
    let amended = mgr
        .amend(
            "c",
            Amendment {
                last_name: Some("Weiss-Berg".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(amended.guid, "c3");
    assert_eq!(amended.password, passwords[2]);

    mgr.delete("B2", true).unwrap();
    assert!(matches!(mgr.find("b2").unwrap(), GuidMatch::NotFound));

    // Exports leave soft-deleted records out.
    mgr.delete("a1", false).unwrap();
    let out = tmp.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let written = mgr.export(Some(&out)).unwrap();
    assert_eq!(written.len(), 2);
    let moodle = std::fs::read_to_string(&written[0]).unwrap();
    assert!(!moodle.contains("kol.muelanna"));
    assert!(moodle.contains("kol.oeztdeni"));
}

/// Blacklist entries survive closing and reopening the repository.
#[test]
fn test_blacklist_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());
    mgr.create(Some("r")).unwrap();

    let export = write_export(
        tmp.path(),
        "export.csv",
        &[&export_row("{DEAD-BEEF}", "Doe", "John", false, false)],
    );
    mgr.update(&export, &mut |_: &Teacher| Decision::RejectAndBlacklist)
        .unwrap();
    mgr.close();

    let repo_dir = tmp.path().join("r");
    assert_eq!(
        std::fs::read_to_string(repo_dir.join(BLACKLIST_FILENAME)).unwrap(),
        "dead-beef\n"
    );

    mgr.open("r").unwrap();
    let mut decider = ScriptedDecider::new(&[]);
    let report = mgr.update(&export, &mut decider).unwrap();
    assert!(decider.asked.is_empty());
    assert_eq!(report.blacklisted_count, 1);
    assert!(mgr.load_records().unwrap().is_empty());
}

/// An aborted decision leaves the teacher list untouched.
#[test]
fn test_failed_decision_saves_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());
    mgr.create(Some("r")).unwrap();

    let export = write_export(
        tmp.path(),
        "export.csv",
        &[
            &export_row("{N1}", "New", "Person", false, true),
            &export_row("{Q1}", "Unknown", "Person", false, false),
        ],
    );
    let result = mgr.update(&export, &mut ScriptedDecider::new(&[]));
    assert!(matches!(result, Err(RepositoryError::Reconcile(_))));
    assert!(!tmp.path().join("r").join(TEACHER_LIST_FILENAME).exists());
}

/// Ambiguous and missing prefixes never mutate the store.
#[test]
fn test_ambiguous_prefix_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut mgr = make_manager(tmp.path());
    mgr.create(Some("r")).unwrap();
    mgr.add_teacher("Anna", "Alpha").unwrap();
    mgr.add_teacher("Bernd", "Beta").unwrap();

    let err = mgr.delete("", false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "guid prefix '' matched 2 records, expected exactly one"
    );
    assert!(mgr.load_records().unwrap().iter().all(|t| !t.deleted));
}
