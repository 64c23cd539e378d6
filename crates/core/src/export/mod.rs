//! Writers producing files for downstream systems from a finished roster.
//!
//! Writers only format; selecting which records to export is the caller's
//! job (see [`exportable`]).

pub mod credential_sheet;
pub mod moodle;

use std::path::Path;

use crate::errors::ExportError;
use crate::models::Teacher;

pub use credential_sheet::CredentialSheetExporter;
pub use moodle::MoodleExporter;

/// A downstream file format.
pub trait RosterExporter {
    /// Name used in the `export.formats` config list.
    fn name(&self) -> &'static str;

    /// File name written inside the export directory.
    fn file_name(&self) -> &'static str;

    /// Write `teachers` to `path`, replacing any previous file.
    fn write(&self, teachers: &[Teacher], path: &Path) -> Result<(), ExportError>;
}

/// Look up a writer by its config name.
pub fn exporter_for(name: &str) -> Option<Box<dyn RosterExporter>> {
    match name {
        "moodle" => Some(Box::new(MoodleExporter)),
        "credential_sheet" => Some(Box::new(CredentialSheetExporter)),
        _ => None,
    }
}

/// Records that belong in downstream systems: everything not soft-deleted.
pub fn exportable(teachers: &[Teacher]) -> Vec<Teacher> {
    teachers.iter().filter(|t| !t.deleted).cloned().collect()
}
