//! Moodle "upload users" CSV.

use std::path::Path;

use tracing::info;

use super::RosterExporter;
use crate::errors::ExportError;
use crate::models::Teacher;
use crate::store::atomic::write_atomic;

const HEADER: [&str; 5] = ["username", "password", "firstname", "lastname", "email"];

/// Comma-delimited user upload file. Moodle only accepts lower-case
/// usernames.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoodleExporter;

impl RosterExporter for MoodleExporter {
    fn name(&self) -> &'static str {
        "moodle"
    }

    fn file_name(&self) -> &'static str {
        "moodle_users.csv"
    }

    fn write(&self, teachers: &[Teacher], path: &Path) -> Result<(), ExportError> {
        info!(path = %path.display(), count = teachers.len(), "writing Moodle user upload");
        write_atomic(path, |out| -> Result<(), ExportError> {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(HEADER)?;
            for t in teachers {
                writer.write_record([
                    t.username.to_lowercase().as_str(),
                    t.password.as_str(),
                    t.first_name.as_str(),
                    t.last_name.as_str(),
                    t.email.as_str(),
                ])?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}
