//! Semicolon-delimited credential sheet for mail-merging the per-person
//! account letters.

use std::path::Path;

use tracing::info;

use super::RosterExporter;
use crate::errors::ExportError;
use crate::models::Teacher;
use crate::store::atomic::write_atomic;

const HEADER: [&str; 5] = ["last_name", "first_name", "username", "password", "email"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialSheetExporter;

impl RosterExporter for CredentialSheetExporter {
    fn name(&self) -> &'static str {
        "credential_sheet"
    }

    fn file_name(&self) -> &'static str {
        "credential_sheet.csv"
    }

    fn write(&self, teachers: &[Teacher], path: &Path) -> Result<(), ExportError> {
        info!(path = %path.display(), count = teachers.len(), "writing credential sheet");
        write_atomic(path, |out| -> Result<(), ExportError> {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(b';')
                .from_writer(out);
            writer.write_record(HEADER)?;
            for t in teachers {
                writer.write_record([
                    t.last_name.as_str(),
                    t.first_name.as_str(),
                    t.username.as_str(),
                    t.password.as_str(),
                    t.email.as_str(),
                ])?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}
