//! Configuration for bbst.
//!
//! Every field has a default so the tool works without a config file; a TOML
//! file only needs to list the values it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Smallest password length that still fits one character of each class.
pub const MIN_PASSWORD_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level bbst configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where repositories live and how the tool logs.
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Credential derivation settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Downstream export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Location of the repositories and logging level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory whose subdirectories are repositories.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Settings for username, mailbox and password generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Organisational tag placed in front of every username.
    #[serde(default = "default_username_prefix")]
    pub username_prefix: String,

    /// Mail domain appended to the transliterated last name.
    #[serde(default = "default_email_domain")]
    pub email_domain: String,

    /// Length of generated initial passwords.
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

fn default_username_prefix() -> String {
    "KOL.".into()
}

fn default_email_domain() -> String {
    "bbs-os-brinkstr.de".into()
}

fn default_password_length() -> usize {
    8
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username_prefix: default_username_prefix(),
            email_domain: default_email_domain(),
            password_length: default_password_length(),
        }
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Which export writers run on `export`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export format names, see [`crate::export::exporter_for`].
    #[serde(default = "default_export_formats")]
    pub formats: Vec<String>,
}

fn default_export_formats() -> Vec<String> {
    vec!["moodle".into(), "credential_sheet".into()]
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_export_formats(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Validate that all values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.password_length < MIN_PASSWORD_LENGTH {
            return Err(ConfigError::InvalidValue {
                field: "credentials.password_length".into(),
                detail: format!(
                    "must be at least {} to hold one character of each class",
                    MIN_PASSWORD_LENGTH
                ),
            });
        }
        let domain = &self.credentials.email_domain;
        if domain.is_empty() || domain.contains('@') || !domain.is_ascii() {
            return Err(ConfigError::InvalidValue {
                field: "credentials.email_domain".into(),
                detail: "must be a non-empty ASCII domain without '@'".into(),
            });
        }
        if !self.credentials.username_prefix.is_ascii() {
            return Err(ConfigError::InvalidValue {
                field: "credentials.username_prefix".into(),
                detail: "must be ASCII".into(),
            });
        }
        for format in &self.export.formats {
            if crate::export::exporter_for(format).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "export.formats".into(),
                    detail: format!("unknown export format '{}'", format),
                });
            }
        }
        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Generate a default TOML config template string.
    pub fn default_template() -> &'static str {
        r#"# bbst configuration

[workspace]
base_dir = "."
log_level = "warn"

[credentials]
username_prefix = "KOL."
email_domain = "bbs-os-brinkstr.de"
password_length = 8

[export]
formats = ["moodle", "credential_sheet"]
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sections() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.workspace.base_dir, PathBuf::from("."));
        assert_eq!(config.workspace.log_level, "warn");
        assert_eq!(config.credentials.username_prefix, "KOL.");
        assert_eq!(config.credentials.password_length, 8);
        assert_eq!(config.export.formats.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: AppConfig = toml::from_str(
            r#"
[credentials]
email_domain = "school.example.org"
"#,
        )
        .unwrap();
        assert_eq!(config.credentials.email_domain, "school.example.org");
        assert_eq!(config.credentials.username_prefix, "KOL.");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[workspace]\nlog_level = \"debug\"\n").unwrap();

        let config = AppConfig::load_and_validate(&path).expect("load failed");
        assert_eq!(config.workspace.log_level, "debug");
    }

    #[test]
    fn test_file_not_found() {
        let result = AppConfig::load_from_file("/nonexistent/bbst.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[credentials\n").unwrap();
        let result = AppConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_short_password() {
        let mut config = AppConfig::default();
        config.credentials.password_length = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "credentials.password_length"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_domain() {
        let mut config = AppConfig::default();
        config.credentials.email_domain = "@example.com".into();
        assert!(config.validate().is_err());
        config.credentials.email_domain = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let mut config = AppConfig::default();
        config.export.formats = vec!["ldif".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "export.formats"
        ));
    }

    #[test]
    fn test_default_template_is_valid() {
        let config: AppConfig = toml::from_str(AppConfig::default_template())
            .expect("default template should be valid TOML");
        assert!(config.validate().is_ok());
    }
}
