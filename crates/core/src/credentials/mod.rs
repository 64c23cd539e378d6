//! Derivation of login names, mailbox addresses and initial passwords.
//!
//! Names are transliterated to ASCII first so every derived credential is
//! safe for the filesystem, LDAP and mail systems downstream.

pub mod password;
pub mod transliterate;

pub use password::generate_password;
pub use transliterate::transliterate;

use crate::config::CredentialsConfig;
use crate::models::{normalize_guid, Teacher};

/// Number of characters taken from each name for the username.
const NAME_PART_LEN: usize = 4;

/// Derives credentials according to a [`CredentialsConfig`].
#[derive(Debug, Clone)]
pub struct CredentialGenerator {
    username_prefix: String,
    email_domain: String,
    password_length: usize,
}

impl CredentialGenerator {
    pub fn new(config: &CredentialsConfig) -> Self {
        Self {
            username_prefix: config.username_prefix.clone(),
            email_domain: config.email_domain.clone(),
            password_length: config.password_length,
        }
    }

    /// Prefix + first four characters of the transliterated last name +
    /// first four of the transliterated first name, upper-cased.
    ///
    /// Truncation happens after transliteration, so `ü` counts as two
    /// characters. Short names contribute what they have.
    pub fn username(&self, first_name: &str, last_name: &str) -> String {
        format!(
            "{}{}{}",
            self.username_prefix,
            name_part(last_name),
            name_part(first_name)
        )
    }

    /// Transliterated, lower-cased last name at the configured domain.
    pub fn email(&self, last_name: &str) -> String {
        format!(
            "{}@{}",
            transliterate(last_name).to_lowercase(),
            self.email_domain
        )
    }

    pub fn password(&self) -> String {
        generate_password(self.password_length)
    }

    /// Build a fresh record for `guid` with all credentials derived.
    pub fn new_teacher(&self, guid: &str, first_name: &str, last_name: &str) -> Teacher {
        Teacher {
            guid: normalize_guid(guid),
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            email: self.email(last_name),
            username: self.username(first_name, last_name),
            password: self.password(),
            added: false,
            deleted: false,
        }
    }
}

impl Default for CredentialGenerator {
    fn default() -> Self {
        Self::new(&CredentialsConfig::default())
    }
}

fn name_part(name: &str) -> String {
    transliterate(name)
        .chars()
        .take(NAME_PART_LEN)
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_uses_transliterated_prefixes() {
        let gen = CredentialGenerator::default();
        assert_eq!(gen.username("Jürgen", "Groß"), "KOL.GROSJUER");
        assert_eq!(gen.username("Jane", "Doe"), "KOL.DOEJANE");
        assert_eq!(gen.username("Ä", "müller"), "KOL.MUELAE");
    }

    #[test]
    fn test_username_with_empty_names() {
        let gen = CredentialGenerator::default();
        assert_eq!(gen.username("", ""), "KOL.");
        assert_eq!(gen.username("Al", ""), "KOL.AL");
    }

    #[test]
    fn test_username_drops_dashes_and_spaces() {
        let gen = CredentialGenerator::default();
        assert_eq!(gen.username("Anna-Lena", "de la Cruz"), "KOL.DELAANNA");
    }

    #[test]
    fn test_email_is_ascii_lowercase() {
        let gen = CredentialGenerator::default();
        assert_eq!(gen.email("Groß"), "gross@bbs-os-brinkstr.de");
        assert_eq!(gen.email("Öztürk-Meier"), "oeztuerkmeier@bbs-os-brinkstr.de");
        assert_eq!(gen.email(""), "@bbs-os-brinkstr.de");
    }

    #[test]
    fn test_custom_config() {
        let gen = CredentialGenerator::new(&CredentialsConfig {
            username_prefix: "T-".into(),
            email_domain: "school.example".into(),
            password_length: 12,
        });
        assert_eq!(gen.username("Max", "Mustermann"), "T-MUSTMAX");
        assert_eq!(gen.email("Mustermann"), "mustermann@school.example");
        assert_eq!(gen.password().len(), 12);
    }

    #[test]
    fn test_new_teacher_normalizes_guid() {
        let gen = CredentialGenerator::default();
        let t = gen.new_teacher("{ABC-123}", "Jürgen", "Groß");
        assert_eq!(t.guid, "abc-123");
        assert_eq!(t.username, "KOL.GROSJUER");
        assert_eq!(t.email, "gross@bbs-os-brinkstr.de");
        assert_eq!(t.password.len(), 8);
        assert!(!t.added);
        assert!(!t.deleted);
    }
}
