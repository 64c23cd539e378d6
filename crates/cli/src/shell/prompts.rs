//! Interactive prompts: reconciliation decisions, record edits and
//! confirmations.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};

use bbst_core::errors::ReconcileError;
use bbst_core::models::Teacher;
use bbst_core::reconcile::{Decider, Decision};
use bbst_core::repository::Amendment;

use super::style;

const DECISION_ITEMS: [&str; 3] = [
    "Accept: add to the roster",
    "Reject: skip this time",
    "Reject and never ask again",
];

/// Asks the operator about every unknown candidate of an update.
#[derive(Debug, Default)]
pub struct PromptDecider {
    asked: usize,
}

impl PromptDecider {
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Decider for PromptDecider {
    fn decide(&mut self, candidate: &Teacher) -> Result<Decision, ReconcileError> {
        self.asked += 1;
        println!();
        println!("{}", style::header("Unknown teacher in export"));
        println!("  Name     : {}", candidate.display_name());
        println!("  Guid     : {}", candidate.guid);
        println!("  Username : {}", candidate.username);

        let choice = Select::new()
            .with_prompt("Add this person?")
            .items(&DECISION_ITEMS)
            .default(0)
            .interact()
            .map_err(|e| ReconcileError::DecisionFailed {
                guid: candidate.guid.clone(),
                detail: e.to_string(),
            })?;

        Ok(match choice {
            0 => Decision::Accept,
            1 => Decision::Reject,
            _ => Decision::RejectAndBlacklist,
        })
    }
}

/// Yes/no question, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("failed to read confirmation")
}

/// First and last name of a person to add by hand.
pub fn new_teacher_names() -> Result<(String, String)> {
    let first: String = Input::new()
        .with_prompt("First name")
        .validate_with(|input: &String| not_blank(input))
        .interact_text()
        .context("failed to read first name")?;
    let last: String = Input::new()
        .with_prompt("Last name")
        .validate_with(|input: &String| not_blank(input))
        .interact_text()
        .context("failed to read last name")?;
    Ok((first.trim().to_string(), last.trim().to_string()))
}

/// Walk through every editable field, pre-filled with the current value.
pub fn edit_teacher(current: &Teacher) -> Result<Amendment> {
    println!("{}", style::dim("Press enter to keep a value."));

    let mut edited = current.clone();
    edited.last_name = text_field("Last name", &current.last_name)?;
    edited.first_name = text_field("First name", &current.first_name)?;
    edited.username = text_field("Username", &current.username)?;
    edited.email = text_field("Email", &current.email)?;
    edited.password = text_field("Password", &current.password)?;
    edited.added = Confirm::new()
        .with_prompt("Added after the initial import?")
        .default(current.added)
        .interact()
        .context("failed to read added flag")?;
    edited.deleted = Confirm::new()
        .with_prompt("Marked as deleted?")
        .default(current.deleted)
        .interact()
        .context("failed to read deleted flag")?;

    Ok(diff_amendment(current, &edited))
}

fn text_field(prompt: &str, current: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(current.to_string())
        .interact_text()
        .with_context(|| format!("failed to read {}", prompt.to_lowercase()))?;
    Ok(value.trim().to_string())
}

fn not_blank(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("must not be empty")
    } else {
        Ok(())
    }
}

/// Amendment carrying only the fields that differ.
pub fn diff_amendment(current: &Teacher, edited: &Teacher) -> Amendment {
    fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
        (old != new).then(|| new.clone())
    }

    Amendment {
        last_name: changed(&current.last_name, &edited.last_name),
        first_name: changed(&current.first_name, &edited.first_name),
        email: changed(&current.email, &edited.email),
        username: changed(&current.username, &edited.username),
        password: changed(&current.password, &edited.password),
        added: changed(&current.added, &edited.added),
        deleted: changed(&current.deleted, &edited.deleted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher() -> Teacher {
        Teacher {
            guid: "abc".into(),
            last_name: "Doe".into(),
            first_name: "Jane".into(),
            email: "doe@example.org".into(),
            username: "KOL.DOEJANE".into(),
            password: "s3cr#tPw".into(),
            added: false,
            deleted: false,
        }
    }

    #[test]
    fn test_unchanged_edit_is_empty() {
        let t = teacher();
        assert_eq!(diff_amendment(&t, &t.clone()), Amendment::default());
    }

    #[test]
    fn test_diff_only_changed_fields() {
        let t = teacher();
        let mut edited = t.clone();
        edited.last_name = "Smith".into();
        edited.deleted = true;

        let amendment = diff_amendment(&t, &edited);
        assert_eq!(amendment.last_name.as_deref(), Some("Smith"));
        assert_eq!(amendment.deleted, Some(true));
        assert!(amendment.password.is_none());
        assert!(amendment.added.is_none());
    }
}
