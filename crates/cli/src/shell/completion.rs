//! Tab completion for the shell prompt.
//!
//! The first word completes to a command name. Arguments complete to
//! repository names after `open`, `import` and `new ... from`, and to `.csv`
//! files after `update`.

use std::path::Path;

use clap::CommandFactory;
use dialoguer::Completion;

use bbst_core::repository::RepositoryManager;

use super::commands::ShellLine;

/// Completion candidates captured when the prompt is shown.
#[derive(Debug, Clone, Default)]
pub struct ShellCompletion {
    commands: Vec<String>,
    repositories: Vec<String>,
    csv_files: Vec<String>,
}

impl ShellCompletion {
    pub fn new(repositories: Vec<String>, csv_files: Vec<String>) -> Self {
        let mut commands: Vec<String> = ShellLine::command()
            .get_subcommands()
            .flat_map(|c| {
                std::iter::once(c.get_name().to_string())
                    .chain(c.get_all_aliases().map(str::to_string))
            })
            .collect();
        commands.push("help".into());
        commands.sort();

        Self {
            commands,
            repositories,
            csv_files,
        }
    }

    /// Candidates for the current state of `manager`; `.csv` files come from
    /// `file_dir`. Listing failures just leave a category empty.
    pub fn for_manager(manager: &RepositoryManager, file_dir: &Path) -> Self {
        let repositories = manager.list_repositories().unwrap_or_default();
        Self::new(repositories, csv_files_in(file_dir))
    }
}

impl Completion for ShellCompletion {
    fn get(&self, input: &str) -> Option<String> {
        let (head, word) = match input.rfind(' ') {
            Some(i) => input.split_at(i + 1),
            None => ("", input),
        };

        let words: Vec<&str> = head.split_whitespace().collect();
        let candidates = match words.as_slice() {
            [] => &self.commands,
            ["open" | "import"] => &self.repositories,
            ["new", .., "from" | "--from"] => &self.repositories,
            ["update"] => &self.csv_files,
            _ => return None,
        };

        complete_word(word, candidates).map(|done| format!("{}{}", head, done))
    }
}

/// Extend `word` to the longest prefix shared by all matching candidates.
fn complete_word(word: &str, candidates: &[String]) -> Option<String> {
    let mut matches = candidates.iter().filter(|c| c.starts_with(word));
    let first = matches.next()?;
    let common = matches.fold(first.as_str(), |acc, c| common_prefix(acc, c));
    (common.len() > word.len()).then(|| common.to_string())
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

fn csv_files_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_lowercase().ends_with(".csv"))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion() -> ShellCompletion {
        ShellCompletion::new(
            vec!["2023-08-01".into(), "2024-08-01".into(), "archive".into()],
            vec!["lehrer.csv".into(), "lehrer_neu.csv".into()],
        )
    }

    #[test]
    fn test_command_names() {
        let c = completion();
        assert_eq!(c.get("up").as_deref(), Some("update"));
        assert_eq!(c.get("qu").as_deref(), Some("quit"));
        // exit and export share "ex"
        assert_eq!(c.get("e").as_deref(), Some("ex"));
        assert_eq!(c.get("ex"), None);
    }

    #[test]
    fn test_repository_names() {
        let c = completion();
        assert_eq!(c.get("open a").as_deref(), Some("open archive"));
        assert_eq!(c.get("open 20").as_deref(), Some("open 202"));
        assert_eq!(c.get("new 2025 from 2024").as_deref(), Some("new 2025 from 2024-08-01"));
        assert_eq!(c.get("import 2023").as_deref(), Some("import 2023-08-01"));
    }

    #[test]
    fn test_csv_files() {
        let c = completion();
        assert_eq!(c.get("update l").as_deref(), Some("update lehrer"));
        assert_eq!(c.get("update lehrer_").as_deref(), Some("update lehrer_neu.csv"));
        assert_eq!(c.get("delete ab"), None);
    }

    #[test]
    fn test_csv_files_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.CSV"), "").unwrap();
        std::fs::write(dir.path().join("a.csv"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("dir.csv")).unwrap();

        assert_eq!(csv_files_in(dir.path()), vec!["a.csv", "b.CSV"]);
        assert!(csv_files_in(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_common_prefix_respects_char_boundaries() {
        assert_eq!(common_prefix("müller", "mü"), "mü");
        assert_eq!(common_prefix("müller", "mueller"), "m");
    }
}
