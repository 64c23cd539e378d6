//! Shell command grammar.
//!
//! Each input line is split into words and parsed by clap in multicall mode,
//! so the first word selects the command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// One parsed shell line.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Create and open a repository (default name: today's date).
    New {
        /// Repository name.
        name: Option<String>,

        /// Seed the teacher list from this repository.
        #[arg(long)]
        from: Option<String>,
    },

    /// Open an existing repository.
    Open {
        /// Repository name.
        name: String,
    },

    /// Close the open repository.
    Close,

    /// List records of the open repository, or all repositories.
    List,

    /// Add a teacher by hand.
    Add,

    /// Merge an administration export into the open repository.
    Update {
        /// Path to the semicolon-separated export file.
        file: PathBuf,
    },

    /// Edit the record whose guid starts with the given prefix.
    Amend {
        /// Guid prefix matching exactly one record.
        prefix: String,
    },

    /// Mark a record as deleted, or remove it with --purge.
    Delete {
        /// Guid prefix matching exactly one record.
        prefix: String,

        /// Remove the record from the list instead of flagging it.
        #[arg(long)]
        purge: bool,
    },

    /// Copy another repository's teacher list into the open one.
    Import {
        /// Source repository name.
        repo: String,
    },

    /// Write the configured export files.
    Export {
        /// Target directory [default: the repository directory].
        dir: Option<PathBuf>,
    },

    /// Leave the shell.
    #[command(alias = "quit")]
    Exit,
}

/// Parse one input line. Blank lines yield `Ok(None)`; clap errors include
/// help and usage output.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words = rewrite_legacy(split_words(line));
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words).map(|l| Some(l.command))
}

/// Split on whitespace, keeping double-quoted sections together.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        words.push(current);
    }
    words
}

/// Accept `new <name> from <repo>` as well as `new <name> --from <repo>`.
fn rewrite_legacy(mut words: Vec<String>) -> Vec<String> {
    if words.first().map(String::as_str) == Some("new") {
        if let Some(pos) = words.iter().skip(1).position(|w| w == "from") {
            words[pos + 1] = "--from".into();
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ShellCommand {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_new_variants() {
        assert_eq!(parse("new"), ShellCommand::New { name: None, from: None });
        assert_eq!(
            parse("new 2024"),
            ShellCommand::New {
                name: Some("2024".into()),
                from: None
            }
        );
        let expected = ShellCommand::New {
            name: Some("2024".into()),
            from: Some("2023".into()),
        };
        assert_eq!(parse("new 2024 from 2023"), expected);
        assert_eq!(parse("new 2024 --from 2023"), expected);
        assert_eq!(
            parse("new from 2023"),
            ShellCommand::New {
                name: None,
                from: Some("2023".into())
            }
        );
    }

    #[test]
    fn test_delete_with_purge() {
        assert_eq!(
            parse("delete ab12 --purge"),
            ShellCommand::Delete {
                prefix: "ab12".into(),
                purge: true
            }
        );
        assert_eq!(
            parse("delete ab12"),
            ShellCommand::Delete {
                prefix: "ab12".into(),
                purge: false
            }
        );
    }

    #[test]
    fn test_quoted_path() {
        assert_eq!(
            parse(r#"update "C:\Exports\Lehrer 2024.csv""#),
            ShellCommand::Update {
                file: PathBuf::from(r"C:\Exports\Lehrer 2024.csv")
            }
        );
        assert_eq!(split_words(r#"a "" b"#), vec!["a", "", "b"]);
    }

    #[test]
    fn test_quit_alias() {
        assert_eq!(parse("quit"), ShellCommand::Exit);
        assert_eq!(parse("exit"), ShellCommand::Exit);
    }

    #[test]
    fn test_errors() {
        assert!(parse_line("frobnicate").is_err());
        assert!(parse_line("open").is_err());
        let help = parse_line("help").unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
