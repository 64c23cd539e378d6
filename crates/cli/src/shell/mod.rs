//! Interactive roster shell.
//!
//! Reads one command per line, runs it against a [`RepositoryManager`] and
//! prints the outcome. A failing command is reported and the loop goes on.

pub mod commands;
pub mod completion;
pub mod history;
pub mod prompts;
pub mod style;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use bbst_core::config::AppConfig;
use bbst_core::models::{GuidMatch, Teacher};
use bbst_core::repository::{RepositoryManager, UpdateReport};

use commands::ShellCommand;
use completion::ShellCompletion;
use history::FileHistory;
use prompts::PromptDecider;

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Run the shell until `exit` or end of input.
pub fn run(config: &AppConfig, dry_run: bool) -> Result<()> {
    let mut manager = RepositoryManager::new(config).with_dry_run(dry_run);

    println!();
    println!("{}", style::header("bbst roster shell"));
    println!(
        "{}",
        style::dim(&format!(
            "Repositories in {}. Type 'help' for commands.",
            manager.base_dir().display()
        ))
    );
    if dry_run {
        println!("{} nothing will be written to disk", style::dry_run_badge());
    }
    println!();

    let mut history = FileHistory::load(manager.base_dir().join(history::HISTORY_FILENAME))
        .with_persist(!dry_run);

    loop {
        // repositories and csv files change between commands
        let file_dir = manager
            .current()
            .map(|r| r.path.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let completion = ShellCompletion::for_manager(&manager, &file_dir);

        let line: String = match Input::<String>::new()
            .with_prompt(prompt(&manager))
            .allow_empty(true)
            .history_with(&mut history)
            .completion_with(&completion)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                debug!(error = %e, "input closed");
                break;
            }
        };

        let command = match commands::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                // clap renders help, usage and errors itself
                let _ = e.print();
                continue;
            }
        };

        match execute(&mut manager, command) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("{}", style::error(&format!("{:#}", e))),
        }
    }

    manager.close();
    Ok(())
}

fn prompt(manager: &RepositoryManager) -> String {
    match manager.current() {
        Some(repo) => format!("bbst [{}]", repo.name),
        None => "bbst".to_string(),
    }
}

fn execute(manager: &mut RepositoryManager, command: ShellCommand) -> Result<Flow> {
    match command {
        ShellCommand::New { name, from } => cmd_new(manager, name.as_deref(), from.as_deref())?,
        ShellCommand::Open { name } => {
            let repo = manager.open(&name).context("could not open repository")?;
            println!("{}", style::success(&format!("Opened {}", repo.name)));
        }
        ShellCommand::Close => {
            manager.close();
            println!("{}", style::success("Repository closed"));
        }
        ShellCommand::List => cmd_list(manager)?,
        ShellCommand::Add => cmd_add(manager)?,
        ShellCommand::Update { file } => cmd_update(manager, &file)?,
        ShellCommand::Amend { prefix } => cmd_amend(manager, &prefix)?,
        ShellCommand::Delete { prefix, purge } => cmd_delete(manager, &prefix, purge)?,
        ShellCommand::Import { repo } => {
            let count = manager.import_from(&repo).context("import failed")?;
            println!(
                "{}",
                style::success(&format!("Imported {} teachers from {}", count, repo))
            );
        }
        ShellCommand::Export { dir } => cmd_export(manager, dir.as_deref())?,
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_new(manager: &mut RepositoryManager, name: Option<&str>, from: Option<&str>) -> Result<()> {
    match from {
        Some(source) => {
            let count = manager
                .create_from(name, source)
                .context("could not create repository")?;
            let repo = manager.current().map(|r| r.name.clone()).unwrap_or_default();
            println!(
                "{}",
                style::success(&format!(
                    "Created {} with {} teachers from {}",
                    repo, count, source
                ))
            );
        }
        None => {
            let repo = manager.create(name).context("could not create repository")?;
            println!("{}", style::success(&format!("Created {}", repo.name)));
        }
    }
    Ok(())
}

fn cmd_list(manager: &RepositoryManager) -> Result<()> {
    if manager.current().is_none() {
        let names = manager
            .list_repositories()
            .context("failed to list repositories")?;
        if names.is_empty() {
            println!("{}", style::warn("No repositories yet. Create one with 'new'."));
        } else {
            println!("{}", style::header(&format!("Repositories ({})", names.len())));
            for name in names {
                println!("  {}", name);
            }
        }
        return Ok(());
    }

    let teachers = manager.load_records().context("failed to load teacher list")?;
    if teachers.is_empty() {
        println!("{}", style::warn("The teacher list is empty"));
        return Ok(());
    }

    println!();
    println!("{}", style::header(&format!("Teachers ({})", teachers.len())));
    println!("{}", teacher_table(&teachers));
    println!();
    Ok(())
}

fn teacher_table(teachers: &[Teacher]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Guid", "Last name", "First name", "Username", "Email", "Added", "Deleted",
    ]);

    for t in teachers {
        table.add_row(vec![
            Cell::new(&t.guid),
            Cell::new(&t.last_name),
            Cell::new(&t.first_name),
            Cell::new(&t.username),
            Cell::new(&t.email),
            Cell::new(style::flag(t.added)),
            Cell::new(style::flag(t.deleted)),
        ]);
    }
    table
}

fn cmd_add(manager: &RepositoryManager) -> Result<()> {
    // fail before prompting when nothing is open
    manager.load_records().context("cannot add teacher")?;
    let (first, last) = prompts::new_teacher_names()?;
    let teacher = manager
        .add_teacher(&first, &last)
        .context("failed to add teacher")?;
    println!(
        "{}",
        style::success(&format!("Added {} as {}", teacher.display_name(), teacher.username))
    );
    Ok(())
}

fn cmd_update(manager: &RepositoryManager, file: &Path) -> Result<()> {
    let file = resolve_export_path(manager, file);
    let mut decider = PromptDecider::default();
    let report = manager
        .update(&file, &mut decider)
        .with_context(|| format!("update from {} failed", file.display()))?;
    print_update_report(&report, decider.asked());
    Ok(())
}

/// Relative export paths are taken from the open repository's directory.
fn resolve_export_path(manager: &RepositoryManager, file: &Path) -> PathBuf {
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match manager.current() {
        Some(repo) => repo.path.join(file),
        None => file.to_path_buf(),
    }
}

fn print_update_report(report: &UpdateReport, asked: usize) {
    println!();
    println!("{}", style::header("Update complete"));
    println!("  Rows read          : {}", report.rows_read);
    println!("  Already known      : {}", report.known_count);
    println!("  Added              : {}", report.added_count);
    println!("  Blacklisted        : {}", report.blacklisted_count);
    println!("  Rejected           : {} of {} asked", report.rejected_count, asked);
    println!("  Marked as deleted  : {}", report.newly_deleted.len());

    for t in &report.newly_deleted {
        println!("    {}", t);
    }
    for skipped in &report.skipped {
        println!(
            "{}",
            style::warn(&format!("line {} skipped: {}", skipped.line, skipped.reason))
        );
    }
    for guid in &report.unmatched_deletions {
        println!(
            "{}",
            style::warn(&format!("deleted in export but not in roster: {}", guid))
        );
    }
    println!();
}

fn cmd_amend(manager: &RepositoryManager, prefix: &str) -> Result<()> {
    let current = unique_record(manager, prefix)?;
    println!("{}", style::header(&format!("Amending {}", current)));

    let amendment = prompts::edit_teacher(&current)?;
    if amendment == Default::default() {
        println!("{}", style::dim("Nothing changed"));
        return Ok(());
    }
    if !prompts::confirm("Save changes?")? {
        println!("{}", style::warn("Amend cancelled"));
        return Ok(());
    }

    let amended = manager.amend(prefix, amendment).context("amend failed")?;
    println!("{}", style::success(&format!("Saved {}", amended)));
    Ok(())
}

fn cmd_delete(manager: &RepositoryManager, prefix: &str, purge: bool) -> Result<()> {
    let current = unique_record(manager, prefix)?;
    let question = if purge {
        format!("Remove {} from the list for good?", current)
    } else {
        format!("Mark {} as deleted?", current)
    };
    if !prompts::confirm(&question)? {
        println!("{}", style::warn("Delete cancelled"));
        return Ok(());
    }

    let deleted = manager.delete(prefix, purge).context("delete failed")?;
    let verb = if purge { "Removed" } else { "Marked as deleted:" };
    println!("{}", style::success(&format!("{} {}", verb, deleted)));
    Ok(())
}

/// Resolve `prefix` for a confirmation prompt, listing candidates when it is
/// ambiguous.
fn unique_record(manager: &RepositoryManager, prefix: &str) -> Result<Teacher> {
    match manager.find(prefix).context("lookup failed")? {
        GuidMatch::Unique(t) => Ok(t),
        GuidMatch::NotFound => anyhow::bail!("no teacher with guid starting '{}'", prefix),
        GuidMatch::Ambiguous(all) => {
            println!("{}", teacher_table(&all));
            anyhow::bail!(
                "guid prefix '{}' matches {} teachers; use a longer prefix",
                prefix,
                all.len()
            )
        }
    }
}

fn cmd_export(manager: &RepositoryManager, dir: Option<&Path>) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .context("invalid progress template")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message("Writing export files...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = manager.export(dir);
    spinner.finish_and_clear();

    let written = result.context("export failed")?;
    println!("{}", style::success("Export complete"));
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}
