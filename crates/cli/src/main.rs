//! bbst command-line tool.
//!
//! Starts the interactive roster shell by default. Also provides one-shot
//! subcommands for generating and validating configuration files.

mod shell;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bbst_core::config::AppConfig;

/// Location of the optional per-user configuration file.
const DEFAULT_CONFIG_PATH: &str = "~/.config/bbst/config.toml";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Manage teacher accounts for the school's downstream systems.
#[derive(Parser, Debug)]
#[command(
    name = "bbst",
    version,
    about = "Maintain the teacher account roster of a vocational school"
)]
struct Cli {
    /// Path to the TOML configuration file [default: ~/.config/bbst/config.toml].
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding the repositories; overrides the config file.
    #[arg(long, global = true)]
    base_dir: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do everything except writing files.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive shell (default).
    Shell,

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./bbst.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(mut cli: Cli) -> Result<()> {
    match cli.command.take().unwrap_or(Commands::Shell) {
        Commands::Init { output } => {
            init_logging("warn", cli.verbose);
            cmd_init(&output)
        }
        Commands::Validate => {
            init_logging("warn", cli.verbose);
            cmd_validate(&cli)
        }
        Commands::Shell => {
            let config = load_config(&cli)?;
            init_logging(&config.workspace.log_level, cli.verbose);
            debug!(?config, "configuration loaded");
            shell::run(&config, cli.dry_run)
        }
    }
}

/// Install the stderr subscriber. `--verbose` wins over the configured level.
fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// The config file to read, if any. An explicit `--config` must exist; the
/// default location is only used when present.
fn config_path(cli: &Cli) -> Result<Option<PathBuf>> {
    match &cli.config {
        Some(path) => {
            let path = expand_tilde(path);
            if !path.exists() {
                anyhow::bail!("configuration file not found: {}", path.display());
            }
            Ok(Some(path))
        }
        None => {
            let path = expand_tilde(DEFAULT_CONFIG_PATH);
            Ok(path.exists().then_some(path))
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match config_path(cli)? {
        Some(path) => AppConfig::load_and_validate(&path)
            .with_context(|| format!("failed to load configuration file {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(dir) = &cli.base_dir {
        config.workspace.base_dir = PathBuf::from(dir);
    }
    config.workspace.base_dir = expand_tilde(&config.workspace.base_dir.to_string_lossy());

    Ok(config)
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, AppConfig::default_template())
        .context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set base_dir to the directory that should hold the repositories");
    println!("  2. Adjust the username prefix and mail domain for your school");
    println!("  3. Validate with: bbst validate --config {}", output.display());
    println!("  4. Start the shell: bbst --config {}", output.display());

    Ok(())
}

fn cmd_validate(cli: &Cli) -> Result<()> {
    let config = match config_path(cli)? {
        Some(path) => {
            println!("Validating configuration: {}", path.display());
            println!();
            let config =
                AppConfig::load_from_file(&path).context("failed to parse configuration")?;
            println!("  [OK] TOML structure is valid");
            config
        }
        None => {
            println!("No configuration file at {}; checking defaults.", DEFAULT_CONFIG_PATH);
            println!();
            AppConfig::default()
        }
    };

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All values are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Base directory  : {}", config.workspace.base_dir.display());
    println!("  Log level       : {}", config.workspace.log_level);
    println!("  Username prefix : {}", config.credentials.username_prefix);
    println!("  Mail domain     : {}", config.credentials.email_domain);
    println!("  Password length : {}", config.credentials.password_length);
    println!("  Export formats  : {}", config.export.formats.join(", "));

    Ok(())
}
