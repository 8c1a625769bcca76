//! Work Break Timer - alternating work and break phases
//!
//! This tool reminds you to step away from the screen:
//! - A work phase counts down in the menu bar
//! - A chime plays and a break screen takes over for the break phase
//! - The cycle repeats until disabled; completed rounds are counted per day

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use work_break_timer::cli::{Cli, Commands, Display, RunArgs, SettingsCommand};
use work_break_timer::daemon::{self, RunOptions};
use work_break_timer::prefs::{JsonPreferenceStore, PreferenceStore};
use work_break_timer::rounds::{local_today, RoundCounter};
use work_break_timer::settings::{Settings, SettingsForm};

/// Main entry point
fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli) {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
fn execute(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    if let Commands::Completions { shell } = command {
        generate_completions(shell);
        return Ok(());
    }

    let store = open_store(cli.prefs.as_deref())?;

    match command {
        Commands::Run(args) => {
            daemon::run(
                store,
                RunOptions {
                    no_sound: args.no_sound,
                },
            )?;
        }
        Commands::Status => {
            let rounds = RoundCounter::new(Arc::clone(&store));
            let settings = Settings::load(store.as_ref());
            Display::show_status(rounds.count(local_today()), &settings);
        }
        Commands::History(args) => {
            let rounds = RoundCounter::new(store);
            Display::show_history(&rounds.history(), args.days as usize);
        }
        Commands::Settings(SettingsCommand::Show) => {
            Display::show_settings(&Settings::load(store.as_ref()));
        }
        Commands::Settings(SettingsCommand::Set(args)) => {
            if args.is_empty() {
                anyhow::bail!("Nothing to change; pass --work, --break or --focus");
            }
            let mut form = SettingsForm::from_settings(&Settings::load(store.as_ref()));
            args.fill(&mut form);
            let settings = form.submit(store.as_ref(), |_| {})?;
            Display::show_settings_saved(&settings);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Opens the preference store at `path`, or the default one.
fn open_store(path: Option<&Path>) -> Result<Arc<dyn PreferenceStore>> {
    let store = match path {
        Some(path) => JsonPreferenceStore::open(path),
        None => JsonPreferenceStore::open_default(),
    }
    .context("Failed to open preferences")?;

    tracing::debug!(path = %store.path().display(), "Using preferences");
    Ok(Arc::new(store))
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_defaults_to_run() {
        let cli = Cli::parse_from(["work-break-timer"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["work-break-timer", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["work-break-timer", "--verbose", "status"]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
