//! Headless AutoReplay
//!
//! Runs the replay service without a tray icon and edits stored settings.

use autoreplay_lib::{
    db::Database,
    get_db_path,
    models::{SettingKey, Settings},
    open_database,
    service::ReplayService,
    InitError,
};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Start the OBS replay buffer while a game is captured and sort saved clips per game.
#[derive(Parser, Debug)]
#[command(name = "autoreplay-daemon", version)]
struct Cli {
    /// Settings database (defaults to the platform data directory).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log toasts instead of showing desktop notifications.
    #[arg(long)]
    quiet_toasts: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to OBS and manage the replay buffer (default).
    Run,
    /// Show or change stored settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print every setting.
    Show,
    /// Store one setting, e.g. `config set scene Gaming`.
    Set { key: SettingKey, value: String },
    /// Restore all defaults.
    Reset,
}

fn open(path: Option<PathBuf>) -> Result<Database, InitError> {
    let path = match path {
        Some(path) => path,
        None => get_db_path()?,
    };
    open_database(&path)
}

fn show(settings: &Settings) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for (key, value) in settings.display_entries() {
        writeln!(out, "{:<18} {value}", key.as_str())?;
    }
    Ok(())
}

fn run_service(db: Database, quiet_toasts: bool) -> Result<(), String> {
    let settings = Settings::load(db.connection()).map_err(|e| InitError::Settings(e).to_string())?;
    info!("Watching OBS at {}", settings.obs_url);

    let service = ReplayService::new(Arc::new(Mutex::new(db)), settings).quiet_toasts(quiet_toasts);
    let handle = service.start();
    handle
        .join()
        .map_err(|_| "Replay service thread panicked".to_string())
}

fn execute(cli: Cli) -> Result<(), String> {
    let db = open(cli.db).map_err(|e| e.to_string())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_service(db, cli.quiet_toasts),
        Command::Config(ConfigCommand::Show) => {
            let settings = Settings::load(db.connection()).map_err(|e| e.to_string())?;
            show(&settings).map_err(|e| e.to_string())
        }
        Command::Config(ConfigCommand::Set { key, value }) => {
            let settings = Settings::set(db.connection(), key, &value)?;
            info!("{key} = {}", settings.stored_value(key));
            show(&settings).map_err(|e| e.to_string())
        }
        Command::Config(ConfigCommand::Reset) => {
            let settings = Settings::reset(db.connection()).map_err(|e| e.to_string())?;
            show(&settings).map_err(|e| e.to_string())
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
