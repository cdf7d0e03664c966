use softphone::console::{ConsoleCommand, ConsoleView, HELP, parse_command, render_snapshot};
use softphone::error::SoftphoneError;
use softphone::logger::{LogSettings, initialize as LoggerInitialize};
use softphone::paths;

use call_core::config::AppConfig;
use call_core::session::{SessionHandle, SessionRuntime};

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::spawn as TokioSpawn;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), SoftphoneError> {
    // A missing .env file is normal.
    let env_file = dotenvy::dotenv().ok();

    // The config picks the log levels, so it is read before logging starts.
    let config_dir = paths::config_dir()?;
    let mut config = AppConfig::load(&config_dir)?;
    config.apply_env_overrides()?;

    let log_dir = paths::log_dir()?;
    LoggerInitialize(&log_dir, LogSettings::from_config(&config.logging))?;

    info!("Softphone starting");
    info!("Config directory: {}", config_dir.display());
    info!("Log directory: {}", log_dir.display());
    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    let session = SessionRuntime::start(&config)?;
    info!("Session started");

    let view = Arc::new(Mutex::new(ConsoleView::new(Duration::from_millis(
        config.ui.status_message_ms,
    ))));
    let printer = TokioSpawn(print_updates(session.clone(), Arc::clone(&view)));

    let result = read_commands(&session, &view).await;

    session.shutdown().await;
    printer.abort();
    info!("Softphone stopped");

    result
}

async fn print_updates(session: SessionHandle, view: Arc<Mutex<ConsoleView>>) {
    let mut updates = session.subscribe();

    while let Some(update) = updates.recv().await {
        if let Some(line) = view.lock().await.apply(&update) {
            println!("{line}");
        }
    }
}

async fn read_commands(
    session: &SessionHandle,
    view: &Arc<Mutex<ConsoleView>>,
) -> Result<(), SoftphoneError> {
    let mut lines = BufReader::new(stdin()).lines();

    println!("Type 'help' for commands.");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Console input closed");
                return Ok(());
            }
            Err(e) => {
                return Err(SoftphoneError::Softphone {
                    message: format!("Failed to read console input: {e}"),
                    location: models::ErrorLocation::from(std::panic::Location::caller()),
                });
            }
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("{e}");
                println!("{e}");
                continue;
            }
        };

        match command {
            ConsoleCommand::Intent(intent) => {
                if let Err(e) = session.dispatch(intent).await {
                    println!("{e}");
                    if !session.is_running() {
                        return Err(e.into());
                    }
                }
            }
            ConsoleCommand::Status => {
                let snapshot = session.snapshot().await;
                let view = view.lock().await;
                println!("{}", render_snapshot(&snapshot, view.duration()));
                if let Some(status) = view.status() {
                    println!("* {status}");
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(()),
        }
    }
}
