use chrono::Utc;
use memento::components::reminders::{send_backup, ResendDispatcher};
use memento::components::store::backup::{backup_file_name, export_backup, restore_backup};
use memento::components::store::{JsonFileStore, StateStore};
use memento::config::Config;
use memento::error::{config_error, env_error, MementoResult};
use memento::utils::time::today_in;
use std::path::PathBuf;
use tracing::info;

/// What to do with the data file
#[derive(Debug, PartialEq)]
enum Command {
    /// Write the JSON envelope to a file
    Export(Option<PathBuf>),
    /// Replace the data with a JSON or base64 backup
    Restore(PathBuf),
    /// Send the encoded backup by email
    Email(String),
}

fn parse_command(mut args: impl Iterator<Item = String>) -> MementoResult<Command> {
    let usage = || config_error("Usage: backup export [FILE] | backup restore FILE | backup email ADDRESS");

    match args.next().as_deref() {
        Some("export") => Ok(Command::Export(args.next().map(PathBuf::from))),
        Some("restore") => args.next().map(|p| Command::Restore(PathBuf::from(p))).ok_or_else(usage),
        Some("email") => args.next().map(Command::Email).ok_or_else(usage),
        _ => Err(usage()),
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    memento::startup::init_logging()?;

    let command = parse_command(std::env::args().skip(1))?;
    let config = Config::load()?;
    let store = JsonFileStore::new(config.data_file.clone());
    info!("Using data file {}", store.path().display());
    let today = today_in(&config.tz()?);

    match command {
        Command::Export(path) => {
            let state = store.load().await?;
            let path = path.unwrap_or_else(|| PathBuf::from(backup_file_name(today, "json")));
            tokio::fs::write(&path, export_backup(&state, Utc::now())?)
                .await
                .map_err(memento::error::Error::from)?;
            info!("Backup written to {}", path.display());
        }
        Command::Restore(path) => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(memento::error::Error::from)?;
            let stats = restore_backup(&store, &content).await?;
            info!(
                "Restored {} people, {} events and {} ideas from {}",
                stats.people,
                stats.events,
                stats.ideas,
                path.display()
            );
        }
        Command::Email(address) => {
            let api_key = config
                .resend_api_key
                .as_deref()
                .ok_or_else(|| env_error("RESEND_API_KEY"))?;
            let dispatcher = ResendDispatcher::new(api_key, &config.from_email)?;
            let token = send_backup(&config, &store, &dispatcher, &address, today).await?;
            println!("Backup sent to {} (reference {})", address, token);
        }
    }

    Ok(())
}
