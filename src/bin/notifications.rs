use memento::components::reminders::{send_welcome, unsubscribe, ResendDispatcher};
use memento::components::store::JsonFileStore;
use memento::config::Config;
use memento::error::{config_error, env_error, MementoResult};
use tracing::info;

/// Subscription changes
#[derive(Debug, PartialEq)]
enum Command {
    /// Save the address, turn notifications on and send the welcome email
    Subscribe(String),
    Unsubscribe,
}

fn parse_command(mut args: impl Iterator<Item = String>) -> MementoResult<Command> {
    let usage = || config_error("Usage: notifications subscribe ADDRESS | notifications unsubscribe");

    match args.next().as_deref() {
        Some("subscribe") => args.next().map(Command::Subscribe).ok_or_else(usage),
        Some("unsubscribe") => Ok(Command::Unsubscribe),
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

    match command {
        Command::Subscribe(address) => {
            let api_key = config
                .resend_api_key
                .as_deref()
                .ok_or_else(|| env_error("RESEND_API_KEY"))?;
            let dispatcher = ResendDispatcher::new(api_key, &config.from_email)?;
            let token = send_welcome(&config, &store, &dispatcher, &address).await?;
            println!("Subscribed {} (unsubscribe token {})", address, token);
        }
        Command::Unsubscribe => {
            if unsubscribe(&store).await? {
                println!("Notifications turned off");
            } else {
                println!("Notifications were already off");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command(args(&["subscribe", "ana@example.com"])).unwrap(),
            Command::Subscribe("ana@example.com".to_string())
        );
        assert_eq!(parse_command(args(&["unsubscribe"])).unwrap(), Command::Unsubscribe);

        assert!(parse_command(args(&["subscribe"])).is_err());
        assert!(parse_command(args(&[])).is_err());
    }
}
