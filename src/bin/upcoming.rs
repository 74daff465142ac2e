use memento::components::store::{JsonFileStore, StateStore};
use memento::config::Config;
use memento::error::{config_error, MementoResult};
use memento::occurrences::labels::empty_upcoming_label;
use memento::occurrences::{collect_upcoming, days_until_label};
use memento::utils::time::today_in;

/// Parsed command line flags
struct Args {
    horizon: Option<i64>,
    limit: Option<i64>,
    /// Print the occurrences as JSON instead of a table
    json: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> MementoResult<Args> {
    let mut parsed = Args {
        horizon: None,
        limit: None,
        json: false,
    };
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        let target = match arg.as_str() {
            "--json" => {
                parsed.json = true;
                continue;
            }
            "--horizon" => &mut parsed.horizon,
            "--limit" => &mut parsed.limit,
            other => return Err(config_error(&format!("Unknown argument '{}'", other))),
        };
        let value = args
            .next()
            .ok_or_else(|| config_error(&format!("{} needs a number", arg)))?;
        *target = Some(
            value
                .parse::<i64>()
                .map_err(|_| config_error(&format!("Invalid number '{}' for {}", value, arg)))?,
        );
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    memento::startup::init_logging()?;

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::load()?;

    let store = JsonFileStore::new(config.data_file.clone());
    tracing::debug!("Reading {}", store.path().display());
    let state = store.load().await?;
    let today = today_in(&config.tz()?);

    let horizon = args.horizon.unwrap_or(config.digest_horizon_days);
    let limit = args.limit.unwrap_or(config.upcoming_limit);
    let upcoming = collect_upcoming(&state.people, &state.events, today, horizon, limit, &config.locale);

    if args.json {
        let json = serde_json::to_string_pretty(&upcoming).map_err(memento::error::Error::from)?;
        println!("{}", json);
        return Ok(());
    }

    if upcoming.is_empty() {
        println!("{}", empty_upcoming_label(&config.locale));
        return Ok(());
    }

    for occurrence in &upcoming {
        println!(
            "{:<12} {:<40} {:<20} {}",
            occurrence.occurs_on.format("%Y-%m-%d"),
            occurrence.title,
            occurrence.person_name,
            days_until_label(occurrence.days_until, &config.locale)
        );
    }

    Ok(())
}
