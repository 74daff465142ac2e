use crate::error::{config_error, env_error, MementoResult};
use crate::utils::time::parse_time;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default sender address for outgoing emails
pub const DEFAULT_FROM_EMAIL: &str = "noreply@memento.com";

/// Default public URL used for links inside emails
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Main configuration structure for the reminder service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Resend API key, only needed when emails are actually sent
    pub resend_api_key: Option<String>,
    /// Sender address for reminder, digest and backup emails
    pub from_email: String,
    /// Public URL of the web app, used for links inside emails
    pub app_url: String,
    /// Location of the JSON state file
    pub data_file: PathBuf,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
    /// IANA timezone used to decide what "today" is
    pub timezone: String,
    /// Locale for labels and email text
    pub locale: String,
    /// Daily reminder check time in HH:MM
    pub reminder_check_time: String,
    /// How far ahead reminders look
    pub reminder_horizon_days: i64,
    /// How far ahead the monthly digest looks
    pub digest_horizon_days: i64,
    /// Maximum number of rows in an upcoming list
    pub upcoming_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        let mut components = HashMap::new();
        components.insert("reminders".to_string(), true);

        Self {
            resend_api_key: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            data_file: PathBuf::from("data/memento.json"),
            components,
            timezone: "UTC".to_string(),
            locale: "es".to_string(),
            reminder_check_time: "09:00".to_string(),
            reminder_horizon_days: 30,
            digest_horizon_days: 90,
            upcoming_limit: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> MementoResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();

        config.resend_api_key = env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(from_email) = env::var("BACKUP_FROM_EMAIL") {
            config.from_email = from_email;
        }
        if let Ok(app_url) = env::var("APP_URL") {
            config.app_url = app_url.trim_end_matches('/').to_string();
        }
        if let Ok(data_file) = env::var("MEMENTO_DATA_FILE") {
            config.data_file = PathBuf::from(data_file);
        }
        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = timezone;
        }
        if let Ok(locale) = env::var("MEMENTO_LOCALE") {
            config.locale = locale;
        }
        if let Ok(check_time) = env::var("REMINDER_CHECK_TIME") {
            config.reminder_check_time = check_time;
        }

        config.reminder_horizon_days =
            parse_number_var("REMINDER_HORIZON_DAYS", config.reminder_horizon_days)?;
        config.digest_horizon_days =
            parse_number_var("DIGEST_HORIZON_DAYS", config.digest_horizon_days)?;
        config.upcoming_limit = parse_number_var("UPCOMING_LIMIT", config.upcoming_limit)?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            config.merge_components(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge a `name = bool` TOML table over the current component toggles
    pub fn merge_components(&mut self, content: &str) -> MementoResult<()> {
        let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
        for (key, value) in file_components {
            self.components.insert(key, value);
        }
        Ok(())
    }

    /// Check values that are only known to be valid after parsing
    pub fn validate(&self) -> MementoResult<()> {
        self.tz()?;
        if parse_time(&self.reminder_check_time).is_none() {
            return Err(config_error(&format!(
                "Invalid REMINDER_CHECK_TIME '{}', expected HH:MM",
                self.reminder_check_time
            )));
        }
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> MementoResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone '{}'", self.timezone)))
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

fn parse_number_var(var: &str, default: i64) -> MementoResult<i64> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| env_error(&format!("Invalid {} format", var))),
        Err(_) => Ok(default),
    }
}
