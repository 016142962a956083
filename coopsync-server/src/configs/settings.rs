use std::env;

use config::{Config, ConfigError, Environment, File};
use coopsync_analyser::Calendar;
use serde::{Deserialize, Serialize};
use time::Weekday;

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Firebase Realtime Database over REST
    Firebase,
    /// Process-local tree, for development without a database
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub kind: StoreKind,
    pub url: String,
    /// Database secret or ID token appended as `auth=`
    pub auth: Option<String>,
    pub timeout_secs: u64,
    pub reconnect_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    pub secret: String,
    pub expiration: u64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<WeekStart> for Weekday {
    fn from(value: WeekStart) -> Self {
        match value {
            WeekStart::Sunday => Weekday::Sunday,
            WeekStart::Monday => Weekday::Monday,
            WeekStart::Tuesday => Weekday::Tuesday,
            WeekStart::Wednesday => Weekday::Wednesday,
            WeekStart::Thursday => Weekday::Thursday,
            WeekStart::Friday => Weekday::Friday,
            WeekStart::Saturday => Weekday::Saturday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub utc_offset_minutes: i32,
    pub week_start: WeekStart,
    /// Extra seconds a dispense trigger stays set after the run time
    pub reset_buffer_secs: u64,
    /// How many of the newest events are mirrored
    pub event_limit: usize,
    /// Events shown before the list is expanded
    pub visible_events: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_start: WeekStart::Sunday,
            reset_buffer_secs: 5,
            event_limit: 100,
            visible_events: 15,
        }
    }
}

impl Dashboard {
    pub fn calendar(&self) -> Result<Calendar, ConfigError> {
        Calendar::from_offset_minutes(self.utc_offset_minutes, self.week_start.into())
            .map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub preferences_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub store: Store,
    pub auth: Auth,
    pub dashboard: Dashboard,
    pub context: Context,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(
                Environment::with_prefix("COOPSYNC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.context.preferences_path = normalize_path(&settings.context.preferences_path)
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .to_string_lossy()
            .to_string();

        settings.dashboard.calendar()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_calendar() {
        let dashboard = Dashboard {
            utc_offset_minutes: -300,
            week_start: WeekStart::Monday,
            ..Dashboard::default()
        };

        let calendar = dashboard.calendar().unwrap();

        assert_eq!(calendar.offset().whole_minutes(), -300);
        assert_eq!(calendar.week_start(), Weekday::Monday);
    }

    #[test]
    fn test_dashboard_rejects_out_of_range_offset() {
        let dashboard = Dashboard {
            utc_offset_minutes: 60 * 48,
            ..Dashboard::default()
        };

        assert!(dashboard.calendar().is_err());
    }

    #[test]
    fn test_default_config_parses() {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))
        .unwrap();

        assert_eq!(settings.store.kind, StoreKind::Firebase);
        assert_eq!(settings.auth.username, "admin");
        assert_eq!(settings.dashboard.visible_events, 15);
    }
}
