//! Application configuration.
//!
//! Settings are read once at startup from `~/.config/calassist/config.toml`
//! (or the file named by `CALASSIST_CONFIG`), overlaid with `CALASSIST_*`
//! environment variables, and resolved into an immutable [`Config`].

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{CalAssistError, CalAssistResult};
use crate::remote::Remote;
use crate::time::Normalizer;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "CALASSIST_CONFIG";
const ENV_PREFIX: &str = "CALASSIST";

static DEFAULT_DATA_FILE: &str = "~/.local/share/calassist/events.json";

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_duration_minutes() -> i64 {
    60
}

fn default_upcoming_limit() -> usize {
    5
}

fn default_sync_days() -> i64 {
    30
}

/// Raw settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Zone used to anchor timestamps written without one: an IANA name,
    /// `UTC`, or `local`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Length of an event created without an end time.
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,

    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,

    /// Days either side of today fetched from the remote calendar.
    #[serde(default = "default_sync_days")]
    pub sync_days: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<Remote>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_file: default_data_file(),
            timezone: default_timezone(),
            default_duration_minutes: default_duration_minutes(),
            upcoming_limit: default_upcoming_limit(),
            sync_days: default_sync_days(),
            remote: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> CalAssistResult<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalAssistError::Config("Could not determine config directory".into()))?
            .join("calassist");

        Ok(config_dir.join("config.toml"))
    }

    /// Read settings from `path` (missing file means defaults) plus the environment.
    pub fn load_from(path: &Path) -> CalAssistResult<Self> {
        ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| CalAssistError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalAssistError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> CalAssistResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalAssistError::Serialization(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalAssistResult<()> {
        let contents = format!(
            "\
# calassist configuration

# Where events are stored:
# data_file = \"{}\"

# Zone for timestamps written without one (IANA name, \"UTC\" or \"local\"):
# timezone = \"UTC\"

# Length of events created without an end time, in minutes:
# default_duration_minutes = 60

# How many events `upcoming` shows:
# upcoming_limit = 5

# Days either side of today fetched from the remote by `pull`:
# sync_days = 30

# Remote calendar mirrored through a provider binary (calassist-provider-<name>):
# [remote]
# provider = \"google\"
# calendar_id = \"primary\"
",
            DEFAULT_DATA_FILE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalAssistError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalAssistError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Resolved, immutable configuration. Built once and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_file: PathBuf,
    pub normalizer: Normalizer,
    pub default_duration: Duration,
    pub upcoming_limit: usize,
    pub sync_days: i64,
    pub remote: Option<Remote>,
    settings: Settings,
}

impl Config {
    /// Load from the default location, writing a commented template there on
    /// first run.
    pub fn load() -> CalAssistResult<Self> {
        let path = Settings::config_path()?;

        if !path.exists() {
            Settings::create_default_config(&path)?;
            tracing::info!(path = %path.display(), "created default config");
        }

        Self::from_settings(Settings::load_from(&path)?)
    }

    pub fn from_settings(settings: Settings) -> CalAssistResult<Self> {
        let normalizer = Normalizer::from_name(&settings.timezone)?;

        if settings.default_duration_minutes <= 0 {
            return Err(CalAssistError::Config(format!(
                "default_duration_minutes must be positive, got {}",
                settings.default_duration_minutes
            )));
        }

        let data_file = PathBuf::from(
            shellexpand::tilde(&settings.data_file.to_string_lossy()).into_owned(),
        );

        Ok(Config {
            data_file,
            normalizer,
            default_duration: Duration::minutes(settings.default_duration_minutes),
            upcoming_limit: settings.upcoming_limit,
            sync_days: settings.sync_days,
            remote: settings.remote.clone(),
            settings,
        })
    }

    /// The settings this config was resolved from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Default for Config {
    fn default() -> Self {
        // Defaults always resolve: UTC zone, positive duration.
        Config {
            data_file: PathBuf::from(shellexpand::tilde(DEFAULT_DATA_FILE).into_owned()),
            normalizer: Normalizer::utc(),
            default_duration: Duration::minutes(default_duration_minutes()),
            upcoming_limit: default_upcoming_limit(),
            sync_days: default_sync_days(),
            remote: None,
            settings: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.default_duration_minutes, 60);
        assert_eq!(settings.upcoming_limit, 5);
        assert!(settings.remote.is_none());
    }

    #[test]
    fn test_file_values_and_remote_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_file = "/tmp/cal/events.json"
timezone = "Europe/Berlin"
upcoming_limit = 3

[remote]
provider = "google"
calendar_id = "primary"
"#,
        )
        .unwrap();

        let config = Config::from_settings(Settings::load_from(&path).unwrap()).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/cal/events.json"));
        assert_eq!(config.normalizer.zone(), Tz::Europe__Berlin);
        assert_eq!(config.upcoming_limit, 3);

        let remote = config.remote.expect("Should have remote");
        assert_eq!(remote.provider.name(), "google");
        assert_eq!(
            remote.config.0.get("calendar_id").and_then(|v| v.as_str()),
            Some("primary")
        );
    }

    #[test]
    fn test_bad_timezone_rejected() {
        let settings = Settings {
            timezone: "Nowhere/Special".into(),
            ..Settings::default()
        };
        assert!(matches!(
            Config::from_settings(settings),
            Err(CalAssistError::Config(_))
        ));
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let settings = Settings {
            default_duration_minutes: 0,
            ..Settings::default()
        };
        assert!(Config::from_settings(settings).is_err());
    }

    #[test]
    fn test_default_template_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        Settings::create_default_config(&path).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_default_template_documents_sync_days() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Settings::create_default_config(&path).unwrap();

        let template = std::fs::read_to_string(&path).unwrap();
        assert!(template.contains("# sync_days = 30"));

        let enabled = template.replace("# sync_days = 30", "sync_days = 45");
        std::fs::write(&path, enabled).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().sync_days, 45);
    }
}
