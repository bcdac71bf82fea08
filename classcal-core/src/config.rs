//! Global classcal configuration.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClassCalError, ClassCalResult};
use crate::ics::{CalendarOptions, DEFAULT_PRODUCT_ID, DataQualityPolicy};
use crate::reminders::ReminderPolicy;

static DEFAULT_CATALOG_PATH: &str = "~/.config/classcal/classes.json";
static DEFAULT_DOWNLOAD_DIR: &str = "~/Downloads";
static DEFAULT_CALENDAR_NAME: &str = "Classes";
static DEFAULT_CALENDAR_DESCRIPTION: &str = "Selected classes";
static DEFAULT_PURPOSE: &str = "classes";

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

fn default_calendar_name() -> String {
    DEFAULT_CALENDAR_NAME.to_string()
}

fn default_calendar_description() -> String {
    DEFAULT_CALENDAR_DESCRIPTION.to_string()
}

fn default_purpose() -> String {
    DEFAULT_PURPOSE.to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration at ~/.config/classcal/config.toml, overridable with
/// `CLASSCAL_*` environment variables (e.g. `CLASSCAL_TIMEZONE`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassCalConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Where exported .ics files are written
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// IANA timezone of the catalog's times. Unset means the system timezone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_calendar_name")]
    pub calendar_name: String,

    #[serde(default = "default_calendar_description")]
    pub calendar_description: String,

    /// Reminders used when none are given on the command line. From the
    /// environment, a comma separated list: `CLASSCAL_DEFAULT_REMINDERS=30,60`.
    #[serde(default, deserialize_with = "reminder_list")]
    pub default_reminders: Vec<i64>,

    /// Refuse to export without at least one reminder
    #[serde(default = "default_true")]
    pub require_reminders: bool,

    /// Fail the export on the first class with a bad date or time
    #[serde(default)]
    pub strict: bool,

    /// First part of exported filenames: `<purpose>_<date>.ics`
    #[serde(default = "default_purpose")]
    pub purpose: String,
}

impl Default for ClassCalConfig {
    fn default() -> Self {
        ClassCalConfig {
            catalog_path: default_catalog_path(),
            download_dir: default_download_dir(),
            timezone: None,
            calendar_name: default_calendar_name(),
            calendar_description: default_calendar_description(),
            default_reminders: Vec::new(),
            require_reminders: true,
            strict: false,
            purpose: default_purpose(),
        }
    }
}

impl ClassCalConfig {
    pub fn config_path() -> ClassCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ClassCalError::Config("Could not determine config directory".into()))?
            .join("classcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default one if missing)
    /// and apply environment overrides.
    pub fn load() -> ClassCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> ClassCalResult<Self> {
        Self::load_with_env(path, Environment::with_prefix("CLASSCAL"))
    }

    fn load_with_env(path: &Path, env: Environment) -> ClassCalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(env.try_parsing(true))
            .build()
            .map_err(|e| ClassCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ClassCalError::Config(e.to_string()))
    }

    /// The effective configuration as TOML, in the config file's format.
    pub fn to_toml(&self) -> ClassCalResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClassCalError::Serialization(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ClassCalResult<()> {
        let contents = format!(
            "\
# classcal configuration

# Class catalog (JSON):
# catalog_path = \"{}\"

# Where exported .ics files are written:
# download_dir = \"{}\"

# Timezone of the class times (defaults to the system timezone):
# timezone = \"America/Sao_Paulo\"

# Calendar name and description shown by calendar apps:
# calendar_name = \"{}\"
# calendar_description = \"{}\"

# Reminders (minutes before each class) used when none are given:
# default_reminders = [30]

# Refuse to export without reminders:
# require_reminders = true

# Fail instead of skipping classes with a bad date or time:
# strict = false

# Exported files are named <purpose>_<date>.ics:
# purpose = \"{}\"
",
            DEFAULT_CATALOG_PATH,
            DEFAULT_DOWNLOAD_DIR,
            DEFAULT_CALENDAR_NAME,
            DEFAULT_CALENDAR_DESCRIPTION,
            DEFAULT_PURPOSE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClassCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ClassCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn catalog_path(&self) -> PathBuf {
        expand(&self.catalog_path)
    }

    pub fn download_dir(&self) -> PathBuf {
        expand(&self.download_dir)
    }

    /// The configured timezone, if any.
    pub fn timezone(&self) -> ClassCalResult<Option<Tz>> {
        self.timezone.as_deref().map(parse_timezone).transpose()
    }

    pub fn reminder_policy(&self) -> ReminderPolicy {
        if self.require_reminders {
            ReminderPolicy::Required
        } else {
            ReminderPolicy::Optional
        }
    }

    /// Calendar options for documents exported with this config.
    pub fn calendar_options(&self, timezone: Tz) -> CalendarOptions {
        CalendarOptions {
            name: self.calendar_name.clone(),
            description: self.calendar_description.clone(),
            timezone,
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            policy: if self.strict {
                DataQualityPolicy::Strict
            } else {
                DataQualityPolicy::Skip
            },
            uid_domain: "classcal".to_string(),
        }
    }
}

pub fn parse_timezone(name: &str) -> ClassCalResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ClassCalError::Timezone(name.to_string()))
}

/// Reminder lists come as an array from the config file, and as a single
/// number or a comma separated string from the environment.
fn reminder_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<i64>),
        One(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(minutes) => Ok(minutes),
        Raw::One(minutes) => Ok(vec![minutes]),
        Raw::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>().map_err(|_| {
                    <D::Error as serde::de::Error>::custom(format!(
                        "invalid reminder '{s}', expected minutes"
                    ))
                })
            })
            .collect(),
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
