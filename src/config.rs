use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::policy::{BlendWeights, ContentWeights, EventWeights, PolicyError, ScoringPolicy, POLICY_VERSION};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub profiles: ProfileSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// JSON array of venue records
    #[serde(default = "default_venues_path")]
    pub venues_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            venues_path: default_venues_path(),
        }
    }
}

fn default_venues_path() -> String { "data/venues.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSettings {
    /// Directory for profile documents; profiles stay in memory when unset
    pub dir: Option<String>,
    /// Profile used when a request names no user
    #[serde(default = "default_user")]
    pub default_user: String,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            dir: None,
            default_user: default_user(),
        }
    }
}

fn default_user() -> String { "default".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_policy_version")]
    pub version: String,
    #[serde(default)]
    pub weights: ContentWeights,
    #[serde(default)]
    pub blend: BlendWeights,
    #[serde(default)]
    pub event_weights: EventWeights,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            version: default_policy_version(),
            weights: ContentWeights::default(),
            blend: BlendWeights::default(),
            event_weights: EventWeights::default(),
        }
    }
}

fn default_policy_version() -> String { POLICY_VERSION.to_string() }

impl ScoringSettings {
    /// Build and validate the scoring policy these settings describe
    pub fn to_policy(&self) -> Result<ScoringPolicy, PolicyError> {
        ScoringPolicy {
            version: self.version.clone(),
            content: self.weights,
            blend: self.blend,
            events: self.event_weights,
            ..ScoringPolicy::default()
        }
        .validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json`, `pretty` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LoggingSettings {
    /// Unrecognised names fall back to JSON
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with VENUE_RANK)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VENUE_RANK__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("VENUE_RANK")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
