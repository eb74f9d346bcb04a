//! Process-wide configuration, loaded once from a TOML file (SPEC_FULL.md §10.1).
//!
//! Mirrors `trickstertwo-toad/src/config/{mod,tui}.rs`'s `load_from_file` /
//! `load_or_default` pattern: a plain serde struct, read once at startup and
//! stashed in a `OnceLock` so every component shares the same immutable view
//! instead of re-reading the file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mongodb: MongoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub ip: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db: String,
}

impl MongoConfig {
    /// Assembles a `mongodb://` connection string, percent-encoding credentials
    /// the way `original_source/app/db/mongodb.py` does with `urllib.parse.quote_plus`.
    pub fn connection_string(&self) -> String {
        let user = urlencode(&self.username);
        let pass = urlencode(&self.password);
        format!(
            "mongodb://{user}:{pass}@{ip}:{port}/{db}",
            user = user,
            pass = pass,
            ip = self.ip,
            port = self.port,
            db = self.db
        )
    }
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub sink: String,
    pub rotation: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            sink: "logs/contest_predictor.log".to_string(),
            rotation: "daily".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Contract for the read-API collaborator (not implemented by this crate);
/// parsed for forward compatibility, unused by core logic (SPEC_FULL.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub cors_allow_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Logic(format!("reading config {path:?}: {e}")))?;
        toml::from_str(&contents)
            .map_err(|e| PipelineError::Logic(format!("parsing config {path:?}: {e}")))
    }

    /// Default path: `CONTEST_PREDICTOR_CONFIG` env var, else `./config.toml`.
    pub fn default_path() -> PathBuf {
        std::env::var("CONTEST_PREDICTOR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Initializes the global config exactly once. Returns an error if called twice.
    pub fn install(self) -> Result<(), PipelineError> {
        CONFIG
            .set(self)
            .map_err(|_| PipelineError::Logic("config already installed".into()))
    }

    /// Retrieves the globally installed config. Panics if `install` was never called,
    /// since this indicates a startup-ordering bug rather than a recoverable error.
    pub fn get() -> &'static Config {
        CONFIG.get().expect("config not installed before use")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            mongodb: MongoConfig {
                ip: "localhost".into(),
                port: 27017,
                username: "user name".into(),
                password: "p@ss".into(),
                db: "lccn_predictor".into(),
            },
            logging: LoggingConfig::default(),
            api: ApiConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    #[test]
    fn connection_string_percent_encodes_credentials() {
        let cfg = sample();
        let cs = cfg.mongodb.connection_string();
        assert!(cs.contains("user%20name"));
        assert!(cs.contains("p%40ss"));
        assert!(cs.starts_with("mongodb://"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = sample();
        let toml_str = toml::to_string(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.mongodb.db, cfg.mongodb.db);
        assert_eq!(parsed.scheduler.tick_interval_secs, 60);
    }

    #[test]
    fn logging_defaults_when_absent() {
        let toml_str = r#"
            [mongodb]
            ip = "localhost"
            port = 27017
            username = "u"
            password = "p"
            db = "d"
        "#;
        let parsed: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.logging.level, "info");
        assert_eq!(parsed.scheduler.tick_interval_secs, 60);
    }
}
