use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::persist::PersistenceMode;

/// Name of the configuration file looked for when `TAGDB_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "tagdb";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// SQLite database file, ignored when `in_memory` is set.
    pub database_file: String,
    pub in_memory: bool,
    pub host: String,
    pub port: u16,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Settings {
    /// Defaults, then the configuration file, then `TAGDB_*` environment variables.
    pub fn load() -> Result<Self> {
        let file = std::env::var("TAGDB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file)
    }

    /// Same as [`Settings::load`] with an explicit configuration file. A missing
    /// file is not an error.
    pub fn load_from(file: &str) -> Result<Self> {
        let config = Config::builder()
            .set_default("database_file", "/tmp/db.sql")?
            .set_default("in_memory", false)?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("log_level", "info")?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("TAGDB").try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        if self.in_memory {
            PersistenceMode::InMemory
        } else {
            PersistenceMode::File(self.database_file.clone())
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
