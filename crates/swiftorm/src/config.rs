//! Database settings.
//!
//! Settings are a JSON document with a `databases` map (keyed by alias, one of
//! which must be `"default"`) and an optional `installed_apps` list. The upper
//! case keys `DATABASES` / `INSTALLED_APPS` are accepted as aliases.
//!
//! ```
//! use swiftorm::config::Settings;
//!
//! let settings = Settings::from_json_str(r#"{
//!     "DATABASES": {
//!         "default": {
//!             "engine": "swiftorm.backends.postgresql.PostgresEngine",
//!             "user": "myuser",
//!             "password": "mypassword",
//!             "database": "mydb",
//!             "host": "localhost",
//!             "port": 5432
//!         }
//!     },
//!     "INSTALLED_APPS": ["blog"]
//! }"#).unwrap();
//! let db = settings.default_database().unwrap();
//! assert_eq!(db.database, "mydb");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swiftorm_core::{Error, Result};

/// Short engine name.
pub const POSTGRES_ENGINE: &str = "postgresql";

/// Dotted engine path accepted for compatibility with existing settings files.
pub const POSTGRES_ENGINE_PATH: &str = "swiftorm.backends.postgresql.PostgresEngine";

fn default_engine() -> String {
    POSTGRES_ENGINE.to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    5432
}

/// Connection parameters for one database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Engine identifier; must name the PostgreSQL engine.
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login role.
    #[serde(default)]
    pub user: String,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
    /// Database name.
    pub database: String,
}

impl DatabaseConfig {
    /// Config for `database` on `localhost:5432`.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            engine: default_engine(),
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: None,
            database: database.into(),
        }
    }

    /// Set the engine identifier.
    #[must_use]
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the user.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Fail unless `engine` names the PostgreSQL engine.
    pub fn check_engine(&self) -> Result<()> {
        match self.engine.as_str() {
            POSTGRES_ENGINE | POSTGRES_ENGINE_PATH => Ok(()),
            other => Err(Error::Config(format!(
                "unsupported database engine '{other}' (expected '{POSTGRES_ENGINE}')"
            ))),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

/// Top-level settings document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Database configs by alias.
    #[serde(alias = "DATABASES")]
    pub databases: HashMap<String, DatabaseConfig>,
    /// Application names whose schemas are registered at startup.
    #[serde(default, alias = "INSTALLED_APPS")]
    pub installed_apps: Vec<String>,
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid settings: {e}")))
    }

    /// Read and parse a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read settings file {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// The `"default"` database entry.
    pub fn default_database(&self) -> Result<&DatabaseConfig> {
        self.database("default")
    }

    /// A database entry by alias.
    pub fn database(&self, alias: &str) -> Result<&DatabaseConfig> {
        self.databases
            .get(alias)
            .ok_or_else(|| Error::Config(format!("no '{alias}' entry in databases")))
    }
}
