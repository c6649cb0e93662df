use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

const DEFAULT_DATABASE: &str = "moodiary";
const DEFAULT_SESSIONS_COLLECTION: &str = "sessions";
const DEFAULT_USERS_COLLECTION: &str = "users";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} is malformed: {reason}")]
    Malformed { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database: String,
    pub sessions_collection: String,
    pub users_collection: String,
    pub color_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mongodb_uri = var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?;
        if !(mongodb_uri.starts_with("mongodb://") || mongodb_uri.starts_with("mongodb+srv://")) {
            return Err(ConfigError::Malformed {
                key: "MONGODB_URI",
                reason: "expected a mongodb:// or mongodb+srv:// connection string".to_string(),
            });
        }

        Ok(Self {
            mongodb_uri,
            database: or_default(var("DB_NAME"), "DB_NAME", DEFAULT_DATABASE),
            sessions_collection: or_default(
                var("SESSIONS_COLLECTION"),
                "SESSIONS_COLLECTION",
                DEFAULT_SESSIONS_COLLECTION,
            ),
            users_collection: or_default(
                var("USERS_COLLECTION"),
                "USERS_COLLECTION",
                DEFAULT_USERS_COLLECTION,
            ),
            color_table_path: var("COLOR_TABLE_PATH").map(PathBuf::from),
        })
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
