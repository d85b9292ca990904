//! Process configuration loaded from the environment

use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_API_TOKEN";
pub const LEGACY_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const STORAGE_ROOT_VAR: &str = "SPOTBOT_STORAGE_ROOT";
pub const LOG_FORMAT_VAR: &str = "SPOTBOT_LOG_FORMAT";

const DEFAULT_STORAGE_ROOT: &str = "databases";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    /// Directory holding one score database per group
    pub storage_root: PathBuf,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Read the configuration from the process environment.
    ///
    /// Call `dotenv::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .or_else(|| lookup(LEGACY_TOKEN_VAR))
            .filter(|token| !token.trim().is_empty())
            .with_context(|| format!("{TOKEN_VAR} must be set"))?;

        let storage_root = lookup(STORAGE_ROOT_VAR)
            .filter(|root| !root.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_ROOT.to_string());

        let log_format = match lookup(LOG_FORMAT_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("{LOG_FORMAT_VAR} must be 'text' or 'json', got '{other}'"),
        };

        Ok(Self {
            token,
            storage_root: PathBuf::from(storage_root),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_token_fails() {
        let err = BotConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains(TOKEN_VAR));
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup_from(&[(TOKEN_VAR, "123:abc")])).unwrap();
        assert_eq!(config.token, "123:abc");
        assert_eq!(config.storage_root, PathBuf::from("databases"));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_legacy_token_and_overrides() {
        let config = BotConfig::from_lookup(lookup_from(&[
            (LEGACY_TOKEN_VAR, "456:def"),
            (STORAGE_ROOT_VAR, "/var/lib/spotbot"),
            (LOG_FORMAT_VAR, "json"),
        ]))
        .unwrap();
        assert_eq!(config.token, "456:def");
        assert_eq!(config.storage_root, PathBuf::from("/var/lib/spotbot"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_format_fails() {
        let result =
            BotConfig::from_lookup(lookup_from(&[(TOKEN_VAR, "1:a"), (LOG_FORMAT_VAR, "xml")]));
        assert!(result.is_err());
    }
}
