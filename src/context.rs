//! Process-wide state built once at startup and handed to every handler

use anyhow::{Context, Result};

use crate::config::BotConfig;
use crate::db::ScoreStore;
use crate::localization::LocalizationManager;

pub struct AppContext {
    pub store: ScoreStore,
    pub messages: LocalizationManager,
}

impl AppContext {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let messages = LocalizationManager::new().context("Failed to load bot messages")?;
        let store = ScoreStore::new(&config.storage_root);

        Ok(Self { store, messages })
    }
}
