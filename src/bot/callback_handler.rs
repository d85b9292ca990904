//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error};

use crate::context::AppContext;
use crate::dialogue::ResetDialogue;

use super::dialogue_manager::handle_reset_answer;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<AppContext>,
    dialogue: ResetDialogue,
) -> Result<()> {
    debug!(member = q.from.id.0, data = ?q.data, "Received callback query");

    let notice = match handle_reset_answer(&bot, &q, &ctx, dialogue).await {
        Ok(notice) => notice,
        Err(e) => {
            error!(handler = "reset_confirm", member = q.from.id.0, error = ?e, "Handler failed");
            None
        }
    };

    // Answer the callback query to remove the loading state
    let answer = bot.answer_callback_query(q.id.clone());
    let answer = match notice {
        Some(text) => answer.text(text).show_alert(true),
        None => answer,
    };
    if let Err(e) = answer.await {
        error!(member = q.from.id.0, error = %e, "Failed to answer callback query");
    }

    Ok(())
}
