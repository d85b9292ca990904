//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Me;
use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::dialogue::ResetDialogue;
use crate::leaderboard::{leaderboard_reply, Board};
use crate::spot::{classify_message, process_spot, Classification};

use super::commands::BotCommand;
use super::dialogue_manager::handle_reset_command;
use super::ui_builder::help_message;

/// Log a failed handler run and swallow the error so dispatching goes on
fn log_handler_failure(handler: &str, msg: &Message, result: Result<()>) {
    if let Err(e) = result {
        error!(
            handler,
            group = msg.chat.id.0,
            member = ?msg.from.as_ref().map(|user| user.id.0),
            error = ?e,
            "Handler failed"
        );
    }
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    ctx: &AppContext,
    dialogue: ResetDialogue,
    command: BotCommand,
) -> Result<()> {
    info!(
        handler = command.handler_name(),
        group = msg.chat.id.0,
        member = ?msg.from.as_ref().map(|user| user.id.0),
        "Received command"
    );

    match command {
        BotCommand::Start | BotCommand::Help => {
            bot.send_message(msg.chat.id, help_message(&ctx.messages))
                .await?;
        }
        BotCommand::Spotboard => send_leaderboard(bot, msg, ctx, Board::Spot).await?,
        BotCommand::Caughtboard => send_leaderboard(bot, msg, ctx, Board::Caught).await?,
        BotCommand::Reset => handle_reset_command(bot, msg, ctx, dialogue).await?,
    }

    Ok(())
}

async fn send_leaderboard(bot: &Bot, msg: &Message, ctx: &AppContext, board: Board) -> Result<()> {
    let reply = match leaderboard_reply(&ctx.store, &ctx.messages, msg.chat.id.0, board).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(group = msg.chat.id.0, board = ?board, error = %e, "Failed to read leaderboard");
            ctx.messages.t("error-store")
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_photo_message(bot: &Bot, msg: &Message, ctx: &AppContext) -> Result<()> {
    let event = match classify_message(msg) {
        Classification::Spot(event) => event,
        Classification::NotQualified => {
            debug!(group = msg.chat.id.0, "Photo without mentions ignored");
            return Ok(());
        }
    };

    info!(
        handler = "spot",
        group = event.group,
        member = %event.sender,
        "Processing spot"
    );

    let reply = match process_spot(&ctx.store, &ctx.messages, &event).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(handler = "spot", group = event.group, error = %e, "Failed to record spot");
            ctx.messages.t("error-store")
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    me: Me,
    ctx: Arc<AppContext>,
    dialogue: ResetDialogue,
) -> Result<()> {
    if let Some(text) = msg.text() {
        if let Some(command) = BotCommand::parse(text, Some(me.username())) {
            let result = handle_command(&bot, &msg, &ctx, dialogue, command).await;
            log_handler_failure(command.handler_name(), &msg, result);
        }
    } else if msg.photo().is_some() {
        let result = handle_photo_message(&bot, &msg, &ctx).await;
        log_handler_failure("spot", &msg, result);
    }

    Ok(())
}
