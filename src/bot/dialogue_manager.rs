//! Dialogue Manager module for the reset confirmation flow

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::dialogue::{ResetDialogue, ResetDialogueState};
use crate::errors::StoreError;
use crate::reset::{
    decide_reset_answer, request_reset, resolve_reset, MemberRole, ResetAnswer, ResetRequest,
};

use super::ui_builder::create_reset_keyboard;

/// Handle `/reset`: either refuse right away or ask the admin to confirm
pub async fn handle_reset_command(
    bot: &Bot,
    msg: &Message,
    ctx: &AppContext,
    dialogue: ResetDialogue,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let now = Utc::now();
    let pending = dialogue
        .get()
        .await?
        .is_some_and(|state| state.is_pending_at(now));
    let in_group = msg.chat.is_group() || msg.chat.is_supergroup();

    let request = request_reset(&ctx.store, msg.chat.id.0, in_group, pending, move || async move {
        let member = bot.get_chat_member(msg.chat.id, user.id).await?;
        Ok::<_, anyhow::Error>(MemberRole::from_chat_member(&member))
    })
    .await?;

    info!(
        handler = "reset",
        group = msg.chat.id.0,
        member = user.id.0,
        request = ?request,
        "Reset requested"
    );

    match request {
        ResetRequest::Confirm => {
            let sent_message = bot
                .send_message(msg.chat.id, ctx.messages.t(request.reply_key()))
                .reply_markup(create_reset_keyboard(&ctx.messages))
                .await?;

            dialogue
                .update(ResetDialogueState::AwaitingConfirmation {
                    initiator: user.id.0,
                    prompt_message_id: sent_message.id.0,
                    requested_at: now,
                })
                .await?;
        }
        _ => {
            bot.send_message(msg.chat.id, ctx.messages.t(request.reply_key()))
                .await?;
        }
    }

    Ok(())
}

/// Resolve the reset dialogue from a keyboard press.
///
/// Returns a notice for the pressing user when the press was not accepted.
pub async fn handle_reset_answer(
    bot: &Bot,
    q: &CallbackQuery,
    ctx: &AppContext,
    dialogue: ResetDialogue,
) -> Result<Option<String>> {
    let Some(msg) = &q.message else {
        return Ok(None);
    };
    let chat_id = msg.chat().id;

    let state = dialogue.get().await?.unwrap_or_default();
    let answer = decide_reset_answer(
        &state,
        msg.id().0,
        q.from.id.0,
        q.data.as_deref(),
        Utc::now(),
    );

    match answer {
        ResetAnswer::Ignore => {
            debug!(group = chat_id.0, member = q.from.id.0, "Callback without a matching reset prompt");
            return Ok(None);
        }
        ResetAnswer::NotInitiator => {
            return Ok(Some(ctx.messages.t("reset-not-initiator")));
        }
        ResetAnswer::Expired | ResetAnswer::Resolve(_) => {}
    }

    // The prompt must not be answerable twice
    if let Err(e) = bot
        .edit_message_reply_markup(chat_id, msg.id())
        .await
    {
        warn!(group = chat_id.0, error = %e, "Failed to remove reset keyboard");
    }
    dialogue.exit().await?;

    let ResetAnswer::Resolve(choice) = answer else {
        bot.send_message(chat_id, ctx.messages.t("reset-expired"))
            .await?;
        return Ok(None);
    };

    let reply = match resolve_reset(&ctx.store, chat_id.0, choice).await {
        Ok(outcome) => {
            info!(
                handler = "reset_confirm",
                group = chat_id.0,
                member = q.from.id.0,
                outcome = ?outcome,
                "Reset resolved"
            );
            ctx.messages.t(outcome.reply_key())
        }
        Err(StoreError::Missing(group)) => {
            warn!(handler = "reset_confirm", group, "Score store vanished before reset");
            ctx.messages.t("no-data")
        }
        Err(e) => {
            error!(handler = "reset_confirm", group = chat_id.0, error = %e, "Failed to reset scores");
            ctx.messages.t("error-store")
        }
    };

    bot.send_message(chat_id, reply).await?;
    Ok(None)
}
