//! Decisions of the reset confirmation flow.
//!
//! The Telegram side (keyboards, dialogue storage) lives in `bot`; this module only decides
//! what happens so it can be exercised without a bot.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use teloxide::types::ChatMember;

use crate::db::{GroupId, ScoreStore};
use crate::dialogue::{ResetChoice, ResetDialogueState};
use crate::errors::StoreError;

/// A member's standing in the group, as far as resetting is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
}

impl MemberRole {
    pub fn from_chat_member(member: &ChatMember) -> Self {
        if member.kind.is_owner() {
            MemberRole::Owner
        } else if member.kind.is_administrator() {
            MemberRole::Administrator
        } else {
            MemberRole::Member
        }
    }

    pub fn can_reset(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }
}

/// What to do with a `/reset` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequest {
    GroupOnly,
    NoData,
    AlreadyPending,
    Denied,
    /// Ask the admin to confirm
    Confirm,
}

impl ResetRequest {
    /// Message key of the reply; the confirmation prompt for `Confirm`
    pub fn reply_key(self) -> &'static str {
        match self {
            ResetRequest::GroupOnly => "reset-group-only",
            ResetRequest::NoData => "no-data",
            ResetRequest::AlreadyPending => "reset-already-pending",
            ResetRequest::Denied => "reset-denied",
            ResetRequest::Confirm => "reset-confirm-prompt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    Cancelled,
}

impl ResetOutcome {
    pub fn reply_key(self) -> &'static str {
        match self {
            ResetOutcome::Cleared => "reset-success",
            ResetOutcome::Cancelled => "reset-cancelled",
        }
    }
}

/// What to do with a press on the confirmation keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetAnswer {
    /// No flow is pending, or the press came from an older prompt
    Ignore,
    /// Someone other than the initiating admin pressed; the flow stays open
    NotInitiator,
    /// The flow timed out; drop the keyboard and say so
    Expired,
    Resolve(ResetChoice),
}

impl ResetAnswer {
    /// Whether the press closes the flow and takes the keyboard away
    pub fn closes_flow(self) -> bool {
        matches!(self, ResetAnswer::Expired | ResetAnswer::Resolve(_))
    }
}

/// Decide how to treat a keyboard press against the group's dialogue state
pub fn decide_reset_answer(
    state: &ResetDialogueState,
    pressed_message_id: i32,
    presser_id: u64,
    data: Option<&str>,
    now: DateTime<Utc>,
) -> ResetAnswer {
    let ResetDialogueState::AwaitingConfirmation {
        initiator,
        prompt_message_id,
        ..
    } = state
    else {
        return ResetAnswer::Ignore;
    };

    if pressed_message_id != *prompt_message_id {
        return ResetAnswer::Ignore;
    }
    if presser_id != *initiator {
        return ResetAnswer::NotInitiator;
    }
    if !state.is_pending_at(now) {
        return ResetAnswer::Expired;
    }

    ResetAnswer::Resolve(ResetChoice::from_callback_data(data))
}

/// Evaluate a reset request. The member's role is only looked up once every cheaper
/// check has passed.
pub async fn request_reset<F, Fut>(
    store: &ScoreStore,
    group: GroupId,
    in_group: bool,
    pending: bool,
    lookup_role: F,
) -> Result<ResetRequest>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<MemberRole>>,
{
    if !in_group {
        return Ok(ResetRequest::GroupOnly);
    }
    if !store.exists(group).await? {
        return Ok(ResetRequest::NoData);
    }
    if pending {
        return Ok(ResetRequest::AlreadyPending);
    }

    if lookup_role().await?.can_reset() {
        Ok(ResetRequest::Confirm)
    } else {
        Ok(ResetRequest::Denied)
    }
}

/// Resolve a pending reset with the admin's answer
pub async fn resolve_reset(
    store: &ScoreStore,
    group: GroupId,
    choice: ResetChoice,
) -> Result<ResetOutcome, StoreError> {
    match choice {
        ResetChoice::Yes => {
            store.destroy(group).await?;
            Ok(ResetOutcome::Cleared)
        }
        ResetChoice::No => Ok(ResetOutcome::Cancelled),
    }
}
