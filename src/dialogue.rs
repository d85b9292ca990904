//! Reset confirmation dialogue state, one per group chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

pub const RESET_YES_DATA: &str = "reset_yes";
pub const RESET_NO_DATA: &str = "reset_no";

/// An unanswered confirmation is abandoned after this many seconds
pub const RESET_CONFIRMATION_TTL_SECS: i64 = 600;

/// Represents the state of a group's reset confirmation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetDialogueState {
    #[default]
    Idle,
    AwaitingConfirmation {
        /// User id of the admin who asked for the reset
        initiator: u64,
        /// Message carrying the yes/no keyboard
        prompt_message_id: i32,
        requested_at: DateTime<Utc>,
    },
}

impl ResetDialogueState {
    /// Whether a confirmation is still waiting for an answer at `now`
    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            ResetDialogueState::Idle => false,
            ResetDialogueState::AwaitingConfirmation { requested_at, .. } => {
                (now - *requested_at).num_seconds() < RESET_CONFIRMATION_TTL_SECS
            }
        }
    }
}

/// Type alias for our reset dialogue
pub type ResetDialogue = Dialogue<ResetDialogueState, InMemStorage<ResetDialogueState>>;

/// Answer picked on the confirmation keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetChoice {
    Yes,
    No,
}

impl ResetChoice {
    /// Anything but an explicit yes counts as no
    pub fn from_callback_data(data: Option<&str>) -> Self {
        match data {
            Some(RESET_YES_DATA) => ResetChoice::Yes,
            _ => ResetChoice::No,
        }
    }

    pub fn callback_data(self) -> &'static str {
        match self {
            ResetChoice::Yes => RESET_YES_DATA,
            ResetChoice::No => RESET_NO_DATA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parsing() {
        assert_eq!(ResetChoice::from_callback_data(Some("reset_yes")), ResetChoice::Yes);
        assert_eq!(ResetChoice::from_callback_data(Some("reset_no")), ResetChoice::No);
        assert_eq!(ResetChoice::from_callback_data(Some("edit_0")), ResetChoice::No);
        assert_eq!(ResetChoice::from_callback_data(None), ResetChoice::No);
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(ResetDialogueState::default(), ResetDialogueState::Idle);
        assert!(!ResetDialogueState::Idle.is_pending_at(Utc::now()));
    }

    #[test]
    fn test_confirmation_expires() {
        let requested_at = Utc::now();
        let state = ResetDialogueState::AwaitingConfirmation {
            initiator: 1,
            prompt_message_id: 10,
            requested_at,
        };

        assert!(state.is_pending_at(requested_at));
        assert!(state.is_pending_at(requested_at + chrono::Duration::seconds(599)));
        assert!(!state.is_pending_at(requested_at + chrono::Duration::seconds(600)));
    }
}
