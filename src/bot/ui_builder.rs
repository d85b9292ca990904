//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::dialogue::ResetChoice;
use crate::localization::LocalizationManager;

/// Welcome text for /start and /help
pub fn help_message(messages: &LocalizationManager) -> String {
    [
        "welcome-title",
        "welcome-description",
        "help-spot",
        "help-spotboard",
        "help-caughtboard",
        "help-reset",
    ]
    .iter()
    .map(|key| messages.t(key))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Yes/No keyboard attached to the reset confirmation prompt
pub fn create_reset_keyboard(messages: &LocalizationManager) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            format!("✅ {}", messages.t("reset-yes")),
            ResetChoice::Yes.callback_data(),
        ),
        InlineKeyboardButton::callback(
            format!("❌ {}", messages.t("reset-no")),
            ResetChoice::No.callback_data(),
        ),
    ]])
}
