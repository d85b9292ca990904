//! Slash command parsing

/// Commands the bot answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Spotboard,
    Caughtboard,
    Reset,
}

impl BotCommand {
    /// Parse the first word of a message as a command.
    ///
    /// `/cmd@name` is accepted only when `name` matches `bot_username` (case-insensitively);
    /// in groups that suffix addresses one bot among several.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let first_word = text.split_whitespace().next()?;
        let command = first_word.strip_prefix('/')?;

        let name = match command.split_once('@') {
            Some((name, addressee)) => {
                if let Some(me) = bot_username {
                    if !addressee.eq_ignore_ascii_case(me) {
                        return None;
                    }
                }
                name
            }
            None => command,
        };

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(BotCommand::Start),
            "help" => Some(BotCommand::Help),
            "spotboard" => Some(BotCommand::Spotboard),
            "caughtboard" => Some(BotCommand::Caughtboard),
            "reset" => Some(BotCommand::Reset),
            _ => None,
        }
    }

    /// Handler name used in logs
    pub fn handler_name(self) -> &'static str {
        match self {
            BotCommand::Start | BotCommand::Help => "help",
            BotCommand::Spotboard => "spotboard",
            BotCommand::Caughtboard => "caughtboard",
            BotCommand::Reset => "reset",
        }
    }
}
