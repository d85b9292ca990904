//! Leaderboard queries and text rendering

use crate::db::{GroupId, ScoreStore};
use crate::errors::StoreError;
use crate::localization::LocalizationManager;

/// One ranked row: a member identifier and the counter being ranked
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub identifier: String,
    pub count: i64,
}

impl LeaderboardEntry {
    pub fn new(identifier: impl Into<String>, count: i64) -> Self {
        Self {
            identifier: identifier.into(),
            count,
        }
    }
}

/// Which counter a leaderboard ranks by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Spot,
    Caught,
}

/// Render entries as `"<rank>) <identifier> - <count>"` lines, rank starting at 1
pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut result = String::new();

    for (i, entry) in entries.iter().enumerate() {
        result.push_str(&format!("{}) {} - {}\n", i + 1, entry.identifier, entry.count));
    }

    result
}

/// Build the reply for a leaderboard command.
///
/// Never creates a store: a group without one gets the "no data" message.
pub async fn leaderboard_reply(
    store: &ScoreStore,
    messages: &LocalizationManager,
    group: GroupId,
    board: Board,
) -> Result<String, StoreError> {
    let Some(mut handle) = store.open_existing(group).await? else {
        return Ok(messages.t("no-data"));
    };

    let entries = match board {
        Board::Spot => handle.leaderboard_by_spot().await?,
        Board::Caught => handle.leaderboard_by_caught().await?,
    };
    handle.close().await?;

    if entries.is_empty() {
        return Ok(messages.t("no-data"));
    }

    Ok(format_leaderboard(&entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_formatting() {
        let entries = vec![LeaderboardEntry::new("alice", 3), LeaderboardEntry::new("bob", 1)];
        assert_eq!(format_leaderboard(&entries), "1) alice - 3\n2) bob - 1\n");
    }

    #[test]
    fn test_empty_leaderboard_is_empty_string() {
        assert_eq!(format_leaderboard(&[]), "");
    }

    #[test]
    fn test_rank_follows_input_order() {
        let entries = vec![
            LeaderboardEntry::new("zed", 0),
            LeaderboardEntry::new("Jane Doe", 7),
        ];
        assert_eq!(format_leaderboard(&entries), "1) zed - 0\n2) Jane Doe - 7\n");
    }
}
