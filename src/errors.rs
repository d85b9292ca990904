//! # Store Error Types Module
//!
//! Errors raised by the per-group score store. Handler-level failures use `anyhow`;
//! these are the typed failures the handlers match on to pick a user-facing reply.

use thiserror::Error;

use crate::db::GroupId;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The group has no score store (nothing recorded, or already reset)
    #[error("no score store exists for group {0}")]
    Missing(GroupId),
    /// A spot must credit the sender with at least one mention
    #[error("spot increment must be at least 1, got {0}")]
    InvalidIncrement(usize),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}
