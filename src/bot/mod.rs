//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `commands`: Parses slash commands
//! - `message_handler`: Handles commands and captioned photos
//! - `callback_handler`: Handles the reset confirmation keyboard
//! - `dialogue_manager`: Starts and resolves the reset dialogue
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod commands;
pub mod dialogue_manager;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use commands::BotCommand;
