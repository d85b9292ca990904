//! # SpotBot
//!
//! A Telegram bot for group "spotting" games: post a photo, tag the people in it, and the
//! bot keeps per-group tallies of who spotted whom.

pub mod bot;
pub mod config;
pub mod context;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod leaderboard;
pub mod localization;
pub mod logging;
pub mod reset;
pub mod spot;
