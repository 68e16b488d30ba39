//! King's Duel - two-player fighting game simulation core
//!
//! The `game` modules hold the deterministic per-frame simulation; `host`
//! runs one session of it behind a JSON-lines protocol.

pub mod config;
pub mod game;
pub mod host;
pub mod util;
