//! Tokenmix: mixed-model token generation
//!
//! Generates a completion one token at a time, alternating between a large (primary) and a
//! small (secondary) backend according to a deterministic schedule. Both backends see the
//! full accumulated context on every call; only the source of each token changes.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod schedule;
