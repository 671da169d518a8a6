//! Command-line host for the tournament engine.
//!
//! Parses a subcommand, runs it against the SQLite store and renders the
//! result as text.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
