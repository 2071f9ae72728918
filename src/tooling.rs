//! Tooling & Integration Layer
//!
//! CLI front end for ingesting, inspecting and exporting workspace trees.

pub mod cli;

pub use cli::{Cli, CliContext, Commands, HistoryCommands};
