//! Filetree: Workspace File Tree
//!
//! Ingests uploaded filesystem entries into a flat node table, drives it through a pure
//! action reducer, computes accessible keyboard navigation over visible rows, and exports
//! a nested mount tree for a sandboxed execution host.

pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
