//! Integration tests for the workspace file tree

mod cli_workflow;
mod export_round_trip;
mod navigation_properties;
mod tree_scenarios;
