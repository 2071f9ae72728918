//! Workspace Tree
//!
//! Flat node table, pure reducer, accessible navigation and the controller that binds
//! user intents to them. Ingestion builds the table and the mount export.

pub mod controller;
pub mod ingest;
pub mod mount;
pub mod navigation;
pub mod node;
pub mod state;
pub mod table;

pub use controller::{
    ControllerOptions, Creation, CreationOutcome, Key, NameError, Signal, TreeController,
};
pub use ingest::{ingest, scan_directory, ContentReader, Entry, FsContentReader, Ingestion};
pub use mount::{MountEntry, MountTree};
pub use node::{NodeKind, NodePatch, TreeNode};
pub use state::{reduce, Action, TreeState};
pub use table::{NodeTable, TableReport};
