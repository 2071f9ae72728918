//! Error types for the workspace file tree.

use crate::types::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Invariant violations raised by the node table, state machine and navigation.
///
/// These indicate a programming or data error and halt the triggering operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node with id={0} doesn't exist in the tree")]
    NodeNotFound(NodeId),

    #[error("Tree data must contain a root node")]
    RootMissing,

    #[error("Parent {parent} of node {node} doesn't exist in the tree")]
    ParentNotFound { node: NodeId, parent: NodeId },

    #[error("Parent {parent} of node {node} is not a folder")]
    ParentNotFolder { node: NodeId, parent: NodeId },

    #[error("Node id {0} is already in use")]
    DuplicateNodeId(NodeId),

    #[error("Node {0} has no parent to link under")]
    MissingParent(NodeId),

    #[error("Unreachable tree state: {0}")]
    Unreachable(&'static str),
}

/// Per-entry ingestion failures. The failing entry is skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Entry path has no usable segments")]
    EmptyPath,

    #[error("Failed to read content of {path}: {source}")]
    ContentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {0} is already a file and cannot hold children")]
    PathConflict(String),

    #[error("Failed to scan directory {path:?}: {message}")]
    Scan { path: PathBuf, message: String },
}

/// Persistence medium errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Crate-level error for configuration, logging and CLI paths
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Mount path not found: {0}")]
    PathNotInTree(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
