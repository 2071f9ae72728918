//! Core types for the workspace file tree.

/// NodeId: flat, table-wide identifier assigned monotonically at creation
pub type NodeId = u64;

/// Id of the synthetic root node
pub const ROOT_ID: NodeId = 0;

/// Reserved path of the synthetic root node
pub const ROOT_PATH: &str = "//root";

/// Display name of the synthetic root node
pub const ROOT_NAME: &str = "root";

/// Placeholder entry kept in the table but hidden from listings and navigation
pub const DS_STORE: &str = ".DS_Store";
