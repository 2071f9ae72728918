//! Tree node types

use crate::types::{NodeId, DS_STORE, ROOT_ID, ROOT_NAME, ROOT_PATH};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    /// Classify a path segment.
    ///
    /// A segment is a file iff it is the last segment of its path and contains a `.`.
    /// Extensionless files such as `bin/run` are therefore folders.
    pub fn classify(segment: &str, is_last: bool) -> Self {
        if is_last && segment.contains('.') {
            NodeKind::File
        } else {
            NodeKind::Folder
        }
    }
}

/// TreeNode: one file or folder entry of the node table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub path: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub content: String,
}

impl TreeNode {
    /// The synthetic root. Holds every top-level entry in `children`.
    pub fn root(children: Vec<NodeId>) -> Self {
        Self {
            id: ROOT_ID,
            name: ROOT_NAME.to_string(),
            kind: NodeKind::Folder,
            path: ROOT_PATH.to_string(),
            parent: None,
            children,
            content: String::new(),
        }
    }

    pub fn folder(
        id: NodeId,
        name: impl Into<String>,
        path: impl Into<String>,
        parent: NodeId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Folder,
            path: path.into(),
            parent: Some(parent),
            children: Vec::new(),
            content: String::new(),
        }
    }

    pub fn file(
        id: NodeId,
        name: impl Into<String>,
        path: impl Into<String>,
        parent: NodeId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::File,
            path: path.into(),
            parent: Some(parent),
            children: Vec::new(),
            content: content.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Whether the node shows up in listings and keyboard navigation
    pub fn is_listed(&self) -> bool {
        self.name != DS_STORE
    }

    /// Apply a partial update field by field
    pub fn merge(&mut self, patch: &NodePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(path) = &patch.path {
            self.path = path.clone();
        }
        if let Some(parent) = patch.parent {
            self.parent = parent;
        }
        if let Some(children) = &patch.children {
            self.children = children.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
    }
}

/// Path of a child named `name` under `parent_path`.
///
/// Top-level entries carry their bare name since the root path is a sentinel.
pub fn child_path(parent: &TreeNode, name: &str) -> String {
    if parent.is_root() {
        name.to_string()
    } else {
        format!("{}/{}", parent.path, name)
    }
}

/// Construction-time sibling order: folders before files, then by name
pub fn sibling_order(a: (NodeKind, &str), b: (NodeKind, &str)) -> Ordering {
    match (a.0, b.0) {
        (NodeKind::Folder, NodeKind::File) => Ordering::Less,
        (NodeKind::File, NodeKind::Folder) => Ordering::Greater,
        _ => a.1.cmp(b.1),
    }
}

/// Shallow partial update for `update_node`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Option<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NodePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dot_rule() {
        assert_eq!(NodeKind::classify("index.js", true), NodeKind::File);
        assert_eq!(NodeKind::classify(".env", true), NodeKind::File);
        assert_eq!(NodeKind::classify("bin", true), NodeKind::Folder);
        assert_eq!(NodeKind::classify("v1.2", false), NodeKind::Folder);
    }

    #[test]
    fn test_sibling_order_folders_first() {
        assert_eq!(
            sibling_order((NodeKind::Folder, "z"), (NodeKind::File, "a.js")),
            Ordering::Less
        );
        assert_eq!(
            sibling_order((NodeKind::File, "index.js"), (NodeKind::File, "package.json")),
            Ordering::Less
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut node = TreeNode::file(3, "a.js", "proj/a.js", 1, "old");
        node.merge(&NodePatch::content("new"));
        assert_eq!(node.content, "new");
        assert_eq!(node.name, "a.js");
        assert_eq!(node.parent, Some(1));
    }

    #[test]
    fn test_child_path_of_root_is_bare_name() {
        let root = TreeNode::root(vec![]);
        assert_eq!(child_path(&root, "proj"), "proj");
        let proj = TreeNode::folder(1, "proj", "proj", 0);
        assert_eq!(child_path(&proj, "src"), "proj/src");
    }
}
