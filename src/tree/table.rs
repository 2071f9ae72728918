//! Node Table
//!
//! Flat arena of tree nodes keyed by id. Parent/child relations are id references,
//! never owned nesting, so the table can be cloned, diffed and serialized as a list.

use crate::error::TreeError;
use crate::tree::node::{sibling_order, TreeNode};
use crate::types::{NodeId, ROOT_ID};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// NodeTable: id -> node, iterated in id order (root first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<TreeNode>", try_from = "Vec<TreeNode>")]
pub struct NodeTable {
    nodes: BTreeMap<NodeId, TreeNode>,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTable {
    /// A table holding only the synthetic root
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_ID, TreeNode::root(Vec::new()));
        NodeTable { nodes }
    }

    /// Build a table from a node list. Requires a root and unique ids.
    pub fn from_nodes(list: Vec<TreeNode>) -> Result<Self, TreeError> {
        let mut nodes = BTreeMap::new();
        for node in list {
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(TreeError::DuplicateNodeId(id));
            }
        }
        match nodes.get(&ROOT_ID) {
            Some(root) if root.is_root() => Ok(NodeTable { nodes }),
            _ => Err(TreeError::RootMissing),
        }
    }

    pub fn root(&self) -> Result<&TreeNode, TreeError> {
        self.nodes.get(&ROOT_ID).ok_or(TreeError::RootMissing)
    }

    pub(crate) fn root_mut(&mut self) -> Result<&mut TreeNode, TreeError> {
        self.nodes.get_mut(&ROOT_ID).ok_or(TreeError::RootMissing)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn get_or_error(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }

    /// Append a node. Does not touch any parent's `children`.
    pub(crate) fn insert(&mut self, node: TreeNode) -> Result<(), TreeError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TreeError::DuplicateNodeId(node.id));
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<TreeNode> {
        self.nodes.remove(&id)
    }

    /// Largest id in use (0 for a root-only table)
    pub fn max_id(&self) -> NodeId {
        self.nodes.keys().next_back().copied().unwrap_or(ROOT_ID)
    }

    /// Next free id: max existing id + 1
    pub fn next_id(&self) -> NodeId {
        self.max_id() + 1
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.get_or_error(id)?.children)
    }

    /// Children that show up in listings, skipping `.DS_Store` placeholders
    pub fn listed_children(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut listed = Vec::new();
        for &child in self.children(id)? {
            if self.get_or_error(child)?.is_listed() {
                listed.push(child);
            }
        }
        Ok(listed)
    }

    /// Find a direct child of `parent` by exact name
    pub fn child_named(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, TreeError> {
        for &child in self.children(parent)? {
            if self.get_or_error(child)?.name == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Re-apply construction order (folders first, then names) to every folder
    pub(crate) fn sort_all_children(&mut self) -> Result<(), TreeError> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            let mut children = self.children(id)?.to_vec();
            let mut keyed = Vec::with_capacity(children.len());
            for child in &children {
                let node = self.get_or_error(*child)?;
                keyed.push((node.kind, node.name.clone(), *child));
            }
            keyed.sort_by(|a, b| sibling_order((a.0, &a.1), (b.0, &b.1)));
            children = keyed.into_iter().map(|(_, _, id)| id).collect();
            if let Some(node) = self.get_mut(id) {
                node.children = children;
            }
        }
        Ok(())
    }

    /// Ids of nodes whose parent chain does not terminate at root
    pub fn orphans(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| !node.is_root() && !self.reaches_root(node.id))
            .map(|node| node.id)
            .collect()
    }

    /// Follow `parent` links from `id`; true if root is reached without a cycle or gap
    pub fn reaches_root(&self, id: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut current = id;
        loop {
            if current == ROOT_ID {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            match self.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Check the structural invariants of the table.
    ///
    /// Orphans and root double-links are reported as warnings since the state machine
    /// produces both on purpose.
    pub fn validate(&self) -> TableReport {
        let mut report = TableReport::default();
        let root = match self.root() {
            Ok(root) => root,
            Err(e) => {
                report.errors.push(e.to_string());
                return report;
            }
        };

        for node in self.nodes.values() {
            if node.children.contains(&node.id) {
                report
                    .errors
                    .push(format!("Node {} lists itself as a child", node.id));
            }
            if !node.is_folder() && !node.is_root() && !node.children.is_empty() {
                report
                    .errors
                    .push(format!("File {} has children", node.id));
            }
            let mut seen = HashSet::new();
            for child in &node.children {
                if !seen.insert(child) {
                    report
                        .errors
                        .push(format!("Node {} lists child {} twice", node.id, child));
                }
                if !self.contains(*child) {
                    report
                        .errors
                        .push(format!("Node {} references missing child {}", node.id, child));
                }
            }
            match node.parent {
                None if node.id != ROOT_ID => report
                    .errors
                    .push(format!("Node {} has no parent", node.id)),
                Some(parent) => match self.nodes.get(&parent) {
                    Some(p) if p.is_folder() => {
                        if !p.children.contains(&node.id) {
                            report.warnings.push(format!(
                                "Node {} is not listed by its parent {}",
                                node.id, parent
                            ));
                        }
                        if parent != ROOT_ID && root.children.contains(&node.id) {
                            report
                                .warnings
                                .push(format!("Node {} is also linked under root", node.id));
                        }
                    }
                    Some(_) => report.errors.push(format!(
                        "Parent {} of node {} is not a folder",
                        parent, node.id
                    )),
                    None => report.warnings.push(format!(
                        "Node {} is orphaned (parent {} was deleted)",
                        node.id, parent
                    )),
                },
                None => {}
            }
        }
        report
    }
}

impl From<NodeTable> for Vec<TreeNode> {
    fn from(table: NodeTable) -> Self {
        table.nodes.into_values().collect()
    }
}

impl TryFrom<Vec<TreeNode>> for NodeTable {
    type Error = TreeError;

    fn try_from(list: Vec<TreeNode>) -> Result<Self, Self::Error> {
        NodeTable::from_nodes(list)
    }
}

/// Result of `NodeTable::validate`
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TableReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
