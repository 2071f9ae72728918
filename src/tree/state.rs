//! State Machine
//!
//! Pure reducer over the node table and the per-session derived sets. `reduce` never
//! touches external resources, so an action log can be replayed to rebuild a state.
//!
//! `AddNode` links the new id under its parent and also under root. `DeleteNode` drops
//! the id from its parent and from root's children, so a deleted node leaves no link
//! behind. Its descendants are not removed; they stay in the table as orphans that no
//! longer reach root.

use crate::error::TreeError;
use crate::tree::node::{NodePatch, TreeNode};
use crate::tree::table::NodeTable;
use crate::types::{NodeId, ROOT_ID};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tree state: node table plus ephemeral view state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeState {
    pub table: NodeTable,
    pub expanded_ids: HashSet<NodeId>,
    pub selected_ids: HashSet<NodeId>,
    /// Reserved for partial-selection rendering
    pub half_selected_ids: HashSet<NodeId>,
    /// Keyboard focus cursor
    pub tab_selected_id: Option<NodeId>,
    pub is_focused: bool,
}

impl TreeState {
    pub fn new(table: NodeTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded_ids.contains(&id)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected_ids.contains(&id)
    }

    /// The single selected node, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selected_ids.iter().next().copied()
    }

    /// Apply one action, consuming the previous state
    pub fn apply(self, action: &Action) -> Result<Self, TreeError> {
        reduce(self, action)
    }
}

/// Tree actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Expand { id: NodeId },
    Toggle { id: NodeId },
    Collapse { id: NodeId },
    Select { id: NodeId },
    ToggleSelect { id: NodeId },
    Focus { id: NodeId },
    AddNode { node: TreeNode },
    DeleteNode { node_id: NodeId },
    UpdateNode { node_id: NodeId, patch: NodePatch },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Expand { .. } => "expand",
            Action::Toggle { .. } => "toggle",
            Action::Collapse { .. } => "collapse",
            Action::Select { .. } => "select",
            Action::ToggleSelect { .. } => "toggle_select",
            Action::Focus { .. } => "focus",
            Action::AddNode { .. } => "add_node",
            Action::DeleteNode { .. } => "delete_node",
            Action::UpdateNode { .. } => "update_node",
        }
    }
}

/// `(state, action) -> state`
pub fn reduce(mut state: TreeState, action: &Action) -> Result<TreeState, TreeError> {
    match action {
        Action::Expand { id } => {
            state.expanded_ids.insert(*id);
        }
        Action::Toggle { id } => {
            if !state.expanded_ids.remove(id) {
                state.expanded_ids.insert(*id);
            }
        }
        Action::Collapse { id } => {
            state.expanded_ids.remove(id);
            state.tab_selected_id = Some(*id);
        }
        Action::Select { id } => {
            state.half_selected_ids.remove(id);
        }
        Action::ToggleSelect { id } => {
            // Selection is replaced, never extended and never toggled off.
            if !state.selected_ids.contains(id) {
                state.selected_ids.clear();
                state.selected_ids.insert(*id);
            }
        }
        Action::Focus { id } => {
            state.tab_selected_id = Some(*id);
            state.is_focused = true;
        }
        Action::AddNode { node } => add_node(&mut state.table, node.clone())?,
        Action::DeleteNode { node_id } => {
            delete_node(&mut state.table, *node_id)?;
            state.expanded_ids.remove(node_id);
            state.selected_ids.remove(node_id);
            state.half_selected_ids.remove(node_id);
            if state.tab_selected_id == Some(*node_id) {
                state.tab_selected_id = None;
            }
        }
        Action::UpdateNode { node_id, patch } => {
            if let Some(node) = state.table.get_mut(*node_id) {
                node.merge(patch);
            }
        }
    }
    Ok(state)
}

/// Link a new node under its parent and, unconditionally, under root.
///
/// Renderers enumerate root's children, so every created node is reachable from root
/// directly as well as through its real parent.
fn add_node(table: &mut NodeTable, node: TreeNode) -> Result<(), TreeError> {
    if table.contains(node.id) {
        return Err(TreeError::DuplicateNodeId(node.id));
    }
    let id = node.id;
    let parent_id = node.parent.ok_or(TreeError::MissingParent(id))?;
    let parent = table.get_mut(parent_id).ok_or(TreeError::ParentNotFound {
        node: id,
        parent: parent_id,
    })?;
    if !parent.is_folder() {
        return Err(TreeError::ParentNotFolder {
            node: id,
            parent: parent_id,
        });
    }
    if parent_id != ROOT_ID && !parent.children.contains(&id) {
        parent.children.push(id);
    }
    table.root_mut()?.children.push(id);
    table.insert(node)
}

/// Remove a node and unlink it from its parent.
///
/// The id is also dropped from root's children. That undoes the root link `add_node`
/// made, and unlinks top-level nodes the same way. Descendants stay in the table as
/// orphans.
fn delete_node(table: &mut NodeTable, node_id: NodeId) -> Result<(), TreeError> {
    if node_id == ROOT_ID {
        return Err(TreeError::Unreachable("the root node cannot be deleted"));
    }
    let removed = table
        .remove(node_id)
        .ok_or(TreeError::NodeNotFound(node_id))?;
    if let Some(parent_id) = removed.parent {
        if let Some(parent) = table.get_mut(parent_id) {
            parent.children.retain(|c| *c != node_id);
        }
    }
    table.root_mut()?.children.retain(|c| *c != node_id);
    Ok(())
}
