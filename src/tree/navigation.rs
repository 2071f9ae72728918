//! Accessible Navigation
//!
//! Stateless visibility-restricted pre-order traversal over a node table and an
//! expansion set. A node is visible when every folder on its path from root is expanded.
//!
//! `is_branch` looks at raw children, so a folder holding only a `.DS_Store`
//! placeholder still renders as a branch. Stepping (first/last child, siblings) only
//! considers listed children.

use crate::error::TreeError;
use crate::tree::table::NodeTable;
use crate::types::{NodeId, ROOT_ID};
use std::collections::HashSet;

/// True iff the node has at least one child
pub fn is_branch(table: &NodeTable, id: NodeId) -> Result<bool, TreeError> {
    Ok(!table.children(id)?.is_empty())
}

pub fn parent(table: &NodeTable, id: NodeId) -> Result<Option<NodeId>, TreeError> {
    Ok(table.get_or_error(id)?.parent)
}

/// The listed sibling at `index(id) + delta` within the parent's children
pub fn sibling(table: &NodeTable, id: NodeId, delta: isize) -> Result<Option<NodeId>, TreeError> {
    let Some(parent_id) = parent(table, id)? else {
        return Ok(None);
    };
    let siblings = table.listed_children(parent_id)?;
    let Some(index) = siblings.iter().position(|c| *c == id) else {
        return Ok(None);
    };
    let target = index as isize + delta;
    if target < 0 {
        return Ok(None);
    }
    Ok(siblings.get(target as usize).copied())
}

/// Deepest visible descendant reached by repeatedly taking the last child of
/// expanded branches. Starts at root's last child when `id` is root.
pub fn last_visible(
    table: &NodeTable,
    id: NodeId,
    expanded: &HashSet<NodeId>,
) -> Result<NodeId, TreeError> {
    let mut current = id;
    if id == ROOT_ID {
        match table.listed_children(ROOT_ID)?.last() {
            Some(last) => current = *last,
            None => return Ok(ROOT_ID),
        }
    }
    while expanded.contains(&current) && is_branch(table, current)? {
        match table.listed_children(current)?.last() {
            Some(last) => current = *last,
            None => break,
        }
    }
    Ok(current)
}

/// Visible node rendered directly above `id`, or none at the top
pub fn previous_visible(
    table: &NodeTable,
    id: NodeId,
    expanded: &HashSet<NodeId>,
) -> Result<Option<NodeId>, TreeError> {
    if id == ROOT_ID || table.listed_children(ROOT_ID)?.first() == Some(&id) {
        return Ok(None);
    }
    match sibling(table, id, -1)? {
        Some(previous) => Ok(Some(last_visible(table, previous, expanded)?)),
        None => parent(table, id),
    }
}

/// Visible node rendered directly below `id`, or none at the bottom
pub fn next_visible(
    table: &NodeTable,
    id: NodeId,
    expanded: &HashSet<NodeId>,
) -> Result<Option<NodeId>, TreeError> {
    let mut current = table.get_or_error(id)?.id;
    if expanded.contains(&current) && is_branch(table, current)? {
        if let Some(first) = table.listed_children(current)?.first() {
            return Ok(Some(*first));
        }
    }
    loop {
        if let Some(next) = sibling(table, current, 1)? {
            return Ok(Some(next));
        }
        match parent(table, current)? {
            Some(parent_id) => current = parent_id,
            None => return Ok(None),
        }
    }
}

/// Visible nodes in render order with their depth (top-level entries have depth 1)
pub fn visible_rows(
    table: &NodeTable,
    expanded: &HashSet<NodeId>,
) -> Result<Vec<(NodeId, usize)>, TreeError> {
    let mut rows = Vec::new();
    let mut stack: Vec<(NodeId, usize)> = table
        .listed_children(ROOT_ID)?
        .into_iter()
        .rev()
        .map(|id| (id, 1))
        .collect();
    while let Some((id, depth)) = stack.pop() {
        rows.push((id, depth));
        if expanded.contains(&id) {
            for child in table.listed_children(id)?.into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    Ok(rows)
}
