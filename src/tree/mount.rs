//! Mount export
//!
//! Nested directory/file representation handed to the execution host and the
//! persistence medium. Serialized as `{"directory": {..}}` / `{"file": {"contents": ..}}`.

use crate::error::{ApiError, TreeError};
use crate::tree::node::{sibling_order, NodeKind};
use crate::tree::table::NodeTable;
use crate::types::{NodeId, DS_STORE, ROOT_ID};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const PACKAGE_MANIFEST: &str = "package.json";

/// File payload of a mount entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContents {
    pub contents: String,
}

/// One mount entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountEntry {
    Directory(MountTree),
    File(FileContents),
}

impl MountEntry {
    pub fn file(contents: impl Into<String>) -> Self {
        MountEntry::File(FileContents {
            contents: contents.into(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            MountEntry::Directory(_) => NodeKind::Folder,
            MountEntry::File(_) => NodeKind::File,
        }
    }
}

/// Ordered `name -> entry` mapping. Entries keep folders-first, name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTree {
    entries: Vec<(String, MountEntry)>,
}

impl Serialize for MountTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MountTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MountTreeVisitor;

        impl<'de> Visitor<'de> for MountTreeVisitor {
            type Value = MountTree;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of entry names to directory or file entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<MountTree, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, entry)) = access.next_entry::<String, MountEntry>()? {
                    entries.push((name, entry));
                }
                Ok(MountTree { entries })
            }
        }

        deserializer.deserialize_map(MountTreeVisitor)
    }
}

impl MountTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MountEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn get(&self, name: &str) -> Option<&MountEntry> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut MountEntry> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Insert at the sorted position; an existing entry with the same name is kept
    pub fn insert(&mut self, name: impl Into<String>, entry: MountEntry) -> &mut MountEntry {
        let name = name.into();
        if let Some(index) = self.entries.iter().position(|(n, _)| *n == name) {
            return &mut self.entries[index].1;
        }
        let index = self
            .entries
            .iter()
            .position(|(n, e)| {
                sibling_order((entry.kind(), &name), (e.kind(), n)) == std::cmp::Ordering::Less
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(index, (name, entry));
        &mut self.entries[index].1
    }

    /// Insert a file at `segments`, creating intermediate directories
    pub(crate) fn insert_path(&mut self, segments: &[String], kinds: &[NodeKind], contents: &str) {
        let mut current = self;
        for (segment, kind) in segments.iter().zip(kinds) {
            let entry = match kind {
                NodeKind::File => MountEntry::file(contents),
                NodeKind::Folder => MountEntry::Directory(MountTree::new()),
            };
            match current.insert(segment.clone(), entry) {
                MountEntry::Directory(tree) => current = tree,
                MountEntry::File(_) => return,
            }
        }
    }

    /// Re-snapshot a node table.
    ///
    /// Walks real parent links from root, so root double-links and orphans are left out.
    pub fn from_table(table: &NodeTable) -> Result<Self, TreeError> {
        let root = table.root()?;
        let top_level: Vec<NodeId> = root
            .children
            .iter()
            .copied()
            .filter(|id| table.get(*id).map_or(false, |n| n.parent == Some(ROOT_ID)))
            .collect();
        Self::subtree(table, &top_level, true)
    }

    fn subtree(table: &NodeTable, ids: &[NodeId], top_level: bool) -> Result<Self, TreeError> {
        let mut tree = MountTree::new();
        for &id in ids {
            let node = table.get_or_error(id)?;
            if top_level && node.name == DS_STORE {
                continue;
            }
            let entry = match node.kind {
                NodeKind::File => MountEntry::file(node.content.clone()),
                NodeKind::Folder => {
                    let children: Vec<NodeId> = node
                        .children
                        .iter()
                        .copied()
                        .filter(|c| table.get(*c).map_or(false, |n| n.parent == Some(id)))
                        .collect();
                    MountEntry::Directory(Self::subtree(table, &children, false)?)
                }
            };
            tree.insert(node.name.clone(), entry);
        }
        Ok(tree)
    }

    /// Directory holding `package.json`, depth first. `"/"` when it sits at the top level.
    pub fn find_package_root(&self) -> Option<String> {
        self.find_file_dir(PACKAGE_MANIFEST, "")
    }

    fn find_file_dir(&self, file_name: &str, path: &str) -> Option<String> {
        if let Some(MountEntry::File(_)) = self.get(file_name) {
            return Some(if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            });
        }
        for (name, entry) in &self.entries {
            if let MountEntry::Directory(tree) = entry {
                let child_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", path, name)
                };
                if let Some(found) = tree.find_file_dir(file_name, &child_path) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Resolve a slash-delimited path to a directory subtree
    pub fn directory_at(&self, path: &str) -> Option<&MountTree> {
        let mut current = self;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            match current.get(part) {
                Some(MountEntry::Directory(tree)) => current = tree,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Parse the discovered `package.json`
    pub fn package_manifest(&self) -> Result<Option<serde_json::Value>, ApiError> {
        let Some(root) = self.find_package_root() else {
            return Ok(None);
        };
        let dir = self
            .directory_at(&root)
            .ok_or_else(|| ApiError::PathNotInTree(root.clone()))?;
        match dir.get(PACKAGE_MANIFEST) {
            Some(MountEntry::File(file)) => {
                serde_json::from_str(&file.contents).map(Some).map_err(|e| {
                    ApiError::ConfigError(format!("Invalid {}: {}", PACKAGE_MANIFEST, e))
                })
            }
            _ => Ok(None),
        }
    }

    /// Replace the contents of an existing file entry
    pub fn write_file(&mut self, path: &str, contents: &str) -> Result<(), ApiError> {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            return Err(ApiError::PathNotInTree(path.to_string()));
        };
        let mut current = self;
        for dir in dirs {
            match current.get_mut(dir) {
                Some(MountEntry::Directory(tree)) => current = tree,
                _ => return Err(ApiError::PathNotInTree(path.to_string())),
            }
        }
        match current.get_mut(file_name) {
            Some(MountEntry::File(file)) => {
                file.contents = contents.to_string();
                Ok(())
            }
            _ => Err(ApiError::PathNotInTree(path.to_string())),
        }
    }
}
