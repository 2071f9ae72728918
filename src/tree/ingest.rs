//! Path Ingestor
//!
//! Converts raw entries (relative path segments plus a content source) into the flat
//! node table and the nested mount tree. Entries are processed strictly one after the
//! other, each content read awaited before the next entry starts, so id assignment is
//! reproducible for a given input order.

use crate::error::IngestError;
use crate::tree::mount::MountTree;
use crate::tree::node::{NodeKind, TreeNode};
use crate::tree::table::NodeTable;
use crate::types::{NodeId, DS_STORE, ROOT_ID};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Asynchronous source of a file entry's text
#[async_trait]
pub trait ContentReader: Send + Sync {
    async fn read(&self) -> std::io::Result<String>;
}

/// Reads file content from disk
#[derive(Debug, Clone)]
pub struct FsContentReader {
    pub path: PathBuf,
}

#[async_trait]
impl ContentReader for FsContentReader {
    async fn read(&self) -> std::io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

/// In-memory content
#[derive(Debug, Clone)]
pub struct StaticContent(pub String);

#[async_trait]
impl ContentReader for StaticContent {
    async fn read(&self) -> std::io::Result<String> {
        Ok(self.0.clone())
    }
}

/// One raw ingestion entry
#[derive(Clone)]
pub struct Entry {
    pub relative_path: Vec<String>,
    pub is_file: bool,
    pub reader: Option<Arc<dyn ContentReader>>,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("relative_path", &self.relative_path)
            .field("is_file", &self.is_file)
            .field("reader", &self.reader.is_some())
            .finish()
    }
}

impl Entry {
    /// File entry from a slash-delimited path and its content source
    pub fn file(relative_path: &str, reader: Arc<dyn ContentReader>) -> Self {
        Self {
            relative_path: relative_path.split('/').map(String::from).collect(),
            is_file: true,
            reader: Some(reader),
        }
    }

    /// File entry with in-memory content
    pub fn with_content(relative_path: &str, content: impl Into<String>) -> Self {
        Self::file(relative_path, Arc::new(StaticContent(content.into())))
    }

    pub fn display_path(&self) -> String {
        self.relative_path.join("/")
    }

    fn name(&self) -> Option<&str> {
        self.relative_path.last().map(String::as_str)
    }
}

/// An entry dropped during ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Result of one ingestion event
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub table: NodeTable,
    pub mount: MountTree,
    pub skipped: Vec<SkippedEntry>,
}

/// Ingest entries in input order.
///
/// A failing entry (empty segments, unreadable content, file/folder conflict) is
/// skipped and recorded; the remaining entries still load.
pub async fn ingest(entries: Vec<Entry>) -> Ingestion {
    let mut builder = TableBuilder::new();
    let mut mount = MountTree::new();
    let mut skipped = Vec::new();
    let total = entries.len();

    for entry in entries {
        if entry.name() == Some(DS_STORE) {
            debug!(path = %entry.display_path(), "Ignoring placeholder entry");
            continue;
        }
        match builder.add_entry(&entry).await {
            Ok(Some((kinds, content))) => {
                mount.insert_path(&entry.relative_path, &kinds, &content);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(path = %entry.display_path(), error = %e, "Skipping entry");
                skipped.push(SkippedEntry {
                    path: entry.display_path(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut table = builder.finish();
    if let Err(e) = table.sort_all_children() {
        warn!(error = %e, "Failed to order children after ingestion");
    }

    info!(
        entries = total,
        nodes = table.len(),
        skipped = skipped.len(),
        "Ingestion complete"
    );

    Ingestion {
        table,
        mount,
        skipped,
    }
}

/// Incremental table construction keyed by cumulative path
struct TableBuilder {
    table: NodeTable,
    by_path: HashMap<String, NodeId>,
}

impl TableBuilder {
    fn new() -> Self {
        Self {
            table: NodeTable::new(),
            by_path: HashMap::new(),
        }
    }

    /// Add one entry. Returns the segment kinds and file content when the entry
    /// created or matched a path, `None` when it was a duplicate.
    async fn add_entry(
        &mut self,
        entry: &Entry,
    ) -> Result<Option<(Vec<NodeKind>, String)>, IngestError> {
        let segments = &entry.relative_path;
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(IngestError::EmptyPath);
        }

        let last = segments.len() - 1;
        let kinds: Vec<NodeKind> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| NodeKind::classify(s, i == last))
            .collect();
        let paths: Vec<String> = (0..segments.len())
            .map(|i| segments[..=i].join("/"))
            .collect();

        // Check every prefix before touching the table so a failed entry leaves no trace.
        for (path, kind) in paths.iter().zip(&kinds) {
            if let Some(id) = self.by_path.get(path) {
                let existing = self
                    .table
                    .get(*id)
                    .map(|n| n.kind)
                    .unwrap_or(NodeKind::Folder);
                if existing == NodeKind::File && *kind == NodeKind::Folder {
                    return Err(IngestError::PathConflict(path.clone()));
                }
            }
        }
        if self.by_path.contains_key(&paths[last]) {
            debug!(path = %paths[last], "Duplicate entry");
            return Ok(None);
        }

        let content = match (kinds[last], &entry.reader) {
            (NodeKind::File, Some(reader)) if entry.is_file => {
                reader.read().await.map_err(|source| IngestError::ContentRead {
                    path: entry.display_path(),
                    source,
                })?
            }
            _ => String::new(),
        };

        let mut parent = ROOT_ID;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(id) = self.by_path.get(&paths[i]) {
                parent = *id;
                continue;
            }
            let id = self.table.next_id();
            let node = match kinds[i] {
                NodeKind::File => TreeNode::file(id, segment, &paths[i], parent, content.clone()),
                NodeKind::Folder => TreeNode::folder(id, segment, &paths[i], parent),
            };
            // Prefixes were checked above and ids come from next_id.
            self.table
                .insert(node)
                .map_err(|_| IngestError::PathConflict(paths[i].clone()))?;
            if let Some(parent_node) = self.table.get_mut(parent) {
                parent_node.children.push(id);
            }
            self.by_path.insert(paths[i].clone(), id);
            parent = id;
        }

        Ok(Some((kinds, content)))
    }

    fn finish(self) -> NodeTable {
        self.table
    }
}

/// Build entries for every file under `root`, the way a directory picker reports them:
/// relative paths start with the directory's own name, siblings come in file-name order.
pub fn scan_directory(root: &Path) -> Result<Vec<Entry>, IngestError> {
    let canonical = dunce::canonicalize(root).map_err(|e| IngestError::Scan {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;
    let base = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError::Scan {
            path: root.to_path_buf(),
            message: "Directory has no usable name".to_string(),
        })?
        .to_string();

    let mut entries = Vec::new();
    for item in WalkDir::new(&canonical).sort_by_file_name() {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "Failed to read directory entry");
                continue;
            }
        };
        if !item.file_type().is_file() {
            continue;
        }
        let relative = match item.path().strip_prefix(&canonical) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let mut segments = vec![base.clone()];
        let mut usable = true;
        for component in relative.components() {
            match component.as_os_str().to_str() {
                Some(s) => segments.push(s.to_string()),
                None => {
                    warn!("Skipping non UTF8 path: {:?}", item.path());
                    usable = false;
                    break;
                }
            }
        }
        if !usable {
            continue;
        }
        entries.push(Entry {
            relative_path: segments,
            is_file: true,
            reader: Some(Arc::new(FsContentReader {
                path: item.path().to_path_buf(),
            })),
        });
    }
    debug!(root = %canonical.display(), entries = entries.len(), "Scanned directory");
    Ok(entries)
}
