//! Tree Controller
//!
//! Binds pointer activation, arrow keys and create/delete signals to reducer actions
//! and navigation lookups. The controller is the only writer of its `TreeState`.

use crate::error::TreeError;
use crate::tree::navigation;
use crate::tree::node::{child_path, NodeKind, NodePatch, TreeNode};
use crate::tree::state::{reduce, Action, TreeState};
use crate::tree::table::NodeTable;
use crate::types::{NodeId, DS_STORE, ROOT_ID};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

/// Arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
}

/// Typed messages exchanged with the activity bar, terminal and sidebar.
///
/// Serialized as `{"type": .., "data": ..}`. The tree only reacts to the create signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Signal {
    #[serde(rename = "install-packages")]
    InstallPackages,
    #[serde(rename = "custom-install-packages")]
    CustomInstallPackages {
        #[serde(rename = "packageName")]
        package_name: String,
    },
    #[serde(rename = "fs-create-file")]
    CreateFile,
    #[serde(rename = "fs-create-folder")]
    CreateFolder,
}

/// Why a proposed name cannot be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// A direct child of the parent already uses this name, ignoring case
    Duplicate(String),
    Empty,
    InvalidCharacter(char),
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameError::Duplicate(name) => write!(
                f,
                "A file or folder {} already exists at this location. \
                 Please choose a different name.",
                name
            ),
            NameError::Empty => write!(f, "A file or folder name must be provided."),
            NameError::InvalidCharacter(c) => {
                write!(f, "The name cannot contain the character '{}'.", c)
            }
        }
    }
}

/// Armed creation mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creation {
    pub kind: NodeKind,
    pub parent: NodeId,
    pub name: String,
    /// Blocking inline error; submission is refused while set
    pub error: Option<NameError>,
}

/// Result of submitting a proposed name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Created(NodeId),
    Blocked(NameError),
    /// No creation was armed
    Idle,
}

/// Controller options
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Initial content of files created through the tree
    pub new_file_content: String,
}

pub struct TreeController {
    state: TreeState,
    creation: Option<Creation>,
    log: Vec<Action>,
    options: ControllerOptions,
}

impl TreeController {
    pub fn new(table: NodeTable) -> Self {
        Self::with_options(table, ControllerOptions::default())
    }

    pub fn with_options(table: NodeTable, options: ControllerOptions) -> Self {
        Self {
            state: TreeState::new(table),
            creation: None,
            log: Vec::new(),
            options,
        }
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn table(&self) -> &NodeTable {
        &self.state.table
    }

    pub fn into_state(self) -> TreeState {
        self.state
    }

    /// Every action applied so far, in dispatch order
    pub fn actions(&self) -> &[Action] {
        &self.log
    }

    pub fn creation(&self) -> Option<&Creation> {
        self.creation.as_ref()
    }

    /// Apply one action. On error the state is left untouched.
    pub fn dispatch(&mut self, action: Action) -> Result<(), TreeError> {
        debug!(action = action.name(), "Dispatching tree action");
        self.state = reduce(self.state.clone(), &action)?;
        self.log.push(action);
        Ok(())
    }

    /// Pointer activation of a row
    pub fn activate_row(&mut self, id: NodeId) -> Result<(), TreeError> {
        let branch = navigation::is_branch(self.table(), id)?;
        self.dispatch(Action::ToggleSelect { id })?;
        if branch {
            self.dispatch(Action::Toggle { id })?;
        }
        self.dispatch(Action::Focus { id })
    }

    /// Arrow key handling relative to the focus cursor.
    ///
    /// A cursor on a node that no longer reaches root (its folder was deleted) counts as
    /// no focus, so every key is a no-op.
    pub fn handle_key(&mut self, key: Key) -> Result<(), TreeError> {
        let id = match self.state.tab_selected_id {
            Some(id) if self.table().reaches_root(id) => id,
            _ => return Ok(()),
        };
        let table = &self.state.table;
        let expanded = &self.state.expanded_ids;

        let action = match key {
            Key::Up => navigation::previous_visible(table, id, expanded)?
                .map(|previous| Action::Focus { id: previous }),
            Key::Down => navigation::next_visible(table, id, expanded)?
                .map(|next| Action::Focus { id: next }),
            Key::Left => {
                if navigation::is_branch(table, id)? && expanded.contains(&id) {
                    Some(Action::Collapse { id })
                } else if table.root()?.children.contains(&id) {
                    // Top-level rows, including created nodes linked under root.
                    None
                } else {
                    navigation::parent(table, id)?
                        .filter(|parent| *parent != ROOT_ID && table.contains(*parent))
                        .map(|parent| Action::Focus { id: parent })
                }
            }
            Key::Right => {
                if !navigation::is_branch(table, id)? {
                    None
                } else if expanded.contains(&id) {
                    table
                        .listed_children(id)?
                        .first()
                        .map(|first| Action::Focus { id: *first })
                } else {
                    Some(Action::Expand { id })
                }
            }
        };

        match action {
            Some(action) => self.dispatch(action),
            None => Ok(()),
        }
    }

    /// React to a signal. Returns whether the tree handled it.
    pub fn handle_signal(&mut self, signal: &Signal) -> Result<bool, TreeError> {
        match signal {
            Signal::CreateFile => self.begin_create(NodeKind::File).map(|_| true),
            Signal::CreateFolder => self.begin_create(NodeKind::Folder).map(|_| true),
            Signal::InstallPackages | Signal::CustomInstallPackages { .. } => {
                debug!(?signal, "Signal not handled by the tree");
                Ok(false)
            }
        }
    }

    /// Handle every signal already queued on `receiver`
    pub fn drain_signals(
        &mut self,
        receiver: &mut UnboundedReceiver<Signal>,
    ) -> Result<usize, TreeError> {
        let mut handled = 0;
        while let Ok(signal) = receiver.try_recv() {
            if self.handle_signal(&signal)? {
                handled += 1;
            }
        }
        Ok(handled)
    }

    /// Arm creation mode under the selected node.
    ///
    /// A selected file hands creation to its parent folder; no selection means root.
    pub fn begin_create(&mut self, kind: NodeKind) -> Result<(), TreeError> {
        let parent = match self.state.selected() {
            Some(id) => {
                let node = self.table().get_or_error(id)?;
                if node.is_folder() {
                    id
                } else {
                    node.parent.unwrap_or(ROOT_ID)
                }
            }
            None => ROOT_ID,
        };
        debug!(?kind, parent, "Creation armed");
        self.creation = Some(Creation {
            kind,
            parent,
            name: String::new(),
            error: None,
        });
        Ok(())
    }

    /// Update the proposed name and its inline validation state
    pub fn set_creation_name(
        &mut self,
        name: &str,
    ) -> Result<Option<&NameError>, TreeError> {
        let Some(parent) = self.creation.as_ref().map(|c| c.parent) else {
            return Ok(None);
        };
        let error = validate_name(self.table(), parent, name)?;
        let creation = self
            .creation
            .as_mut()
            .ok_or(TreeError::Unreachable("creation disarmed while renaming"))?;
        creation.name = name.to_string();
        creation.error = error;
        Ok(creation.error.as_ref())
    }

    /// Submit the proposed name. Blocked names keep creation armed.
    pub fn submit_creation(&mut self) -> Result<CreationOutcome, TreeError> {
        let Some(creation) = self.creation.clone() else {
            return Ok(CreationOutcome::Idle);
        };
        if let Some(error) = validate_name(self.table(), creation.parent, &creation.name)? {
            if let Some(armed) = self.creation.as_mut() {
                armed.error = Some(error.clone());
            }
            return Ok(CreationOutcome::Blocked(error));
        }

        let parent = self.table().get_or_error(creation.parent)?;
        let path = child_path(parent, &creation.name);
        let id = self.table().next_id();
        let node = match creation.kind {
            NodeKind::File => TreeNode::file(
                id,
                &creation.name,
                &path,
                creation.parent,
                self.options.new_file_content.clone(),
            ),
            NodeKind::Folder => TreeNode::folder(id, &creation.name, &path, creation.parent),
        };
        self.dispatch(Action::AddNode { node })?;

        if creation.kind == NodeKind::Folder {
            let placeholder = TreeNode::file(
                id + 1,
                DS_STORE,
                format!("{}/{}", path, DS_STORE),
                id,
                "",
            );
            self.dispatch(Action::AddNode { node: placeholder })?;
        }

        info!(id, path = %path, kind = ?creation.kind, "Created node");
        self.creation = None;
        Ok(CreationOutcome::Created(id))
    }

    pub fn cancel_creation(&mut self) {
        self.creation = None;
    }

    /// External delete signal
    pub fn delete(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.dispatch(Action::DeleteNode { node_id: id })?;
        if self.creation.as_ref().map_or(false, |c| c.parent == id) {
            self.creation = None;
        }
        Ok(())
    }

    /// Store changed content from the editing widget
    pub fn update_content(&mut self, id: NodeId, content: &str) -> Result<(), TreeError> {
        self.dispatch(Action::UpdateNode {
            node_id: id,
            patch: NodePatch::content(content),
        })
    }

    /// Visible rows with depth, in render order
    pub fn visible_rows(&self) -> Result<Vec<(NodeId, usize)>, TreeError> {
        navigation::visible_rows(&self.state.table, &self.state.expanded_ids)
    }
}

fn fold_name(name: &str) -> String {
    name.nfc().collect::<String>().to_lowercase()
}

/// Validate a proposed child name against the parent's direct children
pub fn validate_name(
    table: &NodeTable,
    parent: NodeId,
    name: &str,
) -> Result<Option<NameError>, TreeError> {
    if name.trim().is_empty() {
        return Ok(Some(NameError::Empty));
    }
    if let Some(c) = name.chars().find(|c| *c == '/' || *c == '\\') {
        return Ok(Some(NameError::InvalidCharacter(c)));
    }
    let folded = fold_name(name);
    for &child in table.children(parent)? {
        if fold_name(&table.get_or_error(child)?.name) == folded {
            return Ok(Some(NameError::Duplicate(name.to_string())));
        }
    }
    Ok(None)
}
