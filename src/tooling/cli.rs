//! CLI Tooling
//!
//! Command-line interface over the tree subsystem: ingest a directory, inspect the
//! tree, and read back the persisted mount snapshot and command history.

use crate::config::{ConfigLoader, FiletreeConfig};
use crate::error::ApiError;
use crate::logging::{init_logging, LoggingConfig};
use crate::store::{CommandHistory, SledStore, SnapshotStore};
use crate::tree::controller::{ControllerOptions, TreeController};
use crate::tree::ingest::{ingest, scan_directory, Ingestion};
use crate::tree::mount::MountTree;
use crate::tree::state::Action;
use crate::tree::table::NodeTable;
use crate::types::ROOT_ID;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Filetree CLI - workspace file tree ingestion and navigation
#[derive(Parser)]
#[command(name = "filetree")]
#[command(about = "Ingest a directory into a navigable workspace file tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags over the configured logging section
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory, ingest it and persist the mount snapshot
    Ingest {
        /// Directory to ingest
        dir: PathBuf,
    },
    /// Print the stored mount snapshot as JSON
    Export {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the visible rows of a directory's tree
    Tree {
        /// Directory to ingest
        dir: PathBuf,
        /// Expand every folder
        #[arg(long)]
        expand_all: bool,
    },
    /// Print the directory holding package.json in the stored snapshot
    PackageRoot,
    /// Terminal command history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Record a command
    Push {
        /// Command text
        command: String,
    },
    /// List recorded commands, oldest first
    List,
    /// Remove every recorded command
    Clear,
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Ingest { .. } => "ingest",
        Commands::Export { .. } => "export",
        Commands::Tree { .. } => "tree",
        Commands::PackageRoot => "package-root",
        Commands::History { .. } => "history",
    }
}

/// CLI context for a workspace
pub struct CliContext {
    workspace_root: PathBuf,
    config: FiletreeConfig,
    store: Arc<SledStore>,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        let store_path = config.store.resolve_path(&workspace_root)?;
        let store = Arc::new(SledStore::open(&store_path)?);
        Ok(Self {
            workspace_root,
            config,
            store,
        })
    }

    pub fn config(&self) -> &FiletreeConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Install the global subscriber from config plus CLI overrides
    pub fn init_logging(&self, cli: &Cli) -> Result<(), ApiError> {
        init_logging(Some(&cli.logging_config(&self.config.logging)))
    }

    fn snapshots(&self) -> SnapshotStore<Arc<SledStore>> {
        SnapshotStore::new(Arc::clone(&self.store))
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Ingest { dir } => self.handle_ingest(dir),
            Commands::Export { compact } => self.handle_export(*compact),
            Commands::Tree { dir, expand_all } => self.handle_tree(dir, *expand_all),
            Commands::PackageRoot => self.handle_package_root(),
            Commands::History { command } => self.handle_history(command),
        };
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn ingest_dir(&self, dir: &Path) -> Result<Ingestion, ApiError> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.workspace_root.join(dir)
        };
        let entries = scan_directory(&dir)?;
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        Ok(rt.block_on(ingest(entries)))
    }

    fn handle_ingest(&self, dir: &Path) -> Result<String, ApiError> {
        let ingestion = self.ingest_dir(dir)?;
        self.snapshots().save_mount(&ingestion.mount)?;
        self.store.flush()?;

        let mut out = format!("{}\n\n", format_section_heading("Ingested nodes"));
        out.push_str(&format_node_table(&ingestion.table));
        out.push('\n');
        if !ingestion.skipped.is_empty() {
            out.push_str(&format!("\n{}\n", format_section_heading("Skipped")));
            for skipped in &ingestion.skipped {
                out.push_str(&format!("  {}: {}\n", skipped.path, skipped.reason));
            }
        }
        Ok(out)
    }

    fn load_mount(&self) -> Result<MountTree, ApiError> {
        self.snapshots().load_mount()?.ok_or_else(|| {
            ApiError::ConfigError(
                "No mount snapshot stored. Run `filetree ingest <dir>` first.".to_string(),
            )
        })
    }

    fn handle_export(&self, compact: bool) -> Result<String, ApiError> {
        let mount = self.load_mount()?;
        let json = if compact {
            serde_json::to_string(&mount)
        } else {
            serde_json::to_string_pretty(&mount)
        };
        json.map_err(|e| ApiError::StorageError(e.into()))
    }

    fn handle_tree(&self, dir: &Path, expand_all: bool) -> Result<String, ApiError> {
        let ingestion = self.ingest_dir(dir)?;
        let mut controller = TreeController::with_options(
            ingestion.table,
            ControllerOptions {
                new_file_content: self.config.tree.new_file_content.clone(),
            },
        );
        if expand_all {
            let folders: Vec<_> = controller
                .table()
                .iter()
                .filter(|n| n.is_folder() && n.id != ROOT_ID)
                .map(|n| n.id)
                .collect();
            for id in folders {
                controller.dispatch(Action::Expand { id })?;
            }
        }

        let mut out = String::new();
        for (id, depth) in controller.visible_rows()? {
            let node = controller.table().get_or_error(id)?;
            let indent = "  ".repeat(depth);
            if node.is_folder() {
                out.push_str(&format!("{}{}/\n", indent, node.name.bold()));
            } else {
                out.push_str(&format!("{}{}\n", indent, node.name));
            }
        }
        Ok(out)
    }

    fn handle_package_root(&self) -> Result<String, ApiError> {
        let mount = self.load_mount()?;
        let Some(root) = mount.find_package_root() else {
            return Ok("No package.json found".to_string());
        };
        let name = mount.package_manifest()?.and_then(|manifest| {
            manifest
                .get("name")
                .and_then(|n| n.as_str())
                .map(str::to_string)
        });
        Ok(match name {
            Some(name) => format!("{} ({})", root, name),
            None => root,
        })
    }

    fn handle_history(&self, command: &HistoryCommands) -> Result<String, ApiError> {
        let capacity = self.config.history.capacity;
        let mut history = CommandHistory::load(&self.store, capacity)?;
        match command {
            HistoryCommands::Push { command } => {
                let recorded = history.push(command);
                history.save(&self.store)?;
                Ok(if recorded {
                    format!("Recorded ({} entries)", history.len())
                } else {
                    "Already the last entry".to_string()
                })
            }
            HistoryCommands::List => {
                if history.is_empty() {
                    return Ok("No commands recorded".to_string());
                }
                let lines: Vec<String> = history
                    .entries()
                    .enumerate()
                    .map(|(i, entry)| format!("{:>4}  {}", i + 1, entry))
                    .collect();
                Ok(lines.join("\n"))
            }
            HistoryCommands::Clear => {
                history.clear();
                history.save(&self.store)?;
                Ok("History cleared".to_string())
            }
        }
    }
}

/// Section heading with bold/underline
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_node_table(table: &NodeTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_BORDERS_ONLY);
    out.set_header(vec!["Id", "Path", "Type", "Parent"]);
    for node in table.iter().filter(|n| !n.is_root()) {
        let kind = if node.is_folder() { "folder" } else { "file" };
        let parent = node
            .parent
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.add_row(vec![node.id.to_string(), node.path.clone(), kind.to_string(), parent]);
    }
    out.to_string()
}
