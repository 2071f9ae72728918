use filetree::tooling::cli::{CliContext, Commands, HistoryCommands};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join(".filetree.toml"),
        "[store]\npath = \"state/store\"\n",
    )
    .unwrap();
    let proj = temp_dir.path().join("proj");
    std::fs::create_dir_all(proj.join("src")).unwrap();
    std::fs::write(proj.join("package.json"), r#"{"name":"demo"}"#).unwrap();
    std::fs::write(proj.join("index.js"), "console.log(1)").unwrap();
    std::fs::write(proj.join("src").join("util.js"), "export {}").unwrap();
    temp_dir
}

fn context(root: &Path) -> CliContext {
    CliContext::new(root.to_path_buf(), None).unwrap()
}

#[test]
fn test_export_requires_ingest() {
    let temp_dir = workspace();
    let ctx = context(temp_dir.path());
    assert!(ctx.execute(&Commands::Export { compact: true }).is_err());
}

#[test]
fn test_ingest_then_export_and_package_root() {
    let temp_dir = workspace();
    let ctx = context(temp_dir.path());

    let listing = ctx
        .execute(&Commands::Ingest {
            dir: PathBuf::from("proj"),
        })
        .unwrap();
    assert!(listing.contains("proj/src/util.js"));
    assert!(temp_dir.path().join("state").join("store").exists());

    let json = ctx.execute(&Commands::Export { compact: true }).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["proj"]["directory"]["index.js"]["file"]["contents"],
        "console.log(1)"
    );
    assert!(value["proj"]["directory"]["src"]["directory"]["util.js"].is_object());

    let root = ctx.execute(&Commands::PackageRoot).unwrap();
    assert_eq!(root, "proj (demo)");
}

#[test]
fn test_tree_lists_visible_rows() {
    let temp_dir = workspace();
    let ctx = context(temp_dir.path());

    let collapsed = ctx
        .execute(&Commands::Tree {
            dir: PathBuf::from("proj"),
            expand_all: false,
        })
        .unwrap();
    assert_eq!(collapsed.lines().count(), 1);

    let expanded = ctx
        .execute(&Commands::Tree {
            dir: PathBuf::from("proj"),
            expand_all: true,
        })
        .unwrap();
    let lines: Vec<&str> = expanded.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[1].contains("src"));
    assert_eq!(lines[2].trim(), "util.js");
    assert_eq!(lines[3].trim(), "index.js");
    assert_eq!(lines[4].trim(), "package.json");
}

#[test]
fn test_history_round_trip_through_store() {
    let temp_dir = workspace();
    let ctx = context(temp_dir.path());
    let push = |command: &str| {
        ctx.execute(&Commands::History {
            command: HistoryCommands::Push {
                command: command.to_string(),
            },
        })
        .unwrap()
    };

    push("npm install");
    assert_eq!(push("npm install"), "Already the last entry");
    push("npm start");

    let listed = ctx
        .execute(&Commands::History {
            command: HistoryCommands::List,
        })
        .unwrap();
    assert_eq!(listed.lines().count(), 2);
    assert!(listed.contains("npm start"));

    ctx.execute(&Commands::History {
        command: HistoryCommands::Clear,
    })
    .unwrap();
    let listed = ctx
        .execute(&Commands::History {
            command: HistoryCommands::List,
        })
        .unwrap();
    assert_eq!(listed, "No commands recorded");
}
