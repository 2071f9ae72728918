use filetree::store::{MemoryStore, SnapshotStore};
use filetree::tree::ingest::{ingest, scan_directory, Entry};
use filetree::tree::mount::{MountEntry, MountTree};
use filetree::tree::TreeController;
use tempfile::TempDir;

fn file_contents<'a>(tree: &'a MountTree, name: &str) -> &'a str {
    match tree.get(name) {
        Some(MountEntry::File(file)) => &file.contents,
        other => panic!("expected file {}, got {:?}", name, other),
    }
}

#[tokio::test]
async fn test_ingest_export_preserves_contents() {
    let manifest = r#"{"name":"x"}"#;
    let result = ingest(vec![
        Entry::with_content("proj/package.json", manifest),
        Entry::with_content("proj/index.js", "console.log(1)"),
    ])
    .await;
    assert!(result.skipped.is_empty());

    let json = serde_json::to_string(&result.mount).unwrap();
    let parsed: MountTree = serde_json::from_str(&json).unwrap();
    let Some(MountEntry::Directory(proj)) = parsed.get("proj") else {
        panic!("expected proj directory in {}", json);
    };
    assert_eq!(proj.len(), 2);
    assert_eq!(file_contents(proj, "package.json"), manifest);
    assert_eq!(file_contents(proj, "index.js"), "console.log(1)");

    let reparsed: serde_json::Value =
        serde_json::from_str(file_contents(proj, "package.json")).unwrap();
    assert_eq!(reparsed, serde_json::json!({"name": "x"}));
}

#[tokio::test]
async fn test_wire_shape_uses_directory_and_file_keys() {
    let result = ingest(vec![Entry::with_content("proj/index.js", "a")]).await;
    let value = serde_json::to_value(&result.mount).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "proj": {"directory": {"index.js": {"file": {"contents": "a"}}}}
        })
    );
}

#[tokio::test]
async fn test_resnapshot_matches_ingestion_export() {
    let result = ingest(vec![
        Entry::with_content("proj/src/main.js", "main"),
        Entry::with_content("proj/package.json", "{}"),
        Entry::with_content("README.md", "readme"),
    ])
    .await;
    let snapshot = MountTree::from_table(&result.table).unwrap();
    assert_eq!(snapshot, result.mount);
}

#[tokio::test]
async fn test_resnapshot_after_edits() {
    let result = ingest(vec![Entry::with_content("proj/index.js", "old")]).await;
    let mut controller = TreeController::new(result.table);
    let index = controller
        .table()
        .iter()
        .find(|n| n.path == "proj/index.js")
        .map(|n| n.id)
        .unwrap();
    controller.update_content(index, "new").unwrap();

    let snapshot = MountTree::from_table(controller.table()).unwrap();
    let Some(MountEntry::Directory(proj)) = snapshot.get("proj") else {
        panic!("expected proj directory");
    };
    assert_eq!(file_contents(proj, "index.js"), "new");
}

#[tokio::test]
async fn test_scan_directory_persist_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let proj = temp_dir.path().join("proj");
    std::fs::create_dir_all(proj.join("src")).unwrap();
    std::fs::write(proj.join("package.json"), r#"{"name":"demo"}"#).unwrap();
    std::fs::write(proj.join("src").join("app.js"), "app()").unwrap();
    std::fs::write(proj.join(".DS_Store"), "junk").unwrap();

    let entries = scan_directory(&proj).unwrap();
    let result = ingest(entries).await;
    assert_eq!(result.mount.find_package_root().as_deref(), Some("proj"));

    let snapshots = SnapshotStore::new(MemoryStore::new());
    snapshots.save_mount(&result.mount).unwrap();
    let loaded = snapshots.load_mount().unwrap().unwrap();
    assert_eq!(loaded, result.mount);
    let manifest = loaded.package_manifest().unwrap().unwrap();
    assert_eq!(manifest["name"], "demo");
}
