use filetree::tree::controller::{CreationOutcome, Key, NameError, Signal, TreeController};
use filetree::tree::ingest::{ingest, Entry};
use filetree::tree::node::{NodeKind, TreeNode};
use filetree::tree::state::{reduce, Action, TreeState};
use filetree::tree::table::NodeTable;
use filetree::types::{NodeId, ROOT_ID};

fn id_of(table: &NodeTable, path: &str) -> NodeId {
    table
        .iter()
        .find(|n| n.path == path)
        .map(|n| n.id)
        .unwrap_or_else(|| panic!("no node at {}", path))
}

#[tokio::test]
async fn test_dot_segments_classify_as_files() {
    let result = ingest(vec![
        Entry::with_content("proj/.env", "KEY=1"),
        Entry::with_content("proj/bin", "#!/bin/sh"),
    ])
    .await;
    let table = &result.table;

    let env = table.get(id_of(table, "proj/.env")).unwrap();
    assert_eq!(env.kind, NodeKind::File);
    assert_eq!(env.content, "KEY=1");

    let bin = table.get(id_of(table, "proj/bin")).unwrap();
    assert_eq!(bin.kind, NodeKind::Folder);
    assert!(bin.children.is_empty());
    assert_eq!(bin.content, "");
}

#[tokio::test]
async fn test_ids_follow_input_order() {
    let result = ingest(vec![
        Entry::with_content("proj/package.json", "{}"),
        Entry::with_content("proj/index.js", "1"),
    ])
    .await;
    let table = &result.table;
    assert_eq!(id_of(table, "proj"), 1);
    assert_eq!(id_of(table, "proj/package.json"), 2);
    assert_eq!(id_of(table, "proj/index.js"), 3);
    assert_eq!(table.children(1).unwrap(), &[3, 2]);
    assert_eq!(table.children(ROOT_ID).unwrap(), &[1]);
}

#[tokio::test]
async fn test_folder_delete_leaves_orphan_child() {
    let result = ingest(vec![Entry::with_content("proj/src/a.js", "a")]).await;
    let src = id_of(&result.table, "proj/src");
    let a = id_of(&result.table, "proj/src/a.js");

    let state = reduce(TreeState::new(result.table), &Action::DeleteNode { node_id: src }).unwrap();
    assert!(state.table.get(src).is_none());
    let orphan = state.table.get(a).unwrap();
    assert_eq!(orphan.parent, Some(src));
    assert_eq!(state.table.orphans(), vec![a]);
    assert!(!state.table.reaches_root(a));
    assert!(!state.table.validate().warnings.is_empty());
}

#[tokio::test]
async fn test_keyboard_expand_keeps_focus_then_descends() {
    let result = ingest(vec![
        Entry::with_content("proj/package.json", "{}"),
        Entry::with_content("proj/index.js", "1"),
    ])
    .await;
    let proj = id_of(&result.table, "proj");
    let index = id_of(&result.table, "proj/index.js");
    let mut controller = TreeController::new(result.table);

    controller.dispatch(Action::Focus { id: proj }).unwrap();
    controller.handle_key(Key::Right).unwrap();
    assert!(controller.state().is_expanded(proj));
    assert_eq!(controller.state().tab_selected_id, Some(proj));

    controller.handle_key(Key::Right).unwrap();
    assert_eq!(controller.state().tab_selected_id, Some(index));

    controller.handle_key(Key::Down).unwrap();
    controller.handle_key(Key::Up).unwrap();
    assert_eq!(controller.state().tab_selected_id, Some(index));
}

#[tokio::test]
async fn test_case_insensitive_duplicate_is_blocked() {
    let result = ingest(vec![Entry::with_content("proj/a.js", "a")]).await;
    let proj = id_of(&result.table, "proj");
    let mut controller = TreeController::new(result.table);
    controller.activate_row(proj).unwrap();
    controller.handle_signal(&Signal::CreateFile).unwrap();
    controller.set_creation_name("A.js").unwrap();

    let size = controller.table().len();
    assert_eq!(
        controller.submit_creation().unwrap(),
        CreationOutcome::Blocked(NameError::Duplicate("A.js".to_string()))
    );
    assert_eq!(controller.table().len(), size);
    assert_eq!(
        controller.creation().map(|c| c.name.as_str()),
        Some("A.js")
    );
}

#[test]
fn test_add_node_double_links_under_root() {
    let state = TreeState::new(NodeTable::new());
    let state = reduce(
        state,
        &Action::AddNode {
            node: TreeNode::folder(1, "proj", "proj", ROOT_ID),
        },
    )
    .unwrap();
    let state = reduce(
        state,
        &Action::AddNode {
            node: TreeNode::file(2, "a.js", "proj/a.js", 1, ""),
        },
    )
    .unwrap();

    assert_eq!(state.table.children(1).unwrap(), &[2]);
    assert_eq!(state.table.children(ROOT_ID).unwrap(), &[1, 2]);
    assert!(state.table.reaches_root(2));
}

#[test]
fn test_add_node_under_missing_parent_fails() {
    let state = TreeState::new(NodeTable::new());
    let result = reduce(
        state,
        &Action::AddNode {
            node: TreeNode::file(5, "a.js", "x/a.js", 4, ""),
        },
    );
    assert!(result.is_err());
}
