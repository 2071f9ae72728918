use filetree::tree::controller::TreeController;
use filetree::tree::ingest::{ingest, Entry, Ingestion};
use filetree::tree::navigation::{next_visible, previous_visible, visible_rows};
use filetree::tree::node::TreeNode;
use filetree::tree::state::Action;
use filetree::tree::table::NodeTable;
use filetree::types::{NodeId, ROOT_ID};
use proptest::prelude::*;
use std::collections::HashSet;

fn path_strategy() -> impl Strategy<Value = String> {
    let folder = prop::sample::select(vec!["src", "lib", "app", "test"]);
    let file = prop::sample::select(vec!["a.js", "b.ts", "index.js", "README.md"]);
    (prop::collection::vec(folder, 0..4), file).prop_map(|(folders, file)| {
        let mut segments: Vec<&str> = vec!["proj"];
        segments.extend(folders);
        segments.push(file);
        segments.join("/")
    })
}

fn ingest_paths(paths: &[String]) -> Ingestion {
    let entries = paths
        .iter()
        .map(|p| Entry::with_content(p, format!("// {}", p)))
        .collect();
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(ingest(entries))
}

fn expansion(ingestion: &Ingestion, mask: &[bool]) -> HashSet<NodeId> {
    ingestion
        .table
        .iter()
        .filter(|n| n.is_folder() && !n.is_root())
        .zip(mask.iter().cycle())
        .filter(|(_, open)| **open)
        .map(|(n, _)| n.id)
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    AddFile(usize),
    AddFolder(usize),
    Delete(usize),
    ToggleSelect(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<usize>().prop_map(Edit::AddFile),
        any::<usize>().prop_map(Edit::AddFolder),
        any::<usize>().prop_map(Edit::Delete),
        any::<usize>().prop_map(Edit::ToggleSelect),
    ]
}

/// First missing id on the parent chain of `id`, or `None` when the chain ends at root
fn missing_ancestor(table: &NodeTable, id: NodeId) -> Option<NodeId> {
    let mut current = table.get(id)?.parent?;
    while current != ROOT_ID {
        match table.get(current) {
            Some(node) => current = node.parent?,
            None => return Some(current),
        }
    }
    None
}

fn pick(ids: &[NodeId], at: usize) -> Option<NodeId> {
    (!ids.is_empty()).then(|| ids[at % ids.len()])
}

proptest! {
    #[test]
    fn test_next_inverts_previous_on_visible_rows(
        paths in prop::collection::vec(path_strategy(), 1..12),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let ingestion = ingest_paths(&paths);
        let expanded = expansion(&ingestion, &mask);
        let table = &ingestion.table;
        let rows: Vec<NodeId> = visible_rows(table, &expanded)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        prop_assert!(!rows.is_empty());

        for &x in &rows {
            if let Some(p) = previous_visible(table, x, &expanded).unwrap() {
                prop_assert_eq!(next_visible(table, p, &expanded).unwrap(), Some(x));
            }
        }
        for pair in rows.windows(2) {
            prop_assert_eq!(next_visible(table, pair[0], &expanded).unwrap(), Some(pair[1]));
        }
        prop_assert_eq!(previous_visible(table, rows[0], &expanded).unwrap(), None);
        prop_assert_eq!(next_visible(table, rows[rows.len() - 1], &expanded).unwrap(), None);
    }

    #[test]
    fn test_ingested_nodes_reach_root(paths in prop::collection::vec(path_strategy(), 1..12)) {
        let ingestion = ingest_paths(&paths);
        let table = &ingestion.table;
        for node in table.iter() {
            prop_assert!(table.reaches_root(node.id));
        }
        prop_assert!(table.orphans().is_empty());
        prop_assert!(table.validate().is_valid());
    }

    #[test]
    fn test_ingestion_is_deterministic(paths in prop::collection::vec(path_strategy(), 1..10)) {
        let first = ingest_paths(&paths);
        let second = ingest_paths(&paths);
        prop_assert_eq!(first.table, second.table);
        prop_assert_eq!(first.mount, second.mount);
    }

    #[test]
    fn test_add_delete_sequences_orphan_only_under_deleted_folders(
        edits in prop::collection::vec(edit_strategy(), 1..40),
    ) {
        let mut controller = TreeController::new(ingest_paths(&["proj/a.js".to_string()]).table);
        let mut next_id = controller.table().next_id();
        let mut deleted: HashSet<NodeId> = HashSet::new();

        for edit in edits {
            let table = controller.table();
            let folders: Vec<NodeId> =
                table.iter().filter(|n| n.is_folder()).map(|n| n.id).collect();
            let others: Vec<NodeId> =
                table.iter().filter(|n| !n.is_root()).map(|n| n.id).collect();
            match edit {
                Edit::AddFile(at) | Edit::AddFolder(at) => {
                    let Some(parent) = pick(&folders, at) else { continue };
                    let name = format!("n{}", next_id);
                    let path = match table.get(parent) {
                        Some(p) if p.is_root() => name.clone(),
                        Some(p) => format!("{}/{}", p.path, name),
                        None => continue,
                    };
                    let node = if matches!(edit, Edit::AddFolder(_)) {
                        TreeNode::folder(next_id, &name, &path, parent)
                    } else {
                        TreeNode::file(next_id, &name, &path, parent, "")
                    };
                    next_id += 1;
                    let added = controller.dispatch(Action::AddNode { node });
                    prop_assert!(added.is_ok());
                }
                Edit::Delete(at) => {
                    let Some(id) = pick(&others, at) else { continue };
                    controller.delete(id).unwrap();
                    deleted.insert(id);
                }
                Edit::ToggleSelect(at) => {
                    let Some(id) = pick(&others, at) else { continue };
                    controller.dispatch(Action::ToggleSelect { id }).unwrap();
                }
            }

            let table = controller.table();
            let orphans: HashSet<NodeId> = table.orphans().into_iter().collect();
            for node in table.iter().filter(|n| !n.is_root()) {
                match missing_ancestor(table, node.id) {
                    None => {
                        prop_assert!(table.reaches_root(node.id));
                        prop_assert!(!orphans.contains(&node.id));
                    }
                    Some(gap) => {
                        prop_assert!(deleted.contains(&gap));
                        prop_assert!(orphans.contains(&node.id));
                    }
                }
            }
            for &id in &table.root().unwrap().children {
                prop_assert!(table.contains(id));
            }
            prop_assert!(controller.state().selected_ids.len() <= 1);
        }
    }
}
