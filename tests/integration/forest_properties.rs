use notes_tree::tree::{Forest, NodeMeta, NodeRecord, SortType};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    AddFolder(usize),
    AddFile(usize),
    Move { source: usize, target: usize },
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<usize>().prop_map(Op::AddFolder),
        3 => any::<usize>().prop_map(Op::AddFile),
        3 => (any::<usize>(), any::<usize>()).prop_map(|(source, target)| Op::Move { source, target }),
        1 => any::<usize>().prop_map(Op::Remove),
    ]
}

fn pick(ids: &[String], n: usize) -> Option<String> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[n % ids.len()].clone())
    }
}

/// Apply operations the way the store does: moves are validated first.
fn build(ops: &[Op]) -> Forest {
    let mut forest = Forest::new();
    let mut next = 0usize;
    for op in ops {
        let ids: Vec<String> = forest.preorder().iter().map(|r| r.meta.id.clone()).collect();
        let folders: Vec<String> = forest
            .preorder()
            .iter()
            .filter(|r| r.is_folder())
            .map(|r| r.meta.id.clone())
            .collect();
        match op {
            Op::AddFolder(n) | Op::AddFile(n) => {
                next += 1;
                let id = format!("n{}", next);
                let meta = NodeMeta::new(id.clone(), format!("{} {}", id, n % 7));
                let record = if matches!(op, Op::AddFolder(_)) {
                    NodeRecord::folder(meta)
                } else {
                    NodeRecord::file(meta)
                };
                let parent = if n % 3 == 0 { None } else { pick(&folders, *n) };
                forest.insert(parent.as_deref(), record, None).unwrap();
            }
            Op::Move { source, target } => {
                let (Some(source), Some(target)) = (pick(&ids, *source), pick(&folders, *target)) else {
                    continue;
                };
                if source == target || forest.is_ancestor(&source, &target) {
                    continue;
                }
                forest.detach(&source);
                forest.attach(&source, Some(&target), None).unwrap();
            }
            Op::Remove(n) => {
                if let Some(id) = pick(&ids, *n) {
                    forest.remove(&id);
                }
            }
        }
    }
    forest
}

proptest! {
    #[test]
    fn prop_every_node_reachable_exactly_once(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let forest = build(&ops);
        let walked: Vec<String> = forest.preorder().iter().map(|r| r.meta.id.clone()).collect();
        let unique: HashSet<&String> = walked.iter().collect();
        prop_assert_eq!(walked.len(), forest.len());
        prop_assert_eq!(unique.len(), walked.len());
        for id in &walked {
            prop_assert!(!forest.is_ancestor(id, id));
        }
    }

    #[test]
    fn prop_parent_links_match_child_lists(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let forest = build(&ops);
        for record in forest.preorder() {
            match record.parent.as_deref() {
                Some(pid) => {
                    let parent = forest.get(pid).unwrap();
                    prop_assert!(parent.is_folder());
                    prop_assert!(parent.children().contains(&record.meta.id));
                }
                None => prop_assert!(forest.roots().contains(&record.meta.id)),
            }
        }
    }

    #[test]
    fn prop_sort_puts_folders_first_on_every_level(
        ops in prop::collection::vec(op_strategy(), 0..60),
        sort_index in 0usize..6,
    ) {
        let mut forest = build(&ops);
        let before = forest.len();
        let sort_type = SortType::ALL[sort_index];
        forest.sort_levels(|a, b| sort_type.compare(a, b));
        prop_assert_eq!(forest.len(), before);

        let mut levels: Vec<Vec<String>> = vec![forest.roots().to_vec()];
        for record in forest.preorder() {
            if record.is_folder() {
                levels.push(record.children().to_vec());
            }
        }
        for level in levels {
            let kinds: Vec<bool> = level.iter().map(|id| forest.get(id).unwrap().is_folder()).collect();
            let first_file = kinds.iter().position(|f| !f).unwrap_or(kinds.len());
            prop_assert!(kinds[first_file..].iter().all(|f| !f));
        }
    }

    #[test]
    fn prop_tree_paths_follow_ancestry(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut forest = build(&ops);
        let roots = forest.roots().to_vec();
        for root in &roots {
            forest.refresh_tree_paths(root);
        }
        for record in forest.preorder() {
            let expected = match record.parent.as_deref() {
                Some(pid) => format!("{}/{}", forest.get(pid).unwrap().meta.tree_path, record.meta.name),
                None => format!("/{}", record.meta.name),
            };
            prop_assert_eq!(&record.meta.tree_path, &expected);
        }
    }
}
