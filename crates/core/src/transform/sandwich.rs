use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::model::{Levels, NodeId, ProfileTable};

/// Merged callers and callees of one function.
///
/// `callers` is inverted: its last level holds the selected function and
/// level 0 the outermost callers. `callees` starts with the selected
/// function. Both are empty when the label does not occur.
#[derive(Debug, Clone, Default)]
pub struct Sandwich {
    pub callers: Levels,
    pub callees: Levels,
}

impl Sandwich {
    pub fn is_empty(&self) -> bool {
        self.callers.is_empty() && self.callees.is_empty()
    }
}

/// Which neighbours a merge walks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Callees,
    Callers,
}

/// A node of the primary tree feeding a merge, with the value it brings.
///
/// Callees bring their own value. A caller brings the value of the
/// occurrence it was reached from, so merged callers only account for
/// the paths that actually lead to the selected function.
#[derive(Debug, Clone, Copy)]
struct Source {
    node: NodeId,
    value: f64,
}

/// Build both halves of the sandwich view for the given occurrences.
pub fn sandwich_levels(table: &ProfileTable, levels: &Levels, occurrences: &[NodeId]) -> Sandwich {
    if occurrences.is_empty() {
        return Sandwich::default();
    }
    let sandwich = Sandwich {
        callers: merge_subtrees(table, levels, occurrences, Direction::Callers),
        callees: merge_subtrees(table, levels, occurrences, Direction::Callees),
    };
    debug!(
        occurrences = occurrences.len(),
        caller_levels = sandwich.callers.len(),
        callee_levels = sandwich.callees.len(),
        "merged sandwich view"
    );
    sandwich
}

/// Fuse `roots` into one node and merge their neighbours level by level.
///
/// Neighbours reached from one merged node are grouped by label, in the
/// order labels are first seen; each group becomes a single node whose
/// value is the sum of the group and whose rows are the concatenation of
/// the group's rows. A node starts right after the siblings already placed
/// under the same merged parent.
///
/// The walk is a breadth-first queue, so depth never exceeds the source
/// tree's depth and no recursion is involved.
pub fn merge_subtrees(
    table: &ProfileTable,
    source: &Levels,
    roots: &[NodeId],
    direction: Direction,
) -> Levels {
    let mut merged = Levels::new();
    if roots.is_empty() {
        return merged;
    }

    let roots: Vec<Source> = roots
        .iter()
        .map(|&node| Source {
            node,
            value: source.item(node).value,
        })
        .collect();
    let mut queue: VecDeque<(Option<NodeId>, Vec<Source>, usize)> = VecDeque::new();
    queue.push_back((None, roots, 0));

    while let Some((previous, group, level)) = queue.pop_front() {
        let value = group.iter().map(|s| s.value).sum();
        let item_indexes = group
            .iter()
            .flat_map(|s| source.item(s.node).item_indexes.iter().copied())
            .collect();
        let start = previous.map_or(0.0, |p| {
            let p = merged.item(p);
            let placed: f64 = p.children().iter().map(|&c| merged.item(c).value).sum();
            p.start + placed
        });
        let id = merged.push(level, start, value, item_indexes, previous);

        let mut next = Vec::new();
        for s in &group {
            let item = source.item(s.node);
            match direction {
                Direction::Callees => next.extend(item.children().iter().map(|&c| Source {
                    node: c,
                    value: source.item(c).value,
                })),
                Direction::Callers => next.extend(item.parent().map(|p| Source {
                    node: p,
                    value: s.value,
                })),
            }
        }
        for group in group_by_label(table, source, next) {
            queue.push_back((Some(id), group, level + 1));
        }
    }

    if direction == Direction::Callers {
        merged.reverse();
    }
    merged
}

fn group_by_label(table: &ProfileTable, source: &Levels, items: Vec<Source>) -> Vec<Vec<Source>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<Source>> = Vec::new();
    for s in items {
        let label = table.label(source.item(s.node).first_index()).as_str();
        match slots.entry(label) {
            Entry::Occupied(slot) => groups[*slot.get()].push(s),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(vec![s]);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileStore;
    use flame_levels_protocol::ValueUnit;

    fn store(rows: &[(&str, u32, f64)]) -> ProfileStore {
        let table = ProfileTable::from_rows(
            rows.iter().map(|&(label, level, value)| (label, level, value, 0.0)),
            ValueUnit::Short,
        )
        .unwrap();
        ProfileStore::new(table)
    }

    fn labelled(store: &ProfileStore, levels: &Levels, level: usize) -> Vec<(String, f64, f64)> {
        levels
            .items_at(level)
            .map(|i| (store.label_of(i).to_string(), i.start, i.value))
            .collect()
    }

    #[test]
    fn caller_root_is_trimmed_to_the_target() {
        let store = store(&[("root", 0, 300.0), ("a", 1, 200.0), ("b", 1, 100.0)]);
        let sandwich = store.sandwich("a");

        assert_eq!(sandwich.callees.len(), 1);
        let target = sandwich.callees.bar(0, 0).unwrap();
        assert_eq!(target.value, 200.0);
        assert_eq!(target.item_indexes, [1]);

        assert_eq!(sandwich.callers.len(), 2);
        assert_eq!(labelled(&store, &sandwich.callers, 0), [("root".to_string(), 0.0, 200.0)]);
        assert_eq!(labelled(&store, &sandwich.callers, 1), [("a".to_string(), 0.0, 200.0)]);
    }

    #[test]
    fn unknown_label_is_empty() {
        let store = store(&[("root", 0, 300.0), ("a", 1, 200.0)]);
        let sandwich = store.sandwich("nonexistent");
        assert!(sandwich.is_empty());
        assert!(sandwich.callers.is_empty());
        assert!(sandwich.callees.is_empty());
    }

    #[test]
    fn callees_merge_by_label_at_each_depth() {
        // main
        //   x
        //     f
        //       g (3)
        //       h (1)
        //   y
        //     f
        //       g (2)
        let store = store(&[
            ("main", 0, 12.0),
            ("x", 1, 6.0),
            ("f", 2, 5.0),
            ("g", 3, 3.0),
            ("h", 3, 1.0),
            ("y", 1, 6.0),
            ("f", 2, 4.0),
            ("g", 3, 2.0),
        ]);
        let sandwich = store.sandwich("f");

        let root = sandwich.callees.bar(0, 0).unwrap();
        assert_eq!(root.value, 9.0);
        assert_eq!(root.item_indexes, [2, 6]);
        assert_eq!(
            labelled(&store, &sandwich.callees, 1),
            [("g".to_string(), 0.0, 5.0), ("h".to_string(), 5.0, 1.0)]
        );
        let g = sandwich.callees.bar(1, 0).unwrap();
        assert_eq!(g.item_indexes, [3, 7]);
    }

    #[test]
    fn callers_split_by_path_and_sum_per_caller() {
        let store = store(&[
            ("main", 0, 12.0),
            ("x", 1, 6.0),
            ("f", 2, 5.0),
            ("y", 1, 6.0),
            ("f", 2, 4.0),
        ]);
        let callers = store.sandwich("f").callers;

        assert_eq!(callers.len(), 3);
        // Outermost caller: both paths go through main, each trimmed.
        assert_eq!(labelled(&store, &callers, 0), [
            ("main".to_string(), 0.0, 5.0),
            ("main".to_string(), 5.0, 4.0),
        ]);
        assert_eq!(labelled(&store, &callers, 1), [
            ("x".to_string(), 0.0, 5.0),
            ("y".to_string(), 5.0, 4.0),
        ]);
        assert_eq!(labelled(&store, &callers, 2), [("f".to_string(), 0.0, 9.0)]);

        let target = callers.level(2)[0];
        for &id in callers.level(1) {
            assert_eq!(callers.item(id).parent(), Some(target));
        }
    }

    #[test]
    fn root_level_occurrence_has_no_callers() {
        let store = store(&[("main", 0, 10.0), ("work", 1, 10.0)]);
        let sandwich = store.sandwich("main");
        assert_eq!(sandwich.callers.len(), 1);
        assert_eq!(sandwich.callees.len(), 2);
        assert_eq!(sandwich.callees.bar(1, 0).map(|i| i.value), Some(10.0));
    }

    #[test]
    fn merged_children_stay_inside_their_parent() {
        let store = store(&[
            ("main", 0, 20.0),
            ("f", 1, 8.0),
            ("a", 2, 3.0),
            ("b", 2, 4.0),
            ("g", 1, 12.0),
            ("f", 2, 10.0),
            ("b", 3, 6.0),
            ("c", 3, 2.0),
        ]);
        let sandwich = store.sandwich("f");
        for levels in [&sandwich.callers, &sandwich.callees] {
            for (_, item) in levels.iter() {
                if let Some(p) = item.parent() {
                    let p = levels.item(p);
                    assert!(item.start >= p.start);
                    assert!(item.end() <= p.end() + 1e-9);
                }
            }
        }
    }
}
