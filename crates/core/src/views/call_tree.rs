//! Tabular call tree: one row per node with self/total columns, built from
//! the primary tree or from the callers half of a sandwich.

use flame_levels_protocol::SharedStr;
use serde::{Deserialize, Serialize};

use crate::model::diff::percent_of;
use crate::model::{DiffShares, Levels, NodeId, ProfileStore};

/// Column a call tree is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallTreeSort {
    #[default]
    Total,
    SelfTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallTreeNode {
    pub node: NodeId,
    pub label: SharedStr,
    /// Distance from the tree's root row.
    pub depth: usize,
    pub total: f64,
    pub self_value: f64,
    /// Shares of the whole profile.
    pub total_percent: f64,
    pub self_percent: f64,
    pub item_indexes: Vec<usize>,
    /// Number of rows below this one.
    pub subtree_size: usize,
    /// Present for diff profiles.
    pub diff: Option<DiffShares>,
    pub children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    fn sort_value(&self, key: CallTreeSort) -> f64 {
        match key {
            CallTreeSort::Total => self.total,
            CallTreeSort::SelfTime => self.self_value,
        }
    }
}

/// Call tree of the whole profile, one root row per root node.
pub fn build_call_tree(store: &ProfileStore) -> Vec<CallTreeNode> {
    call_tree_from_levels(store, store.levels())
}

/// Inverted call tree for `label`: the merged function is the single root
/// and each row's children are its callers. Empty when the label does not
/// occur.
pub fn build_callers_tree(store: &ProfileStore, label: &str) -> Vec<CallTreeNode> {
    call_tree_from_levels(store, &store.sandwich(label).callers)
}

/// Convert the parent/child links of `levels` into nested rows.
///
/// Totals are the nodes' own values, so callers keep their trimmed
/// values. Self time, diff shares and percentages come from the table rows
/// and the primary tree's total.
pub fn call_tree_from_levels(store: &ProfileStore, levels: &Levels) -> Vec<CallTreeNode> {
    let table = store.table();
    let profile_total = store.levels().total_ticks();

    // Parents precede their children in every arena built by this crate.
    let mut depth = vec![0usize; levels.node_count()];
    for (id, item) in levels.iter() {
        if let Some(parent) = item.parent() {
            depth[id.index()] = depth[parent.index()] + 1;
        }
    }

    let mut built: Vec<Option<CallTreeNode>> = vec![None; levels.node_count()];
    let mut roots = Vec::new();
    let ids: Vec<NodeId> = levels.iter().map(|(id, _)| id).collect();
    for &id in ids.iter().rev() {
        let item = levels.item(id);
        let children: Vec<CallTreeNode> = item
            .children()
            .iter()
            .filter_map(|c| built[c.index()].take())
            .collect();
        let self_value = table.self_of(&item.item_indexes);
        let node = CallTreeNode {
            node: id,
            label: store.label_of(item).clone(),
            depth: depth[id.index()],
            total: item.value,
            self_value,
            total_percent: percent_of(item.value, profile_total),
            self_percent: percent_of(self_value, profile_total),
            item_indexes: item.item_indexes.clone(),
            subtree_size: children.iter().map(|c| c.subtree_size + 1).sum(),
            diff: store.diff_shares(&item.item_indexes),
            children,
        };
        if item.parent().is_some() {
            built[id.index()] = Some(node);
        } else {
            roots.push(node);
        }
    }
    roots.reverse();
    roots
}

/// Order every level of the tree by `key`, largest first when `descending`.
pub fn sort_call_tree(nodes: &mut Vec<CallTreeNode>, key: CallTreeSort, descending: bool) {
    let mut pending = vec![nodes];
    while let Some(rows) = pending.pop() {
        rows.sort_by(|a, b| {
            let order = a.sort_value(key).total_cmp(&b.sort_value(key));
            if descending { order.reverse() } else { order }
        });
        for row in rows {
            pending.push(&mut row.children);
        }
    }
}

/// First row, in pre-order, whose rows are exactly `item_indexes`.
pub fn find_by_item_indexes<'a>(
    nodes: &'a [CallTreeNode],
    item_indexes: &[usize],
) -> Option<&'a CallTreeNode> {
    find_with_parent(nodes, item_indexes).map(|(node, _)| node)
}

/// Rows to show when focusing on the node with `item_indexes`: its parent
/// holding only that node, or the node alone when it is a root.
pub fn focus_call_tree(
    nodes: &[CallTreeNode],
    item_indexes: &[usize],
) -> Option<Vec<CallTreeNode>> {
    let (node, parent) = find_with_parent(nodes, item_indexes)?;
    let focused = match parent {
        Some(parent) => CallTreeNode {
            children: vec![node.clone()],
            subtree_size: node.subtree_size + 1,
            ..parent.clone()
        },
        None => node.clone(),
    };
    Some(vec![focused])
}

fn find_with_parent<'a>(
    nodes: &'a [CallTreeNode],
    item_indexes: &[usize],
) -> Option<(&'a CallTreeNode, Option<&'a CallTreeNode>)> {
    let mut stack: Vec<(&CallTreeNode, Option<&CallTreeNode>)> =
        nodes.iter().rev().map(|n| (n, None)).collect();
    while let Some((node, parent)) = stack.pop() {
        if node.item_indexes == item_indexes {
            return Some((node, parent));
        }
        stack.extend(node.children.iter().rev().map(|c| (c, Some(node))));
    }
    None
}
