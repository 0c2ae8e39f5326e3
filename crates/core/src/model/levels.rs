use std::collections::HashMap;

use flame_levels_protocol::SharedStr;
use serde::Serialize;

/// Handle to a [`LevelItem`] inside the [`Levels`] arena that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One explicit flame graph node.
#[derive(Debug, Clone, Serialize)]
pub struct LevelItem {
    /// Ticks from the left edge of the graph.
    pub start: f64,
    pub value: f64,
    /// Source rows folded into this node. Never empty.
    pub item_indexes: Vec<usize>,
    /// Row of the levels array holding this node.
    pub level: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl LevelItem {
    /// The node whose span contains this node's span.
    ///
    /// In a callers tree this is the callee one step closer to the
    /// selected function, drawn on the level below.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn end(&self) -> f64 {
        self.start + self.value
    }

    /// First source row, used for labels and tooltips.
    pub fn first_index(&self) -> usize {
        self.item_indexes[0]
    }
}

/// Flame graph nodes grouped by depth, left to right.
///
/// Within a level `start` never decreases, which hit-testing relies on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Levels {
    items: Vec<LevelItem>,
    rows: Vec<Vec<NodeId>>,
    inverted: bool,
}

impl Levels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node at the end of `level`, linking it under `parent`.
    pub(crate) fn push(
        &mut self,
        level: usize,
        start: f64,
        value: f64,
        item_indexes: Vec<usize>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.items.len());
        self.items.push(LevelItem {
            start,
            value,
            item_indexes,
            level,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.items[p.index()].children.push(id);
        }
        if self.rows.len() <= level {
            self.rows.resize_with(level + 1, Vec::new);
        }
        self.rows[level].push(id);
        id
    }

    /// Flip the level order so the deepest level comes first.
    pub(crate) fn reverse(&mut self) {
        self.rows.reverse();
        self.inverted = !self.inverted;
        for (level, row) in self.rows.iter().enumerate() {
            for id in row {
                self.items[id.index()].level = level;
            }
        }
    }

    /// Restore left-to-right order after nodes were appended out of order.
    pub(crate) fn sort_rows(&mut self) {
        let items = &self.items;
        for row in &mut self.rows {
            row.sort_by(|a, b| items[a.index()].start.total_cmp(&items[b.index()].start));
        }
    }

    /// Whether roots sit on the last level (a callers tree).
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, id: NodeId) -> &LevelItem {
        &self.items[id.index()]
    }

    /// Node ids of one level; empty past the deepest level.
    pub fn level(&self, level: usize) -> &[NodeId] {
        self.rows.get(level).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn items_at(&self, level: usize) -> impl Iterator<Item = &LevelItem> {
        self.level(level).iter().map(|&id| self.item(id))
    }

    /// `levels[level][bar]`, if present.
    pub fn bar(&self, level: usize, bar: usize) -> Option<&LevelItem> {
        self.rows
            .get(level)
            .and_then(|row| row.get(bar))
            .map(|&id| self.item(id))
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> impl Iterator<Item = &LevelItem> {
        self.items.iter().filter(|item| item.parent.is_none())
    }

    /// Sum of root values: the width the whole graph represents.
    pub fn total_ticks(&self) -> f64 {
        self.roots().map(|item| item.value).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LevelItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (NodeId(i), item))
    }
}

/// All nodes carrying a given label, in construction order.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex(HashMap<SharedStr, Vec<NodeId>>);

impl LabelIndex {
    pub(crate) fn insert(&mut self, label: SharedStr, id: NodeId) {
        self.0.entry(label).or_default().push(id);
    }

    pub fn get(&self, label: &str) -> &[NodeId] {
        self.0.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Materialized primary tree of a profile.
#[derive(Debug, Clone, Default)]
pub struct FlameTree {
    pub levels: Levels,
    pub label_index: LabelIndex,
}
