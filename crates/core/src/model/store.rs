use std::sync::OnceLock;

use flame_levels_protocol::SharedStr;

use crate::model::{DiffShares, FlameTree, LabelIndex, LevelItem, Levels, NodeId, ProfileTable};
use crate::transform::levels::nested_set_to_levels;
use crate::transform::sandwich::{self, Sandwich};

/// A validated profile plus its lazily materialized tree.
///
/// The tree is built on first access and kept for the life of the store;
/// the table is immutable, so the cache never goes stale.
#[derive(Debug)]
pub struct ProfileStore {
    table: ProfileTable,
    tree: OnceLock<FlameTree>,
}

impl ProfileStore {
    pub fn new(table: ProfileTable) -> Self {
        Self {
            table,
            tree: OnceLock::new(),
        }
    }

    pub fn table(&self) -> &ProfileTable {
        &self.table
    }

    pub fn tree(&self) -> &FlameTree {
        self.tree.get_or_init(|| nested_set_to_levels(&self.table))
    }

    pub fn levels(&self) -> &Levels {
        &self.tree().levels
    }

    pub fn label_index(&self) -> &LabelIndex {
        &self.tree().label_index
    }

    /// Every node in the primary tree with this label.
    pub fn nodes_with_label(&self, label: &str) -> &[NodeId] {
        self.label_index().get(label)
    }

    /// Label of a node, taken from its first folded row.
    pub fn label_of(&self, item: &LevelItem) -> &SharedStr {
        self.table.label(item.first_index())
    }

    /// Callers and callees of every occurrence of `label`, merged.
    /// Recomputed on every call.
    pub fn sandwich(&self, label: &str) -> Sandwich {
        sandwich::sandwich_levels(&self.table, self.levels(), self.nodes_with_label(label))
    }

    /// Formatted inclusive ticks over one or more rows.
    pub fn value_display(&self, indexes: &[usize]) -> String {
        self.table.unit().format_value(self.table.value_of(indexes))
    }

    /// Formatted exclusive ticks over one or more rows.
    pub fn self_display(&self, indexes: &[usize]) -> String {
        self.table.unit().format_value(self.table.self_of(indexes))
    }

    /// Baseline and comparison shares of one or more rows, each relative to
    /// its own side's total. `None` unless the table is a diff profile.
    pub fn diff_shares(&self, indexes: &[usize]) -> Option<DiffShares> {
        let comparison = self.table.value_right_of(indexes)?;
        let roots: Vec<usize> = self
            .levels()
            .roots()
            .flat_map(|root| root.item_indexes.iter().copied())
            .collect();
        let comparison_total = self.table.value_right_of(&roots)?;
        Some(DiffShares::new(
            self.table.value_left_of(indexes),
            self.table.value_left_of(&roots),
            comparison,
            comparison_total,
        ))
    }
}

impl From<ProfileTable> for ProfileStore {
    fn from(table: ProfileTable) -> Self {
        Self::new(table)
    }
}
