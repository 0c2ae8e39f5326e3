use std::collections::HashMap;

use crate::model::{Levels, NodeId};

/// A chain of nodes where each one is the only child of the previous and
/// carries almost all of its value. Such chains add depth without adding
/// information, so they can be folded into their first node.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedGroup {
    pub items: Vec<NodeId>,
    pub collapsed: bool,
}

impl CollapsedGroup {
    pub fn head(&self) -> NodeId {
        self.items[0]
    }
}

/// Collapsible groups of one [`Levels`] and their current state.
#[derive(Debug, Clone, Default)]
pub struct CollapsedMap {
    groups: Vec<CollapsedGroup>,
    membership: HashMap<NodeId, usize>,
}

impl CollapsedMap {
    /// A single child above this share of its parent joins the parent's group.
    pub const DEFAULT_THRESHOLD: f64 = 0.99;

    /// Find every collapsible chain. Groups start out collapsed.
    pub fn build(levels: &Levels, threshold: f64) -> Self {
        let mut map = Self::default();
        // Arena order puts every parent before its children.
        for (id, item) in levels.iter() {
            let Some(parent_id) = item.parent() else {
                continue;
            };
            let parent = levels.item(parent_id);
            if parent.children().len() != 1 || item.value <= parent.value * threshold {
                continue;
            }
            match map.membership.get(&parent_id) {
                Some(&group) => {
                    map.groups[group].items.push(id);
                    map.membership.insert(id, group);
                }
                None => {
                    let group = map.groups.len();
                    map.groups.push(CollapsedGroup {
                        items: vec![parent_id, id],
                        collapsed: true,
                    });
                    map.membership.insert(parent_id, group);
                    map.membership.insert(id, group);
                }
            }
        }
        map
    }

    pub fn groups(&self) -> &[CollapsedGroup] {
        &self.groups
    }

    pub fn group_of(&self, id: NodeId) -> Option<&CollapsedGroup> {
        self.membership.get(&id).map(|&g| &self.groups[g])
    }

    /// Collapse or expand the group containing `id`. Returns `false` when
    /// the node belongs to no group.
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) -> bool {
        match self.membership.get(&id) {
            Some(&g) => {
                self.groups[g].collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        for group in &mut self.groups {
            group.collapsed = collapsed;
        }
    }

    /// Folded away: part of a collapsed group but not its head.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.group_of(id)
            .is_some_and(|g| g.collapsed && g.head() != id)
    }
}

impl Levels {
    /// Copy of these levels with hidden group members removed; their
    /// descendants move up to the nearest visible ancestor.
    pub fn without_hidden(&self, map: &CollapsedMap) -> Levels {
        let mut out = Levels::new();
        let mut remap: Vec<Option<NodeId>> = Vec::with_capacity(self.node_count());

        for (id, item) in self.iter() {
            let parent = item.parent().and_then(|p| remap[p.index()]);
            if map.is_hidden(id) {
                remap.push(parent);
                continue;
            }
            let depth = parent.map_or(0, |p| out.item(p).level + 1);
            let new_id = out.push(depth, item.start, item.value, item.item_indexes.clone(), parent);
            remap.push(Some(new_id));
        }

        out.sort_rows();
        if self.is_inverted() {
            out.reverse();
        }
        out
    }
}
