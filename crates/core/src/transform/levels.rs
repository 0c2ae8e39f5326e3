use tracing::debug;

use crate::model::{FlameTree, LabelIndex, Levels, NodeId, ProfileTable};

/// Turn the pre-order rows of `table` into explicit levels and a label index.
///
/// A row one level deeper than its predecessor is that predecessor's first
/// child and starts where it starts. Any other row follows the last node
/// already placed on its level and shares that node's parent.
pub fn nested_set_to_levels(table: &ProfileTable) -> FlameTree {
    let mut levels = Levels::new();
    let mut label_index = LabelIndex::default();
    let mut previous: Option<(NodeId, u32)> = None;

    for i in 0..table.len() {
        let level = table.level(i);
        let descending = previous.is_none_or(|(_, prev_level)| prev_level < level);

        let (start, parent) = match (descending, levels.level(level as usize).last()) {
            (false, Some(&sibling)) => {
                let sibling = levels.item(sibling);
                (sibling.end(), sibling.parent())
            }
            _ => match previous {
                Some((prev, prev_level)) if prev_level < level => {
                    (levels.item(prev).start, Some(prev))
                }
                // First row of the table.
                _ => (0.0, None),
            },
        };

        let id = levels.push(level as usize, start, table.value(i), vec![i], parent);
        label_index.insert(table.label(i).clone(), id);
        previous = Some((id, level));
    }

    debug!(
        rows = table.len(),
        depth = levels.len(),
        labels = label_index.len(),
        "materialized flame graph levels"
    );

    FlameTree {
        levels,
        label_index,
    }
}
