use std::collections::HashMap;

use flame_levels_protocol::{SharedStr, ValueUnit};
use thiserror::Error;
use tracing::warn;

use crate::model::{LabelColumn, MalformedInputError, ProfileTable, TableColumns};

#[derive(Debug, Error)]
pub enum CollapsedParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("no valid stack lines found")]
    Empty,
    #[error(transparent)]
    Table(#[from] MalformedInputError),
}

/// A call path prefix shared by one or more stack lines.
struct StackNode {
    name: SharedStr,
    value: f64,
    children: Vec<usize>,
}

/// Parse Brendan Gregg's collapsed/folded stack format into a profile table.
///
/// Each line is `frame;frame;... count`. Stacks sharing a prefix are
/// merged, siblings keep the order they first appear in, and rows are
/// emitted in pre-order with `self = value - sum(children)`.
pub fn parse_collapsed(data: &[u8]) -> Result<ProfileTable, CollapsedParseError> {
    let text = std::str::from_utf8(data)?;
    let mut nodes: Vec<StackNode> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut lookup: HashMap<(Option<usize>, &str), usize> = HashMap::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Split into stack and count: "a;b;c 42"
        let Some((stack_str, count_str)) = line.rsplit_once(' ') else {
            warn!(line = line_no + 1, "skipping stack line without a count");
            continue;
        };
        let count: f64 = match count_str.trim().parse() {
            Ok(count) if count >= 0.0 => count,
            _ => {
                warn!(
                    line = line_no + 1,
                    count = count_str,
                    "skipping stack line with a bad count"
                );
                continue;
            }
        };

        let mut parent: Option<usize> = None;
        for name in stack_str.split(';').map(str::trim).filter(|n| !n.is_empty()) {
            let id = match lookup.get(&(parent, name)) {
                Some(&id) => id,
                None => {
                    let id = nodes.len();
                    nodes.push(StackNode {
                        name: SharedStr::from(name),
                        value: 0.0,
                        children: Vec::new(),
                    });
                    match parent {
                        Some(p) => nodes[p].children.push(id),
                        None => roots.push(id),
                    }
                    lookup.insert((parent, name), id);
                    id
                }
            };
            nodes[id].value += count;
            parent = Some(id);
        }
    }

    if nodes.is_empty() {
        return Err(CollapsedParseError::Empty);
    }

    let mut labels = Vec::with_capacity(nodes.len());
    let mut levels = Vec::with_capacity(nodes.len());
    let mut values = Vec::with_capacity(nodes.len());
    let mut self_values = Vec::with_capacity(nodes.len());

    let mut stack: Vec<(usize, u32)> = roots.iter().rev().map(|&r| (r, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        let node = &nodes[id];
        let children_total: f64 = node.children.iter().map(|&c| nodes[c].value).sum();
        labels.push(node.name.clone());
        levels.push(depth);
        values.push(node.value);
        self_values.push((node.value - children_total).max(0.0));
        stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
    }

    Ok(ProfileTable::new(TableColumns {
        label: Some(LabelColumn::Text(labels)),
        level: Some(levels),
        value: Some(values),
        self_value: Some(self_values),
        value_right: None,
        self_right: None,
        unit: ValueUnit::Short,
    })?)
}
