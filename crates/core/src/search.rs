//! Label search for highlighting.
//!
//! A query containing regex metacharacters is compiled as a
//! case-insensitive pattern; anything else is a case-insensitive
//! substring match.

use flame_levels_protocol::SharedStr;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::model::{NodeId, ProfileStore};

/// Upper bound on the nodes returned by [`search_nodes`] and the labels
/// returned by [`search_labels`].
pub const MAX_MATCHES: usize = 50;

const PATTERN_CHARS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A compiled search query.
#[derive(Debug, Clone)]
pub enum LabelMatcher {
    Pattern(Regex),
    /// Lowercased needle.
    Substring(String),
}

impl LabelMatcher {
    /// Compile `query`. A blank query gives `None`, which matches nothing.
    pub fn new(query: &str) -> Result<Option<Self>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let matcher = if query.contains(PATTERN_CHARS) {
            Self::Pattern(RegexBuilder::new(query).case_insensitive(true).build()?)
        } else {
            Self::Substring(query.to_lowercase())
        };
        Ok(Some(matcher))
    }

    pub fn is_match(&self, label: &str) -> bool {
        match self {
            Self::Pattern(regex) => regex.is_match(label),
            Self::Substring(needle) => label.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// A label that matched, with how much of the profile it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMatch {
    pub label: SharedStr,
    /// Nodes carrying the label in the primary tree.
    pub nodes: usize,
    /// Ticks spent in the label, counting recursive calls once.
    pub total: f64,
}

/// Distinct labels matching `query`, largest total first (ties by label),
/// at most [`MAX_MATCHES`].
pub fn search_labels(store: &ProfileStore, query: &str) -> Result<Vec<LabelMatch>, SearchError> {
    let Some(matcher) = LabelMatcher::new(query)? else {
        return Ok(Vec::new());
    };
    let mut matches: Vec<LabelMatch> = store
        .table()
        .unique_labels()
        .into_iter()
        .filter(|label| matcher.is_match(label))
        .map(|label| LabelMatch {
            nodes: store.nodes_with_label(&label).len(),
            total: label_total(store, &label),
            label,
        })
        .collect();
    matches.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.label.cmp(&b.label))
    });
    matches.truncate(MAX_MATCHES);
    Ok(matches)
}

/// Nodes of the primary tree whose label matches `query`.
///
/// Nodes are collected in pre-order until [`MAX_MATCHES`] are found, then
/// ordered by value, largest first.
pub fn search_nodes(store: &ProfileStore, query: &str) -> Result<Vec<NodeId>, SearchError> {
    let Some(matcher) = LabelMatcher::new(query)? else {
        return Ok(Vec::new());
    };
    let levels = store.levels();
    // Arena order of the primary tree is the table's pre-order.
    let mut found: Vec<NodeId> = levels
        .iter()
        .filter(|(_, item)| matcher.is_match(store.label_of(item)))
        .map(|(id, _)| id)
        .take(MAX_MATCHES)
        .collect();
    found.sort_by(|&a, &b| levels.item(b).value.total_cmp(&levels.item(a).value));
    Ok(found)
}

/// Sum of the label's outermost occurrences.
fn label_total(store: &ProfileStore, label: &str) -> f64 {
    let levels = store.levels();
    store
        .nodes_with_label(label)
        .iter()
        .map(|&id| levels.item(id))
        .filter(|item| {
            let mut parent = item.parent();
            while let Some(p) = parent {
                let ancestor = levels.item(p);
                if store.label_of(ancestor) == label {
                    return false;
                }
                parent = ancestor.parent();
            }
            true
        })
        .map(|item| item.value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileTable;
    use flame_levels_protocol::ValueUnit;

    fn store() -> ProfileStore {
        ProfileStore::new(
            ProfileTable::from_rows(
                [
                    ("main", 0, 10.0, 0.0),
                    ("net/http.Serve", 1, 6.0, 1.0),
                    ("net/http.(*conn).serve", 2, 5.0, 5.0),
                    ("runtime.GC", 1, 4.0, 2.0),
                    ("net/http.(*conn).serve", 2, 2.0, 2.0),
                ],
                ValueUnit::Short,
            )
            .unwrap(),
        )
    }

    fn labels(matches: &[LabelMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.label.as_str()).collect()
    }

    #[test]
    fn substring_is_case_insensitive() {
        let found = search_labels(&store(), "SERVE").unwrap();
        assert_eq!(labels(&found), ["net/http.(*conn).serve", "net/http.Serve"]);
        assert_eq!(found[0].nodes, 2);
        assert_eq!(found[0].total, 7.0);
        assert_eq!(found[1].total, 6.0);
    }

    #[test]
    fn metacharacters_switch_to_regex() {
        let store = store();
        let found = search_labels(&store, "^net.*Serve$").unwrap();
        assert_eq!(labels(&found), ["net/http.(*conn).serve", "net/http.Serve"]);

        let found = search_labels(&store, r"runtime\.gc|main").unwrap();
        assert_eq!(labels(&found), ["main", "runtime.GC"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(matches!(
            search_labels(&store(), "serve("),
            Err(SearchError::InvalidPattern(_))
        ));
        assert!(search_nodes(&store(), "[a-").is_err());
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search_labels(&store(), "   ").unwrap().is_empty());
        assert!(search_nodes(&store(), "").unwrap().is_empty());
    }

    #[test]
    fn nodes_sorted_by_value() {
        let store = store();
        let found = search_nodes(&store, "serve").unwrap();
        let values: Vec<_> = found.iter().map(|&id| store.levels().item(id).value).collect();
        assert_eq!(values, [6.0, 5.0, 2.0]);
        assert!(search_nodes(&store, "nothing").unwrap().is_empty());
    }

    #[test]
    fn node_matches_are_capped() {
        let leaves: Vec<String> = (0..80).map(|i| format!("leaf{i}")).collect();
        let rows = std::iter::once(("root", 0, 80.0, 0.0))
            .chain(leaves.iter().map(|l| (l.as_str(), 1, 1.0, 1.0)));
        let table = ProfileTable::from_rows(rows, ValueUnit::Short).unwrap();
        let store = ProfileStore::new(table);
        assert_eq!(search_nodes(&store, "leaf").unwrap().len(), MAX_MATCHES);
        assert_eq!(search_labels(&store, "leaf").unwrap().len(), MAX_MATCHES);
    }

    #[test]
    fn recursion_counts_once() {
        let store = ProfileStore::new(
            ProfileTable::from_rows(
                [("main", 0, 10.0, 2.0), ("f", 1, 8.0, 3.0), ("f", 2, 5.0, 5.0)],
                ValueUnit::Short,
            )
            .unwrap(),
        );
        let found = search_labels(&store, "f").unwrap();
        assert_eq!(found[0].nodes, 2);
        assert_eq!(found[0].total, 8.0);
    }
}
