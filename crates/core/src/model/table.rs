use std::collections::HashSet;

use flame_levels_protocol::{SharedStr, ValueUnit};
use thiserror::Error;

/// Rejection reasons for a columnar profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInputError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("column `{column}` has {len} rows, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("row {row}: label code {code} is outside the enum table ({names} entries)")]
    UnknownLabelCode { row: usize, code: u32, names: usize },
    #[error("first row is at level {level}, expected 0")]
    FirstRowNotRoot { level: u32 },
    #[error("row {row}: level jumps from {previous} to {level}")]
    LevelJump { row: usize, previous: u32, level: u32 },
    #[error("row {row}: `{column}` is {value}, expected a finite non-negative number")]
    InvalidTicks {
        row: usize,
        column: &'static str,
        value: f64,
    },
    #[error("row {row}: children sum to {children} but the row's value is {value}")]
    ChildrenExceedParent { row: usize, value: f64, children: f64 },
    #[error("row {row}: `{column}` is {right}, more than the combined {total}")]
    RightExceedsTotal {
        row: usize,
        column: &'static str,
        right: f64,
        total: f64,
    },
}

/// Relative slack allowed when comparing summed ticks.
const SUM_TOLERANCE: f64 = 1e-9;

/// The label column, either literal strings or codes into a decode table.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelColumn {
    Text(Vec<SharedStr>),
    Enum {
        codes: Vec<u32>,
        names: Vec<SharedStr>,
    },
}

impl LabelColumn {
    fn len(&self) -> usize {
        match self {
            Self::Text(labels) => labels.len(),
            Self::Enum { codes, .. } => codes.len(),
        }
    }
}

/// Raw, possibly incomplete columns as decoded from some input format.
#[derive(Debug, Clone, Default)]
pub struct TableColumns {
    pub label: Option<LabelColumn>,
    pub level: Option<Vec<u32>>,
    pub value: Option<Vec<f64>>,
    pub self_value: Option<Vec<f64>>,
    /// Comparison side of a diff profile; `value` and `self` then hold
    /// baseline plus comparison.
    pub value_right: Option<Vec<f64>>,
    pub self_right: Option<Vec<f64>>,
    pub unit: ValueUnit,
}

#[derive(Debug, Clone)]
struct RightColumns {
    values: Vec<f64>,
    self_values: Vec<f64>,
}

/// A validated profile in depth-first pre-order: one row per call tree node.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    labels: LabelColumn,
    levels: Vec<u32>,
    values: Vec<f64>,
    self_values: Vec<f64>,
    right: Option<RightColumns>,
    unit: ValueUnit,
}

impl ProfileTable {
    /// Validate the columns and build a table.
    ///
    /// Rows must describe a pre-order traversal: the first row sits at level
    /// 0 and no row is more than one level deeper than its predecessor.
    /// A row's children never add up to more than its own value. Diff
    /// columns are optional but come as a pair.
    pub fn new(columns: TableColumns) -> Result<Self, MalformedInputError> {
        let labels = columns
            .label
            .ok_or(MalformedInputError::MissingColumn("label"))?;
        let levels = columns
            .level
            .ok_or(MalformedInputError::MissingColumn("level"))?;
        let values = columns
            .value
            .ok_or(MalformedInputError::MissingColumn("value"))?;
        let self_values = columns
            .self_value
            .ok_or(MalformedInputError::MissingColumn("self"))?;

        let right = match (columns.value_right, columns.self_right) {
            (None, None) => None,
            (Some(_), None) => return Err(MalformedInputError::MissingColumn("selfRight")),
            (None, Some(_)) => return Err(MalformedInputError::MissingColumn("valueRight")),
            (Some(values), Some(self_values)) => Some(RightColumns {
                values,
                self_values,
            }),
        };

        let expected = labels.len();
        let right_lens = right.as_ref().map(|r| {
            [
                ("valueRight", r.values.len()),
                ("selfRight", r.self_values.len()),
            ]
        });
        for (column, len) in [
            ("level", levels.len()),
            ("value", values.len()),
            ("self", self_values.len()),
        ]
        .into_iter()
        .chain(right_lens.into_iter().flatten())
        {
            if len != expected {
                return Err(MalformedInputError::LengthMismatch {
                    column,
                    len,
                    expected,
                });
            }
        }

        if let LabelColumn::Enum { codes, names } = &labels
            && let Some((row, &code)) = codes
                .iter()
                .enumerate()
                .find(|(_, c)| **c as usize >= names.len())
        {
            return Err(MalformedInputError::UnknownLabelCode {
                row,
                code,
                names: names.len(),
            });
        }

        check_pre_order(&levels)?;
        check_ticks("value", &values)?;
        check_ticks("self", &self_values)?;
        check_nesting(&levels, &values)?;
        if let Some(right) = &right {
            check_ticks("valueRight", &right.values)?;
            check_ticks("selfRight", &right.self_values)?;
            check_within("valueRight", &right.values, &values)?;
            check_within("selfRight", &right.self_values, &self_values)?;
        }

        Ok(Self {
            labels,
            levels,
            values,
            self_values,
            right,
            unit: columns.unit,
        })
    }

    /// Build a table from `(label, level, value, self)` rows.
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = (&'a str, u32, f64, f64)>,
        unit: ValueUnit,
    ) -> Result<Self, MalformedInputError> {
        let mut labels = Vec::new();
        let mut levels = Vec::new();
        let mut values = Vec::new();
        let mut self_values = Vec::new();
        for (label, level, value, self_value) in rows {
            labels.push(SharedStr::from(label));
            levels.push(level);
            values.push(value);
            self_values.push(self_value);
        }
        Self::new(TableColumns {
            label: Some(LabelColumn::Text(labels)),
            level: Some(levels),
            value: Some(values),
            self_value: Some(self_values),
            unit,
            ..TableColumns::default()
        })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn unit(&self) -> ValueUnit {
        self.unit
    }

    /// Label of row `i`, decoded through the enum table when needed.
    pub fn label(&self, i: usize) -> &SharedStr {
        match &self.labels {
            LabelColumn::Text(labels) => &labels[i],
            // Codes were range-checked in `new`.
            LabelColumn::Enum { codes, names } => &names[codes[i] as usize],
        }
    }

    pub fn level(&self, i: usize) -> u32 {
        self.levels[i]
    }

    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn self_value(&self, i: usize) -> f64 {
        self.self_values[i]
    }

    /// Summed `value` over several rows (a merged sandwich node).
    pub fn value_of(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.values[i]).sum()
    }

    /// Summed `self` over several rows.
    pub fn self_of(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.self_values[i]).sum()
    }

    /// Whether the table carries a baseline/comparison split.
    pub fn is_diff(&self) -> bool {
        self.right.is_some()
    }

    /// Comparison-side `value` of row `i`; `None` for a plain profile.
    pub fn value_right(&self, i: usize) -> Option<f64> {
        self.right.as_ref().map(|r| r.values[i])
    }

    pub fn self_right(&self, i: usize) -> Option<f64> {
        self.right.as_ref().map(|r| r.self_values[i])
    }

    /// Summed comparison-side `value` over several rows.
    pub fn value_right_of(&self, indexes: &[usize]) -> Option<f64> {
        self.right
            .as_ref()
            .map(|r| indexes.iter().map(|&i| r.values[i]).sum())
    }

    pub fn self_right_of(&self, indexes: &[usize]) -> Option<f64> {
        self.right
            .as_ref()
            .map(|r| indexes.iter().map(|&i| r.self_values[i]).sum())
    }

    /// Baseline-side `value` over several rows: the combined value minus
    /// the comparison. Equal to [`value_of`](Self::value_of) for a plain profile.
    pub fn value_left_of(&self, indexes: &[usize]) -> f64 {
        self.value_of(indexes) - self.value_right_of(indexes).unwrap_or(0.0)
    }

    /// Distinct labels: enum-declared order for enum columns, first
    /// occurrence otherwise.
    pub fn unique_labels(&self) -> Vec<SharedStr> {
        match &self.labels {
            LabelColumn::Enum { names, .. } => {
                let mut seen = HashSet::with_capacity(names.len());
                names
                    .iter()
                    .filter(|n| seen.insert(n.as_str()))
                    .cloned()
                    .collect()
            }
            LabelColumn::Text(labels) => {
                let mut seen = HashSet::new();
                labels
                    .iter()
                    .filter(|l| seen.insert(l.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }
}

fn check_pre_order(levels: &[u32]) -> Result<(), MalformedInputError> {
    if let Some(&first) = levels.first()
        && first != 0
    {
        return Err(MalformedInputError::FirstRowNotRoot { level: first });
    }
    for (row, pair) in levels.windows(2).enumerate() {
        let (previous, level) = (pair[0], pair[1]);
        if level > previous + 1 {
            return Err(MalformedInputError::LevelJump {
                row: row + 1,
                previous,
                level,
            });
        }
    }
    Ok(())
}

/// Each row's direct children must fit inside it.
fn check_nesting(levels: &[u32], values: &[f64]) -> Result<(), MalformedInputError> {
    // (row, summed children) for every row still open on the current path.
    let mut open: Vec<(usize, f64)> = Vec::new();
    for (row, &level) in levels.iter().enumerate() {
        while open.len() > level as usize {
            if let Some((parent, children)) = open.pop() {
                check_children(parent, values[parent], children)?;
            }
        }
        if let Some((_, children)) = open.last_mut() {
            *children += values[row];
        }
        open.push((row, 0.0));
    }
    while let Some((parent, children)) = open.pop() {
        check_children(parent, values[parent], children)?;
    }
    Ok(())
}

fn check_children(row: usize, value: f64, children: f64) -> Result<(), MalformedInputError> {
    if children > value + SUM_TOLERANCE * value.max(1.0) {
        return Err(MalformedInputError::ChildrenExceedParent {
            row,
            value,
            children,
        });
    }
    Ok(())
}

fn check_within(
    column: &'static str,
    right: &[f64],
    totals: &[f64],
) -> Result<(), MalformedInputError> {
    match right
        .iter()
        .zip(totals)
        .position(|(r, t)| *r > t + SUM_TOLERANCE * t.max(1.0))
    {
        Some(row) => Err(MalformedInputError::RightExceedsTotal {
            row,
            column,
            right: right[row],
            total: totals[row],
        }),
        None => Ok(()),
    }
}

fn check_ticks(column: &'static str, ticks: &[f64]) -> Result<(), MalformedInputError> {
    match ticks
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        Some((row, &value)) => Err(MalformedInputError::InvalidTicks { row, column, value }),
        None => Ok(()),
    }
}
