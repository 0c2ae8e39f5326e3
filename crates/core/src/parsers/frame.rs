use flame_levels_protocol::{SharedStr, ValueUnit};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{LabelColumn, MalformedInputError, ProfileTable, TableColumns};

#[derive(Debug, Error)]
pub enum FrameParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema has {fields} fields but data has {columns} value columns")]
    ColumnCount { fields: usize, columns: usize },
    #[error("field `{field}` row {row}: expected {expected}")]
    BadValue {
        field: String,
        row: usize,
        expected: &'static str,
    },
    #[error(transparent)]
    Table(#[from] MalformedInputError),
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    schema: Schema,
    data: FrameData,
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(default)]
    config: FieldConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FieldConfig {
    unit: Option<String>,
    #[serde(rename = "type")]
    type_config: Option<FieldTypeConfig>,
}

#[derive(Debug, Deserialize)]
struct FieldTypeConfig {
    #[serde(rename = "enum")]
    enum_config: Option<EnumConfig>,
}

#[derive(Debug, Deserialize)]
struct EnumConfig {
    text: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    values: Vec<Vec<Value>>,
}

/// Parse a data frame in its JSON wire form into a profile table.
///
/// ```json
/// {
///   "schema": { "fields": [
///     { "name": "level" },
///     { "name": "value", "config": { "unit": "ns" } },
///     { "name": "self" },
///     { "name": "label", "config": { "type": { "enum": { "text": ["root", "a"] } } } }
///   ] },
///   "data": { "values": [[0, 1], [300, 200], [100, 200], [0, 1]] }
/// }
/// ```
///
/// Fields are matched by name; extra fields are ignored. A label field
/// with an enum table holds codes, otherwise strings. The unit comes from
/// the `value` field. A diff profile adds `valueRight` and `selfRight`
/// holding the comparison side.
pub fn parse_frame(data: &[u8]) -> Result<ProfileTable, FrameParseError> {
    let frame: FrameJson = serde_json::from_slice(data)?;
    let fields = frame.schema.fields;
    let columns = frame.data.values;
    if fields.len() != columns.len() {
        return Err(FrameParseError::ColumnCount {
            fields: fields.len(),
            columns: columns.len(),
        });
    }

    let mut table = TableColumns::default();
    for (field, values) in fields.iter().zip(&columns) {
        match field.name.as_str() {
            "label" => table.label = Some(label_column(field, values)?),
            "level" => {
                table.level = Some(
                    numbers(field, values)?
                        .into_iter()
                        .enumerate()
                        .map(|(row, n)| {
                            to_level(n)
                                .ok_or_else(|| bad_value(field, row, "a non-negative integer"))
                        })
                        .collect::<Result<_, _>>()?,
                );
            }
            "value" => {
                table.value = Some(numbers(field, values)?);
                table.unit = ValueUnit::from_field_unit(field.config.unit.as_deref());
            }
            "self" => table.self_value = Some(numbers(field, values)?),
            "valueRight" => table.value_right = Some(numbers(field, values)?),
            "selfRight" => table.self_right = Some(numbers(field, values)?),
            _ => {}
        }
    }

    Ok(ProfileTable::new(table)?)
}

fn label_column(field: &FieldSchema, values: &[Value]) -> Result<LabelColumn, FrameParseError> {
    let names = field
        .config
        .type_config
        .as_ref()
        .and_then(|t| t.enum_config.as_ref());

    match names {
        Some(names) => {
            let codes = numbers(field, values)?
                .into_iter()
                .enumerate()
                .map(|(row, n)| to_level(n).ok_or_else(|| bad_value(field, row, "an enum code")))
                .collect::<Result<_, _>>()?;
            Ok(LabelColumn::Enum {
                codes,
                names: names.text.iter().map(|s| SharedStr::from(s.as_str())).collect(),
            })
        }
        None => values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.as_str()
                    .map(SharedStr::from)
                    .ok_or_else(|| bad_value(field, row, "a string"))
            })
            .collect::<Result<_, _>>()
            .map(LabelColumn::Text),
    }
}

fn numbers(field: &FieldSchema, values: &[Value]) -> Result<Vec<f64>, FrameParseError> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| v.as_f64().ok_or_else(|| bad_value(field, row, "a number")))
        .collect()
}

fn to_level(n: f64) -> Option<u32> {
    (n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}

fn bad_value(field: &FieldSchema, row: usize, expected: &'static str) -> FrameParseError {
    FrameParseError::BadValue {
        field: field.name.clone(),
        row,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_labels_and_unit() {
        let json = br#"{
            "schema": { "fields": [
                { "name": "level", "type": "number" },
                { "name": "value", "type": "number", "config": { "unit": "ns" } },
                { "name": "self", "type": "number" },
                { "name": "label", "type": "enum", "config": { "type": { "enum": { "text": ["root", "a", "b"] } } } }
            ] },
            "data": { "values": [[0, 1, 1], [300, 200, 100], [0, 50, 100], [0, 1, 2]] }
        }"#;
        let table = parse_frame(json).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.label(2), "b");
        assert_eq!(table.value(1), 200.0);
        assert_eq!(table.unit(), ValueUnit::Nanoseconds);
    }

    #[test]
    fn string_labels_and_extra_fields() {
        let json = br#"{
            "schema": { "fields": [
                { "name": "label" }, { "name": "level" }, { "name": "value" },
                { "name": "self" }, { "name": "file" }
            ] },
            "data": { "values": [["main", "work"], [0, 1], [10, 7], [3, 7], ["a.go", "b.go"]] }
        }"#;
        let table = parse_frame(json).unwrap();
        assert_eq!(table.label(1), "work");
        assert_eq!(table.unit(), ValueUnit::Short);
        assert!(!table.is_diff());
    }

    #[test]
    fn diff_frame_reads_both_sides() {
        let json = br#"{
            "schema": { "fields": [
                { "name": "label" }, { "name": "level" }, { "name": "value" },
                { "name": "self" }, { "name": "valueRight" }, { "name": "selfRight" }
            ] },
            "data": { "values": [["main", "work"], [0, 1], [10, 7], [3, 7], [6, 4], [2, 4]] }
        }"#;
        let table = parse_frame(json).unwrap();
        assert!(table.is_diff());
        assert_eq!(table.value_right(1), Some(4.0));
        assert_eq!(table.self_right_of(&[0, 1]), Some(6.0));
        assert_eq!(table.value_left_of(&[0]), 4.0);
    }

    #[test]
    fn diff_frame_needs_both_columns() {
        let json = br#"{
            "schema": { "fields": [
                { "name": "label" }, { "name": "level" }, { "name": "value" },
                { "name": "self" }, { "name": "valueRight" }
            ] },
            "data": { "values": [["main"], [0], [10], [10], [5]] }
        }"#;
        assert!(matches!(
            parse_frame(json),
            Err(FrameParseError::Table(MalformedInputError::MissingColumn("selfRight")))
        ));
    }

    #[test]
    fn missing_self_field() {
        let json = br#"{
            "schema": { "fields": [{ "name": "label" }, { "name": "level" }, { "name": "value" }] },
            "data": { "values": [["main"], [0], [10]] }
        }"#;
        assert!(matches!(
            parse_frame(json),
            Err(FrameParseError::Table(MalformedInputError::MissingColumn("self")))
        ));
    }

    #[test]
    fn fractional_level_is_rejected() {
        let json = br#"{
            "schema": { "fields": [{ "name": "label" }, { "name": "level" }, { "name": "value" }, { "name": "self" }] },
            "data": { "values": [["main"], [0.5], [10], [10]] }
        }"#;
        assert!(matches!(
            parse_frame(json),
            Err(FrameParseError::BadValue { row: 0, .. })
        ));
    }

    #[test]
    fn schema_and_data_must_agree() {
        let json = br#"{ "schema": { "fields": [{ "name": "label" }] }, "data": { "values": [] } }"#;
        assert!(matches!(
            parse_frame(json),
            Err(FrameParseError::ColumnCount { fields: 1, columns: 0 })
        ));
    }
}
