//! Milestone normalization
//!
//! Turns loosely-shaped generator entries into [`GeneratedMilestone`]s. Each
//! entry is first checked against the expected schema, producing field-level
//! defects, then defaults are filled in. Normalization never fails.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::GeneratedMilestone;

/// What was wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    Missing,
    WrongType,
    Empty,
}

/// A schema violation found in one generator entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefect {
    pub field: &'static str,
    pub kind: DefectKind,
}

impl FieldDefect {
    fn new(field: &'static str, kind: DefectKind) -> Self {
        Self { field, kind }
    }
}

/// Typed view of one entry; `None` means the field needs its default
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidatedEntry {
    pub id: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub suggested_start_date: Option<String>,
    pub suggested_end_date: Option<String>,
    pub dependencies: Option<Vec<u32>>,
}

/// A milestone with its 0-based position and any defects that were repaired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedMilestone {
    pub order: u32,
    pub milestone: GeneratedMilestone,
    pub defects: Vec<FieldDefect>,
}

/// Normalize a parsed generator response
///
/// Output follows input order; `order` is the position, whatever `id` says.
pub fn normalize(raw: &[Value]) -> Vec<NormalizedMilestone> {
    debug!(count = raw.len(), "normalize: called");
    raw.iter()
        .enumerate()
        .map(|(idx, value)| {
            let position = idx as u32 + 1;
            let (entry, defects) = validate_entry(value);
            if !defects.is_empty() {
                debug!(position, defect_count = defects.len(), "normalize: repaired entry");
            }
            NormalizedMilestone {
                order: idx as u32,
                milestone: fill_defaults(entry, position),
                defects,
            }
        })
        .collect()
}

/// Check one entry against the milestone schema
pub fn validate_entry(value: &Value) -> (ValidatedEntry, Vec<FieldDefect>) {
    let empty = Map::new();
    let mut defects = Vec::new();
    let object = match value {
        Value::Object(map) => map,
        _ => {
            defects.push(FieldDefect::new("entry", DefectKind::WrongType));
            &empty
        }
    };

    let mut entry = ValidatedEntry::default();

    match object.get("id") {
        None | Some(Value::Null) => defects.push(FieldDefect::new("id", DefectKind::Missing)),
        Some(v) => match as_u32(v) {
            Some(id) => entry.id = Some(id),
            None => defects.push(FieldDefect::new("id", DefectKind::WrongType)),
        },
    }

    entry.title = string_field(object, "title", &mut defects);
    entry.description = string_field(object, "description", &mut defects);
    entry.suggested_start_date = string_field(object, "suggested_start_date", &mut defects);
    entry.suggested_end_date = string_field(object, "suggested_end_date", &mut defects);

    match object.get("dependencies") {
        None | Some(Value::Null) => defects.push(FieldDefect::new("dependencies", DefectKind::Missing)),
        Some(Value::Array(items)) => {
            let deps: Vec<u32> = items.iter().filter_map(as_u32).collect();
            if deps.len() != items.len() {
                defects.push(FieldDefect::new("dependencies", DefectKind::WrongType));
            }
            entry.dependencies = Some(deps);
        }
        Some(_) => defects.push(FieldDefect::new("dependencies", DefectKind::WrongType)),
    }

    (entry, defects)
}

fn fill_defaults(entry: ValidatedEntry, position: u32) -> GeneratedMilestone {
    GeneratedMilestone {
        id: entry.id.unwrap_or(position),
        title: entry.title.unwrap_or_else(|| format!("Milestone {}", position)),
        description: entry.description.unwrap_or_default(),
        suggested_start_date: entry.suggested_start_date.unwrap_or_default(),
        suggested_end_date: entry.suggested_end_date.unwrap_or_default(),
        dependencies: entry.dependencies.unwrap_or_default(),
    }
}

/// Read a string field; blank strings count as `Empty`
fn string_field(object: &Map<String, Value>, field: &'static str, defects: &mut Vec<FieldDefect>) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            defects.push(FieldDefect::new(field, DefectKind::Missing));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            defects.push(FieldDefect::new(field, DefectKind::Empty));
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            defects.push(FieldDefect::new(field, DefectKind::WrongType));
            None
        }
    }
}

/// Accept non-negative integers, integral floats and numeric strings
fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_entries_pass_through() {
        let raw = vec![
            json!({
                "id": 1, "title": "Research", "description": "Read sources",
                "suggested_start_date": "2030-01-01", "suggested_end_date": "2030-01-03",
                "dependencies": []
            }),
            json!({
                "id": 2, "title": "Draft", "description": "Write it",
                "suggested_start_date": "2030-01-04", "suggested_end_date": "2030-01-08",
                "dependencies": [1]
            }),
        ];

        let out = normalize(&raw);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|m| m.defects.is_empty()));
        assert_eq!(out[1].milestone.title, "Draft");
        assert_eq!(out[1].milestone.dependencies, vec![1]);
        assert_eq!(out[1].order, 1);
    }

    #[test]
    fn test_defaults_for_empty_object() {
        let out = normalize(&[json!({}), json!({})]);
        let second = &out[1].milestone;
        assert_eq!(second.id, 2);
        assert_eq!(second.title, "Milestone 2");
        assert_eq!(second.description, "");
        assert!(second.dependencies.is_empty());
        assert!(out[1].defects.contains(&FieldDefect::new("title", DefectKind::Missing)));
    }

    #[test]
    fn test_empty_title_gets_default() {
        let out = normalize(&[json!({"title": "   "})]);
        assert_eq!(out[0].milestone.title, "Milestone 1");
        assert!(out[0].defects.contains(&FieldDefect::new("title", DefectKind::Empty)));
    }

    #[test]
    fn test_non_numeric_id_uses_position() {
        let out = normalize(&[json!({"id": "abc"}), json!({"id": 9.0}), json!({"id": "7"}), json!({"id": -1})]);
        assert_eq!(out[0].milestone.id, 1);
        assert_eq!(out[1].milestone.id, 9);
        assert_eq!(out[2].milestone.id, 7);
        assert_eq!(out[3].milestone.id, 4);
    }

    #[test]
    fn test_dependencies_coercion() {
        let out = normalize(&[
            json!({"dependencies": "1,2"}),
            json!({"dependencies": [1, "x", 2]}),
            json!({"dependencies": null}),
        ]);
        assert!(out[0].milestone.dependencies.is_empty());
        assert_eq!(out[1].milestone.dependencies, vec![1, 2]);
        assert!(out[1].defects.contains(&FieldDefect::new("dependencies", DefectKind::WrongType)));
        assert!(out[2].milestone.dependencies.is_empty());
    }

    #[test]
    fn test_non_object_entries() {
        let out = normalize(&[json!(42), json!("text"), json!(null), json!([1, 2])]);
        assert_eq!(out.len(), 4);
        for (idx, m) in out.iter().enumerate() {
            assert_eq!(m.order, idx as u32);
            assert_eq!(m.milestone.title, format!("Milestone {}", idx + 1));
            assert_eq!(m.defects[0], FieldDefect::new("entry", DefectKind::WrongType));
        }
    }

    #[test]
    fn test_order_ignores_ids() {
        let out = normalize(&[json!({"id": 5}), json!({"id": 3}), json!({"id": 5})]);
        let orders: Vec<u32> = out.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_entry_reports_each_field() {
        let (entry, defects) = validate_entry(&json!({"id": 2, "title": 7, "description": ""}));
        assert_eq!(entry.id, Some(2));
        assert_eq!(entry.title, None);
        assert!(defects.contains(&FieldDefect::new("title", DefectKind::WrongType)));
        assert!(defects.contains(&FieldDefect::new("description", DefectKind::Empty)));
        assert!(defects.contains(&FieldDefect::new("suggested_start_date", DefectKind::Missing)));
        assert!(defects.contains(&FieldDefect::new("dependencies", DefectKind::Missing)));
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(&[]).is_empty());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(|f| json!(f)),
            "[a-z0-9 ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::hash_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("title".to_string()),
                        Just("description".to_string()),
                        Just("dependencies".to_string()),
                        "[a-z]{1,6}".prop_map(|s| s)
                    ],
                    inner,
                    0..5
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_total_and_contiguous(raw in proptest::collection::vec(arb_json(), 0..10)) {
            let out = normalize(&raw);
            prop_assert_eq!(out.len(), raw.len());
            for (idx, m) in out.iter().enumerate() {
                prop_assert_eq!(m.order, idx as u32);
                prop_assert!(!m.milestone.title.trim().is_empty());
            }
        }
    }
}
