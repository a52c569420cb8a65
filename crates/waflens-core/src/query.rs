//! Query constraints applied to in-memory document lists.
//!
//! Constraints derive `PartialEq` so callers can compare constraint lists
//! structurally: a rebuilt-but-identical list must not count as a change
//! and trigger a refetch.

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single read constraint. Applied in list order; there is no query
/// planner and no pagination; the full result set is always materialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Keep documents whose field equals the given value.
    FieldEq(String, Value),
    /// Sort by a field. Documents missing the field sort last.
    OrderBy(String, Direction),
    /// Truncate to the first n documents.
    Limit(usize),
}

impl Constraint {
    pub fn field_eq(field: &str, value: impl Into<Value>) -> Constraint {
        Constraint::FieldEq(field.to_string(), value.into())
    }

    pub fn order_by(field: &str, direction: Direction) -> Constraint {
        Constraint::OrderBy(field.to_string(), direction)
    }
}

pub fn apply_constraints(mut docs: Vec<Value>, constraints: &[Constraint]) -> Vec<Value> {
    for constraint in constraints {
        match constraint {
            Constraint::FieldEq(field, value) => {
                docs.retain(|d| d.get(field) == Some(value));
            }
            Constraint::OrderBy(field, direction) => {
                docs.sort_by(|a, b| {
                    let ord = compare_fields(a.get(field), b.get(field));
                    match direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    }
                });
            }
            Constraint::Limit(n) => {
                docs.truncate(*n);
            }
        }
    }
    docs
}

/// Order two field values: numbers by magnitude, strings lexically,
/// booleans false-first. Missing or unordered values sort last.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        },
    }
}
