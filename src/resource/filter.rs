//! Collection search and ordering.
//!
//! Query parameters follow the usual collection conventions:
//! `field=value` for exact or partial search and `order[field]=asc|desc`
//! for ordering. Filters run on the serialized record, before projection,
//! so every field name is the camelCase name clients see.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use super::fields::project;
use super::types::{FieldViolation, StoreError, StoreResult};

/// Fields a collection can be searched and ordered on
#[derive(Debug, Clone, Copy)]
pub struct FilterFields {
    /// Matched on the whole value
    pub exact: &'static [&'static str],
    /// Matched case-insensitively on a substring
    pub partial: &'static [&'static str],
    /// Accepted in `order[...]`
    pub order: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A parsed collection query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    exact: Vec<(String, String)>,
    partial: Vec<(String, String)>,
    order: Vec<(String, Direction)>,
}

impl ListFilter {
    /// Parse query parameters in request order.
    ///
    /// Unknown parameters are ignored; an invalid order direction is a
    /// validation error.
    pub fn parse(fields: &FilterFields, params: Vec<(String, String)>) -> StoreResult<Self> {
        let mut filter = ListFilter::default();
        let mut violations = Vec::new();

        for (key, value) in params {
            if let Some(field) = key
                .strip_prefix("order[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                if !fields.order.contains(&field) {
                    continue;
                }
                match value.to_ascii_lowercase().as_str() {
                    "asc" => filter.order.push((field.to_string(), Direction::Asc)),
                    "desc" => filter.order.push((field.to_string(), Direction::Desc)),
                    _ => violations.push(FieldViolation::new(&key, "must be asc or desc")),
                }
            } else if fields.exact.contains(&key.as_str()) {
                filter.exact.push((key, value));
            } else if fields.partial.contains(&key.as_str()) {
                filter.partial.push((key, value.to_lowercase()));
            }
        }

        if violations.is_empty() {
            Ok(filter)
        } else {
            Err(StoreError::Validation(violations))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.partial.is_empty() && self.order.is_empty()
    }

    /// Keep matching items and sort them; ties keep their input order
    pub fn apply(&self, items: Vec<Value>) -> Vec<Value> {
        if self.is_empty() {
            return items;
        }

        let mut matched: Vec<Value> = items
            .into_iter()
            .filter(|item| self.matches(item))
            .collect();

        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }
        matched
    }

    /// Serialize records, filter and order them, then keep only `fields`
    pub fn select<T: Serialize>(&self, records: &[T], fields: &[&str]) -> StoreResult<Vec<Value>> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self
            .apply(values)
            .into_iter()
            .map(|value| project(fields, value))
            .collect())
    }

    fn matches(&self, item: &Value) -> bool {
        let exact = self
            .exact
            .iter()
            .all(|(field, wanted)| text_of(item, field).as_deref() == Some(wanted.as_str()));

        let partial = self.partial.iter().all(|(field, needle)| {
            text_of(item, field)
                .map(|text| text.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false)
        });

        exact && partial
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, direction) in &self.order {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn text_of(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Absent and null sort first
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
