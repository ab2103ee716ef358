//! In-memory driver: predicates over plain record collections.
//!
//! The scope is a `Vec<Record>`; every primitive returns the retained
//! subset. Useful for small datasets and as the reference implementation
//! the integration tests run against.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{QueryDriver, day_bounds};
use crate::value::ScalarValue;

/// One row of an in-memory dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, ScalarValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ScalarValue> {
        self.fields.get(field)
    }
}

/// Driver over `Vec<Record>` scopes.
///
/// Dotted field paths are looked up as flat keys; association traversal
/// has no meaning for loose records.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDriver;

impl QueryDriver for MemoryDriver {
    type Scope = Vec<Record>;

    fn equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        retain(scope, field, |cell| matches_equal(cell, value))
    }

    fn greater_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        retain(scope, field, |cell| match (cell, value) {
            (ScalarValue::DateTime(t), ScalarValue::Date(d)) => *t >= day_bounds(*d).0,
            _ => cell
                .partial_cmp_value(value)
                .is_some_and(|ordering| ordering != Ordering::Less),
        })
    }

    fn less_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        retain(scope, field, |cell| match (cell, value) {
            (ScalarValue::DateTime(t), ScalarValue::Date(d)) => *t <= day_bounds(*d).1,
            _ => cell
                .partial_cmp_value(value)
                .is_some_and(|ordering| ordering != Ordering::Greater),
        })
    }

    fn contains(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        retain(scope, field, |cell| match (cell, value) {
            (ScalarValue::Text(haystack), ScalarValue::Text(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => matches_equal(cell, value),
        })
    }

    fn any_of(&self, scope: Self::Scope, field: &str, values: &[ScalarValue]) -> Self::Scope {
        retain(scope, field, |cell| {
            values.iter().any(|value| matches_equal(cell, value))
        })
    }
}

fn retain(scope: Vec<Record>, field: &str, predicate: impl Fn(&ScalarValue) -> bool) -> Vec<Record> {
    scope
        .into_iter()
        .filter(|record| record.get(field).is_some_and(&predicate))
        .collect()
}

fn matches_equal(cell: &ScalarValue, value: &ScalarValue) -> bool {
    match (cell, value) {
        // A date filter value against a timestamp cell matches the whole
        // day, not midnight.
        (ScalarValue::DateTime(t), ScalarValue::Date(d)) => {
            let (start, end) = day_bounds(*d);
            *t >= start && *t <= end
        }
        _ => cell.partial_cmp_value(value) == Some(Ordering::Equal),
    }
}
