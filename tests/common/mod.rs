#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use filtercrate::{QueryDriver, Record, ScalarValue};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
}

pub fn entry(id: i64) -> Record {
    Record::new().with("id", id)
}

/// The `id` cells of a filtered scope, for membership assertions.
pub fn ids(scope: &[Record]) -> Vec<i64> {
    scope
        .iter()
        .filter_map(|record| match record.get("id") {
            Some(ScalarValue::Int(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

/// A driver that records every primitive invocation instead of
/// filtering, to observe fold order and dispatched fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceDriver;

impl QueryDriver for TraceDriver {
    type Scope = Vec<String>;

    fn equal(&self, mut scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        scope.push(format!("equal {field} {value:?}"));
        scope
    }

    fn greater_equal(
        &self,
        mut scope: Self::Scope,
        field: &str,
        value: &ScalarValue,
    ) -> Self::Scope {
        scope.push(format!("greater_equal {field} {value:?}"));
        scope
    }

    fn less_equal(&self, mut scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        scope.push(format!("less_equal {field} {value:?}"));
        scope
    }

    fn contains(&self, mut scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        scope.push(format!("contains {field} {value:?}"));
        scope
    }

    fn any_of(&self, mut scope: Self::Scope, field: &str, values: &[ScalarValue]) -> Self::Scope {
        scope.push(format!("any_of {field} {values:?}"));
        scope
    }
}
