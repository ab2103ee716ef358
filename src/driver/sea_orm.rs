//! Sea-ORM driver: primitives that build a `sea_orm::Condition`.
//!
//! The composed condition plugs straight into
//! `Entity::find().filter(condition)`. Columns are addressed by name via
//! `Alias`, so the driver works for any entity; a dotted path addresses a
//! joined table's column (performing the join itself belongs to whoever
//! executes the query).

use std::collections::HashSet;

use sea_orm::Condition;
use sea_orm::sea_query::{Alias, Expr, Func, SimpleExpr};
use uuid::Uuid;

use super::{QueryDriver, day_bounds};
use crate::value::ScalarValue;

/// Condition-building driver.
///
/// Fields backed by timestamp columns must be registered so that date
/// values expand to whole-day intervals:
///
/// ```rust
/// use filtercrate::SeaOrmDriver;
///
/// let driver = SeaOrmDriver::new().timestamp_field("created_at");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeaOrmDriver {
    timestamp_fields: HashSet<String>,
}

impl SeaOrmDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field whose column stores timestamps rather than dates.
    #[must_use]
    pub fn timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_fields.insert(field.into());
        self
    }

    fn is_timestamp(&self, field: &str) -> bool {
        self.timestamp_fields.contains(field)
    }

    fn equal_expr(&self, field: &str, value: &ScalarValue) -> SimpleExpr {
        if let ScalarValue::Date(date) = value
            && self.is_timestamp(field)
        {
            let (start, end) = day_bounds(*date);
            return col(field).between(to_value(&ScalarValue::DateTime(start)), to_value(&ScalarValue::DateTime(end)));
        }
        col(field).eq(to_value(value))
    }
}

impl QueryDriver for SeaOrmDriver {
    type Scope = Condition;

    fn equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        scope.add(self.equal_expr(field, value))
    }

    fn greater_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        if let ScalarValue::Date(date) = value
            && self.is_timestamp(field)
        {
            let (start, _) = day_bounds(*date);
            return scope.add(col(field).gte(to_value(&ScalarValue::DateTime(start))));
        }
        scope.add(col(field).gte(to_value(value)))
    }

    fn less_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        if let ScalarValue::Date(date) = value
            && self.is_timestamp(field)
        {
            let (_, end) = day_bounds(*date);
            return scope.add(col(field).lte(to_value(&ScalarValue::DateTime(end))));
        }
        scope.add(col(field).lte(to_value(value)))
    }

    fn contains(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope {
        match value {
            ScalarValue::Text(needle) => scope.add(
                SimpleExpr::FunctionCall(Func::upper(col(field)))
                    .like(format!("%{}%", needle.to_uppercase())),
            ),
            _ => scope.add(self.equal_expr(field, value)),
        }
    }

    fn any_of(&self, scope: Self::Scope, field: &str, values: &[ScalarValue]) -> Self::Scope {
        if values.is_empty() {
            return scope;
        }
        // Date values on a timestamp column cannot go through a plain IN;
        // each needs its day interval, OR-ed together.
        let needs_expansion = self.is_timestamp(field)
            && values
                .iter()
                .any(|value| matches!(value, ScalarValue::Date(_)));
        if needs_expansion {
            let mut any = Condition::any();
            for value in values {
                any = any.add(self.equal_expr(field, value));
            }
            scope.add(any)
        } else {
            scope.add(col(field).is_in(values.iter().map(to_value)))
        }
    }
}

fn col(field: &str) -> Expr {
    match field.split_once('.') {
        Some((table, column)) => Expr::col((Alias::new(table), Alias::new(column))),
        None => Expr::col(Alias::new(field)),
    }
}

fn to_value(value: &ScalarValue) -> sea_orm::Value {
    match value {
        ScalarValue::Int(i) => (*i).into(),
        ScalarValue::Float(v) => (*v).into(),
        // UUID-shaped strings compare as UUIDs so that uuid-keyed columns
        // filter correctly from plain text input.
        ScalarValue::Text(s) => Uuid::parse_str(s).map_or_else(|_| s.clone().into(), Into::into),
        ScalarValue::Bool(b) => (*b).into(),
        ScalarValue::Date(d) => (*d).into(),
        ScalarValue::DateTime(t) => (*t).into(),
    }
}
