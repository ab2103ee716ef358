//! Dynamic conditions: field, operator and value chosen at runtime.
//!
//! Assignment accepts a `[field, operation, value]` triple or the
//! equivalent `{field:, operation:, value:}` map. The operator is kept as
//! its raw token: an operator outside the allow-list survives parsing (so
//! the assigned condition can still be inspected and re-rendered) and only
//! fails when the scope is composed. A value that fails to cast is nulled
//! while field and operator stay intact.

use crate::cast::FieldSchema;
use crate::errors::ConfigurationError;
use crate::value::{RawInput, ScalarValue};

/// Operators every dynamic filter understands unless it configures its
/// own list.
pub const DEFAULT_OPERATIONS: [&str; 4] = ["=", ">=", "<=", "=~"];

/// The driver primitive behind a built-in operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationPrimitive {
    Equal,
    GreaterEqual,
    LessEqual,
    /// Substring containment for text, plain equality for ordered scalar
    /// types.
    Fuzzy,
}

pub(crate) fn primitive_for(operation: &str) -> Option<OperationPrimitive> {
    match operation {
        "=" => Some(OperationPrimitive::Equal),
        ">=" => Some(OperationPrimitive::GreaterEqual),
        "<=" => Some(OperationPrimitive::LessEqual),
        "=~" => Some(OperationPrimitive::Fuzzy),
        _ => None,
    }
}

/// A parsed `(field, operation, value)` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCondition {
    field: String,
    operation: String,
    value: Option<ScalarValue>,
}

impl DynamicCondition {
    /// Parse a raw triple against the filter's field schema.
    ///
    /// Returns `Ok(None)` when the field slot is blank — an empty form
    /// submission, not an error. A non-blank field missing from the
    /// schema fails fast as a [`ConfigurationError`].
    pub(crate) fn parse(
        filter: &str,
        schema: &FieldSchema,
        format: Option<&str>,
        raw: &RawInput,
    ) -> Result<Option<Self>, ConfigurationError> {
        let (field_raw, operation_raw, value_raw) = match raw {
            RawInput::List(items) => (items.first(), items.get(1), items.get(2)),
            RawInput::Map(map) => (map.get("field"), map.get("operation"), map.get("value")),
            _ => return Err(ConfigurationError::invalid_condition(filter)),
        };

        let field = match field_raw {
            Some(RawInput::Str(s)) if !s.trim().is_empty() => s.trim().to_owned(),
            _ => return Ok(None),
        };
        let operation = match operation_raw {
            Some(RawInput::Str(s)) if !s.trim().is_empty() => s.trim().to_owned(),
            _ => "=".to_owned(),
        };

        let Some(kind) = schema.resolve(&field) else {
            return Err(ConfigurationError::unknown_field(filter, field));
        };

        let value = match value_raw {
            None => None,
            Some(raw_value) => match kind.cast(raw_value, format) {
                Ok(value) => value,
                Err(error) => {
                    tracing::debug!(filter, field = %field, %error, "nullifying condition value");
                    None
                }
            },
        };

        Ok(Some(Self {
            field,
            operation,
            value,
        }))
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn value(&self) -> Option<&ScalarValue> {
        self.value.as_ref()
    }

    /// Plain-data form: `{field:, operation:, value:}`.
    #[must_use]
    pub fn to_raw(&self) -> RawInput {
        let mut map = std::collections::BTreeMap::new();
        map.insert("field".to_owned(), RawInput::Str(self.field.clone()));
        map.insert("operation".to_owned(), RawInput::Str(self.operation.clone()));
        map.insert(
            "value".to_owned(),
            self.value
                .as_ref()
                .map_or(RawInput::Null, ScalarValue::to_raw),
        );
        RawInput::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::ScalarKind;

    fn schema() -> FieldSchema {
        FieldSchema::new()
            .field("name", ScalarKind::String)
            .field("group_id", ScalarKind::Integer)
            .field("shipping_date", ScalarKind::Date)
    }

    fn parse(raw: &RawInput) -> Result<Option<DynamicCondition>, ConfigurationError> {
        DynamicCondition::parse("condition", &schema(), None, raw)
    }

    #[test]
    fn parses_triple_and_casts_value() {
        let condition = parse(&RawInput::from(vec!["group_id", "<=", "2"]))
            .unwrap()
            .unwrap();
        assert_eq!(condition.field(), "group_id");
        assert_eq!(condition.operation(), "<=");
        assert_eq!(condition.value(), Some(&ScalarValue::Int(2)));
    }

    #[test]
    fn parses_map_shape() {
        let raw = RawInput::from(serde_json::json!({
            "field": "shipping_date",
            "operation": "<>",
            "value": "1996-08-05",
        }));
        let condition = parse(&raw).unwrap().unwrap();
        assert_eq!(condition.operation(), "<>");
        assert_eq!(
            condition.value(),
            Some(&ScalarValue::Date(
                chrono::NaiveDate::from_ymd_opt(1996, 8, 5).unwrap()
            ))
        );
    }

    #[test]
    fn unknown_operator_survives_parsing() {
        let condition = parse(&RawInput::from(vec!["name", "<>", "x"]))
            .unwrap()
            .unwrap();
        assert_eq!(condition.operation(), "<>");
        assert!(primitive_for(condition.operation()).is_none());
    }

    #[test]
    fn failed_cast_nulls_value_only() {
        let condition = parse(&RawInput::from(vec!["group_id", "<=", "aa"]))
            .unwrap()
            .unwrap();
        assert_eq!(condition.field(), "group_id");
        assert_eq!(condition.operation(), "<=");
        assert_eq!(condition.value(), None);
    }

    #[test]
    fn blank_field_reads_as_absent() {
        assert_eq!(parse(&RawInput::from(vec!["", "=", "x"])).unwrap(), None);
    }

    #[test]
    fn unresolvable_field_fails_fast() {
        assert_eq!(
            parse(&RawInput::from(vec!["nope", "=", "x"])),
            Err(ConfigurationError::unknown_field("condition", "nope"))
        );
    }

    #[test]
    fn round_trips_through_plain_data() {
        let condition = parse(&RawInput::from(vec!["group_id", ">=", "3"]))
            .unwrap()
            .unwrap();
        let reparsed = parse(&condition.to_raw()).unwrap().unwrap();
        assert_eq!(condition, reparsed);
    }
}
