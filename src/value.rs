//! Raw input and coerced value representations.
//!
//! [`RawInput`] is the single entry point for everything a caller may
//! assign to a filter: scalars, lists, `{from:, to:}` maps, and native
//! half-open intervals. Coercion pattern-matches on the tag — no shape
//! probing. [`ScalarValue`] is a scalar after casting, [`FilterValue`] is
//! the tagged per-filter runtime value.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dynamic::DynamicCondition;

pub(crate) const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const ISO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Uncoerced filter input, one variant per accepted shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// An ordered sequence: multi-value input, or a `[from, to]` pair for
    /// range filters and `[field, operation, value]` for dynamic filters.
    List(Vec<RawInput>),
    /// A keyed map: `{from:, to:}` for ranges,
    /// `{field:, operation:, value:}` for dynamic conditions.
    Map(BTreeMap<String, RawInput>),
    /// A native interval with independently optional bounds.
    Span {
        from: Option<Box<RawInput>>,
        to: Option<Box<RawInput>>,
    },
}

impl RawInput {
    /// Build a native interval; either bound may be open.
    #[must_use]
    pub fn span(from: Option<impl Into<Self>>, to: Option<impl Into<Self>>) -> Self {
        Self::Span {
            from: from.map(|value| Box::new(value.into())),
            to: to.map(|value| Box::new(value.into())),
        }
    }

    /// Blank input never narrows a scope.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Str(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Span { from, to } => from.is_none() && to.is_none(),
            _ => false,
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for RawInput {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RawInput {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for RawInput {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for RawInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for RawInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<RawInput>> From<Vec<T>> for RawInput {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawInput>> From<Option<T>> for RawInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A `(from, to)` pair reads as a closed range.
impl<A: Into<RawInput>, B: Into<RawInput>> From<(A, B)> for RawInput {
    fn from((from, to): (A, B)) -> Self {
        Self::Span {
            from: Some(Box::new(from.into())),
            to: Some(Box::new(to.into())),
        }
    }
}

impl Serialize for RawInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(d) => serializer.collect_str(&d.format(ISO_DATE_FORMAT)),
            Self::DateTime(t) => serializer.collect_str(&t.format(ISO_DATETIME_FORMAT)),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Self::Span { from, to } => {
                let mut out = serializer.serialize_map(Some(2))?;
                out.serialize_entry("from", from)?;
                out.serialize_entry("to", to)?;
                out.end()
            }
        }
    }
}

struct RawInputVisitor;

impl<'de> Visitor<'de> for RawInputVisitor {
    type Value = RawInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence or map of filter input")
    }

    fn visit_bool<E>(self, value: bool) -> Result<RawInput, E> {
        Ok(RawInput::Bool(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<RawInput, E> {
        Ok(RawInput::Int(value))
    }

    #[allow(clippy::cast_precision_loss)]
    fn visit_u64<E>(self, value: u64) -> Result<RawInput, E> {
        match i64::try_from(value) {
            Ok(i) => Ok(RawInput::Int(i)),
            Err(_) => Ok(RawInput::Float(value as f64)),
        }
    }

    fn visit_f64<E>(self, value: f64) -> Result<RawInput, E> {
        Ok(RawInput::Float(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<RawInput, E> {
        Ok(RawInput::Str(value.to_owned()))
    }

    fn visit_string<E>(self, value: String) -> Result<RawInput, E> {
        Ok(RawInput::Str(value))
    }

    fn visit_none<E>(self) -> Result<RawInput, E> {
        Ok(RawInput::Null)
    }

    fn visit_unit<E>(self) -> Result<RawInput, E> {
        Ok(RawInput::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawInput, D::Error> {
        RawInput::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawInput, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawInput::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawInput, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, RawInput>()? {
            map.insert(key, value);
        }
        // A map carrying only interval keys reads back as the interval it
        // was serialized from.
        if !map.is_empty() && map.keys().all(|key| key == "from" || key == "to") {
            let from = match map.remove("from") {
                None | Some(RawInput::Null) => None,
                Some(value) => Some(Box::new(value)),
            };
            let to = match map.remove("to") {
                None | Some(RawInput::Null) => None,
                Some(value) => Some(Box::new(value)),
            };
            return Ok(RawInput::Span { from, to });
        }
        Ok(RawInput::Map(map))
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawInputVisitor)
    }
}

impl From<serde_json::Value> for RawInput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_i64().map_or_else(
                || Self::Float(n.as_f64().unwrap_or_default()),
                Self::Int,
            ),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                let map: BTreeMap<String, Self> =
                    map.into_iter().map(|(k, v)| (k, Self::from(v))).collect();
                if !map.is_empty() && map.keys().all(|key| key == "from" || key == "to") {
                    let mut map = map;
                    let from = match map.remove("from") {
                        None | Some(Self::Null) => None,
                        Some(value) => Some(Box::new(value)),
                    };
                    let to = match map.remove("to") {
                        None | Some(Self::Null) => None,
                        Some(value) => Some(Box::new(value)),
                    };
                    Self::Span { from, to }
                } else {
                    Self::Map(map)
                }
            }
        }
    }
}

/// A typed scalar produced by casting.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ScalarValue {
    #[must_use]
    pub fn to_raw(&self) -> RawInput {
        match self {
            Self::Int(i) => RawInput::Int(*i),
            Self::Float(v) => RawInput::Float(*v),
            Self::Text(s) => RawInput::Str(s.clone()),
            Self::Bool(b) => RawInput::Bool(*b),
            Self::Date(d) => RawInput::Date(*d),
            Self::DateTime(t) => RawInput::DateTime(*t),
        }
    }

    /// Ordering across values of the same type; integers and floats
    /// compare numerically. Mixed date/datetime comparison is a driver
    /// concern (the day-interval rule) and is `None` here.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

/// The coerced runtime value of one filter on one report instance.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Nothing assigned, or the assigned input was blank/uncastable.
    Absent,
    Scalar(ScalarValue),
    /// Values of a `multiple` filter; matches records satisfying any of
    /// them.
    Multi(Vec<ScalarValue>),
    /// An ordered interval; bounds are independently optional and, when
    /// both present, lower <= upper.
    Range {
        lower: Option<ScalarValue>,
        upper: Option<ScalarValue>,
    },
    Dynamic(DynamicCondition),
}

impl FilterValue {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Plain-data form of the value; feeding it back through assignment
    /// reproduces an equal `FilterValue`.
    #[must_use]
    pub fn to_raw(&self) -> RawInput {
        match self {
            Self::Absent => RawInput::Null,
            Self::Scalar(value) => value.to_raw(),
            Self::Multi(values) => RawInput::List(values.iter().map(ScalarValue::to_raw).collect()),
            Self::Range { lower, upper } => RawInput::Span {
                from: lower.as_ref().map(|value| Box::new(value.to_raw())),
                to: upper.as_ref().map(|value| Box::new(value.to_raw())),
            },
            Self::Dynamic(condition) => condition.to_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(RawInput::Null.is_blank());
        assert!(RawInput::Str("   ".into()).is_blank());
        assert!(RawInput::List(vec![]).is_blank());
        assert!(RawInput::Map(BTreeMap::new()).is_blank());
        assert!(RawInput::span(None::<i64>, None::<i64>).is_blank());
        assert!(!RawInput::Int(0).is_blank());
        assert!(!RawInput::Str("x".into()).is_blank());
    }

    #[test]
    fn json_value_conversion() {
        let raw = RawInput::from(serde_json::json!({"from": "2012-01-01", "to": null}));
        assert_eq!(
            raw,
            RawInput::Span {
                from: Some(Box::new(RawInput::Str("2012-01-01".into()))),
                to: None,
            }
        );

        let raw = RawInput::from(serde_json::json!({"field": "group_id", "operation": "<="}));
        assert!(matches!(raw, RawInput::Map(_)));

        let raw = RawInput::from(serde_json::json!([1, 2, 3]));
        assert_eq!(
            raw,
            RawInput::List(vec![RawInput::Int(1), RawInput::Int(2), RawInput::Int(3)])
        );
    }

    #[test]
    fn serde_round_trip_for_span() {
        let span = RawInput::span(Some("2012-01-01"), Some("2012-01-02"));
        let json = serde_json::to_string(&span).unwrap();
        let back: RawInput = serde_json::from_str(&json).unwrap();
        assert_eq!(span, back);
    }

    #[test]
    fn serde_keeps_plain_maps() {
        let json = r#"{"field": "name", "operation": "=", "value": "x"}"#;
        let back: RawInput = serde_json::from_str(json).unwrap();
        let RawInput::Map(map) = back else {
            panic!("expected a map");
        };
        assert_eq!(map.get("operation"), Some(&RawInput::Str("=".into())));
    }

    #[test]
    fn mixed_numeric_ordering() {
        let two = ScalarValue::Int(2);
        let half = ScalarValue::Float(2.5);
        assert_eq!(two.partial_cmp_value(&half), Some(Ordering::Less));
        assert_eq!(half.partial_cmp_value(&two), Some(Ordering::Greater));
    }
}
