//! Type casting from raw input to typed scalars.
//!
//! All casts are pure: they never touch a scope or a driver. A cast has
//! three outcomes — a value, "blank" (`Ok(None)`, the input carries no
//! information), or [`CastError`] for malformed input. How a failed cast
//! is normalized depends on the call site: scalar filters collapse it to
//! an absent value, dynamic conditions null only the value and keep the
//! field and operator.

use chrono::{NaiveDate, NaiveDateTime};

use crate::value::{ISO_DATE_FORMAT, ISO_DATETIME_FORMAT, RawInput, ScalarValue};

const TRUTHY_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];
const FALSY_TOKENS: [&str; 4] = ["false", "0", "no", "off"];

const DATETIME_FALLBACK_FORMATS: [&str; 2] = [ISO_DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S"];

/// The declared type of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Integer,
    Float,
    String,
    Boolean,
    /// Three-state boolean: true, false, or unset (distinct from false).
    ExtendedBoolean,
    Date,
    DateTime,
    /// A finite set of legal string values.
    Enum(Vec<String>),
    /// Field, operator and value all arrive at runtime; the schema
    /// resolves field names to their scalar types.
    Dynamic(FieldSchema),
}

impl FilterKind {
    /// Whether a single scalar assigned to a `range` filter may stand for
    /// the one-element interval `[value, value]`. Only day/point-in-time
    /// types have that reading.
    #[must_use]
    pub fn supports_point_range(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    pub(crate) fn cast(
        &self,
        raw: &RawInput,
        format: Option<&str>,
    ) -> Result<Option<ScalarValue>, CastError> {
        match self {
            Self::Integer => ScalarKind::Integer.cast(raw, format),
            Self::Float => ScalarKind::Float.cast(raw, format),
            Self::String | Self::Dynamic(_) => ScalarKind::String.cast(raw, format),
            Self::Boolean => ScalarKind::Boolean.cast(raw, format),
            Self::ExtendedBoolean => cast_extended_boolean(raw),
            Self::Date => ScalarKind::Date.cast(raw, format),
            Self::DateTime => ScalarKind::DateTime.cast(raw, format),
            Self::Enum(values) => cast_enum(raw, values),
        }
    }
}

/// Scalar-only projection of [`FilterKind`], used for dynamic-filter
/// field schemas and range endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
}

impl ScalarKind {
    pub(crate) fn cast(
        self,
        raw: &RawInput,
        format: Option<&str>,
    ) -> Result<Option<ScalarValue>, CastError> {
        match self {
            Self::Integer => cast_integer(raw),
            Self::Float => cast_float(raw),
            Self::String => cast_string(raw),
            Self::Boolean => cast_boolean(raw),
            Self::Date => cast_date(raw, format),
            Self::DateTime => cast_datetime(raw, format),
        }
    }
}

/// Field name to scalar type mapping for dynamic filters.
///
/// Declare a timestamp-backed field as [`ScalarKind::Date`] to get
/// whole-day comparison semantics out of the drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: std::collections::BTreeMap<String, ScalarKind>,
}

impl FieldSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    #[must_use]
    pub fn resolve(&self, field: &str) -> Option<ScalarKind> {
        self.fields.get(field).copied()
    }
}

/// Malformed input; normalized away by the caller, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CastError {
    pub value: String,
    pub expected: &'static str,
}

impl CastError {
    fn new(raw: &RawInput, expected: &'static str) -> Self {
        Self {
            value: format!("{raw:?}"),
            expected,
        }
    }
}

impl std::fmt::Display for CastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot cast {} as {}", self.value, self.expected)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cast_integer(raw: &RawInput) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::Int(i) => Ok(Some(ScalarValue::Int(*i))),
        RawInput::Float(v) => Ok(Some(ScalarValue::Int(*v as i64))),
        RawInput::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(i) = s.parse::<i64>() {
                Ok(Some(ScalarValue::Int(i)))
            } else if let Ok(v) = s.parse::<f64>() {
                Ok(Some(ScalarValue::Int(v as i64)))
            } else {
                Err(CastError::new(raw, "integer"))
            }
        }
        _ => Err(CastError::new(raw, "integer")),
    }
}

#[allow(clippy::cast_precision_loss)]
fn cast_float(raw: &RawInput) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::Float(v) => Ok(Some(ScalarValue::Float(*v))),
        RawInput::Int(i) => Ok(Some(ScalarValue::Float(*i as f64))),
        RawInput::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(|v| Some(ScalarValue::Float(v)))
                .map_err(|_| CastError::new(raw, "float"))
        }
        _ => Err(CastError::new(raw, "float")),
    }
}

fn cast_string(raw: &RawInput) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::Str(s) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(ScalarValue::Text(s.clone())))
            }
        }
        RawInput::Int(i) => Ok(Some(ScalarValue::Text(i.to_string()))),
        RawInput::Float(v) => Ok(Some(ScalarValue::Text(v.to_string()))),
        RawInput::Bool(b) => Ok(Some(ScalarValue::Text(b.to_string()))),
        RawInput::Date(d) => Ok(Some(ScalarValue::Text(
            d.format(ISO_DATE_FORMAT).to_string(),
        ))),
        RawInput::DateTime(t) => Ok(Some(ScalarValue::Text(
            t.format(ISO_DATETIME_FORMAT).to_string(),
        ))),
        _ => Err(CastError::new(raw, "string")),
    }
}

fn cast_boolean(raw: &RawInput) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::Bool(b) => Ok(Some(ScalarValue::Bool(*b))),
        RawInput::Int(i) => Ok(Some(ScalarValue::Bool(*i == 1))),
        RawInput::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            let token = s.to_lowercase();
            Ok(Some(ScalarValue::Bool(
                TRUTHY_TOKENS.contains(&token.as_str()),
            )))
        }
        _ => Err(CastError::new(raw, "boolean")),
    }
}

fn cast_extended_boolean(raw: &RawInput) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Bool(b) => Ok(Some(ScalarValue::Bool(*b))),
        RawInput::Int(0) => Ok(Some(ScalarValue::Bool(false))),
        RawInput::Int(1) => Ok(Some(ScalarValue::Bool(true))),
        RawInput::Str(s) => {
            let token = s.trim().to_lowercase();
            if TRUTHY_TOKENS.contains(&token.as_str()) {
                Ok(Some(ScalarValue::Bool(true)))
            } else if FALSY_TOKENS.contains(&token.as_str()) {
                Ok(Some(ScalarValue::Bool(false)))
            } else {
                // The third state: neither answer was given.
                Ok(None)
            }
        }
        _ => Ok(None),
    }
}

fn cast_date(raw: &RawInput, format: Option<&str>) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::Date(d) => Ok(Some(ScalarValue::Date(*d))),
        RawInput::DateTime(t) => Ok(Some(ScalarValue::Date(t.date()))),
        RawInput::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Some(format) = format {
                return NaiveDate::parse_from_str(s, format)
                    .map(|d| Some(ScalarValue::Date(d)))
                    .map_err(|_| CastError::new(raw, "date"));
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE_FORMAT) {
                return Ok(Some(ScalarValue::Date(d)));
            }
            for fallback in DATETIME_FALLBACK_FORMATS {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, fallback) {
                    return Ok(Some(ScalarValue::Date(t.date())));
                }
            }
            Err(CastError::new(raw, "date"))
        }
        _ => Err(CastError::new(raw, "date")),
    }
}

fn cast_datetime(raw: &RawInput, format: Option<&str>) -> Result<Option<ScalarValue>, CastError> {
    match raw {
        RawInput::Null => Ok(None),
        RawInput::DateTime(t) => Ok(Some(ScalarValue::DateTime(*t))),
        RawInput::Date(d) => Ok(Some(ScalarValue::DateTime(
            d.and_time(chrono::NaiveTime::MIN),
        ))),
        RawInput::Str(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Some(format) = format {
                return NaiveDateTime::parse_from_str(s, format)
                    .map(|t| Some(ScalarValue::DateTime(t)))
                    .map_err(|_| CastError::new(raw, "datetime"));
            }
            for fallback in DATETIME_FALLBACK_FORMATS {
                if let Ok(t) = NaiveDateTime::parse_from_str(s, fallback) {
                    return Ok(Some(ScalarValue::DateTime(t)));
                }
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, ISO_DATE_FORMAT) {
                return Ok(Some(ScalarValue::DateTime(d.and_time(chrono::NaiveTime::MIN))));
            }
            Err(CastError::new(raw, "datetime"))
        }
        _ => Err(CastError::new(raw, "datetime")),
    }
}

fn cast_enum(raw: &RawInput, values: &[String]) -> Result<Option<ScalarValue>, CastError> {
    match cast_string(raw)? {
        None => Ok(None),
        Some(ScalarValue::Text(token)) => {
            if values.iter().any(|value| *value == token) {
                Ok(Some(ScalarValue::Text(token)))
            } else {
                Err(CastError::new(raw, "enum member"))
            }
        }
        Some(_) => Err(CastError::new(raw, "enum member")),
    }
}
