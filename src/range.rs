//! Range normalization.
//!
//! Turns the accepted range shapes — `[from, to]` lists, `{from:, to:}`
//! maps and native intervals — into an ordered, possibly open-ended
//! [`FilterValue::Range`]. Reversed bounds are swapped, never rejected;
//! an all-blank range collapses to absent.

use std::cmp::Ordering;

use crate::cast::FilterKind;
use crate::errors::ConfigurationError;
use crate::value::{FilterValue, RawInput, ScalarValue};

pub(crate) fn normalize(
    filter: &str,
    kind: &FilterKind,
    format: Option<&str>,
    raw: &RawInput,
) -> Result<FilterValue, ConfigurationError> {
    if raw.is_blank() {
        return Ok(FilterValue::Absent);
    }

    let (from, to): (Option<&RawInput>, Option<&RawInput>) = match raw {
        RawInput::Span { from, to } => (from.as_deref(), to.as_deref()),
        RawInput::List(items) => (items.first(), items.get(1)),
        RawInput::Map(map) => (map.get("from"), map.get("to")),
        RawInput::Str(_)
        | RawInput::Int(_)
        | RawInput::Float(_)
        | RawInput::Bool(_)
        | RawInput::Date(_)
        | RawInput::DateTime(_) => {
            // A lone scalar only reads as the one-element interval for
            // point-in-time types; elsewhere the author declared `range`
            // but assigns scalars, which is a definition mistake.
            if kind.supports_point_range() {
                (Some(raw), Some(raw))
            } else {
                return Err(ConfigurationError::point_range_not_supported(filter));
            }
        }
        RawInput::Null => (None, None),
    };

    let lower = cast_endpoint(filter, kind, format, from);
    let upper = cast_endpoint(filter, kind, format, to);

    Ok(match (lower, upper) {
        (None, None) => FilterValue::Absent,
        (Some(lower), Some(upper)) => {
            if lower.partial_cmp_value(&upper) == Some(Ordering::Greater) {
                FilterValue::Range {
                    lower: Some(upper),
                    upper: Some(lower),
                }
            } else {
                FilterValue::Range {
                    lower: Some(lower),
                    upper: Some(upper),
                }
            }
        }
        (lower, upper) => FilterValue::Range { lower, upper },
    })
}

/// One endpoint failing to cast does not void the other.
fn cast_endpoint(
    filter: &str,
    kind: &FilterKind,
    format: Option<&str>,
    raw: Option<&RawInput>,
) -> Option<ScalarValue> {
    let raw = raw?;
    match kind.cast(raw, format) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(filter, %error, "discarding range endpoint");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalize_date(raw: &RawInput) -> FilterValue {
        normalize("created_at", &FilterKind::Date, None, raw).unwrap()
    }

    #[test]
    fn orders_reversed_bounds() {
        let value = normalize_date(&RawInput::from(vec!["2013-01-01", "2012-01-01"]));
        assert_eq!(
            value,
            FilterValue::Range {
                lower: Some(ScalarValue::Date(date(2012, 1, 1))),
                upper: Some(ScalarValue::Date(date(2013, 1, 1))),
            }
        );
    }

    #[test]
    fn collapses_blank_bounds_to_absent() {
        assert_eq!(
            normalize_date(&RawInput::List(vec![RawInput::Null, RawInput::Null])),
            FilterValue::Absent
        );
        assert_eq!(
            normalize_date(&RawInput::span(None::<&str>, None::<&str>)),
            FilterValue::Absent
        );
        assert_eq!(normalize_date(&RawInput::Map(Default::default())), FilterValue::Absent);
    }

    #[test]
    fn keeps_open_ends() {
        let value = normalize_date(&RawInput::span(Some("2013-01-01"), None::<&str>));
        assert_eq!(
            value,
            FilterValue::Range {
                lower: Some(ScalarValue::Date(date(2013, 1, 1))),
                upper: None,
            }
        );
    }

    #[test]
    fn map_endpoints_cast_independently() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("from".to_owned(), RawInput::Str("oops".into()));
        map.insert("to".to_owned(), RawInput::Str("2013-01-01".into()));
        let value = normalize_date(&RawInput::Map(map));
        assert_eq!(
            value,
            FilterValue::Range {
                lower: None,
                upper: Some(ScalarValue::Date(date(2013, 1, 1))),
            }
        );
    }

    #[test]
    fn scalar_reads_as_point_range_for_dates_only() {
        assert_eq!(
            normalize_date(&RawInput::Str("2013-01-01".into())),
            FilterValue::Range {
                lower: Some(ScalarValue::Date(date(2013, 1, 1))),
                upper: Some(ScalarValue::Date(date(2013, 1, 1))),
            }
        );
        assert_eq!(
            normalize("price", &FilterKind::Integer, None, &RawInput::Int(5)),
            Err(ConfigurationError::point_range_not_supported("price"))
        );
    }
}
