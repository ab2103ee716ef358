//! Filter definitions.
//!
//! A [`FilterSpec`] is the immutable declaration of one filter: its name,
//! declared type, recognized options and, optionally, a custom predicate.
//! Specs are created once when a report is defined and shared read-only
//! across every instance of that report.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::cast::FilterKind;
use crate::driver::QueryDriver;
use crate::dynamic::{DEFAULT_OPERATIONS, DynamicCondition};
use crate::errors::ConfigurationError;
use crate::range;
use crate::value::{FilterValue, ISO_DATE_FORMAT, ISO_DATETIME_FORMAT, RawInput, ScalarValue};

/// Collaborators available to a custom predicate.
pub struct PredicateContext<'a, D: QueryDriver> {
    pub(crate) driver: &'a D,
}

impl<D: QueryDriver> PredicateContext<'_, D> {
    #[must_use]
    pub fn driver(&self) -> &D {
        self.driver
    }
}

/// A custom predicate: `(typed value, scope, context) -> scope`.
///
/// Stored as data on the spec — behavior is attached, not inherited.
pub type Predicate<D> = Arc<
    dyn for<'a, 'b, 'c> Fn(
            &'a FilterValue,
            <D as QueryDriver>::Scope,
            &'b PredicateContext<'c, D>,
        ) -> <D as QueryDriver>::Scope
        + Send
        + Sync,
>;

/// Recognized filter configuration.
///
/// The typed builder methods on [`FilterSpec`] make unknown options
/// unrepresentable; [`FilterOptions::from_raw`] covers data-driven
/// declaration and rejects unrecognized keys eagerly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub multiple: bool,
    pub range: bool,
    pub allow_nil: bool,
    pub allow_blank: bool,
    pub operations: Vec<String>,
    pub default: Option<RawInput>,
    pub header: Option<String>,
    pub format: Option<String>,
}

impl FilterOptions {
    /// Parse an options map, rejecting unrecognized keys.
    pub fn from_raw(
        filter: &str,
        map: &BTreeMap<String, RawInput>,
    ) -> Result<Self, ConfigurationError> {
        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "multiple" => options.multiple = expect_bool(filter, key, value)?,
                "range" => options.range = expect_bool(filter, key, value)?,
                "allow_nil" => options.allow_nil = expect_bool(filter, key, value)?,
                "allow_blank" => options.allow_blank = expect_bool(filter, key, value)?,
                "operations" => options.operations = expect_str_list(filter, key, value)?,
                "default" => options.default = Some(value.clone()),
                "header" => options.header = Some(expect_str(filter, key, value)?),
                "format" => options.format = Some(expect_str(filter, key, value)?),
                _ => return Err(ConfigurationError::unsupported_option(filter, key)),
            }
        }
        Ok(options)
    }
}

fn expect_bool(filter: &str, key: &str, value: &RawInput) -> Result<bool, ConfigurationError> {
    match value {
        RawInput::Bool(b) => Ok(*b),
        _ => Err(ConfigurationError::invalid_option(filter, key, "a boolean")),
    }
}

fn expect_str(filter: &str, key: &str, value: &RawInput) -> Result<String, ConfigurationError> {
    match value {
        RawInput::Str(s) => Ok(s.clone()),
        _ => Err(ConfigurationError::invalid_option(filter, key, "a string")),
    }
}

fn expect_str_list(
    filter: &str,
    key: &str,
    value: &RawInput,
) -> Result<Vec<String>, ConfigurationError> {
    let RawInput::List(items) = value else {
        return Err(ConfigurationError::invalid_option(
            filter,
            key,
            "a list of operator tokens",
        ));
    };
    items
        .iter()
        .map(|item| match item {
            RawInput::Str(s) => Ok(s.clone()),
            _ => Err(ConfigurationError::invalid_option(
                filter,
                key,
                "a list of operator tokens",
            )),
        })
        .collect()
}

/// Immutable definition of one filter.
pub struct FilterSpec<D: QueryDriver> {
    name: String,
    kind: FilterKind,
    options: FilterOptions,
    pub(crate) predicate: Option<Predicate<D>>,
}

impl<D: QueryDriver> FilterSpec<D> {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: FilterOptions::default(),
            predicate: None,
        }
    }

    // ============================================================================
    // Option builders
    // ============================================================================

    /// Accept a list of values, matched as a union.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.options.multiple = true;
        self
    }

    /// Accept an interval with independently optional bounds.
    #[must_use]
    pub fn range(mut self) -> Self {
        self.options.range = true;
        self
    }

    /// Invoke the predicate even when the coerced value is absent.
    #[must_use]
    pub fn allow_nil(mut self) -> Self {
        self.options.allow_nil = true;
        self
    }

    /// Keep blank-but-present string input instead of discarding it.
    #[must_use]
    pub fn allow_blank(mut self) -> Self {
        self.options.allow_blank = true;
        self
    }

    /// Operator allow-list for a dynamic filter.
    #[must_use]
    pub fn operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.operations = operations.into_iter().map(Into::into).collect();
        self
    }

    /// Value substituted when nothing (or nil) is assigned.
    #[must_use]
    pub fn default_value(mut self, default: impl Into<RawInput>) -> Self {
        self.options.default = Some(default.into());
        self
    }

    /// Human-readable label.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.options.header = Some(header.into());
        self
    }

    /// Date/time pattern used for both parsing and rendering.
    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.options.format = Some(format.into());
        self
    }

    /// Replace the whole option set with a parsed one.
    #[must_use]
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate<D>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    #[must_use]
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Label for rendering: the configured header, or the humanized name.
    #[must_use]
    pub fn label(&self) -> String {
        self.options.header.clone().unwrap_or_else(|| {
            let mut label = self.name.replace(['_', '.'], " ");
            if let Some(first) = label.get_mut(..1) {
                first.make_ascii_uppercase();
            }
            label
        })
    }

    /// Whether a dynamic condition may use this operator.
    #[must_use]
    pub fn operation_allowed(&self, operation: &str) -> bool {
        if self.options.operations.is_empty() {
            DEFAULT_OPERATIONS.contains(&operation)
        } else {
            self.options.operations.iter().any(|op| op == operation)
        }
    }

    // ============================================================================
    // Coercion
    // ============================================================================

    /// Coerce raw input into this filter's typed value.
    ///
    /// Structural mismatches (a range into a non-range filter, a list
    /// into a non-multiple one) are configuration errors; merely
    /// malformed values are discarded and become absent.
    pub fn coerce(&self, raw: &RawInput) -> Result<FilterValue, ConfigurationError> {
        let format = self.options.format.as_deref();
        if let FilterKind::Dynamic(schema) = &self.kind {
            if raw.is_blank() {
                return Ok(FilterValue::Absent);
            }
            return Ok(DynamicCondition::parse(&self.name, schema, format, raw)?
                .map_or(FilterValue::Absent, FilterValue::Dynamic));
        }
        if self.options.range {
            return range::normalize(&self.name, &self.kind, format, raw);
        }
        if self.options.multiple {
            return self.coerce_multi(raw, format);
        }
        match raw {
            RawInput::List(_) => Err(ConfigurationError::multiple_not_allowed(&self.name)),
            RawInput::Span { .. } | RawInput::Map(_) => {
                Err(ConfigurationError::range_not_allowed(&self.name))
            }
            _ => Ok(self.coerce_scalar(raw, format)),
        }
    }

    fn coerce_multi(
        &self,
        raw: &RawInput,
        format: Option<&str>,
    ) -> Result<FilterValue, ConfigurationError> {
        match raw {
            RawInput::Span { .. } | RawInput::Map(_) => {
                Err(ConfigurationError::range_not_allowed(&self.name))
            }
            RawInput::List(items) => {
                let mut values = Vec::new();
                for item in items {
                    match self.kind.cast(item, format) {
                        Ok(Some(value)) => values.push(value),
                        Ok(None) => {}
                        Err(error) => {
                            tracing::debug!(filter = %self.name, %error, "discarding value");
                        }
                    }
                }
                if values.is_empty() {
                    Ok(FilterValue::Absent)
                } else {
                    Ok(FilterValue::Multi(values))
                }
            }
            _ => Ok(match self.coerce_scalar(raw, format) {
                FilterValue::Scalar(value) => FilterValue::Multi(vec![value]),
                other => other,
            }),
        }
    }

    fn coerce_scalar(&self, raw: &RawInput, format: Option<&str>) -> FilterValue {
        match self.kind.cast(raw, format) {
            Ok(Some(value)) => FilterValue::Scalar(value),
            Ok(None) => {
                // Blank-but-present strings survive when the filter says so.
                if self.options.allow_blank
                    && self.kind == FilterKind::String
                    && matches!(raw, RawInput::Str(_))
                {
                    if let RawInput::Str(s) = raw {
                        return FilterValue::Scalar(ScalarValue::Text(s.clone()));
                    }
                }
                FilterValue::Absent
            }
            Err(error) => {
                tracing::debug!(filter = %self.name, %error, "discarding value");
                FilterValue::Absent
            }
        }
    }

    /// Render a single coerced scalar back to user-facing text.
    #[must_use]
    pub fn format_scalar(&self, value: &ScalarValue) -> String {
        match value {
            ScalarValue::Int(i) => i.to_string(),
            ScalarValue::Float(v) => v.to_string(),
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Date(d) => d
                .format(self.options.format.as_deref().unwrap_or(ISO_DATE_FORMAT))
                .to_string(),
            ScalarValue::DateTime(t) => t
                .format(
                    self.options
                        .format
                        .as_deref()
                        .unwrap_or(ISO_DATETIME_FORMAT),
                )
                .to_string(),
        }
    }

    /// Definition-time validation, run when the spec is added to a report.
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.options.operations.is_empty() && !matches!(self.kind, FilterKind::Dynamic(_)) {
            return Err(ConfigurationError::operations_not_allowed(&self.name));
        }
        if self.options.multiple && self.options.range {
            return Err(ConfigurationError::incompatible_options(
                &self.name, "multiple", "range",
            ));
        }
        if matches!(self.kind, FilterKind::Dynamic(_))
            && (self.options.multiple || self.options.range)
        {
            return Err(ConfigurationError::incompatible_options(
                &self.name,
                "dynamic",
                if self.options.multiple { "multiple" } else { "range" },
            ));
        }
        // A default that cannot coerce is an authoring mistake, caught here
        // rather than on every instance.
        if let Some(default) = &self.options.default {
            self.coerce(default)?;
        }
        Ok(())
    }
}

impl<D: QueryDriver> Clone for FilterSpec<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            options: self.options.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<D: QueryDriver> fmt::Debug for FilterSpec<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
