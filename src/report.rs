//! Report definitions and instances.
//!
//! A [`ReportDefinition`] is an ordered, immutable list of filter specs
//! bound to a driver, built once and shared (it is handed out as an
//! `Arc`). A [`ReportInstance`] owns one set of assigned filter values
//! plus a base scope, and lazily composes the filtered scope, caching it
//! until the next assignment.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cast::FilterKind;
use crate::composite::{BoundOptions, bound_filters};
use crate::driver::QueryDriver;
use crate::dynamic::OperationPrimitive;
use crate::errors::{ConfigurationError, FilteringError};
use crate::filter::{FilterSpec, Predicate, PredicateContext};
use crate::util::warn_once;
use crate::value::{FilterValue, RawInput};

/// Builder for a report definition.
///
/// `filter` validates each spec as it is added, so configuration
/// mistakes surface at definition time:
///
/// ```rust
/// use filtercrate::{FilterKind, FilterSpec, MemoryDriver, ReportBuilder};
///
/// # fn main() -> Result<(), filtercrate::ConfigurationError> {
/// let definition = ReportBuilder::new(MemoryDriver)
///     .filter(FilterSpec::new("group_id", FilterKind::Integer).multiple())?
///     .filter(FilterSpec::new("created_at", FilterKind::Date).range())?
///     .build();
/// # Ok(())
/// # }
/// ```
pub struct ReportBuilder<D: QueryDriver> {
    driver: D,
    filters: Vec<FilterSpec<D>>,
}

impl<D: QueryDriver> ReportBuilder<D> {
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            filters: Vec::new(),
        }
    }

    /// Declare a filter.
    pub fn filter(mut self, spec: FilterSpec<D>) -> Result<Self, ConfigurationError> {
        self.push(spec)?;
        Ok(self)
    }

    /// Declare a filter with a custom predicate.
    pub fn filter_fn<F>(self, spec: FilterSpec<D>, predicate: F) -> Result<Self, ConfigurationError>
    where
        F: for<'a, 'b, 'c> Fn(
                &'a FilterValue,
                <D as QueryDriver>::Scope,
                &'b PredicateContext<'c, D>,
            ) -> <D as QueryDriver>::Scope
            + Send
            + Sync
            + 'static,
    {
        let predicate: Predicate<D> = Arc::new(predicate);
        self.filter(spec.with_predicate(predicate))
    }

    /// Declare the deprecated `from_<field>`/`to_<field>` date pair.
    pub fn date_range_filters(
        mut self,
        field: &str,
        from: impl Into<BoundOptions>,
        to: impl Into<BoundOptions>,
    ) -> Result<Self, ConfigurationError> {
        warn_once("date_range_filters is deprecated in favor of the range option on a date filter");
        let (from_spec, to_spec) =
            bound_filters(field, &FilterKind::Date, from.into(), to.into());
        self.push(from_spec)?;
        self.push(to_spec)?;
        Ok(self)
    }

    /// Declare the deprecated `from_<field>`/`to_<field>` integer pair.
    pub fn integer_range_filters(
        mut self,
        field: &str,
        from: impl Into<BoundOptions>,
        to: impl Into<BoundOptions>,
    ) -> Result<Self, ConfigurationError> {
        warn_once(
            "integer_range_filters is deprecated in favor of the range option on an integer filter",
        );
        let (from_spec, to_spec) =
            bound_filters(field, &FilterKind::Integer, from.into(), to.into());
        self.push(from_spec)?;
        self.push(to_spec)?;
        Ok(self)
    }

    /// Finish the definition. The result is shared read-only by every
    /// instance created from it.
    #[must_use]
    pub fn build(self) -> Arc<ReportDefinition<D>> {
        Arc::new(ReportDefinition {
            driver: self.driver,
            filters: self.filters,
        })
    }

    fn push(&mut self, spec: FilterSpec<D>) -> Result<(), ConfigurationError> {
        if self.filters.iter().any(|existing| existing.name() == spec.name()) {
            return Err(ConfigurationError::duplicate_filter(spec.name()));
        }
        spec.validate()?;
        self.filters.push(spec);
        Ok(())
    }
}

/// An ordered, immutable set of filters bound to a driver.
pub struct ReportDefinition<D: QueryDriver> {
    driver: D,
    filters: Vec<FilterSpec<D>>,
}

impl<D: QueryDriver> ReportDefinition<D> {
    #[must_use]
    pub fn builder(driver: D) -> ReportBuilder<D> {
        ReportBuilder::new(driver)
    }

    /// Filters in declaration order.
    #[must_use]
    pub fn filters(&self) -> &[FilterSpec<D>] {
        &self.filters
    }

    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&FilterSpec<D>> {
        self.filters.iter().find(|spec| spec.name() == name)
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Start a new definition from this one's filters.
    ///
    /// Composition replaces inheritance: the child is resolved at
    /// definition time and the parent stays untouched.
    #[must_use]
    pub fn extend(&self) -> ReportBuilder<D>
    where
        D: Clone,
    {
        ReportBuilder {
            driver: self.driver.clone(),
            filters: self.filters.clone(),
        }
    }

    /// Create an instance over a base scope.
    ///
    /// Filters with a `default` start out with that value coerced; all
    /// others start absent. The receiver is the shared definition handle;
    /// clone the `Arc` to create further instances.
    #[must_use]
    pub fn instance(self: Arc<Self>, base: D::Scope) -> ReportInstance<D> {
        let mut values = BTreeMap::new();
        for spec in &self.filters {
            if let Some(default) = &spec.options().default {
                match spec.coerce(default) {
                    Ok(value) => {
                        values.insert(spec.name().to_owned(), value);
                    }
                    Err(error) => {
                        // Defaults are validated at definition time; a
                        // failure here means the spec was mutated out from
                        // under us, so degrade to absent.
                        tracing::warn!(filter = spec.name(), %error, "default value discarded");
                    }
                }
            }
        }
        ReportInstance {
            definition: self,
            base,
            values,
            composed: None,
        }
    }

    /// Create an instance and assign initial raw attributes in one go.
    pub fn instance_with<I, K, V>(
        self: Arc<Self>,
        base: D::Scope,
        attributes: I,
    ) -> Result<ReportInstance<D>, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawInput>,
    {
        let mut instance = self.instance(base);
        for (name, raw) in attributes {
            instance.set(name.as_ref(), raw)?;
        }
        Ok(instance)
    }
}

static ABSENT: FilterValue = FilterValue::Absent;

/// One report evaluation: assigned filter values over a base scope.
///
/// Exclusively owned by its caller; the composed scope is cached until a
/// value is reassigned.
pub struct ReportInstance<D: QueryDriver> {
    definition: Arc<ReportDefinition<D>>,
    base: D::Scope,
    values: BTreeMap<String, FilterValue>,
    composed: Option<D::Scope>,
}

impl<D: QueryDriver> ReportInstance<D> {
    #[must_use]
    pub fn definition(&self) -> &ReportDefinition<D> {
        &self.definition
    }

    /// Assign raw input to a filter, re-coercing it and invalidating the
    /// cached scope.
    ///
    /// Malformed values never fail here — they coerce to absent. Only
    /// structural mistakes (unknown filter, wrong value shape for the
    /// declaration) are errors.
    pub fn set(&mut self, name: &str, raw: impl Into<RawInput>) -> Result<(), ConfigurationError> {
        let spec = self
            .definition
            .filter(name)
            .ok_or_else(|| ConfigurationError::unknown_filter(name))?;
        let mut raw = raw.into();
        if matches!(raw, RawInput::Null)
            && let Some(default) = &spec.options().default
        {
            raw = default.clone();
        }
        let value = spec.coerce(&raw)?;
        self.values.insert(name.to_owned(), value);
        self.composed = None;
        Ok(())
    }

    /// The coerced value of a filter; absent when never assigned.
    #[must_use]
    pub fn value(&self, name: &str) -> &FilterValue {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    /// Plain-data form of a filter's value, suitable for serialization
    /// and for feeding back through [`set`](Self::set).
    #[must_use]
    pub fn to_raw(&self, name: &str) -> RawInput {
        self.value(name).to_raw()
    }

    /// User-facing text rendering of a filter's value.
    #[must_use]
    pub fn value_as_string(&self, name: &str) -> Option<String> {
        let spec = self.definition.filter(name)?;
        Some(match self.value(name) {
            FilterValue::Absent => String::new(),
            FilterValue::Scalar(value) => spec.format_scalar(value),
            FilterValue::Multi(values) => values
                .iter()
                .map(|value| spec.format_scalar(value))
                .collect::<Vec<_>>()
                .join(","),
            FilterValue::Range { lower, upper } => format!(
                "{}..{}",
                lower.as_ref().map_or_else(String::new, |v| spec.format_scalar(v)),
                upper.as_ref().map_or_else(String::new, |v| spec.format_scalar(v)),
            ),
            FilterValue::Dynamic(condition) => format!(
                "{} {} {}",
                condition.field(),
                condition.operation(),
                condition
                    .value()
                    .map_or_else(String::new, |v| spec.format_scalar(v)),
            ),
        })
    }

    /// The filtered scope for the current value set.
    ///
    /// Composed on first access and cached until the next assignment.
    /// The only failure mode is a dynamic condition whose operator is
    /// outside the allow-list — deliberately deferred to this point.
    pub fn assets(&mut self) -> Result<&D::Scope, FilteringError> {
        let composed = match self.composed.take() {
            Some(scope) => scope,
            None => self.compose()?,
        };
        Ok(self.composed.insert(composed))
    }

    /// Fold the filters over the base scope, in declaration order.
    fn compose(&self) -> Result<D::Scope, FilteringError> {
        let driver = &self.definition.driver;
        let context = PredicateContext { driver };
        let mut scope = self.base.clone();
        for spec in &self.definition.filters {
            let value = self.value(spec.name());
            if value.is_absent() && !spec.options().allow_nil {
                continue;
            }
            if let FilterValue::Dynamic(condition) = value
                && !spec.operation_allowed(condition.operation())
            {
                return Err(FilteringError::unknown_operation(
                    spec.name(),
                    condition.operation(),
                ));
            }
            scope = match &spec.predicate {
                Some(predicate) => predicate(value, scope, &context),
                None => Self::apply_builtin(spec, value, scope, driver)?,
            };
        }
        Ok(scope)
    }

    fn apply_builtin(
        spec: &FilterSpec<D>,
        value: &FilterValue,
        scope: D::Scope,
        driver: &D,
    ) -> Result<D::Scope, FilteringError> {
        let field = spec.name();
        Ok(match value {
            FilterValue::Absent => scope,
            FilterValue::Scalar(value) => driver.equal(scope, field, value),
            FilterValue::Multi(values) => driver.any_of(scope, field, values),
            FilterValue::Range { lower, upper } => {
                let mut scope = scope;
                if let Some(lower) = lower {
                    scope = driver.greater_equal(scope, field, lower);
                }
                if let Some(upper) = upper {
                    scope = driver.less_equal(scope, field, upper);
                }
                scope
            }
            FilterValue::Dynamic(condition) => {
                let Some(value) = condition.value() else {
                    return Ok(scope);
                };
                match crate::dynamic::primitive_for(condition.operation()) {
                    Some(OperationPrimitive::Equal) => {
                        driver.equal(scope, condition.field(), value)
                    }
                    Some(OperationPrimitive::GreaterEqual) => {
                        driver.greater_equal(scope, condition.field(), value)
                    }
                    Some(OperationPrimitive::LessEqual) => {
                        driver.less_equal(scope, condition.field(), value)
                    }
                    Some(OperationPrimitive::Fuzzy) => {
                        driver.contains(scope, condition.field(), value)
                    }
                    None => {
                        // Allow-listed custom token, but nothing built in
                        // realizes it; that needs a custom predicate.
                        return Err(FilteringError::unsupported_operation(
                            spec.name(),
                            condition.operation(),
                        ));
                    }
                }
            }
        })
    }
}
