//! Deprecated from/to bound filters.
//!
//! Expands one logical ranged field into two independent filters named
//! `from_<field>` / `to_<field>` whose predicates delegate to the
//! driver's comparison primitives. Superseded by the `range` option on a
//! single filter; kept for definitions that still rely on the split
//! naming.

use std::sync::Arc;

use crate::cast::FilterKind;
use crate::driver::QueryDriver;
use crate::filter::{FilterOptions, FilterSpec, Predicate};
use crate::value::FilterValue;

/// Options for one generated bound filter. A bare string stands for a
/// custom filter name.
#[derive(Debug, Clone, Default)]
pub struct BoundOptions {
    pub name: Option<String>,
    pub options: FilterOptions,
}

/// No overrides: default naming, default options.
impl From<()> for BoundOptions {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for BoundOptions {
    fn from(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            options: FilterOptions::default(),
        }
    }
}

impl From<String> for BoundOptions {
    fn from(name: String) -> Self {
        Self {
            name: Some(name),
            options: FilterOptions::default(),
        }
    }
}

impl From<FilterOptions> for BoundOptions {
    fn from(options: FilterOptions) -> Self {
        Self {
            name: None,
            options,
        }
    }
}

/// Derive the `from_`/`to_` filter pair for a field.
pub(crate) fn bound_filters<D: QueryDriver>(
    field: &str,
    kind: &FilterKind,
    from: BoundOptions,
    to: BoundOptions,
) -> (FilterSpec<D>, FilterSpec<D>) {
    let identifier = field.replace('.', "_");

    let from_name = from
        .name
        .unwrap_or_else(|| format!("from_{identifier}"));
    let from_field = field.to_owned();
    let from_predicate: Predicate<D> = Arc::new(move |value, scope, ctx| match value {
        FilterValue::Scalar(value) => ctx.driver().greater_equal(scope, &from_field, value),
        _ => scope,
    });
    let from_spec = FilterSpec::new(from_name, kind.clone())
        .with_options(from.options)
        .with_predicate(from_predicate);

    let to_name = to.name.unwrap_or_else(|| format!("to_{identifier}"));
    let to_field = field.to_owned();
    let to_predicate: Predicate<D> = Arc::new(move |value, scope, ctx| match value {
        FilterValue::Scalar(value) => ctx.driver().less_equal(scope, &to_field, value),
        _ => scope,
    });
    let to_spec = FilterSpec::new(to_name, kind.clone())
        .with_options(to.options)
        .with_predicate(to_predicate);

    (from_spec, to_spec)
}
