//! Backend drivers.
//!
//! A driver realizes the comparison primitives over an opaque scope —
//! whatever "a narrowable query" means for its backend. Filter logic never
//! inspects the scope; it only threads it through these primitives, so the
//! same filter definitions work against structurally different engines.
//!
//! Implementations must be pure with respect to the scope argument:
//! return a new scope, never mutate shared state, so that composition
//! order is deterministic and replayable.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::value::ScalarValue;

pub mod memory;
#[cfg(feature = "sea-orm")]
pub mod sea_orm;

pub use memory::{MemoryDriver, Record};
#[cfg(feature = "sea-orm")]
pub use self::sea_orm::SeaOrmDriver;

/// Comparison primitives over an opaque scope.
///
/// Field paths may be dotted (`"groups.name"`); resolving them into
/// joins or lookups is the driver's concern. A [`ScalarValue::Date`]
/// compared against timestamp-typed data must match the whole day
/// interval, not midnight — `equal` becomes a between, `greater_equal`
/// the start of the day, `less_equal` its end.
pub trait QueryDriver {
    type Scope: Clone;

    #[must_use]
    fn equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope;

    #[must_use]
    fn greater_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope;

    #[must_use]
    fn less_equal(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope;

    /// Pattern containment for text values; identical to [`equal`]
    /// for ordered scalar types.
    ///
    /// [`equal`]: QueryDriver::equal
    #[must_use]
    fn contains(&self, scope: Self::Scope, field: &str, value: &ScalarValue) -> Self::Scope;

    /// Membership in a value set: a record matches when any single value
    /// matches. Native `IN` where the backend has one, a logical OR of
    /// per-value predicates otherwise.
    #[must_use]
    fn any_of(&self, scope: Self::Scope, field: &str, values: &[ScalarValue]) -> Self::Scope;
}

/// Inclusive day interval for comparing a date against timestamps.
#[must_use]
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1) - Duration::seconds(1))
}
