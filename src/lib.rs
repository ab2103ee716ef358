//! # Declarative Filtering for Reports
//!
//! Declare named, typed filters once, assign raw user input (strings,
//! numbers, lists, `{from:, to:}` maps, open-ended intervals), and fold
//! the coerced values into one composed query.
//!
//! ## Key Pieces
//!
//! - **[`FilterSpec`]**: an immutable filter declaration — name, type
//!   ([`FilterKind`]) and options (`multiple`, `range`, `allow_nil`,
//!   `allow_blank`, `operations`, default, header, date format).
//! - **[`ReportBuilder`] / [`ReportDefinition`]**: an ordered filter list
//!   bound to a driver, built once and shared across instances.
//! - **[`ReportInstance`]**: one evaluation — assigned values over a base
//!   scope, with the composed scope cached until the next assignment.
//! - **[`QueryDriver`]**: the backend contract (equality, ordered
//!   comparison, pattern containment, set membership). Ships with
//!   [`MemoryDriver`] for record collections and, behind the default
//!   backend features, `SeaOrmDriver` for `sea_orm::Condition` building.
//!
//! ## Example
//!
//! ```rust
//! use filtercrate::{FilterKind, FilterSpec, MemoryDriver, Record, ReportBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = ReportBuilder::new(MemoryDriver)
//!     .filter(FilterSpec::new("group_id", FilterKind::Integer).multiple())?
//!     .filter(FilterSpec::new("name", FilterKind::String))?
//!     .build();
//!
//! let records = vec![
//!     Record::new().with("group_id", 1).with("name", "draft"),
//!     Record::new().with("group_id", 3).with("name", "final"),
//! ];
//!
//! let mut report = definition.instance(records);
//! report.set("group_id", vec![1, 2])?;
//! assert_eq!(report.assets()?.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Coercion never panics and never fails a query: malformed input is
//! discarded and the filter simply does not narrow the scope. The two
//! error types draw the line between author mistakes
//! ([`ConfigurationError`], immediate) and unresolvable dynamic
//! operators ([`FilteringError`], raised only when the scope is
//! composed).

pub mod cast;
pub mod composite;
pub mod driver;
pub mod dynamic;
pub mod errors;
pub mod filter;
pub mod range;
pub mod report;
mod util;
pub mod value;

pub use cast::{FieldSchema, FilterKind, ScalarKind};
pub use composite::BoundOptions;
pub use driver::{MemoryDriver, QueryDriver, Record, day_bounds};
#[cfg(feature = "sea-orm")]
pub use driver::SeaOrmDriver;
pub use dynamic::{DEFAULT_OPERATIONS, DynamicCondition};
pub use errors::{ConfigurationError, FilteringError};
pub use filter::{FilterOptions, FilterSpec, Predicate, PredicateContext};
pub use report::{ReportBuilder, ReportDefinition, ReportInstance};
pub use value::{FilterValue, RawInput, ScalarValue};
