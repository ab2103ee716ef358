//! # Error Handling for Filter Definitions
//!
//! Two error types cover the whole engine:
//!
//! - [`ConfigurationError`] — the report author (or the code assigning
//!   values) did something structurally wrong: an unknown option key, a
//!   range assigned to a non-range filter, a dynamic condition on a field
//!   nobody declared. These surface immediately, at definition or
//!   assignment time.
//! - [`FilteringError`] — the composed query cannot be produced. The only
//!   case is a dynamic condition whose operator is outside the allow-list;
//!   it is raised when the scope is composed, never at assignment, so that
//!   the unresolved operator stays inspectable until then.
//!
//! Malformed *values* (a date that does not parse, an out-of-set enum
//! token) are not errors at all — they are discarded during coercion and
//! the filter simply does not narrow the scope.

use std::fmt;

/// A structural mistake in a filter definition or value assignment.
///
/// Always fatal and surfaced synchronously to the caller; never deferred
/// to query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A value was assigned to a filter name the report does not declare.
    UnknownFilter {
        /// The unrecognized filter name
        name: String,
    },

    /// Two filters with the same name were declared on one report.
    DuplicateFilter {
        /// The name declared twice
        name: String,
    },

    /// An options map contained a key the engine does not recognize.
    UnsupportedOption {
        /// Filter being declared
        filter: String,
        /// The unrecognized option key
        option: String,
    },

    /// A recognized option key carried a value of the wrong shape.
    InvalidOption {
        /// Filter being declared
        filter: String,
        /// The offending option key
        option: String,
        /// What the option expects
        expected: &'static str,
    },

    /// Two options that cannot be combined were both set.
    IncompatibleOptions {
        /// Filter being declared
        filter: String,
        /// First of the conflicting options
        first: &'static str,
        /// Second of the conflicting options
        second: &'static str,
    },

    /// The `operations` option is only meaningful on dynamic filters.
    OperationsNotAllowed {
        /// Filter being declared
        filter: String,
    },

    /// A list of values was assigned to a filter without `multiple`.
    MultipleNotAllowed {
        /// Filter that received the list
        filter: String,
    },

    /// A range-shaped value was assigned to a filter without `range`.
    RangeNotAllowed {
        /// Filter that received the range
        filter: String,
    },

    /// A single scalar was assigned to a range filter whose type has no
    /// point-in-time semantics (only date and datetime ranges collapse a
    /// scalar into a one-element interval).
    PointRangeNotSupported {
        /// Filter that received the scalar
        filter: String,
    },

    /// A dynamic condition referenced a field absent from the schema.
    UnknownField {
        /// Dynamic filter being assigned
        filter: String,
        /// The unresolvable field
        field: String,
    },

    /// A dynamic filter value was not a `[field, operation, value]` triple
    /// or an equivalent map.
    InvalidCondition {
        /// Dynamic filter being assigned
        filter: String,
    },
}

impl ConfigurationError {
    // ============================================================================
    // Constructors
    // ============================================================================

    pub fn unknown_filter(name: impl Into<String>) -> Self {
        Self::UnknownFilter { name: name.into() }
    }

    pub fn duplicate_filter(name: impl Into<String>) -> Self {
        Self::DuplicateFilter { name: name.into() }
    }

    pub fn unsupported_option(filter: impl Into<String>, option: impl Into<String>) -> Self {
        Self::UnsupportedOption {
            filter: filter.into(),
            option: option.into(),
        }
    }

    pub fn invalid_option(
        filter: impl Into<String>,
        option: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidOption {
            filter: filter.into(),
            option: option.into(),
            expected,
        }
    }

    pub fn incompatible_options(
        filter: impl Into<String>,
        first: &'static str,
        second: &'static str,
    ) -> Self {
        Self::IncompatibleOptions {
            filter: filter.into(),
            first,
            second,
        }
    }

    pub fn operations_not_allowed(filter: impl Into<String>) -> Self {
        Self::OperationsNotAllowed {
            filter: filter.into(),
        }
    }

    pub fn multiple_not_allowed(filter: impl Into<String>) -> Self {
        Self::MultipleNotAllowed {
            filter: filter.into(),
        }
    }

    pub fn range_not_allowed(filter: impl Into<String>) -> Self {
        Self::RangeNotAllowed {
            filter: filter.into(),
        }
    }

    pub fn point_range_not_supported(filter: impl Into<String>) -> Self {
        Self::PointRangeNotSupported {
            filter: filter.into(),
        }
    }

    pub fn unknown_field(filter: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            filter: filter.into(),
            field: field.into(),
        }
    }

    pub fn invalid_condition(filter: impl Into<String>) -> Self {
        Self::InvalidCondition {
            filter: filter.into(),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFilter { name } => write!(f, "no filter named '{name}' is declared"),
            Self::DuplicateFilter { name } => {
                write!(f, "filter '{name}' is declared more than once")
            }
            Self::UnsupportedOption { filter, option } => {
                write!(f, "filter '{filter}': unsupported option '{option}'")
            }
            Self::InvalidOption {
                filter,
                option,
                expected,
            } => write!(
                f,
                "filter '{filter}': option '{option}' expects {expected}"
            ),
            Self::IncompatibleOptions {
                filter,
                first,
                second,
            } => write!(
                f,
                "filter '{filter}': options '{first}' and '{second}' cannot be combined"
            ),
            Self::OperationsNotAllowed { filter } => write!(
                f,
                "filter '{filter}': 'operations' is only supported by dynamic filters"
            ),
            Self::MultipleNotAllowed { filter } => write!(
                f,
                "filter '{filter}' received multiple values but 'multiple' is not set"
            ),
            Self::RangeNotAllowed { filter } => write!(
                f,
                "filter '{filter}' received a range but 'range' is not set"
            ),
            Self::PointRangeNotSupported { filter } => write!(
                f,
                "filter '{filter}': a single value cannot be treated as a range for this type"
            ),
            Self::UnknownField { filter, field } => {
                write!(f, "filter '{filter}': unknown field '{field}'")
            }
            Self::InvalidCondition { filter } => write!(
                f,
                "filter '{filter}' expects a [field, operation, value] triple"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Failure to compose the filtered scope.
///
/// Raised only when the composed query is actually requested, so that a
/// condition with an unresolved operator can still be inspected (and
/// rendered back to the user) after assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteringError {
    /// The dynamic condition's operator is not in the filter's allow-list.
    UnknownOperation {
        /// The dynamic filter
        filter: String,
        /// The rejected operator token
        operation: String,
    },

    /// The operator is allow-listed but the built-in predicate has no
    /// primitive for it (custom operators need a custom predicate).
    UnsupportedOperation {
        /// The dynamic filter
        filter: String,
        /// The operator token without a built-in primitive
        operation: String,
    },
}

impl FilteringError {
    pub fn unknown_operation(filter: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            filter: filter.into(),
            operation: operation.into(),
        }
    }

    pub fn unsupported_operation(filter: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            filter: filter.into(),
            operation: operation.into(),
        }
    }

    /// The operator token that could not be applied.
    #[must_use]
    pub fn operation(&self) -> &str {
        match self {
            Self::UnknownOperation { operation, .. }
            | Self::UnsupportedOperation { operation, .. } => operation,
        }
    }
}

impl fmt::Display for FilteringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOperation { filter, operation } => {
                write!(f, "filter '{filter}': unknown operation '{operation}'")
            }
            Self::UnsupportedOperation { filter, operation } => write!(
                f,
                "filter '{filter}': operation '{operation}' has no built-in predicate"
            ),
        }
    }
}

impl std::error::Error for FilteringError {}
