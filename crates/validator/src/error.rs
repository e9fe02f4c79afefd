//! Error types for building validators, running them, and querying reports.
//!
//! Each phase has its own enum so callers can tell a malformed builder graph
//! apart from a user rule that failed while evaluating a specific object:
//!
//! - [`BuildError`]: raised by [`Builder::build`](crate::Builder::build)
//! - [`ValidationError`]: raised by [`Validator::validate`](crate::Validator::validate)
//! - [`PathError`]: raised by [`ResultNode::rule_result`](crate::ResultNode::rule_result)
//!
//! [`Error`] unifies the three for callers that propagate everything with `?`.

use std::fmt;

/// Boxed error raised by a user predicate or accessor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// BUILD ERRORS
// ============================================================================

/// Which declared name failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// The validator's report label.
    Validator,
    /// A member name.
    Member,
    /// A rule id.
    Rule,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validator => "validator name",
            Self::Member => "member name",
            Self::Rule => "rule id",
        })
    }
}

/// The builder graph cannot be compiled.
///
/// A failed `build()` never yields a partial graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A builder declares neither rules nor members.
    #[error("validator '{validator}' is empty: it has neither rules nor members")]
    EmptyValidator {
        /// Name of the empty builder.
        validator: String,
    },

    /// Every candidate builder of a member is empty.
    #[error("all sub validators of member '{member}' in '{validator}' are empty")]
    EmptyCandidates {
        /// Name of the declaring builder.
        validator: String,
        /// The member whose candidates are all empty.
        member: String,
    },

    /// A name or id would make report paths ambiguous.
    #[error(
        "invalid {kind} '{value}' in '{validator}': \
         names must be non-empty and free of '.', '[', ']' and whitespace"
    )]
    InvalidName {
        /// Name of the declaring builder.
        validator: String,
        /// What kind of name was rejected.
        kind: NameKind,
        /// The rejected value.
        value: String,
    },
}

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// What was running when user code failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvocationTarget {
    /// A rule predicate, by id (possibly empty).
    Rule(String),
    /// A member accessor, by member name.
    Member(String),
}

impl fmt::Display for InvocationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(id) if id.is_empty() => f.write_str("anonymous rule"),
            Self::Rule(id) => write!(f, "rule '{id}'"),
            Self::Member(name) => write!(f, "accessor of member '{name}'"),
        }
    }
}

/// A validation call was aborted.
///
/// No partial report is returned alongside any of these: the first error
/// anywhere in the descent ends the call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// No candidate validator matches the runtime type or any of its ancestors.
    #[error("no validator found for type {type_name} in member '{member}'")]
    Dispatch {
        /// The member whose value could not be dispatched.
        member: String,
        /// Runtime type of the offending value.
        type_name: &'static str,
    },

    /// A rule predicate or member accessor returned an error.
    #[error("{target} failed on {type_name}: {source}")]
    Invocation {
        /// The rule or member that failed.
        target: InvocationTarget,
        /// Type of the object being evaluated.
        type_name: &'static str,
        /// The original cause.
        #[source]
        source: BoxError,
    },

    /// Member nesting went deeper than [`ValidationOptions::max_depth`](crate::ValidationOptions::max_depth).
    #[error("validation depth limit of {limit} exceeded at '{path}'")]
    DepthExceeded {
        /// Configured limit.
        limit: usize,
        /// Report name of the node that crossed the limit.
        path: String,
    },

    /// A compiled node was handed an object of the wrong type.
    #[error("expected an object of type {expected}, found {found}")]
    TypeMismatch {
        /// Type the node was compiled for.
        expected: &'static str,
        /// Type actually received.
        found: &'static str,
    },
}

impl ValidationError {
    /// The user error behind an [`Invocation`](Self::Invocation) failure.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Invocation { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Returns `true` for dispatch failures.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. })
    }

    /// Returns `true` when user code failed.
    pub fn is_invocation(&self) -> bool {
        matches!(self, Self::Invocation { .. })
    }
}

// ============================================================================
// PATH ERRORS
// ============================================================================

/// A rule path passed to [`ResultNode::rule_result`](crate::ResultNode::rule_result)
/// is malformed or does not match the report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PathError {
    /// The path has no tokens at all.
    #[error("rule path is empty")]
    Empty,

    /// The first token is not the report's root name.
    #[error("rule path does not start with the root object name '{expected}' (found '{found}')")]
    RootMismatch {
        /// Name of the node the lookup started from.
        expected: String,
        /// First token of the path.
        found: String,
    },

    /// The path ends before naming a bracketed rule id.
    #[error("rule path '{path}' must end with a bracketed rule id")]
    MissingRule {
        /// The full path.
        path: String,
    },

    /// A member token matches no child node.
    #[error("rule path does not match any member: '{member}'")]
    UnknownMember {
        /// The unmatched token.
        member: String,
    },

    /// Tokens follow the bracketed rule id.
    #[error("unexpected segments after rule id in '{path}'")]
    TrailingSegments {
        /// The full path.
        path: String,
    },
}

// ============================================================================
// UNIFIED ERROR
// ============================================================================

/// Any error this crate produces.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// See [`BuildError`].
    #[error(transparent)]
    Build(#[from] BuildError),

    /// See [`ValidationError`].
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// See [`PathError`].
    #[error(transparent)]
    Path(#[from] PathError),
}

// ============================================================================
// TESTS
// ============================================================================
