//! Named boolean assertions over a business object.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, InvocationTarget, ValidationError};
use crate::object::{BusinessObject, DynObject, view_as};

type Predicate<T> = dyn Fn(&T) -> Result<bool, BoxError> + Send + Sync;

/// An `(id, description, predicate)` triple.
///
/// Rules compare equal by id.
pub struct Rule<T> {
    id: String,
    description: String,
    predicate: Arc<Predicate<T>>,
}

impl<T: BusinessObject> Rule<T> {
    /// Creates a rule from an infallible predicate.
    pub fn new<P>(id: impl Into<String>, description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::fallible(id, description, move |object: &T| -> Result<bool, BoxError> {
            Ok(predicate(object))
        })
    }

    /// Creates a rule whose predicate may fail.
    ///
    /// A failure aborts the validation call; it is never reported as an
    /// invalid rule.
    pub fn fallible<P, E>(id: impl Into<String>, description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            id: id.into(),
            description: description.into(),
            predicate: Arc::new(move |object: &T| -> Result<bool, BoxError> {
                predicate(object).map_err(Into::into)
            }),
        }
    }

    /// Evaluates the predicate.
    pub fn apply(&self, object: &T) -> Result<bool, BoxError> {
        (self.predicate)(object)
    }

    /// Re-targets this rule at a subtype whose ancestor chain contains `T`.
    pub(crate) fn lift<S: BusinessObject>(&self) -> Rule<S> {
        let predicate = Arc::clone(&self.predicate);
        Rule {
            id: self.id.clone(),
            description: self.description.clone(),
            predicate: Arc::new(move |object: &S| -> Result<bool, BoxError> {
                let parent = view_as::<T>(object).ok_or_else(|| {
                    missing_view::<S, T>()
                })?;
                predicate(parent)
            }),
        }
    }
}

impl<T> Rule<T> {
    /// Rule id, possibly empty.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            description: self.description.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> PartialEq for Rule<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Rule<T> {}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Raised when an inherited rule or accessor runs on an object whose ancestor
/// chain does not contain the declaring type.
#[derive(Debug, thiserror::Error)]
#[error("{subtype} has no {parent} view in its supertype chain")]
pub(crate) struct MissingView {
    subtype: &'static str,
    parent: &'static str,
}

pub(crate) fn missing_view<S, T>() -> BoxError {
    Box::new(MissingView {
        subtype: crate::object::short_type_name::<S>(),
        parent: crate::object::short_type_name::<T>(),
    })
}

// ============================================================================
// ERASED RULES
// ============================================================================

/// A compiled rule that accepts any object and checks its type on entry.
pub(crate) trait ErasedRule: Send + Sync {
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    fn evaluate(&self, object: &DynObject) -> Result<bool, ValidationError>;
}

impl<T: BusinessObject> ErasedRule for Rule<T> {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn evaluate(&self, object: &DynObject) -> Result<bool, ValidationError> {
        let any: &dyn std::any::Any = object;
        let typed = any
            .downcast_ref::<T>()
            .ok_or_else(|| ValidationError::TypeMismatch {
                expected: crate::object::short_type_name::<T>(),
                found: object.type_name(),
            })?;
        self.apply(typed).map_err(|source| ValidationError::Invocation {
            target: InvocationTarget::Rule(self.id.clone()),
            type_name: object.type_name(),
            source,
        })
    }
}

/// Read-only view of a compiled rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleInfo<'a> {
    /// Rule id, possibly empty.
    pub id: &'a str,
    /// Human-readable description.
    pub description: &'a str,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        age: i32,
    }

    impl BusinessObject for Person {}

    struct Employee {
        person: Person,
    }

    impl BusinessObject for Employee {
        fn supertype(&self) -> Option<&DynObject> {
            Some(&self.person)
        }
    }

    #[test]
    fn test_apply_runs_predicate() {
        let rule = Rule::new("ageValid", "age is positive", |p: &Person| p.age > 0);
        assert!(rule.apply(&Person { age: 3 }).unwrap());
        assert!(!rule.apply(&Person { age: -1 }).unwrap());
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Rule::new("same", "first", |_: &Person| true);
        let b = Rule::new("same", "second", |_: &Person| false);
        let c = Rule::new("other", "first", |_: &Person| true);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fallible_rule_surfaces_error() {
        let rule = Rule::fallible("ageValid", "age parses", |_: &Person| {
            "x".parse::<i32>().map(|_| true)
        });
        assert!(rule.apply(&Person { age: 1 }).is_err());
    }

    #[test]
    fn test_erased_rule_wraps_failure_as_invocation() {
        let rule = Rule::fallible("boom", "always fails", |_: &Person| {
            Err::<bool, _>("kaput")
        });
        let error = ErasedRule::evaluate(&rule, &Person { age: 1 }).unwrap_err();
        assert!(error.is_invocation());
        assert_eq!(error.cause().map(ToString::to_string).as_deref(), Some("kaput"));
    }

    #[test]
    fn test_erased_rule_rejects_foreign_type() {
        let rule = Rule::new("ageValid", "age is positive", |p: &Person| p.age > 0);
        let employee = Employee {
            person: Person { age: 1 },
        };
        let error = ErasedRule::evaluate(&rule, &employee).unwrap_err();
        assert!(matches!(error, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_lifted_rule_reads_parent_view() {
        let rule = Rule::new("ageValid", "age is positive", |p: &Person| p.age > 0);
        let lifted: Rule<Employee> = rule.lift();
        assert_eq!(lifted.id(), "ageValid");
        assert!(lifted.apply(&Employee { person: Person { age: 40 } }).unwrap());
        assert!(!lifted.apply(&Employee { person: Person { age: 0 } }).unwrap());
    }
}
