//! Predicates that come up in almost every rule set.
//!
//! ```rust,ignore
//! use rulegraph_validator::basic;
//!
//! builder
//!     .add_rule("nameSet", "name is set", |p: &Person| basic::is_defined(p.name.as_deref()))
//!     .add_rule("phonesSet", "at least one phone", |p: &Person| basic::has_elements(&p.phones));
//! ```

use std::fmt;

use regex::Regex;

/// `true` when `value` is present and not blank.
pub fn is_defined(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

/// `true` when `value` is absent, or present and not blank.
pub fn is_defined_if_present(value: Option<&str>) -> bool {
    value.is_none_or(|value| !value.trim().is_empty())
}

/// `true` when `items` has at least one element.
pub fn has_elements<T>(items: &[T]) -> bool {
    !items.is_empty()
}

/// `true` when no entry of `items` is `None`. Empty slices qualify.
pub fn has_defined_elements<T>(items: &[Option<T>]) -> bool {
    items.iter().all(Option::is_some)
}

/// `true` when `items` is non-empty and has no `None` entry.
pub fn has_one_or_more_defined_elements<T>(items: &[Option<T>]) -> bool {
    has_elements(items) && has_defined_elements(items)
}

/// `true` when the whole of `subject` matches `pattern`.
///
/// Compiles `pattern` on every call; rules evaluated often should hold a
/// [`FullMatch`] instead.
pub fn matches(pattern: &str, subject: Option<&str>) -> Result<bool, regex::Error> {
    Ok(FullMatch::new(pattern)?.is_match(subject))
}

/// A precompiled pattern that must match the whole subject.
#[derive(Clone)]
pub struct FullMatch {
    pattern: String,
    regex: Regex,
}

impl FullMatch {
    /// Compiles `pattern`, anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: pattern.to_owned(),
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    /// `false` for an absent subject.
    pub fn is_match(&self, subject: Option<&str>) -> bool {
        subject.is_some_and(|subject| self.regex.is_match(subject))
    }

    /// The pattern as given, without anchors.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for FullMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FullMatch").field(&self.pattern).finish()
    }
}
