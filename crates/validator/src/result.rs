//! Validation reports.
//!
//! A [`ResultNode`] mirrors the validated object graph: one node per visited
//! object, holding that object's [`RuleResult`]s and the nodes of its members.
//! Any rule is addressable by a path such as `Person.phones[1] [countryCodeValid]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

// ============================================================================
// RULE RESULT
// ============================================================================

/// Outcome of one rule on one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleResult {
    id: String,
    description: String,
    valid: bool,
}

impl RuleResult {
    /// Creates a result.
    pub fn new(id: impl Into<String>, description: impl Into<String>, valid: bool) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            valid,
        }
    }

    /// Rule id, possibly empty.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the predicate held.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// `[id] description => valid`, with the id segment omitted when empty.
impl fmt::Display for RuleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.id.is_empty() {
            write!(f, "[{}] ", self.id)?;
        }
        let outcome = if self.valid { "valid" } else { "invalid" };
        write!(f, "{} => {outcome}", self.description)
    }
}

// ============================================================================
// RESULT NODE
// ============================================================================

/// Report for one validated object and, recursively, its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultNode {
    name: String,
    #[serde(default)]
    rules: Vec<RuleResult>,
    #[serde(default)]
    members: Vec<ResultNode>,
}

impl ResultNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            rules: Vec::new(),
            members: Vec::new(),
        }
    }

    pub(crate) fn push_rule(&mut self, result: RuleResult) {
        self.rules.push(result);
    }

    pub(crate) fn push_member(&mut self, node: Self) {
        self.members.push(node);
    }

    /// Report label: the validator name at the root, `member` or
    /// `member[index]` below it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This object's own rule outcomes, in declaration order.
    pub fn rule_results(&self) -> &[RuleResult] {
        &self.rules
    }

    /// Reports of member objects, in declaration order.
    pub fn member_results(&self) -> &[ResultNode] {
        &self.members
    }

    /// `true` iff every rule here and in every descendant held.
    pub fn is_valid(&self) -> bool {
        self.rules.iter().all(RuleResult::is_valid) && self.members.iter().all(Self::is_valid)
    }

    /// Failing rules of this node followed by those of its descendants.
    pub fn invalid_rules(&self) -> Vec<&RuleResult> {
        let mut invalid = Vec::new();
        self.collect_invalid(&mut invalid);
        invalid
    }

    fn collect_invalid<'a>(&'a self, out: &mut Vec<&'a RuleResult>) {
        out.extend(self.rules.iter().filter(|rule| !rule.valid));
        for member in &self.members {
            member.collect_invalid(out);
        }
    }

    /// Total rule evaluations in this node and all descendants.
    pub fn test_count(&self) -> usize {
        self.rules.len() + self.members.iter().map(Self::test_count).sum::<usize>()
    }

    /// Looks up a rule by path.
    ///
    /// The path is the root name, then dot-separated member labels, then the
    /// bracketed rule id after a space:
    ///
    /// ```text
    /// Person [ageValid]
    /// Person.phones[1] [countryCodeValid]
    /// ```
    ///
    /// Returns `Ok(None)` when the path reaches a node but no rule there has
    /// the id. Anonymous rules are never found: `Person []` is always `None`.
    pub fn rule_result(&self, path: &str) -> Result<Option<&RuleResult>, PathError> {
        let mut tokens = path
            .split(|c: char| c == '.' || c.is_whitespace())
            .filter(|token| !token.is_empty());

        let root = tokens.next().ok_or(PathError::Empty)?;
        if root != self.name {
            return Err(PathError::RootMismatch {
                expected: self.name.clone(),
                found: root.to_owned(),
            });
        }

        let mut node = self;
        loop {
            let token = tokens.next().ok_or_else(|| PathError::MissingRule {
                path: path.to_owned(),
            })?;

            if let Some(id) = token.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                if tokens.next().is_some() {
                    return Err(PathError::TrailingSegments {
                        path: path.to_owned(),
                    });
                }
                if id.is_empty() {
                    return Ok(None);
                }
                return Ok(node.rules.iter().find(|rule| rule.id == id));
            }

            node = node
                .members
                .iter()
                .find(|member| member.name == token)
                .ok_or_else(|| PathError::UnknownMember {
                    member: token.to_owned(),
                })?;
        }
    }

    /// Returns the error built by `factory` from the text report when any
    /// rule failed.
    ///
    /// ```rust,ignore
    /// report.assert_valid_or_else(|report| anyhow::anyhow!("invalid order:\n{report}"))?;
    /// ```
    pub fn assert_valid_or_else<E, F>(&self, factory: F) -> Result<(), E>
    where
        F: FnOnce(String) -> E,
    {
        if self.is_valid() {
            Ok(())
        } else {
            Err(factory(self.to_string()))
        }
    }

    fn write_report(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{prefix}{} {rule}", self.name)?;
        }
        if !self.members.is_empty() {
            let prefix = format!("{prefix}{}.", self.name);
            for member in &self.members {
                member.write_report(f, &prefix)?;
            }
        }
        Ok(())
    }
}

/// One line per rule, members prefixed with their dotted ancestry:
///
/// ```text
/// Person [ageValid] age is positive => valid
/// Person.phones[1] [countryCodeValid] country code starts with + => invalid
/// ```
impl fmt::Display for ResultNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_report(f, "")
    }
}

// ============================================================================
// TESTS
// ============================================================================
