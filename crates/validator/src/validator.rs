//! Compiled, immutable validators.
//!
//! [`Builder::build`](crate::Builder::build) produces a [`ValidatorGraph`]: an
//! arena of nodes, one per distinct builder reachable from the root, where
//! members point at other nodes by [`NodeId`]. Builder cycles become
//! back-edges between ids. A [`Validator<T>`] is a typed entry point into that
//! arena and can be cloned and shared across threads freely.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::engine::Traversal;
use crate::error::ValidationError;
use crate::member::MemberDescriptor;
use crate::object::BusinessObject;
use crate::options::ValidationOptions;
use crate::result::ResultNode;
use crate::rule::{ErasedRule, RuleInfo};

/// Index of a node in a [`ValidatorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

/// One compiled validator: rules and members for a single type.
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) rules: Vec<Box<dyn ErasedRule>>,
    pub(crate) members: Vec<MemberDescriptor>,
}

/// All nodes compiled by one `build()` call. The root is always node zero.
pub(crate) struct ValidatorGraph {
    nodes: Vec<Node>,
}

impl ValidatorGraph {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Immutable set of rules and members for `T`.
///
/// Every call to [`validate`](Self::validate) owns its own visited set and
/// report, so one validator can serve many threads at once.
pub struct Validator<T> {
    graph: Arc<ValidatorGraph>,
    root: NodeId,
    options: ValidationOptions,
    _marker: PhantomData<fn(&T)>,
}

impl<T: BusinessObject> Validator<T> {
    pub(crate) fn from_graph(graph: ValidatorGraph) -> Self {
        Self {
            graph: Arc::new(graph),
            root: NodeId(0),
            options: ValidationOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Applies runtime options to every subsequent call.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates `object` and everything reachable from it.
    ///
    /// Each distinct object is checked once; repeated encounters through
    /// cycles or shared references are pruned from the report.
    ///
    /// # Errors
    ///
    /// Aborts on the first dispatch failure, user error, or depth overflow.
    /// No partial report is returned.
    pub fn validate(&self, object: &T) -> Result<ResultNode, ValidationError> {
        self.run(object, self.name().to_owned())
    }

    /// Validates each object independently, naming reports `Name[index]`.
    ///
    /// Objects do not share a visited set: an object reachable from two roots
    /// is checked under both.
    pub fn validate_all<'o, I>(&self, objects: I) -> Result<Vec<ResultNode>, ValidationError>
    where
        I: IntoIterator<Item = &'o T>,
    {
        objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| self.run(object, format!("{}[{index}]", self.name())))
            .collect()
    }

    fn run(&self, object: &T, name: String) -> Result<ResultNode, ValidationError> {
        let _span = debug_span!("validate", validator = %name).entered();
        let report = Traversal::new(&self.graph, &self.options).run(self.root, object, name)?;
        debug!(
            tests = report.test_count(),
            valid = report.is_valid(),
            "validation finished"
        );
        Ok(report)
    }
}

impl<T> Validator<T> {
    /// Report label of the root node.
    pub fn name(&self) -> &str {
        &self.graph.node(self.root).name
    }

    /// Root rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = RuleInfo<'_>> {
        self.graph.node(self.root).rules.iter().map(|rule| RuleInfo {
            id: rule.id(),
            description: rule.description(),
        })
    }

    /// Root members in declaration order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.graph.node(self.root).members
    }

    /// Number of distinct validators reachable from this one, itself included.
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    /// Options applied to each call.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            root: self.root,
            options: self.options.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.graph.node(self.root);
        f.debug_struct("Validator")
            .field("name", &root.name)
            .field("type", &root.type_name)
            .field("rules", &root.rules.len())
            .field("members", &root.members)
            .field("nodes", &self.graph.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl BusinessObject for Probe {}

    fn assert_send_sync<V: Send + Sync>() {}

    #[test]
    fn test_validator_is_send_and_sync() {
        assert_send_sync::<Validator<Probe>>();
    }

    #[test]
    fn test_clone_shares_graph() {
        let validator = crate::Builder::<Probe>::new()
            .add_rule("alwaysTrue", "always holds", |_| true)
            .build()
            .unwrap();
        let copy = validator.clone().with_options(ValidationOptions::new().with_max_depth(1));

        assert!(Arc::ptr_eq(&validator.graph, &copy.graph));
        assert_eq!(copy.options().max_depth, Some(1));
        assert_eq!(validator.options().max_depth, None);
        assert_eq!(copy.name(), "Probe");
    }

    #[test]
    fn test_introspection() {
        let validator = crate::Builder::<Probe>::new()
            .set_name("Thing")
            .add_rule("a", "first", |_| true)
            .add_rule("", "second", |_| false)
            .build()
            .unwrap();

        let rules: Vec<_> = validator.rules().map(|rule| (rule.id, rule.description)).collect();
        assert_eq!(rules, [("a", "first"), ("", "second")]);
        assert!(validator.members().is_empty());
        assert_eq!(validator.node_count(), 1);
        assert!(format!("{validator:?}").contains("Thing"));
    }
}
