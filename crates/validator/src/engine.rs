//! Recursive descent over an object graph.

use std::collections::HashSet;

use tracing::trace;

use crate::error::ValidationError;
use crate::member::MemberDescriptor;
use crate::object::{DynObject, Handle, Identity, MemberValue};
use crate::options::ValidationOptions;
use crate::result::{ResultNode, RuleResult};
use crate::validator::{NodeId, ValidatorGraph};

/// State for one top-level validation call.
///
/// `visited` is keyed by object identity, never by value. It only records
/// which objects were already scheduled. Shared handles handed out by
/// accessors are kept in `retained` so a freed address cannot be reused by a
/// different object while it is still in `visited`.
pub(crate) struct Traversal<'g> {
    graph: &'g ValidatorGraph,
    options: &'g ValidationOptions,
    visited: HashSet<Identity>,
    retained: Vec<Handle<'static>>,
    trail: Vec<String>,
}

impl<'g> Traversal<'g> {
    pub(crate) fn new(graph: &'g ValidatorGraph, options: &'g ValidationOptions) -> Self {
        Self {
            graph,
            options,
            visited: HashSet::new(),
            retained: Vec::new(),
            trail: Vec::new(),
        }
    }

    /// Validates `object` with node `root`, labelling the report `name`.
    pub(crate) fn run(
        mut self,
        root: NodeId,
        object: &DynObject,
        name: String,
    ) -> Result<ResultNode, ValidationError> {
        self.visited.insert(Identity::of(object));
        self.visit(root, object, name, 0)
    }

    fn visit(
        &mut self,
        id: NodeId,
        object: &DynObject,
        name: String,
        depth: usize,
    ) -> Result<ResultNode, ValidationError> {
        if let Some(limit) = self.options.exceeded_at(depth) {
            let mut path = self.trail.join(".");
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&name);
            return Err(ValidationError::DepthExceeded { limit, path });
        }

        let graph = self.graph;
        let node = graph.node(id);
        self.trail.push(name.clone());

        let mut report = ResultNode::new(name);
        for rule in &node.rules {
            let valid = rule.evaluate(object)?;
            report.push_rule(RuleResult::new(rule.id(), rule.description(), valid));
        }

        for member in &node.members {
            match member.extract(object)? {
                MemberValue::Absent => {}
                MemberValue::Single(handle) => {
                    let label = member.name().to_owned();
                    if let Some(child) = self.descend(member, &handle, label, depth)? {
                        report.push_member(child);
                    }
                }
                MemberValue::Many(items) => {
                    let mut index = 0;
                    for handle in items.iter().flatten() {
                        let label = format!("{}[{index}]", member.name());
                        if let Some(child) = self.descend(member, handle, label, depth)? {
                            report.push_member(child);
                            index += 1;
                        }
                    }
                }
            }
        }

        self.trail.pop();
        Ok(report)
    }

    /// Visits one member object unless it was seen earlier in this call.
    fn descend(
        &mut self,
        member: &MemberDescriptor,
        handle: &Handle<'_>,
        label: String,
        depth: usize,
    ) -> Result<Option<ResultNode>, ValidationError> {
        let object = handle.get();
        if !self.visited.insert(Identity::of(object)) {
            trace!(
                member = member.name(),
                type_name = object.type_name(),
                "already visited, pruned"
            );
            return Ok(None);
        }
        if let Some(owned) = handle.detach() {
            self.retained.push(owned);
        }

        let (node, view) = member.resolve(object)?;
        trace!(
            member = member.name(),
            type_name = object.type_name(),
            validator = %self.graph.node(node).name,
            "dispatched"
        );
        self.visit(node, view, label, depth + 1).map(Some)
    }
}
