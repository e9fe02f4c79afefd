//! Builder graph to validator graph compilation.
//!
//! Builders may reference themselves or each other in cycles. Compilation is
//! a worklist over builder identities rather than a recursion:
//!
//! 1. **Discover.** Starting from the root, snapshot each builder once into a
//!    [`Blueprint`] and give it the next [`NodeId`]. Member candidates are
//!    interned through a memo keyed by builder identity, so a back-edge to a
//!    builder already seen resolves to its existing id.
//! 2. **Assemble.** Once every node id is known, turn each blueprint into a
//!    [`Node`] with fully wired dispatch tables.
//!
//! Any error in either phase fails the whole compilation.

use std::any::TypeId;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::builder::Candidates;
use crate::error::{BuildError, NameKind};
use crate::member::{DispatchTable, ErasedAccessor, MemberDescriptor};
use crate::rule::ErasedRule;
use crate::validator::{Node, NodeId, ValidatorGraph};

/// A builder with its target type erased.
pub(crate) trait ErasedBuilder {
    /// No rules and no members.
    fn is_empty(&self) -> bool;

    /// Snapshot of the builder's current declarations.
    fn blueprint(&self) -> Blueprint;
}

pub(crate) struct Blueprint {
    pub(crate) name: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) rules: Vec<Box<dyn ErasedRule>>,
    pub(crate) members: Vec<MemberBlueprint>,
}

pub(crate) struct MemberBlueprint {
    pub(crate) name: String,
    pub(crate) accessor: Arc<dyn ErasedAccessor>,
    pub(crate) candidates: Candidates,
    /// Nodes of the non-empty candidates, filled in during discovery.
    pub(crate) targets: Vec<NodeId>,
}

/// Identity of a builder: the address of its shared state.
fn identity(builder: &Rc<dyn ErasedBuilder>) -> usize {
    Rc::as_ptr(builder).cast::<()>().addr()
}

#[derive(Default)]
pub(crate) struct GraphCompiler {
    memo: HashMap<usize, NodeId>,
    blueprints: Vec<Blueprint>,
}

impl GraphCompiler {
    /// Compiles `root` and everything reachable from it. `root` becomes node zero.
    pub(crate) fn compile(root: &Rc<dyn ErasedBuilder>) -> Result<ValidatorGraph, BuildError> {
        let mut compiler = Self::default();
        compiler.intern(root);
        compiler.discover()?;
        compiler.assemble()
    }

    /// Returns the node id of `builder`, snapshotting it on first sight.
    fn intern(&mut self, builder: &Rc<dyn ErasedBuilder>) -> NodeId {
        let next = NodeId(self.blueprints.len());
        let id = *self.memo.entry(identity(builder)).or_insert(next);
        if id == next {
            self.blueprints.push(builder.blueprint());
        }
        id
    }

    fn discover(&mut self) -> Result<(), BuildError> {
        let mut cursor = 0;
        while cursor < self.blueprints.len() {
            let pending: Vec<Candidates> = self.blueprints[cursor]
                .members
                .iter()
                .map(|member| member.candidates.clone())
                .collect();

            for (slot, candidates) in pending.iter().enumerate() {
                let live: Vec<_> = candidates.iter().filter(|builder| !builder.is_empty()).collect();
                if live.is_empty() {
                    let owner = &self.blueprints[cursor];
                    return Err(BuildError::EmptyCandidates {
                        validator: owner.name.clone(),
                        member: owner.members[slot].name.clone(),
                    });
                }
                let targets = live.into_iter().map(|builder| self.intern(builder)).collect();
                self.blueprints[cursor].members[slot].targets = targets;
            }
            cursor += 1;
        }
        Ok(())
    }

    fn assemble(self) -> Result<ValidatorGraph, BuildError> {
        let types: Vec<(TypeId, &'static str)> = self
            .blueprints
            .iter()
            .map(|blueprint| (blueprint.type_id, blueprint.type_name))
            .collect();

        let nodes = self
            .blueprints
            .into_iter()
            .map(|blueprint| assemble_node(blueprint, &types))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(root = %nodes[0].name, nodes = nodes.len(), "compiled validator graph");
        Ok(ValidatorGraph::new(nodes))
    }
}

fn assemble_node(blueprint: Blueprint, types: &[(TypeId, &'static str)]) -> Result<Node, BuildError> {
    let Blueprint {
        name,
        type_name,
        rules,
        members,
        ..
    } = blueprint;

    if rules.is_empty() && members.is_empty() {
        return Err(BuildError::EmptyValidator { validator: name });
    }
    check_name(&name, NameKind::Validator, &name)?;
    for rule in rules.iter().filter(|rule| !rule.id().is_empty()) {
        check_name(&name, NameKind::Rule, rule.id())?;
    }

    let mut descriptors = Vec::with_capacity(members.len());
    for member in members {
        check_name(&name, NameKind::Member, &member.name)?;

        let mut dispatch = DispatchTable::default();
        for target in member.targets {
            let (type_id, target_type) = types[target.0];
            if dispatch.insert(type_id, target_type, target) {
                warn!(
                    validator = %name,
                    member = %member.name,
                    type_name = target_type,
                    "later candidate replaces an earlier one for the same type"
                );
            }
        }
        descriptors.push(MemberDescriptor::new(member.name, member.accessor, dispatch));
    }

    Ok(Node {
        name,
        type_name,
        rules,
        members: descriptors,
    })
}

/// Names end up in report paths, so they may not contain path syntax.
fn check_name(validator: &str, kind: NameKind, value: &str) -> Result<(), BuildError> {
    let reserved = |c: char| c == '.' || c == '[' || c == ']' || c.is_whitespace();
    if value.is_empty() || value.contains(reserved) {
        return Err(BuildError::InvalidName {
            validator: validator.to_owned(),
            kind,
            value: value.to_owned(),
        });
    }
    Ok(())
}
