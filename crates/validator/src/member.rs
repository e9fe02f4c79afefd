//! Member accessors and polymorphic dispatch.
//!
//! A member pairs an accessor (object to [`MemberValue`]) with a dispatch
//! table mapping runtime types to compiled validators. Resolution walks the
//! value's ancestor chain and takes the first type with an entry, so a
//! `Rectangle` finds the `Rectangle` validator before the `Square` one.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{BoxError, InvocationTarget, ValidationError};
use crate::object::{BusinessObject, DynObject, MemberValue, lineage, short_type_name, view_as};
use crate::rule::missing_view;
use crate::validator::NodeId;

pub(crate) type AccessorFn<T> =
    dyn for<'o> Fn(&'o T) -> Result<MemberValue<'o>, BoxError> + Send + Sync;

/// Boxes a fallible accessor, pinning down its higher-ranked signature.
pub(crate) fn erase_accessor<T, F>(accessor: F) -> Arc<AccessorFn<T>>
where
    F: for<'o> Fn(&'o T) -> Result<MemberValue<'o>, BoxError> + Send + Sync + 'static,
{
    Arc::new(accessor)
}

// ============================================================================
// ACCESSORS
// ============================================================================

/// Typed accessor for one member of `T`.
pub(crate) struct Accessor<T> {
    member: String,
    extract: Arc<AccessorFn<T>>,
}

impl<T: BusinessObject> Accessor<T> {
    pub(crate) fn new(member: String, extract: Arc<AccessorFn<T>>) -> Self {
        Self { member, extract }
    }

    /// Re-targets this accessor at a subtype whose ancestor chain contains `T`.
    pub(crate) fn lift<S: BusinessObject>(&self) -> Accessor<S> {
        let extract = Arc::clone(&self.extract);
        Accessor {
            member: self.member.clone(),
            extract: erase_accessor(move |object: &S| {
                let parent = view_as::<T>(object).ok_or_else(missing_view::<S, T>)?;
                extract(parent)
            }),
        }
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member.clone(),
            extract: Arc::clone(&self.extract),
        }
    }
}

/// Accessor with its object type erased.
pub(crate) trait ErasedAccessor: Send + Sync {
    fn extract<'o>(&self, object: &'o DynObject) -> Result<MemberValue<'o>, ValidationError>;
}

impl<T: BusinessObject> ErasedAccessor for Accessor<T> {
    fn extract<'o>(&self, object: &'o DynObject) -> Result<MemberValue<'o>, ValidationError> {
        let any: &'o dyn Any = object;
        let typed = any
            .downcast_ref::<T>()
            .ok_or_else(|| ValidationError::TypeMismatch {
                expected: short_type_name::<T>(),
                found: object.type_name(),
            })?;
        (self.extract)(typed).map_err(|source| ValidationError::Invocation {
            target: InvocationTarget::Member(self.member.clone()),
            type_name: object.type_name(),
            source,
        })
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Candidate {
    type_id: TypeId,
    type_name: &'static str,
    node: NodeId,
}

/// Runtime type to compiled node, in declaration order.
///
/// Most members have one or two candidates, so entries live inline.
#[derive(Debug, Clone, Default)]
pub(crate) struct DispatchTable {
    entries: SmallVec<[Candidate; 2]>,
}

impl DispatchTable {
    /// Registers `node` for `type_id`. Returns `true` if an earlier entry for
    /// the same type was replaced.
    pub(crate) fn insert(&mut self, type_id: TypeId, type_name: &'static str, node: NodeId) -> bool {
        let candidate = Candidate {
            type_id,
            type_name,
            node,
        };
        match self.entries.iter_mut().find(|entry| entry.type_id == type_id) {
            Some(entry) => {
                *entry = candidate;
                true
            }
            None => {
                self.entries.push(candidate);
                false
            }
        }
    }

    fn lookup(&self, type_id: TypeId) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|entry| entry.type_id == type_id)
            .map(|entry| entry.node)
    }

    /// First ancestor view of `object` with a registered node.
    pub(crate) fn resolve<'o>(&self, object: &'o DynObject) -> Option<(NodeId, &'o DynObject)> {
        lineage(object).find_map(|view| {
            let any: &dyn Any = view;
            self.lookup(any.type_id()).map(|node| (node, view))
        })
    }

    pub(crate) fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.type_name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// MEMBER DESCRIPTOR
// ============================================================================

/// A compiled member: name, accessor, and candidate validators by type.
pub struct MemberDescriptor {
    name: String,
    accessor: Arc<dyn ErasedAccessor>,
    dispatch: DispatchTable,
}

impl MemberDescriptor {
    pub(crate) fn new(name: String, accessor: Arc<dyn ErasedAccessor>, dispatch: DispatchTable) -> Self {
        Self {
            name,
            accessor,
            dispatch,
        }
    }

    /// Member name as it appears in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short names of the types this member has validators for.
    pub fn candidate_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dispatch.type_names()
    }

    pub(crate) fn extract<'o>(&self, object: &'o DynObject) -> Result<MemberValue<'o>, ValidationError> {
        self.accessor.extract(object)
    }

    /// Picks the node for `object` by walking its ancestor chain.
    pub(crate) fn resolve<'o>(&self, object: &'o DynObject) -> Result<(NodeId, &'o DynObject), ValidationError> {
        self.dispatch
            .resolve(object)
            .ok_or_else(|| ValidationError::Dispatch {
                member: self.name.clone(),
                type_name: object.type_name(),
            })
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("candidates", &self.dispatch.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
