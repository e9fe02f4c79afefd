//! Business objects, their ancestor views, and the values accessors return.
//!
//! There is no runtime class hierarchy to walk, so a type states its parent
//! explicitly: [`BusinessObject::supertype`] returns the embedded parent value
//! (or `None`). The chain `self, supertype, supertype of supertype, ...` is
//! what polymorphic dispatch searches.
//!
//! ```rust,ignore
//! struct Square { side: u32 }
//! struct Rectangle { square: Square, height: u32 }
//!
//! impl BusinessObject for Square {}
//! impl BusinessObject for Rectangle {
//!     fn supertype(&self) -> Option<&DynObject> {
//!         Some(&self.square)
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::rc::Rc;
use std::sync::Arc;

/// A value a [`Validator`](crate::Validator) can check.
pub trait BusinessObject: Any {
    /// The parent-type view of this object, if any.
    fn supertype(&self) -> Option<&DynObject> {
        None
    }

    /// Type label used in errors and logs.
    fn type_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Type-erased business object.
pub type DynObject = dyn BusinessObject;

/// Iterates an object followed by each of its ancestor views.
pub fn lineage(object: &DynObject) -> impl Iterator<Item = &DynObject> {
    std::iter::successors(Some(object), |current| current.supertype())
}

/// Finds the `S` view of `object` along its ancestor chain.
///
/// Returns `object` itself when it already is an `S`.
pub fn view_as<S: BusinessObject>(object: &DynObject) -> Option<&S> {
    lineage(object).find_map(|view| {
        let any: &dyn Any = view;
        any.downcast_ref::<S>()
    })
}

/// Strips the module path and generic arguments from a type name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Identity of one object: where its outermost ancestor view lives and what
/// type that view has.
///
/// Every view along one lineage ends at the same ancestor, so an object
/// reached once whole and once through an embedded parent view has one
/// identity. The type is part of the key because an unrelated value may be
/// embedded at the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Identity {
    addr: usize,
    type_id: TypeId,
}

impl Identity {
    pub(crate) fn of(object: &DynObject) -> Self {
        let base = lineage(object).last().unwrap_or(object);
        let any: &dyn Any = base;
        Self {
            addr: std::ptr::from_ref(any).cast::<()>().addr(),
            type_id: any.type_id(),
        }
    }
}

// ============================================================================
// HANDLES
// ============================================================================

/// A reference to a member object, borrowed or shared.
///
/// Shared handles let accessors return `Rc`/`Arc` links (the usual way to
/// express cyclic graphs) without borrowing through a `RefCell`.
#[derive(Clone)]
pub enum Handle<'a> {
    /// Plain borrow of a field.
    Borrowed(&'a DynObject),
    /// Single-threaded shared ownership.
    Shared(Rc<DynObject>),
    /// Thread-safe shared ownership.
    Synced(Arc<DynObject>),
}

impl Handle<'_> {
    /// The object behind the handle.
    pub fn get(&self) -> &DynObject {
        match self {
            Self::Borrowed(object) => *object,
            Self::Shared(object) => object.as_ref(),
            Self::Synced(object) => object.as_ref(),
        }
    }

    /// An owned copy that keeps the object alive, or `None` for borrows.
    pub(crate) fn detach(&self) -> Option<Handle<'static>> {
        match self {
            Self::Borrowed(_) => None,
            Self::Shared(object) => Some(Handle::Shared(Rc::clone(object))),
            Self::Synced(object) => Some(Handle::Synced(Arc::clone(object))),
        }
    }
}

impl std::fmt::Debug for Handle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Borrowed(_) => "Borrowed",
            Self::Shared(_) => "Shared",
            Self::Synced(_) => "Synced",
        };
        f.debug_tuple(kind).field(&self.get().type_name()).finish()
    }
}

impl<'a, T: BusinessObject> From<&'a T> for Handle<'a> {
    fn from(object: &'a T) -> Self {
        Self::Borrowed(object)
    }
}

impl<'a> From<&'a DynObject> for Handle<'a> {
    fn from(object: &'a DynObject) -> Self {
        Self::Borrowed(object)
    }
}

impl<T: BusinessObject> From<Rc<T>> for Handle<'_> {
    fn from(object: Rc<T>) -> Self {
        Self::Shared(object)
    }
}

impl From<Rc<DynObject>> for Handle<'_> {
    fn from(object: Rc<DynObject>) -> Self {
        Self::Shared(object)
    }
}

impl<T: BusinessObject> From<Arc<T>> for Handle<'_> {
    fn from(object: Arc<T>) -> Self {
        Self::Synced(object)
    }
}

impl From<Arc<DynObject>> for Handle<'_> {
    fn from(object: Arc<DynObject>) -> Self {
        Self::Synced(object)
    }
}

// ============================================================================
// MEMBER VALUES
// ============================================================================

/// What a member accessor extracted.
///
/// Collections and arrays are both `Many`; `None` entries are skipped during
/// validation and do not consume a report index.
#[derive(Debug, Clone, Default)]
pub enum MemberValue<'a> {
    /// The member is null.
    #[default]
    Absent,
    /// A single object.
    Single(Handle<'a>),
    /// An iterable of possibly-null objects.
    Many(Vec<Option<Handle<'a>>>),
}

impl<'a> MemberValue<'a> {
    /// The member is null.
    pub fn absent() -> Self {
        Self::Absent
    }

    /// A single object.
    pub fn single(object: impl Into<Handle<'a>>) -> Self {
        Self::Single(object.into())
    }

    /// A single object or null.
    pub fn optional<H: Into<Handle<'a>>>(object: Option<H>) -> Self {
        object.map_or(Self::Absent, |object| Self::Single(object.into()))
    }

    /// An iterable of objects.
    pub fn many<I>(objects: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Handle<'a>>,
    {
        Self::Many(objects.into_iter().map(|object| Some(object.into())).collect())
    }

    /// An iterable whose entries may be null.
    pub fn many_optional<I, H>(objects: I) -> Self
    where
        I: IntoIterator<Item = Option<H>>,
        H: Into<Handle<'a>>,
    {
        Self::Many(
            objects
                .into_iter()
                .map(|object| object.map(Into::into))
                .collect(),
        )
    }

    /// Returns `true` for a null member.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

// ============================================================================
// TESTS
// ============================================================================
