//! Declarative validators: types that describe their own rules.
//!
//! Implementing [`Describe`] keeps a type's rules next to the type. A
//! [`Catalog`] hands out one builder per type, so types that mention each
//! other (or themselves) as members end up sharing builders and compile into
//! a cyclic graph just like hand-wired builders.
//!
//! ```rust,ignore
//! impl Describe for Person {
//!     fn describe(builder: &Builder<Self>, catalog: &Catalog) {
//!         builder
//!             .add_rule("ageValid", "age is positive", |p| p.age > 0)
//!             .add_member("phones", |p| MemberValue::many(&p.phones), &catalog.builder::<Phone>());
//!     }
//! }
//!
//! let validator = validator_for::<Person>()?;
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use crate::builder::Builder;
use crate::error::BuildError;
use crate::object::BusinessObject;
use crate::validator::Validator;

/// A business object that declares its own validation.
pub trait Describe: BusinessObject + Sized {
    /// Report label. Defaults to the short type name.
    const NAME: Option<&'static str> = None;

    /// Adds this type's rules and members to `builder`.
    ///
    /// Use `catalog` to obtain builders for member types, and
    /// [`Builder::inherit`] with a parent type's catalog builder to pull in
    /// inherited declarations.
    fn describe(builder: &Builder<Self>, catalog: &Catalog);
}

/// One builder per described type.
///
/// A builder is registered before its type's [`Describe::describe`] runs, so
/// recursive descriptions terminate. A consequence: inheriting from a type
/// whose description is still in progress copies only what it has declared so
/// far.
#[derive(Default)]
pub struct Catalog {
    builders: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builder for `T`, described on first request.
    pub fn builder<T: Describe>(&self) -> Builder<T> {
        if let Some(existing) = self.lookup::<T>() {
            return existing;
        }

        let builder = Builder::<T>::new();
        if let Some(name) = T::NAME {
            builder.set_name(name);
        }
        self.builders
            .borrow_mut()
            .insert(TypeId::of::<T>(), Box::new(builder.clone()));
        T::describe(&builder, self);
        builder
    }

    /// Builds the validator for `T`.
    pub fn validator<T: Describe>(&self) -> Result<Validator<T>, BuildError> {
        self.builder::<T>().build()
    }

    /// Number of types described so far.
    pub fn len(&self) -> usize {
        self.builders.borrow().len()
    }

    /// `true` before any type was described.
    pub fn is_empty(&self) -> bool {
        self.builders.borrow().is_empty()
    }

    fn lookup<T: Describe>(&self) -> Option<Builder<T>> {
        self.builders
            .borrow()
            .get(&TypeId::of::<T>())
            .and_then(|builder| builder.downcast_ref::<Builder<T>>())
            .cloned()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("types", &self.len()).finish()
    }
}

/// Builds the validator for `T` from a fresh [`Catalog`].
pub fn validator_for<T: Describe>() -> Result<Validator<T>, BuildError> {
    Catalog::new().validator::<T>()
}
