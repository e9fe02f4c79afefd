//! Mutable pre-images of validators.
//!
//! A [`Builder<T>`] is a cheap, clonable handle to shared declarations, so a
//! builder can be listed among its own member candidates or sit in a cycle
//! with other builders:
//!
//! ```rust,ignore
//! let node = Builder::<Node>::new();
//! node.add_rule("valueSet", "value is set", |n| n.value.is_some())
//!     .add_member("next", |n| MemberValue::optional(n.next.as_deref()), &node);
//! let validator = node.build()?;
//! ```
//!
//! Builders are single-threaded. [`build`](Builder::build) snapshots the
//! current declarations; later changes to the builder do not affect validators
//! already built.
//!
//! A builder that lists itself as a candidate holds a reference cycle and is
//! only freed with the process. Builders are meant to be configured once at
//! startup.

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use smallvec::{SmallVec, smallvec};
use tracing::warn;

use crate::compiler::{Blueprint, ErasedBuilder, GraphCompiler, MemberBlueprint};
use crate::error::{BoxError, BuildError};
use crate::member::{Accessor, erase_accessor};
use crate::object::{BusinessObject, MemberValue, short_type_name};
use crate::rule::{ErasedRule, Rule};
use crate::validator::Validator;

// ============================================================================
// DECLARATIONS
// ============================================================================

struct Declaration<T> {
    name: String,
    rules: Vec<Rule<T>>,
    members: IndexMap<String, MemberDeclaration<T>>,
}

struct MemberDeclaration<T> {
    accessor: Accessor<T>,
    candidates: Candidates,
}

impl<T: BusinessObject> ErasedBuilder for RefCell<Declaration<T>> {
    fn is_empty(&self) -> bool {
        let declaration = self.borrow();
        declaration.rules.is_empty() && declaration.members.is_empty()
    }

    fn blueprint(&self) -> Blueprint {
        let declaration = self.borrow();
        Blueprint {
            name: declaration.name.clone(),
            type_id: TypeId::of::<T>(),
            type_name: short_type_name::<T>(),
            rules: declaration
                .rules
                .iter()
                .map(|rule| Box::new(rule.clone()) as Box<dyn ErasedRule>)
                .collect(),
            members: declaration
                .members
                .iter()
                .map(|(name, member)| MemberBlueprint {
                    name: name.clone(),
                    accessor: Arc::new(member.accessor.clone()),
                    candidates: member.candidates.clone(),
                    targets: Vec::new(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// CANDIDATES
// ============================================================================

/// The builders a member may dispatch to, one per runtime type.
///
/// Never empty: construct with [`Candidates::of`] (or `From<&Builder<_>>`)
/// and extend with [`or`](Self::or).
///
/// ```rust,ignore
/// graphic.add_member(
///     "shape",
///     |g| MemberValue::single(g.shape.as_ref()),
///     Candidates::of(&square).or(&rectangle).or(&circle),
/// );
/// ```
#[derive(Clone)]
pub struct Candidates {
    builders: SmallVec<[Rc<dyn ErasedBuilder>; 2]>,
}

impl Candidates {
    /// A single candidate.
    pub fn of<R: BusinessObject>(builder: &Builder<R>) -> Self {
        Self {
            builders: smallvec![builder.erased()],
        }
    }

    /// Adds another candidate.
    ///
    /// If two candidates target the same type, the later one wins.
    pub fn or<R: BusinessObject>(mut self, builder: &Builder<R>) -> Self {
        self.builders.push(builder.erased());
        self
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Rc<dyn ErasedBuilder>> {
        self.builders.iter()
    }
}

impl<R: BusinessObject> From<&Builder<R>> for Candidates {
    fn from(builder: &Builder<R>) -> Self {
        Self::of(builder)
    }
}

impl fmt::Debug for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidates")
            .field("count", &self.builders.len())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Accumulates rules and members for `T`, then compiles them with
/// [`build`](Self::build).
///
/// Every method takes `&self` and returns a clone of the handle, so calls
/// chain and the builder stays usable as a candidate afterwards.
pub struct Builder<T> {
    inner: Rc<RefCell<Declaration<T>>>,
}

impl<T: BusinessObject> Builder<T> {
    /// An empty builder named after `T`'s short type name.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Declaration {
                name: short_type_name::<T>().to_owned(),
                rules: Vec::new(),
                members: IndexMap::new(),
            })),
        }
    }

    /// Sets the report label.
    pub fn set_name(&self, name: impl Into<String>) -> Self {
        self.inner.borrow_mut().name = name.into();
        self.clone()
    }

    /// The report label.
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Adds a rule. An empty `id` makes the rule anonymous: it cannot be
    /// looked up by path and is never deduplicated.
    pub fn add_rule<P>(&self, id: impl Into<String>, description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.insert_rule(Rule::new(id, description, predicate))
    }

    /// Adds a rule whose predicate may fail. A failure aborts validation.
    pub fn try_add_rule<P, E>(&self, id: impl Into<String>, description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.insert_rule(Rule::fallible(id, description, predicate))
    }

    /// Adds a prepared rule. A rule whose id is already declared is ignored.
    pub fn insert_rule(&self, rule: Rule<T>) -> Self {
        {
            let mut declaration = self.inner.borrow_mut();
            if !rule.id().is_empty() && declaration.rules.contains(&rule) {
                warn!(
                    validator = %declaration.name,
                    rule = rule.id(),
                    "duplicate rule id ignored"
                );
            } else {
                declaration.rules.push(rule);
            }
        }
        self.clone()
    }

    /// Adds a member validated by one of `candidates`, picked by the runtime
    /// type of each extracted object. A member name already declared is
    /// ignored.
    pub fn add_member<F>(&self, name: impl Into<String>, accessor: F, candidates: impl Into<Candidates>) -> Self
    where
        F: for<'o> Fn(&'o T) -> MemberValue<'o> + Send + Sync + 'static,
    {
        let name = name.into();
        let extract = erase_accessor(move |object: &T| Ok(accessor(object)));
        self.insert_member(Accessor::new(name.clone(), extract), name, candidates.into())
    }

    /// Adds a member whose accessor may fail. A failure aborts validation.
    pub fn try_add_member<F, E>(
        &self,
        name: impl Into<String>,
        accessor: F,
        candidates: impl Into<Candidates>,
    ) -> Self
    where
        F: for<'o> Fn(&'o T) -> Result<MemberValue<'o>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let name = name.into();
        let extract = erase_accessor(move |object: &T| accessor(object).map_err(Into::into));
        self.insert_member(Accessor::new(name.clone(), extract), name, candidates.into())
    }

    fn insert_member(&self, accessor: Accessor<T>, name: String, candidates: Candidates) -> Self {
        {
            let mut declaration = self.inner.borrow_mut();
            let validator = declaration.name.clone();
            match declaration.members.entry(name) {
                Entry::Occupied(entry) => {
                    warn!(validator = %validator, member = %entry.key(), "duplicate member ignored");
                }
                Entry::Vacant(entry) => {
                    entry.insert(MemberDeclaration {
                        accessor,
                        candidates,
                    });
                }
            }
        }
        self.clone()
    }

    /// Copies `parent`'s current rules and members into this builder.
    ///
    /// `parent` declares for a supertype of `T`: its predicates and accessors
    /// run on the `S` view found along `T`'s supertype chain. Declarations
    /// already present here take precedence. Declarations added to `parent`
    /// afterwards are not copied.
    pub fn inherit<S: BusinessObject>(&self, parent: &Builder<S>) -> Self {
        if std::ptr::addr_eq(Rc::as_ptr(&self.inner), Rc::as_ptr(&parent.inner)) {
            return self.clone();
        }

        let (rules, members): (Vec<Rule<T>>, Vec<(String, Accessor<T>, Candidates)>) = {
            let parent = parent.inner.borrow();
            (
                parent.rules.iter().map(|rule| rule.lift()).collect(),
                parent
                    .members
                    .iter()
                    .map(|(name, member)| (name.clone(), member.accessor.lift(), member.candidates.clone()))
                    .collect(),
            )
        };

        for rule in rules {
            self.insert_rule(rule);
        }
        for (name, accessor, candidates) in members {
            self.insert_member(accessor, name, candidates);
        }
        self.clone()
    }

    /// `true` when there are neither rules nor members.
    pub fn is_empty(&self) -> bool {
        ErasedBuilder::is_empty(&*self.inner)
    }

    /// Number of distinct rules declared.
    pub fn rule_count(&self) -> usize {
        self.inner.borrow().rules.len()
    }

    /// Number of distinct members declared.
    pub fn member_count(&self) -> usize {
        self.inner.borrow().members.len()
    }

    /// Compiles this builder and every builder reachable through member
    /// candidates into an immutable validator graph.
    ///
    /// Each distinct builder is compiled once; cycles close onto the node
    /// already assigned to the builder.
    ///
    /// # Errors
    ///
    /// See [`BuildError`]. Nothing is returned on failure.
    pub fn build(&self) -> Result<Validator<T>, BuildError> {
        let graph = GraphCompiler::compile(&self.erased())?;
        Ok(Validator::from_graph(graph))
    }

    fn erased(&self) -> Rc<dyn ErasedBuilder> {
        self.inner.clone()
    }
}

impl<T: BusinessObject> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Builder<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Builder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Builder");
        if let Ok(declaration) = self.inner.try_borrow() {
            debug
                .field("name", &declaration.name)
                .field("rules", &declaration.rules.len())
                .field("members", &declaration.members.keys().collect::<Vec<_>>());
        }
        debug.finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
