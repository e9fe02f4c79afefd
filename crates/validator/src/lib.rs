//! # rulegraph-validator
//!
//! Business-rule validation for object graphs that may be cyclic and
//! polymorphic.
//!
//! A [`Validator<T>`] checks a set of named rules against an object, then
//! descends into its members (single objects or collections), choosing a
//! validator for each member object by runtime type. Every object reachable
//! from the root is checked exactly once per call, no matter how many paths
//! lead to it, so self-references and mutual references terminate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rulegraph_validator::prelude::*;
//!
//! let phone = Builder::<Phone>::new()
//!     .add_rule("numberValid", "number has 9 digits", |p| p.number.len() == 9)
//!     .add_rule("countryCodeValid", "country code starts with +", |p| p.country_code.starts_with('+'));
//!
//! let person = Builder::<Person>::new()
//!     .add_rule("ageValid", "age is positive", |p| p.age > 0)
//!     .add_member("phones", |p| MemberValue::many(&p.phones), &phone);
//!
//! let report = person.build()?.validate(&john)?;
//! if let Some(rule) = report.rule_result("Person.phones[1] [countryCodeValid]")? {
//!     println!("{rule}");
//! }
//! ```
//!
//! ## Pieces
//!
//! - [`BusinessObject`]: implemented by validated types; declares the
//!   supertype chain used for dispatch
//! - [`Builder`]: mutable declarations, possibly self-referential
//! - [`Validator`]: immutable compiled graph, `Send + Sync`
//! - [`ResultNode`]: the report, with path lookup and a text rendering
//! - [`Describe`] / [`Catalog`]: types that declare their own rules
//! - [`basic`]: common predicates

pub mod basic;
mod builder;
mod compiler;
pub mod describe;
mod engine;
pub mod error;
mod member;
pub mod object;
mod options;
pub mod prelude;
mod result;
mod rule;
mod validator;

pub use builder::{Builder, Candidates};
pub use describe::{Catalog, Describe, validator_for};
pub use error::{BoxError, BuildError, Error, PathError, Result, ValidationError};
pub use member::MemberDescriptor;
pub use object::{BusinessObject, DynObject, Handle, MemberValue};
pub use options::ValidationOptions;
pub use result::{ResultNode, RuleResult};
pub use rule::{Rule, RuleInfo};
pub use validator::Validator;
