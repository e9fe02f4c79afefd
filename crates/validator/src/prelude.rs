//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use rulegraph_validator::prelude::*;
//! ```

pub use crate::basic;
pub use crate::builder::{Builder, Candidates};
pub use crate::describe::{Catalog, Describe, validator_for};
pub use crate::error::{BoxError, BuildError, PathError, ValidationError};
pub use crate::object::{BusinessObject, DynObject, MemberValue};
pub use crate::options::ValidationOptions;
pub use crate::result::{ResultNode, RuleResult};
pub use crate::validator::Validator;
