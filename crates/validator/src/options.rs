//! Per-validator runtime configuration.

use serde::{Deserialize, Serialize};

/// Knobs applied to every call of a [`Validator`](crate::Validator).
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```rust,ignore
/// let options: ValidationOptions = serde_json::from_str(r#"{ "max_depth": 64 }"#)?;
/// let validator = builder.build()?.with_options(options);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// Deepest member nesting a call may reach. The root sits at depth zero.
    ///
    /// `None` means unlimited: the descent then only stops when it runs out of
    /// unvisited objects.
    pub max_depth: Option<usize>,
}

impl ValidationOptions {
    /// Unlimited depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps member nesting at `depth`.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// The configured limit, if `depth` is beyond it.
    pub(crate) fn exceeded_at(&self, depth: usize) -> Option<usize> {
        self.max_depth.filter(|&limit| depth > limit)
    }
}
