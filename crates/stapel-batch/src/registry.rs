// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform registry — the catalog of available actions.
//
// This is configuration, not execution: the registry maps action identifiers
// to transforms and their input constraints, and never touches the queue.

use std::collections::BTreeMap;

use stapel_core::error::{Result, StapelError};
use stapel_core::types::{SourceDocument, TransformOutput};
use tracing::{debug, warn};

/// One registered transformation.
///
/// `apply` must behave as a pure function from the caller's perspective: the
/// same input bytes either succeed with the same output or fail. It receives
/// the whole [`SourceDocument`] so output names can be derived from the input
/// name, but must not retain or mutate anything beyond its return value.
pub trait Transform: Send + Sync {
    /// Stable identifier callers select this transform by.
    fn action_id(&self) -> &str;

    /// Whether a file with the given declared MIME type can be processed.
    /// Used to pre-filter incompatible files before `apply` is attempted.
    fn accepts(&self, media_type: &str) -> bool;

    /// Run the transformation over one document.
    fn apply(&self, source: &SourceDocument) -> Result<TransformOutput>;
}

/// Catalog of transforms, keyed by action identifier.
///
/// The default catalog is static for the lifetime of the process; `register`
/// exists for callers (and tests) that need additional actions.
pub struct TransformRegistry {
    transforms: BTreeMap<String, Box<dyn Transform>>,
}

impl TransformRegistry {
    /// An empty registry with no actions.
    pub fn empty() -> Self {
        Self {
            transforms: BTreeMap::new(),
        }
    }

    /// The built-in catalog: `compress`, `flatten`,
    /// `convert-image-to-document`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(crate::actions::CompressAction));
        registry.register(Box::new(crate::actions::FlattenAction));
        registry.register(Box::new(crate::actions::ImageToDocumentAction));
        registry
    }

    /// Add a transform. A transform with the same action id replaces the
    /// previous registration (last one wins).
    pub fn register(&mut self, transform: Box<dyn Transform>) {
        let id = transform.action_id().to_string();
        if self.transforms.insert(id.clone(), transform).is_some() {
            warn!(action = %id, "replacing previously registered transform");
        } else {
            debug!(action = %id, "transform registered");
        }
    }

    /// Resolve an action identifier.
    pub fn lookup(&self, action_id: &str) -> Result<&dyn Transform> {
        self.transforms
            .get(action_id)
            .map(|t| t.as_ref())
            .ok_or_else(|| StapelError::ActionNotFound(action_id.to_string()))
    }

    /// All registered action identifiers, sorted.
    pub fn action_ids(&self) -> Vec<&str> {
        self.transforms.keys().map(String::as_str).collect()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopTransform;

    impl Transform for NoopTransform {
        fn action_id(&self) -> &str {
            "noop"
        }

        fn accepts(&self, _media_type: &str) -> bool {
            true
        }

        fn apply(&self, source: &SourceDocument) -> Result<TransformOutput> {
            Ok(TransformOutput {
                name: source.name.clone(),
                bytes: source.bytes.clone(),
            })
        }
    }

    #[test]
    fn default_catalog_has_expected_actions() {
        let registry = TransformRegistry::with_defaults();
        assert_eq!(
            registry.action_ids(),
            vec!["compress", "convert-image-to-document", "flatten"]
        );
    }

    #[test]
    fn lookup_unknown_action_fails() {
        let registry = TransformRegistry::with_defaults();
        let result = registry.lookup("rotate");
        assert!(matches!(result, Err(StapelError::ActionNotFound(id)) if id == "rotate"));
    }

    #[test]
    fn registered_transform_is_resolvable() {
        let mut registry = TransformRegistry::empty();
        registry.register(Box::new(NoopTransform));

        let transform = registry.lookup("noop").expect("lookup");
        assert!(transform.accepts("application/octet-stream"));
    }

    #[test]
    fn registration_with_same_id_replaces() {
        let mut registry = TransformRegistry::empty();
        registry.register(Box::new(NoopTransform));
        registry.register(Box::new(NoopTransform));
        assert_eq!(registry.action_ids(), vec!["noop"]);
    }
}
