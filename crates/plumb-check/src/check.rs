//! The check contract

use plumb_core::{PlumbError, Result};
use plumb_scene::SceneGraph;
use serde::Serialize;
use std::fmt;

/// Static description of a check
#[derive(Debug, Clone, Serialize)]
pub struct CheckMeta {
    /// Display name, unique within a registry
    pub name: String,
    /// Message template; `{0}` is replaced with the error count
    pub message: String,
    pub categories: Vec<String>,
    /// Errors can be picked individually for fixing; otherwise the check
    /// only fixes in bulk
    pub selectable: bool,
    /// Errors are highlighted as high priority
    pub urgent: bool,
}

impl CheckMeta {
    pub fn new(name: impl Into<String>, message: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            selectable: true,
            urgent: false,
        }
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// One validation rule with its fix.
///
/// `discover` must not change the scene and must return an empty list for a
/// clean scene. `remediate` receives one error produced by this check's own
/// `discover` and must only touch the state that error names. It may run
/// after earlier fixes in the same batch already changed or removed that
/// state; node-not-found and connection-not-found errors it returns are
/// treated as "already resolved". Any other error, including a missing
/// attribute on a node that still exists, is a failed fix.
pub trait Check {
    /// Handle identifying one defect
    type Error: Clone + fmt::Display;

    fn meta(&self) -> &CheckMeta;

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<Self::Error>>;

    fn remediate(&self, scene: &mut dyn SceneGraph, error: &Self::Error) -> Result<()>;
}

/// Lifecycle of a check within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckState {
    Unevaluated,
    Evaluated { errors: usize },
    /// The last discovery did not complete
    Failed,
    Remediating,
}

/// Object-safe view of a check that owns its last discovery result.
///
/// Error handles never leave the check; callers address them by index.
pub trait DynCheck {
    fn meta(&self) -> &CheckMeta;

    fn state(&self) -> CheckState;

    /// Re-scan the scene, replacing the cached errors. Returns the count.
    fn discover(&mut self, scene: &dyn SceneGraph) -> Result<usize>;

    /// Fix the cached error at `index`
    fn remediate(&mut self, scene: &mut dyn SceneGraph, index: usize) -> Result<()>;

    fn error_count(&self) -> usize;

    /// Display labels of the cached errors, in discovery order
    fn error_labels(&self) -> Vec<String>;

    /// Drop cached errors after a discovery that did not complete
    fn mark_failed(&mut self);
}

/// Holds a typed check together with its cached errors
pub struct CheckSlot<C: Check> {
    check: C,
    errors: Vec<C::Error>,
    state: CheckState,
}

impl<C: Check> CheckSlot<C> {
    pub fn new(check: C) -> Self {
        Self {
            check,
            errors: Vec::new(),
            state: CheckState::Unevaluated,
        }
    }

    /// The cached error handles
    pub fn errors(&self) -> &[C::Error] {
        &self.errors
    }

    pub fn check(&self) -> &C {
        &self.check
    }
}

impl<C: Check + 'static> CheckSlot<C> {
    pub fn boxed(check: C) -> Box<dyn DynCheck> {
        Box::new(Self::new(check))
    }
}

impl<C: Check> DynCheck for CheckSlot<C> {
    fn meta(&self) -> &CheckMeta {
        self.check.meta()
    }

    fn state(&self) -> CheckState {
        self.state
    }

    fn discover(&mut self, scene: &dyn SceneGraph) -> Result<usize> {
        self.errors = self.check.discover(scene)?;
        self.state = CheckState::Evaluated {
            errors: self.errors.len(),
        };
        Ok(self.errors.len())
    }

    fn remediate(&mut self, scene: &mut dyn SceneGraph, index: usize) -> Result<()> {
        let error = self
            .errors
            .get(index)
            .cloned()
            .ok_or_else(|| PlumbError::CheckFailed {
                check: self.check.meta().name.clone(),
                reason: format!("no error at index {}", index),
            })?;

        self.state = CheckState::Remediating;

        match self.check.remediate(scene, &error) {
            Err(e) if e.is_stale_reference() => {
                tracing::debug!(
                    check = %self.check.meta().name,
                    error = %error,
                    reason = %e,
                    "target already gone, treating as resolved"
                );
                Ok(())
            }
            other => other,
        }
    }

    fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn error_labels(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    fn mark_failed(&mut self) {
        self.errors.clear();
        self.state = CheckState::Failed;
    }
}
