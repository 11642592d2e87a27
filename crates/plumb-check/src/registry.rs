//! Check registry

use crate::check::{Check, CheckSlot, DynCheck};
use crate::checks;
use crate::collections::Collections;
use plumb_core::{PlumbError, Result};

/// Holds every check available to a session, in a fixed order
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn DynCheck>>,
}

impl CheckRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in rule set
    pub fn builtin() -> Self {
        Self {
            checks: checks::builtin(),
        }
    }

    /// Register a check; names must be unique
    pub fn register(&mut self, check: Box<dyn DynCheck>) -> Result<()> {
        if self.find(&check.meta().name).is_some() {
            return Err(PlumbError::ConfigError(format!(
                "a check named '{}' is already registered",
                check.meta().name
            )));
        }
        self.checks.push(check);
        Ok(())
    }

    /// Register a typed check
    pub fn add<C: Check + 'static>(&mut self, check: C) -> Result<()> {
        self.register(CheckSlot::boxed(check))
    }

    /// Get all checks
    pub fn all(&self) -> &[Box<dyn DynCheck>] {
        &self.checks
    }

    pub fn get(&self, index: usize) -> Option<&dyn DynCheck> {
        self.checks.get(index).map(|c| c.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Box<dyn DynCheck>> {
        self.checks.get_mut(index)
    }

    /// Index of the check with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.checks.iter().position(|c| c.meta().name == name)
    }

    /// Indices of checks tagged with `category`
    pub fn by_category(&self, category: &str) -> Vec<usize> {
        self.matching(|c| c.meta().has_category(category))
    }

    /// Every category used by a registered check, in first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for check in &self.checks {
            for category in &check.meta().categories {
                if !categories.contains(category) {
                    categories.push(category.clone());
                }
            }
        }
        categories
    }

    /// Indices of the checks making up the collection `name`
    pub fn resolve(&self, collections: &Collections, name: &str) -> Result<Vec<usize>> {
        let categories = collections.categories(name)?;
        Ok(self.matching(|c| {
            c.meta()
                .categories
                .iter()
                .any(|tag| categories.contains(tag))
        }))
    }

    /// Get the number of registered checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    fn matching(&self, predicate: impl Fn(&dyn DynCheck) -> bool) -> Vec<usize> {
        self.checks
            .iter()
            .enumerate()
            .filter(|(_, c)| predicate(c.as_ref()))
            .map(|(i, _)| i)
            .collect()
    }
}
