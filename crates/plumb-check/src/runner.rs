//! Check execution: discovery and remediation passes

use crate::check::DynCheck;
use crate::registry::CheckRegistry;
use crate::report::{RunReport, RunResult};
use plumb_core::PlumbError;
use plumb_scene::SceneGraph;
use serde::Serialize;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Errors picked for remediation, keyed by check name
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// `None` selects every error of the check
    entries: HashMap<String, Option<BTreeSet<usize>>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, check: &str, index: usize) {
        let entry = self
            .entries
            .entry(check.to_string())
            .or_insert_with(|| Some(BTreeSet::new()));
        // `None` already selects everything
        if let Some(indices) = entry {
            indices.insert(index);
        }
    }

    pub fn select_all(&mut self, check: &str) {
        self.entries.insert(check.to_string(), None);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the checks with a selection, sorted
    pub fn check_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Parse `Check Name` or `Check Name:0,2,5`
    pub fn add_spec(&mut self, spec: &str) -> plumb_core::Result<()> {
        let (name, indices) = match spec.rsplit_once(':') {
            Some((name, list)) if list.chars().all(|c| c.is_ascii_digit() || c == ',' || c == ' ') => {
                (name.trim(), Some(list))
            }
            _ => (spec.trim(), None),
        };
        if name.is_empty() {
            return Err(PlumbError::ConfigError(format!(
                "selection '{}' has no check name",
                spec
            )));
        }

        match indices {
            None => self.select_all(name),
            Some(list) => {
                for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                    let index = part.parse::<usize>().map_err(|_| {
                        PlumbError::ConfigError(format!("bad error index '{}' in '{}'", part, spec))
                    })?;
                    self.select(name, index);
                }
            }
        }
        Ok(())
    }

    /// Selected indices below `count` for `check`, ascending
    pub fn indices_for(&self, check: &str, count: usize) -> Vec<usize> {
        match self.entries.get(check) {
            None => Vec::new(),
            Some(None) => (0..count).collect(),
            Some(Some(indices)) => indices.iter().copied().filter(|i| *i < count).collect(),
        }
    }
}

/// Result of fixing one error
#[derive(Debug, Clone, Serialize)]
pub struct FixOutcome {
    pub check_name: String,
    pub index: usize,
    pub label: String,
    /// Why the fix failed, if it did
    pub error: Option<String>,
}

impl FixOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// What a remediation pass did
#[derive(Debug, Default, Serialize)]
pub struct RemediationReport {
    pub outcomes: Vec<FixOutcome>,
    /// Fresh discovery results for every check that was touched
    pub results: Vec<RunResult>,
}

impl RemediationReport {
    pub fn fixed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }

    /// Errors still present after the fixes
    pub fn remaining_count(&self) -> usize {
        self.results.iter().map(|r| r.count()).sum()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        if self.outcomes.is_empty() {
            return "Nothing to fix.".to_string();
        }
        format!(
            "{} fixed, {} failed, {} remaining",
            self.fixed_count(),
            self.failed_count(),
            self.remaining_count()
        )
    }
}

/// Runs checks from a registry against a scene
pub struct Runner<'a> {
    registry: &'a mut CheckRegistry,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a mut CheckRegistry) -> Self {
        Self { registry }
    }

    /// Run discovery for the checks at `checks`, in that order.
    ///
    /// A check that errors or panics is recorded as failed; the rest still run.
    pub fn discover(&mut self, scene: &dyn SceneGraph, checks: &[usize]) -> RunReport {
        let mut report = RunReport::new();

        for &index in checks {
            let Some(check) = self.registry.get_mut(index) else {
                tracing::warn!(index, "no check at registry index");
                continue;
            };
            report.results.push(discover_one(check, scene));
        }

        tracing::info!(
            checks = report.results.len(),
            errors = report.error_count(),
            failed = report.failed_count(),
            "discovery finished"
        );
        report
    }

    /// Fix errors found by the last discovery of the checks at `checks`.
    ///
    /// Bulk-only checks fix every error; selectable checks fix the errors
    /// `selection` names for them. A failing fix is recorded and the pass
    /// moves on. Every check that had something fixed is re-discovered.
    pub fn remediate(
        &mut self,
        scene: &mut dyn SceneGraph,
        checks: &[usize],
        selection: &Selection,
    ) -> RemediationReport {
        let mut report = RemediationReport::default();
        let mut touched = Vec::new();

        for &index in checks {
            let Some(check) = self.registry.get_mut(index) else {
                continue;
            };
            let count = check.error_count();
            if count == 0 {
                continue;
            }

            let name = check.meta().name.clone();
            let targets = if check.meta().selectable {
                selection.indices_for(&name, count)
            } else {
                (0..count).collect()
            };
            if targets.is_empty() {
                continue;
            }

            let labels = check.error_labels();
            for i in targets {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.remediate(scene, i)));
                let error = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(payload) => Some(panic_reason(payload)),
                };
                if let Some(reason) = &error {
                    tracing::warn!(check = %name, error = %labels[i], %reason, "fix failed");
                }
                report.outcomes.push(FixOutcome {
                    check_name: name.clone(),
                    index: i,
                    label: labels[i].clone(),
                    error,
                });
            }
            touched.push(index);
        }

        for index in touched {
            if let Some(check) = self.registry.get_mut(index) {
                report.results.push(discover_one(check, &*scene));
            }
        }

        tracing::info!(
            fixed = report.fixed_count(),
            failed = report.failed_count(),
            remaining = report.remaining_count(),
            "remediation finished"
        );
        report
    }
}

fn discover_one(check: &mut Box<dyn DynCheck>, scene: &dyn SceneGraph) -> RunResult {
    let name = check.meta().name.clone();
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| check.discover(scene)));

    let reason = match outcome {
        Ok(Ok(count)) => {
            tracing::debug!(
                check = %name,
                errors = count,
                elapsed_us = started.elapsed().as_micros() as u64,
                "discovered"
            );
            return RunResult::from_check(check.as_ref());
        }
        Ok(Err(e)) => e.to_string(),
        Err(payload) => panic_reason(payload),
    };

    tracing::warn!(check = %name, %reason, "discovery failed");
    check.mark_failed();
    RunResult::failed(check.as_ref(), reason)
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
