//! Plumb Check - Scene validation and auto-remediation
//!
//! A check finds one class of defect in a scene and knows how to fix it.
//! Checks carry categories; named collections pick categories per
//! discipline. The [`Runner`] executes a set of checks, isolating failures
//! per check and per error, and re-validates whatever it fixed.

pub mod checks;
mod check;
mod collections;
pub mod curve;
pub mod filter;
mod handles;
mod registry;
mod report;
mod runner;

pub use check::{Check, CheckMeta, CheckSlot, CheckState, DynCheck};
pub use collections::{CollectionDef, Collections, COLLECTION_ENV};
pub use curve::{evaluate_curve, CurveAction, CurveTolerances};
pub use handles::{ControlIssue, NodeList, PlugPair};
pub use registry::CheckRegistry;
pub use report::{expand_message, RunReport, RunResult, RunStatus};
pub use runner::{FixOutcome, RemediationReport, Runner, Selection};
