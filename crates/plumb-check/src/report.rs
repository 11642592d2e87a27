//! Discovery report types

use crate::check::DynCheck;
use serde::Serialize;

/// How a check's discovery pass ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Found,
    /// Discovery did not complete; the check reports zero errors
    Failed(String),
}

/// Outcome of one check in a discovery pass
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub check_name: String,
    pub categories: Vec<String>,
    /// Message template with the error count substituted
    pub message: String,
    pub selectable: bool,
    pub urgent: bool,
    pub status: RunStatus,
    /// Error labels in discovery order; their positions are the indices a
    /// selection refers to
    pub errors: Vec<String>,
}

impl RunResult {
    pub(crate) fn from_check(check: &dyn DynCheck) -> Self {
        let meta = check.meta();
        let errors = check.error_labels();
        let status = if errors.is_empty() {
            RunStatus::Passed
        } else {
            RunStatus::Found
        };
        Self {
            check_name: meta.name.clone(),
            categories: meta.categories.clone(),
            message: expand_message(&meta.message, errors.len()),
            selectable: meta.selectable,
            urgent: meta.urgent,
            status,
            errors,
        }
    }

    pub(crate) fn failed(check: &dyn DynCheck, reason: String) -> Self {
        let meta = check.meta();
        Self {
            check_name: meta.name.clone(),
            categories: meta.categories.clone(),
            message: expand_message(&meta.message, 0),
            selectable: meta.selectable,
            urgent: meta.urgent,
            status: RunStatus::Failed(reason),
            errors: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Passed
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed(_))
    }

    /// The line shown to the user for this check
    pub fn display_line(&self) -> String {
        self.message.clone()
    }
}

/// Fill a message template with an error count.
///
/// Templates name the count as `{0}`; a template without it gets the count
/// prepended.
pub fn expand_message(template: &str, count: usize) -> String {
    if template.contains("{0}") {
        template.replace("{0}", &count.to_string())
    } else if template.is_empty() {
        count.to_string()
    } else {
        format!("{} {}", count, template)
    }
}

/// Results of a discovery pass, in the order the checks were given
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if every check ran and found nothing
    pub fn is_clean(&self) -> bool {
        self.results.iter().all(|r| r.is_clean())
    }

    /// Total errors across all checks
    pub fn error_count(&self) -> usize {
        self.results.iter().map(|r| r.count()).sum()
    }

    pub fn urgent_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.urgent)
            .map(|r| r.count())
            .sum()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    /// Get a human-readable summary
    pub fn summary(&self) -> String {
        let found = self.results.iter().filter(|r| r.count() > 0).count();
        if found == 0 && self.failed_count() == 0 {
            return format!("All {} check(s) passed.", self.results.len());
        }

        let mut summary = format!(
            "{} error(s) from {} of {} check(s), {} urgent",
            self.error_count(),
            found,
            self.results.len(),
            self.urgent_count(),
        );
        if self.failed_count() > 0 {
            summary.push_str(&format!(", {} check(s) failed to run", self.failed_count()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, errors: &[&str], urgent: bool) -> RunResult {
        RunResult {
            check_name: name.to_string(),
            categories: vec!["Animation".to_string()],
            message: expand_message("{0} curve(s)", errors.len()),
            selectable: true,
            urgent,
            status: if errors.is_empty() {
                RunStatus::Passed
            } else {
                RunStatus::Found
            },
            errors: errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_expand_message() {
        assert_eq!(expand_message("{0} joints not hidden", 3), "3 joints not hidden");
        assert_eq!(expand_message("merge AOVs not checked", 1), "1 merge AOVs not checked");
        assert_eq!(expand_message("", 2), "2");
    }

    #[test]
    fn test_empty_report_is_clean() {
        let report = RunReport::new();
        assert!(report.is_clean());
        assert_eq!(report.summary(), "All 0 check(s) passed.");
    }

    #[test]
    fn test_counts_and_summary() {
        let mut report = RunReport::new();
        report.results.push(result("A", &["c1", "c2"], true));
        report.results.push(result("B", &[], false));
        report.results.push(result("C", &["n1"], false));

        assert!(!report.is_clean());
        assert_eq!(report.error_count(), 3);
        assert_eq!(report.urgent_count(), 2);
        assert_eq!(report.results[0].display_line(), "2 curve(s)");
        assert_eq!(
            report.summary(),
            "3 error(s) from 2 of 3 check(s), 2 urgent"
        );
    }

    #[test]
    fn test_failed_result_is_not_clean() {
        let mut failed = result("A", &[], false);
        failed.status = RunStatus::Failed("boom".to_string());
        assert!(failed.is_failed());
        assert!(!failed.is_clean());
        assert_eq!(failed.count(), 0);

        let mut report = RunReport::new();
        report.results.push(failed);
        assert!(report.summary().ends_with("1 check(s) failed to run"));
    }
}
