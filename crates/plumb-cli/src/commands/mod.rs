//! CLI command implementations

pub mod checks;
pub mod collections;
pub mod fix;
pub mod run;

use anyhow::{Context, Result};
use plumb_check::{CheckRegistry, Collections, RunResult, RunStatus};

/// Load a collections file, or the built-in collections
pub fn load_collections(path: Option<&str>) -> Result<Collections> {
    match path {
        Some(path) => Collections::load_file(path)
            .with_context(|| format!("Failed to load collections from {}", path)),
        None => Ok(Collections::builtin()),
    }
}

/// Resolve the collection to run into registry indices
pub fn select_checks(
    registry: &CheckRegistry,
    collections: &Collections,
    explicit: Option<&str>,
) -> Result<(String, Vec<usize>)> {
    let name = collections.choose_from_env(explicit)?;
    let indices = registry.resolve(collections, &name)?;
    tracing::info!(collection = %name, checks = indices.len(), "resolved collection");
    Ok((name, indices))
}

/// Print one check result the way `run` and `fix` show them
pub fn print_result(result: &RunResult) {
    match &result.status {
        RunStatus::Passed => println!("  [PASS]   {}", result.check_name),
        RunStatus::Failed(reason) => {
            println!("  [ERROR]  {}: check failed: {}", result.check_name, reason)
        }
        RunStatus::Found => {
            let tag = if result.urgent { "[URGENT]" } else { "[FAIL]  " };
            println!("  {} {}: {}", tag, result.check_name, result.display_line());
            for (i, label) in result.errors.iter().enumerate() {
                if result.selectable {
                    println!("      [{}] {}", i, label);
                } else {
                    println!("      - {}", label);
                }
            }
        }
    }
}
