//! Scene remediation command

use super::{load_collections, print_result, select_checks};
use anyhow::{Context, Result};
use plumb_check::{CheckRegistry, RemediationReport, RunResult, Runner, Selection};
use plumb_scene::{load_scene, save_scene};

pub struct FixArgs {
    pub scene: String,
    pub collection: Option<String>,
    pub collections: Option<String>,
    pub select: Vec<String>,
    pub output: Option<String>,
    pub dry_run: bool,
    pub format: String,
}

pub fn run(args: FixArgs) -> Result<()> {
    let collections = load_collections(args.collections.as_deref())?;
    let mut registry = CheckRegistry::builtin();
    let (collection, indices) =
        select_checks(&registry, &collections, args.collection.as_deref())?;

    let mut selection = Selection::new();
    for spec in &args.select {
        selection.add_spec(spec)?;
    }

    let (mut scene, scene_file) =
        load_scene(&args.scene).with_context(|| format!("Failed to load {}", args.scene))?;

    let mut runner = Runner::new(&mut registry);
    let found = runner.discover(&scene, &indices);
    for name in unknown_selections(&selection, &found.results) {
        tracing::warn!(check = name, "selected check is not part of this run");
    }

    let report = runner.remediate(&mut scene, &indices, &selection);

    if args.format == "json" {
        print_report_json(&collection, args.dry_run, &report)?;
    } else {
        print_report_text(&collection, args.dry_run, &report);
    }

    if !args.dry_run && report.fixed_count() > 0 {
        let path = args.output.as_deref().unwrap_or(&args.scene);
        save_scene(path, &scene, &scene_file.scene.name)?;
        if args.format != "json" {
            println!("\nScene saved to {}", path);
        }
    }

    if report.failed_count() > 0 || report.remaining_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Selected check names that are not part of the run
fn unknown_selections<'a>(selection: &'a Selection, results: &[RunResult]) -> Vec<&'a str> {
    selection
        .check_names()
        .into_iter()
        .filter(|name| !results.iter().any(|r| r.check_name == *name))
        .collect()
}

fn print_report_text(collection: &str, dry_run: bool, report: &RemediationReport) {
    let verb = if dry_run { "Would fix" } else { "Fixed" };
    println!("Collection {}", collection);

    if report.outcomes.is_empty() {
        println!("  Nothing to fix.");
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!("  {} [{}] {}", verb, outcome.check_name, outcome.label),
            Some(reason) => println!(
                "  Failed [{}] {}: {}",
                outcome.check_name, outcome.label, reason
            ),
        }
    }

    println!();
    println!("After fixes:");
    for result in &report.results {
        print_result(result);
    }

    println!();
    println!("{}", report.summary());
}

fn print_report_json(collection: &str, dry_run: bool, report: &RemediationReport) -> Result<()> {
    let output = serde_json::json!({
        "collection": collection,
        "dry_run": dry_run,
        "summary": report.summary(),
        "fixed": report.fixed_count(),
        "failed": report.failed_count(),
        "remaining": report.remaining_count(),
        "outcomes": report.outcomes,
        "results": report.results,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
