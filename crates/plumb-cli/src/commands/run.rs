//! Scene discovery command

use super::{load_collections, print_result, select_checks};
use anyhow::{Context, Result};
use plumb_check::{CheckRegistry, RunReport, Runner};
use plumb_scene::load_scene;

pub struct RunArgs {
    pub scene: String,
    pub collection: Option<String>,
    pub collections: Option<String>,
    pub format: String,
}

pub fn run(args: RunArgs) -> Result<()> {
    let collections = load_collections(args.collections.as_deref())?;
    let mut registry = CheckRegistry::builtin();
    let (collection, indices) =
        select_checks(&registry, &collections, args.collection.as_deref())?;

    let (scene, _scene_file) =
        load_scene(&args.scene).with_context(|| format!("Failed to load {}", args.scene))?;

    let report = Runner::new(&mut registry).discover(&scene, &indices);

    if args.format == "json" {
        print_report_json(&collection, &report)?;
    } else {
        print_report_text(&collection, &report);
    }

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report_text(collection: &str, report: &RunReport) {
    println!("Collection {} ({} check(s))", collection, report.results.len());
    println!();

    for result in &report.results {
        print_result(result);
    }

    println!();
    println!("{}", report.summary());
}

fn print_report_json(collection: &str, report: &RunReport) -> Result<()> {
    let output = serde_json::json!({
        "collection": collection,
        "clean": report.is_clean(),
        "summary": report.summary(),
        "errors": report.error_count(),
        "urgent": report.urgent_count(),
        "failed_checks": report.failed_count(),
        "results": report.results,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
