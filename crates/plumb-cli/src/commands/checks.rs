//! Check listing command

use super::load_collections;
use anyhow::Result;
use plumb_check::CheckRegistry;

pub fn run(collection: Option<&str>, collections_path: Option<&str>) -> Result<()> {
    let registry = CheckRegistry::builtin();

    let indices: Vec<usize> = match collection {
        Some(name) => {
            let collections = load_collections(collections_path)?;
            registry.resolve(&collections, name)?
        }
        None => (0..registry.len()).collect(),
    };

    for index in indices {
        let Some(check) = registry.get(index) else {
            continue;
        };
        let meta = check.meta();
        let mode = if meta.selectable { "selectable" } else { "bulk" };
        let urgent = if meta.urgent { ", urgent" } else { "" };
        println!(
            "{} [{}] ({}{})",
            meta.name,
            meta.categories.join(", "),
            mode,
            urgent
        );
    }

    Ok(())
}
