//! Collection listing command

use super::load_collections;
use anyhow::Result;

pub fn run(collections_path: Option<&str>) -> Result<()> {
    let collections = load_collections(collections_path)?;
    let default = collections.choose_from_env(None)?;

    for def in collections.all() {
        let marker = if def.name == default { " (default)" } else { "" };
        println!("{}{}", def.name, marker);
        println!("  {}", def.categories.join(", "));
    }

    Ok(())
}
