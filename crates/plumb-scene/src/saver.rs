//! Scene saving to TOML files

use crate::format::{NodeDef, SceneFile};
use crate::world::MemoryScene;
use plumb_core::Result;
use std::fs;
use std::path::Path;

/// Save a scene to a TOML file
pub fn save_scene<P: AsRef<Path>>(path: P, scene: &MemoryScene, name: &str) -> Result<()> {
    let content = save_scene_string(scene, name)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save a scene to a TOML string
pub fn save_scene_string(scene: &MemoryScene, name: &str) -> Result<String> {
    let scene_file = to_scene_file(scene, name);
    Ok(toml::to_string_pretty(&scene_file)?)
}

/// Convert a scene to its file representation, nodes in creation order
pub fn to_scene_file(scene: &MemoryScene, name: &str) -> SceneFile {
    let mut scene_file = SceneFile::new(name);

    for id in scene.node_ids() {
        let info = match scene.node_info(id) {
            Some(info) => info,
            None => continue,
        };

        let mut def = NodeDef::new(info.name, info.node_type);
        def.referenced = info.referenced;
        def.parent = scene.parent_of(id).and_then(|p| scene.name_of(p));
        def.members = scene
            .members_of(id)
            .into_iter()
            .filter_map(|m| scene.name_of(m))
            .collect();
        def.keys = scene.node_curve(id).map(|curve| curve.keys);

        if let Some(attrs) = scene.node_attributes(id) {
            for (attr, slot) in attrs.data {
                if slot.locked {
                    def.locked.push(attr.clone());
                }
                if !slot.keyable {
                    def.unkeyable.push(attr.clone());
                }
                def.attrs.insert(attr, slot.value);
            }
        }

        scene_file.add_node(def);
    }

    for conn in scene.all_connections() {
        scene_file.add_connection(conn.source, conn.destination);
    }

    scene_file
}
