//! Scene loading from TOML files

use crate::curve::AnimCurve;
use crate::format::SceneFile;
use crate::graph::SceneGraph;
use crate::world::MemoryScene;
use plumb_core::{PlugRef, PlumbError, Result};
use std::fs;
use std::path::Path;

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(MemoryScene, SceneFile)> {
    let content = fs::read_to_string(path)?;
    load_scene_string(&content)
}

/// Load a scene from a TOML string
pub fn load_scene_string(content: &str) -> Result<(MemoryScene, SceneFile)> {
    let scene_file: SceneFile = toml::from_str(content)?;
    let mut scene = MemoryScene::new();

    // First pass: create all nodes so parents and connections can refer forward
    for node in &scene_file.nodes {
        scene.add_node(node.name.clone(), node.node_type.clone())?;
    }

    // Second pass: attributes, flags, keys and relationships
    for node in &scene_file.nodes {
        for (attr, value) in &node.attrs {
            scene.add_attr(&node.name, attr, value.clone())?;
        }

        for attr in &node.locked {
            scene
                .set_locked(&PlugRef::new(node.name.clone(), attr.clone()), true)
                .map_err(|_| undeclared(&node.name, attr, "locked"))?;
        }

        for attr in &node.unkeyable {
            scene
                .set_keyable(&PlugRef::new(node.name.clone(), attr.clone()), false)
                .map_err(|_| undeclared(&node.name, attr, "unkeyable"))?;
        }

        if node.referenced {
            scene.set_referenced(&node.name, true)?;
        }

        if let Some(keys) = &node.keys {
            scene.set_anim_curve(&node.name, AnimCurve::new(keys.clone()))?;
        }

        if let Some(parent) = &node.parent {
            scene.set_parent(&node.name, parent)?;
        }

        for member in &node.members {
            scene.add_member(&node.name, member)?;
        }
    }

    for conn in &scene_file.connections {
        scene.connect(&conn.source, &conn.destination)?;
    }

    tracing::debug!(
        scene = %scene_file.scene.name,
        nodes = scene.node_count(),
        connections = scene_file.connections.len(),
        "loaded scene"
    );

    Ok((scene, scene_file))
}

fn undeclared(node: &str, attr: &str, list: &str) -> PlumbError {
    PlumbError::SceneLoadError(format!(
        "'{}' lists '{}' as {} but declares no such attribute",
        node, attr, list
    ))
}
