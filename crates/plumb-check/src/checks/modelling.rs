//! Modelling checks

use crate::check::{Check, CheckMeta};
use crate::filter;
use crate::handles::NodeList;
use plumb_core::{values_match, AttrValue, PlugRef, PlumbError, Result};
use plumb_scene::{NodeFilter, SceneGraph};

/// Transform attributes and their frozen values
const IDENTITY: &[(&str, f64)] = &[
    ("translateX", 0.0),
    ("translateY", 0.0),
    ("translateZ", 0.0),
    ("rotateX", 0.0),
    ("rotateY", 0.0),
    ("rotateZ", 0.0),
    ("scaleX", 1.0),
    ("scaleY", 1.0),
    ("scaleZ", 1.0),
];

const DEFAULT_CAMERAS: &[&str] = &["|persp", "|front", "|top", "|side"];

/// Exact node types that may sit in a mesh's history
const HISTORY_IGNORED: &[&str] = &[
    "tweak",
    "groupParts",
    "groupId",
    "shape",
    "shadingEngine",
    "mesh",
];

const UV_SET_ATTR: &str = "uvSet";
const DEFAULT_UV_SET: &str = "map1";

/// Transforms with translate, rotate or scale away from identity
pub struct FreezeTransforms {
    meta: CheckMeta,
}

impl FreezeTransforms {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Freeze Transforms",
                "{0} transform(s) are not frozen",
                &["Modelling"],
            ),
        }
    }
}

impl Default for FreezeTransforms {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for FreezeTransforms {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let transforms = filter::owned_nodes(scene, &NodeFilter::of_type("transform").long());
        Ok(transforms
            .into_iter()
            .filter(|t| !DEFAULT_CAMERAS.contains(&t.as_str()))
            .filter(|t| {
                IDENTITY.iter().any(|(attr, identity)| {
                    scene
                        .get_attr(&PlugRef::new(t.clone(), *attr))
                        .map(|v| !values_match(&v, &AttrValue::Float(*identity)))
                        .unwrap_or(false)
                })
            })
            .collect())
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, transform: &String) -> Result<()> {
        scene.freeze_transform(transform)
    }
}

/// Meshes with construction history
pub struct History {
    meta: CheckMeta,
}

impl History {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "History",
                "{0} mesh(es) contain history nodes",
                &["Modelling"],
            ),
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for History {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for mesh in filter::owned_nodes(scene, &NodeFilter::of_type("mesh").long()) {
            let mut has_history = false;
            for node in scene.list_history(&mesh)? {
                if !HISTORY_IGNORED.contains(&scene.node_type(&node)?.as_str()) {
                    has_history = true;
                    break;
                }
            }
            if has_history {
                found.push(mesh);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, mesh: &String) -> Result<()> {
        scene.delete_history(mesh)
    }
}

/// Any animation at all; models are delivered static
pub struct Animation {
    meta: CheckMeta,
}

impl Animation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Animation",
                "{0} animation curve(s) in the scene",
                &["Modelling"],
            ),
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for Animation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        Ok(filter::owned_nodes(scene, &NodeFilter::of_type("animCurve")))
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        scene.delete_node(curve)
    }
}

/// Namespace part of a node path, empty if there is none
pub fn namespace_of(node: &str) -> &str {
    let short = node.rsplit('|').next().unwrap_or(node);
    short.rsplit_once(':').map(|(ns, _)| ns).unwrap_or("")
}

/// Geometry living in a namespace
pub struct NoNamespaces {
    meta: CheckMeta,
}

impl NoNamespaces {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new("No Namespaces", "{0} Namespaces found", &["Modelling"])
                .with_selectable(false),
        }
    }
}

impl Default for NoNamespaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for NoNamespaces {
    type Error = NodeList;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<NodeList>> {
        let nodes: Vec<String> =
            filter::owned_nodes(scene, &NodeFilter::of_type("geometryShape").long())
                .into_iter()
                .filter(|n| !namespace_of(n).is_empty())
                .collect();

        if nodes.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![NodeList(nodes)])
        }
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, nodes: &NodeList) -> Result<()> {
        for node in &nodes.0 {
            if !scene.exists(node) {
                continue;
            }
            let short = node.rsplit('|').next().unwrap_or(node);
            let stripped = &short[namespace_of(node).len() + 1..];
            scene.rename_node(node, stripped)?;
        }
        Ok(())
    }
}

/// Meshes whose default UV set is not called `map1`
pub struct UvSetMap1 {
    meta: CheckMeta,
}

impl UvSetMap1 {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Has UV Set map1",
                "{0} mesh has map1 renamed and must be fixed",
                &["Modelling"],
            )
            .with_selectable(false),
        }
    }
}

impl Default for UvSetMap1 {
    fn default() -> Self {
        Self::new()
    }
}

/// UV set names of a mesh, by index; `None` if it has no UV sets
fn uv_sets(scene: &dyn SceneGraph, mesh: &str) -> Result<Option<Vec<String>>> {
    let plug = PlugRef::new(mesh, UV_SET_ATTR);
    let value = match scene.get_attr(&plug) {
        Ok(value) => value,
        Err(PlumbError::AttributeNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };

    let invalid = || PlumbError::InvalidAttributeType {
        plug: plug.to_string(),
        expected: "array of strings".to_string(),
    };
    let sets = value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
        .collect::<Result<Vec<_>>>()?;

    Ok(if sets.is_empty() { None } else { Some(sets) })
}

/// Rename the set at index 0 to `map1`, moving any other `map1` aside
pub fn with_default_uv_set(mut sets: Vec<String>) -> Vec<String> {
    if sets.first().map(String::as_str) == Some(DEFAULT_UV_SET) {
        return sets;
    }

    if let Some(clash) = sets.iter().position(|s| s == DEFAULT_UV_SET) {
        let free = (2..)
            .map(|i| format!("map{}", i))
            .find(|name| !sets.contains(name))
            .unwrap_or_default();
        sets[clash] = free;
    }
    if let Some(first) = sets.first_mut() {
        *first = DEFAULT_UV_SET.to_string();
    }
    sets
}

impl Check for UvSetMap1 {
    type Error = NodeList;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<NodeList>> {
        let mut invalid = Vec::new();
        for mesh in filter::owned_nodes(scene, &NodeFilter::of_type("mesh").long()) {
            if let Some(sets) = uv_sets(scene, &mesh)? {
                if sets[0] != DEFAULT_UV_SET {
                    invalid.push(mesh);
                }
            }
        }

        if invalid.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![NodeList(invalid)])
        }
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, meshes: &NodeList) -> Result<()> {
        for mesh in &meshes.0 {
            let Some(sets) = uv_sets(scene, mesh)? else {
                continue;
            };
            let renamed = with_default_uv_set(sets)
                .into_iter()
                .map(AttrValue::String)
                .collect();
            scene.set_attr(&PlugRef::new(mesh.clone(), UV_SET_ATTR), AttrValue::Array(renamed))?;
        }
        Ok(())
    }
}
