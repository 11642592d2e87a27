//! Rigging checks

use super::flag;
use crate::check::{Check, CheckMeta};
use crate::filter;
use crate::handles::ControlIssue;
use plumb_core::{values_match, AttrValue, PlugRef, Result};
use plumb_scene::node_types::{inherits_any, DEFORMER_CHAIN_TYPES};
use plumb_scene::{Direction, NodeFilter, SceneGraph};

/// Object set holding every animator-facing control
pub const CONTROLS_SET: &str = "controls_SET";

/// Rest values of control transform attributes
const CONTROL_DEFAULTS: &[(&str, f64)] = &[
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

/// Curve attributes added by the Arnold plug-in
const ARNOLD_CURVE_ATTRS: &[&str] = &[
    "rcurve",
    "cwdth",
    "srate",
    "ai_curve_shaderr",
    "ai_curve_shaderg",
    "ai_curve_shaderb",
];

/// Meshes whose history holds more than deformers
pub struct NonDeformerHistory {
    meta: CheckMeta,
}

impl NonDeformerHistory {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Non Deformer History",
                "{0} mesh(es) contain non-deformer history nodes",
                &["Rigging"],
            ),
        }
    }
}

impl Default for NonDeformerHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for NonDeformerHistory {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for mesh in filter::owned_nodes(scene, &NodeFilter::of_type("mesh")) {
            let mut foreign = false;
            for node in scene.list_history(&mesh)? {
                if !inherits_any(&scene.node_type(&node)?, DEFORMER_CHAIN_TYPES) {
                    foreign = true;
                    break;
                }
            }
            if foreign {
                found.push(mesh);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, mesh: &String) -> Result<()> {
        scene.bake_partial_history(mesh)
    }
}

/// Curves driven by time rather than by a driver attribute
pub struct NonSetDrivenAnimation {
    meta: CheckMeta,
}

impl NonSetDrivenAnimation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Non Set-Driven Animation",
                "{0} non set-driven animation curve(s) in the scene",
                &["Rigging"],
            ),
        }
    }
}

impl Default for NonSetDrivenAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for NonSetDrivenAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        Ok(filter::time_curves(scene))
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        scene.delete_node(curve)
    }
}

/// Members of the controls set, or nothing when the rig has no such set
fn controls(scene: &dyn SceneGraph) -> Result<Vec<String>> {
    if !scene.exists(CONTROLS_SET) {
        return Ok(Vec::new());
    }
    Ok(filter::remove_referenced(scene, scene.set_members(CONTROLS_SET)?))
}

/// Controls that are not at rest, are driven, or have unlocked visibility
pub struct ControlSetsLayout {
    meta: CheckMeta,
}

impl ControlSetsLayout {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new("Control Sets Layout", "{0} sets misconfigured", &["Rigging"])
                .with_selectable(false),
        }
    }

    fn inspect(&self, scene: &dyn SceneGraph, control: &str) -> Result<ControlIssue> {
        let plug = |attr: &str| PlugRef::new(control, attr);

        let mut non_default = Vec::new();
        for (attr, rest) in CONTROL_DEFAULTS {
            let p = plug(*attr);
            if !scene.has_attr(&p) || scene.is_locked(&p)? {
                continue;
            }
            if !values_match(&scene.get_attr(&p)?, &AttrValue::Float(*rest)) {
                non_default.push(p);
            }
        }

        let mut connected = Vec::new();
        for attr in scene.list_attrs(control, true)? {
            let p = plug(attr.as_str());
            if scene.is_locked(&p)? {
                continue;
            }
            if !scene
                .list_connections(&p, Direction::Incoming, None)
                .is_empty()
            {
                connected.push(p);
            }
        }

        let visibility = plug("visibility");
        let visibility_unlocked = scene.has_attr(&visibility) && !scene.is_locked(&visibility)?;

        Ok(ControlIssue {
            control: control.to_string(),
            non_default,
            connected,
            visibility_unlocked,
        })
    }
}

impl Default for ControlSetsLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for ControlSetsLayout {
    type Error = ControlIssue;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<ControlIssue>> {
        let mut issues = Vec::new();
        for control in controls(scene)? {
            let issue = self.inspect(scene, &control)?;
            if !issue.is_empty() {
                tracing::debug!(%issue, "control misconfigured");
                issues.push(issue);
            }
        }
        Ok(issues)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, issue: &ControlIssue) -> Result<()> {
        for plug in &issue.connected {
            for conn in scene.list_connections(plug, Direction::Incoming, None) {
                scene.disconnect(&conn.source, &conn.destination)?;
            }
        }

        for plug in &issue.non_default {
            if let Some((_, rest)) = CONTROL_DEFAULTS.iter().find(|(a, _)| *a == plug.attr) {
                scene.set_attr(plug, AttrValue::Float(*rest))?;
            }
        }

        if issue.visibility_unlocked {
            scene.set_locked(&PlugRef::new(issue.control.clone(), "visibility"), true)?;
        }
        Ok(())
    }
}

/// Control curve shapes whose Arnold curve attributes are keyable
pub struct ControlSetsArnold {
    meta: CheckMeta,
}

impl ControlSetsArnold {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Control Sets Arnold Attributes",
                "{0} sets with curve attributes",
                &["Rigging"],
            )
            .with_selectable(false),
        }
    }
}

impl Default for ControlSetsArnold {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-intermediate curve shapes at or below `node`
fn curve_shapes(scene: &dyn SceneGraph, node: &str, shapes: &mut Vec<String>) {
    if scene.is_a(node, "nurbsCurve")
        && !flag(scene, &PlugRef::new(node, "intermediateObject"), false)
        && !shapes.iter().any(|s| s == node)
    {
        shapes.push(node.to_string());
    }
    for child in scene.children(node) {
        curve_shapes(scene, &child, shapes);
    }
}

fn keyable_arnold_attrs(scene: &dyn SceneGraph, shape: &str) -> Result<Vec<PlugRef>> {
    let mut plugs = Vec::new();
    for attr in ARNOLD_CURVE_ATTRS {
        let plug = PlugRef::new(shape, *attr);
        if scene.has_attr(&plug) && scene.is_keyable(&plug)? {
            plugs.push(plug);
        }
    }
    Ok(plugs)
}

impl Check for ControlSetsArnold {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut shapes = Vec::new();
        for control in controls(scene)? {
            curve_shapes(scene, &control, &mut shapes);
        }

        let mut found = Vec::new();
        for shape in shapes {
            if !keyable_arnold_attrs(scene, &shape)?.is_empty() {
                found.push(shape);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, shape: &String) -> Result<()> {
        for plug in keyable_arnold_attrs(scene, shape)? {
            scene.set_keyable(&plug, false)?;
        }
        Ok(())
    }
}
