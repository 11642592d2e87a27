//! Animation checks

use super::flag;
use crate::check::{Check, CheckMeta};
use crate::curve::{self, evaluate_curve, CurveTolerances};
use crate::filter;
use plumb_core::{AttrValue, PlugRef, Result};
use plumb_scene::{Direction, NodeFilter, SceneGraph};

/// Animation curves whose output drives nothing
pub struct UnusedAnimation {
    meta: CheckMeta,
}

impl UnusedAnimation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Unused Animation",
                "{0} animation curve(s) are unused",
                &["Animation"],
            )
            .with_urgent(true),
        }
    }
}

impl Default for UnusedAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for UnusedAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        Ok(filter::owned_nodes(scene, &NodeFilter::of_type("animCurve"))
            .into_iter()
            .filter(|c| {
                scene
                    .list_connections(&PlugRef::new(c.clone(), "output"), Direction::Outgoing, None)
                    .is_empty()
            })
            .collect())
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        scene.delete_node(curve)
    }
}

/// Animation curves driving mesh components
pub struct ComponentAnimation {
    meta: CheckMeta,
}

impl ComponentAnimation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Component Animation",
                "{0} animation curve(s) are connected to a shape",
                &["Animation"],
            ),
        }
    }
}

impl Default for ComponentAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for ComponentAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut curves = Vec::new();
        for mesh in scene.list_nodes(&NodeFilter::of_type("mesh")) {
            let connected: Vec<String> = scene
                .list_connections(
                    &PlugRef::new(mesh.clone(), "pnts"),
                    Direction::Both,
                    Some("animCurve"),
                )
                .iter()
                .map(|c| c.other_end(&mesh).node.clone())
                .collect();

            for curve in filter::remove_referenced(scene, connected) {
                if !curves.contains(&curve) {
                    curves.push(curve);
                }
            }
        }
        Ok(curves)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        scene.delete_node(curve)
    }
}

/// Time-driven curves with keys between frames
pub struct SubFrameAnimation {
    meta: CheckMeta,
}

impl SubFrameAnimation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Sub-Frame Animation",
                "{0} animation curve(s) have keys in sub-frames",
                &["Animation"],
            )
            .with_urgent(true),
        }
    }
}

impl Default for SubFrameAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for SubFrameAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for curve in filter::time_curves(scene) {
            if scene
                .anim_curve(&curve)?
                .times()
                .iter()
                .any(|t| t.round() != *t)
            {
                found.push(curve);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        let times = scene.anim_curve(curve)?.times();
        for (i, time) in times.into_iter().enumerate() {
            if time.round() != time {
                scene.set_key_time(curve, i, time.round())?;
            }
        }
        Ok(())
    }
}

/// Curves with templated (locked) keys
pub struct TemplateAnimation {
    meta: CheckMeta,
}

impl TemplateAnimation {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Template Animation",
                "{0} animation curve(s) are set to template",
                &["Animation"],
            ),
        }
    }
}

impl Default for TemplateAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for TemplateAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for curve in filter::time_curves(scene) {
            if scene.anim_curve(&curve)?.has_locked_keys() {
                found.push(curve);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        let count = scene.anim_curve(curve)?.len();
        for i in 0..count {
            scene.set_key_locked(curve, i, false)?;
        }

        let channel = PlugRef::new(curve.clone(), "keyTimeValue");
        if scene.has_attr(&channel) {
            scene.set_locked(&channel, false)?;
        }
        Ok(())
    }
}

/// Curves with redundant keys, or that hold a constant value
pub struct CleanAnimation {
    meta: CheckMeta,
    tolerances: CurveTolerances,
}

impl CleanAnimation {
    pub fn new() -> Self {
        Self::with_tolerances(CurveTolerances::default())
    }

    pub fn with_tolerances(tolerances: CurveTolerances) -> Self {
        Self {
            meta: CheckMeta::new(
                "Clean Animation",
                "{0} animation curve(s) have unnecessary key(s)",
                &["Animation"],
            )
            .with_urgent(true),
            tolerances,
        }
    }
}

impl Default for CleanAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for CleanAnimation {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for curve in filter::time_curves(scene) {
            let action = evaluate_curve(&scene.anim_curve(&curve)?, &self.tolerances);
            if action.is_needed() {
                found.push(curve);
            }
        }
        Ok(found)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, curve: &String) -> Result<()> {
        // Classify again: an earlier fix may have changed the curve
        let action = evaluate_curve(&scene.anim_curve(curve)?, &self.tolerances);
        tracing::debug!(curve = %curve, ?action, "cleaning curve");
        curve::apply(scene, curve, &action)
    }
}

/// Joints that can be seen in the viewport
pub struct JointsHidden {
    meta: CheckMeta,
}

impl JointsHidden {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Joints Hidden",
                "{0} joints not hidden",
                &["Animation", "Rigging"],
            ),
        }
    }
}

impl Default for JointsHidden {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `node` is drawn: visibility on, not an intermediate shape, not
/// hidden by a display override, and every ancestor visible
pub fn is_visible(scene: &dyn SceneGraph, node: &str) -> bool {
    visible(scene, node, true)
}

fn visible(scene: &dyn SceneGraph, node: &str, check_intermediate: bool) -> bool {
    if !scene.exists(node) || !scene.is_a(node, "dagNode") {
        return false;
    }

    let plug = |attr: &str| PlugRef::new(node, attr);

    if !flag(scene, &plug("visibility"), true) {
        return false;
    }

    if check_intermediate
        && scene.is_a(node, "shape")
        && flag(scene, &plug("intermediateObject"), false)
    {
        return false;
    }

    // Display layers hide members through the override attributes
    if flag(scene, &plug("overrideEnabled"), false)
        && !flag(scene, &plug("overrideVisibility"), true)
    {
        return false;
    }

    match scene.parent(node) {
        Some(parent) => visible(scene, &parent, false),
        None => true,
    }
}

impl Check for JointsHidden {
    type Error = String;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<String>> {
        Ok(
            filter::owned_nodes(scene, &NodeFilter::of_type("joint").long())
                .into_iter()
                .filter(|j| is_visible(scene, j))
                .collect(),
        )
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, joint: &String) -> Result<()> {
        scene.set_attr(&PlugRef::new(joint.clone(), "visibility"), AttrValue::Boolean(false))
    }
}
