//! Render layer and render settings checks

use super::{flag, switch_like};
use crate::check::{Check, CheckMeta};
use crate::filter;
use crate::handles::PlugPair;
use plumb_core::{PlugRef, PlumbError, Result};
use plumb_scene::{Direction, NodeFilter, SceneGraph};
use std::fmt;

const DEFAULT_LAYER: &str = "defaultRenderLayer";

fn ignore_displacement() -> PlugRef {
    PlugRef::new("defaultArnoldRenderOptions", "ignoreDisplacement")
}

fn ignore_subdivision() -> PlugRef {
    PlugRef::new("defaultArnoldRenderOptions", "ignoreSubdivision")
}

fn merge_aovs() -> PlugRef {
    PlugRef::new("defaultArnoldDriver", "mergeAOVs")
}

/// Two adjustments of one render layer fed by the same scene plug
pub struct DuplicateAdjustments {
    meta: CheckMeta,
}

impl DuplicateAdjustments {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Duplicate Adjustments",
                "{0} duplicate renderlayer adjustment(s)",
                &["Render Layers"],
            )
            .with_selectable(false),
        }
    }
}

impl Default for DuplicateAdjustments {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for DuplicateAdjustments {
    type Error = PlugPair;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<PlugPair>> {
        let mut duplicates = Vec::new();
        for layer in filter::owned_nodes(scene, &NodeFilter::of_type("renderLayer")) {
            // Default layers carry no adjustments
            if layer.contains(DEFAULT_LAYER) {
                continue;
            }

            let adjustments = scene.list_connections(
                &PlugRef::new(layer.clone(), "outAdjustments"),
                Direction::Incoming,
                None,
            );
            for (j, later) in adjustments.iter().enumerate() {
                if adjustments[..j].iter().any(|a| a.source == later.source) {
                    duplicates.push(PlugPair {
                        scene_plug: later.source.clone(),
                        layer_plug: later.destination.clone(),
                    });
                }
            }
        }
        Ok(duplicates)
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, pair: &PlugPair) -> Result<()> {
        scene.disconnect(&pair.scene_plug, &pair.layer_plug)?;

        let value = PlugRef::new(
            pair.layer_plug.node.clone(),
            pair.layer_plug.attr.replace("outPlug", "outValue"),
        );
        if let Some(conn) = scene
            .list_connections(&value, Direction::Outgoing, None)
            .into_iter()
            .next()
        {
            scene.disconnect(&conn.source, &conn.destination)?;
        }
        Ok(())
    }
}

/// A render option plug that must hold a given state
struct RenderOption {
    meta: CheckMeta,
    plug: fn() -> PlugRef,
    wanted: bool,
}

impl RenderOption {
    fn discover(&self, scene: &dyn SceneGraph) -> Vec<PlugRef> {
        let plug = (self.plug)();
        // Renderer not loaded: nothing to check
        if !scene.has_attr(&plug) {
            return Vec::new();
        }
        if flag(scene, &plug, self.wanted) == self.wanted {
            Vec::new()
        } else {
            vec![plug]
        }
    }

    fn remediate(&self, scene: &mut dyn SceneGraph, plug: &PlugRef) -> Result<()> {
        let current = scene.get_attr(plug)?;
        scene.set_attr(plug, switch_like(&current, self.wanted))
    }
}

macro_rules! render_option_check {
    ($(#[$doc:meta])* $ty:ident, $name:expr, $message:expr, $plug:expr, $wanted:expr, $selectable:expr) => {
        $(#[$doc])*
        pub struct $ty {
            option: RenderOption,
        }

        impl $ty {
            pub fn new() -> Self {
                Self {
                    option: RenderOption {
                        meta: CheckMeta::new($name, $message, &["Render Layers"])
                            .with_selectable($selectable),
                        plug: $plug,
                        wanted: $wanted,
                    },
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Check for $ty {
            type Error = PlugRef;

            fn meta(&self) -> &CheckMeta {
                &self.option.meta
            }

            fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<PlugRef>> {
                Ok(self.option.discover(scene))
            }

            fn remediate(&self, scene: &mut dyn SceneGraph, plug: &PlugRef) -> Result<()> {
                self.option.remediate(scene, plug)
            }
        }
    };
}

render_option_check!(
    /// Arnold must not skip displacement
    DisplacementNotIgnored,
    "Displacement Not Ignored",
    "{0} render setting(s) ignore displacement",
    ignore_displacement,
    false,
    true
);

render_option_check!(
    /// AOVs must be merged into one file
    MergeAovs,
    "Merge AOVs",
    "{0} driver(s) do not merge AOVs",
    merge_aovs,
    true,
    false
);

render_option_check!(
    /// Arnold must not skip subdivision
    NotIgnoringSubdivision,
    "Not Ignoring Subdivision",
    "{0} render setting(s) ignore subdivision",
    ignore_subdivision,
    false,
    true
);

/// A render camera problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraIssue {
    /// One of several renderable cameras, with no camera token in the
    /// output prefix to keep their images apart
    Extra(String),
    Missing,
}

impl fmt::Display for CameraIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraIssue::Extra(camera) => write!(f, "{}", camera),
            CameraIssue::Missing => write!(f, "no renderable camera found"),
        }
    }
}

/// Exactly one renderable camera, unless the image prefix names the camera
pub struct RenderSingleCamera {
    meta: CheckMeta,
}

impl RenderSingleCamera {
    pub fn new() -> Self {
        Self {
            meta: CheckMeta::new(
                "Render Single Camera",
                "{0} renderable camera issue(s)",
                &["Render Layers"],
            )
            .with_selectable(false)
            .with_urgent(true),
        }
    }
}

impl Default for RenderSingleCamera {
    fn default() -> Self {
        Self::new()
    }
}

fn string_attr(scene: &dyn SceneGraph, plug: &PlugRef) -> String {
    scene
        .get_attr(plug)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Plug holding the output file prefix for the current renderer
pub fn image_prefix_plug(scene: &dyn SceneGraph) -> PlugRef {
    let renderer =
        string_attr(scene, &PlugRef::new("defaultRenderGlobals", "currentRenderer")).to_lowercase();
    if renderer == "vray" {
        PlugRef::new("vraySettings", "fileNamePrefix")
    } else {
        PlugRef::new("defaultRenderGlobals", "imageFilePrefix")
    }
}

/// Whether an output prefix separates images per camera
pub fn has_camera_token(prefix: &str) -> bool {
    let prefix = prefix.to_lowercase();
    prefix.contains("%c") || prefix.contains("<camera>")
}

impl Check for RenderSingleCamera {
    type Error = CameraIssue;

    fn meta(&self) -> &CheckMeta {
        &self.meta
    }

    fn discover(&self, scene: &dyn SceneGraph) -> Result<Vec<CameraIssue>> {
        let cameras: Vec<String> = filter::owned_nodes(scene, &NodeFilter::of_type("camera"))
            .into_iter()
            .filter(|c| !flag(scene, &PlugRef::new(c.clone(), "startupCamera"), false))
            .filter(|c| flag(scene, &PlugRef::new(c.clone(), "renderable"), true))
            .collect();

        match cameras.len() {
            0 => Ok(vec![CameraIssue::Missing]),
            1 => Ok(Vec::new()),
            _ => {
                let prefix = string_attr(scene, &image_prefix_plug(scene));
                if has_camera_token(&prefix) {
                    Ok(Vec::new())
                } else {
                    Ok(cameras.into_iter().map(CameraIssue::Extra).collect())
                }
            }
        }
    }

    fn remediate(&self, _scene: &mut dyn SceneGraph, issue: &CameraIssue) -> Result<()> {
        Err(PlumbError::CheckFailed {
            check: self.meta.name.clone(),
            reason: format!("'{}' needs the render camera chosen by hand", issue),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{CheckSlot, DynCheck};
    use crate::checks::testing::{fix_all, found};
    use plumb_core::AttrValue;
    use plumb_scene::load_scene_string;

    const LAYERS: &str = r#"
[scene]
name = "layers"

[[node]]
name = "defaultRenderLayer"
type = "renderLayer"

[[node]]
name = "beauty"
type = "renderLayer"

[[node]]
name = "ball"
type = "transform"
[node.attrs]
visibility = true

[[node]]
name = "ballShape"
type = "mesh"
[node.attrs]
castsShadows = true

[[connection]]
source = "ball.visibility"
destination = "beauty.outAdjustments[0].outPlug"

[[connection]]
source = "beauty.outAdjustments[0].outValue"
destination = "ball.visibility"

[[connection]]
source = "ball.visibility"
destination = "beauty.outAdjustments[1].outPlug"

[[connection]]
source = "beauty.outAdjustments[1].outValue"
destination = "ballShape.castsShadows"

[[connection]]
source = "ballShape.castsShadows"
destination = "beauty.outAdjustments[2].outPlug"
"#;

    #[test]
    fn test_duplicate_adjustments() {
        let (mut scene, _) = load_scene_string(LAYERS).unwrap();
        let (before, after) = fix_all(DuplicateAdjustments::new(), &mut scene);
        assert_eq!(
            before,
            vec!["ball.visibility -> beauty.outAdjustments[1].outPlug"]
        );
        assert!(after.is_empty());

        let value = PlugRef::new("beauty", "outAdjustments[1].outValue");
        assert!(scene
            .list_connections(&value, Direction::Outgoing, None)
            .is_empty());
        // The first adjustment is untouched
        let first = PlugRef::new("beauty", "outAdjustments[0].outValue");
        assert_eq!(
            scene.list_connections(&first, Direction::Outgoing, None).len(),
            1
        );
    }

    const SETTINGS: &str = r#"
[scene]
name = "settings"

[[node]]
name = "defaultArnoldRenderOptions"
type = "aiOptions"
[node.attrs]
ignoreDisplacement = true
ignoreSubdivision = 0

[[node]]
name = "defaultArnoldDriver"
type = "aiAOVDriver"
[node.attrs]
mergeAOVs = false
"#;

    #[test]
    fn test_render_options() {
        let (mut scene, _) = load_scene_string(SETTINGS).unwrap();

        let (before, after) = fix_all(DisplacementNotIgnored::new(), &mut scene);
        assert_eq!(before, vec!["defaultArnoldRenderOptions.ignoreDisplacement"]);
        assert!(after.is_empty());
        assert_eq!(
            scene.get_attr(&ignore_displacement()).unwrap(),
            AttrValue::Boolean(false)
        );

        assert!(found(NotIgnoringSubdivision::new(), &scene).is_empty());

        let (before, after) = fix_all(MergeAovs::new(), &mut scene);
        assert_eq!(before.len(), 1);
        assert!(after.is_empty());
    }

    #[test]
    fn test_render_options_without_renderer() {
        let (scene, _) = load_scene_string("[scene]\nname = \"bare\"\n").unwrap();
        assert!(found(DisplacementNotIgnored::new(), &scene).is_empty());
        assert!(found(MergeAovs::new(), &scene).is_empty());
    }

    fn camera_scene(prefix: &str, cameras: &[&str]) -> String {
        let mut toml = format!(
            r#"
[scene]
name = "cameras"

[[node]]
name = "defaultRenderGlobals"
type = "renderGlobals"
[node.attrs]
currentRenderer = "arnold"
imageFilePrefix = "{}"

[[node]]
name = "perspShape"
type = "camera"
[node.attrs]
startupCamera = true
"#,
            prefix
        );
        for camera in cameras {
            toml.push_str(&format!("\n[[node]]\nname = \"{}\"\ntype = \"camera\"\n", camera));
        }
        toml
    }

    #[test]
    fn test_camera_token() {
        assert!(has_camera_token("<Scene>/<Camera>/<RenderLayer>"));
        assert!(has_camera_token("shots/%c_%l"));
        assert!(!has_camera_token("<Scene>/<RenderLayer>"));
    }

    #[test]
    fn test_single_camera() {
        let (scene, _) = load_scene_string(&camera_scene("<Scene>", &["shotShape"])).unwrap();
        assert!(found(RenderSingleCamera::new(), &scene).is_empty());
    }

    #[test]
    fn test_multiple_cameras_need_token() {
        let (scene, _) =
            load_scene_string(&camera_scene("<Scene>", &["shotShape", "witnessShape"])).unwrap();
        assert_eq!(
            found(RenderSingleCamera::new(), &scene),
            vec!["shotShape", "witnessShape"]
        );

        let (scene, _) =
            load_scene_string(&camera_scene("<Camera>/<Scene>", &["shotShape", "witnessShape"]))
                .unwrap();
        assert!(found(RenderSingleCamera::new(), &scene).is_empty());
    }

    #[test]
    fn test_no_camera_is_reported_and_not_fixable() {
        let (mut scene, _) = load_scene_string(&camera_scene("<Scene>", &[])).unwrap();
        let mut slot = CheckSlot::new(RenderSingleCamera::new());
        assert_eq!(slot.discover(&scene).unwrap(), 1);
        assert_eq!(slot.error_labels(), vec!["no renderable camera found"]);
        assert!(matches!(
            slot.remediate(&mut scene, 0),
            Err(PlumbError::CheckFailed { .. })
        ));
    }
}
