//! Node list filters shared by checks

use plumb_core::PlugRef;
use plumb_scene::{Direction, NodeFilter, SceneGraph};

/// Drop nodes that come from a referenced file; they cannot be edited
pub fn remove_referenced(scene: &dyn SceneGraph, nodes: Vec<String>) -> Vec<String> {
    nodes
        .into_iter()
        .filter(|n| !scene.is_referenced(n))
        .collect()
}

/// Drop set-driven curves, which have an incoming connection on `input`
pub fn remove_driven_curves(scene: &dyn SceneGraph, curves: Vec<String>) -> Vec<String> {
    curves.into_iter().filter(|c| !is_driven(scene, c)).collect()
}

pub fn is_driven(scene: &dyn SceneGraph, curve: &str) -> bool {
    !scene
        .list_connections(&PlugRef::new(curve, "input"), Direction::Incoming, None)
        .is_empty()
}

/// Non-referenced nodes matching `filter`
pub fn owned_nodes(scene: &dyn SceneGraph, filter: &NodeFilter) -> Vec<String> {
    remove_referenced(scene, scene.list_nodes(filter))
}

/// Non-referenced animation curves driven by time
pub fn time_curves(scene: &dyn SceneGraph) -> Vec<String> {
    remove_driven_curves(scene, owned_nodes(scene, &NodeFilter::of_type("animCurve")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_scene::load_scene_string;

    const SCENE: &str = r#"
[scene]
name = "filters"

[[node]]
name = "local_CRV"
type = "animCurveTL"

[[node]]
name = "ref:body_CRV"
type = "animCurveTL"
referenced = true

[[node]]
name = "sdk_CRV"
type = "animCurveUL"

[[node]]
name = "driver"
type = "transform"
[node.attrs]
translateX = 0.0

[[connection]]
source = "driver.translateX"
destination = "sdk_CRV.input"
"#;

    #[test]
    fn test_remove_referenced() {
        let (scene, _) = load_scene_string(SCENE).unwrap();
        let curves = owned_nodes(&scene, &NodeFilter::of_type("animCurve"));
        assert_eq!(curves, vec!["local_CRV", "sdk_CRV"]);
    }

    #[test]
    fn test_time_curves_drop_driven() {
        let (scene, _) = load_scene_string(SCENE).unwrap();
        assert!(is_driven(&scene, "sdk_CRV"));
        assert_eq!(time_curves(&scene), vec!["local_CRV"]);
    }
}
