//! Node type inheritance
//!
//! Type filters such as `animCurve` or `shape` match every concrete type
//! derived from them.

/// Types making up a deformer chain; partial history baking keeps these
pub const DEFORMER_CHAIN_TYPES: &[&str] = &[
    "geometryFilter",
    "tweak",
    "groupParts",
    "groupId",
    "shape",
    "dagPose",
    "joint",
    "shadingEngine",
    "cluster",
    "transform",
    "diskCache",
    "time",
];

/// Direct base type of a node type
pub fn base_type(node_type: &str) -> Option<&'static str> {
    match node_type {
        "animCurveTL" | "animCurveTA" | "animCurveTU" | "animCurveTT" | "animCurveUL"
        | "animCurveUA" | "animCurveUU" | "animCurveUT" => Some("animCurve"),
        "mesh" | "nurbsCurve" | "nurbsSurface" => Some("geometryShape"),
        "geometryShape" | "camera" | "locator" => Some("shape"),
        "joint" => Some("transform"),
        "shape" | "transform" => Some("dagNode"),
        "skinCluster" | "blendShape" | "cluster" | "tweak" | "nonLinear" | "ffd" | "wire" => {
            Some("geometryFilter")
        }
        _ => None,
    }
}

/// True if `node_type` is `type_name` or derives from it
pub fn inherits(node_type: &str, type_name: &str) -> bool {
    let mut current = Some(node_type);
    while let Some(t) = current {
        if t == type_name {
            return true;
        }
        current = base_type(t);
    }
    false
}

/// True if `node_type` matches any of `type_names`
pub fn inherits_any(node_type: &str, type_names: &[&str]) -> bool {
    type_names.iter().any(|t| inherits(node_type, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anim_curve_family() {
        assert!(inherits("animCurveTL", "animCurve"));
        assert!(inherits("animCurveUU", "animCurve"));
        assert!(!inherits("mesh", "animCurve"));
    }

    #[test]
    fn test_shape_chain() {
        assert!(inherits("mesh", "geometryShape"));
        assert!(inherits("mesh", "shape"));
        assert!(inherits("mesh", "dagNode"));
        assert!(inherits("camera", "shape"));
        assert!(!inherits("camera", "geometryShape"));
    }

    #[test]
    fn test_joint_is_transform() {
        assert!(inherits("joint", "transform"));
        assert!(inherits("joint", "dagNode"));
    }

    #[test]
    fn test_deformer_chain() {
        assert!(inherits_any("skinCluster", DEFORMER_CHAIN_TYPES));
        assert!(inherits_any("tweak", DEFORMER_CHAIN_TYPES));
        assert!(!inherits_any("polyExtrudeFace", DEFORMER_CHAIN_TYPES));
    }
}
