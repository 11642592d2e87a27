//! Redundant-key evaluator
//!
//! Classifies an animation curve as fully redundant (delete it and keep the
//! value it was producing), partly redundant (prune interior keys) or clean.
//! The classification is pure; [`apply`] performs it against a scene.

use plumb_core::{PlugRef, Result};
use plumb_scene::{AnimCurve, Direction, SceneGraph, TangentType};

/// Comparison tolerances for the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveTolerances {
    /// Tangent angles below this count as flat
    pub angle: f64,
    /// Values closer than this count as equal
    pub value: f64,
}

impl Default for CurveTolerances {
    fn default() -> Self {
        Self {
            angle: 0.001,
            value: 0.001,
        }
    }
}

/// What to do with a curve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveAction {
    /// The curve produces a constant; replace it with that value
    Delete,
    /// Remove these interior keys, ascending
    Prune(Vec<usize>),
    NoAction,
}

impl CurveAction {
    pub fn is_needed(&self) -> bool {
        !matches!(self, CurveAction::NoAction)
    }
}

/// Interior keys whose removal does not change the curve
pub fn redundant_keys(curve: &AnimCurve, tol: &CurveTolerances) -> Vec<usize> {
    let n = curve.len();
    if n < 3 {
        return Vec::new();
    }

    let values = curve.values();
    let in_angles = curve.in_angles();
    let out_angles = curve.out_angles();
    let tangents = curve.out_tangents();

    (1..n - 1)
        .filter(|&i| {
            let prev_delta = (values[i - 1] - values[i]).abs();
            let next_delta = (values[i + 1] - values[i]).abs();

            let stepped = tangents[i - 1..=i + 1]
                .iter()
                .all(|t| *t == TangentType::Step);
            if stepped && prev_delta < tol.value {
                return true;
            }

            let flat = [out_angles[i - 1], in_angles[i], out_angles[i], in_angles[i + 1]]
                .iter()
                .all(|a| *a < tol.angle);
            flat && prev_delta < tol.value && next_delta < tol.value
        })
        .collect()
}

/// Classify a curve
pub fn evaluate_curve(curve: &AnimCurve, tol: &CurveTolerances) -> CurveAction {
    let n = curve.len();
    if n <= 1 {
        return CurveAction::Delete;
    }

    let candidates = redundant_keys(curve, tol);

    let first = &curve.keys[0];
    let last = &curve.keys[n - 1];
    let collapses = n - candidates.len() == 2
        && (first.value - last.value).abs() < tol.value
        && first.out_angle.abs() < tol.angle
        && last.in_angle.abs() < tol.angle;

    if collapses {
        CurveAction::Delete
    } else if !candidates.is_empty() {
        CurveAction::Prune(candidates)
    } else {
        CurveAction::NoAction
    }
}

/// Apply a classification to the curve node `curve` in `scene`
pub fn apply(scene: &mut dyn SceneGraph, curve: &str, action: &CurveAction) -> Result<()> {
    match action {
        CurveAction::Delete => delete_preserving_values(scene, curve),
        CurveAction::Prune(indices) => prune(scene, curve, indices),
        CurveAction::NoAction => Ok(()),
    }
}

/// Delete a curve, writing the value it was producing back onto each plug it
/// drove. Plugs with no stored attribute get one; locked plugs are left alone.
pub fn delete_preserving_values(scene: &mut dyn SceneGraph, curve: &str) -> Result<()> {
    let output = PlugRef::new(curve, "output");
    let mut captured = Vec::new();
    for conn in scene.list_connections(&output, Direction::Outgoing, None) {
        let plug = conn.destination;
        match scene.get_attr(&plug) {
            Ok(value) => captured.push((plug, value)),
            Err(e) => tracing::debug!(plug = %plug, error = %e, "no value to preserve"),
        }
    }

    scene.delete_node(curve)?;

    for (plug, value) in captured {
        if !scene.has_attr(&plug) {
            scene.declare_attr(&plug, value)?;
        } else if !scene.is_locked(&plug)? {
            scene.set_attr(&plug, value)?;
        }
    }
    Ok(())
}

/// Cut keys in descending index order so earlier indices stay valid
pub fn prune(scene: &mut dyn SceneGraph, curve: &str, indices: &[usize]) -> Result<()> {
    let mut ordered = indices.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    for index in ordered.into_iter().rev() {
        scene.cut_key(curve, index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumb_scene::{Keyframe, MemoryScene};

    fn flat(times: &[f64], values: &[f64]) -> AnimCurve {
        AnimCurve::new(
            times
                .iter()
                .zip(values)
                .map(|(t, v)| Keyframe::new(*t, *v))
                .collect(),
        )
    }

    fn stepped(times: &[f64], values: &[f64]) -> AnimCurve {
        AnimCurve::new(
            times
                .iter()
                .zip(values)
                .map(|(t, v)| {
                    Keyframe::new(*t, *v)
                        .with_angles(30.0, 30.0)
                        .with_out_tangent(TangentType::Step)
                })
                .collect(),
        )
    }

    fn tol() -> CurveTolerances {
        CurveTolerances::default()
    }

    #[test]
    fn test_single_or_no_key_deletes() {
        assert_eq!(evaluate_curve(&flat(&[], &[]), &tol()), CurveAction::Delete);
        assert_eq!(evaluate_curve(&flat(&[3.0], &[1.0]), &tol()), CurveAction::Delete);
    }

    #[test]
    fn test_two_equal_flat_keys_delete() {
        let curve = flat(&[0.0, 1.0], &[5.0, 5.0]);
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::Delete);
    }

    #[test]
    fn test_constant_curve_collapses_to_delete() {
        let curve = flat(&[0.0, 1.0, 2.0, 3.0], &[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(redundant_keys(&curve, &tol()), vec![1, 2]);
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::Delete);
    }

    #[test]
    fn test_near_equal_but_not_both_neighbours() {
        let curve = flat(&[0.0, 1.0, 2.0], &[0.0, 0.0005, 1.0]);
        assert!(redundant_keys(&curve, &tol()).is_empty());
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::NoAction);
    }

    #[test]
    fn test_two_different_keys_no_action() {
        let curve = flat(&[0.0, 10.0], &[0.0, 1.0]);
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::NoAction);
    }

    #[test]
    fn test_plateau_prunes_interior() {
        let curve = flat(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 5.0, 5.0, 5.0, 5.0, 9.0],
        );
        assert_eq!(
            evaluate_curve(&curve, &tol()),
            CurveAction::Prune(vec![2, 3])
        );
    }

    #[test]
    fn test_sloped_tangents_are_kept() {
        let curve = AnimCurve::new(vec![
            Keyframe::new(0.0, 1.0),
            Keyframe::new(1.0, 1.0).with_angles(-20.0, 20.0),
            Keyframe::new(2.0, 1.0),
            Keyframe::new(3.0, 4.0),
        ]);
        // Absolute angles: a negative in-angle still counts
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::NoAction);
    }

    #[test]
    fn test_stepped_keys_only_need_previous_value() {
        let curve = stepped(&[0.0, 1.0, 2.0, 3.0], &[2.0, 2.0, 7.0, 7.0]);
        // Key 1 repeats key 0; key 2 changes; key 3 is the end
        assert_eq!(redundant_keys(&curve, &tol()), vec![1]);
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::Prune(vec![1]));
    }

    #[test]
    fn test_stepped_requires_all_three_tangents() {
        let mut curve = stepped(&[0.0, 1.0, 2.0], &[2.0, 2.0, 7.0]);
        curve.keys[2].out_tangent = TangentType::Linear;
        assert!(redundant_keys(&curve, &tol()).is_empty());
    }

    #[test]
    fn test_collapse_needs_flat_ends() {
        let mut curve = flat(&[0.0, 1.0, 2.0], &[5.0, 5.0, 5.0]);
        curve.keys[0].out_angle = 45.0;
        // Key 1 is no longer redundant (outAngle[0] is steep), nothing collapses
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::NoAction);
    }

    #[test]
    fn test_custom_tolerance() {
        let curve = flat(&[0.0, 1.0, 2.0, 3.0], &[0.0, 0.04, 0.0, 1.0]);
        assert_eq!(evaluate_curve(&curve, &tol()), CurveAction::NoAction);

        let loose = CurveTolerances {
            angle: 0.001,
            value: 0.05,
        };
        assert_eq!(evaluate_curve(&curve, &loose), CurveAction::Prune(vec![1]));
    }

    fn curve_scene(curve: AnimCurve) -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_node("ball", "transform").unwrap();
        scene
            .add_attr("ball", "translateY", toml::Value::Float(0.0))
            .unwrap();
        scene.add_node("ball_translateY", "animCurveTL").unwrap();
        scene.set_anim_curve("ball_translateY", curve).unwrap();
        scene
            .connect(
                &PlugRef::new("ball_translateY", "output"),
                &PlugRef::new("ball", "translateY"),
            )
            .unwrap();
        scene
    }

    #[test]
    fn test_descending_prune_matches_one_at_a_time() {
        let curve = flat(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 5.0, 5.0, 5.0, 5.0, 9.0],
        );

        // Batch: cut every candidate from the original classification
        let mut batch = curve_scene(curve.clone());
        let action = evaluate_curve(&curve, &tol());
        apply(&mut batch, "ball_translateY", &action).unwrap();
        let batch_times = batch.anim_curve("ball_translateY").unwrap().times();

        // Incremental: cut the first candidate, re-evaluate, repeat
        let mut incremental = curve_scene(curve);
        loop {
            let current = incremental.anim_curve("ball_translateY").unwrap();
            match evaluate_curve(&current, &tol()) {
                CurveAction::Prune(indices) => {
                    incremental.cut_key("ball_translateY", indices[0]).unwrap();
                }
                _ => break,
            }
        }
        let incremental_times = incremental.anim_curve("ball_translateY").unwrap().times();

        assert_eq!(batch_times, vec![0.0, 1.0, 4.0, 5.0]);
        assert_eq!(batch_times, incremental_times);
    }

    #[test]
    fn test_ascending_prune_without_recompute_removes_wrong_key() {
        let curve = flat(
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 5.0, 5.0, 5.0, 5.0, 9.0],
        );
        let mut scene = curve_scene(curve);
        for index in [2, 3] {
            scene.cut_key("ball_translateY", index).unwrap();
        }
        let times = scene.anim_curve("ball_translateY").unwrap().times();
        assert_eq!(times, vec![0.0, 1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_delete_restores_driven_value() {
        // Stored translateY is 0.0; the curve evaluates to 2.5
        let mut scene = curve_scene(flat(&[0.0, 10.0], &[2.5, 2.5]));
        let ty = PlugRef::new("ball", "translateY");

        apply(&mut scene, "ball_translateY", &CurveAction::Delete).unwrap();

        assert!(!scene.exists("ball_translateY"));
        assert_eq!(scene.get_attr(&ty).unwrap(), toml::Value::Float(2.5));
        assert!(scene
            .list_connections(&ty, Direction::Incoming, None)
            .is_empty());
    }

    #[test]
    fn test_delete_skips_locked_plug() {
        let mut scene = curve_scene(flat(&[0.0, 10.0], &[2.5, 2.5]));
        let ty = PlugRef::new("ball", "translateY");
        scene.set_locked(&ty, true).unwrap();

        apply(&mut scene, "ball_translateY", &CurveAction::Delete).unwrap();
        assert_eq!(scene.get_attr(&ty).unwrap(), toml::Value::Float(0.0));
    }

    #[test]
    fn test_delete_declares_missing_plug() {
        let mut scene = curve_scene(flat(&[0.0], &[7.0]));
        let rz = PlugRef::new("ball", "rotateZ");
        scene
            .connect(&PlugRef::new("ball_translateY", "output"), &rz)
            .unwrap();

        apply(&mut scene, "ball_translateY", &CurveAction::Delete).unwrap();
        assert!(scene.has_attr(&rz));
        assert_eq!(scene.get_attr(&rz).unwrap(), toml::Value::Float(7.0));
        assert_eq!(
            scene.get_attr(&PlugRef::new("ball", "translateY")).unwrap(),
            toml::Value::Float(7.0)
        );
    }
}
