//! The built-in rule set, grouped by discipline

pub mod animation;
pub mod modelling;
pub mod render_layers;
pub mod rigging;

use crate::check::{CheckSlot, DynCheck};
use plumb_core::{as_bool, AttrValue, PlugRef};
use plumb_scene::SceneGraph;

/// Every built-in check in registry order
pub fn builtin() -> Vec<Box<dyn DynCheck>> {
    vec![
        CheckSlot::boxed(animation::UnusedAnimation::new()),
        CheckSlot::boxed(animation::ComponentAnimation::new()),
        CheckSlot::boxed(animation::SubFrameAnimation::new()),
        CheckSlot::boxed(animation::TemplateAnimation::new()),
        CheckSlot::boxed(animation::CleanAnimation::new()),
        CheckSlot::boxed(animation::JointsHidden::new()),
        CheckSlot::boxed(modelling::FreezeTransforms::new()),
        CheckSlot::boxed(modelling::History::new()),
        CheckSlot::boxed(modelling::Animation::new()),
        CheckSlot::boxed(modelling::NoNamespaces::new()),
        CheckSlot::boxed(modelling::UvSetMap1::new()),
        CheckSlot::boxed(rigging::NonDeformerHistory::new()),
        CheckSlot::boxed(rigging::NonSetDrivenAnimation::new()),
        CheckSlot::boxed(rigging::ControlSetsLayout::new()),
        CheckSlot::boxed(rigging::ControlSetsArnold::new()),
        CheckSlot::boxed(render_layers::DuplicateAdjustments::new()),
        CheckSlot::boxed(render_layers::DisplacementNotIgnored::new()),
        CheckSlot::boxed(render_layers::MergeAovs::new()),
        CheckSlot::boxed(render_layers::NotIgnoringSubdivision::new()),
        CheckSlot::boxed(render_layers::RenderSingleCamera::new()),
    ]
}

/// Boolean value of a plug; missing plugs read as `default`
fn flag(scene: &dyn SceneGraph, plug: &PlugRef, default: bool) -> bool {
    scene
        .get_attr(plug)
        .ok()
        .and_then(|v| as_bool(&v))
        .unwrap_or(default)
}

/// `on` expressed in the same value type as `current`
fn switch_like(current: &AttrValue, on: bool) -> AttrValue {
    match current {
        AttrValue::Integer(_) => AttrValue::Integer(on as i64),
        AttrValue::Float(_) => AttrValue::Float(if on { 1.0 } else { 0.0 }),
        _ => AttrValue::Boolean(on),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::check::{Check, CheckSlot, DynCheck};
    use plumb_scene::SceneGraph;

    /// Discover, fix every error, and return the labels found before and after
    pub fn fix_all<C: Check>(check: C, scene: &mut dyn SceneGraph) -> (Vec<String>, Vec<String>) {
        let mut slot = CheckSlot::new(check);
        slot.discover(&*scene).unwrap();
        let before = slot.error_labels();
        for i in 0..slot.error_count() {
            slot.remediate(scene, i).unwrap();
        }
        slot.discover(&*scene).unwrap();
        (before, slot.error_labels())
    }

    /// Labels found by a discovery pass
    pub fn found<C: Check>(check: C, scene: &dyn SceneGraph) -> Vec<String> {
        let mut slot = CheckSlot::new(check);
        slot.discover(scene).unwrap();
        slot.error_labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_like_keeps_type() {
        assert_eq!(switch_like(&AttrValue::Integer(1), false), AttrValue::Integer(0));
        assert_eq!(switch_like(&AttrValue::Float(0.0), true), AttrValue::Float(1.0));
        assert_eq!(switch_like(&AttrValue::Boolean(true), false), AttrValue::Boolean(false));
    }
}
