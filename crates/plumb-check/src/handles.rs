//! Error handle shapes shared by several checks

use plumb_core::PlugRef;
use std::fmt;

/// Several nodes reported as one defect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList(pub Vec<String>);

impl fmt::Display for NodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// A connection from a scene plug into a render layer adjustment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlugPair {
    pub scene_plug: PlugRef,
    pub layer_plug: PlugRef,
}

impl fmt::Display for PlugPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.scene_plug, self.layer_plug)
    }
}

/// A rig control and what is wrong with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlIssue {
    pub control: String,
    /// Unlocked transform plugs away from their default
    pub non_default: Vec<PlugRef>,
    /// Unlocked keyable plugs with an incoming connection
    pub connected: Vec<PlugRef>,
    pub visibility_unlocked: bool,
}

impl ControlIssue {
    pub fn is_empty(&self) -> bool {
        self.non_default.is_empty() && self.connected.is_empty() && !self.visibility_unlocked
    }
}

impl fmt::Display for ControlIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut problems = Vec::new();
        if !self.non_default.is_empty() {
            problems.push(format!("{} non-default value(s)", self.non_default.len()));
        }
        if !self.connected.is_empty() {
            problems.push(format!("{} incoming connection(s)", self.connected.len()));
        }
        if self.visibility_unlocked {
            problems.push("visibility unlocked".to_string());
        }
        write!(f, "{} ({})", self.control, problems.join(", "))
    }
}
