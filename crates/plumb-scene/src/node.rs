//! Node components stored in the scene world

use plumb_core::{AttrValue, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a node
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub node_type: String,
    /// Node is owned by a referenced file
    pub referenced: bool,
}

impl NodeInfo {
    pub fn new(id: NodeId, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            node_type: node_type.into(),
            referenced: false,
        }
    }
}

/// One attribute slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: AttrValue,
    pub locked: bool,
    pub keyable: bool,
}

impl Attribute {
    pub fn new(value: AttrValue) -> Self {
        Self {
            value,
            locked: false,
            keyable: true,
        }
    }
}

/// All attributes of a node, keyed by long attribute name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(flatten)]
    pub data: BTreeMap<String, Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attr: &str) -> Option<&Attribute> {
        self.data.get(attr)
    }

    pub fn get_mut(&mut self, attr: &str) -> Option<&mut Attribute> {
        self.data.get_mut(attr)
    }

    /// Add or overwrite an attribute, keeping existing lock/keyable flags
    pub fn set(&mut self, attr: impl Into<String>, value: AttrValue) {
        match self.data.entry(attr.into()) {
            std::collections::btree_map::Entry::Occupied(mut e) => e.get_mut().value = value,
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(Attribute::new(value));
            }
        }
    }

    pub fn has(&self, attr: &str) -> bool {
        self.data.contains_key(attr)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }
}
