//! Scene file format definitions

use crate::curve::Keyframe;
use plumb_core::PlugRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure of a scene TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    #[serde(default, rename = "node", skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeDef>,
    #[serde(default, rename = "connection", skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionDef>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Definition of a node in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub referenced: bool,
    /// Attributes that are locked
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locked: Vec<String>,
    /// Attributes that are not keyable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unkeyable: Vec<String>,
    /// Members, for object sets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, toml::Value>,
    /// Key data, for animation curves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Keyframe>>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            parent: None,
            referenced: false,
            locked: Vec::new(),
            unkeyable: Vec::new(),
            members: Vec::new(),
            attrs: BTreeMap::new(),
            keys: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: toml::Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn with_keys(mut self, keys: Vec<Keyframe>) -> Self {
        self.keys = Some(keys);
        self
    }
}

/// A connection between two plugs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDef {
    pub source: PlugRef,
    pub destination: PlugRef,
}

impl SceneFile {
    /// Create a new scene file
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeDef) {
        self.nodes.push(node);
    }

    pub fn add_connection(&mut self, source: PlugRef, destination: PlugRef) {
        self.connections.push(ConnectionDef {
            source,
            destination,
        });
    }
}
