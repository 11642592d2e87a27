//! `node.attribute` plug references

use crate::error::{PlumbError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reference to one attribute on one node, written `node.attribute`.
///
/// The attribute part may address a child or array element, for example
/// `renderLayer1.outAdjustments[0].outPlug`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlugRef {
    pub node: String,
    pub attr: String,
}

impl PlugRef {
    pub fn new(node: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            attr: attr.into(),
        }
    }

    /// Parse `node.attr`; the node part ends at the first `.`
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((node, attr)) if !node.is_empty() && !attr.is_empty() => {
                Ok(Self::new(node, attr))
            }
            _ => Err(PlumbError::AttributeNotFound(s.to_string())),
        }
    }

    /// The same attribute on a different node
    pub fn with_node(&self, node: impl Into<String>) -> Self {
        Self::new(node, self.attr.clone())
    }

    /// True if `other` is this plug, one of its children or one of its
    /// array elements (`outAdjustments` covers `outAdjustments[2].outPlug`).
    pub fn covers(&self, other: &PlugRef) -> bool {
        if self.node != other.node {
            return false;
        }
        if self.attr == other.attr {
            return true;
        }
        match other.attr.strip_prefix(self.attr.as_str()) {
            Some(rest) => rest.starts_with('[') || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for PlugRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.attr)
    }
}

impl FromStr for PlugRef {
    type Err = PlumbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlugRef {
    type Error = PlumbError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PlugRef> for String {
    fn from(plug: PlugRef) -> Self {
        plug.to_string()
    }
}
