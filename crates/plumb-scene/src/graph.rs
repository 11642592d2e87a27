//! The scene query/mutation facade

use crate::curve::AnimCurve;
use plumb_core::{AttrValue, PlugRef, Result};

/// Which side of a plug to follow when listing connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Connections feeding into the plug
    Incoming,
    /// Connections the plug drives
    Outgoing,
    Both,
}

/// One directed connection between two plugs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: PlugRef,
    pub destination: PlugRef,
}

impl Connection {
    pub fn new(source: PlugRef, destination: PlugRef) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// The end of the connection that is not on `node`
    pub fn other_end(&self, node: &str) -> &PlugRef {
        if self.source.node == node {
            &self.destination
        } else {
            &self.source
        }
    }
}

/// Filter for [`SceneGraph::list_nodes`]
#[derive(Debug, Clone, Default)]
pub struct NodeFilter {
    /// Only nodes of this type or a type derived from it
    pub type_name: Option<String>,
    /// Return `|parent|child` paths instead of short names
    pub long_names: bool,
}

impl NodeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            long_names: false,
        }
    }

    pub fn long(mut self) -> Self {
        self.long_names = true;
        self
    }
}

/// Read/write access to a scene graph.
///
/// Node arguments accept short names as well as `|`-separated long names.
/// Discovery passes only ever see `&dyn SceneGraph`; remediation gets
/// `&mut dyn SceneGraph`.
pub trait SceneGraph {
    // --- nodes ---

    /// List nodes in creation order
    fn list_nodes(&self, filter: &NodeFilter) -> Vec<String>;

    fn exists(&self, node: &str) -> bool;

    fn node_type(&self, node: &str) -> Result<String>;

    /// True if the node's type is `type_name` or derives from it
    fn is_a(&self, node: &str, type_name: &str) -> bool;

    /// True if the node comes from a referenced file and is not owned by
    /// this scene
    fn is_referenced(&self, node: &str) -> bool;

    fn delete_node(&mut self, node: &str) -> Result<()>;

    /// Rename a node, returning the name it ended up with. A name already in
    /// use gets a numeric suffix (`bodyShape` becomes `bodyShape1`).
    fn rename_node(&mut self, node: &str, new_name: &str) -> Result<String>;

    // --- attributes ---

    fn has_attr(&self, plug: &PlugRef) -> bool;

    /// The plug's current value. A plug driven by an animation curve reads
    /// the curve's output, even when the attribute has no stored value.
    fn get_attr(&self, plug: &PlugRef) -> Result<AttrValue>;

    /// Add an attribute holding `value`. An existing attribute is left as
    /// it is.
    fn declare_attr(&mut self, plug: &PlugRef, value: AttrValue) -> Result<()>;

    /// Write an attribute. Writing a locked attribute is a silent no-op.
    fn set_attr(&mut self, plug: &PlugRef, value: AttrValue) -> Result<()>;

    fn is_locked(&self, plug: &PlugRef) -> Result<bool>;

    fn set_locked(&mut self, plug: &PlugRef, locked: bool) -> Result<()>;

    fn is_keyable(&self, plug: &PlugRef) -> Result<bool>;

    fn set_keyable(&mut self, plug: &PlugRef, keyable: bool) -> Result<()>;

    fn list_attrs(&self, node: &str, keyable_only: bool) -> Result<Vec<String>>;

    // --- graph ---

    /// Connections touching `plug` (or its children and elements).
    ///
    /// `type_filter` keeps only connections whose far node is of that type.
    /// An unconnected plug yields an empty list, not an error.
    fn list_connections(
        &self,
        plug: &PlugRef,
        direction: Direction,
        type_filter: Option<&str>,
    ) -> Vec<Connection>;

    fn connect(&mut self, source: &PlugRef, destination: &PlugRef) -> Result<()>;

    fn disconnect(&mut self, source: &PlugRef, destination: &PlugRef) -> Result<()>;

    /// The node itself followed by every upstream node, nearest first
    fn list_history(&self, node: &str) -> Result<Vec<String>>;

    fn parent(&self, node: &str) -> Option<String>;

    fn children(&self, node: &str) -> Vec<String>;

    fn set_members(&self, set: &str) -> Result<Vec<String>>;

    // --- animation ---

    fn anim_curve(&self, node: &str) -> Result<AnimCurve>;

    fn set_key_time(&mut self, node: &str, index: usize, time: f64) -> Result<()>;

    /// Remove one key; later keys shift down by one index
    fn cut_key(&mut self, node: &str, index: usize) -> Result<()>;

    fn set_key_locked(&mut self, node: &str, index: usize, locked: bool) -> Result<()>;

    // --- edit commands ---

    /// Bake translate/rotate/scale into identity
    fn freeze_transform(&mut self, node: &str) -> Result<()>;

    /// Remove all construction history upstream of a shape
    fn delete_history(&mut self, node: &str) -> Result<()>;

    /// Remove history upstream of a shape, keeping the deformer chain
    fn bake_partial_history(&mut self, node: &str) -> Result<()>;
}
