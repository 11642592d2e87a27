//! Node handles for in-memory scenes

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE: AtomicU64 = AtomicU64::new(1);

/// Identity of a node inside one loaded scene.
///
/// Checks address nodes by name, but fixes rename them (namespace stripping)
/// and delete them mid-batch. `MemoryScene` therefore keys connections,
/// parenting and set membership on `NodeId`, so a rename touches one lookup
/// table instead of every edge. Ids are never written to scene files; they
/// only need to be unique and to sort in creation order, which is the order
/// node listings come back in.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next id
    pub fn new() -> Self {
        Self(NEXT_NODE.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
