//! Plumb Scene - the scene graph as seen by checks
//!
//! Checks never talk to a host application directly. They go through the
//! [`SceneGraph`] facade, which exposes the narrow set of queries and edits
//! the rule set needs. [`MemoryScene`] is an in-process implementation
//! backed by hecs, loaded from and saved to TOML scene files.

mod curve;
mod format;
mod graph;
mod loader;
mod node;
pub mod node_types;
mod saver;
mod world;

pub use curve::{AnimCurve, Keyframe, TangentType};
pub use format::{ConnectionDef, NodeDef, SceneFile, SceneMetadata};
pub use graph::{Connection, Direction, NodeFilter, SceneGraph};
pub use loader::{load_scene, load_scene_string};
pub use node::{Attribute, Attributes, NodeInfo};
pub use saver::{save_scene, save_scene_string, to_scene_file};
pub use world::MemoryScene;
