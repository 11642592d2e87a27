//! Plumb Core - Foundational types for Plumb
//!
//! This crate provides the types that all other Plumb crates depend on:
//! - `NodeId` - Stable node identifiers
//! - `PlugRef` - `node.attribute` references
//! - Attribute value helpers over `toml::Value`
//! - Error types and Result alias

mod error;
mod id;
mod plug;
mod value;

pub use error::{PlumbError, Result};
pub use id::NodeId;
pub use plug::PlugRef;
pub use value::{as_bool, as_f64, values_match, AttrValue};
