//! MemoryScene - an in-process scene graph implementing the facade

use crate::curve::AnimCurve;
use crate::graph::{Connection, Direction, NodeFilter, SceneGraph};
use crate::node::{Attributes, NodeInfo};
use crate::node_types::{inherits, inherits_any, DEFORMER_CHAIN_TYPES};
use bimap::BiMap;
use plumb_core::{as_f64, AttrValue, NodeId, PlugRef, PlumbError, Result};
use std::collections::{HashMap, HashSet, VecDeque};

const TRANSLATE_ROTATE: &[&str] = &[
    "translateX",
    "translateY",
    "translateZ",
    "rotateX",
    "rotateY",
    "rotateZ",
];
const SCALE: &[&str] = &["scaleX", "scaleY", "scaleZ"];

/// How many curves deep a driven value is followed before falling back to
/// the stored value
const MAX_EVAL_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
struct StoredConnection {
    source: NodeId,
    source_attr: String,
    destination: NodeId,
    destination_attr: String,
}

/// An in-memory scene graph
///
/// Wraps hecs::World with:
/// - Stable NodeId mapping
/// - Named node lookup (short names, long `|a|b` paths accepted)
/// - DAG parenting, plug connections and set membership
pub struct MemoryScene {
    /// The underlying hecs world holding node components
    world: hecs::World,
    /// Bidirectional mapping: NodeId <-> hecs::Entity
    id_map: BiMap<NodeId, hecs::Entity>,
    /// Short node name -> NodeId
    name_map: HashMap<String, NodeId>,
    /// DAG parenting: child -> parent
    parents: HashMap<NodeId, NodeId>,
    connections: Vec<StoredConnection>,
    /// Set node -> member nodes
    members: HashMap<NodeId, Vec<NodeId>>,
    /// Frame time-driven curves are evaluated at
    time: f64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create a new empty scene
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            name_map: HashMap::new(),
            parents: HashMap::new(),
            connections: Vec::new(),
            members: HashMap::new(),
            time: 0.0,
        }
    }

    /// Create a node with a unique short name
    pub fn add_node(&mut self, name: impl Into<String>, node_type: impl Into<String>) -> Result<NodeId> {
        let name = name.into();

        if self.name_map.contains_key(&name) {
            return Err(PlumbError::DuplicateNodeName(name));
        }

        let node_type = node_type.into();
        let id = NodeId::new();
        let entity = if inherits(&node_type, "animCurve") {
            self.world.spawn((
                NodeInfo::new(id, name.clone(), node_type),
                Attributes::new(),
                AnimCurve::default(),
            ))
        } else {
            self.world
                .spawn((NodeInfo::new(id, name.clone(), node_type), Attributes::new()))
        };

        self.id_map.insert(id, entity);
        self.name_map.insert(name, id);

        Ok(id)
    }

    /// The frame driven attributes are read at
    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn set_current_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Add or overwrite an attribute, bypassing its lock
    pub fn add_attr(&mut self, node: &str, attr: &str, value: AttrValue) -> Result<()> {
        let attrs = self.attributes_mut(node)?;
        attrs.set(attr, value);
        Ok(())
    }

    /// Parent `child` under `parent` in the DAG
    pub fn set_parent(&mut self, child: &str, parent: &str) -> Result<()> {
        let child_id = self.require(child)?;
        let parent_id = self.require(parent)?;

        // Refuse to create a cycle
        let mut current = Some(parent_id);
        while let Some(id) = current {
            if id == child_id {
                return Err(PlumbError::SceneLoadError(format!(
                    "cannot parent '{}' under its own descendant '{}'",
                    child, parent
                )));
            }
            current = self.parents.get(&id).copied();
        }

        self.parents.insert(child_id, parent_id);
        Ok(())
    }

    pub fn set_referenced(&mut self, node: &str, referenced: bool) -> Result<()> {
        let entity = self.entity(self.require(node)?)?;
        let info = self
            .world
            .query_one_mut::<&mut NodeInfo>(entity)
            .map_err(|_| PlumbError::NodeNotFound(node.to_string()))?;
        info.referenced = referenced;
        Ok(())
    }

    /// Attach key data to a node, turning it into an animation curve
    pub fn set_anim_curve(&mut self, node: &str, curve: AnimCurve) -> Result<()> {
        let entity = self.entity(self.require(node)?)?;
        self.world
            .insert_one(entity, curve)
            .map_err(|_| PlumbError::NodeNotFound(node.to_string()))
    }

    /// Add `node` to the object set `set`
    pub fn add_member(&mut self, set: &str, node: &str) -> Result<()> {
        let set_id = self.require(set)?;
        let node_id = self.require(node)?;
        let members = self.members.entry(set_id).or_default();
        if !members.contains(&node_id) {
            members.push(node_id);
        }
        Ok(())
    }

    /// Get node ID by name
    pub fn get_id(&self, node: &str) -> Option<NodeId> {
        let short = node.rsplit('|').next().unwrap_or(node);
        self.name_map.get(short).copied()
    }

    /// Current short name of a node
    pub fn name_of(&self, id: NodeId) -> Option<String> {
        self.info(id).map(|info| info.name.clone())
    }

    /// All node IDs in creation order
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.id_map.left_values().copied().collect();
        ids.sort();
        ids
    }

    /// Snapshot of a node's identity
    pub fn node_info(&self, id: NodeId) -> Option<NodeInfo> {
        self.info(id).map(|info| (*info).clone())
    }

    /// Snapshot of a node's attributes
    pub fn node_attributes(&self, id: NodeId) -> Option<Attributes> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world
            .get::<&Attributes>(*entity)
            .ok()
            .map(|attrs| (*attrs).clone())
    }

    /// Snapshot of a node's key data, if it is an animation curve
    pub fn node_curve(&self, id: NodeId) -> Option<AnimCurve> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world
            .get::<&AnimCurve>(*entity)
            .ok()
            .map(|curve| (*curve).clone())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn members_of(&self, id: NodeId) -> Vec<NodeId> {
        self.members.get(&id).cloned().unwrap_or_default()
    }

    /// Every connection in insertion order
    pub fn all_connections(&self) -> Vec<Connection> {
        self.connections
            .iter()
            .filter_map(|c| self.to_connection(c))
            .collect()
    }

    /// Get number of nodes
    pub fn node_count(&self) -> usize {
        self.name_map.len()
    }

    /// Clear the scene
    pub fn clear(&mut self) {
        self.world.clear();
        self.id_map.clear();
        self.name_map.clear();
        self.parents.clear();
        self.connections.clear();
        self.members.clear();
    }

    fn require(&self, node: &str) -> Result<NodeId> {
        self.get_id(node)
            .ok_or_else(|| PlumbError::NodeNotFound(node.to_string()))
    }

    fn entity(&self, id: NodeId) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| PlumbError::NodeNotFound(id.to_string()))
    }

    fn info(&self, id: NodeId) -> Option<hecs::Ref<'_, NodeInfo>> {
        let entity = self.id_map.get_by_left(&id)?;
        self.world.get::<&NodeInfo>(*entity).ok()
    }

    fn attributes(&self, node: &str) -> Result<hecs::Ref<'_, Attributes>> {
        let entity = self.entity(self.require(node)?)?;
        self.world
            .get::<&Attributes>(entity)
            .map_err(|_| PlumbError::NodeNotFound(node.to_string()))
    }

    fn attributes_mut(&mut self, node: &str) -> Result<&mut Attributes> {
        let entity = self.entity(self.require(node)?)?;
        self.world
            .query_one_mut::<&mut Attributes>(entity)
            .map_err(|_| PlumbError::NodeNotFound(node.to_string()))
    }

    fn curve_mut(&mut self, node: &str) -> Result<&mut AnimCurve> {
        let entity = self.entity(self.require(node)?)?;
        self.world
            .query_one_mut::<&mut AnimCurve>(entity)
            .map_err(|_| PlumbError::NotAnAnimCurve(node.to_string()))
    }

    fn key_mut(&mut self, node: &str, index: usize) -> Result<&mut crate::curve::Keyframe> {
        let curve = self.curve_mut(node)?;
        let count = curve.keys.len();
        curve
            .keys
            .get_mut(index)
            .ok_or_else(|| PlumbError::KeyIndexOutOfRange {
                curve: node.to_string(),
                index,
                count,
            })
    }

    fn long_name(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if let Some(name) = self.name_of(cid) {
                parts.push(name);
            }
            current = self.parents.get(&cid).copied();
        }
        parts.reverse();
        format!("|{}", parts.join("|"))
    }

    fn type_of(&self, id: NodeId) -> Option<String> {
        self.info(id).map(|info| info.node_type.clone())
    }

    fn to_connection(&self, stored: &StoredConnection) -> Option<Connection> {
        let source = self.name_of(stored.source)?;
        let destination = self.name_of(stored.destination)?;
        Some(Connection::new(
            PlugRef::new(source, stored.source_attr.clone()),
            PlugRef::new(destination, stored.destination_attr.clone()),
        ))
    }

    fn upstream_history(&self, node: &str) -> Result<Vec<NodeId>> {
        let start = self.require(node)?;
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut history = Vec::new();

        while let Some(id) = queue.pop_front() {
            history.push(id);
            for conn in self.connections.iter().filter(|c| c.destination == id) {
                if visited.insert(conn.source) {
                    queue.push_back(conn.source);
                }
            }
        }

        Ok(history)
    }

    fn delete_upstream(&mut self, node: &str, keep: &[&str]) -> Result<()> {
        let history = self.upstream_history(node)?;
        for id in history.into_iter().skip(1) {
            let node_type = match self.type_of(id) {
                Some(t) => t,
                None => continue, // already removed with an earlier node
            };
            if inherits(&node_type, "dagNode") || inherits_any(&node_type, keep) {
                continue;
            }
            if let Some(name) = self.name_of(id) {
                self.delete_node(&name)?;
            }
        }
        Ok(())
    }

    /// Value of a plug: the output of the curve driving it if there is one,
    /// otherwise the stored value
    fn evaluate(&self, plug: &PlugRef, depth: usize) -> Result<AttrValue> {
        let id = self.require(&plug.node)?;
        if depth < MAX_EVAL_DEPTH {
            if let Some(value) = self.curve_output(id, &plug.attr, depth)? {
                return Ok(AttrValue::Float(value));
            }
        }

        let attrs = self.attributes(&plug.node)?;
        attrs
            .get(&plug.attr)
            .map(|a| a.value.clone())
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))
    }

    fn curve_output(&self, id: NodeId, attr: &str, depth: usize) -> Result<Option<f64>> {
        let Some(driver) = self
            .connections
            .iter()
            .find(|c| c.destination == id && c.destination_attr == attr && c.source_attr == "output")
        else {
            return Ok(None);
        };
        let Some(curve) = self.node_curve(driver.source) else {
            return Ok(None);
        };

        // Set-driven curves read their input plug, the rest read time
        let input = match self
            .connections
            .iter()
            .find(|c| c.destination == driver.source && c.destination_attr == "input")
        {
            Some(input) => {
                let name = self
                    .name_of(input.source)
                    .ok_or_else(|| PlumbError::NodeNotFound(input.source.to_string()))?;
                let plug = PlugRef::new(name, input.source_attr.clone());
                let value = self.evaluate(&plug, depth + 1)?;
                as_f64(&value).ok_or_else(|| PlumbError::InvalidAttributeType {
                    plug: plug.to_string(),
                    expected: "number".to_string(),
                })?
            }
            None => self.time,
        };
        Ok(curve.evaluate(input))
    }

    /// `base` if free, otherwise `base` with its trailing digits replaced by
    /// the first free number
    fn unique_name(&self, base: &str) -> String {
        if !self.name_map.contains_key(base) {
            return base.to_string();
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        (1..)
            .map(|n| format!("{}{}", stem, n))
            .find(|candidate| !self.name_map.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn despawn(&mut self, id: NodeId) -> Result<()> {
        let entity = self.entity(id)?;
        if let Some(name) = self.name_of(id) {
            self.name_map.remove(&name);
        }

        self.world
            .despawn(entity)
            .map_err(|_| PlumbError::NodeNotFound(id.to_string()))?;

        self.id_map.remove_by_left(&id);
        self.parents.remove(&id);
        self.connections
            .retain(|c| c.source != id && c.destination != id);
        self.members.remove(&id);
        for members in self.members.values_mut() {
            members.retain(|m| *m != id);
        }

        Ok(())
    }
}

impl SceneGraph for MemoryScene {
    fn list_nodes(&self, filter: &NodeFilter) -> Vec<String> {
        self.node_ids()
            .into_iter()
            .filter(|id| match &filter.type_name {
                Some(type_name) => self
                    .type_of(*id)
                    .map(|t| inherits(&t, type_name))
                    .unwrap_or(false),
                None => true,
            })
            .filter_map(|id| {
                if filter.long_names {
                    Some(self.long_name(id))
                } else {
                    self.name_of(id)
                }
            })
            .collect()
    }

    fn exists(&self, node: &str) -> bool {
        self.get_id(node).is_some()
    }

    fn node_type(&self, node: &str) -> Result<String> {
        let id = self.require(node)?;
        self.type_of(id)
            .ok_or_else(|| PlumbError::NodeNotFound(node.to_string()))
    }

    fn is_a(&self, node: &str, type_name: &str) -> bool {
        self.get_id(node)
            .and_then(|id| self.type_of(id))
            .map(|t| inherits(&t, type_name))
            .unwrap_or(false)
    }

    fn is_referenced(&self, node: &str) -> bool {
        self.get_id(node)
            .and_then(|id| self.info(id).map(|info| info.referenced))
            .unwrap_or(false)
    }

    fn delete_node(&mut self, node: &str) -> Result<()> {
        let id = self.require(node)?;

        // Deleting a DAG node takes its children with it
        let mut doomed = vec![id];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i];
            let mut children: Vec<NodeId> = self
                .parents
                .iter()
                .filter(|(_, p)| **p == parent)
                .map(|(c, _)| *c)
                .collect();
            children.sort();
            doomed.extend(children);
            i += 1;
        }

        for id in doomed.into_iter().rev() {
            self.despawn(id)?;
        }
        Ok(())
    }

    fn rename_node(&mut self, node: &str, new_name: &str) -> Result<String> {
        let id = self.require(node)?;
        let old_name = self
            .name_of(id)
            .ok_or_else(|| PlumbError::NodeNotFound(node.to_string()))?;

        if old_name == new_name {
            return Ok(old_name);
        }
        let new_name = self.unique_name(new_name);

        let entity = self.entity(id)?;
        let info = self
            .world
            .query_one_mut::<&mut NodeInfo>(entity)
            .map_err(|_| PlumbError::NodeNotFound(node.to_string()))?;
        info.name = new_name.clone();

        self.name_map.remove(&old_name);
        self.name_map.insert(new_name.clone(), id);

        Ok(new_name)
    }

    fn has_attr(&self, plug: &PlugRef) -> bool {
        self.attributes(&plug.node)
            .map(|attrs| attrs.has(&plug.attr))
            .unwrap_or(false)
    }

    fn get_attr(&self, plug: &PlugRef) -> Result<AttrValue> {
        self.evaluate(plug, 0)
    }

    fn declare_attr(&mut self, plug: &PlugRef, value: AttrValue) -> Result<()> {
        let attrs = self.attributes_mut(&plug.node)?;
        if !attrs.has(&plug.attr) {
            attrs.set(plug.attr.clone(), value);
        }
        Ok(())
    }

    fn set_attr(&mut self, plug: &PlugRef, value: AttrValue) -> Result<()> {
        let attrs = self.attributes_mut(&plug.node)?;
        let attr = attrs
            .get_mut(&plug.attr)
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))?;
        if !attr.locked {
            attr.value = value;
        }
        Ok(())
    }

    fn is_locked(&self, plug: &PlugRef) -> Result<bool> {
        let attrs = self.attributes(&plug.node)?;
        attrs
            .get(&plug.attr)
            .map(|a| a.locked)
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))
    }

    fn set_locked(&mut self, plug: &PlugRef, locked: bool) -> Result<()> {
        let attrs = self.attributes_mut(&plug.node)?;
        let attr = attrs
            .get_mut(&plug.attr)
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))?;
        attr.locked = locked;
        Ok(())
    }

    fn is_keyable(&self, plug: &PlugRef) -> Result<bool> {
        let attrs = self.attributes(&plug.node)?;
        attrs
            .get(&plug.attr)
            .map(|a| a.keyable)
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))
    }

    fn set_keyable(&mut self, plug: &PlugRef, keyable: bool) -> Result<()> {
        let attrs = self.attributes_mut(&plug.node)?;
        let attr = attrs
            .get_mut(&plug.attr)
            .ok_or_else(|| PlumbError::AttributeNotFound(plug.to_string()))?;
        attr.keyable = keyable;
        Ok(())
    }

    fn list_attrs(&self, node: &str, keyable_only: bool) -> Result<Vec<String>> {
        let attrs = self.attributes(node)?;
        Ok(attrs
            .data
            .iter()
            .filter(|(_, a)| !keyable_only || a.keyable)
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn list_connections(
        &self,
        plug: &PlugRef,
        direction: Direction,
        type_filter: Option<&str>,
    ) -> Vec<Connection> {
        let id = match self.get_id(&plug.node) {
            Some(id) => id,
            None => return Vec::new(),
        };
        let name = match self.name_of(id) {
            Some(name) => name,
            None => return Vec::new(),
        };
        let query = plug.with_node(name.clone());

        self.connections
            .iter()
            .filter(|c| {
                let incoming = c.destination == id
                    && query.covers(&PlugRef::new(name.clone(), c.destination_attr.clone()));
                let outgoing = c.source == id
                    && query.covers(&PlugRef::new(name.clone(), c.source_attr.clone()));
                match direction {
                    Direction::Incoming => incoming,
                    Direction::Outgoing => outgoing,
                    Direction::Both => incoming || outgoing,
                }
            })
            .filter(|c| match type_filter {
                Some(type_name) => {
                    let far = if c.destination == id { c.source } else { c.destination };
                    self.type_of(far)
                        .map(|t| inherits(&t, type_name))
                        .unwrap_or(false)
                }
                None => true,
            })
            .filter_map(|c| self.to_connection(c))
            .collect()
    }

    fn connect(&mut self, source: &PlugRef, destination: &PlugRef) -> Result<()> {
        let source_id = self.require(&source.node)?;
        let destination_id = self.require(&destination.node)?;

        // A plug has a single input; connecting replaces it
        self.connections.retain(|c| {
            !(c.destination == destination_id && c.destination_attr == destination.attr)
        });

        self.connections.push(StoredConnection {
            source: source_id,
            source_attr: source.attr.clone(),
            destination: destination_id,
            destination_attr: destination.attr.clone(),
        });
        Ok(())
    }

    fn disconnect(&mut self, source: &PlugRef, destination: &PlugRef) -> Result<()> {
        let source_id = self.require(&source.node)?;
        let destination_id = self.require(&destination.node)?;

        let before = self.connections.len();
        self.connections.retain(|c| {
            !(c.source == source_id
                && c.source_attr == source.attr
                && c.destination == destination_id
                && c.destination_attr == destination.attr)
        });

        if self.connections.len() == before {
            return Err(PlumbError::ConnectionNotFound(format!(
                "{} -> {}",
                source, destination
            )));
        }
        Ok(())
    }

    fn list_history(&self, node: &str) -> Result<Vec<String>> {
        Ok(self
            .upstream_history(node)?
            .into_iter()
            .filter_map(|id| self.name_of(id))
            .collect())
    }

    fn parent(&self, node: &str) -> Option<String> {
        let id = self.get_id(node)?;
        self.parents.get(&id).and_then(|p| self.name_of(*p))
    }

    fn children(&self, node: &str) -> Vec<String> {
        let id = match self.get_id(node) {
            Some(id) => id,
            None => return Vec::new(),
        };
        let mut children: Vec<NodeId> = self
            .parents
            .iter()
            .filter(|(_, p)| **p == id)
            .map(|(c, _)| *c)
            .collect();
        children.sort();
        children.into_iter().filter_map(|c| self.name_of(c)).collect()
    }

    fn set_members(&self, set: &str) -> Result<Vec<String>> {
        let id = self.require(set)?;
        Ok(self
            .members_of(id)
            .into_iter()
            .filter_map(|m| self.name_of(m))
            .collect())
    }

    fn anim_curve(&self, node: &str) -> Result<AnimCurve> {
        let id = self.require(node)?;
        self.node_curve(id)
            .ok_or_else(|| PlumbError::NotAnAnimCurve(node.to_string()))
    }

    fn set_key_time(&mut self, node: &str, index: usize, time: f64) -> Result<()> {
        self.key_mut(node, index)?.time = time;
        Ok(())
    }

    fn cut_key(&mut self, node: &str, index: usize) -> Result<()> {
        let curve = self.curve_mut(node)?;
        if index >= curve.keys.len() {
            return Err(PlumbError::KeyIndexOutOfRange {
                curve: node.to_string(),
                index,
                count: curve.keys.len(),
            });
        }
        curve.keys.remove(index);
        Ok(())
    }

    fn set_key_locked(&mut self, node: &str, index: usize, locked: bool) -> Result<()> {
        self.key_mut(node, index)?.locked = locked;
        Ok(())
    }

    fn freeze_transform(&mut self, node: &str) -> Result<()> {
        let attrs = self.attributes_mut(node)?;
        let targets = TRANSLATE_ROTATE
            .iter()
            .map(|a| (*a, 0.0))
            .chain(SCALE.iter().map(|a| (*a, 1.0)));

        for (name, identity) in targets {
            if let Some(attr) = attrs.get_mut(name) {
                if !attr.locked {
                    attr.value = AttrValue::Float(identity);
                }
            }
        }
        Ok(())
    }

    fn delete_history(&mut self, node: &str) -> Result<()> {
        self.delete_upstream(node, &[])?;
        // DAG nodes survive, but their inputs into the shape are history too
        let id = self.require(node)?;
        self.connections.retain(|c| c.destination != id);
        Ok(())
    }

    fn bake_partial_history(&mut self, node: &str) -> Result<()> {
        self.delete_upstream(node, DEFORMER_CHAIN_TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Keyframe;

    fn plug(s: &str) -> PlugRef {
        PlugRef::parse(s).unwrap()
    }

    fn cube_scene() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_node("grp", "transform").unwrap();
        scene.add_node("pCube1", "transform").unwrap();
        scene.add_node("pCubeShape1", "mesh").unwrap();
        scene.set_parent("pCube1", "grp").unwrap();
        scene.set_parent("pCubeShape1", "pCube1").unwrap();
        scene
            .add_attr("pCube1", "translateX", AttrValue::Float(2.0))
            .unwrap();
        scene
            .add_attr("pCube1", "scaleX", AttrValue::Float(3.0))
            .unwrap();
        scene
    }

    #[test]
    fn test_add_and_lookup() {
        let scene = cube_scene();
        assert!(scene.exists("pCube1"));
        assert!(scene.exists("|grp|pCube1"));
        assert_eq!(scene.node_type("pCubeShape1").unwrap(), "mesh");
        assert!(scene.is_a("pCubeShape1", "shape"));
        assert_eq!(scene.node_count(), 3);
    }

    #[test]
    fn test_duplicate_name() {
        let mut scene = cube_scene();
        assert!(matches!(
            scene.add_node("pCube1", "transform"),
            Err(PlumbError::DuplicateNodeName(_))
        ));
    }

    #[test]
    fn test_list_nodes_by_type_and_long_names() {
        let scene = cube_scene();
        assert_eq!(
            scene.list_nodes(&NodeFilter::of_type("transform")),
            vec!["grp", "pCube1"]
        );
        assert_eq!(
            scene.list_nodes(&NodeFilter::of_type("mesh").long()),
            vec!["|grp|pCube1|pCubeShape1"]
        );
    }

    #[test]
    fn test_driven_attribute_reads_curve() {
        let mut scene = cube_scene();
        scene.add_node("curve1", "animCurveTL").unwrap();
        scene
            .set_anim_curve(
                "curve1",
                AnimCurve::new(vec![Keyframe::new(0.0, 5.0), Keyframe::new(10.0, 15.0)]),
            )
            .unwrap();
        scene
            .connect(&plug("curve1.output"), &plug("pCube1.translateX"))
            .unwrap();

        // Stored value is 2.0; the curve wins
        assert_eq!(
            scene.get_attr(&plug("pCube1.translateX")).unwrap(),
            AttrValue::Float(5.0)
        );
        scene.set_current_time(5.0);
        assert_eq!(
            scene.get_attr(&plug("pCube1.translateX")).unwrap(),
            AttrValue::Float(10.0)
        );

        // Undeclared attributes still read through the curve
        scene
            .connect(&plug("curve1.output"), &plug("pCube1.rotateY"))
            .unwrap();
        assert!(!scene.has_attr(&plug("pCube1.rotateY")));
        assert_eq!(
            scene.get_attr(&plug("pCube1.rotateY")).unwrap(),
            AttrValue::Float(10.0)
        );
    }

    #[test]
    fn test_set_driven_attribute_reads_driver() {
        let mut scene = cube_scene();
        scene.add_node("sdk1", "animCurveUL").unwrap();
        scene
            .set_anim_curve(
                "sdk1",
                AnimCurve::new(vec![Keyframe::new(0.0, 0.0), Keyframe::new(4.0, 1.0)]),
            )
            .unwrap();
        scene
            .connect(&plug("pCube1.translateX"), &plug("sdk1.input"))
            .unwrap();
        scene
            .connect(&plug("sdk1.output"), &plug("pCube1.scaleX"))
            .unwrap();

        // translateX = 2.0 sits halfway along the driver range
        assert_eq!(
            scene.get_attr(&plug("pCube1.scaleX")).unwrap(),
            AttrValue::Float(0.5)
        );
    }

    #[test]
    fn test_declare_attr_keeps_existing() {
        let mut scene = cube_scene();
        scene
            .declare_attr(&plug("pCube1.rotateY"), AttrValue::Float(45.0))
            .unwrap();
        scene
            .declare_attr(&plug("pCube1.translateX"), AttrValue::Float(9.0))
            .unwrap();
        assert_eq!(
            scene.get_attr(&plug("pCube1.rotateY")).unwrap(),
            AttrValue::Float(45.0)
        );
        assert_eq!(
            scene.get_attr(&plug("pCube1.translateX")).unwrap(),
            AttrValue::Float(2.0)
        );
    }

    #[test]
    fn test_locked_attribute_write_is_noop() {
        let mut scene = cube_scene();
        scene.set_locked(&plug("pCube1.translateX"), true).unwrap();
        scene
            .set_attr(&plug("pCube1.translateX"), AttrValue::Float(0.0))
            .unwrap();
        assert_eq!(
            scene.get_attr(&plug("pCube1.translateX")).unwrap(),
            AttrValue::Float(2.0)
        );
    }

    #[test]
    fn test_missing_attribute_errors() {
        let mut scene = cube_scene();
        assert!(matches!(
            scene.get_attr(&plug("pCube1.nope")),
            Err(PlumbError::AttributeNotFound(_))
        ));
        assert!(matches!(
            scene.set_attr(&plug("ghost.translateX"), AttrValue::Float(0.0)),
            Err(PlumbError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_connections_and_type_filter() {
        let mut scene = cube_scene();
        scene.add_node("curve1", "animCurveTL").unwrap();
        scene
            .connect(&plug("curve1.output"), &plug("pCube1.translateX"))
            .unwrap();

        let out = scene.list_connections(&plug("curve1.output"), Direction::Outgoing, None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].destination, plug("pCube1.translateX"));

        let typed = scene.list_connections(
            &plug("pCube1.translateX"),
            Direction::Incoming,
            Some("animCurve"),
        );
        assert_eq!(typed.len(), 1);

        let none = scene.list_connections(
            &plug("pCube1.translateX"),
            Direction::Incoming,
            Some("mesh"),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_connection_covers_array_elements() {
        let mut scene = MemoryScene::new();
        scene.add_node("layer1", "renderLayer").unwrap();
        scene.add_node("pCube1", "transform").unwrap();
        scene
            .connect(
                &plug("pCube1.instObjGroups[0]"),
                &plug("layer1.outAdjustments[0].outPlug"),
            )
            .unwrap();

        let found = scene.list_connections(
            &plug("layer1.outAdjustments"),
            Direction::Incoming,
            None,
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_delete_cascades_children_and_connections() {
        let mut scene = cube_scene();
        scene.add_node("curve1", "animCurveTL").unwrap();
        scene
            .connect(&plug("curve1.output"), &plug("pCube1.translateX"))
            .unwrap();

        scene.delete_node("grp").unwrap();

        assert!(!scene.exists("pCube1"));
        assert!(!scene.exists("pCubeShape1"));
        assert!(scene
            .list_connections(&plug("curve1.output"), Direction::Outgoing, None)
            .is_empty());
    }

    #[test]
    fn test_rename_clash_picks_free_suffix() {
        let mut scene = MemoryScene::new();
        for name in ["a:bodyShape", "b:bodyShape", "c:bodyShape", "bodyShape1"] {
            scene.add_node(name, "mesh").unwrap();
        }

        assert_eq!(scene.rename_node("a:bodyShape", "bodyShape").unwrap(), "bodyShape");
        assert_eq!(scene.rename_node("b:bodyShape", "bodyShape").unwrap(), "bodyShape2");
        assert_eq!(scene.rename_node("c:bodyShape", "bodyShape").unwrap(), "bodyShape3");
        assert!(scene.exists("bodyShape1"));
    }

    #[test]
    fn test_rename_keeps_connections() {
        let mut scene = cube_scene();
        scene.add_node("curve1", "animCurveTL").unwrap();
        scene
            .connect(&plug("curve1.output"), &plug("pCube1.translateX"))
            .unwrap();

        let name = scene.rename_node("pCube1", "box").unwrap();
        assert_eq!(name, "box");
        assert!(!scene.exists("pCube1"));

        let out = scene.list_connections(&plug("curve1.output"), Direction::Outgoing, None);
        assert_eq!(out[0].destination, plug("box.translateX"));
    }

    #[test]
    fn test_history_and_delete_history() {
        let mut scene = cube_scene();
        scene.add_node("polyExtrude1", "polyExtrudeFace").unwrap();
        scene.add_node("polyCube1", "polyCube").unwrap();
        scene.add_node("skin1", "skinCluster").unwrap();
        scene
            .connect(&plug("polyCube1.output"), &plug("polyExtrude1.inputPolymesh"))
            .unwrap();
        scene
            .connect(&plug("polyExtrude1.output"), &plug("skin1.input"))
            .unwrap();
        scene
            .connect(&plug("skin1.outputGeometry"), &plug("pCubeShape1.inMesh"))
            .unwrap();

        let history = scene.list_history("pCubeShape1").unwrap();
        assert_eq!(history, vec!["pCubeShape1", "skin1", "polyExtrude1", "polyCube1"]);

        scene.bake_partial_history("pCubeShape1").unwrap();
        assert!(scene.exists("skin1"));
        assert!(!scene.exists("polyExtrude1"));

        scene.delete_history("pCubeShape1").unwrap();
        assert_eq!(scene.list_history("pCubeShape1").unwrap(), vec!["pCubeShape1"]);
    }

    #[test]
    fn test_delete_history_keeps_dag_inputs_alive() {
        let mut scene = cube_scene();
        scene.add_node("railShape", "nurbsCurve").unwrap();
        scene
            .connect(&plug("railShape.worldSpace[0]"), &plug("pCubeShape1.inMesh"))
            .unwrap();

        scene.delete_history("pCubeShape1").unwrap();
        assert!(scene.exists("railShape"));
        assert_eq!(scene.list_history("pCubeShape1").unwrap(), vec!["pCubeShape1"]);
    }

    #[test]
    fn test_curve_key_edits() {
        let mut scene = MemoryScene::new();
        scene.add_node("curve1", "animCurveTU").unwrap();
        scene
            .set_anim_curve(
                "curve1",
                AnimCurve::new(vec![
                    Keyframe::new(0.0, 1.0),
                    Keyframe::new(1.5, 2.0),
                    Keyframe::new(3.0, 3.0),
                ]),
            )
            .unwrap();

        scene.set_key_time("curve1", 1, 2.0).unwrap();
        scene.cut_key("curve1", 0).unwrap();

        let curve = scene.anim_curve("curve1").unwrap();
        assert_eq!(curve.times(), vec![2.0, 3.0]);
        assert!(matches!(
            scene.cut_key("curve1", 5),
            Err(PlumbError::KeyIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_anim_curve_on_plain_node() {
        let scene = cube_scene();
        assert!(matches!(
            scene.anim_curve("pCube1"),
            Err(PlumbError::NotAnAnimCurve(_))
        ));
    }

    #[test]
    fn test_freeze_transform_skips_locked() {
        let mut scene = cube_scene();
        scene.set_locked(&plug("pCube1.scaleX"), true).unwrap();
        scene.freeze_transform("pCube1").unwrap();
        assert_eq!(
            scene.get_attr(&plug("pCube1.translateX")).unwrap(),
            AttrValue::Float(0.0)
        );
        assert_eq!(
            scene.get_attr(&plug("pCube1.scaleX")).unwrap(),
            AttrValue::Float(3.0)
        );
    }

    #[test]
    fn test_set_members() {
        let mut scene = cube_scene();
        scene.add_node("controls_SET", "objectSet").unwrap();
        scene.add_member("controls_SET", "pCube1").unwrap();
        assert_eq!(scene.set_members("controls_SET").unwrap(), vec!["pCube1"]);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut scene = cube_scene();
        assert!(scene.set_parent("grp", "pCubeShape1").is_err());
    }
}
