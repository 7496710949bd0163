// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-backed scene graph.
//!
//! Nodes live in a `SlotMap` and form a tree under one root. Meshes are
//! expressed in world coordinates, so a node carries no transform: moving a
//! model object rebuilds its meshes. Light nodes carry an optional scope,
//! the set of nodes they illuminate; `None` means the whole scene.

use std::sync::Arc;

use planview_core::{ObjectKind, WallPart};
use planview_geometry::{Aabb, Mesh};
use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{Error, Result};

new_key_type! {
    /// Key for a scene node.
    pub struct NodeKey;
}

/// What a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Root,
    /// Top node of a model object's subtree
    Object(ObjectKind),
    WallPart(WallPart),
    RoomFloor,
    RoomCeiling,
    /// Box of one piece inside a furniture or light subtree
    PieceBox,
    PolylineStrip,
    /// Light added by the view itself, not backed by a model object
    DefaultLight,
    Shadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightSourceKind {
    Ambient,
    Point,
    Directional,
}

/// Light emitted by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    pub kind: LightSourceKind,
    pub color: u32,
    pub power: f64,
    /// Nodes the light illuminates, `None` for the whole scene
    pub scope: Option<FxHashSet<NodeKey>>,
}

impl LightSource {
    pub fn new(kind: LightSourceKind, color: u32) -> Self {
        Self {
            kind,
            color,
            power: 1.0,
            scope: None,
        }
    }
}

/// Surface attributes of a node's mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Appearance {
    pub color: Option<u32>,
    pub texture: Option<String>,
    /// Texture named by the model but not applied yet
    pub texture_deferred: bool,
    pub shininess: f64,
    /// 0 for opaque surfaces
    pub transparency: f64,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub role: NodeRole,
    pub parent: Option<NodeKey>,
    pub children: SmallVec<[NodeKey; 6]>,
    pub mesh: Option<Arc<Mesh>>,
    pub visible: bool,
    pub appearance: Appearance,
    pub light: Option<LightSource>,
}

impl SceneNode {
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            parent: None,
            children: SmallVec::new(),
            mesh: None,
            visible: true,
            appearance: Appearance::default(),
            light: None,
        }
    }
}

/// The scene owned by one view.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(NodeRole::Root));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, node: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    pub fn get_mut(&mut self, node: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node)
    }

    pub fn contains(&self, node: NodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    /// Creates a detached node
    pub fn create_node(&mut self, node: SceneNode) -> NodeKey {
        self.nodes.insert(SceneNode {
            parent: None,
            ..node
        })
    }

    /// Creates a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeKey, node: SceneNode) -> Result<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let child = self.create_node(node);
        self.attach(child, parent)?;
        Ok(child)
    }

    /// Moves `node` under `parent`, detaching it from its previous parent
    pub fn attach(&mut self, node: NodeKey, parent: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(Error::NodeNotFound(node));
        }
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        self.detach(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlinks `node` from its parent; the subtree stays in the arena.
    pub fn detach(&mut self, node: NodeKey) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
    }

    /// Whether the node hangs, directly or not, under the root
    pub fn is_attached(&self, node: NodeKey) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// The node and every node below it, parents before children
    pub fn subtree(&self, node: NodeKey) -> Vec<NodeKey> {
        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(n) = self.nodes.get(current) else {
                continue;
            };
            result.push(current);
            stack.extend(n.children.iter().rev().copied());
        }
        result
    }

    /// Detaches and deletes a node with all its descendants
    pub fn destroy_subtree(&mut self, node: NodeKey) {
        if node == self.root {
            return;
        }
        self.detach(node);
        for key in self.subtree(node) {
            self.nodes.remove(key);
        }
    }

    /// Deletes every child of `node`, keeping the node itself
    pub fn clear_children(&mut self, node: NodeKey) {
        let children: SmallVec<[NodeKey; 6]> = match self.nodes.get(node) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            self.destroy_subtree(child);
        }
    }

    pub fn children(&self, node: NodeKey) -> &[NodeKey] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.nodes.get(node)?.parent
    }

    /// Visible along the whole path up to the root
    pub fn is_effectively_visible(&self, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            match self.nodes.get(key) {
                Some(n) if n.visible => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    /// Bounds of every mesh in the subtree
    pub fn bounds(&self, node: NodeKey) -> Option<Aabb> {
        self.subtree(node)
            .into_iter()
            .filter_map(|key| self.nodes.get(key)?.mesh.as_ref().filter(|m| !m.is_empty()))
            .map(|mesh| {
                let (min, max) = mesh.bounds();
                Aabb::from_f32(min, max)
            })
            .reduce(|a, b| {
                Aabb::new(
                    a.min.inf(&b.min),
                    a.max.sup(&b.max),
                )
            })
    }

    /// Scope of a light node, `None` when unscoped or not a light
    pub fn light_scope(&self, light: NodeKey) -> Option<&FxHashSet<NodeKey>> {
        self.nodes.get(light)?.light.as_ref()?.scope.as_ref()
    }

    pub(crate) fn set_light_scope(&mut self, light: NodeKey, scope: Option<FxHashSet<NodeKey>>) {
        if let Some(source) = self.nodes.get_mut(light).and_then(|n| n.light.as_mut()) {
            source.scope = scope;
        }
    }

    pub(crate) fn light_scope_mut(&mut self, light: NodeKey) -> Option<&mut FxHashSet<NodeKey>> {
        self.nodes.get_mut(light)?.light.as_mut()?.scope.as_mut()
    }

    /// Every node emitting light, in arena order
    pub fn lights(&self) -> impl Iterator<Item = (NodeKey, &LightSource)> + '_ {
        self.nodes
            .iter()
            .filter_map(|(key, node)| node.light.as_ref().map(|l| (key, l)))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    #[test]
    fn attach_and_detach_track_parent_links() {
        let mut scene = SceneGraph::new();
        let node = scene.create_node(SceneNode::new(NodeRole::PieceBox));
        assert!(!scene.is_attached(node));

        scene.attach(node, scene.root()).unwrap();
        assert!(scene.is_attached(node));
        assert_eq!(scene.children(scene.root()), &[node]);

        // Re-attaching to the same parent keeps a single link
        scene.attach(node, scene.root()).unwrap();
        assert_eq!(scene.children(scene.root()).len(), 1);

        scene.detach(node);
        assert!(!scene.is_attached(node));
        assert!(scene.children(scene.root()).is_empty());
        assert!(scene.contains(node));
    }

    #[test]
    fn attach_moves_between_parents() {
        let mut scene = SceneGraph::new();
        let a = scene.add_child(scene.root(), SceneNode::new(NodeRole::PieceBox)).unwrap();
        let b = scene.add_child(scene.root(), SceneNode::new(NodeRole::PieceBox)).unwrap();
        let leaf = scene.add_child(a, SceneNode::new(NodeRole::PieceBox)).unwrap();

        scene.attach(leaf, b).unwrap();
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[leaf]);
        assert_eq!(scene.parent(leaf), Some(b));
    }

    #[test]
    fn destroy_subtree_removes_descendants() {
        let mut scene = SceneGraph::new();
        let top = scene.add_child(scene.root(), SceneNode::new(NodeRole::Object(ObjectKind::Wall))).unwrap();
        for part in WallPart::ALL {
            scene.add_child(top, SceneNode::new(NodeRole::WallPart(part))).unwrap();
        }
        assert_eq!(scene.len(), 8);
        assert_eq!(scene.subtree(top).len(), 7);

        scene.destroy_subtree(top);
        assert_eq!(scene.len(), 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn visibility_is_inherited() {
        let mut scene = SceneGraph::new();
        let top = scene.add_child(scene.root(), SceneNode::new(NodeRole::PieceBox)).unwrap();
        let leaf = scene.add_child(top, SceneNode::new(NodeRole::PieceBox)).unwrap();
        assert!(scene.is_effectively_visible(leaf));
        scene.get_mut(top).unwrap().visible = false;
        assert!(!scene.is_effectively_visible(leaf));
    }

    #[test]
    fn bounds_cover_child_meshes() {
        let mut scene = SceneGraph::new();
        let top = scene.add_child(scene.root(), SceneNode::new(NodeRole::PieceBox)).unwrap();
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(-1.0, 0.0, 0.0), Vector3::z());
        mesh.add_vertex(Point3::new(2.0, 3.0, 4.0), Vector3::z());
        let leaf = scene.add_child(top, SceneNode::new(NodeRole::PieceBox)).unwrap();
        scene.get_mut(leaf).unwrap().mesh = Some(Arc::new(mesh));

        let bounds = scene.bounds(top).unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(2.0, 3.0, 4.0));
    }
}
