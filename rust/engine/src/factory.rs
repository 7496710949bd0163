// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene node construction for model objects.
//!
//! A [`NodeFactory`] turns a model object into a small subtree: one object
//! node carrying visibility (and light emission for lights) with one child
//! per logical part carrying a mesh. [`MeshNodeFactory`] is the default
//! implementation; it builds world-space meshes by triangulation and
//! extrusion and shares identical meshes through a [`MeshCache`].

mod piece;
mod room;
mod wall;

use planview_core::{Home, LightKind, ModelObject, ObjectKey};
use planview_geometry::{Mesh, Point2};
use smallvec::SmallVec;

use crate::cache::{CacheStats, MeshCache};
use crate::canvas::RenderCapabilities;
use crate::error::{Error, Result};
use crate::scene::{Appearance, LightSource, LightSourceKind, NodeKey, NodeRole, SceneGraph, SceneNode};

/// Options fixed for the lifetime of a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Build nodes with their final appearance instead of deferring
    /// resource-backed attributes such as textures
    pub wait_for_resources: bool,
    pub capabilities: RenderCapabilities,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            wait_for_resources: false,
            capabilities: RenderCapabilities::FULL,
        }
    }
}

/// Outcome of [`NodeFactory::update_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeUpdate {
    /// Same part nodes, new meshes or attributes
    Updated,
    /// Part nodes were replaced; anything referring to them is stale
    PartsChanged,
}

/// Builds and refreshes the scene subtree of model objects.
pub trait NodeFactory {
    /// Creates the detached subtree of `key` and returns its top node
    fn create_node(
        &mut self,
        home: &Home,
        key: ObjectKey,
        scene: &mut SceneGraph,
        options: &BuildOptions,
    ) -> Result<NodeKey>;

    /// Brings the subtree under `node` up to date with the model
    fn update_node(
        &mut self,
        home: &Home,
        key: ObjectKey,
        node: NodeKey,
        scene: &mut SceneGraph,
        options: &BuildOptions,
    ) -> Result<NodeUpdate>;

    /// Footprint of a single piece on the floor, rotation applied.
    ///
    /// `None` for groups and for objects that cast no floor shadow.
    fn floor_footprint(&self, home: &Home, key: ObjectKey) -> Option<Vec<Point2<f64>>>;

    /// Releases shared resources
    fn dispose(&mut self) {}
}

/// One child node of an object subtree, before its mesh is shared.
#[derive(Debug)]
pub(crate) struct PartSpec {
    pub role: NodeRole,
    pub mesh: planview_geometry::Result<Mesh>,
    pub visible: bool,
    pub color: Option<u32>,
    pub texture: Option<String>,
    pub shininess: f64,
}

impl PartSpec {
    pub fn new(role: NodeRole, mesh: planview_geometry::Result<Mesh>) -> Self {
        Self {
            role,
            mesh,
            visible: true,
            color: None,
            texture: None,
            shininess: 0.0,
        }
    }

    pub fn with_color(mut self, color: Option<u32>) -> Self {
        self.color = color;
        self
    }
}

/// Default factory producing triangle meshes.
#[derive(Debug)]
pub struct MeshNodeFactory {
    cache: MeshCache,
}

impl MeshNodeFactory {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: MeshCache::new(cache_capacity),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cached_meshes(&self) -> usize {
        self.cache.len()
    }

    fn parts(home: &Home, key: ObjectKey, object: &ModelObject) -> Vec<PartSpec> {
        let elevation = home.level_elevation(key);
        match object {
            ModelObject::Wall(w) => wall::wall_parts(home, w, elevation),
            ModelObject::Room(r) => {
                let ceiling = home.level_of(key).map_or(room::DEFAULT_CEILING_HEIGHT, |l| l.height);
                room::room_parts(r, elevation, elevation + ceiling)
            }
            ModelObject::Furniture(_) | ModelObject::Light(_) => {
                piece::piece_parts(home, key, elevation)
            }
            ModelObject::Polyline(p) => piece::polyline_parts(p, elevation),
            ModelObject::Label(_) | ModelObject::Level(_) | ModelObject::Camera(_) => Vec::new(),
        }
    }

    /// Writes a part's mesh and surface into `node`
    fn apply_part(
        &mut self,
        scene: &mut SceneGraph,
        node: NodeKey,
        key: ObjectKey,
        part: PartSpec,
        options: &BuildOptions,
    ) {
        let mesh = match part.mesh {
            Ok(mesh) => mesh,
            Err(error) => {
                tracing::warn!(?key, role = ?part.role, %error, "mesh generation failed, using placeholder");
                Mesh::new()
            }
        };
        let mesh = self.cache.intern(mesh);
        let texture = part
            .texture
            .filter(|_| options.capabilities.supports_textures);
        let Some(target) = scene.get_mut(node) else {
            return;
        };
        target.mesh = Some(mesh);
        target.visible = part.visible;
        target.appearance = Appearance {
            color: part.color,
            texture_deferred: texture.is_some() && !options.wait_for_resources,
            texture,
            shininess: part.shininess,
            transparency: target.appearance.transparency,
        };
    }

    /// Visibility and light emission of the object node itself
    fn apply_object_state(home: &Home, key: ObjectKey, object: &ModelObject, node: &mut SceneNode) {
        node.visible = home.is_shown(key);
        if let ModelObject::Light(light) = object {
            let kind = match light.kind {
                LightKind::Point => LightSourceKind::Point,
                LightKind::Directional => LightSourceKind::Directional,
            };
            let color = light.piece.color.unwrap_or(0xFF_FF_FF);
            match node.light.as_mut() {
                // Keep the scope computed for this node
                Some(source) => {
                    source.kind = kind;
                    source.color = color;
                    source.power = light.power;
                }
                None => {
                    let mut source = LightSource::new(kind, color);
                    source.power = light.power;
                    node.light = Some(source);
                }
            }
        }
    }

    fn add_parts(
        &mut self,
        scene: &mut SceneGraph,
        node: NodeKey,
        key: ObjectKey,
        parts: Vec<PartSpec>,
        options: &BuildOptions,
    ) -> Result<()> {
        for part in parts {
            let child = scene.add_child(node, SceneNode::new(part.role))?;
            self.apply_part(scene, child, key, part, options);
        }
        Ok(())
    }
}

impl Default for MeshNodeFactory {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl NodeFactory for MeshNodeFactory {
    fn create_node(
        &mut self,
        home: &Home,
        key: ObjectKey,
        scene: &mut SceneGraph,
        options: &BuildOptions,
    ) -> Result<NodeKey> {
        let object = home.get(key).ok_or(planview_core::Error::NotFound(key))?;
        let kind = object.kind();
        if !kind.has_node() {
            return Err(Error::NoSceneNode(kind));
        }

        let mut top = SceneNode::new(NodeRole::Object(kind));
        Self::apply_object_state(home, key, object, &mut top);
        let node = scene.create_node(top);
        let parts = Self::parts(home, key, object);
        self.add_parts(scene, node, key, parts, options)?;
        tracing::trace!(?key, %kind, parts = scene.children(node).len(), "node created");
        Ok(node)
    }

    fn update_node(
        &mut self,
        home: &Home,
        key: ObjectKey,
        node: NodeKey,
        scene: &mut SceneGraph,
        options: &BuildOptions,
    ) -> Result<NodeUpdate> {
        let object = home.get(key).ok_or(planview_core::Error::NotFound(key))?;
        let top = scene.get_mut(node).ok_or(Error::NodeNotFound(node))?;
        Self::apply_object_state(home, key, object, top);

        let parts = Self::parts(home, key, object);
        let children: SmallVec<[NodeKey; 6]> = scene.children(node).iter().copied().collect();
        let same_layout = children.len() == parts.len()
            && children
                .iter()
                .zip(&parts)
                .all(|(child, part)| scene.get(*child).map(|n| n.role) == Some(part.role));

        if same_layout {
            for (child, part) in children.into_iter().zip(parts) {
                self.apply_part(scene, child, key, part, options);
            }
            Ok(NodeUpdate::Updated)
        } else {
            scene.clear_children(node);
            self.add_parts(scene, node, key, parts, options)?;
            tracing::debug!(?key, parts = scene.children(node).len(), "node parts rebuilt");
            Ok(NodeUpdate::PartsChanged)
        }
    }

    fn floor_footprint(&self, home: &Home, key: ObjectKey) -> Option<Vec<Point2<f64>>> {
        match home.get(key)? {
            ModelObject::Furniture(f) if !f.is_group() => Some(f.piece.points()),
            _ => None,
        }
    }

    fn dispose(&mut self) {
        self.cache.dispose();
    }
}
