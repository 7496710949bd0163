// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rendering surface abstraction.
//!
//! The view only needs a canvas to accept its scene root, report what it
//! can render and answer picking queries. [`PlanCanvas`] is a headless
//! implementation looking straight down at the floor plan.

use planview_geometry::Point3;

use crate::scene::{NodeKey, SceneGraph};

/// What the rendering backend supports, resolved once per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCapabilities {
    pub supports_3d: bool,
    pub supports_textures: bool,
    pub supports_transparency: bool,
}

impl RenderCapabilities {
    pub const FULL: RenderCapabilities = RenderCapabilities {
        supports_3d: true,
        supports_textures: true,
        supports_transparency: true,
    };

    pub const NONE: RenderCapabilities = RenderCapabilities {
        supports_3d: false,
        supports_textures: false,
        supports_transparency: false,
    };

    /// Whether a view can be built on this backend
    pub fn is_usable(&self) -> bool {
        self.supports_3d
    }
}

/// A surface displaying one scene.
pub trait Canvas {
    fn capabilities(&self) -> RenderCapabilities;

    fn attach(&mut self, root: NodeKey);

    fn detach(&mut self, root: NodeKey);

    /// Node drawn at canvas coordinates `(x, y)`, if any
    fn pick(&self, scene: &SceneGraph, x: f64, y: f64) -> Option<NodeKey>;
}

/// Headless top-down canvas.
///
/// Canvas coordinates are floor plan coordinates; picking returns the
/// highest visible mesh node under the point.
#[derive(Debug, Clone)]
pub struct PlanCanvas {
    capabilities: RenderCapabilities,
    root: Option<NodeKey>,
}

impl PlanCanvas {
    pub fn new() -> Self {
        Self::with_capabilities(RenderCapabilities::FULL)
    }

    pub fn with_capabilities(capabilities: RenderCapabilities) -> Self {
        Self {
            capabilities,
            root: None,
        }
    }

    pub fn attached_root(&self) -> Option<NodeKey> {
        self.root
    }
}

impl Default for PlanCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for PlanCanvas {
    fn capabilities(&self) -> RenderCapabilities {
        self.capabilities
    }

    fn attach(&mut self, root: NodeKey) {
        self.root = Some(root);
    }

    fn detach(&mut self, root: NodeKey) {
        if self.root == Some(root) {
            self.root = None;
        }
    }

    fn pick(&self, scene: &SceneGraph, x: f64, y: f64) -> Option<NodeKey> {
        let root = self.root?;
        let mut best: Option<(NodeKey, f64)> = None;
        for key in scene.subtree(root) {
            let Some(mesh) = scene.get(key).and_then(|n| n.mesh.as_ref()) else {
                continue;
            };
            if !scene.is_effectively_visible(key) {
                continue;
            }
            for triangle in mesh.triangles() {
                if let Some(z) = height_above(&triangle, x, y) {
                    if best.map_or(true, |(_, top)| z > top) {
                        best = Some((key, z));
                    }
                }
            }
        }
        best.map(|(key, _)| key)
    }
}

/// Height of the triangle at `(x, y)` when the point falls inside its
/// projection on the floor plane.
fn height_above(triangle: &[Point3<f32>; 3], x: f64, y: f64) -> Option<f64> {
    let [a, b, c] = triangle.map(|p| (p.x as f64, p.y as f64, p.z as f64));
    let det = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
    // Vertical faces project to a segment
    if det.abs() < 1e-12 {
        return None;
    }
    let l1 = ((b.1 - c.1) * (x - c.0) + (c.0 - b.0) * (y - c.1)) / det;
    let l2 = ((c.1 - a.1) * (x - c.0) + (a.0 - c.0) * (y - c.1)) / det;
    let l3 = 1.0 - l1 - l2;
    let eps = -1e-9;
    if l1 < eps || l2 < eps || l3 < eps {
        return None;
    }
    Some(l1 * a.2 + l2 * b.2 + l3 * c.2)
}
