// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle meshes in floor plan space.
//!
//! Positions and normals are stored as flat `f32` triples ready for upload;
//! geometry is computed in `f64` and narrowed when a vertex is added.

use nalgebra::{Point3, Vector3};
use std::hash::{Hash, Hasher};

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions
            .extend_from_slice(&[position.x as f32, position.y as f32, position.z as f32]);
        self.normals
            .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a planar quad given in counter-clockwise order seen from `normal`
    pub fn add_quad(&mut self, corners: [Point3<f64>; 4], normal: Vector3<f64>) {
        let base = self.vertex_count() as u32;
        for corner in corners {
            self.add_vertex(corner, normal);
        }
        self.add_triangle(base, base + 1, base + 2);
        self.add_triangle(base, base + 2, base + 3);
    }

    /// Appends `other`, rebasing its indices
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, both at the origin when empty
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let mut corners = self
            .positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0], p[1], p[2]));
        let Some(first) = corners.next() else {
            return (Point3::origin(), Point3::origin());
        };
        corners.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        })
    }

    /// Iterate over the triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            let vertex = |i: u32| {
                let at = i as usize * 3;
                Point3::new(
                    self.positions[at],
                    self.positions[at + 1],
                    self.positions[at + 2],
                )
            };
            [vertex(tri[0]), vertex(tri[1]), vertex(tri[2])]
        })
    }

    /// Hash of positions and indices.
    ///
    /// Equal meshes hash equally; distinct meshes may collide, so callers
    /// deduplicating by hash must still compare.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.positions.len().hash(&mut hasher);
        self.indices.hash(&mut hasher);
        for value in self.positions.iter().chain(&self.normals) {
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}
