// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point to axis-aligned box distance queries.
//!
//! Front clip plane placement needs the distance from the eye to the closest
//! surface of nearby objects. A bounding-sphere approximation overestimates
//! that distance for long thin boxes such as walls, so the distance here is
//! exact: the space around a box splits into 27 regions (inside, 6 faces,
//! 12 edges, 8 vertices) and each has its own closed form.

use nalgebra::Point3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box from mesh bounds as returned by [`Mesh::bounds`](crate::Mesh::bounds)
    pub fn from_f32(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self {
            min: Point3::new(min.x as f64, min.y as f64, min.z as f64),
            max: Point3::new(max.x as f64, max.y as f64, max.z as f64),
        }
    }

    #[inline]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}

/// Where a point lies relative to a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxRegion {
    Inside,
    /// Outside along exactly one axis: nearest feature is a face
    Face,
    /// Outside along two axes: nearest feature is an edge
    Edge,
    /// Outside along all three axes: nearest feature is a corner
    Vertex,
}

/// Signed offset of `value` outside `[min, max]` along one axis, 0 when within.
#[inline]
fn axis_excess(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// Classify the point into the inside/face/edge/vertex region of the box.
pub fn classify_point(point: &Point3<f64>, bbox: &Aabb) -> BoxRegion {
    let outside_axes = (0..3)
        .filter(|&axis| axis_excess(point[axis], bbox.min[axis], bbox.max[axis]) > 0.0)
        .count();
    match outside_axes {
        0 => BoxRegion::Inside,
        1 => BoxRegion::Face,
        2 => BoxRegion::Edge,
        _ => BoxRegion::Vertex,
    }
}

/// Exact Euclidean distance from `point` to the nearest surface of `bbox`.
///
/// For a point inside the box this is the distance to the closest face.
pub fn nearest_distance_point_to_box(point: &Point3<f64>, bbox: &Aabb) -> f64 {
    let excess = [
        axis_excess(point.x, bbox.min.x, bbox.max.x),
        axis_excess(point.y, bbox.min.y, bbox.max.y),
        axis_excess(point.z, bbox.min.z, bbox.max.z),
    ];

    match classify_point(point, bbox) {
        BoxRegion::Inside => (0..3)
            .map(|axis| {
                (point[axis] - bbox.min[axis]).min(bbox.max[axis] - point[axis])
            })
            .fold(f64::MAX, f64::min),
        // Only one excess is non-zero: perpendicular distance to the face plane
        BoxRegion::Face => excess.iter().fold(0.0, |acc: f64, e| acc.max(*e)),
        // Distance to the edge line in the plane of the two outside axes
        BoxRegion::Edge => {
            let mut outside = excess.iter().filter(|e| **e > 0.0);
            let a = outside.next().copied().unwrap_or(0.0);
            let b = outside.next().copied().unwrap_or(0.0);
            a.hypot(b)
        }
        BoxRegion::Vertex => {
            (excess[0] * excess[0] + excess[1] * excess[1] + excess[2] * excess[2]).sqrt()
        }
    }
}
