// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single connected footprint shapes

use crate::bool2d::compute_signed_area;
use crate::error::Result;
use crate::triangulation::{triangulate, Triangulation};
use nalgebra::Point2;

/// 2D Profile with optional holes
///
/// One profile is one connected shape of a [`Region`](crate::Region): an
/// outer boundary and the holes punched into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Vec<Point2<f64>>,
    /// Holes (clockwise)
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Triangulate the profile, holes left open
    pub fn triangulate(&self) -> Result<Triangulation> {
        triangulate(&self.outer, &self.holes)
    }

    /// Enclosed area, holes subtracted
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| compute_signed_area(h).abs()).sum();
        compute_signed_area(&self.outer).abs() - holes
    }
}

/// Create an axis-aligned rectangular profile spanning `min`..`max`
#[inline]
pub fn create_rectangle(min: Point2<f64>, max: Point2<f64>) -> Profile2D {
    Profile2D::new(vec![
        Point2::new(min.x, min.y),
        Point2::new(max.x, min.y),
        Point2::new(max.x, max.y),
        Point2::new(min.x, max.y),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_profile() {
        let profile = create_rectangle(Point2::new(-5.0, -2.5), Point2::new(5.0, 2.5));
        assert_eq!(profile.outer.len(), 4);
        assert!(profile.holes.is_empty());
        assert_eq!(profile.outer[2], Point2::new(5.0, 2.5));
    }

    #[test]
    fn test_ring_area() {
        let mut profile = create_rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        profile.add_hole(create_rectangle(Point2::new(4.0, 4.0), Point2::new(6.0, 6.0)).outer);
        assert_eq!(profile.area(), 96.0);
    }

    #[test]
    fn test_triangulate_with_hole() {
        let mut profile = create_rectangle(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        profile.add_hole(vec![
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 6.0),
            Point2::new(6.0, 6.0),
            Point2::new(6.0, 4.0),
        ]);

        let triangulation = profile.triangulate().unwrap();
        assert_eq!(triangulation.points.len(), 8);
        // A square ring triangulates into 8 triangles
        assert_eq!(triangulation.indices.len(), 24);
    }

    #[test]
    fn test_degenerate_profile_rejected() {
        let profile = Profile2D::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        assert!(profile.triangulate().is_err());
    }
}
