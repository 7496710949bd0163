// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar regions produced by footprint boolean operations.

use crate::bool2d::{compute_signed_area, contour_bounds, ensure_ccw, point_in_contour};
use crate::profile::Profile2D;
use nalgebra::Point2;

/// A set of disjoint shapes in the floor plane.
///
/// Every shape's outer contour winds counter-clockwise and its holes wind
/// clockwise, so the winding of a contour alone tells whether it bounds
/// filled space from the outside or encloses empty space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    shapes: Vec<Profile2D>,
}

impl Region {
    /// The empty region
    pub fn empty() -> Self {
        Self::default()
    }

    /// Region covered by one simple polygon
    pub fn from_polygon(points: Vec<Point2<f64>>) -> Self {
        if points.len() < 3 {
            return Self::empty();
        }
        Self {
            shapes: vec![Profile2D::new(ensure_ccw(&points))],
        }
    }

    pub(crate) fn from_shapes(shapes: Vec<Profile2D>) -> Self {
        Self { shapes }
    }

    pub fn shapes(&self) -> &[Profile2D] {
        &self.shapes
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Filled area (outer contours minus holes)
    pub fn area(&self) -> f64 {
        self.shapes
            .iter()
            .map(Profile2D::area)
            .sum()
    }

    /// Whether the point lies inside a shape and outside all of its holes.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let point = Point2::new(x, y);
        self.shapes.iter().any(|shape| {
            point_in_contour(&point, &shape.outer)
                && !shape.holes.iter().any(|hole| point_in_contour(&point, hole))
        })
    }

    /// Every contour of the region, outer boundaries and holes alike.
    pub fn contours(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        self.shapes.iter().flat_map(|shape| {
            std::iter::once(shape.outer.as_slice()).chain(shape.holes.iter().map(Vec::as_slice))
        })
    }

    /// Contours winding counter-clockwise: the outward boundaries.
    pub fn outer_contours(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        self.contours().filter(|c| compute_signed_area(c) > 0.0)
    }

    /// Contours winding clockwise: boundaries of enclosed empty space.
    pub fn hole_contours(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        self.contours().filter(|c| compute_signed_area(c) < 0.0)
    }

    /// The region with every hole filled in.
    pub fn filled(&self) -> Region {
        Region {
            shapes: self
                .outer_contours()
                .map(|c| Profile2D::new(c.to_vec()))
                .collect(),
        }
    }

    /// Bounding box over all outer contours
    pub fn bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        self.shapes
            .iter()
            .filter_map(|shape| contour_bounds(&shape.outer))
            .reduce(|(a_min, a_max), (b_min, b_max)| {
                (
                    Point2::new(a_min.x.min(b_min.x), a_min.y.min(b_min.y)),
                    Point2::new(a_max.x.max(b_max.x), a_max.y.max(b_max.y)),
                )
            })
    }
}

/// Free-function form of [`Region::contains_point`].
#[inline]
pub fn contains_point(region: &Region, x: f64, y: f64) -> bool {
    region.contains_point(x, y)
}
