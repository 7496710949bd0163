// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint triangulation backed by earcutr.

use crate::{Error, Point2, Result};

/// Triangles covering a contour and its holes
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Outer contour points followed by the points of every kept hole
    pub points: Vec<Point2<f64>>,
    /// Counter-clockwise triangles, three indices into `points` each
    pub indices: Vec<usize>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Sum of the triangle areas
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| doubled_area(&self.points[t[0]], &self.points[t[1]], &self.points[t[2]]) / 2.0)
            .sum()
    }
}

#[inline]
fn doubled_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Triangulates `outer` minus `holes`.
///
/// Holes with fewer than three points are ignored. Output triangles are
/// counter-clockwise whatever the winding of the input contours.
pub fn triangulate(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Triangulation> {
    if outer.len() < 3 {
        return Err(Error::TooFewPoints {
            needed: 3,
            got: outer.len(),
        });
    }

    let kept = holes.iter().filter(|h| h.len() >= 3);
    let mut points: Vec<Point2<f64>> = outer.to_vec();
    let mut hole_starts = Vec::new();
    for hole in kept {
        hole_starts.push(points.len());
        points.extend_from_slice(hole);
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let mut indices = earcutr::earcut(&flat, &hole_starts, 2)
        .map_err(|e| Error::Triangulation(format!("{e:?}")))?;

    for triangle in indices.chunks_exact_mut(3) {
        if doubled_area(&points[triangle[0]], &points[triangle[1]], &points[triangle[2]]) < 0.0 {
            triangle.swap(1, 2);
        }
    }
    Ok(Triangulation { points, indices })
}
