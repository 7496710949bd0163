// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations over floor-plan footprints
//!
//! This module provides polygon set operations using the i_overlay crate.
//! Footprints of walls, rooms and furniture are closed point sequences; their
//! unions and differences come back as a [`Region`], a list of shapes each made
//! of one counter-clockwise outer contour and clockwise holes.
//!
//! All operations use the non-zero fill rule on orientation-normalized input,
//! so overlapping inputs are merged instead of cancelling each other out the
//! way even-odd filling of a single path set would.

use crate::profile::Profile2D;
use crate::region::Region;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Epsilon for floating point comparisons in 2D operations
pub(crate) const EPSILON_2D: f64 = 1e-9;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Union of closed polygons
///
/// Polygons with fewer than 3 points or no area are ignored. Winding of the
/// input does not matter.
pub fn polygon_union(polygons: &[Vec<Point2<f64>>]) -> Region {
    let paths: Vec<Vec<[f64; 2]>> = polygons
        .iter()
        .filter(|p| is_valid_contour(p))
        .map(|p| contour_to_path(&ensure_ccw(p)))
        .collect();

    let Some((first, rest)) = paths.split_first() else {
        return Region::empty();
    };

    let subject = vec![first.clone()];
    // A single polygon is unioned with itself so the result goes through the
    // same normalization as the multi-polygon case
    let clip: Vec<Vec<[f64; 2]>> = if rest.is_empty() {
        subject.clone()
    } else {
        rest.to_vec()
    };

    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);
    shapes_to_region(result)
}

/// Union of two regions
pub fn region_union(a: &Region, b: &Region) -> Region {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Region::empty(),
        (false, true) => a.clone(),
        (true, false) => b.clone(),
        (false, false) => {
            let result = region_to_paths(a).overlay(
                &region_to_paths(b),
                OverlayRule::Union,
                FillRule::NonZero,
            );
            shapes_to_region(result)
        }
    }
}

/// Boolean difference: everything in `a` that is not in `b`
pub fn polygon_difference(a: &Region, b: &Region) -> Region {
    if a.is_empty() {
        return Region::empty();
    }
    if b.is_empty() {
        return a.clone();
    }

    let result = region_to_paths(a).overlay(
        &region_to_paths(b),
        OverlayRule::Difference,
        FillRule::NonZero,
    );
    shapes_to_region(result)
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let area = compute_signed_area(contour).abs();
    area > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    let (first, rest) = contour.split_first()?;

    let mut min = *first;
    let mut max = *first;

    for p in rest {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Check if two bounding boxes overlap
pub fn bounds_overlap(
    a_min: &Point2<f64>,
    a_max: &Point2<f64>,
    b_min: &Point2<f64>,
    b_max: &Point2<f64>,
) -> bool {
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a region to i_overlay path format
fn region_to_paths(region: &Region) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::new();
    for shape in region.shapes() {
        paths.push(contour_to_path(&ensure_ccw(&shape.outer)));
        for hole in &shape.holes {
            paths.push(contour_to_path(&ensure_cw(hole)));
        }
    }
    paths
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to a Region
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_region(shapes: Vec<Vec<Vec<[f64; 2]>>>) -> Region {
    let mut profiles = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some((outer, holes)) = shape.split_first() else {
            continue;
        };

        let outer = path_to_contour(outer);
        if !is_valid_contour(&outer) {
            continue;
        }

        let mut profile = Profile2D::new(ensure_ccw(&outer));
        for hole in holes {
            let hole = path_to_contour(hole);
            if is_valid_contour(&hole) {
                profile.add_hole(ensure_cw(&hole));
            }
        }
        profiles.push(profile);
    }

    Region::from_shapes(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x, y),
            Point2::new(x + size, y),
            Point2::new(x + size, y + size),
            Point2::new(x, y + size),
        ]
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let area = compute_signed_area(&square(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let mut contour = square(0.0, 0.0, 1.0);
        contour.reverse();
        let area = compute_signed_area(&contour);
        assert!((area + 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_ensure_ccw() {
        let mut cw = square(0.0, 0.0, 1.0);
        cw.reverse();
        assert!(compute_signed_area(&ensure_ccw(&cw)) > 0.0);
        assert!(compute_signed_area(&ensure_cw(&cw)) < 0.0);
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let region = polygon_union(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]);

        assert_eq!(region.shapes().len(), 1);
        assert!((region.area() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_of_disjoint_squares() {
        let region = polygon_union(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]);

        assert_eq!(region.shapes().len(), 2);
        assert!((region.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_of_identical_footprints_does_not_double_count() {
        let footprint = square(3.0, 3.0, 4.0);
        let single = polygon_union(std::slice::from_ref(&footprint));
        let doubled = polygon_union(&[footprint.clone(), footprint]);

        assert!((single.area() - 16.0).abs() < 1e-6);
        assert!((doubled.area() - single.area()).abs() < 1e-6);
    }

    #[test]
    fn test_union_ignores_winding() {
        let mut cw = square(1.0, 1.0, 2.0);
        cw.reverse();
        let region = polygon_union(&[square(0.0, 0.0, 2.0), cw]);
        assert!((region.area() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        assert!(polygon_union(&[]).is_empty());
        let degenerate = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(polygon_union(&[degenerate]).is_empty());
    }

    #[test]
    fn test_difference_creates_hole() {
        let outer = Region::from_polygon(square(0.0, 0.0, 10.0));
        let inner = Region::from_polygon(square(4.0, 4.0, 2.0));

        let result = polygon_difference(&outer, &inner);

        assert_eq!(result.shapes().len(), 1);
        assert_eq!(result.shapes()[0].holes.len(), 1);
        assert!((result.area() - 96.0).abs() < 1e-6);
        assert!(!result.contains_point(5.0, 5.0));
        assert!(result.contains_point(1.0, 1.0));
    }

    #[test]
    fn test_difference_cutting_through_edge() {
        let outer = Region::from_polygon(square(0.0, 0.0, 10.0));
        let notch = Region::from_polygon(square(8.0, 4.0, 4.0));

        let result = polygon_difference(&outer, &notch);

        assert!(result.shapes()[0].holes.is_empty());
        assert!((result.area() - 92.0).abs() < 1e-6);
    }

    #[test]
    fn test_region_union_with_empty() {
        let a = Region::from_polygon(square(0.0, 0.0, 1.0));
        assert_eq!(region_union(&a, &Region::empty()), a);
        assert!(region_union(&Region::empty(), &Region::empty()).is_empty());
    }

    #[test]
    fn test_point_in_contour() {
        let contour = square(0.0, 0.0, 10.0);

        assert!(point_in_contour(&Point2::new(5.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2::new(15.0, 5.0), &contour));
        assert!(!point_in_contour(&Point2::new(-1.0, 5.0), &contour));
    }

    #[test]
    fn test_is_valid_contour() {
        assert!(is_valid_contour(&square(0.0, 0.0, 1.0)));

        let degenerate = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(!is_valid_contour(&degenerate));
    }

    #[test]
    fn test_bounds_overlap() {
        let a_min = Point2::new(0.0, 0.0);
        let a_max = Point2::new(10.0, 10.0);
        let b_min = Point2::new(5.0, 5.0);
        let b_max = Point2::new(15.0, 15.0);
        let c_min = Point2::new(20.0, 20.0);
        let c_max = Point2::new(30.0, 30.0);

        assert!(bounds_overlap(&a_min, &a_max, &b_min, &b_max));
        assert!(!bounds_overlap(&a_min, &a_max, &c_min, &c_max));
    }

    #[test]
    fn test_contour_bounds() {
        let (min, max) = contour_bounds(&square(2.0, 3.0, 4.0)).unwrap();
        assert_eq!(min, Point2::new(2.0, 3.0));
        assert_eq!(max, Point2::new(6.0, 7.0));
        assert!(contour_bounds(&[]).is_none());
    }
}
