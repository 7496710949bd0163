// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall meshes.
//!
//! A wall is split in six parts so light scoping can address each face. The
//! sides of straight walls are built in side space `(u, v)`, `u` running
//! along the wall axis and `v` up, where door and window openings are cut
//! out as rectangles before triangulation.

use planview_core::{Collection, Home, ModelObject, Wall, WallPart};
use planview_geometry::bool2d::{bounds_overlap, contour_bounds};
use planview_geometry::{
    polygon_difference, polygon_union, Error, Mesh, Point2, Point3, Region, Result, Vector2,
    Vector3,
};

use super::PartSpec;
use crate::scene::NodeRole;

/// Openings narrower than this are ignored
const MIN_OPENING_WIDTH: f64 = 0.01;

pub(super) fn wall_parts(home: &Home, wall: &Wall, elevation: f64) -> Vec<PartSpec> {
    let (left, right) = wall.side_points();
    let openings = if wall.arc_circle().is_none() {
        openings(home, wall)
    } else {
        Vec::new()
    };

    WallPart::ALL
        .iter()
        .map(|&part| {
            let mesh = match part {
                WallPart::LeftSide => side_mesh(wall, &left, elevation, &openings, true),
                WallPart::RightSide => side_mesh(wall, &right, elevation, &openings, false),
                WallPart::StartCap => Ok(cap_mesh(wall, &left, &right, elevation, false)),
                WallPart::EndCap => Ok(cap_mesh(wall, &left, &right, elevation, true)),
                WallPart::Top => Ok(top_or_bottom_mesh(wall, &left, &right, elevation, true)),
                WallPart::Bottom => Ok(top_or_bottom_mesh(wall, &left, &right, elevation, false)),
            };
            let color = match part {
                WallPart::LeftSide => wall.left_side_color,
                WallPart::RightSide => wall.right_side_color,
                _ => None,
            };
            PartSpec::new(NodeRole::WallPart(part), mesh).with_color(color)
        })
        .collect()
}

/// Opening rectangles in side space: doors and windows standing in the wall
fn openings(home: &Home, wall: &Wall) -> Vec<Vec<Point2<f64>>> {
    let length = wall.length();
    let Some((wall_min, wall_max)) = contour_bounds(&wall.points()) else {
        return Vec::new();
    };
    if length < MIN_OPENING_WIDTH {
        return Vec::new();
    }
    let start = wall.start();
    let axis = (wall.end() - start) / length;
    let normal = Vector2::new(-axis.y, axis.x);

    home.collection(Collection::Furniture)
        .iter()
        .flat_map(|&key| home.leaf_pieces(key))
        .filter(|&leaf| home.is_shown(leaf))
        .filter_map(|leaf| match home.get(leaf)? {
            ModelObject::Furniture(f) if f.door_or_window && f.level == wall.level => {
                Some(&f.piece)
            }
            _ => None,
        })
        .filter_map(|piece| {
            let points = piece.points();
            let (min, max) = contour_bounds(&points)?;
            if !bounds_overlap(&min, &max, &wall_min, &wall_max) {
                return None;
            }
            // Pieces beside the wall overlap its bounds without crossing it
            let center = Point2::new(piece.x, piece.y);
            if (center - start).dot(&normal).abs() > (wall.thickness + piece.depth) / 2.0 {
                return None;
            }
            let (u_min, u_max) = points
                .iter()
                .map(|p| (p - start).dot(&axis))
                .fold((f64::MAX, f64::MIN), |(lo, hi), u| (lo.min(u), hi.max(u)));
            let (u_min, u_max) = (u_min.max(0.0), u_max.min(length));
            (u_max - u_min > MIN_OPENING_WIDTH && piece.height > 0.0).then(|| {
                vec![
                    Point2::new(u_min, piece.elevation),
                    Point2::new(u_max, piece.elevation),
                    Point2::new(u_max, piece.top()),
                    Point2::new(u_min, piece.top()),
                ]
            })
        })
        .collect()
}

/// Horizontal unit normal of a side segment, pointing away from the wall
fn outward(a: Point2<f64>, b: Point2<f64>, left: bool) -> Vector3<f64> {
    let d = b - a;
    let n = Vector2::new(-d.y, d.x)
        .try_normalize(1e-12)
        .unwrap_or_else(|| Vector2::new(0.0, 1.0));
    let n = if left { n } else { -n };
    Vector3::new(n.x, n.y, 0.0)
}

fn side_mesh(
    wall: &Wall,
    side: &[Point2<f64>],
    elevation: f64,
    openings: &[Vec<Point2<f64>>],
    left: bool,
) -> Result<Mesh> {
    if side.len() < 2 {
        return Err(Error::TooFewPoints {
            needed: 2,
            got: side.len(),
        });
    }
    let mut mesh = Mesh::new();
    if openings.is_empty() || side.len() != 2 {
        let last = (side.len() - 1) as f64;
        for (i, pair) in side.windows(2).enumerate() {
            let (h0, h1) = (
                wall.height_at(i as f64 / last),
                wall.height_at((i + 1) as f64 / last),
            );
            let normal = outward(pair[0], pair[1], left);
            push_quad_facing(
                &mut mesh,
                [
                    Point3::new(pair[0].x, pair[0].y, elevation),
                    Point3::new(pair[1].x, pair[1].y, elevation),
                    Point3::new(pair[1].x, pair[1].y, elevation + h1),
                    Point3::new(pair[0].x, pair[0].y, elevation + h0),
                ],
                normal,
            );
        }
        return Ok(mesh);
    }

    let (a, b) = (side[0], side[1]);
    let length = (b - a).norm();
    let axis = (b - a) / length;
    let normal = outward(a, b, left);
    let outline = Region::from_polygon(vec![
        Point2::new(0.0, 0.0),
        Point2::new(length, 0.0),
        Point2::new(length, wall.end_height()),
        Point2::new(0.0, wall.height),
    ]);
    let cut = polygon_difference(&outline, &polygon_union(openings));

    for shape in cut.shapes() {
        let triangulation = shape.triangulate()?;
        let base = mesh.vertex_count() as u32;
        let corners: Vec<Point3<f64>> = triangulation
            .points
            .iter()
            .map(|uv| {
                let p = a + axis * uv.x;
                Point3::new(p.x, p.y, elevation + uv.y)
            })
            .collect();
        for corner in &corners {
            mesh.add_vertex(*corner, normal);
        }
        for tri in triangulation.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
            let facing = (corners[i1] - corners[i0])
                .cross(&(corners[i2] - corners[i0]))
                .dot(&normal);
            if facing < 0.0 {
                mesh.add_triangle(base + i0 as u32, base + i2 as u32, base + i1 as u32);
            } else {
                mesh.add_triangle(base + i0 as u32, base + i1 as u32, base + i2 as u32);
            }
        }
    }
    Ok(mesh)
}

fn cap_mesh(
    wall: &Wall,
    left: &[Point2<f64>],
    right: &[Point2<f64>],
    elevation: f64,
    end: bool,
) -> Mesh {
    let mut mesh = Mesh::new();
    let (l, r, inner, height) = if end {
        let n = left.len();
        (left[n - 1], right[n - 1], left[n.saturating_sub(2)], wall.end_height())
    } else {
        (left[0], right[0], left[1.min(left.len() - 1)], wall.height)
    };
    // Caps face away from the rest of the wall
    let away = l - inner;
    let normal = Vector3::new(away.x, away.y, 0.0)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::x);
    push_quad_facing(
        &mut mesh,
        [
            Point3::new(l.x, l.y, elevation),
            Point3::new(r.x, r.y, elevation),
            Point3::new(r.x, r.y, elevation + height),
            Point3::new(l.x, l.y, elevation + height),
        ],
        normal,
    );
    mesh
}

fn top_or_bottom_mesh(
    wall: &Wall,
    left: &[Point2<f64>],
    right: &[Point2<f64>],
    elevation: f64,
    top: bool,
) -> Mesh {
    let mut mesh = Mesh::new();
    let last = (left.len().max(2) - 1) as f64;
    let z = |i: usize| {
        if top {
            elevation + wall.height_at(i as f64 / last)
        } else {
            elevation
        }
    };
    let facing = if top { Vector3::z() } else { -Vector3::z() };
    for i in 0..left.len().min(right.len()).saturating_sub(1) {
        push_quad_facing(
            &mut mesh,
            [
                Point3::new(left[i].x, left[i].y, z(i)),
                Point3::new(left[i + 1].x, left[i + 1].y, z(i + 1)),
                Point3::new(right[i + 1].x, right[i + 1].y, z(i + 1)),
                Point3::new(right[i].x, right[i].y, z(i)),
            ],
            facing,
        );
    }
    mesh
}

/// Adds a quad whose triangles face towards `facing`.
///
/// The stored normal is the geometric one, so sloped tops keep their tilt.
fn push_quad_facing(mesh: &mut Mesh, mut corners: [Point3<f64>; 4], facing: Vector3<f64>) {
    let mut normal = (corners[1] - corners[0])
        .cross(&(corners[2] - corners[0]))
        .try_normalize(1e-12)
        .unwrap_or(facing);
    if normal.dot(&facing) < 0.0 {
        corners.reverse();
        normal = -normal;
    }
    mesh.add_quad(corners, normal);
}
