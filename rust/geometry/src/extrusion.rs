// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting floor footprints to 3D meshes
//!
//! The floor plane is XY and Z points up: a footprint extruded from
//! `bottom` to `top` becomes a prism standing on the floor.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::Profile2D;
use crate::triangulation::Triangulation;
use nalgebra::{Point2, Point3, Vector3};

/// Extrude a 2D profile vertically between two elevations
#[inline]
pub fn extrude_profile(profile: &Profile2D, bottom: f64, top: f64) -> Result<Mesh> {
    if top <= bottom {
        return Err(Error::NonPositive {
            what: "extrusion height",
            value: top - bottom,
        });
    }

    let triangulation = profile.triangulate()?;

    let side_vertex_count = (profile.outer.len()
        + profile.holes.iter().map(|h| h.len()).sum::<usize>())
        * 4;
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + side_vertex_count,
        triangulation.indices.len() * 2 + side_vertex_count / 4 * 6,
    );

    create_cap_mesh(&triangulation, bottom, false, &mut mesh);
    create_cap_mesh(&triangulation, top, true, &mut mesh);

    create_side_walls(&profile.outer, bottom, top, &mut mesh);
    for hole in &profile.holes {
        create_side_walls(hole, bottom, top, &mut mesh);
    }

    Ok(mesh)
}

/// Horizontal surface covering the profile at the given elevation
///
/// `facing_up` selects the side the triangles face: floors and shadows face
/// up, ceilings face down.
pub fn planar_mesh(profile: &Profile2D, elevation: f64, facing_up: bool) -> Result<Mesh> {
    let triangulation = profile.triangulate()?;
    let mut mesh = Mesh::with_capacity(triangulation.points.len(), triangulation.indices.len());
    create_cap_mesh(&triangulation, elevation, facing_up, &mut mesh);
    Ok(mesh)
}

/// Create a cap mesh (top or bottom) from triangulation
#[inline]
fn create_cap_mesh(triangulation: &Triangulation, z: f64, facing_up: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = if facing_up {
        Vector3::new(0.0, 0.0, 1.0)
    } else {
        Vector3::new(0.0, 0.0, -1.0)
    };

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        // Reverse winding for downward-facing caps
        if facing_up {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

/// Create side walls for a profile boundary
#[inline]
fn create_side_walls(boundary: &[Point2<f64>], bottom: f64, top: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        // Use try_normalize to handle degenerate edges (duplicate consecutive points)
        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        mesh.add_quad(
            [
                Point3::new(p0.x, p0.y, bottom),
                Point3::new(p1.x, p1.y, bottom),
                Point3::new(p1.x, p1.y, top),
                Point3::new(p0.x, p0.y, top),
            ],
            normal,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::create_rectangle;

    #[test]
    fn test_extrude_rectangle() {
        let profile = create_rectangle(Point2::new(-5.0, -2.5), Point2::new(5.0, 2.5));
        let mesh = extrude_profile(&profile, 0.0, 20.0).unwrap();

        assert!(mesh.vertex_count() > 0);
        // Two caps of 2 triangles and four sides of 2 triangles
        assert_eq!(mesh.triangle_count(), 12);

        let (min, max) = mesh.bounds();
        assert!((min.x - -5.0).abs() < 0.01);
        assert!((max.x - 5.0).abs() < 0.01);
        assert!((min.y - -2.5).abs() < 0.01);
        assert!((max.y - 2.5).abs() < 0.01);
        assert!((min.z - 0.0).abs() < 0.01);
        assert!((max.z - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_extrude_above_floor() {
        let profile = create_rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let mesh = extrude_profile(&profile, 70.0, 75.0).unwrap();

        let (min, max) = mesh.bounds();
        assert!((min.z - 70.0).abs() < 0.01);
        assert!((max.z - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_invalid_extrusion() {
        let profile = create_rectangle(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        assert!(extrude_profile(&profile, 5.0, 5.0).is_err());
    }

    #[test]
    fn test_planar_mesh_faces_requested_side() {
        let profile = create_rectangle(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
        let up = planar_mesh(&profile, 0.5, true).unwrap();
        let down = planar_mesh(&profile, 0.5, false).unwrap();

        assert_eq!(up.triangle_count(), 2);
        assert!(up.normals.chunks_exact(3).all(|n| n[2] == 1.0));
        assert!(down.normals.chunks_exact(3).all(|n| n[2] == -1.0));
        assert_ne!(up.indices, down.indices);
    }
}
