// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture, light and polyline meshes.

use planview_core::{Home, ObjectKey, Polyline};
use planview_geometry::{
    extrude_profile, Error, Mesh, Point2, Point3, Profile2D, Result, Vector2, Vector3,
};

use super::PartSpec;
use crate::scene::NodeRole;

/// One box per leaf piece; an empty group has no parts
pub(super) fn piece_parts(home: &Home, key: ObjectKey, elevation: f64) -> Vec<PartSpec> {
    home.leaf_pieces(key)
        .into_iter()
        .filter_map(|leaf| {
            let piece = home.get(leaf)?.piece()?;
            let profile = Profile2D::new(piece.points());
            let mesh = extrude_profile(
                &profile,
                elevation + piece.elevation,
                elevation + piece.top(),
            );
            let mut part = PartSpec::new(NodeRole::PieceBox, mesh).with_color(piece.color);
            part.texture = piece.texture.clone();
            part.shininess = piece.shininess;
            part.visible = home.is_shown(leaf);
            Some(part)
        })
        .collect()
}

/// Flat strip following the polyline on the level floor
pub(super) fn polyline_parts(polyline: &Polyline, elevation: f64) -> Vec<PartSpec> {
    if polyline.points.len() < 2 {
        return Vec::new();
    }
    vec![PartSpec::new(NodeRole::PolylineStrip, strip_mesh(polyline, elevation))
        .with_color(polyline.color)]
}

fn strip_mesh(polyline: &Polyline, elevation: f64) -> Result<Mesh> {
    if polyline.thickness <= 0.0 {
        return Err(Error::NonPositive {
            what: "polyline thickness",
            value: polyline.thickness,
        });
    }
    let half = polyline.thickness / 2.0;
    let mut mesh = Mesh::new();
    for pair in polyline.points.windows(2) {
        let Some(dir) = (pair[1] - pair[0]).try_normalize(1e-12) else {
            continue;
        };
        let offset = Vector2::new(-dir.y, dir.x) * half;
        let corner = |p: Point2<f64>| Point3::new(p.x, p.y, elevation);
        mesh.add_quad(
            [
                corner(pair[0] - offset),
                corner(pair[1] - offset),
                corner(pair[1] + offset),
                corner(pair[0] + offset),
            ],
            Vector3::z(),
        );
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planview_core::{Furniture, ModelObject, Piece};

    #[test]
    fn group_leaves_become_boxes() {
        let mut home = Home::new();
        let group = home
            .add(ModelObject::Furniture(Furniture::group("dining")))
            .unwrap();
        let inner = home.add_to_group(group, Furniture::group("chairs")).unwrap();
        home.add_to_group(inner, Furniture::piece(Piece::new("chair", 0.0, 0.0, 40.0, 40.0, 90.0)))
            .unwrap();
        home.add_to_group(group, Furniture::piece(Piece::new("table", 80.0, 0.0, 90.0, 90.0, 75.0)))
            .unwrap();

        let parts = piece_parts(&home, group, 0.0);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.mesh.is_ok() && p.role == NodeRole::PieceBox));

        let empty = home
            .add(ModelObject::Furniture(Furniture::group("empty")))
            .unwrap();
        assert!(piece_parts(&home, empty, 0.0).is_empty());
    }

    #[test]
    fn strip_covers_each_segment() {
        let polyline = Polyline {
            points: vec![Point2::new(0.0, 0.0), Point2::new(100.0, 0.0), Point2::new(100.0, 50.0)],
            thickness: 2.0,
            color: Some(0x000000),
            level: None,
        };
        let parts = polyline_parts(&polyline, 10.0);
        let mesh = parts[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        let (min, max) = mesh.bounds();
        assert_eq!(min.z, 10.0);
        assert_eq!(max.z, 10.0);
    }
}
