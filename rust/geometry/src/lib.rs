// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planview Geometry
//!
//! Floor-plan geometry for the 3D view: footprint unions and differences
//! with i_overlay, earcutr triangulation, mesh generation, and exact
//! point to box distances for clip plane placement.

pub mod bool2d;
pub mod distance;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod profile;
pub mod region;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use bool2d::{polygon_difference, polygon_union, region_union};
pub use distance::{nearest_distance_point_to_box, Aabb};
pub use error::{Error, Result};
pub use extrusion::{extrude_profile, planar_mesh};
pub use mesh::Mesh;
pub use profile::{create_rectangle, Profile2D};
pub use region::{contains_point, Region};
pub use triangulation::{triangulate, Triangulation};
