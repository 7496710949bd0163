// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room floor and ceiling surfaces.

use planview_core::Room;
use planview_geometry::{planar_mesh, Profile2D};

use super::PartSpec;
use crate::scene::NodeRole;

/// Ceiling height of rooms in homes without levels
pub(super) const DEFAULT_CEILING_HEIGHT: f64 = 250.0;

pub(super) fn room_parts(room: &Room, floor: f64, ceiling: f64) -> Vec<PartSpec> {
    let profile = Profile2D::new(room.points.clone());
    let mut floor_part = PartSpec::new(NodeRole::RoomFloor, planar_mesh(&profile, floor, true))
        .with_color(room.floor_color);
    floor_part.visible = room.floor_visible;
    let mut ceiling_part =
        PartSpec::new(NodeRole::RoomCeiling, planar_mesh(&profile, ceiling, false))
            .with_color(room.ceiling_color);
    ceiling_part.visible = room.ceiling_visible;
    vec![floor_part, ceiling_part]
}
