// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera viewpoint.

/// Position and orientation of the 3D viewpoint.
///
/// Angles are in radians. `yaw` turns around the vertical axis, `pitch` tilts
/// up and down.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub field_of_view: f64,
}

impl CameraPose {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64, pitch: f64, field_of_view: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch,
            field_of_view,
        }
    }
}

impl Default for CameraPose {
    /// Aerial view looking at the origin from above the south-west
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 1050.0,
            z: 1010.0,
            yaw: 7.0 * std::f64::consts::FRAC_PI_4,
            pitch: std::f64::consts::FRAC_PI_4,
            field_of_view: 63f64.to_radians(),
        }
    }
}
