// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for footprint and mesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning floor plan shapes into meshes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A contour or polyline is too short to describe a surface
    #[error("{got} points given where at least {needed} are needed")]
    TooFewPoints { needed: usize, got: usize },

    #[error("earcut failed: {0}")]
    Triangulation(String),

    /// A height, thickness or extrusion span that is zero or negative
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
}
