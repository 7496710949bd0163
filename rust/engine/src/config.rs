// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Knobs of a [`SyncView`](crate::SyncView).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Minimum subpart size for light scoping; 0 or less disables scoping
    /// and every light illuminates the whole scene.
    pub subpart_size_under_light: f64,
    /// Project ground furniture footprints as a translucent floor shadow.
    pub shadow_on_floor: bool,
    /// Camera timer period while a motion is in flight.
    pub camera_tick_interval: Duration,
    /// Add the ambient light and the four default directional lights.
    pub default_lights: bool,
    /// Build nodes with their final appearance instead of deferring textures.
    pub wait_for_resources: bool,
    /// Maximum number of distinct meshes kept for sharing between nodes.
    pub mesh_cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            subpart_size_under_light: 0.0,
            shadow_on_floor: false,
            camera_tick_interval: Duration::from_millis(10),
            default_lights: true,
            wait_for_resources: false,
            mesh_cache_capacity: 4096,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Absent or unparsable variables keep their default value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            subpart_size_under_light: env_or(
                "PLANVIEW_SUBPART_SIZE_UNDER_LIGHT",
                defaults.subpart_size_under_light,
            ),
            shadow_on_floor: env_or("PLANVIEW_SHADOW_ON_FLOOR", defaults.shadow_on_floor),
            camera_tick_interval: Duration::from_millis(env_or(
                "PLANVIEW_CAMERA_TICK_MS",
                defaults.camera_tick_interval.as_millis() as u64,
            ))
            .max(Duration::from_millis(1)),
            default_lights: env_or("PLANVIEW_DEFAULT_LIGHTS", defaults.default_lights),
            wait_for_resources: env_or(
                "PLANVIEW_WAIT_FOR_RESOURCES",
                defaults.wait_for_resources,
            ),
            mesh_cache_capacity: env_or(
                "PLANVIEW_MESH_CACHE_CAPACITY",
                defaults.mesh_cache_capacity,
            ),
        }
    }

    /// Whether light scoping is enabled
    pub fn scopes_lights(&self) -> bool {
        self.subpart_size_under_light > 0.0
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
