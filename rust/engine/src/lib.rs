// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planview Engine
//!
//! Keeps a 3D scene in step with a mutable planview [`Home`](planview_core::Home).
//!
//! ## Overview
//!
//! - **Registry**: one scene node per top-level model object, attached to
//!   the scene root exactly while the object is in its collection
//! - **Coalesced updates**: attribute changes mark objects dirty; a single
//!   task posted on the UI executor rebuilds each dirty object once
//! - **Light scoping**: directional lights skip surfaces enclosed by walls
//!   once the subpart threshold is positive
//! - **Camera motion**: model camera changes are blended on a timer thread
//! - **Floor shadow**: optional translucent footprint of ground furniture
//!
//! ## Threading
//!
//! Everything but camera blending runs on the thread that owns the home.
//! Deferred work goes through a [`UiExecutor`]; [`LocalExecutor`] is a
//! queue drained by the host's event loop (or by tests).

pub mod adapter;
pub mod cache;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod error;
pub mod executor;
pub mod factory;
pub mod light_scope;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod shadow;
pub mod view;

pub use adapter::{classify, ChangeClass};
pub use cache::{CacheStats, MeshCache};
pub use camera::{CameraAnimation, CameraHandle, CameraInterpolator, CAMERA_MOTION_DURATION};
pub use canvas::{Canvas, PlanCanvas, RenderCapabilities};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use executor::{LocalExecutor, Task, UiExecutor};
pub use factory::{BuildOptions, MeshNodeFactory, NodeFactory, NodeUpdate};
pub use light_scope::{LightScopeCalculator, WALL_THICKNESS_MARGIN};
pub use registry::ObjectRegistry;
pub use scene::{
    Appearance, LightSource, LightSourceKind, NodeKey, NodeRole, SceneGraph, SceneNode,
};
pub use scheduler::{DeferredUpdates, DirtySet, ScopeRequests, ScopeWork};
pub use shadow::{Interrupt, LevelShadow, NeverInterrupted, ShadowProjector, SHADOW_OFFSET};
pub use view::{SyncStats, SyncView};
