// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scene synchronization.

use planview_core::{ObjectKey, ObjectKind};

use crate::scene::NodeKey;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or synchronizing a 3D view.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A model object already owns a scene node in this view.
    #[error("model object {0:?} is already registered")]
    AlreadyRegistered(ObjectKey),

    /// A model object has no scene node in this view.
    #[error("model object {0:?} is not registered")]
    NotRegistered(ObjectKey),

    /// Levels and the camera are not represented by scene nodes.
    #[error("{0} objects have no scene node")]
    NoSceneNode(ObjectKind),

    /// A scene node key is not in the scene graph.
    #[error("scene node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// The canvas cannot render 3D scenes.
    #[error("rendering backend does not support 3D scenes")]
    UnsupportedBackend,

    /// The camera timer thread could not be started.
    #[error("camera timer thread: {0}")]
    TimerThread(String),

    /// Model access failed.
    #[error(transparent)]
    Model(#[from] planview_core::Error),

    /// Geometry generation failed.
    #[error(transparent)]
    Geometry(#[from] planview_geometry::Error),
}
