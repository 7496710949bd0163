// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based model storage.
//!
//! Every model object gets a unique, type-safe key for O(1) lookup in the
//! home's arena. Keys are created by `slotmap::SlotMap` and stay distinct
//! even after other objects are removed (generational indices), so two
//! objects with identical attributes never share an identity.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// Key for any model object (wall, room, piece, light, level, ...).
    pub struct ObjectKey;
}

/// Handle returned by listener registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Discriminant for model object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Wall,
    Room,
    Furniture,
    Light,
    Label,
    Polyline,
    Level,
    Camera,
}

impl ObjectKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Wall => "Wall",
            ObjectKind::Room => "Room",
            ObjectKind::Furniture => "Furniture",
            ObjectKind::Light => "Light",
            ObjectKind::Label => "Label",
            ObjectKind::Polyline => "Polyline",
            ObjectKind::Level => "Level",
            ObjectKind::Camera => "Camera",
        }
    }

    /// Collection holding objects of this kind, `None` for the camera.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            ObjectKind::Wall => Some(Collection::Walls),
            ObjectKind::Room => Some(Collection::Rooms),
            ObjectKind::Furniture => Some(Collection::Furniture),
            ObjectKind::Light => Some(Collection::Lights),
            ObjectKind::Label => Some(Collection::Labels),
            ObjectKind::Polyline => Some(Collection::Polylines),
            ObjectKind::Level => Some(Collection::Levels),
            ObjectKind::Camera => None,
        }
    }

    /// Whether objects of this kind are represented by a scene node.
    pub fn has_node(&self) -> bool {
        !matches!(self, ObjectKind::Level | ObjectKind::Camera)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable collections of a home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Walls,
    Rooms,
    Furniture,
    Lights,
    Labels,
    Polylines,
    Levels,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Walls,
        Collection::Rooms,
        Collection::Furniture,
        Collection::Lights,
        Collection::Labels,
        Collection::Polylines,
        Collection::Levels,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}
