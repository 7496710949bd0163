// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for model operations.

use crate::keys::{ObjectKey, ObjectKind};
use crate::property::Property;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or mutating a home.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A referenced model object is not in the home.
    #[error("model object not found: {0:?}")]
    NotFound(ObjectKey),

    /// The property does not exist on this kind of object.
    #[error("property {property:?} does not apply to {kind}")]
    UnsupportedProperty { kind: ObjectKind, property: Property },

    /// The value type does not match the property.
    #[error("property {property:?} expects a {expected} value")]
    TypeMismatch {
        property: Property,
        expected: &'static str,
    },

    /// The object is not a furniture group.
    #[error("model object {0:?} is not a furniture group")]
    NotAGroup(ObjectKey),

    /// The object is a group member, not a collection item.
    #[error("model object {0:?} belongs to a furniture group")]
    GroupMember(ObjectKey),

    /// A level reference points at something that is not a level.
    #[error("model object {0:?} is not a level")]
    NotALevel(ObjectKey),

    /// Groups are added empty and filled member by member.
    #[error("furniture groups must be added without members")]
    PopulatedGroup,

    /// The camera is created with the home and lives as long as it does.
    #[error("the camera cannot be added or removed")]
    CameraIsPermanent,
}
