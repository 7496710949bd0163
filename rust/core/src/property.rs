// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable attributes of model objects and their values.

use nalgebra::Point2;

use crate::camera::CameraPose;
use crate::error::{Error, Result};
use crate::keys::ObjectKey;

/// An attribute whose changes are reported to object listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    // Placement
    X,
    Y,
    Elevation,
    Angle,
    Level,
    Points,

    // Size
    Width,
    Depth,
    Height,
    HeightAtEnd,
    Thickness,
    FloorThickness,

    // Wall axis
    XStart,
    YStart,
    XEnd,
    YEnd,
    ArcExtent,

    ModelMirrored,
    Visible,
    Viewable,
    FloorVisible,
    CeilingVisible,

    // Appearance
    Color,
    LeftSideColor,
    RightSideColor,
    FloorColor,
    CeilingColor,
    Texture,
    Shininess,
    Power,
    Text,
    Name,

    /// Members of a furniture group
    Children,
    /// Camera viewpoint
    Pose,
}

/// A property value as carried by change events.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    /// Absent optional number, e.g. a straight wall's arc extent
    OptionalNumber(Option<f64>),
    Bool(bool),
    Color(Option<u32>),
    Text(Option<String>),
    Key(Option<ObjectKey>),
    Points(Vec<Point2<f64>>),
    Keys(Vec<ObjectKey>),
    Pose(CameraPose),
}

impl PropertyValue {
    pub fn as_number(&self, property: Property) -> Result<f64> {
        match self {
            PropertyValue::Number(v) => Ok(*v),
            _ => Err(mismatch(property, "number")),
        }
    }

    pub fn as_optional_number(&self, property: Property) -> Result<Option<f64>> {
        match self {
            PropertyValue::OptionalNumber(v) => Ok(*v),
            PropertyValue::Number(v) => Ok(Some(*v)),
            _ => Err(mismatch(property, "optional number")),
        }
    }

    pub fn as_bool(&self, property: Property) -> Result<bool> {
        match self {
            PropertyValue::Bool(v) => Ok(*v),
            _ => Err(mismatch(property, "boolean")),
        }
    }

    pub fn as_color(&self, property: Property) -> Result<Option<u32>> {
        match self {
            PropertyValue::Color(v) => Ok(*v),
            _ => Err(mismatch(property, "color")),
        }
    }

    pub fn as_text(&self, property: Property) -> Result<Option<String>> {
        match self {
            PropertyValue::Text(v) => Ok(v.clone()),
            _ => Err(mismatch(property, "text")),
        }
    }

    pub fn as_key(&self, property: Property) -> Result<Option<ObjectKey>> {
        match self {
            PropertyValue::Key(v) => Ok(*v),
            _ => Err(mismatch(property, "object key")),
        }
    }

    pub fn as_points(&self, property: Property) -> Result<Vec<Point2<f64>>> {
        match self {
            PropertyValue::Points(v) => Ok(v.clone()),
            _ => Err(mismatch(property, "point list")),
        }
    }

    pub fn as_pose(&self, property: Property) -> Result<CameraPose> {
        match self {
            PropertyValue::Pose(v) => Ok(*v),
            _ => Err(mismatch(property, "camera pose")),
        }
    }
}

#[inline]
fn mismatch(property: Property, expected: &'static str) -> Error {
    Error::TypeMismatch { property, expected }
}
