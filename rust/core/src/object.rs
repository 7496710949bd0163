// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model objects.
//!
//! [`ModelObject`] is the tagged variant stored in the home's arena. Every
//! variant exposes a footprint, an optional level and its observable
//! properties through [`ModelObject::get_property`] and
//! [`ModelObject::set_property`].

use nalgebra::{Point2, Rotation2, Vector2};

use crate::camera::CameraPose;
use crate::error::{Error, Result};
use crate::keys::{ObjectKey, ObjectKind};
use crate::property::{Property, PropertyValue};
use crate::wall::Wall;

/// Box-shaped placement shared by furniture and lights.
///
/// `(x, y)` is the center of the footprint; `angle` rotates the footprint
/// counter-clockwise around it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub angle: f64,
    pub model_mirrored: bool,
    pub visible: bool,
    pub color: Option<u32>,
    pub texture: Option<String>,
    pub shininess: f64,
}

impl Piece {
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, depth: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            elevation: 0.0,
            width,
            depth,
            height,
            angle: 0.0,
            model_mirrored: false,
            visible: true,
            color: None,
            texture: None,
            shininess: 0.0,
        }
    }

    /// Corners of the rotated footprint, counter-clockwise
    pub fn points(&self) -> Vec<Point2<f64>> {
        let rotation = Rotation2::new(self.angle);
        let center = Vector2::new(self.x, self.y);
        let (hw, hd) = (self.width / 2.0, self.depth / 2.0);
        [(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)]
            .into_iter()
            .map(|(dx, dy)| Point2::from(rotation * Vector2::new(dx, dy) + center))
            .collect()
    }

    pub fn top(&self) -> f64 {
        self.elevation + self.height
    }
}

/// A furniture item is either a single piece or a group of furniture.
#[derive(Debug, Clone, PartialEq)]
pub enum FurnitureKind {
    Piece,
    /// Group members, each itself a piece or a group
    Group(Vec<ObjectKey>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Furniture {
    pub piece: Piece,
    pub kind: FurnitureKind,
    pub door_or_window: bool,
    pub level: Option<ObjectKey>,
    /// Enclosing group, `None` for items of the furniture collection
    pub parent: Option<ObjectKey>,
}

impl Furniture {
    pub fn piece(piece: Piece) -> Self {
        Self {
            piece,
            kind: FurnitureKind::Piece,
            door_or_window: false,
            level: None,
            parent: None,
        }
    }

    pub fn door_or_window(piece: Piece) -> Self {
        Self {
            door_or_window: true,
            ..Self::piece(piece)
        }
    }

    /// An empty group; members are added with [`Home::add_to_group`](crate::Home::add_to_group)
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: FurnitureKind::Group(Vec::new()),
            ..Self::piece(Piece::new(name, 0.0, 0.0, 0.0, 0.0, 0.0))
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, FurnitureKind::Group(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightKind {
    /// Lamp lighting around itself
    Point,
    /// Light coming from one direction, like sunlight
    Directional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub piece: Piece,
    pub power: f64,
    pub kind: LightKind,
    pub level: Option<ObjectKey>,
}

impl Light {
    pub fn new(piece: Piece, kind: LightKind) -> Self {
        Self {
            piece,
            power: 0.5,
            kind,
            level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub name: Option<String>,
    pub points: Vec<Point2<f64>>,
    pub floor_visible: bool,
    pub ceiling_visible: bool,
    pub floor_color: Option<u32>,
    pub ceiling_color: Option<u32>,
    pub level: Option<ObjectKey>,
}

impl Room {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self {
            name: None,
            points,
            floor_visible: true,
            ceiling_visible: true,
            floor_color: None,
            ceiling_color: None,
            level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    pub level: Option<ObjectKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point2<f64>>,
    pub thickness: f64,
    pub color: Option<u32>,
    pub level: Option<ObjectKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    pub elevation: f64,
    pub height: f64,
    pub floor_thickness: f64,
    pub visible: bool,
    pub viewable: bool,
}

impl Level {
    pub fn new(name: impl Into<String>, elevation: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            elevation,
            height,
            floor_thickness: 12.0,
            visible: true,
            viewable: true,
        }
    }

    /// Whether objects on this level are shown in the 3D view
    pub fn is_viewable_and_visible(&self) -> bool {
        self.visible && self.viewable
    }
}

/// Any object stored in a home.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelObject {
    Wall(Wall),
    Room(Room),
    Furniture(Furniture),
    Light(Light),
    Label(Label),
    Polyline(Polyline),
    Level(Level),
    Camera(CameraPose),
}

impl ModelObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ModelObject::Wall(_) => ObjectKind::Wall,
            ModelObject::Room(_) => ObjectKind::Room,
            ModelObject::Furniture(_) => ObjectKind::Furniture,
            ModelObject::Light(_) => ObjectKind::Light,
            ModelObject::Label(_) => ObjectKind::Label,
            ModelObject::Polyline(_) => ObjectKind::Polyline,
            ModelObject::Level(_) => ObjectKind::Level,
            ModelObject::Camera(_) => ObjectKind::Camera,
        }
    }

    /// Level the object stands on, `None` for single-level homes
    pub fn level(&self) -> Option<ObjectKey> {
        match self {
            ModelObject::Wall(w) => w.level,
            ModelObject::Room(r) => r.level,
            ModelObject::Furniture(f) => f.level,
            ModelObject::Light(l) => l.level,
            ModelObject::Label(l) => l.level,
            ModelObject::Polyline(p) => p.level,
            ModelObject::Level(_) | ModelObject::Camera(_) => None,
        }
    }

    pub(crate) fn set_level_unchecked(&mut self, level: Option<ObjectKey>) {
        match self {
            ModelObject::Wall(w) => w.level = level,
            ModelObject::Room(r) => r.level = level,
            ModelObject::Furniture(f) => f.level = level,
            ModelObject::Light(l) => l.level = level,
            ModelObject::Label(l) => l.level = level,
            ModelObject::Polyline(p) => p.level = level,
            ModelObject::Level(_) | ModelObject::Camera(_) => {}
        }
    }

    /// Footprint in the floor plane
    pub fn points(&self) -> Vec<Point2<f64>> {
        match self {
            ModelObject::Wall(w) => w.points(),
            ModelObject::Room(r) => r.points.clone(),
            ModelObject::Furniture(f) => f.piece.points(),
            ModelObject::Light(l) => l.piece.points(),
            ModelObject::Label(l) => vec![Point2::new(l.x, l.y)],
            ModelObject::Polyline(p) => p.points.clone(),
            ModelObject::Level(_) => Vec::new(),
            ModelObject::Camera(c) => vec![Point2::new(c.x, c.y)],
        }
    }

    /// Bottom and top above the level floor
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        match self {
            ModelObject::Wall(w) => Some((0.0, w.max_height())),
            ModelObject::Furniture(f) => Some((f.piece.elevation, f.piece.top())),
            ModelObject::Light(l) => Some((l.piece.elevation, l.piece.top())),
            ModelObject::Room(_) | ModelObject::Polyline(_) => Some((0.0, 0.0)),
            ModelObject::Label(l) => Some((l.elevation, l.elevation)),
            ModelObject::Level(_) | ModelObject::Camera(_) => None,
        }
    }

    /// The object's own visibility flag, ignoring its level
    pub fn is_visible(&self) -> bool {
        match self {
            ModelObject::Furniture(f) => f.piece.visible,
            ModelObject::Light(l) => l.piece.visible,
            ModelObject::Level(l) => l.is_viewable_and_visible(),
            _ => true,
        }
    }

    pub fn is_door_or_window(&self) -> bool {
        matches!(self, ModelObject::Furniture(f) if f.door_or_window)
    }

    pub fn piece(&self) -> Option<&Piece> {
        match self {
            ModelObject::Furniture(f) => Some(&f.piece),
            ModelObject::Light(l) => Some(&l.piece),
            _ => None,
        }
    }

    pub(crate) fn piece_mut(&mut self) -> Option<&mut Piece> {
        match self {
            ModelObject::Furniture(f) => Some(&mut f.piece),
            ModelObject::Light(l) => Some(&mut l.piece),
            _ => None,
        }
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            ModelObject::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_room(&self) -> Option<&Room> {
        match self {
            ModelObject::Room(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_furniture(&self) -> Option<&Furniture> {
        match self {
            ModelObject::Furniture(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match self {
            ModelObject::Light(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_level(&self) -> Option<&Level> {
        match self {
            ModelObject::Level(l) => Some(l),
            _ => None,
        }
    }

    /// Members of a furniture group
    pub fn group_children(&self) -> Option<&[ObjectKey]> {
        match self {
            ModelObject::Furniture(Furniture {
                kind: FurnitureKind::Group(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    fn unsupported(&self, property: Property) -> Error {
        Error::UnsupportedProperty {
            kind: self.kind(),
            property,
        }
    }

    /// Current value of a property
    pub fn get_property(&self, property: Property) -> Result<PropertyValue> {
        use PropertyValue as V;

        if property == Property::Level && !matches!(self, ModelObject::Level(_) | ModelObject::Camera(_)) {
            return Ok(V::Key(self.level()));
        }

        let value = match self {
            ModelObject::Furniture(f) => match property {
                Property::Children => match &f.kind {
                    FurnitureKind::Group(children) => V::Keys(children.clone()),
                    FurnitureKind::Piece => return Err(self.unsupported(property)),
                },
                _ => return piece_property(&f.piece, property).ok_or_else(|| self.unsupported(property)),
            },
            ModelObject::Light(l) => match property {
                Property::Power => V::Number(l.power),
                _ => return piece_property(&l.piece, property).ok_or_else(|| self.unsupported(property)),
            },
            ModelObject::Wall(w) => match property {
                Property::XStart => V::Number(w.x_start),
                Property::YStart => V::Number(w.y_start),
                Property::XEnd => V::Number(w.x_end),
                Property::YEnd => V::Number(w.y_end),
                Property::Thickness => V::Number(w.thickness),
                Property::Height => V::Number(w.height),
                Property::HeightAtEnd => V::OptionalNumber(w.height_at_end),
                Property::ArcExtent => V::OptionalNumber(w.arc_extent),
                Property::LeftSideColor => V::Color(w.left_side_color),
                Property::RightSideColor => V::Color(w.right_side_color),
                _ => return Err(self.unsupported(property)),
            },
            ModelObject::Room(r) => match property {
                Property::Name => V::Text(r.name.clone()),
                Property::Points => V::Points(r.points.clone()),
                Property::FloorVisible => V::Bool(r.floor_visible),
                Property::CeilingVisible => V::Bool(r.ceiling_visible),
                Property::FloorColor => V::Color(r.floor_color),
                Property::CeilingColor => V::Color(r.ceiling_color),
                _ => return Err(self.unsupported(property)),
            },
            ModelObject::Label(l) => match property {
                Property::Text => V::Text(Some(l.text.clone())),
                Property::X => V::Number(l.x),
                Property::Y => V::Number(l.y),
                Property::Elevation => V::Number(l.elevation),
                _ => return Err(self.unsupported(property)),
            },
            ModelObject::Polyline(p) => match property {
                Property::Points => V::Points(p.points.clone()),
                Property::Thickness => V::Number(p.thickness),
                Property::Color => V::Color(p.color),
                _ => return Err(self.unsupported(property)),
            },
            ModelObject::Level(l) => match property {
                Property::Name => V::Text(Some(l.name.clone())),
                Property::Elevation => V::Number(l.elevation),
                Property::Height => V::Number(l.height),
                Property::FloorThickness => V::Number(l.floor_thickness),
                Property::Visible => V::Bool(l.visible),
                Property::Viewable => V::Bool(l.viewable),
                _ => return Err(self.unsupported(property)),
            },
            ModelObject::Camera(pose) => match property {
                Property::Pose => V::Pose(*pose),
                _ => return Err(self.unsupported(property)),
            },
        };
        Ok(value)
    }

    /// Sets a property and returns its previous value.
    ///
    /// Group membership and level references go through [`Home`](crate::Home),
    /// which keeps parent links and level validity consistent.
    pub fn set_property(&mut self, property: Property, value: &PropertyValue) -> Result<PropertyValue> {
        if property == Property::Children {
            return Err(self.unsupported(property));
        }
        let old = self.get_property(property)?;
        let p = property;

        if p == Property::Level {
            self.set_level_unchecked(value.as_key(p)?);
            return Ok(old);
        }

        let unsupported = self.unsupported(p);
        match self {
            ModelObject::Furniture(f) => set_piece_property(&mut f.piece, p, value, unsupported)?,
            ModelObject::Light(l) => match p {
                Property::Power => l.power = value.as_number(p)?,
                _ => set_piece_property(&mut l.piece, p, value, unsupported)?,
            },
            ModelObject::Wall(w) => match p {
                Property::XStart => w.x_start = value.as_number(p)?,
                Property::YStart => w.y_start = value.as_number(p)?,
                Property::XEnd => w.x_end = value.as_number(p)?,
                Property::YEnd => w.y_end = value.as_number(p)?,
                Property::Thickness => w.thickness = value.as_number(p)?,
                Property::Height => w.height = value.as_number(p)?,
                Property::HeightAtEnd => w.height_at_end = value.as_optional_number(p)?,
                Property::ArcExtent => w.arc_extent = value.as_optional_number(p)?,
                Property::LeftSideColor => w.left_side_color = value.as_color(p)?,
                Property::RightSideColor => w.right_side_color = value.as_color(p)?,
                _ => return Err(unsupported),
            },
            ModelObject::Room(r) => match p {
                Property::Name => r.name = value.as_text(p)?,
                Property::Points => r.points = value.as_points(p)?,
                Property::FloorVisible => r.floor_visible = value.as_bool(p)?,
                Property::CeilingVisible => r.ceiling_visible = value.as_bool(p)?,
                Property::FloorColor => r.floor_color = value.as_color(p)?,
                Property::CeilingColor => r.ceiling_color = value.as_color(p)?,
                _ => return Err(unsupported),
            },
            ModelObject::Label(l) => match p {
                Property::Text => l.text = value.as_text(p)?.unwrap_or_default(),
                Property::X => l.x = value.as_number(p)?,
                Property::Y => l.y = value.as_number(p)?,
                Property::Elevation => l.elevation = value.as_number(p)?,
                _ => return Err(unsupported),
            },
            ModelObject::Polyline(pl) => match p {
                Property::Points => pl.points = value.as_points(p)?,
                Property::Thickness => pl.thickness = value.as_number(p)?,
                Property::Color => pl.color = value.as_color(p)?,
                _ => return Err(unsupported),
            },
            ModelObject::Level(l) => match p {
                Property::Name => l.name = value.as_text(p)?.unwrap_or_default(),
                Property::Elevation => l.elevation = value.as_number(p)?,
                Property::Height => l.height = value.as_number(p)?,
                Property::FloorThickness => l.floor_thickness = value.as_number(p)?,
                Property::Visible => l.visible = value.as_bool(p)?,
                Property::Viewable => l.viewable = value.as_bool(p)?,
                _ => return Err(unsupported),
            },
            ModelObject::Camera(pose) => *pose = value.as_pose(p)?,
        }
        Ok(old)
    }
}

fn piece_property(piece: &Piece, property: Property) -> Option<PropertyValue> {
    use PropertyValue as V;
    Some(match property {
        Property::Name => V::Text(Some(piece.name.clone())),
        Property::X => V::Number(piece.x),
        Property::Y => V::Number(piece.y),
        Property::Elevation => V::Number(piece.elevation),
        Property::Width => V::Number(piece.width),
        Property::Depth => V::Number(piece.depth),
        Property::Height => V::Number(piece.height),
        Property::Angle => V::Number(piece.angle),
        Property::ModelMirrored => V::Bool(piece.model_mirrored),
        Property::Visible => V::Bool(piece.visible),
        Property::Color => V::Color(piece.color),
        Property::Texture => V::Text(piece.texture.clone()),
        Property::Shininess => V::Number(piece.shininess),
        _ => return None,
    })
}

fn set_piece_property(
    piece: &mut Piece,
    p: Property,
    value: &PropertyValue,
    unsupported: Error,
) -> Result<()> {
    match p {
        Property::Name => piece.name = value.as_text(p)?.unwrap_or_default(),
        Property::X => piece.x = value.as_number(p)?,
        Property::Y => piece.y = value.as_number(p)?,
        Property::Elevation => piece.elevation = value.as_number(p)?,
        Property::Width => piece.width = value.as_number(p)?,
        Property::Depth => piece.depth = value.as_number(p)?,
        Property::Height => piece.height = value.as_number(p)?,
        Property::Angle => piece.angle = value.as_number(p)?,
        Property::ModelMirrored => piece.model_mirrored = value.as_bool(p)?,
        Property::Visible => piece.visible = value.as_bool(p)?,
        Property::Color => piece.color = value.as_color(p)?,
        Property::Texture => piece.texture = value.as_text(p)?,
        Property::Shininess => piece.shininess = value.as_number(p)?,
        _ => return Err(unsupported),
    }
    Ok(())
}
