// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The home: arena-backed owner of every model object.
//!
//! Objects live in one `SlotMap` with stable generational keys. Each
//! observable collection keeps the keys of its members in insertion order.
//! Furniture group members live in the arena too, linked through
//! `Furniture::parent`, but are not collection members: the furniture
//! collection holds top-level items only.
//!
//! Every mutation goes through `Home` so that listeners see exactly one
//! event per structural or attribute change.

use std::cell::RefCell;
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::rc::Rc;

use nalgebra::{Point2, Rotation2, Vector2};
use slotmap::SlotMap;
use smallvec::{smallvec, SmallVec};

use crate::camera::CameraPose;
use crate::error::{Error, Result};
use crate::events::{ListenerTable, ModelEvent, SharedListener, Target};
use crate::keys::{Collection, ObjectKey, SubscriptionId};
use crate::object::{Furniture, FurnitureKind, Level, ModelObject, Piece};
use crate::property::{Property, PropertyValue};
use crate::wall::Wall;

/// The central arena owning all model objects and their listeners.
///
/// # Example
///
/// ```
/// use planview_core::{Home, ModelObject, Wall};
///
/// let mut home = Home::new();
/// let wall = home
///     .add(ModelObject::Wall(Wall::new(0.0, 0.0, 500.0, 0.0, 20.0, 250.0)))
///     .unwrap();
///
/// assert!(home.contains(wall));
/// assert_eq!(home.walls().count(), 1);
/// ```
pub struct Home {
    objects: SlotMap<ObjectKey, ModelObject>,
    collections: [Vec<ObjectKey>; 7],
    camera: ObjectKey,
    listeners: RefCell<ListenerTable>,
}

impl Home {
    /// An empty home with its camera
    pub fn new() -> Self {
        let mut objects = SlotMap::with_key();
        let camera = objects.insert(ModelObject::Camera(CameraPose::default()));
        Self {
            objects,
            collections: Default::default(),
            camera,
            listeners: RefCell::default(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, key: ObjectKey) -> Option<&ModelObject> {
        self.objects.get(key)
    }

    fn get_or_err(&self, key: ObjectKey) -> Result<&ModelObject> {
        self.objects.get(key).ok_or(Error::NotFound(key))
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of live objects, group members and the camera included
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Members of a collection in insertion order
    pub fn collection(&self, collection: Collection) -> &[ObjectKey] {
        &self.collections[collection.index()]
    }

    pub fn walls(&self) -> impl Iterator<Item = (ObjectKey, &Wall)> + '_ {
        self.collection(Collection::Walls)
            .iter()
            .filter_map(|&key| self.objects.get(key)?.as_wall().map(|w| (key, w)))
    }

    pub fn levels(&self) -> impl Iterator<Item = (ObjectKey, &Level)> + '_ {
        self.collection(Collection::Levels)
            .iter()
            .filter_map(|&key| self.objects.get(key)?.as_level().map(|l| (key, l)))
    }

    pub fn camera(&self) -> ObjectKey {
        self.camera
    }

    pub fn camera_pose(&self) -> CameraPose {
        match self.objects.get(self.camera) {
            Some(ModelObject::Camera(pose)) => *pose,
            _ => CameraPose::default(),
        }
    }

    /// Enclosing group of a group member
    pub fn parent_of(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.objects.get(key)?.as_furniture()?.parent
    }

    /// Top-level collection item containing `key`, `key` itself when it
    /// is not a group member
    pub fn root_of(&self, key: ObjectKey) -> ObjectKey {
        let mut current = key;
        while let Some(parent) = self.parent_of(current) {
            current = parent;
        }
        current
    }

    /// Pieces at the bottom of a furniture hierarchy.
    ///
    /// A piece is its own single leaf; an empty group has none.
    pub fn leaf_pieces(&self, key: ObjectKey) -> SmallVec<[ObjectKey; 4]> {
        match self.objects.get(key) {
            None => SmallVec::new(),
            Some(object) => match object.group_children() {
                Some(children) => children
                    .iter()
                    .flat_map(|&child| self.leaf_pieces(child))
                    .collect(),
                None => smallvec![key],
            },
        }
    }

    /// Every member below a group, nested groups included
    pub fn descendants(&self, key: ObjectKey) -> Vec<ObjectKey> {
        let mut result = Vec::new();
        let mut stack: Vec<ObjectKey> = self
            .objects
            .get(key)
            .and_then(ModelObject::group_children)
            .map(<[ObjectKey]>::to_vec)
            .unwrap_or_default();
        while let Some(member) = stack.pop() {
            result.push(member);
            if let Some(children) = self.objects.get(member).and_then(ModelObject::group_children) {
                stack.extend_from_slice(children);
            }
        }
        result
    }

    /// Collection items standing on `level`, levels themselves excluded
    pub fn objects_on_level(&self, level: ObjectKey) -> Vec<ObjectKey> {
        Collection::ALL
            .iter()
            .filter(|c| **c != Collection::Levels)
            .flat_map(|c| self.collection(*c).iter().copied())
            .filter(|&key| self.objects.get(key).and_then(ModelObject::level) == Some(level))
            .collect()
    }

    pub fn level_of(&self, key: ObjectKey) -> Option<&Level> {
        let level = self.objects.get(key)?.level()?;
        self.objects.get(level)?.as_level()
    }

    /// Floor elevation of the object's level, 0 without levels
    pub fn level_elevation(&self, key: ObjectKey) -> f64 {
        self.level_of(key).map_or(0.0, |l| l.elevation)
    }

    /// Whether the object shows in the 3D view: it and every enclosing group
    /// are visible, and its level is visible and viewable.
    pub fn is_shown(&self, key: ObjectKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            match self.objects.get(k) {
                Some(object) if object.is_visible() => current = self.parent_of(k),
                _ => return false,
            }
        }
        self.level_of(key).map_or(true, Level::is_viewable_and_visible)
    }

    fn check_level(&self, level: Option<ObjectKey>) -> Result<()> {
        match level {
            None => Ok(()),
            Some(l) => match self.objects.get(l) {
                Some(ModelObject::Level(_)) => Ok(()),
                _ => Err(Error::NotALevel(l)),
            },
        }
    }

    // ========================================================================
    // Structural mutations
    // ========================================================================

    /// Adds an object to its collection.
    ///
    /// Groups must be added empty; see [`Home::add_to_group`].
    pub fn add(&mut self, mut object: ModelObject) -> Result<ObjectKey> {
        let collection = object
            .kind()
            .collection()
            .ok_or(Error::CameraIsPermanent)?;
        self.check_level(object.level())?;
        if let ModelObject::Furniture(furniture) = &mut object {
            if matches!(&furniture.kind, FurnitureKind::Group(c) if !c.is_empty()) {
                return Err(Error::PopulatedGroup);
            }
            furniture.parent = None;
        }

        let key = self.objects.insert(object);
        self.collections[collection.index()].push(key);
        self.fire(
            Target::Collection(collection),
            ModelEvent::Added { collection, key },
        );
        Ok(key)
    }

    /// Removes a collection item and returns its last state.
    ///
    /// Removing a level first removes every object standing on it; removing
    /// a group drops its members with it.
    pub fn remove(&mut self, key: ObjectKey) -> Result<ModelObject> {
        let object = self.get_or_err(key)?;
        let collection = object
            .kind()
            .collection()
            .ok_or(Error::CameraIsPermanent)?;
        if object.as_furniture().is_some_and(|f| f.parent.is_some()) {
            return Err(Error::GroupMember(key));
        }

        if collection == Collection::Levels {
            for dependent in self.objects_on_level(key) {
                self.remove(dependent)?;
            }
        }

        self.collections[collection.index()].retain(|k| *k != key);
        let object = self.delete_subtree(key).ok_or(Error::NotFound(key))?;
        self.fire(
            Target::Collection(collection),
            ModelEvent::Removed {
                collection,
                key,
                object: object.clone(),
            },
        );
        Ok(object)
    }

    fn delete_subtree(&mut self, key: ObjectKey) -> Option<ModelObject> {
        let object = self.objects.remove(key)?;
        if let Some(children) = object.group_children() {
            for &child in children {
                self.delete_subtree(child);
            }
        }
        Some(object)
    }

    fn group_members(&self, group: ObjectKey) -> Result<Vec<ObjectKey>> {
        self.get_or_err(group)?
            .group_children()
            .map(<[ObjectKey]>::to_vec)
            .ok_or(Error::NotAGroup(group))
    }

    fn replace_members(&mut self, group: ObjectKey, old: Vec<ObjectKey>, new: Vec<ObjectKey>) {
        if let Some(ModelObject::Furniture(f)) = self.objects.get_mut(group) {
            f.kind = FurnitureKind::Group(new.clone());
        }
        self.refresh_group_bounds(group);
        self.fire(
            Target::Object(group),
            ModelEvent::Changed {
                key: group,
                property: Property::Children,
                old: PropertyValue::Keys(old),
                new: PropertyValue::Keys(new),
            },
        );
    }

    /// Adds a member to a group and returns the member's key.
    ///
    /// The member takes the group's level. Listeners of the group receive a
    /// `Children` change.
    pub fn add_to_group(&mut self, group: ObjectKey, member: Furniture) -> Result<ObjectKey> {
        let old = self.group_members(group)?;
        if matches!(&member.kind, FurnitureKind::Group(c) if !c.is_empty()) {
            return Err(Error::PopulatedGroup);
        }
        let level = self.get_or_err(group)?.level();
        let key = self.objects.insert(ModelObject::Furniture(Furniture {
            parent: Some(group),
            level,
            ..member
        }));

        let mut new = old.clone();
        new.push(key);
        self.replace_members(group, old, new);
        Ok(key)
    }

    /// Removes a member (and its own members) from a group.
    pub fn remove_from_group(&mut self, group: ObjectKey, member: ObjectKey) -> Result<ModelObject> {
        let old = self.group_members(group)?;
        if !old.contains(&member) {
            return Err(Error::NotFound(member));
        }
        let object = self.delete_subtree(member).ok_or(Error::NotFound(member))?;
        let new = old.iter().copied().filter(|k| *k != member).collect();
        self.replace_members(group, old, new);
        Ok(object)
    }

    /// Fits a group's box, and the boxes of the groups around it, to the
    /// pieces it contains. The box keeps the group's angle.
    fn refresh_group_bounds(&mut self, group: ObjectKey) {
        let mut current = Some(group);
        while let Some(group) = current {
            let angle = self
                .objects
                .get(group)
                .and_then(ModelObject::piece)
                .map_or(0.0, |p| p.angle);
            let to_group = Rotation2::new(-angle);
            let mut min = Point2::new(f64::MAX, f64::MAX);
            let mut max = Point2::new(f64::MIN, f64::MIN);
            let (mut bottom, mut top) = (f64::MAX, f64::MIN);
            for leaf in self.leaf_pieces(group) {
                let Some(piece) = self.objects.get(leaf).and_then(ModelObject::piece) else {
                    continue;
                };
                for p in piece.points() {
                    let p = to_group * p.coords;
                    min = Point2::new(min.x.min(p.x), min.y.min(p.y));
                    max = Point2::new(max.x.max(p.x), max.y.max(p.y));
                }
                bottom = bottom.min(piece.elevation);
                top = top.max(piece.top());
            }

            let Some(ModelObject::Furniture(f)) = self.objects.get_mut(group) else {
                return;
            };
            if bottom <= top {
                let center = Rotation2::new(angle) * ((min.coords + max.coords) / 2.0);
                f.piece.x = center.x;
                f.piece.y = center.y;
                f.piece.width = max.x - min.x;
                f.piece.depth = max.y - min.y;
                f.piece.elevation = bottom;
                f.piece.height = top - bottom;
            }
            current = f.parent;
        }
    }

    /// Carries a change of a group's box over to one of its members.
    ///
    /// Members keep their place relative to the box: they follow its
    /// translation and rotation and stretch with its size.
    fn place_member(&mut self, member: ObjectKey, before: &Piece, after: &Piece) -> Result<()> {
        let Some(piece) = self.objects.get(member).and_then(ModelObject::piece).cloned() else {
            return Ok(());
        };
        let ratio = |new: f64, old: f64| if old > 0.0 { new / old } else { 1.0 };
        let sx = ratio(after.width, before.width);
        let sy = ratio(after.depth, before.depth);
        let sz = ratio(after.height, before.height);

        let offset = Rotation2::new(-before.angle) * Vector2::new(piece.x - before.x, piece.y - before.y);
        let center =
            Rotation2::new(after.angle) * Vector2::new(offset.x * sx, offset.y * sy) + Vector2::new(after.x, after.y);
        let mut placement = vec![
            (Property::X, center.x),
            (Property::Y, center.y),
            (Property::Angle, piece.angle + after.angle - before.angle),
            (Property::Elevation, after.elevation + (piece.elevation - before.elevation) * sz),
            (Property::Height, piece.height * sz),
        ];
        if sx != 1.0 || sy != 1.0 {
            // Exact for members square to the group, approximate otherwise
            let stretch = |angle: f64| (angle.cos() * sx).hypot(angle.sin() * sy);
            let relative = piece.angle - before.angle;
            placement.push((Property::Width, piece.width * stretch(relative)));
            placement.push((Property::Depth, piece.depth * stretch(relative + FRAC_PI_2)));
        }
        for (property, value) in placement {
            self.apply_property(member, property, PropertyValue::Number(value))?;
        }
        Ok(())
    }

    // ========================================================================
    // Attribute mutations
    // ========================================================================

    /// Sets one property and notifies the object's listeners if the value
    /// actually changed.
    ///
    /// Placing or sizing a group places its members, each with its own
    /// change events. Placing a member refits the boxes of its groups.
    pub fn set_property(
        &mut self,
        key: ObjectKey,
        property: Property,
        value: PropertyValue,
    ) -> Result<()> {
        self.apply_property(key, property, value)?;
        if is_placement(property) {
            if let Some(parent) = self.parent_of(key) {
                self.refresh_group_bounds(parent);
            }
        }
        Ok(())
    }

    fn apply_property(&mut self, key: ObjectKey, property: Property, value: PropertyValue) -> Result<()> {
        if property == Property::Level {
            self.check_level(value.as_key(property)?)?;
            if self.parent_of(key).is_some() {
                return Err(Error::GroupMember(key));
            }
        }

        let object = self.objects.get_mut(key).ok_or(Error::NotFound(key))?;
        let members = match object.group_children() {
            Some(children) if is_placement(property) => children.to_vec(),
            _ => Vec::new(),
        };
        let before = object.piece().cloned();
        let old = object.set_property(property, &value)?;
        let new = object.get_property(property)?;
        let after = object.piece().cloned();

        if property == Property::Level {
            // Group members share their group's level
            let level = object.level();
            for member in self.descendants(key) {
                if let Some(o) = self.objects.get_mut(member) {
                    o.set_level_unchecked(level);
                }
            }
        }

        if old == new {
            return Ok(());
        }
        if let (false, Some(before), Some(after)) = (members.is_empty(), before, after) {
            for member in members {
                self.place_member(member, &before, &after)?;
            }
            self.refresh_group_bounds(key);
        }
        self.fire(
            Target::Object(key),
            ModelEvent::Changed {
                key,
                property,
                old,
                new,
            },
        );
        Ok(())
    }

    /// Translates a piece, light or group in the floor plane.
    ///
    /// Group members follow, each with its own change events.
    pub fn move_piece(&mut self, key: ObjectKey, dx: f64, dy: f64) -> Result<()> {
        let object = self.get_or_err(key)?;
        let piece = object.piece().ok_or(Error::UnsupportedProperty {
            kind: object.kind(),
            property: Property::X,
        })?;
        let (x, y) = (piece.x, piece.y);
        self.set_property(key, Property::X, PropertyValue::Number(x + dx))?;
        self.set_property(key, Property::Y, PropertyValue::Number(y + dy))
    }

    pub fn set_camera_pose(&mut self, pose: CameraPose) -> Result<()> {
        self.set_property(self.camera, Property::Pose, PropertyValue::Pose(pose))
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Subscribes to additions and removals in a collection.
    pub fn subscribe_collection(
        &self,
        collection: Collection,
        listener: SharedListener,
    ) -> SubscriptionId {
        self.listeners
            .borrow_mut()
            .subscribe(Target::Collection(collection), listener)
    }

    /// Subscribes to attribute changes of one object.
    pub fn subscribe_object(&self, key: ObjectKey, listener: SharedListener) -> SubscriptionId {
        self.listeners
            .borrow_mut()
            .subscribe(Target::Object(key), listener)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().unsubscribe(id)
    }

    /// Number of live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Number of live subscriptions to one object
    pub fn object_listener_count(&self, key: ObjectKey) -> usize {
        self.listeners.borrow().count_for(Target::Object(key))
    }

    /// Delivers an event to the listeners subscribed when it was fired.
    ///
    /// A listener unsubscribed by an earlier callback of the same event is
    /// skipped.
    fn fire(&self, target: Target, event: ModelEvent) {
        let listeners = self.listeners.borrow().matching(target);
        for (id, listener) in listeners {
            if !self.listeners.borrow().contains(id) {
                continue;
            }
            listener.borrow_mut().model_changed(self, &event);
        }
    }
}

/// Attributes of a piece's box that a group hands down to its members
fn is_placement(property: Property) -> bool {
    matches!(
        property,
        Property::X
            | Property::Y
            | Property::Elevation
            | Property::Angle
            | Property::Width
            | Property::Depth
            | Property::Height
    )
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Home {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Home")
            .field("objects", &self.objects.len())
            .field("walls", &self.collection(Collection::Walls).len())
            .field("furniture", &self.collection(Collection::Furniture).len())
            .field("levels", &self.collection(Collection::Levels).len())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Convenience alias for the shared ownership the 3D view uses
pub type SharedHome = Rc<RefCell<Home>>;
