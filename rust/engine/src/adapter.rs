// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of model events into scene work.
//!
//! Structural events (objects joining or leaving a collection) are applied
//! synchronously through the registry. Attribute events only mark objects
//! dirty; the rebuild happens in the next update pass. Events of a group
//! member are attributed to the top-level group that owns the scene node.

use std::cell::RefCell;
use std::rc::Rc;

use planview_core::{
    Collection, Home, LightKind, ModelEvent, ModelListener, ModelObject, ObjectKey, ObjectKind,
    Property, PropertyValue,
};
use planview_geometry::bool2d::{bounds_overlap, contour_bounds};
use planview_geometry::Point2;

use crate::view::ViewState;

/// How an attribute change affects the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeClass {
    /// Footprint, size, placement or visibility: rebuild and rescope
    Geometry,
    /// Surface attributes only: rebuild
    Appearance,
    /// A level moved or was hidden: everything on it is affected
    LevelLayout,
    /// Group members were added or removed
    Membership,
    CameraPose,
    Ignored,
}

/// Classifies a change of `property` on an object of kind `kind`
pub fn classify(kind: ObjectKind, property: Property) -> ChangeClass {
    use Property as P;

    match kind {
        ObjectKind::Level => match property {
            P::Elevation | P::Height | P::FloorThickness | P::Visible | P::Viewable => {
                ChangeClass::LevelLayout
            }
            _ => ChangeClass::Ignored,
        },
        ObjectKind::Camera => match property {
            P::Pose => ChangeClass::CameraPose,
            _ => ChangeClass::Ignored,
        },
        _ => match property {
            P::Children => ChangeClass::Membership,
            P::X
            | P::Y
            | P::Elevation
            | P::Angle
            | P::Width
            | P::Depth
            | P::Height
            | P::HeightAtEnd
            | P::Thickness
            | P::XStart
            | P::YStart
            | P::XEnd
            | P::YEnd
            | P::ArcExtent
            | P::ModelMirrored
            | P::Visible
            | P::Level
            | P::Points
            | P::FloorVisible
            | P::CeilingVisible => ChangeClass::Geometry,
            P::Color
            | P::LeftSideColor
            | P::RightSideColor
            | P::FloorColor
            | P::CeilingColor
            | P::Texture
            | P::Shininess
            | P::Power
            | P::Text => ChangeClass::Appearance,
            P::Name | P::Pose | P::Viewable | P::FloorThickness => ChangeClass::Ignored,
        },
    }
}

/// Model listener registered by a view for collections and objects.
///
/// Holds the view state until [`release`](Self::release) is called on
/// disposal; the subscriptions and posted passes in turn hold the listener.
pub(crate) struct AdapterListener {
    view: Option<Rc<RefCell<ViewState>>>,
}

impl AdapterListener {
    pub fn new(view: Rc<RefCell<ViewState>>) -> Self {
        Self { view: Some(view) }
    }

    pub fn view(&self) -> Option<Rc<RefCell<ViewState>>> {
        self.view.clone()
    }

    /// Drops the view state; later events and passes are ignored
    pub fn release(&mut self) {
        self.view = None;
    }
}

impl ModelListener for AdapterListener {
    fn model_changed(&mut self, home: &Home, event: &ModelEvent) {
        let Some(state) = self.view.as_ref() else {
            return;
        };
        let Ok(mut view) = state.try_borrow_mut() else {
            tracing::warn!(key = ?event.key(), "view busy, model event dropped");
            return;
        };
        if view.disposed {
            return;
        }
        match event {
            ModelEvent::Added { collection, key } => view.object_added(home, *collection, *key),
            ModelEvent::Removed {
                collection,
                key,
                object,
            } => view.object_removed(home, *collection, *key, object),
            ModelEvent::Changed {
                key,
                property,
                old,
                new,
            } => view.object_changed(home, *key, *property, old, new),
        }
    }
}

fn is_directional_light(object: &ModelObject) -> bool {
    matches!(object, ModelObject::Light(l) if l.kind == LightKind::Directional)
}

/// Plan bounds of a door or window shown in the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OpeningBounds {
    level: Option<ObjectKey>,
    min: Point2<f64>,
    max: Point2<f64>,
}

/// Doors and windows shown at the leaves of a collection item
fn openings_of(home: &Home, root: ObjectKey) -> Vec<OpeningBounds> {
    home.leaf_pieces(root)
        .into_iter()
        .filter(|&leaf| home.is_shown(leaf))
        .filter_map(|leaf| {
            let object = home.get(leaf).filter(|o| o.is_door_or_window())?;
            let (min, max) = contour_bounds(&object.points())?;
            Some(OpeningBounds {
                level: object.level(),
                min,
                max,
            })
        })
        .collect()
}

impl ViewState {
    /// Records the openings of a collection item and returns those
    /// recorded before
    pub fn track_openings(&mut self, home: &Home, root: ObjectKey) -> Vec<OpeningBounds> {
        let now = openings_of(home, root);
        let before = if now.is_empty() {
            self.openings.remove(&root)
        } else {
            self.openings.insert(root, now)
        };
        before.unwrap_or_default()
    }

    /// Marks the walls around the openings of a collection item, both where
    /// they were last seen and where they stand now.
    fn refresh_openings(&mut self, home: &Home, root: ObjectKey) {
        let before = self.track_openings(home, root);
        let now = self.openings.get(&root).cloned().unwrap_or_default();
        for opening in before.iter().chain(&now) {
            self.mark_walls_near(home, opening);
        }
    }

    fn object_added(&mut self, home: &Home, collection: Collection, key: ObjectKey) {
        if collection == Collection::Levels {
            if let Some(listener) = self.listener.clone() {
                let id = home.subscribe_object(key, listener);
                self.level_subscriptions.insert(key, id);
            }
            return;
        }
        let Some(object) = home.get(key) else {
            return;
        };
        if !self.build_object(home, key) {
            return;
        }
        tracing::debug!(?key, kind = %object.kind(), "object added");

        if matches!(object, ModelObject::Wall(_)) || is_directional_light(object) {
            self.request_full_scope();
        } else {
            self.request_scope(key);
        }
        if let ModelObject::Furniture(_) = object {
            self.flag_shadow();
            self.refresh_openings(home, key);
        }
    }

    fn object_removed(
        &mut self,
        home: &Home,
        collection: Collection,
        key: ObjectKey,
        object: &ModelObject,
    ) {
        if collection == Collection::Levels {
            if let Some(id) = self.level_subscriptions.remove(&key) {
                home.unsubscribe(id);
            }
            return;
        }
        self.destroy_object(home, key);
        tracing::debug!(?key, kind = %object.kind(), "object removed");

        match object {
            ModelObject::Wall(_) => self.request_full_scope(),
            ModelObject::Furniture(_) => {
                self.flag_shadow();
                // Members are gone too: only the recorded openings remain
                self.refresh_openings(home, key);
            }
            _ => {}
        }
    }

    fn object_changed(
        &mut self,
        home: &Home,
        key: ObjectKey,
        property: Property,
        old: &PropertyValue,
        new: &PropertyValue,
    ) {
        let Some(object) = home.get(key) else {
            return;
        };
        match classify(object.kind(), property) {
            ChangeClass::CameraPose => {
                if let PropertyValue::Pose(pose) = new {
                    self.camera.request(*pose);
                }
            }
            ChangeClass::LevelLayout => {
                for member in home.objects_on_level(key) {
                    self.mark_dirty(member);
                    self.track_openings(home, member);
                }
                self.request_full_scope();
            }
            ChangeClass::Ignored => {}
            class => {
                let root = home.root_of(key);
                // Not built, or a level event routed through its objects
                if !self.registry.contains(root) {
                    return;
                }
                tracing::trace!(?key, ?property, ?old, ?new, "object changed");
                self.mark_dirty(root);
                match class {
                    ChangeClass::Geometry => self.geometry_changed(home, key, root),
                    ChangeClass::Membership => {
                        self.subscribe_object_tree(home, root);
                        self.request_scope(root);
                        self.flag_shadow();
                        self.refresh_openings(home, root);
                    }
                    _ => {}
                }
            }
        }
    }

    fn geometry_changed(&mut self, home: &Home, key: ObjectKey, root: ObjectKey) {
        let Some(object) = home.get(key) else {
            return;
        };
        if matches!(object, ModelObject::Wall(_)) {
            self.request_full_scope();
            return;
        }
        self.request_scope(root);
        if matches!(object, ModelObject::Furniture(_)) {
            self.flag_shadow();
            self.refresh_openings(home, root);
        }
    }

    /// Marks dirty every wall on the opening's level whose bounds meet it
    fn mark_walls_near(&mut self, home: &Home, opening: &OpeningBounds) {
        let walls: Vec<ObjectKey> = home
            .walls()
            .filter(|(_, wall)| wall.level == opening.level)
            .filter(|(_, wall)| {
                contour_bounds(&wall.points()).is_some_and(|(w_min, w_max)| {
                    bounds_overlap(&opening.min, &opening.max, &w_min, &w_max)
                })
            })
            .map(|(key, _)| key)
            .collect();
        for wall in walls {
            self.mark_dirty(wall);
        }
    }

    fn flag_shadow(&mut self) {
        if self.config.shadow_on_floor && !self.shadow_stale {
            tracing::debug!("floor shadow is stale");
            self.shadow_stale = true;
        }
    }
}
