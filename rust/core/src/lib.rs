// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planview Core
//!
//! The mutable interior-design model shown by the planview 3D view.
//!
//! ## Overview
//!
//! - **Arena storage**: every wall, room, piece of furniture, light, label,
//!   polyline and level lives in one [`Home`] keyed by [`ObjectKey`]
//! - **Observable collections**: additions and removals are reported to
//!   collection listeners
//! - **Observable attributes**: each [`Property`] change is reported to the
//!   object's listeners with its old and new value
//! - **Furniture groups**: nested groups with recursive moves and cascading
//!   removal
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use planview_core::{Collection, Home, ModelEvent, ModelListener, ModelObject, Wall};
//!
//! struct Counter(usize);
//!
//! impl ModelListener for Counter {
//!     fn model_changed(&mut self, _home: &Home, _event: &ModelEvent) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let mut home = Home::new();
//! let counter = Rc::new(RefCell::new(Counter(0)));
//! home.subscribe_collection(Collection::Walls, counter.clone());
//!
//! home.add(ModelObject::Wall(Wall::new(0.0, 0.0, 400.0, 0.0, 15.0, 250.0)))
//!     .unwrap();
//! assert_eq!(counter.borrow().0, 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for value types

pub mod camera;
pub mod error;
pub mod events;
pub mod home;
pub mod keys;
pub mod object;
pub mod property;
pub mod wall;

pub use camera::CameraPose;
pub use error::{Error, Result};
pub use events::{ModelEvent, ModelListener, SharedListener};
pub use home::{Home, SharedHome};
pub use keys::{Collection, ObjectKey, ObjectKind, SubscriptionId};
pub use object::{
    Furniture, FurnitureKind, Label, Level, Light, LightKind, ModelObject, Piece, Polyline, Room,
};
pub use property::{Property, PropertyValue};
pub use wall::{Wall, WallPart};
