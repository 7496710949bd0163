// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notification.
//!
//! Listeners subscribe either to a collection (structural add/remove events)
//! or to one object (attribute change events). Callbacks receive the home
//! by shared reference: they can read the model and manage subscriptions,
//! but cannot mutate objects while an event is being delivered.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::home::Home;
use crate::keys::{Collection, ObjectKey, SubscriptionId};
use crate::object::ModelObject;
use crate::property::{Property, PropertyValue};

/// A model mutation as seen by listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// An object joined a collection
    Added { collection: Collection, key: ObjectKey },
    /// An object left a collection; `object` is its last state
    Removed {
        collection: Collection,
        key: ObjectKey,
        object: ModelObject,
    },
    /// An attribute of a live object changed
    Changed {
        key: ObjectKey,
        property: Property,
        old: PropertyValue,
        new: PropertyValue,
    },
}

impl ModelEvent {
    pub fn key(&self) -> ObjectKey {
        match self {
            ModelEvent::Added { key, .. }
            | ModelEvent::Removed { key, .. }
            | ModelEvent::Changed { key, .. } => *key,
        }
    }
}

/// Receiver of model events.
pub trait ModelListener {
    fn model_changed(&mut self, home: &Home, event: &ModelEvent);
}

/// Shared handle to a listener as stored by the home.
pub type SharedListener = Rc<RefCell<dyn ModelListener>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Collection(Collection),
    Object(ObjectKey),
}

struct Entry {
    id: SubscriptionId,
    target: Target,
    listener: SharedListener,
}

/// Subscriptions in registration order
#[derive(Default)]
pub(crate) struct ListenerTable {
    next_id: u64,
    entries: Vec<Entry>,
}

impl ListenerTable {
    pub(crate) fn subscribe(&mut self, target: Target, listener: SharedListener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Entry {
            id,
            target,
            listener,
        });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        // Ids are handed out in increasing order
        match self.entries.binary_search_by_key(&id, |e| e.id) {
            Ok(index) => {
                self.entries.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.binary_search_by_key(&id, |e| e.id).is_ok()
    }

    pub(crate) fn matching(&self, target: Target) -> SmallVec<[(SubscriptionId, SharedListener); 4]> {
        self.entries
            .iter()
            .filter(|e| e.target == target)
            .map(|e| (e.id, Rc::clone(&e.listener)))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn count_for(&self, target: Target) -> usize {
        self.entries.iter().filter(|e| e.target == target).count()
    }
}
