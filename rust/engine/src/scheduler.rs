// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coalescing of scene invalidations.
//!
//! Model handlers only record which objects need work. The first record
//! after a drain asks the caller to post one task on the UI executor; every
//! later record until that task runs is absorbed by the pending set.

use planview_core::ObjectKey;
use rustc_hash::FxHashSet;

/// Insertion-ordered set of object keys.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    order: Vec<ObjectKey>,
    members: FxHashSet<ObjectKey>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key was not already in the set
    pub fn insert(&mut self, key: ObjectKey) -> bool {
        if self.members.insert(key) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.members.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Empties the set, returning its keys in insertion order
    pub fn take(&mut self) -> Vec<ObjectKey> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }
}

/// Objects waiting for a node rebuild.
#[derive(Debug, Default)]
pub struct DeferredUpdates {
    dirty: DirtySet,
    task_posted: bool,
}

impl DeferredUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` and returns `true` when the caller must post the drain
    /// task.
    pub fn mark(&mut self, key: ObjectKey) -> bool {
        self.dirty.insert(key);
        if self.task_posted {
            false
        } else {
            self.task_posted = true;
            true
        }
    }

    /// Snapshot consumed by the drain task.
    ///
    /// Marks recorded after this call schedule a new task.
    pub fn drain(&mut self) -> Vec<ObjectKey> {
        self.task_posted = false;
        self.dirty.take()
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.dirty.contains(key)
    }

    pub fn is_task_posted(&self) -> bool {
        self.task_posted
    }

    /// Forgets a posted task that will not run; the keys stay pending
    pub fn abandon(&mut self) {
        self.task_posted = false;
    }
}

/// What the next light scope pass has to cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeWork {
    Everything,
    Objects(Vec<ObjectKey>),
    Nothing,
}

/// Pending light scope recomputations.
///
/// A request for everything supersedes any list of objects.
#[derive(Debug, Default)]
pub struct ScopeRequests {
    objects: DirtySet,
    everything: bool,
    task_posted: bool,
}

impl ScopeRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the caller must post the drain task
    pub fn mark_object(&mut self, key: ObjectKey) -> bool {
        if !self.everything {
            self.objects.insert(key);
        }
        self.post()
    }

    /// Returns `true` when the caller must post the drain task
    pub fn mark_everything(&mut self) -> bool {
        self.everything = true;
        self.objects.take();
        self.post()
    }

    fn post(&mut self) -> bool {
        !std::mem::replace(&mut self.task_posted, true)
    }

    pub fn drain(&mut self) -> ScopeWork {
        self.task_posted = false;
        let objects = self.objects.take();
        if std::mem::take(&mut self.everything) {
            ScopeWork::Everything
        } else if objects.is_empty() {
            ScopeWork::Nothing
        } else {
            ScopeWork::Objects(objects)
        }
    }

    pub fn is_task_posted(&self) -> bool {
        self.task_posted
    }

    /// Forgets a posted task that will not run; the requests stay pending
    pub fn abandon(&mut self) {
        self.task_posted = false;
    }
}
