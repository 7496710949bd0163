// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bidirectional mapping between model objects and scene nodes.
//!
//! The registry is the only place object nodes are attached to or detached
//! from the scene root, so a node is attached exactly while its object is
//! registered.

use planview_core::{Home, ModelObject, ObjectKey};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::scene::{NodeKey, SceneGraph};

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    nodes: FxHashMap<ObjectKey, NodeKey>,
    owners: FxHashMap<NodeKey, ObjectKey>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `key` to `node` and attaches the node under the scene root
    pub fn register(&mut self, key: ObjectKey, node: NodeKey, scene: &mut SceneGraph) -> Result<()> {
        if self.nodes.contains_key(&key) {
            return Err(Error::AlreadyRegistered(key));
        }
        scene.attach(node, scene.root())?;
        self.nodes.insert(key, node);
        self.owners.insert(node, key);
        tracing::trace!(?key, ?node, "registered");
        Ok(())
    }

    /// Removes the mapping of `key` and detaches its node.
    ///
    /// The node stays in the scene arena; the caller decides whether to
    /// destroy it.
    pub fn unregister(&mut self, key: ObjectKey, scene: &mut SceneGraph) -> Result<NodeKey> {
        let node = self.nodes.remove(&key).ok_or(Error::NotRegistered(key))?;
        self.owners.remove(&node);
        scene.detach(node);
        tracing::trace!(?key, ?node, "unregistered");
        Ok(node)
    }

    pub fn lookup(&self, key: ObjectKey) -> Option<NodeKey> {
        self.nodes.get(&key).copied()
    }

    /// Object owning the top node `node`
    pub fn owner(&self, node: NodeKey) -> Option<ObjectKey> {
        self.owners.get(&node).copied()
    }

    pub fn contains(&self, key: ObjectKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Entries whose live model object satisfies `predicate`
    pub fn nodes_matching<'a, P>(
        &'a self,
        home: &'a Home,
        mut predicate: P,
    ) -> impl Iterator<Item = (ObjectKey, NodeKey)> + 'a
    where
        P: FnMut(ObjectKey, &ModelObject) -> bool + 'a,
    {
        self.nodes.iter().filter_map(move |(&key, &node)| {
            let object = home.get(key)?;
            predicate(key, object).then_some((key, node))
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, NodeKey)> + '_ {
        self.nodes.iter().map(|(&k, &n)| (k, n))
    }
}
