// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh deduplication.
//!
//! Identical meshes (same furniture model placed twice at the same spot,
//! rebuilt nodes whose geometry did not change) share one `Arc<Mesh>`.
//! Entries are keyed by [`Mesh::content_hash`] and confirmed by equality.

use std::sync::Arc;

use planview_geometry::Mesh;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Bounded cache of shared meshes, owned by one node factory.
#[derive(Debug)]
pub struct MeshCache {
    meshes: FxHashMap<u64, Arc<Mesh>>,
    capacity: usize,
    stats: CacheStats,
}

impl MeshCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            meshes: FxHashMap::default(),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached mesh equal to `mesh`, or caches `mesh`
    pub fn intern(&mut self, mesh: Mesh) -> Arc<Mesh> {
        let hash = mesh.content_hash();
        if let Some(cached) = self.meshes.get(&hash) {
            if **cached == mesh {
                self.stats.hits += 1;
                return Arc::clone(cached);
            }
            // Hash collision: keep the resident entry
            self.stats.misses += 1;
            return Arc::new(mesh);
        }

        self.stats.misses += 1;
        let mesh = Arc::new(mesh);
        if self.meshes.len() >= self.capacity {
            self.evict_unused();
        }
        if self.meshes.len() < self.capacity {
            self.meshes.insert(hash, Arc::clone(&mesh));
        }
        mesh
    }

    /// Drops entries no scene node refers to anymore
    pub fn evict_unused(&mut self) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|_, mesh| Arc::strong_count(mesh) > 1);
        let evicted = before - self.meshes.len();
        self.stats.evictions += evicted as u64;
        evicted
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Releases every entry
    pub fn dispose(&mut self) {
        tracing::debug!(entries = self.meshes.len(), "mesh cache disposed");
        self.meshes.clear();
    }
}
