// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static floor shadow under ground furniture.

use std::sync::atomic::{AtomicBool, Ordering};

use planview_core::{Collection, Home, ModelObject, ObjectKey};
use planview_geometry::{planar_mesh, polygon_union, Mesh, Point2, Region};

use crate::factory::NodeFactory;

/// Height of the shadow surface above its level floor
pub const SHADOW_OFFSET: f64 = 0.1;

/// Cancellation flag polled by long computations.
pub trait Interrupt {
    fn is_interrupted(&self) -> bool;
}

impl Interrupt for AtomicBool {
    fn is_interrupted(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterrupted;

impl Interrupt for NeverInterrupted {
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// Shadow of one level
#[derive(Debug, Clone)]
pub struct LevelShadow {
    pub level: Option<ObjectKey>,
    pub region: Region,
    pub mesh: Mesh,
}

pub struct ShadowProjector;

impl ShadowProjector {
    /// Projects the footprints of ground furniture, one surface per level.
    ///
    /// Returns `None` when interrupted; a partial shadow is never produced.
    pub fn project(
        home: &Home,
        factory: &dyn NodeFactory,
        interrupt: &dyn Interrupt,
    ) -> Option<Vec<LevelShadow>> {
        let mut levels: Vec<(Option<ObjectKey>, Vec<Vec<Point2<f64>>>)> = Vec::new();
        for &key in home.collection(Collection::Furniture) {
            for leaf in home.leaf_pieces(key) {
                if interrupt.is_interrupted() {
                    tracing::debug!("shadow computation interrupted");
                    return None;
                }
                let Some(ModelObject::Furniture(furniture)) = home.get(leaf) else {
                    continue;
                };
                if furniture.door_or_window
                    || furniture.piece.elevation != 0.0
                    || !home.is_shown(leaf)
                {
                    continue;
                }
                let Some(footprint) = factory.floor_footprint(home, leaf) else {
                    continue;
                };
                match levels.iter_mut().find(|(l, _)| *l == furniture.level) {
                    Some((_, footprints)) => footprints.push(footprint),
                    None => levels.push((furniture.level, vec![footprint])),
                }
            }
        }

        let shadows = levels
            .into_iter()
            .filter_map(|(level, footprints)| {
                let region = polygon_union(&footprints);
                if region.is_empty() {
                    return None;
                }
                let floor = level
                    .and_then(|l| home.get(l)?.as_level().map(|l| l.elevation))
                    .unwrap_or(0.0);
                let mut mesh = Mesh::new();
                for shape in region.shapes() {
                    match planar_mesh(shape, floor + SHADOW_OFFSET, true) {
                        Ok(part) => mesh.merge(&part),
                        Err(error) => tracing::warn!(%error, "skipping shadow shape"),
                    }
                }
                Some(LevelShadow { level, region, mesh })
            })
            .collect();
        Some(shadows)
    }
}
