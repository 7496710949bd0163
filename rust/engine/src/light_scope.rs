// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directional light scoping.
//!
//! Sunlight-like lights should not light surfaces enclosed by walls. Per
//! level, the footprints of all walls (slightly thinned so touching walls
//! still merge) are unioned; the outer contours of that union bound the
//! walls-enclosed area. Wall faces, rooms, furniture and light fixtures with
//! any boundary point outside that area go into the scope of every
//! directional light.
//!
//! The enclosed areas are cached. Changes to non-wall objects only retest
//! those objects; wall changes drop the cache.

use planview_core::{Home, ModelObject, ObjectKey};
use planview_geometry::{polygon_union, Point2, Region};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::registry::ObjectRegistry;
use crate::scene::{LightSourceKind, NodeKey, NodeRole, SceneGraph};

/// Thickness removed from walls before their footprints are unioned
pub const WALL_THICKNESS_MARGIN: f64 = 0.5;

/// Walls-enclosed area of each level, `None` keying homes without levels
type EnclosedAreas = FxHashMap<Option<ObjectKey>, Region>;

#[derive(Debug)]
pub struct LightScopeCalculator {
    subpart_size: f64,
    enclosed: Option<EnclosedAreas>,
}

impl LightScopeCalculator {
    pub fn new(subpart_size: f64) -> Self {
        Self {
            subpart_size,
            enclosed: None,
        }
    }

    pub fn subpart_size(&self) -> f64 {
        self.subpart_size
    }

    pub fn set_subpart_size(&mut self, size: f64) {
        self.subpart_size = size;
        self.enclosed = None;
    }

    /// Scoping is enabled by a positive subpart size
    pub fn is_active(&self) -> bool {
        self.subpart_size > 0.0
    }

    /// Drops the cached enclosed areas, forcing the next pass to be full
    pub fn invalidate(&mut self) {
        self.enclosed = None;
    }

    pub fn has_cache(&self) -> bool {
        self.enclosed.is_some()
    }

    /// Attached nodes emitting directional light
    pub fn directional_lights(scene: &SceneGraph) -> Vec<NodeKey> {
        scene
            .lights()
            .filter(|(_, light)| light.kind == LightSourceKind::Directional)
            .map(|(key, _)| key)
            .filter(|key| scene.is_attached(*key))
            .collect()
    }

    /// Recomputes the scope of every directional light from scratch
    pub fn recompute_all(&mut self, home: &Home, registry: &ObjectRegistry, scene: &mut SceneGraph) {
        let lights = Self::directional_lights(scene);
        if !self.is_active() {
            self.enclosed = None;
            for light in lights {
                scene.set_light_scope(light, None);
            }
            return;
        }

        let enclosed = enclosed_areas(home);
        let mut scope = FxHashSet::default();
        for (key, node) in registry.nodes_matching(home, |_, o| is_scoped_kind(o)) {
            scope.extend(outside_nodes(home, scene, &enclosed, key, node));
        }
        tracing::debug!(
            levels = enclosed.len(),
            scoped = scope.len(),
            lights = lights.len(),
            "light scopes recomputed"
        );
        for light in lights {
            scene.set_light_scope(light, Some(scope.clone()));
        }
        self.enclosed = Some(enclosed);
    }

    /// Retests the given objects against the cached enclosed areas.
    ///
    /// Falls back to a full pass when the cache is gone or a directional
    /// light has no scope yet.
    pub fn recompute_objects(
        &mut self,
        home: &Home,
        registry: &ObjectRegistry,
        scene: &mut SceneGraph,
        keys: &[ObjectKey],
    ) {
        if !self.is_active() {
            return;
        }
        let lights = Self::directional_lights(scene);
        let Some(enclosed) = self
            .enclosed
            .as_ref()
            .filter(|_| lights.iter().all(|l| scene.light_scope(*l).is_some()))
        else {
            self.recompute_all(home, registry, scene);
            return;
        };

        let mut removed: Vec<NodeKey> = Vec::new();
        let mut added: Vec<NodeKey> = Vec::new();
        for &key in keys {
            let Some(node) = registry.lookup(key) else {
                continue;
            };
            removed.extend(scene.subtree(node));
            if home.get(key).is_some_and(is_scoped_kind) {
                added.extend(outside_nodes(home, scene, enclosed, key, node));
            }
        }
        for light in lights {
            let stale: Vec<NodeKey> = scene
                .light_scope(light)
                .map(|s| s.iter().copied().filter(|n| !scene.contains(*n)).collect())
                .unwrap_or_default();
            if let Some(scope) = scene.light_scope_mut(light) {
                for node in removed.iter().chain(&stale) {
                    scope.remove(node);
                }
                scope.extend(added.iter().copied());
            }
        }
        tracing::trace!(objects = keys.len(), added = added.len(), "light scopes updated");
    }

    /// Removes nodes about to be destroyed from every scope
    pub fn forget(&mut self, scene: &mut SceneGraph, nodes: &[NodeKey]) {
        for light in Self::directional_lights(scene) {
            if let Some(scope) = scene.light_scope_mut(light) {
                for node in nodes {
                    scope.remove(node);
                }
            }
        }
    }
}

fn is_scoped_kind(object: &ModelObject) -> bool {
    matches!(
        object,
        ModelObject::Wall(_)
            | ModelObject::Room(_)
            | ModelObject::Furniture(_)
            | ModelObject::Light(_)
    )
}

fn enclosed_areas(home: &Home) -> EnclosedAreas {
    let mut footprints: FxHashMap<Option<ObjectKey>, Vec<Vec<Point2<f64>>>> = FxHashMap::default();
    for (_, wall) in home.walls() {
        let thickness = (wall.thickness - WALL_THICKNESS_MARGIN).max(0.0);
        footprints
            .entry(wall.level)
            .or_default()
            .push(wall.points_with_thickness(thickness));
    }
    footprints
        .into_iter()
        .map(|(level, polygons)| (level, polygon_union(&polygons).filled()))
        .collect()
}

/// Nodes of `key` with a boundary point outside the enclosed area of its level
fn outside_nodes(
    home: &Home,
    scene: &SceneGraph,
    enclosed: &EnclosedAreas,
    key: ObjectKey,
    node: NodeKey,
) -> Vec<NodeKey> {
    let Some(object) = home.get(key) else {
        return Vec::new();
    };
    let empty = Region::empty();
    let area = enclosed.get(&object.level()).unwrap_or(&empty);
    let outside = |points: &[Point2<f64>]| points.iter().any(|p| !area.contains_point(p.x, p.y));

    match object {
        ModelObject::Wall(wall) => scene
            .children(node)
            .iter()
            .copied()
            .filter(|child| match scene.get(*child).map(|n| n.role) {
                Some(NodeRole::WallPart(part)) => outside(&wall.part_points(part)),
                _ => false,
            })
            .collect(),
        ModelObject::Room(room) => {
            if outside(&room.points) {
                vec![node]
            } else {
                Vec::new()
            }
        }
        ModelObject::Furniture(_) | ModelObject::Light(_) => {
            let points: Vec<Point2<f64>> = home
                .leaf_pieces(key)
                .into_iter()
                .filter_map(|leaf| home.get(leaf)?.piece().map(|p| p.points()))
                .flatten()
                .collect();
            if outside(&points) {
                vec![node]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{BuildOptions, MeshNodeFactory, NodeFactory, NodeUpdate};
    use crate::scene::{LightSource, SceneNode};
    use planview_core::{Furniture, Light, LightKind, Piece, Property, PropertyValue, Wall, WallPart};

    fn piece(name: &str, x: f64, y: f64, width: f64, depth: f64) -> ModelObject {
        ModelObject::Furniture(Furniture::piece(Piece::new(name, x, y, width, depth, 50.0)))
    }

    struct Fixture {
        home: Home,
        scene: SceneGraph,
        registry: ObjectRegistry,
        factory: MeshNodeFactory,
        sun: NodeKey,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = SceneGraph::new();
            let mut source = SceneNode::new(NodeRole::DefaultLight);
            source.light = Some(LightSource::new(LightSourceKind::Directional, 0xFFFFFF));
            let sun = scene.add_child(scene.root(), source).unwrap();
            Self {
                home: Home::new(),
                scene,
                registry: ObjectRegistry::new(),
                factory: MeshNodeFactory::default(),
                sun,
            }
        }

        fn add(&mut self, object: ModelObject) -> ObjectKey {
            let key = self.home.add(object).unwrap();
            let node = self
                .factory
                .create_node(&self.home, key, &mut self.scene, &BuildOptions::default())
                .unwrap();
            self.registry.register(key, node, &mut self.scene).unwrap();
            key
        }

        fn enclose(&mut self) -> Vec<ObjectKey> {
            let corners = [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)];
            (0..4)
                .map(|i| {
                    let (a, b) = (corners[i], corners[(i + 1) % 4]);
                    self.add(ModelObject::Wall(Wall::new(a.0, a.1, b.0, b.1, 20.0, 250.0)))
                })
                .collect()
        }

        fn scope(&self) -> FxHashSet<NodeKey> {
            self.scene.light_scope(self.sun).cloned().unwrap_or_default()
        }

        fn rebuild(&mut self, key: ObjectKey) -> NodeUpdate {
            let node = self.registry.lookup(key).unwrap();
            self.factory
                .update_node(&self.home, key, node, &mut self.scene, &BuildOptions::default())
                .unwrap()
        }

        /// Retests `keys`, then checks a full pass agrees
        fn assert_converges(&mut self, calculator: &mut LightScopeCalculator, keys: &[ObjectKey]) {
            calculator.recompute_objects(&self.home, &self.registry, &mut self.scene, keys);
            let incremental = self.scope();
            calculator.invalidate();
            calculator.recompute_all(&self.home, &self.registry, &mut self.scene);
            assert_eq!(self.scope(), incremental);
        }

        fn part(&self, wall: ObjectKey, part: WallPart) -> NodeKey {
            let node = self.registry.lookup(wall).unwrap();
            *self
                .scene
                .children(node)
                .iter()
                .find(|c| self.scene.get(**c).unwrap().role == NodeRole::WallPart(part))
                .unwrap()
        }
    }

    #[test]
    fn inert_calculator_leaves_lights_unscoped() {
        let mut f = Fixture::new();
        f.enclose();
        let mut calculator = LightScopeCalculator::new(0.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);
        assert!(f.scene.light_scope(f.sun).is_none());
        assert!(!calculator.has_cache());
    }

    #[test]
    fn outer_wall_faces_are_scoped() {
        let mut f = Fixture::new();
        let walls = f.enclose();
        let mut calculator = LightScopeCalculator::new(10.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);

        let scope = f.scope();
        // Walls run counter-clockwise: their right side faces outwards
        assert!(scope.contains(&f.part(walls[0], WallPart::RightSide)));
        assert!(!scope.contains(&f.part(walls[0], WallPart::LeftSide)));
        assert!(scope.contains(&f.part(walls[0], WallPart::Top)));
    }

    #[test]
    fn incremental_matches_full_pass() {
        let mut f = Fixture::new();
        f.enclose();
        let inside = f.add(ModelObject::Furniture(Furniture::piece(Piece::new(
            "bed", 200.0, 200.0, 100.0, 100.0, 50.0,
        ))));
        let mut calculator = LightScopeCalculator::new(10.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);
        let inside_node = f.registry.lookup(inside).unwrap();
        assert!(!f.scope().contains(&inside_node));

        let outside = f.add(ModelObject::Furniture(Furniture::piece(Piece::new(
            "bench", 600.0, 200.0, 100.0, 40.0, 45.0,
        ))));
        calculator.recompute_objects(&f.home, &f.registry, &mut f.scene, &[outside]);
        let incremental = f.scope();
        assert!(incremental.contains(&f.registry.lookup(outside).unwrap()));

        calculator.invalidate();
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);
        assert_eq!(f.scope(), incremental);
    }

    #[test]
    fn edit_sequence_converges_with_full_pass() {
        let mut f = Fixture::new();
        let walls = f.enclose();
        let bed = f.add(piece("bed", 200.0, 200.0, 100.0, 100.0));
        let bench = f.add(piece("bench", 600.0, 200.0, 100.0, 40.0));
        let group = f.add(ModelObject::Furniture(Furniture::group("set")));
        f.home
            .add_to_group(group, Furniture::piece(Piece::new("chair", 150.0, 150.0, 40.0, 40.0, 90.0)))
            .unwrap();
        let mut calculator = LightScopeCalculator::new(10.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);
        let bed_node = f.registry.lookup(bed).unwrap();

        // Across the wall and back
        f.home
            .set_property(bed, Property::X, PropertyValue::Number(380.0))
            .unwrap();
        f.assert_converges(&mut calculator, &[bed]);
        assert!(f.scope().contains(&bed_node));
        f.home
            .set_property(bed, Property::X, PropertyValue::Number(200.0))
            .unwrap();
        f.assert_converges(&mut calculator, &[bed]);
        assert!(!f.scope().contains(&bed_node));

        // Removal
        let node = f.registry.unregister(bench, &mut f.scene).unwrap();
        f.home.remove(bench).unwrap();
        let nodes = f.scene.subtree(node);
        calculator.forget(&mut f.scene, &nodes);
        f.scene.destroy_subtree(node);
        f.assert_converges(&mut calculator, &[bench]);

        // A member outside the walls reshapes the group node
        let group_node = f.registry.lookup(group).unwrap();
        assert!(!f.scope().contains(&group_node));
        f.home
            .add_to_group(group, Furniture::piece(Piece::new("stool", 600.0, 100.0, 40.0, 40.0, 60.0)))
            .unwrap();
        assert_eq!(f.rebuild(group), NodeUpdate::PartsChanged);
        f.assert_converges(&mut calculator, &[group]);
        assert!(f.scope().contains(&group_node));

        // Wall faces rebuilt under new keys
        let outer_face = f.part(walls[1], WallPart::RightSide);
        let wall_node = f.registry.lookup(walls[1]).unwrap();
        f.scene.clear_children(wall_node);
        assert_eq!(f.rebuild(walls[1]), NodeUpdate::PartsChanged);
        f.assert_converges(&mut calculator, &[walls[1]]);
        assert!(!f.scope().contains(&outer_face));
        assert!(f.scope().contains(&f.part(walls[1], WallPart::RightSide)));
    }

    #[test]
    fn light_fixtures_are_scoped_like_furniture() {
        let mut f = Fixture::new();
        f.enclose();
        let lamp = |x: f64| {
            let mut piece = Piece::new("lamp", x, 200.0, 30.0, 30.0, 20.0);
            piece.elevation = 200.0;
            ModelObject::Light(Light::new(piece, LightKind::Point))
        };
        let indoor = f.add(lamp(200.0));
        let porch = f.add(lamp(600.0));
        let mut calculator = LightScopeCalculator::new(10.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);

        assert!(!f.scope().contains(&f.registry.lookup(indoor).unwrap()));
        assert!(f.scope().contains(&f.registry.lookup(porch).unwrap()));
    }

    #[test]
    fn forget_drops_destroyed_nodes() {
        let mut f = Fixture::new();
        let bench = f.add(ModelObject::Furniture(Furniture::piece(Piece::new(
            "bench", 600.0, 200.0, 100.0, 40.0, 45.0,
        ))));
        let mut calculator = LightScopeCalculator::new(10.0);
        calculator.recompute_all(&f.home, &f.registry, &mut f.scene);
        let node = f.registry.lookup(bench).unwrap();
        assert!(f.scope().contains(&node));

        let nodes = f.scene.subtree(node);
        calculator.forget(&mut f.scene, &nodes);
        assert!(f.scope().is_empty());
    }
}
