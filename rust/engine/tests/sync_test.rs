// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A view following a home through structural and attribute edits.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use planview_core::{
    CameraPose, Furniture, Home, Level, ModelObject, ObjectKey, Piece, Property, PropertyValue,
    Room, SharedHome, Wall, WallPart,
};
use planview_engine::{
    Canvas, Error, LocalExecutor, NodeKey, NodeRole, PlanCanvas, RenderCapabilities, SceneGraph,
    SyncConfig, SyncView, CAMERA_MOTION_DURATION,
};
use planview_geometry::Point2;

fn open(home: &SharedHome, config: SyncConfig) -> (SyncView, LocalExecutor) {
    let executor = LocalExecutor::new();
    let view = SyncView::new(
        home.clone(),
        Box::new(PlanCanvas::new()),
        Rc::new(executor.clone()),
        config,
    )
    .unwrap();
    (view, executor)
}

fn table(x: f64, y: f64) -> ModelObject {
    ModelObject::Furniture(Furniture::piece(Piece::new("table", x, y, 100.0, 80.0, 75.0)))
}

fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

/// Four walls around the square (0, 0) - (400, 400)
fn enclose(home: &mut Home) -> Vec<ObjectKey> {
    let corners = [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)];
    (0..4)
        .map(|i| {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            home.add(ModelObject::Wall(Wall::new(a.0, a.1, b.0, b.1, 20.0, 250.0)))
                .unwrap()
        })
        .collect()
}

/// Triangles of the wall face openings are cut from
fn left_side_triangles(view: &SyncView, wall: ObjectKey) -> usize {
    let node = view.node_of(wall).unwrap();
    view.with_scene(|scene| {
        scene
            .children(node)
            .iter()
            .filter_map(|child| scene.get(*child))
            .find(|n| n.role == NodeRole::WallPart(WallPart::LeftSide))
            .and_then(|n| n.mesh.as_ref())
            .map_or(0, |mesh| mesh.triangle_count())
    })
}

/// A group holding a door standing in the wall along the x axis
fn door_group(home: &SharedHome, level: Option<ObjectKey>) -> (ObjectKey, ObjectKey) {
    let mut group = Furniture::group("entrance");
    group.level = level;
    let group = home.borrow_mut().add(ModelObject::Furniture(group)).unwrap();
    let door = home
        .borrow_mut()
        .add_to_group(
            group,
            Furniture::door_or_window(Piece::new("door", 200.0, 0.0, 90.0, 20.0, 210.0)),
        )
        .unwrap();
    (group, door)
}

fn front_wall(home: &SharedHome, level: Option<ObjectKey>) -> ObjectKey {
    let mut wall = Wall::new(0.0, 0.0, 400.0, 0.0, 20.0, 250.0);
    wall.level = level;
    home.borrow_mut().add(ModelObject::Wall(wall)).unwrap()
}

#[test]
fn registry_follows_collection_membership() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = home
        .borrow_mut()
        .add(ModelObject::Wall(Wall::new(0.0, 0.0, 400.0, 0.0, 20.0, 250.0)))
        .unwrap();
    let (view, executor) = open(&home, SyncConfig::default());
    assert_eq!(view.registered_count(), 1);

    let room = home
        .borrow_mut()
        .add(ModelObject::Room(Room::new(rectangle(0.0, 0.0, 400.0, 300.0))))
        .unwrap();
    let piece = home.borrow_mut().add(table(100.0, 100.0)).unwrap();
    let level = home
        .borrow_mut()
        .add(ModelObject::Level(Level::new("Ground", 0.0, 250.0)))
        .unwrap();

    assert_eq!(view.registered_count(), 3);
    assert!(view.node_of(level).is_none());
    for key in [wall, room, piece] {
        let node = view.node_of(key).unwrap();
        assert!(view.with_scene(|scene| scene.is_attached(node)));
    }

    let node = view.node_of(room).unwrap();
    home.borrow_mut().remove(room).unwrap();
    assert!(view.node_of(room).is_none());
    assert!(!view.with_scene(|scene| scene.contains(node)));
    assert_eq!(view.registered_count(), 2);

    // Structural edits apply synchronously
    assert_eq!(executor.pending(), 0);
}

#[test]
fn attribute_changes_coalesce_into_one_rebuild() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let piece = home.borrow_mut().add(table(0.0, 0.0)).unwrap();
    let (view, executor) = open(&home, SyncConfig::default());

    for step in 1..=5 {
        home.borrow_mut()
            .set_property(piece, Property::X, PropertyValue::Number(step as f64 * 10.0))
            .unwrap();
    }
    home.borrow_mut()
        .set_property(piece, Property::Color, PropertyValue::Color(Some(0xFF0000)))
        .unwrap();
    assert_eq!(executor.pending(), 1);
    assert_eq!(view.pending_updates(), 1);

    executor.run_until_idle();
    let stats = view.stats();
    assert_eq!(stats.update_passes, 1);
    assert_eq!(stats.nodes_rebuilt, 1);
    assert_eq!(view.pending_updates(), 0);

    let node = view.node_of(piece).unwrap();
    let color = view.with_scene(|scene| {
        let part = scene.children(node)[0];
        scene.get(part).unwrap().appearance.color
    });
    assert_eq!(color, Some(0xFF0000));
}

#[test]
fn removed_objects_are_skipped_by_the_pass() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let piece = home.borrow_mut().add(table(0.0, 0.0)).unwrap();
    let (view, executor) = open(&home, SyncConfig::default());

    home.borrow_mut()
        .set_property(piece, Property::Width, PropertyValue::Number(120.0))
        .unwrap();
    home.borrow_mut().remove(piece).unwrap();
    executor.run_until_idle();

    assert_eq!(view.stats().nodes_rebuilt, 0);
    assert_eq!(view.registered_count(), 0);
}

#[test]
fn group_member_edits_rebuild_the_group() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let group = home
        .borrow_mut()
        .add(ModelObject::Furniture(Furniture::group("dining")))
        .unwrap();
    let (view, executor) = open(&home, SyncConfig::default());

    let chair = home
        .borrow_mut()
        .add_to_group(group, Furniture::piece(Piece::new("chair", 0.0, 0.0, 45.0, 45.0, 90.0)))
        .unwrap();
    executor.run_until_idle();
    assert!(view.node_of(chair).is_none());
    let node = view.node_of(group).unwrap();
    assert_eq!(view.with_scene(|scene| scene.children(node).len()), 1);

    let rebuilt = view.stats().nodes_rebuilt;
    home.borrow_mut()
        .set_property(chair, Property::Visible, PropertyValue::Bool(false))
        .unwrap();
    assert_eq!(view.pending_updates(), 1);
    executor.run_until_idle();
    assert_eq!(view.stats().nodes_rebuilt, rebuilt + 1);

    let part = view.with_scene(|scene| scene.children(node)[0]);
    assert!(!view.with_scene(|scene| scene.get(part).unwrap().visible));
}

#[test]
fn hidden_level_hides_its_objects() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let level = home
        .borrow_mut()
        .add(ModelObject::Level(Level::new("Upper", 300.0, 250.0)))
        .unwrap();
    let mut wall = Wall::new(0.0, 0.0, 400.0, 0.0, 20.0, 250.0);
    wall.level = Some(level);
    let wall = home.borrow_mut().add(ModelObject::Wall(wall)).unwrap();
    let (view, executor) = open(&home, SyncConfig::default());

    let node = view.node_of(wall).unwrap();
    assert!(view.with_scene(|scene| scene.is_effectively_visible(node)));

    home.borrow_mut()
        .set_property(level, Property::Visible, PropertyValue::Bool(false))
        .unwrap();
    executor.run_until_idle();
    assert!(!view.with_scene(|scene| scene.is_effectively_visible(node)));
}

#[test]
fn doors_dirty_the_walls_they_cut() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = home
        .borrow_mut()
        .add(ModelObject::Wall(Wall::new(0.0, 0.0, 400.0, 0.0, 20.0, 250.0)))
        .unwrap();
    let far = home
        .borrow_mut()
        .add(ModelObject::Wall(Wall::new(0.0, 1000.0, 400.0, 1000.0, 20.0, 250.0)))
        .unwrap();
    let (view, executor) = open(&home, SyncConfig::default());

    let door = home
        .borrow_mut()
        .add(ModelObject::Furniture(Furniture::door_or_window(Piece::new(
            "door", 200.0, 0.0, 90.0, 20.0, 210.0,
        ))))
        .unwrap();
    assert_eq!(view.pending_updates(), 1);
    executor.run_until_idle();
    assert_eq!(view.stats().nodes_rebuilt, 1);

    // Old and new footprints both count
    home.borrow_mut().move_piece(door, 0.0, 1000.0).unwrap();
    assert_eq!(view.pending_updates(), 3);
    executor.run_until_idle();
    assert_eq!(view.stats().nodes_rebuilt, 4);
    assert!(view.node_of(wall).is_some() && view.node_of(far).is_some());

    home.borrow_mut().remove(door).unwrap();
    assert_eq!(view.pending_updates(), 1);
}

#[test]
fn removing_a_door_group_closes_the_wall() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = front_wall(&home, None);
    let (view, executor) = open(&home, SyncConfig::default());
    let solid = left_side_triangles(&view, wall);

    let (group, _) = door_group(&home, None);
    executor.run_until_idle();
    assert!(left_side_triangles(&view, wall) > solid);

    home.borrow_mut().remove(group).unwrap();
    assert_eq!(view.pending_updates(), 1);
    executor.run_until_idle();
    assert_eq!(left_side_triangles(&view, wall), solid);
}

#[test]
fn door_groups_present_at_startup_are_tracked() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = front_wall(&home, None);
    let (group, _) = door_group(&home, None);
    let (view, executor) = open(&home, SyncConfig::default());
    let cut = left_side_triangles(&view, wall);

    home.borrow_mut().remove(group).unwrap();
    executor.run_until_idle();
    assert!(left_side_triangles(&view, wall) < cut);
}

#[test]
fn hiding_a_door_group_closes_the_wall() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = front_wall(&home, None);
    let (view, executor) = open(&home, SyncConfig::default());
    let solid = left_side_triangles(&view, wall);
    let (group, _) = door_group(&home, None);
    executor.run_until_idle();
    let cut = left_side_triangles(&view, wall);

    home.borrow_mut()
        .set_property(group, Property::Visible, PropertyValue::Bool(false))
        .unwrap();
    executor.run_until_idle();
    assert_eq!(left_side_triangles(&view, wall), solid);

    home.borrow_mut()
        .set_property(group, Property::Visible, PropertyValue::Bool(true))
        .unwrap();
    executor.run_until_idle();
    assert_eq!(left_side_triangles(&view, wall), cut);
}

#[test]
fn door_group_moved_to_another_level_leaves_the_wall() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let ground = home
        .borrow_mut()
        .add(ModelObject::Level(Level::new("Ground", 0.0, 250.0)))
        .unwrap();
    let upstairs = home
        .borrow_mut()
        .add(ModelObject::Level(Level::new("Upstairs", 250.0, 250.0)))
        .unwrap();
    let wall = front_wall(&home, Some(ground));
    let (view, executor) = open(&home, SyncConfig::default());
    let solid = left_side_triangles(&view, wall);
    let (group, _) = door_group(&home, Some(ground));
    executor.run_until_idle();
    assert!(left_side_triangles(&view, wall) > solid);

    home.borrow_mut()
        .set_property(group, Property::Level, PropertyValue::Key(Some(upstairs)))
        .unwrap();
    executor.run_until_idle();
    assert_eq!(left_side_triangles(&view, wall), solid);
}

#[test]
fn door_taken_out_of_its_group_closes_the_wall() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let wall = front_wall(&home, None);
    let (view, executor) = open(&home, SyncConfig::default());
    let solid = left_side_triangles(&view, wall);
    let (group, door) = door_group(&home, None);
    home.borrow_mut()
        .add_to_group(group, Furniture::piece(Piece::new("mat", 200.0, 60.0, 80.0, 50.0, 1.0)))
        .unwrap();
    executor.run_until_idle();
    assert!(left_side_triangles(&view, wall) > solid);

    home.borrow_mut().remove_from_group(group, door).unwrap();
    executor.run_until_idle();
    assert_eq!(left_side_triangles(&view, wall), solid);
}

#[test]
fn placing_a_group_moves_its_node() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let group = home
        .borrow_mut()
        .add(ModelObject::Furniture(Furniture::group("set")))
        .unwrap();
    home.borrow_mut()
        .add_to_group(group, Furniture::piece(Piece::new("chair", 0.0, 0.0, 40.0, 40.0, 90.0)))
        .unwrap();
    let (view, executor) = open(&home, SyncConfig::default());
    let node = view.node_of(group).unwrap();
    let min_x = || view.with_scene(|scene| scene.bounds(node).unwrap().min.x);
    assert!((min_x() + 20.0).abs() < 1e-6);

    home.borrow_mut()
        .set_property(group, Property::X, PropertyValue::Number(300.0))
        .unwrap();
    executor.run_until_idle();
    assert!((min_x() - 280.0).abs() < 1e-6);
    assert_eq!(view.stats().nodes_rebuilt, 1);
}

#[test]
fn passes_give_up_on_a_home_that_stays_borrowed() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let piece = home.borrow_mut().add(table(0.0, 0.0)).unwrap();
    let (view, executor) = open(&home, SyncConfig::default());
    home.borrow_mut()
        .set_property(piece, Property::X, PropertyValue::Number(10.0))
        .unwrap();

    let editing = home.borrow_mut();
    let ran = executor.run_until_idle();
    drop(editing);
    assert!(ran > 1);
    assert_eq!(executor.pending(), 0);
    assert_eq!(view.stats().update_passes, 0);
    assert_eq!(view.pending_updates(), 1);

    // The next change picks the work up again
    home.borrow_mut()
        .set_property(piece, Property::Y, PropertyValue::Number(10.0))
        .unwrap();
    assert_eq!(executor.pending(), 1);
    executor.run_until_idle();
    assert_eq!(view.stats().nodes_rebuilt, 1);
    assert_eq!(view.pending_updates(), 0);
}

#[test]
fn enclosed_room_enters_light_scope_when_a_corner_leaves() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    enclose(&mut home.borrow_mut());
    let room = home
        .borrow_mut()
        .add(ModelObject::Room(Room::new(rectangle(20.0, 20.0, 380.0, 380.0))))
        .unwrap();
    let sofa = home.borrow_mut().add(table(200.0, 200.0)).unwrap();
    let config = SyncConfig {
        subpart_size_under_light: 10.0,
        ..SyncConfig::default()
    };
    let (view, executor) = open(&home, config);

    let lights = view.directional_lights();
    assert_eq!(lights.len(), 4);
    let room_node = view.node_of(room).unwrap();
    let sofa_node = view.node_of(sofa).unwrap();
    for &light in &lights {
        assert!(!view.lights_node(light, room_node));
        assert!(!view.lights_node(light, sofa_node));
    }

    let mut points = rectangle(20.0, 20.0, 380.0, 380.0);
    points[2] = Point2::new(600.0, 380.0);
    home.borrow_mut()
        .set_property(room, Property::Points, PropertyValue::Points(points))
        .unwrap();
    executor.run_until_idle();

    assert_eq!(view.node_of(room), Some(room_node));
    for &light in &lights {
        assert!(view.lights_node(light, room_node));
        assert!(!view.lights_node(light, sofa_node));
    }
    assert_eq!(view.stats().scope_passes, 1);
}

#[test]
fn furniture_corner_crossing_a_wall_enters_light_scope() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    enclose(&mut home.borrow_mut());
    let room = home
        .borrow_mut()
        .add(ModelObject::Room(Room::new(rectangle(20.0, 20.0, 380.0, 380.0))))
        .unwrap();
    home.borrow_mut().add(table(100.0, 100.0)).unwrap();
    home.borrow_mut().add(table(700.0, 100.0)).unwrap();
    let sofa = home.borrow_mut().add(table(200.0, 300.0)).unwrap();
    let config = SyncConfig {
        subpart_size_under_light: 10.0,
        ..SyncConfig::default()
    };
    let (view, executor) = open(&home, config);
    let sofa_node = view.node_of(sofa).unwrap();
    let lights = view.directional_lights();

    // Scope of each light without the sofa's own nodes
    let others = || -> Vec<Vec<NodeKey>> {
        let sofa_nodes = view.with_scene(|scene| scene.subtree(sofa_node));
        lights
            .iter()
            .map(|&light| {
                let mut scope: Vec<NodeKey> = view
                    .light_scope(light)
                    .unwrap()
                    .into_iter()
                    .filter(|n| !sofa_nodes.contains(n))
                    .collect();
                scope.sort();
                scope
            })
            .collect()
    };
    let before = others();
    assert!(lights.iter().all(|&l| !view.lights_node(l, sofa_node)));

    // Right edge now at x = 430, past the wall's outer face
    home.borrow_mut()
        .set_property(sofa, Property::X, PropertyValue::Number(380.0))
        .unwrap();
    executor.run_until_idle();

    assert!(lights.iter().all(|&l| view.lights_node(l, sofa_node)));
    assert_eq!(others(), before);
    assert!(view.node_of(room).is_some());
    assert_eq!(view.stats().scope_passes, 1);
}

#[test]
fn disabling_scoping_lights_everything() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    enclose(&mut home.borrow_mut());
    let sofa = home.borrow_mut().add(table(200.0, 200.0)).unwrap();
    let config = SyncConfig {
        subpart_size_under_light: 10.0,
        ..SyncConfig::default()
    };
    let (view, _executor) = open(&home, config);
    let light = view.directional_lights()[0];
    assert!(view.light_scope(light).is_some());

    view.set_subpart_size_under_light(0.0);
    assert!(view.light_scope(light).is_none());
    assert!(view.lights_node(light, view.node_of(sofa).unwrap()));
}

#[test]
fn wall_edits_recompute_every_scope() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let walls = enclose(&mut home.borrow_mut());
    let sofa = home.borrow_mut().add(table(200.0, 200.0)).unwrap();
    let config = SyncConfig {
        subpart_size_under_light: 10.0,
        ..SyncConfig::default()
    };
    let (view, executor) = open(&home, config);
    let light = view.directional_lights()[0];
    let sofa_node = view.node_of(sofa).unwrap();
    assert!(!view.lights_node(light, sofa_node));

    // Opening the enclosure lets the light in
    home.borrow_mut().remove(walls[0]).unwrap();
    executor.run_until_idle();
    assert!(view.lights_node(light, sofa_node));
}

#[test]
fn model_camera_changes_are_animated() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let (view, _executor) = open(&home, SyncConfig::default());
    let target = CameraPose::new(500.0, 200.0, 170.0, 1.0, 0.2, 1.1);

    home.borrow_mut().set_camera_pose(target).unwrap();
    assert!(view.is_camera_moving());

    thread::sleep(CAMERA_MOTION_DURATION + Duration::from_millis(250));
    assert!(!view.is_camera_moving());
    assert_eq!(view.camera_pose(), target);
}

#[test]
fn unanimated_camera_requests_jump() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let (view, _executor) = open(&home, SyncConfig::default());
    let pose = CameraPose::new(10.0, 20.0, 170.0, 0.5, 0.0, 1.0);
    view.request_camera_pose(pose, false);
    assert_eq!(view.camera_pose(), pose);
    assert!(!view.is_camera_moving());
}

#[test]
fn pick_returns_the_model_object() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let mut room = Room::new(rectangle(0.0, 0.0, 400.0, 400.0));
    room.ceiling_visible = false;
    let room = home.borrow_mut().add(ModelObject::Room(room)).unwrap();
    let piece = home.borrow_mut().add(table(100.0, 100.0)).unwrap();
    let (view, _executor) = open(&home, SyncConfig::default());

    assert_eq!(view.pick(100.0, 100.0), Some(piece));
    assert_eq!(view.pick(300.0, 300.0), Some(room));
    assert_eq!(view.pick(5000.0, 5000.0), None);
}

#[test]
fn backends_without_3d_are_rejected() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let result = SyncView::new(
        home.clone(),
        Box::new(PlanCanvas::with_capabilities(RenderCapabilities::NONE)),
        Rc::new(LocalExecutor::new()),
        SyncConfig::default(),
    );
    assert!(matches!(result, Err(Error::UnsupportedBackend)));
    assert_eq!(home.borrow().listener_count(), 0);
}

#[test]
fn floor_shadow_goes_stale_on_furniture_edits() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let piece = home.borrow_mut().add(table(0.0, 0.0)).unwrap();
    let config = SyncConfig {
        shadow_on_floor: true,
        ..SyncConfig::default()
    };
    let (view, _executor) = open(&home, config);
    assert_eq!(view.shadow_nodes().len(), 1);
    assert!(!view.is_shadow_stale());

    home.borrow_mut().move_piece(piece, 50.0, 0.0).unwrap();
    assert!(view.is_shadow_stale());
    assert_eq!(view.shadow_nodes().len(), 1);
}

#[derive(Default)]
struct Surface {
    attached: Option<NodeKey>,
    detached: Vec<NodeKey>,
}

/// Canvas recording attach/detach calls
struct RecordingCanvas(Rc<RefCell<Surface>>);

impl Canvas for RecordingCanvas {
    fn capabilities(&self) -> RenderCapabilities {
        RenderCapabilities::FULL
    }

    fn attach(&mut self, root: NodeKey) {
        self.0.borrow_mut().attached = Some(root);
    }

    fn detach(&mut self, root: NodeKey) {
        let mut surface = self.0.borrow_mut();
        surface.attached = None;
        surface.detached.push(root);
    }

    fn pick(&self, _scene: &SceneGraph, _x: f64, _y: f64) -> Option<NodeKey> {
        None
    }
}

#[test]
fn dispose_releases_everything() {
    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let level = home
        .borrow_mut()
        .add(ModelObject::Level(Level::new("Ground", 0.0, 250.0)))
        .unwrap();
    enclose(&mut home.borrow_mut());
    let group = home
        .borrow_mut()
        .add(ModelObject::Furniture(Furniture::group("desk")))
        .unwrap();
    home.borrow_mut()
        .add_to_group(group, Furniture::piece(Piece::new("lamp", 0.0, 0.0, 20.0, 20.0, 40.0)))
        .unwrap();

    let surface = Rc::new(RefCell::new(Surface::default()));
    let executor = LocalExecutor::new();
    let mut view = SyncView::new(
        home.clone(),
        Box::new(RecordingCanvas(surface.clone())),
        Rc::new(executor.clone()),
        SyncConfig::default(),
    )
    .unwrap();
    assert!(surface.borrow().attached.is_some());
    assert!(home.borrow().listener_count() > 0);
    assert!(home.borrow().object_listener_count(level) > 0);

    home.borrow_mut()
        .set_property(group, Property::Color, PropertyValue::Color(Some(0x00FF00)))
        .unwrap();
    view.dispose();

    assert!(view.is_disposed());
    assert_eq!(home.borrow().listener_count(), 0);
    assert_eq!(view.registered_count(), 0);
    assert!(surface.borrow().attached.is_none());
    assert_eq!(surface.borrow().detached.len(), 1);
    assert_eq!(view.with_scene(|scene| scene.len()), 1);

    // Late tasks and edits find nothing to do
    executor.run_until_idle();
    home.borrow_mut().remove(group).unwrap();
    assert_eq!(view.stats().nodes_rebuilt, 0);

    view.dispose();
    assert_eq!(surface.borrow().detached.len(), 1);
}
