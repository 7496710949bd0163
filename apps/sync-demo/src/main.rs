// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planview sync demo - a headless 3D view following a small apartment.
//!
//! Builds a walled room with furniture, opens a view on it and replays a
//! short editing session, logging what the view rebuilds and rescopes.
//!
//! # Environment
//!
//! - `RUST_LOG` - log filter, `info,planview_engine=debug` by default
//! - `PLANVIEW_*` - view settings, see `SyncConfig::from_env`

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;

use anyhow::Context;
use planview_core::{
    CameraPose, Furniture, Home, Light, LightKind, ModelObject, ObjectKey, Piece, Property,
    PropertyValue, Room, SharedHome, Wall,
};
use planview_engine::{LocalExecutor, PlanCanvas, SyncConfig, SyncView, CAMERA_MOTION_DURATION};
use planview_geometry::Point2;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,planview_engine=debug".into()),
        )
        .init();

    let config = SyncConfig::from_env();
    tracing::info!(
        subpart_size = config.subpart_size_under_light,
        shadow = config.shadow_on_floor,
        tick_ms = config.camera_tick_interval.as_millis() as u64,
        "Starting planview sync demo"
    );

    let home: SharedHome = Rc::new(RefCell::new(Home::new()));
    let walls = furnish(&mut home.borrow_mut()).context("building the sample home")?;

    let executor = LocalExecutor::new();
    let mut view = SyncView::new(
        home.clone(),
        Box::new(PlanCanvas::new()),
        Rc::new(executor.clone()),
        config,
    )
    .context("opening the 3D view")?;
    tracing::info!(objects = view.registered_count(), "view opened");

    // Edits of one turn are rebuilt together
    let sofa = home
        .borrow_mut()
        .add(ModelObject::Furniture(Furniture::piece(Piece::new(
            "sofa", 200.0, 320.0, 180.0, 80.0, 85.0,
        ))))?;
    for _ in 0..4 {
        home.borrow_mut().move_piece(sofa, 10.0, -5.0)?;
    }
    home.borrow_mut()
        .set_property(sofa, Property::Color, PropertyValue::Color(Some(0x6B8E23)))?;
    tracing::info!(pending = view.pending_updates(), "sofa edited");
    let tasks = executor.run_until_idle();
    tracing::info!(tasks, stats = ?view.stats(), "edits applied");

    // A door in the front wall reshapes that wall only
    home.borrow_mut()
        .add(ModelObject::Furniture(Furniture::door_or_window(Piece::new(
            "door", 150.0, 0.0, 90.0, 20.0, 210.0,
        ))))?;
    home.borrow_mut()
        .set_property(walls[1], Property::Height, PropertyValue::Number(270.0))?;
    executor.run_until_idle();

    match view.pick(200.0, 150.0) {
        Some(key) => tracing::info!(?key, "picked at (200, 150)"),
        None => tracing::info!("nothing under (200, 150)"),
    }
    if let Some(distance) = view.front_clip_distance() {
        tracing::info!(distance, "front clip distance");
    }

    home.borrow_mut()
        .set_camera_pose(CameraPose::new(200.0, -300.0, 170.0, 0.0, 0.1, 1.0))?;
    thread::sleep(CAMERA_MOTION_DURATION * 2);
    tracing::info!(pose = ?view.camera_pose(), "camera settled");

    for light in view.directional_lights() {
        let scoped = view.light_scope(light).map(|scope| scope.len());
        tracing::info!(?light, ?scoped, "directional light scope");
    }
    if view.is_shadow_stale() {
        tracing::info!(shadows = view.shadow_nodes().len(), "floor shadow out of date");
    }

    view.dispose();
    tracing::info!(listeners = home.borrow().listener_count(), "demo finished");
    Ok(())
}

/// A 400 x 400 room closed by four walls, with a table and a ceiling light
fn furnish(home: &mut Home) -> planview_core::Result<Vec<ObjectKey>> {
    let corners = [(0.0, 0.0), (400.0, 0.0), (400.0, 400.0), (0.0, 400.0)];
    let mut walls = Vec::with_capacity(corners.len());
    for (i, &(xs, ys)) in corners.iter().enumerate() {
        let (xe, ye) = corners[(i + 1) % corners.len()];
        walls.push(home.add(ModelObject::Wall(Wall::new(xs, ys, xe, ye, 20.0, 250.0)))?);
    }

    let mut room = Room::new(
        corners
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect(),
    );
    room.name = Some("Living".into());
    room.floor_color = Some(0xC8B89A);
    home.add(ModelObject::Room(room))?;

    home.add(ModelObject::Furniture(Furniture::piece(Piece::new(
        "table", 200.0, 150.0, 120.0, 80.0, 75.0,
    ))))?;
    let mut lamp = Piece::new("lamp", 200.0, 200.0, 30.0, 30.0, 20.0);
    lamp.elevation = 220.0;
    home.add(ModelObject::Light(Light::new(lamp, LightKind::Point)))?;
    Ok(walls)
}
