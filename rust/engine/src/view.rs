// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The synchronized 3D view.
//!
//! [`SyncView`] wires a shared home to a scene: it builds nodes for every
//! object, listens to model events, runs coalesced update passes on the UI
//! executor and keeps derived lighting state current. All of this happens
//! on the model's thread; only camera motion runs on a timer thread.

use std::cell::RefCell;
use std::rc::Rc;

use planview_core::{CameraPose, Collection, Home, ObjectKey, SharedHome, SubscriptionId};
use planview_geometry::{nearest_distance_point_to_box, Point3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::adapter::{AdapterListener, OpeningBounds};
use crate::camera::{CameraHandle, CameraInterpolator};
use crate::canvas::Canvas;
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::executor::UiExecutor;
use crate::factory::{BuildOptions, MeshNodeFactory, NodeFactory, NodeUpdate};
use crate::light_scope::LightScopeCalculator;
use crate::registry::ObjectRegistry;
use crate::scene::{
    Appearance, LightSource, LightSourceKind, NodeKey, NodeRole, SceneGraph, SceneNode,
};
use crate::scheduler::{DeferredUpdates, ScopeRequests, ScopeWork};
use crate::shadow::{Interrupt, NeverInterrupted, ShadowProjector};

/// Counters describing the work done by a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub nodes_created: u64,
    pub nodes_destroyed: u64,
    pub nodes_rebuilt: u64,
    pub update_passes: u64,
    pub scope_passes: u64,
}

/// Everything a view mutates from model callbacks and UI tasks.
pub(crate) struct ViewState {
    pub scene: SceneGraph,
    pub registry: ObjectRegistry,
    pub factory: Box<dyn NodeFactory>,
    pub canvas: Box<dyn Canvas>,
    pub options: BuildOptions,
    pub config: SyncConfig,
    pub updates: DeferredUpdates,
    pub scope_requests: ScopeRequests,
    pub light_scope: LightScopeCalculator,
    /// Subscriptions of each registered object and of its group members
    pub object_subscriptions: FxHashMap<ObjectKey, Vec<SubscriptionId>>,
    pub level_subscriptions: FxHashMap<ObjectKey, SubscriptionId>,
    /// Doors and windows of each collection item as last seen
    pub openings: FxHashMap<ObjectKey, Vec<OpeningBounds>>,
    /// Collection and camera subscriptions
    pub view_subscriptions: Vec<SubscriptionId>,
    /// Subscribed to the model; keeps this state alive until disposal
    pub listener: Option<Rc<RefCell<AdapterListener>>>,
    pub default_lights: Vec<NodeKey>,
    pub shadow_nodes: Vec<NodeKey>,
    pub shadow_stale: bool,
    pub camera: CameraHandle,
    pub executor: Rc<dyn UiExecutor>,
    pub home: SharedHome,
    pub stats: SyncStats,
    pub disposed: bool,
}

impl ViewState {
    /// Builds, registers and subscribes the node of a collection item.
    ///
    /// Returns `false` if the object has no node.
    pub fn build_object(&mut self, home: &Home, key: ObjectKey) -> bool {
        let node = match self
            .factory
            .create_node(home, key, &mut self.scene, &self.options)
        {
            Ok(node) => node,
            Err(Error::NoSceneNode(_)) => return false,
            Err(error) => {
                tracing::warn!(?key, %error, "cannot build scene node");
                return false;
            }
        };
        if let Err(error) = self.registry.register(key, node, &mut self.scene) {
            panic!("{error}: scene registry out of sync with the model");
        }
        self.subscribe_object_tree(home, key);
        self.track_openings(home, key);
        self.stats.nodes_created += 1;
        true
    }

    /// Unregisters an object and destroys its subtree
    pub fn destroy_object(&mut self, home: &Home, key: ObjectKey) {
        self.unsubscribe_object_tree(home, key);
        match self.registry.unregister(key, &mut self.scene) {
            Ok(node) => {
                let nodes = self.scene.subtree(node);
                self.light_scope.forget(&mut self.scene, &nodes);
                self.scene.destroy_subtree(node);
                self.stats.nodes_destroyed += 1;
            }
            Err(error) => tracing::debug!(?key, %error, "removed object had no node"),
        }
    }

    pub fn subscribe_object_tree(&mut self, home: &Home, key: ObjectKey) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let ids = std::iter::once(key)
            .chain(home.descendants(key))
            .map(|k| home.subscribe_object(k, listener.clone()))
            .collect();
        if let Some(old) = self.object_subscriptions.insert(key, ids) {
            for id in old {
                home.unsubscribe(id);
            }
        }
    }

    pub fn unsubscribe_object_tree(&mut self, home: &Home, key: ObjectKey) {
        for id in self.object_subscriptions.remove(&key).unwrap_or_default() {
            home.unsubscribe(id);
        }
    }

    pub fn mark_dirty(&mut self, key: ObjectKey) {
        if self.updates.mark(key) {
            self.post(Pass::Update);
        }
    }

    pub fn request_scope(&mut self, key: ObjectKey) {
        if self.light_scope.is_active() && self.scope_requests.mark_object(key) {
            self.post(Pass::Scope);
        }
    }

    pub fn request_full_scope(&mut self) {
        self.light_scope.invalidate();
        if self.light_scope.is_active() && self.scope_requests.mark_everything() {
            self.post(Pass::Scope);
        }
    }

    fn post(&self, pass: Pass) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        self.executor
            .invoke_later(Box::new(move || run_pass(&listener, pass, 0)));
    }

    /// Rebuilds every object marked dirty since the last pass
    pub fn update_pass(&mut self, home: &Home) {
        let keys = self.updates.drain();
        let mut rebuilt = 0;
        for &key in &keys {
            // Removed since it was marked
            let Some(node) = self.registry.lookup(key) else {
                continue;
            };
            match self
                .factory
                .update_node(home, key, node, &mut self.scene, &self.options)
            {
                Ok(NodeUpdate::Updated) => {}
                Ok(NodeUpdate::PartsChanged) => self.request_scope(key),
                Err(error) => tracing::warn!(?key, %error, "node update failed"),
            }
            rebuilt += 1;
        }
        self.stats.update_passes += 1;
        self.stats.nodes_rebuilt += rebuilt;
        tracing::debug!(marked = keys.len(), rebuilt, "update pass");
    }

    pub fn scope_pass(&mut self, home: &Home) {
        match self.scope_requests.drain() {
            ScopeWork::Everything => {
                self.light_scope
                    .recompute_all(home, &self.registry, &mut self.scene)
            }
            ScopeWork::Objects(keys) => {
                self.light_scope
                    .recompute_objects(home, &self.registry, &mut self.scene, &keys)
            }
            ScopeWork::Nothing => return,
        }
        self.stats.scope_passes += 1;
    }

    fn build_shadow(&mut self, home: &Home, interrupt: &dyn Interrupt) {
        if !self.options.capabilities.supports_transparency {
            tracing::debug!("backend without transparency, floor shadow skipped");
            return;
        }
        let Some(shadows) = ShadowProjector::project(home, self.factory.as_ref(), interrupt) else {
            return;
        };
        for shadow in shadows {
            let mut node = SceneNode::new(NodeRole::Shadow);
            node.mesh = Some(std::sync::Arc::new(shadow.mesh));
            node.appearance = Appearance {
                color: Some(0x000000),
                transparency: 0.5,
                ..Appearance::default()
            };
            match self.scene.add_child(self.scene.root(), node) {
                Ok(key) => self.shadow_nodes.push(key),
                Err(error) => tracing::warn!(%error, "cannot attach shadow"),
            }
        }
        tracing::debug!(levels = self.shadow_nodes.len(), "floor shadow built");
    }

    fn add_default_lights(&mut self) {
        let root = self.scene.root();
        let mut lights = vec![(LightSourceKind::Ambient, 0x33_33_33)];
        lights.extend([(LightSourceKind::Directional, 0x55_55_55); 4]);
        for (kind, color) in lights {
            let mut node = SceneNode::new(NodeRole::DefaultLight);
            node.light = Some(LightSource::new(kind, color));
            match self.scene.add_child(root, node) {
                Ok(key) => self.default_lights.push(key),
                Err(error) => tracing::warn!(%error, "cannot add default light"),
            }
        }
    }

    fn dispose(&mut self, home: Option<&Home>) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        match home {
            Some(home) => {
                let ids = self
                    .view_subscriptions
                    .drain(..)
                    .chain(self.level_subscriptions.drain().map(|(_, id)| id))
                    .chain(self.object_subscriptions.drain().flat_map(|(_, ids)| ids));
                for id in ids {
                    home.unsubscribe(id);
                }
            }
            None => tracing::warn!("model busy during disposal, subscriptions left inert"),
        }

        let keys: Vec<ObjectKey> = self.registry.keys().collect();
        for key in keys {
            if let Ok(node) = self.registry.unregister(key, &mut self.scene) {
                self.scene.destroy_subtree(node);
                self.stats.nodes_destroyed += 1;
            }
        }
        self.openings.clear();
        for node in self.shadow_nodes.drain(..).chain(self.default_lights.drain(..)) {
            self.scene.destroy_subtree(node);
        }
        let root = self.scene.root();
        self.canvas.detach(root);
        self.factory.dispose();
        if let Some(listener) = self.listener.take() {
            listener.borrow_mut().release();
        }
        tracing::info!(stats = ?self.stats, "3D view disposed");
    }
}

/// Turns a pass waits for the model before it is dropped
const MAX_PASS_DEFERRALS: u32 = 32;

/// Deferred work posted on the UI executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Update,
    Scope,
}

impl Pass {
    fn run(self, view: &mut ViewState, home: &Home) {
        match self {
            Pass::Update => view.update_pass(home),
            Pass::Scope => view.scope_pass(home),
        }
    }

    /// Lets the next request post a new pass; pending work is kept
    fn abandon(self, view: &mut ViewState) {
        match self {
            Pass::Update => view.updates.abandon(),
            Pass::Scope => view.scope_requests.abandon(),
        }
    }
}

/// Runs a deferred pass unless the view was disposed in the meantime.
///
/// While the model is mutably borrowed the pass moves to the next turn, up
/// to [`MAX_PASS_DEFERRALS`] times. After that it is dropped and its work
/// waits for the next model change.
fn run_pass(listener: &Rc<RefCell<AdapterListener>>, pass: Pass, deferrals: u32) {
    let Some(state) = listener.borrow().view() else {
        return;
    };
    let home = Rc::clone(&state.borrow().home);
    let Ok(home_ref) = home.try_borrow() else {
        if deferrals >= MAX_PASS_DEFERRALS {
            tracing::warn!(?pass, deferrals, "model stayed busy, pass dropped until the next change");
            if let Ok(mut view) = state.try_borrow_mut() {
                pass.abandon(&mut view);
            }
            return;
        }
        let executor = Rc::clone(&state.borrow().executor);
        let listener = Rc::clone(listener);
        executor.invoke_later(Box::new(move || run_pass(&listener, pass, deferrals + 1)));
        return;
    };
    let mut view = state.borrow_mut();
    if !view.disposed {
        pass.run(&mut view, &home_ref);
    }
}

/// A 3D view kept in sync with a home.
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use planview_core::{Home, ModelObject, Property, PropertyValue, Wall};
/// use planview_engine::{LocalExecutor, PlanCanvas, SyncConfig, SyncView};
///
/// let home = Rc::new(RefCell::new(Home::new()));
/// let executor = LocalExecutor::new();
/// let view = SyncView::new(
///     home.clone(),
///     Box::new(PlanCanvas::new()),
///     Rc::new(executor.clone()),
///     SyncConfig::default(),
/// )
/// .unwrap();
///
/// let wall = home
///     .borrow_mut()
///     .add(ModelObject::Wall(Wall::new(0.0, 0.0, 400.0, 0.0, 20.0, 250.0)))
///     .unwrap();
/// assert!(view.node_of(wall).is_some());
///
/// home.borrow_mut()
///     .set_property(wall, Property::Height, PropertyValue::Number(300.0))
///     .unwrap();
/// executor.run_until_idle();
/// assert_eq!(view.stats().nodes_rebuilt, 1);
/// ```
pub struct SyncView {
    home: SharedHome,
    state: Rc<RefCell<ViewState>>,
    camera: CameraInterpolator,
}

impl SyncView {
    /// Builds a view with the default mesh factory
    pub fn new(
        home: SharedHome,
        canvas: Box<dyn Canvas>,
        executor: Rc<dyn UiExecutor>,
        config: SyncConfig,
    ) -> Result<Self> {
        let factory = Box::new(MeshNodeFactory::new(config.mesh_cache_capacity));
        Self::with_factory(home, canvas, factory, executor, config, &NeverInterrupted)
    }

    /// Builds a view with a custom node factory.
    ///
    /// `interrupt` is polled while the floor shadow is computed.
    pub fn with_factory(
        home: SharedHome,
        canvas: Box<dyn Canvas>,
        factory: Box<dyn NodeFactory>,
        executor: Rc<dyn UiExecutor>,
        config: SyncConfig,
        interrupt: &dyn Interrupt,
    ) -> Result<Self> {
        let capabilities = canvas.capabilities();
        if !capabilities.is_usable() {
            tracing::warn!(?capabilities, "rendering backend cannot show 3D views");
            return Err(Error::UnsupportedBackend);
        }
        let options = BuildOptions {
            wait_for_resources: config.wait_for_resources,
            capabilities,
        };

        let home_ref = home.borrow();
        let camera = CameraInterpolator::start(home_ref.camera_pose(), config.camera_tick_interval)?;
        let state = Rc::new(RefCell::new(ViewState {
            scene: SceneGraph::new(),
            registry: ObjectRegistry::new(),
            factory,
            canvas,
            options,
            light_scope: LightScopeCalculator::new(config.subpart_size_under_light),
            config: config.clone(),
            updates: DeferredUpdates::new(),
            scope_requests: ScopeRequests::new(),
            object_subscriptions: FxHashMap::default(),
            level_subscriptions: FxHashMap::default(),
            openings: FxHashMap::default(),
            view_subscriptions: Vec::new(),
            listener: None,
            default_lights: Vec::new(),
            shadow_nodes: Vec::new(),
            shadow_stale: false,
            camera: camera.handle(),
            executor,
            home: Rc::clone(&home),
            stats: SyncStats::default(),
            disposed: false,
        }));

        {
            let mut view = state.borrow_mut();
            let listener = Rc::new(RefCell::new(AdapterListener::new(Rc::clone(&state))));
            view.listener = Some(listener.clone());
            if config.default_lights {
                view.add_default_lights();
            }

            for collection in Collection::ALL {
                let id = home_ref.subscribe_collection(collection, listener.clone());
                view.view_subscriptions.push(id);
            }
            let camera_id = home_ref.subscribe_object(home_ref.camera(), listener.clone());
            view.view_subscriptions.push(camera_id);
            for (level, _) in home_ref.levels() {
                let id = home_ref.subscribe_object(level, listener.clone());
                view.level_subscriptions.insert(level, id);
            }

            for collection in Collection::ALL {
                for &key in home_ref.collection(collection) {
                    view.build_object(&home_ref, key);
                }
            }
            if config.shadow_on_floor {
                view.build_shadow(&home_ref, interrupt);
            }
            let ViewState {
                light_scope,
                registry,
                scene,
                ..
            } = &mut *view;
            light_scope.recompute_all(&home_ref, registry, scene);

            let root = view.scene.root();
            view.canvas.attach(root);
            tracing::info!(
                objects = view.registry.len(),
                nodes = view.scene.len(),
                scoped = view.light_scope.is_active(),
                "3D view synchronized"
            );
        }
        drop(home_ref);

        Ok(Self {
            home,
            state,
            camera,
        })
    }

    /// Model object drawn at canvas coordinates `(x, y)`
    pub fn pick(&self, x: f64, y: f64) -> Option<ObjectKey> {
        let view = self.state.borrow();
        let mut node = view.canvas.pick(&view.scene, x, y)?;
        loop {
            if let Some(key) = view.registry.owner(node) {
                return Some(key);
            }
            node = view.scene.parent(node)?;
        }
    }

    /// Moves the camera, smoothly when `animated`
    pub fn request_camera_pose(&self, pose: CameraPose, animated: bool) {
        let handle = self.camera.handle();
        if animated {
            handle.request(pose);
        } else {
            handle.set_pose(pose);
        }
    }

    /// Pose currently shown
    pub fn camera_pose(&self) -> CameraPose {
        self.camera.handle().rendered()
    }

    pub fn is_camera_moving(&self) -> bool {
        self.camera.handle().is_animating()
    }

    /// Nodes lit by `light`, `None` when it lights the whole scene
    pub fn light_scope(&self, light: NodeKey) -> Option<FxHashSet<NodeKey>> {
        self.state.borrow().scene.light_scope(light).cloned()
    }

    /// Whether `light` illuminates `node`
    pub fn lights_node(&self, light: NodeKey, node: NodeKey) -> bool {
        self.state
            .borrow()
            .scene
            .light_scope(light)
            .map_or(true, |scope| scope.contains(&node))
    }

    pub fn directional_lights(&self) -> Vec<NodeKey> {
        LightScopeCalculator::directional_lights(&self.state.borrow().scene)
    }

    pub fn default_lights(&self) -> Vec<NodeKey> {
        self.state.borrow().default_lights.clone()
    }

    pub fn shadow_nodes(&self) -> Vec<NodeKey> {
        self.state.borrow().shadow_nodes.clone()
    }

    /// Whether furniture changed since the floor shadow was built
    pub fn is_shadow_stale(&self) -> bool {
        self.state.borrow().shadow_stale
    }

    /// Distance from the camera to the closest visible object box, used to
    /// place the front clip plane
    pub fn front_clip_distance(&self) -> Option<f64> {
        let pose = self.camera_pose();
        let eye = Point3::new(pose.x, pose.y, pose.z);
        let view = self.state.borrow();
        view.registry
            .iter()
            .filter(|(_, node)| view.scene.is_effectively_visible(*node))
            .filter_map(|(_, node)| view.scene.bounds(node))
            .map(|bounds| nearest_distance_point_to_box(&eye, &bounds))
            .reduce(f64::min)
    }

    /// Changes the light scoping threshold; 0 or less lights everything
    pub fn set_subpart_size_under_light(&self, size: f64) {
        let mut view = self.state.borrow_mut();
        view.light_scope.set_subpart_size(size);
        if view.light_scope.is_active() {
            view.request_full_scope();
        } else {
            let ViewState {
                light_scope,
                registry,
                scene,
                ..
            } = &mut *view;
            if let Ok(home) = self.home.try_borrow() {
                light_scope.recompute_all(&home, registry, scene);
            }
        }
    }

    pub fn node_of(&self, key: ObjectKey) -> Option<NodeKey> {
        self.state.borrow().registry.lookup(key)
    }

    pub fn registered_count(&self) -> usize {
        self.state.borrow().registry.len()
    }

    /// Objects waiting for the next update pass
    pub fn pending_updates(&self) -> usize {
        self.state.borrow().updates.len()
    }

    pub fn stats(&self) -> SyncStats {
        self.state.borrow().stats
    }

    /// Read access to the scene
    pub fn with_scene<R>(&self, f: impl FnOnce(&SceneGraph) -> R) -> R {
        f(&self.state.borrow().scene)
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Tears the view down: stops the camera timer, unsubscribes every
    /// listener, destroys every node and detaches the canvas.
    pub fn dispose(&mut self) {
        if self.state.borrow().disposed {
            return;
        }
        self.camera.stop();
        let home = self.home.try_borrow().ok();
        self.state.borrow_mut().dispose(home.as_deref());
    }
}

impl Drop for SyncView {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for SyncView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.state.borrow();
        f.debug_struct("SyncView")
            .field("objects", &view.registry.len())
            .field("nodes", &view.scene.len())
            .field("pending_updates", &view.updates.len())
            .field("disposed", &view.disposed)
            .finish()
    }
}
