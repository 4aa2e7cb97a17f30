// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine façade.
//!
//! [`Engine`] owns the tree, the animator, the geometry coordinator, and the
//! camera, and is the only place where morph hooks and deferred events are
//! turned back into calls on those parts. A host drives it like this:
//!
//! ```text
//!   input ──► execute_colexp / look_at / dolly / ...
//!   frame ──► tick(now) ──► evaluate(now) ──► GeometryChanges ──► renderer
//!                                           └► view_transform / projection
//! ```
//!
//! While [`FrameStatus::active`] is false the host may stop ticking until
//! the next command.

use alloc::vec::Vec;
use core::mem;

use crate::animation::{Animator, Deferred, Hook, MorphKey};
use crate::camera::{Camera, CameraConfig, CameraState};
use crate::colexp::{self, ColexpAction, ColexpConfig};
use crate::geometry::{CursorBox, GeometryChanges, GeometryCoordinator, ViewMode};
use crate::layout::{DiscVConfig, MapVConfig, TreeVConfig};
use crate::morph::{Easing, MorphTarget};
use crate::time::{HostTime, Timebase};
use crate::trace::{FrameEvent, PhaseKind, Tracer};
use crate::tree::{FsTree, NodeId};

/// Every tunable of the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Disc layout.
    pub discv: DiscVConfig,
    /// Treemap layout.
    pub mapv: MapVConfig,
    /// Radial-tree layout.
    pub treev: TreeVConfig,
    /// Camera framing.
    pub camera: CameraConfig,
    /// Collapse/expand timing.
    pub colexp: ColexpConfig,
}

impl EngineConfig {
    /// The standard presets of every part.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            discv: DiscVConfig::standard(),
            mapv: MapVConfig::standard(),
            treev: TreeVConfig::standard(),
            camera: CameraConfig::standard(),
            colexp: ColexpConfig::standard(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Outcome of one [`Engine::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStatus {
    /// Whether any animated scalar changed.
    pub changed: bool,
    /// Number of deferred events that ran.
    pub events_fired: usize,
    /// Whether the engine wants another frame.
    pub active: bool,
}

/// The scalars morphs write to: deployments in the tree and camera fields.
#[derive(Debug)]
pub struct Scalars<'a> {
    /// Node store.
    pub tree: &'a mut FsTree,
    /// Camera state.
    pub camera: &'a mut CameraState,
}

impl MorphTarget<MorphKey> for Scalars<'_> {
    fn get(&self, key: MorphKey) -> Option<f64> {
        match key {
            MorphKey::Deployment(id) => self.tree.is_alive(id).then(|| self.tree.deployment(id)),
            MorphKey::Camera(field) => self.camera.field(field),
        }
    }

    fn set(&mut self, key: MorphKey, value: f64) -> bool {
        match key {
            MorphKey::Deployment(id) => {
                if !self.tree.is_alive(id) {
                    return false;
                }
                self.tree.set_deployment(id, value);
                true
            }
            MorphKey::Camera(field) => self.camera.set_field(field, value),
        }
    }
}

/// Layout, animation, and navigation for one tree.
#[derive(Debug)]
pub struct Engine {
    tree: FsTree,
    animator: Animator,
    geometry: GeometryCoordinator,
    camera: Camera,
    config: EngineConfig,
    hooks: Vec<Hook>,
    fired: Vec<Deferred>,
}

impl Engine {
    /// Lays out `tree` in `mode` and frames it.
    #[must_use]
    pub fn new(
        tree: FsTree,
        mode: ViewMode,
        config: EngineConfig,
        timebase: Timebase,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> Self {
        let mut engine = Self {
            tree,
            animator: Animator::new(timebase),
            geometry: GeometryCoordinator::new(config.discv, config.mapv, config.treev),
            camera: Camera::new(config.camera),
            config,
            hooks: Vec::new(),
            fired: Vec::new(),
        };
        engine.layout(mode, true, now, tracer);
        engine
    }

    // -- Accessors --

    /// The node store.
    #[must_use]
    pub fn tree(&self) -> &FsTree {
        &self.tree
    }

    /// The geometry coordinator.
    #[must_use]
    pub fn geometry(&self) -> &GeometryCoordinator {
        &self.geometry
    }

    /// Mutable access to the coordinator, for draw-stage bookkeeping.
    pub fn geometry_mut(&mut self) -> &mut GeometryCoordinator {
        &mut self.geometry
    }

    /// The camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The animator.
    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active mode.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.geometry.mode()
    }

    // -- Tree and mode --

    /// Swaps in a new tree between frames.
    ///
    /// Every morph and deferred event is cancelled, the navigation history
    /// is cleared, and the new tree is laid out in the current mode.
    /// Returns the old tree.
    pub fn replace_tree(&mut self, tree: FsTree, now: HostTime, tracer: &mut Tracer<'_>) -> FsTree {
        self.animator.reset();
        let old = mem::replace(&mut self.tree, tree);
        self.layout(self.geometry.mode(), true, now, tracer);
        old
    }

    /// Switches to `mode`, laying out the tree anew and reframing it.
    pub fn set_mode(&mut self, mode: ViewMode, now: HostTime, tracer: &mut Tracer<'_>) {
        self.layout(mode, false, now, tracer);
    }

    fn layout(&mut self, mode: ViewMode, initial: bool, now: HostTime, tracer: &mut Tracer<'_>) {
        let frame = self.animator.frame_index();
        let (tree, animator, geometry) = (&mut self.tree, &mut self.animator, &mut self.geometry);
        tracer.phase(frame, PhaseKind::Layout, now, |t| {
            geometry.init(tree, animator, mode, t);
        });
        self.camera.init(&self.tree, &self.geometry, &mut self.animator, initial);
    }

    // -- Commands --

    /// Collapses or expands `dnode`. See [`colexp::execute`].
    ///
    /// # Panics
    ///
    /// Panics if `dnode` is not a directory.
    pub fn execute_colexp(
        &mut self,
        dnode: NodeId,
        action: ColexpAction,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        colexp::execute(
            &mut self.tree,
            &mut self.animator,
            &mut self.geometry,
            &self.config.colexp,
            dnode,
            action,
            now,
            tracer,
        );
    }

    /// Pans to `node`. See [`Camera::look_at`].
    pub fn look_at(&mut self, node: NodeId, now: HostTime, tracer: &mut Tracer<'_>) {
        self.camera
            .look_at(&self.tree, &self.geometry, &mut self.animator, node, now, tracer);
    }

    /// Pans to `node`. See [`Camera::look_at_full`].
    pub fn look_at_full(
        &mut self,
        node: NodeId,
        easing: Easing,
        pan_time: Option<f64>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        self.camera.look_at_full(
            &self.tree,
            &self.geometry,
            &mut self.animator,
            node,
            easing,
            pan_time,
            now,
            tracer,
        );
    }

    /// Pans back. See [`Camera::look_at_previous`].
    pub fn look_at_previous(&mut self, now: HostTime, tracer: &mut Tracer<'_>) {
        self.camera
            .look_at_previous(&self.tree, &self.geometry, &mut self.animator, now, tracer);
    }

    /// Two-legged radial-tree pan. See [`Camera::treev_lpan_look_at`].
    pub fn treev_lpan_look_at(
        &mut self,
        node: NodeId,
        pan_time: Option<f64>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        self.camera.treev_lpan_look_at(
            &self.tree,
            &self.geometry,
            &mut self.animator,
            node,
            pan_time,
            now,
            tracer,
        );
    }

    /// Enters or leaves the bird's-eye view.
    pub fn birdseye_view(&mut self, going_up: bool, now: HostTime) {
        self.camera
            .birdseye_view(&self.tree, &mut self.animator, going_up, now);
    }

    /// Completes the running pan on the next tick.
    pub fn pan_finish(&mut self) {
        self.camera.pan_finish(&mut self.animator);
    }

    /// Stops the running pan where it stands.
    pub fn pan_break(&mut self) {
        self.camera.pan_break(&mut self.animator);
    }

    /// See [`Camera::dolly`].
    pub fn dolly(&mut self, dk: f64) {
        self.camera.dolly(&mut self.animator, dk);
    }

    /// See [`Camera::revolve`].
    pub fn revolve(&mut self, d_heading: f64, d_elevation: f64) {
        self.camera.revolve(&mut self.animator, d_heading, d_elevation);
    }

    /// See [`Camera::pan`].
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.camera.pan(&mut self.animator, dx, dy);
    }

    // -- Frame --

    /// Advances every animation to `now` and runs what it triggers.
    pub fn tick(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> FrameStatus {
        let frame_index = self.animator.frame_index();
        let mut hooks = mem::take(&mut self.hooks);
        let mut fired = mem::take(&mut self.fired);

        let changed = self.animator.begin_tick(
            now,
            &mut Scalars {
                tree: &mut self.tree,
                camera: self.camera.state_mut(),
            },
            &mut hooks,
            tracer,
        );
        for hook in hooks.drain(..) {
            self.dispatch_hook(hook);
        }

        self.animator.end_tick(now, changed, &mut fired, tracer);
        let events_fired = fired.len();
        for event in fired.drain(..) {
            self.dispatch_deferred(event, now, tracer);
        }

        self.hooks = hooks;
        self.fired = fired;

        let status = FrameStatus {
            changed,
            events_fired,
            active: self.animator.is_active(),
        };
        tracer.frame(&FrameEvent {
            frame_index,
            now,
            morphs_active: self.animator.morphs_active(),
            events_fired,
            changed,
            active: status.active,
        });
        status
    }

    fn dispatch_hook(&mut self, hook: Hook) {
        match hook {
            Hook::Redraw => {}
            Hook::Deployment(node) => {
                if self.tree.is_alive(node) {
                    self.geometry.colexp_in_progress(&mut self.tree, node);
                }
            }
            Hook::PanEnd { node } => {
                self.camera.pan_ended();
                if let Some(node) = node.filter(|&n| self.tree.is_alive(n)) {
                    self.geometry.camera_pan_finished(&self.tree, node);
                }
            }
            Hook::LpanStageOne { node, pan_time } => {
                self.animator.schedule_event(
                    Deferred::LookAt {
                        node,
                        easing: Easing::Sigmoid,
                        pan_time,
                    },
                    1,
                );
            }
        }
        self.animator.request_redraw();
    }

    fn dispatch_deferred(&mut self, event: Deferred, now: HostTime, tracer: &mut Tracer<'_>) {
        match event {
            Deferred::LookAt {
                node,
                easing,
                pan_time,
            } => self.look_at_full(node, easing, pan_time, now, tracer),
        }
    }

    /// Brings stale geometry up to date for the renderer.
    pub fn evaluate(&mut self, now: HostTime, tracer: &mut Tracer<'_>) -> GeometryChanges {
        let mut changes = GeometryChanges::default();
        self.evaluate_into(now, &mut changes, tracer);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer.
    pub fn evaluate_into(
        &mut self,
        now: HostTime,
        changes: &mut GeometryChanges,
        tracer: &mut Tracer<'_>,
    ) {
        let frame = self.animator.frame_index();
        let (tree, geometry) = (&mut self.tree, &mut self.geometry);
        tracer.phase(frame, PhaseKind::Evaluate, now, |t| {
            geometry.evaluate_into(tree, frame, now, changes, t);
        });
    }

    /// The cursor box around the camera's node of interest, interpolated
    /// by the pan progress.
    #[must_use]
    pub fn cursor(&self) -> Option<CursorBox> {
        let node = self.camera.current().filter(|&n| self.tree.is_alive(n))?;
        Some(
            self.geometry
                .cursor(&self.tree, node, self.camera.state().pan_part),
        )
    }
}
