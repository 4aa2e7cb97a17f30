// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera navigation.
//!
//! The camera orbits a target point: `heading` and `elevation` (degrees)
//! place the eye on a sphere of radius `distance` around the target. The
//! target's coordinate system depends on the mode, see [`CameraTarget`]. In
//! radial-tree mode the heading is relative to the target's own angle, so a
//! camera framing a platform faces it from outside the ring.
//!
//! Every programmatic move is a pan: the affected fields are morphed over a
//! computed duration while a master `pan_part` scalar runs from 0 to 1. The
//! end of the master morph emits [`Hook::PanEnd`], which the engine turns
//! into [`Camera::pan_ended`] and
//! [`GeometryCoordinator::camera_pan_finished`].
//!
//! Manual controls ([`dolly`](Camera::dolly), [`revolve`](Camera::revolve),
//! [`pan`](Camera::pan)) write the state directly.

use alloc::vec::Vec;

use crate::animation::{Animator, Hook, MorphKey};
use crate::geometry::{GeometryCoordinator, ViewMode};
use crate::math::{EPSILON, GOLDEN_RATIO, Rtz, SQRT_2, Xyz, deg, field_distance, rad};
use crate::morph::Easing;
use crate::time::HostTime;
use crate::trace::{PanEvent, Tracer};
use crate::transform::Transform3d;
use crate::tree::{FsTree, NodeId};

/// Names one animatable camera scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraField {
    /// Orbit heading.
    Heading,
    /// Orbit elevation.
    Elevation,
    /// Distance from eye to target.
    Distance,
    /// Near clip plane.
    Near,
    /// Far clip plane.
    Far,
    /// Progress of the current pan.
    PanPart,
    /// Disc or treemap target X.
    TargetX,
    /// Disc or treemap target Y.
    TargetY,
    /// Treemap or radial-tree target height.
    TargetZ,
    /// Radial-tree target radius.
    TargetR,
    /// Radial-tree target angle.
    TargetTheta,
}

impl CameraField {
    /// Every field.
    pub const ALL: [Self; 11] = [
        Self::Heading,
        Self::Elevation,
        Self::Distance,
        Self::Near,
        Self::Far,
        Self::PanPart,
        Self::TargetX,
        Self::TargetY,
        Self::TargetZ,
        Self::TargetR,
        Self::TargetTheta,
    ];
}

/// The point the camera orbits, in the coordinates of the active mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraTarget {
    /// A point on the disc plane.
    Disc {
        /// X.
        x: f64,
        /// Y.
        y: f64,
    },
    /// A point above the treemap.
    Map {
        /// X.
        x: f64,
        /// Y.
        y: f64,
        /// Height.
        z: f64,
    },
    /// A cylindrical point in the radial tree.
    Tree {
        /// Radius.
        r: f64,
        /// Angle in degrees.
        theta: f64,
        /// Height.
        z: f64,
    },
}

impl CameraTarget {
    /// The origin of `mode`'s coordinate system.
    #[must_use]
    pub const fn origin(mode: ViewMode) -> Self {
        match mode {
            ViewMode::DiscV => Self::Disc { x: 0.0, y: 0.0 },
            ViewMode::MapV => Self::Map {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            ViewMode::TreeV => Self::Tree {
                r: 0.0,
                theta: 0.0,
                z: 0.0,
            },
        }
    }

    /// Cartesian position of the target.
    #[must_use]
    pub fn to_xyz(self) -> Xyz {
        match self {
            Self::Disc { x, y } => Xyz::new(x, y, 0.0),
            Self::Map { x, y, z } => Xyz::new(x, y, z),
            Self::Tree { r, theta, z } => Rtz::new(r, theta, z).to_xyz(),
        }
    }

    /// The target fields that apply to this variant.
    fn fields(self) -> &'static [CameraField] {
        match self {
            Self::Disc { .. } => &[CameraField::TargetX, CameraField::TargetY],
            Self::Map { .. } => &[
                CameraField::TargetX,
                CameraField::TargetY,
                CameraField::TargetZ,
            ],
            Self::Tree { .. } => &[
                CameraField::TargetR,
                CameraField::TargetTheta,
                CameraField::TargetZ,
            ],
        }
    }

    fn get(self, field: CameraField) -> Option<f64> {
        match (self, field) {
            (Self::Disc { x, .. } | Self::Map { x, .. }, CameraField::TargetX) => Some(x),
            (Self::Disc { y, .. } | Self::Map { y, .. }, CameraField::TargetY) => Some(y),
            (Self::Map { z, .. } | Self::Tree { z, .. }, CameraField::TargetZ) => Some(z),
            (Self::Tree { r, .. }, CameraField::TargetR) => Some(r),
            (Self::Tree { theta, .. }, CameraField::TargetTheta) => Some(theta),
            _ => None,
        }
    }

    fn slot(&mut self, field: CameraField) -> Option<&mut f64> {
        match (self, field) {
            (Self::Disc { x, .. } | Self::Map { x, .. }, CameraField::TargetX) => Some(x),
            (Self::Disc { y, .. } | Self::Map { y, .. }, CameraField::TargetY) => Some(y),
            (Self::Map { z, .. } | Self::Tree { z, .. }, CameraField::TargetZ) => Some(z),
            (Self::Tree { r, .. }, CameraField::TargetR) => Some(r),
            (Self::Tree { theta, .. }, CameraField::TargetTheta) => Some(theta),
            _ => None,
        }
    }
}

/// Orbit parameters plus the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Heading in degrees. Relative to the target angle in radial-tree mode.
    pub heading: f64,
    /// Elevation above the horizon in degrees.
    pub elevation: f64,
    /// Distance from eye to target.
    pub distance: f64,
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Near clip plane.
    pub near: f64,
    /// Far clip plane.
    pub far: f64,
    /// Progress of the current pan, in `[0, 1]`.
    pub pan_part: f64,
    /// Whether the user has moved the camera since the last pan.
    pub manual: bool,
    /// Orbit center.
    pub target: CameraTarget,
}

impl CameraState {
    /// A camera at the origin of `mode` with the given field of view.
    #[must_use]
    pub const fn new(mode: ViewMode, fov: f64) -> Self {
        Self {
            heading: 0.0,
            elevation: 0.0,
            distance: 1000.0,
            fov,
            near: 1.0,
            far: 100_000.0,
            pan_part: 1.0,
            manual: false,
            target: CameraTarget::origin(mode),
        }
    }

    /// Reads `field`, or `None` if the current target has no such field.
    #[must_use]
    pub fn field(&self, field: CameraField) -> Option<f64> {
        match field {
            CameraField::Heading => Some(self.heading),
            CameraField::Elevation => Some(self.elevation),
            CameraField::Distance => Some(self.distance),
            CameraField::Near => Some(self.near),
            CameraField::Far => Some(self.far),
            CameraField::PanPart => Some(self.pan_part),
            _ => self.target.get(field),
        }
    }

    /// Writes `field`. Returns `false` if the current target has no such
    /// field.
    pub fn set_field(&mut self, field: CameraField, value: f64) -> bool {
        let slot = match field {
            CameraField::Heading => &mut self.heading,
            CameraField::Elevation => &mut self.elevation,
            CameraField::Distance => &mut self.distance,
            CameraField::Near => &mut self.near,
            CameraField::Far => &mut self.far,
            CameraField::PanPart => &mut self.pan_part,
            _ => match self.target.slot(field) {
                Some(slot) => slot,
                None => return false,
            },
        };
        *slot = value;
        true
    }

    /// Eye position in world coordinates.
    #[must_use]
    pub fn eye_position(&self) -> Xyz {
        orbit(self.target, self.heading, self.elevation, self.distance)
    }
}

/// Tunables for camera framing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Near plane as a fraction of the distance.
    pub near_to_distance: f64,
    /// Far plane as a multiple of the near plane.
    pub far_to_near: f64,
    /// Shortest disc pan, in seconds.
    pub discv_min_pan_time: f64,
    /// Longest disc pan, in seconds.
    pub discv_max_pan_time: f64,
    /// Shortest treemap pan, in seconds.
    pub mapv_min_pan_time: f64,
    /// Longest treemap pan, in seconds.
    pub mapv_max_pan_time: f64,
    /// Shortest radial-tree pan, in seconds.
    pub treev_min_pan_time: f64,
    /// Longest radial-tree pan, in seconds.
    pub treev_max_pan_time: f64,
    /// Eye speed of radial-tree pans, in units per second.
    pub treev_avg_velocity: f64,
}

impl CameraConfig {
    /// The standard camera.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            fov: 60.0,
            near_to_distance: 0.5,
            far_to_near: 128.0,
            discv_min_pan_time: 0.5,
            discv_max_pan_time: 3.0,
            mapv_min_pan_time: 0.5,
            mapv_max_pan_time: 4.0,
            treev_min_pan_time: 1.0,
            treev_max_pan_time: 4.0,
            treev_avg_velocity: 1024.0,
        }
    }

    /// Longest pan in `mode`.
    #[must_use]
    pub const fn max_pan_time(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::DiscV => self.discv_max_pan_time,
            ViewMode::MapV => self.mapv_max_pan_time,
            ViewMode::TreeV => self.treev_max_pan_time,
        }
    }

    fn clips(&self, distance: f64) -> (f64, f64) {
        let near = self.near_to_distance * distance;
        (near, self.far_to_near * near)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// A framing the camera pans to.
#[derive(Clone, Copy, Debug)]
struct Shot {
    heading: f64,
    elevation: f64,
    distance: f64,
    near: f64,
    far: f64,
    target: CameraTarget,
}

impl Shot {
    fn of(state: &CameraState) -> Self {
        Self {
            heading: state.heading,
            elevation: state.elevation,
            distance: state.distance,
            near: state.near,
            far: state.far,
            target: state.target,
        }
    }

    fn eye(&self) -> Xyz {
        orbit(self.target, self.heading, self.elevation, self.distance)
    }
}

/// Eye position orbiting `target`.
fn orbit(target: CameraTarget, heading: f64, elevation: f64, distance: f64) -> Xyz {
    let heading = match target {
        CameraTarget::Tree { theta, .. } => theta + heading - 180.0,
        CameraTarget::Disc { .. } | CameraTarget::Map { .. } => heading,
    };
    let (sin_h, cos_h) = rad(heading).sin_cos();
    let (sin_e, cos_e) = rad(elevation).sin_cos();
    target.to_xyz() + Xyz::new(cos_h * cos_e, sin_h * cos_e, sin_e) * distance
}

/// Camera state, navigation history, and pan bookkeeping.
#[derive(Clone, Debug)]
pub struct Camera {
    state: CameraState,
    config: CameraConfig,
    mode: ViewMode,
    birdseye: Option<CameraState>,
    history: Vec<Option<NodeId>>,
    current: Option<NodeId>,
    moving: bool,
}

impl Camera {
    /// Creates a camera. Call [`init`](Self::init) once a layout exists.
    #[must_use]
    pub fn new(config: CameraConfig) -> Self {
        Self {
            state: CameraState::new(ViewMode::DiscV, config.fov),
            config,
            mode: ViewMode::DiscV,
            birdseye: None,
            history: Vec::new(),
            current: None,
            moving: false,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    /// Framing tunables.
    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Mode the camera was last initialized for.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Node of interest.
    #[must_use]
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Number of entries in the navigation history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Whether a pan is running.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the bird's-eye view is active.
    #[must_use]
    pub fn is_birdseye(&self) -> bool {
        self.birdseye.is_some()
    }

    // -- Setup --

    /// Frames the whole tree for the layout in `geometry`.
    ///
    /// Any camera animation is cancelled and the history is cleared. An
    /// `initial` view sits further back than the view after a mode switch.
    pub fn init(
        &mut self,
        tree: &FsTree,
        geometry: &GeometryCoordinator,
        animator: &mut Animator,
        initial: bool,
    ) {
        self.pan_break(animator);
        self.mode = geometry.mode();
        let fov = self.config.fov;
        let root = tree.root_dir();
        let mut s = CameraState::new(self.mode, fov);

        match self.mode {
            ViewMode::DiscV => {
                let radius = root
                    .map(|r| tree.discv(r).radius)
                    .filter(|&r| r > EPSILON)
                    .unwrap_or(1000.0);
                let d = field_distance(fov, 2.0 * radius);
                s.heading = 270.0;
                s.elevation = 90.0;
                s.distance = if initial { 2.0 * d } else { 3.0 * d };
                s.near = 0.9375 * s.distance;
                s.far = 1.0625 * s.distance;
                let pos = root.map(|r| geometry.discv_node_pos(tree, r)).unwrap_or_default();
                s.target = CameraTarget::Disc { x: pos.x, y: pos.y };
            }
            ViewMode::MapV => {
                let (w, h) = root.map_or((0.0, 0.0), |r| {
                    let g = tree.mapv(r);
                    (g.width(), g.height)
                });
                let w = if w > EPSILON { w } else { 1000.0 };
                let h = if h > EPSILON { h } else { 100.0 };
                let d = field_distance(fov, w).max(h);
                s.heading = 270.0;
                s.elevation = 52.5;
                s.distance = if initial { 2.0 * d } else { 1.5 * d };
                (s.near, s.far) = self.config.clips(s.distance);
                s.target = CameraTarget::Map {
                    x: 0.0,
                    y: 0.0,
                    z: 0.5 * h,
                };
            }
            ViewMode::TreeV => {
                let extent = root
                    .filter(|&r| !geometry.treev_is_leaf(tree, r))
                    .map(|r| geometry.treev_extents(tree, r).1.r)
                    .filter(|&r| r > EPSILON)
                    .unwrap_or(geometry.core_radius() + 1000.0);
                let d = field_distance(fov, 2.0 * extent);
                s.heading = 90.0;
                s.elevation = if initial { 75.0 } else { 60.0 };
                s.distance = if initial { 4.0 * d } else { 2.0 * d };
                (s.near, s.far) = self.config.clips(s.distance);
                s.target = CameraTarget::Tree {
                    r: 0.0,
                    theta: 90.0,
                    z: 0.0,
                };
            }
        }

        self.state = s;
        self.birdseye = None;
        self.moving = false;
        self.history.clear();
        self.current = root;
        animator.request_redraw();
    }

    // -- Pans --

    /// Makes every camera morph complete on the next tick.
    pub fn pan_finish(&self, animator: &mut Animator) {
        for field in CameraField::ALL {
            animator.morph_finish(MorphKey::Camera(field));
        }
    }

    /// Cancels every camera morph where it stands. The cancelled pan
    /// never reports its end.
    pub fn pan_break(&mut self, animator: &mut Animator) {
        for field in CameraField::ALL {
            animator.morph_break(MorphKey::Camera(field));
        }
        self.moving = false;
    }

    /// Called when a pan's master morph completes.
    pub fn pan_ended(&mut self) {
        self.moving = false;
    }

    /// Pans to `node` with a sigmoid easing and the computed duration.
    pub fn look_at(
        &mut self,
        tree: &FsTree,
        geometry: &GeometryCoordinator,
        animator: &mut Animator,
        node: NodeId,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        self.look_at_full(tree, geometry, animator, node, Easing::Sigmoid, None, now, tracer);
    }

    /// Pans to `node`.
    ///
    /// Leaves the bird's-eye view and supersedes any running pan. The
    /// duration is computed from the distance travelled unless `pan_time`
    /// gives a positive override. Stale handles and the metanode are
    /// ignored.
    pub fn look_at_full(
        &mut self,
        tree: &FsTree,
        geometry: &GeometryCoordinator,
        animator: &mut Animator,
        node: NodeId,
        easing: Easing,
        pan_time: Option<f64>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        if !tree.is_alive(node) || node == tree.metanode() {
            return;
        }
        self.birdseye = None;
        self.pan_break(animator);

        let shot = match self.mode {
            ViewMode::DiscV => self.discv_shot(tree, geometry, node),
            ViewMode::MapV => self.mapv_shot(tree, geometry, node),
            ViewMode::TreeV => self.treev_shot(tree, geometry, node),
        };
        let delta = shot.eye() - self.state.eye_position();
        let duration = match pan_time.filter(|&t| t > 0.0) {
            Some(t) => t,
            None => self.pan_time(tree, delta.length()),
        };

        // Long treemap pans pull back so both ends stay in view.
        let xy_travel = delta.planar_length();
        let apogee = (self.mode == ViewMode::MapV
            && xy_travel > 3.0 * self.state.distance.max(shot.distance))
        .then(|| 1.2 * shot.distance.max(xy_travel));

        self.apply_shot(animator, &shot, easing, duration, apogee, now);
        self.start_pan(animator, duration, Hook::PanEnd { node: Some(node) }, now);
        tracer.pan(&PanEvent {
            node_index: node.index(),
            mode: self.mode,
            duration_secs: duration,
            swing_back: apogee.is_some(),
        });

        let backtracking = self.history.last() == Some(&None);
        if backtracking {
            self.history.pop();
        } else if let Some(cur) = self.current.filter(|&cur| cur != node) {
            if self.history.last() != Some(&Some(cur)) {
                self.history.push(Some(cur));
            }
        }
        self.current = Some(node);
        self.state.manual = false;
    }

    /// Pans back to the previously visited node.
    ///
    /// History entries whose nodes no longer exist are discarded on the way.
    pub fn look_at_previous(
        &mut self,
        tree: &FsTree,
        geometry: &GeometryCoordinator,
        animator: &mut Animator,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        while let Some(&Some(prev)) = self.history.last() {
            self.history.pop();
            if tree.is_alive(prev) {
                self.history.push(None);
                self.look_at(tree, geometry, animator, prev, now, tracer);
                return;
            }
        }
    }

    /// Two-legged radial-tree pan to `node`.
    ///
    /// The first leg swings the heading and the target angle round with an
    /// inverse-quadratic easing, keeping the target radius. When it ends the
    /// engine schedules the second leg, a full [`look_at_full`](Self::look_at_full)
    /// of the same duration, one frame later. Outside radial-tree mode this
    /// is a plain [`look_at_full`](Self::look_at_full).
    pub fn treev_lpan_look_at(
        &mut self,
        tree: &FsTree,
        geometry: &GeometryCoordinator,
        animator: &mut Animator,
        node: NodeId,
        pan_time: Option<f64>,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) {
        if !tree.is_alive(node) || node == tree.metanode() {
            return;
        }
        if self.mode != ViewMode::TreeV {
            self.look_at_full(tree, geometry, animator, node, Easing::Sigmoid, pan_time, now, tracer);
            return;
        }
        self.birdseye = None;

        let full = self.treev_shot(tree, geometry, node);
        let CameraTarget::Tree { theta, .. } = full.target else {
            return;
        };
        let mut shot = Shot::of(&self.state);
        shot.heading = full.heading;
        if let CameraTarget::Tree { theta: t, .. } = &mut shot.target {
            *t = theta;
        }
        let duration = match pan_time.filter(|&t| t > 0.0) {
            Some(t) => t,
            None => {
                let travel = (shot.eye() - self.state.eye_position()).length();
                self.pan_time(tree, travel)
            }
        };

        self.pan_break(animator);
        self.morph(animator, CameraField::Heading, Easing::InvQuadratic, shot.heading, duration, now);
        self.morph(animator, CameraField::TargetTheta, Easing::InvQuadratic, theta, duration, now);
        self.start_pan(
            animator,
            duration,
            Hook::LpanStageOne {
                node,
                pan_time: Some(duration),
            },
            now,
        );
        tracer.pan(&PanEvent {
            node_index: node.index(),
            mode: self.mode,
            duration_secs: duration,
            swing_back: false,
        });
        self.state.manual = false;
    }

    /// Rises to a top-down view of the whole tree, or returns from it.
    ///
    /// Going up remembers the current framing; coming down pans back to
    /// it. Requests that do not change the view are ignored.
    pub fn birdseye_view(
        &mut self,
        tree: &FsTree,
        animator: &mut Animator,
        going_up: bool,
        now: HostTime,
    ) {
        if going_up == self.birdseye.is_some() {
            return;
        }
        self.pan_break(animator);
        let duration = self.config.max_pan_time(self.mode);
        let fov = self.state.fov;
        let root = tree.root_dir();

        if going_up {
            self.birdseye = Some(self.state);
            let mut shot = Shot::of(&self.state);
            shot.elevation = 90.0;
            match self.mode {
                ViewMode::DiscV => {
                    let radius = root
                        .map(|r| tree.discv(r).radius)
                        .filter(|&r| r > EPSILON)
                        .unwrap_or(1000.0);
                    shot.distance = 2.0 * field_distance(fov, 2.0 * radius);
                }
                ViewMode::MapV => {
                    let width = root
                        .map(|r| tree.mapv(r).width())
                        .filter(|&w| w > EPSILON)
                        .unwrap_or(1000.0);
                    shot.heading = 270.0;
                    shot.distance = field_distance(fov, width);
                }
                ViewMode::TreeV => {
                    if let CameraTarget::Tree { theta, .. } = self.state.target {
                        shot.heading = 90.0 - theta;
                    }
                    shot.distance = 4.0 * self.state.distance;
                }
            }
            (shot.near, shot.far) = self.config.clips(shot.distance);
            self.apply_shot(animator, &shot, Easing::SigmoidAccel, duration, None, now);
        } else if let Some(saved) = self.birdseye.take() {
            self.apply_shot(animator, &Shot::of(&saved), Easing::Sigmoid, duration, None, now);
        }
        self.start_pan(animator, duration, Hook::PanEnd { node: None }, now);
    }

    // -- Manual controls --

    /// Moves toward (`dk < 0`) or away from the target.
    pub fn dolly(&mut self, animator: &mut Animator, dk: f64) {
        let s = &mut self.state;
        s.distance = (s.distance + dk * s.distance / 256.0).max(16.0);
        (s.near, s.far) = self.config.clips(s.distance);
        s.manual = true;
        animator.request_redraw();
    }

    /// Orbits the target.
    pub fn revolve(&mut self, animator: &mut Animator, d_heading: f64, d_elevation: f64) {
        let s = &mut self.state;
        s.heading = (s.heading - d_heading).rem_euclid(360.0);
        s.elevation = (s.elevation + d_elevation).clamp(1.0, 90.0);
        s.manual = true;
        animator.request_redraw();
    }

    /// Slides the target across the view.
    pub fn pan(&mut self, animator: &mut Animator, dx: f64, dy: f64) {
        let s = &mut self.state;
        let scale = s.distance / 800.0;
        let (sin_h, cos_h) = rad(s.heading).sin_cos();
        match &mut s.target {
            CameraTarget::Disc { x, y } => {
                *x += dx * scale;
                *y -= dy * scale;
            }
            CameraTarget::Map { x, y, .. } => {
                *x += (dx * sin_h + dy * cos_h) * scale;
                *y += (-dx * cos_h + dy * sin_h) * scale;
            }
            CameraTarget::Tree { theta, z, .. } => {
                *theta -= dx * 0.15;
                *z += dy * scale;
            }
        }
        s.manual = true;
        animator.request_redraw();
    }

    // -- Output --

    /// Eye position in world coordinates.
    #[must_use]
    pub fn eye_position(&self) -> Xyz {
        self.state.eye_position()
    }

    /// World-to-view matrix, with +Z up.
    #[must_use]
    pub fn view_transform(&self) -> Transform3d {
        Transform3d::look_at(
            self.eye_position(),
            self.state.target.to_xyz(),
            Xyz::new(0.0, 0.0, 1.0),
        )
    }

    /// Perspective projection for a viewport of the given aspect ratio.
    ///
    /// Degenerate clip planes and aspect ratios are clamped.
    #[must_use]
    pub fn projection(&self, aspect: f64) -> Transform3d {
        let near = self.state.near.max(0.01);
        let far = if self.state.far > near {
            self.state.far
        } else {
            near + 1.0
        };
        let aspect = if aspect < 0.01 { 1.0 } else { aspect };
        Transform3d::perspective(rad(self.state.fov), aspect, near, far)
    }

    // -- Framing --

    fn discv_shot(&self, tree: &FsTree, geometry: &GeometryCoordinator, node: NodeId) -> Shot {
        let radius = Some(tree.discv(node).radius)
            .filter(|&r| r > EPSILON)
            .unwrap_or(100.0);
        let distance = 2.0 * field_distance(self.state.fov, 2.0 * radius);
        let pos = geometry.discv_node_pos(tree, node);
        Shot {
            distance,
            near: 0.9375 * distance,
            far: 1.0625 * distance,
            target: CameraTarget::Disc { x: pos.x, y: pos.y },
            ..Shot::of(&self.state)
        }
    }

    fn mapv_shot(&self, tree: &FsTree, geometry: &GeometryCoordinator, node: NodeId) -> Shot {
        let g = tree.mapv(node);
        let center = g.center();
        let (w, d, h) = (g.width(), g.depth(), g.height);
        let mut target = Xyz::new(center.x, center.y, geometry.mapv_node_z0(tree, node) + h);

        let root = tree.root_dir();
        let root_width = root.map_or(0.0, |r| tree.mapv(r).width());
        let heading = if root_width > EPSILON {
            270.0 + 45.0 * target.x / root_width
        } else {
            270.0
        };
        let elevation = if Some(node) == root {
            52.5
        } else {
            match tree.parent(node).map(|p| tree.mapv(p)) {
                Some(p) if p.depth() > EPSILON => 45.0 + 15.0 * (target.y - p.c0.y) / p.depth(),
                _ => 45.0,
            }
        };

        let mut diameter = SQRT_2 * (w * d).sqrt().max(0.5 * w.max(d));
        let multiplier = if tree.is_dir(node) {
            diameter = diameter.max(h);
            target.z += 0.5 * h;
            1.25
        } else {
            2.0
        };
        let distance = multiplier * field_distance(self.state.fov, diameter);
        let (near, far) = self.config.clips(distance);
        Shot {
            heading,
            elevation,
            distance,
            near,
            far,
            target: CameraTarget::Map {
                x: target.x,
                y: target.y,
                z: target.z,
            },
        }
    }

    fn treev_shot(&self, tree: &FsTree, geometry: &GeometryCoordinator, node: NodeId) -> Shot {
        let fov = self.state.fov;
        let treev = geometry.treev_config();
        let parent = tree.parent(node).filter(|&p| p != tree.metanode());

        if let Some(parent) = parent.filter(|_| geometry.treev_is_leaf(tree, node)) {
            let leaf = tree.treev(node).leaf;
            let platform = tree.treev(parent).platform;
            let r = geometry.treev_platform_r0(tree, parent) + leaf.distance;
            let theta = geometry.treev_platform_theta(tree, parent) + leaf.theta;
            let z = platform.height + (GOLDEN_RATIO - 1.0) * leaf.height;

            let top = 2.5 * field_distance(fov, SQRT_2 * treev.leaf_node_edge);
            let distance = top + (2.0 - GOLDEN_RATIO) * leaf.height;
            let near = self.config.near_to_distance * top;
            let heading = if platform.arc_width.abs() > EPSILON {
                -15.0 * leaf.theta / platform.arc_width
            } else {
                0.0
            };
            let mut elevation = 45.0;
            if leaf.height > EPSILON {
                let k = distance * rad(0.25 * fov).sin() / ((2.0 - GOLDEN_RATIO) * leaf.height);
                if (-1.0..=1.0).contains(&k) {
                    elevation = f64::max(elevation, 90.0 - (deg(k.asin()) - 0.25 * fov));
                }
            }
            Shot {
                heading,
                elevation,
                distance,
                near,
                far: self.config.far_to_near * near,
                target: CameraTarget::Tree { r, theta, z },
            }
        } else {
            let p = tree.treev(node).platform;
            let theta = geometry.treev_platform_theta(tree, node);
            let r = geometry.treev_platform_r0(tree, node) + 0.3 * p.depth
                - 0.2 * treev.platform_spacing_depth;
            let diameter = f64::max(p.depth + 0.5 * treev.platform_spacing_depth, 0.25 * p.height);
            let distance = field_distance(fov, diameter);
            let (near, far) = self.config.clips(distance);
            Shot {
                heading: -0.125 * (theta - 90.0),
                elevation: 30.0,
                distance,
                near,
                far,
                target: CameraTarget::Tree { r, theta, z: p.height },
            }
        }
    }

    /// Computed duration of a pan whose eye moves `travel` units.
    fn pan_time(&self, tree: &FsTree, travel: f64) -> f64 {
        let c = &self.config;
        let root = tree.root_dir();
        match self.mode {
            ViewMode::DiscV => {
                let diameter = root
                    .map(|r| 2.0 * tree.discv(r).radius)
                    .filter(|&d| d > EPSILON)
                    .unwrap_or(2000.0);
                (2.0 * travel / diameter).clamp(c.discv_min_pan_time, c.discv_max_pan_time)
            }
            ViewMode::MapV => {
                let diag = root
                    .map(|r| {
                        let g = tree.mapv(r);
                        g.width().hypot(g.depth())
                    })
                    .filter(|&d| d > EPSILON)
                    .unwrap_or(1000.0);
                let k = (travel / diag).sqrt();
                f64::max(c.mapv_min_pan_time, k.min(1.0) * c.mapv_max_pan_time)
            }
            ViewMode::TreeV => (travel / c.treev_avg_velocity)
                .clamp(c.treev_min_pan_time, c.treev_max_pan_time),
        }
    }

    // -- Morph plumbing --

    fn morph(
        &self,
        animator: &mut Animator,
        field: CameraField,
        easing: Easing,
        target: f64,
        duration: f64,
        now: HostTime,
    ) {
        let from = self.state.field(field).unwrap_or(target);
        animator.morph(MorphKey::Camera(field), from, easing, target, duration, now);
    }

    /// Morphs every field toward `shot`. With an `apogee`, the distance
    /// and clip planes travel out to it and back in two half-length legs.
    fn apply_shot(
        &self,
        animator: &mut Animator,
        shot: &Shot,
        easing: Easing,
        duration: f64,
        apogee: Option<f64>,
        now: HostTime,
    ) {
        self.morph(animator, CameraField::Heading, easing, shot.heading, duration, now);
        self.morph(animator, CameraField::Elevation, easing, shot.elevation, duration, now);
        let legs = [
            (CameraField::Distance, shot.distance),
            (CameraField::Near, shot.near),
            (CameraField::Far, shot.far),
        ];
        match apogee {
            Some(apg) => {
                let (apg_near, apg_far) = self.config.clips(apg);
                let half = 0.5 * duration;
                for ((field, end), mid) in legs.into_iter().zip([apg, apg_near, apg_far]) {
                    self.morph(animator, field, easing, mid, half, now);
                    self.morph(animator, field, easing, end, half, now);
                }
            }
            None => {
                for (field, end) in legs {
                    self.morph(animator, field, easing, end, duration, now);
                }
            }
        }
        for &field in shot.target.fields() {
            if let Some(end) = shot.target.get(field) {
                self.morph(animator, field, easing, end, duration, now);
            }
        }
    }

    /// Starts the master morph of a pan.
    fn start_pan(&mut self, animator: &mut Animator, duration: f64, end: Hook, now: HostTime) {
        self.state.pan_part = 0.0;
        animator.morph_full(
            MorphKey::Camera(CameraField::PanPart),
            0.0,
            Easing::Linear,
            1.0,
            duration,
            now,
            Some(Hook::Redraw),
            Some(end),
        );
        self.moving = true;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph::MorphTarget;
    use crate::time::Timebase;
    use crate::trace::TraceSink;
    use crate::tree::{NodeFlags, NodeKind};

    const SEC: u64 = 1_000_000_000;

    struct Lens<'a>(&'a mut CameraState);

    impl MorphTarget<MorphKey> for Lens<'_> {
        fn get(&self, key: MorphKey) -> Option<f64> {
            match key {
                MorphKey::Camera(f) => self.0.field(f),
                MorphKey::Deployment(_) => None,
            }
        }

        fn set(&mut self, key: MorphKey, value: f64) -> bool {
            match key {
                MorphKey::Camera(f) => self.0.set_field(f, value),
                MorphKey::Deployment(_) => false,
            }
        }
    }

    /// root holding two directories a and b, each with files.
    fn sample_tree() -> (FsTree, [NodeId; 3]) {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        tree.add_child(tree.metanode(), root);
        let mut dirs = [root; 2];
        for (i, name) in ["a", "b"].into_iter().enumerate() {
            let d = tree.create_node(NodeKind::Directory, name, 0);
            tree.add_child(root, d);
            for j in 0..3 {
                let f = tree.create_node(
                    NodeKind::RegFile,
                    alloc::format!("{name}{j}"),
                    40_000 * (i as u64 + 1),
                );
                tree.add_child(d, f);
            }
            tree.set_flags(d, NodeFlags { expanded: true });
            dirs[i] = d;
        }
        tree.set_flags(root, NodeFlags { expanded: true });
        tree.finalize();
        (tree, [root, dirs[0], dirs[1]])
    }

    /// A single directory holding `count` equal files, laid out as a grid.
    fn grid_tree(count: usize) -> (FsTree, [NodeId; 3]) {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        tree.add_child(tree.metanode(), root);
        for i in 0..count {
            let f = tree.create_node(NodeKind::RegFile, alloc::format!("f{i:04}"), 4096);
            tree.add_child(root, f);
        }
        tree.set_flags(root, NodeFlags { expanded: true });
        tree.finalize();
        let first = tree.children(root).next().expect("first file");
        let last = tree.children(root).last().expect("last file");
        (tree, [root, first, last])
    }

    #[derive(Default)]
    struct Pans(Vec<PanEvent>);

    impl TraceSink for Pans {
        fn on_pan(&mut self, e: &PanEvent) {
            self.0.push(*e);
        }
    }

    struct Rig {
        tree: FsTree,
        nodes: [NodeId; 3],
        geometry: GeometryCoordinator,
        animator: Animator,
        camera: Camera,
    }

    impl Rig {
        fn new(mode: ViewMode) -> Self {
            Self::with_tree(sample_tree(), mode)
        }

        fn with_tree((mut tree, nodes): (FsTree, [NodeId; 3]), mode: ViewMode) -> Self {
            let mut animator = Animator::new(Timebase::NANOS);
            let mut geometry = GeometryCoordinator::default();
            geometry.init(&mut tree, &mut animator, mode, &mut Tracer::none());
            let mut camera = Camera::default();
            camera.init(&tree, &geometry, &mut animator, true);
            Self {
                tree,
                nodes,
                geometry,
                animator,
                camera,
            }
        }

        fn look_at(&mut self, node: NodeId, t: u64) {
            self.camera.look_at(
                &self.tree,
                &self.geometry,
                &mut self.animator,
                node,
                HostTime(t),
                &mut Tracer::none(),
            );
        }

        fn tick(&mut self, t: u64) -> Vec<Hook> {
            let mut hooks = Vec::new();
            self.animator.begin_tick(
                HostTime(t),
                &mut Lens(self.camera.state_mut()),
                &mut hooks,
                &mut Tracer::none(),
            );
            hooks
        }
    }

    #[test]
    fn target_fields_follow_the_variant() {
        let mut s = CameraState::new(ViewMode::TreeV, 60.0);
        assert_eq!(s.field(CameraField::TargetX), None, "no x in cylinders");
        assert!(!s.set_field(CameraField::TargetY, 1.0), "no y in cylinders");
        assert!(s.set_field(CameraField::TargetTheta, 45.0), "theta exists");
        assert_eq!(s.field(CameraField::TargetTheta), Some(45.0), "written");
    }

    #[test]
    fn init_frames_the_root() {
        let rig = Rig::new(ViewMode::MapV);
        let s = rig.camera.state();
        assert_eq!((s.heading, s.elevation), (270.0, 52.5), "treemap overview angles");
        assert!((s.near - 0.5 * s.distance).abs() < 1e-9, "near tracks distance");
        assert!((s.far - 128.0 * s.near).abs() < 1e-6, "far tracks near");
        assert_eq!(rig.camera.current(), rig.tree.root_dir(), "root is current");
        assert_eq!(s.pan_part, 1.0, "no pan running");
    }

    #[test]
    fn look_at_completes_on_the_new_framing() {
        let mut rig = Rig::new(ViewMode::MapV);
        let [_, a, _] = rig.nodes;
        rig.look_at(a, 0);
        assert!(rig.camera.is_moving(), "pan started");
        assert_eq!(rig.camera.state().pan_part, 0.0, "pan restarts from zero");

        let hooks = rig.tick(10 * SEC);
        assert!(hooks.contains(&Hook::PanEnd { node: Some(a) }), "master morph ended");
        let s = rig.camera.state();
        assert_eq!(s.pan_part, 1.0, "pan complete");
        let CameraTarget::Map { x, y, .. } = s.target else {
            panic!("treemap target");
        };
        let center = rig.tree.mapv(a).center();
        assert!((x - center.x).abs() < 1e-9 && (y - center.y).abs() < 1e-9, "centered on a");
    }

    #[test]
    fn interrupted_pan_continues_from_where_it_stood() {
        let mut rig = Rig::new(ViewMode::MapV);
        let [_, a, b] = rig.nodes;
        rig.look_at(a, 0);
        let _ = rig.tick(SEC / 4);
        let mid = *rig.camera.state();

        rig.look_at(b, SEC / 4);
        let _ = rig.tick(SEC / 4);
        let s = rig.camera.state();
        assert!((s.distance - mid.distance).abs() < 1e-9, "no jump in distance");
        assert!((s.heading - mid.heading).abs() < 1e-9, "no jump in heading");
        assert!(
            (s.eye_position() - mid.eye_position()).length() < 1e-9,
            "eye continues from the interrupted position"
        );

        let _ = rig.tick(20 * SEC);
        let CameraTarget::Map { x, .. } = rig.camera.state().target else {
            panic!("treemap target");
        };
        assert!((x - rig.tree.mapv(b).center().x).abs() < 1e-9, "arrives at b");
        assert_eq!(rig.camera.history_len(), 2, "root and a remembered");
        assert_eq!(rig.camera.current(), Some(b), "b is current");
    }

    #[test]
    fn look_at_previous_backtracks_without_growing_history() {
        let mut rig = Rig::new(ViewMode::DiscV);
        let [root, a, b] = rig.nodes;
        rig.look_at(a, 0);
        rig.look_at(b, SEC);
        assert_eq!(rig.camera.history_len(), 2, "root, a");

        rig.camera.look_at_previous(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            HostTime(2 * SEC),
            &mut Tracer::none(),
        );
        assert_eq!(rig.camera.current(), Some(a), "back at a");
        assert_eq!(rig.camera.history_len(), 1, "only root left");

        rig.camera.look_at_previous(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            HostTime(3 * SEC),
            &mut Tracer::none(),
        );
        assert_eq!(rig.camera.current(), Some(root), "back at root");
        assert_eq!(rig.camera.history_len(), 0, "history exhausted");
    }

    #[test]
    fn look_at_previous_skips_destroyed_nodes() {
        let mut rig = Rig::new(ViewMode::DiscV);
        let [root, a, b] = rig.nodes;
        let fa = rig.tree.children(a).next().expect("a file");
        let fb = rig.tree.children(b).next().expect("b file");
        rig.look_at(fa, 0);
        rig.look_at(fb, SEC);
        assert_eq!(rig.camera.history_len(), 2, "root, fa");

        rig.tree.destroy_node(fa);
        rig.camera.look_at_previous(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            HostTime(2 * SEC),
            &mut Tracer::none(),
        );
        assert!(rig.camera.is_moving(), "panning to the surviving entry");
        assert_eq!(rig.camera.current(), Some(root), "destroyed entry skipped");
        assert_eq!(rig.camera.history_len(), 0, "history consumed");
    }

    #[test]
    fn first_visit_without_a_framed_node_is_not_remembered() {
        let mut rig = Rig::new(ViewMode::DiscV);
        rig.camera = Camera::default();
        let [_, a, b] = rig.nodes;
        rig.look_at(a, 0);
        assert_eq!(rig.camera.history_len(), 0, "nothing framed before a");

        rig.look_at(b, SEC);
        assert_eq!(rig.camera.history_len(), 1, "a remembered");
        rig.camera.look_at_previous(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            HostTime(2 * SEC),
            &mut Tracer::none(),
        );
        assert_eq!(rig.camera.current(), Some(a), "back at a");
    }

    #[test]
    fn long_treemap_pan_swings_back() {
        let mut rig = Rig::with_tree(grid_tree(400), ViewMode::MapV);
        let [_, first, last] = rig.nodes;
        rig.look_at(first, 0);
        let _ = rig.tick(10 * SEC);
        let start = rig.camera.state().distance;
        let end = rig.camera.mapv_shot(&rig.tree, &rig.geometry, last).distance;

        let mut pans = Pans::default();
        rig.camera.look_at(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            last,
            HostTime(10 * SEC),
            &mut Tracer::new(&mut pans),
        );
        if cfg!(feature = "trace") {
            assert_eq!(pans.0.len(), 1, "one pan reported");
            assert!(pans.0[0].swing_back, "reported as a swing back");
        }

        let mut t = 10 * SEC;
        let mut peak = start;
        let mut ended = false;
        while !ended && t < 30 * SEC {
            t += SEC / 20;
            ended = rig.tick(t).contains(&Hook::PanEnd { node: Some(last) });
            peak = peak.max(rig.camera.state().distance);
        }
        assert!(ended, "pan completed");
        assert!(peak > start && peak > end, "pulled back past both ends");
        let _ = rig.tick(t + SEC);
        assert!(
            (rig.camera.state().distance - end).abs() < 1e-9,
            "settles on the final framing"
        );
    }

    #[test]
    fn stale_node_is_ignored() {
        let mut rig = Rig::new(ViewMode::DiscV);
        let [_, a, _] = rig.nodes;
        let file = rig.tree.children(a).next().expect("a file");
        rig.tree.destroy_node(file);
        rig.look_at(file, 0);
        assert!(!rig.camera.is_moving(), "no pan");
        assert_eq!(rig.camera.history_len(), 0, "history untouched");
    }

    #[test]
    fn discv_pan_time_is_clamped() {
        let mut rig = Rig::new(ViewMode::DiscV);
        let [_, a, _] = rig.nodes;
        rig.look_at(a, 0);
        let hooks = rig.tick(SEC / 2 - 1);
        assert!(!hooks.contains(&Hook::PanEnd { node: Some(a) }), "at least half a second");
        let hooks = rig.tick(3 * SEC);
        assert!(hooks.contains(&Hook::PanEnd { node: Some(a) }), "at most three seconds");
    }

    #[test]
    fn birdseye_round_trip_restores_the_framing() {
        let mut rig = Rig::new(ViewMode::MapV);
        let before = *rig.camera.state();
        rig.camera
            .birdseye_view(&rig.tree, &mut rig.animator, true, HostTime(0));
        let _ = rig.tick(10 * SEC);
        assert!(rig.camera.is_birdseye(), "up");
        assert_eq!(rig.camera.state().elevation, 90.0, "looking straight down");

        rig.camera
            .birdseye_view(&rig.tree, &mut rig.animator, false, HostTime(10 * SEC));
        let _ = rig.tick(20 * SEC);
        let after = rig.camera.state();
        assert!(!rig.camera.is_birdseye(), "down");
        assert_eq!(after.elevation, before.elevation, "elevation restored");
        assert_eq!(after.distance, before.distance, "distance restored");
        assert_eq!(after.target, before.target, "target restored");
    }

    #[test]
    fn treev_lpan_first_leg_keeps_the_radius() {
        let mut rig = Rig::new(ViewMode::TreeV);
        let [_, _, b] = rig.nodes;
        let CameraTarget::Tree { r: r_before, .. } = rig.camera.state().target else {
            panic!("radial target");
        };
        rig.camera.treev_lpan_look_at(
            &rig.tree,
            &rig.geometry,
            &mut rig.animator,
            b,
            Some(1.0),
            HostTime(0),
            &mut Tracer::none(),
        );
        let hooks = rig.tick(2 * SEC);
        assert!(
            hooks.contains(&Hook::LpanStageOne {
                node: b,
                pan_time: Some(1.0)
            }),
            "first leg ended"
        );
        let CameraTarget::Tree { r, theta, .. } = rig.camera.state().target else {
            panic!("radial target");
        };
        assert_eq!(r, r_before, "radius untouched");
        let expected = rig.geometry.treev_platform_theta(&rig.tree, b);
        assert!((theta - expected).abs() < 1e-9, "swung round to b");
    }

    #[test]
    fn manual_controls_clamp() {
        let mut rig = Rig::new(ViewMode::TreeV);
        rig.camera.revolve(&mut rig.animator, 400.0, 200.0);
        let s = rig.camera.state();
        assert!((0.0..360.0).contains(&s.heading), "heading wraps");
        assert_eq!(s.elevation, 90.0, "elevation clamps");
        assert!(s.manual, "manual mode");

        rig.camera.dolly(&mut rig.animator, -1.0e6);
        assert_eq!(rig.camera.state().distance, 16.0, "dolly floor");
    }

    #[test]
    fn view_transform_looks_at_the_target() {
        let rig = Rig::new(ViewMode::DiscV);
        let view = rig.camera.view_transform();
        let target = rig.camera.state().target.to_xyz();
        let p = view.transform_point(target);
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6, "target on the view axis");
        assert!(
            (p.z + rig.camera.state().distance).abs() < 1e-6,
            "target at orbit distance"
        );
    }
}
