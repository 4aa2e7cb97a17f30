// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame animation driver.
//!
//! [`Animator`] owns the morph engine, the frame scheduler, and a framerate
//! meter. The embedding application calls the engine's tick once per
//! rendered frame; the engine splits it into two halves so that hooks can
//! be dispatched between them:
//!
//! 1. [`begin_tick`](Animator::begin_tick) advances every morph chain and
//!    collects the emitted [`Hook`]s.
//! 2. [`end_tick`](Animator::end_tick) samples the framerate, runs
//!    frame-deferred events if a redraw was requested, and drops into the
//!    steady state when nothing changed and nothing is pending.
//!
//! Creating a chain or scheduling an event requests a redraw.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::camera::CameraField;
use crate::morph::{Easing, MorphEngine, MorphTarget};
use crate::scheduler::FrameScheduler;
use crate::time::{HostTime, Timebase};
use crate::trace::{FramerateEvent, PhaseKind, Tracer};
use crate::tree::NodeId;

/// Window length, in seconds, of the framerate average.
pub const FRAMERATE_AVERAGE_TIME: f64 = 4.0;

/// Minimum number of samples the framerate window shrinks to.
const FRAMERATE_MIN_SAMPLES: usize = 4;

/// Names one animated scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MorphKey {
    /// A directory's deployment.
    Deployment(NodeId),
    /// A camera parameter.
    Camera(CameraField),
}

/// Notifications emitted by morph stages and dispatched by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hook {
    /// Request another frame.
    Redraw,
    /// A directory's deployment moved.
    Deployment(NodeId),
    /// A camera pan toward `node` completed.
    PanEnd {
        /// The framed node, if the pan had one.
        node: Option<NodeId>,
    },
    /// The first leg of a two-stage radial-tree pan completed.
    LpanStageOne {
        /// Node the second leg frames.
        node: NodeId,
        /// Duration of the second leg, if overridden.
        pan_time: Option<f64>,
    },
}

/// Work deferred by a number of frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Deferred {
    /// Frame `node` with the given easing.
    LookAt {
        /// Node to frame.
        node: NodeId,
        /// Easing of the pan.
        easing: Easing,
        /// Duration override in seconds.
        pan_time: Option<f64>,
    },
}

/// Running average of rendered frame times.
///
/// Samples are kept newest-last. The window grows while it spans less than
/// [`FRAMERATE_AVERAGE_TIME`] seconds and sheds its oldest samples while it
/// spans more than one second beyond that, never dropping below four.
#[derive(Clone, Debug, Default)]
pub struct FramerateMeter {
    samples: VecDeque<f64>,
    sum: f64,
    prev: Option<HostTime>,
    fps: f64,
}

impl FramerateMeter {
    /// Records that a frame was rendered at `now`.
    ///
    /// The first frame after [`stop_timing`](Self::stop_timing) only starts
    /// the clock.
    pub fn frame_rendered(&mut self, now: HostTime, timebase: Timebase) {
        let Some(prev) = self.prev.replace(now) else {
            return;
        };
        let dt = now.secs_since(prev, timebase).max(0.0);
        self.samples.push_back(dt);
        self.sum += dt;

        if self.sum >= FRAMERATE_AVERAGE_TIME && self.samples.len() > 1 {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        while self.sum > FRAMERATE_AVERAGE_TIME + 1.0
            && self.samples.len() > FRAMERATE_MIN_SAMPLES
        {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }

        if self.sum > 0.0 {
            self.fps = self.samples.len() as f64 / self.sum;
        }
    }

    /// Pauses timing; the next rendered frame restarts the clock.
    pub fn stop_timing(&mut self) {
        self.prev = None;
    }

    /// Frames per second over the current window.
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Number of samples in the window.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Drives morphs and deferred events once per frame.
#[derive(Debug)]
pub struct Animator {
    morphs: MorphEngine<MorphKey, Hook>,
    scheduler: FrameScheduler<Deferred>,
    framerate: FramerateMeter,
    need_redraw: bool,
    active: bool,
    frame_index: u64,
    timebase: Timebase,
}

impl Animator {
    /// Creates an animator that interprets host times with `timebase`.
    ///
    /// A new animator wants one frame.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            morphs: MorphEngine::new(timebase),
            scheduler: FrameScheduler::new(),
            framerate: FramerateMeter::default(),
            need_redraw: true,
            active: false,
            frame_index: 0,
            timebase,
        }
    }

    /// The timebase used for every seconds conversion.
    #[must_use]
    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether the animator wants frames.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a redraw has been requested since the last quiet tick.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.need_redraw
    }

    /// Current framerate estimate.
    #[must_use]
    pub fn framerate(&self) -> &FramerateMeter {
        &self.framerate
    }

    /// Asks for another frame.
    pub fn request_redraw(&mut self) {
        self.active = true;
        self.need_redraw = true;
    }

    // -- Morphs --

    /// Starts or extends a morph of `key` without hooks.
    pub fn morph(
        &mut self,
        key: MorphKey,
        from: f64,
        easing: Easing,
        target: f64,
        duration_secs: f64,
        now: HostTime,
    ) {
        self.morph_full(key, from, easing, target, duration_secs, now, None, None);
    }

    /// Starts or extends a morph of `key`.
    pub fn morph_full(
        &mut self,
        key: MorphKey,
        from: f64,
        easing: Easing,
        target: f64,
        duration_secs: f64,
        now: HostTime,
        on_step: Option<Hook>,
        on_end: Option<Hook>,
    ) {
        if self
            .morphs
            .morph_full(key, from, easing, target, duration_secs, now, on_step, on_end)
        {
            self.request_redraw();
        }
    }

    /// Makes the current stage of `key` complete on the next tick.
    pub fn morph_finish(&mut self, key: MorphKey) {
        self.morphs.morph_finish(key);
    }

    /// Cancels `key` without hooks.
    pub fn morph_break(&mut self, key: MorphKey) {
        self.morphs.morph_break(key);
    }

    /// Whether `key` is animating.
    #[must_use]
    pub fn is_morphing(&self, key: MorphKey) -> bool {
        self.morphs.is_active(key)
    }

    /// Number of running chains.
    #[must_use]
    pub fn morphs_active(&self) -> usize {
        self.morphs.active_count()
    }

    // -- Deferred events --

    /// Defers `event` by `frames` frames.
    pub fn schedule_event(&mut self, event: Deferred, frames: u32) {
        self.request_redraw();
        self.scheduler.schedule_event(event, frames);
    }

    /// Cancels every morph and deferred event.
    pub fn reset(&mut self) {
        self.morphs.break_all();
        self.scheduler.clear();
        self.request_redraw();
    }

    // -- Tick --

    /// First half of a tick: advances every morph to `now`.
    ///
    /// Hooks are appended to `hooks`. Returns whether any scalar changed.
    pub fn begin_tick<T: MorphTarget<MorphKey>>(
        &mut self,
        now: HostTime,
        target: &mut T,
        hooks: &mut Vec<Hook>,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let frame = self.frame_index;
        let morphs = &mut self.morphs;
        tracer.phase(frame, PhaseKind::Morph, now, |_| {
            morphs.iteration(now, target, hooks)
        })
    }

    /// Second half of a tick.
    ///
    /// If a redraw was requested, samples the framerate and runs the
    /// scheduler, moving due events into `fired`. Without state changes or
    /// pending events the animator goes idle.
    ///
    /// Returns whether scheduled events fired or are pending.
    pub fn end_tick(
        &mut self,
        now: HostTime,
        changed: bool,
        fired: &mut Vec<Deferred>,
        tracer: &mut Tracer<'_>,
    ) -> bool {
        let frame = self.frame_index;
        let mut pending = false;
        if self.need_redraw {
            self.framerate.frame_rendered(now, self.timebase);
            tracer.framerate(&FramerateEvent {
                frame_index: frame,
                fps: self.framerate.fps(),
                samples: self.framerate.sample_count(),
            });
            let scheduler = &mut self.scheduler;
            pending = tracer.phase(frame, PhaseKind::Schedule, now, |_| {
                scheduler.iteration(fired)
            });
            if !pending {
                self.need_redraw = false;
            }
        }
        if !changed && !pending {
            self.framerate.stop_timing();
            self.active = false;
        }
        self.frame_index += 1;
        pending
    }
}
