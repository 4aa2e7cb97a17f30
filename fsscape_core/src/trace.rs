// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the animation loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! engine calls as it ticks, lays out, and navigates. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`NodeChange`] events plus the
//!   corresponding `TraceSink` method.

use crate::colexp::ColexpAction;
use crate::geometry::ViewMode;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a tick or layout pass is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Advancing morph chains.
    Morph,
    /// Running frame-deferred events.
    Schedule,
    /// A full layout initialization.
    Layout,
    /// Radial-tree platform arrangement.
    Arrange,
    /// Draining stale geometry into a change set.
    Evaluate,
}

/// Which part of a node changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// The node's own body geometry.
    Body,
    /// Connecting geometry to its children.
    Branches,
    /// Label geometry.
    Labels,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once per animation tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameEvent {
    /// Monotonic tick counter.
    pub frame_index: u64,
    /// Host time of the tick.
    pub now: HostTime,
    /// Morph chains still running after the tick.
    pub morphs_active: usize,
    /// Frame-deferred events that fired during the tick.
    pub events_fired: usize,
    /// Whether any animated scalar changed.
    pub changed: bool,
    /// Whether the engine still wants frames after this one.
    pub active: bool,
}

/// Marks the beginning of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted when a camera pan starts.
#[derive(Clone, Copy, Debug)]
pub struct PanEvent {
    /// Slot index of the node being framed.
    pub node_index: u32,
    /// Active visualization mode.
    pub mode: ViewMode,
    /// Pan duration in seconds.
    pub duration_secs: f64,
    /// Whether the pan pulls back before approaching the target.
    pub swing_back: bool,
}

/// Emitted when a collapse/expand operation is issued.
#[derive(Clone, Copy, Debug)]
pub struct ColexpEvent {
    /// Slot index of the directory acted on.
    pub node_index: u32,
    /// The requested action.
    pub action: ColexpAction,
    /// Number of staggered depth steps.
    pub max_depth: u32,
}

/// Emitted after a radial-tree arrangement settles its core radius.
#[derive(Clone, Copy, Debug)]
pub struct ArrangeEvent {
    /// Final core radius.
    pub core_radius: f64,
    /// Number of arrangement passes, including the first.
    pub iterations: u32,
    /// Root directory's subtree arc width after the last pass.
    pub subtree_arc_width: f64,
}

/// Emitted when a platform's depth equation has no usable root.
#[derive(Clone, Copy, Debug)]
pub struct CubicFallbackEvent {
    /// Slot index of the directory being reshaped.
    pub node_index: u32,
    /// Number of children on the platform.
    pub child_count: usize,
    /// Inner radius of the platform.
    pub r0: f64,
    /// The rejected root.
    pub raw_depth: f64,
}

/// Emitted after each framerate sample.
#[derive(Clone, Copy, Debug)]
pub struct FramerateEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Frames per second averaged over the sample window.
    pub fps: f64,
    /// Number of samples in the window.
    pub samples: usize,
}

/// A per-tick node change record.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct NodeChange {
    /// Slot index of the node that changed.
    pub node_index: u32,
    /// Which part changed.
    pub field: NodeField,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the engine.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the end of every tick.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when a camera pan starts.
    fn on_pan(&mut self, e: &PanEvent) {
        _ = e;
    }

    /// Called when a collapse/expand operation is issued.
    fn on_colexp(&mut self, e: &ColexpEvent) {
        _ = e;
    }

    /// Called after a radial-tree arrangement.
    fn on_arrange(&mut self, e: &ArrangeEvent) {
        _ = e;
    }

    /// Called when a platform depth falls back to a single row.
    fn on_cubic_fallback(&mut self, e: &CubicFallbackEvent) {
        _ = e;
    }

    /// Called after each framerate sample.
    fn on_framerate(&mut self, e: &FramerateEvent) {
        _ = e;
    }

    /// Called with per-tick node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        _ = (frame_index, changes);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameEvent`].
    #[inline]
    pub fn frame(&mut self, e: &FrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PanEvent`].
    #[inline]
    pub fn pan(&mut self, e: &PanEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pan(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ColexpEvent`].
    #[inline]
    pub fn colexp(&mut self, e: &ColexpEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_colexp(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ArrangeEvent`].
    #[inline]
    pub fn arrange(&mut self, e: &ArrangeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_arrange(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CubicFallbackEvent`].
    #[inline]
    pub fn cubic_fallback(&mut self, e: &CubicFallbackEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cubic_fallback(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FramerateEvent`].
    #[inline]
    pub fn framerate(&mut self, e: &FramerateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_framerate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits node changes (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        if let Some(s) = &mut self.sink {
            s.on_node_changes(frame_index, changes);
        }
    }

    /// Emits a matched begin/end pair around `f`, stamping both with `at`.
    ///
    /// The engine has no clock of its own, so both ends carry the tick's
    /// host time. Sinks that want wall-clock spans can time the callbacks.
    #[inline]
    pub fn phase<R>(
        &mut self,
        frame_index: u64,
        phase: PhaseKind,
        at: HostTime,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase,
            timestamp: at,
        });
        let out = f(self);
        self.phase_end(&PhaseEndEvent {
            frame_index,
            phase,
            timestamp: at,
        });
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> FrameEvent {
        FrameEvent {
            frame_index: 42,
            now: HostTime(1_000_000),
            morphs_active: 2,
            events_fired: 0,
            changed: true,
            active: true,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame(&sample_frame());
        sink.on_arrange(&ArrangeEvent {
            core_radius: 8192.0,
            iterations: 1,
            subtree_arc_width: 120.0,
        });
        sink.on_pan(&PanEvent {
            node_index: 1,
            mode: ViewMode::TreeV,
            duration_secs: 1.0,
            swing_back: false,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame(&sample_frame());
        let v = tracer.phase(0, PhaseKind::Morph, HostTime(0), |_| 7);
        assert_eq!(v, 7, "phase returns the closure's value");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            frames: Vec<u64>,
            phases: Vec<(PhaseKind, bool)>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame(&mut self, e: &FrameEvent) {
                self.frames.push(e.frame_index);
            }
            fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
                self.phases.push((e.phase, true));
            }
            fn on_phase_end(&mut self, e: &PhaseEndEvent) {
                self.phases.push((e.phase, false));
            }
        }

        let mut sink = RecordingSink {
            frames: Vec::new(),
            phases: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame(&sample_frame());
        tracer.phase(42, PhaseKind::Arrange, HostTime(5), |_| ());
        drop(tracer);
        assert_eq!(sink.frames, &[42], "frame forwarded");
        assert_eq!(
            sink.phases,
            &[(PhaseKind::Arrange, true), (PhaseKind::Arrange, false)],
            "phase pair forwarded"
        );
    }
}
