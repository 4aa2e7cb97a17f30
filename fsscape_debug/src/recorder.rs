// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. Floats are stored as their
//! IEEE-754 bit patterns. [`decode`] reads the records back as an iterator of
//! [`RecordedEvent`].
//!
//! The rich [`on_node_changes`](TraceSink::on_node_changes) event stores only
//! the count.

use fsscape_core::colexp::ColexpAction;
use fsscape_core::geometry::ViewMode;
use fsscape_core::time::HostTime;
use fsscape_core::trace::{
    ArrangeEvent, ColexpEvent, CubicFallbackEvent, FrameEvent, FramerateEvent, NodeChange,
    PanEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_PAN: u8 = 4;
const TAG_COLEXP: u8 = 5;
const TAG_ARRANGE: u8 = 6;
const TAG_CUBIC_FALLBACK: u8 = 7;
const TAG_FRAMERATE: u8 = 8;
const TAG_NODE_CHANGES_COUNT: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_count(&mut self, n: usize) {
        self.write_u32(u32::try_from(n).unwrap_or(u32::MAX));
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Morph => 0,
            PhaseKind::Schedule => 1,
            PhaseKind::Layout => 2,
            PhaseKind::Arrange => 3,
            PhaseKind::Evaluate => 4,
        });
    }

    fn write_mode(&mut self, m: ViewMode) {
        self.write_u8(match m {
            ViewMode::DiscV => 0,
            ViewMode::MapV => 1,
            ViewMode::TreeV => 2,
        });
    }

    fn write_action(&mut self, a: ColexpAction) {
        self.write_u8(match a {
            ColexpAction::Expand => 0,
            ColexpAction::ExpandAny => 1,
            ColexpAction::ExpandRecursive => 2,
            ColexpAction::CollapseRecursive => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.ticks());
        self.write_count(e.morphs_active);
        self.write_count(e.events_fired);
        self.write_bool(e.changed);
        self.write_bool(e.active);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_pan(&mut self, e: &PanEvent) {
        self.write_u8(TAG_PAN);
        self.write_u32(e.node_index);
        self.write_mode(e.mode);
        self.write_f64(e.duration_secs);
        self.write_bool(e.swing_back);
    }

    fn on_colexp(&mut self, e: &ColexpEvent) {
        self.write_u8(TAG_COLEXP);
        self.write_u32(e.node_index);
        self.write_action(e.action);
        self.write_u32(e.max_depth);
    }

    fn on_arrange(&mut self, e: &ArrangeEvent) {
        self.write_u8(TAG_ARRANGE);
        self.write_f64(e.core_radius);
        self.write_u32(e.iterations);
        self.write_f64(e.subtree_arc_width);
    }

    fn on_cubic_fallback(&mut self, e: &CubicFallbackEvent) {
        self.write_u8(TAG_CUBIC_FALLBACK);
        self.write_u32(e.node_index);
        self.write_count(e.child_count);
        self.write_f64(e.r0);
        self.write_f64(e.raw_depth);
    }

    fn on_framerate(&mut self, e: &FramerateEvent) {
        self.write_u8(TAG_FRAMERATE);
        self.write_u64(e.frame_index);
        self.write_f64(e.fps);
        self.write_count(e.samples);
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        self.write_u8(TAG_NODE_CHANGES_COUNT);
        self.write_u64(frame_index);
        self.write_count(changes.len());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
///
/// Counts recorded from `usize` fields saturate at `u32::MAX`.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`PanEvent`].
    Pan(PanEvent),
    /// A [`ColexpEvent`].
    Colexp(ColexpEvent),
    /// An [`ArrangeEvent`].
    Arrange(ArrangeEvent),
    /// A [`CubicFallbackEvent`].
    CubicFallback(CubicFallbackEvent),
    /// A [`FramerateEvent`].
    Framerate(FramerateEvent),
    /// Node-change count for a tick.
    NodeChangesCount {
        /// Tick counter.
        frame_index: u64,
        /// Number of node changes.
        count: u32,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_count(&mut self) -> Option<usize> {
        self.read_u32().and_then(|v| usize::try_from(v).ok())
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::Morph,
            1 => PhaseKind::Schedule,
            2 => PhaseKind::Layout,
            3 => PhaseKind::Arrange,
            _ => PhaseKind::Evaluate,
        })
    }

    fn read_mode(&mut self) -> Option<ViewMode> {
        Some(match self.read_u8()? {
            0 => ViewMode::DiscV,
            1 => ViewMode::MapV,
            _ => ViewMode::TreeV,
        })
    }

    fn read_action(&mut self) -> Option<ColexpAction> {
        Some(match self.read_u8()? {
            0 => ColexpAction::Expand,
            1 => ColexpAction::ExpandAny,
            2 => ColexpAction::ExpandRecursive,
            _ => ColexpAction::CollapseRecursive,
        })
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            frame_index: self.read_u64()?,
            now: HostTime(self.read_u64()?),
            morphs_active: self.read_count()?,
            events_fired: self.read_count()?,
            changed: self.read_bool()?,
            active: self.read_bool()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_pan(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Pan(PanEvent {
            node_index: self.read_u32()?,
            mode: self.read_mode()?,
            duration_secs: self.read_f64()?,
            swing_back: self.read_bool()?,
        }))
    }

    fn decode_colexp(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Colexp(ColexpEvent {
            node_index: self.read_u32()?,
            action: self.read_action()?,
            max_depth: self.read_u32()?,
        }))
    }

    fn decode_arrange(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Arrange(ArrangeEvent {
            core_radius: self.read_f64()?,
            iterations: self.read_u32()?,
            subtree_arc_width: self.read_f64()?,
        }))
    }

    fn decode_cubic_fallback(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CubicFallback(CubicFallbackEvent {
            node_index: self.read_u32()?,
            child_count: self.read_count()?,
            r0: self.read_f64()?,
            raw_depth: self.read_f64()?,
        }))
    }

    fn decode_framerate(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Framerate(FramerateEvent {
            frame_index: self.read_u64()?,
            fps: self.read_f64()?,
            samples: self.read_count()?,
        }))
    }

    fn decode_node_changes_count(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let count = self.read_u32()?;
        Some(RecordedEvent::NodeChangesCount { frame_index, count })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_FRAME => self.decode_frame(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_PAN => self.decode_pan(),
            TAG_COLEXP => self.decode_colexp(),
            TAG_ARRANGE => self.decode_arrange(),
            TAG_CUBIC_FALLBACK => self.decode_cubic_fallback(),
            TAG_FRAMERATE => self.decode_framerate(),
            TAG_NODE_CHANGES_COUNT => self.decode_node_changes_count(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
