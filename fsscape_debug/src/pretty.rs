// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable one-line-per-event output.

use std::io::{self, Write};

use fsscape_core::trace::{
    ArrangeEvent, ColexpEvent, CubicFallbackEvent, FrameEvent, FramerateEvent, NodeChange,
    PanEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// A [`TraceSink`] that writes one line per event to `W`.
///
/// Phase events are indented by nesting depth, so an arrangement inside a
/// layout pass reads as a tree. The first write error is kept and every
/// later event is dropped; see [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct PrettyPrintSink<W: Write> {
    out: W,
    depth: usize,
    error: Option<io::Error>,
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            depth: 0,
            error: None,
        }
    }

    /// Returns the first write error, if any, and resumes writing.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: core::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        let indent = self.depth * 2;
        if let Err(e) = writeln!(self.out, "{:indent$}{args}", "") {
            self.error = Some(e);
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.line(format_args!(
            "frame {} @{}: morphs={} fired={} changed={} active={}",
            e.frame_index,
            e.now.ticks(),
            e.morphs_active,
            e.events_fired,
            e.changed,
            e.active,
        ));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.line(format_args!(
            "{:?} begin (frame {}) @{}",
            e.phase,
            e.frame_index,
            e.timestamp.ticks()
        ));
        self.depth += 1;
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.depth = self.depth.saturating_sub(1);
        self.line(format_args!(
            "{:?} end (frame {}) @{}",
            e.phase,
            e.frame_index,
            e.timestamp.ticks()
        ));
    }

    fn on_pan(&mut self, e: &PanEvent) {
        self.line(format_args!(
            "pan {:?} to #{} over {:.3}s{}",
            e.mode,
            e.node_index,
            e.duration_secs,
            if e.swing_back { " (swing back)" } else { "" },
        ));
    }

    fn on_colexp(&mut self, e: &ColexpEvent) {
        self.line(format_args!(
            "{:?} #{} in {} steps",
            e.action, e.node_index, e.max_depth
        ));
    }

    fn on_arrange(&mut self, e: &ArrangeEvent) {
        self.line(format_args!(
            "arrange: core radius {:.1} after {} passes, arc {:.2}",
            e.core_radius, e.iterations, e.subtree_arc_width
        ));
    }

    fn on_cubic_fallback(&mut self, e: &CubicFallbackEvent) {
        self.line(format_args!(
            "cubic fallback #{}: {} children, r0 {:.1}, root {:.3}",
            e.node_index, e.child_count, e.r0, e.raw_depth
        ));
    }

    fn on_framerate(&mut self, e: &FramerateEvent) {
        self.line(format_args!(
            "framerate {:.1} fps over {} samples (frame {})",
            e.fps, e.samples, e.frame_index
        ));
    }

    fn on_node_changes(&mut self, frame_index: u64, changes: &[NodeChange]) {
        self.line(format_args!(
            "frame {frame_index}: {} node changes",
            changes.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsscape_core::colexp::ColexpAction;
    use fsscape_core::geometry::ViewMode;
    use fsscape_core::time::HostTime;
    use fsscape_core::trace::PhaseKind;

    fn lines(sink: PrettyPrintSink<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn phases_indent_their_contents() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 1,
            phase: PhaseKind::Layout,
            timestamp: HostTime(10),
        });
        sink.on_arrange(&ArrangeEvent {
            core_radius: 8192.0,
            iterations: 1,
            subtree_arc_width: 90.0,
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 1,
            phase: PhaseKind::Layout,
            timestamp: HostTime(10),
        });

        let out = lines(sink);
        assert_eq!(out[0], "Layout begin (frame 1) @10", "opening line");
        assert_eq!(
            out[1], "  arrange: core radius 8192.0 after 1 passes, arc 90.00",
            "nested line is indented"
        );
        assert_eq!(out[2], "Layout end (frame 1) @10", "closing line");
    }

    #[test]
    fn navigation_lines_name_the_node() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_pan(&PanEvent {
            node_index: 3,
            mode: ViewMode::MapV,
            duration_secs: 1.5,
            swing_back: true,
        });
        sink.on_colexp(&ColexpEvent {
            node_index: 3,
            action: ColexpAction::ExpandRecursive,
            max_depth: 2,
        });

        let out = lines(sink);
        assert_eq!(out[0], "pan MapV to #3 over 1.500s (swing back)", "pan line");
        assert_eq!(out[1], "ExpandRecursive #3 in 2 steps", "colexp line");
    }

    #[test]
    fn write_errors_are_kept() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = PrettyPrintSink::new(Broken);
        sink.on_framerate(&FramerateEvent {
            frame_index: 0,
            fps: 60.0,
            samples: 1,
        });
        assert!(sink.take_error().is_some(), "error surfaced");
        assert!(sink.take_error().is_none(), "error taken once");
    }
}
