// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Phases become duration slices on thread 0. Navigation and layout events
//! are instants on thread 1, and framerate samples are counters.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use fsscape_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

const FRAME_TID: u32 = 0;
const NAV_TID: u32 = 1;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
/// Events that carry no timestamp of their own (pans, arrangement passes)
/// are placed at the most recent phase or tick time seen before them.
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_us = 0.0;

    for recorded in decode(bytes) {
        let event = match recorded {
            RecordedEvent::Frame(e) => {
                last_us = ticks_to_us(e.now.ticks(), timebase);
                json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Animation",
                    "ts": last_us,
                    "pid": 0,
                    "tid": FRAME_TID,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "morphs_active": e.morphs_active,
                        "events_fired": e.events_fired,
                        "changed": e.changed,
                        "active": e.active,
                    }
                })
            }
            RecordedEvent::PhaseBegin(e) => {
                last_us = ticks_to_us(e.timestamp.ticks(), timebase);
                json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": last_us,
                    "pid": 0,
                    "tid": FRAME_TID,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                })
            }
            RecordedEvent::PhaseEnd(e) => {
                last_us = ticks_to_us(e.timestamp.ticks(), timebase);
                json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": last_us,
                    "pid": 0,
                    "tid": FRAME_TID,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                })
            }
            RecordedEvent::Pan(e) => json!({
                "ph": "i",
                "name": "Pan",
                "cat": "Camera",
                "ts": last_us,
                "pid": 0,
                "tid": NAV_TID,
                "s": "t",
                "args": {
                    "node_index": e.node_index,
                    "mode": format!("{:?}", e.mode),
                    "duration_secs": e.duration_secs,
                    "swing_back": e.swing_back,
                }
            }),
            RecordedEvent::Colexp(e) => json!({
                "ph": "i",
                "name": format!("{:?}", e.action),
                "cat": "Colexp",
                "ts": last_us,
                "pid": 0,
                "tid": NAV_TID,
                "s": "t",
                "args": {
                    "node_index": e.node_index,
                    "max_depth": e.max_depth,
                }
            }),
            RecordedEvent::Arrange(e) => json!({
                "ph": "i",
                "name": "Arrange",
                "cat": "Layout",
                "ts": last_us,
                "pid": 0,
                "tid": NAV_TID,
                "s": "t",
                "args": {
                    "core_radius": e.core_radius,
                    "iterations": e.iterations,
                    "subtree_arc_width": e.subtree_arc_width,
                }
            }),
            RecordedEvent::CubicFallback(e) => json!({
                "ph": "i",
                "name": "CubicFallback",
                "cat": "Layout",
                "ts": last_us,
                "pid": 0,
                "tid": NAV_TID,
                "s": "t",
                "args": {
                    "node_index": e.node_index,
                    "child_count": e.child_count,
                    "r0": e.r0,
                    "raw_depth": e.raw_depth,
                }
            }),
            RecordedEvent::Framerate(e) => json!({
                "ph": "C",
                "name": "Framerate",
                "cat": "Animation",
                "ts": last_us,
                "pid": 0,
                "tid": FRAME_TID,
                "args": {
                    "fps": e.fps,
                }
            }),
            RecordedEvent::NodeChangesCount { frame_index, count } => json!({
                "ph": "i",
                "name": "NodeChanges",
                "cat": "Rich",
                "ts": last_us,
                "pid": 0,
                "tid": FRAME_TID,
                "s": "t",
                "args": {
                    "frame_index": frame_index,
                    "count": count,
                }
            }),
        };
        events.push(event);
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}
