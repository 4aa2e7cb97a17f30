// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout, animation, and camera navigation for 3D filesystem visualization.
//!
//! `fsscape_core` turns a scanned filesystem tree into one of three spatial
//! arrangements and animates everything that moves between them: directories
//! folding and unfolding, and the camera flying from one node to another.
//! Rendering, scanning, and input handling belong to the host. Nodes live in
//! array-based struct-of-arrays storage addressed by generational handles.
//!
//! # Architecture
//!
//! The crate is organized around a tick loop driven by the host once per
//! rendered frame:
//!
//! ```text
//!   Host input ──► Engine::execute_colexp / look_at / ...
//!                        │
//!                        ▼
//!                  MorphEngine (deployments, camera fields)
//!                        │
//!   Host frame ──► Engine::tick() ──► hooks ──► FrameScheduler
//!                        │
//!                        ▼
//!   GeometryCoordinator::evaluate() ──► GeometryChanges ──► renderer
//!                        │
//!                        ▼
//!                  Camera::view_transform() / projection()
//! ```
//!
//! **[`tree`]**: Struct-of-arrays filesystem tree with generational handles.
//! Scanned attributes are set by the host; per-mode geometry is written by
//! the layouts.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//! Deployment changes mark a directory's body stale and its ancestors'
//! arrangement stale.
//!
//! **[`layout`]**: The three arrangements: concentric discs (`DiscV`),
//! nested treemap (`MapV`), and a radial tree of platforms (`TreeV`).
//!
//! **[`geometry`]**: Dispatches layout work to the active mode and drains
//! dirty state into change sets.
//!
//! **[`morph`]** and **[`scheduler`]**: Timed scalar interpolation with
//! easing and chaining, and events deferred by whole frames.
//!
//! **[`animation`]**: The two-phase tick driver and the framerate meter.
//!
//! **[`colexp`]**: Staggered, animated collapse and expansion.
//!
//! **[`camera`]**: Framing, pans with swing-back, history, and manual
//! controls. **[`transform`]** holds the matrices it produces.
//!
//! **[`engine`]**: The façade that ties the parts together.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! tick and navigation instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-node
//!   change events.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod camera;
pub mod colexp;
pub mod dirty;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod math;
pub mod morph;
pub mod scheduler;
pub mod time;
pub mod trace;
pub mod transform;
pub mod tree;
