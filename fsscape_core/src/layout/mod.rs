// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three spatial arrangements.
//!
//! Each layout writes its own geometry record on every node
//! ([`DiscGeom`](crate::tree::DiscGeom), [`MapGeom`](crate::tree::MapGeom),
//! [`TreeGeom`](crate::tree::TreeGeom)); only the record of the active mode
//! is meaningful. Layouts are pure functions of the tree and their config:
//! running one twice on an unchanged tree yields the same geometry.
//!
//! Every `init` also resets each directory's deployment from its
//! `expanded` flag, cancelling any deployment animation in flight, and
//! queues the directory's geometry for rebuilding.

pub mod discv;
pub mod mapv;
pub mod treev;

pub use discv::DiscVConfig;
pub use mapv::MapVConfig;
pub use treev::TreeVConfig;
