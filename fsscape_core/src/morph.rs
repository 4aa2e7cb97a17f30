// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed scalar interpolation ("morphs").
//!
//! A morph drives one scalar, named by a logical key, from its current value
//! to a target over a duration, remapping progress through an [`Easing`].
//! Morphs on the same key chain: a new request while the key is animating
//! is appended as a further stage starting where the last stage ends.
//!
//! The engine never touches scalars directly. Every
//! [`iteration`](MorphEngine::iteration) reads and writes them through a
//! [`MorphTarget`], and stage notifications come back as plain hook values
//! for the caller to dispatch.
//!
//! ```text
//!   key ──► [stage 0] ──► [stage 1] ──► [stage 2]
//!            t0 .. t1      t1 .. t2      t2 .. t3
//! ```

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::time::{Duration, HostTime, Timebase};

/// Progress remapping applied to a morph stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Easing {
    /// `p`
    Linear,
    /// `p²`: starts slow.
    Quadratic,
    /// `1 − (1 − p)²`: ends slow.
    InvQuadratic,
    /// `½(1 − cos πp)`: slow at both ends.
    Sigmoid,
    /// `½(1 − cos πp²)`: sigmoid with a slower start.
    SigmoidAccel,
}

impl Easing {
    /// Remaps linear progress `p ∈ [0, 1]`.
    #[must_use]
    pub fn apply(self, p: f64) -> f64 {
        match self {
            Self::Linear => p,
            Self::Quadratic => p * p,
            Self::InvQuadratic => 1.0 - (1.0 - p) * (1.0 - p),
            Self::Sigmoid => 0.5 * (1.0 - (PI * p).cos()),
            Self::SigmoidAccel => 0.5 * (1.0 - (PI * p * p).cos()),
        }
    }
}

/// Access to the scalars a [`MorphEngine`] animates.
pub trait MorphTarget<K> {
    /// Returns the current value for `key`, or `None` if it no longer exists.
    fn get(&self, key: K) -> Option<f64>;

    /// Writes `value` for `key`. Returns `false` if the key no longer exists,
    /// in which case the chain is dropped without notifications.
    fn set(&mut self, key: K, value: f64) -> bool;
}

#[derive(Clone, Debug)]
struct Stage<H> {
    start: f64,
    end: f64,
    t_start: HostTime,
    t_end: HostTime,
    easing: Easing,
    on_step: Option<H>,
    on_end: Option<H>,
}

#[derive(Debug)]
struct Chain<K, H> {
    key: K,
    stages: VecDeque<Stage<H>>,
}

/// Drives every active morph chain.
///
/// `K` is the logical key type and `H` the hook type emitted on stage steps
/// and stage ends.
#[derive(Debug)]
pub struct MorphEngine<K, H> {
    chains: Vec<Chain<K, H>>,
    timebase: Timebase,
}

impl<K: Copy + PartialEq, H: Clone> MorphEngine<K, H> {
    /// Creates an idle engine that converts stage durations with `timebase`.
    #[must_use]
    pub fn new(timebase: Timebase) -> Self {
        Self {
            chains: Vec::new(),
            timebase,
        }
    }

    /// Begins or extends an animation of `key` without hooks.
    ///
    /// Returns `true` if this started a new chain.
    pub fn morph(
        &mut self,
        key: K,
        from: f64,
        easing: Easing,
        target: f64,
        duration_secs: f64,
        now: HostTime,
    ) -> bool {
        self.morph_full(key, from, easing, target, duration_secs, now, None, None)
    }

    /// Begins or extends an animation of `key`.
    ///
    /// `from` is the scalar's current value. It is ignored when `key` already
    /// has a chain: the new stage then starts at the last stage's end value
    /// and end time.
    ///
    /// Returns `true` if this started a new chain.
    pub fn morph_full(
        &mut self,
        key: K,
        from: f64,
        easing: Easing,
        target: f64,
        duration_secs: f64,
        now: HostTime,
        on_step: Option<H>,
        on_end: Option<H>,
    ) -> bool {
        let duration = Duration::from_secs_f64(duration_secs, self.timebase);
        if let Some(chain) = self.chains.iter_mut().find(|c| c.key == key) {
            let (start, t_start) = chain
                .stages
                .back()
                .map_or((from, now), |last| (last.end, last.t_end));
            chain.stages.push_back(Stage {
                start,
                end: target,
                t_start,
                t_end: t_start.saturating_add(duration),
                easing,
                on_step,
                on_end,
            });
            return false;
        }

        let mut stages = VecDeque::new();
        stages.push_back(Stage {
            start: from,
            end: target,
            t_start: now,
            t_end: now.saturating_add(duration),
            easing,
            on_step,
            on_end,
        });
        self.chains.push(Chain { key, stages });
        true
    }

    /// Makes the current stage of `key` complete on the next iteration.
    ///
    /// No-op if `key` is not animating.
    pub fn morph_finish(&mut self, key: K) {
        if let Some(stage) = self
            .chains
            .iter_mut()
            .find(|c| c.key == key)
            .and_then(|c| c.stages.front_mut())
        {
            stage.t_end = HostTime(0);
        }
    }

    /// Removes the chain for `key` and all its pending stages without
    /// emitting hooks.
    ///
    /// No-op if `key` is not animating.
    pub fn morph_break(&mut self, key: K) {
        self.chains.retain(|c| c.key != key);
    }

    /// Removes every chain without emitting hooks.
    pub fn break_all(&mut self) {
        self.chains.clear();
    }

    /// Whether `key` has an active chain.
    #[must_use]
    pub fn is_active(&self, key: K) -> bool {
        self.chains.iter().any(|c| c.key == key)
    }

    /// Number of active chains.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.chains.len()
    }

    /// Final value `key` will reach once its chain completes.
    #[must_use]
    pub fn final_value(&self, key: K) -> Option<f64> {
        self.chains
            .iter()
            .find(|c| c.key == key)
            .and_then(|c| c.stages.back())
            .map(|s| s.end)
    }

    /// Advances every chain to `now`, writing values through `target` and
    /// appending emitted hooks to `hooks` in emission order.
    ///
    /// A completed stage assigns its end value and emits its end hook. The
    /// next stage, if any, is then processed within the same iteration.
    /// Returns whether any scalar was written.
    pub fn iteration<T: MorphTarget<K>>(
        &mut self,
        now: HostTime,
        target: &mut T,
        hooks: &mut Vec<H>,
    ) -> bool {
        let mut changed = false;
        self.chains.retain_mut(|chain| {
            while let Some(stage) = chain.stages.front() {
                if now >= stage.t_end {
                    if !target.set(chain.key, stage.end) {
                        return false;
                    }
                    changed = true;
                    if let Some(h) = &stage.on_end {
                        hooks.push(h.clone());
                    }
                    chain.stages.pop_front();
                    continue;
                }

                let span = stage.t_end.saturating_duration_since(stage.t_start).ticks();
                let elapsed = now.saturating_duration_since(stage.t_start).ticks();
                let p = if span == 0 {
                    1.0
                } else {
                    (elapsed as f64 / span as f64).clamp(0.0, 1.0)
                };
                let value = stage.start + stage.easing.apply(p) * (stage.end - stage.start);
                if !target.set(chain.key, value) {
                    return false;
                }
                changed = true;
                if let Some(h) = &stage.on_step {
                    hooks.push(h.clone());
                }
                return true;
            }
            false
        });
        changed
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    const SEC: u64 = 1_000_000_000;

    #[derive(Default)]
    struct Scalars {
        values: [f64; 3],
        dead: [bool; 3],
    }

    impl MorphTarget<usize> for Scalars {
        fn get(&self, key: usize) -> Option<f64> {
            (!self.dead[key]).then(|| self.values[key])
        }

        fn set(&mut self, key: usize, value: f64) -> bool {
            if self.dead[key] {
                return false;
            }
            self.values[key] = value;
            true
        }
    }

    fn engine() -> MorphEngine<usize, &'static str> {
        MorphEngine::new(Timebase::NANOS)
    }

    #[test]
    fn easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Quadratic,
            Easing::InvQuadratic,
            Easing::Sigmoid,
            Easing::SigmoidAccel,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?} starts at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?} ends at 1");
        }
        assert!((Easing::Quadratic.apply(0.5) - 0.25).abs() < 1e-12, "p²");
        assert!((Easing::InvQuadratic.apply(0.5) - 0.75).abs() < 1e-12, "1−(1−p)²");
        assert!((Easing::Sigmoid.apply(0.5) - 0.5).abs() < 1e-12, "symmetric");
    }

    #[test]
    fn morph_completes_with_end_hook() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(0, 0.0, Easing::Linear, 10.0, 1.0, HostTime(0), Some("step"), Some("end"));

        assert!(m.iteration(HostTime(SEC / 2), &mut s, &mut hooks), "changed mid-way");
        assert!((s.values[0] - 5.0).abs() < 1e-9, "half way");
        assert_eq!(hooks, vec!["step"], "step hook emitted");

        hooks.clear();
        assert!(m.iteration(HostTime(2 * SEC), &mut s, &mut hooks), "changed at end");
        assert_eq!(s.values[0], 10.0, "exact end value");
        assert_eq!(hooks, vec!["end"], "end hook emitted once");
        assert!(!m.is_active(0), "chain removed");

        hooks.clear();
        assert!(!m.iteration(HostTime(3 * SEC), &mut s, &mut hooks), "idle");
        assert!(hooks.is_empty(), "nothing more");
    }

    #[test]
    fn chained_stages_start_at_previous_end() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        assert!(m.morph(0, 0.0, Easing::Linear, 10.0, 1.0, HostTime(0)), "new chain");
        assert!(!m.morph(0, 99.0, Easing::Linear, 20.0, 1.0, HostTime(0)), "appended");
        assert_eq!(m.final_value(0), Some(20.0), "last stage target");

        m.iteration(HostTime(SEC + SEC / 2), &mut s, &mut hooks);
        assert!((s.values[0] - 15.0).abs() < 1e-9, "second stage from 10, not 99");

        m.iteration(HostTime(2 * SEC), &mut s, &mut hooks);
        assert_eq!(s.values[0], 20.0, "chain end");
        assert!(!m.is_active(0), "done");
    }

    #[test]
    fn promoted_stage_runs_in_same_iteration() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(0, 0.0, Easing::Linear, 1.0, 1.0, HostTime(0), None, Some("first"));
        m.morph_full(0, 0.0, Easing::Linear, 3.0, 1.0, HostTime(0), Some("second"), None);

        m.iteration(HostTime(SEC + SEC / 2), &mut s, &mut hooks);
        assert_eq!(hooks, vec!["first", "second"], "end then next step");
        assert!((s.values[0] - 2.0).abs() < 1e-9, "second stage half way");
    }

    #[test]
    fn break_emits_nothing() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(1, 0.0, Easing::Linear, 10.0, 1.0, HostTime(0), Some("s"), Some("e"));
        m.iteration(HostTime(SEC / 4), &mut s, &mut hooks);
        let frozen = s.values[1];

        hooks.clear();
        m.morph_break(1);
        assert!(!m.iteration(HostTime(2 * SEC), &mut s, &mut hooks), "nothing to do");
        assert!(hooks.is_empty(), "no hooks after break");
        assert_eq!(s.values[1], frozen, "value left where it was");

        m.morph_break(2);
        m.morph_finish(2);
    }

    #[test]
    fn finish_jumps_to_end() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(0, 0.0, Easing::Sigmoid, 4.0, 10.0, HostTime(0), None, Some("end"));
        m.morph_finish(0);
        m.iteration(HostTime(1), &mut s, &mut hooks);
        assert_eq!(s.values[0], 4.0, "jumped to end");
        assert_eq!(hooks, vec!["end"], "end hook emitted");
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(2, 1.0, Easing::Quadratic, 0.0, 0.0, HostTime(5), None, Some("end"));
        assert!(m.iteration(HostTime(5), &mut s, &mut hooks), "changed");
        assert_eq!(s.values[2], 0.0, "end value");
        assert_eq!(hooks, vec!["end"], "end hook");
    }

    #[test]
    fn vanished_target_drops_chain_silently() {
        let mut m = engine();
        let mut s = Scalars::default();
        let mut hooks = Vec::new();
        m.morph_full(0, 0.0, Easing::Linear, 1.0, 1.0, HostTime(0), Some("s"), Some("e"));
        s.dead[0] = true;
        assert!(!m.iteration(HostTime(SEC / 2), &mut s, &mut hooks), "nothing written");
        assert!(hooks.is_empty(), "no hooks for a vanished key");
        assert!(!m.is_active(0), "chain dropped");
    }
}
