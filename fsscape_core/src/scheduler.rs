// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events deferred by a number of rendered frames.
//!
//! Some navigation steps must wait until the frame after an animation ends
//! (for example, the second leg of a two-stage camera pan). The
//! [`FrameScheduler`] holds such events as plain payload values and returns
//! them once their frame count runs out.

use alloc::vec::Vec;

#[derive(Clone, Debug)]
struct ScheduledEvent<E> {
    frames_remaining: i64,
    payload: E,
}

/// Queue of events that fire after a number of frames.
#[derive(Debug)]
pub struct FrameScheduler<E> {
    queue: Vec<ScheduledEvent<E>>,
}

impl<E> Default for FrameScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> FrameScheduler<E> {
    /// Creates an empty scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Enqueues `payload` to fire on the `frames`-th subsequent iteration.
    ///
    /// A count of 0 or 1 fires on the next iteration.
    pub fn schedule_event(&mut self, payload: E, frames: u32) {
        self.queue.push(ScheduledEvent {
            frames_remaining: i64::from(frames),
            payload,
        });
    }

    /// Advances every counter by one frame, moving events that are due into
    /// `fired` in scheduling order.
    ///
    /// Returns whether any event fired or is still pending.
    pub fn iteration(&mut self, fired: &mut Vec<E>) -> bool {
        let mut executed = false;
        let mut i = 0;
        while i < self.queue.len() {
            self.queue[i].frames_remaining -= 1;
            if self.queue[i].frames_remaining <= 0 {
                fired.push(self.queue.remove(i).payload);
                executed = true;
            } else {
                i += 1;
            }
        }
        executed || !self.queue.is_empty()
    }

    /// Whether any event is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drops every pending event.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
