// chatview-rs - Themeable chat view runtime for embedded hosts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Scroll-follow: keeps the view pinned to the newest content unless the user
//! scrolled away, animating the catch-up in timed steps.
//!
//! Every programmatic scroll sets a one-shot suppression flag so its own
//! notification is not mistaken for a user gesture. Notifications that arrive
//! coalesced or reordered can still be misattributed.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Interval between two animation steps.
pub const STEP_INTERVAL: Duration = Duration::from_millis(70);

const MAX_STEP: i64 = 200;
const SNAP_BELOW: i64 = 8;

/// Measurements and scrolling of the rendering surface.
pub trait ScrollMetrics {
    fn content_height(&self) -> i64;
    fn viewport_height(&self) -> i64;
    fn scroll_offset(&self) -> i64;
    fn scroll_to(&mut self, offset: i64);

    /// Offset at which the viewport shows the end of the content. Zero when
    /// the content fits.
    fn bottom_offset(&self) -> i64 {
        (self.content_height() - self.viewport_height()).max(0)
    }

    /// Distance between the current offset and the bottom, never negative.
    fn remaining(&self) -> i64 {
        (self.bottom_offset() - self.scroll_offset()).max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// One-shot timers.
pub trait TickScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Timer bookkeeping on an externally advanced clock. The owner calls
/// [`TimerQueue::advance_to`] and dispatches the due ids.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    pending: BTreeMap<TimerId, Instant>,
}

impl TimerQueue {
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self { now, next_id: 0, pending: BTreeMap::new() }
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Moves the clock forward and drains the timers due at `now`, earliest
    /// deadline first. The clock never moves backwards.
    pub fn advance_to(&mut self, now: Instant) -> Vec<TimerId> {
        self.now = self.now.max(now);
        let mut due: Vec<(Instant, TimerId)> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| deadline <= self.now)
            .map(|(&id, &deadline)| (deadline, id))
            .collect();
        due.sort();
        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl TickScheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, self.now + delay);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPhase {
    Idle,
    Animating,
}

/// Size of the next catch-up step for `remaining` units to the bottom.
#[must_use]
pub fn catch_up_step(remaining: i64, animate: bool) -> i64 {
    if !animate {
        return remaining;
    }
    if remaining > MAX_STEP {
        MAX_STEP
    } else if remaining < SNAP_BELOW {
        remaining
    } else {
        // floor(remaining / 1.7) in integers; remaining is positive here
        remaining * 10 / 17
    }
}

#[derive(Debug)]
pub struct ScrollFollower<S> {
    scheduler: S,
    animate: bool,
    wants_follow: bool,
    suppress_next_scroll: bool,
    animation: Option<TimerId>,
    settle: Option<TimerId>,
}

impl<S: TickScheduler> ScrollFollower<S> {
    pub fn new(scheduler: S, animate: bool) -> Self {
        Self {
            scheduler,
            animate,
            wants_follow: true,
            suppress_next_scroll: false,
            animation: None,
            settle: None,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn wants_follow(&self) -> bool {
        self.wants_follow
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn phase(&self) -> FollowPhase {
        if self.is_animating() { FollowPhase::Animating } else { FollowPhase::Idle }
    }

    pub fn suppresses_next_scroll(&self) -> bool {
        self.suppress_next_scroll
    }

    pub fn animates(&self) -> bool {
        self.animate
    }

    /// Call after any content change that may have moved the bottom.
    pub fn invalidate<M: ScrollMetrics + ?Sized>(&mut self, metrics: &M) {
        if self.wants_follow {
            self.start_animation(metrics);
        }
    }

    /// Re-pins the view to the bottom regardless of earlier user scrolling.
    pub fn force<M: ScrollMetrics + ?Sized>(&mut self, metrics: &M) {
        self.wants_follow = true;
        self.invalidate(metrics);
    }

    /// Handles a scroll notification from the surface.
    pub fn on_scroll<M: ScrollMetrics + ?Sized>(&mut self, metrics: &M) {
        if self.suppress_next_scroll {
            self.suppress_next_scroll = false;
            return;
        }
        self.stop_animation();
        self.wants_follow = metrics.scroll_offset() >= metrics.bottom_offset();
        tracing::trace!(wants_follow = self.wants_follow, "user scroll");
    }

    /// Handles a resize notification. The jump to the bottom waits for a
    /// zero-delay settle tick so layout is current when it is measured.
    pub fn on_resize(&mut self) {
        if self.settle.is_none() {
            self.settle = Some(self.scheduler.schedule(Duration::ZERO));
        }
    }

    /// Dispatches a fired timer. Returns `false` for ids this follower does
    /// not own.
    pub fn on_timer<M: ScrollMetrics + ?Sized>(&mut self, id: TimerId, metrics: &mut M) -> bool {
        if self.animation == Some(id) {
            self.animation_step(metrics);
            true
        } else if self.settle == Some(id) {
            self.settle = None;
            if self.wants_follow {
                metrics.scroll_to(metrics.bottom_offset());
            }
            true
        } else {
            false
        }
    }

    fn start_animation<M: ScrollMetrics + ?Sized>(&mut self, metrics: &M) {
        if self.animation.is_some() {
            return;
        }
        if metrics.content_height() > metrics.viewport_height() {
            self.animation = Some(self.scheduler.schedule(Duration::ZERO));
            tracing::debug!(remaining = metrics.remaining(), "follow animation started");
        }
    }

    fn stop_animation(&mut self) {
        if let Some(id) = self.animation.take() {
            self.scheduler.cancel(id);
            tracing::debug!("follow animation stopped");
        }
    }

    fn animation_step<M: ScrollMetrics + ?Sized>(&mut self, metrics: &mut M) {
        self.animation = None;
        let remaining = metrics.remaining();
        let step = catch_up_step(remaining, self.animate);
        if step != 0 {
            let before = metrics.scroll_offset();
            self.suppress_next_scroll = true;
            metrics.scroll_to(before + step);
            // a clamped scroll produces no notification to consume the flag
            if metrics.scroll_offset() == before {
                self.suppress_next_scroll = false;
            }
        }
        tracing::debug!(remaining, step, "follow animation step");
        // re-arms once more after reaching the bottom to re-check the position
        if remaining > 0 {
            self.animation = Some(self.scheduler.schedule(STEP_INTERVAL));
        }
    }
}
