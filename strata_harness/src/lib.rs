// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic collaborators for strata tests and demos.
//!
//! A real backend applies [`StackChanges`] to a display surface and reports
//! fade completions and timer ticks back asynchronously. [`ScriptedStage`]
//! plays that role synchronously: it records every effect batch and lets a
//! test settle fades and fire the rotation timer by hand, so the full
//! engine protocol (watched completions, barriers, chain draining) runs
//! deterministically on one thread.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use strata_core::backend::{RandomSource, Stage};
use strata_core::changes::{FadeTarget, LayerSpec, StackChanges, TimerCommand};
use strata_core::engine::Stacker;
use strata_core::error::StackError;
use strata_core::event::{EventSink, StackEvent};
use strata_core::key::ImageKey;
use strata_core::stack::{LayerId, LayerStack};
use strata_core::time::Duration;

/// A [`Stage`] double that records effects and replays completions.
///
/// Fades are held in flight until a test settles them with
/// [`finish`](Self::finish), [`finish_next`](Self::finish_next), or
/// [`finish_all`](Self::finish_all); a retarget on a layer replaces its
/// in-flight fade, mirroring the cancel-on-retarget contract. The rotation
/// timer is a recorded period fired by [`fire_timer`](Self::fire_timer).
#[derive(Debug, Default)]
pub struct ScriptedStage {
    /// Every layer materialized, in creation order.
    pub created: Vec<LayerSpec>,
    /// Every lifecycle event observed, in order.
    pub events: Vec<StackEvent>,
    /// Every deferred-operation failure observed, in order.
    pub errors: Vec<StackError>,
    active: Vec<FadeTarget>,
    armed: Option<Duration>,
}

impl Stage for ScriptedStage {
    fn apply(&mut self, _stack: &LayerStack, changes: &StackChanges) {
        self.created.extend(changes.created.iter().cloned());
        for fade in &changes.fades {
            // A retarget supersedes the in-flight fade on the same layer.
            self.active.retain(|in_flight| in_flight.layer != fade.layer);
            self.active.push(*fade);
        }
        match changes.timer {
            Some(TimerCommand::Arm(period)) => self.armed = Some(period),
            Some(TimerCommand::Cancel) => self.armed = None,
            None => {}
        }
        self.events.extend(changes.events.iter().cloned());
        self.errors.extend(changes.errors.iter().cloned());
    }
}

impl ScriptedStage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The period the rotation timer is currently armed with, if any.
    #[must_use]
    pub fn armed(&self) -> Option<Duration> {
        self.armed
    }

    /// The fades currently in flight, oldest first.
    #[must_use]
    pub fn active_fades(&self) -> &[FadeTarget] {
        &self.active
    }

    /// Settles the in-flight fade on `layer`, feeding the completion back
    /// into `stacker` and applying whatever it releases. Returns `false`
    /// when no fade is in flight on that layer.
    pub fn finish(&mut self, stacker: &mut Stacker, layer: LayerId) -> bool {
        let Some(at) = self.active.iter().position(|fade| fade.layer == layer) else {
            return false;
        };
        let fade = self.active.remove(at);
        let changes = stacker.fade_finished(fade.layer, fade.generation);
        self.apply(stacker.stack(), &changes);
        true
    }

    /// Settles the oldest in-flight fade. Returns `false` when idle.
    pub fn finish_next(&mut self, stacker: &mut Stacker) -> bool {
        if self.active.is_empty() {
            return false;
        }
        let fade = self.active.remove(0);
        let changes = stacker.fade_finished(fade.layer, fade.generation);
        self.apply(stacker.stack(), &changes);
        true
    }

    /// Settles every fade in flight at call time. Fades issued by released
    /// continuations stay in flight for a later call.
    pub fn finish_all(&mut self, stacker: &mut Stacker) {
        let batch = core::mem::take(&mut self.active);
        for fade in batch {
            let changes = stacker.fade_finished(fade.layer, fade.generation);
            self.apply(stacker.stack(), &changes);
        }
    }

    /// Fires the armed rotation timer once. Returns `false` when no timer
    /// is armed.
    pub fn fire_timer(&mut self, stacker: &mut Stacker) -> bool {
        if self.armed.is_none() {
            return false;
        }
        let changes = stacker.rotation_tick();
        self.apply(stacker.stack(), &changes);
        true
    }
}

/// Xorshift64* pseudo-random index source; deterministic per seed.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Creates a source from a seed (zero is mapped to a fixed non-zero
    /// state; xorshift has no zero orbit).
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        let mixed = self.state.wrapping_mul(0x2545_F491_4F6C_DD1D);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the high half is folded down before the modulo"
        )]
        let folded = (mixed >> 32) as usize;
        folded % len
    }
}

/// A source that always draws the same index, modulo the gallery length.
#[derive(Clone, Copy, Debug)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.0 % len
    }
}

/// An [`EventSink`] that stores typed notifications for assertions.
#[derive(Debug, Default)]
pub struct CollectingSink {
    /// Paths reported shown, in order.
    pub shown: Vec<ImageKey>,
    /// `(interval, duration)` pairs of each rotation wait start.
    pub waits: Vec<(Duration, Duration)>,
    /// How many rotation cancels were observed.
    pub cancels: usize,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for CollectingSink {
    fn on_image_shown(&mut self, path: &ImageKey) {
        self.shown.push(path.clone());
    }

    fn on_rotation_wait_start(&mut self, interval: Duration, duration: Duration) {
        self.waits.push((interval, duration));
    }

    fn on_rotation_wait_cancel(&mut self) {
        self.cancels += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_random_is_deterministic() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_index(7), b.next_index(7));
        }
    }

    #[test]
    fn seeded_random_stays_in_range() {
        let mut source = SeededRandom::new(0);
        for _ in 0..256 {
            assert!(source.next_index(3) < 3);
        }
    }

    #[test]
    fn fixed_random_wraps() {
        let mut source = FixedRandom(5);
        assert_eq!(source.next_index(3), 2);
        assert_eq!(source.next_index(10), 5);
    }

    #[test]
    fn retarget_replaces_the_in_flight_fade() {
        use strata_core::config::StackerConfig;

        let config = StackerConfig {
            rotate_on_load: false,
            ..StackerConfig::default()
        };
        let mut stacker =
            Stacker::new(config, "default.png", alloc::boxed::Box::new(FixedRandom(0)))
                .expect("valid config");
        let mut stage = ScriptedStage::new();

        let changes = stacker
            .load_gallery(&["a.png", "b.png"], None)
            .expect("loads");
        stage.apply(stacker.stack(), &changes);
        assert_eq!(stage.active_fades().len(), 2);

        let changes = stacker.show_image(&ImageKey::new("b.png")).expect("known");
        stage.apply(stacker.stack(), &changes);
        assert_eq!(
            stage.active_fades().len(),
            2,
            "two layers, one in-flight fade each"
        );
    }
}
