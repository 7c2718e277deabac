// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle notifications.
//!
//! The engine reports lifecycle moments as [`StackEvent`] values inside each
//! [`StackChanges`](crate::changes::StackChanges) batch. Backends forward
//! them to an [`EventSink`], whose methods all default to no-ops so
//! implementing only the events you care about is fine.

use crate::key::ImageKey;
use crate::time::Duration;

/// A lifecycle notification produced by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackEvent {
    /// An image's fade-in settled (or the default background was restored);
    /// carries the normalized path that is now visible.
    ImageShown(ImageKey),
    /// A rotation wait began: the named interval passes, then a fade of the
    /// named duration runs. Anticipatory, for countdown indicators.
    RotationWaitStart {
        /// The rest interval before the next fade.
        interval: Duration,
        /// The duration of the fade that follows the wait.
        duration: Duration,
    },
    /// Rotation was cancelled; any countdown indicator should stop.
    RotationWaitCancel,
}

/// Receives lifecycle notifications.
///
/// All methods have default no-op implementations.
pub trait EventSink {
    /// Called when an image's fade-in settles.
    fn on_image_shown(&mut self, path: &ImageKey) {
        _ = path;
    }

    /// Called when a rotation wait begins.
    fn on_rotation_wait_start(&mut self, interval: Duration, duration: Duration) {
        _ = (interval, duration);
    }

    /// Called when rotation is cancelled.
    fn on_rotation_wait_cancel(&mut self) {}
}

/// An [`EventSink`] that discards all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {}

/// Forwards a batch of events to a sink, in order.
pub fn dispatch(sink: &mut dyn EventSink, events: &[StackEvent]) {
    for event in events {
        match event {
            StackEvent::ImageShown(path) => sink.on_image_shown(path),
            StackEvent::RotationWaitStart { interval, duration } => {
                sink.on_rotation_wait_start(*interval, *duration);
            }
            StackEvent::RotationWaitCancel => sink.on_rotation_wait_cancel(),
        }
    }
}
