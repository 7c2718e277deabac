// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect batches.
//!
//! Every mutating call on the [`Stacker`](crate::engine::Stacker) returns a
//! [`StackChanges`] describing what the backend must do: create layers,
//! start or retarget fades, arm or cancel the rotation timer, and forward
//! lifecycle events. Batches from nested transitions are combined with
//! [`merge`](StackChanges::merge), preserving order.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::FadeCurve;
use crate::error::StackError;
use crate::event::StackEvent;
use crate::key::ImageKey;
use crate::stack::{Generation, LayerId};
use crate::time::Duration;

/// A layer the backend must materialize.
///
/// The backend clones the template container, sets the background image to
/// `key`, applies `html` as static content, inserts the clone after the
/// template at opacity 0, and gives it a z-index strictly above the
/// template and all earlier layers (`template_z + position + 1`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSpec {
    /// The slot the layer occupies.
    pub layer: LayerId,
    /// The image the layer presents.
    pub key: ImageKey,
    /// Stacking position: 0 for the first created layer, increasing.
    pub position: u32,
    /// Static markup to insert into the layer, if any.
    pub html: Option<String>,
}

/// An opacity fade the backend must start, cancelling any fade already
/// running on the same layer (cancel-on-retarget).
///
/// The completion must be reported back through
/// [`Stacker::fade_finished`](crate::engine::Stacker::fade_finished) with
/// the `generation` carried here; the engine ignores completions whose
/// generation has since been superseded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeTarget {
    /// The layer to animate.
    pub layer: LayerId,
    /// The destination opacity (0 or 1).
    pub opacity: f32,
    /// How long the fade takes.
    pub duration: Duration,
    /// The easing curve.
    pub curve: FadeCurve,
    /// The fade generation at issue time.
    pub generation: Generation,
}

/// A rotation timer instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerCommand {
    /// Arm (or re-arm) a repeating timer with the given period; each fire
    /// is reported through
    /// [`Stacker::rotation_tick`](crate::engine::Stacker::rotation_tick).
    /// Any previously armed timer is cancelled first.
    Arm(Duration),
    /// Cancel the armed timer, if any.
    Cancel,
}

/// The set of effects produced by one state transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackChanges {
    /// Layers to materialize, in creation order.
    pub created: Vec<LayerSpec>,
    /// Fades to start or retarget, in issue order.
    pub fades: Vec<FadeTarget>,
    /// Timer instruction, if the rotation schedule changed.
    pub timer: Option<TimerCommand>,
    /// Lifecycle notifications, in order.
    pub events: Vec<StackEvent>,
    /// Deferred operations that failed when the chain drained. Direct calls
    /// surface their errors as `Err` instead.
    pub errors: Vec<StackError>,
}

impl StackChanges {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the batch carries no effects at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.fades.is_empty()
            && self.timer.is_none()
            && self.events.is_empty()
            && self.errors.is_empty()
    }

    /// Appends another batch, preserving order. A later timer command
    /// overrides an earlier one.
    pub fn merge(&mut self, other: Self) {
        self.created.extend(other.created);
        self.fades.extend(other.fades);
        if other.timer.is_some() {
            self.timer = other.timer;
        }
        self.events.extend(other.events);
        self.errors.extend(other.errors);
    }
}
