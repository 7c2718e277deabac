// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotator configuration.

use alloc::string::String;

use crate::error::StackError;
use crate::time::Duration;

/// The easing curve handed to the opacity animator.
///
/// The interpolation itself is the backend's concern (a CSS timing function
/// on the web); the engine only carries the choice through to each
/// [`FadeTarget`](crate::changes::FadeTarget).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FadeCurve {
    /// Constant-rate interpolation.
    Linear,
    /// Slow start.
    SineIn,
    /// Slow finish.
    SineOut,
    /// Slow start and finish.
    #[default]
    SineInOut,
}

/// Configuration for a [`Stacker`](crate::engine::Stacker).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackerConfig {
    /// Whether loading a gallery of more than one image arms rotation.
    pub rotate_on_load: bool,
    /// How long a fully-shown image rests before the next fade begins.
    pub rotation_interval: Duration,
    /// Prefix prepended to every supplied image path.
    pub image_path_prefix: String,
    /// How long one opacity fade takes.
    pub transition_duration: Duration,
    /// Easing curve passed through to the animator.
    pub curve: FadeCurve,
}

impl Default for StackerConfig {
    fn default() -> Self {
        Self {
            rotate_on_load: true,
            rotation_interval: Duration::from_millis(5000),
            image_path_prefix: String::new(),
            transition_duration: Duration::from_millis(2000),
            curve: FadeCurve::SineInOut,
        }
    }
}

impl StackerConfig {
    /// Checks option values for consistency.
    ///
    /// A zero rotation interval would make the timer period equal to the
    /// fade duration alone, so consecutive fades could overlap.
    pub fn validate(&self) -> Result<(), StackError> {
        if self.rotation_interval.is_zero() {
            return Err(StackError::Configuration("rotation interval must be non-zero"));
        }
        Ok(())
    }

    /// The rotation timer period: the wait interval plus the time the fade
    /// itself consumes, so a tick never lands mid-fade.
    #[must_use]
    pub fn rotation_period(&self) -> Duration {
        self.rotation_interval.saturating_add(self.transition_duration)
    }
}
