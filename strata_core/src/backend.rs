// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Strata splits platform-specific work into *backend* crates. Each backend
//! provides the following pieces:
//!
//! - **Stage** — Implements the [`Stage`] trait to apply [`StackChanges`]
//!   to a real display surface: materializing cloned layers, running
//!   opacity fades with cancel-on-retarget semantics, and arming or
//!   cancelling the rotation timer.
//!
//! - **Feedback** — Reports each fade completion back through
//!   [`Stacker::fade_finished`] with the generation the fade was issued
//!   under, and each rotation timer fire through
//!   [`Stacker::rotation_tick`]. How completions are observed is
//!   backend-specific (`transitionend` on the web) and not abstracted by a
//!   trait because lifecycle and threading differ across platforms.
//!
//! - **Randomness** — Implements [`RandomSource`] for the uniform draw a
//!   gallery load performs. Tests substitute a seeded source.
//!
//! # Crate boundaries
//!
//! `strata_core` owns the data model, the state machine, and this contract
//! module. Backend crates depend on `strata_core` and provide platform
//! glue. Application code depends on both and wires them together:
//!
//! ```rust,ignore
//! let changes = stacker.load_gallery(&["a.png", "b.png"], None)?;
//! stage.apply(stacker.stack(), &changes);
//!
//! // Later, when a fade settles on the platform:
//! let changes = stacker.fade_finished(layer, generation);
//! stage.apply(stacker.stack(), &changes);
//! ```
//!
//! [`StackChanges`]: crate::changes::StackChanges
//! [`Stacker::fade_finished`]: crate::engine::Stacker::fade_finished
//! [`Stacker::rotation_tick`]: crate::engine::Stacker::rotation_tick

use crate::changes::StackChanges;
use crate::stack::LayerStack;

/// Applies effect batches to a platform display surface.
///
/// Both DOM-based stages and test doubles implement this trait, enabling
/// generic wiring and deterministic tests.
pub trait Stage {
    /// Applies the given [`StackChanges`], reading layer keys and stacking
    /// positions from `stack` as needed.
    fn apply(&mut self, stack: &LayerStack, changes: &StackChanges);
}

/// A uniform random index source.
///
/// Used for the initial image draw on a gallery load. Pluggable so tests
/// can substitute a deterministic source.
pub trait RandomSource {
    /// Returns an index in `0..len`.
    ///
    /// Never called with `len == 0`.
    fn next_index(&mut self, len: usize) -> usize;
}
