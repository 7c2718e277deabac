// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append-only layer registry.
//!
//! [`LayerStack`] maps each [`ImageKey`] to exactly one layer slot, stored
//! in parallel arrays with index handles. Layers are created on first
//! appearance of a key and never destroyed, so handles are plain slot
//! indices with no generation-on-destroy machinery; the per-layer counter
//! here is the *fade* generation used for cancel-on-retarget (a fade
//! completion carrying a stale generation is ignored by the engine).

use alloc::vec::Vec;
use core::fmt;

use crate::key::ImageKey;

/// A handle to a layer in a [`LayerStack`].
///
/// Layers are never destroyed, so the handle is a bare slot index. Slot
/// order is creation order, which is also stacking order: later layers sit
/// visually above earlier ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub(crate) u32);

impl LayerId {
    /// Returns the raw slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// A layer's fade generation at the time a fade was issued.
///
/// Each retarget of a layer bumps its generation; a completion reported
/// with an older generation belongs to a superseded fade and must not fire
/// its completion contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(pub(crate) u32);

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Append-only storage for all layers, one per distinct image key.
#[derive(Debug, Default)]
pub struct LayerStack {
    keys: Vec<ImageKey>,
    generations: Vec<u32>,
    // Last commanded opacity target per layer; observed state for queries,
    // mutated only when the engine issues a fade.
    targets: Vec<f32>,
}

impl LayerStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the layer for `key`, creating one if none exists.
    ///
    /// The boolean is `true` when the layer was created by this call. A
    /// created layer starts at opacity target 0 and fade generation 0.
    /// Idempotent per key.
    pub fn ensure(&mut self, key: &ImageKey) -> (LayerId, bool) {
        if let Some(id) = self.layer_for(key) {
            return (id, false);
        }
        let idx = u32::try_from(self.keys.len()).expect("layer count exceeds u32");
        self.keys.push(key.clone());
        self.generations.push(0);
        self.targets.push(0.0);
        (LayerId(idx), true)
    }

    /// Returns the layer registered for `key`, if any.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ensure() refuses growth past u32, so every position fits"
    )]
    pub fn layer_for(&self, key: &ImageKey) -> Option<LayerId> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|idx| LayerId(idx as u32))
    }

    /// Returns the key a layer was created for.
    ///
    /// # Panics
    ///
    /// Panics if the handle did not come from this stack.
    #[must_use]
    pub fn key_at(&self, id: LayerId) -> &ImageKey {
        self.validate(id);
        &self.keys[id.0 as usize]
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether the stack holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over all layers in creation (stacking) order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ensure() refuses growth past u32, so the length fits"
    )]
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.keys.len() as u32).map(LayerId)
    }

    /// Returns a layer's current fade generation.
    #[must_use]
    pub fn generation(&self, id: LayerId) -> Generation {
        self.validate(id);
        Generation(self.generations[id.0 as usize])
    }

    /// Bumps a layer's fade generation, superseding any in-flight fade on
    /// it, and returns the new generation.
    pub fn retarget(&mut self, id: LayerId) -> Generation {
        self.validate(id);
        let slot = &mut self.generations[id.0 as usize];
        *slot += 1;
        Generation(*slot)
    }

    /// Returns whether `generation` is the layer's newest fade generation.
    #[must_use]
    pub fn is_current(&self, id: LayerId, generation: Generation) -> bool {
        self.validate(id);
        self.generations[id.0 as usize] == generation.0
    }

    /// Records the opacity target the layer was last commanded toward.
    pub fn set_target(&mut self, id: LayerId, opacity: f32) {
        self.validate(id);
        self.targets[id.0 as usize] = opacity;
    }

    /// Returns the opacity target the layer was last commanded toward.
    #[must_use]
    pub fn target(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.targets[id.0 as usize]
    }

    /// Panics if the handle is out of range.
    fn validate(&self, id: LayerId) {
        assert!(
            (id.0 as usize) < self.keys.len(),
            "unknown LayerId: {id:?} (len {})",
            self.keys.len()
        );
    }
}
