// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Math.random`-backed random source.

use strata_core::backend::RandomSource;

/// Draws uniform indices from the browser's `Math.random`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsRandom;

impl RandomSource for JsRandom {
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "Math.random() is in [0, 1); the scaled draw fits the index range"
    )]
    fn next_index(&mut self, len: usize) -> usize {
        let draw = js_sys::Math::random() * len as f64;
        (draw as usize).min(len.saturating_sub(1))
    }
}
