// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval`-backed rotation timer.
//!
//! [`IntervalHandle`] owns both the interval id and the JS closure it
//! dispatches to; dropping the handle clears the interval and releases the
//! closure, so a cancelled timer can never fire into freed state.

use alloc::boxed::Box;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use strata_core::time::Duration;

// Direct global bindings instead of `web_sys::Window` methods — avoids
// fetching (and unwrapping) the Window object on every arm/cancel.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setInterval")]
    fn set_interval(callback: &JsValue, period_ms: f64) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);
}

/// A repeating timer that fires `callback` every `period` until dropped.
pub struct IntervalHandle {
    id: i32,
    // Kept alive for the interval's lifetime.
    _closure: Closure<dyn FnMut()>,
}

impl IntervalHandle {
    /// Arms a repeating interval.
    #[must_use]
    pub fn new(period: Duration, callback: impl FnMut() + 'static) -> Self {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        #[expect(
            clippy::cast_precision_loss,
            reason = "periods are far below f64's integer range"
        )]
        let id = set_interval(closure.as_ref().unchecked_ref(), period.as_millis() as f64);
        Self {
            id,
            _closure: closure,
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        clear_interval(self.id);
    }
}

impl core::fmt::Debug for IntervalHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntervalHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
