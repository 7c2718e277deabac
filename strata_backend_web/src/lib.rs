// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for strata.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomStage`]: DOM layer management and CSS opacity transitions
//! - [`IntervalHandle`]: `setInterval`-backed rotation timer
//! - [`JsRandom`]: `Math.random`-backed [`RandomSource`]
//!
//! [`RandomSource`]: strata_core::backend::RandomSource

#![no_std]

extern crate alloc;

mod random;
mod stage;
mod timer;

pub use random::JsRandom;
pub use stage::DomStage;
pub use strata_core::backend::Stage;
pub use timer::IntervalHandle;

use wasm_bindgen::JsCast as _;
use web_sys::HtmlElement;

use strata_core::error::StackError;

/// Looks up the stack holder element by id.
///
/// # Errors
///
/// Returns [`StackError::Configuration`] when the document has no element
/// with that id, or the element is not an HTML element.
pub fn stack_holder(id: &str) -> Result<HtmlElement, StackError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(StackError::Configuration("no document available"))?;
    document
        .get_element_by_id(id)
        .ok_or(StackError::Configuration("stack holder element not found"))?
        .dyn_into()
        .map_err(|_| StackError::Configuration("stack holder is not an HTML element"))
}
