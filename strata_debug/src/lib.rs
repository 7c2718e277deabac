// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and JSON export of strata lifecycle events.
//!
//! This crate provides [`EventSink`](strata_core::event::EventSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`recorder::RecorderSink`] — compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`] — writes a JSON event log from recorded bytes.

pub mod json;
pub mod recorder;
