// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core layer stack and rotation state machine for crossfade image cycling.
//!
//! `strata_core` provides the data structures and state machine behind a
//! crossfade image rotator: a stack of absolutely-positioned image layers in
//! one container whose visibility is switched by animating opacity. It is
//! `no_std` compatible (with `alloc`) and contains no platform code; backends
//! supply the display surface, the opacity animation, the rotation timer, and
//! the randomness.
//!
//! # Architecture
//!
//! The crate is organized around a sans-io loop: public operations (and
//! asynchronous feedback from the backend) are pure state transitions that
//! produce a batch of effects for the backend to apply:
//!
//! ```text
//!   public op / rotation tick / fade completion
//!       │
//!       ▼
//!   Stacker ──► StackChanges ──► Stage::apply()
//!       ▲                            │
//!       └── fade_finished(layer, ────┘
//!              generation)
//! ```
//!
//! **[`stack`]** — Append-only registry mapping each normalized image path
//! ([`key::ImageKey`]) to one layer slot, with per-layer fade generations
//! for cancel-on-retarget semantics.
//!
//! **[`chain`]** — FIFO continuation queue ensuring operations submitted
//! while a transition is in flight run only after its completion, and that a
//! superseded transition's continuations never run.
//!
//! **[`engine`]** — The [`Stacker`](engine::Stacker): gallery sequence,
//! current image, rotation scheduling, and the transition protocol.
//!
//! **[`changes`]** — The [`StackChanges`](changes::StackChanges) batch a
//! state transition produces: layers to create, fades to start or retarget,
//! a timer command, lifecycle events.
//!
//! **[`backend`]** — The [`Stage`](backend::Stage) and
//! [`RandomSource`](backend::RandomSource) traits that platform backends
//! implement.
//!
//! **[`event`]** — Lifecycle notifications and the
//! [`EventSink`](event::EventSink) trait for receiving them.
//!
//! **[`config`]** / **[`time`]** / **[`key`]** / **[`error`]** — Options,
//! millisecond durations, image-path identity, and the error taxonomy.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod chain;
pub mod changes;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod key;
pub mod stack;
pub mod time;
