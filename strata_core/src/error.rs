// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy.
//!
//! Construction errors ([`StackError::Configuration`]) are returned
//! synchronously from [`Stacker::new`](crate::engine::Stacker::new) and are
//! fatal to the component. Navigation errors ([`StackError::InvalidKey`],
//! [`StackError::DegenerateGallery`]) are recoverable: the operation is
//! refused and engine state is left unchanged. Fade cancellation is not an
//! error anywhere in this crate; a retarget supersedes the previous fade by
//! policy.

use core::fmt;

use crate::key::ImageKey;

/// Errors surfaced by the rotator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackError {
    /// Invalid construction input (bad option values, missing container).
    Configuration(&'static str),
    /// A navigation operation referenced a key with no layer, or a current
    /// key absent from the gallery.
    InvalidKey(ImageKey),
    /// Rotation or selection was requested on a gallery too short to cycle.
    DegenerateGallery {
        /// The gallery length at the time of the request.
        len: usize,
    },
}

impl fmt::Display for StackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InvalidKey(key) => write!(f, "no stacked image for key {key:?}"),
            Self::DegenerateGallery { len } => {
                write!(f, "gallery of length {len} cannot be cycled")
            }
        }
    }
}

impl core::error::Error for StackError {}
