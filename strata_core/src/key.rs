// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image-path identity.
//!
//! An [`ImageKey`] is a normalized image path used as the sole identity for
//! layer deduplication: two paths that normalize to the same string share one
//! layer. Normalization strips the `url(...)` wrapper (with or without
//! quotes) that style-derived values carry; plain paths pass through
//! unchanged. Equality is exact string comparison after normalization.

use alloc::string::String;
use core::fmt;

/// A normalized image path, the identity of one layer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates a key from an already-normal path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Creates a key from a raw style value, stripping a `url(...)` wrapper
    /// and any quotes inside it.
    ///
    /// Computed styles report background images as `url("a.png")` (or the
    /// unquoted `url(a.png)`); anything else is taken verbatim.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let inner = raw
            .strip_prefix("url(")
            .and_then(|rest| rest.strip_suffix(')'))
            .map_or(raw, |inner| {
                inner
                    .strip_prefix('"')
                    .and_then(|r| r.strip_suffix('"'))
                    .or_else(|| inner.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
                    .unwrap_or(inner)
            });
        Self(String::from(inner))
    }

    /// Creates a key by prepending the configured path prefix to a supplied
    /// path.
    #[must_use]
    pub fn prefixed(prefix: &str, path: &str) -> Self {
        let mut full = String::with_capacity(prefix.len() + path.len());
        full.push_str(prefix);
        full.push_str(path);
        Self(full)
    }

    /// Returns the normalized path.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageKey({:?})", self.0)
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
