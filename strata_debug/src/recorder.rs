// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`EventSink`] and encodes notifications into
//! a `Vec<u8>` as tagged little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`]. Decoding stops cleanly at the first
//! truncated or unknown record.

use strata_core::event::EventSink;
use strata_core::key::ImageKey;
use strata_core::time::Duration;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_IMAGE_SHOWN: u8 = 1;
const TAG_WAIT_START: u8 = 2;
const TAG_WAIT_CANCEL: u8 = 3;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// An [`EventSink`] that encodes notifications into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        let len = u32::try_from(s.len()).expect("path length exceeds u32");
        self.write_u32(len);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

impl EventSink for RecorderSink {
    fn on_image_shown(&mut self, path: &ImageKey) {
        self.write_u8(TAG_IMAGE_SHOWN);
        self.write_str(path.as_str());
    }

    fn on_rotation_wait_start(&mut self, interval: Duration, duration: Duration) {
        self.write_u8(TAG_WAIT_START);
        self.write_u64(interval.as_millis());
        self.write_u64(duration.as_millis());
    }

    fn on_rotation_wait_cancel(&mut self) {
        self.write_u8(TAG_WAIT_CANCEL);
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// A decoded lifecycle notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An image's fade-in settled.
    ImageShown(
        /// The path that became visible.
        String,
    ),
    /// A rotation wait began.
    RotationWaitStart {
        /// The rest interval before the next fade.
        interval: Duration,
        /// The duration of the fade that follows.
        duration: Duration,
    },
    /// Rotation was cancelled.
    RotationWaitCancel,
}

/// Iterates over the events recorded in `bytes`.
pub fn decode(bytes: &[u8]) -> impl Iterator<Item = RecordedEvent> + '_ {
    Decoder { bytes, at: 0 }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl Decoder<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.at.checked_add(n)?;
        let slice = self.bytes.get(self.at..end)?;
        self.at = end;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.take(4)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        let bytes = self.take(8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).ok()
    }
}

impl Iterator for Decoder<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        match self.read_u8()? {
            TAG_IMAGE_SHOWN => Some(RecordedEvent::ImageShown(self.read_str()?)),
            TAG_WAIT_START => Some(RecordedEvent::RotationWaitStart {
                interval: Duration::from_millis(self.read_u64()?),
                duration: Duration::from_millis(self.read_u64()?),
            }),
            TAG_WAIT_CANCEL => Some(RecordedEvent::RotationWaitCancel),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
