// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON event-log exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes a JSON array
//! of event objects to the given writer, one object per notification in
//! recording order.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::ImageShown(path) => {
                events.push(json!({
                    "name": "ImageShown",
                    "args": {
                        "path": path,
                    }
                }));
            }
            RecordedEvent::RotationWaitStart { interval, duration } => {
                events.push(json!({
                    "name": "RotationWaitStart",
                    "args": {
                        "interval_ms": interval.as_millis(),
                        "duration_ms": duration.as_millis(),
                    }
                }));
            }
            RecordedEvent::RotationWaitCancel => {
                events.push(json!({
                    "name": "RotationWaitCancel",
                    "args": {}
                }));
            }
        }
    }

    serde_json::to_writer(&mut *writer, &events)?;
    writer.flush()
}
