// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recordings.
//!
//! [`export`] reads bytes from a [`Recording`](crate::recorder::Recording)
//! and writes a JSON array with one object per event. Every object has an
//! `"event"` name and a `"session"` counter; times are nanoseconds since the
//! Unix epoch (`*_ns`) and intervals are milliseconds (`*_ms`).

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a JSON array.
///
/// # Errors
///
/// Returns any error from `writer`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(to_json).collect();
    serde_json::to_writer_pretty(&mut *writer, &events)?;
    writeln!(writer)
}

fn to_json(recorded: RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::SessionStart(e) => json!({
            "event": "session_start",
            "session": e.session,
            "mode": format!("{:?}", e.mode),
            "interval_ms": e.interval.as_secs_f64() * 1000.0,
            "at_ns": e.at.nanos(),
        }),
        RecordedEvent::SessionStop(e) => json!({
            "event": "session_stop",
            "session": e.session,
            "mode": format!("{:?}", e.mode),
            "published": e.published,
            "dropped": e.dropped,
        }),
        RecordedEvent::Anchor {
            session,
            wall,
            device_nanos,
        } => json!({
            "event": "anchor",
            "session": session,
            "wall_ns": wall.nanos(),
            "device_ns": device_nanos,
        }),
        RecordedEvent::Sample(e) => json!({
            "event": "sample",
            "session": e.session,
            "sequence": e.sequence,
            "timestamp_ns": e.sample.timestamp().nanos(),
            "acceleration": e.sample.acceleration().to_array(),
            "rotation_rate": e.sample.rotation_rate().to_array(),
        }),
        RecordedEvent::TickDropped { session, kind } => json!({
            "event": "tick_dropped",
            "session": session,
            "kind": kind.as_str(),
        }),
        // NaN and infinite requests serialize as null.
        RecordedEvent::IntervalDeferred(e) => json!({
            "event": "interval_deferred",
            "session": e.session,
            "requested_s": e.requested,
            "active_ms": e.active.as_secs_f64() * 1000.0,
        }),
        RecordedEvent::ObserverPanicked(e) => json!({
            "event": "observer_panicked",
            "session": e.session,
            "subscription": e.id.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use motion_core::error::TickError;
    use motion_core::provider::Mode;
    use motion_core::registry::SubscriptionId;
    use motion_core::sample::{Axes, Sample};
    use motion_core::time::WallTime;
    use motion_core::trace::{
        IntervalDeferredEvent, ObserverPanickedEvent, SampleEvent, SessionStartEvent,
        TickDroppedEvent, TraceSink,
    };

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_session_start(&SessionStartEvent {
            session: 1,
            mode: Mode::Synthetic,
            interval: Duration::from_millis(10),
            at: WallTime(5_000),
        });
        rec.on_sample(&SampleEvent {
            session: 1,
            sequence: 0,
            sample: Sample::new(WallTime(10_005_000), Axes::new(0.5, 0.0, -0.5), Axes::ZERO),
        });
        rec.on_tick_dropped(&TickDroppedEvent {
            session: 1,
            error: TickError::TimestampOverflow,
        });
        rec.on_observer_panicked(&ObserverPanickedEvent {
            session: 1,
            id: SubscriptionId(2),
        });

        let mut out = Vec::new();
        export(&recording.bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["event"], "session_start");
        assert_eq!(parsed[0]["mode"], "Synthetic");
        assert_eq!(parsed[0]["interval_ms"], 10.0);

        assert_eq!(parsed[1]["event"], "sample");
        assert_eq!(parsed[1]["timestamp_ns"], 10_005_000);
        assert_eq!(parsed[1]["acceleration"], json!([0.5, 0.0, -0.5]));

        assert_eq!(parsed[2]["event"], "tick_dropped");
        assert_eq!(parsed[2]["kind"], "timestamp-overflow");

        assert_eq!(parsed[3]["event"], "observer_panicked");
        assert_eq!(parsed[3]["subscription"], 2);
    }

    #[test]
    fn nan_request_exports_as_null() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_interval_deferred(&IntervalDeferredEvent {
            session: 2,
            requested: f64::NAN,
            active: Duration::from_millis(10),
        });

        let mut out = Vec::new();
        export(&recording.bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed[0]["requested_s"].is_null(), "got: {}", parsed[0]);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
