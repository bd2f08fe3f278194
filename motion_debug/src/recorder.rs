// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events as fixed-size
//! little-endian records into a buffer shared with a [`Recording`] handle.
//! The provider owns the sink once it is installed, so keep the handle to get
//! the bytes back. [`decode`] reads them as an iterator of [`RecordedEvent`].
//!
//! Dropped-tick records store only the [`TickErrorKind`]; feed messages and
//! offending device times are not kept.

use core::time::Duration;
use std::sync::{Arc, Mutex, PoisonError};

use motion_core::error::TickErrorKind;
use motion_core::provider::Mode;
use motion_core::registry::SubscriptionId;
use motion_core::sample::{Axes, Sample};
use motion_core::time::WallTime;
use motion_core::trace::{
    AnchorEvent, IntervalDeferredEvent, ObserverPanickedEvent, SampleEvent, SessionStartEvent,
    SessionStopEvent, TickDroppedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SESSION_START: u8 = 1;
const TAG_SESSION_STOP: u8 = 2;
const TAG_ANCHOR: u8 = 3;
const TAG_SAMPLE: u8 = 4;
const TAG_TICK_DROPPED: u8 = 5;
const TAG_INTERVAL_DEFERRED: u8 = 6;
const TAG_OBSERVER_PANICKED: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    shared: Arc<Mutex<Vec<u8>>>,
    record: Vec<u8>,
}

/// Read handle for the bytes written by a [`RecorderSink`].
#[derive(Clone, Debug, Default)]
pub struct Recording {
    shared: Arc<Mutex<Vec<u8>>>,
}

impl Recording {
    /// Copies out everything recorded so far.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of bytes recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that reads this recorder's bytes.
    #[must_use]
    pub fn recording(&self) -> Recording {
        Recording {
            shared: Arc::clone(&self.shared),
        }
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.record.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.record.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_duration(&mut self, d: Duration) {
        self.write_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
    }

    fn write_axes(&mut self, a: Axes) {
        self.write_f64(a.x);
        self.write_f64(a.y);
        self.write_f64(a.z);
    }

    fn write_mode(&mut self, m: Mode) {
        self.write_u8(match m {
            Mode::Idle => 0,
            Mode::Hardware => 1,
            Mode::Synthetic => 2,
        });
    }

    fn write_kind(&mut self, k: TickErrorKind) {
        self.write_u8(match k {
            TickErrorKind::Feed => 0,
            TickErrorKind::InvalidDeviceTime => 1,
            TickErrorKind::DeviceTimeRegressed => 2,
            TickErrorKind::TimestampOverflow => 3,
        });
    }

    /// Appends the pending record to the shared buffer in one step.
    fn flush(&mut self) {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&self.record);
        self.record.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        self.write_u8(TAG_SESSION_START);
        self.write_u64(e.session);
        self.write_mode(e.mode);
        self.write_duration(e.interval);
        self.write_u64(e.at.nanos());
        self.flush();
    }

    fn on_session_stop(&mut self, e: &SessionStopEvent) {
        self.write_u8(TAG_SESSION_STOP);
        self.write_u64(e.session);
        self.write_mode(e.mode);
        self.write_u64(e.published);
        self.write_u64(e.dropped);
        self.flush();
    }

    fn on_anchor(&mut self, e: &AnchorEvent) {
        self.write_u8(TAG_ANCHOR);
        self.write_u64(e.session);
        self.write_u64(e.anchor.wall().nanos());
        self.write_u64(e.anchor.device_nanos());
        self.flush();
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        self.write_u8(TAG_SAMPLE);
        self.write_u64(e.session);
        self.write_u64(e.sequence);
        self.write_u64(e.sample.timestamp().nanos());
        self.write_axes(e.sample.acceleration());
        self.write_axes(e.sample.rotation_rate());
        self.flush();
    }

    fn on_tick_dropped(&mut self, e: &TickDroppedEvent) {
        self.write_u8(TAG_TICK_DROPPED);
        self.write_u64(e.session);
        self.write_kind(e.error.kind());
        self.flush();
    }

    fn on_observer_panicked(&mut self, e: &ObserverPanickedEvent) {
        self.write_u8(TAG_OBSERVER_PANICKED);
        self.write_u64(e.session);
        self.write_u64(e.id.0);
        self.flush();
    }

    fn on_interval_deferred(&mut self, e: &IntervalDeferredEvent) {
        self.write_u8(TAG_INTERVAL_DEFERRED);
        self.write_u64(e.session);
        self.write_f64(e.requested);
        self.write_duration(e.active);
        self.flush();
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`SessionStartEvent`].
    SessionStart(SessionStartEvent),
    /// A [`SessionStopEvent`].
    SessionStop(SessionStopEvent),
    /// An [`AnchorEvent`], flattened.
    Anchor {
        /// Session counter.
        session: u64,
        /// Anchor wall time.
        wall: WallTime,
        /// Anchor device time in nanoseconds.
        device_nanos: u64,
    },
    /// A [`SampleEvent`].
    Sample(SampleEvent),
    /// A dropped tick, without its error payload.
    TickDropped {
        /// Session counter.
        session: u64,
        /// Why the tick was dropped.
        kind: TickErrorKind,
    },
    /// An [`IntervalDeferredEvent`].
    IntervalDeferred(IntervalDeferredEvent),
    /// An [`ObserverPanickedEvent`].
    ObserverPanicked(ObserverPanickedEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_axes(&mut self) -> Option<Axes> {
        Some(Axes::new(self.read_f64()?, self.read_f64()?, self.read_f64()?))
    }

    fn read_mode(&mut self) -> Option<Mode> {
        Some(match self.read_u8()? {
            0 => Mode::Idle,
            1 => Mode::Hardware,
            2 => Mode::Synthetic,
            _ => return None,
        })
    }

    fn read_kind(&mut self) -> Option<TickErrorKind> {
        Some(match self.read_u8()? {
            0 => TickErrorKind::Feed,
            1 => TickErrorKind::InvalidDeviceTime,
            2 => TickErrorKind::DeviceTimeRegressed,
            3 => TickErrorKind::TimestampOverflow,
            _ => return None,
        })
    }

    fn decode_session_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SessionStart(SessionStartEvent {
            session: self.read_u64()?,
            mode: self.read_mode()?,
            interval: Duration::from_nanos(self.read_u64()?),
            at: WallTime(self.read_u64()?),
        }))
    }

    fn decode_session_stop(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SessionStop(SessionStopEvent {
            session: self.read_u64()?,
            mode: self.read_mode()?,
            published: self.read_u64()?,
            dropped: self.read_u64()?,
        }))
    }

    fn decode_anchor(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Anchor {
            session: self.read_u64()?,
            wall: WallTime(self.read_u64()?),
            device_nanos: self.read_u64()?,
        })
    }

    fn decode_sample(&mut self) -> Option<RecordedEvent> {
        let session = self.read_u64()?;
        let sequence = self.read_u64()?;
        let timestamp = WallTime(self.read_u64()?);
        let acceleration = self.read_axes()?;
        let rotation_rate = self.read_axes()?;
        Some(RecordedEvent::Sample(SampleEvent {
            session,
            sequence,
            sample: Sample::new(timestamp, acceleration, rotation_rate),
        }))
    }

    fn decode_tick_dropped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickDropped {
            session: self.read_u64()?,
            kind: self.read_kind()?,
        })
    }

    fn decode_interval_deferred(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::IntervalDeferred(IntervalDeferredEvent {
            session: self.read_u64()?,
            requested: self.read_f64()?,
            active: Duration::from_nanos(self.read_u64()?),
        }))
    }

    fn decode_observer_panicked(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ObserverPanicked(ObserverPanickedEvent {
            session: self.read_u64()?,
            id: SubscriptionId(self.read_u64()?),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_u8()? {
            TAG_SESSION_START => self.decode_session_start(),
            TAG_SESSION_STOP => self.decode_session_stop(),
            TAG_ANCHOR => self.decode_anchor(),
            TAG_SAMPLE => self.decode_sample(),
            TAG_TICK_DROPPED => self.decode_tick_dropped(),
            TAG_INTERVAL_DEFERRED => self.decode_interval_deferred(),
            TAG_OBSERVER_PANICKED => self.decode_observer_panicked(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use motion_core::clock::ClockAnchor;
    use motion_core::error::{FeedError, TickError};

    use super::*;

    fn sample_event(sequence: u64) -> SampleEvent {
        SampleEvent {
            session: 3,
            sequence,
            sample: Sample::new(
                WallTime(1_000_000 + sequence * 10_000_000),
                Axes::new(0.25, -0.5, 0.75),
                Axes::new(-1.0, 0.0, 1.0),
            ),
        }
    }

    #[test]
    fn session_with_samples_decodes_in_order() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_session_start(&SessionStartEvent {
            session: 3,
            mode: Mode::Hardware,
            interval: Duration::from_millis(10),
            at: WallTime(1_000_000),
        });
        rec.on_anchor(&AnchorEvent {
            session: 3,
            anchor: ClockAnchor::new(WallTime(1_000_000), 42.5).unwrap(),
        });
        rec.on_sample(&sample_event(0));
        rec.on_sample(&sample_event(1));
        rec.on_session_stop(&SessionStopEvent {
            session: 3,
            mode: Mode::Hardware,
            published: 2,
            dropped: 0,
        });

        let bytes = recording.bytes();
        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 5);

        match &events[0] {
            RecordedEvent::SessionStart(e) => {
                assert_eq!(e.mode, Mode::Hardware);
                assert_eq!(e.interval, Duration::from_millis(10));
            }
            other => panic!("expected SessionStart, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Anchor { device_nanos, .. } => {
                assert_eq!(*device_nanos, 42_500_000_000);
            }
            other => panic!("expected Anchor, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::Sample(e) => assert_eq!(e.sample, sample_event(1).sample),
            other => panic!("expected Sample, got {other:?}"),
        }
        assert!(matches!(
            events[4],
            RecordedEvent::SessionStop(SessionStopEvent { published: 2, .. })
        ));
    }

    #[test]
    fn dropped_tick_keeps_only_kind() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_tick_dropped(&TickDroppedEvent {
            session: 1,
            error: FeedError::new("long message that is not recorded").into(),
        });
        rec.on_tick_dropped(&TickDroppedEvent {
            session: 1,
            error: TickError::DeviceTimeRegressed {
                previous: 2.0,
                current: 1.0,
            },
        });

        assert_eq!(recording.len(), 2 * (1 + 8 + 1));
        let kinds: Vec<_> = decode(&recording.bytes())
            .map(|e| match e {
                RecordedEvent::TickDropped { kind, .. } => kind,
                other => panic!("expected TickDropped, got {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            [TickErrorKind::Feed, TickErrorKind::DeviceTimeRegressed]
        );
    }

    #[test]
    fn interval_deferred_keeps_requested_value() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_interval_deferred(&IntervalDeferredEvent {
            session: 4,
            requested: -0.5,
            active: Duration::from_millis(20),
        });

        match decode(&recording.bytes()).next() {
            Some(RecordedEvent::IntervalDeferred(e)) => {
                assert_eq!(e.requested, -0.5);
                assert_eq!(e.active, Duration::from_millis(20));
            }
            other => panic!("expected IntervalDeferred, got {other:?}"),
        }
    }

    #[test]
    fn panicked_observer_keeps_subscription_id() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_sample(&sample_event(0));
        rec.on_observer_panicked(&ObserverPanickedEvent {
            session: 3,
            id: SubscriptionId(12),
        });
        rec.on_sample(&sample_event(1));

        let events: Vec<_> = decode(&recording.bytes()).collect();
        assert_eq!(events.len(), 3);
        match &events[1] {
            RecordedEvent::ObserverPanicked(e) => {
                assert_eq!(e.session, 3);
                assert_eq!(e.id, SubscriptionId(12));
            }
            other => panic!("expected ObserverPanicked, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_ends_iteration() {
        let mut rec = RecorderSink::new();
        let recording = rec.recording();
        rec.on_sample(&sample_event(0));
        rec.on_sample(&sample_event(1));

        let bytes = recording.bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert!(RecorderSink::new().recording().is_empty());
        assert_eq!(decode(&[]).count(), 0);
    }
}
