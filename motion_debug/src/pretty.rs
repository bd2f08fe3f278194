// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`] destination (default: stderr). Wall times are printed as
//! seconds since the Unix epoch.

use std::io::Write;

use motion_core::error::TickError;
use motion_core::trace::{
    AnchorEvent, IntervalDeferredEvent, ObserverPanickedEvent, SampleEvent, SessionStartEvent,
    SessionStopEvent, TickDroppedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`] destination.
pub struct PrettyPrintSink<W: Write + Send = Box<dyn Write + Send>> {
    writer: W,
    samples: bool,
}

impl<W: Write + Send> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write + Send> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            samples: true,
        }
    }

    /// Skips per-sample lines, keeping lifecycle and error events.
    #[must_use]
    pub fn without_samples(mut self) -> Self {
        self.samples = false;
        self
    }

    /// Consumes the sink and returns the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TraceSink for PrettyPrintSink<W> {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        let _ = writeln!(
            self.writer,
            "[start] session={} mode={:?} interval={:.3}ms at={:.6}s",
            e.session,
            e.mode,
            e.interval.as_secs_f64() * 1000.0,
            e.at.as_secs_f64(),
        );
    }

    fn on_session_stop(&mut self, e: &SessionStopEvent) {
        let _ = writeln!(
            self.writer,
            "[stop] session={} mode={:?} published={} dropped={}",
            e.session, e.mode, e.published, e.dropped,
        );
    }

    fn on_anchor(&mut self, e: &AnchorEvent) {
        let _ = writeln!(
            self.writer,
            "[anchor] session={} wall={:.6}s device={:.6}s",
            e.session,
            e.anchor.wall().as_secs_f64(),
            e.anchor.device_time(),
        );
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        if !self.samples {
            return;
        }
        let a = e.sample.acceleration();
        let r = e.sample.rotation_rate();
        let _ = writeln!(
            self.writer,
            "[sample] session={} seq={} t={:.6}s acc=({:+.3}, {:+.3}, {:+.3}) \
             rot=({:+.3}, {:+.3}, {:+.3})",
            e.session,
            e.sequence,
            e.sample.timestamp().as_secs_f64(),
            a.x,
            a.y,
            a.z,
            r.x,
            r.y,
            r.z,
        );
    }

    fn on_tick_dropped(&mut self, e: &TickDroppedEvent) {
        let kind = e.error.kind().as_str();
        let _ = match &e.error {
            TickError::Feed(feed) => writeln!(
                self.writer,
                "[dropped] session={} kind={kind} message={:?}",
                e.session,
                feed.message(),
            ),
            other => writeln!(
                self.writer,
                "[dropped] session={} kind={kind} error={other}",
                e.session,
            ),
        };
    }

    fn on_observer_panicked(&mut self, e: &ObserverPanickedEvent) {
        let _ = writeln!(
            self.writer,
            "[observer] session={} id={} panicked, unsubscribed",
            e.session, e.id.0,
        );
    }

    fn on_interval_deferred(&mut self, e: &IntervalDeferredEvent) {
        let _ = writeln!(
            self.writer,
            "[interval] session={} requested={}s active={:.3}ms (next session)",
            e.session,
            e.requested,
            e.active.as_secs_f64() * 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use motion_core::error::FeedError;
    use motion_core::provider::Mode;
    use motion_core::registry::SubscriptionId;
    use motion_core::sample::{Axes, Sample};
    use motion_core::time::WallTime;

    use super::*;

    fn sample_event() -> SampleEvent {
        SampleEvent {
            session: 2,
            sequence: 7,
            sample: Sample::new(
                WallTime(1_500_000_000),
                Axes::new(0.5, -0.25, 1.0),
                Axes::ZERO,
            ),
        }
    }

    #[test]
    fn pretty_print_session_start() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_session_start(&SessionStartEvent {
            session: 1,
            mode: Mode::Synthetic,
            interval: Duration::from_millis(10),
            at: WallTime(2_000_000_000),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[start]"), "got: {output}");
        assert!(output.contains("mode=Synthetic"), "got: {output}");
        assert!(output.contains("interval=10.000ms"), "got: {output}");
    }

    #[test]
    fn pretty_print_sample() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_sample(&sample_event());
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("seq=7"), "got: {output}");
        assert!(output.contains("t=1.500000s"), "got: {output}");
        assert!(output.contains("+0.500"), "got: {output}");
    }

    #[test]
    fn without_samples_keeps_errors() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).without_samples();
        sink.on_sample(&sample_event());
        sink.on_tick_dropped(&TickDroppedEvent {
            session: 2,
            error: FeedError::new("no data").into(),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[sample]"), "got: {output}");
        assert!(output.contains("kind=feed"), "got: {output}");
        assert!(output.contains(r#"message="no data""#), "got: {output}");
    }

    #[test]
    fn pretty_print_non_feed_drop_and_panicked_observer() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_tick_dropped(&TickDroppedEvent {
            session: 4,
            error: TickError::InvalidDeviceTime(f64::NAN),
        });
        sink.on_observer_panicked(&ObserverPanickedEvent {
            session: 4,
            id: SubscriptionId(3),
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("kind=invalid-device-time error="), "got: {output}");
        assert!(output.contains("[observer] session=4 id=3"), "got: {output}");
    }
}
