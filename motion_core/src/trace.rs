// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation channel for the provider.
//!
//! The provider reports what it does through a [`TraceSink`]: session
//! boundaries, anchoring, every published sample, every dropped tick,
//! observers removed after panicking, and interval changes that had to wait
//! for the next session. All methods default
//! to no-ops, so a sink only overrides the events it cares about.
//!
//! Dropped ticks are never returned to the caller as errors; this channel is
//! where they surface.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink` and mirrors each event as
//! a `tracing` record, so an application that only installs a `tracing`
//! subscriber still sees lifecycle and error events.

use core::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::clock::ClockAnchor;
use crate::error::TickError;
use crate::provider::Mode;
use crate::registry::SubscriptionId;
use crate::sample::Sample;
use crate::time::WallTime;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when `start()` begins a session.
#[derive(Clone, Copy, Debug)]
pub struct SessionStartEvent {
    /// Session counter, starting at 1.
    pub session: u64,
    /// [`Mode::Hardware`] or [`Mode::Synthetic`].
    pub mode: Mode,
    /// Update interval applied to this session.
    pub interval: Duration,
    /// Wall time when the session started.
    pub at: WallTime,
}

/// Emitted when `stop()` ends a session.
#[derive(Clone, Copy, Debug)]
pub struct SessionStopEvent {
    /// Session counter.
    pub session: u64,
    /// Mode the session ran in.
    pub mode: Mode,
    /// Samples published during the session.
    pub published: u64,
    /// Ticks dropped during the session.
    pub dropped: u64,
}

/// Emitted when the first hardware tick of a session places the clock anchor.
#[derive(Clone, Copy, Debug)]
pub struct AnchorEvent {
    /// Session counter.
    pub session: u64,
    /// The anchor used for the rest of the session.
    pub anchor: ClockAnchor,
}

/// Emitted after a sample was delivered to all subscribers.
#[derive(Clone, Copy, Debug)]
pub struct SampleEvent {
    /// Session counter.
    pub session: u64,
    /// Zero-based index of the sample within the session.
    pub sequence: u64,
    /// The published sample.
    pub sample: Sample,
}

/// Emitted when a hardware tick is dropped.
#[derive(Clone, Debug)]
pub struct TickDroppedEvent {
    /// Session counter.
    pub session: u64,
    /// Why the tick was dropped.
    pub error: TickError,
}

/// Emitted when an observer panicked during delivery.
///
/// The observer has been unsubscribed; the session keeps running.
#[derive(Clone, Copy, Debug)]
pub struct ObserverPanickedEvent {
    /// Session counter.
    pub session: u64,
    /// Subscription that was removed.
    pub id: SubscriptionId,
}

/// Emitted when the update interval is changed during a session.
#[derive(Clone, Copy, Debug)]
pub struct IntervalDeferredEvent {
    /// Session counter of the running session.
    pub session: u64,
    /// Newly requested interval in seconds, applied at the next `start()`.
    pub requested: f64,
    /// Interval the running session keeps using.
    pub active: Duration,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives observation events from the provider.
///
/// Methods are called with the provider's serialization lock held, in the
/// order the events happen. They should return quickly and must not call back
/// into the provider's lifecycle methods.
pub trait TraceSink: Send {
    /// Called when a session starts.
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        _ = e;
    }

    /// Called when a session stops.
    fn on_session_stop(&mut self, e: &SessionStopEvent) {
        _ = e;
    }

    /// Called when the clock anchor is placed.
    fn on_anchor(&mut self, e: &AnchorEvent) {
        _ = e;
    }

    /// Called after each published sample.
    fn on_sample(&mut self, e: &SampleEvent) {
        _ = e;
    }

    /// Called for each dropped tick.
    fn on_tick_dropped(&mut self, e: &TickDroppedEvent) {
        _ = e;
    }

    /// Called when a panicking observer is unsubscribed.
    fn on_observer_panicked(&mut self, e: &ObserverPanickedEvent) {
        _ = e;
    }

    /// Called when an interval change is deferred to the next session.
    fn on_interval_deferred(&mut self, e: &IntervalDeferredEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Box<S> {
    fn on_session_start(&mut self, e: &SessionStartEvent) {
        (**self).on_session_start(e);
    }

    fn on_session_stop(&mut self, e: &SessionStopEvent) {
        (**self).on_session_stop(e);
    }

    fn on_anchor(&mut self, e: &AnchorEvent) {
        (**self).on_anchor(e);
    }

    fn on_sample(&mut self, e: &SampleEvent) {
        (**self).on_sample(e);
    }

    fn on_tick_dropped(&mut self, e: &TickDroppedEvent) {
        (**self).on_tick_dropped(e);
    }

    fn on_observer_panicked(&mut self, e: &ObserverPanickedEvent) {
        (**self).on_observer_panicked(e);
    }

    fn on_interval_deferred(&mut self, e: &IntervalDeferredEvent) {
        (**self).on_interval_deferred(e);
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`] that also emits `tracing`
/// records.
pub struct Tracer<'a> {
    sink: Option<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a tracer that only emits `tracing` records.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self { sink: None }
    }

    /// Emits a [`SessionStartEvent`].
    pub fn session_start(&mut self, e: &SessionStartEvent) {
        info!(
            session = e.session,
            mode = ?e.mode,
            interval = ?e.interval,
            "motion session started"
        );
        if let Some(s) = &mut self.sink {
            s.on_session_start(e);
        }
    }

    /// Emits a [`SessionStopEvent`].
    pub fn session_stop(&mut self, e: &SessionStopEvent) {
        info!(
            session = e.session,
            mode = ?e.mode,
            published = e.published,
            dropped = e.dropped,
            "motion session stopped"
        );
        if let Some(s) = &mut self.sink {
            s.on_session_stop(e);
        }
    }

    /// Emits an [`AnchorEvent`].
    pub fn anchor(&mut self, e: &AnchorEvent) {
        debug!(
            session = e.session,
            wall_ns = e.anchor.wall().nanos(),
            device_ns = e.anchor.device_nanos(),
            "clock anchored"
        );
        if let Some(s) = &mut self.sink {
            s.on_anchor(e);
        }
    }

    /// Emits a [`SampleEvent`].
    #[inline]
    pub fn sample(&mut self, e: &SampleEvent) {
        trace!(
            session = e.session,
            sequence = e.sequence,
            timestamp_ns = e.sample.timestamp().nanos(),
            "sample published"
        );
        if let Some(s) = &mut self.sink {
            s.on_sample(e);
        }
    }

    /// Emits a [`TickDroppedEvent`].
    pub fn tick_dropped(&mut self, e: &TickDroppedEvent) {
        warn!(session = e.session, error = %e.error, "motion tick dropped");
        if let Some(s) = &mut self.sink {
            s.on_tick_dropped(e);
        }
    }

    /// Emits an [`ObserverPanickedEvent`].
    pub fn observer_panicked(&mut self, e: &ObserverPanickedEvent) {
        warn!(
            session = e.session,
            id = e.id.0,
            "observer panicked and was unsubscribed"
        );
        if let Some(s) = &mut self.sink {
            s.on_observer_panicked(e);
        }
    }

    /// Emits an [`IntervalDeferredEvent`].
    pub fn interval_deferred(&mut self, e: &IntervalDeferredEvent) {
        warn!(
            session = e.session,
            requested = e.requested,
            active = ?e.active,
            "update interval changed while active; applies after restart"
        );
        if let Some(s) = &mut self.sink {
            s.on_interval_deferred(e);
        }
    }
}
