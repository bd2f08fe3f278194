// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The motion provider: lifecycle, source selection, and publication.
//!
//! [`MotionProvider`] is a three-state machine:
//!
//! ```text
//!            start() [feed available]
//!        ┌──────────────────────────────► Hardware ──┐
//!   Idle ┤                                           ├─ stop() ─► Idle
//!        └──────────────────────────────► Synthetic ─┘
//!            start() [feed unavailable]
//! ```
//!
//! `start()` while active and `stop()` while idle are no-ops.
//!
//! # Serialization
//!
//! Lifecycle calls, hardware callbacks, and fallback timer fires all run
//! under one mutex. Every callback carries the id of the session it was
//! created for and is ignored unless that session is still current, so once
//! `stop()` returns nothing more is published for that session, and a late
//! tick can never touch the anchor of the next one.
//!
//! The active mode and the latest sample are mirrored outside that mutex
//! (an atomic and a small lock of their own) so readers never wait on a
//! delivery in progress. Observers may read them from inside a delivery, but
//! must not call `start`, `stop`, `subscribe`, `unsubscribe`, or
//! `set_update_interval` from there: the serialization lock is held.
//!
//! # Publication order
//!
//! For each accepted tick the provider delivers the sample to every observer,
//! then replaces [`latest_sample`](MotionProvider::latest_sample), then emits
//! a [`SampleEvent`] to the trace sink. An observer therefore still sees the
//! previous sample in `latest_sample()`.
//!
//! An observer that panics is unsubscribed and reported as an
//! [`ObserverPanickedEvent`]; the session keeps publishing to the rest.

use core::fmt;
use core::time::Duration;
use std::mem;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, trace};

use crate::clock::AnchoredClock;
use crate::config::ProviderConfig;
use crate::error::{StartError, TickError};
use crate::feed::{FeedResult, MotionFeed, Unavailable};
use crate::generator::SyntheticGenerator;
use crate::registry::{Registry, SubscriptionId};
use crate::sample::Sample;
use crate::time::{SystemClock, WallClock, WallTime};
use crate::timer::FallbackTimer;
use crate::trace::{
    AnchorEvent, IntervalDeferredEvent, ObserverPanickedEvent, SampleEvent, SessionStartEvent,
    SessionStopEvent, TickDroppedEvent, TraceSink, Tracer,
};

/// Which acquisition mechanism is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Nothing is running.
    #[default]
    Idle,
    /// Subscribed to a hardware feed.
    Hardware,
    /// Driven by the synthetic fallback timer.
    Synthetic,
}

impl Mode {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Hardware => 1,
            Self::Synthetic => 2,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Hardware,
            2 => Self::Synthetic,
            _ => Self::Idle,
        }
    }
}

/// Snapshot of the provider's lifecycle state.
///
/// `active()` is derived from the mode, so an active provider is always in
/// [`Mode::Hardware`] or [`Mode::Synthetic`] and an inactive one in
/// [`Mode::Idle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ProviderState {
    mode: Mode,
}

impl ProviderState {
    /// Whether a session is running.
    #[must_use]
    pub const fn active(&self) -> bool {
        !matches!(self.mode, Mode::Idle)
    }

    /// The running mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }
}

enum Session {
    Idle,
    Hardware {
        id: u64,
        interval: Duration,
    },
    Synthetic {
        id: u64,
        interval: Duration,
        timer: FallbackTimer,
    },
}

impl Session {
    const fn id(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Hardware { id, .. } | Self::Synthetic { id, .. } => Some(*id),
        }
    }

    const fn interval(&self) -> Option<Duration> {
        match self {
            Self::Idle => None,
            Self::Hardware { interval, .. } | Self::Synthetic { interval, .. } => Some(*interval),
        }
    }

    const fn is_hardware(&self, session: u64) -> bool {
        matches!(self, Self::Hardware { id, .. } if *id == session)
    }

    const fn is_synthetic(&self, session: u64) -> bool {
        matches!(self, Self::Synthetic { id, .. } if *id == session)
    }
}

struct Inner<F> {
    feed: F,
    config: ProviderConfig,
    session: Session,
    sessions_started: u64,
    anchor: AnchoredClock,
    registry: Registry,
    generator: SyntheticGenerator,
    sink: Option<Box<dyn TraceSink>>,
    published: u64,
    dropped: u64,
}

impl<F> Inner<F> {
    fn tracer(&mut self) -> Tracer<'_> {
        match &mut self.sink {
            Some(sink) => Tracer::new(sink.as_mut()),
            None => Tracer::none(),
        }
    }

    fn publish(&mut self, latest: &Mutex<Option<Sample>>, session: u64, sample: Sample) {
        for id in self.registry.deliver(&sample) {
            self.tracer()
                .observer_panicked(&ObserverPanickedEvent { session, id });
        }
        *lock(latest) = Some(sample);
        let sequence = self.published;
        self.published += 1;
        self.tracer().sample(&SampleEvent {
            session,
            sequence,
            sample,
        });
    }

    fn drop_tick(&mut self, session: u64, error: TickError) {
        self.dropped += 1;
        self.tracer()
            .tick_dropped(&TickDroppedEvent { session, error });
    }
}

struct Shared<F> {
    inner: Mutex<Inner<F>>,
    mode: AtomicU8,
    latest: Mutex<Option<Sample>>,
    clock: Arc<dyn WallClock>,
}

impl<F: MotionFeed> Shared<F> {
    fn on_feed_tick(&self, session: u64, result: FeedResult) {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        if !inner.session.is_hardware(session) {
            trace!(session, "ignoring feed tick from an ended session");
            return;
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                inner.drop_tick(session, e.into());
                return;
            }
        };

        let anchoring = inner.anchor.anchor().is_none();
        match inner.anchor.stamp(|| self.clock.now(), raw.device_time) {
            Ok(timestamp) => {
                if anchoring {
                    if let Some(anchor) = inner.anchor.anchor() {
                        inner.tracer().anchor(&AnchorEvent { session, anchor });
                    }
                }
                inner.publish(&self.latest, session, raw.motion().at(timestamp));
            }
            Err(e) => inner.drop_tick(session, e),
        }
    }

    /// Returns `false` once `session` is no longer current.
    fn on_timer_fire(&self, session: u64, label: WallTime) -> bool {
        let mut guard = lock(&self.inner);
        let inner = &mut *guard;
        if !inner.session.is_synthetic(session) {
            return false;
        }
        let motion = inner.generator.generate();
        inner.publish(&self.latest, session, motion.at(label));
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Publishes timestamped motion samples from a hardware feed, or from a
/// synthetic generator when no hardware is available.
///
/// `MotionProvider` is `Send + Sync`; share it behind an [`Arc`] to drive it
/// from several threads. Dropping it stops any running session.
///
/// # Example
///
/// ```no_run
/// use motion_core::provider::MotionProvider;
///
/// let provider = MotionProvider::synthetic();
/// let _id = provider.subscribe(|sample| println!("{:?}", sample.readings()));
/// provider.start()?;
/// std::thread::sleep(std::time::Duration::from_millis(100));
/// provider.stop();
/// # Ok::<(), motion_core::error::StartError>(())
/// ```
pub struct MotionProvider<F: MotionFeed = Unavailable> {
    shared: Arc<Shared<F>>,
}

impl<F: MotionFeed> fmt::Debug for MotionProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionProvider")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl MotionProvider<Unavailable> {
    /// A provider with no hardware feed; every session is synthetic.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(Unavailable)
    }
}

impl<F: MotionFeed + 'static> MotionProvider<F> {
    /// Creates a provider with default configuration.
    #[must_use]
    pub fn new(feed: F) -> Self {
        Self::builder(feed).build()
    }

    /// Starts configuring a provider.
    #[must_use]
    pub fn builder(feed: F) -> ProviderBuilder<F> {
        ProviderBuilder::new(feed)
    }

    /// Starts a session.
    ///
    /// Does nothing if a session is already running. Otherwise subscribes to
    /// the feed if it reports itself available, or starts the synthetic
    /// fallback timer if not. The clock anchor is reset either way.
    ///
    /// # Errors
    ///
    /// [`StartError::InvalidInterval`] if the configured update interval is
    /// unusable, [`StartError::TimerSpawn`] if the fallback thread could not
    /// be created. The provider stays idle in both cases.
    pub fn start(&self) -> Result<(), StartError> {
        let shared = &self.shared;
        let mut guard = lock(&shared.inner);
        let inner = &mut *guard;
        if let Some(session) = inner.session.id() {
            debug!(session, "start() ignored; session already running");
            return Ok(());
        }

        let interval = inner.config.interval()?;
        let session = inner.sessions_started + 1;
        let started_at = shared.clock.now();

        let mode = if inner.feed.is_available() {
            inner.feed.configure(interval);
            let weak = Arc::downgrade(shared);
            inner.feed.subscribe(Box::new(move |result| {
                if let Some(shared) = weak.upgrade() {
                    shared.on_feed_tick(session, result);
                }
            }));
            inner.session = Session::Hardware {
                id: session,
                interval,
            };
            Mode::Hardware
        } else {
            let weak = Arc::downgrade(shared);
            let timer =
                FallbackTimer::spawn(interval, Instant::now(), started_at, move |_, label| {
                    weak.upgrade()
                        .is_some_and(|shared| shared.on_timer_fire(session, label))
                })?;
            inner.session = Session::Synthetic {
                id: session,
                interval,
                timer,
            };
            Mode::Synthetic
        };

        inner.sessions_started = session;
        inner.anchor.reset();
        inner.published = 0;
        inner.dropped = 0;
        shared.mode.store(mode.to_u8(), Ordering::Release);
        inner.tracer().session_start(&SessionStartEvent {
            session,
            mode,
            interval,
            at: started_at,
        });
        Ok(())
    }
}

impl<F: MotionFeed> MotionProvider<F> {
    /// Stops the running session.
    ///
    /// Unsubscribes from the feed or cancels the fallback timer, then marks
    /// the provider idle and discards the clock anchor. No sample from the
    /// stopped session is published after this returns. Does nothing while
    /// idle.
    pub fn stop(&self) {
        let mut guard = lock(&self.shared.inner);
        let inner = &mut *guard;
        let (session, mode) = match mem::replace(&mut inner.session, Session::Idle) {
            Session::Idle => {
                debug!("stop() ignored; no session running");
                return;
            }
            Session::Hardware { id, .. } => {
                inner.feed.unsubscribe();
                (id, Mode::Hardware)
            }
            Session::Synthetic { id, timer, .. } => {
                // Detached: a fire blocked on our lock sees the idle session
                // and exits on its own.
                drop(timer.cancel());
                (id, Mode::Synthetic)
            }
        };

        inner.anchor.reset();
        self.shared
            .mode
            .store(Mode::Idle.to_u8(), Ordering::Release);
        let (published, dropped) = (inner.published, inner.dropped);
        inner.tracer().session_stop(&SessionStopEvent {
            session,
            mode,
            published,
            dropped,
        });
    }

    /// Whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state().active()
    }

    /// The running mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.shared.mode.load(Ordering::Acquire))
    }

    /// Snapshot of the lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProviderState {
        ProviderState { mode: self.mode() }
    }

    /// The most recently published sample, if any has been published.
    ///
    /// Kept across `stop()`; replaced by the next sample.
    #[must_use]
    pub fn latest_sample(&self) -> Option<Sample> {
        *lock(&self.shared.latest)
    }

    /// The configured update interval in seconds.
    ///
    /// While a session is running this may differ from the interval that
    /// session uses; see [`set_update_interval`](Self::set_update_interval).
    #[must_use]
    pub fn update_interval(&self) -> f64 {
        lock(&self.shared.inner).config.update_interval
    }

    /// Sets the update interval in seconds.
    ///
    /// Takes effect at the next `start()`. Changing it while a session is
    /// running is reported as an [`IntervalDeferredEvent`] and does not
    /// affect that session. The value is validated by `start()`.
    pub fn set_update_interval(&self, seconds: f64) {
        let mut guard = lock(&self.shared.inner);
        let inner = &mut *guard;
        inner.config.update_interval = seconds;
        if let (Some(session), Some(active)) = (inner.session.id(), inner.session.interval()) {
            inner.tracer().interval_deferred(&IntervalDeferredEvent {
                session,
                requested: seconds,
                active,
            });
        }
    }

    /// Registers an observer for every subsequently published sample.
    pub fn subscribe<O>(&self, observer: O) -> SubscriptionId
    where
        O: FnMut(&Sample) + Send + 'static,
    {
        lock(&self.shared.inner).registry.insert(Box::new(observer))
    }

    /// Removes an observer. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if !lock(&self.shared.inner).registry.remove(id) {
            debug!(?id, "unsubscribe() ignored; unknown subscription");
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.inner).registry.len()
    }
}

impl<F: MotionFeed> Drop for MotionProvider<F> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builder for [`MotionProvider`].
pub struct ProviderBuilder<F> {
    feed: F,
    config: ProviderConfig,
    clock: Arc<dyn WallClock>,
    sink: Option<Box<dyn TraceSink>>,
    generator: SyntheticGenerator,
}

impl<F> fmt::Debug for ProviderBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBuilder")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<F: MotionFeed + 'static> ProviderBuilder<F> {
    fn new(feed: F) -> Self {
        Self {
            feed,
            config: ProviderConfig::default(),
            clock: Arc::new(SystemClock),
            sink: None,
            generator: SyntheticGenerator::new(),
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the update interval in seconds.
    #[must_use]
    pub fn update_interval(mut self, seconds: f64) -> Self {
        self.config.update_interval = seconds;
        self
    }

    /// Uses `clock` for anchoring and for the fallback timer's labels.
    #[must_use]
    pub fn clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sends observation events to `sink`.
    #[must_use]
    pub fn trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Seeds the synthetic generator for reproducible readings.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.generator = SyntheticGenerator::seeded(seed);
        self
    }

    /// Builds the provider, idle.
    #[must_use]
    pub fn build(self) -> MotionProvider<F> {
        let inner = Inner {
            feed: self.feed,
            config: self.config,
            session: Session::Idle,
            sessions_started: 0,
            anchor: AnchoredClock::new(),
            registry: Registry::default(),
            generator: self.generator,
            sink: self.sink,
            published: 0,
            dropped: 0,
        };
        MotionProvider {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                mode: AtomicU8::new(Mode::Idle.to_u8()),
                latest: Mutex::new(None),
                clock: self.clock,
            }),
        }
    }
}
