// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock instants and the clocks that produce them.
//!
//! [`WallTime`] is a point in calendar time expressed as nanoseconds since the
//! UNIX epoch. Samples are stamped with it regardless of whether they came
//! from a hardware feed (whose own clock is only monotonic) or from the
//! synthetic fallback.
//!
//! [`WallClock`] abstracts "what time is it now". The provider reads it once
//! per session to place the clock anchor and once per start to seed the
//! fallback timer; [`SystemClock`] is the production source and
//! [`ManualClock`] a settable one for simulations.

use core::fmt;
use core::ops::{Add, Sub};
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A wall-clock instant as nanoseconds since the UNIX epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WallTime(pub u64);

impl WallTime {
    /// The UNIX epoch.
    pub const UNIX_EPOCH: Self = Self(0);

    /// Creates a wall time from nanoseconds since the UNIX epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns nanoseconds since the UNIX epoch.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Returns seconds since the UNIX epoch as a float.
    ///
    /// Lossy at nanosecond scale for present-day dates; use
    /// [`nanos`](Self::nanos) for exact arithmetic.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SECOND
    }

    /// Converts a [`SystemTime`], saturating at the epoch and at `u64::MAX`.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        Self(u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX))
    }

    /// Converts to a [`SystemTime`].
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.0)
    }

    /// Checked addition of a duration.
    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let nanos = u64::try_from(duration.as_nanos()).ok()?;
        self.0.checked_add(nanos).map(Self)
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for WallTime {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on overflow; use [`WallTime::checked_add`] for untrusted input.
    fn add(self, rhs: Duration) -> Self {
        match self.checked_add(rhs) {
            Some(t) => t,
            None => panic!("overflow when adding duration to wall time"),
        }
    }
}

impl Sub for WallTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration::from_nanos(self.0 - rhs.0)
    }
}

impl fmt::Debug for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WallTime({})", self.0)
    }
}

/// A source of the current wall-clock time.
pub trait WallClock: Send + Sync {
    /// Returns the current wall time.
    fn now(&self) -> WallTime;
}

/// Reads the operating system's real-time clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> WallTime {
        WallTime::from_system_time(SystemTime::now())
    }
}

/// A wall clock that only moves when told to.
///
/// Clones share the same underlying time, so a handle kept by the caller can
/// steer a clock that was moved into a provider.
#[derive(Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: WallTime) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start.nanos())),
        }
    }

    /// Sets the current time.
    pub fn set(&self, time: WallTime) {
        self.nanos.store(time.nanos(), Ordering::Release);
    }

    /// Moves the clock forward, saturating at `u64::MAX` nanoseconds.
    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(step))
            });
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> WallTime {
        WallTime(self.nanos.load(Ordering::Acquire))
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManualClock").field(&self.now()).finish()
    }
}
