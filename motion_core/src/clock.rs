// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clock anchoring for hardware timestamps.
//!
//! Hardware feeds report a monotonic device time (seconds since an arbitrary
//! epoch) that is precise relative to itself but not tied to the calendar.
//! [`AnchoredClock`] records one `(wall, device)` pair on the first tick of a
//! session and extrapolates every later tick from it:
//!
//! ```text
//! wall = anchor_wall + (device_time - anchor_device)
//! ```
//!
//! Re-reading the OS clock per tick would add processing jitter that the
//! sensor's own sampling never had. Device times are quantised to integer
//! nanoseconds before subtracting, so the spacing of emitted wall timestamps
//! is exactly the spacing of the quantised device times.

use core::time::Duration;

use crate::error::TickError;
use crate::time::WallTime;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Converts device seconds to integer nanoseconds, rounding to nearest.
///
/// Rejects NaN, infinities, negative values and values past `u64` range.
pub fn device_nanos(device_time: f64) -> Result<u64, TickError> {
    if !device_time.is_finite() || device_time < 0.0 {
        return Err(TickError::InvalidDeviceTime(device_time));
    }
    let nanos = (device_time * NANOS_PER_SECOND).round();
    if nanos >= u64::MAX as f64 {
        return Err(TickError::InvalidDeviceTime(device_time));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "value is finite, non-negative, rounded and checked against u64::MAX"
    )]
    let nanos = nanos as u64;
    Ok(nanos)
}

/// The `(wall time, device time)` pair a session's timestamps hang off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClockAnchor {
    wall: WallTime,
    device_nanos: u64,
}

impl ClockAnchor {
    /// Creates an anchor pairing `wall` with `device_time` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidDeviceTime`] if `device_time` is not a
    /// finite, non-negative number of seconds.
    pub fn new(wall: WallTime, device_time: f64) -> Result<Self, TickError> {
        Ok(Self {
            wall,
            device_nanos: device_nanos(device_time)?,
        })
    }

    /// Wall time recorded at the first sample of the session.
    #[must_use]
    pub const fn wall(&self) -> WallTime {
        self.wall
    }

    /// Device time of the first sample, in nanoseconds.
    #[must_use]
    pub const fn device_nanos(&self) -> u64 {
        self.device_nanos
    }

    /// Device time of the first sample, in seconds.
    #[must_use]
    pub fn device_time(&self) -> f64 {
        self.device_nanos as f64 / NANOS_PER_SECOND
    }

    fn extrapolate(&self, nanos: u64) -> Result<WallTime, TickError> {
        let since_anchor = Duration::from_nanos(nanos - self.device_nanos);
        self.wall
            .checked_add(since_anchor)
            .ok_or(TickError::TimestampOverflow)
    }
}

/// Per-session timestamp reconstruction.
///
/// Unset until the first [`stamp`](Self::stamp) after construction or
/// [`reset`](Self::reset); from then on every stamp is derived from that one
/// anchor. Ticks whose device time goes backwards are rejected so the
/// session's timestamps never decrease.
#[derive(Clone, Debug, Default)]
pub struct AnchoredClock {
    anchor: Option<ClockAnchor>,
    /// Last accepted device time, as `(nanos, seconds)`.
    last: Option<(u64, f64)>,
}

impl AnchoredClock {
    /// Creates an unset clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: None,
            last: None,
        }
    }

    /// The anchor, once the first tick has been stamped.
    #[must_use]
    pub const fn anchor(&self) -> Option<ClockAnchor> {
        self.anchor
    }

    /// Returns the wall timestamp for a tick at `device_time` seconds.
    ///
    /// On the first call after construction or [`reset`](Self::reset), `now`
    /// is read once to place the anchor and the anchor's wall time is
    /// returned. Later calls never read `now`.
    ///
    /// # Errors
    ///
    /// Any [`TickError`] other than `Feed`. A rejected tick leaves the anchor
    /// and the last accepted device time untouched.
    pub fn stamp(
        &mut self,
        now: impl FnOnce() -> WallTime,
        device_time: f64,
    ) -> Result<WallTime, TickError> {
        let nanos = device_nanos(device_time)?;

        let Some(anchor) = self.anchor else {
            let anchor = ClockAnchor {
                wall: now(),
                device_nanos: nanos,
            };
            self.anchor = Some(anchor);
            self.last = Some((nanos, device_time));
            return Ok(anchor.wall);
        };

        if let Some((last_nanos, last_secs)) = self.last {
            if nanos < last_nanos {
                return Err(TickError::DeviceTimeRegressed {
                    previous: last_secs,
                    current: device_time,
                });
            }
        }
        debug_assert!(
            nanos >= anchor.device_nanos,
            "accepted device time precedes the session anchor"
        );

        let wall = anchor.extrapolate(nanos)?;
        self.last = Some((nanos, device_time));
        Ok(wall)
    }

    /// Discards the anchor; the next stamp re-anchors.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: WallTime = WallTime(1_700_000_000_000_000_000);

    #[test]
    fn first_stamp_returns_anchor_wall() {
        let mut clock = AnchoredClock::new();
        assert!(clock.anchor().is_none());

        let t = clock.stamp(|| T0, 100.0).unwrap();
        assert_eq!(t, T0);
        assert_eq!(clock.anchor().unwrap().device_nanos(), 100_000_000_000);
    }

    #[test]
    fn later_stamps_extrapolate_without_reading_now() {
        let mut clock = AnchoredClock::new();
        let _ = clock.stamp(|| T0, 100.0).unwrap();

        let t1 = clock
            .stamp(|| panic!("now() read after anchoring"), 100.01)
            .unwrap();
        let t2 = clock
            .stamp(|| panic!("now() read after anchoring"), 100.02)
            .unwrap();
        assert_eq!(t1 - T0, Duration::from_millis(10));
        assert_eq!(t2 - T0, Duration::from_millis(20));
        assert_eq!(t2 - t1, Duration::from_millis(10));
    }

    #[test]
    fn spacing_matches_quantised_device_spacing() {
        let mut clock = AnchoredClock::new();
        let times = [5.000_000_001, 5.333_333_333, 5.5, 9.25];
        let walls: Vec<WallTime> = times
            .iter()
            .map(|&d| clock.stamp(|| T0, d).unwrap())
            .collect();
        for (w, d) in walls.windows(2).zip(times.windows(2)) {
            let device_gap = device_nanos(d[1]).unwrap() - device_nanos(d[0]).unwrap();
            assert_eq!((w[1] - w[0]).as_nanos(), u128::from(device_gap));
        }
    }

    #[test]
    fn regression_is_rejected_and_keeps_continuity() {
        let mut clock = AnchoredClock::new();
        let _ = clock.stamp(|| T0, 10.0).unwrap();
        let _ = clock.stamp(|| T0, 10.5).unwrap();

        let err = clock.stamp(|| T0, 10.25).unwrap_err();
        assert_eq!(
            err,
            TickError::DeviceTimeRegressed {
                previous: 10.5,
                current: 10.25
            }
        );

        // Equal device time is allowed (non-decreasing).
        let t = clock.stamp(|| T0, 10.5).unwrap();
        assert_eq!(t - T0, Duration::from_millis(500));
    }

    #[test]
    fn invalid_device_times_are_rejected() {
        let mut clock = AnchoredClock::new();
        for bad in [f64::NAN, f64::INFINITY, -1.0, 1e30] {
            assert!(
                matches!(
                    clock.stamp(|| T0, bad),
                    Err(TickError::InvalidDeviceTime(_))
                ),
                "{bad} should be rejected"
            );
        }
        assert!(clock.anchor().is_none(), "rejected ticks must not anchor");
    }

    #[test]
    fn overflow_is_reported() {
        let mut clock = AnchoredClock::new();
        let _ = clock.stamp(|| WallTime(u64::MAX - 10), 0.0).unwrap();
        assert_eq!(
            clock.stamp(|| T0, 1.0),
            Err(TickError::TimestampOverflow)
        );
    }

    #[test]
    fn reset_clears_anchor() {
        let mut clock = AnchoredClock::new();
        let _ = clock.stamp(|| T0, 100.0).unwrap();
        clock.reset();
        assert!(clock.anchor().is_none());

        let later = WallTime(T0.nanos() + 5_000_000_000);
        assert_eq!(clock.stamp(|| later, 3.0).unwrap(), later);
    }

    #[test]
    fn anchor_keeps_quantised_device_time() {
        let anchor = ClockAnchor::new(T0, 2.000_000_000_4).unwrap();
        assert_eq!(anchor.wall(), T0);
        assert_eq!(anchor.device_nanos(), 2_000_000_000);
        assert!((anchor.device_time() - 2.0).abs() < 1e-12);
        assert!(ClockAnchor::new(T0, -1.0).is_err());
    }
}
