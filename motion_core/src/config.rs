// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Provider configuration.

use core::time::Duration;

use crate::error::StartError;

/// Configuration read by [`MotionProvider::start`](crate::provider::MotionProvider::start).
///
/// Changes made while a session is active take effect at the next `start()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProviderConfig {
    /// Nominal seconds between samples, for both the hardware feed and the
    /// synthetic timer. Must be positive.
    pub update_interval: f64,
}

impl ProviderConfig {
    /// 100 Hz, the fastest rate common motion hardware delivers.
    pub const DEFAULT_INTERVAL: f64 = 0.01;

    /// Longest accepted interval, in seconds.
    pub const MAX_INTERVAL: f64 = 3_600.0;

    /// Configuration with the given interval in seconds.
    #[must_use]
    pub const fn with_interval(update_interval: f64) -> Self {
        Self { update_interval }
    }

    /// Configuration for a sampling rate in hertz.
    #[must_use]
    pub fn from_hz(hz: f64) -> Self {
        Self::with_interval(1.0 / hz)
    }

    /// Validates the interval.
    ///
    /// # Errors
    ///
    /// [`StartError::InvalidInterval`] if the interval is zero, negative,
    /// NaN, shorter than a nanosecond, or longer than
    /// [`MAX_INTERVAL`](Self::MAX_INTERVAL).
    pub fn interval(&self) -> Result<Duration, StartError> {
        let secs = self.update_interval;
        if secs.is_nan() || secs <= 0.0 || secs > Self::MAX_INTERVAL {
            return Err(StartError::InvalidInterval(secs));
        }
        match Duration::try_from_secs_f64(secs) {
            Ok(d) if !d.is_zero() => Ok(d),
            _ => Err(StartError::InvalidInterval(secs)),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_INTERVAL)
    }
}
