// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Only [`StartError`] ever reaches the embedding application as a return
//! value. [`FeedError`] and [`TickError`] describe a single dropped tick; they
//! are reported through the [`TraceSink`](crate::trace::TraceSink) and the
//! session carries on.

use thiserror::Error;

/// Why [`MotionProvider::start`](crate::provider::MotionProvider::start)
/// refused to start a session. The provider stays idle.
#[derive(Debug, Error)]
pub enum StartError {
    /// The update interval is not a positive number of seconds of at most one
    /// hour.
    #[error("update interval must be a positive number of seconds up to 3600, got {0}")]
    InvalidInterval(f64),

    /// The synthetic fallback timer thread could not be spawned.
    #[error("failed to spawn fallback timer thread: {0}")]
    TimerSpawn(#[from] std::io::Error),
}

/// An error reported by a hardware feed in place of a reading.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("motion feed error: {message}")]
pub struct FeedError {
    message: String,
}

impl FeedError {
    /// Creates a feed error with a human-readable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the feed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a single hardware tick was dropped instead of published.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TickError {
    /// The feed delivered an error instead of a reading.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The reading's device time is NaN, infinite, or negative.
    #[error("device time {0} is not a finite, non-negative number of seconds")]
    InvalidDeviceTime(f64),

    /// The reading's device time is earlier than the previous accepted tick.
    #[error("device time went backwards from {previous}s to {current}s")]
    DeviceTimeRegressed {
        /// Device time of the previous accepted tick, in seconds.
        previous: f64,
        /// Device time of the rejected tick, in seconds.
        current: f64,
    },

    /// Extrapolating from the anchor overflowed the wall-clock range.
    #[error("extrapolated timestamp does not fit in wall-clock range")]
    TimestampOverflow,
}

impl TickError {
    /// A short stable name for the error kind, for logs and recordings.
    #[must_use]
    pub const fn kind(&self) -> TickErrorKind {
        match self {
            Self::Feed(_) => TickErrorKind::Feed,
            Self::InvalidDeviceTime(_) => TickErrorKind::InvalidDeviceTime,
            Self::DeviceTimeRegressed { .. } => TickErrorKind::DeviceTimeRegressed,
            Self::TimestampOverflow => TickErrorKind::TimestampOverflow,
        }
    }
}

/// Fieldless discriminant of [`TickError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickErrorKind {
    /// [`TickError::Feed`].
    Feed,
    /// [`TickError::InvalidDeviceTime`].
    InvalidDeviceTime,
    /// [`TickError::DeviceTimeRegressed`].
    DeviceTimeRegressed,
    /// [`TickError::TimestampOverflow`].
    TimestampOverflow,
}

impl TickErrorKind {
    /// Short label for logs and exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::InvalidDeviceTime => "invalid-device-time",
            Self::DeviceTimeRegressed => "device-time-regressed",
            Self::TimestampOverflow => "timestamp-overflow",
        }
    }
}
