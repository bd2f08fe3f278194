// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract for hardware motion feeds.
//!
//! The provider does not talk to sensors itself. A platform integration
//! implements [`MotionFeed`] on top of whatever driver it has and the provider
//! drives it through four calls:
//!
//! - **Availability**: [`is_available`](MotionFeed::is_available) is asked
//!   once per `start()`. `false` is not an error: the provider falls back to
//!   synthetic readings.
//!
//! - **Configuration**: [`configure`](MotionFeed::configure) receives the
//!   session's update interval before subscribing.
//!
//! - **Subscription**: [`subscribe`](MotionFeed::subscribe) hands over a
//!   [`FeedCallback`]. The feed invokes it once per tick with a
//!   [`RawReading`] or a [`FeedError`], from its own thread or queue, in
//!   arrival order.
//!
//! - **Teardown**: [`unsubscribe`](MotionFeed::unsubscribe) drops the
//!   callback. The provider always unsubscribes before it lets go of the feed.
//!
//! # Threading rules
//!
//! The callback takes the provider's serialization lock, and the provider
//! holds that same lock while calling `subscribe` and `unsubscribe`. So:
//!
//! - never invoke the callback synchronously from inside `subscribe`;
//! - never make `unsubscribe` wait for an in-flight callback to return.
//!
//! A callback that races with `unsubscribe` and runs late is harmless: it
//! carries the id of the session it was created for and the provider ignores
//! it once that session has ended.

use core::time::Duration;

use crate::error::FeedError;
use crate::sample::{Axes, Motion};

/// One raw tick from a hardware feed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawReading {
    /// Monotonic seconds since an arbitrary, feed-defined epoch.
    pub device_time: f64,
    /// Linear acceleration.
    pub acceleration: Axes,
    /// Angular rotation rate.
    pub rotation_rate: Axes,
}

impl RawReading {
    /// The readings without the device time.
    #[must_use]
    pub const fn motion(&self) -> Motion {
        Motion::new(self.acceleration, self.rotation_rate)
    }
}

/// What a feed delivers per tick.
pub type FeedResult = Result<RawReading, FeedError>;

/// Per-tick callback handed to [`MotionFeed::subscribe`].
pub type FeedCallback = Box<dyn FnMut(FeedResult) + Send + 'static>;

/// A source of hardware motion readings.
///
/// See the [module documentation](self) for the threading rules.
pub trait MotionFeed: Send {
    /// Whether a sensor is present and can be subscribed to.
    fn is_available(&self) -> bool;

    /// Sets the nominal interval between ticks for the next subscription.
    fn configure(&mut self, interval: Duration);

    /// Starts delivering ticks to `callback`, replacing any previous one.
    fn subscribe(&mut self, callback: FeedCallback);

    /// Stops delivering ticks and drops the callback.
    fn unsubscribe(&mut self);
}

impl<F: MotionFeed + ?Sized> MotionFeed for Box<F> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn configure(&mut self, interval: Duration) {
        (**self).configure(interval);
    }

    fn subscribe(&mut self, callback: FeedCallback) {
        (**self).subscribe(callback);
    }

    fn unsubscribe(&mut self) {
        (**self).unsubscribe();
    }
}

/// A feed with no sensor behind it. Always unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

impl MotionFeed for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn configure(&mut self, _interval: Duration) {}

    fn subscribe(&mut self, _callback: FeedCallback) {}

    fn unsubscribe(&mut self) {}
}
