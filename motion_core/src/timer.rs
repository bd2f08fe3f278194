// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic timer driving the synthetic fallback.
//!
//! The timer runs on its own thread. Fire `n` (starting at 1) is due at
//! `start + n × interval` on the monotonic clock and is labelled with
//! `start_wall + n × interval`, so labels are exactly one interval apart no
//! matter how late the thread wakes. A late fire is still delivered; nothing
//! is skipped.
//!
//! Cancellation is a channel disconnect, which wakes the thread immediately.

use core::time::Duration;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::time::WallTime;

const THREAD_NAME: &str = "motion-fallback-timer";

/// Offset of fire `n` from the timer's start, or `None` past the `u64`
/// nanosecond range.
pub(crate) fn fire_offset(interval: Duration, n: u64) -> Option<Duration> {
    let nanos = interval.as_nanos().checked_mul(u128::from(n))?;
    u64::try_from(nanos).ok().map(Duration::from_nanos)
}

/// A running fallback timer. Dropping it cancels the timer.
#[derive(Debug)]
pub(crate) struct FallbackTimer {
    cancel: Sender<()>,
    thread: JoinHandle<()>,
}

impl FallbackTimer {
    /// Spawns the timer thread.
    ///
    /// `fire` receives the fire number and its wall-clock label. Returning
    /// `false` ends the timer.
    pub(crate) fn spawn<F>(
        interval: Duration,
        start: Instant,
        start_wall: WallTime,
        mut fire: F,
    ) -> io::Result<Self>
    where
        F: FnMut(u64, WallTime) -> bool + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                let mut n: u64 = 1;
                loop {
                    let schedule = fire_offset(interval, n).and_then(|offset| {
                        Some((start.checked_add(offset)?, start_wall.checked_add(offset)?))
                    });
                    let Some((due, label)) = schedule else {
                        tracing::warn!(
                            fire = n,
                            ?interval,
                            "fallback timer schedule overflowed; no further samples"
                        );
                        break;
                    };

                    let wait = due.saturating_duration_since(Instant::now());
                    match cancelled.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    if !fire(n, label) {
                        break;
                    }
                    n += 1;
                }
                tracing::trace!(fires = n - 1, "fallback timer exited");
            })?;
        Ok(Self { cancel, thread })
    }

    /// Cancels the timer without waiting for the thread.
    ///
    /// The returned handle may be joined or dropped. A fire already past its
    /// wait completes; the caller's `fire` closure must tolerate that.
    pub(crate) fn cancel(self) -> JoinHandle<()> {
        drop(self.cancel);
        self.thread
    }
}
