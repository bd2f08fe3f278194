// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamped six-axis motion samples from a hardware feed, with a
//! synthetic fallback.
//!
//! `motion_core` turns a device's motion callbacks (linear acceleration and
//! rotation rate, stamped with the device's own monotonic clock) into
//! [`Sample`](sample::Sample)s carrying wall-clock timestamps. When no
//! hardware is available it generates uniformly random readings on a fixed
//! timer instead, so downstream code always has a stream to consume.
//!
//! # Architecture
//!
//! ```text
//!   MotionFeed (hardware)              FallbackTimer (no hardware)
//!       │ RawReading                       │ fire n
//!       ▼                                  ▼
//!   AnchoredClock::stamp()           SyntheticGenerator::generate()
//!       │ wall timestamp                   │ start + n × interval
//!       └──────────────┬───────────────────┘
//!                      ▼
//!                   Sample ──► observers ──► latest_sample ──► TraceSink
//! ```
//!
//! **[`provider`]**: The [`MotionProvider`](provider::MotionProvider) state
//! machine (idle, hardware, synthetic) and its builder.
//!
//! **[`feed`]**: The [`MotionFeed`](feed::MotionFeed) trait a platform
//! implements to deliver hardware readings.
//!
//! **[`clock`]**: Anchors device time to wall time once per session and
//! extrapolates every later tick from that anchor.
//!
//! **[`generator`]**: Uniform random readings for the fallback.
//!
//! **[`sample`]**, **[`time`]**: Value types and the wall-clock abstraction.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) observation events, mirrored
//! as `tracing` records.

pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod generator;
pub mod provider;
pub mod registry;
pub mod sample;
pub mod time;
pub mod trace;

mod timer;
