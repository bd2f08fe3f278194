// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Printing, recording, JSON export, and cadence grading for motion provider
//! diagnostics.
//!
//! The sinks here implement [`TraceSink`](motion_core::trace::TraceSink) and
//! are installed with
//! [`ProviderBuilder::trace_sink`](motion_core::provider::ProviderBuilder::trace_sink):
//!
//! - [`pretty::PrettyPrintSink`]: one human-readable line per event.
//! - [`recorder::RecorderSink`]: compact binary recording, read back with
//!   [`recorder::decode`].
//! - [`json::export`]: writes recorded bytes as a JSON array.
//!
//! [`cadence::CadenceTracker`] grades how evenly spaced a stream of sample
//! timestamps is.

pub mod cadence;
pub mod json;
pub mod pretty;
pub mod recorder;
