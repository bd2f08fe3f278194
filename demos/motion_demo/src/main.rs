// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runs the motion provider against both of its sources.
//!
//! 1. A synthetic session with no hardware, recorded with a
//!    [`RecorderSink`](motion_debug::recorder::RecorderSink) and exported as
//!    JSON.
//! 2. A session against a simulated IMU that ticks on its own thread with
//!    timing jitter and the occasional read error, printed with a
//!    [`PrettyPrintSink`](motion_debug::pretty::PrettyPrintSink).
//!
//! Each run ends with a cadence report. Pass a path to choose where the JSON
//! goes (default: `motion_trace.json`).

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use motion_core::config::ProviderConfig;
use motion_core::error::FeedError;
use motion_core::feed::{FeedCallback, MotionFeed, RawReading, Unavailable};
use motion_core::provider::MotionProvider;
use motion_core::sample::Axes;
use motion_debug::cadence::{CadenceReport, CadenceTracker};
use motion_debug::pretty::PrettyPrintSink;
use motion_debug::recorder::RecorderSink;

const RUN_TIME: Duration = Duration::from_millis(300);
/// Every this many ticks the simulated IMU reports a read error.
const ERROR_EVERY: u64 = 25;

// ---------------------------------------------------------------------------
// Simulated IMU
// ---------------------------------------------------------------------------

/// A hardware feed backed by a thread that sleeps between ticks.
///
/// Device time advances by the nominal interval plus a small deterministic
/// wobble, so wall timestamps show realistic jitter.
#[derive(Debug, Default)]
struct SimulatedImu {
    interval: Duration,
    running: Option<Arc<AtomicBool>>,
}

impl MotionFeed for SimulatedImu {
    fn is_available(&self) -> bool {
        true
    }

    fn configure(&mut self, interval: Duration) {
        self.interval = interval;
    }

    fn subscribe(&mut self, mut callback: FeedCallback) {
        self.unsubscribe();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("simulated-imu".into())
            .spawn(move || {
                let mut device_time = 1_234.5;
                for n in 1_u64.. {
                    let wobble = 0.1 * (n as f64 * 0.7).sin();
                    let step = interval.mul_f64(1.0 + wobble);
                    thread::sleep(step);
                    if !flag.load(Ordering::Acquire) {
                        break;
                    }
                    device_time += step.as_secs_f64();
                    if n % ERROR_EVERY == 0 {
                        callback(Err(FeedError::new("sensor busy")));
                        continue;
                    }
                    let phase = n as f64 * 0.05;
                    callback(Ok(RawReading {
                        device_time,
                        acceleration: Axes::new(phase.sin() * 0.2, phase.cos() * 0.2, -0.98),
                        rotation_rate: Axes::new(0.0, 0.0, (phase * 2.0).sin()),
                    }));
                }
            });
        match spawned {
            Ok(_) => self.running = Some(running),
            Err(e) => tracing::error!(error = %e, "failed to spawn simulated IMU thread"),
        }
    }

    fn unsubscribe(&mut self) {
        if let Some(running) = self.running.take() {
            running.store(false, Ordering::Release);
        }
    }
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

type Tracker = Arc<Mutex<(CadenceTracker<40>, Option<CadenceReport>)>>;

fn track<F: MotionFeed + 'static>(provider: &MotionProvider<F>) -> Tracker {
    let nominal_ms = provider.update_interval() * 1000.0;
    let tracker: Tracker = Arc::new(Mutex::new((CadenceTracker::new(nominal_ms), None)));
    let sink = Arc::clone(&tracker);
    let _ = provider.subscribe(move |sample| {
        if let Ok(mut t) = sink.lock() {
            if let Some(report) = t.0.observe(sample.timestamp()) {
                t.1 = Some(report);
            }
        }
    });
    tracker
}

fn print_report(label: &str, tracker: &Tracker, nominal_ms: f64) {
    let Ok(t) = tracker.lock() else {
        return;
    };
    let Some(r) = t.1 else {
        println!("{label}: no intervals observed");
        return;
    };
    println!(
        "{label}: grade={} intervals={} jitter={:.3}ms late={} early={}",
        r.grade.as_str(),
        r.intervals,
        r.mean_jitter_ms,
        r.late,
        r.early,
    );
    println!(
        "  [{}]",
        t.0.sparkline_ascii(nominal_ms * 0.5, nominal_ms * 1.5)
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "motion_trace.json".into());

    // -- synthetic ---------------------------------------------------------
    let recorder = RecorderSink::new();
    let recording = recorder.recording();
    let synthetic = MotionProvider::builder(Unavailable)
        .update_interval(0.01)
        .trace_sink(recorder)
        .seed(7)
        .build();
    let synthetic_cadence = track(&synthetic);

    synthetic.start()?;
    println!("synthetic: mode={:?}", synthetic.mode());
    thread::sleep(RUN_TIME);
    synthetic.stop();
    if let Some(latest) = synthetic.latest_sample() {
        println!("synthetic: latest readings {:?}", latest.readings());
    }
    print_report("synthetic", &synthetic_cadence, 10.0);

    // -- simulated hardware -------------------------------------------------
    let hardware = MotionProvider::builder(SimulatedImu::default())
        .config(ProviderConfig::from_hz(50.0))
        .trace_sink(PrettyPrintSink::stderr().without_samples())
        .build();
    let hardware_cadence = track(&hardware);

    hardware.start()?;
    println!("hardware: mode={:?}", hardware.mode());
    thread::sleep(RUN_TIME);
    // Applies to the next session only.
    hardware.set_update_interval(0.01);
    thread::sleep(RUN_TIME);
    hardware.stop();
    print_report("hardware", &hardware_cadence, 20.0);

    // -- export ------------------------------------------------------------
    let bytes = recording.bytes();
    let mut writer = BufWriter::new(File::create(&path)?);
    motion_debug::json::export(&bytes, &mut writer)?;
    println!("Wrote {path} ({} bytes recorded)", bytes.len());
    Ok(())
}
