// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample cadence metrics and grading.
//!
//! [`CadenceTracker`] watches consecutive sample timestamps and compares the
//! spacing against the nominal update interval. Synthetic sessions should
//! always grade [`CadenceGrade::A`]; hardware sessions grade on how faithfully
//! the device kept its rate.

use motion_core::time::WallTime;

/// Letter grade for sample cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CadenceGrade {
    /// Tight spacing, almost no irregular intervals.
    A,
    /// Small jitter or occasional irregular intervals.
    B,
    /// Degraded but usable.
    C,
    /// Poor cadence.
    D,
}

impl CadenceGrade {
    /// Returns a short label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`CadenceTracker::observe`].
#[derive(Clone, Copy, Debug)]
pub struct CadenceReport {
    /// Current grade.
    pub grade: CadenceGrade,
    /// Mean absolute deviation from the nominal interval over the window, in
    /// ms.
    pub mean_jitter_ms: f64,
    /// Late plus early intervals per 1000 observed intervals.
    pub irregular_per_1000: f64,
    /// Total intervals observed.
    pub intervals: u64,
    /// Intervals longer than 1.5 × nominal.
    pub late: u64,
    /// Intervals shorter than 0.5 × nominal.
    pub early: u64,
}

/// Rolling cadence tracker with a fixed-size history of interval lengths.
#[derive(Debug)]
pub struct CadenceTracker<const N: usize> {
    nominal_ms: f64,
    deltas_ms: [f64; N],
    cursor: usize,
    last: Option<WallTime>,
    intervals: u64,
    late: u64,
    early: u64,
}

impl<const N: usize> CadenceTracker<N> {
    /// Creates a tracker for samples expected every `nominal_ms`
    /// milliseconds. The history starts filled with the nominal value.
    #[must_use]
    pub const fn new(nominal_ms: f64) -> Self {
        Self {
            nominal_ms,
            deltas_ms: [nominal_ms; N],
            cursor: 0,
            last: None,
            intervals: 0,
            late: 0,
            early: 0,
        }
    }

    /// Observes one sample timestamp.
    ///
    /// Returns `None` for the first timestamp, which has no interval yet.
    pub fn observe(&mut self, timestamp: WallTime) -> Option<CadenceReport> {
        let previous = self.last.replace(timestamp)?;
        let delta_ms = timestamp.saturating_duration_since(previous).as_secs_f64() * 1000.0;

        if N > 0 {
            self.deltas_ms[self.cursor] = delta_ms;
            self.cursor = (self.cursor + 1) % N;
        }
        self.intervals = self.intervals.saturating_add(1);
        if delta_ms > self.nominal_ms * 1.5 {
            self.late = self.late.saturating_add(1);
        } else if delta_ms < self.nominal_ms * 0.5 {
            self.early = self.early.saturating_add(1);
        }

        let mean_jitter_ms = self.mean_jitter_ms();
        let irregular = (self.late + self.early) as f64 * 1000.0 / self.intervals as f64;
        Some(CadenceReport {
            grade: grade_for(mean_jitter_ms / self.nominal_ms, irregular),
            mean_jitter_ms,
            irregular_per_1000: irregular,
            intervals: self.intervals,
            late: self.late,
            early: self.early,
        })
    }

    fn mean_jitter_ms(&self) -> f64 {
        if N == 0 {
            return 0.0;
        }
        let total: f64 = self
            .deltas_ms
            .iter()
            .map(|d| (d - self.nominal_ms).abs())
            .sum();
        total / N as f64
    }

    /// Returns the interval history oldest→newest, in ms.
    #[must_use]
    pub fn deltas(&self) -> [f64; N] {
        core::array::from_fn(|i| self.deltas_ms[(self.cursor + i) % N])
    }

    /// Returns an ASCII sparkline over [`deltas`](Self::deltas).
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let span = (max_ms - min_ms).max(f64::EPSILON);
        self.deltas()
            .iter()
            .map(|&v| {
                let t = (v.clamp(min_ms, max_ms) - min_ms) / span;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "index is clamped to ASCII level count"
                )]
                let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
                LEVELS[level.min(LEVELS.len() - 1)] as char
            })
            .collect()
    }
}

fn grade_for(jitter_ratio: f64, irregular_per_1000: f64) -> CadenceGrade {
    if jitter_ratio < 0.05 && irregular_per_1000 < 5.0 {
        CadenceGrade::A
    } else if jitter_ratio < 0.15 && irregular_per_1000 < 20.0 {
        CadenceGrade::B
    } else if jitter_ratio < 0.35 && irregular_per_1000 < 60.0 {
        CadenceGrade::C
    } else {
        CadenceGrade::D
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;

    const T0: WallTime = WallTime(1_000_000_000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_timestamp_has_no_report() {
        let mut t = CadenceTracker::<4>::new(10.0);
        assert!(t.observe(T0).is_none());
        assert!(t.observe(T0 + ms(10)).is_some());
    }

    #[test]
    fn exact_spacing_grades_a() {
        let mut t = CadenceTracker::<8>::new(10.0);
        let mut report = None;
        for i in 0..20 {
            report = t.observe(T0 + ms(10 * i));
        }
        let report = report.unwrap();
        assert_eq!(report.grade, CadenceGrade::A);
        assert_eq!(report.intervals, 19);
        assert!(report.mean_jitter_ms < 1e-9, "{report:?}");
    }

    #[test]
    fn gaps_count_as_late() {
        let mut t = CadenceTracker::<4>::new(10.0);
        let _ = t.observe(T0);
        let _ = t.observe(T0 + ms(10));
        let report = t.observe(T0 + ms(40)).unwrap();
        assert_eq!(report.late, 1);
        assert_eq!(report.early, 0);
        assert!((report.irregular_per_1000 - 500.0).abs() < 1e-6, "{report:?}");
        assert_eq!(report.grade, CadenceGrade::D);
    }

    #[test]
    fn sparkline_orders_oldest_first() {
        let mut t = CadenceTracker::<3>::new(10.0);
        let _ = t.observe(T0);
        let _ = t.observe(T0 + ms(0));
        let _ = t.observe(T0 + ms(20));
        assert_eq!(t.deltas(), [10.0, 0.0, 20.0]);
        assert_eq!(t.sparkline_ascii(0.0, 20.0), "+ @");
    }
}
