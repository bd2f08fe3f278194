// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Motion readings and timestamped samples.
//!
//! A [`Motion`] is the six scalar readings of one tick (linear acceleration
//! and rotation rate on three axes) with no time attached. Attaching a
//! [`WallTime`] with [`Motion::at`] produces a [`Sample`], the immutable value
//! published to subscribers.

use crate::time::WallTime;

/// Three readings along the x, y and z axes.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Axes {
    /// Reading along x.
    pub x: f64,
    /// Reading along y.
    pub y: f64,
    /// Reading along z.
    pub z: f64,
}

impl Axes {
    /// All three axes at zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a triple from its components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the components as `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Axes {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One tick's worth of motion readings, not yet placed in time.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Motion {
    /// Linear acceleration.
    pub acceleration: Axes,
    /// Angular rotation rate.
    pub rotation_rate: Axes,
}

impl Motion {
    /// Creates a reading from its acceleration and rotation-rate triples.
    #[inline]
    #[must_use]
    pub const fn new(acceleration: Axes, rotation_rate: Axes) -> Self {
        Self {
            acceleration,
            rotation_rate,
        }
    }

    /// Stamps this reading, producing a [`Sample`].
    #[inline]
    #[must_use]
    pub const fn at(self, timestamp: WallTime) -> Sample {
        Sample {
            timestamp,
            motion: self,
        }
    }
}

/// A timestamped six-axis motion reading.
///
/// Samples compare by value. They are published in non-decreasing timestamp
/// order within a session, but `Sample` itself does not implement ordering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    timestamp: WallTime,
    motion: Motion,
}

impl Sample {
    /// Creates a sample.
    #[inline]
    #[must_use]
    pub const fn new(timestamp: WallTime, acceleration: Axes, rotation_rate: Axes) -> Self {
        Motion::new(acceleration, rotation_rate).at(timestamp)
    }

    /// The wall-clock instant this sample is attributed to.
    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> WallTime {
        self.timestamp
    }

    /// The readings without the timestamp.
    #[inline]
    #[must_use]
    pub const fn motion(&self) -> Motion {
        self.motion
    }

    /// Linear acceleration.
    #[inline]
    #[must_use]
    pub const fn acceleration(&self) -> Axes {
        self.motion.acceleration
    }

    /// Angular rotation rate.
    #[inline]
    #[must_use]
    pub const fn rotation_rate(&self) -> Axes {
        self.motion.rotation_rate
    }

    /// All six readings, acceleration first: `[acc_x, acc_y, acc_z, rot_x,
    /// rot_y, rot_z]`.
    #[must_use]
    pub const fn readings(&self) -> [f64; 6] {
        let a = self.motion.acceleration;
        let r = self.motion.rotation_rate;
        [a.x, a.y, a.z, r.x, r.y, r.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_acceleration_then_rotation() {
        let s = Sample::new(
            WallTime(7),
            Axes::new(1.0, 2.0, 3.0),
            Axes::from([4.0, 5.0, 6.0]),
        );
        assert_eq!(s.readings(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(s.timestamp(), WallTime(7));
    }

    #[test]
    fn at_replaces_nothing_but_time() {
        let m = Motion::new(Axes::new(0.5, -0.5, 0.0), Axes::ZERO);
        let a = m.at(WallTime(1));
        let b = m.at(WallTime(2));
        assert_eq!(a.motion(), b.motion());
        assert_ne!(a, b);
    }
}
