//! Keyframed scalar curves and their sampler.
//!
//! A curve is a non-empty, strictly time-ordered list of keys. Ordering is
//! checked once on construction so the sampler's bisection can rely on it.

use glam::Vec3;

use crate::animation::key::{AnimCurveKey, ConstantMode, Interpolation};
use crate::animation::time::{TimeSpan, Ticks, seconds_to_ticks};
use crate::errors::{PoseError, Result};

/// A single animated channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimCurve {
    keys: Vec<AnimCurveKey>,
}

impl AnimCurve {
    /// Wraps `keys`, which must be non-empty with strictly increasing times.
    pub fn new(keys: Vec<AnimCurveKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(PoseError::EmptyCurve);
        }
        if let Some(index) = keys.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(PoseError::UnsortedKeyframes {
                index: index + 1,
                previous: keys[index].time,
                current: keys[index + 1].time,
            });
        }
        Ok(Self { keys })
    }

    /// Sorts `keys` by time before validating. Duplicate times are still
    /// rejected.
    pub fn from_unsorted(mut keys: Vec<AnimCurveKey>) -> Result<Self> {
        keys.sort_by_key(|key| key.time);
        Self::new(keys)
    }

    /// A one-key curve holding `value` at tick 0.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![AnimCurveKey::new(0, value)],
        }
    }

    /// Linear keys from `(time, value)` pairs.
    pub fn linear(points: &[(Ticks, f32)]) -> Result<Self> {
        Self::new(
            points
                .iter()
                .map(|&(time, value)| AnimCurveKey::new(time, value))
                .collect(),
        )
    }

    #[inline]
    #[must_use]
    pub fn keys(&self) -> &[AnimCurveKey] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ticks covered by the keys.
    #[must_use]
    pub fn time_span(&self) -> TimeSpan {
        TimeSpan::new(self.keys[0].time, self.keys[self.keys.len() - 1].time)
    }

    /// True when every key holds exactly `value`.
    #[must_use]
    pub fn is_constant_at(&self, value: f32) -> bool {
        self.keys.iter().all(|key| key.value == value)
    }

    /// Value at `time`, clamped to the first and last keys.
    #[must_use]
    pub fn sample(&self, time: Ticks) -> f32 {
        let first = &self.keys[0];
        if time <= first.time {
            return first.value;
        }
        let last = &self.keys[self.keys.len() - 1];
        if time >= last.time {
            return last.value;
        }

        let left = match self.locate(time) {
            Ok(exact) => return self.keys[exact].value,
            Err(left) => left,
        };
        let k0 = &self.keys[left];
        let k1 = &self.keys[left + 1];

        if k0.flags.interpolation() == Some(Interpolation::Constant) {
            return match k0.flags.constant_mode() {
                ConstantMode::Standard => k0.value,
                ConstantMode::Next => k1.value,
            };
        }

        let u = (time - k0.time) as f64 / (k1.time - k0.time) as f64;
        (f64::from(k0.value) * (1.0 - u) + f64::from(k1.value) * u) as f32
    }

    /// Value at `seconds`, rounded to the nearest tick.
    #[must_use]
    pub fn sample_seconds(&self, seconds: f64) -> f32 {
        self.sample(seconds_to_ticks(seconds))
    }

    /// Multiplies every key value by `factor`. Tangent data is left as is.
    pub fn scale_values(&mut self, factor: f32) {
        for key in &mut self.keys {
            key.value *= factor;
        }
    }

    /// Bisects for `time`, which must lie strictly inside the key range.
    ///
    /// Returns `Ok(i)` when key `i` sits exactly on `time`, otherwise
    /// `Err(i)` with `keys[i].time < time < keys[i + 1].time`.
    fn locate(&self, time: Ticks) -> std::result::Result<usize, usize> {
        let mut left = 0;
        let mut right = self.keys.len() - 1;
        while right - left > 1 {
            let mid = left + (right - left) / 2;
            let mid_time = self.keys[mid].time;
            if mid_time == time {
                return Ok(mid);
            }
            if mid_time < time {
                left = mid;
            } else {
                right = mid;
            }
        }
        Err(left)
    }
}

/// Three independent X/Y/Z channels of one transform component.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimCurve3 {
    pub x: AnimCurve,
    pub y: AnimCurve,
    pub z: AnimCurve,
}

impl AnimCurve3 {
    #[must_use]
    pub fn new(x: AnimCurve, y: AnimCurve, z: AnimCurve) -> Self {
        Self { x, y, z }
    }

    /// One-key channels holding `value`.
    #[must_use]
    pub fn constant(value: Vec3) -> Self {
        Self::new(
            AnimCurve::constant(value.x),
            AnimCurve::constant(value.y),
            AnimCurve::constant(value.z),
        )
    }

    #[must_use]
    pub fn sample(&self, time: Ticks) -> Vec3 {
        Vec3::new(self.x.sample(time), self.y.sample(time), self.z.sample(time))
    }

    #[must_use]
    pub fn sample_seconds(&self, seconds: f64) -> Vec3 {
        self.sample(seconds_to_ticks(seconds))
    }

    /// True when all three channels only ever hold `value`.
    #[must_use]
    pub fn is_constant_at(&self, value: f32) -> bool {
        self.x.is_constant_at(value) && self.y.is_constant_at(value) && self.z.is_constant_at(value)
    }

    /// Union of the three channels' spans.
    #[must_use]
    pub fn time_span(&self) -> TimeSpan {
        let spans = [self.x.time_span(), self.y.time_span(), self.z.time_span()];
        TimeSpan::new(
            spans.iter().map(|s| s.start).min().unwrap_or(0),
            spans.iter().map(|s| s.stop).max().unwrap_or(0),
        )
    }

    pub fn scale_values(&mut self, factor: f32) {
        self.x.scale_values(factor);
        self.y.scale_values(factor);
        self.z.scale_values(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::key::KeyFlags;

    #[test]
    fn test_locate_brackets_from_left() {
        let curve = AnimCurve::linear(&[(0, 0.0), (10, 1.0), (20, 2.0), (30, 3.0), (40, 4.0)]).unwrap();
        assert_eq!(curve.locate(5), Err(0));
        assert_eq!(curve.locate(15), Err(1));
        assert_eq!(curve.locate(35), Err(3));
        assert_eq!(curve.locate(20), Ok(2));
    }

    #[test]
    fn test_constant_interpolation_holds() {
        let mut step = AnimCurveKey::new(0, 1.0);
        step.flags = KeyFlags::INTERPOLATION_CONSTANT;
        let curve = AnimCurve::new(vec![step, AnimCurveKey::new(10, 5.0)]).unwrap();
        assert_eq!(curve.sample(9), 1.0);
        assert_eq!(curve.sample(10), 5.0);

        let mut next = step;
        next.flags.set_constant_mode(ConstantMode::Next);
        let curve = AnimCurve::new(vec![next, AnimCurveKey::new(10, 5.0)]).unwrap();
        assert_eq!(curve.sample(1), 5.0);
    }

    #[test]
    fn test_rejects_bad_key_order() {
        assert!(matches!(AnimCurve::new(Vec::new()), Err(PoseError::EmptyCurve)));
        let err = AnimCurve::linear(&[(0, 0.0), (10, 1.0), (10, 2.0)]).unwrap_err();
        assert!(matches!(err, PoseError::UnsortedKeyframes { index: 2, .. }));
        assert!(AnimCurve::from_unsorted(vec![AnimCurveKey::new(10, 1.0), AnimCurveKey::new(0, 0.0)]).is_ok());
    }
}
