//! Piecewise-linear response curve sampled by the jetpack thrust model.

use serde::{Deserialize, Serialize};
use strider_config::CurveKey;

/// Time → value curve with linear interpolation and clamped ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Builds a curve from keys; they are sorted by time.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Samples the curve. Empty curves evaluate to zero.
    pub fn sample(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; the bounds checks above keep it in 1..len.
        let upper = self.keys.partition_point(|k| k.time <= time);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= f32::EPSILON {
            return b.value;
        }
        a.value + (b.value - a.value) * ((time - a.time) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: f32, value: f32) -> CurveKey {
        CurveKey { time, value }
    }

    #[test]
    fn test_empty_curve_is_zero() {
        assert_eq!(ResponseCurve::new(Vec::new()).sample(1.0), 0.0);
    }

    #[test]
    fn test_clamps_outside_key_range() {
        let curve = ResponseCurve::new(vec![key(0.0, 0.25), key(1.0, 1.0)]);
        assert_eq!(curve.sample(-3.0), 0.25);
        assert_eq!(curve.sample(7.0), 1.0);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let curve = ResponseCurve::new(vec![key(0.0, 0.0), key(2.0, 1.0), key(4.0, 0.0)]);
        assert!((curve.sample(1.0) - 0.5).abs() < 1e-6);
        assert!((curve.sample(3.0) - 0.5).abs() < 1e-6);
        assert_eq!(curve.sample(2.0), 1.0);
    }

    #[test]
    fn test_unsorted_keys_are_sorted() {
        let curve = ResponseCurve::new(vec![key(1.0, 1.0), key(0.0, 0.0)]);
        assert!((curve.sample(0.5) - 0.5).abs() < 1e-6);
    }
}
