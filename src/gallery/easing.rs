//! Easing curves and time-driven tweens.

use std::time::Duration;

/// Cubic ease-out: fast start, gentle landing. `t` is clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Linear interpolation between `from` and `to`.
#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Fraction of `duration` elapsed between `start` and `now`, in `[0, 1]`.
///
/// A zero duration is complete immediately.
#[must_use]
pub fn progress(start: Duration, now: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(start);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}

/// A scalar animated from `from` to `to` with [`ease_out_cubic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    start: Duration,
    duration: Duration,
}

impl Tween {
    #[must_use]
    pub fn new(from: f64, to: f64, start: Duration, duration: Duration) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    /// Eased value at `now`.
    #[must_use]
    pub fn value_at(&self, now: Duration) -> f64 {
        lerp(self.from, self.to, ease_out_cubic(self.progress(now)))
    }

    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        progress(self.start, now, self.duration)
    }

    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.0), 1.0);
        // Ease-out is ahead of linear in the first half.
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_tween_progression() {
        let tween = Tween::new(100.0, 500.0, ms(1000), ms(600));
        assert_eq!(tween.value_at(ms(0)), 100.0);
        assert_eq!(tween.value_at(ms(1000)), 100.0);
        assert_eq!(tween.value_at(ms(1600)), 500.0);
        assert_eq!(tween.value_at(ms(9000)), 500.0);

        let mid = tween.value_at(ms(1300));
        assert!(mid > 300.0 && mid < 500.0);
        assert!(!tween.is_finished(ms(1599)));
        assert!(tween.is_finished(ms(1600)));
    }

    #[test]
    fn test_zero_duration() {
        let tween = Tween::new(0.0, 10.0, ms(5), Duration::ZERO);
        assert!(tween.is_finished(ms(5)));
        assert_eq!(tween.value_at(ms(5)), 10.0);
    }

    proptest::proptest! {
        #[test]
        fn prop_ease_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            proptest::prop_assert!(ease_out_cubic(lo) <= ease_out_cubic(hi));
        }
    }
}
