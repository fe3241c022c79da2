//! Phased progress: mapping elapsed wall-clock time onto a discrete cursor.
//!
//! Every animated phase (barrier build, platform build, teardown) derives its
//! target from the same two functions, so the cursors of all phases advance
//! by the same rule: `floor(clamp(t / D, 0, 1) * range)`.

use std::time::Duration;

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero duration is treated as already complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Number of steps out of `range` completed after `elapsed` of `duration`.
///
/// The result is always within `[0, range]`; a non-positive range yields 0.
#[allow(clippy::cast_possible_truncation)] // Bounded by `range` before the cast.
pub fn cursor(elapsed: Duration, duration: Duration, range: i32) -> i32 {
    if range <= 0 {
        return 0;
    }
    let steps = (progress(elapsed, duration) * f64::from(range)).floor();
    (steps as i32).clamp(0, range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn progress_is_clamped() {
        assert!((progress(ms(0), ms(2000))).abs() < f64::EPSILON);
        assert!((progress(ms(500), ms(2000)) - 0.25).abs() < f64::EPSILON);
        assert!((progress(ms(9000), ms(2000)) - 1.0).abs() < f64::EPSILON);
        assert!((progress(ms(5), Duration::ZERO) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shell_half_way_lands_on_center_layer() {
        // 51 layers for radius 25; halfway floors to 25 steps, i.e. layer 0.
        assert_eq!(cursor(ms(1000), ms(2000), 51) - 25, 0);
        assert_eq!(cursor(ms(2000), ms(2000), 51) - 25, 26);
    }

    #[test]
    fn cursor_never_exceeds_range() {
        assert_eq!(cursor(ms(10_000), ms(1000), 23), 23);
        assert_eq!(cursor(ms(0), ms(1000), 23), 0);
        assert_eq!(cursor(ms(100), ms(1000), 0), 0);
        assert_eq!(cursor(ms(100), ms(1000), -4), 0);
    }

    #[test]
    fn cursor_is_monotonic_in_elapsed_time() {
        let mut last = 0;
        for t in (0..3000).step_by(17).chain([3000]) {
            let c = cursor(ms(t), ms(3000), 51);
            assert!(c >= last);
            last = c;
        }
        assert_eq!(last, 51);
    }
}
