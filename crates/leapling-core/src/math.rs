//! Scalar interpolation helpers used alongside [`glam::Vec2`].

/// Tolerance for float comparisons in gameplay code.
pub const EPSILON: f32 = 0.0001;

/// Returns `true` if `a` and `b` differ by at most `epsilon`.
#[must_use]
pub fn close(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Returns -1, 0 or 1. Unlike [`f32::signum`], zero maps to zero.
#[must_use]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Linear interpolation from `start` to `target` over `duration` seconds.
///
/// Clamps to `start` before the interval and `target` after it.
#[must_use]
pub fn lerp(start: f32, target: f32, duration: f32, time_since_start: f32) -> f32 {
    if time_since_start <= 0.0 {
        start
    } else if time_since_start >= duration {
        target
    } else {
        start + (target - start) * (time_since_start / duration)
    }
}

/// Cubic ease-in/ease-out from `start` to `target` over `duration` seconds.
///
/// The first half accelerates along `t³`, the second half mirrors it, so the
/// value passes the midpoint exactly at `duration / 2`.
#[must_use]
pub fn ease(start: f32, target: f32, duration: f32, time_since_start: f32) -> f32 {
    if time_since_start <= 0.0 {
        return start;
    }
    if time_since_start >= duration {
        return target;
    }

    let half_range = (target - start) / 2.0;
    let percent = time_since_start / (duration / 2.0);
    if percent < 1.0 {
        start + half_range * percent * percent * percent
    } else {
        let shifted = percent - 2.0;
        start + half_range * (shifted * shifted * shifted + 2.0)
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
#[must_use]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + sign(target - current) * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_clamps_outside_interval() {
        assert_eq!(lerp(0.0, 10.0, 2.0, -1.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 2.0, 1.0), 5.0);
        assert_eq!(lerp(0.0, 10.0, 2.0, 5.0), 10.0);
    }

    #[test]
    fn ease_hits_endpoints_and_midpoint() {
        assert_eq!(ease(1.0, 0.5, 0.5, 0.0), 1.0);
        assert!(close(ease(1.0, 0.5, 0.5, 0.25), 0.75, EPSILON));
        assert_eq!(ease(1.0, 0.5, 0.5, 0.5), 0.5);
    }

    #[test]
    fn ease_is_slow_at_the_start() {
        let early = ease(0.0, 1.0, 1.0, 0.1);
        assert!(early < lerp(0.0, 1.0, 1.0, 0.1));
    }

    #[test]
    fn approach_never_overshoots() {
        assert_eq!(approach(0.0, 10.0, 3.0), 3.0);
        assert_eq!(approach(9.0, 10.0, 3.0), 10.0);
        assert_eq!(approach(0.0, -10.0, 4.0), -4.0);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
    }
}
