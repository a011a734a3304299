//! L4 Atomic Layer: frame-time arithmetic shared by the glide and the carousel

use std::time::Duration;

use crate::frame::FrameTime;

/// Fraction of `duration` elapsed between `start` and `now`, in [0, 1]
///
/// Zero-length glides are done at once. Frames stamped before `start`
/// report 0.
#[inline]
pub fn progress(start: FrameTime, now: FrameTime, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(start);
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Whether a glide begun at `start` has run its full `duration` by `now`
#[inline]
pub fn is_complete(start: FrameTime, now: FrameTime, duration: Duration) -> bool {
    now.saturating_sub(start) >= duration
}

/// `from` moved towards `to` by fraction `t`
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Milliseconds between two frame times, zero if `later` is not after `earlier`
#[inline]
pub fn elapsed_ms(earlier: FrameTime, later: FrameTime) -> f64 {
    later.saturating_sub(earlier).as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(20.0, 10.0, 1.0) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_progress() {
        let start = Duration::from_millis(100);
        let d = Duration::from_millis(200);
        assert_eq!(progress(start, Duration::from_millis(50), d), 0.0);
        assert!((progress(start, Duration::from_millis(200), d) - 0.5).abs() < 1e-9);
        assert_eq!(progress(start, Duration::from_millis(900), d), 1.0);
        assert!(is_complete(start, Duration::from_millis(300), d));
        assert!(!is_complete(start, Duration::from_millis(299), d));
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(Duration::ZERO, Duration::ZERO, Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_elapsed_ms_never_negative() {
        assert_eq!(elapsed_ms(Duration::from_millis(10), Duration::from_millis(5)), 0.0);
        assert!((elapsed_ms(Duration::ZERO, Duration::from_millis(16)) - 16.0).abs() < 1e-9);
    }
}
