//! Reduced-motion policy and the animation configuration derived from it
//!
//! The policy mirrors the platform accessibility signal. It starts from the
//! signal's value, follows every change notification immediately and exposes
//! no manual override. Every motion subsystem subscribes to it and falls back
//! to its neutral state while reduced motion is requested.

use std::time::Duration;

use tracing::info;

use crate::config::{AnimationSettings, ProximityConfig, ReducedMotionSource};
use crate::publisher::{StatePublisher, Subscription};

/// Environment variable standing in for the OS accessibility signal
pub const REDUCED_MOTION_ENV: &str = "CEDROS_REDUCED_MOTION";

/// Source of the platform's reduced-motion preference
pub trait MotionSignal {
    /// Whether the platform currently asks for reduced motion
    fn prefers_reduced_motion(&self) -> bool;
}

/// Reads [`REDUCED_MOTION_ENV`]: `1`, `true`, `yes` or `reduce` mean reduced
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMotionSignal;

impl MotionSignal for EnvMotionSignal {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(REDUCED_MOTION_ENV)
            .map(|v| parse_signal_value(&v))
            .unwrap_or(false)
    }
}

/// Fixed signal value, for hosts without a platform signal
#[derive(Debug, Clone, Copy)]
pub struct StaticMotionSignal(pub bool);

impl MotionSignal for StaticMotionSignal {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

fn parse_signal_value(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "reduce"
    )
}

/// Pick the signal configured by `motion.reduced_motion`
pub fn signal_for(source: ReducedMotionSource) -> Box<dyn MotionSignal> {
    match source {
        ReducedMotionSource::System => Box::new(EnvMotionSignal),
        ReducedMotionSource::Reduce => Box::new(StaticMotionSignal(true)),
        ReducedMotionSource::NoPreference => Box::new(StaticMotionSignal(false)),
    }
}

/// Process-wide reduced-motion flag
#[derive(Debug, Clone)]
pub struct ReducedMotionPolicy {
    publisher: StatePublisher<bool>,
}

impl ReducedMotionPolicy {
    /// Initialize from the platform signal
    pub fn from_signal(signal: &dyn MotionSignal) -> Self {
        let reduced = signal.prefers_reduced_motion();
        info!(reduced, "reduced-motion preference initialized");
        Self {
            publisher: StatePublisher::new(reduced),
        }
    }

    /// Current preference
    #[inline]
    pub fn is_reduced(&self) -> bool {
        self.publisher.current()
    }

    /// Platform change notification. Publishes immediately, without debounce.
    pub fn on_platform_change(&self, reduced: bool) {
        if reduced == self.publisher.current() {
            return;
        }
        info!(reduced, "reduced-motion preference changed");
        self.publisher.publish(reduced);
    }

    /// Be told about every change of the preference
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.publisher.subscribe(move |reduced| listener(*reduced))
    }

    /// Derived animation configuration for presentation code
    pub fn animation_config(
        &self,
        settings: &AnimationSettings,
        proximity: &ProximityConfig,
    ) -> AnimationConfig {
        AnimationConfig::derive(self.is_reduced(), settings, proximity)
    }
}

/// Animation parameters handed to presentation code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    pub reduced_motion: bool,
    pub parallax_enabled: bool,
    pub entrance_duration: Duration,
    pub stagger_delay: Duration,
    pub ken_burns_speed: f64,
    pub magnetic_strength: f64,
}

impl AnimationConfig {
    /// Pure function of the preference and the configured timings
    pub fn derive(
        reduced_motion: bool,
        settings: &AnimationSettings,
        proximity: &ProximityConfig,
    ) -> Self {
        if reduced_motion {
            return Self {
                reduced_motion,
                parallax_enabled: false,
                entrance_duration: Duration::ZERO,
                stagger_delay: Duration::ZERO,
                ken_burns_speed: 0.0,
                magnetic_strength: 0.0,
            };
        }
        Self {
            reduced_motion,
            parallax_enabled: true,
            entrance_duration: Duration::from_millis(settings.entrance_duration_ms),
            stagger_delay: Duration::from_millis(settings.stagger_delay_ms),
            ken_burns_speed: settings.ken_burns_speed,
            magnetic_strength: proximity.strength,
        }
    }

    /// Delay before the `index`-th item of a staggered reveal starts
    pub fn reveal_delay(&self, index: usize) -> Duration {
        self.stagger_delay.saturating_mul(index as u32)
    }

    /// Reveal progress in [0, 1] of the `index`-th item, `elapsed` after the
    /// group entered the viewport
    pub fn reveal_progress(&self, index: usize, elapsed: Duration) -> f64 {
        let Some(since_start) = elapsed.checked_sub(self.reveal_delay(index)) else {
            return 0.0;
        };
        if self.entrance_duration.is_zero() {
            return 1.0;
        }
        (since_start.as_secs_f64() / self.entrance_duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Ken-burns zoom factor after `elapsed` of background playback (1.0 to 1.1)
    pub fn ken_burns_scale(&self, elapsed: Duration) -> f64 {
        if self.ken_burns_speed <= 0.0 {
            return 1.0;
        }
        // One 20s cycle zooms 1.0 -> 1.1, then restarts.
        let cycle = 0.1 / self.ken_burns_speed;
        let t = elapsed.as_secs_f64() % cycle;
        1.0 + t * self.ken_burns_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn settings() -> (AnimationSettings, ProximityConfig) {
        (AnimationSettings::default(), ProximityConfig::default())
    }

    #[test]
    fn test_initializes_from_signal() {
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(true));
        assert!(policy.is_reduced());
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        assert!(!policy.is_reduced());
    }

    #[test]
    fn test_change_notifies_immediately_and_only_on_flip() {
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let _sub = policy.subscribe(move |r| s.borrow_mut().push(r));
        policy.on_platform_change(true);
        policy.on_platform_change(true);
        policy.on_platform_change(false);

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!policy.is_reduced());
    }

    #[test]
    fn test_reduced_config_zeroes_durations() {
        let (anim, prox) = settings();
        let config = AnimationConfig::derive(true, &anim, &prox);
        assert!(config.reduced_motion);
        assert!(!config.parallax_enabled);
        assert_eq!(config.entrance_duration, Duration::ZERO);
        assert_eq!(config.stagger_delay, Duration::ZERO);
        assert_eq!(config.reveal_delay(5), Duration::ZERO);
        assert!((config.reveal_progress(3, Duration::ZERO) - 1.0).abs() < 1e-9);
        assert!((config.ken_burns_scale(Duration::from_secs(7)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_motion_config() {
        let (anim, prox) = settings();
        let config = AnimationConfig::derive(false, &anim, &prox);
        assert!(config.parallax_enabled);
        assert_eq!(config.entrance_duration, Duration::from_millis(800));
        assert_eq!(config.reveal_delay(3), Duration::from_millis(300));
        assert!((config.reveal_progress(1, Duration::from_millis(100))).abs() < 1e-9);
        assert!((config.reveal_progress(1, Duration::from_millis(500)) - 0.5).abs() < 1e-9);
        assert!((config.ken_burns_scale(Duration::from_secs(10)) - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_signal_values() {
        assert!(parse_signal_value("reduce"));
        assert!(parse_signal_value(" TRUE "));
        assert!(!parse_signal_value("no-preference"));
        assert!(!parse_signal_value(""));
    }
}
