//! L4 Atomic Layer: easing curves for the smooth-scroll glide
//!
//! Every curve takes glide progress in [0, 1] and returns the eased fraction
//! of the distance covered, also in [0, 1].

pub use crate::config::EasingType;

/// Curve evaluation for [`EasingType`], which lives in config
pub trait EasingTypeExt {
    /// Eased fraction at progress `t`; NaN counts as finished
    fn apply(&self, t: f64) -> f64;
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        let rest = 1.0 - t;
        match self {
            // Step at the very end
            EasingType::None if t < 1.0 => 0.0,
            EasingType::None => 1.0,
            EasingType::Linear => t,
            EasingType::Cubic => 1.0 - rest.powi(3),
            EasingType::Quintic => 1.0 - rest.powi(5),
            // Reaches 1 a hair before t = 1 because of the 1.001 lead
            EasingType::ExponentialOut => (1.001 - 2.0_f64.powf(-10.0 * t)).min(1.0),
        }
    }
}
