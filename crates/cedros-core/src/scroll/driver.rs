//! L3 Molecular Layer: Virtual scroll driver
//!
//! Owns a virtual scroll position that glides toward a target with a fixed
//! easing curve over a bounded duration. Wheel input between two frames is
//! batched and applied on the next `advance()`.

use std::time::Duration;

use crate::frame::FrameTime;

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, lerp, progress};

/// Active glide state
#[derive(Debug, Clone)]
struct ActiveGlide {
    /// Frame time of the first advance; set lazily since input arrives between frames
    start: Option<FrameTime>,
    from: f64,
    to: f64,
    duration: Duration,
    easing: EasingType,
}

/// Virtual scroll position with eased interpolation toward a target
#[derive(Debug, Clone)]
pub struct VirtualScroll {
    glide: Option<ActiveGlide>,
    current: f64,
    limit: f64,
    duration: Duration,
    easing: EasingType,
    /// Wheel delta accumulated since the last frame
    pending_delta: f64,
}

impl VirtualScroll {
    pub fn new(duration: Duration, easing: EasingType, limit: f64) -> Self {
        Self {
            glide: None,
            current: 0.0,
            limit: limit.max(0.0),
            duration,
            easing,
            pending_delta: 0.0,
        }
    }

    /// Check if a glide is currently active
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.glide.is_some()
    }

    /// Check if the next advance has work to do
    #[inline]
    pub fn needs_update(&self) -> bool {
        self.glide.is_some() || self.pending_delta != 0.0
    }

    /// Current interpolated position
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Final position once the active glide completes
    pub fn target(&self) -> f64 {
        self.glide.as_ref().map(|g| g.to).unwrap_or(self.current)
    }

    #[inline]
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Update the scrollable limit (after a resize) and clamp positions into it
    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.current = self.current.clamp(0.0, self.limit);
        if let Some(glide) = self.glide.as_mut() {
            glide.to = glide.to.clamp(0.0, self.limit);
        }
    }

    /// Set position immediately, dropping any glide and batched input
    pub fn jump_to(&mut self, position: f64) {
        self.glide = None;
        self.pending_delta = 0.0;
        self.current = self.clamp(position);
    }

    /// Start a glide to `target` from the current visible position
    pub fn scroll_to(&mut self, target: f64) {
        let target = self.clamp(target);
        self.pending_delta = 0.0;
        if target == self.current || self.duration.is_zero() {
            self.jump_to(target);
            return;
        }
        self.glide = Some(ActiveGlide {
            start: None,
            from: self.current,
            to: target,
            duration: self.duration,
            easing: self.easing,
        });
    }

    /// Queue a relative move; several calls within one frame batch together
    pub fn scroll_by(&mut self, delta: f64) {
        if delta.is_finite() {
            self.pending_delta += delta;
        }
    }

    /// Jump to the end of the current glide
    pub fn finish(&mut self) {
        let target = self.clamp(self.target() + self.pending_delta);
        self.jump_to(target);
    }

    /// Advance to frame time `now`. Returns true if the position changed.
    pub fn advance(&mut self, now: FrameTime) -> bool {
        let before = self.current;

        if self.pending_delta != 0.0 {
            let target = self.clamp(self.target() + self.pending_delta);
            self.pending_delta = 0.0;
            if target != self.current {
                self.glide = Some(ActiveGlide {
                    start: Some(now),
                    from: self.current,
                    to: target,
                    duration: self.duration,
                    easing: self.easing,
                });
            } else {
                self.glide = None;
            }
        }

        if let Some(glide) = self.glide.as_mut() {
            let start = *glide.start.get_or_insert(now);
            if is_complete(start, now, glide.duration) {
                self.current = glide.to;
                self.glide = None;
            } else {
                let t = glide.easing.apply(progress(start, now, glide.duration));
                self.current = lerp(glide.from, glide.to, t);
            }
        }

        self.current != before
    }

    fn clamp(&self, position: f64) -> f64 {
        if position.is_nan() {
            return 0.0;
        }
        position.clamp(0.0, self.limit)
    }
}
