//! L4 Atomic Layer: Scroll snapshot and its derivation rules

use serde::Serialize;

/// Vertical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

/// Document and viewport heights the progress is normalized against
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DocumentMetrics {
    /// Full scrollable height of the document
    pub scroll_height: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
}

impl DocumentMetrics {
    pub fn new(scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_height,
            viewport_height,
        }
    }

    /// Largest reachable scrollY; 0 when the document is not scrollable
    #[inline]
    pub fn max_scroll(&self) -> f64 {
        let max = self.scroll_height - self.viewport_height;
        if max.is_finite() && max > 0.0 {
            max
        } else {
            0.0
        }
    }

    /// Clamp a position into [0, max_scroll]
    #[inline]
    pub fn clamp(&self, scroll_y: f64) -> f64 {
        if scroll_y.is_nan() {
            return 0.0;
        }
        scroll_y.clamp(0.0, self.max_scroll())
    }
}

/// Normalized scroll progress in [0, 1]
///
/// Resolves to 0, never NaN or infinity, when the document is not scrollable.
pub fn progress(scroll_y: f64, metrics: &DocumentMetrics) -> f64 {
    let max = metrics.max_scroll();
    if max <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / max).clamp(0.0, 1.0)
}

/// Read-only scroll state published once per frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollSnapshot {
    pub progress: f64,
    pub direction: ScrollDirection,
    pub scroll_y: f64,
}

impl ScrollSnapshot {
    /// Snapshot following `self` once the position is `scroll_y`
    ///
    /// Direction comes from the delta against `self.scroll_y`; an unchanged
    /// position keeps the previous direction.
    pub fn next(&self, scroll_y: f64, metrics: &DocumentMetrics) -> Self {
        let direction = if scroll_y > self.scroll_y {
            ScrollDirection::Down
        } else if scroll_y < self.scroll_y {
            ScrollDirection::Up
        } else {
            self.direction
        };
        Self {
            progress: progress(scroll_y, metrics),
            direction,
            scroll_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_bounded() {
        let metrics = DocumentMetrics::new(3000.0, 1000.0);
        for y in [-500.0, 0.0, 1000.0, 2000.0, 9000.0] {
            let p = progress(y, &metrics);
            assert!((0.0..=1.0).contains(&p), "progress {p} for y={y}");
        }
        assert!((progress(1000.0, &metrics) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_progress_zero_when_not_scrollable() {
        for metrics in [
            DocumentMetrics::new(800.0, 1000.0),
            DocumentMetrics::new(1000.0, 1000.0),
            DocumentMetrics::new(0.0, 0.0),
        ] {
            assert_eq!(progress(0.0, &metrics), 0.0);
            assert_eq!(progress(250.0, &metrics), 0.0);
        }
    }

    #[test]
    fn test_direction_from_delta() {
        let metrics = DocumentMetrics::new(5000.0, 1000.0);
        let start = ScrollSnapshot::default();
        let down = start.next(100.0, &metrics);
        assert_eq!(down.direction, ScrollDirection::Down);
        let up = down.next(40.0, &metrics);
        assert_eq!(up.direction, ScrollDirection::Up);
        let same = up.next(40.0, &metrics);
        assert_eq!(same.direction, ScrollDirection::Up);
        let same_again = down.next(100.0, &metrics);
        assert_eq!(same_again.direction, ScrollDirection::Down);
    }

    #[test]
    fn test_clamp_handles_nan() {
        let metrics = DocumentMetrics::new(2000.0, 500.0);
        assert_eq!(metrics.clamp(f64::NAN), 0.0);
        assert_eq!(metrics.clamp(1e9), 1500.0);
    }
}
