//! Scroll-driven page sections: hero zoom, sticky feature list, navigation bar
//!
//! Pure derivations from the scroll snapshot, plus two small stateful
//! trackers that only notify when their visible state changes.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::parallax::LayerBounds;
use crate::publisher::{StatePublisher, Subscription};
use crate::scroll::ScrollEngine;

/// Fraction of the viewport cut from top and bottom to form the centre band
pub const CENTER_BAND_INSET: f64 = 0.4;

/// Intersection ratio a feature must exceed to become active
pub const FEATURE_ACTIVATION_RATIO: f64 = 0.5;

/// Progress through a section taller than the viewport, in [0, 1]
///
/// Zero when the section is not taller than the viewport or motion is reduced.
pub fn section_progress(
    scroll_y: f64,
    bounds: LayerBounds,
    viewport_height: f64,
    reduced_motion: bool,
) -> f64 {
    if reduced_motion {
        return 0.0;
    }
    let travel = bounds.height - viewport_height;
    if !(travel > 0.0) {
        return 0.0;
    }
    let p = (scroll_y - bounds.top) / travel;
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// Hero zoom-out transforms for a given section progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroTransforms {
    pub center_scale: f64,
    pub side_scale: f64,
    /// Horizontal push of the side images away from centre
    pub side_shift: f64,
    pub side_opacity: f64,
    pub title_opacity: f64,
    pub title_shift: f64,
}

impl HeroTransforms {
    pub fn at(progress: f64) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            center_scale: 1.0 + 1.5 * p,
            side_scale: 1.0 - 0.7 * p,
            side_shift: 100.0 * p,
            side_opacity: 1.0 - p,
            title_opacity: (1.0 - 1.5 * p).clamp(0.0, 1.0),
            title_shift: -50.0 * p,
        }
    }

    /// Resting transforms (progress 0)
    pub fn rest() -> Self {
        Self::at(0.0)
    }
}

/// Visible fraction of `feature` inside the centre band of the viewport
pub fn center_band_ratio(feature: LayerBounds, scroll_y: f64, viewport_height: f64) -> f64 {
    if !(feature.height > 0.0) {
        return 0.0;
    }
    let band_top = scroll_y + viewport_height * CENTER_BAND_INSET;
    let band_bottom = scroll_y + viewport_height * (1.0 - CENTER_BAND_INSET);
    let overlap = feature.bottom().min(band_bottom) - feature.top.max(band_top);
    if overlap > 0.0 {
        (overlap / feature.height).min(1.0)
    } else {
        0.0
    }
}

/// Tracks which feature block of a sticky list is active
///
/// A feature activates once more than half of it sits inside the centre
/// band. The last activated feature stays active while none qualifies.
#[derive(Debug, Clone)]
pub struct StickyFeatureTracker {
    features: Vec<(String, LayerBounds)>,
    active: Option<usize>,
}

impl StickyFeatureTracker {
    pub fn new(features: Vec<(String, LayerBounds)>) -> Self {
        Self {
            features,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.features.get(i))
            .map(|(id, _)| id.as_str())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn features(&self) -> &[(String, LayerBounds)] {
        &self.features
    }

    /// Replace measured feature bounds (after resize). Keeps the active id if it still exists.
    pub fn set_features(&mut self, features: Vec<(String, LayerBounds)>) {
        let active_id = self.active().map(str::to_string);
        self.features = features;
        self.active = active_id.and_then(|id| self.features.iter().position(|(f, _)| *f == id));
    }

    /// Re-evaluate at `scroll_y`. Returns true if the active feature changed.
    pub fn update(&mut self, scroll_y: f64, viewport_height: f64) -> bool {
        let qualifying = self.features.iter().rposition(|(_, bounds)| {
            center_band_ratio(*bounds, scroll_y, viewport_height) > FEATURE_ACTIVATION_RATIO
        });
        match qualifying {
            Some(index) if self.active != Some(index) => {
                self.active = Some(index);
                debug!(feature = %self.features[index].0, "active feature changed");
                true
            }
            _ => false,
        }
    }
}

/// Whether the navigation bar shows its scrolled style
///
/// Subscribes to the scroll engine and republishes only when the flag flips.
pub struct NavigationState {
    publisher: StatePublisher<bool>,
    _scroll: Subscription,
}

impl std::fmt::Debug for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationState")
            .field("is_scrolled", &self.publisher.current())
            .finish()
    }
}

impl NavigationState {
    pub fn activate(engine: &ScrollEngine, threshold: f64) -> Self {
        let publisher = StatePublisher::new(engine.snapshot().scroll_y > threshold);
        let flags = publisher.clone();
        let scroll = engine.subscribe(move |snapshot| {
            let scrolled = snapshot.scroll_y > threshold;
            if scrolled != flags.current() {
                flags.publish(scrolled);
            }
        });
        Self {
            publisher,
            _scroll: scroll,
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.publisher.current()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&bool) + 'static,
    {
        self.publisher.subscribe(listener)
    }
}

/// Sticky feature tracking wired to the scroll engine
pub struct StickyFeatures {
    tracker: Rc<RefCell<StickyFeatureTracker>>,
    viewport_height: Rc<RefCell<f64>>,
    _scroll: Subscription,
}

impl std::fmt::Debug for StickyFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickyFeatures")
            .field("tracker", &self.tracker.borrow())
            .finish()
    }
}

impl StickyFeatures {
    pub fn activate(
        features: Vec<(String, LayerBounds)>,
        viewport_height: f64,
        engine: &ScrollEngine,
    ) -> Self {
        let mut tracker = StickyFeatureTracker::new(features);
        tracker.update(engine.snapshot().scroll_y, viewport_height);
        let tracker = Rc::new(RefCell::new(tracker));
        let viewport = Rc::new(RefCell::new(viewport_height));

        let weak = Rc::downgrade(&tracker);
        let vh = Rc::downgrade(&viewport);
        let scroll = engine.subscribe(move |snapshot| {
            if let (Some(tracker), Some(vh)) = (weak.upgrade(), vh.upgrade()) {
                let viewport_height = *vh.borrow();
                tracker.borrow_mut().update(snapshot.scroll_y, viewport_height);
            }
        });

        Self {
            tracker,
            viewport_height: viewport,
            _scroll: scroll,
        }
    }

    pub fn active(&self) -> Option<String> {
        self.tracker.borrow().active().map(str::to_string)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.tracker.borrow().active_index()
    }

    pub fn on_resize(&self, features: Vec<(String, LayerBounds)>, viewport_height: f64, scroll_y: f64) {
        *self.viewport_height.borrow_mut() = viewport_height;
        let mut tracker = self.tracker.borrow_mut();
        tracker.set_features(features);
        tracker.update(scroll_y, viewport_height);
    }
}
