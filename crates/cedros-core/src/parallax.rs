//! Parallax projection
//!
//! `offset = (scrollY - anchorTop) * (1 - speed)`. A layer with speed 0 stays
//! pinned to the viewport, speed 1 scrolls with the page. Anchors are measured
//! on activation and on resize only, since section heights are static.
//! Offsets are only recomputed while a layer intersects the viewport (plus a
//! margin) and are pinned to 0 under reduced motion.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::motion::ReducedMotionPolicy;
use crate::publisher::Subscription;
use crate::scroll::{ScrollEngine, ScrollSnapshot};

/// Parallax offset for one layer. Pure.
#[inline]
pub fn project_offset(scroll_y: f64, anchor_top: f64, speed: f64) -> f64 {
    let offset = (scroll_y - anchor_top) * (1.0 - speed);
    if offset.is_finite() {
        offset
    } else {
        0.0
    }
}

/// Vertical extent of an element in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerBounds {
    pub top: f64,
    pub height: f64,
}

impl LayerBounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Viewport intersection test with a symmetric margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionTracker {
    margin: f64,
}

impl IntersectionTracker {
    pub fn new(margin: f64) -> Self {
        Self {
            margin: margin.max(0.0),
        }
    }

    /// Whether `bounds` overlaps the viewport grown by the margin
    pub fn intersects(&self, bounds: &LayerBounds, scroll_y: f64, viewport_height: f64) -> bool {
        let view_top = scroll_y - self.margin;
        let view_bottom = scroll_y + viewport_height + self.margin;
        bounds.bottom() > view_top && bounds.top < view_bottom
    }
}

/// Static description of a parallax layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayerSpec {
    pub id: String,
    pub image_src: String,
    /// 0.0 (fixed to the viewport) to 1.0 (normal scroll)
    pub speed: f64,
    pub z_index: i32,
}

impl ParallaxLayerSpec {
    pub fn validate(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.speed) {
            return Err(crate::Error::InvalidLayer {
                id: self.id.clone(),
                reason: format!("speed {} outside [0, 1]", self.speed),
            });
        }
        Ok(())
    }
}

/// Runtime state of one layer
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayerState {
    pub spec: ParallaxLayerSpec,
    pub bounds: LayerBounds,
    /// Captured on activation and on resize
    pub anchor_top: f64,
    pub visible: bool,
    pub offset: f64,
}

impl ParallaxLayerState {
    fn new(spec: ParallaxLayerSpec, bounds: LayerBounds) -> Self {
        Self {
            spec,
            anchor_top: bounds.top,
            bounds,
            visible: false,
            offset: 0.0,
        }
    }
}

struct ProjectorState {
    layers: Vec<ParallaxLayerState>,
    tracker: IntersectionTracker,
    viewport_height: f64,
    reduced: bool,
    active: bool,
    last_scroll_y: f64,
    recomputed: u64,
}

impl ProjectorState {
    fn apply(&mut self, snapshot: &ScrollSnapshot) {
        self.last_scroll_y = snapshot.scroll_y;
        for layer in &mut self.layers {
            layer.visible =
                self.tracker
                    .intersects(&layer.bounds, snapshot.scroll_y, self.viewport_height);
        }
        if self.reduced {
            for layer in &mut self.layers {
                layer.offset = 0.0;
            }
            return;
        }
        for layer in &mut self.layers {
            if !layer.visible {
                continue;
            }
            layer.offset = project_offset(snapshot.scroll_y, layer.anchor_top, layer.spec.speed);
            self.recomputed += 1;
        }
    }
}

/// Parallax consumer of the scroll engine for one section's layers
pub struct ParallaxProjector {
    state: Rc<RefCell<ProjectorState>>,
    scroll: Option<Subscription>,
    motion: Option<Subscription>,
}

impl std::fmt::Debug for ParallaxProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ParallaxProjector")
            .field("layers", &state.layers.len())
            .field("active", &state.active)
            .finish()
    }
}

impl ParallaxProjector {
    /// Measure anchors and subscribe to scroll snapshots
    ///
    /// Layers with an invalid speed are kept but pinned (speed 1, no motion).
    pub fn activate(
        layers: Vec<(ParallaxLayerSpec, LayerBounds)>,
        viewport_height: f64,
        margin: f64,
        engine: &ScrollEngine,
        policy: &ReducedMotionPolicy,
    ) -> Self {
        let layers = layers
            .into_iter()
            .map(|(mut spec, bounds)| {
                if let Err(e) = spec.validate() {
                    warn!("{e}; rendering layer static");
                    spec.speed = 1.0;
                }
                ParallaxLayerState::new(spec, bounds)
            })
            .collect();

        let state = Rc::new(RefCell::new(ProjectorState {
            layers,
            tracker: IntersectionTracker::new(margin),
            viewport_height,
            reduced: policy.is_reduced(),
            active: true,
            last_scroll_y: 0.0,
            recomputed: 0,
        }));
        // Initial projection against whatever was last published
        state.borrow_mut().apply(&engine.snapshot());

        let weak = Rc::downgrade(&state);
        let scroll = engine.subscribe(move |snapshot| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                if state.active {
                    state.apply(snapshot);
                }
            }
        });

        let weak = Rc::downgrade(&state);
        let motion = policy.subscribe(move |reduced| {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                if !state.active {
                    return;
                }
                state.reduced = reduced;
                // Re-project at the last known position in both directions
                let snapshot = ScrollSnapshot {
                    scroll_y: state.last_scroll_y,
                    ..Default::default()
                };
                state.apply(&snapshot);
            }
        });

        debug!(layers = state.borrow().layers.len(), "parallax projector activated");
        Self {
            state,
            scroll: Some(scroll),
            motion: Some(motion),
        }
    }

    /// Current offset of layer `id`; 0 for unknown ids
    pub fn offset(&self, id: &str) -> f64 {
        self.state
            .borrow()
            .layers
            .iter()
            .find(|l| l.spec.id == id)
            .map(|l| l.offset)
            .unwrap_or(0.0)
    }

    /// Snapshot of every layer in declaration order
    pub fn layers(&self) -> Vec<ParallaxLayerState> {
        self.state.borrow().layers.clone()
    }

    /// Number of offset evaluations performed (visible layers only)
    pub fn recompute_count(&self) -> u64 {
        self.state.borrow().recomputed
    }

    /// Re-measure anchors after a resize
    ///
    /// `bounds` is looked up by layer id; layers not listed keep their anchor.
    pub fn on_resize<'a, I>(&self, viewport_height: f64, bounds: I)
    where
        I: IntoIterator<Item = (&'a str, LayerBounds)>,
    {
        let mut state = self.state.borrow_mut();
        if !state.active {
            return;
        }
        state.viewport_height = viewport_height;
        for (id, b) in bounds {
            if let Some(layer) = state.layers.iter_mut().find(|l| l.spec.id == id) {
                layer.bounds = b;
                layer.anchor_top = b.top;
            }
        }
        let snapshot = ScrollSnapshot {
            scroll_y: state.last_scroll_y,
            ..Default::default()
        };
        state.apply(&snapshot);
    }

    /// Detach from the scroll engine and the motion policy
    pub fn deactivate(&mut self) {
        self.state.borrow_mut().active = false;
        self.scroll.take();
        self.motion.take();
    }
}

impl Drop for ParallaxProjector {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollConfig;
    use crate::frame::FrameScheduler;
    use crate::motion::StaticMotionSignal;
    use crate::scroll::DocumentMetrics;
    use std::time::Duration;

    fn layer(id: &str, speed: f64) -> ParallaxLayerSpec {
        ParallaxLayerSpec {
            id: id.to_string(),
            image_src: format!("{id}.jpg"),
            speed,
            z_index: 0,
        }
    }

    fn raw_engine(
        scheduler: &FrameScheduler,
        policy: &ReducedMotionPolicy,
    ) -> ScrollEngine {
        let config = ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        };
        ScrollEngine::activate(&config, DocumentMetrics::new(10_000.0, 1000.0), scheduler, policy)
    }

    #[test]
    fn test_speed_one_never_moves() {
        for scroll_y in [0.0, 10.0, 999.0, 5000.0] {
            for anchor in [0.0, 400.0, 8000.0] {
                assert_eq!(project_offset(scroll_y, anchor, 1.0), 0.0);
            }
        }
    }

    #[test]
    fn test_offset_linear_in_one_minus_speed() {
        let full = project_offset(1500.0, 500.0, 0.0);
        assert_eq!(full, 1000.0);
        assert!((project_offset(1500.0, 500.0, 0.25) - 750.0).abs() < 1e-9);
        assert!((project_offset(1500.0, 500.0, 0.5) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_margin() {
        let tracker = IntersectionTracker::new(100.0);
        let bounds = LayerBounds::new(1150.0, 500.0);
        // Viewport [0, 1000] grown to [-100, 1100]: just outside
        assert!(!tracker.intersects(&bounds, 0.0, 1000.0));
        // Viewport [100, 1100] grown to [0, 1200]: inside
        assert!(tracker.intersects(&bounds, 100.0, 1000.0));
    }

    #[test]
    fn test_offsets_follow_published_snapshots() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![
                (layer("sky", 0.2), LayerBounds::new(0.0, 1000.0)),
                (layer("far", 0.5), LayerBounds::new(6000.0, 1000.0)),
            ],
            1000.0,
            100.0,
            &engine,
            &policy,
        );

        engine.on_scroll(400.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert!((projector.offset("sky") - 320.0).abs() < 1e-9);
        // Off-screen layer is never evaluated: sky on activation and on the frame
        assert_eq!(projector.offset("far"), 0.0);
        assert_eq!(projector.recompute_count(), 2);
    }

    #[test]
    fn test_reduced_motion_pins_offsets() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![(layer("sky", 0.0), LayerBounds::new(0.0, 1000.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );

        engine.on_scroll(300.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert_eq!(projector.offset("sky"), 300.0);

        policy.on_platform_change(true);
        assert_eq!(projector.offset("sky"), 0.0);

        engine.on_scroll(600.0);
        scheduler.run_frame(Duration::from_millis(32));
        assert_eq!(projector.offset("sky"), 0.0);
    }

    #[test]
    fn test_motion_restored_reprojects_without_new_snapshot() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![(layer("sky", 0.0), LayerBounds::new(0.0, 1000.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );

        engine.on_scroll(300.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert_eq!(projector.offset("sky"), 300.0);

        policy.on_platform_change(true);
        policy.on_platform_change(false);
        // No scroll input since: the flip alone restores the offset
        assert_eq!(projector.offset("sky"), 300.0);
        scheduler.run_frame(Duration::from_millis(32));
        assert_eq!(projector.offset("sky"), 300.0);
    }

    #[test]
    fn test_visibility_tracked_while_reduced() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(true));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![(layer("sky", 0.5), LayerBounds::new(0.0, 500.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );
        assert!(projector.layers()[0].visible);

        engine.on_scroll(3000.0);
        scheduler.run_frame(Duration::from_millis(16));
        let layer = &projector.layers()[0];
        assert!(!layer.visible);
        assert_eq!(layer.offset, 0.0);
    }

    #[test]
    fn test_invalid_speed_degrades_to_static() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![(layer("bad", 3.0), LayerBounds::new(0.0, 1000.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );
        engine.on_scroll(500.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert_eq!(projector.offset("bad"), 0.0);
        assert!(layer("bad", 3.0).validate().is_err());
    }

    #[test]
    fn test_anchor_only_changes_on_resize() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let projector = ParallaxProjector::activate(
            vec![(layer("band", 0.5), LayerBounds::new(1000.0, 800.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );

        engine.on_scroll(1200.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert!((projector.offset("band") - 100.0).abs() < 1e-9);

        projector.on_resize(1000.0, [("band", LayerBounds::new(1100.0, 800.0))]);
        assert!((projector.offset("band") - 50.0).abs() < 1e-9);
        assert_eq!(projector.layers()[0].anchor_top, 1100.0);
    }

    #[test]
    fn test_deactivated_projector_ignores_snapshots() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = raw_engine(&scheduler, &policy);
        let mut projector = ParallaxProjector::activate(
            vec![(layer("sky", 0.0), LayerBounds::new(0.0, 1000.0))],
            1000.0,
            100.0,
            &engine,
            &policy,
        );
        projector.deactivate();
        engine.on_scroll(300.0);
        scheduler.run_frame(Duration::from_millis(16));
        assert_eq!(projector.offset("sky"), 0.0);
        projector.on_resize(900.0, Vec::<(&str, LayerBounds)>::new());
    }
}
