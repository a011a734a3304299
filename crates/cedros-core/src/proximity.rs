//! Pointer-proximity attraction for hover-following elements
//!
//! Pointer samples are coalesced to one computation per frame; the newest
//! sample supersedes any not yet processed.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

use crate::config::ProximityConfig;
use crate::frame::{FrameScheduler, OwnerId};
use crate::motion::ReducedMotionPolicy;
use crate::publisher::{StatePublisher, Subscription};

/// Point in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Offset applied to the attracted element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MagneticOffset {
    pub x: f64,
    pub y: f64,
}

impl MagneticOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Attraction vector for a pointer at `pointer` and an element centred at `center`
///
/// Inside the capture radius the result is the pointer delta scaled by
/// `strength`; at or beyond it the result is zero.
pub fn attraction(pointer: Point, center: Point, radius: f64, strength: f64) -> MagneticOffset {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    let distance = dx.hypot(dy);
    if !distance.is_finite() || !strength.is_finite() || distance >= radius {
        return MagneticOffset::ZERO;
    }
    MagneticOffset {
        x: dx * strength,
        y: dy * strength,
    }
}

struct AttractorState {
    center: Point,
    radius: f64,
    strength: f64,
    sample: Option<Point>,
    owner: OwnerId,
    scheduler: FrameScheduler,
    reduced: bool,
    active: bool,
    computations: u64,
}

/// Magnetic offset for one element
pub struct ProximityAttractor {
    state: Rc<RefCell<AttractorState>>,
    publisher: StatePublisher<MagneticOffset>,
    motion: Option<Subscription>,
}

impl std::fmt::Debug for ProximityAttractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ProximityAttractor")
            .field("owner", &state.owner)
            .field("center", &state.center)
            .field("offset", &self.publisher.current())
            .finish()
    }
}

impl ProximityAttractor {
    pub fn activate(
        config: &ProximityConfig,
        center: Point,
        scheduler: &FrameScheduler,
        policy: &ReducedMotionPolicy,
    ) -> Self {
        let state = Rc::new(RefCell::new(AttractorState {
            center,
            radius: config.radius,
            strength: config.strength,
            sample: None,
            owner: scheduler.register_owner(),
            scheduler: scheduler.clone(),
            reduced: policy.is_reduced(),
            active: true,
            computations: 0,
        }));
        let publisher = StatePublisher::new(MagneticOffset::ZERO);

        let weak = Rc::downgrade(&state);
        let offsets = publisher.clone();
        let motion = policy.subscribe(move |reduced| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().reduced = reduced;
            if reduced {
                reset(&state, &offsets);
            }
        });

        Self {
            state,
            publisher,
            motion: Some(motion),
        }
    }

    /// Current offset
    pub fn offset(&self) -> MagneticOffset {
        self.publisher.current()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&MagneticOffset) + 'static,
    {
        self.publisher.subscribe(listener)
    }

    pub fn owner(&self) -> OwnerId {
        self.state.borrow().owner
    }

    /// Number of frame computations performed so far
    pub fn computations(&self) -> u64 {
        self.state.borrow().computations
    }

    /// Element centre moved (layout or resize)
    pub fn set_center(&self, center: Point) {
        self.state.borrow_mut().center = center;
    }

    pub fn center(&self) -> Point {
        self.state.borrow().center
    }

    pub fn on_pointer_move(&self, pointer: Point) {
        let request = {
            let mut s = self.state.borrow_mut();
            if !s.active || s.reduced {
                return;
            }
            let first = s.sample.is_none();
            s.sample = Some(pointer);
            first.then(|| (s.scheduler.clone(), s.owner))
        };
        let Some((scheduler, owner)) = request else {
            return;
        };

        let weak = Rc::downgrade(&self.state);
        let offsets = self.publisher.clone();
        scheduler.request(owner, move |_| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let offset = {
                let mut s = state.borrow_mut();
                let Some(pointer) = s.sample.take() else {
                    return;
                };
                if !s.active || s.reduced {
                    return;
                }
                s.computations += 1;
                attraction(pointer, s.center, s.radius, s.strength)
            };
            if offset != offsets.current() {
                trace!(x = offset.x, y = offset.y, "magnetic offset");
                offsets.publish(offset);
            }
        });
    }

    /// Pointer left the element: zero immediately and drop pending work
    pub fn on_pointer_leave(&self) {
        if !self.state.borrow().active {
            return;
        }
        reset(&self.state, &self.publisher);
    }

    pub fn deactivate(&mut self) {
        let (scheduler, owner) = {
            let mut s = self.state.borrow_mut();
            s.active = false;
            s.sample = None;
            (s.scheduler.clone(), s.owner)
        };
        scheduler.cancel_owner(owner);
        self.motion.take();
        self.publisher.clear();
    }
}

impl Drop for ProximityAttractor {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn reset(state: &Rc<RefCell<AttractorState>>, offsets: &StatePublisher<MagneticOffset>) {
    let (scheduler, owner) = {
        let mut s = state.borrow_mut();
        s.sample = None;
        (s.scheduler.clone(), s.owner)
    };
    scheduler.cancel_owner(owner);
    if !offsets.current().is_zero() {
        offsets.publish(MagneticOffset::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::StaticMotionSignal;
    use std::time::Duration;

    #[test]
    fn test_attraction_inside_and_outside_radius() {
        let center = Point::new(0.0, 0.0);
        let inside = attraction(Point::new(50.0, 0.0), center, 100.0, 0.15);
        assert!((inside.x - 7.5).abs() < 1e-12);
        assert_eq!(inside.y, 0.0);

        let outside = attraction(Point::new(150.0, 0.0), center, 100.0, 0.15);
        assert_eq!(outside, MagneticOffset::ZERO);

        // Radius is exclusive
        assert!(attraction(Point::new(0.0, 100.0), center, 100.0, 0.15).is_zero());
    }

    #[test]
    fn test_attraction_uses_euclidean_distance() {
        let center = Point::new(10.0, 10.0);
        // (80, 80) away is ~113 units, outside
        assert!(attraction(Point::new(90.0, 90.0), center, 100.0, 0.3).is_zero());
        let v = attraction(Point::new(40.0, -30.0), center, 100.0, 0.5);
        assert_eq!(v, MagneticOffset { x: 15.0, y: -20.0 });
    }

    fn attractor(reduced: bool) -> (FrameScheduler, ReducedMotionPolicy, ProximityAttractor) {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(reduced));
        let config = ProximityConfig {
            radius: 100.0,
            strength: 0.15,
        };
        let attractor =
            ProximityAttractor::activate(&config, Point::new(200.0, 100.0), &scheduler, &policy);
        (scheduler, policy, attractor)
    }

    #[test]
    fn test_samples_coalesce_last_write_wins() {
        let (scheduler, _policy, attractor) = attractor(false);
        attractor.on_pointer_move(Point::new(210.0, 100.0));
        attractor.on_pointer_move(Point::new(230.0, 100.0));
        attractor.on_pointer_move(Point::new(250.0, 100.0));
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(attractor.offset(), MagneticOffset::ZERO);

        scheduler.run_frame(Duration::from_millis(16));
        assert_eq!(attractor.computations(), 1);
        assert!((attractor.offset().x - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_leave_zeroes_and_cancels() {
        let (scheduler, _policy, attractor) = attractor(false);
        attractor.on_pointer_move(Point::new(250.0, 100.0));
        scheduler.run_frame(Duration::from_millis(16));
        assert!(!attractor.offset().is_zero());

        attractor.on_pointer_move(Point::new(260.0, 100.0));
        attractor.on_pointer_leave();
        assert!(attractor.offset().is_zero());
        assert!(!scheduler.has_pending(attractor.owner()));

        scheduler.run_frame(Duration::from_millis(32));
        assert_eq!(attractor.computations(), 1);
        assert!(attractor.offset().is_zero());
    }

    #[test]
    fn test_reduced_motion_keeps_offset_zero() {
        let (scheduler, policy, attractor) = attractor(true);
        attractor.on_pointer_move(Point::new(250.0, 100.0));
        assert_eq!(scheduler.pending_count(), 0);
        assert!(attractor.offset().is_zero());

        policy.on_platform_change(false);
        attractor.on_pointer_move(Point::new(250.0, 100.0));
        scheduler.run_frame(Duration::from_millis(16));
        assert!(!attractor.offset().is_zero());

        policy.on_platform_change(true);
        assert!(attractor.offset().is_zero());
    }

    #[test]
    fn test_deactivate_before_frame() {
        let (scheduler, _policy, mut attractor) = attractor(false);
        attractor.on_pointer_move(Point::new(250.0, 100.0));
        attractor.deactivate();
        assert_eq!(scheduler.run_frame(Duration::from_millis(16)), 0);
        assert_eq!(attractor.computations(), 0);
    }

    #[test]
    fn test_listeners_see_published_offsets() {
        let (scheduler, _policy, attractor) = attractor(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = attractor.subscribe(move |offset| sink.borrow_mut().push(*offset));

        attractor.on_pointer_move(Point::new(220.0, 120.0));
        scheduler.run_frame(Duration::from_millis(16));
        attractor.on_pointer_leave();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!((seen[0].x - 3.0).abs() < 1e-12);
        assert!(seen[1].is_zero());
    }
}
