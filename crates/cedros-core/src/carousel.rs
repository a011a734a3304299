//! Inertial drag carousel
//!
//! [`CarouselPhysics`] is the pure state machine: drag capture, velocity
//! estimation, friction decay and snap resolution. [`InertialCarousel`] runs
//! it on the frame scheduler and follows the reduced-motion policy.
//!
//! Positions are track offsets in px: item `i` is centred at `-i * item_width`,
//! so the resting range is `[-(N-1) * item_width, 0]`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::CarouselConfig;
use crate::frame::{FrameScheduler, FrameTime, OwnerId};
use crate::motion::ReducedMotionPolicy;
use crate::publisher::Subscription;
use crate::scroll::timing::elapsed_ms;

/// Carousel motion phase. Idle and Settled are both rest states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarouselPhase {
    Idle,
    Dragging,
    Coasting,
    Settled,
}

impl CarouselPhase {
    #[inline]
    pub fn is_rest(&self) -> bool {
        matches!(self, CarouselPhase::Idle | CarouselPhase::Settled)
    }
}

/// Physics constants, fixed for the lifetime of a carousel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselParams {
    pub friction: f64,
    pub snap_threshold: f64,
    pub elasticity: f64,
    pub velocity_frame_ms: f64,
}

impl From<&CarouselConfig> for CarouselParams {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            friction: config.friction,
            snap_threshold: config.snap_threshold,
            elasticity: config.elasticity,
            velocity_frame_ms: config.velocity_frame_ms,
        }
    }
}

impl Default for CarouselParams {
    fn default() -> Self {
        Self::from(&CarouselConfig::default())
    }
}

/// In-progress drag bookkeeping
#[derive(Debug, Clone, Copy)]
struct DragTrack {
    origin_pointer: f64,
    origin_position: f64,
    last_position: f64,
    last_time: FrameTime,
}

/// What presentation code needs from a carousel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselView {
    pub current_index: usize,
    pub position: f64,
    pub is_dragging: bool,
}

/// Visual treatment of one carousel item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemAppearance {
    pub scale: f64,
    pub opacity: f64,
    /// Y-axis tilt in degrees
    pub tilt_deg: f64,
}

/// Scale, opacity and tilt for item `index`
pub fn item_appearance(index: usize, current: usize, dragging: bool, reduced: bool) -> ItemAppearance {
    let distance = index.abs_diff(current);
    let scale = if distance == 0 { 1.0 } else { 0.85 };
    let opacity = match distance {
        0 => 1.0,
        1 => 0.6,
        _ => 0.3,
    };
    let tilt_deg = if dragging && !reduced {
        (index as f64 - current as f64) * 5.0
    } else {
        0.0
    };
    ItemAppearance {
        scale,
        opacity,
        tilt_deg,
    }
}

/// Pure carousel state machine
#[derive(Debug, Clone)]
pub struct CarouselPhysics {
    params: CarouselParams,
    item_count: usize,
    item_width: f64,
    current_index: usize,
    position: f64,
    velocity: f64,
    phase: CarouselPhase,
    drag: Option<DragTrack>,
}

impl CarouselPhysics {
    pub fn new(params: CarouselParams, item_count: usize, item_width: f64) -> crate::Result<Self> {
        if !item_width.is_finite() || item_width < 0.0 {
            return Err(crate::Error::InvalidCarousel(format!(
                "item width must be a non-negative number, got {item_width}"
            )));
        }
        Ok(Self {
            params,
            item_count,
            item_width,
            current_index: 0,
            position: 0.0,
            velocity: 0.0,
            phase: CarouselPhase::Idle,
            drag: None,
        })
    }

    #[inline]
    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    #[inline]
    pub fn item_width(&self) -> f64 {
        self.item_width
    }

    pub fn params(&self) -> &CarouselParams {
        &self.params
    }

    pub fn view(&self) -> CarouselView {
        CarouselView {
            current_index: self.current_index,
            position: self.position,
            is_dragging: self.phase == CarouselPhase::Dragging,
        }
    }

    /// Leftmost resting position
    #[inline]
    pub fn min_position(&self) -> f64 {
        -(self.item_count.saturating_sub(1) as f64) * self.item_width
    }

    /// Resting position of item `index`
    #[inline]
    pub fn slot_position(&self, index: usize) -> f64 {
        -(index as f64) * self.item_width
    }

    fn clamp_position(&self, position: f64) -> f64 {
        position.clamp(self.min_position(), 0.0)
    }

    /// Apply elastic resistance beyond the track bounds
    fn elastic(&self, raw: f64) -> f64 {
        let min = self.min_position();
        if raw > 0.0 {
            raw * self.params.elasticity
        } else if raw < min {
            min + (raw - min) * self.params.elasticity
        } else {
            raw
        }
    }

    /// Pointer pressed on the track at horizontal coordinate `pointer_x`
    pub fn drag_start(&mut self, pointer_x: f64, now: FrameTime) {
        if self.item_count == 0 {
            return;
        }
        self.phase = CarouselPhase::Dragging;
        self.velocity = 0.0;
        self.drag = Some(DragTrack {
            origin_pointer: pointer_x,
            origin_position: self.position,
            last_position: self.position,
            last_time: now,
        });
    }

    /// Pointer moved while pressed
    ///
    /// Velocity is the position delta over elapsed time, scaled to px per
    /// `velocity_frame_ms`, so it does not depend on event rate.
    pub fn drag_move(&mut self, pointer_x: f64, now: FrameTime) {
        let Some(mut track) = self.drag else {
            return;
        };
        let raw = track.origin_position + (pointer_x - track.origin_pointer);
        let position = self.elastic(raw);
        if !position.is_finite() {
            return;
        }

        let dt = elapsed_ms(track.last_time, now);
        if dt > 0.0 {
            self.velocity = (position - track.last_position) / dt * self.params.velocity_frame_ms;
        }
        self.position = position;
        track.last_position = position;
        track.last_time = now;
        self.drag = Some(track);
    }

    /// Pointer released. Coasts if fast enough (and motion is allowed),
    /// otherwise snaps immediately.
    pub fn drag_end(&mut self, reduced_motion: bool) -> CarouselPhase {
        if self.phase != CarouselPhase::Dragging {
            return self.phase;
        }
        self.drag = None;
        if !reduced_motion && self.velocity.abs() > self.params.snap_threshold {
            self.position = self.clamp_position(self.position);
            self.phase = CarouselPhase::Coasting;
        } else {
            self.settle();
        }
        self.phase
    }

    /// One coasting frame. Returns true while coasting continues.
    pub fn step(&mut self) -> bool {
        if self.phase != CarouselPhase::Coasting {
            return false;
        }
        self.velocity *= self.params.friction;
        self.position = self.clamp_position(self.position + self.velocity);
        if self.velocity.abs() > self.params.snap_threshold {
            true
        } else {
            self.settle();
            false
        }
    }

    /// Snap to the nearest slot and come to rest
    pub fn settle(&mut self) {
        self.drag = None;
        self.velocity = 0.0;
        self.phase = CarouselPhase::Settled;
        if self.item_count == 0 || self.item_width <= 0.0 {
            self.current_index = 0;
            self.position = 0.0;
            return;
        }
        let nearest = (-self.position / self.item_width).round();
        let max = (self.item_count - 1) as f64;
        let index = if nearest.is_finite() {
            nearest.clamp(0.0, max) as usize
        } else {
            self.current_index.min(self.item_count - 1)
        };
        self.current_index = index;
        self.position = self.slot_position(index);
    }

    /// Jump to `index` without physics
    pub fn select(&mut self, index: usize) {
        if self.item_count == 0 {
            return;
        }
        let index = index.min(self.item_count - 1);
        self.drag = None;
        self.velocity = 0.0;
        self.current_index = index;
        self.position = self.slot_position(index);
        self.phase = CarouselPhase::Settled;
    }

    /// New item width after a viewport resize
    pub fn set_item_width(&mut self, item_width: f64) {
        if !item_width.is_finite() || item_width < 0.0 {
            return;
        }
        self.item_width = item_width;
        match self.phase {
            CarouselPhase::Idle | CarouselPhase::Settled => {
                self.position = self.slot_position(self.current_index);
            }
            CarouselPhase::Coasting => {
                self.position = self.clamp_position(self.position);
            }
            CarouselPhase::Dragging => {}
        }
    }
}

struct CarouselState {
    physics: CarouselPhysics,
    owner: OwnerId,
    scheduler: FrameScheduler,
    reduced: bool,
    active: bool,
    /// Frame time of the most recent pointer event
    clock: FrameTime,
}

/// One gallery's carousel, driven by the frame scheduler
///
/// State is owned exclusively by this instance and keyed by its scheduler
/// owner id.
pub struct InertialCarousel {
    state: Rc<RefCell<CarouselState>>,
    motion: Option<Subscription>,
}

impl std::fmt::Debug for InertialCarousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("InertialCarousel")
            .field("owner", &state.owner)
            .field("phase", &state.physics.phase())
            .field("view", &state.physics.view())
            .finish()
    }
}

impl InertialCarousel {
    pub fn activate(
        config: &CarouselConfig,
        item_count: usize,
        viewport_width: f64,
        scheduler: &FrameScheduler,
        policy: &ReducedMotionPolicy,
    ) -> crate::Result<Self> {
        let physics = CarouselPhysics::new(
            CarouselParams::from(config),
            item_count,
            viewport_width * config.item_width_ratio,
        )?;
        let state = Rc::new(RefCell::new(CarouselState {
            physics,
            owner: scheduler.register_owner(),
            scheduler: scheduler.clone(),
            reduced: policy.is_reduced(),
            active: true,
            clock: FrameTime::ZERO,
        }));

        let weak = Rc::downgrade(&state);
        let motion = policy.subscribe(move |reduced| {
            if let Some(state) = weak.upgrade() {
                let (scheduler, owner) = {
                    let mut s = state.borrow_mut();
                    s.reduced = reduced;
                    if !reduced || s.physics.phase() != CarouselPhase::Coasting {
                        return;
                    }
                    s.physics.settle();
                    debug!(index = s.physics.current_index(), "reduced motion: coasting cut short");
                    (s.scheduler.clone(), s.owner)
                };
                scheduler.cancel_owner(owner);
            }
        });

        Ok(Self {
            state,
            motion: Some(motion),
        })
    }

    pub fn view(&self) -> CarouselView {
        self.state.borrow().physics.view()
    }

    pub fn phase(&self) -> CarouselPhase {
        self.state.borrow().physics.phase()
    }

    pub fn velocity(&self) -> f64 {
        self.state.borrow().physics.velocity()
    }

    pub fn item_count(&self) -> usize {
        self.state.borrow().physics.item_count()
    }

    pub fn item_width(&self) -> f64 {
        self.state.borrow().physics.item_width()
    }

    pub fn owner(&self) -> OwnerId {
        self.state.borrow().owner
    }

    /// Appearance of item `index` given the current state
    pub fn appearance(&self, index: usize) -> ItemAppearance {
        let state = self.state.borrow();
        let view = state.physics.view();
        item_appearance(index, view.current_index, view.is_dragging, state.reduced)
    }

    pub fn on_pointer_down(&self, pointer_x: f64, now: FrameTime) {
        let cancel = {
            let mut s = self.state.borrow_mut();
            if !s.active {
                return;
            }
            s.clock = now;
            let was_coasting = s.physics.phase() == CarouselPhase::Coasting;
            s.physics.drag_start(pointer_x, now);
            trace!(owner = ?s.owner, "drag start");
            was_coasting.then(|| (s.scheduler.clone(), s.owner))
        };
        // Grabbing a coasting track stops the decay loop
        if let Some((scheduler, owner)) = cancel {
            scheduler.cancel_owner(owner);
        }
    }

    pub fn on_pointer_move(&self, pointer_x: f64, now: FrameTime) {
        let mut s = self.state.borrow_mut();
        if !s.active {
            return;
        }
        s.clock = now;
        s.physics.drag_move(pointer_x, now);
    }

    pub fn on_pointer_up(&self) {
        let phase = {
            let mut s = self.state.borrow_mut();
            if !s.active {
                return;
            }
            let reduced = s.reduced;
            let phase = s.physics.drag_end(reduced);
            debug!(?phase, velocity = s.physics.velocity(), "drag end");
            phase
        };
        if phase == CarouselPhase::Coasting {
            schedule_coast(&self.state);
        }
    }

    /// Index-select command: synchronous, bypasses physics
    pub fn select(&self, index: usize) {
        let (scheduler, owner) = {
            let mut s = self.state.borrow_mut();
            if !s.active {
                return;
            }
            s.physics.select(index);
            (s.scheduler.clone(), s.owner)
        };
        scheduler.cancel_owner(owner);
    }

    pub fn on_resize(&self, viewport_width: f64, item_width_ratio: f64) {
        let mut s = self.state.borrow_mut();
        if !s.active {
            return;
        }
        s.physics.set_item_width(viewport_width * item_width_ratio);
    }

    /// Stop the coast loop and detach from the motion policy
    pub fn deactivate(&mut self) {
        let (scheduler, owner) = {
            let mut s = self.state.borrow_mut();
            s.active = false;
            (s.scheduler.clone(), s.owner)
        };
        scheduler.cancel_owner(owner);
        self.motion.take();
    }
}

impl Drop for InertialCarousel {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn schedule_coast(state: &Rc<RefCell<CarouselState>>) {
    let (scheduler, owner) = {
        let s = state.borrow();
        if !s.active {
            return;
        }
        (s.scheduler.clone(), s.owner)
    };
    let weak = Rc::downgrade(state);
    scheduler.request(owner, move |_| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let keep_going = {
            let mut s = state.borrow_mut();
            if !s.active {
                return;
            }
            let keep_going = s.physics.step();
            if !keep_going {
                debug!(index = s.physics.current_index(), "carousel settled");
            }
            keep_going
        };
        if keep_going {
            schedule_coast(&state);
        }
    });
}
