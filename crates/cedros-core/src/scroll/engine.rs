//! L2 Organism Layer: Scroll-state engine
//!
//! Turns raw scroll input into at most one [`ScrollSnapshot`] publish per
//! frame. Two modes share the same contract:
//!
//! - [`ScrollMode::Raw`] follows the platform scroll position directly.
//! - [`ScrollMode::Smooth`] owns a [`VirtualScroll`] that glides toward the
//!   platform target and is advanced by a continuous per-frame tick.
//!
//! The engine is the single canonical scroll-state source. Dropping it (or
//! calling [`ScrollEngine::deactivate`]) cancels its frames and detaches every
//! subscriber synchronously.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::ScrollConfig;
use crate::frame::{FrameScheduler, FrameTime, OwnerId};
use crate::motion::ReducedMotionPolicy;
use crate::publisher::{StatePublisher, Subscription};

use super::driver::VirtualScroll;
use super::snapshot::{DocumentMetrics, ScrollSnapshot};

/// How the engine obtains its scroll position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    Raw,
    Smooth,
}

impl ScrollMode {
    pub fn from_config(config: &ScrollConfig) -> Self {
        if config.smooth_enabled && config.duration_ms > 0 {
            ScrollMode::Smooth
        } else {
            ScrollMode::Raw
        }
    }
}

struct EngineState {
    mode: ScrollMode,
    active: bool,
    reduced: bool,
    metrics: DocumentMetrics,
    /// Latest platform position (raw mode)
    platform_y: f64,
    driver: VirtualScroll,
    wheel_multiplier: f64,
    /// Set while a publish frame is queued; cleared when it runs
    pending: bool,
    publish_owner: OwnerId,
    tick_owner: OwnerId,
    scheduler: FrameScheduler,
    publisher: StatePublisher<ScrollSnapshot>,
}

impl EngineState {
    fn position(&self) -> f64 {
        match self.mode {
            ScrollMode::Raw => self.platform_y,
            ScrollMode::Smooth => self.driver.current(),
        }
    }
}

/// Frame-coalesced scroll-state publisher
pub struct ScrollEngine {
    state: Rc<RefCell<EngineState>>,
    motion: Option<Subscription>,
}

impl std::fmt::Debug for ScrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ScrollEngine")
            .field("mode", &state.mode)
            .field("active", &state.active)
            .field("snapshot", &state.publisher.current())
            .finish()
    }
}

impl ScrollEngine {
    /// Activate the engine: start the smooth tick (if any) and follow the
    /// reduced-motion policy
    pub fn activate(
        config: &ScrollConfig,
        metrics: DocumentMetrics,
        scheduler: &FrameScheduler,
        policy: &ReducedMotionPolicy,
    ) -> Self {
        Self::activate_with_mode(ScrollMode::from_config(config), config, metrics, scheduler, policy)
    }

    pub fn activate_with_mode(
        mode: ScrollMode,
        config: &ScrollConfig,
        metrics: DocumentMetrics,
        scheduler: &FrameScheduler,
        policy: &ReducedMotionPolicy,
    ) -> Self {
        let state = Rc::new(RefCell::new(EngineState {
            mode,
            active: true,
            reduced: policy.is_reduced(),
            metrics,
            platform_y: 0.0,
            driver: VirtualScroll::new(
                Duration::from_millis(config.duration_ms),
                config.easing,
                metrics.max_scroll(),
            ),
            wheel_multiplier: config.wheel_multiplier,
            pending: false,
            publish_owner: scheduler.register_owner(),
            tick_owner: scheduler.register_owner(),
            scheduler: scheduler.clone(),
            publisher: StatePublisher::new(ScrollSnapshot::default()),
        }));

        let weak = Rc::downgrade(&state);
        let motion = policy.subscribe(move |reduced| {
            if let Some(state) = weak.upgrade() {
                on_motion_change(&state, reduced);
            }
        });

        if mode == ScrollMode::Smooth {
            schedule_tick(&state);
        }
        debug!(?mode, max_scroll = metrics.max_scroll(), "scroll engine activated");

        Self {
            state,
            motion: Some(motion),
        }
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ScrollSnapshot {
        self.state.borrow().publisher.current()
    }

    /// Be notified of every published snapshot
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ScrollSnapshot) + 'static,
    {
        self.state.borrow().publisher.subscribe(listener)
    }

    pub fn mode(&self) -> ScrollMode {
        self.state.borrow().mode
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    pub fn metrics(&self) -> DocumentMetrics {
        self.state.borrow().metrics
    }

    /// Position that will be published next (virtual position in smooth mode)
    pub fn position(&self) -> f64 {
        self.state.borrow().position()
    }

    /// Where the smooth glide is heading; the platform position in raw mode
    pub fn target(&self) -> f64 {
        let state = self.state.borrow();
        match state.mode {
            ScrollMode::Raw => state.platform_y,
            ScrollMode::Smooth => state.driver.target(),
        }
    }

    /// Platform scroll event with the new absolute position
    pub fn on_scroll(&self, scroll_y: f64) {
        {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return;
            }
            let y = state.metrics.clamp(scroll_y);
            match state.mode {
                ScrollMode::Raw => state.platform_y = y,
                ScrollMode::Smooth => state.driver.jump_to(y),
            }
        }
        request_publish(&self.state);
    }

    /// Wheel or touch input moving the page by `delta`
    pub fn on_wheel(&self, delta: f64) {
        {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return;
            }
            let delta = delta * state.wheel_multiplier;
            match state.mode {
                ScrollMode::Raw => {
                    let y = state.metrics.clamp(state.platform_y + delta);
                    state.platform_y = y;
                }
                ScrollMode::Smooth => {
                    state.driver.scroll_by(delta);
                    if state.reduced {
                        state.driver.finish();
                    } else {
                        // The tick publishes the glide.
                        return;
                    }
                }
            }
        }
        request_publish(&self.state);
    }

    /// Programmatic scroll (anchor navigation); glides in smooth mode
    pub fn scroll_to(&self, target: f64) {
        {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return;
            }
            match state.mode {
                ScrollMode::Raw => state.platform_y = state.metrics.clamp(target),
                ScrollMode::Smooth => {
                    if state.reduced {
                        state.driver.jump_to(target);
                    } else {
                        state.driver.scroll_to(target);
                        return;
                    }
                }
            }
        }
        request_publish(&self.state);
    }

    /// Document or viewport size changed
    pub fn on_resize(&self, metrics: DocumentMetrics) {
        {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return;
            }
            state.metrics = metrics;
            state.platform_y = metrics.clamp(state.platform_y);
            state.driver.set_limit(metrics.max_scroll());
        }
        request_publish(&self.state);
    }

    /// Cancel the tick, drop queued publishes and detach all listeners
    ///
    /// Idempotent; nothing is published afterwards.
    pub fn deactivate(&mut self) {
        let (scheduler, publish_owner, tick_owner, publisher) = {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return;
            }
            state.active = false;
            state.pending = false;
            (
                state.scheduler.clone(),
                state.publish_owner,
                state.tick_owner,
                state.publisher.clone(),
            )
        };
        scheduler.cancel_owner(publish_owner);
        scheduler.cancel_owner(tick_owner);
        publisher.clear();
        self.motion.take();
        debug!("scroll engine deactivated");
    }
}

impl Drop for ScrollEngine {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn on_motion_change(state: &Rc<RefCell<EngineState>>, reduced: bool) {
    let settle = {
        let mut s = state.borrow_mut();
        s.reduced = reduced;
        if reduced && s.active && s.mode == ScrollMode::Smooth && s.driver.needs_update() {
            s.driver.finish();
            true
        } else {
            false
        }
    };
    if settle {
        request_publish(state);
    }
}

/// Queue one publish for the next frame unless one is already queued
fn request_publish(state: &Rc<RefCell<EngineState>>) {
    let (scheduler, owner) = {
        let mut s = state.borrow_mut();
        if !s.active || s.pending {
            return;
        }
        s.pending = true;
        (s.scheduler.clone(), s.publish_owner)
    };
    let weak = Rc::downgrade(state);
    scheduler.request(owner, move |_| {
        if let Some(state) = weak.upgrade() {
            {
                state.borrow_mut().pending = false;
            }
            publish_now(&state);
        }
    });
}

/// Compute and publish the snapshot for the current position
fn publish_now(state: &Rc<RefCell<EngineState>>) {
    let (publisher, snapshot) = {
        let s = state.borrow();
        if !s.active {
            return;
        }
        let previous = s.publisher.current();
        let snapshot = previous.next(s.position(), &s.metrics);
        (s.publisher.clone(), snapshot)
    };
    trace!(scroll_y = snapshot.scroll_y, progress = snapshot.progress, "publish");
    publisher.publish(snapshot);
}

/// Continuous per-frame tick of the smooth driver
fn schedule_tick(state: &Rc<RefCell<EngineState>>) {
    let (scheduler, owner) = {
        let s = state.borrow();
        if !s.active {
            return;
        }
        (s.scheduler.clone(), s.tick_owner)
    };
    let weak: Weak<RefCell<EngineState>> = Rc::downgrade(state);
    scheduler.request(owner, move |now| {
        if let Some(state) = weak.upgrade() {
            smooth_tick(&state, now);
        }
    });
}

fn smooth_tick(state: &Rc<RefCell<EngineState>>, now: FrameTime) {
    let changed = {
        let mut s = state.borrow_mut();
        if !s.active {
            return;
        }
        s.driver.advance(now)
    };
    // The tick is this frame's update, so a change publishes directly and
    // any publish still queued for the same position becomes redundant.
    if changed {
        let (scheduler, owner) = {
            let mut s = state.borrow_mut();
            s.pending = false;
            (s.scheduler.clone(), s.publish_owner)
        };
        scheduler.cancel_owner(owner);
        publish_now(state);
    }
    schedule_tick(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::StaticMotionSignal;
    use crate::scroll::snapshot::ScrollDirection;
    use std::cell::Cell;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn raw_config() -> ScrollConfig {
        ScrollConfig {
            smooth_enabled: false,
            ..Default::default()
        }
    }

    fn setup(config: &ScrollConfig, reduced: bool) -> (FrameScheduler, ReducedMotionPolicy, ScrollEngine) {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(reduced));
        let engine = ScrollEngine::activate(
            config,
            DocumentMetrics::new(3000.0, 1000.0),
            &scheduler,
            &policy,
        );
        (scheduler, policy, engine)
    }

    fn count_publishes(engine: &ScrollEngine) -> (Rc<Cell<u32>>, Subscription) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let sub = engine.subscribe(move |_| c.set(c.get() + 1));
        (count, sub)
    }

    #[test]
    fn test_raw_events_coalesce_into_one_publish_per_frame() {
        let (scheduler, _policy, engine) = setup(&raw_config(), false);
        let (count, _sub) = count_publishes(&engine);

        engine.on_scroll(100.0);
        engine.on_scroll(300.0);
        engine.on_scroll(500.0);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(count.get(), 0);

        scheduler.run_frame(ms(16));
        assert_eq!(count.get(), 1);
        let snap = engine.snapshot();
        assert_eq!(snap.scroll_y, 500.0);
        assert!((snap.progress - 0.25).abs() < 1e-9);
        assert_eq!(snap.direction, ScrollDirection::Down);

        // Pending flag resets after the frame
        engine.on_scroll(200.0);
        scheduler.run_frame(ms(32));
        assert_eq!(count.get(), 2);
        assert_eq!(engine.snapshot().direction, ScrollDirection::Up);
    }

    #[test]
    fn test_unchanged_position_keeps_direction() {
        let (scheduler, _policy, engine) = setup(&raw_config(), false);
        engine.on_scroll(400.0);
        scheduler.run_frame(ms(16));
        engine.on_scroll(100.0);
        scheduler.run_frame(ms(32));
        engine.on_scroll(100.0);
        scheduler.run_frame(ms(48));
        assert_eq!(engine.snapshot().direction, ScrollDirection::Up);
    }

    #[test]
    fn test_smooth_mode_glides_and_publishes_each_frame() {
        let (scheduler, _policy, engine) = setup(&ScrollConfig::default(), false);
        assert_eq!(engine.mode(), ScrollMode::Smooth);
        let (count, _sub) = count_publishes(&engine);

        engine.on_wheel(1000.0);
        scheduler.run_frame(ms(0));
        scheduler.run_frame(ms(300));
        let mid = engine.snapshot().scroll_y;
        assert!(mid > 0.0 && mid < 1000.0);

        scheduler.run_frame(ms(1300));
        assert_eq!(engine.snapshot().scroll_y, 1000.0);
        assert!((engine.snapshot().progress - 0.5).abs() < 1e-9);
        let published = count.get();

        // At rest the tick keeps running but publishes nothing new
        scheduler.run_frame(ms(1316));
        assert_eq!(count.get(), published);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_reduced_motion_skips_glide() {
        let (scheduler, _policy, engine) = setup(&ScrollConfig::default(), true);
        engine.on_wheel(800.0);
        assert_eq!(engine.position(), 800.0);
        scheduler.run_frame(ms(16));
        assert_eq!(engine.snapshot().scroll_y, 800.0);
    }

    #[test]
    fn test_flip_to_reduced_finishes_in_flight_glide() {
        let (scheduler, policy, engine) = setup(&ScrollConfig::default(), false);
        engine.scroll_to(1500.0);
        scheduler.run_frame(ms(0));
        scheduler.run_frame(ms(100));
        assert!(engine.position() < 1500.0);

        policy.on_platform_change(true);
        assert_eq!(engine.position(), 1500.0);
        scheduler.run_frame(ms(116));
        assert_eq!(engine.snapshot().scroll_y, 1500.0);
    }

    #[test]
    fn test_not_scrollable_document_progress_is_zero() {
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(&StaticMotionSignal(false));
        let engine = ScrollEngine::activate(
            &raw_config(),
            DocumentMetrics::new(600.0, 1000.0),
            &scheduler,
            &policy,
        );
        engine.on_scroll(250.0);
        scheduler.run_frame(ms(16));
        let snap = engine.snapshot();
        assert_eq!(snap.progress, 0.0);
        assert!(snap.progress.is_finite());
    }

    #[test]
    fn test_deactivate_before_frame_prevents_publish() {
        let (scheduler, _policy, mut engine) = setup(&raw_config(), false);
        let (count, _sub) = count_publishes(&engine);

        engine.on_scroll(700.0);
        engine.deactivate();
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.run_frame(ms(16));
        assert_eq!(count.get(), 0);

        // Late events are ignored
        engine.on_scroll(900.0);
        scheduler.run_frame(ms(32));
        assert_eq!(count.get(), 0);
        engine.deactivate();
    }

    #[test]
    fn test_drop_cancels_smooth_tick() {
        let (scheduler, _policy, engine) = setup(&ScrollConfig::default(), false);
        assert_eq!(scheduler.pending_count(), 1);
        drop(engine);
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.run_frame(ms(16));
    }

    #[test]
    fn test_resize_republishes_progress() {
        let (scheduler, _policy, engine) = setup(&raw_config(), false);
        engine.on_scroll(1000.0);
        scheduler.run_frame(ms(16));
        assert!((engine.snapshot().progress - 0.5).abs() < 1e-9);

        engine.on_resize(DocumentMetrics::new(5000.0, 1000.0));
        scheduler.run_frame(ms(32));
        assert!((engine.snapshot().progress - 0.25).abs() < 1e-9);
    }
}
