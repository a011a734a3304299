use cedros_core::carousel::{InertialCarousel, ItemAppearance};
use cedros_core::frame::{FrameScheduler, FrameTime};
use cedros_core::motion::{AnimationConfig, MotionSignal, ReducedMotionPolicy};
use cedros_core::parallax::ParallaxProjector;
use cedros_core::proximity::{MagneticOffset, Point, ProximityAttractor};
use cedros_core::scroll::{ScrollEngine, ScrollMode, ScrollSnapshot};
use cedros_core::sections::{section_progress, HeroTransforms, NavigationState, StickyFeatures};
use cedros_core::AppConfig;
use tracing::{debug, info, warn};

use crate::content::PageContent;
use crate::input::Action;
use crate::layout::{PageLayout, SectionKind};
use crate::theme::Theme;

/// Fraction of the viewport moved by PageUp/PageDown
const PAGE_FRACTION: f64 = 0.9;

/// Landing page state: layout plus every motion subsystem
///
/// Field order matters on drop: the scroll engine goes first and clears its
/// listeners before the consumers detach.
pub struct App {
    pub config: AppConfig,
    pub content: PageContent,
    pub theme: Theme,
    pub layout: PageLayout,
    pub scheduler: FrameScheduler,
    pub policy: ReducedMotionPolicy,
    pub engine: ScrollEngine,
    pub parallax: ParallaxProjector,
    pub nav: NavigationState,
    pub sticky: StickyFeatures,
    /// None when the gallery could not be set up; it then renders static
    pub carousel: Option<InertialCarousel>,
    /// One magnetic attractor per amenity card, same order as the cards
    pub attractors: Vec<ProximityAttractor>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Time of the latest frame
    pub clock: FrameTime,
    /// When the amenities grid first came into view
    pub amenities_revealed_at: Option<FrameTime>,
    dragging: bool,
    /// Amenity card currently under the pointer
    hovered_card: Option<usize>,
    /// Last pointer cell and the scroll position it was sampled at
    pointer: Option<(u16, u16, f64)>,
}

impl App {
    /// Build the page for a `width` x `height` viewport (status bar excluded)
    pub fn new(config: AppConfig, signal: &dyn MotionSignal, width: u16, height: u16) -> Self {
        let content = PageContent::default();
        let layout = PageLayout::measure(width, height, &content);
        let scheduler = FrameScheduler::new();
        let policy = ReducedMotionPolicy::from_signal(signal);

        let engine = ScrollEngine::activate(&config.scroll, layout.metrics(), &scheduler, &policy);
        let parallax = ParallaxProjector::activate(
            layout.parallax_layers(&content),
            layout.viewport_height(),
            config.parallax.visibility_margin,
            &engine,
            &policy,
        );
        let nav = NavigationState::activate(&engine, config.animation.nav_scrolled_threshold);
        let sticky = StickyFeatures::activate(
            layout.feature_bounds(&content),
            layout.viewport_height(),
            &engine,
        );
        let carousel = match InertialCarousel::activate(
            &config.carousel,
            content.gallery.len(),
            layout.viewport_width(),
            &scheduler,
            &policy,
        ) {
            Ok(carousel) => Some(carousel),
            Err(e) => {
                warn!("{e}; gallery rendered static");
                None
            }
        };
        let attractors = layout
            .amenities
            .iter()
            .map(|card| {
                ProximityAttractor::activate(&config.proximity, card.center(), &scheduler, &policy)
            })
            .collect();

        info!(width, height, rows = layout.total_rows(), "page activated");

        Self {
            config,
            content,
            theme: Theme::default(),
            layout,
            scheduler,
            policy,
            engine,
            parallax,
            nav,
            sticky,
            carousel,
            attractors,
            should_quit: false,
            status_message: None,
            clock: FrameTime::ZERO,
            amenities_revealed_at: None,
            dragging: false,
            hovered_card: None,
            pointer: None,
        }
    }

    /// Run one animation frame. Returns how many callbacks ran.
    pub fn frame(&mut self, now: FrameTime) -> usize {
        self.clock = now;
        let ran = self.scheduler.run_frame(now);
        self.retrack_pointer();
        if self.amenities_revealed_at.is_none() && self.section_in_view(SectionKind::Amenities) {
            self.amenities_revealed_at = Some(now);
        }
        ran
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.engine.snapshot()
    }

    pub fn scroll_y(&self) -> f64 {
        self.engine.snapshot().scroll_y
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.engine.mode()
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.policy.is_reduced()
    }

    pub fn animation_config(&self) -> AnimationConfig {
        self.policy
            .animation_config(&self.config.animation, &self.config.proximity)
    }

    pub fn hero_transforms(&self) -> HeroTransforms {
        let Some(hero) = self.layout.section(SectionKind::Hero) else {
            return HeroTransforms::rest();
        };
        let p = section_progress(
            self.scroll_y(),
            hero.bounds(),
            self.layout.viewport_height(),
            self.is_reduced_motion(),
        );
        HeroTransforms::at(p)
    }

    /// Magnetic offset of amenity card `index`; zero for unknown cards
    pub fn magnetic_offset(&self, index: usize) -> MagneticOffset {
        self.attractors
            .get(index)
            .map_or(MagneticOffset::ZERO, ProximityAttractor::offset)
    }

    pub fn item_appearance(&self, index: usize) -> Option<ItemAppearance> {
        self.carousel.as_ref().map(|c| c.appearance(index))
    }

    /// Whether any part of section `kind` is inside the viewport
    pub fn section_in_view(&self, kind: SectionKind) -> bool {
        let Some(section) = self.layout.section(kind) else {
            return false;
        };
        let bounds = section.bounds();
        let top = self.scroll_y();
        bounds.bottom() > top && bounds.top < top + self.layout.viewport_height()
    }

    pub fn handle_action(&mut self, action: Action, now: FrameTime) {
        if matches!(
            action,
            Action::ScrollBy(_)
                | Action::PageDown
                | Action::PageUp
                | Action::JumpToTop
                | Action::JumpToBottom
        ) {
            self.status_message = None;
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::ScrollBy(delta) => self.engine.on_wheel(delta),
            Action::PageDown => self
                .engine
                .on_wheel(self.layout.viewport_height() * PAGE_FRACTION),
            Action::PageUp => self
                .engine
                .on_wheel(-self.layout.viewport_height() * PAGE_FRACTION),
            Action::JumpToTop => self.engine.scroll_to(0.0),
            Action::JumpToBottom => self.engine.scroll_to(self.layout.metrics().max_scroll()),
            Action::SelectItem(index) => self.select_item(index),
            Action::PrevItem => {
                if let Some(current) = self.carousel.as_ref().map(|c| c.view().current_index) {
                    self.select_item(current.saturating_sub(1));
                }
            }
            Action::NextItem => {
                if let Some(current) = self.carousel.as_ref().map(|c| c.view().current_index) {
                    self.select_item(current + 1);
                }
            }
            Action::ToggleReducedMotion => {
                let reduced = !self.policy.is_reduced();
                self.policy.on_platform_change(reduced);
                self.status_message = Some(if reduced {
                    "Reduced motion on".to_string()
                } else {
                    "Reduced motion off".to_string()
                });
            }
            Action::PointerDown { col, row } => {
                let point = self.layout.to_document(col, row, self.scroll_y());
                if self.layout.section_at(point.y) == Some(SectionKind::Gallery) {
                    if let Some(carousel) = &self.carousel {
                        carousel.on_pointer_down(point.x, now);
                        self.dragging = true;
                    }
                }
            }
            Action::PointerDrag { col, row } => {
                self.pointer = Some((col, row, self.scroll_y()));
                let point = self.layout.to_document(col, row, self.scroll_y());
                if self.dragging {
                    if let Some(carousel) = &self.carousel {
                        carousel.on_pointer_move(point.x, now);
                    }
                }
                self.track_pointer(point);
            }
            Action::PointerUp => {
                if std::mem::take(&mut self.dragging) {
                    if let Some(carousel) = &self.carousel {
                        carousel.on_pointer_up();
                    }
                }
            }
            Action::PointerMove { col, row } => {
                self.pointer = Some((col, row, self.scroll_y()));
                let point = self.layout.to_document(col, row, self.scroll_y());
                self.track_pointer(point);
            }
            Action::None => {}
        }
    }

    /// Viewport resized: re-measure and hand new geometry to every subsystem
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.layout = PageLayout::measure(width, height, &self.content);
        let vh = self.layout.viewport_height();
        self.engine.on_resize(self.layout.metrics());

        let layers = self.layout.parallax_layers(&self.content);
        self.parallax
            .on_resize(vh, layers.iter().map(|(spec, bounds)| (spec.id.as_str(), *bounds)));

        self.sticky
            .on_resize(self.layout.feature_bounds(&self.content), vh, self.scroll_y());
        if let Some(carousel) = &self.carousel {
            carousel.on_resize(self.layout.viewport_width(), self.config.carousel.item_width_ratio);
        }
        for (attractor, card) in self.attractors.iter().zip(&self.layout.amenities) {
            attractor.set_center(card.center());
        }
        debug!(width, height, "page re-measured");
    }

    fn select_item(&mut self, index: usize) {
        if let Some(carousel) = &self.carousel {
            if index < carousel.item_count() {
                carousel.select(index);
            }
        }
    }

    /// Feed the card under the pointer; leaving a card counts as pointer-leave
    fn track_pointer(&mut self, point: Point) {
        let hovered = self.layout.amenity_at(point);
        if let Some(prev) = self.hovered_card.filter(|&prev| Some(prev) != hovered) {
            if let Some(attractor) = self.attractors.get(prev) {
                attractor.on_pointer_leave();
            }
        }
        if let Some(attractor) = hovered.and_then(|i| self.attractors.get(i)) {
            attractor.on_pointer_move(point);
        }
        self.hovered_card = hovered;
    }

    /// The page scrolled under a resting pointer: resample at its new document position
    fn retrack_pointer(&mut self) {
        let Some((col, row, sampled_at)) = self.pointer else {
            return;
        };
        let scroll_y = self.scroll_y();
        if scroll_y == sampled_at {
            return;
        }
        self.pointer = Some((col, row, scroll_y));
        let point = self.layout.to_document(col, row, scroll_y);
        self.track_pointer(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cedros_core::carousel::CarouselPhase;
    use cedros_core::motion::StaticMotionSignal;
    use cedros_core::scroll::ScrollDirection;
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn raw_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.scroll.smooth_enabled = false;
        config
    }

    fn app(config: AppConfig, reduced: bool) -> App {
        App::new(config, &StaticMotionSignal(reduced), 80, 24)
    }

    /// Run frames until nothing is pending
    fn settle(app: &mut App, mut t: u64) -> u64 {
        for _ in 0..1000 {
            t += 16;
            app.frame(ms(t));
            if app.scheduler.pending_count() == 0 {
                break;
            }
        }
        t
    }

    #[test]
    fn test_raw_scroll_publishes_on_frame() {
        let mut app = app(raw_config(), false);
        app.handle_action(Action::ScrollBy(48.0), ms(0));
        app.handle_action(Action::ScrollBy(48.0), ms(1));
        assert_eq!(app.scroll_y(), 0.0);

        app.frame(ms(16));
        assert_eq!(app.scroll_y(), 96.0);
        assert_eq!(app.snapshot().direction, ScrollDirection::Down);
        assert!(app.nav.is_scrolled());
    }

    #[test]
    fn test_smooth_scroll_glides_to_target() {
        let mut app = app(AppConfig::default(), false);
        assert_eq!(app.scroll_mode(), ScrollMode::Smooth);
        app.handle_action(Action::PageDown, ms(0));
        app.frame(ms(16));
        app.frame(ms(100));
        let mid = app.scroll_y();
        let target = app.layout.viewport_height() * PAGE_FRACTION;
        assert!(mid > 0.0 && mid < target);

        app.frame(ms(16 + 1300));
        assert!((app.scroll_y() - target).abs() < 1e-9);
    }

    #[test]
    fn test_gallery_drag_coasts_and_settles() {
        let mut app = app(raw_config(), false);
        let gallery = app.layout.section(SectionKind::Gallery).unwrap();
        app.handle_action(Action::JumpToTop, ms(0));
        // Scroll so the gallery starts at the top of the screen
        app.engine.on_scroll(gallery.bounds().top);
        app.frame(ms(16));

        app.handle_action(Action::PointerDown { col: 60, row: 3 }, ms(20));
        app.handle_action(Action::PointerDrag { col: 50, row: 3 }, ms(36));
        app.handle_action(Action::PointerUp, ms(40));
        let carousel = app.carousel.as_ref().unwrap();
        assert_eq!(carousel.phase(), CarouselPhase::Coasting);

        settle(&mut app, 40);
        let view = app.carousel.as_ref().unwrap().view();
        assert!(!view.is_dragging);
        let width = app.carousel.as_ref().unwrap().item_width();
        assert_eq!(view.position, -(view.current_index as f64) * width);
    }

    #[test]
    fn test_pointer_outside_gallery_does_not_drag() {
        let mut app = app(raw_config(), false);
        app.handle_action(Action::PointerDown { col: 10, row: 3 }, ms(0));
        app.handle_action(Action::PointerDrag { col: 0, row: 3 }, ms(16));
        app.handle_action(Action::PointerUp, ms(20));
        assert_eq!(app.carousel.as_ref().unwrap().view().position, 0.0);
    }

    #[test]
    fn test_index_select_keys() {
        let mut app = app(raw_config(), false);
        app.handle_action(Action::SelectItem(3), ms(0));
        assert_eq!(app.carousel.as_ref().unwrap().view().current_index, 3);
        app.handle_action(Action::NextItem, ms(0));
        app.handle_action(Action::NextItem, ms(0));
        assert_eq!(app.carousel.as_ref().unwrap().view().current_index, 4);
        app.handle_action(Action::PrevItem, ms(0));
        assert_eq!(app.carousel.as_ref().unwrap().view().current_index, 3);
        // Out of range is ignored
        app.handle_action(Action::SelectItem(8), ms(0));
        assert_eq!(app.carousel.as_ref().unwrap().view().current_index, 3);
    }

    /// Scroll to the bottom and return the screen cell just right of and below card `index`'s centre
    fn cell_near_card(app: &mut App, index: usize) -> (u16, u16) {
        let max = app.layout.metrics().max_scroll();
        app.engine.on_scroll(max);
        app.frame(ms(16));
        let center = app.layout.amenities[index].center();
        let row = ((center.y - app.scroll_y()) / 16.0).floor() as u16;
        let col = (center.x / 8.0) as u16 + 2;
        (col, row)
    }

    #[test]
    fn test_amenity_card_follows_pointer() {
        let mut app = app(raw_config(), false);
        let (col, row) = cell_near_card(&mut app, 0);
        app.handle_action(Action::PointerMove { col, row }, ms(20));
        app.frame(ms(32));
        let offset = app.magnetic_offset(0);
        assert!((offset.x - 16.0 * 0.15).abs() < 1e-9);
        assert!((offset.y - 8.0 * 0.15).abs() < 1e-9);
        // Each card keeps its own state
        assert!(app.magnetic_offset(1).is_zero());

        // Moving onto the next card is a leave for the first one
        let center = app.layout.amenities[1].center();
        app.handle_action(Action::PointerMove { col: (center.x / 8.0) as u16, row }, ms(40));
        assert!(app.magnetic_offset(0).is_zero());
        app.frame(ms(48));
        assert!(!app.magnetic_offset(1).is_zero());

        // Off the grid entirely
        app.handle_action(Action::PointerMove { col: 0, row: 0 }, ms(56));
        app.frame(ms(64));
        assert!(app.magnetic_offset(1).is_zero());
    }

    #[test]
    fn test_scrolling_under_resting_pointer_leaves_card() {
        let mut app = app(raw_config(), false);
        let (col, row) = cell_near_card(&mut app, 0);
        app.handle_action(Action::PointerMove { col, row }, ms(20));
        app.frame(ms(32));
        assert!(!app.magnetic_offset(0).is_zero());

        // Page moves ten rows while the pointer stays on the same cell
        app.handle_action(Action::ScrollBy(-160.0), ms(40));
        app.frame(ms(48));
        assert!(app.magnetic_offset(0).is_zero());
        app.frame(ms(64));
        assert!(app.magnetic_offset(0).is_zero());
    }

    #[test]
    fn test_reduced_motion_keeps_cards_still() {
        let mut app = app(raw_config(), true);
        let (col, row) = cell_near_card(&mut app, 0);
        app.handle_action(Action::PointerMove { col, row }, ms(20));
        app.frame(ms(32));
        assert!(app.magnetic_offset(0).is_zero());
    }

    #[test]
    fn test_reduced_motion_toggle_neutralizes_page() {
        let mut app = app(raw_config(), false);
        app.engine.on_scroll(400.0);
        app.frame(ms(16));
        assert!(app.hero_transforms().center_scale > 1.0);

        app.handle_action(Action::ToggleReducedMotion, ms(20));
        assert!(app.is_reduced_motion());
        assert_eq!(app.hero_transforms(), HeroTransforms::rest());
        assert_eq!(app.animation_config().entrance_duration, Duration::ZERO);
        for layer in app.parallax.layers() {
            assert_eq!(layer.offset, 0.0);
        }
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_resize_updates_geometry() {
        let mut app = app(raw_config(), false);
        app.handle_action(Action::SelectItem(2), ms(0));
        app.on_resize(120, 40);
        assert_eq!(app.engine.metrics(), app.layout.metrics());
        let carousel = app.carousel.as_ref().unwrap();
        assert!((carousel.item_width() - 960.0 * 0.7).abs() < 1e-9);
        assert_eq!(carousel.view().position, -2.0 * carousel.item_width());
        for (attractor, card) in app.attractors.iter().zip(&app.layout.amenities) {
            assert_eq!(attractor.center(), card.center());
        }
    }

    #[test]
    fn test_amenities_reveal_clock_starts_when_visible() {
        let mut app = app(raw_config(), false);
        app.frame(ms(16));
        assert!(app.amenities_revealed_at.is_none());

        let amenities = app.layout.section(SectionKind::Amenities).unwrap();
        app.engine.on_scroll(amenities.bounds().top);
        app.frame(ms(32));
        assert_eq!(app.amenities_revealed_at, Some(ms(32)));
    }
}
