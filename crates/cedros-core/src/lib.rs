pub mod carousel;
pub mod config;
pub mod error;
pub mod frame;
pub mod motion;
pub mod parallax;
pub mod proximity;
pub mod publisher;
pub mod scroll;
pub mod sections;

pub use carousel::{CarouselPhase, CarouselView, InertialCarousel};
pub use config::{AppConfig, EasingType, ScrollConfig};
pub use error::{Error, Result};
pub use frame::{FrameHandle, FrameScheduler, FrameTime, OwnerId};
pub use motion::{AnimationConfig, ReducedMotionPolicy};
pub use parallax::{LayerBounds, ParallaxLayerSpec, ParallaxProjector};
pub use proximity::{MagneticOffset, Point, ProximityAttractor};
pub use publisher::{StatePublisher, Subscription};
pub use scroll::{DocumentMetrics, ScrollDirection, ScrollEngine, ScrollSnapshot};
