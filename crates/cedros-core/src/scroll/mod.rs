//! Scroll-state system for the landing page
//!
//! Turns noisy scroll input into one stable snapshot per frame, optionally
//! emulating smooth scrolling with an eased virtual position.
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (cubic, quintic, exponential)
//! - `timing` - Frame-time calculations (progress, interpolation)
//! - `snapshot` - Snapshot type, progress and direction rules
//!
//! ## L3 Molecular Layer
//! - `driver` - Virtual scroll position gliding toward a target
//!
//! ## L2 Organism Layer
//! - `engine` - Frame-coalesced publisher combining the pieces above
//!
//! # Usage
//!
//! ```ignore
//! use cedros_core::scroll::{DocumentMetrics, ScrollEngine};
//!
//! let engine = ScrollEngine::activate(&config.scroll, metrics, &scheduler, &policy);
//! let _sub = engine.subscribe(|snapshot| println!("{}", snapshot.progress));
//!
//! // Input handlers
//! engine.on_wheel(120.0);
//!
//! // Host frame loop
//! scheduler.run_frame(now);
//! ```

// L4 Atomic Layer
pub mod easing;
pub mod snapshot;
pub mod timing;

// L3 Molecular Layer
pub mod driver;

// L2 Organism Layer
pub mod engine;

// Re-exports for convenient access
pub use driver::VirtualScroll;
pub use easing::{EasingType, EasingTypeExt};
pub use engine::{ScrollEngine, ScrollMode};
pub use snapshot::{progress, DocumentMetrics, ScrollDirection, ScrollSnapshot};
