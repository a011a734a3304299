use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
    #[serde(default)]
    pub animation: AnimationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Where the initial reduced-motion value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducedMotionSource {
    /// Read the platform signal (`CEDROS_REDUCED_MOTION`)
    #[default]
    System,
    /// Behave as if the platform requested reduced motion
    Reduce,
    /// Behave as if the platform requested full motion
    NoPreference,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub reduced_motion: ReducedMotionSource,
}

/// Easing curve used by the smooth-scroll driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump at the end of the duration
    None,
    Linear,
    Cubic,
    Quintic,
    /// 1.001 - 2^(-10t), capped at 1
    #[default]
    ExponentialOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Emulate smooth scrolling with a virtual scroll position
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Duration of one eased scroll glide in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub duration_ms: u64,
    /// Easing curve for the glide
    #[serde(default)]
    pub easing: EasingType,
    /// Multiplier applied to wheel deltas
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
    /// Frame rate of the host frame loop
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            duration_ms: default_scroll_duration(),
            easing: EasingType::default(),
            wheel_multiplier: default_wheel_multiplier(),
            animation_fps: default_animation_fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Extra pixels around the viewport in which layers still count as visible
    #[serde(default = "default_visibility_margin")]
    pub visibility_margin: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            visibility_margin: default_visibility_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Velocity multiplier applied on every coasting frame
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Speed (px per frame) at or below which the carousel snaps
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    /// Fraction of pointer travel applied beyond the track bounds while dragging
    #[serde(default = "default_elasticity")]
    pub elasticity: f64,
    /// Item width as a fraction of the viewport width
    #[serde(default = "default_item_width_ratio")]
    pub item_width_ratio: f64,
    /// Frame duration velocity is normalized to
    #[serde(default = "default_velocity_frame_ms")]
    pub velocity_frame_ms: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            friction: default_friction(),
            snap_threshold: default_snap_threshold(),
            elasticity: default_elasticity(),
            item_width_ratio: default_item_width_ratio(),
            velocity_frame_ms: default_velocity_frame_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Capture radius around the element centre
    #[serde(default = "default_capture_radius")]
    pub radius: f64,
    /// Linear attraction factor
    #[serde(default = "default_magnetic_strength")]
    pub strength: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            radius: default_capture_radius(),
            strength: default_magnetic_strength(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Entrance animation duration in milliseconds
    #[serde(default = "default_entrance_duration")]
    pub entrance_duration_ms: u64,
    /// Delay between staggered reveals in milliseconds
    #[serde(default = "default_stagger_delay")]
    pub stagger_delay_ms: u64,
    /// Ken-burns zoom speed (scale units per second)
    #[serde(default = "default_ken_burns_speed")]
    pub ken_burns_speed: f64,
    /// scrollY above which the navigation bar turns solid
    #[serde(default = "default_nav_scrolled_threshold")]
    pub nav_scrolled_threshold: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            entrance_duration_ms: default_entrance_duration(),
            stagger_delay_ms: default_stagger_delay(),
            ken_burns_speed: default_ken_burns_speed(),
            nav_scrolled_threshold: default_nav_scrolled_threshold(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.local/share/cedros")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_scroll_duration() -> u64 {
    1200
}

fn default_wheel_multiplier() -> f64 {
    1.0
}

fn default_animation_fps() -> u32 {
    60
}

fn default_visibility_margin() -> f64 {
    100.0
}

fn default_friction() -> f64 {
    0.92
}

fn default_snap_threshold() -> f64 {
    0.5
}

fn default_elasticity() -> f64 {
    0.1
}

fn default_item_width_ratio() -> f64 {
    0.7
}

fn default_velocity_frame_ms() -> f64 {
    16.0 // ~60fps
}

fn default_capture_radius() -> f64 {
    100.0
}

fn default_magnetic_strength() -> f64 {
    0.15
}

fn default_entrance_duration() -> u64 {
    800
}

fn default_stagger_delay() -> u64 {
    100
}

fn default_ken_burns_speed() -> f64 {
    0.005 // 1.0 to 1.1 over 20 seconds
}

fn default_nav_scrolled_threshold() -> f64 {
    50.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the physics cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let c = &self.carousel;
        if !(c.friction > 0.0 && c.friction < 1.0) {
            return Err(crate::Error::Config(format!(
                "carousel.friction must be in (0, 1), got {}",
                c.friction
            )));
        }
        if !(c.snap_threshold > 0.0) {
            return Err(crate::Error::Config(
                "carousel.snap_threshold must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&c.elasticity) {
            return Err(crate::Error::Config(
                "carousel.elasticity must be in [0, 1]".to_string(),
            ));
        }
        if !(c.velocity_frame_ms > 0.0) {
            return Err(crate::Error::Config(
                "carousel.velocity_frame_ms must be positive".to_string(),
            ));
        }
        if !(self.proximity.radius >= 0.0) {
            return Err(crate::Error::Config(
                "proximity.radius must not be negative".to_string(),
            ));
        }
        if self.scroll.wheel_multiplier.is_nan() {
            return Err(crate::Error::Config(
                "scroll.wheel_multiplier must be a number".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/cedros/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cedros")
            .join("config.toml")
    }

    /// Get the log file path used by the interactive page
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("cedros.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}
