//! Configuration file support for the image map.
//!
//! Every tunable the viewer core needs (viewport sizing policy, gesture
//! thresholds, fling decay, display density, bubble text size, cache budget)
//! lives in [`ViewerConfig`], which round-trips through JSON.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub viewport: ViewportConfig,

    #[serde(default)]
    pub gesture: GestureConfig,

    #[serde(default)]
    pub fling: FlingConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub bubble: BubbleConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the image is initially sized against the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// true: stretch the image to exactly the viewport (aspect may break).
    /// false: keep aspect and cover the dominant viewport dimension.
    #[serde(default = "default_fit_to_screen")]
    pub fit_to_screen: bool,

    /// Maximum zoom as a multiple of the initial size (fit-to-screen only).
    /// 1.0 disables zooming.
    #[serde(default = "default_max_size_factor")]
    pub max_size_factor: f32,
}

fn default_fit_to_screen() -> bool {
    true
}

fn default_max_size_factor() -> f32 {
    constants::DEFAULT_MAX_SIZE_FACTOR
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fit_to_screen: default_fit_to_screen(),
            max_size_factor: default_max_size_factor(),
        }
    }
}

/// Thresholds for the gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Movement (px) a pointer must exceed before a drag starts; also the
    /// pinch distance change needed before a resize step.
    #[serde(default = "default_touch_slop")]
    pub touch_slop: f32,

    /// A release velocity component (px/s) must exceed this to fling.
    #[serde(default = "default_min_fling_velocity")]
    pub min_fling_velocity: f32,

    /// Release velocity components are clamped to this (px/s).
    #[serde(default = "default_max_fling_velocity")]
    pub max_fling_velocity: f32,

    /// Age limit (ms) for samples feeding the release velocity.
    #[serde(default = "default_velocity_horizon_ms")]
    pub velocity_horizon_ms: u64,
}

fn default_touch_slop() -> f32 {
    constants::DEFAULT_TOUCH_SLOP
}

fn default_min_fling_velocity() -> f32 {
    constants::DEFAULT_MIN_FLING_VELOCITY
}

fn default_max_fling_velocity() -> f32 {
    constants::DEFAULT_MAX_FLING_VELOCITY
}

fn default_velocity_horizon_ms() -> u64 {
    constants::DEFAULT_VELOCITY_HORIZON_MS
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: default_touch_slop(),
            min_fling_velocity: default_min_fling_velocity(),
            max_fling_velocity: default_max_fling_velocity(),
            velocity_horizon_ms: default_velocity_horizon_ms(),
        }
    }
}

/// Fling decay parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlingConfig {
    /// Exponential decay time constant (ms).
    #[serde(default = "default_fling_time_constant_ms")]
    pub time_constant_ms: f32,

    /// Speed (px/s) under which the fling stops.
    #[serde(default = "default_fling_settle_velocity")]
    pub settle_velocity: f32,
}

fn default_fling_time_constant_ms() -> f32 {
    constants::DEFAULT_FLING_TIME_CONSTANT_MS
}

fn default_fling_settle_velocity() -> f32 {
    constants::DEFAULT_FLING_SETTLE_VELOCITY
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            time_constant_ms: default_fling_time_constant_ms(),
            settle_velocity: default_fling_settle_velocity(),
        }
    }
}

/// Display properties of the target device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Physical pixels per logical pixel.
    #[serde(default = "default_density")]
    pub density: f32,
}

fn default_density() -> f32 {
    constants::DEFAULT_DENSITY
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
        }
    }
}

/// Bubble text settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleConfig {
    #[serde(default = "default_bubble_text_size")]
    pub text_size: f32,
}

fn default_bubble_text_size() -> f32 {
    constants::DEFAULT_BUBBLE_TEXT_SIZE
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            text_size: default_bubble_text_size(),
        }
    }
}

/// Image cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Pixel budget in bytes (RGBA, 4 bytes per pixel).
    #[serde(default = "default_cache_budget_bytes")]
    pub budget_bytes: usize,
}

fn default_cache_budget_bytes() -> usize {
    constants::DEFAULT_CACHE_BUDGET_BYTES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            budget_bytes: default_cache_budget_bytes(),
        }
    }
}

impl ViewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            viewport: ViewportConfig::default(),
            gesture: GestureConfig::default(),
            fling: FlingConfig::default(),
            display: DisplayConfig::default(),
            bubble: BubbleConfig::default(),
            cache: CacheConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read configuration from a file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "imagemap-config.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("imagemap").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("imagemap")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}
