//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes.
//! The tick rate can also be overridden from the environment.

use std::path::{Path, PathBuf};

use engine_render::{GlyphMetrics, Viewport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::tick::{MAX_TICK_RATE, MIN_TICK_RATE, TickConfig};

/// Environment variable overriding [`EngineConfig::tick_rate`].
pub const TICK_RATE_ENV: &str = "ENGINE_TICK_RATE";

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Terminal window title, set when the terminal is entered.
    pub title: String,
    /// Initial viewport width in pixels.
    pub viewport_width: u32,
    /// Initial viewport height in pixels.
    pub viewport_height: u32,
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Initial zoom factor.
    pub zoom: f32,
    /// Zoom change per key press.
    pub zoom_step: f32,
    /// Ticks between animation frame advances.
    pub animation_delay: u64,
    /// Glyph advance width in pixels.
    pub glyph_width: f32,
    /// Glyph line height in pixels.
    pub glyph_height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "ascii-engine".to_string(),
            viewport_width: 800,
            viewport_height: 600,
            tick_rate: 60.0,
            max_ticks: 0,
            zoom: 1.0,
            zoom_step: 0.005,
            animation_delay: 30,
            glyph_width: 9.0,
            glyph_height: 15.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or mistyped values.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid config.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is not parseable.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is not parseable.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(TICK_RATE_ENV) {
            let rate = raw.trim().parse::<f64>().map_err(|err| {
                ConfigError::Invalid(format!("{TICK_RATE_ENV}={raw:?}: {err}"))
            })?;
            debug!(tick_rate = rate, "tick rate overridden from environment");
            self.tick_rate = rate;
        }
        Ok(self)
    }

    /// Check the invariants the runtime relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TickConfig::is_valid_rate(self.tick_rate) {
            return Err(ConfigError::Invalid(format!(
                "tick_rate must be between {MIN_TICK_RATE} and {MAX_TICK_RATE}, got {}",
                self.tick_rate
            )));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-zero, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        if self.animation_delay == 0 {
            return Err(ConfigError::Invalid(
                "animation_delay must be at least 1 tick".to_string(),
            ));
        }
        if !(self.glyph_width > 0.0 && self.glyph_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "glyph metrics must be positive, got {}x{}",
                self.glyph_width, self.glyph_height
            )));
        }
        if !(self.zoom.is_finite() && self.zoom_step.is_finite()) {
            return Err(ConfigError::Invalid("zoom must be finite".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    #[must_use]
    pub fn with_animation_delay(mut self, delay: u64) -> Self {
        self.animation_delay = delay;
        self
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width as f32, self.viewport_height as f32)
    }

    #[must_use]
    pub fn glyph_metrics(&self) -> GlyphMetrics {
        GlyphMetrics::new(self.glyph_width, self.glyph_height)
    }

    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            max_ticks: self.max_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.title, "ascii-engine");
        assert_eq!(config.viewport(), Viewport::new(800.0, 600.0));
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.max_ticks, 0);
        assert_eq!(config.animation_delay, 30);
        assert_eq!(config.glyph_metrics(), GlyphMetrics::BITMAP_9_BY_15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "tick_rate": 30, "zoom": 2.0 }"#).unwrap();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.viewport_width, 800);
        assert_eq!(config.animation_delay, 30);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = EngineConfig::from_json_str(r#"{ "tick_rate": "fast" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_json_file_round_trip() {
        let path = std::env::temp_dir().join(format!("engine_config_{}.json", std::process::id()));
        let config = EngineConfig::default().with_max_ticks(12).with_viewport(320, 200);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = EngineConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_override() {
        let config = EngineConfig::default()
            .with_overrides_from(|key| (key == TICK_RATE_ENV).then(|| " 120 ".to_string()))
            .unwrap();
        assert_eq!(config.tick_rate, 120.0);

        let untouched = EngineConfig::default().with_overrides_from(|_| None).unwrap();
        assert_eq!(untouched.tick_rate, 60.0);
    }

    #[test]
    fn test_bad_env_override_is_invalid() {
        let err = EngineConfig::default()
            .with_overrides_from(|_| Some("sixty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(EngineConfig::default().with_tick_rate(0.0).validate().is_err());
        assert!(EngineConfig::default().with_tick_rate(f64::NAN).validate().is_err());
        assert!(EngineConfig::default().with_viewport(0, 600).validate().is_err());
        assert!(EngineConfig::default().with_animation_delay(0).validate().is_err());

        let mut config = EngineConfig::default();
        config.glyph_height = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_tick_rate() {
        for rate in [1e-20, -1.0, f64::INFINITY, 1e9] {
            let config = EngineConfig::default().with_tick_rate(rate);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "tick_rate {rate} accepted"
            );
        }

        let from_env = EngineConfig::default()
            .with_overrides_from(|_| Some("1e-20".to_string()))
            .unwrap();
        assert!(from_env.validate().is_err());
    }

    #[test]
    fn test_tick_config_mirrors_fields() {
        let tick = EngineConfig::default().with_tick_rate(30.0).with_max_ticks(5).tick_config();
        assert_eq!(tick.tick_rate, 30.0);
        assert_eq!(tick.max_ticks, 5);
    }
}
