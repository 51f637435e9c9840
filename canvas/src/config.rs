//! Engine tuning knobs.
//!
//! Every value has a compiled-in default from [`crate::consts`]. Hosts can
//! override them through `MOCKUP_*` environment variables via
//! [`EngineConfig::from_env`]; an unset variable keeps the default, while a
//! variable that is set but unparseable is an error rather than a silent
//! fallback.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::consts::{
    BOUNDS_DEBOUNCE_MS, DEFAULT_ZINDEX, MAX_SCALE, MIN_SCALE, PRINTED_IMAGE_MAX_SCALE, ROTATE_SENSITIVITY,
    ZINDEX_STEP, ZOOM_SENSITIVITY,
};
use crate::doc::{ElementType, Transform};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("invalid scale limits for {kind}: min {min}, max {max}")]
    InvalidScaleLimits { kind: &'static str, min: f64, max: f64 },
    #[error("z-index step must be positive, got {0}")]
    NonPositiveStep(i64),
    #[error("{key} must be finite")]
    NonFinite { key: &'static str },
}

/// Inclusive scale range for one element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl ScaleLimits {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into `[min, max]`. NaN maps to `min`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Increment applied by the layer up/down buttons.
    pub zindex_step: i64,
    /// z-index of newly added elements.
    pub default_zindex: i64,
    /// Transform of a new element that cannot be centered.
    pub default_transform: Transform,
    pub rotate_sensitivity: f64,
    pub zoom_sensitivity: f64,
    /// Whether pinch gestures also rotate.
    pub pinch_rotation: bool,
    pub bounds_debounce: Duration,
    pub text_limits: ScaleLimits,
    pub sticker_limits: ScaleLimits,
    pub printed_image_limits: ScaleLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zindex_step: ZINDEX_STEP,
            default_zindex: DEFAULT_ZINDEX,
            default_transform: Transform::default(),
            rotate_sensitivity: ROTATE_SENSITIVITY,
            zoom_sensitivity: ZOOM_SENSITIVITY,
            pinch_rotation: true,
            bounds_debounce: Duration::from_millis(BOUNDS_DEBOUNCE_MS),
            text_limits: ScaleLimits::new(MIN_SCALE, MAX_SCALE),
            sticker_limits: ScaleLimits::new(MIN_SCALE, MAX_SCALE),
            printed_image_limits: ScaleLimits::new(MIN_SCALE, PRINTED_IMAGE_MAX_SCALE),
        }
    }
}

impl EngineConfig {
    /// Scale limits for the given element kind.
    #[must_use]
    pub fn limits_for(&self, kind: ElementType) -> ScaleLimits {
        match kind {
            ElementType::Text => self.text_limits,
            ElementType::Sticker => self.sticker_limits,
            ElementType::PrintedImage => self.printed_image_limits,
        }
    }

    /// Load from `MOCKUP_*` process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but malformed, or the
    /// resulting configuration fails [`EngineConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|key| std::env::var_os(key).map(|v| v.to_string_lossy().into_owned()))?;
        info!(
            zindex_step = config.zindex_step,
            debounce_ms = config.bounds_debounce.as_millis(),
            pinch_rotation = config.pinch_rotation,
            "engine config loaded"
        );
        Ok(config)
    }

    /// Load from an arbitrary key lookup. `from_env` delegates here; tests
    /// pass a map instead of touching the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limits = |prefix: &str, fallback: ScaleLimits| -> Result<ScaleLimits, ConfigError> {
            Ok(ScaleLimits {
                min: parse_or(&lookup, &format!("MOCKUP_{prefix}_MIN_SCALE"), fallback.min)?,
                max: parse_or(&lookup, &format!("MOCKUP_{prefix}_MAX_SCALE"), fallback.max)?,
            })
        };
        let config = Self {
            zindex_step: parse_or(&lookup, "MOCKUP_ZINDEX_STEP", defaults.zindex_step)?,
            default_zindex: parse_or(&lookup, "MOCKUP_DEFAULT_ZINDEX", defaults.default_zindex)?,
            default_transform: defaults.default_transform,
            rotate_sensitivity: parse_or(&lookup, "MOCKUP_ROTATE_SENSITIVITY", defaults.rotate_sensitivity)?,
            zoom_sensitivity: parse_or(&lookup, "MOCKUP_ZOOM_SENSITIVITY", defaults.zoom_sensitivity)?,
            pinch_rotation: parse_or(&lookup, "MOCKUP_PINCH_ROTATION", defaults.pinch_rotation)?,
            bounds_debounce: Duration::from_millis(parse_or(&lookup, "MOCKUP_BOUNDS_DEBOUNCE_MS", BOUNDS_DEBOUNCE_MS)?),
            text_limits: limits("TEXT", defaults.text_limits)?,
            sticker_limits: limits("STICKER", defaults.sticker_limits)?,
            printed_image_limits: limits("PHOTO", defaults.printed_image_limits)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zindex_step <= 0 {
            return Err(ConfigError::NonPositiveStep(self.zindex_step));
        }
        if !self.rotate_sensitivity.is_finite() {
            return Err(ConfigError::NonFinite { key: "rotate_sensitivity" });
        }
        if !self.zoom_sensitivity.is_finite() {
            return Err(ConfigError::NonFinite { key: "zoom_sensitivity" });
        }
        for kind in [ElementType::Text, ElementType::Sticker, ElementType::PrintedImage] {
            let limits = self.limits_for(kind);
            if !limits.is_valid() {
                return Err(ConfigError::InvalidScaleLimits { kind: kind.as_str(), min: limits.min, max: limits.max });
            }
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Invalid { key: key.to_owned(), value: raw }),
    }
}
