//! Editor configuration: item defaults and clamping bounds.

use serde::{Deserialize, Serialize};

use crate::TextColor;

/// An inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    /// Lower bound (inclusive).
    pub min: T,
    /// Upper bound (inclusive).
    pub max: T,
}

impl Bounds<f32> {
    /// Clamp a value into the range.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

impl Bounds<u32> {
    /// Clamp a value into the range.
    #[must_use]
    pub fn clamp(&self, value: u32) -> u32 {
        value.max(self.min).min(self.max)
    }
}

/// Configuration for newly placed items and for clamping edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial position of a new item, in percent of the container.
    pub default_position: (f32, f32),
    /// Initial font size in pixels.
    pub default_font_size: u32,
    /// Initial fill color.
    pub default_color: TextColor,
    /// Allowed range for `x`/`y` in percent.
    pub position_bounds: Bounds<f32>,
    /// Allowed range for the font size in pixels.
    pub font_size_bounds: Bounds<u32>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_position: (50.0, 50.0),
            default_font_size: 32,
            default_color: TextColor::White,
            position_bounds: Bounds {
                min: 5.0,
                max: 95.0,
            },
            font_size_bounds: Bounds { min: 16, max: 100 },
        }
    }
}

impl EditorConfig {
    /// Set the default font size for new items.
    #[must_use]
    pub fn with_default_font_size(mut self, size: u32) -> Self {
        self.default_font_size = size;
        self
    }

    /// Set the default color for new items.
    #[must_use]
    pub fn with_default_color(mut self, color: TextColor) -> Self {
        self.default_color = color;
        self
    }

    /// Parse a configuration from JSON; omitted fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> crate::CardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_editor_conventions() {
        let config = EditorConfig::default();
        assert!((config.default_position.0 - 50.0).abs() < f32::EPSILON);
        assert!((config.default_position.1 - 50.0).abs() < f32::EPSILON);
        assert_eq!(config.default_font_size, 32);
        assert_eq!(config.default_color, TextColor::White);
        assert!((config.position_bounds.clamp(120.0) - 95.0).abs() < f32::EPSILON);
        assert_eq!(config.font_size_bounds.clamp(4), 16);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r##"{"default_color":"#fbbf24"}"##).expect("parse");
        assert_eq!(config.default_color, TextColor::Amber);
        assert_eq!(config.default_font_size, 32);
    }
}
