//! Draw Styles
//!
//! Plain data describing how primitives are painted. Serializable so the
//! frontend can persist style tweaks in its preferences file.

use serde::{Deserialize, Serialize};

/// RGBA color with components in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(0.86, 0.2, 0.18);
    pub const GREEN: Color = Color::rgb(0.18, 0.65, 0.28);
    pub const BLUE: Color = Color::rgb(0.2, 0.35, 0.85);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);

    /// An opaque color from RGB components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }
}

/// How a primitive is painted and picked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Stroke color
    pub color: Color,
    /// Stroke width in pixels
    pub width: f32,
    /// Hover pick distance in pixels
    pub picker_radius: f64,
}

impl Style {
    /// Sets the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the stroke width
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Sets the pick distance
    pub fn with_picker_radius(mut self, radius: f64) -> Self {
        self.picker_radius = radius;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Style {
            color: Color::BLACK,
            width: 1.5,
            picker_radius: 20.0,
        }
    }
}
