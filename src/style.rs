//! Colors and text sizes for the worksheet rows

use serde::Deserialize;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values should be 0.0-1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a color from 8-bit channels
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb8(r, g, b)
    }
}

/// Colors and fixed text sizes shared by every passage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorksheetStyle {
    /// Full-emphasis source characters
    pub original_color: Color,
    /// Reading, translation and gloss text
    pub interpretation_color: Color,
    /// Faint trace-over characters
    pub ghost_color: Color,
    pub border_color: Color,
    /// Dashed cross-hair guides
    pub cross_color: Color,
    pub label_color: Color,
    pub label_font_size: f32,
    pub reading_font_size: f32,
    pub translation_font_size: f32,
    pub gloss_font_size: f32,
    /// Used when a gloss at `gloss_font_size` overflows its cell
    pub gloss_min_font_size: f32,
    pub ruled_label_font_size: f32,
    pub ruled_label: String,
}

impl Default for WorksheetStyle {
    fn default() -> Self {
        Self {
            original_color: Color::rgb8(30, 30, 30),
            interpretation_color: Color::rgb8(80, 80, 80),
            ghost_color: Color::rgb8(220, 220, 220),
            border_color: Color::rgb8(180, 180, 180),
            cross_color: Color::rgb8(210, 210, 210),
            label_color: Color::rgb8(60, 60, 60),
            label_font_size: 9.0,
            reading_font_size: 8.0,
            translation_font_size: 9.0,
            gloss_font_size: 7.0,
            gloss_min_font_size: 5.0,
            ruled_label_font_size: 7.0,
            ruled_label: "[해석 필사]".to_string(),
        }
    }
}

impl WorksheetStyle {
    /// Set the faint tone used for trace-over characters
    pub fn with_ghost_color(mut self, color: Color) -> Self {
        self.ghost_color = color;
        self
    }

    /// Set the label printed above the ruled practice lines
    pub fn with_ruled_label<S: Into<String>>(mut self, label: S) -> Self {
        self.ruled_label = label.into();
        self
    }
}
