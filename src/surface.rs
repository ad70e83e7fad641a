//! The drawing surface rows are rendered onto
//!
//! All lengths are in page units (millimetres) measured from the top-left
//! corner of the page; `y` grows downward. Font sizes are in points.

use crate::Result;
use crate::style::Color;
use std::io::Write;

/// Paginated drawing target used by the row renderers
pub trait DrawingSurface {
    /// Width of the current page
    fn page_width(&self) -> f32;

    /// Height of the current page
    fn page_height(&self) -> f32;

    /// One-based index of the current page, 0 before any page is added
    fn page_index(&self) -> usize;

    /// Start a new page and make it current
    fn add_page(&mut self) -> Result<()>;

    fn set_stroke_color(&mut self, color: Color);

    fn set_line_width(&mut self, width: f32);

    /// Dash length and gap for subsequent lines, `None` for solid strokes
    fn set_dash_pattern(&mut self, pattern: Option<(f32, f32)>);

    /// Color used for text
    fn set_text_color(&mut self, color: Color);

    fn set_font_size(&mut self, size: f32);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()>;

    /// Stroke a rectangle whose top-left corner is (x, y)
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()>;

    /// Place text with its baseline starting at (x, y)
    fn text(&mut self, x: f32, y: f32, text: &str) -> Result<()>;

    /// Width of `text` in the current font size
    fn text_width(&self, text: &str) -> f32;

    /// Lay out `text` wrapped to `width`, one line every `line_height`,
    /// starting with the line box whose top is at `y`.
    ///
    /// Returns the vertical offset just below the last line.
    fn paragraph(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        line_height: f32,
        text: &str,
    ) -> Result<f32>;

    /// Finish the document and write it to `out`
    fn write_to(&mut self, out: &mut dyn Write) -> Result<()>;
}
