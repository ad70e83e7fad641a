//! Cell sizing and line wrapping for passages

use crate::Result;
use crate::constants::*;
use crate::error::WorksheetError;
use serde::Deserialize;
use std::ops::Range;
use tracing::{debug, instrument, trace};

/// Page size and margins in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageGeometry {
    /// Create an A4 portrait page with the default margins
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            margin_left: DEFAULT_SIDE_MARGIN,
            margin_right: DEFAULT_SIDE_MARGIN,
            margin_top: DEFAULT_TOP_MARGIN,
            margin_bottom: DEFAULT_BOTTOM_MARGIN,
        }
    }

    /// Set all four margins
    pub fn with_margins(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.margin_top = top;
        self.margin_right = right;
        self.margin_bottom = bottom;
        self.margin_left = left;
        self
    }

    /// Page width minus the left and right margins
    pub fn usable_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Page height minus the top and bottom margins
    pub fn usable_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Lowest vertical offset content may reach before overflowing the page
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin_bottom
    }

    /// Reject geometries that leave no drawable area
    pub fn validate(&self) -> Result<()> {
        let margins = [
            self.margin_left,
            self.margin_right,
            self.margin_top,
            self.margin_bottom,
        ];
        if margins.iter().any(|m| *m < 0.0) {
            return Err(WorksheetError::ConfigError(format!(
                "Page margins must not be negative, got {margins:?}"
            )));
        }
        if self.usable_width() <= 0.0 {
            return Err(WorksheetError::ConfigError(format!(
                "Usable width is {} mm (page {} mm, margins {} + {})",
                self.usable_width(),
                self.width,
                self.margin_left,
                self.margin_right
            )));
        }
        if self.usable_height() <= 0.0 {
            return Err(WorksheetError::ConfigError(format!(
                "Usable height is {} mm (page {} mm, margins {} + {})",
                self.usable_height(),
                self.height,
                self.margin_top,
                self.margin_bottom
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Sizes, gaps and ratios that stay fixed for one document build
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParameters {
    /// Nominal cell size; must lie between the minimum and maximum
    pub default_cell_size: f32,
    pub min_cell_size: f32,
    pub max_cell_size: f32,
    pub border_width: f32,
    /// Stroke width of the ruled translation-practice lines
    pub rule_width: f32,
    pub dash_width: f32,
    pub dash_length: f32,
    pub dash_gap: f32,
    pub label_height: f32,
    pub reading_height: f32,
    /// Height of the gloss line under each character and of the annotation box
    pub gloss_height: f32,
    pub ruled_line_height: f32,
    pub ruled_line_count: usize,
    /// Space taken by the label above the ruled lines
    pub ruled_label_height: f32,
    pub row_gap: f32,
    pub passage_gap: f32,
    /// Glyph size relative to the cell size
    pub font_ratio: f32,
    /// Page length units to font-size units
    pub unit_conversion: f32,
    pub baseline_ratio: f32,
    /// Space left after the translation paragraph
    pub trailing_spacing: f32,
    pub translation_line_height: f32,
    /// How far a gloss may exceed its cell before it is set smaller
    pub gloss_overflow_margin: f32,
}

impl Default for LayoutParameters {
    fn default() -> Self {
        Self {
            default_cell_size: DEFAULT_CELL_SIZE,
            min_cell_size: MIN_CELL_SIZE,
            max_cell_size: MAX_CELL_SIZE,
            border_width: 0.3,
            rule_width: 0.2,
            dash_width: 0.15,
            dash_length: 1.5,
            dash_gap: 1.5,
            label_height: 7.0,
            reading_height: 6.0,
            gloss_height: 5.0,
            ruled_line_height: 12.0,
            ruled_line_count: 3,
            ruled_label_height: 6.0,
            row_gap: 4.0,
            passage_gap: 12.0,
            font_ratio: DEFAULT_FONT_RATIO,
            unit_conversion: MM_TO_PT,
            baseline_ratio: BASELINE_RATIO,
            trailing_spacing: 2.0,
            translation_line_height: 5.0,
            gloss_overflow_margin: 2.0,
        }
    }
}

impl LayoutParameters {
    /// Set the minimum and maximum cell sizes
    pub fn with_cell_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_cell_size = min;
        self.max_cell_size = max;
        self.default_cell_size = self.default_cell_size.clamp(min.min(max), max.max(min));
        self
    }

    /// Set the number of ruled translation-practice lines
    pub fn with_ruled_lines(mut self, count: usize, line_height: f32) -> Self {
        self.ruled_line_count = count;
        self.ruled_line_height = line_height;
        self
    }

    /// Total height of the ruled-line block, label included
    pub fn ruled_block_height(&self) -> f32 {
        self.ruled_label_height + self.ruled_line_count as f32 * self.ruled_line_height
    }

    /// Check the parameters against the usable width of the page
    pub fn validate(&self, usable_width: f32) -> Result<()> {
        if self.min_cell_size <= 0.0 {
            return Err(WorksheetError::ConfigError(format!(
                "Minimum cell size must be positive, got {}",
                self.min_cell_size
            )));
        }
        if self.min_cell_size > self.max_cell_size {
            return Err(WorksheetError::ConfigError(format!(
                "Minimum cell size {} exceeds maximum cell size {}",
                self.min_cell_size, self.max_cell_size
            )));
        }
        if !(self.min_cell_size..=self.max_cell_size).contains(&self.default_cell_size) {
            return Err(WorksheetError::ConfigError(format!(
                "Default cell size {} is outside {}..={}",
                self.default_cell_size, self.min_cell_size, self.max_cell_size
            )));
        }
        if usable_width < self.min_cell_size {
            return Err(WorksheetError::DimensionError(format!(
                "Usable width {} mm cannot hold a single {} mm cell",
                usable_width, self.min_cell_size
            )));
        }
        if self.font_ratio <= 0.0 || self.unit_conversion <= 0.0 {
            return Err(WorksheetError::ConfigError(
                "Font ratio and unit conversion must be positive".to_string(),
            ));
        }
        if self.translation_line_height <= 0.0 {
            return Err(WorksheetError::ConfigError(
                "Translation line height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cell size and characters per line for one passage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBreakPlan {
    pub cell_size: f32,
    pub chars_per_line: usize,
}

impl LineBreakPlan {
    /// Number of grid lines needed for `char_count` characters
    pub fn rows_needed(&self, char_count: usize) -> usize {
        char_count.div_ceil(self.chars_per_line)
    }

    /// Index ranges of the characters on each line
    pub fn line_ranges(&self, char_count: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..char_count)
            .step_by(self.chars_per_line)
            .map(move |start| start..(start + self.chars_per_line).min(char_count))
    }

    /// Glyph size in points for characters drawn in this plan's cells
    pub fn font_size(&self, params: &LayoutParameters) -> f32 {
        self.cell_size * params.font_ratio * params.unit_conversion
    }
}

/// Choose a square cell size and line length for a passage
///
/// Short passages get the largest cell that fits, long passages shrink to fill
/// one line and wrap at the minimum cell size once even that no longer fits.
#[instrument(level = "debug")]
pub fn compute_layout(
    char_count: usize,
    usable_width: f32,
    min_cell: f32,
    max_cell: f32,
) -> Result<LineBreakPlan> {
    if char_count == 0 {
        return Err(WorksheetError::DimensionError(
            "Cannot lay out a passage with no characters".to_string(),
        ));
    }

    let full_width_cell = usable_width / char_count as f32;

    let plan = if char_count <= SHORT_PASSAGE_CHARS {
        LineBreakPlan {
            cell_size: full_width_cell.min(max_cell).max(min_cell),
            chars_per_line: char_count,
        }
    } else if full_width_cell >= min_cell {
        // Covers both the 7..=9 case and longer passages that still fit
        trace!(
            "{} characters fit one line at {:.2} mm",
            char_count, full_width_cell
        );
        LineBreakPlan {
            cell_size: full_width_cell,
            chars_per_line: char_count,
        }
    } else {
        let chars_per_line = (usable_width / min_cell).floor() as usize;
        if chars_per_line == 0 {
            return Err(WorksheetError::DimensionError(format!(
                "Usable width {usable_width} mm is narrower than the minimum cell {min_cell} mm"
            )));
        }
        LineBreakPlan {
            cell_size: min_cell,
            chars_per_line,
        }
    };

    debug!(
        "Layout for {} characters: cell {:.2} mm, {} per line",
        char_count, plan.cell_size, plan.chars_per_line
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_passages_stay_on_one_line() {
        for n in 1..=6 {
            let plan = compute_layout(n, 180.0, 20.0, 30.0).unwrap();
            assert_eq!(plan.chars_per_line, n);
            let expected = (180.0 / n as f32).min(30.0).max(20.0);
            assert_eq!(plan.cell_size, expected);
        }
    }

    #[test]
    fn test_short_passage_capped_at_max_cell() {
        let plan = compute_layout(3, 180.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 30.0);
        assert_eq!(plan.chars_per_line, 3);
    }

    #[test]
    fn test_short_passage_clamped_up_to_min_cell() {
        // 100 / 6 is below the minimum, the minimum wins and the line stays whole
        let plan = compute_layout(6, 100.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 20.0);
        assert_eq!(plan.chars_per_line, 6);
    }

    #[test]
    fn test_nine_characters_exactly_at_min_cell() {
        let plan = compute_layout(9, 180.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 20.0);
        assert_eq!(plan.chars_per_line, 9);
    }

    #[test]
    fn test_long_passage_that_still_fits_one_line() {
        let plan = compute_layout(8, 200.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 25.0);
        assert_eq!(plan.chars_per_line, 8);

        let plan = compute_layout(10, 200.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 20.0);
        assert_eq!(plan.chars_per_line, 10);
    }

    #[test]
    fn test_long_passage_wraps_at_min_cell() {
        let plan = compute_layout(12, 180.0, 20.0, 30.0).unwrap();
        assert_eq!(plan.cell_size, 20.0);
        assert_eq!(plan.chars_per_line, 9);
        assert_eq!(plan.rows_needed(12), 2);

        let ranges: Vec<_> = plan.line_ranges(12).collect();
        assert_eq!(ranges, vec![0..9, 9..12]);
    }

    #[test]
    fn test_zero_characters_is_rejected() {
        assert!(matches!(
            compute_layout(0, 180.0, 20.0, 30.0),
            Err(WorksheetError::DimensionError(_))
        ));
    }

    #[test]
    fn test_width_narrower_than_min_cell_is_rejected() {
        assert!(matches!(
            compute_layout(12, 15.0, 20.0, 30.0),
            Err(WorksheetError::DimensionError(_))
        ));
    }

    #[test]
    fn test_font_size_scales_with_cell() {
        let params = LayoutParameters::default();
        let plan = LineBreakPlan {
            cell_size: 20.0,
            chars_per_line: 9,
        };
        let expected = 20.0 * 0.78 / 0.3528;
        assert!((plan.font_size(&params) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_geometry_validation() {
        let page = PageGeometry::a4();
        assert_eq!(page.usable_width(), 180.0);
        assert_eq!(page.usable_height(), 262.0);
        assert!(page.validate().is_ok());

        let squeezed = PageGeometry::a4().with_margins(20.0, 110.0, 15.0, 100.0);
        assert!(matches!(
            squeezed.validate(),
            Err(WorksheetError::ConfigError(_))
        ));
    }

    #[test]
    fn test_parameter_validation() {
        let params = LayoutParameters::default();
        assert!(params.validate(180.0).is_ok());

        let inverted = LayoutParameters {
            min_cell_size: 40.0,
            max_cell_size: 30.0,
            ..LayoutParameters::default()
        };
        assert!(matches!(
            inverted.validate(180.0),
            Err(WorksheetError::ConfigError(_))
        ));

        assert!(matches!(
            params.validate(10.0),
            Err(WorksheetError::DimensionError(_))
        ));
    }

    #[test]
    fn test_ruled_block_height_includes_label() {
        let params = LayoutParameters::default().with_ruled_lines(4, 10.0);
        assert_eq!(params.ruled_block_height(), 46.0);
    }
}
