//! Constants for worksheet dimensions and common values
//!
//! Page lengths are in millimetres, font sizes in points.

/// A4 page width in millimetres
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 page height in millimetres
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Default left and right page margin in millimetres
pub const DEFAULT_SIDE_MARGIN: f32 = 15.0;

/// Default top page margin in millimetres
pub const DEFAULT_TOP_MARGIN: f32 = 20.0;

/// Default bottom page margin in millimetres
pub const DEFAULT_BOTTOM_MARGIN: f32 = 15.0;

/// PDF points per millimetre (1 inch = 72 points = 25.4 mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Millimetre to font-size (point) factor used for glyph sizing
pub const MM_TO_PT: f32 = 1.0 / 0.3528;

/// Default square cell size in millimetres
pub const DEFAULT_CELL_SIZE: f32 = 30.0;

/// Smallest cell a passage may shrink to before wrapping
pub const MIN_CELL_SIZE: f32 = 20.0;

/// Largest cell a short passage may grow to
pub const MAX_CELL_SIZE: f32 = 30.0;

/// Glyph size as a fraction of the cell size
pub const DEFAULT_FONT_RATIO: f32 = 0.78;

/// Baseline offset as a fraction of cell height, measured from the cell top
pub const BASELINE_RATIO: f32 = 0.72;

/// Passages up to this many characters always stay on a single line
pub const SHORT_PASSAGE_CHARS: usize = 6;

/// Default character width ratio for text estimation
/// (average character width as a fraction of font size)
pub const DEFAULT_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Width ratio used for ideographs and Hangul when no font metrics are available
pub const WIDE_CHAR_WIDTH_RATIO: f32 = 1.0;

/// Baseline of label and reading text as a fraction of their line height
pub const LABEL_BASELINE_RATIO: f32 = 0.65;

/// Baseline of a gloss as a fraction of the gloss line height
pub const GLOSS_BASELINE_RATIO: f32 = 0.7;

/// Indent of reading and translation text from the left margin, in millimetres
pub const TEXT_INDENT: f32 = 1.0;
