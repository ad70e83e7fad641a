//! Measuring and encoding text for the page font

use crate::Result;
use crate::constants::{DEFAULT_CHAR_WIDTH_RATIO, WIDE_CHAR_WIDTH_RATIO};
use crate::error::WorksheetError;
use crate::text::is_wide_char;
use tracing::debug;

/// Leading tag of a TrueType/OpenType collection file
const COLLECTION_TAG: &[u8; 4] = b"ttcf";

/// Measures and encodes text in one font. Widths are in points.
pub trait FontMetrics {
    fn char_width(&self, ch: char, font_size: f32) -> f32;

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Encode text for the PDF Tj operator
    fn encode_text(&self, text: &str) -> Vec<u8>;
}

/// Width of `ch` when no real font is available
fn estimated_char_width(ch: char, font_size: f32) -> f32 {
    if is_wide_char(ch) {
        font_size * WIDE_CHAR_WIDTH_RATIO
    } else {
        font_size * DEFAULT_CHAR_WIDTH_RATIO
    }
}

/// Metrics for the built-in Helvetica fallback font.
///
/// Ideographs and Hangul are measured as full em squares, everything else as
/// half an em. Text is encoded as single bytes; characters outside Latin-1
/// become `?` since the standard fonts cannot show them.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl FontMetrics for EstimatedMetrics {
    fn char_width(&self, ch: char, font_size: f32) -> f32 {
        estimated_char_width(ch, font_size)
    }

    fn encode_text(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
            .collect()
    }
}

/// A TrueType or OpenType font loaded for embedding.
///
/// The font program is kept as bytes and re-parsed with ttf-parser whenever a
/// glyph is looked up.
pub struct TtfFontMetrics {
    font_data: Vec<u8>,
    units_per_em: f32,
    ascender: i16,
    descender: i16,
    cff_outlines: bool,
}

impl TtfFontMetrics {
    /// Parse raw font bytes, failing with [`WorksheetError::FontError`] if they are not a font.
    ///
    /// For a collection (`.ttc`) the first face is copied out into a
    /// standalone font program, since PDF font files hold a single font.
    pub fn new(font_data: Vec<u8>) -> Result<Self> {
        let font_data = if font_data.starts_with(COLLECTION_TAG) {
            let face = extract_collection_face(&font_data, 0)?;
            debug!(
                "Extracted face 0 ({} bytes) from a {} byte font collection",
                face.len(),
                font_data.len()
            );
            face
        } else {
            font_data
        };
        let face = ttf_parser::Face::parse(&font_data, 0)
            .map_err(|e| WorksheetError::FontError(format!("Failed to parse font: {e}")))?;
        let (units_per_em, ascender, descender) =
            (face.units_per_em() as f32, face.ascender(), face.descender());
        let cff_outlines = face.tables().cff.is_some();
        Ok(Self {
            font_data,
            units_per_em,
            ascender,
            descender,
            cff_outlines,
        })
    }

    /// Read and parse a font file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::new(std::fs::read(path)?)
    }

    /// Raw font program bytes
    pub fn font_data(&self) -> &[u8] {
        &self.font_data
    }

    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Whether glyph outlines are CFF (OpenType `.otf`) rather than TrueType
    pub fn has_cff_outlines(&self) -> bool {
        self.cff_outlines
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.font_data, 0).ok()
    }

    /// Glyph ID and advance in 1/1000 em for a character, as PDF width arrays expect
    pub fn glyph_metrics(&self, ch: char) -> Option<(u16, f32)> {
        let face = self.face()?;
        let gid = face.glyph_index(ch)?;
        let advance = face.glyph_hor_advance(gid)?;
        Some((gid.0, advance as f32 * 1000.0 / self.units_per_em))
    }
}

fn read_u16(data: &[u8], at: usize) -> Result<u16> {
    data.get(at..at + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| WorksheetError::FontError(format!("Font data truncated at {at}")))
}

fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| WorksheetError::FontError(format!("Font data truncated at {at}")))
}

/// Copy face `index` of a font collection into a standalone sfnt.
///
/// Table offsets in a collection are relative to the start of the file; the
/// copy gets its own table directory with offsets into the new buffer, each
/// table 4-byte aligned.
fn extract_collection_face(data: &[u8], index: u32) -> Result<Vec<u8>> {
    let face_count = read_u32(data, 8)?;
    if index >= face_count {
        return Err(WorksheetError::FontError(format!(
            "Font collection has {face_count} faces, no face {index}"
        )));
    }
    let face_offset = read_u32(data, 12 + 4 * index as usize)? as usize;
    let table_count = read_u16(data, face_offset + 4)? as usize;
    let directory_len = 12 + 16 * table_count;

    let mut font = data
        .get(face_offset..face_offset + directory_len)
        .ok_or_else(|| WorksheetError::FontError("Font collection directory truncated".into()))?
        .to_vec();

    for table in 0..table_count {
        let record = 12 + 16 * table;
        let offset = read_u32(&font, record + 8)? as usize;
        let length = read_u32(&font, record + 12)? as usize;
        let bytes = data.get(offset..offset + length).ok_or_else(|| {
            WorksheetError::FontError(format!("Font collection table {table} out of bounds"))
        })?;

        font.resize(font.len().next_multiple_of(4), 0);
        let new_offset = font.len() as u32;
        font[record + 8..record + 12].copy_from_slice(&new_offset.to_be_bytes());
        font.extend_from_slice(bytes);
    }
    font.resize(font.len().next_multiple_of(4), 0);
    Ok(font)
}

/// Advance of `ch` in points, estimated when the face has no glyph for it
fn face_advance(
    face: Option<&ttf_parser::Face<'_>>,
    units_per_em: f32,
    ch: char,
    font_size: f32,
) -> f32 {
    face.and_then(|face| face.glyph_hor_advance(face.glyph_index(ch)?))
        .map(|advance| advance as f32 / units_per_em * font_size)
        .unwrap_or_else(|| estimated_char_width(ch, font_size))
}

impl FontMetrics for TtfFontMetrics {
    fn char_width(&self, ch: char, font_size: f32) -> f32 {
        face_advance(self.face().as_ref(), self.units_per_em, ch, font_size)
    }

    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        // Parse once for the whole string
        let face = self.face();
        text.chars()
            .map(|ch| face_advance(face.as_ref(), self.units_per_em, ch, font_size))
            .sum()
    }

    /// Two-byte big-endian glyph IDs for an Identity-H encoded font; glyph 0 when missing
    fn encode_text(&self, text: &str) -> Vec<u8> {
        let face = self.face();
        text.chars()
            .map(|ch| {
                face.as_ref()
                    .and_then(|face| face.glyph_index(ch))
                    .map_or(0, |gid| gid.0)
            })
            .flat_map(u16::to_be_bytes)
            .collect()
    }
}

impl std::fmt::Debug for TtfFontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFontMetrics")
            .field("units_per_em", &self.units_per_em)
            .field("cff_outlines", &self.cff_outlines)
            .field("font_data_len", &self.font_data.len())
            .finish()
    }
}
