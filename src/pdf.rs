//! lopdf-backed drawing surface

use crate::Result;
use crate::constants::POINTS_PER_MM;
use crate::drawing_utils::*;
use crate::error::WorksheetError;
use crate::font::{EstimatedMetrics, FontMetrics, TtfFontMetrics};
use crate::layout::PageGeometry;
use crate::style::Color;
use crate::surface::DrawingSurface;
use crate::text::wrap_text_with_metrics;
use lopdf::{
    Document, Object, ObjectId, Stream, StringFormat,
    content::Content,
    dictionary,
};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument, trace};

/// Resource name every page uses for the worksheet font
const FONT_RESOURCE: &str = "F1";

/// BaseFont name given to an embedded font program
const EMBEDDED_FONT_NAME: &str = "HanjaTracingCJK";

/// Share of the font size the baseline sits below the middle of a paragraph line
const PARAGRAPH_BASELINE_SHIFT: f32 = 0.3;

enum SurfaceFont {
    Embedded(TtfFontMetrics),
    Standard(EstimatedMetrics),
}

impl SurfaceFont {
    fn metrics(&self) -> &dyn FontMetrics {
        match self {
            SurfaceFont::Embedded(metrics) => metrics,
            SurfaceFont::Standard(metrics) => metrics,
        }
    }

    fn string_format(&self) -> StringFormat {
        match self {
            SurfaceFont::Embedded(_) => StringFormat::Hexadecimal,
            SurfaceFont::Standard(_) => StringFormat::Literal,
        }
    }
}

/// A [`DrawingSurface`] that accumulates page content and writes a PDF.
///
/// Page content is kept as operator lists until [`DrawingSurface::write_to`]
/// assembles the document, so the font is embedded once with widths for
/// exactly the glyphs that were drawn.
pub struct PdfSurface {
    width: f32,
    height: f32,
    font: SurfaceFont,
    pages: Vec<Vec<Object>>,
    font_size: f32,
    stroke_color: Color,
    line_width: f32,
    dash: Option<(f32, f32)>,
    text_color: Color,
    used_chars: BTreeSet<char>,
}

impl PdfSurface {
    /// Create a surface using the built-in Helvetica font.
    ///
    /// Helvetica has no CJK glyphs; use [`PdfSurface::with_font`] for real worksheets.
    pub fn new(page: &PageGeometry) -> Self {
        Self::with_source(page, SurfaceFont::Standard(EstimatedMetrics))
    }

    /// Create a surface that embeds the given TrueType/OpenType font
    pub fn with_font(page: &PageGeometry, font: TtfFontMetrics) -> Self {
        Self::with_source(page, SurfaceFont::Embedded(font))
    }

    fn with_source(page: &PageGeometry, font: SurfaceFont) -> Self {
        Self {
            width: page.width,
            height: page.height,
            font,
            pages: Vec::new(),
            font_size: 10.0,
            stroke_color: Color::black(),
            line_width: 0.2,
            dash: None,
            text_color: Color::black(),
            used_chars: BTreeSet::new(),
        }
    }

    /// Finish the document and return the PDF bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Finish the document and write it to `path`
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
        self.write_to(&mut file)?;
        file.flush()?;
        debug!("Saved worksheet to {}", path.as_ref().display());
        Ok(())
    }

    fn pt(&self, mm: f32) -> f32 {
        mm * POINTS_PER_MM
    }

    /// Flip a top-down millimetre offset into bottom-up PDF points
    fn pdf_y(&self, y: f32) -> f32 {
        (self.height - y) * POINTS_PER_MM
    }

    fn current_page(&mut self) -> Result<&mut Vec<Object>> {
        self.pages.last_mut().ok_or(WorksheetError::NoActivePage)
    }

    fn push_state(&mut self, objects: Vec<Object>) {
        // State set before the first page is replayed by add_page
        if let Some(page) = self.pages.last_mut() {
            page.extend(objects);
        }
    }

    fn stroke_state(&self) -> Vec<Object> {
        let mut objects = set_stroke_style(self.stroke_color, self.pt(self.line_width));
        objects.extend(set_dash_pattern(
            self.dash.map(|(dash, gap)| (self.pt(dash), self.pt(gap))),
        ));
        objects
    }

    fn embed_font(&self, doc: &mut Document) -> ObjectId {
        match &self.font {
            SurfaceFont::Standard(_) => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
            SurfaceFont::Embedded(metrics) => embed_type0_font(doc, metrics, &self.used_chars),
        }
    }
}

/// Embed a font program as a Type0 composite font with Identity-H encoding.
///
/// TrueType outlines become a CIDFontType2, CFF outlines a CIDFontType0 with an
/// OpenType FontFile3 stream. Widths are written for the glyphs in `used`.
fn embed_type0_font(
    doc: &mut Document,
    metrics: &TtfFontMetrics,
    used: &BTreeSet<char>,
) -> ObjectId {
    let font_data = metrics.font_data();
    let units_per_em = metrics.units_per_em();
    let scale = 1000.0 / units_per_em;
    let ascent = (metrics.ascender() as f32 * scale) as i64;
    let descent = (metrics.descender() as f32 * scale) as i64;

    let (stream_key, font_stream) = if metrics.has_cff_outlines() {
        (
            "FontFile3",
            Stream::new(dictionary! { "Subtype" => "OpenType" }, font_data.to_vec()),
        )
    } else {
        (
            "FontFile2",
            Stream::new(
                dictionary! { "Length1" => font_data.len() as i64 },
                font_data.to_vec(),
            ),
        )
    };
    let font_stream_id = doc.add_object(font_stream);

    let font_bbox: Vec<Object> = vec![
        Object::Integer(0),
        Object::Integer(descent),
        Object::Integer(1000),
        Object::Integer(ascent),
    ];
    let mut descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => EMBEDDED_FONT_NAME,
        "Flags" => 4, // Symbolic
        "ItalicAngle" => 0,
        "Ascent" => ascent,
        "Descent" => descent,
        "CapHeight" => ascent,
        "StemV" => 80,
        "FontBBox" => font_bbox,
    };
    descriptor.set(stream_key, font_stream_id);
    let font_descriptor_id = doc.add_object(descriptor);

    let mut glyph_widths: Vec<(u16, f32)> = used
        .iter()
        .filter_map(|ch| metrics.glyph_metrics(*ch))
        .collect();
    glyph_widths.sort_by_key(|(gid, _)| *gid);
    glyph_widths.dedup_by_key(|(gid, _)| *gid);
    let widths: Vec<Object> = glyph_widths
        .iter()
        .flat_map(|(gid, width)| {
            [
                Object::Integer(i64::from(*gid)),
                Object::Array(vec![Object::Integer(width.round() as i64)]),
            ]
        })
        .collect();
    trace!("Embedding widths for {} glyphs", glyph_widths.len());

    let mut cid_font = dictionary! {
        "Type" => "Font",
        "BaseFont" => EMBEDDED_FONT_NAME,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => font_descriptor_id,
        "DW" => 1000,
        "W" => widths,
    };
    if metrics.has_cff_outlines() {
        cid_font.set("Subtype", "CIDFontType0");
    } else {
        cid_font.set("Subtype", "CIDFontType2");
        cid_font.set("CIDToGIDMap", "Identity");
    }
    let cid_font_id = doc.add_object(cid_font);

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => EMBEDDED_FONT_NAME,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
    })
}

impl DrawingSurface for PdfSurface {
    fn page_width(&self) -> f32 {
        self.width
    }

    fn page_height(&self) -> f32 {
        self.height
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) -> Result<()> {
        let state = self.stroke_state();
        self.pages.push(state);
        trace!("Started page {}", self.pages.len());
        Ok(())
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
        self.push_state(vec![
            Object::Name(b"RG".to_vec()),
            color.r.into(),
            color.g.into(),
            color.b.into(),
        ]);
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
        let width_pt = self.pt(width);
        self.push_state(vec![Object::Name(b"w".to_vec()), width_pt.into()]);
    }

    fn set_dash_pattern(&mut self, pattern: Option<(f32, f32)>) {
        self.dash = pattern;
        let pattern_pt = pattern.map(|(dash, gap)| (self.pt(dash), self.pt(gap)));
        self.push_state(set_dash_pattern(pattern_pt));
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let objects = draw_line(self.pt(x1), self.pdf_y(y1), self.pt(x2), self.pdf_y(y2));
        self.current_page()?.extend(objects);
        Ok(())
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<()> {
        let objects = draw_rectangle_stroke(
            self.pt(x),
            self.pdf_y(y + height),
            self.pt(width),
            self.pt(height),
        );
        self.current_page()?.extend(objects);
        Ok(())
    }

    fn text(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut objects = set_fill_color(self.text_color);
        objects.extend(show_text(
            FONT_RESOURCE,
            self.font_size,
            self.pt(x),
            self.pdf_y(y),
            self.font.metrics().encode_text(text),
            self.font.string_format(),
        ));
        self.current_page()?.extend(objects);
        self.used_chars.extend(text.chars());
        Ok(())
    }

    fn text_width(&self, text: &str) -> f32 {
        self.font.metrics().text_width(text, self.font_size) / POINTS_PER_MM
    }

    fn paragraph(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        line_height: f32,
        text: &str,
    ) -> Result<f32> {
        let lines = wrap_text_with_metrics(
            text,
            self.pt(width),
            self.font_size,
            self.font.metrics(),
        );
        let shift = line_height / 2.0 + self.font_size / POINTS_PER_MM * PARAGRAPH_BASELINE_SHIFT;
        for (i, line) in lines.iter().enumerate() {
            self.text(x, y + i as f32 * line_height + shift, line)?;
        }
        Ok(y + lines.len() as f32 * line_height)
    }

    #[instrument(skip(self, out), fields(pages = self.pages.len()))]
    fn write_to(&mut self, out: &mut dyn Write) -> Result<()> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = self.embed_font(&mut doc);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for objects in &self.pages {
            let content = Content {
                operations: objects_to_operations(objects),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.pt(self.width).into(),
            self.pt(self.height).into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut sink = out;
        doc.save_to(&mut sink)?;
        debug!("Wrote PDF with {} pages", self.pages.len());
        Ok(())
    }
}

impl std::fmt::Debug for PdfSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pages", &self.pages.len())
            .field("used_chars", &self.used_chars.len())
            .finish()
    }
}
