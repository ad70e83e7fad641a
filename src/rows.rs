//! The four row kinds stacked under every passage
//!
//! Each renderer takes the vertical offset to start at and returns the offset
//! just below what it drew. The ghost, practice and ruled rows first check
//! that their whole block fits above the bottom margin and start a new page
//! when it does not; the original row relies on starting near the top of a
//! fresh page.

use crate::Result;
use crate::config::WorksheetConfig;
use crate::constants::{GLOSS_BASELINE_RATIO, LABEL_BASELINE_RATIO, TEXT_INDENT};
use crate::gloss::{GlossResolver, GlossSource};
use crate::layout::LineBreakPlan;
use crate::surface::DrawingSurface;
use tracing::{debug, trace, warn};

/// Start a new page when a block of `needed` height would cross the bottom margin.
///
/// Returns the offset to draw the block at.
pub fn ensure_room<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    y: f32,
    needed: f32,
) -> Result<f32> {
    let page = &config.page;
    if y + needed > page.bottom_limit() {
        debug!(
            "Block of {:.1} mm at {:.1} mm overflows {:.1} mm, starting page {}",
            needed,
            y,
            page.bottom_limit(),
            surface.page_index() + 1
        );
        surface.add_page()?;
        return Ok(page.margin_top);
    }
    Ok(y)
}

/// Draw `text` horizontally centered in a cell starting at `x`
fn draw_centered<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    text: &str,
    x: f32,
    cell_width: f32,
    baseline: f32,
) -> Result<()> {
    let width = surface.text_width(text);
    surface.text(x + (cell_width - width) / 2.0, baseline, text)
}

/// Draw the light dashed cross-hair through the center of a cell
pub fn draw_dashed_cross<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    x: f32,
    y: f32,
    size: f32,
) -> Result<()> {
    let layout = &config.layout;
    surface.set_stroke_color(config.style.cross_color);
    surface.set_line_width(layout.dash_width);
    surface.set_dash_pattern(Some((layout.dash_length, layout.dash_gap)));

    let mid_y = y + size / 2.0;
    surface.line(x, mid_y, x + size, mid_y)?;
    let mid_x = x + size / 2.0;
    surface.line(mid_x, y, mid_x, y + size)?;

    surface.set_dash_pattern(None);
    Ok(())
}

/// Draw a bordered square cell with its cross-hair guide
pub fn draw_grid_cell<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    x: f32,
    y: f32,
    size: f32,
) -> Result<()> {
    // Guides first so the border sits on top
    draw_dashed_cross(surface, config, x, y, size)?;
    surface.set_stroke_color(config.style.border_color);
    surface.set_line_width(config.layout.border_width);
    surface.rect(x, y, size, size)
}

/// Draw a gloss centered under a cell, setting it smaller if it overflows
fn draw_gloss<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    gloss: &str,
    x: f32,
    cell_size: f32,
    cell_bottom: f32,
) -> Result<()> {
    let style = &config.style;
    let limit = cell_size + config.layout.gloss_overflow_margin;

    surface.set_font_size(style.gloss_font_size);
    surface.set_text_color(style.interpretation_color);
    if surface.text_width(gloss) > limit {
        surface.set_font_size(style.gloss_min_font_size);
        if surface.text_width(gloss) > limit {
            warn!("Gloss '{}' still overflows a {:.1} mm cell", gloss, cell_size);
        }
    }

    let baseline = cell_bottom + config.layout.gloss_height * GLOSS_BASELINE_RATIO;
    draw_centered(surface, gloss, x, cell_size, baseline)
}

/// Row 1: the characters at full emphasis with their glosses, then the
/// reading and the wrapped translation.
///
/// `sound_hints`, when given, holds one reading per character.
#[allow(clippy::too_many_arguments)]
pub fn render_original_row<D, S>(
    surface: &mut D,
    config: &WorksheetConfig,
    resolver: &mut GlossResolver<S>,
    characters: &[char],
    sound_hints: Option<&[String]>,
    reading: &str,
    translation: &str,
    plan: &LineBreakPlan,
    y_start: f32,
) -> Result<f32>
where
    D: DrawingSurface + ?Sized,
    S: GlossSource,
{
    let layout = &config.layout;
    let style = &config.style;
    let page = &config.page;
    let cell = plan.cell_size;
    let font_size = plan.font_size(layout);
    let mut y = y_start;

    for range in plan.line_ranges(characters.len()) {
        let mut x = page.margin_left;
        for index in range {
            let mut buf = [0u8; 4];
            let ch: &str = characters[index].encode_utf8(&mut buf);

            surface.set_font_size(font_size);
            surface.set_text_color(style.original_color);
            draw_centered(surface, ch, x, cell, y + cell * layout.baseline_ratio)?;

            let hint = sound_hints.and_then(|hints| hints.get(index)).map(String::as_str);
            let gloss = resolver.resolve(ch, hint);
            if !gloss.is_empty() {
                draw_gloss(surface, config, &gloss, x, cell, y + cell)?;
            }
            x += cell;
        }
        y += cell + layout.gloss_height;
    }

    let text_x = page.margin_left + TEXT_INDENT;

    if !reading.is_empty() {
        surface.set_font_size(style.reading_font_size);
        surface.set_text_color(style.interpretation_color);
        surface.text(text_x, y + layout.reading_height * LABEL_BASELINE_RATIO, reading)?;
        y += layout.reading_height;
    }

    if !translation.is_empty() {
        surface.set_font_size(style.translation_font_size);
        surface.set_text_color(style.interpretation_color);
        y = surface.paragraph(
            text_x,
            y,
            page.usable_width() - 2.0 * TEXT_INDENT,
            layout.translation_line_height,
            translation,
        )?;
    }

    trace!("Original row ends at {:.1} mm", y);
    Ok(y + layout.trailing_spacing)
}

/// Row 2: faint trace-over characters in grid cells, each with an empty
/// annotation box beneath for the gloss
pub fn render_ghost_row<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    characters: &[char],
    plan: &LineBreakPlan,
    y_start: f32,
) -> Result<f32> {
    let layout = &config.layout;
    let cell = plan.cell_size;
    let font_size = plan.font_size(layout);
    let row_height = cell + layout.gloss_height;
    let needed = plan.rows_needed(characters.len()) as f32 * row_height;

    let mut y = ensure_room(surface, config, y_start, needed)?;

    for range in plan.line_ranges(characters.len()) {
        let mut x = config.page.margin_left;
        for &character in &characters[range] {
            draw_grid_cell(surface, config, x, y, cell)?;
            surface.rect(x, y + cell, cell, layout.gloss_height)?;

            let mut buf = [0u8; 4];
            surface.set_font_size(font_size);
            surface.set_text_color(config.style.ghost_color);
            draw_centered(
                surface,
                character.encode_utf8(&mut buf),
                x,
                cell,
                y + cell * layout.baseline_ratio,
            )?;
            x += cell;
        }
        y += row_height;
    }

    Ok(y)
}

/// Row 3: blank grid cells with annotation boxes for free practice
pub fn render_practice_row<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    char_count: usize,
    plan: &LineBreakPlan,
    y_start: f32,
) -> Result<f32> {
    let layout = &config.layout;
    let cell = plan.cell_size;
    let row_height = cell + layout.gloss_height;
    let needed = plan.rows_needed(char_count) as f32 * row_height;

    let mut y = ensure_room(surface, config, y_start, needed)?;

    for range in plan.line_ranges(char_count) {
        let mut x = config.page.margin_left;
        for _ in range {
            draw_grid_cell(surface, config, x, y, cell)?;
            surface.rect(x, y + cell, cell, layout.gloss_height)?;
            x += cell;
        }
        y += row_height;
    }

    Ok(y)
}

/// Row 4: a small label and ruled lines across the usable width for writing
/// out the translation
pub fn render_ruled_row<D: DrawingSurface + ?Sized>(
    surface: &mut D,
    config: &WorksheetConfig,
    y_start: f32,
) -> Result<f32> {
    let layout = &config.layout;
    let style = &config.style;
    let page = &config.page;

    let mut y = ensure_room(surface, config, y_start, layout.ruled_block_height())?;

    surface.set_stroke_color(style.border_color);
    surface.set_line_width(layout.rule_width);

    surface.set_font_size(style.ruled_label_font_size);
    surface.set_text_color(style.label_color);
    surface.text(
        page.margin_left,
        y + layout.ruled_label_height * LABEL_BASELINE_RATIO,
        &style.ruled_label,
    )?;
    y += layout.ruled_label_height;

    let right = surface.page_width() - page.margin_right;
    for _ in 0..layout.ruled_line_count {
        y += layout.ruled_line_height;
        surface.line(page.margin_left, y, right, y)?;
    }

    Ok(y)
}
