//! Stacks the rows of one passage

use crate::Result;
use crate::config::WorksheetConfig;
use crate::constants::LABEL_BASELINE_RATIO;
use crate::error::WorksheetError;
use crate::gloss::{GlossResolver, GlossSource};
use crate::layout::LineBreakPlan;
use crate::passage::Passage;
use crate::rows::{render_ghost_row, render_original_row, render_practice_row, render_ruled_row};
use crate::surface::DrawingSurface;
use crate::text::reading_syllables;
use tracing::{debug, instrument, warn};

/// Steps a passage goes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeStep {
    Label,
    OriginalRow,
    GhostRow,
    PracticeRow,
    RuledRow,
    Done,
}

impl ComposeStep {
    pub fn next(self) -> Self {
        match self {
            ComposeStep::Label => ComposeStep::OriginalRow,
            ComposeStep::OriginalRow => ComposeStep::GhostRow,
            ComposeStep::GhostRow => ComposeStep::PracticeRow,
            ComposeStep::PracticeRow => ComposeStep::RuledRow,
            ComposeStep::RuledRow | ComposeStep::Done => ComposeStep::Done,
        }
    }
}

/// Where a rendered passage started and ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassageExtent {
    pub first_page: usize,
    pub last_page: usize,
    /// Cursor after the passage, inter-passage gap included
    pub end_y: f32,
}

/// Per-character readings for a passage, when its reading lines up 1:1.
///
/// The Hangul syllables of the reading are used only if there are exactly as
/// many as source characters; otherwise no hints are given at all.
pub fn sound_hints(passage: &Passage) -> Option<Vec<String>> {
    if passage.reading.is_empty() {
        return None;
    }
    let syllables = reading_syllables(&passage.reading);
    if syllables.len() != passage.characters.len() {
        warn!(
            "Reading of '{}' has {} syllables for {} characters, ignoring sound hints",
            passage.label,
            syllables.len(),
            passage.characters.len()
        );
        return None;
    }
    Some(syllables)
}

/// Render one passage starting on a page of its own
#[instrument(skip_all, fields(label = %passage.label, chars = passage.characters.len()))]
pub fn render_passage<D, S>(
    surface: &mut D,
    config: &WorksheetConfig,
    resolver: &mut GlossResolver<S>,
    passage: &Passage,
    plan: &LineBreakPlan,
) -> Result<PassageExtent>
where
    D: DrawingSurface + ?Sized,
    S: GlossSource,
{
    if passage.is_empty() {
        return Err(WorksheetError::EmptyPassage(passage.label.clone()));
    }

    let layout = &config.layout;
    let style = &config.style;
    let page = &config.page;

    surface.add_page()?;
    let first_page = surface.page_index();
    let hints = sound_hints(passage);
    let mut y = page.margin_top;
    let mut step = ComposeStep::Label;

    while step != ComposeStep::Done {
        match step {
            ComposeStep::Label => {
                surface.set_font_size(style.label_font_size);
                surface.set_text_color(style.label_color);
                surface.text(
                    page.margin_left,
                    y + layout.label_height * LABEL_BASELINE_RATIO,
                    &passage.label,
                )?;
                y += layout.label_height;
            }
            ComposeStep::OriginalRow => {
                y = render_original_row(
                    surface,
                    config,
                    resolver,
                    &passage.characters,
                    hints.as_deref(),
                    &passage.reading,
                    &passage.translation,
                    plan,
                    y,
                )?;
                y += layout.row_gap;
            }
            ComposeStep::GhostRow => {
                y = render_ghost_row(surface, config, &passage.characters, plan, y)?;
                y += layout.row_gap;
            }
            ComposeStep::PracticeRow => {
                y = render_practice_row(surface, config, passage.characters.len(), plan, y)?;
                y += layout.row_gap;
            }
            ComposeStep::RuledRow => {
                y = render_ruled_row(surface, config, y)?;
            }
            ComposeStep::Done => {}
        }
        step = step.next();
    }

    let extent = PassageExtent {
        first_page,
        last_page: surface.page_index(),
        end_y: y + layout.passage_gap,
    };
    debug!(
        "Passage '{}' on pages {}..={}",
        passage.label, extent.first_page, extent.last_page
    );
    Ok(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gloss::MapGlossSource;
    use crate::layout::compute_layout;
    use crate::surface::recording::{Call, RecordingSurface};

    fn plan_for(config: &WorksheetConfig, passage: &Passage) -> LineBreakPlan {
        compute_layout(
            passage.len(),
            config.page.usable_width(),
            config.layout.min_cell_size,
            config.layout.max_cell_size,
        )
        .unwrap()
    }

    #[test]
    fn test_steps_run_in_order_once() {
        let mut step = ComposeStep::Label;
        let mut seen = vec![step];
        while step != ComposeStep::Done {
            step = step.next();
            seen.push(step);
        }
        assert_eq!(
            seen,
            vec![
                ComposeStep::Label,
                ComposeStep::OriginalRow,
                ComposeStep::GhostRow,
                ComposeStep::PracticeRow,
                ComposeStep::RuledRow,
                ComposeStep::Done,
            ]
        );
    }

    #[test]
    fn test_sound_hints_align_one_to_one() {
        let passage = Passage::from_text("1", "學而時習").with_reading("학이시습");
        assert_eq!(
            sound_hints(&passage),
            Some(vec![
                "학".to_string(),
                "이".to_string(),
                "시".to_string(),
                "습".to_string()
            ])
        );

        let punctuated = Passage::from_text("1", "學而時習").with_reading("(학이, 시습.)");
        assert_eq!(sound_hints(&punctuated).map(|h| h.len()), Some(4));
    }

    #[test]
    fn test_sound_hints_discarded_on_mismatch() {
        let short = Passage::from_text("1", "學而時習").with_reading("학이시");
        assert_eq!(sound_hints(&short), None);

        let long = Passage::from_text("1", "學而時習").with_reading("학이시습지");
        assert_eq!(sound_hints(&long), None);

        let none = Passage::from_text("1", "學而時習");
        assert_eq!(sound_hints(&none), None);
    }

    /// Glosses drawn in the original row of "樂不樂不" read as `reading`
    fn rendered_glosses(reading: &str) -> Vec<String> {
        let config = WorksheetConfig::new();
        let passage = Passage::from_text("옹야", "樂不樂不").with_reading(reading);
        let plan = plan_for(&config, &passage);
        let mut resolver = GlossResolver::new(
            MapGlossSource::new()
                .with_entry("樂", "즐거울 락, 노래 악, 좋아할 요")
                .with_entry("不", "아닐 불, 아닐 부"),
        );

        let mut surface = RecordingSurface::a4();
        render_passage(&mut surface, &config, &mut resolver, &passage, &plan).unwrap();
        surface
            .texts()
            .into_iter()
            .filter(|text| text.contains(' ') && !text.starts_with('['))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_aligned_reading_picks_glosses_per_character() {
        assert_eq!(
            rendered_glosses("악부요불"),
            vec!["노래 악", "아닐 부", "좋아할 요", "아닐 불"]
        );
    }

    #[test]
    fn test_misaligned_reading_leaves_every_gloss_at_default() {
        let defaults = vec!["즐거울 락", "아닐 불", "즐거울 락", "아닐 불"];
        assert_eq!(rendered_glosses("악부요"), defaults);
        assert_eq!(rendered_glosses("악부요불악"), defaults);
    }

    #[test]
    fn test_passage_starts_on_fresh_page_at_top_margin() {
        let config = WorksheetConfig::new();
        let passage =
            Passage::from_text("학이 1-1", "學而時習之").with_translation("배우고 익히다");
        let plan = plan_for(&config, &passage);
        let mut resolver = GlossResolver::new(MapGlossSource::new());

        let mut surface = RecordingSurface::a4();
        let extent = render_passage(&mut surface, &config, &mut resolver, &passage, &plan).unwrap();

        assert_eq!(surface.calls[0], Call::AddPage);
        match &surface.calls[1] {
            Call::Text { y, text, .. } => {
                assert_eq!(text, "학이 1-1");
                assert!((y - (20.0 + 7.0 * 0.65)).abs() < 1e-4);
            }
            other => panic!("expected label, got {other:?}"),
        }
        assert_eq!(extent.first_page, 1);
        assert_eq!(extent.last_page, 1);
    }

    #[test]
    fn test_row_gaps_accumulate() {
        let config = WorksheetConfig::new();
        let passage = Passage::from_text("1", "學而");
        let plan = plan_for(&config, &passage);
        let mut resolver = GlossResolver::new(MapGlossSource::new());

        let mut surface = RecordingSurface::a4();
        let extent = render_passage(&mut surface, &config, &mut resolver, &passage, &plan).unwrap();

        // label 7; original 35 + 2; ghost 35; practice 35; ruled 42; three 4 mm gaps
        let expected = 20.0 + 7.0 + 37.0 + 4.0 + 35.0 + 4.0 + 35.0 + 4.0 + 42.0 + 12.0;
        assert!((extent.end_y - expected).abs() < 1e-3);
    }

    #[test]
    fn test_long_passage_spills_rows_onto_next_page() {
        let config = WorksheetConfig::new();
        // 40 characters at 20 mm cells wrap into 5 lines of 9
        let passage = Passage::new("long", std::iter::repeat_n('學', 40));
        let plan = plan_for(&config, &passage);
        assert_eq!(plan.rows_needed(40), 5);
        let mut resolver = GlossResolver::new(MapGlossSource::new());

        let mut surface = RecordingSurface::a4();
        let extent = render_passage(&mut surface, &config, &mut resolver, &passage, &plan).unwrap();
        assert_eq!(extent.first_page, 1);
        assert!(extent.last_page > 1);
        assert_eq!(surface.page_breaks(), extent.last_page);
    }

    #[test]
    fn test_empty_passage_is_rejected_before_drawing() {
        let config = WorksheetConfig::new();
        let passage = Passage::new("empty", std::iter::empty());
        let plan = LineBreakPlan {
            cell_size: 30.0,
            chars_per_line: 1,
        };
        let mut resolver = GlossResolver::new(MapGlossSource::new());

        let mut surface = RecordingSurface::a4();
        let result = render_passage(&mut surface, &config, &mut resolver, &passage, &plan);
        assert!(matches!(result, Err(WorksheetError::EmptyPassage(label)) if label == "empty"));
        assert!(surface.calls.is_empty());
    }
}
