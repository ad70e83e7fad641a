//! Whole-document driver

use crate::Result;
use crate::composer::render_passage;
use crate::config::WorksheetConfig;
use crate::error::WorksheetError;
use crate::font::TtfFontMetrics;
use crate::gloss::{GlossResolver, GlossSource};
use crate::layout::{LineBreakPlan, compute_layout};
use crate::passage::Passage;
use crate::pdf::PdfSurface;
use crate::surface::DrawingSurface;
use std::path::Path;
use tracing::{debug, instrument};

/// What a finished build produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub passages: usize,
    pub pages: usize,
}

/// Builds a worksheet from passages, one passage after another
#[derive(Debug, Clone)]
pub struct WorksheetDocument {
    config: WorksheetConfig,
}

impl WorksheetDocument {
    /// Create a driver, rejecting configurations that cannot be laid out
    pub fn new(config: WorksheetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorksheetConfig {
        &self.config
    }

    /// Compute the line-break plan of every passage without drawing anything
    pub fn plan(&self, passages: &[Passage]) -> Result<Vec<LineBreakPlan>> {
        let usable_width = self.config.page.usable_width();
        let layout = &self.config.layout;

        passages
            .iter()
            .map(|passage| {
                if passage.is_empty() {
                    return Err(WorksheetError::EmptyPassage(passage.label.clone()));
                }
                compute_layout(
                    passage.len(),
                    usable_width,
                    layout.min_cell_size,
                    layout.max_cell_size,
                )
            })
            .collect()
    }

    /// Render every passage, in order, onto `surface`.
    ///
    /// All plans are computed first, so an invalid passage aborts the build
    /// before the first page is created. A failure while drawing aborts the
    /// whole build.
    #[instrument(skip_all, fields(passages = passages.len()))]
    pub fn render<D, S>(
        &self,
        surface: &mut D,
        passages: &[Passage],
        resolver: &mut GlossResolver<S>,
    ) -> Result<BuildSummary>
    where
        D: DrawingSurface + ?Sized,
        S: GlossSource,
    {
        let plans = self.plan(passages)?;

        for (passage, plan) in passages.iter().zip(&plans) {
            debug!(
                "Passage '{}': {} chars, {:.1} mm cells, {} per line",
                passage.label,
                passage.len(),
                plan.cell_size,
                plan.chars_per_line
            );
            render_passage(surface, &self.config, resolver, passage, plan)?;
        }

        let summary = BuildSummary {
            passages: passages.len(),
            pages: surface.page_index(),
        };
        debug!("Rendered {} passages on {} pages", summary.passages, summary.pages);
        Ok(summary)
    }

    /// Render to PDF bytes, embedding `font` when given
    pub fn render_pdf<S: GlossSource>(
        &self,
        passages: &[Passage],
        resolver: &mut GlossResolver<S>,
        font: Option<TtfFontMetrics>,
    ) -> Result<Vec<u8>> {
        let mut surface = self.pdf_surface(font);
        self.render(&mut surface, passages, resolver)?;
        surface.to_bytes()
    }

    /// Render to a PDF file at `path`
    pub fn save_pdf<S: GlossSource, P: AsRef<Path>>(
        &self,
        passages: &[Passage],
        resolver: &mut GlossResolver<S>,
        font: Option<TtfFontMetrics>,
        path: P,
    ) -> Result<BuildSummary> {
        let mut surface = self.pdf_surface(font);
        let summary = self.render(&mut surface, passages, resolver)?;
        surface.save(path)?;
        Ok(summary)
    }

    fn pdf_surface(&self, font: Option<TtfFontMetrics>) -> PdfSurface {
        match font {
            Some(font) => PdfSurface::with_font(&self.config.page, font),
            None => PdfSurface::new(&self.config.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gloss::MapGlossSource;
    use crate::layout::LayoutParameters;
    use crate::surface::recording::{Call, RecordingSurface};

    fn passages() -> Vec<Passage> {
        vec![
            Passage::from_text("학이 1-1", "學而時習之").with_reading("학이시습지"),
            Passage::from_text("학이 1-2", "有朋自遠方來, 不亦樂乎?"),
            Passage::from_text("위정 2-4", "吾十有五而志于學"),
        ]
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let inverted = LayoutParameters::default().with_cell_bounds(30.0, 20.0);
        let config = WorksheetConfig::new().with_layout(inverted);
        assert!(matches!(
            WorksheetDocument::new(config),
            Err(WorksheetError::ConfigError(_))
        ));
    }

    #[test]
    fn test_plan_covers_every_passage() {
        let document = WorksheetDocument::new(WorksheetConfig::new()).unwrap();
        let plans = document.plan(&passages()).unwrap();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].cell_size, 30.0);
        assert_eq!(plans[0].chars_per_line, 5);
        // 10 characters: 18 mm would be below the minimum
        assert_eq!(plans[1].cell_size, 20.0);
        assert_eq!(plans[1].chars_per_line, 9);
    }

    #[test]
    fn test_each_passage_gets_its_own_first_page() {
        let document = WorksheetDocument::new(WorksheetConfig::new()).unwrap();
        let glosses = MapGlossSource::new().with_entry("學", "배울 학");
        let mut resolver = GlossResolver::new(glosses);
        let mut surface = RecordingSurface::a4();

        let summary = document.render(&mut surface, &passages(), &mut resolver).unwrap();
        assert_eq!(summary.passages, 3);
        assert_eq!(summary.pages, surface.page_breaks());
        assert!(summary.pages >= 3);

        // Every label is the first thing drawn after a page break
        let labels: Vec<&str> = surface
            .calls
            .windows(2)
            .filter_map(|pair| match pair {
                [Call::AddPage, Call::Text { text, y, .. }] if (*y - 24.55).abs() < 1e-3 => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["학이 1-1", "학이 1-2", "위정 2-4"]);
    }

    #[test]
    fn test_empty_passage_aborts_before_drawing() {
        let document = WorksheetDocument::new(WorksheetConfig::new()).unwrap();
        let mut resolver = GlossResolver::new(MapGlossSource::new());
        let mut surface = RecordingSurface::a4();

        let mut input = passages();
        input.push(Passage::new("blank", std::iter::empty()));

        let result = document.render(&mut surface, &input, &mut resolver);
        assert!(matches!(result, Err(WorksheetError::EmptyPassage(label)) if label == "blank"));
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_no_passages_renders_nothing() {
        let document = WorksheetDocument::new(WorksheetConfig::new()).unwrap();
        let mut resolver = GlossResolver::new(MapGlossSource::new());
        let mut surface = RecordingSurface::a4();

        let summary = document.render(&mut surface, &[], &mut resolver).unwrap();
        assert_eq!(summary, BuildSummary { passages: 0, pages: 0 });
    }
}
