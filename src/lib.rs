//! Hanja tracing worksheets rendered to PDF with lopdf
//!
//! Each passage of classical Chinese gets a page of its own, holding four
//! stacked rows: the characters with their Korean glosses, reading and
//! translation; faint characters to trace over; blank practice cells; and
//! ruled lines for copying out the translation.
//!
//! ```no_run
//! use hanja_tracing::{GlossResolver, MapGlossSource, Passage, WorksheetConfig, WorksheetDocument};
//!
//! let passages = vec![Passage::from_text("학이 1-1", "學而時習之").with_reading("학이시습지")];
//! let mut resolver = GlossResolver::new(MapGlossSource::new().with_entry("學", "배울 학"));
//! let document = WorksheetDocument::new(WorksheetConfig::new())?;
//! document.save_pdf(&passages, &mut resolver, None, "worksheet.pdf")?;
//! # Ok::<(), hanja_tracing::WorksheetError>(())
//! ```

pub mod composer;
pub mod config;
pub mod constants;
mod drawing_utils;
pub mod document;
pub mod error;
pub mod font;
pub mod gloss;
pub mod layout;
pub mod passage;
pub mod pdf;
pub mod rows;
pub mod style;
pub mod surface;
pub mod text;

pub use composer::{PassageExtent, render_passage, sound_hints};
pub use config::WorksheetConfig;
pub use document::{BuildSummary, WorksheetDocument};
pub use error::{Result, WorksheetError};
pub use font::{EstimatedMetrics, FontMetrics, TtfFontMetrics};
pub use gloss::{GlossResolver, GlossSource, MapGlossSource};
pub use layout::{LayoutParameters, LineBreakPlan, PageGeometry, compute_layout};
pub use passage::{JsonPassageSource, Passage, PassageSource};
pub use pdf::PdfSurface;
pub use style::{Color, WorksheetStyle};
pub use surface::DrawingSurface;
