//! Document-wide configuration

use crate::Result;
use crate::layout::{LayoutParameters, PageGeometry};
use crate::style::WorksheetStyle;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Geometry, layout parameters and style for one document build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorksheetConfig {
    pub page: PageGeometry,
    pub layout: LayoutParameters,
    pub style: WorksheetStyle,
}

impl WorksheetConfig {
    /// Create the default A4 configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file; keys it omits keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        debug!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Set the page geometry
    pub fn with_page(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    /// Set the layout parameters
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.layout = layout;
        self
    }

    /// Set the style
    pub fn with_style(mut self, style: WorksheetStyle) -> Self {
        self.style = style;
        self
    }

    /// Validate everything that must hold before drawing begins
    pub fn validate(&self) -> Result<()> {
        self.page.validate()?;
        self.layout.validate(self.page.usable_width())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorksheetError;
    use crate::style::WorksheetStyle;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorksheetConfig::new().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_named_fields() {
        let config: WorksheetConfig = serde_json::from_str(
            r#"{ "page": { "margin_left": 10.0 }, "layout": { "min_cell_size": 18.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.page.margin_left, 10.0);
        assert_eq!(config.page.margin_right, 15.0);
        assert_eq!(config.layout.min_cell_size, 18.0);
        assert_eq!(config.layout.max_cell_size, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_cell_bounds_fail_validation() {
        let config = WorksheetConfig::new()
            .with_layout(LayoutParameters::default().with_cell_bounds(35.0, 30.0));
        assert!(matches!(
            config.validate(),
            Err(WorksheetError::ConfigError(_))
        ));
    }

    #[test]
    fn test_builders_compose() {
        let config = WorksheetConfig::new()
            .with_page(PageGeometry::a4().with_margins(25.0, 20.0, 20.0, 20.0))
            .with_style(WorksheetStyle::default().with_ruled_label("[옮겨 쓰기]"));
        assert_eq!(config.page.usable_width(), 170.0);
        assert_eq!(config.style.ruled_label, "[옮겨 쓰기]");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("worksheet.json");
        std::fs::write(&path, r#"{ "layout": { "ruled_line_count": 5 } }"#).unwrap();

        let config = WorksheetConfig::from_json_file(&path).unwrap();
        assert_eq!(config.layout.ruled_line_count, 5);
    }
}
