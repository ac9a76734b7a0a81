use crate::config::{AppConfig, ColorParser, Theme};
use ratatui::style::Color;

/// Snapshot of theme colors and display options for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub primary: Color,
    pub secondary: Color,
    pub error: Color,
    pub warning: Color,
    pub dimmed: Color,
    pub background: Color,
    pub controls_bg: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub modal_border: Color,
    pub modal_border_active: Color,
    pub modal_border_error: Color,
    pub chart_axis: Color,
    /// Palette border colours by position
    pub series: Vec<Color>,
    pub color_parser: ColorParser,

    pub show_preview: bool,
    pub show_legend: bool,
}

impl RenderContext {
    pub fn from_theme_and_config(theme: &Theme, config: &AppConfig) -> Self {
        Self {
            primary: theme.get("primary"),
            secondary: theme.get("secondary"),
            error: theme.get("error"),
            warning: theme.get("warning"),
            dimmed: theme.get("dimmed"),
            background: theme.get("background"),
            controls_bg: theme.get("controls_bg"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            modal_border: theme.get("modal_border"),
            modal_border_active: theme.get("modal_border_active"),
            modal_border_error: theme.get("modal_border_error"),
            chart_axis: theme.get("chart_axis"),
            series: theme.series.clone(),
            color_parser: theme.parser,

            show_preview: config.display.show_preview,
            show_legend: config.display.show_legend,
        }
    }

    /// Chart colour of the dataset at `index`
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return self.primary;
        }
        self.series[index % self.series.len()]
    }
}
