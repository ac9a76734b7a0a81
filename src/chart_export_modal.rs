//! Chart export modal: format (PNG/JSON) and path.

use crate::cache::EXPORT_PATH_HISTORY;
use crate::config::{InputsConfig, Theme};
use crate::widgets::text_input::TextInput;
use crate::ExportFormat;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFocus {
    #[default]
    FormatSelector,
    PathInput,
    ExportButton,
    CancelButton,
}

pub struct ChartExportModal {
    pub active: bool,
    pub focus: ChartExportFocus,
    pub selected_format: ExportFormat,
    pub path_input: TextInput,
}

impl ChartExportModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, theme: &Theme, inputs: &InputsConfig) {
        self.active = true;
        let input = TextInput::new()
            .with_theme(theme)
            .with_placeholder("chart.png")
            .with_history_limit(inputs.history_limit);
        self.path_input = if inputs.enable_history {
            input.with_history(EXPORT_PATH_HISTORY.trim_end_matches("_history.txt"))
        } else {
            input
        };
        self.set_focus(ChartExportFocus::PathInput);
    }

    pub fn close(&mut self) {
        self.active = false;
        self.set_focus(ChartExportFocus::FormatSelector);
        self.path_input.clear();
    }

    pub fn set_focus(&mut self, focus: ChartExportFocus) {
        self.focus = focus;
        self.path_input
            .set_focused(focus == ChartExportFocus::PathInput);
    }

    pub fn next_focus(&mut self) {
        self.set_focus(match self.focus {
            ChartExportFocus::FormatSelector => ChartExportFocus::PathInput,
            ChartExportFocus::PathInput => ChartExportFocus::ExportButton,
            ChartExportFocus::ExportButton => ChartExportFocus::CancelButton,
            ChartExportFocus::CancelButton => ChartExportFocus::FormatSelector,
        });
    }

    pub fn prev_focus(&mut self) {
        self.set_focus(match self.focus {
            ChartExportFocus::FormatSelector => ChartExportFocus::CancelButton,
            ChartExportFocus::PathInput => ChartExportFocus::FormatSelector,
            ChartExportFocus::ExportButton => ChartExportFocus::PathInput,
            ChartExportFocus::CancelButton => ChartExportFocus::ExportButton,
        });
    }

    pub fn cycle_format(&mut self) {
        let idx = ExportFormat::ALL
            .iter()
            .position(|&f| f == self.selected_format)
            .unwrap_or(0);
        self.selected_format = ExportFormat::ALL[(idx + 1) % ExportFormat::ALL.len()];
    }

    /// Target path and format. A missing extension gets the selected format's;
    /// a known extension wins over the selector.
    pub fn target(&self) -> Option<(PathBuf, ExportFormat)> {
        let raw = self.path_input.value().trim();
        if raw.is_empty() {
            return None;
        }
        let mut path = PathBuf::from(raw);
        let format = match ExportFormat::from_path(&path) {
            Some(format) => format,
            None => {
                if path.extension().is_none() {
                    path.set_extension(self.selected_format.extension());
                }
                self.selected_format
            }
        };
        Some((path, format))
    }
}

impl Default for ChartExportModal {
    fn default() -> Self {
        Self {
            active: false,
            focus: ChartExportFocus::FormatSelector,
            selected_format: ExportFormat::Png,
            path_input: TextInput::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_adds_extension_of_selected_format() {
        let mut modal = ChartExportModal::new();
        modal.path_input.set_value("out/chart".to_string());
        modal.selected_format = ExportFormat::Json;
        assert_eq!(
            modal.target(),
            Some((PathBuf::from("out/chart.json"), ExportFormat::Json))
        );
    }

    #[test]
    fn target_extension_overrides_selector() {
        let mut modal = ChartExportModal::new();
        modal.path_input.set_value("chart.png".to_string());
        modal.selected_format = ExportFormat::Json;
        assert_eq!(
            modal.target(),
            Some((PathBuf::from("chart.png"), ExportFormat::Png))
        );
        modal.path_input.set_value("  ".to_string());
        assert_eq!(modal.target(), None);
    }

    fn recall_previous_path(enable_history: bool) -> String {
        let dir = tempfile::tempdir().unwrap();
        let cache = crate::cache::CacheManager::with_dir(dir.path().to_path_buf());
        cache.ensure_cache_dir().unwrap();
        std::fs::write(cache.cache_file(EXPORT_PATH_HISTORY), "old.png\n").unwrap();

        let config = crate::config::AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap();
        let inputs = InputsConfig {
            enable_history,
            ..config.inputs
        };
        let mut modal = ChartExportModal::new();
        modal.open(&theme, &inputs);
        let up = crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Up,
            crossterm::event::KeyModifiers::NONE,
        );
        modal.path_input.handle_key(&up, Some(&cache));
        modal.path_input.value().to_string()
    }

    #[test]
    fn path_history_follows_config() {
        assert_eq!(recall_previous_path(true), "old.png");
        assert_eq!(recall_previous_path(false), "");
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut modal = ChartExportModal::new();
        modal.next_focus();
        assert_eq!(modal.focus, ChartExportFocus::PathInput);
        modal.prev_focus();
        modal.prev_focus();
        assert_eq!(modal.focus, ChartExportFocus::CancelButton);
        modal.cycle_format();
        assert_eq!(modal.selected_format, ExportFormat::Json);
    }
}
