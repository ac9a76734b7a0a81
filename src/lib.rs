use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

pub mod cache;
pub mod chart_data;
pub mod chart_export;
pub mod chart_export_modal;
pub mod config;
pub mod distribution;
pub mod distribution_form;
pub(crate) mod help_strings;
pub mod logging;
pub mod render;
pub mod validation;
pub mod widgets;

pub use cache::CacheManager;
pub use chart_data::{ChartDataset, ChartPayload, Palette, SeriesColor};
pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use distribution::{
    AddError, ComputationError, Distribution, DistributionId, DistributionKind, DistributionList,
};
pub use pmfviz_cli::{Args, DistributionChoice, ExportFormat};
pub use validation::{Field, RawFields, ValidationError};

use chart_export_modal::{ChartExportFocus, ChartExportModal};
use distribution::PmfFamily;
use distribution_form::{DistributionForm, FormFocus};
use render::context::RenderContext;
use render::layout::{app_layout, centered_rect_fixed, sidebar_layout};
use widgets::controls::{Controls, LIST_CONTROLS, MAIN_CONTROLS};
use widgets::debug::DebugState;
use widgets::distribution_list::DistributionListState;
use widgets::text_input::TextInputEvent;

/// Application name used for cache and config directories
pub const APP_NAME: &str = "pmfviz";

const TITLE: &str = "Probability Distribution Stats";

pub enum AppEvent {
    Key(KeyEvent),
    /// Validate the form and add the distribution
    Submit,
    Remove(DistributionId),
    /// Remove every distribution and blank the form
    Clear,
    Export(PathBuf, ExportFormat),
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub title: String,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, title: &str, message: String) {
        self.active = true;
        self.title = title.to_string();
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.title.clear();
        self.message.clear();
    }
}

/// Empty list using the configured palette and axis limit.
pub fn distribution_list(config: &AppConfig) -> DistributionList {
    let palette = config.chart.palette().unwrap_or_else(|e| {
        tracing::warn!("invalid chart palette, using default: {}", e);
        Palette::default()
    });
    DistributionList::new(palette).with_max_axis_len(config.chart.max_axis_len)
}

/// Add command-line specs (`poisson:2`, `binomial:4,0.5`) in order.
/// Stops at the first entry that fails; earlier ones stay added.
pub fn preload_distributions(list: &mut DistributionList, specs: &[String]) -> Result<()> {
    for spec in specs {
        let (kind, raw) = distribution::parse_spec(spec)?;
        list.add(kind, &raw)
            .map_err(|e| eyre!("Invalid distribution '{}': {}", spec, e))?;
    }
    Ok(())
}

/// Format for `--export`: explicit flag first, then the file extension.
pub fn resolve_export_format(path: &Path, explicit: Option<ExportFormat>) -> Result<ExportFormat> {
    explicit
        .or_else(|| ExportFormat::from_path(path))
        .ok_or_else(|| {
            eyre!(
                "Cannot detect export format from '{}'. Use --export-format png or json",
                path.display()
            )
        })
}

pub struct App {
    events: Sender<AppEvent>,
    pub distributions: DistributionList,
    pub form: DistributionForm,
    pub list_state: DistributionListState,
    pub export_modal: ChartExportModal,
    error_modal: ErrorModal,
    chart: ChartPayload,
    status: Option<String>,
    show_help: bool,
    help_scroll: usize,
    debug: DebugState,
    cache: CacheManager,
    theme: Theme,
    config: AppConfig,
}

impl App {
    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn new(events: Sender<AppEvent>) -> App {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to create default theme: {}. Using fallback.",
                e
            );
            Theme {
                colors: std::collections::HashMap::new(),
                series: Vec::new(),
                parser: ColorParser::new(),
            }
        });

        Self::new_with_config(events, theme, config)
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        let cache = CacheManager::new(APP_NAME).unwrap_or_else(|e| {
            eprintln!("Warning: Could not initialize cache manager: {}", e);
            CacheManager {
                cache_dir: std::env::temp_dir().join(APP_NAME),
            }
        });

        let distributions = distribution_list(&config);
        let form = DistributionForm::new(config.default_distribution(), &theme, &config.inputs);
        let mut debug = DebugState::default();
        debug.enabled = config.debug.enabled;

        App {
            events,
            chart: distributions.chart_data(),
            distributions,
            form,
            list_state: DistributionListState::default(),
            export_modal: ChartExportModal::new(),
            error_modal: ErrorModal::new(),
            status: None,
            show_help: false,
            help_scroll: 0,
            debug,
            cache,
            theme,
            config,
        }
    }

    /// Use a different cache directory (input history, export path history)
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = cache;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn set_distribution_kind(&mut self, kind: DistributionKind) {
        self.form.set_kind(kind);
        self.form.focus_field(kind.fields()[0]);
    }

    /// Current chart payload, rebuilt after every list change
    pub fn chart(&self) -> &ChartPayload {
        &self.chart
    }

    /// Message of the open error modal
    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn preload(&mut self, specs: &[String]) -> Result<()> {
        let result = preload_distributions(&mut self.distributions, specs);
        self.refresh_chart();
        result
    }

    fn refresh_chart(&mut self) {
        self.chart = self.distributions.chart_data();
        self.list_state.clamp(self.distributions.len());
        tracing::debug!(
            distributions = self.distributions.len(),
            axis_len = self.chart.labels.len(),
            "chart data recomputed"
        );
    }

    /// Validate the form and append the distribution. Input is kept on failure.
    pub fn submit(&mut self) {
        let kind = self.form.kind;
        let raw = self.form.raw_fields();

        match self.distributions.add(kind, &raw) {
            Ok(id) => {
                if self.config.inputs.enable_history {
                    self.form.save_history(&self.cache);
                }
                self.form.clear_inputs();
                self.refresh_chart();
                if let Some(dist) = self.distributions.get(id) {
                    tracing::info!(
                        id = id.value(),
                        name = dist.name(),
                        label = %dist.parameters().label(),
                        "distribution added"
                    );
                }
                self.status = None;
            }
            Err(AddError::Validation(e)) => {
                tracing::warn!(kind = %kind, field = e.field().history_id(), "input rejected: {}", e);
                self.form.focus_field(e.field());
                self.error_modal.show("Invalid Input", e.to_string());
            }
            Err(AddError::Computation(cause)) => {
                tracing::error!(kind = %kind, "could not compute distribution: {}", cause);
                self.error_modal
                    .show("Error", AddError::Computation(cause).to_string());
            }
        }
    }

    /// Remove by id; unknown ids are ignored
    pub fn remove(&mut self, id: DistributionId) {
        if let Some(dist) = self.distributions.remove(id) {
            tracing::info!(id = id.value(), name = dist.name(), "distribution removed");
            self.refresh_chart();
        }
    }

    /// Empty the list and blank every input field
    pub fn clear(&mut self) {
        let removed = self.distributions.len();
        self.distributions.clear();
        self.form.clear_inputs();
        self.refresh_chart();
        if self.form.focus == FormFocus::List {
            self.form.set_focus(FormFocus::Kind);
        }
        tracing::info!(removed, "distributions cleared");
    }

    fn export(&mut self, path: &Path, format: ExportFormat) {
        match chart_export::export_chart(path, format, &self.chart) {
            Ok(()) => {
                if self.config.inputs.enable_history {
                    if let Err(e) = self.export_modal.path_input.save_to_history(&self.cache) {
                        tracing::warn!("could not save export path history: {}", e);
                    }
                }
                self.export_modal.close();
                self.status = Some(format!(
                    "Exported {} chart to {}",
                    format.as_str(),
                    path.display()
                ));
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "export failed: {}", e);
                self.error_modal.show("Export Failed", e.to_string());
            }
        }
    }

    fn selected_id(&self) -> Option<DistributionId> {
        self.list_state
            .selected()
            .and_then(|i| self.distributions.as_slice().get(i))
            .map(|d| d.id())
    }

    fn help_key(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Esc => {
                self.show_help = false;
                self.help_scroll = 0;
            }
            KeyCode::Char('h') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.show_help = false;
                self.help_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.help_scroll = self.help_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.help_scroll = self.help_scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.help_scroll = self.help_scroll.saturating_add(10);
            }
            KeyCode::PageUp => {
                self.help_scroll = self.help_scroll.saturating_sub(10);
            }
            KeyCode::Home => {
                self.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn export_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let modal = &mut self.export_modal;
        match event.code {
            KeyCode::Esc => {
                modal.close();
                return None;
            }
            KeyCode::Tab => {
                modal.next_focus();
                return None;
            }
            KeyCode::BackTab => {
                modal.prev_focus();
                return None;
            }
            _ => {}
        }

        match modal.focus {
            ChartExportFocus::FormatSelector => match event.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => {
                    modal.cycle_format();
                }
                KeyCode::Enter => modal.next_focus(),
                _ => {}
            },
            ChartExportFocus::PathInput => {
                if modal.path_input.handle_key(event, Some(&self.cache)) == TextInputEvent::Submit {
                    return self.export_request();
                }
            }
            ChartExportFocus::ExportButton => {
                if matches!(event.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    return self.export_request();
                }
            }
            ChartExportFocus::CancelButton => {
                if matches!(event.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    modal.close();
                }
            }
        }
        None
    }

    fn export_request(&mut self) -> Option<AppEvent> {
        match self.export_modal.target() {
            Some((path, format)) => Some(AppEvent::Export(path, format)),
            None => {
                self.error_modal
                    .show("Export Failed", "Please enter a file path".to_string());
                None
            }
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }

        // Error modal blocks everything else until dismissed
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.show_help {
            self.help_key(event);
            return None;
        }

        if self.export_modal.active {
            return self.export_key(event);
        }

        if ctrl {
            match event.code {
                KeyCode::Char('h') => {
                    self.show_help = true;
                    self.debug.last_action = "help".to_string();
                    return None;
                }
                KeyCode::Char('e') => {
                    self.export_modal.open(&self.theme, &self.config.inputs);
                    self.debug.last_action = "export".to_string();
                    return None;
                }
                _ => {}
            }
        }

        let has_items = !self.distributions.is_empty();
        match event.code {
            KeyCode::Tab => {
                self.form.next_focus(has_items);
                return None;
            }
            KeyCode::BackTab => {
                self.form.prev_focus(has_items);
                return None;
            }
            _ => {}
        }

        match self.form.focus {
            FormFocus::Field(_) => {
                if event.code == KeyCode::Esc {
                    self.form.set_focus(FormFocus::Kind);
                    return None;
                }
                let cache = &self.cache;
                let outcome = self
                    .form
                    .focused_input_mut()
                    .map(|input| input.handle_key(event, Some(cache)));
                if outcome == Some(TextInputEvent::Submit) {
                    self.debug.last_action = "submit".to_string();
                    return Some(AppEvent::Submit);
                }
                None
            }
            FormFocus::Kind => match event.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => {
                    self.form.toggle_kind();
                    self.debug.last_action = format!("kind={}", self.form.kind);
                    None
                }
                KeyCode::Enter => Some(AppEvent::Submit),
                KeyCode::Char('q') => Some(AppEvent::Exit),
                _ => None,
            },
            FormFocus::AddButton => match event.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(AppEvent::Submit),
                KeyCode::Char('q') => Some(AppEvent::Exit),
                _ => None,
            },
            FormFocus::List => {
                let len = self.distributions.len();
                match event.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        self.list_state.select_next(len);
                        None
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.list_state.select_previous(len);
                        None
                    }
                    KeyCode::Char('d') | KeyCode::Delete => {
                        self.debug.last_action = "remove".to_string();
                        self.selected_id().map(AppEvent::Remove)
                    }
                    KeyCode::Char('c') => {
                        self.debug.last_action = "clear".to_string();
                        Some(AppEvent::Clear)
                    }
                    KeyCode::Char('q') => Some(AppEvent::Exit),
                    _ => None,
                }
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Submit => {
                self.submit();
                None
            }
            AppEvent::Remove(id) => {
                self.remove(*id);
                if self.distributions.is_empty() && self.form.focus == FormFocus::List {
                    self.form.set_focus(FormFocus::Kind);
                }
                None
            }
            AppEvent::Clear => {
                self.clear();
                None
            }
            AppEvent::Export(path, format) => {
                self.export(path, *format);
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
        let mut spans = vec![Span::styled(
            format!(" {}", TITLE),
            Style::default()
                .fg(ctx.primary)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(ref status) = self.status {
            spans.push(Span::styled(
                format!("  {}", status),
                Style::default().fg(ctx.text_secondary),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        let ctx = RenderContext::from_theme_and_config(&self.theme, &self.config);

        Block::default()
            .style(Style::default().bg(ctx.background))
            .render(area, buf);

        let layout = app_layout(area, self.debug.enabled);
        self.render_title(layout.title, buf, &ctx);

        let form_height = widgets::form::form_height(self.form.kind, ctx.show_preview);
        let (form_area, list_area) = sidebar_layout(layout.sidebar, form_height);
        widgets::form::render_form(form_area, buf, &self.form, &ctx);
        widgets::distribution_list::render_distribution_list(
            list_area,
            buf,
            self.distributions.as_slice(),
            &mut self.list_state,
            self.form.focus == FormFocus::List,
            &ctx,
        );

        widgets::chart::render_chart_view(layout.chart, buf, &self.chart, &ctx);

        let modal_open = self.error_modal.active || self.show_help || self.export_modal.active;
        let controls = if self.form.focus == FormFocus::List {
            &LIST_CONTROLS
        } else {
            &MAIN_CONTROLS
        };
        (&Controls::from_context(&ctx)
            .with_controls(controls)
            .with_count(self.distributions.len())
            .with_dimmed(modal_open))
            .render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            self.debug.focus_at_render = format!("{:?}", self.form.focus);
            self.debug.distributions = self.distributions.len();
            self.debug.axis_len = self.chart.labels.len();
            (&self.debug).render(debug_area, buf);
        }

        if self.export_modal.active {
            let popup = centered_rect_fixed(area, 64, 9);
            widgets::chart_export_modal::render_chart_export_modal(
                popup,
                buf,
                &self.export_modal,
                &ctx,
            );
        }

        if self.show_help {
            let (title, text) = if self.export_modal.active {
                ("Export Help", help_strings::export())
            } else {
                ("Help", help_strings::main_view())
            };
            render::overlays::render_help_overlay(
                area,
                buf,
                title,
                text,
                &mut self.help_scroll,
                &ctx,
            );
        }

        if self.error_modal.active {
            render::overlays::render_error_modal(area, buf, &self.error_modal, &ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = channel();
        let app = App::new(tx).with_cache(CacheManager::with_dir(dir.path().to_path_buf()));
        (app, dir)
    }

    fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
        app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn error_modal_blocks_until_dismissed() {
        let (mut app, _dir) = app();
        app.submit();
        assert_eq!(
            app.error_message(),
            Some("Please enter lambda for Poisson distribution")
        );
        assert!(press(&mut app, KeyCode::Tab).is_none());
        assert_eq!(app.form.focus, FormFocus::Field(Field::Lambda));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.error_message(), None);
    }

    #[test]
    fn ctrl_c_exits_from_anywhere() {
        let (mut app, _dir) = app();
        app.submit();
        let event = app.event(&AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(matches!(event, Some(AppEvent::Exit)));
    }

    #[test]
    fn q_in_text_field_is_typed() {
        let (mut app, _dir) = app();
        assert!(press(&mut app, KeyCode::Char('q')).is_none());
        assert_eq!(app.form.raw_fields().lambda, "q");
    }

    #[test]
    fn export_format_resolution() {
        assert_eq!(
            resolve_export_format(Path::new("a.json"), None).unwrap(),
            ExportFormat::Json
        );
        assert_eq!(
            resolve_export_format(Path::new("a.json"), Some(ExportFormat::Png)).unwrap(),
            ExportFormat::Png
        );
        assert!(resolve_export_format(Path::new("a"), None).is_err());
    }

    #[test]
    fn preload_stops_at_first_invalid_spec() {
        let mut list = DistributionList::default();
        let specs = vec![
            "poisson:2".to_string(),
            "binomial:0,0.5".to_string(),
            "poisson:3".to_string(),
        ];
        let err = preload_distributions(&mut list, &specs).unwrap_err();
        assert!(err
            .to_string()
            .contains("Number of trials must be positive"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn render_does_not_panic_on_small_terminal() {
        let (mut app, _dir) = app();
        app.preload(&["poisson:2".to_string()]).unwrap();
        app.enable_debug();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
    }
}
