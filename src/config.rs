use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::chart_data::{Palette, SeriesColor};
use crate::distribution::{DistributionKind, DEFAULT_MAX_AXIS_LEN};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Read and parse config.toml from this directory. Missing file yields defaults.
    pub fn load_config(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub chart: ChartConfig,
    pub performance: PerformanceConfig,
    pub inputs: InputsConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Distribution type selected in the form at startup ("poisson" or "binomial")
    pub default_distribution: String,
    /// Show the mean/variance preview under the parameter fields
    pub show_preview: bool,
    pub show_legend: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub palette: Vec<SeriesColor>,
    /// Largest support bound a single distribution may have
    pub max_axis_len: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputsConfig {
    pub history_limit: usize,
    pub enable_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    /// Log file name inside the cache directory
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub warning: String,
    pub dimmed: String,
    pub background: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub modal_border: String,
    pub modal_border_active: String,
    pub modal_border_error: String,
    pub chart_axis: String,
    pub cursor_focused: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            chart: ChartConfig::default(),
            performance: PerformanceConfig::default(),
            inputs: InputsConfig::default(),
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_distribution: "poisson".to_string(),
            show_preview: true,
            show_legend: true,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            palette: Palette::default().colors().to_vec(),
            max_axis_len: DEFAULT_MAX_AXIS_LEN,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            enable_history: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file_name: "pmfviz.log".to_string(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "yellow".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "black".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            modal_border: "cyan".to_string(),
            modal_border_active: "yellow".to_string(),
            modal_border_error: "red".to_string(),
            chart_axis: "light_gray".to_string(),
            cursor_focused: "default".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        match ConfigManager::new(app_name) {
            Ok(manager) => Self::load_from(&manager),
            Err(_) => {
                let config = AppConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Defaults merged with the config file in `manager`'s directory, validated.
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(user_config) = manager.load_config() {
            config.merge(user_config);
        }

        config.validate()?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.chart.merge(other.chart);
        self.performance.merge(other.performance);
        self.inputs.merge(other.inputs);
        self.logging.merge(other.logging);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if DistributionKind::from_name(&self.display.default_distribution).is_none() {
            return Err(eyre!(
                "Invalid default_distribution: {}. Must be 'poisson' or 'binomial'",
                self.display.default_distribution
            ));
        }

        if self.chart.max_axis_len == 0 {
            return Err(eyre!("max_axis_len must be greater than 0"));
        }
        self.chart.palette()?;

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.logging.file_name.trim().is_empty() {
            return Err(eyre!("logging.file_name must not be empty"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    /// Distribution type for the form at startup.
    pub fn default_distribution(&self) -> DistributionKind {
        DistributionKind::from_name(&self.display.default_distribution).unwrap_or_default()
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.default_distribution != default.default_distribution {
            self.default_distribution = other.default_distribution;
        }
        if other.show_preview != default.show_preview {
            self.show_preview = other.show_preview;
        }
        if other.show_legend != default.show_legend {
            self.show_legend = other.show_legend;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.palette != default.palette {
            self.palette = other.palette;
        }
        if other.max_axis_len != default.max_axis_len {
            self.max_axis_len = other.max_axis_len;
        }
    }

    /// Validated palette (non-empty, every colour a hex string).
    pub fn palette(&self) -> Result<Palette> {
        for (i, color) in self.palette.iter().enumerate() {
            parse_hex_rgba(&color.border)
                .map_err(|e| eyre!("Invalid border colour in chart.palette[{}]: {}", i, e))?;
            parse_hex_rgba(&color.fill)
                .map_err(|e| eyre!("Invalid fill colour in chart.palette[{}]: {}", i, e))?;
        }
        Palette::new(self.palette.clone())
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl InputsConfig {
    pub fn merge(&mut self, other: Self) {
        let default = InputsConfig::default();
        if other.history_limit != default.history_limit {
            self.history_limit = other.history_limit;
        }
        if other.enable_history != default.enable_history {
            self.enable_history = other.enable_history;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.enabled != default.enabled {
            self.enabled = other.enabled;
        }
        if other.level != default.level {
            self.level = other.level;
        }
        if other.file_name != default.file_name {
            self.file_name = other.file_name;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Every colour setting paired with its theme key.
    fn entries(&self) -> [(&'static str, &String); 14] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("error", &self.error),
            ("warning", &self.warning),
            ("dimmed", &self.dimmed),
            ("background", &self.background),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("modal_border", &self.modal_border),
            ("modal_border_active", &self.modal_border_active),
            ("modal_border_error", &self.modal_border_error),
            ("chart_axis", &self.chart_axis),
            ("cursor_focused", &self.cursor_focused),
        ]
    }

    fn entries_mut(&mut self) -> [&mut String; 14] {
        [
            &mut self.primary,
            &mut self.secondary,
            &mut self.error,
            &mut self.warning,
            &mut self.dimmed,
            &mut self.background,
            &mut self.controls_bg,
            &mut self.text_primary,
            &mut self.text_secondary,
            &mut self.modal_border,
            &mut self.modal_border_active,
            &mut self.modal_border_error,
            &mut self.chart_axis,
            &mut self.cursor_focused,
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        let defaults = default.entries();
        let others = other.entries();
        for ((slot, (_, default_value)), (_, other_value)) in
            self.entries_mut().into_iter().zip(defaults).zip(others)
        {
            if other_value != default_value {
                *slot = other_value.clone();
            }
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color parser with terminal capability detection
#[derive(Debug, Clone, Copy)]
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parser with fixed capabilities, independent of the current terminal.
    pub fn with_capabilities(supports_true_color: bool, supports_256: bool) -> Self {
        Self {
            supports_true_color,
            supports_256,
            no_color: false,
        }
    }

    /// Parse a color string (hex, indexed or named) and convert to a terminal color.
    /// An alpha channel in `#rrggbbaa` is ignored.
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') {
            let (r, g, b, _) = parse_hex_rgba(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        let lower = trimmed.to_lowercase();

        // Indexed colors: "indexed(236)" for explicit 256-color palette
        if let Some(num_str) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = num_str.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" | "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => {
                Ok(Color::Indexed(8))
            }
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            // Terminal default, rendered with the REVERSED modifier where it matters
            "default" | "reset" | "reversed" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(N), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA components (alpha defaults to 255).
pub fn parse_hex_rgba(s: &str) -> Result<(u8, u8, u8, u8)> {
    let digits = s
        .strip_prefix('#')
        .filter(|d| (d.len() == 6 || d.len() == 8) && d.is_ascii())
        .ok_or_else(|| {
            eyre!(
                "Invalid hex color format: '{}'. Expected #rrggbb or #rrggbbaa",
                s
            )
        })?;

    let component = |range: std::ops::Range<usize>, name: &str| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| eyre!("Invalid {} component in hex color: {}", name, s))
    };

    let r = component(0..2, "red")?;
    let g = component(2..4, "green")?;
    let b = component(4..6, "blue")?;
    let a = if digits.len() == 8 {
        component(6..8, "alpha")?
    } else {
        255
    };

    Ok((r, g, b, a))
}

/// Convert RGB to nearest 256-color palette index (xterm palette)
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    /// Terminal colours of the chart palette borders, by palette position
    pub series: Vec<Color>,
    /// Parser detected once at startup, for colours stored on distributions
    pub parser: ColorParser,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        Self::from_config_with_palette(config, &Palette::default())
    }

    pub fn from_config_with_palette(config: &ThemeConfig, palette: &Palette) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        let series = palette
            .colors()
            .iter()
            .map(|c| parser.parse(&c.border))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            colors,
            series,
            parser,
        })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Terminal colour for the series at `index` (cycles like the palette).
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return Color::Reset;
        }
        self.series[index % self.series.len()]
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_with_and_without_alpha() {
        assert_eq!(parse_hex_rgba("#4bc0c0").unwrap(), (0x4b, 0xc0, 0xc0, 255));
        assert_eq!(
            parse_hex_rgba("#ff638433").unwrap(),
            (0xff, 0x63, 0x84, 0x33)
        );
        assert!(parse_hex_rgba("4bc0c0").is_err());
        assert!(parse_hex_rgba("#4bc0c").is_err());
        assert!(parse_hex_rgba("#zzzzzz").is_err());
    }

    #[test]
    fn parser_respects_capabilities() {
        let truecolor = ColorParser::with_capabilities(true, true);
        assert_eq!(truecolor.parse("#ff0000").unwrap(), Color::Rgb(255, 0, 0));
        let ansi = ColorParser::with_capabilities(false, false);
        assert_eq!(ansi.parse("#ff0000").unwrap(), Color::Red);
        assert_eq!(ansi.parse("indexed(236)").unwrap(), Color::Indexed(236));
        assert!(ansi.parse("chartreuse-ish").is_err());
    }

    #[test]
    fn color_merge_only_takes_changed_values() {
        let mut base = ColorConfig::default();
        let mut other = ColorConfig::default();
        other.primary = "blue".to_string();
        base.merge(other);
        assert_eq!(base.primary, "blue");
        assert_eq!(base.error, "red");
    }

    #[test]
    fn default_distribution_falls_back_to_poisson() {
        let mut config = AppConfig::default();
        assert_eq!(config.default_distribution(), DistributionKind::Poisson);
        config.display.default_distribution = "Binomial".to_string();
        assert_eq!(config.default_distribution(), DistributionKind::Binomial);
    }
}
