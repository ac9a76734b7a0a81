//! Shared CLI definitions for pmfviz.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Distribution family selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DistributionChoice {
    /// Poisson distribution, parameterised by its rate lambda
    Poisson,
    /// Binomial distribution, parameterised by trials n and success probability p
    Binomial,
}

/// Output format for chart export.
/// When `--export-format` is not specified, format is detected from the file extension.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG bitmap rendered with the chart palette
    Png,
    /// Chart payload (labels and datasets) as JSON
    Json,
}

impl ExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Json];

    /// Detect export format from path extension. Returns None when extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Parse format from extension string (e.g. "png", "json").
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Json => "json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Json => "JSON",
        }
    }
}

/// Command-line arguments for pmfviz
#[derive(Clone, Parser, Debug)]
#[command(
    name = "pmfviz",
    version,
    about = "Probability mass function explorer for the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Add a distribution at startup. Repeatable; order is kept.
    /// Format: poisson:LAMBDA or binomial:N,P (e.g. --add poisson:2 --add binomial:4,0.5)
    #[arg(short = 'a', long = "add", value_name = "SPEC")]
    pub add: Vec<String>,

    /// Distribution type selected in the input form at startup (default from config)
    #[arg(long = "distribution", value_enum)]
    pub distribution: Option<DistributionChoice>,

    /// Write the chart for the --add distributions to PATH and exit without opening the interface
    #[arg(long = "export", value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Export format (png, json). If not specified, it is detected from the --export extension.
    #[arg(long = "export-format", value_enum, requires = "export")]
    pub export_format: Option<ExportFormat>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Enable file logging with this filter (e.g. info, debug, pmfviz=trace). Overrides config and PMFVIZ_LOG.
    #[arg(long = "log-level", value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Clear all cache data (input history, logs) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/pmfviz/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("chart.png")),
            Some(ExportFormat::Png)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("chart.JSON")),
            Some(ExportFormat::Json)
        );
        assert_eq!(ExportFormat::from_path(Path::new("chart.eps")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_add_is_repeatable_and_ordered() {
        let args = Args::try_parse_from([
            "pmfviz",
            "--add",
            "poisson:2",
            "-a",
            "binomial:4,0.5",
        ])
        .unwrap();
        assert_eq!(args.add, vec!["poisson:2", "binomial:4,0.5"]);
        assert!(args.export.is_none());
    }

    #[test]
    fn test_export_format_requires_export() {
        let result = Args::try_parse_from(["pmfviz", "--export-format", "png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["pmfviz", "--force"]).is_err());
        let args = Args::try_parse_from(["pmfviz", "--generate-config", "--force"]).unwrap();
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--add"));
        assert!(md.contains("--export-format"));
        assert!(!md.contains("`--help`"));
    }
}
