use pmfviz::chart_data::SeriesColor;
use pmfviz::config::{AppConfig, ConfigManager};
use pmfviz::DistributionKind;
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_config(config_manager: &ConfigManager, content: &str) {
    config_manager.ensure_config_dir().unwrap();
    fs::write(config_manager.config_path("config.toml"), content).unwrap();
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    // Check display defaults
    assert_eq!(config.display.default_distribution, "poisson");
    assert!(config.display.show_preview);
    assert!(config.display.show_legend);

    // Check chart defaults
    assert_eq!(config.chart.palette.len(), 5);
    assert_eq!(config.chart.palette[0], SeriesColor::new("#4bc0c0", "#4bc0c033"));
    assert_eq!(config.chart.max_axis_len, 10000);

    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert_eq!(config.inputs.history_limit, 1000);
    assert!(config.inputs.enable_history);

    // Logging is opt-in
    assert!(!config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_name, "pmfviz.log");

    assert_eq!(config.theme.color_mode, "auto");
    assert_eq!(config.theme.colors.primary, "cyan");
    assert_eq!(config.theme.colors.controls_bg, "indexed(236)");

    assert!(!config.debug.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[chart]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[inputs]"));
    assert!(template.contains("[logging]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let template = config_manager.generate_default_config();

    let parsed: AppConfig = toml::from_str(&template).expect("template must parse");
    let default = AppConfig::default();
    assert_eq!(parsed.version, default.version);
    assert_eq!(parsed.chart.palette, default.chart.palette);
    assert_eq!(parsed.chart.max_axis_len, default.chart.max_axis_len);
    assert_eq!(parsed.logging.file_name, default.logging.file_name);
    assert_eq!(parsed.theme.colors.primary, default.theme.colors.primary);
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    assert!(config_path.exists());

    // Second write without force fails, with force succeeds
    let err = config_manager.write_default_config(false).unwrap_err();
    assert!(err.to_string().contains("--force"));
    assert!(config_manager.write_default_config(true).is_ok());
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = config_manager.load_config().unwrap();
    assert_eq!(config.display.default_distribution, "poisson");
}

#[test]
fn test_partial_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(
        &config_manager,
        r##"
[display]
default_distribution = "binomial"

[chart]
palette = [{ border = "#112233", fill = "#11223380" }]

[theme.colors]
primary = "#ff00ff"
"##,
    );

    let user = config_manager.load_config().unwrap();
    let mut config = AppConfig::default();
    config.merge(user);

    assert_eq!(config.default_distribution(), DistributionKind::Binomial);
    assert_eq!(config.chart.palette.len(), 1);
    assert_eq!(config.chart.palette().unwrap().len(), 1);
    assert_eq!(config.theme.colors.primary, "#ff00ff");
    // Untouched sections keep their defaults
    assert!(config.display.show_preview);
    assert_eq!(config.theme.colors.error, "red");
    assert_eq!(config.inputs.history_limit, 1000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loaded_config_is_validated() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(
        &config_manager,
        r#"
[display]
default_distribution = "gaussian"
"#,
    );
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Invalid default_distribution"));

    write_config(
        &config_manager,
        r#"
[display]
default_distribution = "binomial"
"#,
    );
    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.default_distribution(), DistributionKind::Binomial);
}

#[test]
fn test_invalid_toml_reports_path() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "[display\nshow_preview = true");
    let err = config_manager.load_config().unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_validation_errors() {
    // NO_COLOR makes every colour parse as Reset
    std::env::remove_var("NO_COLOR");

    let mut config = AppConfig::default();
    config.display.default_distribution = "gaussian".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.palette.clear();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.palette[0].fill = "teal".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("chart.palette[0]"));

    let mut config = AppConfig::default();
    config.chart.max_axis_len = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.colors.modal_border = "not_a_color".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("modal_border"));

    let mut config = AppConfig::default();
    config.version = "2.0".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_max_axis_len_limits_distributions() {
    let mut config = AppConfig::default();
    config.chart.max_axis_len = 50;
    let mut list = pmfviz::distribution_list(&config);

    let specs = vec!["binomial:50,0.5".to_string()];
    assert!(pmfviz::preload_distributions(&mut list, &specs).is_ok());

    let specs = vec!["binomial:51,0.5".to_string()];
    let err = pmfviz::preload_distributions(&mut list, &specs).unwrap_err();
    assert!(err.to_string().contains("Failed to calculate statistics"));
    assert_eq!(list.len(), 1);
}
