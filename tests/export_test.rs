use clap::Parser;
use pmfviz::chart_export::export_chart;
use pmfviz::{resolve_export_format, AppConfig, Args, ExportFormat};
use std::fs;
use tempfile::TempDir;

fn headless_export(args: &Args) -> color_eyre::Result<()> {
    let config = AppConfig::default();
    let path = args.export.as_ref().expect("--export given");
    let format = resolve_export_format(path, args.export_format)?;
    let mut list = pmfviz::distribution_list(&config);
    pmfviz::preload_distributions(&mut list, &args.add)?;
    export_chart(path, format, &list.chart_data())
}

#[test]
fn test_add_flags_keep_order() {
    let args = Args::parse_from([
        "pmfviz",
        "--add",
        "binomial:4,0.5",
        "-a",
        "poisson:2",
    ]);
    assert_eq!(args.add, vec!["binomial:4,0.5", "poisson:2"]);
}

#[test]
fn test_export_format_requires_export() {
    assert!(Args::try_parse_from(["pmfviz", "--export-format", "json"]).is_err());
}

#[test]
fn test_headless_json_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pmf.json");
    let args = Args::parse_from([
        "pmfviz",
        "--add",
        "poisson:2",
        "--add",
        "binomial:4,0.5",
        "--export",
        path.to_str().unwrap(),
    ]);

    headless_export(&args).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let labels: Vec<u64> = json["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert_eq!(labels, (0..=7).collect::<Vec<u64>>());

    let datasets = json["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["label"], "Poisson (λ=2)");
    assert_eq!(datasets[0]["borderColor"], "#4bc0c0");
    assert_eq!(datasets[1]["backgroundColor"], "#ff638433");
    assert_eq!(datasets[1]["borderWidth"], 1);

    let binomial: Vec<f64> = datasets[1]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(binomial.len(), 8);
    assert!((binomial[2] - 0.375).abs() < 1e-12);
    assert!(binomial[5..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_explicit_format_overrides_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pmf.out");
    let args = Args::parse_from([
        "pmfviz",
        "-a",
        "poisson:1",
        "--export",
        path.to_str().unwrap(),
        "--export-format",
        "json",
    ]);
    assert_eq!(
        resolve_export_format(&path, args.export_format).unwrap(),
        ExportFormat::Json
    );
    headless_export(&args).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("\"datasets\""));
}

#[test]
fn test_invalid_spec_aborts_export() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pmf.json");
    let args = Args::parse_from([
        "pmfviz",
        "--add",
        "poisson:-1",
        "--export",
        path.to_str().unwrap(),
    ]);
    let err = headless_export(&args).unwrap_err();
    assert!(err.to_string().contains("Lambda must be positive"));
    assert!(!path.exists());
}

#[test]
fn test_empty_export_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pmf.json");
    let args = Args::parse_from(["pmfviz", "--export", path.to_str().unwrap()]);
    let err = headless_export(&args).unwrap_err();
    assert_eq!(err.to_string(), "No data to export");
}
