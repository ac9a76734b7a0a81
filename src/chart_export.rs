//! Chart export to PNG (plotters bitmap) and JSON (the chart payload).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::chart_data::ChartPayload;
use crate::config::parse_hex_rgba;
use crate::ExportFormat;

const PNG_SIZE: (u32, u32) = (800, 480);
/// Share of one x unit covered by a group of bars.
const GROUP_WIDTH: f64 = 0.8;

/// Write `payload` to `path` in `format`. An empty chart is an error.
pub fn export_chart(path: &Path, format: ExportFormat, payload: &ChartPayload) -> Result<()> {
    if payload.is_empty() {
        return Err(eyre!("No data to export"));
    }
    match format {
        ExportFormat::Png => write_chart_png(path, payload),
        ExportFormat::Json => write_chart_json(path, payload),
    }?;
    tracing::info!(
        path = %path.display(),
        format = format.as_str(),
        datasets = payload.datasets.len(),
        "chart exported"
    );
    Ok(())
}

/// Write the payload as pretty-printed JSON.
pub fn write_chart_json(path: &Path, payload: &ChartPayload) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, payload)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// x range of bar `series` (of `count`) in the group at `x`.
pub fn bar_span(x: f64, series: usize, count: usize) -> (f64, f64) {
    let width = GROUP_WIDTH / count.max(1) as f64;
    let start = x - GROUP_WIDTH / 2.0 + series as f64 * width;
    (start, start + width)
}

fn rgba(hex: &str) -> Result<plotters::style::RGBAColor> {
    use plotters::style::{Color, RGBColor};

    let (r, g, b, a) = parse_hex_rgba(hex)?;
    Ok(RGBColor(r, g, b).mix(a as f64 / 255.0))
}

/// Write the chart as a grouped bar chart PNG using the dataset colours.
pub fn write_chart_png(path: &Path, payload: &ChartPayload) -> Result<()> {
    use plotters::prelude::*;

    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = payload.max_x() as f64;
    let y_max = match payload.max_value() {
        v if v > 0.0 => v * 1.1,
        _ => 1.0,
    };

    let mut chart = ChartBuilder::on(&root)
        .caption("Probability Mass Function", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..x_max + 0.5, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Values")
        .y_desc("Probability Mass")
        .x_labels((payload.labels.len()).min(20))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    let count = payload.datasets.len();
    for (idx, dataset) in payload.datasets.iter().enumerate() {
        let fill = rgba(&dataset.background_color)?;
        let border = rgba(&dataset.border_color)?;
        let border_width = dataset.border_width;

        let bars = payload
            .labels
            .iter()
            .zip(dataset.data.iter())
            .map(move |(&x, &y)| {
                let (x0, x1) = bar_span(x as f64, idx, count);
                [
                    Rectangle::new([(x0, 0.0), (x1, y)], fill.filled()),
                    Rectangle::new([(x0, 0.0), (x1, y)], border.stroke_width(border_width)),
                ]
            })
            .flatten();

        chart
            .draw_series(bars)?
            .label(dataset.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], border.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DistributionKind, DistributionList};
    use crate::validation::RawFields;

    fn payload() -> ChartPayload {
        let mut list = DistributionList::default();
        list.add(DistributionKind::Poisson, &RawFields::poisson("2"))
            .unwrap();
        list.add(DistributionKind::Binomial, &RawFields::binomial("4", "0.5"))
            .unwrap();
        list.chart_data()
    }

    #[test]
    fn bars_in_a_group_do_not_overlap() {
        let (a0, a1) = bar_span(3.0, 0, 2);
        let (b0, b1) = bar_span(3.0, 1, 2);
        assert!((a0 - 2.6).abs() < 1e-12);
        assert!((a1 - b0).abs() < 1e-12);
        assert!((b1 - 3.4).abs() < 1e-12);
    }

    #[test]
    fn empty_chart_is_not_exported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.json");
        let err = export_chart(&path, ExportFormat::Json, &ChartPayload::default()).unwrap_err();
        assert_eq!(err.to_string(), "No data to export");
        assert!(!path.exists());
    }

    #[test]
    fn json_export_contains_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.json");
        export_chart(&path, ExportFormat::Json, &payload()).expect("export json");

        let content = std::fs::read_to_string(&path).expect("read");
        let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
        assert_eq!(value["labels"].as_array().map(|a| a.len()), Some(8));
        assert_eq!(value["datasets"][1]["label"], "Binomial (n=4, p=0.5)");
        assert_eq!(value["datasets"][1]["data"][7], 0.0);
    }

    #[test]
    fn png_export_writes_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.png");
        export_chart(&path, ExportFormat::Png, &payload()).expect("export png");

        let bytes = std::fs::read(&path).expect("read");
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
