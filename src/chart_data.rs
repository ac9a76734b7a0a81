//! Chart payload derivation: shared integer x-axis plus one PMF dataset per distribution.
//!
//! The payload is rebuilt from the whole distribution list on every change.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, Parameters, PmfFamily};

/// Border and fill colour of one series, as hex strings (`#rrggbb` / `#rrggbbaa`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesColor {
    pub border: String,
    pub fill: String,
}

impl SeriesColor {
    pub fn new(border: impl Into<String>, fill: impl Into<String>) -> Self {
        Self {
            border: border.into(),
            fill: fill.into(),
        }
    }
}

/// Non-empty, fixed series palette. Colours are picked cyclically by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<SeriesColor>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                SeriesColor::new("#4bc0c0", "#4bc0c033"),
                SeriesColor::new("#ff6384", "#ff638433"),
                SeriesColor::new("#ffcd56", "#ffcd5633"),
                SeriesColor::new("#36a2eb", "#36a2eb33"),
                SeriesColor::new("#9966ff", "#9966ff33"),
            ],
        }
    }
}

impl Palette {
    pub fn new(colors: Vec<SeriesColor>) -> Result<Self> {
        if colors.is_empty() {
            return Err(eyre!("Chart palette must contain at least one colour"));
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[SeriesColor] {
        &self.colors
    }

    pub fn color_for(&self, index: usize) -> &SeriesColor {
        &self.colors[index % self.colors.len()]
    }
}

/// One bar series in renderer shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
}

/// Renderer input: shared x labels and one dataset per distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<u64>,
    pub datasets: Vec<ChartDataset>,
}

impl Default for ChartPayload {
    fn default() -> Self {
        Self {
            labels: vec![0],
            datasets: Vec::new(),
        }
    }
}

impl ChartPayload {
    /// Last x value on the shared axis.
    pub fn max_x(&self) -> u64 {
        self.labels.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Largest probability across all datasets (0 when empty).
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0_f64, f64::max)
    }

    /// (x, y) points per dataset, for plotting backends.
    pub fn series_points(&self) -> Vec<Vec<(f64, f64)>> {
        self.datasets
            .iter()
            .map(|d| {
                self.labels
                    .iter()
                    .zip(d.data.iter())
                    .map(|(&x, &y)| (x as f64, y))
                    .collect()
            })
            .collect()
    }
}

/// Maximum support bound across the list; 0 when empty.
pub fn axis_bound(distributions: &[Distribution]) -> u64 {
    distributions
        .iter()
        .map(|d| d.parameters().support_bound())
        .max()
        .unwrap_or(0)
}

fn dataset_values(distribution: &Distribution, labels: &[u64]) -> Vec<f64> {
    match distribution.parameters() {
        Parameters::Binomial(b) => labels
            .iter()
            .map(|&x| if x > b.n { 0.0 } else { distribution.pmf(x) })
            .collect(),
        Parameters::Poisson(_) => labels.iter().map(|&x| distribution.pmf(x)).collect(),
    }
}

/// Builds the chart payload for `distributions`.
///
/// Dataset colours come from the dataset's position, not from the colour stored on the
/// distribution when it was added.
pub fn prepare_chart_data(distributions: &[Distribution], palette: &Palette) -> ChartPayload {
    let labels: Vec<u64> = (0..=axis_bound(distributions)).collect();

    let datasets = distributions
        .iter()
        .enumerate()
        .map(|(i, dist)| {
            let color = palette.color_for(i);
            ChartDataset {
                label: dist.parameters().label(),
                data: dataset_values(dist, &labels),
                background_color: color.fill.clone(),
                border_color: color.border.clone(),
                border_width: 1,
            }
        })
        .collect();

    ChartPayload { labels, datasets }
}
