//! Distribution families, their parameters, and the append/remove-only list of added distributions.

use chrono::{DateTime, Local};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete, Poisson};
use std::fmt;
use thiserror::Error;

use crate::chart_data::{prepare_chart_data, ChartPayload, Palette, SeriesColor};
use crate::validation::{validate_binomial, validate_poisson, Field, RawFields, ValidationError};

/// Default upper limit on the shared x-axis length.
pub const DEFAULT_MAX_AXIS_LEN: u64 = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    #[default]
    Poisson,
    Binomial,
}

impl DistributionKind {
    pub const ALL: [Self; 2] = [Self::Poisson, Self::Binomial];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poisson => "poisson",
            Self::Binomial => "binomial",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Poisson => "Poisson",
            Self::Binomial => "Binomial",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "poisson" => Some(Self::Poisson),
            "binomial" => Some(Self::Binomial),
            _ => None,
        }
    }

    /// Input fields of this family, in form order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::Poisson => &[Field::Lambda],
            Self::Binomial => &[Field::Trials, Field::Probability],
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Poisson => Self::Binomial,
            Self::Binomial => Self::Poisson,
        }
    }

    pub fn validate(self, raw: &RawFields) -> Result<Parameters, ValidationError> {
        match self {
            Self::Poisson => validate_poisson(raw).map(Parameters::Poisson),
            Self::Binomial => validate_binomial(raw).map(Parameters::Binomial),
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<pmfviz_cli::DistributionChoice> for DistributionKind {
    fn from(choice: pmfviz_cli::DistributionChoice) -> Self {
        match choice {
            pmfviz_cli::DistributionChoice::Poisson => Self::Poisson,
            pmfviz_cli::DistributionChoice::Binomial => Self::Binomial,
        }
    }
}

/// Failure while turning validated parameters into something the chart can evaluate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("{kind} parameters rejected by the PMF library: {detail}")]
    Library {
        kind: DistributionKind,
        detail: String,
    },
    #[error("support bound {bound} exceeds the axis limit of {limit}")]
    AxisTooLarge { bound: u64, limit: u64 },
}

/// Failure of [`DistributionList::add`]. The list is unchanged in both cases.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AddError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to calculate statistics. Please try again.")]
    Computation(#[source] ComputationError),
}

/// Capability shared by every distribution family.
pub trait PmfFamily {
    fn kind(&self) -> DistributionKind;

    /// Largest x the chart needs to show for this distribution.
    fn support_bound(&self) -> u64;

    fn mean(&self) -> f64;

    fn variance(&self) -> f64;

    /// Dataset label, e.g. `Poisson (λ=2)`.
    fn label(&self) -> String;

    /// Build the PMF evaluator for these parameters.
    fn model(&self) -> Result<PmfModel, ComputationError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonParams {
    pub lambda: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialParams {
    pub n: u64,
    pub p: f64,
}

impl PmfFamily for PoissonParams {
    fn kind(&self) -> DistributionKind {
        DistributionKind::Poisson
    }

    fn support_bound(&self) -> u64 {
        (self.lambda + 3.0 * self.lambda.sqrt()).ceil() as u64
    }

    fn mean(&self) -> f64 {
        self.lambda
    }

    fn variance(&self) -> f64 {
        self.lambda
    }

    fn label(&self) -> String {
        format!("Poisson (λ={})", format_number(self.lambda))
    }

    fn model(&self) -> Result<PmfModel, ComputationError> {
        Poisson::new(self.lambda)
            .map(PmfModel::Poisson)
            .map_err(|e| ComputationError::Library {
                kind: DistributionKind::Poisson,
                detail: e.to_string(),
            })
    }
}

impl PmfFamily for BinomialParams {
    fn kind(&self) -> DistributionKind {
        DistributionKind::Binomial
    }

    fn support_bound(&self) -> u64 {
        self.n
    }

    fn mean(&self) -> f64 {
        self.n as f64 * self.p
    }

    fn variance(&self) -> f64 {
        self.n as f64 * self.p * (1.0 - self.p)
    }

    fn label(&self) -> String {
        format!("Binomial (n={}, p={})", self.n, format_number(self.p))
    }

    fn model(&self) -> Result<PmfModel, ComputationError> {
        Binomial::new(self.p, self.n)
            .map(PmfModel::Binomial)
            .map_err(|e| ComputationError::Library {
                kind: DistributionKind::Binomial,
                detail: e.to_string(),
            })
    }
}

/// Shortest round-trip form of `v`, switching to exponent notation below 1e-6
/// and from 1e21 up (`1e-7`, `2.5`, `1e+21`).
pub fn format_number(v: f64) -> String {
    let abs = v.abs();
    if v != 0.0 && v.is_finite() && !(1e-6..1e21).contains(&abs) {
        let s = format!("{:e}", v);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        }
    } else {
        v.to_string()
    }
}

/// Validated parameters of one family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parameters {
    Poisson(PoissonParams),
    Binomial(BinomialParams),
}

impl Parameters {
    fn family(&self) -> &dyn PmfFamily {
        match self {
            Self::Poisson(p) => p,
            Self::Binomial(b) => b,
        }
    }
}

impl PmfFamily for Parameters {
    fn kind(&self) -> DistributionKind {
        self.family().kind()
    }

    fn support_bound(&self) -> u64 {
        self.family().support_bound()
    }

    fn mean(&self) -> f64 {
        self.family().mean()
    }

    fn variance(&self) -> f64 {
        self.family().variance()
    }

    fn label(&self) -> String {
        self.family().label()
    }

    fn model(&self) -> Result<PmfModel, ComputationError> {
        self.family().model()
    }
}

/// PMF evaluator backed by statrs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PmfModel {
    Poisson(Poisson),
    Binomial(Binomial),
}

impl PmfModel {
    pub fn pmf(&self, x: u64) -> f64 {
        match self {
            Self::Poisson(d) => d.pmf(x),
            Self::Binomial(d) => d.pmf(x),
        }
    }
}

/// Identifier of an added distribution. Unique within a list and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistributionId(u64);

impl DistributionId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DistributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accepted distribution. Immutable once created.
#[derive(Debug, Clone)]
pub struct Distribution {
    id: DistributionId,
    name: String,
    parameters: Parameters,
    model: PmfModel,
    color: SeriesColor,
    created_at: DateTime<Local>,
}

impl Distribution {
    pub fn id(&self) -> DistributionId {
        self.id
    }

    pub fn kind(&self) -> DistributionKind {
        self.parameters.kind()
    }

    /// Display name, e.g. `poisson 1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Colour assigned when the distribution was added. The chart colours datasets by
    /// position instead, so the two differ once an earlier entry is removed.
    pub fn color(&self) -> &SeriesColor {
        &self.color
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn pmf(&self, x: u64) -> f64 {
        self.model.pmf(x)
    }
}

/// Ordered list of added distributions. Append and remove only.
#[derive(Debug, Clone)]
pub struct DistributionList {
    items: Vec<Distribution>,
    next_id: u64,
    palette: Palette,
    max_axis_len: u64,
}

impl Default for DistributionList {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl DistributionList {
    pub fn new(palette: Palette) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            palette,
            max_axis_len: DEFAULT_MAX_AXIS_LEN,
        }
    }

    pub fn with_max_axis_len(mut self, max_axis_len: u64) -> Self {
        self.max_axis_len = max_axis_len;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Validate `raw` for `kind` and append the resulting distribution.
    pub fn add(&mut self, kind: DistributionKind, raw: &RawFields) -> Result<DistributionId, AddError> {
        let parameters = kind.validate(raw)?;
        self.add_parameters(parameters)
    }

    /// Append already-validated parameters.
    pub fn add_parameters(&mut self, parameters: Parameters) -> Result<DistributionId, AddError> {
        let bound = parameters.support_bound();
        if bound > self.max_axis_len {
            return Err(AddError::Computation(ComputationError::AxisTooLarge {
                bound,
                limit: self.max_axis_len,
            }));
        }
        let model = parameters.model().map_err(AddError::Computation)?;

        let id = DistributionId(self.next_id);
        let distribution = Distribution {
            id,
            name: format!("{} {}", parameters.kind(), self.items.len() + 1),
            parameters,
            model,
            color: self.palette.color_for(self.items.len()).clone(),
            created_at: Local::now(),
        };
        self.next_id += 1;
        self.items.push(distribution);
        Ok(id)
    }

    /// Remove the distribution with `id`. Unknown ids leave the list unchanged.
    pub fn remove(&mut self, id: DistributionId) -> Option<Distribution> {
        let pos = self.items.iter().position(|d| d.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: DistributionId) -> Option<&Distribution> {
        self.items.iter().find(|d| d.id == id)
    }

    pub fn as_slice(&self) -> &[Distribution] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Distribution> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Derive the full chart payload from the current list.
    pub fn chart_data(&self) -> ChartPayload {
        prepare_chart_data(&self.items, &self.palette)
    }
}

/// Parse a command-line distribution spec: `poisson:LAMBDA` or `binomial:N,P`.
/// Only splits the text; the values are validated like form input.
pub fn parse_spec(spec: &str) -> Result<(DistributionKind, RawFields)> {
    let (family, values) = spec.split_once(':').ok_or_else(|| {
        eyre!(
            "Invalid distribution '{}'. Expected poisson:LAMBDA or binomial:N,P",
            spec
        )
    })?;
    let kind = DistributionKind::from_name(family).ok_or_else(|| {
        eyre!(
            "Unknown distribution '{}'. Supported: poisson, binomial",
            family
        )
    })?;
    let raw = match kind {
        DistributionKind::Poisson => RawFields::poisson(values),
        DistributionKind::Binomial => {
            let (n, p) = values.split_once(',').unwrap_or((values, ""));
            RawFields::binomial(n, p)
        }
    };
    Ok((kind, raw))
}
