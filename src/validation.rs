//! Parameter validation: raw text fields in, normalized parameters or the first violated rule out.
//!
//! Rules run in a fixed order per field, and for Binomial every `n` rule runs before any `p` rule.

use thiserror::Error;

use crate::distribution::{BinomialParams, PoissonParams};

/// A single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Lambda,
    Trials,
    Probability,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lambda => "Lambda (λ) - Mean Rate",
            Self::Trials => "Number of Trials (n)",
            Self::Probability => "Probability of Success (p)",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Lambda => "Enter lambda value",
            Self::Trials => "Enter number of trials",
            Self::Probability => "Enter probability (0-1)",
        }
    }

    /// Id used for the per-field input history file.
    pub fn history_id(self) -> &'static str {
        match self {
            Self::Lambda => "lambda",
            Self::Trials => "n",
            Self::Probability => "p",
        }
    }
}

/// Raw, string-typed input for every field. Only the fields of the active family are read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub lambda: String,
    pub n: String,
    pub p: String,
}

impl RawFields {
    pub fn poisson(lambda: impl Into<String>) -> Self {
        Self {
            lambda: lambda.into(),
            ..Self::default()
        }
    }

    pub fn binomial(n: impl Into<String>, p: impl Into<String>) -> Self {
        Self {
            n: n.into(),
            p: p.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Lambda => &self.lambda,
            Field::Trials => &self.n,
            Field::Probability => &self.p,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Lambda => self.lambda = value,
            Field::Trials => self.n = value,
            Field::Probability => self.p = value,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.lambda.is_empty() && self.n.is_empty() && self.p.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter lambda for Poisson distribution")]
    LambdaMissing,
    #[error("Lambda must be a valid number")]
    LambdaNotNumber,
    #[error("Lambda must be positive")]
    LambdaNotPositive,
    #[error("Please enter number of trials (n)")]
    TrialsMissing,
    #[error("Number of trials must be a valid number")]
    TrialsNotNumber,
    #[error("Number of trials must be positive")]
    TrialsNotPositive,
    #[error("Number of trials must be an integer")]
    TrialsNotInteger,
    #[error("Probability is required")]
    ProbabilityMissing,
    #[error("Probability must be a number")]
    ProbabilityNotNumber,
    #[error("Probability must be between 0 and 1")]
    ProbabilityOutOfRange,
}

impl ValidationError {
    /// The field whose rule failed, so the form can move focus back to it.
    pub fn field(self) -> Field {
        match self {
            Self::LambdaMissing | Self::LambdaNotNumber | Self::LambdaNotPositive => Field::Lambda,
            Self::TrialsMissing
            | Self::TrialsNotNumber
            | Self::TrialsNotPositive
            | Self::TrialsNotInteger => Field::Trials,
            Self::ProbabilityMissing
            | Self::ProbabilityNotNumber
            | Self::ProbabilityOutOfRange => Field::Probability,
        }
    }
}

/// Non-empty and a finite number. Whitespace-only input is not empty, it fails the number rule.
fn parse_number(
    raw: &str,
    missing: ValidationError,
    not_number: ValidationError,
) -> Result<f64, ValidationError> {
    if raw.is_empty() {
        return Err(missing);
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(not_number),
    }
}

fn ensure(condition: bool, error: ValidationError) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(error)
    }
}

pub fn validate_poisson(raw: &RawFields) -> Result<PoissonParams, ValidationError> {
    use ValidationError::*;

    let lambda = parse_number(&raw.lambda, LambdaMissing, LambdaNotNumber)?;
    ensure(lambda > 0.0, LambdaNotPositive)?;

    Ok(PoissonParams { lambda })
}

pub fn validate_binomial(raw: &RawFields) -> Result<BinomialParams, ValidationError> {
    use ValidationError::*;

    let n = parse_number(&raw.n, TrialsMissing, TrialsNotNumber)?;
    ensure(n > 0.0, TrialsNotPositive)?;
    ensure(n.fract() == 0.0, TrialsNotInteger)?;

    let p = parse_number(&raw.p, ProbabilityMissing, ProbabilityNotNumber)?;
    ensure((0.0..=1.0).contains(&p), ProbabilityOutOfRange)?;

    Ok(BinomialParams { n: n as u64, p })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisson_accepts_positive_lambda() {
        let params = validate_poisson(&RawFields::poisson("2.5")).unwrap();
        assert_eq!(params.lambda, 2.5);

        let params = validate_poisson(&RawFields::poisson("  1e-3 ")).unwrap();
        assert_eq!(params.lambda, 0.001);
    }

    #[test]
    fn poisson_rule_order() {
        assert_eq!(
            validate_poisson(&RawFields::poisson("")),
            Err(ValidationError::LambdaMissing)
        );
        assert_eq!(
            validate_poisson(&RawFields::poisson("   ")),
            Err(ValidationError::LambdaNotNumber)
        );
        assert_eq!(
            validate_poisson(&RawFields::poisson("abc")),
            Err(ValidationError::LambdaNotNumber)
        );
        assert_eq!(
            validate_poisson(&RawFields::poisson("inf")),
            Err(ValidationError::LambdaNotNumber)
        );
        assert_eq!(
            validate_poisson(&RawFields::poisson("0")),
            Err(ValidationError::LambdaNotPositive)
        );
        assert_eq!(
            validate_poisson(&RawFields::poisson("-4")),
            Err(ValidationError::LambdaNotPositive)
        );
    }

    #[test]
    fn binomial_accepts_valid_input() {
        let params = validate_binomial(&RawFields::binomial("10", "0.25")).unwrap();
        assert_eq!(params.n, 10);
        assert_eq!(params.p, 0.25);

        // Both ends of the probability interval are allowed
        assert!(validate_binomial(&RawFields::binomial("3", "0")).is_ok());
        assert!(validate_binomial(&RawFields::binomial("3", "1")).is_ok());
        // "5.0" is an integer value
        assert_eq!(
            validate_binomial(&RawFields::binomial("5.0", "0.5"))
                .unwrap()
                .n,
            5
        );
    }

    #[test]
    fn whitespace_only_fails_number_rule() {
        assert_eq!(
            validate_binomial(&RawFields::binomial(" ", "0.5")),
            Err(ValidationError::TrialsNotNumber)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("4", "\t")),
            Err(ValidationError::ProbabilityNotNumber)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("", "  ")),
            Err(ValidationError::TrialsMissing)
        );
    }

    #[test]
    fn binomial_positivity_checked_before_integer() {
        assert_eq!(
            validate_binomial(&RawFields::binomial("0", "0.5")),
            Err(ValidationError::TrialsNotPositive)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("-1.5", "0.5")),
            Err(ValidationError::TrialsNotPositive)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("2.5", "0.5")),
            Err(ValidationError::TrialsNotInteger)
        );
    }

    #[test]
    fn binomial_n_rules_before_p_rules() {
        assert_eq!(
            validate_binomial(&RawFields::binomial("", "")),
            Err(ValidationError::TrialsMissing)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("x", "7")),
            Err(ValidationError::TrialsNotNumber)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("4", "")),
            Err(ValidationError::ProbabilityMissing)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("4", "half")),
            Err(ValidationError::ProbabilityNotNumber)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("4", "1.01")),
            Err(ValidationError::ProbabilityOutOfRange)
        );
        assert_eq!(
            validate_binomial(&RawFields::binomial("4", "-0.1")),
            Err(ValidationError::ProbabilityOutOfRange)
        );
    }

    #[test]
    fn messages_match_rules() {
        assert_eq!(
            ValidationError::TrialsNotPositive.to_string(),
            "Number of trials must be positive"
        );
        assert_eq!(
            ValidationError::ProbabilityOutOfRange.to_string(),
            "Probability must be between 0 and 1"
        );
        assert_eq!(
            ValidationError::LambdaMissing.to_string(),
            "Please enter lambda for Poisson distribution"
        );
    }

    #[test]
    fn error_points_at_field() {
        assert_eq!(ValidationError::LambdaNotPositive.field(), Field::Lambda);
        assert_eq!(ValidationError::TrialsNotInteger.field(), Field::Trials);
        assert_eq!(
            ValidationError::ProbabilityMissing.field(),
            Field::Probability
        );
    }

    #[test]
    fn raw_fields_get_set() {
        let mut raw = RawFields::default();
        assert!(raw.is_blank());
        raw.set(Field::Trials, "4".to_string());
        assert_eq!(raw.get(Field::Trials), "4");
        assert!(!raw.is_blank());
    }
}
