//! Parameter input form: distribution type selector, one text input per field, add button.
//!
//! Field values are shared between the two families, so switching type keeps what was typed.

use crate::cache::CacheManager;
use crate::config::{InputsConfig, Theme};
use crate::distribution::DistributionKind;
use crate::validation::{Field, RawFields};
use crate::widgets::text_input::TextInput;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Kind,
    Field(Field),
    AddButton,
    List,
}

/// Mean/variance echo of the current input. Not validated; purely informational.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Poisson: both moments equal lambda
    LambdaNote,
    /// Binomial with both fields filled. `None` when a value does not parse.
    Binomial {
        mean: Option<f64>,
        variance: Option<f64>,
    },
    Hidden,
}

impl Preview {
    pub const LAMBDA_NOTE: &'static str = "Mean and variance are both equal to lambda";
}

pub struct DistributionForm {
    pub kind: DistributionKind,
    pub focus: FormFocus,
    lambda_input: TextInput,
    trials_input: TextInput,
    probability_input: TextInput,
}

impl DistributionForm {
    pub fn new(kind: DistributionKind, theme: &Theme, inputs: &InputsConfig) -> Self {
        let make = |field: Field| {
            let input = TextInput::new()
                .with_theme(theme)
                .with_placeholder(field.placeholder())
                .with_history_limit(inputs.history_limit);
            if inputs.enable_history {
                input.with_history(field.history_id())
            } else {
                input
            }
        };

        let mut form = Self {
            kind,
            focus: FormFocus::Kind,
            lambda_input: make(Field::Lambda),
            trials_input: make(Field::Trials),
            probability_input: make(Field::Probability),
        };
        form.set_focus(FormFocus::Field(kind.fields()[0]));
        form
    }

    pub fn input(&self, field: Field) -> &TextInput {
        match field {
            Field::Lambda => &self.lambda_input,
            Field::Trials => &self.trials_input,
            Field::Probability => &self.probability_input,
        }
    }

    pub fn input_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Lambda => &mut self.lambda_input,
            Field::Trials => &mut self.trials_input,
            Field::Probability => &mut self.probability_input,
        }
    }

    /// Text input owning focus, if any
    pub fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            FormFocus::Field(field) => Some(self.input_mut(field)),
            _ => None,
        }
    }

    /// Focus stops in display order. `List` is only reachable when something was added.
    fn focus_order(&self, has_items: bool) -> Vec<FormFocus> {
        let mut order = vec![FormFocus::Kind];
        order.extend(self.kind.fields().iter().map(|&f| FormFocus::Field(f)));
        order.push(FormFocus::AddButton);
        if has_items {
            order.push(FormFocus::List);
        }
        order
    }

    fn step_focus(&mut self, has_items: bool, forward: bool) {
        let order = self.focus_order(has_items);
        let len = order.len();
        let next = match order.iter().position(|&f| f == self.focus) {
            Some(i) if forward => order[(i + 1) % len],
            Some(i) => order[(i + len - 1) % len],
            None => order[0],
        };
        self.set_focus(next);
    }

    pub fn next_focus(&mut self, has_items: bool) {
        self.step_focus(has_items, true);
    }

    pub fn prev_focus(&mut self, has_items: bool) {
        self.step_focus(has_items, false);
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        self.focus = focus;
        for field in [Field::Lambda, Field::Trials, Field::Probability] {
            self.input_mut(field)
                .set_focused(focus == FormFocus::Field(field));
        }
    }

    pub fn focus_field(&mut self, field: Field) {
        self.set_focus(FormFocus::Field(field));
    }

    /// Switch family. Typed values are kept; focus stays on the selector.
    pub fn set_kind(&mut self, kind: DistributionKind) {
        self.kind = kind;
        if let FormFocus::Field(field) = self.focus {
            if !kind.fields().contains(&field) {
                self.set_focus(FormFocus::Kind);
            }
        }
    }

    pub fn toggle_kind(&mut self) {
        self.set_kind(self.kind.toggle());
    }

    pub fn raw_fields(&self) -> RawFields {
        RawFields {
            lambda: self.lambda_input.value().to_string(),
            n: self.trials_input.value().to_string(),
            p: self.probability_input.value().to_string(),
        }
    }

    pub fn set_raw_fields(&mut self, raw: &RawFields) {
        for field in [Field::Lambda, Field::Trials, Field::Probability] {
            self.input_mut(field).set_value(raw.get(field).to_string());
        }
    }

    /// Blank every field, whichever family is selected
    pub fn clear_inputs(&mut self) {
        self.lambda_input.clear();
        self.trials_input.clear();
        self.probability_input.clear();
    }

    /// Persist the active family's values to their history files
    pub fn save_history(&mut self, cache: &CacheManager) {
        for &field in self.kind.fields() {
            if let Err(e) = self.input_mut(field).save_to_history(cache) {
                tracing::warn!(field = field.history_id(), "could not save input history: {}", e);
            }
        }
    }

    pub fn preview(&self) -> Preview {
        match self.kind {
            DistributionKind::Poisson => Preview::LambdaNote,
            DistributionKind::Binomial => {
                let (n, p) = (self.trials_input.value(), self.probability_input.value());
                if n.is_empty() || p.is_empty() {
                    return Preview::Hidden;
                }
                let parse = |s: &str| s.trim().parse::<f64>().ok().filter(|v| v.is_finite());
                match (parse(n), parse(p)) {
                    (Some(n), Some(p)) => Preview::Binomial {
                        mean: Some(n * p),
                        variance: Some(n * p * (1.0 - p)),
                    },
                    _ => Preview::Binomial {
                        mean: None,
                        variance: None,
                    },
                }
            }
        }
    }
}
