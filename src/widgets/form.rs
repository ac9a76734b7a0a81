//! Parameter form rendering: type selector, field inputs, preview and add button.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::distribution::DistributionKind;
use crate::distribution_form::{DistributionForm, FormFocus, Preview};
use crate::render::context::RenderContext;
use crate::widgets::radio_block::RadioBlock;

const PREVIEW_ROWS: u16 = 2;

/// Rows the form needs for `kind`, borders included
pub fn form_height(kind: DistributionKind, show_preview: bool) -> u16 {
    let fields = kind.fields().len() as u16;
    let preview = if show_preview { PREVIEW_ROWS } else { 0 };
    2 + 3 + fields * 3 + preview + 3
}

/// Preview text lines; empty when there is nothing to show
pub fn preview_lines(preview: &Preview) -> Vec<String> {
    let fixed = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |v| format!("{:.4}", v));
    match preview {
        Preview::LambdaNote => vec![Preview::LAMBDA_NOTE.to_string()],
        Preview::Binomial { mean, variance } => vec![
            format!("Mean (np): {}", fixed(*mean)),
            format!("Variance (np(1-p)): {}", fixed(*variance)),
        ],
        Preview::Hidden => Vec::new(),
    }
}

pub fn render_form(area: Rect, buf: &mut Buffer, form: &DistributionForm, ctx: &RenderContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ctx.modal_border))
        .title(" Input Distribution Parameters ");
    let inner = block.inner(area);
    block.render(area, buf);

    let fields = form.kind.fields();
    let mut constraints = vec![Constraint::Length(3)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    if ctx.show_preview {
        constraints.push(Constraint::Length(PREVIEW_ROWS));
    }
    constraints.push(Constraint::Length(3));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let kinds: Vec<&str> = DistributionKind::ALL
        .iter()
        .map(|k| k.display_name())
        .collect();
    let selected = DistributionKind::ALL
        .iter()
        .position(|&k| k == form.kind)
        .unwrap_or(0);
    RadioBlock::new(
        " Distribution Type ",
        &kinds,
        selected,
        form.focus == FormFocus::Kind,
        2,
        ctx.modal_border,
        ctx.modal_border_active,
    )
    .render(rows[0], buf);

    for (i, &field) in fields.iter().enumerate() {
        let focused = form.focus == FormFocus::Field(field);
        let field_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if focused {
                ctx.modal_border_active
            } else {
                ctx.modal_border
            }))
            .title(format!(" {} ", field.label()));
        let field_inner = field_block.inner(rows[1 + i]);
        field_block.render(rows[1 + i], buf);
        form.input(field).render(field_inner, buf);
    }

    let mut next = 1 + fields.len();
    if ctx.show_preview {
        let lines: Vec<Line> = preview_lines(&form.preview())
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(ctx.primary))))
            .collect();
        Paragraph::new(lines).render(rows[next], buf);
        next += 1;
    }

    let button_focused = form.focus == FormFocus::AddButton;
    let button_style = if button_focused {
        Style::default()
            .fg(ctx.modal_border_active)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().fg(ctx.primary)
    };
    Paragraph::new("Add Distribution")
        .style(button_style)
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if button_focused {
                    ctx.modal_border_active
                } else {
                    ctx.modal_border
                })),
        )
        .render(rows[next], buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_grows_with_fields() {
        assert_eq!(form_height(DistributionKind::Poisson, true), 13);
        assert_eq!(form_height(DistributionKind::Binomial, true), 16);
        assert_eq!(form_height(DistributionKind::Binomial, false), 14);
    }

    #[test]
    fn preview_formats_four_decimals() {
        let lines = preview_lines(&Preview::Binomial {
            mean: Some(3.0),
            variance: Some(2.1),
        });
        assert_eq!(lines, vec!["Mean (np): 3.0000", "Variance (np(1-p)): 2.1000"]);
        assert_eq!(
            preview_lines(&Preview::Binomial {
                mean: None,
                variance: None
            })[0],
            "Mean (np): NaN"
        );
        assert!(preview_lines(&Preview::Hidden).is_empty());
    }
}
