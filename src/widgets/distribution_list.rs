//! "Added Distributions" panel: one entry per distribution, name in its stored colour.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget,
    },
};

use crate::config::ColorParser;
use crate::distribution::{format_number, Distribution, Parameters, PmfFamily};
use crate::render::context::RenderContext;

/// Selection within the list panel
#[derive(Debug, Default)]
pub struct DistributionListState {
    pub list_state: ListState,
}

impl DistributionListState {
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Keep the selection on an existing entry after the list changed
    pub fn clamp(&mut self, len: usize) {
        match (self.list_state.selected(), len) {
            (_, 0) => self.list_state.select(None),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            (None, _) => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let prev = self.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }
}

/// Detail lines under the name of a distribution
pub fn detail_lines(parameters: &Parameters) -> Vec<String> {
    match parameters {
        Parameters::Poisson(p) => vec![
            format!("Lambda (λ): {}", format_number(p.lambda)),
            format!("Mean: {}", format_number(p.mean())),
            format!("Variance: {}", format_number(p.variance())),
        ],
        Parameters::Binomial(b) => vec![
            format!("Trials (n): {}", b.n),
            format!("Probability (p): {}", format_number(b.p)),
            format!("Mean (np): {:.4}", b.mean()),
            format!("Variance (np(1-p)): {:.4}", b.variance()),
        ],
    }
}

fn stored_color(distribution: &Distribution, parser: &ColorParser, fallback: Color) -> Color {
    parser
        .parse(&distribution.color().border)
        .unwrap_or(fallback)
}

pub fn render_distribution_list(
    area: Rect,
    buf: &mut Buffer,
    distributions: &[Distribution],
    state: &mut DistributionListState,
    focused: bool,
    ctx: &RenderContext,
) {
    let title = if distributions.is_empty() {
        " Added Distributions ".to_string()
    } else {
        format!(" Added Distributions ({}) ", distributions.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused {
            ctx.modal_border_active
        } else {
            ctx.modal_border
        }))
        .title(title);

    if distributions.is_empty() {
        Paragraph::new("Nothing added yet")
            .style(Style::default().fg(ctx.text_secondary))
            .block(block)
            .render(area, buf);
        return;
    }

    let items: Vec<ListItem> = distributions
        .iter()
        .map(|dist| {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    dist.name().to_string(),
                    Style::default()
                        .fg(stored_color(dist, &ctx.color_parser, ctx.primary))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", dist.created_at().format("%H:%M:%S")),
                    Style::default().fg(ctx.dimmed),
                ),
            ])];
            lines.extend(detail_lines(dist.parameters()).into_iter().map(|l| {
                Line::from(Span::styled(
                    format!("  {}", l),
                    Style::default().fg(ctx.text_secondary),
                ))
            }));
            ListItem::new(lines)
        })
        .collect();

    let highlight = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("> ");
    StatefulWidget::render(list, area, buf, &mut state.list_state);
}
