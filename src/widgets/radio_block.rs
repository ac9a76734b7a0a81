//! Bordered block with a grid of radio options (● selected, ○ unselected).
//! Used for the distribution type and the export format.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

pub struct RadioBlock<'a> {
    pub title: &'a str,
    pub options: &'a [&'a str],
    pub selected: usize,
    pub focused: bool,
    pub columns: usize,
    pub border_color: Color,
    pub active_color: Color,
}

impl<'a> RadioBlock<'a> {
    pub fn new(
        title: &'a str,
        options: &'a [&'a str],
        selected: usize,
        focused: bool,
        columns: usize,
        border_color: Color,
        active_color: Color,
    ) -> Self {
        Self {
            title,
            options,
            selected,
            focused,
            columns: columns.max(1),
            border_color,
            active_color,
        }
    }

    /// Style of the option at `idx`: selected is highlighted, and reversed while focused
    fn option_style(&self, idx: usize) -> Style {
        let is_selected = idx == self.selected;
        let style = Style::default().fg(if is_selected {
            self.active_color
        } else {
            self.border_color
        });
        if self.focused && is_selected {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        }
    }

    fn render_inner(&self, area: Rect, buf: &mut Buffer) {
        if self.options.is_empty() {
            return;
        }
        let cols = self.columns.min(self.options.len());
        let rows = self.options.len().div_ceil(cols);

        let row_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(1); rows])
            .split(area);
        let col_constraints = vec![Constraint::Ratio(1, cols as u32); cols];

        for (idx, label) in self.options.iter().enumerate() {
            let Some(&row_rect) = row_chunks.get(idx / cols) else {
                break;
            };
            let cell = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(col_constraints.as_slice())
                .split(row_rect)[idx % cols];

            let marker = if idx == self.selected { "●" } else { "○" };
            Paragraph::new(Line::from(Span::styled(
                format!("{} {}", marker, label),
                self.option_style(idx),
            )))
            .render(cell, buf);
        }
    }
}

impl Widget for RadioBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title)
            .border_style(Style::default().fg(if self.focused {
                self.active_color
            } else {
                self.border_color
            }));
        let inner = block.inner(area);
        block.render(area, buf);
        self.render_inner(inner, buf);
    }
}
