use crate::render::context::RenderContext;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};

/// Key hints for the form and chart view
pub const MAIN_CONTROLS: [(&str, &str); 6] = [
    ("Tab", "Next"),
    ("←→", "Type"),
    ("Enter", "Add"),
    ("^E", "Export"),
    ("^H", "Help"),
    ("q", "Quit"),
];

/// Key hints while the distribution list has focus
pub const LIST_CONTROLS: [(&str, &str); 6] = [
    ("Tab", "Next"),
    ("↑↓", "Select"),
    ("d", "Remove"),
    ("c", "Clear All"),
    ("^E", "Export"),
    ("q", "Quit"),
];

/// Bottom bar: key hints on the left, distribution count on the right.
pub struct Controls {
    pub controls: &'static [(&'static str, &'static str)],
    pub count: Option<usize>,
    pub dimmed: bool,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            controls: &MAIN_CONTROLS,
            count: None,
            dimmed: false,
            bg_color: Color::Indexed(236),
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }
}

impl Controls {
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            bg_color: ctx.controls_bg,
            key_color: ctx.primary,
            label_color: ctx.text_primary,
            ..Self::default()
        }
    }

    pub fn with_controls(mut self, controls: &'static [(&'static str, &'static str)]) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let no_bg = self.bg_color == Color::Reset;
        let base = if no_bg {
            Style::default()
        } else {
            Style::default().bg(self.bg_color)
        };
        Block::default().style(base).render(area, buf);

        let (key_style, label_style) = if self.dimmed {
            (base.fg(Color::DarkGray), base.fg(Color::DarkGray))
        } else {
            (
                base.fg(self.key_color).add_modifier(Modifier::BOLD),
                base.fg(self.label_color),
            )
        };

        // Pairs that do not fit are dropped from the right
        const COUNT_WIDTH: u16 = 18;
        let mut available = area.width.saturating_sub(COUNT_WIDTH);
        let shown: Vec<_> = self
            .controls
            .iter()
            .take_while(|(key, action)| {
                let need = key.chars().count() as u16 + action.chars().count() as u16 + 2;
                if available >= need {
                    available -= need;
                    true
                } else {
                    false
                }
            })
            .collect();

        let mut constraints: Vec<Constraint> = shown
            .iter()
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        constraints.push(Constraint::Length(COUNT_WIDTH));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        for (i, (key, action)) in shown.iter().enumerate() {
            Paragraph::new(*key)
                .style(key_style)
                .render(layout[i * 2], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[i * 2 + 1], buf);
        }

        if let Some(count) = self.count {
            Paragraph::new(format!("Distributions: {} ", count))
                .style(label_style)
                .right_aligned()
                .render(layout[layout.len() - 1], buf);
        }
    }
}
