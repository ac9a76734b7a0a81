//! Chart export modal rendering: format radio on the left, path and buttons on the right.

use crate::chart_export_modal::{ChartExportFocus, ChartExportModal};
use crate::render::context::RenderContext;
use crate::widgets::radio_block::RadioBlock;
use crate::ExportFormat;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget};

fn button(label: &str, focused: bool, border_color: Color, active_color: Color) -> Paragraph<'_> {
    let style = Style::default().fg(if focused { active_color } else { border_color });
    Paragraph::new(label).style(style).centered().block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(style),
    )
}

pub fn render_chart_export_modal(
    area: Rect,
    buf: &mut ratatui::buffer::Buffer,
    modal: &ChartExportModal,
    ctx: &RenderContext,
) {
    let border_color = ctx.modal_border;
    let active_color = ctx.modal_border_active;

    Clear.render(area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(ctx.background))
        .title(" Export Chart ");
    let inner = block.inner(area);
    block.render(area, buf);

    let horz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(12), Constraint::Min(30)])
        .split(inner);

    let format_labels: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.as_str()).collect();
    let format_selected = ExportFormat::ALL
        .iter()
        .position(|&f| f == modal.selected_format)
        .unwrap_or(0);
    RadioBlock::new(
        " Format ",
        &format_labels,
        format_selected,
        modal.focus == ChartExportFocus::FormatSelector,
        1,
        border_color,
        active_color,
    )
    .render(horz[0], buf);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // File path
            Constraint::Length(1), // Spacer
            Constraint::Length(3), // Buttons
        ])
        .split(horz[1]);

    let is_path_focused = modal.focus == ChartExportFocus::PathInput;
    let path_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if is_path_focused {
            active_color
        } else {
            border_color
        }))
        .title(" File Path ");
    let path_inner = path_block.inner(right[0]);
    path_block.render(right[0], buf);
    (&modal.path_input).render(path_inner, buf);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(12),
        ])
        .split(right[2]);
    button(
        "Export",
        modal.focus == ChartExportFocus::ExportButton,
        border_color,
        active_color,
    )
    .render(buttons[1], buf);
    button(
        "Cancel",
        modal.focus == ChartExportFocus::CancelButton,
        border_color,
        active_color,
    )
    .render(buttons[2], buf);
}
