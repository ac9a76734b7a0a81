//! Grouped PMF bar chart drawn with ratatui's `Chart`.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{
        Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph,
        Widget, Wrap,
    },
};

use crate::chart_data::ChartPayload;
use crate::render::context::RenderContext;

/// Share of one x unit used by a group of bars
const GROUP_WIDTH: f64 = 0.6;

/// Points per dataset, shifted sideways so bars at the same x sit next to each other.
pub fn grouped_points(payload: &ChartPayload) -> Vec<Vec<(f64, f64)>> {
    let count = payload.datasets.len();
    let step = if count > 1 {
        GROUP_WIDTH / (count - 1) as f64
    } else {
        0.0
    };
    payload
        .series_points()
        .into_iter()
        .enumerate()
        .map(|(i, points)| {
            let offset = if count > 1 {
                i as f64 * step - GROUP_WIDTH / 2.0
            } else {
                0.0
            };
            points.into_iter().map(|(x, y)| (x + offset, y)).collect()
        })
        .collect()
}

fn format_axis_label(v: f64) -> String {
    if v != 0.0 && v.abs() < 1e-2 {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

pub fn render_chart_view(area: Rect, buf: &mut Buffer, payload: &ChartPayload, ctx: &RenderContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ctx.modal_border))
        .title(" Probability Mass Function ");
    let inner = block.inner(area);
    block.render(area, buf);

    if payload.is_empty() {
        Paragraph::new("Add a distribution to see its probability mass function")
            .style(Style::default().fg(ctx.text_secondary))
            .wrap(Wrap { trim: true })
            .centered()
            .render(inner, buf);
        return;
    }

    let points = grouped_points(payload);
    let datasets: Vec<Dataset> = payload
        .datasets
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (dataset, pts))| {
            Dataset::default()
                .name(dataset.label.as_str())
                .marker(symbols::Marker::HalfBlock)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(ctx.series_color(i)))
                .data(pts)
        })
        .collect();

    let x_max = payload.max_x() as f64;
    let y_max = match payload.max_value() {
        v if v > 0.0 => v * 1.1,
        _ => 1.0,
    };

    let label_style = Style::default().fg(ctx.text_primary);
    let x_labels = vec![
        Span::styled("0", label_style),
        Span::styled(format!("{:.0}", (x_max / 2.0).floor()), label_style),
        Span::styled(format!("{:.0}", x_max), label_style),
    ];
    let y_labels = vec![
        Span::styled("0", label_style),
        Span::styled(format_axis_label(y_max / 2.0), label_style),
        Span::styled(format_axis_label(y_max), label_style),
    ];

    let axis_style = Style::default().fg(ctx.chart_axis);
    let x_axis = Axis::default()
        .title(Span::styled("Values", label_style))
        .bounds([-0.5, x_max + 0.5])
        .style(axis_style)
        .labels(x_labels);
    let y_axis = Axis::default()
        .title(Span::styled("Probability Mass", label_style))
        .bounds([0.0, y_max])
        .style(axis_style)
        .labels(y_labels);

    let legend = ctx.show_legend.then_some(LegendPosition::TopRight);
    Chart::new(datasets)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .legend_position(legend)
        .render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{DistributionKind, DistributionList};
    use crate::validation::RawFields;

    #[test]
    fn single_dataset_is_not_shifted() {
        let mut list = DistributionList::default();
        list.add(DistributionKind::Poisson, &RawFields::poisson("1"))
            .unwrap();
        let points = grouped_points(&list.chart_data());
        assert_eq!(points[0][2].0, 2.0);
    }

    #[test]
    fn datasets_are_spread_around_each_x() {
        let mut list = DistributionList::default();
        list.add(DistributionKind::Poisson, &RawFields::poisson("1"))
            .unwrap();
        list.add(DistributionKind::Binomial, &RawFields::binomial("3", "0.5"))
            .unwrap();
        let points = grouped_points(&list.chart_data());
        assert!((points[0][1].0 - 0.7).abs() < 1e-12);
        assert!((points[1][1].0 - 1.3).abs() < 1e-12);
        // y values are untouched
        assert!((points[1][1].1 - 0.375).abs() < 1e-12);
    }

    #[test]
    fn empty_payload_renders_hint() {
        let area = Rect::new(0, 0, 70, 10);
        let mut buf = Buffer::empty(area);
        let config = crate::config::AppConfig::default();
        let theme = crate::config::Theme::from_config(&config.theme).unwrap();
        let ctx = RenderContext::from_theme_and_config(&theme, &config);
        render_chart_view(area, &mut buf, &ChartPayload::default(), &ctx);

        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("Add a distribution"));
    }
}
