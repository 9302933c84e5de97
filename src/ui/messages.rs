//! Messages: pie charts of message totals.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{panel_block, render_chart, render_placeholder, render_waiting};
use crate::app::App;
use crate::chart::{build_pie, palette_color, Surfaces};
use crate::data::CategoricalSeries;

/// Rows of `label value pct` next to a pie.
fn value_lines(series: &CategoricalSeries) -> Vec<Line<'static>> {
    let total = series.total();
    series
        .labels
        .iter()
        .zip(&series.values)
        .zip(&series.colors)
        .map(|((label, value), color)| {
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(palette_color(*color))),
                Span::raw(format!("{:<18}{:>10} {:>5.1}%", label, value, share)),
            ])
        })
        .collect()
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_waiting(frame, app, area);
        return;
    };
    if data.pies.is_empty() {
        return;
    }

    let count = data.pies.len() as u32;
    let cells = Layout::vertical(vec![Constraint::Ratio(1, count); data.pies.len()]).split(area);

    let mut surfaces = Surfaces::new();
    for (panel, cell) in data.pies.iter().zip(cells.iter()) {
        let block = panel_block(app, &panel.title, false);
        let inner = block.inner(*cell);
        frame.render_widget(block, *cell);

        let Some(series) = panel.state.ready() else {
            render_placeholder(frame, app, &panel.state, inner);
            continue;
        };

        let [pie_area, values_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(inner);
        surfaces.insert(panel.id.as_str(), pie_area);
        render_chart(frame, build_pie(&surfaces, &panel.id, series));
        frame.render_widget(Paragraph::new(value_lines(series)), values_area);
    }
}
