//! Terminal rendering.
//!
//! Each view lays out its panels, registers the resulting areas as
//! [`Surfaces`], and hands them to the chart builders.

pub mod activity;
pub mod common;
pub mod latency;
pub mod messages;
pub mod overview;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::warn;

use crate::app::App;
use crate::chart::{build_histogram, display_summary, summary_slot_ids, RenderedChart, Surfaces};
use crate::data::{HistogramSeries, PanelData, PanelState};
use crate::error::DashError;

/// Bordered block for one panel.
pub(crate) fn panel_block<'a>(app: &App, title: &'a str, selected: bool) -> Block<'a> {
    let border_style = if selected {
        app.theme.selected
    } else {
        Style::default().fg(app.theme.border)
    };
    Block::default()
        .title(Span::styled(format!(" {} ", title), app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style)
}

/// Text shown in place of a chart that has nothing to draw.
pub(crate) fn render_placeholder<T>(frame: &mut Frame, app: &App, state: &PanelState<T>, area: Rect) {
    let text = match state {
        PanelState::Ready(_) => return,
        PanelState::Missing => "no data".to_string(),
        PanelState::Failed(err) => err.to_string(),
    };
    let paragraph = Paragraph::new(text)
        .style(app.theme.state_style(state))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Draw a built chart, or log why it could not be built.
pub(crate) fn render_chart(frame: &mut Frame, result: Result<RenderedChart, DashError>) {
    match result {
        Ok(chart) => chart.render(frame),
        Err(err) => warn!(error = %err, "chart skipped"),
    }
}

/// Register a histogram's chart area and its summary slots inside `inner`.
///
/// The bottom row is split into the `-min`, `-avg` and `-max` slots.
pub(crate) fn register_histogram(surfaces: &mut Surfaces, id: &str, inner: Rect) {
    let [chart, slots] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    surfaces.insert(id, chart);

    let slot_areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(slots);
    for (slot_id, area) in summary_slot_ids(id).into_iter().zip(slot_areas.iter()) {
        surfaces.insert(slot_id, *area);
    }
}

/// Draw one histogram panel into its registered surfaces.
pub(crate) fn render_histogram(
    frame: &mut Frame,
    app: &App,
    surfaces: &Surfaces,
    panel: &PanelData<HistogramSeries>,
    noaxis: bool,
) {
    let Some(series) = panel.state.ready() else {
        if let Ok(area) = surfaces.area(&panel.id) {
            render_placeholder(frame, app, &panel.state, area);
        }
        return;
    };

    render_chart(frame, build_histogram(surfaces, &panel.id, series, noaxis));
    match display_summary(surfaces, &panel.id, &series.summary) {
        Ok(slots) => slots.iter().for_each(|slot| slot.render(frame)),
        Err(err) => warn!(error = %err, "summary skipped"),
    }
}

/// Message for views drawn before the first snapshot.
pub(crate) fn render_waiting(frame: &mut Frame, app: &App, area: Rect) {
    let text = match app.load_error {
        Some(ref err) => format!("Waiting for {}\n\n{}", app.source_description(), err),
        None => format!("Waiting for {}", app.source_description()),
    };
    let style = match app.load_error {
        Some(_) => Style::default().fg(app.theme.warning),
        None => Style::default().fg(app.theme.missing),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_surfaces_include_slots() {
        let mut surfaces = Surfaces::new();
        register_histogram(&mut surfaces, "decoder", Rect::new(1, 1, 30, 6));

        assert_eq!(surfaces.area("decoder").unwrap(), Rect::new(1, 1, 30, 5));
        assert_eq!(surfaces.area("decoder-min").unwrap(), Rect::new(1, 6, 10, 1));
        assert_eq!(surfaces.area("decoder-avg").unwrap().x, 11);
        assert!(surfaces.contains("decoder-max"));
        assert_eq!(surfaces.len(), 4);
    }
}
