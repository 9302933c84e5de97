//! Latency: one histogram in full detail, picked from a list.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

use super::{panel_block, register_histogram, render_histogram, render_waiting};
use crate::app::App;
use crate::chart::Surfaces;
use crate::data::PanelState;

const LIST_WIDTH: u16 = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_waiting(frame, app, area);
        return;
    };

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Length(LIST_WIDTH), Constraint::Min(20)]).areas(area);

    let items: Vec<ListItem> = data
        .histograms
        .iter()
        .map(|panel| {
            let marker = match panel.state {
                PanelState::Ready(_) => Span::raw("  "),
                PanelState::Missing => Span::styled("- ", app.theme.state_style(&panel.state)),
                PanelState::Failed(_) => Span::styled("! ", app.theme.state_style(&panel.state)),
            };
            ListItem::new(Line::from(vec![marker, Span::raw(panel.title.as_str())]))
        })
        .collect();

    let list = List::new(items)
        .block(panel_block(app, "Histograms", false))
        .highlight_style(app.theme.selected)
        .highlight_symbol("▶");
    let mut state = ListState::default().with_selected(Some(app.selected_histogram));
    frame.render_stateful_widget(list, list_area, &mut state);

    let Some(panel) = app.selected_histogram() else {
        return;
    };
    let block = panel_block(app, &panel.title, true);
    let inner = block.inner(detail_area);
    frame.render_widget(block, detail_area);

    let mut surfaces = Surfaces::new();
    register_histogram(&mut surfaces, &panel.id, inner);
    render_histogram(frame, app, &surfaces, panel, false);

    // metric name under the title, if there is room
    if let Some(def) = app.dashboard.histograms.iter().find(|h| h.id == panel.id) {
        let width = def.metric.len() as u16 + 2;
        if detail_area.width > width + 4 {
            let x = detail_area.x + detail_area.width - width - 2;
            frame.render_widget(
                Span::styled(format!(" {} ", def.metric), Style::default().fg(app.theme.border)),
                Rect::new(x, detail_area.y, width, 1),
            );
        }
    }
}
