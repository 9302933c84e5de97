//! Activity: stacked per-minute bars.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use super::{panel_block, render_chart, render_placeholder, render_waiting};
use crate::app::App;
use crate::chart::{build_stacked, Surfaces};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_waiting(frame, app, area);
        return;
    };
    if data.stacked.is_empty() {
        return;
    }

    let count = data.stacked.len() as u32;
    let cells =
        Layout::vertical(vec![Constraint::Ratio(1, count); data.stacked.len()]).split(area);

    let mut surfaces = Surfaces::new();
    for (panel, cell) in data.stacked.iter().zip(cells.iter()) {
        let block = panel_block(app, &panel.title, false);
        let inner = block.inner(*cell);
        frame.render_widget(block, *cell);

        match panel.state.ready() {
            Some(series) => {
                surfaces.insert(panel.id.as_str(), inner);
                render_chart(frame, build_stacked(&surfaces, &panel.id, series));
            }
            None => render_placeholder(frame, app, &panel.state, inner),
        }
    }
}
