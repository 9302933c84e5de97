//! Overview: every latency histogram in a compact grid.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use super::{panel_block, register_histogram, render_histogram, render_waiting};
use crate::app::App;
use crate::chart::Surfaces;

/// Narrowest a grid cell may get.
const MIN_CELL_WIDTH: u16 = 36;
/// Border, chart rows and the summary row.
const CELL_HEIGHT: u16 = 8;

/// Grid shape for `count` panels in `area`: (columns, visible rows).
fn grid(area: Rect, count: usize) -> (usize, usize) {
    let columns = ((area.width / MIN_CELL_WIDTH).max(1) as usize).min(count.max(1));
    let rows = ((area.height / CELL_HEIGHT).max(1)) as usize;
    (columns, rows)
}

/// First grid row to draw so the selected panel stays visible.
fn first_row(selected: usize, columns: usize, visible_rows: usize) -> usize {
    let row = selected / columns;
    row.saturating_sub(visible_rows.saturating_sub(1))
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        render_waiting(frame, app, area);
        return;
    };

    let (columns, visible_rows) = grid(area, data.histograms.len());
    let skip = first_row(app.selected_histogram, columns, visible_rows) * columns;

    let rows = Layout::vertical(vec![Constraint::Length(CELL_HEIGHT); visible_rows]).split(area);
    let mut surfaces = Surfaces::new();
    let mut cells = Vec::new();

    let panels = data.histograms.iter().enumerate().skip(skip);
    let slots = rows.iter().flat_map(|row| {
        Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row)
            .to_vec()
    });
    for ((index, panel), cell) in panels.zip(slots) {
        let block = panel_block(app, &panel.title, index == app.selected_histogram);
        let inner = block.inner(cell);
        frame.render_widget(block, cell);
        register_histogram(&mut surfaces, &panel.id, inner);
        cells.push(panel);
    }

    for panel in cells {
        render_histogram(frame, app, &surfaces, panel, !app.overview_axes);
    }
}
