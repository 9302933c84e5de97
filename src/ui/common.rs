//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar with a dashboard overview.
///
/// Displays: source, variable count, ready/failed panel counts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" VARDASH ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let line = Line::from(vec![
            title,
            Span::raw(format!("│ {} │ Loading...", app.source_description())),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let total = data.histograms.len() + data.pies.len() + data.stacked.len();
    let failed = data.failed_panels();

    let (status_icon, status_style) = if failed > 0 {
        ("●", Style::default().fg(app.theme.failed))
    } else if app.load_error.is_some() {
        ("●", Style::default().fg(app.theme.warning))
    } else {
        ("●", Style::default().fg(app.theme.highlight))
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}", status_icon), status_style),
        title,
        Span::raw(format!("│ {} │ ", app.source_description())),
        Span::styled(
            format!("{}", data.variable_count),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" vars │ "),
        Span::raw(format!("{}/{}", data.ready_panels(), total)),
        Span::raw(" panels "),
        if failed > 0 {
            Span::styled(
                format!("{} failed", failed),
                Style::default().fg(app.theme.failed).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0 failed", Style::default().add_modifier(Modifier::DIM))
        },
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|view| Line::from(format!("{}:{}", view.index() + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last update, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Overview => "↑↓:select Enter:detail a:axes Tab:switch r:refresh ?:help q:quit",
        View::Latency => "↑↓:select Esc:back Tab:switch r:refresh ?:help q:quit",
        View::Messages | View::Activity => "Tab:switch r:refresh ?:help q:quit",
    };

    let (status, style) = match (&app.data, &app.load_error) {
        (Some(data), Some(err)) => (
            format!(
                " Stale {:.1}s: {} | {}",
                data.last_updated.elapsed().as_secs_f64(),
                err,
                controls
            ),
            Style::default().fg(app.theme.warning),
        ),
        (Some(data), None) => (
            format!(
                " {} | Updated {:.1}s ago | {}",
                app.current_view.label(),
                data.last_updated.elapsed().as_secs_f64(),
                controls,
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (None, Some(err)) => (
            format!(" Error: {} | q:quit r:retry", err),
            Style::default().fg(app.theme.warning),
        ),
        (None, None) => (
            " Loading... | q:quit".to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Select histogram"),
        Line::from("  Home/End    First/last histogram"),
        Line::from("  Enter       Open in Latency view"),
        Line::from("  Esc         Back to Overview"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  a         Toggle overview axes"),
        Line::from("  r         Refresh now"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 20u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dashboard;
    use crate::source::ChannelSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn tabs_match_click_targets() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Dashboard::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal.draw(|frame| render_tabs(frame, &app, frame.area())).unwrap();

        let tabs = row(&terminal, 0);
        assert!(tabs.starts_with(" 1:Overview | 2:Latency |"));
    }

    #[test]
    fn header_shows_source_before_data() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Dashboard::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal.draw(|frame| render_header(frame, &app, frame.area())).unwrap();

        assert!(row(&terminal, 0).contains("channel: test"));
    }
}
