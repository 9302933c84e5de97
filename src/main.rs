use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vardash::{
    events, load_settings, ui, App, DashboardData, DataSource, Fetcher, FileSource, HttpSource,
    Overrides, Settings, View,
};

#[derive(Parser, Debug)]
#[command(name = "vardash")]
#[command(about = "Terminal dashboard for expvar-style /debug/vars metrics endpoints")]
struct Args {
    /// Base URL of the metrics endpoint (default http://localhost:8081)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read snapshots from a saved JSON file instead of polling
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Request timeout (e.g., "5s")
    #[arg(short, long)]
    timeout: Option<String>,

    /// Where to write the log; the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch one snapshot, print the normalized panels as JSON and exit
    #[arg(long)]
    once: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        url: args.url.clone(),
        refresh: args.refresh.clone(),
        timeout: args.timeout.clone(),
        log_file: args.log_file.clone(),
    };
    let settings = load_settings(args.config.as_deref(), overrides)?;

    init_logging(&settings.log_file)?;

    if args.once {
        return print_once(&settings, args.file.as_deref());
    }

    if let Some(ref path) = args.file {
        return run_with_file(path, &settings);
    }

    run_with_http(&settings)
}

/// Send `tracing` output to the log file, filtered by `RUST_LOG`.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vardash=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn build_fetcher(settings: &Settings) -> Result<Fetcher> {
    let fetcher = Fetcher::builder()
        .base_url(&settings.url)
        .path(&settings.path)
        .timeout(settings.timeout)
        .build()?;
    Ok(fetcher)
}

/// Fetch or read one snapshot and print its panels as JSON.
fn print_once(settings: &Settings, file: Option<&Path>) -> Result<()> {
    let snapshot = match file {
        Some(path) => {
            let mut source = FileSource::new(path);
            match source.poll() {
                Some(snapshot) => snapshot,
                None => anyhow::bail!(
                    "{}",
                    source.error().unwrap_or_else(|| "no snapshot".to_string())
                ),
            }
        }
        None => {
            let fetcher = build_fetcher(settings)?;
            let rt = Runtime::new()?;
            rt.block_on(fetcher.fetch())
                .with_context(|| format!("failed to fetch {}", fetcher.url()))?
        }
    };

    let data = DashboardData::from_snapshot(&snapshot, &settings.dashboard);
    println!("{}", serde_json::to_string_pretty(&data.to_json())?);
    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, settings: &Settings) -> Result<()> {
    info!(path = %path.display(), "reading snapshots from file");
    let source = Box::new(FileSource::new(path));
    run_tui(source, settings)
}

/// Run against an HTTP endpoint, fetching on a background runtime
fn run_with_http(settings: &Settings) -> Result<()> {
    let fetcher = build_fetcher(settings)?;
    info!(
        url = %fetcher.url(),
        refresh = ?settings.refresh,
        timeout = ?settings.timeout,
        "polling metrics endpoint"
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let source = Box::new(HttpSource::new(fetcher, rt.handle().clone()));

    let result = run_tui(source, settings);

    // Don't wait on a request stuck until its timeout
    rt.shutdown_background();

    result
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, settings: &Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Create app and kick off the first fetch
    let mut app = App::new(source, settings.dashboard.clone());
    app.refresh();

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, settings.refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    while app.running {
        // Pick up anything the source delivered since the last frame
        if let Err(err) = app.reload_data() {
            warn!(error = %err, "reload failed");
        }

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = Paragraph::new(msg)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow));
                let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                    .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let [header, tabs, content, status] = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .areas(area);

            ui::common::render_header(frame, app, header);
            ui::common::render_tabs(frame, app, tabs);

            match app.current_view {
                View::Overview => ui::overview::render(frame, app, content),
                View::Latency => ui::latency::render(frame, app, content),
                View::Messages => ui::messages::render(frame, app, content),
                View::Activity => ui::activity::render(frame, app, content),
            }

            ui::common::render_status_bar(frame, app, status);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Ask for fresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.refresh();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
