use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};

use crate::app::App;
use crate::config::Variant;
use crate::constants::{APP_DESCRIPTION, APP_TITLE, LINKS};
use crate::error::Result;
use crate::reading::TemperatureUnit;
use crate::sampler::{SamplerState, Snapshot};
use crate::trend::TrendLine;
use crate::util::{column_title, format_temperature, padded_bounds};

// Upper bound on input polling so a SIGINT is noticed quickly
const MAX_POLL: Duration = Duration::from_millis(250);
const WAITING: &str = "Waiting for first reading…";

// Restores the terminal however `run` exits, including setup failures
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal(&mut io::stdout(), disable_raw_mode) {
            warn!(%err, "terminal restore incomplete");
        }
    }
}

/// Every step runs even if an earlier one fails; the first error is returned.
fn restore_terminal<W: Write>(
    out: &mut W,
    disable_raw: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let raw = disable_raw();
    let screen = execute!(out, LeaveAlternateScreen, Show);
    raw.and(screen)
}

pub fn run(mut app: App, running: Arc<AtomicBool>) -> Result<()> {
    // Initialize terminal
    enable_raw_mode()?;
    let _guard = TerminalGuard;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app_loop(&mut terminal, &mut app, &running)
}

fn run_app_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    running: &AtomicBool,
) -> Result<()> {
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if app.tick_due(now) {
            app.on_tick(now);
        }

        terminal.draw(|f| draw(f, app))?;

        // Handle input
        let timeout = app.time_until_tick(Instant::now()).min(MAX_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('f') | KeyCode::Char('F') => app.toggle_unit(),
                    _ => {}
                }
            }
        }
    }
    info!("event loop stopped");
    Ok(())
}

pub fn draw(f: &mut Frame, app: &App) {
    // Every panel renders from this one snapshot
    let snapshot = app.sampler.snapshot();

    // ============= whole screen layout ============
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Sidebar + panels
            Constraint::Length(1), // Bottom Status Bar
        ])
        .split(f.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(40)])
        .split(main_chunks[0]);

    draw_sidebar(f, app, columns[0]);
    match app.variant {
        Variant::Basic => draw_basic(f, app, &snapshot, columns[1]),
        Variant::Live => draw_live(f, app, &snapshot, columns[1]),
    }
    draw_status_bar(f, app, main_chunks[1]);
}

fn rounded_block(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(APP_TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(APP_DESCRIPTION),
    ];

    if app.variant == Variant::Live {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Links:", Style::default().add_modifier(Modifier::BOLD))));
        for (label, url) in LINKS {
            lines.push(Line::from(Span::styled(label, Style::default().fg(Color::Yellow))));
            lines.push(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))));
        }
        lines.push(Line::from(""));
        let (state, color) = match app.unit {
            TemperatureUnit::Fahrenheit => ("ON", Color::Green),
            TemperatureUnit::Celsius => ("OFF", Color::DarkGray),
        };
        lines.push(Line::from(vec![
            Span::raw("[f] Display in Fahrenheit: "),
            Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]));
    }

    let sidebar = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(sidebar, area);
}

fn temperature_lines(app: &App, snapshot: &Snapshot, caption: &'static str) -> Vec<Line<'static>> {
    match &snapshot.latest {
        Some(latest) => vec![
            Line::from(vec![
                Span::styled("☀ ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format_temperature(latest.celsius(), app.unit),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(caption, Style::default().fg(Color::DarkGray))),
        ],
        None => vec![Line::from(Span::styled(WAITING, Style::default().fg(Color::DarkGray)))],
    }
}

fn timestamp_line(snapshot: &Snapshot) -> Line<'static> {
    match &snapshot.latest {
        Some(latest) => Line::from(latest.timestamp().to_string()),
        None => Line::from(Span::styled(WAITING, Style::default().fg(Color::DarkGray))),
    }
}

fn draw_basic(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let temperature = Paragraph::new(temperature_lines(app, snapshot, "warmer than usual"))
        .block(rounded_block("Current Temperature"));
    f.render_widget(temperature, chunks[0]);

    let time = Paragraph::new(timestamp_line(snapshot)).block(rounded_block("Current Date and Time"));
    f.render_widget(time, chunks[1]);
}

fn draw_live(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    // header row + one line per reading + borders
    let table_height = u16::try_from(app.sampler.capacity()).unwrap_or(u16::MAX).saturating_add(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(table_height),
            Constraint::Min(8),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let value_box = Paragraph::new(temperature_lines(app, snapshot, "Live temperature reading"))
        .block(rounded_block("Current Temperature").border_style(Style::default().fg(Color::Magenta)));
    f.render_widget(value_box, top[0]);

    let time = Paragraph::new(timestamp_line(snapshot)).block(rounded_block("Current Date and Time"));
    f.render_widget(time, top[1]);

    draw_table(f, app, snapshot, chunks[1]);
    draw_chart(f, app, snapshot, chunks[2]);
}

fn draw_table(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    let header_cells = [column_title(app.unit), "Timestamp".to_string()]
        .into_iter()
        .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::Rgb(40, 40, 40)))
        .height(1);

    let rows = snapshot.table_in(app.unit).into_iter().map(|row| {
        Row::new(vec![
            Cell::from(format!("{:.1}", row.temperature)),
            Cell::from(row.timestamp).style(Style::default().fg(Color::DarkGray)),
        ])
    });

    let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
        .header(header)
        .block(rounded_block("Most Recent Readings"));
    f.render_widget(table, area);
}

fn draw_chart(f: &mut Frame, app: &App, snapshot: &Snapshot, area: Rect) {
    let block = rounded_block("Chart with Current Trend");
    if snapshot.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(WAITING, Style::default().fg(Color::DarkGray)))).block(block);
        f.render_widget(waiting, area);
        return;
    }

    let values = snapshot.values_in(app.unit);
    let points: Vec<(f64, f64)> = values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
    // A single reading has no trend; plot the point alone.
    let trend: Vec<(f64, f64)> = TrendLine::fit(&values)
        .map(|line| {
            line.fitted(values.len())
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i as f64, v))
                .collect()
        })
        .unwrap_or_default();

    let mut datasets = vec![Dataset::default()
        .name("Readings")
        .marker(Marker::Dot)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Blue))
        .data(&points)];
    if !trend.is_empty() {
        datasets.push(
            Dataset::default()
                .name("Regression Line")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Red))
                .data(&trend),
        );
    }

    let mut plotted = values.clone();
    plotted.extend(trend.iter().map(|p| p.1));
    let y_bounds = padded_bounds(&plotted, 0.5);
    let x_max = (values.len().max(2) - 1) as f64;

    let x_labels: Vec<Span> = match (snapshot.readings.first(), snapshot.readings.last()) {
        (Some(first), Some(last)) => vec![
            Span::raw(first.time_of_day().to_string()),
            Span::raw(last.time_of_day().to_string()),
        ],
        _ => vec![],
    };
    let y_labels = vec![
        Span::raw(format!("{:.1}", y_bounds[0])),
        Span::raw(format!("{:.1}", (y_bounds[0] + y_bounds[1]) / 2.0)),
        Span::raw(format!("{:.1}", y_bounds[1])),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(column_title(app.unit))
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(y_labels),
        );
    f.render_widget(chart, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let badge = match app.sampler.state() {
        SamplerState::Empty => " WAITING ",
        SamplerState::Populated => " LIVE ",
    };
    let status_content = Line::from(vec![
        Span::styled(badge, Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " {}/{} readings | every {}s | ",
            app.sampler.len(),
            app.sampler.capacity(),
            app.tick_rate.as_secs()
        )),
        Span::raw("Press 'f' to toggle °C/°F, 'q' to quit"),
    ]);

    let status_bar = Paragraph::new(status_content).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerSettings;
    use crate::sampler::test_support::{ScriptedSource, StepClock};
    use ratatui::backend::TestBackend;

    fn app(variant: Variant, capacity: usize) -> App {
        let settings = SamplerSettings {
            variant,
            interval: Duration::from_secs(5),
            capacity,
            low: -18.0,
            high: -16.0,
            seed: None,
        };
        App::with_source(
            &settings,
            TemperatureUnit::Celsius,
            Box::new(ScriptedSource::new(&[-18.0, -17.5, -17.0, -16.5])),
            Box::new(StepClock::new()),
        )
    }

    fn render(app: &App) -> String {
        let (w, h) = (120, 40);
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..h {
            for x in 0..w {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn tick_times(app: &mut App, n: u64) {
        let start = Instant::now();
        for i in 0..n {
            app.on_tick(start + Duration::from_secs(5 * i));
        }
    }

    #[test]
    fn empty_live_dashboard_shows_waiting_state() {
        let app = app(Variant::Live, 3);
        let screen = render(&app);
        assert!(screen.contains(APP_TITLE));
        assert!(screen.contains("Waiting for first reading"));
        assert!(screen.contains("Most Recent Readings"));
        assert!(screen.contains("Chart with Current Trend"));
        assert!(screen.contains("WAITING"));
    }

    #[test]
    fn live_dashboard_shows_latest_and_table() {
        let mut app = app(Variant::Live, 3);
        tick_times(&mut app, 4);
        let screen = render(&app);
        assert!(screen.contains("-16.5 °C"));
        assert!(screen.contains("Live temperature reading"));
        assert!(screen.contains("2024-07-01 12:00:03"));
        assert!(screen.contains("Temperature (°C)"));
        // evicted reading is gone from the table
        assert!(!screen.contains("2024-07-01 12:00:00"));
        assert!(screen.contains("3/3 readings"));
    }

    #[test]
    fn fahrenheit_toggle_changes_every_view() {
        let mut app = app(Variant::Live, 3);
        tick_times(&mut app, 4);
        app.toggle_unit();
        let screen = render(&app);
        assert!(screen.contains("2.3 °F"));
        assert!(screen.contains("Temperature (°F)"));
        assert!(!screen.contains("Temperature (°C)"));
        assert!(screen.contains("Display in Fahrenheit: ON"));
    }

    #[test]
    fn single_reading_renders_without_trend() {
        let mut app = app(Variant::Live, 3);
        tick_times(&mut app, 1);
        let screen = render(&app);
        assert!(screen.contains("-18.0 °C"));
        assert!(screen.contains("Chart with Current Trend"));
    }

    #[test]
    fn live_sidebar_lists_every_link() {
        let screen = render(&app(Variant::Live, 3));
        for (label, _) in LINKS {
            assert!(screen.contains(label), "missing link {label}");
        }
        assert!(screen.contains("PyShiny Express"));
    }

    #[test]
    fn restore_keeps_going_after_raw_mode_failure() {
        let mut out = Vec::new();
        let err = restore_terminal(&mut out, || Err(io::Error::new(io::ErrorKind::Other, "no tty")))
            .unwrap_err();
        assert_eq!(err.to_string(), "no tty");

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"), "alternate screen not left: {written:?}");
        assert!(written.contains("\x1b[?25h"), "cursor not shown: {written:?}");
    }

    #[test]
    fn restore_succeeds_when_every_step_does() {
        let mut out = Vec::new();
        assert!(restore_terminal(&mut out, || Ok(())).is_ok());
        assert!(!out.is_empty());
    }

    #[test]
    fn basic_dashboard_has_no_table_or_chart() {
        let mut app = app(Variant::Basic, 1);
        tick_times(&mut app, 2);
        let screen = render(&app);
        assert!(screen.contains("-17.5 °C"));
        assert!(screen.contains("warmer than usual"));
        assert!(screen.contains("Current Date and Time"));
        assert!(!screen.contains("Most Recent Readings"));
        assert!(!screen.contains("Links:"));
    }
}
