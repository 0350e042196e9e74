//! Terminal front end: full-frame immediate-mode rendering plus the
//! single-task event loop. Every frame is rebuilt from [`App`] state; the
//! hit zones returned by the draw are the only thing carried between
//! frames, so mouse clicks land on exactly what was last drawn.

pub mod matrix;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use rand::Rng;
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, LoadState, Row, Severity};
use crate::download::Navigate;
use crate::github::client::ReleaseFeed;
use crate::text::{format_file_size, sanitize_display};
use self::matrix::{Backdrop, MatrixRain};

/// Interval between backdrop repaints.
const TICK: Duration = Duration::from_millis(40);

/// Fraction of pointer-move events that get a log entry.
const MOUSE_MOVE_LOG_RATE: f64 = 0.02;

const COLOR_TEXT: Color = Color::Rgb(0, 255, 65);
const COLOR_DIM: Color = Color::Rgb(0, 130, 45);
const COLOR_ERROR: Color = Color::Rgb(255, 77, 77);

const DOWNLOAD_LABEL: &str = " [ DOWNLOAD (d) ] ";

/// Runs the console until the user quits. Terminal modes are restored
/// before the result is returned, whatever the outcome.
pub async fn run(mut app: App, feed: &dyn ReleaseFeed, navigator: &dyn Navigate) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut backdrop = MatrixRain::new(size.width, size.height);

    let result = drive(&mut terminal, &mut app, feed, navigator, &mut backdrop).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    feed: &dyn ReleaseFeed,
    navigator: &dyn Navigate,
    backdrop: &mut dyn Backdrop,
) -> Result<()> {
    // First frame goes up before the startup fetches so the panels are
    // visible while the network is slow.
    let mut zones = Zones::default();
    terminal.draw(|frame| zones = draw_frame(frame, app, &*backdrop))?;

    app.startup(feed).await;

    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK);

    while !app.should_quit {
        terminal.draw(|frame| zones = draw_frame(frame, app, &*backdrop))?;

        tokio::select! {
            _ = ticker.tick() => backdrop.tick(),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => handle_event(app, navigator, backdrop, &zones, event),
                Some(Err(err)) => return Err(err.into()),
                None => break,
            }
        }
    }

    Ok(())
}

/// Where the last frame put things, for mouse hit-testing.
#[derive(Debug, Default, Clone)]
struct Zones {
    list_inner: Rect,
    list_offset: usize,
    rows: Vec<Row>,
    download: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Row(Row),
    Download,
    Background,
}

impl Zones {
    fn hit(&self, x: u16, y: u16) -> Hit {
        if self.download.contains(Position::new(x, y)) {
            return Hit::Download;
        }
        if self.list_inner.contains(Position::new(x, y)) {
            let index = self.list_offset + (y - self.list_inner.y) as usize;
            if let Some(row) = self.rows.get(index) {
                return Hit::Row(*row);
            }
        }
        Hit::Background
    }
}

fn handle_event(
    app: &mut App,
    navigator: &dyn Navigate,
    backdrop: &mut dyn Backdrop,
    zones: &Zones,
    event: Event,
) {
    match event {
        Event::Key(key) => handle_key(app, navigator, key),
        Event::Mouse(mouse) => handle_mouse(app, navigator, zones, mouse),
        Event::Resize(width, height) => backdrop.resize(width, height),
        _ => {}
    }
}

fn handle_key(app: &mut App, navigator: &dyn Navigate, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_cursor(),
        KeyCode::Char('d') => app.request_download(navigator),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, navigator: &dyn Navigate, zones: &Zones, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = zones.hit(mouse.column, mouse.row);
            let label = match target {
                Hit::Row(Row::ReleaseHeader(_)) => "RELEASE",
                Hit::Row(Row::Asset { .. }) => "ASSET",
                Hit::Download => "DOWNLOAD",
                Hit::Background => "SCREEN",
            };
            app.log_click(mouse.column, mouse.row, label);
            match target {
                Hit::Row(row) => app.activate(row),
                Hit::Download => app.request_download(navigator),
                Hit::Background => {}
            }
        }
        MouseEventKind::Moved => {
            // High-frequency; sampled for log volume, not correctness.
            if rand::thread_rng().gen_bool(MOUSE_MOVE_LOG_RATE) {
                app.log_pointer_move(mouse.column, mouse.row);
            }
        }
        _ => {}
    }
}

fn draw_frame(frame: &mut Frame, app: &App, backdrop: &dyn Backdrop) -> Zones {
    backdrop.draw(frame.buffer_mut());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_top_bar(frame, app, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let (list_inner, list_offset, rows) = draw_release_panel(frame, app, middle[0]);
    draw_log_panel(frame, app, middle[1]);
    let download = draw_bottom_bar(frame, app, chunks[2]);

    Zones {
        list_inner,
        list_offset,
        rows,
        download,
    }
}

fn draw_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(24)])
        .split(area);

    let path = Paragraph::new(Line::from(vec![
        Span::styled(" PATH: ", Style::default().fg(COLOR_DIM)),
        Span::styled(
            app.breadcrumb(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(path, halves[0]);

    let repo = Paragraph::new(format!("{} ", app.repo))
        .style(Style::default().fg(COLOR_DIM))
        .alignment(Alignment::Right);
    frame.render_widget(repo, halves[1]);
}

fn draw_release_panel(frame: &mut Frame, app: &App, area: Rect) -> (Rect, usize, Vec<Row>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_DIM))
        .title(" RELEASE PACKAGES ")
        .title_style(Style::default().fg(COLOR_TEXT));
    let inner = block.inner(area);

    let placeholder = match app.load_state() {
        LoadState::Loading => Some(("Loading releases...", COLOR_DIM)),
        LoadState::Failed => Some(("Error loading releases.", COLOR_ERROR)),
        LoadState::Loaded if app.releases().is_empty() => Some(("No releases found.", COLOR_DIM)),
        LoadState::Loaded => None,
    };
    if let Some((message, color)) = placeholder {
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(color))
            .block(block);
        frame.render_widget(paragraph, area);
        return (inner, 0, Vec::new());
    }

    let rows = app.visible_rows();
    let items: Vec<ListItem> = rows.iter().map(|row| list_item(app, *row)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.cursor));
    frame.render_stateful_widget(list, area, &mut state);

    (inner, state.offset(), rows)
}

fn list_item(app: &App, row: Row) -> ListItem<'static> {
    match row {
        Row::ReleaseHeader(index) => {
            let release = &app.releases()[index];
            let expanded = app.selection().expanded_release() == Some(index);
            let arrow = if expanded { "▼" } else { "▶" };
            let name_style = if expanded {
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(COLOR_TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} {}", arrow, sanitize_display(release.display_name())),
                    name_style,
                ),
                Span::styled(
                    format!("  {}", release.published_date()),
                    Style::default().fg(COLOR_DIM),
                ),
            ]))
        }
        Row::Asset { release, asset } => {
            let file = &app.releases()[release].assets[asset];
            let selected = app.selection().selected_asset() == Some((release, asset));
            let marker = if selected { "▪" } else { " " };
            let name_style = if selected {
                Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(COLOR_TEXT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("  {} {}", marker, sanitize_display(&file.name)),
                    name_style,
                ),
                Span::styled(
                    format!("  {}", format_file_size(file.size)),
                    Style::default().fg(COLOR_DIM),
                ),
            ]))
        }
    }
}

fn draw_log_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_DIM))
        .title(" ACTIVITY LOG ")
        .title_style(Style::default().fg(COLOR_TEXT));
    let inner = block.inner(area);

    // tail of the log, auto-following the newest entry
    let visible = inner.height as usize;
    let skip = app.log.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .log
        .entries()
        .skip(skip)
        .map(|entry| {
            let color = match entry.severity {
                Severity::Info => COLOR_TEXT,
                Severity::Warn => Color::Yellow,
                Severity::Error => COLOR_ERROR,
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(COLOR_DIM),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_bottom_bar(frame: &mut Frame, app: &App, area: Rect) -> Rect {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(DOWNLOAD_LABEL.len() as u16),
        ])
        .split(area);

    let info = Paragraph::new(format!(" {}", app.selected_file_info()))
        .style(Style::default().fg(COLOR_TEXT));
    frame.render_widget(info, halves[0]);

    let button_style = if app.download_enabled() {
        Style::default()
            .fg(Color::Black)
            .bg(COLOR_TEXT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(COLOR_DIM)
    };
    frame.render_widget(Paragraph::new(DOWNLOAD_LABEL).style(button_style), halves[1]);

    halves[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::download::MockNavigate;
    use crate::github::repo::GitHubRepo;
    use crate::github::types::{Release, ReleaseAsset};
    use ratatui::backend::TestBackend;
    use std::str::FromStr;

    /// Stand-in backdrop so rendering tests stay deterministic.
    struct StillBackdrop;

    impl Backdrop for StillBackdrop {
        fn tick(&mut self) {}
        fn resize(&mut self, _width: u16, _height: u16) {}
        fn draw(&self, _buf: &mut ratatui::buffer::Buffer) {}
    }

    fn test_app(releases: Vec<Release>) -> App {
        let mut app = App::new(
            GitHubRepo::from_str("owner/repo").unwrap(),
            "https://ghproxy.net".to_string(),
        );
        app.set_releases(releases);
        app
    }

    fn one_release() -> Vec<Release> {
        vec![Release {
            id: 1,
            tag_name: "v1.0.0".to_string(),
            name: None,
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            assets: vec![
                ReleaseAsset {
                    name: "a.zip".to_string(),
                    size: 1024,
                    browser_download_url: "https://example.com/a.zip".to_string(),
                },
                ReleaseAsset {
                    name: "b.zip".to_string(),
                    size: 2048,
                    browser_download_url: "https://example.com/b.zip".to_string(),
                },
            ],
        }]
    }

    fn render(app: &App) -> (Zones, String) {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let backdrop = StillBackdrop;
        let mut zones = Zones::default();
        terminal
            .draw(|frame| zones = draw_frame(frame, app, &backdrop))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        (zones, text)
    }

    #[test]
    fn test_frame_shows_panels_and_path() {
        let app = test_app(one_release());
        let (zones, text) = render(&app);
        assert!(text.contains("RELEASE PACKAGES"));
        assert!(text.contains("ACTIVITY LOG"));
        assert!(text.contains("PATH:"));
        assert!(text.contains("v1.0.0"));
        assert!(text.contains("DOWNLOAD"));
        assert_eq!(zones.rows, vec![Row::ReleaseHeader(0)]);
    }

    #[test]
    fn test_empty_list_renders_placeholder_with_no_rows() {
        let app = test_app(vec![]);
        let (zones, text) = render(&app);
        assert!(text.contains("No releases found."));
        assert!(zones.rows.is_empty());
    }

    #[test]
    fn test_expanded_release_shows_assets_and_sizes() {
        let mut app = test_app(one_release());
        app.toggle_release(0);
        let (zones, text) = render(&app);
        assert!(text.contains("a.zip"));
        assert!(text.contains("1.00 KB"));
        assert_eq!(zones.rows.len(), 3);
    }

    #[test]
    fn test_log_panel_shows_latest_entries() {
        let mut app = test_app(one_release());
        app.toggle_release(0);
        let (_, text) = render(&app);
        assert!(text.contains("Expanded release: v1.0.0"));
    }

    #[test]
    fn test_click_on_header_row_toggles() {
        let mut app = test_app(one_release());
        let (zones, _) = render(&app);
        let navigator = MockNavigate::new();

        let x = zones.list_inner.x;
        let y = zones.list_inner.y;
        assert_eq!(zones.hit(x, y), Hit::Row(Row::ReleaseHeader(0)));

        handle_mouse(
            &mut app,
            &navigator,
            &zones,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: x,
                row: y,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.selection().expanded_release(), Some(0));
        assert!(
            app.log
                .entries()
                .any(|e| e.message.contains("CLICK") && e.message.contains("RELEASE"))
        );
    }

    #[test]
    fn test_click_on_asset_row_selects() {
        let mut app = test_app(one_release());
        app.toggle_release(0);
        let (zones, _) = render(&app);
        let navigator = MockNavigate::new();

        // row 1 is the first asset under the expanded header
        let x = zones.list_inner.x;
        let y = zones.list_inner.y + 1;
        assert_eq!(
            zones.hit(x, y),
            Hit::Row(Row::Asset {
                release: 0,
                asset: 0
            })
        );

        handle_mouse(
            &mut app,
            &navigator,
            &zones,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: x,
                row: y,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert!(app.download_enabled());
    }

    #[test]
    fn test_click_outside_rows_is_background() {
        let app = test_app(vec![]);
        let (zones, _) = render(&app);
        assert_eq!(zones.hit(zones.list_inner.x, zones.list_inner.y), Hit::Background);
    }

    #[test]
    fn test_click_download_zone_with_no_selection_warns() {
        let mut app = test_app(one_release());
        let (zones, _) = render(&app);
        let mut navigator = MockNavigate::new();
        navigator.expect_open().never();

        let x = zones.download.x;
        let y = zones.download.y;
        assert_eq!(zones.hit(x, y), Hit::Download);

        handle_mouse(
            &mut app,
            &navigator,
            &zones,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: x,
                row: y,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert!(
            app.log
                .entries()
                .any(|e| e.severity == Severity::Warn
                    && e.message == "Download requested but no file selected.")
        );
    }

    #[test]
    fn test_keyboard_drives_selection_and_quit() {
        let mut app = test_app(one_release());
        let navigator = MockNavigate::new();

        handle_key(&mut app, &navigator, KeyEvent::from(KeyCode::Enter));
        assert_eq!(app.selection().expanded_release(), Some(0));

        handle_key(&mut app, &navigator, KeyEvent::from(KeyCode::Down));
        handle_key(&mut app, &navigator, KeyEvent::from(KeyCode::Enter));
        assert!(app.download_enabled());

        handle_key(&mut app, &navigator, KeyEvent::from(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_download_key_opens_selected_asset() {
        let mut app = test_app(one_release());
        app.toggle_release(0);
        app.select_asset(0, 0);

        let mut navigator = MockNavigate::new();
        navigator
            .expect_open()
            .withf(|url| url.starts_with("https://ghproxy.net/"))
            .times(1)
            .returning(|_| Ok(()));

        handle_key(&mut app, &navigator, KeyEvent::from(KeyCode::Char('d')));
    }

    #[tokio::test]
    async fn test_failed_load_renders_error_placeholder() {
        let mut app = App::new(
            GitHubRepo::from_str("owner/repo").unwrap(),
            "https://ghproxy.net".to_string(),
        );
        app.startup(&FailingFeed).await;
        let (zones, text) = render(&app);
        assert!(text.contains("Error loading releases."));
        assert!(zones.rows.is_empty());
    }

    struct FailingFeed;

    #[async_trait::async_trait]
    impl ReleaseFeed for FailingFeed {
        async fn broadcast(&self) -> anyhow::Result<String> {
            Err(anyhow::anyhow!("offline"))
        }
        async fn releases(&self) -> anyhow::Result<Vec<Release>> {
            Err(anyhow::anyhow!("offline"))
        }
    }
}
