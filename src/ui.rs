use crate::balance::Amount;
use crate::client::BalanceSource;
use crate::error::Result as WalletResult;
use crate::viewer::{BalanceViewer, FetchStatus, FetchTicket};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Handle;

pub const TITLE: &str = "QuantumCoin Wallet";
pub const PLACEHOLDER_NOTE: &str = "First draft. The send/signing page will be added later.";

const TICK: Duration = Duration::from_millis(100);

/// What the event loop should do after a key press
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Fetch(FetchTicket),
    Quit,
}

pub struct App {
    pub viewer: BalanceViewer,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            viewer: BalanceViewer::new(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Enter => Action::Fetch(self.viewer.begin_fetch()),
            KeyCode::Backspace => {
                self.viewer.pop_char();
                Action::None
            }
            KeyCode::Char(c) => {
                self.viewer.push_char(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn apply_result(&mut self, id: u64, result: WalletResult<Amount>) {
        self.viewer.complete_fetch(id, result);
    }
}

pub fn run_ui<S>(app: &mut App, source: S, runtime: Handle) -> Result<()>
where
    S: BalanceSource + Clone + Send + Sync + 'static,
{
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app, source, runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn spawn_fetch<S>(
    runtime: &Handle,
    source: &S,
    ticket: FetchTicket,
    results: Sender<(u64, WalletResult<Amount>)>,
) where
    S: BalanceSource + Clone + Send + Sync + 'static,
{
    let source = source.clone();
    runtime.spawn(async move {
        let result = source.fetch_balance(&ticket.address).await;
        // Receiver is gone once the UI has quit
        let _ = results.send((ticket.id, result));
    });
}

fn run_app<B, S>(terminal: &mut Terminal<B>, app: &mut App, source: S, runtime: Handle) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    S: BalanceSource + Clone + Send + Sync + 'static,
{
    let (tx, rx): (Sender<_>, Receiver<_>) = mpsc::channel();

    loop {
        while let Ok((id, result)) = rx.try_recv() {
            app.apply_result(id, result);
        }

        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                Action::Fetch(ticket) => spawn_fetch(&runtime, &source, ticket, tx.clone()),
                Action::None => {}
            }
        }
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Address input
            Constraint::Min(3),    // Balance + status
            Constraint::Length(3), // Help bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_input(f, chunks[1], app);
    render_balance(f, chunks[2], app);
    render_status_bar(f, chunks[3]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let address = app.viewer.address();
    let line = if address.is_empty() {
        Line::from(Span::styled("Address", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::raw(address))
    };

    let input = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Address "),
    );
    f.render_widget(input, area);

    // Cursor sits after the typed text, inside the border
    let typed = u16::try_from(address.chars().count()).unwrap_or(u16::MAX);
    let cursor_x = area.x.saturating_add(1).saturating_add(typed);
    if cursor_x < area.x.saturating_add(area.width.saturating_sub(1)) {
        f.set_cursor(cursor_x, area.y + 1);
    }
}

fn render_balance(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    if let Some(balance) = app.viewer.balance_text() {
        lines.push(Line::from(vec![
            Span::styled("Balance:", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(balance, Style::default().fg(Color::Green)),
        ]));
    }

    match app.viewer.status() {
        FetchStatus::Idle => {}
        FetchStatus::Loading => lines.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))),
        FetchStatus::Failed(msg) => lines.push(Line::from(Span::styled(
            format!("Error: {}", msg),
            Style::default().fg(Color::Red),
        ))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        PLACEHOLDER_NOTE,
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::raw(" Get Balance  "),
        Span::styled("Backspace", Style::default().fg(Color::Cyan)),
        Span::raw(" Edit  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(" Quit"),
    ]))
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, area);
}
