//! Terminal user interface for the logboard dashboard

mod app;
mod ui;

pub use app::{Action, App, AppEvent, ModalState, TableOverlay};

use crate::client::DashboardClient;
use crate::config::UiState;
use crate::fetcher::DetailFetcher;
use crate::filter::FilterState;
use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the dashboard TUI until the user quits.
///
/// All network work happens in spawned tasks that report back on the
/// event channel; the loop itself never blocks on a request, so the
/// interface stays responsive while a fetch is outstanding.
pub async fn run(
    client: DashboardClient,
    fetcher: DetailFetcher,
    file_id: u64,
    initial: FilterState,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ui_state = UiState::load().unwrap_or_default();
    let mut app = App::new(file_id, initial.clone(), ui_state.filter_collapsed);

    let (tx, rx) = mpsc::channel::<AppEvent>(100);

    // Bootstrap request: seeds the table, the count and both charts
    spawn_filter(client.clone(), file_id, initial, tx.clone());

    let result = run_loop(&mut terminal, &mut app, &client, &fetcher, tx, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &DashboardClient,
    fetcher: &DetailFetcher,
    tx: mpsc::Sender<AppEvent>,
    mut rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let action = tokio::select! {
            _ = tick_interval.tick() => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        app.handle_event(AppEvent::Key(key))
                    } else {
                        None
                    }
                } else {
                    None
                }
            }

            event = rx.recv() => {
                match event {
                    Some(event) => app.handle_event(event),
                    None => None,
                }
            }
        };

        if let Some(action) = action {
            match action {
                Action::SubmitFilter(state) => {
                    spawn_filter(client.clone(), app.file_id, state, tx.clone());
                }
                Action::OpenEntry(entry_id) => {
                    spawn_detail(fetcher.clone(), entry_id, tx.clone());
                }
                Action::PanelToggled(filter_collapsed) => {
                    let state = UiState { filter_collapsed };
                    if let Err(err) = state.save() {
                        tracing::warn!(error = %err, "failed to persist UI state");
                    }
                }
                Action::Quit => return Ok(()),
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Issue a filter request in the background. The submitted state
/// travels with the response event, so overlapping requests each
/// arrive paired with the filter that produced them.
fn spawn_filter(
    client: DashboardClient,
    file_id: u64,
    state: FilterState,
    tx: mpsc::Sender<AppEvent>,
) {
    tokio::spawn(async move {
        let result = client.filtered(file_id, &state).await;
        let _ = tx.send(AppEvent::FilterCompleted { state, result }).await;
    });
}

/// Resolve an entry's detail record in the background. The result is
/// reported under the identifier it was requested for, so a stale
/// resolution can be recognized and discarded on arrival.
fn spawn_detail(fetcher: DetailFetcher, entry_id: String, tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let result = fetcher.fetch_detail(&entry_id).await;
        let _ = tx.send(AppEvent::DetailCompleted { entry_id, result }).await;
    });
}
