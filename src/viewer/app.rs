//! Main application logic

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error};

use crate::actors::dispatcher::AlertDispatcher;
use crate::actors::poller::PollingSession;
use crate::client::{HttpTelemetryClient, TelemetrySource};
use crate::config::DashboardConfig;
use crate::projection::{Route, project};
use crate::store::SyncStore;

use super::{
    state::{InputMode, ViewerState},
    ui,
};

/// Main TUI application
pub struct App {
    config: DashboardConfig,
    store: SyncStore,
    source: Arc<dyn TelemetrySource>,
    dispatcher: AlertDispatcher,
    ui: ViewerState,
}

impl App {
    /// Create a new application instance
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let client = HttpTelemetryClient::new(&config.api_url, config.request_timeout())
            .with_context(|| format!("Failed to create client for {}", config.api_url))?;

        let source: Arc<dyn TelemetrySource> = Arc::new(client);
        let store = SyncStore::new();
        let dispatcher = AlertDispatcher::new(Arc::clone(&source), store.clone());

        Ok(Self {
            config,
            store,
            source,
            dispatcher,
            ui: ViewerState::new(),
        })
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Pollers start before raw mode so a bad interval leaves the terminal alone
        let session = PollingSession::start(
            &self.config,
            Arc::clone(&self.source),
            Arc::new(self.store.clone()),
        )
        .context("Failed to start pollers")?;

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_event_loop(&mut terminal, &session).await;

        // Pollers go first so nothing is applied while the terminal is torn down
        if let Err(e) = session.shutdown().await {
            error!("failed to stop pollers: {e:#}");
        }

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

    /// Main event loop
    async fn run_event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        session: &PollingSession,
    ) -> Result<()> {
        loop {
            let state = self.store.snapshot();
            self.ui.clamp_selection(state.readings.len());

            let view = project(
                &state,
                self.config.detail_selection,
                self.ui.detail_device(),
            );

            terminal.draw(|f| ui::render(f, &self.ui, &state, &view))?;

            // Handle keyboard events (with timeout)
            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key_event(key.code, session).await?
            {
                break; // Quit
            }
        }

        Ok(())
    }

    /// Handle keyboard event, returns `true` to quit
    async fn handle_key_event(&mut self, code: KeyCode, session: &PollingSession) -> Result<bool> {
        if self.ui.input_mode == InputMode::EditingThreshold {
            match code {
                KeyCode::Enter | KeyCode::Esc => {
                    self.ui.input_mode = InputMode::Normal;
                    self.store.set_draft(self.ui.draft());
                }
                KeyCode::Backspace => self.ui.pop_threshold_char(),
                KeyCode::Char(c) => self.ui.push_threshold_char(c),
                _ => {}
            }
            return Ok(false);
        }

        let state = self.store.snapshot();

        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                return Ok(true); // Quit
            }
            KeyCode::Esc | KeyCode::Backspace => {
                if self.ui.route == Route::Home {
                    return Ok(code == KeyCode::Esc);
                }
                self.ui.go_home();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.ui.select_next(state.readings.len());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.ui.select_previous(state.readings.len());
            }
            KeyCode::Enter => {
                self.ui
                    .open_details(&state, self.config.detail_selection);
            }
            KeyCode::Char('e') => {
                self.ui.input_mode = InputMode::EditingThreshold;
            }
            KeyCode::Char('t') => {
                self.ui.toggle_alerts();
                self.store.set_draft(self.ui.draft());
            }
            KeyCode::Char('s') => {
                let draft = self.ui.draft();
                debug!(?draft, "submitting alert rule from viewer");
                self.store.set_draft(draft);
                // The outcome lands in the store as a notification
                drop(self.dispatcher.submit_in_background(draft));
            }
            KeyCode::Char('x') => {
                self.store.dismiss_notification();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = session.poll_all_now().await {
                    error!("manual refresh failed: {e:#}");
                }
            }
            _ => {}
        }

        Ok(false)
    }
}
