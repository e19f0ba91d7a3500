use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    widgets::ListState,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{info, warn};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    client::PageSource,
    pagination::{FetchLimits, FetchOutcome, fetch_all_pages},
    session::{Completion, SearchTicket, Session},
    ui,
};

const TICK: Duration = Duration::from_millis(100);

/// Messages from spawned fetch tasks back to the UI loop.
#[derive(Debug)]
pub enum Update {
    Progress { generation: u64, collected: usize },
    Finished { ticket: SearchTicket, outcome: FetchOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    Selected,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Results,
            Focus::Results => Focus::Selected,
            Focus::Selected => Focus::Search,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Search => Focus::Selected,
            Focus::Results => Focus::Search,
            Focus::Selected => Focus::Results,
        }
    }
}

pub struct App<S> {
    pub session: Session,
    pub input: Input,
    pub focus: Focus,
    pub results_state: ListState,
    pub selected_state: ListState,
    pub alert: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    source: Arc<S>,
    limits: FetchLimits,
    output: PathBuf,
    tx: UnboundedSender<Update>,
    rx: UnboundedReceiver<Update>,
}

impl<S: PageSource + 'static> App<S> {
    pub fn new(source: S, limits: FetchLimits, output: PathBuf) -> Self {
        let (tx, rx) = unbounded_channel();

        Self {
            session: Session::default(),
            input: Input::default(),
            focus: Focus::Search,
            results_state: ListState::default(),
            selected_state: ListState::default(),
            alert: None,
            notice: None,
            should_quit: false,
            source: Arc::new(source),
            limits,
            output,
            tx,
            rx,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            while let Ok(update) = self.rx.try_recv() {
                self.apply(update);
            }

            terminal.draw(|frame| ui::draw(frame, self))?;

            if event::poll(TICK)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Alerts are modal, the key that closes them does nothing else.
        if self.alert.take().is_some() {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.reset(),
            KeyCode::Char('e') if ctrl => self.export(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            _ => match self.focus {
                Focus::Search => self.handle_search_key(key),
                Focus::Results => self.handle_results_key(key),
                Focus::Selected => self.handle_selected_key(key),
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.start_search();
        } else {
            self.input.handle_event(&Event::Key(key));
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        let len = self.session.results().len();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.results_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.results_state, len, 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let Some(item) = self
                    .results_state
                    .selected()
                    .and_then(|i| self.session.result_items().into_iter().nth(i))
                else {
                    return;
                };

                self.session.toggle(&item.name, !item.checked);
                self.clamp_selected();
            }
            _ => {}
        }
    }

    fn handle_selected_key(&mut self, key: KeyEvent) {
        let len = self.session.selection().len();

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => step(&mut self.selected_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => step(&mut self.selected_state, len, 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let Some(name) = self
                    .selected_state
                    .selected()
                    .and_then(|i| self.session.selection().iter().nth(i))
                    .map(str::to_string)
                else {
                    return;
                };

                self.session.deselect(&name);
                self.clamp_selected();
            }
            _ => {}
        }
    }

    pub fn start_search(&mut self) {
        let ticket = match self.session.begin_search(self.input.value()) {
            Ok(ticket) => ticket,
            Err(e) => {
                self.alert = Some(e.to_string());
                return;
            }
        };

        info!(query = ticket.query(), "Searching");
        self.notice = None;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let limits = self.limits;

        tokio::spawn(async move {
            let progress = progress_reporter(tx.clone(), ticket.generation());
            let outcome = fetch_all_pages(source.as_ref(), ticket.query(), limits, progress).await;

            if tx.send(Update::Finished { ticket, outcome }).is_err() {
                warn!("Interface closed before search finished");
            }
        });
    }

    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Progress {
                generation,
                collected,
            } => self.session.record_progress(generation, collected),
            Update::Finished { ticket, outcome } => {
                if let Completion::Applied { alert } = self.session.complete_search(ticket, outcome)
                {
                    self.alert = alert;
                    self.results_state
                        .select((!self.session.results().is_empty()).then_some(0));
                    self.clamp_selected();
                }
            }
        }
    }

    /// Waits for the next message from a fetch task. The run loop polls instead.
    pub async fn next_update(&mut self) -> bool {
        match self.rx.recv().await {
            Some(update) => {
                self.apply(update);
                true
            }
            None => false,
        }
    }

    pub fn export(&mut self) {
        match self.session.export(&self.output) {
            Ok(sheet) => {
                self.notice = Some(format!(
                    "{} 저장 완료 ({}개 품목)",
                    self.output.display(),
                    sheet.rows.len()
                ));
            }
            Err(e) => {
                warn!("Export failed: {e}");
                self.alert = Some(e.to_string());
            }
        }
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.input.reset();
        self.results_state.select(None);
        self.selected_state.select(None);
        self.notice = None;
        self.focus = Focus::Search;
    }

    fn clamp_selected(&mut self) {
        let len = self.session.selection().len();

        let clamped = match self.selected_state.selected() {
            _ if len == 0 => None,
            None => Some(0),
            Some(i) => Some(i.min(len - 1)),
        };

        self.selected_state.select(clamped);
    }
}

/// Forwards progress until the interface hangs up, then goes quiet.
fn progress_reporter(tx: UnboundedSender<Update>, generation: u64) -> impl FnMut(usize) {
    let mut open = true;

    move |collected| {
        if open && tx.send(Update::Progress { generation, collected }).is_err() {
            warn!(generation, "Interface closed, dropping search progress");
            open = false;
        }
    }
}

fn step(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }

    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len as isize) as usize;

    state.select(Some(next));
}
