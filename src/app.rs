use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::best_score::BestScoreTracker;
use crate::session::{Session, SessionEvent, SessionResult, SessionStatus, DURATION_CHOICES};
use crate::target_text::TargetText;

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Start a fresh word fetch tagged with this request id.
    Fetch(u64),
    Quit,
}

/// Presentation-side controller: owns the session and the best score,
/// translates keys into session operations and reacts to its notifications.
pub struct App {
    pub session: Session,
    best: BestScoreTracker,
    loading: bool,
    request_seq: u64,
    new_best: bool,
    last_result: Option<SessionResult>,
}

impl App {
    /// An app with no text yet; call [`App::begin_reload`] to ask for some.
    pub fn new(duration_secs: u64, best: BestScoreTracker) -> Self {
        Self {
            session: Session::new(TargetText::default(), duration_secs),
            best,
            loading: false,
            request_seq: 0,
            new_best: false,
            last_result: None,
        }
    }

    /// Clear the session and mark a fetch in flight. The returned id must
    /// accompany the fetched text; older ids are discarded on arrival.
    pub fn begin_reload(&mut self) -> u64 {
        self.request_seq += 1;
        self.loading = true;
        self.session.reset(TargetText::default());
        self.drain_session_events();
        tracing::debug!(request = self.request_seq, "word fetch requested");
        self.request_seq
    }

    /// Install fetched text. Returns false for a superseded request.
    pub fn on_text_ready(&mut self, request: u64, text: TargetText) -> bool {
        if request != self.request_seq {
            tracing::debug!(request, current = self.request_seq, "dropping stale word fetch");
            return false;
        }
        self.loading = false;
        self.session.reset(text);
        self.drain_session_events();
        true
    }

    /// Restart with the same text.
    pub fn retry(&mut self) {
        if self.loading {
            return;
        }
        self.session.retry();
        self.drain_session_events();
    }

    pub fn on_tick(&mut self, delta: Duration) {
        self.session.advance(delta);
        self.drain_session_events();
    }

    /// Step through [`DURATION_CHOICES`]. Only outside a running session.
    /// Returns the new duration when it changed.
    pub fn cycle_duration(&mut self, forward: bool) -> Option<u64> {
        let current = self.session.duration_secs();
        let idx = DURATION_CHOICES.iter().position(|d| *d == current);
        let next = match (idx, forward) {
            (Some(i), true) => DURATION_CHOICES[(i + 1) % DURATION_CHOICES.len()],
            (Some(i), false) => {
                DURATION_CHOICES[(i + DURATION_CHOICES.len() - 1) % DURATION_CHOICES.len()]
            }
            (None, true) => *DURATION_CHOICES
                .iter()
                .find(|d| **d > current)
                .unwrap_or(&DURATION_CHOICES[0]),
            (None, false) => *DURATION_CHOICES
                .iter()
                .rev()
                .find(|d| **d < current)
                .unwrap_or(&DURATION_CHOICES[DURATION_CHOICES.len() - 1]),
        };

        if !self.session.set_duration(next) {
            return None;
        }
        self.drain_session_events();
        Some(next)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind == KeyEventKind::Release {
            return Action::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        if self.loading {
            return match key.code {
                KeyCode::Esc => Action::Quit,
                _ => Action::None,
            };
        }

        let action = match self.session.status() {
            SessionStatus::Waiting | SessionStatus::Running => self.handle_typing_key(key),
            SessionStatus::Finished => self.handle_results_key(key),
        };
        self.drain_session_events();
        action
    }

    fn handle_typing_key(&mut self, key: KeyEvent) -> Action {
        let running = self.session.status() == SessionStatus::Running;
        match key.code {
            KeyCode::Esc if running => {
                self.session.stop();
            }
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab => return Action::Fetch(self.begin_reload()),
            KeyCode::Enter if !running => {
                self.session.start();
            }
            KeyCode::Backspace => {
                self.session.backspace();
            }
            KeyCode::Left if !running => {
                self.cycle_duration(false);
            }
            KeyCode::Right if !running => {
                self.cycle_duration(true);
            }
            KeyCode::Char(c) => {
                self.session.type_char(c);
            }
            _ => {}
        }
        Action::None
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => {
                self.retry();
                Action::None
            }
            KeyCode::Char('n') | KeyCode::Tab => Action::Fetch(self.begin_reload()),
            KeyCode::Left | KeyCode::Right => {
                if self.cycle_duration(key.code == KeyCode::Right).is_some() {
                    Action::Fetch(self.begin_reload())
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn drain_session_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                SessionEvent::Finished(result) => {
                    self.new_best = self.best.record(&result);
                    self.last_result = Some(result);
                }
                SessionEvent::Reset => {
                    self.new_best = false;
                }
                SessionEvent::DurationChanged(secs) => {
                    tracing::debug!(secs, "duration changed");
                }
                SessionEvent::Started | SessionEvent::Tick { .. } => {}
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    pub fn best(&self) -> Option<&crate::best_score::BestScore> {
        self.best.best()
    }

    /// Result of the most recently finished session, kept across resets.
    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }
}
