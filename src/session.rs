use std::time::Duration;

use crate::metrics::{Diff, Metrics, MetricsEngine, Verdict};
use crate::target_text::TargetText;
use crate::time_series::TimeSeriesPoint;
use crate::timer::Countdown;
use crate::util::std_dev;

/// Durations offered by the selector, in seconds.
pub const DURATION_CHOICES: [u64; 4] = [15, 30, 60, 120];

pub const DEFAULT_DURATION_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    TimeUp,
    Stopped,
}

/// Final figures of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub correct_chars: usize,
    pub total_chars: usize,
    /// Time base the wpm was computed over.
    pub elapsed_secs: u64,
    /// Spread of the per-second wpm samples.
    pub std_dev: f64,
    pub reason: FinishReason,
}

/// Notifications for whoever presents the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Tick { remaining_secs: u64, live: Metrics },
    Finished(SessionResult),
    Reset,
    DurationChanged(u64),
}

/// One typing test: waiting for the first key, counting down, then done.
#[derive(Debug, Clone)]
pub struct Session {
    target: TargetText,
    typed: Vec<char>,
    status: SessionStatus,
    duration_secs: u64,
    countdown: Countdown,
    engine: MetricsEngine,
    wpm_coords: Vec<TimeSeriesPoint>,
    result: Option<SessionResult>,
    elapsed_at_finish: u64,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(target: TargetText, duration_secs: u64) -> Self {
        let engine = MetricsEngine::new(&target);
        Self {
            target,
            typed: Vec::new(),
            status: SessionStatus::Waiting,
            duration_secs: duration_secs.max(1),
            countdown: Countdown::new(),
            engine,
            wpm_coords: Vec::new(),
            result: None,
            elapsed_at_finish: 0,
            events: Vec::new(),
        }
    }

    /// `Waiting -> Running`. Refused when there is no text to type yet.
    pub fn start(&mut self) -> bool {
        if self.status != SessionStatus::Waiting || self.target.is_empty() {
            return false;
        }
        self.countdown.arm(self.duration_secs);
        self.status = SessionStatus::Running;
        self.events.push(SessionEvent::Started);
        tracing::debug!(duration_secs = self.duration_secs, "session started");
        true
    }

    /// Replace the typed buffer with `typed`, the full current input.
    ///
    /// The first input while waiting starts the session and is processed as
    /// a real keystroke. Input after the session finished is ignored.
    pub fn input(&mut self, typed: &str) -> bool {
        self.apply(typed.chars().collect())
    }

    pub fn type_char(&mut self, c: char) -> bool {
        if self.status == SessionStatus::Running && self.typed.len() >= self.target.len() {
            return false;
        }
        let mut next = self.typed.clone();
        next.push(c);
        self.apply(next)
    }

    pub fn backspace(&mut self) -> bool {
        if self.status != SessionStatus::Running || self.typed.is_empty() {
            return false;
        }
        let mut next = self.typed.clone();
        next.pop();
        self.apply(next)
    }

    fn apply(&mut self, mut typed: Vec<char>) -> bool {
        match self.status {
            SessionStatus::Finished => return false,
            SessionStatus::Waiting => {
                if typed.is_empty() || !self.start() {
                    return false;
                }
            }
            SessionStatus::Running => {}
        }

        typed.truncate(self.target.len());
        self.typed = typed;
        let diff = self.engine.apply_input(&self.target, &self.typed);
        debug_assert!(diff.correct_chars <= diff.total_chars);
        debug_assert!(diff.total_chars <= self.target.len());
        self.engine.compute_live_metrics(self.countdown.elapsed_secs());
        true
    }

    /// Feed elapsed time to the countdown. Each whole second samples the
    /// live metrics; reaching zero finishes the session.
    pub fn advance(&mut self, delta: Duration) {
        if self.status != SessionStatus::Running {
            return;
        }

        let before = self.countdown.elapsed_secs();
        let fired = self.countdown.advance(delta);
        for n in 1..=u64::from(fired) {
            let second = before + n;
            let live = self.engine.compute_live_metrics(second);
            self.wpm_coords
                .push(TimeSeriesPoint::new(second as f64, f64::from(live.wpm)));
            self.events.push(SessionEvent::Tick {
                remaining_secs: self.duration_secs - second,
                live,
            });
        }

        if self.countdown.is_expired() {
            self.finish(FinishReason::TimeUp);
        }
    }

    /// `Running -> Finished` on request.
    pub fn stop(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.finish(FinishReason::Stopped);
        true
    }

    fn finish(&mut self, reason: FinishReason) {
        let elapsed_secs = match reason {
            FinishReason::TimeUp => self.duration_secs,
            FinishReason::Stopped => self.countdown.elapsed_secs(),
        };
        self.elapsed_at_finish = elapsed_secs;
        self.countdown.cancel();

        let metrics = self.engine.compute_final_metrics(elapsed_secs);
        let samples: Vec<f64> = self.wpm_coords.iter().map(|p| p.wpm).collect();
        let diff = self.engine.diff();
        let result = SessionResult {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            correct_chars: diff.correct_chars,
            total_chars: diff.total_chars,
            elapsed_secs,
            std_dev: std_dev(&samples).unwrap_or(0.0),
            reason,
        };

        tracing::info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            ?reason,
            "session finished"
        );
        self.status = SessionStatus::Finished;
        self.result = Some(result.clone());
        self.events.push(SessionEvent::Finished(result));
    }

    /// Back to `Waiting` with fresh text; cancels the countdown and clears
    /// everything typed.
    pub fn reset(&mut self, target: TargetText) {
        self.countdown.cancel();
        self.engine.reset(&target);
        self.target = target;
        self.typed.clear();
        self.wpm_coords.clear();
        self.result = None;
        self.elapsed_at_finish = 0;
        self.status = SessionStatus::Waiting;
        self.events.push(SessionEvent::Reset);
    }

    /// Reset keeping the same text.
    pub fn retry(&mut self) {
        self.reset(self.target.clone());
    }

    /// Change the configured duration. Ignored while running.
    pub fn set_duration(&mut self, secs: u64) -> bool {
        if self.status == SessionStatus::Running || secs == 0 {
            return false;
        }
        self.duration_secs = secs;
        self.events.push(SessionEvent::DurationChanged(secs));
        true
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn target(&self) -> &TargetText {
        &self.target
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    /// Index of the next expected character.
    pub fn cursor(&self) -> usize {
        self.typed.len()
    }

    pub fn diff(&self) -> &Diff {
        self.engine.diff()
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.engine.diff().verdicts
    }

    pub fn live_metrics(&self) -> Metrics {
        self.engine.live()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        match self.status {
            SessionStatus::Waiting => self.duration_secs,
            SessionStatus::Running => self.countdown.remaining_secs().unwrap_or(0),
            SessionStatus::Finished => self.duration_secs.saturating_sub(self.elapsed_at_finish),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        match self.status {
            SessionStatus::Waiting => 0,
            SessionStatus::Running => self.countdown.elapsed_secs(),
            SessionStatus::Finished => self.elapsed_at_finish,
        }
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn wpm_coords(&self) -> &[TimeSeriesPoint] {
        &self.wpm_coords
    }

    pub fn is_timer_armed(&self) -> bool {
        self.countdown.is_armed()
    }

    /// Drain pending notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session(text: &str, secs: u64) -> Session {
        Session::new(TargetText::new(text), secs)
    }

    fn type_str(s: &mut Session, text: &str) {
        for c in text.chars() {
            s.type_char(c);
        }
    }

    #[test]
    fn test_new_session_is_waiting() {
        let s = session("hello", 30);
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert_eq!(s.remaining_secs(), 30);
        assert_eq!(s.cursor(), 0);
        assert!(!s.is_timer_armed());
        assert!(s.verdicts().iter().all(|v| *v == Verdict::Untyped));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SessionStatus::Waiting.to_string(), "waiting");
        assert_eq!(SessionStatus::Running.to_string(), "running");
        assert_eq!(SessionStatus::Finished.to_string(), "finished");
    }

    #[test]
    fn test_explicit_start() {
        let mut s = session("hello", 30);
        assert!(s.start());
        assert_eq!(s.status(), SessionStatus::Running);
        assert!(!s.start());
        assert_eq!(s.take_events(), vec![SessionEvent::Started]);
    }

    #[test]
    fn test_first_keystroke_starts_and_counts() {
        let mut s = session("hello", 30);
        assert!(s.type_char('h'));
        assert_eq!(s.status(), SessionStatus::Running);
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.verdicts()[0], Verdict::Correct);
        assert_eq!(s.diff().total_chars, 1);
    }

    #[test]
    fn test_empty_target_refuses_start_and_input() {
        let mut s = Session::new(TargetText::default(), 30);
        assert!(!s.start());
        assert!(!s.type_char('a'));
        assert!(!s.input("abc"));
        assert_eq!(s.status(), SessionStatus::Waiting);
    }

    #[test]
    fn test_input_replaces_whole_buffer() {
        let mut s = session("the quick", 30);
        assert!(s.input("the"));
        assert_eq!(s.diff().correct_chars, 3);
        assert!(s.input("tha"));
        assert_eq!(s.diff().correct_chars, 2);
        assert_eq!(s.diff().total_chars, 3);
        assert!(s.input("t"));
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_typing_is_capped_at_target_length() {
        let mut s = session("abc", 30);
        type_str(&mut s, "abcdef");
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.diff().total_chars, 3);
        assert!(!s.type_char('x'));

        assert!(s.input("abcabc"));
        assert_eq!(s.diff().total_chars, 3);
        assert!(s.diff().correct_chars <= s.diff().total_chars);
    }

    #[test]
    fn test_backspace() {
        let mut s = session("abc", 30);
        assert!(!s.backspace());
        type_str(&mut s, "ax");
        assert_eq!(s.verdicts()[1], Verdict::Incorrect);
        assert!(s.backspace());
        assert_eq!(s.verdicts()[1], Verdict::Untyped);
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn test_countdown_finishes_session() {
        let mut s = session(&"a".repeat(100), 60);
        s.input(&"a".repeat(60));
        s.take_events();

        s.advance(Duration::from_secs(59));
        assert_eq!(s.status(), SessionStatus::Running);
        assert_eq!(s.remaining_secs(), 1);

        s.advance(Duration::from_secs(1));
        assert_eq!(s.status(), SessionStatus::Finished);
        assert!(!s.is_timer_armed());

        let result = s.result().unwrap();
        assert_eq!(result.wpm, 12);
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.elapsed_secs, 60);
        assert_eq!(result.reason, FinishReason::TimeUp);

        let events = s.take_events();
        assert_eq!(events.len(), 61);
        assert_matches!(events.last(), Some(SessionEvent::Finished(r)) if r.wpm == 12);
    }

    #[test]
    fn test_ticks_sample_live_metrics() {
        let mut s = session(&"a".repeat(100), 15);
        s.input(&"a".repeat(10));
        s.take_events();
        s.advance(Duration::from_secs(2));

        assert_eq!(s.wpm_coords().len(), 2);
        assert_eq!(s.wpm_coords()[0], TimeSeriesPoint::new(1.0, 120.0));
        assert_eq!(s.wpm_coords()[1], TimeSeriesPoint::new(2.0, 60.0));
        assert_eq!(
            s.take_events(),
            vec![
                SessionEvent::Tick {
                    remaining_secs: 14,
                    live: Metrics { wpm: 120, accuracy: 100 }
                },
                SessionEvent::Tick {
                    remaining_secs: 13,
                    live: Metrics { wpm: 60, accuracy: 100 }
                },
            ]
        );
    }

    #[test]
    fn test_live_metrics_before_first_second_are_zero() {
        let mut s = session("hello", 30);
        type_str(&mut s, "hel");
        assert_eq!(s.live_metrics(), Metrics::default());
    }

    #[test]
    fn test_input_rejected_after_finish() {
        let mut s = session("hello", 15);
        type_str(&mut s, "he");
        s.advance(Duration::from_secs(15));
        assert_eq!(s.status(), SessionStatus::Finished);

        assert!(!s.type_char('l'));
        assert!(!s.input("hello"));
        assert!(!s.backspace());
        assert_eq!(s.diff().total_chars, 2);
    }

    #[test]
    fn test_finish_with_nothing_typed() {
        let mut s = session("hello", 15);
        s.start();
        s.advance(Duration::from_secs(15));
        let result = s.result().unwrap();
        assert_eq!(result.wpm, 0);
        assert_eq!(result.accuracy, 0);
        assert_eq!(result.std_dev, 0.0);
    }

    #[test]
    fn test_stop_uses_elapsed_seconds() {
        let mut s = session(&"a".repeat(100), 60);
        s.input(&"a".repeat(50));
        s.advance(Duration::from_secs(30));
        assert!(s.stop());
        assert!(!s.stop());

        let result = s.result().unwrap();
        assert_eq!(result.reason, FinishReason::Stopped);
        assert_eq!(result.elapsed_secs, 30);
        assert_eq!(result.wpm, 20);
        assert_eq!(s.remaining_secs(), 30);
        assert_eq!(s.elapsed_secs(), 30);
    }

    #[test]
    fn test_stop_before_first_second() {
        let mut s = session("hello", 60);
        type_str(&mut s, "hello");
        assert!(s.stop());
        assert_eq!(s.result().unwrap().wpm, 0);
        assert_eq!(s.result().unwrap().accuracy, 100);
    }

    #[test]
    fn test_reset_mid_run_cancels_timer() {
        let mut s = session("hello world", 30);
        type_str(&mut s, "hello");
        s.advance(Duration::from_secs(3));
        let before = s.live_metrics();
        assert!(before.wpm > 0);

        s.reset(TargetText::new("fresh words"));
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert!(!s.is_timer_armed());
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.diff().total_chars, 0);
        assert_eq!(s.target().as_str(), "fresh words");
        s.take_events();

        s.advance(Duration::from_secs(3600));
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert_eq!(s.live_metrics(), Metrics::default());
        assert!(s.result().is_none());
        assert!(s.wpm_coords().is_empty());
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_retry_keeps_text() {
        let mut s = session("same text", 30);
        type_str(&mut s, "same");
        s.retry();
        assert_eq!(s.target().as_str(), "same text");
        assert_eq!(s.status(), SessionStatus::Waiting);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_set_duration_only_when_not_running() {
        let mut s = session("hello", 60);
        assert!(s.set_duration(15));
        assert_eq!(s.remaining_secs(), 15);

        s.start();
        assert!(!s.set_duration(120));
        assert_eq!(s.duration_secs(), 15);

        s.advance(Duration::from_secs(15));
        assert_eq!(s.status(), SessionStatus::Finished);
        assert!(s.set_duration(120));
        assert_eq!(s.duration_secs(), 120);
    }

    #[test]
    fn test_shorter_duration_after_stop_keeps_finished_times() {
        let mut s = session("hello", 120);
        s.type_char('h');
        s.advance(Duration::from_secs(10));
        assert!(s.stop());

        assert!(s.set_duration(15));
        assert_eq!(s.elapsed_secs(), 10);
        assert_eq!(s.remaining_secs(), 5);
        assert!(s.remaining_secs() <= s.duration_secs());
        assert_eq!(s.result().unwrap().elapsed_secs, 10);

        assert!(s.set_duration(1));
        assert_eq!(s.elapsed_secs(), 10);
        assert_eq!(s.remaining_secs(), 0);
    }

    #[test]
    fn test_set_duration_rejects_zero() {
        let mut s = session("hello", 60);
        assert!(!s.set_duration(0));
        assert_eq!(s.duration_secs(), 60);
    }

    #[test]
    fn test_duration_choices() {
        assert_eq!(DURATION_CHOICES, [15, 30, 60, 120]);
        assert!(DURATION_CHOICES.contains(&DEFAULT_DURATION_SECS));
    }
}
