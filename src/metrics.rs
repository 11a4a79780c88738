use crate::target_text::TargetText;

/// Classification of one position of the target text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Untyped,
    Correct,
    Incorrect,
}

/// Result of comparing a typed buffer against the target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    /// One verdict per target position.
    pub verdicts: Vec<Verdict>,
    pub correct_chars: usize,
    /// Attempted positions, correct or not. Never exceeds the target length.
    pub total_chars: usize,
}

/// Rounded speed and accuracy figures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
}

/// Compare `typed` against `target` position by position.
///
/// Input longer than the target is capped at the target length; the
/// overflow is neither classified nor counted.
pub fn diff(target: &TargetText, typed: &[char]) -> Diff {
    let attempted = typed.len().min(target.len());
    let mut verdicts = vec![Verdict::Untyped; target.len()];
    let mut correct_chars = 0;

    for (idx, (expected, actual)) in target.chars().iter().zip(&typed[..attempted]).enumerate() {
        if expected == actual {
            verdicts[idx] = Verdict::Correct;
            correct_chars += 1;
        } else {
            verdicts[idx] = Verdict::Incorrect;
        }
    }

    Diff {
        verdicts,
        correct_chars,
        total_chars: attempted,
    }
}

/// Raw words per minute over every attempted character, five chars a word.
/// `None` when no time has elapsed.
pub fn raw_wpm(total_chars: usize, elapsed_secs: u64) -> Option<u32> {
    if elapsed_secs == 0 {
        return None;
    }
    let minutes = elapsed_secs as f64 / 60.0;
    Some(((total_chars as f64 / 5.0) / minutes).round() as u32)
}

/// Percentage of attempted characters that were correct, 0 when nothing
/// was attempted.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 0;
    }
    (100.0 * correct_chars as f64 / total_chars as f64).round() as u32
}

/// Holds the counts of the latest diff and derives metrics from them.
#[derive(Clone, Debug, Default)]
pub struct MetricsEngine {
    diff: Diff,
    live: Metrics,
}

impl MetricsEngine {
    pub fn new(target: &TargetText) -> Self {
        Self {
            diff: diff(target, &[]),
            live: Metrics::default(),
        }
    }

    /// Recompute verdicts and counts from the full typed buffer.
    pub fn apply_input(&mut self, target: &TargetText, typed: &[char]) -> &Diff {
        self.diff = diff(target, typed);
        &self.diff
    }

    /// Update the live figures. With zero elapsed seconds the previous
    /// values are kept.
    pub fn compute_live_metrics(&mut self, elapsed_secs: u64) -> Metrics {
        if let Some(wpm) = raw_wpm(self.diff.total_chars, elapsed_secs) {
            self.live = Metrics {
                wpm,
                accuracy: accuracy(self.diff.correct_chars, self.diff.total_chars),
            };
        }
        self.live
    }

    /// Final figures over a fixed time base rather than measured wall time.
    pub fn compute_final_metrics(&self, duration_secs: u64) -> Metrics {
        Metrics {
            wpm: raw_wpm(self.diff.total_chars, duration_secs).unwrap_or(0),
            accuracy: accuracy(self.diff.correct_chars, self.diff.total_chars),
        }
    }

    pub fn diff(&self) -> &Diff {
        &self.diff
    }

    pub fn live(&self) -> Metrics {
        self.live
    }

    pub fn reset(&mut self, target: &TargetText) {
        *self = Self::new(target);
    }
}
