use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct Armed {
    remaining_secs: u64,
    /// Time accumulated toward the next one-second tick.
    pending: Duration,
}

/// A one-second countdown driven by externally supplied time deltas.
///
/// The owner feeds elapsed time through [`Countdown::advance`]; whole
/// seconds become ticks. A cancelled countdown swallows any time fed to it,
/// so a late tick can never reach a session that has moved on.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    armed: Option<Armed>,
    duration_secs: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `duration_secs`, discarding any previous run.
    pub fn arm(&mut self, duration_secs: u64) {
        self.duration_secs = duration_secs;
        self.armed = Some(Armed {
            remaining_secs: duration_secs,
            pending: Duration::ZERO,
        });
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Feed `delta` of elapsed time. Returns how many whole-second ticks
    /// fired; stops at zero remaining and never fires when not armed.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let Some(armed) = self.armed.as_mut() else {
            return 0;
        };

        armed.pending += delta;
        let mut fired = 0;
        while armed.pending >= SECOND && armed.remaining_secs > 0 {
            armed.pending -= SECOND;
            armed.remaining_secs -= 1;
            fired += 1;
        }
        fired
    }

    /// Seconds left, or `None` when not armed.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.armed.map(|a| a.remaining_secs)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.armed
            .map(|a| self.duration_secs - a.remaining_secs)
            .unwrap_or(0)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.armed, Some(a) if a.remaining_secs == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_countdown_ignores_time() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.advance(Duration::from_secs(10)), 0);
        assert_eq!(countdown.remaining_secs(), None);
        assert!(!countdown.is_expired());
    }

    #[test]
    fn test_sub_second_deltas_accumulate() {
        let mut countdown = Countdown::new();
        countdown.arm(5);

        for _ in 0..9 {
            assert_eq!(countdown.advance(Duration::from_millis(100)), 0);
        }
        assert_eq!(countdown.advance(Duration::from_millis(100)), 1);
        assert_eq!(countdown.remaining_secs(), Some(4));
        assert_eq!(countdown.elapsed_secs(), 1);
    }

    #[test]
    fn test_large_delta_fires_several_ticks_and_stops_at_zero() {
        let mut countdown = Countdown::new();
        countdown.arm(3);
        assert_eq!(countdown.advance(Duration::from_secs(10)), 3);
        assert!(countdown.is_expired());
        assert_eq!(countdown.advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_cancel_discards_pending_time() {
        let mut countdown = Countdown::new();
        countdown.arm(10);
        countdown.advance(Duration::from_millis(900));
        countdown.cancel();
        assert_eq!(countdown.advance(Duration::from_secs(5)), 0);

        countdown.arm(10);
        assert_eq!(countdown.advance(Duration::from_millis(200)), 0);
        assert_eq!(countdown.remaining_secs(), Some(10));
    }
}
