use std::collections::BTreeMap;
use std::time::Duration;

use super::{Scheduler, TimerKind, TimerToken};
use crate::error::SchedulerError;

/// Scheduler driven by a virtual clock
///
/// Nothing fires on its own: the owner advances the clock and collects the
/// timers that became due. Timers due at the same instant come out in the
/// order they were armed.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_token: u64,
    pending: BTreeMap<(Duration, TimerToken), TimerKind>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.keys().any(|(_, pending)| *pending == token)
    }

    /// Kind of every armed timer, earliest first
    pub fn pending_kinds(&self) -> Vec<TimerKind> {
        self.pending.values().copied().collect()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerToken, TimerKind)> {
        let (&(deadline, token), _) = self.pending.first_key_value()?;
        if deadline > until {
            return None;
        }
        let kind = self.pending.remove(&(deadline, token))?;
        self.now = self.now.max(deadline);
        Some((token, kind))
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> Result<TimerToken, SchedulerError> {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.insert((self.now + delay, token), kind);
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|(_, pending), _| *pending != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_order_and_clock() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(300))
            .unwrap();
        let first = scheduler
            .schedule(TimerKind::AttachListeners, Duration::ZERO)
            .unwrap();
        let second = scheduler
            .schedule(TimerKind::AttachListeners, Duration::ZERO)
            .unwrap();

        let until = Duration::from_millis(100);
        assert_eq!(scheduler.pop_due(until), Some((first, TimerKind::AttachListeners)));
        assert_eq!(scheduler.pop_due(until), Some((second, TimerKind::AttachListeners)));
        assert_eq!(scheduler.pop_due(until), None);
        assert!(scheduler.is_pending(late));

        assert_eq!(
            scheduler.pop_due(Duration::from_secs(1)),
            Some((late, TimerKind::AutoHide))
        );
        assert_eq!(scheduler.now(), Duration::from_millis(300));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = ManualScheduler::new();
        let token = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(10))
            .unwrap();

        scheduler.cancel(token);
        scheduler.cancel(token);

        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_tokens_are_not_reused() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.schedule(TimerKind::AutoHide, Duration::ZERO).unwrap();
        scheduler.cancel(a);
        let b = scheduler.schedule(TimerKind::AutoHide, Duration::ZERO).unwrap();
        assert_ne!(a, b);
    }
}
