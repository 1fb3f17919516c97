//! Single-shot deferred callbacks
//!
//! A popup arms two kinds of timers: the auto-hide countdown and the
//! next-tick attachment of its document listeners. The scheduler only
//! keeps time; when a timer fires, the host hands its token back to the
//! controller through `PopupMenu::on_timer`.

mod event_loop;
mod manual;

use std::fmt;
use std::time::Duration;

pub use event_loop::CalloopScheduler;
pub use manual::ManualScheduler;

use crate::error::SchedulerError;

/// Purpose of a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Idle countdown after the pointer left the popup
    AutoHide,
    /// Deferred attachment of document click/key listeners
    AttachListeners,
}

/// Identity of one armed timer, never reused by a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

pub trait Scheduler {
    /// Arm a single-shot timer firing after `delay`; a zero delay means next tick
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> Result<TimerToken, SchedulerError>;

    /// Disarm a timer. Unknown or already fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}
