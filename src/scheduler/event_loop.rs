use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use calloop::{
    timer::{TimeoutAction, Timer},
    LoopHandle, RegistrationToken,
};
use tracing::trace;

use super::{Scheduler, TimerKind, TimerToken};
use crate::error::SchedulerError;

type FireCallback<D> = Rc<dyn Fn(&mut D, TimerToken)>;

/// Scheduler backed by a calloop event loop
///
/// Each armed timer becomes a `Timer` source on the loop. When it fires,
/// `on_fire` receives the loop's shared data and the token, and is expected
/// to route the token to the owning popup.
pub struct CalloopScheduler<D: 'static> {
    handle: LoopHandle<'static, D>,
    on_fire: FireCallback<D>,
    pending: Rc<RefCell<HashMap<TimerToken, RegistrationToken>>>,
    next_token: u64,
}

impl<D: 'static> CalloopScheduler<D> {
    pub fn new<F>(handle: LoopHandle<'static, D>, on_fire: F) -> Self
    where
        F: Fn(&mut D, TimerToken) + 'static,
    {
        Self {
            handle,
            on_fire: Rc::new(on_fire),
            pending: Rc::new(RefCell::new(HashMap::new())),
            next_token: 0,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl<D: 'static> Scheduler for CalloopScheduler<D> {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> Result<TimerToken, SchedulerError> {
        let token = TimerToken(self.next_token);
        self.next_token += 1;

        let timer = if delay.is_zero() {
            Timer::immediate()
        } else {
            Timer::from_duration(delay)
        };
        trace!("scheduling {:?} {} with delay {:?}", kind, token, delay);

        let pending = self.pending.clone();
        let on_fire = self.on_fire.clone();
        let registration = self
            .handle
            .insert_source(timer, move |_, _, data| {
                pending.borrow_mut().remove(&token);
                on_fire(data, token);
                TimeoutAction::Drop
            })
            .map_err(|err| err.error)?;

        self.pending.borrow_mut().insert(token, registration);
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        let registration = self.pending.borrow_mut().remove(&token);
        if let Some(registration) = registration {
            trace!("cancelling {}", token);
            self.handle.remove(registration);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use calloop::EventLoop;

    use super::*;

    #[derive(Default)]
    struct Fired {
        tokens: Vec<TimerToken>,
    }

    fn dispatch_until<D>(
        event_loop: &mut EventLoop<'static, D>,
        data: &mut D,
        limit: Duration,
        done: impl Fn(&D) -> bool,
    ) {
        let deadline = Instant::now() + limit;
        while !done(data) && Instant::now() < deadline {
            event_loop
                .dispatch(Some(Duration::from_millis(5)), data)
                .unwrap();
        }
    }

    fn create_scheduler(event_loop: &EventLoop<'static, Fired>) -> CalloopScheduler<Fired> {
        CalloopScheduler::new(event_loop.handle(), |fired: &mut Fired, token| {
            fired.tokens.push(token)
        })
    }

    #[test]
    fn test_immediate_timer_fires_on_next_dispatch() {
        let mut event_loop = EventLoop::<'static, Fired>::try_new().unwrap();
        let mut scheduler = create_scheduler(&event_loop);
        let mut fired = Fired::default();

        let token = scheduler
            .schedule(TimerKind::AttachListeners, Duration::ZERO)
            .unwrap();
        assert!(fired.tokens.is_empty());

        dispatch_until(&mut event_loop, &mut fired, Duration::from_secs(1), |f| {
            !f.tokens.is_empty()
        });
        assert_eq!(fired.tokens, vec![token]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut event_loop = EventLoop::<'static, Fired>::try_new().unwrap();
        let mut scheduler = create_scheduler(&event_loop);
        let mut fired = Fired::default();

        let late = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(40))
            .unwrap();
        let early = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(10))
            .unwrap();
        assert_ne!(late, early);

        dispatch_until(&mut event_loop, &mut fired, Duration::from_secs(2), |f| {
            f.tokens.len() == 2
        });
        assert_eq!(fired.tokens, vec![early, late]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut event_loop = EventLoop::<'static, Fired>::try_new().unwrap();
        let mut scheduler = create_scheduler(&event_loop);
        let mut fired = Fired::default();

        let cancelled = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(10))
            .unwrap();
        let kept = scheduler
            .schedule(TimerKind::AutoHide, Duration::from_millis(30))
            .unwrap();
        scheduler.cancel(cancelled);
        assert_eq!(scheduler.pending_count(), 1);

        dispatch_until(&mut event_loop, &mut fired, Duration::from_secs(2), |f| {
            !f.tokens.is_empty()
        });
        event_loop
            .dispatch(Some(Duration::from_millis(30)), &mut fired)
            .unwrap();
        assert_eq!(fired.tokens, vec![kept]);

        // Cancelling twice or after firing is a no-op
        scheduler.cancel(cancelled);
        scheduler.cancel(kept);
    }
}
