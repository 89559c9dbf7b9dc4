//! Frame clock and the bounded per-frame animation driver built on it.
//!
//! The host owns a [`FrameClock`] and calls [`FrameClock::tick`] once per
//! display refresh with a monotonic timestamp.  Anything that needs frames
//! subscribes and receives a [`Subscription`] guard; dropping the guard
//! unsubscribes.
//!
//! [`TimerAnimation`] runs a callback every frame for a fixed duration.  Its
//! time base starts when it is created, read from the clock's time source,
//! so a motion started between frames is already under way at the next
//! one.  It always reports a final
//! `on_tick(1.0, duration)` before `on_complete(true)`.  Cancelling (or
//! dropping the handle) fires `on_complete(false)` exactly once.
//!
//! Everything here is single-threaded: callbacks may start or cancel other
//! animations, including the one currently being ticked.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

type FrameCallback = Rc<RefCell<dyn FnMut(Instant)>>;
type TimeSource = Rc<dyn Fn() -> Instant>;

#[derive(Default)]
struct ClockInner {
    next_id: u64,
    callbacks: Vec<(u64, FrameCallback)>,
}

/// Shared handle to a display-refresh clock.  Cloning shares the clock.
#[derive(Clone)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
    time: TimeSource,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::with_time_source(Instant::now)
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose "now" comes from `source` instead of the system clock.
    /// The source must agree with the timestamps passed to [`tick`](Self::tick).
    pub fn with_time_source(source: impl Fn() -> Instant + 'static) -> Self {
        Self {
            inner: Rc::default(),
            time: Rc::new(source),
        }
    }

    /// Current time on this clock's time base.
    pub fn now(&self) -> Instant {
        (self.time)()
    }

    /// Register `callback` for every subsequent frame.
    pub fn subscribe(&self, callback: impl FnMut(Instant) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.callbacks.push((id, Rc::new(RefCell::new(callback))));
        Subscription {
            clock: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver one frame.
    ///
    /// Subscribers added during the frame start on the next one; subscribers
    /// removed during the frame are not called.
    pub fn tick(&self, now: Instant) {
        let snapshot: Vec<(u64, FrameCallback)> = self
            .inner
            .borrow()
            .callbacks
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        for (id, callback) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            // A callback that is already running (re-entrant tick) is skipped.
            if let Ok(mut f) = callback.try_borrow_mut() {
                (&mut *f)(now);
            }
        }
    }

    /// `true` when nothing is waiting for frames; hosts may stop ticking.
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().callbacks.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    fn is_subscribed(&self, id: u64) -> bool {
        self.inner.borrow().callbacks.iter().any(|(i, _)| *i == id)
    }
}

/// Guard for a frame subscription.  Unsubscribes on drop.
pub struct Subscription {
    clock: Weak<RefCell<ClockInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(clock) = self.clock.upgrade() else {
            return;
        };
        // Removing the entry drops the clock's reference to the callback; if
        // the callback is mid-call, the tick snapshot keeps it alive.
        let removed = {
            let mut inner = clock.borrow_mut();
            inner
                .callbacks
                .iter()
                .position(|(i, _)| *i == self.id)
                .map(|pos| inner.callbacks.remove(pos))
        };
        drop(removed);
    }
}

// ───────────────────────────────────────── timer animation ───

type OnTick = Box<dyn FnMut(f64, Duration)>;
type OnComplete = Box<dyn FnOnce(bool)>;

struct TimerState {
    duration: Duration,
    on_tick: Option<OnTick>,
    on_complete: Option<OnComplete>,
    started_at: Instant,
    running: bool,
    subscription: Option<Subscription>,
}

/// Handle to a running per-frame animation.  Dropping it cancels.
pub struct TimerAnimation {
    state: Rc<RefCell<TimerState>>,
}

impl TimerAnimation {
    /// Start ticking on `clock` for `duration`, counting from `clock.now()`.
    pub fn start(
        clock: &FrameClock,
        duration: Duration,
        on_tick: impl FnMut(f64, Duration) + 'static,
        on_complete: impl FnOnce(bool) + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(TimerState {
            duration,
            on_tick: Some(Box::new(on_tick)),
            on_complete: Some(Box::new(on_complete)),
            started_at: clock.now(),
            running: true,
            subscription: None,
        }));

        let weak = Rc::downgrade(&state);
        let subscription = clock.subscribe(move |now| {
            if let Some(state) = weak.upgrade() {
                Self::on_frame(&state, now);
            }
        });
        state.borrow_mut().subscription = Some(subscription);

        Self { state }
    }

    /// Like [`TimerAnimation::start`] with no per-frame work: a one-shot
    /// countdown.
    pub fn after(clock: &FrameClock, duration: Duration, on_complete: impl FnOnce(bool) + 'static) -> Self {
        Self::start(clock, duration, |_, _| {}, on_complete)
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Stop ticking and report `on_complete(false)`.  No-op once finished.
    pub fn cancel(&self) {
        Self::finish(&self.state, false);
    }

    fn on_frame(state: &Rc<RefCell<TimerState>>, now: Instant) {
        let (progress, elapsed, done) = {
            let mut s = state.borrow_mut();
            if !s.running {
                return;
            }
            let elapsed = now.saturating_duration_since(s.started_at);
            if elapsed >= s.duration {
                (1.0, s.duration, true)
            } else {
                (elapsed.as_secs_f64() / s.duration.as_secs_f64(), elapsed, false)
            }
        };

        // The callback may cancel this very animation, so it runs with the
        // state unborrowed.
        let mut on_tick = state.borrow_mut().on_tick.take();
        if let Some(f) = on_tick.as_mut() {
            f(progress, elapsed);
        }
        {
            let mut s = state.borrow_mut();
            if !s.running {
                return;
            }
            if s.on_tick.is_none() {
                s.on_tick = on_tick;
            }
        }

        if done {
            Self::finish(state, true);
        }
    }

    fn finish(state: &Rc<RefCell<TimerState>>, finished: bool) {
        let (subscription, completion) = {
            let mut s = state.borrow_mut();
            if !s.running {
                return;
            }
            s.running = false;
            s.on_tick = None;
            (s.subscription.take(), s.on_complete.take())
        };
        drop(subscription);
        if let Some(completion) = completion {
            completion(finished);
        }
    }
}

impl Drop for TimerAnimation {
    fn drop(&mut self) {
        Self::finish(&self.state, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// A clock whose time only moves when a frame is delivered.
    struct ManualClock {
        clock: FrameClock,
        now: Rc<Cell<Instant>>,
        t0: Instant,
    }

    impl ManualClock {
        fn new() -> Self {
            let t0 = Instant::now();
            let now = Rc::new(Cell::new(t0));
            let source = Rc::clone(&now);
            Self {
                clock: FrameClock::with_time_source(move || source.get()),
                now,
                t0,
            }
        }

        /// Move time without delivering a frame.
        fn set(&self, at: Duration) {
            self.now.set(self.t0 + at);
        }

        fn tick(&self, at: Duration) {
            self.set(at);
            self.clock.tick(self.t0 + at);
        }
    }

    #[derive(Default)]
    struct Log {
        ticks: RefCell<Vec<(f64, Duration)>>,
        completions: RefCell<Vec<bool>>,
    }

    fn start_logged(clock: &FrameClock, duration: Duration, log: &Rc<Log>) -> TimerAnimation {
        let tick_log = Rc::clone(log);
        let done_log = Rc::clone(log);
        TimerAnimation::start(
            clock,
            duration,
            move |p, t| tick_log.ticks.borrow_mut().push((p, t)),
            move |finished| done_log.completions.borrow_mut().push(finished),
        )
    }

    #[test]
    fn runs_to_completion_with_final_full_progress_tick() {
        let m = ManualClock::new();
        let log = Rc::new(Log::default());
        let anim = start_logged(&m.clock, ms(100), &log);

        for i in 0..=12 {
            m.tick(ms(i * 10));
        }

        let ticks = log.ticks.borrow();
        assert_eq!(ticks.first().copied(), Some((0.0, Duration::ZERO)));
        assert_eq!(ticks.last().copied(), Some((1.0, ms(100))));
        assert_eq!(ticks.iter().filter(|(p, _)| *p == 1.0).count(), 1);
        assert!(ticks.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(*log.completions.borrow(), vec![true]);
        assert!(!anim.is_running());
        assert!(m.clock.is_idle());
    }

    #[test]
    fn time_base_starts_at_creation_not_first_frame() {
        let m = ManualClock::new();
        m.tick(ms(0));
        m.set(ms(10));
        let log = Rc::new(Log::default());
        let _anim = start_logged(&m.clock, ms(100), &log);

        m.tick(ms(16));
        m.tick(ms(32));
        let ticks = log.ticks.borrow().clone();
        assert_eq!(ticks.iter().map(|(_, t)| *t).collect::<Vec<_>>(), vec![ms(6), ms(22)]);
        assert!((ticks[0].0 - 0.06).abs() < 1e-9);

        m.tick(ms(110));
        assert_eq!(*log.completions.borrow(), vec![true]);
    }

    #[test]
    fn cancel_fires_once_and_stops_ticking() {
        let m = ManualClock::new();
        let log = Rc::new(Log::default());
        let anim = start_logged(&m.clock, ms(500), &log);
        m.tick(ms(0));
        m.tick(ms(16));

        anim.cancel();
        anim.cancel();
        m.tick(ms(32));

        assert_eq!(log.ticks.borrow().len(), 2);
        assert_eq!(*log.completions.borrow(), vec![false]);
        assert!(m.clock.is_idle());
    }

    #[test]
    fn cancel_after_completion_is_noop() {
        let m = ManualClock::new();
        let log = Rc::new(Log::default());
        let anim = start_logged(&m.clock, ms(10), &log);
        m.tick(ms(0));
        m.tick(ms(20));
        anim.cancel();
        drop(anim);
        assert_eq!(*log.completions.borrow(), vec![true]);
    }

    #[test]
    fn dropping_handle_cancels_and_unsubscribes() {
        let clock = FrameClock::new();
        let log = Rc::new(Log::default());
        let anim = start_logged(&clock, ms(300), &log);
        assert_eq!(clock.subscriber_count(), 1);
        drop(anim);
        assert!(clock.is_idle());
        assert_eq!(*log.completions.borrow(), vec![false]);
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let m = ManualClock::new();
        let log = Rc::new(Log::default());
        let _anim = start_logged(&m.clock, Duration::ZERO, &log);
        m.tick(ms(0));
        assert_eq!(*log.ticks.borrow(), vec![(1.0, Duration::ZERO)]);
        assert_eq!(*log.completions.borrow(), vec![true]);
    }

    #[test]
    fn callback_may_cancel_its_own_animation() {
        let m = ManualClock::new();
        let slot: Rc<RefCell<Option<TimerAnimation>>> = Rc::new(RefCell::new(None));
        let completions = Rc::new(RefCell::new(Vec::new()));
        let ticks = Rc::new(Cell::new(0));

        let slot_in_tick = Rc::clone(&slot);
        let ticks_in_tick = Rc::clone(&ticks);
        let done = Rc::clone(&completions);
        let anim = TimerAnimation::start(
            &m.clock,
            ms(1000),
            move |_, _| {
                ticks_in_tick.set(ticks_in_tick.get() + 1);
                if let Some(anim) = slot_in_tick.borrow().as_ref() {
                    anim.cancel();
                }
            },
            move |finished| done.borrow_mut().push(finished),
        );
        *slot.borrow_mut() = Some(anim);

        m.tick(ms(0));
        m.tick(ms(16));
        assert_eq!(ticks.get(), 1);
        assert_eq!(*completions.borrow(), vec![false]);
    }

    #[test]
    fn completion_may_start_a_follow_up_animation() {
        let m = ManualClock::new();
        let follow_up: Rc<RefCell<Option<TimerAnimation>>> = Rc::new(RefCell::new(None));
        let follow_log = Rc::new(Log::default());

        let clock_for_completion = m.clock.clone();
        let slot = Rc::clone(&follow_up);
        let log = Rc::clone(&follow_log);
        let _first = TimerAnimation::after(&m.clock, ms(10), move |finished| {
            if finished {
                *slot.borrow_mut() = Some(start_logged(&clock_for_completion, ms(50), &log));
            }
        });

        m.tick(ms(0));
        m.tick(ms(10));
        assert!(follow_up.borrow().is_some());
        assert!(follow_log.ticks.borrow().is_empty());

        // Started during the 10 ms frame.
        m.tick(ms(20));
        assert_eq!(follow_log.ticks.borrow()[0].1, ms(10));
        m.tick(ms(60));
        assert_eq!(*follow_log.completions.borrow(), vec![true]);
    }
}
