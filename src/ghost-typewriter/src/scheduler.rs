//! Timer scheduling port.
//!
//! The driver never touches a clock directly. It asks a [`Scheduler`] for a
//! repeating timer and keeps the returned [`TimerHandle`]; cancelling or
//! dropping the handle guarantees no further ticks.
//!
//! Two adapters are provided:
//! - [`ManualScheduler`]: a virtual clock pumped by the caller. Tests use it
//!   to drive ticks deterministically and frame-loop hosts pump it once per
//!   frame.
//! - [`TokioScheduler`]: real time on a tokio `LocalSet`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Smallest interval a timer will repeat at.
pub const MIN_INTERVAL: Duration = Duration::from_micros(100);

/// Number of recent intervals [`ManualScheduler`] remembers.
const SCHEDULED_HISTORY: usize = 64;

/// Callback invoked on every timer tick.
pub type TickFn = Box<dyn FnMut()>;

/// Creates repeating timers.
pub trait Scheduler {
    /// Schedules `tick` to run every `interval` until the handle is
    /// cancelled or dropped. The first tick fires one interval from now.
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> Box<dyn TimerHandle>;
}

/// A live timer. Dropping the handle cancels the timer.
pub trait TimerHandle {
    /// Stops the timer. Idempotent.
    fn cancel(&self);

    /// Returns `true` once the timer will not fire again.
    fn is_cancelled(&self) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> Box<dyn TimerHandle> {
        (**self).schedule_repeating(interval, tick)
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    interval.max(MIN_INTERVAL)
}

// ============================================================================
// Manual scheduler
// ============================================================================

struct ManualTimer {
    id: u64,
    interval: Duration,
    next_due: Duration,
    cancelled: Rc<Cell<bool>>,
    callback: Rc<RefCell<TickFn>>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    timers: Vec<ManualTimer>,
    scheduled: VecDeque<Duration>,
}

impl ManualInner {
    fn prune(&mut self) {
        self.timers.retain(|timer| !timer.cancelled.get());
    }
}

/// Deterministic scheduler driven by an explicit virtual clock.
///
/// Clones share the same clock and timer set. Ticks are dispatched with no
/// internal borrow held, so a tick may schedule or cancel timers.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of timers that can still fire.
    pub fn active_timers(&self) -> usize {
        self.inner
            .borrow()
            .timers
            .iter()
            .filter(|timer| !timer.cancelled.get())
            .count()
    }

    /// Intervals of the most recently scheduled timers, oldest first. Only
    /// the last 64 are kept.
    pub fn scheduled_intervals(&self) -> Vec<Duration> {
        self.inner.borrow().scheduled.iter().copied().collect()
    }

    /// Number of timers scheduled since creation.
    pub fn scheduled_count(&self) -> u64 {
        self.inner.borrow().next_id
    }

    /// Fires every live timer once, in creation order, without moving the
    /// clock. Timers created during this call wait for the next one.
    /// Returns the number of ticks delivered.
    pub fn tick(&self) -> usize {
        let ids: Vec<u64> = {
            let mut inner = self.inner.borrow_mut();
            inner.prune();
            inner.timers.iter().map(|timer| timer.id).collect()
        };

        let mut fired = 0;
        for id in ids {
            if self.fire(id) {
                fired += 1;
            }
        }
        fired
    }

    /// Fires `count` rounds of [`ManualScheduler::tick`].
    pub fn tick_n(&self, count: usize) -> usize {
        (0..count).map(|_| self.tick()).sum()
    }

    /// Moves the clock forward, firing timers in due order (ties by creation
    /// order). Returns the number of ticks delivered.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                inner.prune();
                let due = inner
                    .timers
                    .iter()
                    .filter(|timer| timer.next_due <= target)
                    .min_by_key(|timer| (timer.next_due, timer.id))
                    .map(|timer| (timer.id, timer.next_due));
                if let Some((_, due)) = due {
                    inner.now = due;
                }
                due
            };

            let Some((id, _)) = next else {
                break;
            };
            if self.fire(id) {
                fired += 1;
            }
        }

        self.inner.borrow_mut().now = target;
        fired
    }

    fn fire(&self, id: u64) -> bool {
        let callback = {
            let mut inner = self.inner.borrow_mut();
            let Some(timer) = inner
                .timers
                .iter_mut()
                .find(|timer| timer.id == id && !timer.cancelled.get())
            else {
                return false;
            };
            timer.next_due += timer.interval;
            Rc::clone(&timer.callback)
        };

        let mut tick = callback.borrow_mut();
        (*tick)();
        true
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: TickFn) -> Box<dyn TimerHandle> {
        let interval = clamp_interval(interval);
        let cancelled = Rc::new(Cell::new(false));

        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let next_due = inner.now + interval;
        if inner.scheduled.len() == SCHEDULED_HISTORY {
            inner.scheduled.pop_front();
        }
        inner.scheduled.push_back(interval);
        inner.timers.push(ManualTimer {
            id,
            interval,
            next_due,
            cancelled: Rc::clone(&cancelled),
            callback: Rc::new(RefCell::new(tick)),
        });

        Box::new(ManualTimerHandle { cancelled })
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("active_timers", &self.active_timers())
            .finish()
    }
}

struct ManualTimerHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&self) {
        self.cancelled.set(true);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Drop for ManualTimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tokio scheduler
// ============================================================================

/// Real-time scheduler backed by `tokio::time::interval`.
///
/// Ticks run on the current thread through `spawn_local`, so every call to
/// [`Scheduler::schedule_repeating`] must happen inside a `tokio::task::LocalSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, mut tick: TickFn) -> Box<dyn TimerHandle> {
        let interval = clamp_interval(interval);
        let cancelled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&cancelled);

        let task = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if flag.get() {
                    break;
                }
                tick();
            }
        });

        Box::new(TokioTimerHandle { task, cancelled })
    }
}

struct TokioTimerHandle {
    task: JoinHandle<()>,
    cancelled: Rc<Cell<bool>>,
}

impl TimerHandle for TokioTimerHandle {
    fn cancel(&self) {
        self.cancelled.set(true);
        self.task.abort();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
