//! Debounced commits of free-text input.
//!
//! Typing produces a burst of input events. [`Debouncer`] turns that burst
//! into a single committed value: each input cancels the pending commit and
//! schedules a new one a full window later, so only the value present when
//! input goes quiet for a whole window is ever committed.
//!
//! The model is single-threaded and cooperative. Nothing runs in the
//! background: the event loop calls [`Debouncer::poll`] (for example when
//! [`Debouncer::next_deadline`] is reached) and receives the committed value,
//! if any. A value whose window ran out before the loop got round to polling
//! is still committed, ahead of anything typed after it. Time comes from a
//! [`Clock`], so tests drive it with a [`ManualClock`] instead of sleeping.

use std::{
    cell::Cell,
    collections::VecDeque,
    rc::Rc,
    time::{Duration, Instant},
};

/// Default quiescence window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

/// A source of the current time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Creates a clock stopped at the current instant.
    #[must_use]
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            now: Rc::new(Cell::new(origin)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Moves the clock to `elapsed` after its creation.
    ///
    /// The clock never goes backwards; earlier targets are ignored.
    pub fn set_elapsed(&self, elapsed: Duration) {
        let target = self.origin + elapsed;
        if target > self.now.get() {
            self.now.set(target);
        }
    }

    /// Time since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A cancellable one-shot deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    /// Arms the timer, replacing any previous deadline.
    pub const fn schedule(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Disarms the timer. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether the timer is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The armed deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms the timer and returns `true` if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Commits the latest input value once input has been quiet for a window.
#[derive(Debug)]
pub struct Debouncer<T, C = SystemClock> {
    clock: C,
    window: Duration,
    timer: Timer,
    pending: Option<T>,
    /// Values whose window elapsed before anyone polled, with their deadlines.
    ready: VecDeque<(Instant, T)>,
    torn_down: bool,
}

impl<T, C: Clock> Debouncer<T, C> {
    /// Creates a debouncer with the given quiescence window.
    pub const fn new(clock: C, window: Duration) -> Self {
        Self {
            clock,
            window,
            timer: Timer { deadline: None },
            pending: None,
            ready: VecDeque::new(),
            torn_down: false,
        }
    }

    /// Creates a debouncer with [`DEFAULT_WINDOW`].
    pub const fn with_default_window(clock: C) -> Self {
        Self::new(clock, DEFAULT_WINDOW)
    }

    /// Records an input event.
    ///
    /// Cancels the pending commit, if any, and schedules a new one for
    /// `value` a full window from now. Ignored after [`Debouncer::teardown`].
    ///
    /// If the pending value already went quiet for a whole window, it is
    /// queued for [`Debouncer::poll`] instead of being replaced.
    pub fn input(&mut self, value: T) {
        if self.torn_down {
            tracing::trace!("input after teardown ignored");
            return;
        }
        let now = self.clock.now();
        if let Some(deadline) = self.timer.deadline().filter(|&deadline| deadline <= now) {
            self.timer.cancel();
            if let Some(quiet) = self.pending.take() {
                tracing::trace!("quiescent value queued before next input");
                self.ready.push_back((deadline, quiet));
            }
        }
        self.timer.schedule(now + self.window);
        self.pending = Some(value);
    }

    /// Returns the next committed value, oldest first. A value is committed
    /// once a full window passed after it without further input. Each value
    /// is returned at most once.
    pub fn poll(&mut self) -> Option<T> {
        if let Some((_, value)) = self.ready.pop_front() {
            tracing::trace!("debounced value committed");
            return Some(value);
        }
        if self.timer.fire_if_due(self.clock.now()) {
            tracing::trace!("debounced value committed");
            self.pending.take()
        } else {
            None
        }
    }

    /// When the next commit becomes due, if one is pending. May lie in the
    /// past when a quiescent value is waiting to be polled.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.ready
            .front()
            .map(|(deadline, _)| *deadline)
            .or_else(|| self.timer.deadline())
    }

    /// Whether a commit is scheduled or waiting to be polled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.ready.is_empty() || self.timer.is_pending()
    }

    /// The most recent value not yet committed, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending
            .as_ref()
            .or_else(|| self.ready.back().map(|(_, value)| value))
    }

    /// Drops every uncommitted value, including those waiting to be polled.
    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.pending = None;
        self.ready.clear();
    }

    /// Cancels the pending commit and stops accepting input.
    ///
    /// After teardown [`Debouncer::poll`] never returns a value.
    pub fn teardown(&mut self) {
        self.cancel();
        self.torn_down = true;
    }

    /// The quiescence window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}
