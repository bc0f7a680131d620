//! Tick-driven one-shot timers
//!
//! All timing in the engine is advanced by the host loop passing `dt` into
//! `tick`, never by reading a wall clock. That keeps every timer-dependent
//! state machine deterministic under test: tests advance time explicitly
//! and assert on the exact tick a timer fires.

use std::time::Duration;

/// A cancelable one-shot countdown
///
/// Created armed; [`Countdown::tick`] returns true exactly once, on the
/// tick that crosses the deadline. A canceled or already-fired countdown
/// never fires again.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: Duration,
    state: CountdownState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountdownState {
    Running,
    Fired,
    Canceled,
}

impl Countdown {
    /// Start a countdown that fires after `duration`
    pub fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
            state: CountdownState::Running,
        }
    }

    /// Advance by `dt`; returns true on the tick the countdown expires
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.state != CountdownState::Running {
            return false;
        }
        if dt >= self.remaining {
            self.remaining = Duration::ZERO;
            self.state = CountdownState::Fired;
            true
        } else {
            self.remaining -= dt;
            false
        }
    }

    /// Stop the countdown; it will never fire
    pub fn cancel(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Canceled;
        }
    }

    /// Whether the countdown has fired
    pub fn fired(&self) -> bool {
        self.state == CountdownState::Fired
    }

    /// Whether the countdown is still pending
    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    /// Time left before expiry (zero once fired or canceled)
    pub fn remaining(&self) -> Duration {
        match self.state {
            CountdownState::Running => self.remaining,
            _ => Duration::ZERO,
        }
    }
}
