//! Generation tokens for stale-callback rejection
//!
//! Each transition cycle stamps a [`Generation`] before it swaps content.
//! Asynchronous completions (a page's ready signal, a deferred scroll
//! correction) carry the generation they were issued under; if the counter
//! has moved on, the completion is silently dropped instead of acting on a
//! torn-down cycle.

/// An opaque, monotonically increasing cycle token
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation live before any cycle has started
    pub const INITIAL: Generation = Generation(0);

    /// Raw counter value, for logging
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Issues generations, one per cycle
///
/// The counter only moves forward; equality against the current value is
/// the staleness check.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: u64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation of the cycle currently in flight
    pub fn current(&self) -> Generation {
        Generation(self.current)
    }

    /// Start a new cycle, invalidating all tokens issued before it
    pub fn advance(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    /// Check whether a token belongs to the live cycle
    pub fn is_current(&self, token: Generation) -> bool {
        token.0 == self.current
    }
}
