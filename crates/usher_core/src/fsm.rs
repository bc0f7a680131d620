//! Explicit state machines with typed events
//!
//! Small orchestration states (readiness, transition phases) are modeled as
//! enums that map an event to an optional next state:
//!
//! ```
//! use usher_core::StateTransitions;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq)]
//! enum Light {
//!     Red,
//!     Green,
//! }
//!
//! enum LightEvent {
//!     Go,
//!     Stop,
//! }
//!
//! impl StateTransitions for Light {
//!     type Event = LightEvent;
//!
//!     fn on_event(&self, event: LightEvent) -> Option<Self> {
//!         match (self, event) {
//!             (Light::Red, LightEvent::Go) => Some(Light::Green),
//!             (Light::Green, LightEvent::Stop) => Some(Light::Red),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut state = Light::Red;
//! state.apply(LightEvent::Go);
//! assert_eq!(state, Light::Green);
//! ```
//!
//! Returning `None` means the event is ignored in the current state, which
//! is exactly the behavior wanted for duplicate readiness reports and
//! late callbacks: no-op, not an error.

/// Map events to state transitions
///
/// Implemented by small state enums. `on_event` returns `Some(next)` for a
/// valid transition and `None` when the event does not apply to the current
/// state.
pub trait StateTransitions: Sized + Copy {
    /// The event type this machine reacts to
    type Event;

    /// Compute the next state for an event, if any
    fn on_event(&self, event: Self::Event) -> Option<Self>;

    /// Apply an event in place, returning true if the state changed
    fn apply(&mut self, event: Self::Event) -> bool {
        match self.on_event(event) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Toggle {
        Off,
        On,
    }

    enum ToggleEvent {
        Flip,
    }

    impl StateTransitions for Toggle {
        type Event = ToggleEvent;

        fn on_event(&self, event: ToggleEvent) -> Option<Self> {
            match (self, event) {
                (Toggle::Off, ToggleEvent::Flip) => Some(Toggle::On),
                (Toggle::On, ToggleEvent::Flip) => Some(Toggle::Off),
            }
        }
    }

    #[test]
    fn apply_changes_state() {
        let mut t = Toggle::Off;
        assert!(t.apply(ToggleEvent::Flip));
        assert_eq!(t, Toggle::On);
    }
}
