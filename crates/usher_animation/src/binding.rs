//! Section animation bindings
//!
//! Every visual section gates its entrance animation the same way; this
//! module implements that protocol once so call sites never hand-roll it:
//!
//! 1. on construction the section's animated values are immediately in
//!    their *hidden* state (no flash of fully-visible content before the
//!    reveal)
//! 2. no scroll trigger is built until the readiness gate reports
//!    `can_animate`
//! 3. the trigger registers with the governor; a rejected registration
//!    (ceiling, duplicate scope) leaves the section in its final static
//!    state, visible but not animated
//! 4. dropping the binding, or changing the inputs the timeline depends on
//!    (e.g. translated copy that reflows layout), tears the old trigger
//!    down before a new one is built, so duplicate handles for the same
//!    scope can never accumulate
//!
//! All teardown paths converge on one `release` routine.

use std::time::Duration;

use usher_core::Countdown;

use crate::governor::{GovernorHandle, TriggerRegistration};
use crate::trigger::{ScopeId, ScrollTrigger, TrackId, TriggerConfig};

/// The two values every section reveal animates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedState {
    pub opacity: f32,
    pub translate_y: f32,
}

/// Track ids returned by a section's timeline builder
#[derive(Clone, Copy, Debug)]
pub struct SectionTracks {
    pub opacity: TrackId,
    pub translate_y: TrackId,
}

/// Timeline builder: configures the band and tracks for one section
pub type TimelineBuilder = Box<dyn Fn(&mut TriggerConfig) -> SectionTracks + Send>;

#[derive(Debug)]
enum BindingPhase {
    /// Gate not ready; section held at its hidden state
    Hidden,
    /// Gate ready; waiting out the stagger delay
    Delayed(Countdown),
    /// Trigger live with the governor
    Bound {
        registration: TriggerRegistration,
        tracks: SectionTracks,
    },
    /// Registration rejected or evicted; final state, no animation
    Static,
}

/// One section's gated scroll animation
pub struct SectionBinding {
    scope: ScopeId,
    governor: GovernorHandle,
    builder: TimelineBuilder,
    phase: BindingPhase,
    /// Fingerprint of layout-affecting inputs; a change forces a rebind
    deps: u64,
    /// Entrance offset within a staggered group
    stagger: Duration,
    /// Hidden values, captured synchronously at construction
    hidden: AppliedState,
    /// Final values, for static fallback
    settled: AppliedState,
}

/// Bind a section to the shared gating protocol
///
/// The builder runs immediately (to capture the hidden initial state) and
/// again whenever the trigger is (re)built.
pub fn bind_section(
    governor: GovernorHandle,
    scope: impl Into<ScopeId>,
    builder: impl Fn(&mut TriggerConfig) -> SectionTracks + Send + 'static,
    deps: u64,
) -> SectionBinding {
    SectionBinding::new(governor, scope.into(), Box::new(builder), deps)
}

impl SectionBinding {
    fn new(
        governor: GovernorHandle,
        scope: ScopeId,
        builder: TimelineBuilder,
        deps: u64,
    ) -> Self {
        // Evaluate the timeline once, without registering, so the hidden
        // and settled states are known before first paint.
        let mut config = TriggerConfig::new(scope.clone(), 0.0, 0.0);
        let tracks = (builder)(&mut config);
        let preview = ScrollTrigger::new(config, 0, false);
        let hidden = AppliedState {
            opacity: preview.initial_value(tracks.opacity).unwrap_or(0.0),
            translate_y: preview.initial_value(tracks.translate_y).unwrap_or(0.0),
        };
        let settled = AppliedState {
            opacity: preview.final_value(tracks.opacity).unwrap_or(1.0),
            translate_y: preview.final_value(tracks.translate_y).unwrap_or(0.0),
        };

        Self {
            scope,
            governor,
            builder,
            phase: BindingPhase::Hidden,
            deps,
            stagger: Duration::ZERO,
            hidden,
            settled,
        }
    }

    /// Offset this section's reveal within a staggered group
    pub fn with_stagger(mut self, delay: Duration) -> Self {
        self.stagger = delay;
        self
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// Whether a trigger is currently live
    pub fn is_bound(&self) -> bool {
        matches!(self.phase, BindingPhase::Bound { .. })
    }

    /// Update the dependency fingerprint; a change unbinds the old trigger
    /// before the next update builds a fresh one
    pub fn set_dependencies(&mut self, deps: u64) {
        if deps == self.deps {
            return;
        }
        self.deps = deps;
        if self.is_bound() {
            tracing::debug!(scope = %self.scope, "binding inputs changed, rebinding");
            self.release();
            // Skip the stagger on rebind: the section is already revealed,
            // it just needs fresh measurements.
            self.phase = BindingPhase::Delayed(Countdown::new(Duration::ZERO));
        }
    }

    /// Advance the protocol one frame
    pub fn update(&mut self, can_animate: bool, dt: Duration) {
        match &mut self.phase {
            BindingPhase::Hidden => {
                if can_animate {
                    self.phase = BindingPhase::Delayed(Countdown::new(self.stagger));
                    // A zero stagger binds on this same frame
                    self.update(can_animate, Duration::ZERO);
                }
            }
            BindingPhase::Delayed(countdown) => {
                if countdown.tick(dt) || countdown.fired() {
                    self.bind();
                }
            }
            BindingPhase::Bound { registration, .. } => {
                // The governor may have evicted us while degrading
                if !registration.is_live() {
                    tracing::debug!(scope = %self.scope, "trigger evicted, falling back to static");
                    self.release();
                    self.phase = BindingPhase::Static;
                }
            }
            BindingPhase::Static => {}
        }
    }

    fn bind(&mut self) {
        let mut config = TriggerConfig::new(self.scope.clone(), 0.0, 0.0);
        let tracks = (self.builder)(&mut config);

        match self.governor.register(config) {
            Some(registration) => {
                self.phase = BindingPhase::Bound {
                    registration,
                    tracks,
                };
            }
            None => {
                // Rejected: render revealed, skip the animation entirely
                self.phase = BindingPhase::Static;
            }
        }
    }

    /// The values the visual layer should apply this frame
    pub fn applied(&self) -> AppliedState {
        match &self.phase {
            BindingPhase::Hidden | BindingPhase::Delayed(_) => self.hidden,
            BindingPhase::Bound {
                registration,
                tracks,
            } => AppliedState {
                opacity: registration.value(tracks.opacity).unwrap_or(self.settled.opacity),
                translate_y: registration
                    .value(tracks.translate_y)
                    .unwrap_or(self.settled.translate_y),
            },
            BindingPhase::Static => self.settled,
        }
    }

    /// The single teardown routine: drop the live registration, if any
    fn release(&mut self) {
        if let BindingPhase::Bound { .. } =
            std::mem::replace(&mut self.phase, BindingPhase::Hidden)
        {
            // Dropping the registration unregisters through the governor
        }
    }
}

impl Drop for SectionBinding {
    fn drop(&mut self) {
        self.release();
    }
}
