//! Page transition sequencer
//!
//! One overlay covers the old content, the location swaps while the screen
//! is fully hidden, then the overlay reveals the new content. The sequencer
//! owns the phase machine and the overlay spring; it never touches scroll
//! state itself, it only emits a [`ScrollCorrection`] for the engine to
//! forward once the new page has both revealed and reported ready.
//!
//! Every `navigate` stamps a fresh generation token. Completions from an
//! abandoned cycle (a slow page's ready signal arriving after the visitor
//! navigated again) carry a stale token and are dropped.

use std::time::Duration;

use usher_animation::{Spring, SpringConfig};
use usher_core::{Countdown, Generation, GenerationCounter, StateTransitions, TransitionConfig};

// ============================================================================
// Phase Machine
// ============================================================================

/// Transition phases
///
/// `Covering` raises the overlay to opaque; `Entering` reveals it over the
/// new content. The committed location changes only at the
/// covering-to-entering boundary, while nothing is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Covering,
    Entering,
}

#[derive(Clone, Copy, Debug)]
pub enum PhaseEvent {
    Begin,
    Covered,
    Revealed,
}

impl StateTransitions for Phase {
    type Event = PhaseEvent;

    fn on_event(&self, event: PhaseEvent) -> Option<Self> {
        match (self, event) {
            // A new navigation restarts the cover from any phase
            (_, PhaseEvent::Begin) => Some(Phase::Covering),
            (Phase::Covering, PhaseEvent::Covered) => Some(Phase::Entering),
            (Phase::Entering, PhaseEvent::Revealed) => Some(Phase::Idle),
            _ => None,
        }
    }
}

// ============================================================================
// Navigation Options
// ============================================================================

/// Whether the visitor is moving forward or back through history
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavKind {
    #[default]
    Push,
    Back,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NavOptions {
    /// Swap immediately, never showing the overlay
    pub skip_transition: bool,
    pub kind: NavKind,
}

/// Where the viewport should land after a completed transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScrollCorrection {
    ToTop,
    ToAnchor(String),
}

// ============================================================================
// Sequencer
// ============================================================================

/// One in-flight navigation
struct Cycle {
    token: Generation,
    destination: String,
    correction: ScrollCorrection,
    /// The live page reported ready
    ready: bool,
    /// The overlay finished revealing (or was never shown)
    revealed: bool,
}

/// The page transition sequencer
pub struct TransitionSequencer {
    config: TransitionConfig,
    phase: Phase,
    /// Overlay opacity: 0 revealed, 1 covered
    overlay: Spring,
    cover_timer: Option<Countdown>,
    committed: String,
    cycle: Option<Cycle>,
    generations: GenerationCounter,
}

impl TransitionSequencer {
    pub fn new(config: TransitionConfig, initial_location: impl Into<String>) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            overlay: Spring::new(SpringConfig::overlay(), 0.0),
            cover_timer: None,
            committed: initial_location.into(),
            cycle: None,
            generations: GenerationCounter::new(),
        }
    }

    /// The location the visual layer should currently render
    pub fn committed_location(&self) -> &str {
        &self.committed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Overlay opacity in `[0, 1]`, for the visual layer
    pub fn overlay_opacity(&self) -> f32 {
        self.overlay.value().clamp(0.0, 1.0)
    }

    /// Token of the cycle currently in flight
    pub fn current_token(&self) -> Generation {
        self.generations.current()
    }

    /// Start a navigation to `location`
    ///
    /// Replaces any in-flight cycle; the overlay continues from its current
    /// opacity rather than snapping. Returns the new cycle's token.
    pub fn navigate(&mut self, location: impl Into<String>, opts: NavOptions) -> Generation {
        let location = location.into();
        let token = self.generations.advance();

        if let Some(old) = self.cycle.take() {
            tracing::debug!(
                abandoned = old.token.raw(),
                destination = %old.destination,
                "navigation superseded an in-flight cycle"
            );
        }

        // The correction is decided by the path being left, at the moment
        // of departure.
        let correction = match opts.kind {
            NavKind::Back => self
                .config
                .preserve_scroll
                .iter()
                .find(|rule| self.committed.starts_with(&rule.prefix))
                .map(|rule| ScrollCorrection::ToAnchor(rule.anchor.clone()))
                .unwrap_or(ScrollCorrection::ToTop),
            NavKind::Push => ScrollCorrection::ToTop,
        };

        tracing::info!(
            from = %self.committed,
            to = %location,
            token = token.raw(),
            skip = opts.skip_transition,
            "navigate"
        );

        if opts.skip_transition {
            // Immediate swap; the overlay is never shown for this cycle
            self.committed = location.clone();
            self.phase = Phase::Idle;
            self.cover_timer = None;
            self.overlay.set_immediate(0.0);
            self.cycle = Some(Cycle {
                token,
                destination: location,
                correction,
                ready: false,
                revealed: true,
            });
        } else {
            self.phase.apply(PhaseEvent::Begin);
            self.overlay.set_target(1.0);
            self.cover_timer = Some(Countdown::new(self.config.cover()));
            self.cycle = Some(Cycle {
                token,
                destination: location,
                correction,
                ready: false,
                revealed: false,
            });
        }

        token
    }

    /// The destination page finished mounting and is ready to be revealed
    ///
    /// Stale tokens are dropped silently.
    pub fn page_ready(&mut self, token: Generation) {
        if !self.generations.is_current(token) {
            tracing::trace!(token = token.raw(), "stale page ready ignored");
            return;
        }
        if let Some(cycle) = &mut self.cycle {
            cycle.ready = true;
        }
    }

    /// Advance the overlay and phase machine
    ///
    /// Returns the cycle's scroll correction on the tick both conditions
    /// are met: the overlay has revealed and the live page reported ready.
    pub fn tick(&mut self, dt: Duration) -> Option<ScrollCorrection> {
        self.overlay.step(dt.as_secs_f32());

        match self.phase {
            Phase::Idle => {}
            Phase::Covering => {
                let cover_elapsed = match &mut self.cover_timer {
                    Some(timer) => timer.tick(dt) || timer.fired(),
                    None => true,
                };
                if cover_elapsed && self.overlay.is_settled() {
                    // The only instant rendered content may change
                    if let Some(cycle) = &self.cycle {
                        self.committed = cycle.destination.clone();
                        tracing::debug!(location = %self.committed, "content swapped under cover");
                    }
                    self.phase.apply(PhaseEvent::Covered);
                    self.overlay.set_target(0.0);
                }
            }
            Phase::Entering => {
                if self.overlay.is_settled() {
                    self.phase.apply(PhaseEvent::Revealed);
                    if let Some(cycle) = &mut self.cycle {
                        cycle.revealed = true;
                    }
                }
            }
        }

        self.take_correction()
    }

    /// Emit the correction once per cycle, when revealed and ready
    fn take_correction(&mut self) -> Option<ScrollCorrection> {
        let done = self
            .cycle
            .as_ref()
            .is_some_and(|cycle| cycle.revealed && cycle.ready);
        if !done {
            return None;
        }
        let cycle = self.cycle.take()?;
        tracing::debug!(token = cycle.token.raw(), "transition cycle complete");
        Some(cycle.correction)
    }
}
