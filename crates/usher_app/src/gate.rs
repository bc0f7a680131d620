//! Readiness gate
//!
//! Owns the loading screen's lifetime. The gate collects independent
//! readiness signals (minimum display timer, hero asset load, page mount)
//! and a hard fallback deadline into one monotonic answer: once
//! `is_loading` flips false it never flips back, and `can_animate` follows
//! after a settle delay so entrance animations never measure mid-reflow
//! layout.
//!
//! A new gate is constructed only on a full reload; in-app navigation
//! reuses the open gate.

use std::time::Duration;

use usher_core::{Countdown, GateConfig, StateTransitions};

// ============================================================================
// Readiness State Machine
// ============================================================================

/// The gate's readiness sub-signals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadinessState {
    pub min_timer_elapsed: bool,
    pub hero_asset_loaded: bool,
    pub page_mounted: bool,
    pub forced_timeout_fired: bool,
}

/// Events that advance the readiness state
#[derive(Clone, Copy, Debug)]
pub enum GateEvent {
    MinTimerElapsed,
    HeroAssetLoaded,
    PageMounted,
    ForcedTimeout,
}

impl StateTransitions for ReadinessState {
    type Event = GateEvent;

    fn on_event(&self, event: GateEvent) -> Option<Self> {
        let mut next = *self;
        match event {
            GateEvent::MinTimerElapsed if !self.min_timer_elapsed => {
                next.min_timer_elapsed = true;
            }
            GateEvent::HeroAssetLoaded if !self.hero_asset_loaded => {
                next.hero_asset_loaded = true;
            }
            GateEvent::PageMounted if !self.page_mounted => {
                next.page_mounted = true;
            }
            // The fallback is a recoverable degraded path: force every
            // sub-signal so the gate can never be stuck half-open.
            GateEvent::ForcedTimeout if !self.forced_timeout_fired => {
                next.min_timer_elapsed = true;
                next.hero_asset_loaded = true;
                next.page_mounted = true;
                next.forced_timeout_fired = true;
            }
            // Duplicate reports are no-ops, not errors
            _ => return None,
        }
        Some(next)
    }
}

impl ReadinessState {
    /// Whether the loading screen may come down
    pub fn can_finish(&self) -> bool {
        (self.min_timer_elapsed && self.hero_asset_loaded) || self.forced_timeout_fired
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Invoked once, on the loading `true -> false` edge
pub type LoadingChangedHook = Box<dyn FnMut(bool) + Send>;

/// The readiness gate
///
/// Driven by [`ReadinessGate::tick`]; signal reports may arrive between
/// ticks and take effect immediately.
pub struct ReadinessGate {
    state: ReadinessState,
    min_timer: Countdown,
    fallback_timer: Countdown,
    settle_timer: Option<Countdown>,
    settle: Duration,
    loading: bool,
    can_animate: bool,
    on_loading_changed: Option<LoadingChangedHook>,
}

impl ReadinessGate {
    pub fn new(config: &GateConfig) -> Self {
        let mut state = ReadinessState::default();
        // Routes without a hero asset have nothing to wait for
        if !config.hero_expected {
            state.hero_asset_loaded = true;
        }
        Self {
            state,
            min_timer: Countdown::new(config.min_display()),
            fallback_timer: Countdown::new(config.fallback()),
            settle_timer: None,
            settle: config.settle(),
            loading: true,
            can_animate: false,
            on_loading_changed: None,
        }
    }

    /// Hook invoked on the loading edge (the host toggles its loading
    /// overlay class here)
    pub fn set_loading_changed_hook(&mut self, hook: impl FnMut(bool) + Send + 'static) {
        self.on_loading_changed = Some(Box::new(hook));
    }

    /// Report that the hero asset finished decoding. Idempotent.
    pub fn report_hero_image_loaded(&mut self) {
        if self.state.apply(GateEvent::HeroAssetLoaded) {
            tracing::debug!("hero asset loaded");
        }
        self.refresh();
    }

    /// Report that the page's content tree mounted. Idempotent.
    pub fn report_page_mounted(&mut self) {
        if self.state.apply(GateEvent::PageMounted) {
            tracing::debug!("page mounted");
        }
        self.refresh();
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// Whether the loading screen is still up. Monotonic: once false,
    /// always false.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether entrance animations may bind and measure. Monotonic.
    pub fn can_animate(&self) -> bool {
        self.can_animate
    }

    /// Advance the gate's timers
    pub fn tick(&mut self, dt: Duration) {
        if self.min_timer.tick(dt) {
            self.state.apply(GateEvent::MinTimerElapsed);
        }
        if self.fallback_timer.tick(dt) && self.state.apply(GateEvent::ForcedTimeout) {
            tracing::debug!("readiness fallback fired, forcing loading to finish");
        }
        self.refresh();

        if let Some(settle) = &mut self.settle_timer {
            if settle.tick(dt) {
                self.can_animate = true;
                tracing::debug!("settle elapsed, animations unlocked");
            }
        }
    }

    /// Close the gate if the sub-signals allow it
    fn refresh(&mut self) {
        if !self.loading || !self.state.can_finish() {
            return;
        }
        self.loading = false;
        self.min_timer.cancel();
        self.fallback_timer.cancel();
        self.settle_timer = Some(Countdown::new(self.settle));
        tracing::info!(forced = self.state.forced_timeout_fired, "loading finished");
        if let Some(hook) = &mut self.on_loading_changed {
            hook(false);
        }
    }
}
