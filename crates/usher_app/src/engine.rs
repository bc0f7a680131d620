//! Engine facade
//!
//! Owns one of each component and wires them together. Shared-resource
//! policy: pages and sections only read gate state or call its two report
//! functions; the governor's registration table mutates only through its
//! own operations; scroll corrections flow sequencer -> engine -> scroll
//! controller, never directly.

use std::time::Duration;

use usher_animation::{
    bind_section, AnimationGovernor, GovernorHandle, ScrollOptions, ScrollTarget, SectionBinding,
    SectionTracks, TriggerConfig,
};
use usher_core::{EngineConfig, Generation, Result};

use crate::gate::ReadinessGate;
use crate::transition::{NavOptions, ScrollCorrection, TransitionSequencer};

/// The orchestration engine
///
/// The host loop calls [`Engine::tick`] once per frame with the elapsed
/// time; everything else reacts to reports and commands between ticks.
pub struct Engine {
    gate: ReadinessGate,
    sequencer: TransitionSequencer,
    governor: AnimationGovernor,
    scroll: usher_animation::ScrollController,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_location(config, "/")
    }

    pub fn with_location(config: EngineConfig, location: impl Into<String>) -> Self {
        let governor = AnimationGovernor::new(config.governor.clone());
        let scroll = usher_animation::ScrollController::new(&config.scroll, governor.handle());
        Self {
            gate: ReadinessGate::new(&config.gate),
            sequencer: TransitionSequencer::new(config.transition.clone(), location),
            governor,
            scroll,
        }
    }

    /// Advance every component by one frame
    ///
    /// Order matters: the gate first (readiness edges land before anything
    /// reads them), then the sequencer (its correction is applied to scroll
    /// this same frame), then scroll, then the governor's frame sample.
    pub fn tick(&mut self, dt: Duration) {
        self.gate.tick(dt);

        if let Some(correction) = self.sequencer.tick(dt) {
            self.apply_correction(correction);
        }

        self.scroll.tick(dt);
        self.governor.sample_frame(dt);
    }

    fn apply_correction(&mut self, correction: ScrollCorrection) {
        let opts = ScrollOptions {
            immediate: true,
            ..Default::default()
        };
        let result = match correction {
            ScrollCorrection::ToTop => self.scroll.scroll_to(ScrollTarget::Offset(0.0), opts),
            ScrollCorrection::ToAnchor(name) => {
                self.scroll.scroll_to(ScrollTarget::Anchor(name), opts)
            }
        };
        // A missing anchor downgrades to the default correction
        if let Err(e) = result {
            tracing::warn!("scroll correction failed ({e}), falling back to top");
            let _ = self.scroll.scroll_to(ScrollTarget::Offset(0.0), opts);
        }
    }

    // ===== Gate =====

    pub fn is_loading(&self) -> bool {
        self.gate.is_loading()
    }

    pub fn can_animate(&self) -> bool {
        self.gate.can_animate()
    }

    pub fn report_hero_image_loaded(&mut self) {
        self.gate.report_hero_image_loaded();
    }

    pub fn report_page_mounted(&mut self) {
        self.gate.report_page_mounted();
    }

    pub fn set_loading_changed_hook(&mut self, hook: impl FnMut(bool) + Send + 'static) {
        self.gate.set_loading_changed_hook(hook);
    }

    // ===== Transitions =====

    pub fn navigate(&mut self, location: impl Into<String>, opts: NavOptions) -> Generation {
        self.sequencer.navigate(location, opts)
    }

    /// The live cycle's page reports ready; the token is implied
    pub fn report_page_ready(&mut self) {
        let token = self.sequencer.current_token();
        self.sequencer.page_ready(token);
    }

    pub fn committed_location(&self) -> &str {
        self.sequencer.committed_location()
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.sequencer.overlay_opacity()
    }

    // ===== Scroll =====

    pub fn set_scroll_bounds(&mut self, viewport_height: f32, content_height: f32) {
        self.scroll.set_bounds(viewport_height, content_height);
    }

    pub fn set_anchor(&mut self, name: impl Into<String>, offset: f32) {
        self.scroll.set_anchor(name, offset);
    }

    pub fn scroll_to(&mut self, target: ScrollTarget, opts: ScrollOptions) -> Result<()> {
        self.scroll.scroll_to(target, opts)
    }

    pub fn scroll_to_hero(&mut self) -> Result<()> {
        self.scroll.scroll_to_hero()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    // ===== Animation =====

    /// Bind a section to the shared animation gating protocol
    pub fn bind_section(
        &self,
        scope: impl Into<usher_animation::ScopeId>,
        builder: impl Fn(&mut TriggerConfig) -> SectionTracks + Send + 'static,
        deps: u64,
    ) -> SectionBinding {
        bind_section(self.governor.handle(), scope, builder, deps)
    }

    pub fn governor_handle(&self) -> GovernorHandle {
        self.governor.handle()
    }

    /// Publish this engine's governor as the process-wide instance
    pub fn install_global_governor(&self) {
        usher_animation::set_global_governor(self.governor.handle());
    }
}
