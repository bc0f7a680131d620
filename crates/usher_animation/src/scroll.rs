//! Programmatic scroll controller
//!
//! A thin wrapper around spring-smoothed scrolling that keeps the
//! scroll-linked animation engine honest: every tick (and every on-demand
//! `resync`) pushes the current offset into the governor so trigger
//! boundaries stay correct relative to the live position.
//!
//! The controller is safe to use before layout is known: commands issued
//! before [`ScrollController::set_bounds`] are queued and replayed once
//! bounds arrive, never dropped and never a panic.

use std::collections::HashMap;
use std::time::Duration;

use usher_core::config::ScrollConfig;
use usher_core::{Result, UsherError};

use crate::easing::Easing;
use crate::governor::GovernorHandle;
use crate::spring::{Spring, SpringConfig};

/// Reserved top-of-page anchor
pub const HERO_ANCHOR: &str = "hero";

/// Where to scroll
#[derive(Clone, Debug, PartialEq)]
pub enum ScrollTarget {
    /// Absolute document offset
    Offset(f32),
    /// A named anchor registered via `set_anchor`
    Anchor(String),
}

/// How to scroll
#[derive(Clone, Copy, Debug)]
pub struct ScrollOptions {
    /// Jump without animating
    pub immediate: bool,
    /// Extra offset applied after target resolution (e.g. fixed header)
    pub offset: f32,
    /// Fixed-duration eased glide instead of the default spring
    pub duration: Option<Duration>,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            immediate: false,
            offset: 0.0,
            duration: None,
        }
    }
}

/// An eased, fixed-duration glide (used when callers pass a duration)
#[derive(Clone, Copy, Debug)]
struct TimedGlide {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
}

impl TimedGlide {
    fn value(&self) -> f32 {
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * Easing::CubicOut.apply(t)
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Spring-smoothed programmatic scrolling
pub struct ScrollController {
    /// Current document offset (0 = top)
    offset: f32,
    /// Active spring glide, if any
    spring: Option<Spring>,
    /// Active timed glide, if any (mutually exclusive with `spring`)
    timed: Option<TimedGlide>,
    /// Named anchor -> document offset
    anchors: HashMap<String, f32>,
    /// (viewport_height, content_height) once layout is known
    bounds: Option<(f32, f32)>,
    /// Commands issued before bounds were known
    pending: Vec<(ScrollTarget, ScrollOptions)>,
    governor: GovernorHandle,
    spring_config: SpringConfig,
}

impl ScrollController {
    pub fn new(config: &ScrollConfig, governor: GovernorHandle) -> Self {
        let mut anchors = HashMap::new();
        anchors.insert(HERO_ANCHOR.to_string(), 0.0);
        Self {
            offset: 0.0,
            spring: None,
            timed: None,
            anchors,
            bounds: None,
            pending: Vec::new(),
            governor,
            spring_config: SpringConfig::new(config.stiffness, config.damping, 1.0),
        }
    }

    /// Provide (or update) layout bounds; replays any queued commands
    pub fn set_bounds(&mut self, viewport_height: f32, content_height: f32) {
        self.bounds = Some((viewport_height, content_height));
        self.offset = self.offset.clamp(0.0, self.max_offset());

        let pending = std::mem::take(&mut self.pending);
        for (target, opts) in pending {
            // Queued while uninitialized, so failures can only be unknown
            // anchors; those are logged and skipped rather than lost as Err.
            if let Err(e) = self.scroll_to(target, opts) {
                tracing::warn!("dropping queued scroll command: {e}");
            }
        }
    }

    /// Register a named anchor at a document offset
    pub fn set_anchor(&mut self, name: impl Into<String>, offset: f32) {
        self.anchors.insert(name.into(), offset);
    }

    /// Current scroll offset
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether a programmatic glide is in flight
    pub fn is_animating(&self) -> bool {
        self.spring.is_some() || self.timed.is_some()
    }

    fn max_offset(&self) -> f32 {
        match self.bounds {
            Some((viewport, content)) => (content - viewport).max(0.0),
            None => 0.0,
        }
    }

    fn resolve(&self, target: &ScrollTarget, opts: &ScrollOptions) -> Result<f32> {
        let base = match target {
            ScrollTarget::Offset(y) => *y,
            ScrollTarget::Anchor(name) => *self
                .anchors
                .get(name)
                .ok_or_else(|| UsherError::UnknownAnchor(name.clone()))?,
        };
        Ok((base + opts.offset).clamp(0.0, self.max_offset()))
    }

    /// Scroll to a target
    ///
    /// Queues the command if layout bounds are not known yet.
    pub fn scroll_to(&mut self, target: ScrollTarget, opts: ScrollOptions) -> Result<()> {
        if self.bounds.is_none() {
            tracing::debug!(?target, "scroll engine not ready, queueing command");
            self.pending.push((target, opts));
            return Ok(());
        }

        let destination = self.resolve(&target, &opts)?;

        if opts.immediate {
            self.spring = None;
            self.timed = None;
            self.offset = destination;
            self.resync();
            return Ok(());
        }

        match opts.duration {
            Some(duration) if !duration.is_zero() => {
                self.spring = None;
                self.timed = Some(TimedGlide {
                    from: self.offset,
                    to: destination,
                    elapsed: Duration::ZERO,
                    duration,
                });
            }
            _ => {
                self.timed = None;
                let mut spring = self
                    .spring
                    .unwrap_or_else(|| Spring::new(self.spring_config, self.offset));
                spring.set_target(destination);
                self.spring = Some(spring);
            }
        }
        Ok(())
    }

    /// Scroll to the reserved top-of-page anchor
    pub fn scroll_to_hero(&mut self) -> Result<()> {
        self.scroll_to(
            ScrollTarget::Anchor(HERO_ANCHOR.to_string()),
            ScrollOptions::default(),
        )
    }

    /// Advance glides and push the offset into the governor
    pub fn tick(&mut self, dt: Duration) {
        if let Some(glide) = self.timed.as_mut() {
            glide.elapsed += dt;
            self.offset = glide.value();
            if glide.done() {
                self.offset = glide.to;
                self.timed = None;
            }
        } else if let Some(spring) = self.spring.as_mut() {
            spring.step(dt.as_secs_f32());
            self.offset = spring.value();
            if spring.is_settled() {
                self.offset = spring.target();
                self.spring = None;
            }
        }

        self.offset = self.offset.clamp(0.0, self.max_offset());
        self.resync();
    }

    /// Push the current offset into the governor on demand
    pub fn resync(&self) {
        self.governor.sync_scroll(self.offset);
    }
}
