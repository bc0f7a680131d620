//! Scroll-linked triggers
//!
//! A [`ScrollTrigger`] is a timeline whose play position is the scroll
//! offset, not the clock: the trigger owns a document-space band
//! `[start, end]`, and progress is where the current offset falls inside
//! that band. Each trigger carries one or more [`ValueTrack`]s (opacity,
//! vertical offset, anything scalar) evaluated against eased progress.
//!
//! Triggers are registered with the
//! [`AnimationGovernor`](crate::governor::AnimationGovernor), which drives
//! their progress from the scroll tick stream and may pin them to their
//! final state under reduced motion.

use smallvec::SmallVec;

use crate::easing::Easing;

/// Identifies the DOM subtree a trigger animates
///
/// No two live registrations may share a scope: the governor rejects
/// duplicates so a section can never accumulate two timelines for the
/// same content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ScopeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a value track within its trigger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackId(usize);

/// A scalar animated from `from` to `to` across the trigger band
#[derive(Clone, Copy, Debug)]
pub struct ValueTrack {
    pub from: f32,
    pub to: f32,
    pub easing: Easing,
}

/// Configuration for one scroll trigger
#[derive(Clone, Debug)]
pub struct TriggerConfig {
    /// The DOM subtree this trigger animates
    pub scope: ScopeId,
    /// Document offset where progress begins
    pub start: f32,
    /// Document offset where progress completes
    pub end: f32,
    tracks: SmallVec<[ValueTrack; 4]>,
}

impl TriggerConfig {
    /// Create a trigger spanning the document band `[start, end]`
    pub fn new(scope: impl Into<ScopeId>, start: f32, end: f32) -> Self {
        Self {
            scope: scope.into(),
            start,
            end,
            tracks: SmallVec::new(),
        }
    }

    /// Add a value track, returning its id for later lookup
    pub fn track(&mut self, from: f32, to: f32, easing: Easing) -> TrackId {
        self.tracks.push(ValueTrack { from, to, easing });
        TrackId(self.tracks.len() - 1)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// A live scroll-linked timeline
#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    config: TriggerConfig,
    /// Normalized position inside the band, driven by the governor
    progress: f32,
    /// Registration order; lower = older (used for degradation eviction)
    seq: u64,
    /// Reduced motion: hold the final state instead of animating
    pinned_final: bool,
}

impl ScrollTrigger {
    pub(crate) fn new(config: TriggerConfig, seq: u64, pinned_final: bool) -> Self {
        let progress = if pinned_final { 1.0 } else { 0.0 };
        Self {
            config,
            progress,
            seq,
            pinned_final,
        }
    }

    pub fn scope(&self) -> &ScopeId {
        &self.config.scope
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// Current normalized progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Recompute progress for a scroll offset
    pub(crate) fn sync(&mut self, offset: f32) {
        if self.pinned_final {
            return;
        }
        let span = self.config.end - self.config.start;
        self.progress = if span <= f32::EPSILON {
            // Degenerate band: fully revealed once the offset passes it
            if offset >= self.config.start {
                1.0
            } else {
                0.0
            }
        } else {
            ((offset - self.config.start) / span).clamp(0.0, 1.0)
        };
    }

    /// Replace the document band after a layout re-measure
    pub(crate) fn set_band(&mut self, start: f32, end: f32) {
        self.config.start = start;
        self.config.end = end;
    }

    /// Current value of a track at the trigger's progress
    pub fn value(&self, track: TrackId) -> Option<f32> {
        self.config.tracks.get(track.0).map(|t| {
            let eased = t.easing.apply(self.progress);
            t.from + (t.to - t.from) * eased
        })
    }

    /// Track values at progress zero, the hidden pre-reveal state
    pub fn initial_value(&self, track: TrackId) -> Option<f32> {
        self.config.tracks.get(track.0).map(|t| t.from)
    }

    /// Track values at progress one, the settled fully-revealed state
    pub fn final_value(&self, track: TrackId) -> Option<f32> {
        self.config.tracks.get(track.0).map(|t| t.to)
    }
}
