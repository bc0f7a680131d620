//! Animation governor
//!
//! The single mutation funnel for scroll-linked animation state. Every
//! section that wants a scroll trigger registers here; the governor
//! enforces a concurrency ceiling, watches the frame rate, and degrades
//! gracefully when the host cannot keep up:
//!
//! - `register` rejects (returns `None`) once the ceiling is reached or
//!   when a live registration already claims the same scope; a rejected
//!   section simply renders in its final static state
//! - `sample_frame` keeps a rolling frame-time window; sustained low FPS
//!   across the debounce window triggers one degradation step
//! - `degrade` lowers the ceiling, evicts the oldest live triggers (at
//!   least half, and always down to the new ceiling), and flags a full
//!   measurement refresh (removing triggers changes layout bounds for
//!   everything that remains)
//! - reduced motion (user preference or forced by repeated degradation)
//!   pins new registrations to their final state instead of animating
//!
//! The governor lives for the process lifetime. It is created once by the
//! application shell and passed around as a weak [`GovernorHandle`]; an
//! optional global accessor exists for call sites without context.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};
use usher_core::config::GovernorConfig;

use crate::trigger::{ScopeId, ScrollTrigger, TrackId, TriggerConfig};

// ============================================================================
// Global Governor State
// ============================================================================

/// Global governor handle for access from anywhere in the application
static GLOBAL_GOVERNOR: OnceLock<GovernorHandle> = OnceLock::new();

/// Set the global governor handle
///
/// Called once at startup by the application shell after the governor is
/// constructed.
///
/// # Panics
///
/// Panics if called more than once.
pub fn set_global_governor(handle: GovernorHandle) {
    if GLOBAL_GOVERNOR.set(handle).is_err() {
        panic!("set_global_governor() called more than once");
    }
}

/// Try to get the global governor (returns None if not initialized)
pub fn try_global_governor() -> Option<GovernorHandle> {
    GLOBAL_GOVERNOR.get().cloned()
}

new_key_type! {
    /// Handle to a registered scroll trigger
    pub struct TriggerId;
}

/// Internal state of the governor
struct GovernorInner {
    triggers: SlotMap<TriggerId, ScrollTrigger>,
    /// Live scope -> trigger, for duplicate-scope rejection
    scopes: HashMap<ScopeId, TriggerId>,
    /// Current registration ceiling (lowered by degradation)
    ceiling: usize,
    /// Registration order stamp
    next_seq: u64,
    /// User accessibility preference
    user_reduced_motion: bool,
    /// Forced after repeated degradation
    forced_reduced_motion: bool,
    /// Whether a degradation step has already run
    degraded: bool,
    /// Last scroll offset pushed by the controller
    last_offset: f32,
    /// Rolling frame-time window (seconds per frame)
    frame_samples: VecDeque<f32>,
    /// Time the FPS estimate has continuously been below threshold
    low_fps_for: Duration,
    /// Set by degrade(); consumed by the host to re-measure bands
    needs_measure_refresh: bool,
    config: GovernorConfig,
}

impl GovernorInner {
    fn fps_estimate(&self) -> Option<f32> {
        // Need at least half the window before the estimate means anything
        if self.frame_samples.len() < self.config.sample_window / 2 {
            return None;
        }
        let total: f32 = self.frame_samples.iter().sum();
        if total <= f32::EPSILON {
            return None;
        }
        Some(self.frame_samples.len() as f32 / total)
    }

    fn is_motion_reduced(&self) -> bool {
        self.user_reduced_motion || self.forced_reduced_motion
    }

    fn degrade(&mut self) {
        if self.degraded {
            // Already running at the degraded ceiling and still too slow:
            // stop animating entirely for anything registered from now on.
            tracing::warn!("sustained low fps after degradation, forcing reduced motion");
            self.forced_reduced_motion = true;
            return;
        }
        self.degraded = true;
        self.ceiling = self.config.degraded_ceiling.min(self.ceiling);

        // Evict at least the oldest half, and at least enough to get back
        // under the lowered ceiling: a full table must not stay over it.
        let mut live: Vec<(TriggerId, u64)> = self
            .triggers
            .iter()
            .map(|(id, t)| (id, t.seq()))
            .collect();
        live.sort_by_key(|&(_, seq)| seq);
        let evict_count = (live.len() / 2).max(live.len().saturating_sub(self.ceiling));
        tracing::warn!(
            evicted = evict_count,
            ceiling = self.ceiling,
            "low frame rate, degrading scroll animations"
        );
        for &(id, _) in live.iter().take(evict_count) {
            if let Some(trigger) = self.triggers.remove(id) {
                self.scopes.remove(trigger.scope());
            }
        }

        // Trigger bands were measured against the old layout; everything
        // left must re-measure.
        self.needs_measure_refresh = true;
    }
}

/// The animation governor
///
/// Typically owned by the application shell and shared via
/// [`GovernorHandle`]. All registration-table mutation goes through this
/// type's operations; no other component touches the table directly.
pub struct AnimationGovernor {
    inner: Arc<Mutex<GovernorInner>>,
}

impl AnimationGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GovernorInner {
                triggers: SlotMap::with_key(),
                scopes: HashMap::new(),
                ceiling: config.ceiling,
                next_seq: 0,
                user_reduced_motion: config.reduced_motion,
                forced_reduced_motion: false,
                degraded: false,
                last_offset: 0.0,
                frame_samples: VecDeque::with_capacity(config.sample_window),
                low_fps_for: Duration::ZERO,
                needs_measure_refresh: false,
                config,
            })),
        }
    }

    /// Get a weak handle for passing to components
    pub fn handle(&self) -> GovernorHandle {
        GovernorHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register a scroll trigger
    ///
    /// Returns `None` when the ceiling is reached or another live
    /// registration claims the same scope. The check and the insert happen
    /// under one lock acquisition, so near-simultaneous registrations
    /// cannot both pass a stale count.
    pub fn register(&self, config: TriggerConfig) -> Option<TriggerRegistration> {
        let mut inner = self.inner.lock().unwrap();

        if inner.triggers.len() >= inner.ceiling {
            tracing::debug!(scope = %config.scope, "trigger rejected: ceiling reached");
            return None;
        }
        if inner.scopes.contains_key(&config.scope) {
            tracing::warn!(scope = %config.scope, "trigger rejected: scope already registered");
            return None;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let pinned = inner.is_motion_reduced();
        let scope = config.scope.clone();
        let offset = inner.last_offset;

        let mut trigger = ScrollTrigger::new(config, seq, pinned);
        trigger.sync(offset);
        let id = inner.triggers.insert(trigger);
        inner.scopes.insert(scope, id);

        Some(TriggerRegistration {
            id,
            handle: self.handle(),
        })
    }

    /// Remove a trigger; unknown ids are a no-op
    pub fn unregister(&self, id: TriggerId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(trigger) = inner.triggers.remove(id) {
            inner.scopes.remove(trigger.scope());
        }
    }

    /// Feed one frame into the rolling FPS window
    ///
    /// Called every frame by the shell. When the estimate stays below the
    /// configured threshold for the whole debounce window, one degradation
    /// step runs and the window restarts.
    pub fn sample_frame(&self, dt: Duration) {
        let mut inner = self.inner.lock().unwrap();

        let window = inner.config.sample_window;
        if inner.frame_samples.len() == window {
            inner.frame_samples.pop_front();
        }
        inner.frame_samples.push_back(dt.as_secs_f32());

        match inner.fps_estimate() {
            Some(fps) if fps < inner.config.low_fps_threshold => {
                inner.low_fps_for += dt;
                if inner.low_fps_for >= inner.config.low_fps_debounce() {
                    inner.degrade();
                    inner.low_fps_for = Duration::ZERO;
                }
            }
            _ => inner.low_fps_for = Duration::ZERO,
        }
    }

    /// Drive every live trigger's progress from the scroll offset
    pub fn sync_scroll(&self, offset: f32) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_offset = offset;
        for (_, trigger) in inner.triggers.iter_mut() {
            trigger.sync(offset);
        }
    }

    /// Combined reduced-motion query: user preference or forced
    pub fn is_motion_reduced(&self) -> bool {
        self.inner.lock().unwrap().is_motion_reduced()
    }

    /// Update the user accessibility preference
    pub fn set_reduced_motion(&self, reduced: bool) {
        self.inner.lock().unwrap().user_reduced_motion = reduced;
    }

    /// Check and clear the measurement-refresh flag
    ///
    /// Degradation removes triggers, which changes layout bounds for the
    /// remainder. The host should re-measure and call
    /// [`AnimationGovernor::update_band`] for each surviving trigger when
    /// this returns true.
    pub fn take_measurement_refresh(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        std::mem::take(&mut inner.needs_measure_refresh)
    }

    /// Replace a trigger's document band after a re-measure
    pub fn update_band(&self, id: TriggerId, start: f32, end: f32) {
        let mut inner = self.inner.lock().unwrap();
        let offset = inner.last_offset;
        if let Some(trigger) = inner.triggers.get_mut(id) {
            trigger.set_band(start, end);
            trigger.sync(offset);
        }
    }

    /// Snapshot of the governor's bookkeeping
    pub fn stats(&self) -> GovernorStats {
        let inner = self.inner.lock().unwrap();
        GovernorStats {
            active: inner.triggers.len(),
            ceiling: inner.ceiling,
            degraded: inner.degraded,
            reduced_motion: inner.is_motion_reduced(),
            fps_estimate: inner.fps_estimate(),
        }
    }
}

/// Bookkeeping snapshot, for tests and debug overlays
#[derive(Clone, Debug)]
pub struct GovernorStats {
    pub active: usize,
    pub ceiling: usize,
    pub degraded: bool,
    pub reduced_motion: bool,
    pub fps_estimate: Option<f32>,
}

// ============================================================================
// Weak Handle
// ============================================================================

/// A weak handle to the governor
///
/// Passed to components that register triggers. It does not keep the
/// governor alive; every operation is a graceful no-op once the governor
/// is gone.
#[derive(Clone)]
pub struct GovernorHandle {
    inner: Weak<Mutex<GovernorInner>>,
}

impl GovernorHandle {
    fn with_governor<R>(&self, f: impl FnOnce(&AnimationGovernor) -> R) -> Option<R> {
        self.inner.upgrade().map(|inner| {
            let governor = AnimationGovernor { inner };
            f(&governor)
        })
    }

    /// Register a trigger (None if rejected or the governor is gone)
    pub fn register(&self, config: TriggerConfig) -> Option<TriggerRegistration> {
        self.with_governor(|g| g.register(config)).flatten()
    }

    /// Remove a trigger; idempotent
    pub fn unregister(&self, id: TriggerId) {
        self.with_governor(|g| g.unregister(id));
    }

    /// Push a scroll offset into every live trigger
    pub fn sync_scroll(&self, offset: f32) {
        self.with_governor(|g| g.sync_scroll(offset));
    }

    /// Combined reduced-motion query (false if the governor is gone)
    pub fn is_motion_reduced(&self) -> bool {
        self.with_governor(|g| g.is_motion_reduced())
            .unwrap_or(false)
    }

    /// Current value of a trigger's track
    pub fn value(&self, id: TriggerId, track: TrackId) -> Option<f32> {
        self.inner.upgrade().and_then(|inner| {
            inner
                .lock()
                .unwrap()
                .triggers
                .get(id)
                .and_then(|t| t.value(track))
        })
    }

    /// Current progress of a trigger
    pub fn progress(&self, id: TriggerId) -> Option<f32> {
        self.inner
            .upgrade()
            .and_then(|inner| inner.lock().unwrap().triggers.get(id).map(|t| t.progress()))
    }

    /// Whether a trigger is still live (survived degradation)
    pub fn is_live(&self, id: TriggerId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.lock().unwrap().triggers.contains_key(id))
            .unwrap_or(false)
    }

    /// Check whether the governor is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

// ============================================================================
// Registration RAII Handle
// ============================================================================

/// Owner's handle to a live trigger registration
///
/// The component that created the registration owns its lifecycle; the
/// governor keeps only weak bookkeeping. Dropping the registration
/// unregisters the trigger.
pub struct TriggerRegistration {
    id: TriggerId,
    handle: GovernorHandle,
}

impl TriggerRegistration {
    pub fn id(&self) -> TriggerId {
        self.id
    }

    /// Current value of one of this trigger's tracks
    pub fn value(&self, track: TrackId) -> Option<f32> {
        self.handle.value(self.id, track)
    }

    /// Current progress in `[0, 1]`
    pub fn progress(&self) -> Option<f32> {
        self.handle.progress(self.id)
    }

    /// Whether the trigger survived any degradation pass
    pub fn is_live(&self) -> bool {
        self.handle.is_live(self.id)
    }
}

impl Drop for TriggerRegistration {
    fn drop(&mut self) {
        self.handle.unregister(self.id);
    }
}

impl std::fmt::Debug for TriggerRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistration")
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn governor_with_ceiling(ceiling: usize) -> AnimationGovernor {
        AnimationGovernor::new(GovernorConfig {
            ceiling,
            degraded_ceiling: ceiling / 2,
            ..Default::default()
        })
    }

    fn fade(scope: &str) -> TriggerConfig {
        let mut config = TriggerConfig::new(scope, 0.0, 100.0);
        config.track(0.0, 1.0, Easing::Linear);
        config
    }

    #[test]
    fn ceiling_rejects_then_recovers() {
        let governor = governor_with_ceiling(3);

        let mut regs: Vec<_> = (0..3)
            .map(|i| governor.register(fade(&format!("s{i}"))).unwrap())
            .collect();

        // ceiling + 1 is rejected
        assert!(governor.register(fade("overflow")).is_none());

        // one unregister frees a slot
        drop(regs.remove(0));
        assert_eq!(governor.stats().active, 2);
        assert!(governor.register(fade("late")).is_some());
    }

    #[test]
    fn duplicate_scope_is_rejected() {
        let governor = governor_with_ceiling(8);
        let _first = governor.register(fade("hero")).unwrap();
        assert!(governor.register(fade("hero")).is_none());
    }

    #[test]
    fn unregister_is_idempotent() {
        let governor = governor_with_ceiling(8);
        let reg = governor.register(fade("hero")).unwrap();
        let id = reg.id();
        std::mem::forget(reg);

        governor.unregister(id);
        governor.unregister(id);
        assert_eq!(governor.stats().active, 0);

        // Scope is freed again
        assert!(governor.register(fade("hero")).is_some());
    }

    #[test]
    fn drop_unregisters() {
        let governor = governor_with_ceiling(8);
        {
            let _reg = governor.register(fade("hero")).unwrap();
            assert_eq!(governor.stats().active, 1);
        }
        assert_eq!(governor.stats().active, 0);
    }

    #[test]
    fn sync_scroll_drives_values() {
        let governor = governor_with_ceiling(8);
        let mut config = TriggerConfig::new("hero", 100.0, 200.0);
        let opacity = config.track(0.0, 1.0, Easing::Linear);
        let reg = governor.register(config).unwrap();

        governor.sync_scroll(150.0);
        assert_eq!(reg.value(opacity), Some(0.5));
    }

    #[test]
    fn low_fps_degrades_once_per_window() {
        let governor = AnimationGovernor::new(GovernorConfig {
            ceiling: 8,
            degraded_ceiling: 4,
            low_fps_threshold: 30.0,
            low_fps_debounce_ms: 500,
            sample_window: 10,
            reduced_motion: false,
        });

        let _regs: Vec<_> = (0..8)
            .map(|i| governor.register(fade(&format!("s{i}"))).unwrap())
            .collect();

        // 100ms frames = 10 fps, well below threshold. The debounce window
        // is 500ms, so degradation lands on the sample that crosses it.
        let mut degrade_count = 0;
        let mut last_active = 8;
        for _ in 0..10 {
            governor.sample_frame(Duration::from_millis(100));
            let active = governor.stats().active;
            if active < last_active {
                degrade_count += 1;
                last_active = active;
            }
        }

        assert_eq!(degrade_count, 1);
        let stats = governor.stats();
        assert!(stats.degraded);
        assert_eq!(stats.active, 4); // oldest half evicted
        assert_eq!(stats.ceiling, 4);
        assert!(governor.take_measurement_refresh());
        assert!(!governor.take_measurement_refresh());
    }

    #[test]
    fn degrade_evicts_oldest_registrations() {
        let governor = AnimationGovernor::new(GovernorConfig {
            ceiling: 4,
            degraded_ceiling: 2,
            low_fps_threshold: 30.0,
            low_fps_debounce_ms: 100,
            sample_window: 4,
            reduced_motion: false,
        });

        let regs: Vec<_> = (0..4)
            .map(|i| governor.register(fade(&format!("s{i}"))).unwrap())
            .collect();

        for _ in 0..6 {
            governor.sample_frame(Duration::from_millis(50));
        }

        // s0 and s1 registered first, so they were evicted
        assert!(!regs[0].is_live());
        assert!(!regs[1].is_live());
        assert!(regs[2].is_live());
        assert!(regs[3].is_live());
    }

    #[test]
    fn degrade_never_leaves_the_table_over_the_lowered_ceiling() {
        // Many more live triggers than twice the degraded ceiling, so
        // evicting only half would leave the table over the new limit.
        let governor = AnimationGovernor::new(GovernorConfig {
            ceiling: 12,
            degraded_ceiling: 2,
            low_fps_threshold: 30.0,
            low_fps_debounce_ms: 100,
            sample_window: 4,
            reduced_motion: false,
        });
        let _regs: Vec<_> = (0..12)
            .map(|i| governor.register(fade(&format!("s{i}"))).unwrap())
            .collect();

        for _ in 0..3 {
            governor.sample_frame(Duration::from_millis(50));
        }

        let stats = governor.stats();
        assert!(stats.degraded);
        assert_eq!(stats.ceiling, 2);
        assert_eq!(stats.active, 2);
        assert!(stats.active <= stats.ceiling);
    }

    #[test]
    fn rebanded_survivors_follow_the_new_layout() {
        let governor = AnimationGovernor::new(GovernorConfig {
            ceiling: 4,
            degraded_ceiling: 2,
            low_fps_threshold: 30.0,
            low_fps_debounce_ms: 100,
            sample_window: 4,
            reduced_motion: false,
        });

        let mut regs = Vec::new();
        let mut tracks = Vec::new();
        for i in 0..4 {
            let mut config = TriggerConfig::new(format!("s{i}"), 0.0, 100.0);
            tracks.push(config.track(0.0, 1.0, Easing::Linear));
            regs.push(governor.register(config).unwrap());
        }

        for _ in 0..3 {
            governor.sample_frame(Duration::from_millis(50));
        }
        assert!(governor.take_measurement_refresh());
        assert!(regs[3].is_live());

        // Eviction changed the document layout; re-measure the survivor
        // and drive it from its new band.
        governor.sync_scroll(600.0);
        governor.update_band(regs[3].id(), 500.0, 700.0);
        assert_eq!(regs[3].value(tracks[3]), Some(0.5));
        assert_eq!(regs[3].progress(), Some(0.5));
    }

    #[test]
    fn reduced_motion_pins_to_final_state() {
        let governor = AnimationGovernor::new(GovernorConfig {
            reduced_motion: true,
            ..Default::default()
        });

        let mut config = TriggerConfig::new("hero", 100.0, 200.0);
        let opacity = config.track(0.0, 1.0, Easing::Linear);
        let reg = governor.register(config).unwrap();

        // Never scrolled, but already at the final value
        assert_eq!(reg.value(opacity), Some(1.0));
        governor.sync_scroll(0.0);
        assert_eq!(reg.value(opacity), Some(1.0));
    }

    #[test]
    fn good_fps_resets_the_debounce_window() {
        let governor = AnimationGovernor::new(GovernorConfig {
            ceiling: 4,
            degraded_ceiling: 2,
            low_fps_threshold: 30.0,
            low_fps_debounce_ms: 400,
            sample_window: 8,
            reduced_motion: false,
        });
        let _regs: Vec<_> = (0..4)
            .map(|i| governor.register(fade(&format!("s{i}"))).unwrap())
            .collect();

        // Alternate slow and fast stretches; the low-fps accumulator never
        // reaches the debounce window.
        for _ in 0..4 {
            for _ in 0..3 {
                governor.sample_frame(Duration::from_millis(100));
            }
            for _ in 0..12 {
                governor.sample_frame(Duration::from_millis(10));
            }
        }

        assert!(!governor.stats().degraded);
        assert_eq!(governor.stats().active, 4);
    }

    #[test]
    fn handle_outlives_governor_gracefully() {
        let handle = {
            let governor = governor_with_ceiling(4);
            governor.handle()
        };

        assert!(!handle.is_alive());
        assert!(handle.register(fade("hero")).is_none());
        handle.sync_scroll(100.0); // no-op, no panic
        assert!(!handle.is_motion_reduced());
    }
}
