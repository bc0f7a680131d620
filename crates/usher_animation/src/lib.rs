//! Usher animation system
//!
//! Scroll-linked animation with adaptive degradation:
//!
//! - **Spring physics**: damped springs for overlay fades and smooth scroll
//! - **Easing**: easing curves for scroll-trigger value tracks
//! - **Scroll triggers**: timelines whose progress is driven by scroll
//!   position, not the clock
//! - **AnimationGovernor**: the single registration funnel with a
//!   concurrency ceiling, frame-rate sampling and degradation
//! - **ScrollController**: spring-smoothed programmatic scrolling that
//!   keeps the governor in sync on every tick
//! - **Section bindings**: the per-section gating protocol (hidden before
//!   paint, bind after readiness, rebind on dependency change, teardown on
//!   drop) implemented once for all call sites

pub mod binding;
pub mod easing;
pub mod governor;
pub mod scroll;
pub mod spring;
pub mod trigger;

pub use binding::{bind_section, AppliedState, SectionBinding, SectionTracks, TimelineBuilder};
pub use easing::Easing;
pub use governor::{
    set_global_governor, try_global_governor, AnimationGovernor, GovernorHandle, GovernorStats,
    TriggerId, TriggerRegistration,
};
pub use scroll::{ScrollController, ScrollOptions, ScrollTarget, HERO_ANCHOR};
pub use spring::{Spring, SpringConfig};
pub use trigger::{ScopeId, ScrollTrigger, TrackId, TriggerConfig, ValueTrack};
