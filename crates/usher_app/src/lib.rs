//! Usher application layer
//!
//! The orchestration shell that sits between a host render loop and the
//! animation system:
//!
//! - **ReadinessGate**: when the loading screen comes down and when
//!   entrance animations may begin
//! - **TransitionSequencer**: overlay-covered page transitions with
//!   generation-stamped cycles and post-transition scroll corrections
//! - **Engine**: the facade owning one of each component, advanced by
//!   `tick(dt)` from the host loop
//!
//! ```ignore
//! use usher_app::{Engine, NavOptions};
//! use usher_core::EngineConfig;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.set_scroll_bounds(900.0, 4000.0);
//! engine.report_hero_image_loaded();
//! engine.report_page_mounted();
//!
//! loop {
//!     engine.tick(frame_dt);
//!     if !engine.is_loading() {
//!         break;
//!     }
//! }
//! ```

pub mod engine;
pub mod gate;
pub mod transition;

pub use engine::Engine;
pub use gate::{GateEvent, ReadinessGate, ReadinessState};
pub use transition::{NavKind, NavOptions, Phase, ScrollCorrection, TransitionSequencer};
