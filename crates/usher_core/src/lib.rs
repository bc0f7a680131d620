//! Usher core primitives
//!
//! Shared building blocks for the readiness/animation orchestration engine:
//!
//! - **State machines**: the [`StateTransitions`] trait for small explicit FSMs
//! - **Generation tokens**: stale-callback rejection for abandoned cycles
//! - **Countdown timers**: deterministic, tick-driven one-shot timers
//! - **Configuration**: serde/toml-backed engine configuration
//! - **Errors**: the crate-wide error taxonomy

pub mod config;
pub mod error;
pub mod fsm;
pub mod generation;
pub mod timer;

pub use config::{
    EngineConfig, GateConfig, GovernorConfig, PreserveScroll, ScrollConfig, TransitionConfig,
};
pub use error::{Result, UsherError};
pub use fsm::StateTransitions;
pub use generation::{Generation, GenerationCounter};
pub use timer::Countdown;
