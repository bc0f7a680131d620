//! Damped spring physics
//!
//! Springs drive the two clock-based motions the engine owns: the overlay
//! fade during route transitions and smooth programmatic scrolling. The
//! integrator is semi-implicit Euler with fixed substeps, which is stable
//! for the stiffness range these presets use and cheap enough to step
//! every frame.

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Critically-damped fade for the transition overlay
    pub fn overlay() -> Self {
        Self {
            stiffness: 260.0,
            damping: 32.0,
            mass: 1.0,
        }
    }

    /// Long, smooth glide for programmatic scrolling
    pub fn glide() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            mass: 1.0,
        }
    }

    /// Near-instant snap with no perceptible overshoot
    pub fn snappy() -> Self {
        Self {
            stiffness: 600.0,
            damping: 48.0,
            mass: 1.0,
        }
    }

    /// Damping at which this spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Whether the spring will overshoot its target
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::glide()
    }
}

/// A spring-based animator
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget mid-flight; velocity carries over
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Jump to a value with no animation
    pub fn set_immediate(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Whether the spring is at rest at its target
    pub fn is_settled(&self) -> bool {
        // 0.1% of an opacity unit / a tenth of a pixel is imperceptible
        const EPSILON: f32 = 0.001;
        const VELOCITY_EPSILON: f32 = 0.01;

        (self.value - self.target).abs() < EPSILON && self.velocity.abs() < VELOCITY_EPSILON
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        // Substep so large host dt (a dropped frame) cannot destabilize
        // the integration.
        const MAX_SUBSTEP: f32 = 1.0 / 120.0;
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            let displacement = self.value - self.target;
            let accel = (-self.config.stiffness * displacement
                - self.config.damping * self.velocity)
                / self.config.mass;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_at_target() {
        let mut spring = Spring::new(SpringConfig::overlay(), 0.0);
        spring.set_target(1.0);

        for _ in 0..240 {
            spring.step(1.0 / 60.0);
        }

        assert!(spring.is_settled());
        assert!((spring.value() - 1.0).abs() < 0.01);
    }

    #[test]
    fn retarget_keeps_velocity() {
        let mut spring = Spring::new(SpringConfig::glide(), 0.0);
        spring.set_target(100.0);

        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }
        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        spring.set_target(50.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn large_dt_stays_stable() {
        let mut spring = Spring::new(SpringConfig::snappy(), 0.0);
        spring.set_target(1000.0);

        for _ in 0..50 {
            spring.step(0.25);
            assert!(spring.value().is_finite());
            assert!(spring.value() > -500.0 && spring.value() < 2000.0);
        }
        assert!(spring.is_settled());
    }

    #[test]
    fn set_immediate_skips_animation() {
        let mut spring = Spring::new(SpringConfig::glide(), 0.0);
        spring.set_target(100.0);
        spring.step(1.0 / 60.0);

        spring.set_immediate(42.0);
        assert_eq!(spring.value(), 42.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn overlay_preset_does_not_overshoot() {
        assert!(!SpringConfig::overlay().is_underdamped());
    }
}
