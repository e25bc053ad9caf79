//! Breathing (pulse) animation

use std::f32::consts::TAU;

/// Lowest glow intensity reached at the bottom of a breath
pub const MIN_INTENSITY: f32 = 0.5;

/// Oscillator phase for one strip, in radians within `[0, 2π)`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreathPhase {
    phase: f32,
}

impl BreathPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Phase increment for a frame at the given load
    ///
    /// A fully loaded strip breathes three times as fast as an idle one.
    pub fn step(normalized_load: f32, base_speed: f32) -> f32 {
        base_speed * (1.0 + normalized_load.clamp(0.0, 1.0) * 2.0)
    }

    /// Advance one animation frame
    pub fn advance(&mut self, normalized_load: f32, base_speed: f32) {
        let next = (self.phase + Self::step(normalized_load, base_speed)).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.phase = if next >= TAU { 0.0 } else { next };
    }

    /// Glow intensity multiplier in `[MIN_INTENSITY, 1.0]`
    pub fn intensity(&self) -> f32 {
        let wave = (self.phase.sin() + 1.0) / 2.0;
        MIN_INTENSITY + wave * (1.0 - MIN_INTENSITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_phase_wraps() {
        let mut phase = BreathPhase::new();
        for _ in 0..10_000 {
            phase.advance(1.0, 0.05);
            assert!(phase.phase() >= 0.0 && phase.phase() < TAU);
        }
    }

    #[test]
    fn test_speed_scales_with_load() {
        assert!((BreathPhase::step(0.0, 0.05) - 0.05).abs() < 1e-6);
        assert!((BreathPhase::step(0.5, 0.05) - 0.10).abs() < 1e-6);
        assert!((BreathPhase::step(1.0, 0.05) - 0.15).abs() < 1e-6);
        // Load is clamped
        assert_eq!(BreathPhase::step(7.0, 0.05), BreathPhase::step(1.0, 0.05));

        let mut idle = BreathPhase::new();
        let mut busy = BreathPhase::new();
        idle.advance(0.0, 0.05);
        busy.advance(1.0, 0.05);
        assert!(busy.phase() > idle.phase());
    }

    #[test]
    fn test_intensity_bounds() {
        let mut phase = BreathPhase::new();
        assert!((phase.intensity() - 0.75).abs() < 1e-6);

        phase.advance(0.0, FRAC_PI_2);
        assert!((phase.intensity() - 1.0).abs() < 1e-6);

        phase.advance(0.0, 2.0 * FRAC_PI_2);
        assert!((phase.intensity() - MIN_INTENSITY).abs() < 1e-6);

        for _ in 0..500 {
            phase.advance(0.3, 0.07);
            let i = phase.intensity();
            assert!((MIN_INTENSITY..=1.0).contains(&i));
        }
    }
}
