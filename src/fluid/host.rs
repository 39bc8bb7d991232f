//! Interfaces toward whatever drives and displays the simulation.
//!
//! The simulation never owns a renderer. It creates one visual per particle
//! through a [`VisualHost`], keeps the returned handles in a parallel array and
//! pushes position and display state through the same host after each step.
//! Time and randomness come from a [`FrameSource`].

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::particle::Appearance;

/// Opaque handle to a visual created by a [`VisualHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub usize);

/// Receives per-particle display updates.
pub trait VisualHost {
    fn create_visual(&mut self, position: Vec2) -> VisualHandle;
    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2);
    fn set_visual_facing(&mut self, handle: VisualHandle, flipped: bool);
    fn set_visual_appearance(&mut self, handle: VisualHandle, appearance: Appearance);
}

/// Supplies frame timing and the randomness used for initial placement.
pub trait FrameSource {
    /// Seconds since the previous frame.
    fn next_delta_time(&mut self) -> f32;

    /// Uniform sample in `[min, max)`. Returns `min` for an empty range.
    fn random_in_range(&mut self, min: f32, max: f32) -> f32;

    /// Uniform sample inside the unit disc.
    fn random_in_unit_circle(&mut self) -> Vec2;
}

/// Uniform sample in `[min, max)` that tolerates empty or inverted ranges.
pub fn sample_range(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform sample inside the unit disc, by rejection.
pub fn sample_unit_circle(rng: &mut impl Rng) -> Vec2 {
    loop {
        let candidate = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// Fixed timestep with a seeded generator. Used for headless runs and tests.
#[derive(Clone, Debug)]
pub struct FixedFrameSource {
    pub dt: f32,
    rng: StdRng,
}

impl FixedFrameSource {
    pub fn new(dt: f32, seed: u64) -> Self {
        Self {
            dt,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FrameSource for FixedFrameSource {
    fn next_delta_time(&mut self) -> f32 {
        self.dt
    }

    fn random_in_range(&mut self, min: f32, max: f32) -> f32 {
        sample_range(&mut self.rng, min, max)
    }

    fn random_in_unit_circle(&mut self) -> Vec2 {
        sample_unit_circle(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_timestep() {
        let mut source = FixedFrameSource::new(1.0 / 60.0, 7);

        assert_eq!(source.next_delta_time(), 1.0 / 60.0);
        assert_eq!(source.next_delta_time(), 1.0 / 60.0);
    }

    #[test]
    fn test_unit_circle_samples() {
        let mut source = FixedFrameSource::new(0.016, 42);

        for _ in 0..1000 {
            assert!(source.random_in_unit_circle().length() <= 1.0);
        }
    }

    #[test]
    fn test_range_samples() {
        let mut source = FixedFrameSource::new(0.016, 42);

        for _ in 0..1000 {
            let value = source.random_in_range(-4.0, 4.0);
            assert!((-4.0..4.0).contains(&value));
        }
        assert_eq!(source.random_in_range(2.0, 2.0), 2.0);
        assert_eq!(source.random_in_range(3.0, 1.0), 3.0);
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = FixedFrameSource::new(0.016, 3);
        let mut b = FixedFrameSource::new(0.016, 3);

        assert_eq!(a.random_in_unit_circle(), b.random_in_unit_circle());
    }
}
