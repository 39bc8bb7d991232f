//! Fluid particle data structures.
//!
//! [`Particle`] is pure physics state. Anything a renderer needs lives in the
//! parallel [`ParticleDisplay`] array, or is exported through
//! [`ParticleSnapshot`].

use bevy::prelude::*;

/// A single fluid particle.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Current position.
    pub position: Vec2,
    /// Position at the start of the current integration step.
    pub previous_position: Vec2,
    /// Realized velocity of the last step, `(position - previous) / dt`.
    pub velocity: Vec2,
    /// Not used by the relaxation; kept for mass-weighted kernels.
    pub mass: f32,
    /// Base tint for the particle's visual.
    pub color: Color,
    /// Grid bucket the particle was placed in on the last rebuild.
    pub cell_id: Option<usize>,
}

impl Particle {
    /// Create a particle at rest at a given position.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            previous_position: position,
            velocity: Vec2::ZERO,
            mass: 0.0,
            color: Color::WHITE,
            cell_id: None,
        }
    }

    /// Create a particle with initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Create a particle with a specific color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Visual state picked from the neighbor count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum Appearance {
    /// No neighbors this frame.
    #[default]
    Neutral,
    /// At least one neighbor this frame.
    HasNeighbors,
}

/// Per-particle display state derived at the end of every step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticleDisplay {
    /// Mirror the visual horizontally (moving left).
    pub flipped: bool,
    pub appearance: Appearance,
}

/// Flat particle layout for handing positions and velocities to a renderer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleSnapshot {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl From<&Particle> for ParticleSnapshot {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            velocity: particle.velocity.to_array(),
        }
    }
}

impl ParticleSnapshot {
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }
}
