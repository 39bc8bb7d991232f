//! Double density relaxation solver.
//!
//! A position-based pressure solve in the style of Clavet et al. (2005),
//! "Particle-based Viscoelastic Fluid Simulation", without the near-density
//! term:
//!
//! ```text
//! q   = |n - p| / h
//! rho = Σ (1 - q)²                       over neighbors with q < 1
//! P   = k (rho - rho0)
//! D   = dt² P (1 - q) normalize(n - p)
//! n  += D / 2,   p -= D / 2
//! ```
//!
//! Positions are corrected directly; velocity is re-derived by the stepper
//! from the total displacement of the frame.

use bevy::prelude::*;

use super::neighbors::NeighborQuery;
use super::params::{RelaxationMode, SimulationConfig};
use super::particle::Particle;

/// Density kernel `(1 - q)²` for `q < 1`, zero otherwise.
#[inline]
pub fn density_kernel(q: f32) -> f32 {
    if q < 1.0 {
        let w = 1.0 - q;
        w * w
    } else {
        0.0
    }
}

/// Density and pressure of one particle for one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleRelaxation {
    pub density: f32,
    pub pressure: f32,
    /// Distinct neighbors sitting exactly on the particle. They get no
    /// displacement since their direction is undefined.
    pub coincident: usize,
}

/// Aggregate numbers for one relaxation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelaxationStats {
    pub mean_density: f32,
    pub max_abs_pressure: f32,
    pub coincident_pairs: usize,
}

impl RelaxationStats {
    fn accumulate(samples: impl Iterator<Item = ParticleRelaxation>) -> Self {
        let mut stats = Self::default();
        let mut count = 0usize;
        let mut density_sum = 0.0;
        for sample in samples {
            count += 1;
            density_sum += sample.density;
            stats.max_abs_pressure = stats.max_abs_pressure.max(sample.pressure.abs());
            stats.coincident_pairs += sample.coincident;
        }
        if count > 0 {
            stats.mean_density = density_sum / count as f32;
        }
        stats
    }
}

/// Double density relaxation with a linear equation of state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensityRelaxationSolver {
    /// Interaction radius (h).
    pub interaction_radius: f32,
    /// Pressure stiffness (k).
    pub pressure_scale: f32,
    /// Rest density (rho0).
    pub rest_density: f32,
    pub mode: RelaxationMode,
}

impl DensityRelaxationSolver {
    pub fn new(interaction_radius: f32, pressure_scale: f32, rest_density: f32) -> Self {
        Self {
            interaction_radius,
            pressure_scale,
            rest_density,
            mode: RelaxationMode::Sequential,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.interaction_radius,
            config.pressure_scale,
            config.rest_density,
        )
        .with_mode(config.relaxation)
    }

    pub fn with_mode(mut self, mode: RelaxationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Kernel density at `position` from the given neighbors. Never negative.
    pub fn density(&self, position: Vec2, neighbors: &[usize], particles: &[Particle]) -> f32 {
        let inv_h = 1.0 / self.interaction_radius;
        neighbors
            .iter()
            .map(|&j| density_kernel(position.distance(particles[j].position) * inv_h))
            .sum()
    }

    /// Linear equation of state. Negative below rest density.
    #[inline]
    pub fn pressure(&self, density: f32) -> f32 {
        self.pressure_scale * (density - self.rest_density)
    }

    /// Displacement pushing a neighbor at `offset` from the particle, before
    /// it is split between the pair. Zero for a coincident neighbor.
    #[inline]
    pub fn pair_displacement(&self, offset: Vec2, pressure: f32, dt: f32) -> Vec2 {
        let q = offset.length() / self.interaction_radius;
        if q >= 1.0 {
            return Vec2::ZERO;
        }
        dt * dt * pressure * (1.0 - q) * offset.normalize_or_zero()
    }

    /// Runs one relaxation pass over every particle, in array order.
    pub fn relax(
        &self,
        particles: &mut [Particle],
        query: NeighborQuery,
        dt: f32,
    ) -> RelaxationStats {
        match self.mode {
            RelaxationMode::Sequential => self.relax_sequential(particles, query, dt),
            RelaxationMode::Batched => self.relax_batched(particles, query, dt),
        }
    }

    fn relax_sequential(
        &self,
        particles: &mut [Particle],
        query: NeighborQuery,
        dt: f32,
    ) -> RelaxationStats {
        let mut samples = Vec::with_capacity(particles.len());
        for i in 0..particles.len() {
            let neighbors = query.neighbors(i, particles);
            samples.push(self.relax_particle(i, &neighbors, particles, dt));
        }
        RelaxationStats::accumulate(samples.into_iter())
    }

    /// Relaxes a single particle against `neighbors`, moving the neighbors
    /// immediately and the particle itself once all of them are handled.
    pub fn relax_particle(
        &self,
        index: usize,
        neighbors: &[usize],
        particles: &mut [Particle],
        dt: f32,
    ) -> ParticleRelaxation {
        let origin = particles[index].position;
        let density = self.density(origin, neighbors, particles);
        let pressure = self.pressure(density);

        let mut coincident = 0;
        let mut dx = Vec2::ZERO;
        for &j in neighbors {
            let offset = particles[j].position - origin;
            if offset == Vec2::ZERO {
                if j != index {
                    coincident += 1;
                }
                continue;
            }
            let half = self.pair_displacement(offset, pressure, dt) * 0.5;
            particles[j].position += half;
            dx -= half;
        }
        particles[index].position += dx;

        ParticleRelaxation {
            density,
            pressure,
            coincident,
        }
    }

    fn relax_batched(
        &self,
        particles: &mut [Particle],
        query: NeighborQuery,
        dt: f32,
    ) -> RelaxationStats {
        let mut corrections = vec![Vec2::ZERO; particles.len()];
        let mut samples = Vec::with_capacity(particles.len());

        for i in 0..particles.len() {
            let neighbors = query.neighbors(i, particles);
            let origin = particles[i].position;
            let density = self.density(origin, &neighbors, particles);
            let pressure = self.pressure(density);

            let mut coincident = 0;
            for &j in &neighbors {
                let offset = particles[j].position - origin;
                if offset == Vec2::ZERO {
                    if j != i {
                        coincident += 1;
                    }
                    continue;
                }
                let half = self.pair_displacement(offset, pressure, dt) * 0.5;
                corrections[j] += half;
                corrections[i] -= half;
            }

            samples.push(ParticleRelaxation {
                density,
                pressure,
                coincident,
            });
        }

        for (particle, correction) in particles.iter_mut().zip(corrections) {
            particle.position += correction;
        }
        RelaxationStats::accumulate(samples.into_iter())
    }
}
