//! Per-frame simulation stepping.
//!
//! One call to [`FluidSimulation::step`] advances the particles by one frame:
//!
//! 1. rebuild the grid (grid mode only)
//! 2. apply gravity to velocity
//! 3. save the previous position and predict the new one
//! 4. double density relaxation on the predicted positions
//! 5. wall collisions
//! 6. velocity = realized displacement / dt
//! 7. display state (facing, has-neighbors)
//!
//! Step 6 overwrites the integrated velocity every frame, so any displacement
//! the relaxation or the walls cancel is lost from the velocity too.

use bevy::log::{debug, info, trace, warn_once};
use bevy::prelude::*;

use super::boundary::BoundaryResolver;
use super::error::FluidResult;
use super::host::{FrameSource, VisualHandle, VisualHost};
use super::neighbors::NeighborQuery;
use super::params::SimulationConfig;
use super::particle::{Appearance, Particle, ParticleDisplay, ParticleSnapshot};
use super::solver::DensityRelaxationSolver;
use super::spatial::SpatialGrid;

/// What happened during one call to [`FluidSimulation::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Frame index after the step.
    pub frame: u64,
    pub dt: f32,
    /// The step was not run because `dt` was zero, negative or not finite.
    pub skipped: bool,
    pub mean_density: f32,
    pub max_abs_pressure: f32,
    /// Coincident neighbor pairs that got no displacement.
    pub coincident_pairs: usize,
    /// Particles outside the grid at rebuild time. Always zero without grid.
    pub out_of_domain: usize,
    /// Particles that touched a wall.
    pub wall_hits: usize,
    /// Particles that ended the step with at least one neighbor.
    pub with_neighbors: usize,
}

/// A complete 2D fluid: particles, optional grid and the solvers acting on
/// them.
#[derive(Resource, Debug)]
pub struct FluidSimulation {
    config: SimulationConfig,
    particles: Vec<Particle>,
    /// Parallel to `particles`.
    display: Vec<ParticleDisplay>,
    /// Parallel to `particles` once visuals are attached, empty before.
    visuals: Vec<VisualHandle>,
    grid: Option<SpatialGrid>,
    solver: DensityRelaxationSolver,
    boundary: BoundaryResolver,
    frame: u64,
}

impl FluidSimulation {
    /// Creates a simulation with `config.particle_count` particles at rest,
    /// spread uniformly over a disc of `config.spawn_radius` around the origin.
    pub fn new(config: SimulationConfig, source: &mut impl FrameSource) -> FluidResult<Self> {
        config.validate()?;
        let particles = (0..config.particle_count)
            .map(|_| Particle::new(source.random_in_unit_circle() * config.spawn_radius))
            .collect();
        Self::from_particles(config, particles)
    }

    /// Creates a simulation from explicit particles. `config.particle_count`
    /// is updated to match.
    pub fn from_particles(
        mut config: SimulationConfig,
        particles: Vec<Particle>,
    ) -> FluidResult<Self> {
        config.validate()?;
        config.particle_count = particles.len();

        let grid = config
            .use_grid
            .then(|| SpatialGrid::new(config.half_extent, config.grid_cells as usize));

        info!(
            "fluid simulation: {} particles, h = {}, k = {}, rho0 = {}, {}",
            particles.len(),
            config.interaction_radius,
            config.pressure_scale,
            config.rest_density,
            match &grid {
                Some(grid) => format!(
                    "{0}x{0} grid ({1:.3} per cell)",
                    grid.cells_per_axis(),
                    grid.cell_size()
                ),
                None => "brute-force neighbors".to_string(),
            }
        );
        if let Some(grid) = &grid {
            if grid.cell_size() < config.interaction_radius {
                debug!(
                    "grid cells ({:.3}) are narrower than the interaction radius ({}), \
                     neighbors across cell edges will be missed",
                    grid.cell_size(),
                    config.interaction_radius
                );
            }
        }

        Ok(Self {
            display: vec![ParticleDisplay::default(); particles.len()],
            visuals: Vec::new(),
            solver: DensityRelaxationSolver::from_config(&config),
            boundary: BoundaryResolver::from_config(&config),
            grid,
            particles,
            config,
            frame: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Display state from the last step, parallel to [`particles`](Self::particles).
    pub fn display(&self) -> &[ParticleDisplay] {
        &self.display
    }

    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    pub fn visuals(&self) -> &[VisualHandle] {
        &self.visuals
    }

    /// Number of steps run so far. Skipped steps do not count.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Neighbor candidates of a particle with the configured strategy. In grid
    /// mode this reads the grid as built by the last step.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        self.query().neighbors(index, &self.particles)
    }

    fn query(&self) -> NeighborQuery<'_> {
        NeighborQuery::new(self.config.interaction_radius, self.grid.as_ref())
    }

    /// Advance the simulation by one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> StepReport {
        if !(dt > 0.0) || !dt.is_finite() {
            warn_once!("skipping fluid step with unusable dt = {dt}");
            return StepReport {
                frame: self.frame,
                dt,
                skipped: true,
                ..default()
            };
        }

        let mut report = StepReport {
            dt,
            ..default()
        };

        if let Some(grid) = self.grid.as_mut() {
            report.out_of_domain = grid.rebuild(&mut self.particles);
        }

        let gravity = Vec2::new(0.0, -self.config.gravity);
        for particle in &mut self.particles {
            particle.velocity += dt * gravity;
        }

        for particle in &mut self.particles {
            particle.previous_position = particle.position;
            particle.position += dt * particle.velocity;
        }

        let query = NeighborQuery::new(self.config.interaction_radius, self.grid.as_ref());
        let stats = self.solver.relax(&mut self.particles, query, dt);
        report.mean_density = stats.mean_density;
        report.max_abs_pressure = stats.max_abs_pressure;
        report.coincident_pairs = stats.coincident_pairs;

        report.wall_hits = self.boundary.resolve_all(&mut self.particles);

        let inv_dt = 1.0 / dt;
        for particle in &mut self.particles {
            particle.velocity = (particle.position - particle.previous_position) * inv_dt;
        }

        report.with_neighbors = self.update_display();

        self.frame += 1;
        report.frame = self.frame;

        trace!(
            frame = report.frame,
            mean_density = report.mean_density,
            max_abs_pressure = report.max_abs_pressure,
            wall_hits = report.wall_hits,
            "fluid step"
        );
        if report.coincident_pairs > 0 || report.out_of_domain > 0 {
            debug!(
                "frame {}: {} coincident pairs, {} particles outside the grid",
                report.frame, report.coincident_pairs, report.out_of_domain
            );
        }

        report
    }

    /// Runs `frames` steps with timing from `source`. Returns the last report.
    pub fn run(&mut self, source: &mut impl FrameSource, frames: usize) -> StepReport {
        let mut report = StepReport {
            frame: self.frame,
            ..default()
        };
        for _ in 0..frames {
            report = self.step(source.next_delta_time());
        }
        report
    }

    fn update_display(&mut self) -> usize {
        let query = NeighborQuery::new(self.config.interaction_radius, self.grid.as_ref());
        let mut with_neighbors = 0;
        for (i, display) in self.display.iter_mut().enumerate() {
            let has_neighbors = query.has_neighbors(i, &self.particles);
            if has_neighbors {
                with_neighbors += 1;
            }
            *display = ParticleDisplay {
                flipped: self.particles[i].velocity.x < 0.0,
                appearance: if has_neighbors {
                    Appearance::HasNeighbors
                } else {
                    Appearance::Neutral
                },
            };
        }
        with_neighbors
    }

    /// Positions and velocities in a flat, uploadable layout.
    pub fn snapshot(&self) -> Vec<ParticleSnapshot> {
        self.particles.iter().map(ParticleSnapshot::from).collect()
    }

    /// Creates one visual per particle. Calling it again replaces the handles.
    pub fn attach_visuals(&mut self, host: &mut impl VisualHost) {
        self.visuals = self
            .particles
            .iter()
            .map(|particle| host.create_visual(particle.position))
            .collect();
    }

    /// Pushes the current position and display state of every particle to
    /// its visual. Does nothing before [`attach_visuals`](Self::attach_visuals).
    pub fn present(&self, host: &mut impl VisualHost) {
        for ((particle, display), &handle) in self
            .particles
            .iter()
            .zip(&self.display)
            .zip(&self.visuals)
        {
            host.set_visual_position(handle, particle.position);
            host.set_visual_facing(handle, display.flipped);
            host.set_visual_appearance(handle, display.appearance);
        }
    }
}
