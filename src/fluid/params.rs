//! Fluid simulation parameters.
//!
//! One [`SimulationConfig`] selects every variant of the simulation: the
//! neighbor search strategy, the boundary policy and the relaxation mode.
//! It is a Bevy resource so it can be tweaked through reflection, but the
//! values are read once when a [`FluidSimulation`](super::simulation::FluidSimulation)
//! is created and stay constant for that run.

use bevy::prelude::*;

use super::error::{FluidError, FluidResult};

/// How particles are kept inside the domain walls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub enum BoundaryPolicy {
    /// Snap the offending axis back to where the particle started the step.
    /// Velocity is re-derived from the position delta afterwards, so the
    /// particle simply stops at the wall.
    #[default]
    Stop,
    /// Mirror the particle back inside and invert the velocity along the
    /// offending axis, scaled by `restitution` (1.0 = elastic).
    Bounce { restitution: f32 },
}

/// How pairwise displacements are applied during relaxation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum RelaxationMode {
    /// Neighbor displacements are applied immediately while iterating, so
    /// later particles see the moved positions. Results depend on particle
    /// order.
    #[default]
    Sequential,
    /// Every displacement is computed from the predicted positions and
    /// applied once the whole pass is done. Order independent.
    Batched,
}

/// Parameters controlling the fluid simulation behavior.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SimulationConfig {
    /// Number of particles spawned at start. Fixed for the run.
    pub particle_count: usize,

    /// Gravity strength, applied along -Y.
    pub gravity: f32,

    /// Interaction radius (h). Particles further apart do not interact.
    pub interaction_radius: f32,

    /// Pressure stiffness (k).
    pub pressure_scale: f32,

    /// Target rest density (rho0). Pressure is zero at this density.
    pub rest_density: f32,

    /// Bucket particles in a uniform grid and use a particle's own cell as its
    /// neighbor set instead of the O(n²) radius search.
    pub use_grid: bool,

    /// Cells per axis when `use_grid` is set. At most [`MAX_GRID_CELLS`].
    pub grid_cells: u32,

    /// Half-extent of the square domain centered on the origin.
    pub half_extent: f32,

    /// Distance between the domain edge and the collision walls. Must be
    /// positive so that walls lie inside the half-open grid domain.
    pub wall_inset: f32,

    /// Radius of the disc particles are spawned in.
    pub spawn_radius: f32,

    /// Wall collision response.
    pub boundary: BoundaryPolicy,

    /// Displacement application order.
    pub relaxation: RelaxationMode,
}

/// Upper bound on [`SimulationConfig::grid_cells`].
pub const MAX_GRID_CELLS: u32 = 1024;

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 300,
            gravity: 9.81,
            interaction_radius: 0.6,
            pressure_scale: 4.0,
            rest_density: 2.0,
            use_grid: false,
            grid_cells: 8,
            half_extent: 4.5,
            wall_inset: 0.25,
            spawn_radius: 2.0,
            boundary: BoundaryPolicy::Stop,
            relaxation: RelaxationMode::Sequential,
        }
    }
}

impl SimulationConfig {
    /// Creates the default configuration with grid neighbor search enabled.
    pub fn gridded(grid_cells: u32) -> Self {
        Self {
            use_grid: true,
            grid_cells,
            ..Self::default()
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_interaction_radius(mut self, h: f32) -> Self {
        self.interaction_radius = h;
        self
    }

    pub fn with_pressure_scale(mut self, k: f32) -> Self {
        self.pressure_scale = k;
        self
    }

    pub fn with_rest_density(mut self, rho0: f32) -> Self {
        self.rest_density = rho0;
        self
    }

    /// Enables grid neighbor search with `cells` cells per axis.
    pub fn with_grid(mut self, cells: u32) -> Self {
        self.use_grid = true;
        self.grid_cells = cells;
        self
    }

    /// Switches back to brute-force neighbor search.
    pub fn without_grid(mut self) -> Self {
        self.use_grid = false;
        self
    }

    pub fn with_half_extent(mut self, half_extent: f32) -> Self {
        self.half_extent = half_extent;
        self
    }

    pub fn with_wall_inset(mut self, inset: f32) -> Self {
        self.wall_inset = inset;
        self
    }

    pub fn with_spawn_radius(mut self, radius: f32) -> Self {
        self.spawn_radius = radius;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_relaxation(mut self, relaxation: RelaxationMode) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Position of the collision walls on each axis.
    pub fn wall(&self) -> f32 {
        self.half_extent - self.wall_inset
    }

    /// Checks the parameters that would make the simulation meaningless.
    pub fn validate(&self) -> FluidResult<()> {
        if !(self.interaction_radius > 0.0) || !self.interaction_radius.is_finite() {
            return Err(FluidError::InvalidInteractionRadius(self.interaction_radius));
        }
        if self.use_grid && !(1..=MAX_GRID_CELLS).contains(&self.grid_cells) {
            return Err(FluidError::InvalidCellCount(self.grid_cells));
        }
        if !(self.half_extent > 0.0) || !self.half_extent.is_finite() {
            return Err(FluidError::InvalidHalfExtent(self.half_extent));
        }
        if !(self.wall_inset > 0.0 && self.wall_inset < self.half_extent) {
            return Err(FluidError::InvalidWallInset {
                inset: self.wall_inset,
                half_extent: self.half_extent,
            });
        }
        if let BoundaryPolicy::Bounce { restitution } = self.boundary {
            if !(0.0..=1.0).contains(&restitution) {
                return Err(FluidError::InvalidRestitution(restitution));
            }
        }
        if !(self.spawn_radius >= 0.0) || !self.spawn_radius.is_finite() {
            return Err(FluidError::InvalidSpawnRadius(self.spawn_radius));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(SimulationConfig::gridded(4).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_radius() {
        let config = SimulationConfig::default().with_interaction_radius(0.0);
        assert_eq!(
            config.validate(),
            Err(FluidError::InvalidInteractionRadius(0.0))
        );

        let config = SimulationConfig::default().with_interaction_radius(f32::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cell_count_only_matters_with_grid() {
        let config = SimulationConfig::default().with_grid(0);
        assert_eq!(config.validate(), Err(FluidError::InvalidCellCount(0)));

        let config = config.without_grid();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cell_count_is_capped() {
        assert!(SimulationConfig::gridded(MAX_GRID_CELLS).validate().is_ok());
        assert_eq!(
            SimulationConfig::gridded(MAX_GRID_CELLS + 1).validate(),
            Err(FluidError::InvalidCellCount(MAX_GRID_CELLS + 1))
        );
        assert_eq!(
            SimulationConfig::gridded(u32::MAX).validate(),
            Err(FluidError::InvalidCellCount(u32::MAX))
        );
    }

    #[test]
    fn test_rejects_bad_domain() {
        let config = SimulationConfig::default().with_half_extent(-4.5);
        assert_eq!(config.validate(), Err(FluidError::InvalidHalfExtent(-4.5)));

        let config = SimulationConfig::default().with_wall_inset(4.5);
        assert!(matches!(
            config.validate(),
            Err(FluidError::InvalidWallInset { .. })
        ));

        // Walls on the domain edge would put particles at +R, outside the grid.
        let config = SimulationConfig::gridded(4).with_wall_inset(0.0);
        assert_eq!(
            config.validate(),
            Err(FluidError::InvalidWallInset {
                inset: 0.0,
                half_extent: 4.5
            })
        );
    }

    #[test]
    fn test_rejects_bad_restitution() {
        let config =
            SimulationConfig::default().with_boundary(BoundaryPolicy::Bounce { restitution: 1.5 });
        assert_eq!(config.validate(), Err(FluidError::InvalidRestitution(1.5)));
    }

    #[test]
    fn test_wall_position() {
        let config = SimulationConfig::default();
        assert!((config.wall() - 4.25).abs() < 1e-6);
    }
}
