//! Double density relaxation fluid simulation module for Bevy.
//!
//! A 2D particle fluid solved with position corrections rather than forces,
//! after Clavet et al. Particles are bounded by a square box and can optionally
//! be bucketed in a uniform grid to avoid the O(n²) neighbor search.
//!
//! # Architecture
//!
//! The simulation is structured in the following components:
//!
//! - [`params`]: Simulation parameters and variant selection
//! - [`error`]: Configuration errors
//! - [`particle`]: Particle data and display state
//! - [`spatial`]: Uniform grid bucketing
//! - [`neighbors`]: Brute-force and grid neighbor queries
//! - [`solver`]: Double density relaxation
//! - [`boundary`]: Wall collisions
//! - [`simulation`]: Per-frame stepping
//! - [`host`]: Visual host and frame source interfaces
//! - [`render`]: Sprite rendering
//! - [`plugin`]: Bevy plugin for easy integration
//!
//! The first eight modules do not need an ECS: a [`simulation::FluidSimulation`]
//! can be stepped directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use puddle::fluid::prelude::*;
//!
//! let config = SimulationConfig::default().with_particle_count(100).with_grid(6);
//! let mut frames = FixedFrameSource::new(1.0 / 60.0, 0);
//! let mut simulation = FluidSimulation::new(config, &mut frames).unwrap();
//!
//! let report = simulation.run(&mut frames, 60);
//! println!("mean density after one second: {}", report.mean_density);
//! ```

pub mod params;
pub mod error;
pub mod particle;
pub mod spatial;
pub mod neighbors;
pub mod solver;
pub mod boundary;
pub mod simulation;
pub mod host;
pub mod render;
pub mod plugin;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::params::*;
    pub use super::error::*;
    pub use super::particle::*;
    pub use super::spatial::*;
    pub use super::neighbors::*;
    pub use super::solver::*;
    pub use super::boundary::*;
    pub use super::simulation::*;
    pub use super::host::*;
    pub use super::render::*;
    pub use super::plugin::*;
}
