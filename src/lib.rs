//! Puddle - double density relaxation fluid for Bevy
//!
//! This library provides a small 2D particle fluid solved with position-based
//! double density relaxation, with a Bevy plugin that draws every particle as
//! a sprite.
//!
//! # Features
//!
//! - **Position-based relaxation**: density and pressure from a compact
//!   `(1 - r/h)²` kernel, corrected directly on positions
//! - **Optional grid**: bucket particles per cell instead of the O(n²) search
//! - **Boundary policies**: stop at the wall, or bounce with restitution
//! - **Host agnostic core**: step it from any loop; Bevy is only needed for
//!   the plugin
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use puddle::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(FluidPlugin::with_config(
//!             SimulationConfig::default()
//!                 .with_particle_count(400)
//!                 .with_boundary(BoundaryPolicy::Bounce { restitution: 0.5 }),
//!         ))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn(Camera2d);
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`fluid`]: Core fluid simulation module
//!   - [`fluid::params`]: Simulation parameters
//!   - [`fluid::particle`]: Particle data structures
//!   - [`fluid::spatial`]: Uniform grid for neighbor search
//!   - [`fluid::neighbors`]: Neighbor queries
//!   - [`fluid::solver`]: Double density relaxation
//!   - [`fluid::boundary`]: Boundary handling
//!   - [`fluid::simulation`]: Frame stepping
//!   - [`fluid::host`]: Host interfaces
//!   - [`fluid::render`]: Sprite rendering
//!   - [`fluid::plugin`]: Bevy plugin

pub mod fluid;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
}
