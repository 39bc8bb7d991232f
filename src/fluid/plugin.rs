//! Bevy plugin for fluid simulation.

use bevy::log::error;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::host::{sample_range, sample_unit_circle, FrameSource};
use super::params::{BoundaryPolicy, RelaxationMode, SimulationConfig};
use super::particle::Appearance;
use super::render::{sync_sprites, FluidParticleVisual, FluidRenderConfig, SpriteBoard};
use super::simulation::{FluidSimulation, StepReport};

/// Plugin that adds a double density relaxation fluid to a Bevy app.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use puddle::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(FluidPlugin::with_config(SimulationConfig::gridded(6)))
///         .add_systems(Startup, |mut commands: Commands| {
///             commands.spawn(Camera2d);
///         })
///         .run();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FluidPlugin {
    pub config: SimulationConfig,
    pub render: FluidRenderConfig,
    /// Frame deltas are clamped to this to keep long frames from blowing up
    /// the relaxation.
    pub max_delta_time: f32,
    /// Seed for initial placement. Random when `None`.
    pub seed: Option<u64>,
}

impl Default for FluidPlugin {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            render: FluidRenderConfig::default(),
            max_delta_time: 1.0 / 30.0,
            seed: None,
        }
    }
}

impl FluidPlugin {
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn with_render(mut self, render: FluidRenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_max_delta_time(mut self, max_delta_time: f32) -> Self {
        self.max_delta_time = max_delta_time;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        // Register types for reflection
        app.register_type::<SimulationConfig>()
            .register_type::<BoundaryPolicy>()
            .register_type::<RelaxationMode>()
            .register_type::<Appearance>()
            .register_type::<FluidRenderConfig>()
            .register_type::<FluidParticleVisual>();

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        app.insert_resource(self.config.clone())
            .insert_resource(self.render.clone())
            .insert_resource(FluidState::new(self.max_delta_time))
            .insert_resource(SimulationRng(rng))
            .init_resource::<SpriteBoard>();

        app.add_systems(Startup, setup_simulation).add_systems(
            Update,
            (run_simulation, present_simulation, sync_sprites).chain(),
        );
    }
}

/// Host-side control over the running simulation.
#[derive(Resource, Clone, Debug)]
pub struct FluidState {
    pub paused: bool,
    /// Run exactly one step on the next update while paused.
    pub step_requested: bool,
    pub max_delta_time: f32,
    pub last_report: Option<StepReport>,
}

impl FluidState {
    pub fn new(max_delta_time: f32) -> Self {
        Self {
            paused: false,
            step_requested: false,
            max_delta_time,
            last_report: None,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    /// Whether the next update should advance the simulation. Consumes a
    /// pending step request.
    fn should_step(&mut self) -> bool {
        if !self.paused {
            return true;
        }
        std::mem::take(&mut self.step_requested)
    }
}

/// Random generator used for initial placement.
#[derive(Resource)]
pub struct SimulationRng(pub StdRng);

/// [`FrameSource`] backed by Bevy's clock, clamped to a maximum delta.
pub struct TimeFrameSource<'a> {
    delta: f32,
    rng: &'a mut StdRng,
}

impl<'a> TimeFrameSource<'a> {
    pub fn new(time: &Time, max_delta_time: f32, rng: &'a mut StdRng) -> Self {
        Self {
            delta: time.delta_secs().min(max_delta_time),
            rng,
        }
    }
}

impl FrameSource for TimeFrameSource<'_> {
    fn next_delta_time(&mut self) -> f32 {
        self.delta
    }

    fn random_in_range(&mut self, min: f32, max: f32) -> f32 {
        sample_range(&mut *self.rng, min, max)
    }

    fn random_in_unit_circle(&mut self) -> Vec2 {
        sample_unit_circle(&mut *self.rng)
    }
}

/// System creating the simulation and one sprite per particle.
fn setup_simulation(
    mut commands: Commands,
    config: Res<SimulationConfig>,
    state: Res<FluidState>,
    time: Res<Time>,
    mut rng: ResMut<SimulationRng>,
    mut board: ResMut<SpriteBoard>,
) {
    let mut frames = TimeFrameSource::new(&time, state.max_delta_time, &mut rng.0);
    match FluidSimulation::new(config.clone(), &mut frames) {
        Ok(mut simulation) => {
            simulation.attach_visuals(&mut *board);
            commands.insert_resource(simulation);
        }
        Err(err) => {
            error!("fluid simulation disabled: {err}");
        }
    }
}

/// System to run the fluid simulation.
fn run_simulation(
    time: Res<Time>,
    mut state: ResMut<FluidState>,
    mut rng: ResMut<SimulationRng>,
    simulation: Option<ResMut<FluidSimulation>>,
) {
    let Some(mut simulation) = simulation else {
        return;
    };
    if !state.should_step() {
        return;
    }

    let mut frames = TimeFrameSource::new(&time, state.max_delta_time, &mut rng.0);
    let report = simulation.step(frames.next_delta_time());
    if !report.skipped {
        state.last_report = Some(report);
    }
}

/// System pushing particle state to the sprite board.
fn present_simulation(
    simulation: Option<Res<FluidSimulation>>,
    mut board: ResMut<SpriteBoard>,
) {
    let Some(simulation) = simulation else {
        return;
    };
    if simulation.is_changed() {
        simulation.present(&mut *board);
    }
}
