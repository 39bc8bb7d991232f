//! Puddle - double density relaxation demo
//!
//! A few hundred particles dropped into a box, drawn as sprites that turn blue
//! while they have neighbors.

use bevy::prelude::*;
use puddle::prelude::*;

fn main() {
    let config = SimulationConfig::gridded(8)
        .with_particle_count(300)
        .with_boundary(BoundaryPolicy::Bounce { restitution: 0.3 });
    let render = FluidRenderConfig::default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Puddle".to_string(),
                resolution: bevy::window::WindowResolution::new(720, 720),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FluidPlugin::with_config(config).with_render(render))
        .add_systems(Startup, setup_scene)
        .add_systems(Update, (handle_input, update_debug_ui))
        .run();
}

/// Set up the camera, the box outline and the debug text.
fn setup_scene(
    mut commands: Commands,
    config: Res<SimulationConfig>,
    render: Res<FluidRenderConfig>,
) {
    commands.spawn(Camera2d);

    // Box interior, drawn behind the particles
    let side = 2.0 * config.wall() * render.pixels_per_unit;
    commands.spawn((
        Sprite::from_color(Color::srgb(0.08, 0.08, 0.1), Vec2::splat(side)),
        Transform::from_xyz(0.0, 0.0, -1.0),
    ));

    commands.spawn((
        Text::new("Puddle"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        DebugText,
    ));
}

/// Marker for debug text.
#[derive(Component)]
struct DebugText;

/// Handle keyboard input for simulation control.
fn handle_input(keyboard: Res<ButtonInput<KeyCode>>, mut state: ResMut<FluidState>) {
    if keyboard.just_pressed(KeyCode::Space) {
        state.toggle_pause();
    }

    if keyboard.just_pressed(KeyCode::KeyS) && state.paused {
        state.request_step();
    }
}

/// Update the debug UI text.
fn update_debug_ui(
    state: Res<FluidState>,
    simulation: Option<Res<FluidSimulation>>,
    mut text_query: Query<&mut Text, With<DebugText>>,
) {
    let status = if state.paused { "PAUSED" } else { "Running" };
    let particles = simulation.map_or(0, |simulation| simulation.len());
    let report = state.last_report.unwrap_or_default();

    for mut text in text_query.iter_mut() {
        text.0 = format!(
            "Puddle ({})\n\n\
             Controls:\n  \
             Space - Pause/Resume\n  \
             S - Step (when paused)\n\n\
             Particles: {}\n\
             Frame: {}\n\
             Mean density: {:.3}\n\
             With neighbors: {}\n\
             Wall hits: {}",
            status,
            particles,
            report.frame,
            report.mean_density,
            report.with_neighbors,
            report.wall_hits
        );
    }
}
