//! Sprite rendering for fluid particles.
//!
//! [`SpriteBoard`] is the Bevy side of [`VisualHost`]: the simulation writes
//! display state into it, and [`sync_sprites`] turns that state into one
//! sprite entity per particle.

use bevy::prelude::*;

use super::host::{VisualHandle, VisualHost};
use super::particle::Appearance;

/// Configuration for fluid rendering.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct FluidRenderConfig {
    /// Screen pixels per simulation length unit.
    pub pixels_per_unit: f32,
    /// Sprite edge length in simulation units.
    pub particle_size: f32,
    /// Tint for particles without neighbors.
    pub neutral_color: Color,
    /// Tint for particles with at least one neighbor.
    pub neighbor_color: Color,
}

impl Default for FluidRenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 70.0,
            particle_size: 0.15,
            neutral_color: Color::srgb(0.55, 0.6, 0.7),
            neighbor_color: Color::srgb(0.2, 0.5, 0.9),
        }
    }
}

impl FluidRenderConfig {
    /// Sprite tint for an appearance.
    pub fn color_for(&self, appearance: Appearance) -> Color {
        match appearance {
            Appearance::Neutral => self.neutral_color,
            Appearance::HasNeighbors => self.neighbor_color,
        }
    }

    /// World translation of a simulation position.
    pub fn translation(&self, position: Vec2) -> Vec3 {
        (position * self.pixels_per_unit).extend(0.0)
    }

    pub fn sprite_size(&self) -> Vec2 {
        Vec2::splat(self.particle_size * self.pixels_per_unit)
    }
}

/// Marker component for rendered fluid particles. Holds the visual index.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct FluidParticleVisual(pub usize);

#[derive(Clone, Copy, Debug)]
struct SpriteSlot {
    entity: Option<Entity>,
    position: Vec2,
    flipped: bool,
    appearance: Appearance,
    dirty: bool,
}

/// Display state of every particle visual, waiting to be applied to sprites.
#[derive(Resource, Default, Debug)]
pub struct SpriteBoard {
    slots: Vec<SpriteSlot>,
}

impl SpriteBoard {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Last position written for a visual.
    pub fn position(&self, handle: VisualHandle) -> Option<Vec2> {
        self.slots.get(handle.0).map(|slot| slot.position)
    }

    pub fn appearance(&self, handle: VisualHandle) -> Option<Appearance> {
        self.slots.get(handle.0).map(|slot| slot.appearance)
    }

    pub fn flipped(&self, handle: VisualHandle) -> Option<bool> {
        self.slots.get(handle.0).map(|slot| slot.flipped)
    }

    fn slot_mut(&mut self, handle: VisualHandle) -> Option<&mut SpriteSlot> {
        let slot = self.slots.get_mut(handle.0)?;
        slot.dirty = true;
        Some(slot)
    }
}

impl VisualHost for SpriteBoard {
    fn create_visual(&mut self, position: Vec2) -> VisualHandle {
        self.slots.push(SpriteSlot {
            entity: None,
            position,
            flipped: false,
            appearance: Appearance::Neutral,
            dirty: true,
        });
        VisualHandle(self.slots.len() - 1)
    }

    fn set_visual_position(&mut self, handle: VisualHandle, position: Vec2) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.position = position;
        }
    }

    fn set_visual_facing(&mut self, handle: VisualHandle, flipped: bool) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.flipped = flipped;
        }
    }

    fn set_visual_appearance(&mut self, handle: VisualHandle, appearance: Appearance) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.appearance = appearance;
        }
    }
}

/// Spawns sprites for new visuals and applies changed state to existing ones.
pub fn sync_sprites(
    mut commands: Commands,
    mut board: ResMut<SpriteBoard>,
    config: Res<FluidRenderConfig>,
    mut sprites: Query<(&mut Transform, &mut Sprite), With<FluidParticleVisual>>,
) {
    for (index, slot) in board.slots.iter_mut().enumerate() {
        if !slot.dirty {
            continue;
        }
        match slot.entity {
            None => {
                let mut sprite =
                    Sprite::from_color(config.color_for(slot.appearance), config.sprite_size());
                sprite.flip_x = slot.flipped;
                let entity = commands
                    .spawn((
                        FluidParticleVisual(index),
                        sprite,
                        Transform::from_translation(config.translation(slot.position)),
                    ))
                    .id();
                slot.entity = Some(entity);
            }
            Some(entity) => {
                // Not spawned yet if the spawn command is still queued.
                let Ok((mut transform, mut sprite)) = sprites.get_mut(entity) else {
                    continue;
                };
                transform.translation = config.translation(slot.position);
                sprite.flip_x = slot.flipped;
                sprite.color = config.color_for(slot.appearance);
            }
        }
        slot.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_records_updates() {
        let mut board = SpriteBoard::default();
        let a = board.create_visual(Vec2::ZERO);
        let b = board.create_visual(Vec2::ONE);

        board.set_visual_position(b, Vec2::new(2.0, 3.0));
        board.set_visual_facing(a, true);
        board.set_visual_appearance(a, Appearance::HasNeighbors);

        assert_eq!(board.len(), 2);
        assert_eq!(board.position(b), Some(Vec2::new(2.0, 3.0)));
        assert_eq!(board.flipped(a), Some(true));
        assert_eq!(board.appearance(a), Some(Appearance::HasNeighbors));
        assert_eq!(board.appearance(b), Some(Appearance::Neutral));
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let mut board = SpriteBoard::default();
        board.set_visual_position(VisualHandle(3), Vec2::ONE);

        assert!(board.is_empty());
        assert_eq!(board.position(VisualHandle(3)), None);
    }

    #[test]
    fn test_render_config_mapping() {
        let config = FluidRenderConfig {
            pixels_per_unit: 10.0,
            ..default()
        };

        assert_eq!(config.translation(Vec2::new(1.0, -2.0)), Vec3::new(10.0, -20.0, 0.0));
        assert_eq!(config.color_for(Appearance::Neutral), config.neutral_color);
        assert_eq!(config.color_for(Appearance::HasNeighbors), config.neighbor_color);
    }

    #[test]
    fn test_sync_spawns_and_updates_sprites() {
        let mut app = App::new();
        app.init_resource::<SpriteBoard>()
            .init_resource::<FluidRenderConfig>()
            .add_systems(Update, sync_sprites);

        let handle = app
            .world_mut()
            .resource_mut::<SpriteBoard>()
            .create_visual(Vec2::new(1.0, 0.0));
        app.update();

        let mut query = app.world_mut().query::<(&FluidParticleVisual, &Transform)>();
        let spawned: Vec<_> = query.iter(app.world()).map(|(v, t)| (v.0, t.translation)).collect();
        assert_eq!(spawned, vec![(0, Vec3::new(70.0, 0.0, 0.0))]);

        {
            let mut board = app.world_mut().resource_mut::<SpriteBoard>();
            board.set_visual_position(handle, Vec2::new(0.0, 1.0));
            board.set_visual_facing(handle, true);
        }
        app.update();

        let mut query = app.world_mut().query::<(&Transform, &Sprite)>();
        let (transform, sprite) = query.single(app.world()).unwrap();
        assert_eq!(transform.translation, Vec3::new(0.0, 70.0, 0.0));
        assert!(sprite.flip_x);
    }
}
