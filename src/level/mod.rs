use bevy::prelude::*;

use crate::collision::{Ground, Hitbox};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_arena);
    }
}

/// Half-width of the square arena floor
pub const ARENA_SIZE: f32 = 50.0;
pub const FLOOR_THICKNESS: f32 = 1.0;

fn spawn_arena(mut commands: Commands) {
    // Floor top sits at y = 0
    commands.spawn((
        Name::new("Arena floor"),
        Transform::from_xyz(0.0, -FLOOR_THICKNESS / 2.0, 0.0),
        Hitbox::new(Vec3::new(ARENA_SIZE, FLOOR_THICKNESS / 2.0, ARENA_SIZE)),
        Ground,
    ));
}
