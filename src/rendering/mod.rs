//! Meshes, camera and lighting for a windowed run.
//!
//! Nothing here feeds back into the simulation; visuals are attached to
//! simulation entities as they appear and follow their transforms.

use bevy::prelude::*;

use crate::collision::{Ground, Hitbox};
use crate::combat::{EnemyBullet, Gun, PlayerBullet};
use crate::enemies::Enemy;
use crate::player::movement::MovementConfig;
use crate::player::{AimPivot, Player};
use crate::sim::SimSet;

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_lighting).add_systems(
            Update,
            (
                attach_floor_visuals,
                attach_player_view,
                attach_enemy_visuals,
                attach_bullet_visuals,
                sync_camera_pitch,
                sync_gun_models,
            )
                .after(SimSet::Director),
        );
    }
}

/// First-person camera, child of the player body
#[derive(Component)]
pub struct PlayerCamera;

/// Viewmodel that tracks a gun's world position and aim
#[derive(Component)]
pub struct GunModel {
    pub owner: Entity,
}

fn spawn_lighting(mut commands: Commands) {
    commands.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Fallback view for the menu, before any player exists
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: -1,
            ..default()
        },
        Transform::from_xyz(0.0, 30.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn attach_floor_visuals(
    mut commands: Commands,
    floor_query: Query<(Entity, &Hitbox), Added<Ground>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, hitbox) in &floor_query {
        commands.entity(entity).try_insert((
            Mesh3d(meshes.add(Cuboid::from_size(hitbox.half_extents * 2.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.3, 0.3, 0.35),
                perceptual_roughness: 0.9,
                ..default()
            })),
        ));
    }
}

fn attach_player_view(
    mut commands: Commands,
    player_query: Query<Entity, Added<Player>>,
    config: Res<MovementConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for player in &player_query {
        commands.entity(player).try_insert(Visibility::default());

        commands.spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: 90.0_f32.to_radians(),
                ..default()
            }),
            Transform::from_xyz(0.0, config.eye_height, 0.0),
            PlayerCamera,
            ChildOf(player),
        ));

        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(0.1, 0.12, 0.6))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.2, 0.2, 0.22),
                metallic: 0.6,
                ..default()
            })),
            Transform::default(),
            GunModel { owner: player },
        ));
    }
}

fn attach_enemy_visuals(
    mut commands: Commands,
    enemy_query: Query<(Entity, &Hitbox), Added<Enemy>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, hitbox) in &enemy_query {
        commands.entity(entity).try_insert((
            Mesh3d(meshes.add(Cuboid::from_size(hitbox.half_extents * 2.0))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.8, 0.2, 0.2),
                ..default()
            })),
        ));
    }
}

fn attach_bullet_visuals(
    mut commands: Commands,
    player_bullets: Query<(Entity, &Hitbox), Added<PlayerBullet>>,
    enemy_bullets: Query<(Entity, &Hitbox), Added<EnemyBullet>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, hitbox) in &player_bullets {
        commands.entity(entity).try_insert((
            Mesh3d(meshes.add(Sphere::new(hitbox.half_extents.x))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.9, 0.3),
                emissive: LinearRgba::rgb(5.0, 4.0, 1.0),
                ..default()
            })),
        ));
    }

    for (entity, hitbox) in &enemy_bullets {
        commands.entity(entity).try_insert((
            Mesh3d(meshes.add(Sphere::new(hitbox.half_extents.x))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.3, 0.1),
                emissive: LinearRgba::rgb(5.0, 1.0, 0.5),
                ..default()
            })),
        ));
    }
}

/// Pitch only tilts the camera; yaw is already on the body
fn sync_camera_pitch(
    player_query: Query<&AimPivot, With<Player>>,
    mut camera_query: Query<(&ChildOf, &mut Transform), With<PlayerCamera>>,
) {
    for (child_of, mut transform) in &mut camera_query {
        if let Ok(pivot) = player_query.get(child_of.parent()) {
            transform.rotation = Quat::from_rotation_x(pivot.pitch);
        }
    }
}

fn sync_gun_models(
    mut commands: Commands,
    gun_query: Query<&Gun>,
    mut model_query: Query<(Entity, &GunModel, &mut Transform)>,
) {
    for (entity, model, mut transform) in &mut model_query {
        let Ok(gun) = gun_query.get(model.owner) else {
            commands.entity(entity).despawn();
            continue;
        };

        transform.translation = gun.world_position;
        transform.rotation = gun.rotation();
    }
}
