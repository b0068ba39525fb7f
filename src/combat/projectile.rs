use bevy::prelude::*;

use super::damage::{Damaging, Faction};
use crate::collision::{overlaps, Hitbox};
use crate::player::movement::MovementConfig;
use crate::player::Player;
use crate::state::GameState;

/// Straight-line bullet fired by the player's gun
#[derive(Component, Clone, Debug)]
pub struct PlayerBullet {
    pub direction: Vec3,
    pub speed: f32,
    pub range: f32,
}

/// Bullet fired by an enemy at one specific target
#[derive(Component, Clone, Debug)]
pub struct EnemyBullet {
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub range: f32,
    pub target: Entity,
}

pub fn player_bullet_bundle(
    origin: Vec3,
    bullet: PlayerBullet,
    damage: f32,
    half_extent: f32,
) -> impl Bundle {
    (
        Transform::from_translation(origin),
        Hitbox::cube(half_extent),
        Damaging {
            amount: damage,
            faction: Faction::Player,
        },
        PlayerBullet {
            direction: bullet.direction.normalize_or_zero(),
            ..bullet
        },
    )
}

pub fn enemy_bullet_bundle(origin: Vec3, bullet: EnemyBullet, half_extent: f32) -> impl Bundle {
    (
        Transform::from_translation(origin),
        Hitbox::cube(half_extent),
        Damaging {
            amount: bullet.damage,
            faction: Faction::Enemy,
        },
        EnemyBullet {
            direction: bullet.direction.normalize_or_zero(),
            ..bullet
        },
    )
}

/// Exactly at `range` still counts as in range
pub fn beyond_range(position: Vec3, anchor: Vec3, range: f32) -> bool {
    position.distance(anchor) > range
}

/// Move player bullets and drop the ones that left the viewer's range
pub fn advance_player_bullets(
    mut commands: Commands,
    mut bullet_query: Query<(Entity, &mut Transform, &PlayerBullet)>,
    player_query: Query<&Transform, (With<Player>, Without<PlayerBullet>)>,
    movement: Res<MovementConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    let viewer = player_query
        .single()
        .ok()
        .map(|transform| transform.translation + Vec3::Y * movement.eye_height);

    for (entity, mut transform, bullet) in &mut bullet_query {
        transform.translation += bullet.direction * bullet.speed * dt;

        let out_of_range = match viewer {
            Some(viewer) => beyond_range(transform.translation, viewer, bullet.range),
            None => true,
        };
        if out_of_range {
            commands.entity(entity).despawn();
        }
    }
}

/// Move enemy bullets, hurting their target on contact
pub fn advance_enemy_bullets(
    mut commands: Commands,
    mut bullet_query: Query<(Entity, &mut Transform, &Hitbox, &EnemyBullet)>,
    target_query: Query<(&Transform, &Hitbox), (With<Player>, Without<EnemyBullet>)>,
    mut state: ResMut<GameState>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, hitbox, bullet) in &mut bullet_query {
        let Ok((target_transform, target_hitbox)) = target_query.get(bullet.target) else {
            commands.entity(entity).despawn();
            continue;
        };

        transform.translation += bullet.direction * bullet.speed * dt;

        if overlaps(
            transform.translation,
            hitbox,
            target_transform.translation,
            target_hitbox,
        ) {
            state.take_damage(bullet.damage);
            commands.entity(entity).despawn();
            debug!("Enemy bullet hit, health now {:.1}", state.health());
            continue;
        }

        if beyond_range(transform.translation, target_transform.translation, bullet.range) {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::player::player_bundle;
    use crate::testing::test_app;

    fn spawn_player(app: &mut App, position: Vec3) -> Entity {
        let bundle = player_bundle(position, &MovementConfig::default());
        app.world_mut().spawn(bundle).id()
    }

    fn enemy_shot(target: Entity, direction: Vec3) -> EnemyBullet {
        EnemyBullet {
            direction,
            speed: 20.0,
            damage: 10.0,
            range: 100.0,
            target,
        }
    }

    // ==================== Range Tests ====================

    #[test]
    fn test_exact_range_is_kept() {
        assert!(!beyond_range(Vec3::new(200.0, 0.0, 0.0), Vec3::ZERO, 200.0));
        assert!(beyond_range(Vec3::new(200.5, 0.0, 0.0), Vec3::ZERO, 200.0));
    }

    #[test]
    fn test_player_bullet_removed_just_past_range() {
        let mut app = test_app();
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(125)));
        // Menu: the player stays put while bullets still fly
        spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let viewer = Vec3::new(0.0, 2.0, 0.0);
        let bullet = app
            .world_mut()
            .spawn(player_bullet_bundle(
                viewer,
                PlayerBullet {
                    direction: Vec3::X,
                    speed: 400.0,
                    range: 200.0,
                },
                10.0,
                0.05,
            ))
            .id();

        // 50 units per frame lands exactly on the range boundary
        for _ in 0..10 {
            let x = app.world().get::<Transform>(bullet).unwrap().translation.x;
            if x >= 200.0 {
                break;
            }
            app.update();
        }
        let transform = app.world().get::<Transform>(bullet).unwrap();
        assert_eq!(transform.translation.x, 200.0);

        app.update();
        assert!(app.world().get_entity(bullet).is_err());
    }

    #[test]
    fn test_player_bullet_without_viewer_is_removed() {
        let mut app = test_app();
        let bullet = app
            .world_mut()
            .spawn(player_bullet_bundle(
                Vec3::ZERO,
                PlayerBullet {
                    direction: Vec3::X,
                    speed: 60.0,
                    range: 200.0,
                },
                10.0,
                0.05,
            ))
            .id();

        app.update();

        assert!(app.world().get_entity(bullet).is_err());
    }

    #[test]
    fn test_paused_run_freezes_bullets() {
        let mut app = test_app();
        spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        {
            let mut state = app.world_mut().resource_mut::<GameState>();
            state.reset();
            state.pause_toggle();
        }
        let bullet = app
            .world_mut()
            .spawn(player_bullet_bundle(
                Vec3::new(0.0, 2.0, -5.0),
                PlayerBullet {
                    direction: Vec3::NEG_Z,
                    speed: 60.0,
                    range: 200.0,
                },
                10.0,
                0.05,
            ))
            .id();

        for _ in 0..10 {
            app.update();
        }

        let transform = app.world().get::<Transform>(bullet).unwrap();
        assert_eq!(transform.translation, Vec3::new(0.0, 2.0, -5.0));
    }

    // ==================== Enemy Bullet Tests ====================

    #[test]
    fn test_enemy_bullet_hits_player() {
        let mut app = test_app();
        app.world_mut().resource_mut::<GameState>().reset();
        let player = spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let bullet = app
            .world_mut()
            .spawn(enemy_bullet_bundle(
                Vec3::new(0.0, 1.0, 0.3),
                enemy_shot(player, Vec3::NEG_Z),
                0.1,
            ))
            .id();

        app.update();

        // One frame of drain plus the hit
        let health = app.world().resource::<GameState>().health();
        assert!((health - 89.9).abs() < 0.001);
        assert!(app.world().get_entity(bullet).is_err());
    }

    #[test]
    fn test_enemy_bullet_without_target_is_removed() {
        let mut app = test_app();
        let player = spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let bullet = app
            .world_mut()
            .spawn(enemy_bullet_bundle(
                Vec3::new(0.0, 1.0, 30.0),
                enemy_shot(player, Vec3::NEG_Z),
                0.1,
            ))
            .id();
        app.world_mut().despawn(player);

        app.update();

        assert!(app.world().get_entity(bullet).is_err());
    }

    #[test]
    fn test_enemy_bullet_removed_far_from_target() {
        let mut app = test_app();
        let player = spawn_player(&mut app, Vec3::new(0.0, 1.0, 0.0));
        let bullet = app
            .world_mut()
            .spawn(enemy_bullet_bundle(
                Vec3::new(0.0, 1.0, 101.0),
                enemy_shot(player, Vec3::Z),
                0.1,
            ))
            .id();

        app.update();

        assert!(app.world().get_entity(bullet).is_err());
    }
}
