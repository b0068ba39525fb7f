//! Enemy pursuit, shooting, damage intake and delayed removal

use std::collections::HashSet;

use bevy::prelude::*;
use rand::Rng;

use crate::collision::{contacts, Hitbox};
use crate::combat::{enemy_bullet_bundle, Damaging, EnemyBullet, Faction, Health};
use crate::player::movement::Velocity;
use crate::player::Player;
use crate::sim::SimSet;
use crate::state::GameState;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyConfig>()
            .add_event::<EnemyDeathEvent>()
            .add_systems(Update, tick_pending_removals.in_set(SimSet::Timers))
            .add_systems(
                Update,
                (enemy_pursuit, enemy_attack, enemy_damage_intake)
                    .chain()
                    .in_set(SimSet::Enemies),
            );
    }
}

/// Enemy tuning. Per-enemy stats are rolled from the ranges at spawn.
#[derive(Resource, Clone, Debug)]
pub struct EnemyConfig {
    pub speed_range: (f32, f32),
    pub hover_range: (f32, f32),
    pub friction_range: (f32, f32),
    pub max_health: f32,
    pub half_extents: Vec3,
    pub shoot_range: f32,    // Horizontal distance to start shooting
    pub shoot_cooldown: f32, // Seconds between shots
    pub muzzle_distance: f32, // Bullet spawn distance ahead of the body
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_range: f32, // Max distance from the target before despawn
    pub bullet_half_extent: f32,
    pub death_delay: f32, // Seconds between death and removal
    pub death_rise: f32,  // Height gained over the death animation
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed_range: (4.0, 12.0),
            hover_range: (2.0, 5.0),
            friction_range: (0.1, 0.3),
            max_health: 100.0,
            half_extents: Vec3::splat(1.0),
            shoot_range: 15.0,
            shoot_cooldown: 1.0,
            muzzle_distance: 1.5,
            bullet_speed: 20.0,
            bullet_damage: 10.0,
            bullet_range: 100.0,
            bullet_half_extent: 0.1,
            death_delay: 1.0,
            death_rise: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub hover_height: f32,
    pub friction: f32,
}

impl EnemyConfig {
    pub fn roll_stats(&self, rng: &mut impl Rng) -> EnemyStats {
        EnemyStats {
            speed: rng.gen_range(self.speed_range.0..=self.speed_range.1),
            hover_height: rng.gen_range(self.hover_range.0..=self.hover_range.1),
            friction: rng.gen_range(self.friction_range.0..=self.friction_range.1),
        }
    }
}

/// Enemy component with stats
#[derive(Component, Clone, Debug)]
pub struct Enemy {
    pub speed: f32,
    pub hover_height: f32,
    pub friction: f32,
    pub shoot_range: f32,
    pub shoot_cooldown: f32,
    pub last_shot_time: Option<f32>,
    /// Facing around the vertical axis; 0 looks down +Z
    pub yaw_degrees: f32,
    pub is_dying: bool,
    pub target: Option<Entity>,
}

impl Enemy {
    pub fn new(stats: EnemyStats, config: &EnemyConfig, target: Entity) -> Self {
        Self {
            speed: stats.speed,
            hover_height: stats.hover_height,
            friction: stats.friction,
            shoot_range: config.shoot_range,
            shoot_cooldown: config.shoot_cooldown,
            last_shot_time: None,
            yaw_degrees: 0.0,
            is_dying: false,
            target: Some(target),
        }
    }

    /// Returns true only on the first call
    pub fn begin_dying(&mut self) -> bool {
        if self.is_dying {
            return false;
        }
        self.is_dying = true;
        self.target = None;
        true
    }

    pub fn ready_to_fire(&self, now: f32) -> bool {
        self.last_shot_time
            .is_none_or(|last| now - last >= self.shoot_cooldown)
    }

    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw_degrees.to_radians()) * Vec3::Z
    }
}

/// Sent when a dead enemy's removal timer runs out
#[derive(Event, Clone, Copy, Debug)]
pub struct EnemyDeathEvent {
    pub enemy: Entity,
}

/// Delayed removal of a dying enemy. Despawning the entity cancels it.
#[derive(Component, Debug)]
pub struct PendingRemoval {
    pub timer: Timer,
    pub start_y: f32,
    pub rise: f32,
}

impl PendingRemoval {
    pub fn new(start_y: f32, delay: f32, rise: f32) -> Self {
        Self {
            timer: Timer::from_seconds(delay, TimerMode::Once),
            start_y,
            rise,
        }
    }

    pub fn height(&self) -> f32 {
        self.start_y + self.rise * in_expo(self.timer.fraction())
    }
}

/// Exponential ease-in
pub fn in_expo(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else {
        2.0_f32.powf(10.0 * t - 10.0)
    }
}

pub fn enemy_bundle(
    position: Vec3,
    stats: EnemyStats,
    config: &EnemyConfig,
    target: Entity,
) -> impl Bundle + use<> {
    (
        Enemy::new(stats, config, target),
        Transform::from_xyz(position.x, stats.hover_height, position.z),
        Velocity::default(),
        Health::new(config.max_health),
        Hitbox::new(config.half_extents),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuitStep {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw_degrees: f32,
}

/// One frame of horizontal chase with proportional friction, pinned to the hover height
pub fn pursuit_step(
    position: Vec3,
    velocity: Vec3,
    target: Vec3,
    enemy: &Enemy,
    dt: f32,
) -> PursuitStep {
    let mut direction = target - position;
    direction.y = 0.0;
    let direction = direction.normalize_or_zero();

    let mut velocity = velocity + direction * enemy.speed * dt;
    velocity -= velocity * enemy.friction * dt;

    let mut position = position + velocity * dt;
    position.y = enemy.hover_height;

    PursuitStep {
        position,
        velocity,
        yaw_degrees: direction.x.atan2(direction.z).to_degrees(),
    }
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

fn enemy_pursuit(
    mut commands: Commands,
    mut enemy_query: Query<(Entity, &mut Transform, &mut Velocity, &mut Enemy), Without<Player>>,
    player_query: Query<&Transform, (With<Player>, Without<Enemy>)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut velocity, mut enemy) in &mut enemy_query {
        if enemy.is_dying {
            continue;
        }

        let Some(target) = enemy
            .target
            .and_then(|target| player_query.get(target).ok())
            .map(|transform| transform.translation)
        else {
            debug!("Enemy {entity:?} lost its target");
            commands.entity(entity).despawn();
            continue;
        };

        let step = pursuit_step(transform.translation, velocity.0, target, &enemy, dt);
        transform.translation = step.position;
        transform.rotation = Quat::from_rotation_y(step.yaw_degrees.to_radians());
        velocity.0 = step.velocity;
        enemy.yaw_degrees = step.yaw_degrees;
    }
}

fn enemy_attack(
    mut commands: Commands,
    mut enemy_query: Query<(&Transform, &mut Enemy)>,
    player_query: Query<&Transform, With<Player>>,
    config: Res<EnemyConfig>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for (transform, mut enemy) in &mut enemy_query {
        if enemy.is_dying {
            continue;
        }
        let Some(target) = enemy.target else {
            continue;
        };
        let Ok(target_transform) = player_query.get(target) else {
            continue;
        };

        let distance = horizontal_distance(transform.translation, target_transform.translation);
        if distance > enemy.shoot_range || !enemy.ready_to_fire(now) {
            continue;
        }

        let origin = transform.translation + enemy.forward() * config.muzzle_distance;
        commands.spawn(enemy_bullet_bundle(
            origin,
            EnemyBullet {
                direction: target_transform.translation - transform.translation,
                speed: config.bullet_speed,
                damage: config.bullet_damage,
                range: config.bullet_range,
                target,
            },
            config.bullet_half_extent,
        ));
        enemy.last_shot_time = Some(now);
    }
}

/// Apply at most one player hit per enemy per frame; a bullet is spent on the first enemy it hurts
fn enemy_damage_intake(
    mut commands: Commands,
    mut enemy_query: Query<(
        Entity,
        &Transform,
        &Hitbox,
        &mut Enemy,
        &mut Health,
        &mut Velocity,
    )>,
    body_query: Query<(Entity, &Transform, &Hitbox, Option<&Damaging>)>,
    mut state: ResMut<GameState>,
    config: Res<EnemyConfig>,
) {
    let mut spent = HashSet::new();

    for (entity, transform, hitbox, mut enemy, mut health, mut velocity) in &mut enemy_query {
        if enemy.is_dying {
            continue;
        }

        let hit = contacts(entity, transform.translation, hitbox, body_query.iter())
            .into_iter()
            .filter(|contact| !spent.contains(&contact.entity))
            .find_map(|contact| {
                contact
                    .damaging
                    .filter(|damaging| damaging.hurts(Faction::Enemy))
                    .map(|damaging| (contact.entity, damaging))
            });
        let Some((bullet, damaging)) = hit else {
            continue;
        };

        spent.insert(bullet);
        commands.entity(bullet).despawn();
        health.take_damage(damaging.amount);
        debug!("Enemy {entity:?} hit, health {:.0}", health.current);

        if health.is_dead() && enemy.begin_dying() {
            state.add_kill();
            velocity.0 = Vec3::ZERO;
            commands
                .entity(entity)
                .remove::<Hitbox>()
                .insert(PendingRemoval::new(
                    transform.translation.y,
                    config.death_delay,
                    config.death_rise,
                ));
            info!("Enemy {entity:?} killed ({} total)", state.kills());
        }
    }
}

/// Animate dying enemies upward and remove them once their timer runs out
fn tick_pending_removals(
    mut commands: Commands,
    mut removal_query: Query<(Entity, &mut Transform, &mut PendingRemoval)>,
    mut deaths: EventWriter<EnemyDeathEvent>,
    time: Res<Time>,
) {
    for (entity, mut transform, mut removal) in &mut removal_query {
        removal.timer.tick(time.delta());
        transform.translation.y = removal.height();

        if removal.timer.finished() {
            commands.entity(entity).despawn();
            deaths.write(EnemyDeathEvent { enemy: entity });
        }
    }
}
