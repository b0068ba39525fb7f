use bevy::prelude::*;

use super::projectile::{player_bullet_bundle, PlayerBullet};
use crate::player::input::PlayerInput;
use crate::player::movement::MovementConfig;
use crate::player::{AimPivot, CameraFrame, Player};

/// Gun handling and ballistics
#[derive(Resource, Clone, Debug)]
pub struct WeaponConfig {
    pub cooldown: f32,                  // Seconds between shots
    pub spring_constant: f32,           // Aim spring stiffness
    pub spring_damping: f32,            // Velocity kept per frame by the aim spring
    pub recoil_damping: f32,            // Recoil lerp rate toward rest
    pub position_offset: Vec3,          // Gun position relative to the camera (right, up, forward)
    pub vertical_look_sensitivity: f32, // Extra lift per radian of camera pitch
    pub aim_bias: Vec2,                 // Fixed (yaw, pitch) added to the aim target
    pub barrel_offset: Vec3,            // Muzzle relative to the gun (right, up, forward)
    pub recoil_kick_distance: f32,      // Backward snap on fire
    pub recoil_kick_rotation: Vec2,     // (yaw, pitch) snap on fire
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub bullet_half_extent: f32,
    pub bullet_range: f32, // Max distance from the viewer before despawn
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown: 0.2,
            spring_constant: 200.0,
            spring_damping: 0.8,
            recoil_damping: 5.0,
            position_offset: Vec3::new(0.6, -0.3, 0.6),
            vertical_look_sensitivity: 0.2,
            aim_bias: Vec2::new(0.0, 3.0_f32.to_radians()),
            barrel_offset: Vec3::new(0.0, 0.07, 0.56),
            recoil_kick_distance: 0.6,
            recoil_kick_rotation: Vec2::new(0.0, 15.0_f32.to_radians()),
            bullet_speed: 60.0,
            bullet_damage: 10.0,
            bullet_half_extent: 0.05,
            bullet_range: 200.0,
        }
    }
}

/// The player's weapon: spring-driven aim sway plus recoil
#[derive(Component, Clone, Debug, Default)]
pub struct Gun {
    pub current_yaw: f32,
    pub target_yaw: f32,
    pub yaw_velocity: f32,
    pub current_pitch: f32,
    pub target_pitch: f32,
    pub pitch_velocity: f32,
    pub recoil_offset: Vec3,
    /// (yaw, pitch)
    pub recoil_rotation: Vec2,
    pub world_position: Vec3,
    pub last_shot_time: Option<f32>,
}

/// Where a fired bullet starts and where it goes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Fired every time a gun actually shoots
#[derive(Event, Clone, Copy, Debug)]
pub struct ShotFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// One semi-implicit Euler step of a damped spring. Returns (position, velocity).
pub fn spring_step(
    current: f32,
    target: f32,
    velocity: f32,
    stiffness: f32,
    damping: f32,
    dt: f32,
) -> (f32, f32) {
    let mut velocity = velocity + (target - current) * stiffness * dt;
    velocity *= damping;
    (current + velocity * dt, velocity)
}

impl Gun {
    pub fn set_target_rotation(&mut self, yaw: f32, pitch: f32, config: &WeaponConfig) {
        self.target_yaw = yaw + config.aim_bias.x;
        self.target_pitch = pitch + config.aim_bias.y;
    }

    /// Aim rotation including the recoil kick
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.current_yaw + self.recoil_rotation.x,
            self.current_pitch + self.recoil_rotation.y,
            0.0,
        )
    }

    /// Decay recoil, place the gun in front of the camera, then spring toward the aim target
    pub fn update(&mut self, camera: &CameraFrame, config: &WeaponConfig, dt: f32) {
        let t = dt * config.recoil_damping;
        self.recoil_offset = self.recoil_offset.lerp(Vec3::ZERO, t);
        self.recoil_rotation = self.recoil_rotation.lerp(Vec2::ZERO, t);

        let offset = config.position_offset;
        self.world_position = camera.position
            + camera.forward() * offset.z
            + camera.right() * offset.x
            + camera.up() * (offset.y + camera.pitch * config.vertical_look_sensitivity)
            + self.recoil_offset;

        (self.current_yaw, self.yaw_velocity) = spring_step(
            self.current_yaw,
            self.target_yaw,
            self.yaw_velocity,
            config.spring_constant,
            config.spring_damping,
            dt,
        );
        (self.current_pitch, self.pitch_velocity) = spring_step(
            self.current_pitch,
            self.target_pitch,
            self.pitch_velocity,
            config.spring_constant,
            config.spring_damping,
            dt,
        );
    }

    pub fn can_fire(&self, now: f32, cooldown: f32) -> bool {
        self.last_shot_time.is_none_or(|last| now - last >= cooldown)
    }

    /// Fire if the cooldown allows it, kicking the gun back
    pub fn try_shoot(&mut self, now: f32, config: &WeaponConfig) -> Option<Shot> {
        if !self.can_fire(now, config.cooldown) {
            return None;
        }
        self.last_shot_time = Some(now);

        let rotation = self.rotation();
        let forward = rotation * Vec3::NEG_Z;
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;

        self.recoil_offset = -forward * config.recoil_kick_distance;
        self.recoil_rotation = config.recoil_kick_rotation;

        let barrel = config.barrel_offset;
        Some(Shot {
            origin: self.world_position + forward * barrel.z + right * barrel.x + up * barrel.y,
            direction: forward,
        })
    }
}

/// Move every gun with its owner's view
pub fn update_guns(
    mut player_query: Query<(&Transform, &AimPivot, &mut Gun), With<Player>>,
    movement: Res<MovementConfig>,
    config: Res<WeaponConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (transform, pivot, mut gun) in &mut player_query {
        let camera = pivot.camera_frame(transform.translation, movement.eye_height);
        gun.update(&camera, &config, dt);
    }
}

/// Handle the fire input, spawning one bullet per accepted shot
pub fn fire_guns(
    mut commands: Commands,
    input: Res<PlayerInput>,
    mut player_query: Query<(Entity, &mut Gun), With<Player>>,
    mut shots: EventWriter<ShotFired>,
    config: Res<WeaponConfig>,
    time: Res<Time>,
) {
    if !input.fire {
        return;
    }

    let now = time.elapsed_secs();

    for (shooter, mut gun) in &mut player_query {
        let Some(shot) = gun.try_shoot(now, &config) else {
            continue;
        };

        commands.spawn(player_bullet_bundle(
            shot.origin,
            PlayerBullet {
                direction: shot.direction,
                speed: config.bullet_speed,
                range: config.bullet_range,
            },
            config.bullet_damage,
            config.bullet_half_extent,
        ));

        shots.write(ShotFired {
            shooter,
            origin: shot.origin,
            direction: shot.direction,
        });
        debug!("Shot fired from {:?}", shot.origin);
    }
}
