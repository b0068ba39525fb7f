use bevy::prelude::*;

use crate::collision::{ground_contact, Ground, Hitbox};
use crate::combat::{Gun, WeaponConfig};
use crate::sim::SimSet;
use crate::state::GameState;

pub mod input;
pub mod movement;

use input::PlayerInput;
use movement::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementConfig>()
            .init_resource::<PlayerInput>()
            .add_event::<PlayerDeathEvent>()
            .add_systems(
                Update,
                (
                    player_look, // Update view angles FIRST
                    drain_health,
                    player_movement, // Then move along the updated view
                    apply_gravity,
                    player_jump,
                    apply_player_friction,
                    aim_gun,
                )
                    .chain()
                    .in_set(SimSet::Player),
            )
            // Ungated: the run is already over by the time this matters
            .add_systems(Update, check_player_death.in_set(SimSet::Director));
    }
}

#[derive(Component, Default, Debug)]
pub struct Player {
    /// Keep simulating while the run is paused or over
    pub bypass_run_status: bool,
    death_reported: bool,
}

/// Camera pivot angles in radians. Yaw turns the body, pitch only tilts the view.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct AimPivot {
    pub yaw: f32,
    pub pitch: f32,
}

/// World-space view of the camera pivot
#[derive(Clone, Copy, Debug)]
pub struct CameraFrame {
    pub position: Vec3,
    pub rotation: Quat,
    pub pitch: f32,
}

impl CameraFrame {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl AimPivot {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn camera_frame(&self, body: Vec3, eye_height: f32) -> CameraFrame {
        CameraFrame {
            position: body + Vec3::Y * eye_height,
            rotation: self.rotation(),
            pitch: self.pitch,
        }
    }
}

/// Reported once when the shared state first turns Dead
#[derive(Event, Clone, Copy, Debug)]
pub struct PlayerDeathEvent;

pub fn player_bundle(position: Vec3, config: &MovementConfig) -> impl Bundle + use<> {
    (
        Player::default(),
        Transform::from_translation(position),
        Velocity::default(),
        PlayerState::default(),
        WishDir::default(),
        AimPivot::default(),
        Hitbox::new(config.half_extents),
        Gun::default(),
    )
}

/// Player systems run while the run is live, or always for a bypassing player
pub fn player_active(state: Res<GameState>, player_query: Query<&Player>) -> bool {
    state.is_playing() || player_query.iter().any(|player| player.bypass_run_status)
}

fn player_look(
    input: Res<PlayerInput>,
    mut player_query: Query<(&mut Transform, &mut AimPivot), With<Player>>,
    config: Res<MovementConfig>,
) {
    let delta = input.look_delta;
    if delta == Vec2::ZERO {
        return;
    }

    for (mut transform, mut pivot) in &mut player_query {
        pivot.yaw -= delta.x * config.look_sensitivity;
        pivot.pitch -= delta.y * config.look_sensitivity;
        pivot.pitch = pivot.pitch.clamp(-config.max_pitch, config.max_pitch);

        // Yaw turns the whole body
        transform.rotation = Quat::from_rotation_y(pivot.yaw);
    }
}

fn drain_health(
    mut state: ResMut<GameState>,
    player_query: Query<(), With<Player>>,
    config: Res<MovementConfig>,
) {
    if player_query.is_empty() {
        return;
    }
    state.heal(-config.health_drain_per_frame);
}

fn player_movement(
    input: Res<PlayerInput>,
    mut player_query: Query<(&mut Transform, &mut Velocity, &mut WishDir, &AimPivot), With<Player>>,
    config: Res<MovementConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut velocity, mut wish_dir, pivot) in &mut player_query {
        let view = pivot.rotation();
        wish_dir.0 = wish_direction(view * Vec3::NEG_Z, view * Vec3::X, &input);

        velocity.0 = accelerate(velocity.0, wish_dir.0, config.acceleration, config.speed, dt);
        transform.translation += velocity.0 * dt;
    }
}

fn apply_gravity(
    mut player_query: Query<
        (&mut Transform, &mut Velocity, &mut PlayerState, &Hitbox),
        With<Player>,
    >,
    ground_query: Query<(&Transform, &Hitbox), (With<Ground>, Without<Player>)>,
    config: Res<MovementConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for (mut transform, mut velocity, mut state, hitbox) in &mut player_query {
        if !state.grounded {
            velocity.0.y -= config.gravity * dt;
        }

        let contact = ground_contact(transform.translation, hitbox, ground_query.iter());
        let (position, resolved, grounded) = resolve_ground(
            transform.translation,
            velocity.0,
            state.grounded,
            contact,
            hitbox.half_extents.y,
        );

        transform.translation = position;
        velocity.0 = resolved;
        state.grounded = grounded;
    }
}

fn player_jump(
    input: Res<PlayerInput>,
    mut player_query: Query<(&mut Velocity, &mut PlayerState), With<Player>>,
    config: Res<MovementConfig>,
) {
    for (mut velocity, mut state) in &mut player_query {
        state.wish_jump = input.jump;

        if state.grounded && state.wish_jump {
            velocity.0.y = jump_speed(config.jump_height, config.gravity);
            state.grounded = false;
        }
    }
}

fn apply_player_friction(
    mut player_query: Query<&mut Velocity, With<Player>>,
    config: Res<MovementConfig>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();

    for mut velocity in &mut player_query {
        velocity.0 = apply_friction(velocity.0, config.friction, dt);
    }
}

/// Feed the pivot angles to the gun's aim spring
fn aim_gun(
    mut player_query: Query<(&AimPivot, &mut Gun), With<Player>>,
    config: Res<WeaponConfig>,
) {
    for (pivot, mut gun) in &mut player_query {
        gun.set_target_rotation(pivot.yaw, pivot.pitch, &config);
    }
}

pub fn check_player_death(
    state: Res<GameState>,
    mut player_query: Query<&mut Player>,
    mut deaths: EventWriter<PlayerDeathEvent>,
) {
    if !state.is_dead() {
        return;
    }

    for mut player in &mut player_query {
        if !player.death_reported {
            player.death_reported = true;
            deaths.write(PlayerDeathEvent);
        }
    }
}
