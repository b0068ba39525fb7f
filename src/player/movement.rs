use bevy::prelude::*;

use super::input::PlayerInput;

/// Arena movement tuning
#[derive(Resource, Clone, Debug)]
pub struct MovementConfig {
    pub speed: f32,                  // Velocity magnitude cap (units/sec)
    pub acceleration: f32,           // Acceleration toward the wish direction (units/sec^2)
    pub jump_height: f32,            // Apex height of a standing jump
    pub gravity: f32,                // Gravity (units/sec^2)
    pub friction: f32,               // Fraction of horizontal velocity shed per second
    pub half_extents: Vec3,          // Player body box
    pub eye_height: f32,             // Camera pivot above the body centre
    pub look_sensitivity: f32,       // Radians per pixel of mouse motion
    pub max_pitch: f32,              // Look up/down limit (radians)
    pub health_drain_per_frame: f32, // Passive drain applied every simulated frame
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 30.0,
            acceleration: 30.0,
            jump_height: 2.0,
            gravity: 9.81,
            friction: 5.0,
            half_extents: Vec3::new(0.5, 1.0, 0.5),
            eye_height: 1.0,
            look_sensitivity: 0.002,
            max_pitch: 80.0_f32.to_radians(),
            health_drain_per_frame: 0.1,
        }
    }
}

#[derive(Component, Default, Clone)]
pub struct Velocity(pub Vec3);

#[derive(Component, Default)]
pub struct PlayerState {
    pub grounded: bool,
    pub wish_jump: bool,
}

/// Input wish direction (normalized horizontal direction player wants to move)
#[derive(Component, Default)]
pub struct WishDir(pub Vec3);

/// Directions shorter than this are treated as no input
const MIN_DIRECTION_LENGTH_SQ: f32 = 1e-6;

/// Flatten a view vector onto the ground plane
pub fn horizontal(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() > MIN_DIRECTION_LENGTH_SQ {
        flat.normalize()
    } else {
        Vec3::ZERO
    }
}

/// Build the normalized wish direction from the four movement axes
pub fn wish_direction(forward: Vec3, right: Vec3, input: &PlayerInput) -> Vec3 {
    let forward = horizontal(forward);
    let right = horizontal(right);

    let mut dir = Vec3::ZERO;
    if input.forward {
        dir += forward;
    }
    if input.back {
        dir -= forward;
    }
    if input.right {
        dir += right;
    }
    if input.left {
        dir -= right;
    }

    if dir.length_squared() > MIN_DIRECTION_LENGTH_SQ {
        dir.normalize()
    } else {
        Vec3::ZERO
    }
}

/// Accelerate toward `wish_dir`, capping the whole velocity by magnitude
pub fn accelerate(velocity: Vec3, wish_dir: Vec3, accel: f32, max_speed: f32, dt: f32) -> Vec3 {
    if wish_dir == Vec3::ZERO {
        return velocity;
    }

    let new_vel = velocity + wish_dir * accel * dt;
    if new_vel.length() > max_speed {
        new_vel.normalize() * max_speed
    } else {
        new_vel
    }
}

/// Proportional damping of the horizontal components
pub fn apply_friction(velocity: Vec3, friction: f32, dt: f32) -> Vec3 {
    let drop = friction * dt;
    Vec3::new(
        velocity.x - velocity.x * drop,
        velocity.y,
        velocity.z - velocity.z * drop,
    )
}

pub fn jump_speed(jump_height: f32, gravity: f32) -> f32 {
    (2.0 * jump_height * gravity).sqrt()
}

/// Settle a body against the ground contact found this frame.
///
/// Only a falling body lands; one rising through a surface keeps going. No contact means airborne.
pub fn resolve_ground(
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    contact_y: Option<f32>,
    half_height: f32,
) -> (Vec3, Vec3, bool) {
    let Some(top) = contact_y else {
        return (position, velocity, false);
    };

    if velocity.y < 0.0 {
        let landed = Vec3::new(position.x, top + half_height, position.z);
        return (landed, Vec3::new(velocity.x, 0.0, velocity.z), true);
    }

    (position, velocity, grounded)
}
