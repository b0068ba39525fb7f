//! Headless app helpers for simulation tests

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::enemies::Enemy;
use crate::player::input::PlayerInput;
use crate::sim::SimulationPlugin;
use crate::wave::{RestartRequest, WaveDirector};

pub const FRAME_SECS: f32 = 1.0 / 60.0;

/// Full simulation without a window, stepping a fixed 60 Hz frame per update
pub fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SimulationPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME_SECS,
    )));
    app
}

/// Request a new run and step once so the player and wave 1 exist
pub fn start_run(app: &mut App) {
    app.world_mut().send_event(RestartRequest);
    app.update();
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn player_entity(app: &App) -> Entity {
    app.world()
        .resource::<WaveDirector>()
        .player
        .expect("run has not been started")
}

pub fn set_input(app: &mut App, input: PlayerInput) {
    *app.world_mut().resource_mut::<PlayerInput>() = input;
}

pub fn count<T: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    let mut query = world.query_filtered::<(), With<T>>();
    query.iter(world).count()
}

pub fn enemies(app: &mut App) -> Vec<Entity> {
    let world = app.world_mut();
    let mut query = world.query_filtered::<Entity, With<Enemy>>();
    query.iter(world).collect()
}
