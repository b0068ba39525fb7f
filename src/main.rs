use bevy::prelude::*;

mod collision;
mod combat;
mod enemies;
mod hud;
mod level;
mod player;
mod rendering;
mod sim;
mod state;
mod wave;

#[cfg(test)]
mod testing;

use sim::SimSet;
use state::{GameState, RunStatus};
use wave::RestartRequest;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Arena Waves".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            sim::SimulationPlugin,
            player::input::InputCapturePlugin,
            rendering::VisualsPlugin,
            hud::HudWidgetsPlugin,
        ))
        .add_systems(Update, handle_run_input.in_set(SimSet::Input))
        .run();
}

fn handle_run_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<GameState>,
    mut restart: EventWriter<RestartRequest>,
) {
    match state.run_status() {
        RunStatus::Menu | RunStatus::GameOver => {
            if keyboard.just_pressed(KeyCode::Space) || keyboard.just_pressed(KeyCode::Enter) {
                restart.write(RestartRequest);
            }
        }
        RunStatus::Playing => {
            if keyboard.just_pressed(KeyCode::Escape) {
                state.pause_toggle();
            }
        }
        RunStatus::Paused => {
            if keyboard.just_pressed(KeyCode::Escape) {
                state.pause_toggle();
            }
            if keyboard.just_pressed(KeyCode::KeyQ) {
                state.set_run_status(RunStatus::Menu);
            }
        }
    }
}
