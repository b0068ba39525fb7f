//! Keyboard and mouse capture into [`PlayerInput`].
//!
//! The simulation only ever reads `PlayerInput`; this plugin is the one place that
//! knows about physical keys, so headless runs can drive the resource directly.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, WindowFocused};

use crate::sim::SimSet;
use crate::state::{GameState, RunStatus};

/// Pressed state of every gameplay action for the current frame
#[derive(Resource, Default, Clone, Debug)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub fire: bool,
    /// Mouse motion accumulated this frame, in pixels
    pub look_delta: Vec2,
}

pub struct InputCapturePlugin;

impl Plugin for InputCapturePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (capture_player_input, handle_window_focus, sync_cursor_grab).in_set(SimSet::Input),
        );
    }
}

fn capture_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut input: ResMut<PlayerInput>,
) {
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    *input = PlayerInput {
        forward: keyboard.pressed(KeyCode::KeyW),
        back: keyboard.pressed(KeyCode::KeyS),
        left: keyboard.pressed(KeyCode::KeyA),
        right: keyboard.pressed(KeyCode::KeyD),
        jump: keyboard.pressed(KeyCode::Space),
        fire: mouse_button.pressed(MouseButton::Left),
        look_delta: delta,
    };
}

fn set_cursor_grab(window: &mut Window, grabbed: bool) {
    if grabbed {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    } else {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Lock the cursor while a run is live, free it in menus and on the end screen
fn sync_cursor_grab(
    state: Res<GameState>,
    mut last_status: Local<Option<RunStatus>>,
    mut windows: Query<&mut Window>,
) {
    if !cursor_grab_due(&mut last_status, state.run_status()) {
        return;
    }

    if let Ok(mut window) = windows.single_mut() {
        set_cursor_grab(&mut window, state.is_playing());
    }
}

/// True when the run status differs from the last one seen, which is then updated
fn cursor_grab_due(last_status: &mut Option<RunStatus>, status: RunStatus) -> bool {
    if *last_status == Some(status) {
        return false;
    }
    *last_status = Some(status);
    true
}

fn handle_window_focus(
    mut focus_events: EventReader<WindowFocused>,
    state: Res<GameState>,
    mut windows: Query<&mut Window>,
) {
    for event in focus_events.read() {
        if let Ok(mut window) = windows.single_mut() {
            set_cursor_grab(&mut window, event.focused && state.is_playing());
        }
    }
}
