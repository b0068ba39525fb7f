//! Heads-up display.
//!
//! [`Hud`] is the model the simulation writes to; [`HudWidgetsPlugin`] draws it with
//! bevy UI nodes and is only added when there is a window.

use bevy::prelude::*;

use crate::sim::SimSet;
use crate::state::{GameState, RunStatus};
use crate::wave::WaveDirector;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Hud>()
            .add_systems(Update, refresh_hud.in_set(SimSet::Hud));
    }
}

/// What the display should show this frame
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct Hud {
    pub health_fraction: f32,
    pub kills: u32,
    pub wave: u32,
    /// Final kill count while the end screen is up
    pub end_screen: Option<u32>,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            health_fraction: 1.0,
            kills: 0,
            wave: 1,
            end_screen: None,
        }
    }
}

impl Hud {
    pub fn report_health(&mut self, fraction: f32) {
        self.health_fraction = fraction.clamp(0.0, 1.0);
    }

    pub fn report_kills(&mut self, kills: u32) {
        self.kills = kills;
    }

    pub fn report_wave(&mut self, wave: u32) {
        self.wave = wave;
    }

    pub fn show_end_screen(&mut self, kills: u32) {
        self.end_screen = Some(kills);
    }

    pub fn hide_end_screen(&mut self) {
        self.end_screen = None;
    }
}

fn refresh_hud(state: Res<GameState>, director: Res<WaveDirector>, mut hud: ResMut<Hud>) {
    hud.report_health(state.health_fraction());
    hud.report_kills(state.kills());
    hud.report_wave(director.current_wave);
}

pub struct HudWidgetsPlugin;

impl Plugin for HudWidgetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud_widgets).add_systems(
            Update,
            (update_health_bar, update_counters, update_overlay).after(SimSet::Hud),
        );
    }
}

#[derive(Component)]
struct HealthBarFill;

#[derive(Component)]
struct KillCounterText;

#[derive(Component)]
struct WaveCounterText;

#[derive(Component)]
struct OverlayText;

fn spawn_hud_widgets(mut commands: Commands) {
    // Health bar (bottom-center)
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Percent(30.0),
                bottom: Val::Px(20.0),
                width: Val::Percent(40.0),
                height: Val::Px(14.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.8)),
        ))
        .with_child((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            BackgroundColor(Color::srgb(0.9, 0.2, 0.2)),
            HealthBarFill,
        ));

    // Wave (top-left)
    commands.spawn((
        Text::new("WAVE: 1"),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.8, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        WaveCounterText,
    ));

    // Kills (top-right)
    commands.spawn((
        Text::new("KILLS: 0"),
        TextFont {
            font_size: 24.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.8, 0.2)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        KillCounterText,
    ));

    // Menu, pause and end screen message (center)
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 40.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(30.0),
            top: Val::Percent(35.0),
            width: Val::Percent(40.0),
            ..default()
        },
        OverlayText,
    ));
}

fn update_health_bar(
    hud: Res<Hud>,
    mut fill_query: Query<(&mut Node, &mut BackgroundColor), With<HealthBarFill>>,
) {
    let Ok((mut node, mut color)) = fill_query.single_mut() else {
        return;
    };

    node.width = Val::Percent(hud.health_fraction * 100.0);

    if hud.health_fraction > 0.6 {
        color.0 = Color::srgb(0.3, 1.0, 0.3);
    } else if hud.health_fraction > 0.3 {
        color.0 = Color::srgb(1.0, 1.0, 0.3);
    } else {
        color.0 = Color::srgb(1.0, 0.3, 0.3);
    }
}

fn update_counters(
    hud: Res<Hud>,
    mut kill_query: Query<&mut Text, (With<KillCounterText>, Without<WaveCounterText>)>,
    mut wave_query: Query<&mut Text, (With<WaveCounterText>, Without<KillCounterText>)>,
) {
    if let Ok(mut text) = kill_query.single_mut() {
        **text = format!("KILLS: {}", hud.kills);
    }
    if let Ok(mut text) = wave_query.single_mut() {
        **text = format!("WAVE: {}", hud.wave);
    }
}

/// Text for the centre overlay, empty while a run is live
pub fn overlay_message(hud: &Hud, status: RunStatus) -> String {
    if let Some(kills) = hud.end_screen {
        return format!("GAME OVER\nKILLS: {kills}\n\nPress ENTER to restart");
    }

    match status {
        RunStatus::Menu => "ARENA WAVES\n\nPress ENTER to start".to_string(),
        RunStatus::Paused => "PAUSED\n\nESC to resume, Q to quit".to_string(),
        RunStatus::Playing | RunStatus::GameOver => String::new(),
    }
}

fn update_overlay(
    hud: Res<Hud>,
    state: Res<GameState>,
    mut overlay_query: Query<&mut Text, With<OverlayText>>,
) {
    let Ok(mut text) = overlay_query.single_mut() else {
        return;
    };

    let message = overlay_message(&hud, state.run_status());
    if **text != message {
        **text = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_frames, start_run, test_app};

    #[test]
    fn test_report_health_clamps() {
        let mut hud = Hud::default();

        hud.report_health(1.5);
        assert_eq!(hud.health_fraction, 1.0);
        hud.report_health(-0.2);
        assert_eq!(hud.health_fraction, 0.0);
    }

    #[test]
    fn test_end_screen_show_and_hide() {
        let mut hud = Hud::default();

        hud.show_end_screen(12);
        assert_eq!(hud.end_screen, Some(12));
        hud.hide_end_screen();
        assert_eq!(hud.end_screen, None);
    }

    #[test]
    fn test_overlay_message_per_status() {
        let mut hud = Hud::default();

        assert!(overlay_message(&hud, RunStatus::Menu).contains("start"));
        assert!(overlay_message(&hud, RunStatus::Paused).starts_with("PAUSED"));
        assert!(overlay_message(&hud, RunStatus::Playing).is_empty());

        hud.show_end_screen(4);
        assert!(overlay_message(&hud, RunStatus::GameOver).contains("KILLS: 4"));
    }

    #[test]
    fn test_hud_tracks_live_run() {
        let mut app = test_app();
        start_run(&mut app);
        app.world_mut().resource_mut::<GameState>().add_kill();

        run_frames(&mut app, 5);

        let hud = app.world().resource::<Hud>();
        assert_eq!(hud.kills, 1);
        assert_eq!(hud.wave, 1);
        assert!(hud.health_fraction < 1.0);
    }
}
