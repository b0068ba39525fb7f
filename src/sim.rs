//! Frame ordering for the whole simulation.
//!
//! One chained sequence per frame: player integration and firing, projectile
//! movement, death timers, enemy behaviour and damage intake, then the wave
//! director's inbox and finally the HUD. Collision scans therefore always see
//! positions integrated earlier in the same frame.

use bevy::prelude::*;

use crate::combat::CombatPlugin;
use crate::enemies::EnemyPlugin;
use crate::hud::HudPlugin;
use crate::level::LevelPlugin;
use crate::player::{player_active, PlayerPlugin};
use crate::state::{game_playing, not_paused, StatePlugin};
use crate::wave::WavePlugin;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Input,
    Player,
    Weapon,
    Projectiles,
    Timers,
    Enemies,
    Director,
    Hud,
}

/// Every simulation plugin, without windowing, input capture or visuals
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                SimSet::Input,
                SimSet::Player,
                SimSet::Weapon,
                SimSet::Projectiles,
                SimSet::Timers,
                SimSet::Enemies,
                SimSet::Director,
                SimSet::Hud,
            )
                .chain(),
        )
        .configure_sets(Update, SimSet::Player.run_if(player_active))
        .configure_sets(Update, SimSet::Weapon.run_if(player_active))
        .configure_sets(Update, SimSet::Projectiles.run_if(not_paused))
        .configure_sets(Update, SimSet::Timers.run_if(game_playing))
        .configure_sets(Update, SimSet::Enemies.run_if(game_playing))
        .add_plugins((
            StatePlugin,
            LevelPlugin,
            PlayerPlugin,
            CombatPlugin,
            EnemyPlugin,
            WavePlugin,
            HudPlugin,
        ));
    }
}
