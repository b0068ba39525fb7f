//! Combat - the player's gun, bullets from both sides, damage bookkeeping

use bevy::prelude::*;

use crate::sim::SimSet;

pub mod damage;
pub mod projectile;
pub mod weapons;

pub use damage::*;
pub use projectile::*;
pub use weapons::*;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WeaponConfig>()
            .add_event::<ShotFired>()
            .add_systems(
                Update,
                (update_guns, fire_guns).chain().in_set(SimSet::Weapon),
            )
            .add_systems(
                Update,
                (advance_player_bullets, advance_enemy_bullets)
                    .chain()
                    .in_set(SimSet::Projectiles),
            );
    }
}
